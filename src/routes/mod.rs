use crate::render::Rendered;
use rocket::{http::RawStr, response::Redirect};

/// Form handlers either show the form again with its errors, or move on.
#[derive(Responder)]
pub enum RespondOrRedirect {
    Response(Rendered),
    Redirect(Redirect),
}

impl From<Rendered> for RespondOrRedirect {
    fn from(response: Rendered) -> Self {
        Self::Response(response)
    }
}

impl From<Redirect> for RespondOrRedirect {
    fn from(redirect: Redirect) -> Self {
        Self::Redirect(redirect)
    }
}

/// Parses the `group` field of post forms: empty means no group
pub fn parse_group(raw: Option<&str>) -> Result<Option<i32>, ()> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(id) => id.parse().map(Some).map_err(|_| ()),
    }
}

/// Link to someone's profile, usernames can be anything but ASCII
pub fn profile_uri(username: &str) -> String {
    format!("/profile/{}/", RawStr::new(username).percent_encode())
}

pub mod comments;
pub mod errors;
pub mod groups;
pub mod instance;
pub mod medias;
pub mod posts;
pub mod session;
pub mod timelines;
pub mod user;
