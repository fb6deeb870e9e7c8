use crate::{
    db_conn::DbConn,
    users::{User, AUTH_COOKIE},
};
use rocket::{
    outcome::{try_outcome, Outcome},
    request::{self, FromRequest, Request},
    response::Redirect,
};
use yatube_common::utils::requires_login;

/// Common context needed by most routes and operations on models.
///
/// The current user is loaded with the same connection the route will use.
pub struct YatubeRocket {
    pub conn: DbConn,
    pub user: Option<User>,
}

impl YatubeRocket {
    /// The connection and the logged in user, or a redirection to the login page
    /// that comes back to `origin`
    pub fn require_login(self, origin: &str) -> Result<(DbConn, User), Redirect> {
        match self.user {
            Some(user) => Ok((self.conn, user)),
            None => Err(requires_login(origin)),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for YatubeRocket {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let conn = try_outcome!(request.guard::<DbConn>().await);
        let id = request
            .cookies()
            .get_private(AUTH_COOKIE)
            .and_then(|cookie| cookie.value().parse::<i32>().ok());
        let user = match id {
            Some(id) => conn.run(move |c| User::get(c, id).ok()).await,
            None => None,
        };
        Outcome::Success(YatubeRocket { conn, user })
    }
}
