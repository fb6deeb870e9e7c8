use heck::ToKebabCase;
use rand::RngCore;
use rocket::{http::RawStr, response::Redirect};

pub const LOGIN_PATH: &str = "/auth/login/";

/// Generates an hexadecimal representation of 32 bytes of random data
pub fn random_hex() -> String {
    let mut bytes = [0; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|byte| format!("{:02x}", byte)).collect()
}

/// Turns a group title into something usable in an URL
pub fn make_slug(title: &str) -> String {
    title
        .to_kebab_case()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-')
        .collect()
}

/// Login page URI, remembering where to go back afterwards
pub fn login_uri(next: &str) -> String {
    format!(
        "{}?next={}",
        LOGIN_PATH,
        RawStr::new(next).percent_encode().as_str()
    )
}

/// Redirects anonymous visitors to the login page.
pub fn requires_login(next: &str) -> Redirect {
    tracing::debug!("anonymous access to {}, redirecting to login", next);
    Redirect::to(login_uri(next))
}
