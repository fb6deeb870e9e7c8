use crate::{
    render::{error_messages, FormField, Rendered},
    routes::{errors::ErrorPage, RespondOrRedirect},
};
use rocket::{
    form::Form,
    http::{Cookie, CookieJar},
    response::Redirect,
};
use std::borrow::Cow;
use tracing::{info, warn};
use validator::{Validate, ValidationError, ValidationErrors};
use yatube_models::{
    db_conn::DbConn,
    users::{NewUser, User, AUTH_COOKIE},
    Error,
};

/// Only local paths are allowed as a destination after login
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") && !next.starts_with("/\\") => {
            next
        }
        _ => "/",
    }
}

#[derive(Default, FromForm, Validate)]
#[validate(schema(
    function = "passwords_match",
    skip_on_field_errors = false,
    message = "The two password fields didn't match."
))]
pub struct SignupForm {
    #[field(default = String::new())]
    pub first_name: String,
    #[field(default = String::new())]
    pub last_name: String,
    #[field(default = String::new())]
    pub username: String,
    #[field(default = String::new())]
    pub email: String,
    #[field(default = String::new())]
    #[validate(length(min = 8, message = "Password should be at least 8 characters long"))]
    pub password1: String,
    #[field(default = String::new())]
    pub password2: String,
}

fn passwords_match(form: &SignupForm) -> Result<(), ValidationError> {
    if form.password1 != form.password2 {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some(Cow::from("The two password fields didn't match."));
        Err(err)
    } else {
        Ok(())
    }
}

fn signup_page(form: &SignupForm, errors: Option<&ValidationErrors>) -> Rendered {
    render!({
        "form": {
            "fields": [
                FormField::new("first_name", "text", false),
                FormField::new("last_name", "text", false),
                FormField::new("username", "text", true),
                FormField::new("email", "email", false),
                FormField::new("password1", "password", true),
                FormField::new("password2", "password", true),
            ],
            "values": {
                "first_name": form.first_name,
                "last_name": form.last_name,
                "username": form.username,
                "email": form.email,
            },
            "errors": errors.map(error_messages).unwrap_or_default(),
        },
    })
}

#[get("/auth/signup")]
pub fn new() -> Rendered {
    signup_page(&SignupForm::default(), None)
}

#[post("/auth/signup", data = "<form>")]
pub async fn create(form: Form<SignupForm>, conn: DbConn) -> Result<RespondOrRedirect, ErrorPage> {
    if let Err(errors) = form.validate() {
        return Ok(signup_page(&form, Some(&errors)).into());
    }
    let (username, first_name, last_name, email, password) = (
        form.username.clone(),
        form.first_name.clone(),
        form.last_name.clone(),
        form.email.clone(),
        form.password1.clone(),
    );
    let res = conn
        .run(move |c| {
            NewUser::new_local(c, username, first_name, last_name, email, Some(password))
        })
        .await;
    match res {
        Ok(_) => Ok(Redirect::to("/").into()),
        Err(Error::Validation(errors)) => Ok(signup_page(&form, Some(&errors)).into()),
        Err(err) => Err(err.into()),
    }
}

#[derive(FromForm)]
pub struct LoginForm {
    #[field(default = String::new())]
    pub username: String,
    #[field(default = String::new())]
    pub password: String,
    pub next: Option<String>,
}

fn login_page(username: &str, next: Option<&str>, error: Option<&str>) -> Rendered {
    render!({
        "form": {
            "fields": [
                FormField::new("username", "text", true),
                FormField::new("password", "password", true),
            ],
            "values": { "username": username },
            "errors": match error {
                Some(error) => serde_json::json!({ "__all__": [error] }),
                None => serde_json::json!({}),
            },
        },
        "next": next,
    })
}

#[get("/auth/login?<next>")]
pub fn login(next: Option<&str>) -> Rendered {
    login_page("", next, None)
}

#[post("/auth/login", data = "<form>")]
pub async fn authenticate(
    form: Form<LoginForm>,
    conn: DbConn,
    cookies: &CookieJar<'_>,
) -> Result<RespondOrRedirect, ErrorPage> {
    let (username, password) = (form.username.trim().to_owned(), form.password.clone());
    let res = conn
        .run(move |c| User::login(c, &username, &password))
        .await;
    match res {
        Ok(user) => {
            cookies.add_private(Cookie::new(AUTH_COOKIE, user.id.to_string()));
            info!("{} logged in", user.username);
            Ok(Redirect::to(safe_next(form.next.as_deref()).to_owned()).into())
        }
        Err(Error::Unauthorized) => {
            warn!("failed login attempt for {}", form.username);
            Ok(login_page(
                &form.username,
                form.next.as_deref(),
                Some("Please enter a correct username and password. Note that both fields may be case-sensitive."),
            )
            .into())
        }
        Err(err) => Err(err.into()),
    }
}

#[get("/auth/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Redirect {
    cookies.remove_private(AUTH_COOKIE);
    Redirect::to("/")
}

#[post("/auth/logout")]
pub fn logout_form(cookies: &CookieJar<'_>) -> Redirect {
    logout(cookies)
}
