use crate::{
    follows::Follow,
    schema::{posts, users},
    validation::{invalid, optional_email, valid_username},
    Connection, Error, Result,
};
use chrono::NaiveDateTime;
use diesel::{self, ExpressionMethods, QueryDsl, RunQueryDsl};
use serde::Serialize;
use std::{
    cmp::PartialEq,
    hash::{Hash, Hasher},
};
use tracing::info;
use validator::Validate;

pub const AUTH_COOKIE: &str = "user_id";

#[derive(Queryable, Identifiable, Clone, Debug)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub hashed_password: Option<String>,
    pub creation_date: NaiveDateTime,
}

#[derive(Default, Insertable, Validate)]
#[diesel(table_name = users)]
pub struct NewUser {
    #[validate(
        length(max = 150, message = "Ensure this value has at most 150 characters."),
        custom = "valid_username"
    )]
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    #[validate(custom = "optional_email")]
    pub email: String,
    pub hashed_password: Option<String>,
}

/// What other people can see about someone
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Author {
    pub id: i32,
    pub username: String,
    pub display_name: String,
}

impl User {
    insert!(users, NewUser);
    get!(users);
    find_by!(users, find_by_name, username as &str);

    /// Full name when there is one, username otherwise
    pub fn display_name(&self) -> String {
        let full_name = format!("{} {}", self.first_name, self.last_name);
        let full_name = full_name.trim();
        if full_name.is_empty() {
            self.username.clone()
        } else {
            full_name.to_owned()
        }
    }

    pub fn to_author(&self) -> Author {
        Author {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name(),
        }
    }

    pub fn delete(&self, conn: &mut Connection) -> Result<()> {
        diesel::delete(self)
            .execute(conn)
            .map(|_| ())
            .map_err(Error::from)
    }

    pub fn count(conn: &mut Connection) -> Result<i64> {
        users::table
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn count_posts(&self, conn: &mut Connection) -> Result<i64> {
        posts::table
            .filter(posts::author_id.eq(self.id))
            .count()
            .get_result(conn)
            .map_err(Error::from)
    }

    pub fn hash_pass(pass: &str) -> Result<String> {
        bcrypt::hash(pass, bcrypt::DEFAULT_COST).map_err(Error::from)
    }

    fn auth(&self, pass: &str) -> bool {
        self.hashed_password
            .as_ref()
            .map(|hashed| bcrypt::verify(pass, hashed.as_ref()).unwrap_or(false))
            .unwrap_or(false)
    }

    /// Checks a username/password pair.
    ///
    /// Unknown users still pay for a hash, so that timing doesn't tell them apart.
    pub fn login(conn: &mut Connection, name: &str, password: &str) -> Result<User> {
        match User::find_by_name(conn, name) {
            Ok(user) => {
                if user.auth(password) {
                    Ok(user)
                } else {
                    Err(Error::Unauthorized)
                }
            }
            Err(Error::NotFound) => {
                let _ = User::hash_pass(password);
                Err(Error::Unauthorized)
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_following(&self, conn: &mut Connection, other_id: i32) -> Result<bool> {
        Follow::find(conn, self.id, other_id).map(|f| f.is_some())
    }

    pub fn count_followers(&self, conn: &mut Connection) -> Result<i64> {
        Follow::count_followers(conn, self.id)
    }

    pub fn count_followed(&self, conn: &mut Connection) -> Result<i64> {
        Follow::count_followed(conn, self.id)
    }
}

impl PartialEq for User {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for User {}

impl Hash for User {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl NewUser {
    /// Creates a new local user
    pub fn new_local(
        conn: &mut Connection,
        username: String,
        first_name: String,
        last_name: String,
        email: String,
        password: Option<String>,
    ) -> Result<User> {
        let mut new = NewUser {
            username: username.trim().to_owned(),
            first_name: first_name.trim().to_owned(),
            last_name: last_name.trim().to_owned(),
            email: email.trim().to_owned(),
            hashed_password: None,
        };
        new.validate()?;
        if User::find_by_name(conn, &new.username).is_ok() {
            return Err(invalid(
                "username",
                "unique",
                "A user with that username already exists.",
            ));
        }
        new.hashed_password = password.as_deref().map(User::hash_pass).transpose()?;

        let user = User::insert(conn, new)?;
        info!("New user {} (#{})", user.username, user.id);
        Ok(user)
    }
}
