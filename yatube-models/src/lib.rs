#[macro_use]
extern crate diesel;
#[macro_use]
extern crate lazy_static;

use std::fmt;

pub use diesel::SqliteConnection as Connection;

pub mod config;
pub use config::CONFIG;

pub const ITEMS_PER_PAGE: i64 = 10;

#[derive(Debug)]
pub enum Error {
    Db(diesel::result::Error),
    DbPool,
    Io(std::io::Error),
    Migration(String),
    NotFound,
    PasswordHash,
    Unauthorized,
    Validation(validator::ValidationErrors),
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Error::NotFound,
            err => Error::Db(err),
        }
    }
}

impl From<diesel::ConnectionError> for Error {
    fn from(_: diesel::ConnectionError) -> Self {
        Error::DbPool
    }
}

impl From<diesel::r2d2::Error> for Error {
    fn from(err: diesel::r2d2::Error) -> Self {
        match err {
            diesel::r2d2::Error::QueryError(e) => Error::from(e),
            diesel::r2d2::Error::ConnectionError(_) => Error::DbPool,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Error::Validation(err)
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(_: bcrypt::BcryptError) -> Self {
        Error::PasswordHash
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Db(e) => write!(f, "database error: {}", e),
            Error::DbPool => write!(f, "couldn't get a database connection"),
            Error::Io(e) => write!(f, "i/o error: {}", e),
            Error::Migration(e) => write!(f, "migration error: {}", e),
            Error::NotFound => write!(f, "not found"),
            Error::PasswordHash => write!(f, "couldn't hash or check a password"),
            Error::Unauthorized => write!(f, "unauthorized"),
            Error::Validation(e) => write!(f, "invalid input: {}", e),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

/// Adds a function to a model, that returns the first
/// matching row for a given list of fields.
///
/// Usage:
///
/// ```rust,ignore
/// impl Model {
///     find_by!(model_table, name_of_the_function, field1 as String, field2 as i32);
/// }
///
/// // Get the Model with field1 == "", and field2 == 0
/// Model::name_of_the_function(connection, String::new(), 0);
/// ```
macro_rules! find_by {
    ($table:ident, $fn:ident, $($col:ident as $type:ty),+) => {
        /// Try to find a $table with a given $col
        pub fn $fn(conn: &mut crate::Connection, $($col: $type),+) -> Result<Self> {
            $table::table
                $(.filter($table::$col.eq($col)))+
                .first(conn)
                .map_err(Error::from)
        }
    };
}

/// Adds a function to a model to retrieve a row by ID
macro_rules! get {
    ($table:ident) => {
        pub fn get(conn: &mut crate::Connection, id: i32) -> Result<Self> {
            $table::table
                .filter($table::id.eq(id))
                .first(conn)
                .map_err(Error::from)
        }
    };
}

/// Adds a function to a model to insert a new row.
///
/// SQLite can't give the inserted row back, so the last one is read again.
macro_rules! insert {
    ($table:ident, $from:ty) => {
        pub fn insert(conn: &mut crate::Connection, new: $from) -> Result<Self> {
            diesel::insert_into($table::table)
                .values(new)
                .execute(conn)?;
            $table::table
                .order_by($table::id.desc())
                .first(conn)
                .map_err(Error::from)
        }
    };
}

pub mod comments;
pub mod db_conn;
pub mod feed;
pub mod follows;
pub mod groups;
pub mod migrations;
pub mod page_cache;
pub mod posts;
pub mod schema;
pub mod users;
pub mod validation;
pub mod yatube_rocket;

pub use yatube_rocket::YatubeRocket;
