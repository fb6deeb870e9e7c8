use rocket::data::{Limits, ToByteUnit};
use rocket::figment::Figment;
use std::env::var;
use std::time::Duration;

#[cfg(not(test))]
const DB_NAME: &str = "yatube";
#[cfg(test)]
const DB_NAME: &str = "yatube_tests";

pub struct Config {
    pub database_url: String,
    pub db_max_size: Option<u32>,
    pub media_directory: String,
    pub index_cache_ttl: Duration,
    pub form_size: u64,
}

impl Config {
    /// Rocket's own configuration (`ROCKET_*` variables, `Rocket.toml`),
    /// with the database and upload limits of this instance applied on top.
    pub fn rocket(&self) -> Figment {
        let limits = Limits::default()
            .limit("form", self.form_size.kibibytes())
            .limit("data-form", self.form_size.kibibytes())
            .limit("file", self.form_size.kibibytes());
        let figment = rocket::Config::figment()
            .merge(("limits", limits))
            .merge(("databases.yatube.url", &self.database_url));
        match self.db_max_size {
            Some(size) => figment.merge(("databases.yatube.pool_size", size)),
            None => figment,
        }
    }
}

fn number_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    var(name).ok().map(|s| {
        s.parse::<T>()
            .unwrap_or_else(|_| panic!("Invalid configuration: {} is not a number", name))
    })
}

lazy_static! {
    pub static ref CONFIG: Config = Config {
        database_url: var("DATABASE_URL").unwrap_or_else(|_| format!("{}.sqlite", DB_NAME)),
        db_max_size: number_var("DB_MAX_SIZE"),
        media_directory: var("MEDIA_UPLOAD_DIRECTORY")
            .unwrap_or_else(|_| "static/media".to_owned()),
        index_cache_ttl: Duration::from_secs(number_var("INDEX_CACHE_TTL").unwrap_or(20)),
        form_size: number_var("FORM_SIZE").unwrap_or(5 * 1024),
    };
}
