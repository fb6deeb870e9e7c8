#[macro_use]
extern crate rocket;

use rocket::{
    fairing::{self, AdHoc},
    figment::Figment,
    Build, Rocket,
};
use std::{path::PathBuf, process::exit};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use yatube_models::{
    db_conn::DbConn,
    migrations::{is_pending, run_pending_migrations},
    page_cache::PageCache,
    CONFIG,
};

#[macro_use]
mod render;
mod routes;

use routes::medias::MediaDir;

/// Brings the database schema up to date before any request is served
async fn run_migrations(rocket: Rocket<Build>) -> fairing::Result {
    let conn = match DbConn::get_one(&rocket).await {
        Some(conn) => conn,
        None => {
            error!("Couldn't get a database connection");
            return Err(rocket);
        }
    };
    let res = conn
        .run(|c| {
            if is_pending(c).unwrap_or(true) {
                info!("Applying pending migrations");
                run_pending_migrations(c)
            } else {
                Ok(())
            }
        })
        .await;
    match res {
        Ok(()) => Ok(rocket),
        Err(e) => {
            error!("Couldn't run migrations: {}", e);
            Err(rocket)
        }
    }
}

pub(crate) fn init_rocket(config: Figment, cache: PageCache, media: MediaDir) -> Rocket<Build> {
    rocket::custom(config)
        .attach(DbConn::fairing())
        .attach(AdHoc::try_on_ignite("Database migrations", run_migrations))
        .mount(
            "/",
            routes![
                routes::comments::create,
                routes::groups::details,
                routes::instance::index,
                routes::medias::details,
                routes::posts::details,
                routes::posts::new,
                routes::posts::create,
                routes::posts::edit,
                routes::posts::update,
                routes::session::new,
                routes::session::create,
                routes::session::login,
                routes::session::authenticate,
                routes::session::logout,
                routes::session::logout_form,
                routes::timelines::subscriptions,
                routes::user::details,
                routes::user::follow_link,
                routes::user::follow_form,
                routes::user::unfollow_link,
                routes::user::unfollow_form,
            ],
        )
        .register(
            "/",
            catchers![
                routes::errors::forbidden,
                routes::errors::not_found,
                routes::errors::unprocessable_entity,
                routes::errors::server_error,
                routes::errors::service_unavailable,
            ],
        )
        .manage(cache)
        .manage(media)
}

#[rocket::main]
async fn main() {
    let env = dotenv::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    match env {
        Ok(path) => info!("Configuration read from {}", path.display()),
        Err(ref e) if e.not_found() => warn!("no .env was found"),
        Err(e) => {
            error!("Could not parse the .env file: {}", e);
            exit(1);
        }
    }

    let cache = PageCache::new(CONFIG.index_cache_ttl);
    let media = MediaDir(PathBuf::from(&CONFIG.media_directory));

    if let Err(e) = init_rocket(CONFIG.rocket(), cache, media).launch().await {
        error!("Rocket failed: {}", e);
        exit(1);
    }
}
