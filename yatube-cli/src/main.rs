use clap::App;
use std::{
    io::{self, prelude::*},
    process::exit,
};
use yatube_models::{db_conn::establish, Connection, CONFIG};

mod groups;
mod migration;
mod users;

fn main() {
    let mut app = App::new("Yatube CLI")
        .bin_name("ytb")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Collection of tools to manage your Yatube instance.")
        .subcommand(groups::command())
        .subcommand(migration::command())
        .subcommand(users::command());
    let matches = app.clone().get_matches();

    match dotenv::dotenv() {
        Ok(path) => println!("Configuration read from {}", path.display()),
        Err(ref e) if e.not_found() => eprintln!("no .env was found"),
        Err(e) => {
            eprintln!("Could not parse the .env file: {}", e);
            exit(1);
        }
    }

    match matches.subcommand() {
        ("groups", Some(args)) => groups::run(args, &mut connect()),
        ("migration", Some(args)) => migration::run(args, &mut connect()),
        ("users", Some(args)) => users::run(args, &mut connect()),
        _ => app.print_help().expect("Couldn't print help"),
    };
}

fn connect() -> Connection {
    establish(&CONFIG.database_url).unwrap_or_else(|e| {
        eprintln!("Couldn't connect to {}: {}", CONFIG.database_url, e);
        exit(1);
    })
}

pub fn ask_for(something: &str) -> String {
    print!("{}: ", something);
    io::stdout().flush().expect("Couldn't flush STDOUT");
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .expect("Unable to read line");
    input.retain(|c| c != '\n');
    input
}
