use clap::{App, Arg, ArgMatches, SubCommand};
use std::{
    io::{self, Write},
    process::exit,
};
use yatube_models::{users::NewUser, Connection};

pub fn command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("users")
        .about("Manage users")
        .subcommand(
            SubCommand::with_name("new")
                .arg(
                    Arg::with_name("name")
                        .short("n")
                        .long("name")
                        .alias("username")
                        .takes_value(true)
                        .help("The username of the new user"),
                )
                .arg(
                    Arg::with_name("first-name")
                        .short("f")
                        .long("first-name")
                        .takes_value(true)
                        .help("The first name of the new user"),
                )
                .arg(
                    Arg::with_name("last-name")
                        .short("l")
                        .long("last-name")
                        .takes_value(true)
                        .help("The last name of the new user"),
                )
                .arg(
                    Arg::with_name("email")
                        .short("e")
                        .long("email")
                        .takes_value(true)
                        .help("Email address of the new user"),
                )
                .arg(
                    Arg::with_name("password")
                        .short("p")
                        .long("password")
                        .takes_value(true)
                        .help("The password of the new user"),
                )
                .about("Create a new user"),
        )
}

pub fn run<'a>(args: &ArgMatches<'a>, conn: &mut Connection) {
    match args.subcommand() {
        ("new", Some(x)) => new(x, conn),
        ("", None) => command().print_help().expect("Couldn't print help"),
        _ => println!("Unknown subcommand"),
    }
}

fn new<'a>(args: &ArgMatches<'a>, conn: &mut Connection) {
    let username = args
        .value_of("name")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Username"));
    let first_name = args
        .value_of("first-name")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("First name"));
    let last_name = args
        .value_of("last-name")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Last name"));
    let email = args
        .value_of("email")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Email address"));
    let password = args.value_of("password").map(String::from).unwrap_or_else(|| {
        print!("Password: ");
        io::stdout().flush().expect("Couldn't flush STDOUT");
        rpassword::read_password().expect("Couldn't read your password.")
    });

    match NewUser::new_local(conn, username, first_name, last_name, email, Some(password)) {
        Ok(user) => println!("User {} created (#{})", user.username, user.id),
        Err(e) => {
            eprintln!("Couldn't create the user: {}", e);
            exit(1);
        }
    }
}
