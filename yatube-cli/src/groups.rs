use clap::{App, Arg, ArgMatches, SubCommand};
use std::process::exit;
use yatube_common::utils::make_slug;
use yatube_models::{
    groups::{Group, NewGroup},
    Connection,
};

pub fn command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("groups")
        .about("Manage groups")
        .subcommand(
            SubCommand::with_name("new")
                .arg(
                    Arg::with_name("title")
                        .short("t")
                        .long("title")
                        .takes_value(true)
                        .help("The title of the group"),
                )
                .arg(
                    Arg::with_name("slug")
                        .short("s")
                        .long("slug")
                        .takes_value(true)
                        .help("Identifier of the group in URLs, derived from the title if missing"),
                )
                .arg(
                    Arg::with_name("description")
                        .short("d")
                        .long("description")
                        .takes_value(true)
                        .help("What this group is about"),
                )
                .about("Create a new group"),
        )
        .subcommand(SubCommand::with_name("list").about("List all the groups"))
}

pub fn run<'a>(args: &ArgMatches<'a>, conn: &mut Connection) {
    match args.subcommand() {
        ("new", Some(x)) => new(x, conn),
        ("list", Some(_)) => list(conn),
        ("", None) => command().print_help().expect("Couldn't print help"),
        _ => println!("Unknown subcommand"),
    }
}

fn new<'a>(args: &ArgMatches<'a>, conn: &mut Connection) {
    let title = args
        .value_of("title")
        .map(String::from)
        .unwrap_or_else(|| super::ask_for("Title"));
    let slug = args
        .value_of("slug")
        .map(String::from)
        .unwrap_or_else(|| make_slug(&title));
    let description = args.value_of("description").unwrap_or("").to_owned();

    let res = Group::create(
        conn,
        NewGroup {
            title,
            slug,
            description,
        },
    );
    match res {
        Ok(group) => println!("Group {} created at /group/{}/", group, group.slug),
        Err(e) => {
            eprintln!("Couldn't create the group: {}", e);
            exit(1);
        }
    }
}

fn list(conn: &mut Connection) {
    match Group::list(conn) {
        Ok(groups) => {
            for group in groups {
                println!("{}\t{}", group.slug, group);
            }
        }
        Err(e) => {
            eprintln!("Couldn't list the groups: {}", e);
            exit(1);
        }
    }
}
