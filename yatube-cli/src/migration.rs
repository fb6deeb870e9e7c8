use clap::{App, ArgMatches, SubCommand};
use std::process::exit;
use yatube_models::{
    migrations::{rerun_last_migration, run_pending_migrations},
    Connection,
};

pub fn command<'a, 'b>() -> App<'a, 'b> {
    SubCommand::with_name("migration")
        .about("Manage migrations")
        .subcommand(SubCommand::with_name("run").about("Run migrations"))
        .subcommand(SubCommand::with_name("redo").about("Rerun latest migration"))
}

pub fn run<'a>(args: &ArgMatches<'a>, conn: &mut Connection) {
    let res = match args.subcommand() {
        ("run", Some(_)) => run_pending_migrations(conn),
        ("redo", Some(_)) => rerun_last_migration(conn),
        ("", None) => {
            command().print_help().expect("Couldn't print help");
            return;
        }
        _ => {
            println!("Unknown subcommand");
            return;
        }
    };
    if let Err(e) = res {
        eprintln!("Migrations failed: {}", e);
        exit(1);
    }
}
