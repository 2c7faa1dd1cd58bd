use clap::{ArgMatches, Command};

pub fn cli() -> Vec<Command> {
    vec![dump::cli(), info::cli(), query::cli()]
}

pub fn dispatch(matches: ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("dump", args)) => dump::exec(args),
        Some(("info", args)) => info::exec(args),
        Some(("query", args)) => query::exec(args),
        _ => unreachable!(),
    }
}

pub mod dump;
pub mod info;
pub mod query;
