#![warn(clippy::pedantic)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::module_name_repetitions)]
use clap::Parser;
use cmd::Cli;
use exec::SystemExec;
use std::{error::Error, io::Write};
mod channel;
mod cmd;
mod error;
mod exec;
mod scaffold;
mod sync;
mod template;
pub mod utils;

fn main() {
    let cli = match initial_init() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = cli.command.run(&SystemExec) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        if let Some(hint) = e.hint() {
            eprintln!("hint: {}", hint);
        }
        std::process::exit(1);
    }
}

/// Ensures not run as root
/// Parses cli
/// Initialises logger, at the level asked for with `-v`, overridable through `RUST_LOG`
fn initial_init() -> Result<Cli, Box<dyn Error>> {
    if nix::unistd::Uid::current().is_root() {
        return Err("This program should not be run as root! `sync` asks for sudo itself.".into());
    };

    let cli = Cli::parse();

    env_logger::Builder::new()
        .format(|buf, rec| {
            writeln!(
                buf,
                "{}:{} [{}]\t{}",
                rec.file().unwrap_or("unknown"),
                rec.line().unwrap_or(0),
                rec.level(),
                rec.args()
            )
        })
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    log::trace!("parsed cli: {:?}", cli);
    Ok(cli)
}
