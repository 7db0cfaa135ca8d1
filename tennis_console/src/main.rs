#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

mod check_player_name;
mod database;
mod http_server_state;
mod match_handlers_tide;
mod persistence;
mod registry;
mod server_config;
mod server_main;

use std::io;

use clap::{Command, arg};
use server_config::ServerConfig;

fn main() -> io::Result<()> {
    env_logger::Builder::new()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .filter_module("sqlx::query", log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let matches = Command::new("Tennis Scoreboard")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .about("Tennis match scoreboard web server")
        .subcommand_required(true)
        .subcommand(Command::new("server").about("Run the scoreboard server").arg(
            arg!(<config_file> "Path to the configuration file: yaml-serialized ServerConfig."),
        ))
        .subcommand(
            Command::new("check-name")
                .about("Verifies whether a player name would be accepted for a new match.")
                .arg(arg!(<player_name> "Player name to check")),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("server", sub_matches)) => {
            server_main::run(read_config_file(
                sub_matches.get_one::<String>("config_file").unwrap(),
            ));
            Ok(())
        }
        Some(("check-name", sub_matches)) => {
            check_player_name::run(sub_matches.get_one::<String>("player_name").unwrap())
        }
        _ => unreachable!("Exhausted list of subcommands and subcommand_required prevents `None`"),
    }
}

fn read_config_file(filename: &String) -> ServerConfig {
    let contents = std::fs::read_to_string(filename).expect("Reading config file");
    serde_yaml::from_str(&contents).expect("Parsing config file")
}
