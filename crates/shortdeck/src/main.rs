mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use shortdeck_core::Controller;

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

const OWN_CRATES: [&str; 4] = ["shortdeck", "shortdeck_core", "shortdeck_api", "shortdeck_config"];

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Log to stderr. `-v` raises our own crates one level at a time while
/// dependencies stay at `warn`; `-q` keeps only errors. `RUST_LOG` wins.
fn init_tracing(global: &GlobalOpts) {
    let level = match (global.quiet, global.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let directives = OWN_CRATES
        .iter()
        .fold(String::from("warn"), |acc, krate| format!("{acc},{krate}={level}"));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(global.verbose > 1)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(mut cli: Cli) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    config::apply_defaults(&mut cli.global, &cfg.defaults)?;

    match cli.command {
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            let mut cmd = Cli::command();
            clap_complete::generate(args.shell, &mut cmd, "shortdeck", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let controller = Controller::new(config::build_controller_config(&cli.global, &cfg)?)?;
            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, controller, &cli.global).await
        }
    }
}
