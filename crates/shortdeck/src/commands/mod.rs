//! Command dispatch: bridges CLI args -> controller operations -> output formatting.

pub mod config_cmd;
pub mod domains;
pub mod short_urls;
pub mod util;

use shortdeck_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Run a server-bound command on a started controller, then wait for its
/// events to be applied and stop it.
pub async fn dispatch(
    cmd: Command,
    controller: Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    controller.start().await;

    let result = match cmd {
        Command::ShortUrls(args) => short_urls::handle(&controller, args, global).await,
        Command::Domains(args) => domains::handle(&controller, args, global).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "config and completions are handled before dispatch".into(),
        )),
    };

    let settled = controller.settled().await;
    controller.shutdown().await;
    result?;
    settled.map_err(CliError::from)
}
