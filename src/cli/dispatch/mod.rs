use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::site;
use anyhow::Result;

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if the arguments are inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let options = site::Options::parse(matches);

    Ok(Action::Server(Args {
        port: options.port,
        locales: options.locales,
    }))
}
