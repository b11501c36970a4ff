use crate::gate::Locales;
use clap::{builder::ValueParser, Arg, ArgMatches, Command};

pub const ARG_PORT: &str = "port";
pub const ARG_LOCALES: &str = "locales";

#[derive(Debug, Clone)]
pub struct Options {
    pub port: u16,
    pub locales: Locales,
}

impl Options {
    /// Read the site arguments, falling back to the defaults.
    #[must_use]
    pub fn parse(matches: &ArgMatches) -> Self {
        Self {
            port: matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080),
            locales: matches
                .get_one::<Locales>(ARG_LOCALES)
                .cloned()
                .unwrap_or_default(),
        }
    }
}

fn validator_locales() -> ValueParser {
    ValueParser::from(|value: &str| value.parse::<Locales>())
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PORT)
                .short('p')
                .long(ARG_PORT)
                .help("Port to listen on")
                .default_value("8080")
                .env("VESTIBULE_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new(ARG_LOCALES)
                .long(ARG_LOCALES)
                .help("Comma separated locale prefixes, the first one is the default")
                .default_value("fr,en")
                .env("VESTIBULE_LOCALES")
                .value_parser(validator_locales()),
        )
}
