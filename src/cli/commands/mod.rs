pub mod logging;
pub mod site;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    ColorChoice, Command,
};

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    let command = Command::new("vestibule")
        .about("Session-aware route gate for a multilingual services site")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles);

    let command = site::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Locales;

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "vestibule");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some("Session-aware route gate for a multilingual services site".to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        temp_env::with_vars(
            [
                ("VESTIBULE_PORT", None::<&str>),
                ("VESTIBULE_LOCALES", None),
                ("VESTIBULE_LOG_LEVEL", None),
            ],
            || {
                let matches = new().get_matches_from(vec!["vestibule"]);
                let options = site::Options::parse(&matches);
                assert_eq!(options.port, 8080);
                assert_eq!(options.locales, Locales::default());
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(0)
                );
            },
        );
    }

    #[test]
    fn test_check_args() {
        let matches = new().get_matches_from(vec![
            "vestibule",
            "--port",
            "3000",
            "--locales",
            "en,fr,ar",
        ]);
        let options = site::Options::parse(&matches);
        assert_eq!(options.port, 3000);
        assert_eq!(options.locales.to_string(), "en,fr,ar");
        assert_eq!(options.locales.default_locale(), "en");
    }

    #[test]
    fn test_rejects_bad_locales() {
        let result = new().try_get_matches_from(vec!["vestibule", "--locales", "fr,../etc"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("VESTIBULE_PORT", Some("443")),
                ("VESTIBULE_LOCALES", Some("en")),
                ("VESTIBULE_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["vestibule"]);
                let options = site::Options::parse(&matches);
                assert_eq!(options.port, 443);
                assert_eq!(options.locales.to_string(), "en");
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, level) in levels.iter().enumerate() {
            temp_env::with_vars([("VESTIBULE_LOG_LEVEL", Some(*level))], || {
                let matches = new().get_matches_from(vec!["vestibule"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        for index in 0..5usize {
            temp_env::with_vars([("VESTIBULE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["vestibule".to_string()];
                if index > 0 {
                    args.push(format!("-{}", "v".repeat(index)));
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
