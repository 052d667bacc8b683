//! Configuration loading for the CLI.
//!
//! Configuration flags are written before the subcommand
//! (`sift --log-filter debug run ...`). They are split off here and handed to
//! `ortho_config`, while the remaining tokens go to the command parser.

use std::ffi::{OsStr, OsString};

use ortho_config::OrthoConfig;
use sift_config::Config;

use crate::errors::AppError;

/// Configuration flags recognised by [`Config`], with whether each one takes
/// a value.
pub(crate) const CONFIG_CLI_FLAGS: &[(&str, bool)] = &[
    ("--config-path", true),
    ("--log-filter", true),
    ("--log-format", true),
    ("--match-limit", true),
    ("--defer-unknown-predicates", false),
];

pub(crate) trait ConfigLoader {
    /// Loads configuration from the program name followed by configuration
    /// flags.
    fn load(&self, args: &[OsString]) -> Result<Config, AppError>;
}

/// Loads configuration from every layer through `ortho_config`.
pub(crate) struct OrthoConfigLoader;

impl ConfigLoader for OrthoConfigLoader {
    fn load(&self, args: &[OsString]) -> Result<Config, AppError> {
        Config::load_from_iter(args.iter().cloned()).map_err(AppError::LoadConfiguration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn process_config_flag(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let mut parts = text.splitn(2, '=');
    let flag = parts.next().unwrap_or_default();
    let has_inline_value = parts.next().is_some();

    CONFIG_CLI_FLAGS
        .iter()
        .find(|(known, _)| *known == flag)
        .map_or(FlagAction::Stop, |&(_, takes_value)| FlagAction::Include {
            needs_value: takes_value && !has_inline_value,
        })
}

/// Arguments split into the configuration prefix and the command tokens.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct ConfigArgumentSplit {
    /// Program name followed by configuration flags and their values.
    pub(crate) config_arguments: Vec<OsString>,
    /// Program name followed by the subcommand and its arguments.
    pub(crate) command_arguments: Vec<OsString>,
}

/// Splits `args` at the first token that is not a configuration flag or the
/// value of one.
pub(crate) fn split_config_arguments(args: &[OsString]) -> ConfigArgumentSplit {
    let Some((program, rest)) = args.split_first() else {
        return ConfigArgumentSplit::default();
    };

    let mut config_arguments = vec![program.clone()];
    let mut tokens = rest.iter().peekable();
    while let Some(token) = tokens.peek() {
        match process_config_flag(token) {
            FlagAction::Stop => break,
            FlagAction::Include { needs_value } => {
                config_arguments.extend(tokens.next().cloned());
                if needs_value {
                    config_arguments.extend(tokens.next().cloned());
                }
            }
        }
    }

    let mut command_arguments = vec![program.clone()];
    command_arguments.extend(tokens.cloned());
    ConfigArgumentSplit {
        config_arguments,
        command_arguments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("--log-filter=debug", FlagAction::Include { needs_value: false })]
    #[case("--log-filter", FlagAction::Include { needs_value: true })]
    #[case("--defer-unknown-predicates", FlagAction::Include { needs_value: false })]
    #[case("run", FlagAction::Stop)]
    #[case("--unknown", FlagAction::Stop)]
    fn flags_are_classified(#[case] argument: &str, #[case] expected: FlagAction) {
        assert_eq!(process_config_flag(OsStr::new(argument)), expected);
    }

    #[test]
    fn configuration_prefix_is_split_from_the_command() {
        let split = split_config_arguments(&os(&[
            "sift",
            "--match-limit",
            "4",
            "--log-format=json",
            "run",
            "--query",
            "q.scm",
            "src.rs",
        ]));

        assert_eq!(
            split.config_arguments,
            os(&["sift", "--match-limit", "4", "--log-format=json"])
        );
        assert_eq!(
            split.command_arguments,
            os(&["sift", "run", "--query", "q.scm", "src.rs"])
        );
    }

    #[test]
    fn flags_after_the_subcommand_stay_with_it() {
        let split = split_config_arguments(&os(&["sift", "tree", "--log-filter", "x", "a.rs"]));

        assert_eq!(split.config_arguments, os(&["sift"]));
        assert_eq!(
            split.command_arguments,
            os(&["sift", "tree", "--log-filter", "x", "a.rs"])
        );
    }

    #[test]
    fn empty_arguments_split_into_nothing() {
        assert_eq!(split_config_arguments(&[]), ConfigArgumentSplit::default());
    }
}
