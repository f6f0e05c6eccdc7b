//! Command-line configuration
//!
//! ```text
//! stackwiz [--network bitcoin|liquid] [--version segwit|tapscript]
//!          [--tx template.json] [--check] [STACK_FILE [WITNESS_FILE]]
//! ```

use crate::vm::{Network, ScriptVersion, VmConfig};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub vm: VmConfig,
    pub tx_path: Option<PathBuf>,
    /// Evaluate once, print the snapshots and exit
    pub check: bool,
    pub stack_file: Option<PathBuf>,
    pub witness_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    HelpRequested,
    MissingValue { flag: String },
    InvalidValue { flag: String, value: String },
    UnknownFlag { flag: String },
    UnexpectedArgument { arg: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HelpRequested => write!(f, "help requested"),
            ConfigError::MissingValue { flag } => write!(f, "{} needs a value", flag),
            ConfigError::InvalidValue { flag, value } => {
                write!(f, "invalid value '{}' for {}", value, flag)
            }
            ConfigError::UnknownFlag { flag } => write!(f, "unknown option '{}'", flag),
            ConfigError::UnexpectedArgument { arg } => {
                write!(f, "unexpected argument '{}'", arg)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub fn usage(program_name: &str) -> String {
    format!(
        "Usage: {} [--network bitcoin|liquid] [--version segwit|tapscript] \
         [--tx template.json] [--check] [STACK_FILE [WITNESS_FILE]]\n\
         \n\
         Options:\n\
         \x20 --network   rule set to evaluate with (default: bitcoin)\n\
         \x20 --version   script version (default: segwit)\n\
         \x20 --tx        transaction template JSON for locktime and introspection opcodes\n\
         \x20 --check     evaluate once, print every line's stack and exit\n\
         \x20 -h, --help  show this message",
        program_name
    )
}

impl Config {
    /// Parse arguments, excluding the program name
    pub fn from_args<I>(args: I) -> Result<Config, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Err(ConfigError::HelpRequested),
                "--check" => config.check = true,
                "--network" | "-n" => {
                    let value = value_of(&arg, args.next())?;
                    config.vm.network = value
                        .parse::<Network>()
                        .map_err(|_| invalid(&arg, &value))?;
                }
                "--version" | "-v" => {
                    let value = value_of(&arg, args.next())?;
                    config.vm.version = value
                        .parse::<ScriptVersion>()
                        .map_err(|_| invalid(&arg, &value))?;
                }
                "--tx" => {
                    let value = value_of(&arg, args.next())?;
                    config.tx_path = Some(PathBuf::from(value));
                }
                flag if flag.starts_with('-') && flag.len() > 1 => {
                    return Err(ConfigError::UnknownFlag {
                        flag: flag.to_string(),
                    })
                }
                _ if config.stack_file.is_none() => config.stack_file = Some(PathBuf::from(arg)),
                _ if config.witness_file.is_none() => {
                    config.witness_file = Some(PathBuf::from(arg))
                }
                _ => return Err(ConfigError::UnexpectedArgument { arg }),
            }
        }

        Ok(config)
    }
}

fn value_of(flag: &str, value: Option<String>) -> Result<String, ConfigError> {
    value.ok_or_else(|| ConfigError::MissingValue {
        flag: flag.to_string(),
    })
}

fn invalid(flag: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        flag: flag.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config, ConfigError> {
        Config::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.vm, VmConfig::default());
        assert!(!config.check);
        assert!(config.stack_file.is_none());
    }

    #[test]
    fn test_full_command_line() {
        let config = parse(&[
            "--network",
            "liquid",
            "--version",
            "tapscript",
            "--tx",
            "tx.json",
            "--check",
            "stack.txt",
            "witness.txt",
        ])
        .unwrap();

        assert_eq!(
            config.vm,
            VmConfig::new(Network::Liquid, ScriptVersion::Tapscript)
        );
        assert_eq!(config.tx_path, Some(PathBuf::from("tx.json")));
        assert!(config.check);
        assert_eq!(config.stack_file, Some(PathBuf::from("stack.txt")));
        assert_eq!(config.witness_file, Some(PathBuf::from("witness.txt")));
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse(&["--network"]),
            Err(ConfigError::MissingValue {
                flag: "--network".to_string()
            })
        );
        assert!(matches!(
            parse(&["--network", "dogecoin"]),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            parse(&["--verbose"]),
            Err(ConfigError::UnknownFlag { .. })
        ));
        assert!(matches!(
            parse(&["a", "b", "c"]),
            Err(ConfigError::UnexpectedArgument { .. })
        ));
        assert_eq!(parse(&["-h"]), Err(ConfigError::HelpRequested));
    }
}
