use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the metadata declared by a package description
    #[command(arg_required_else_help = true)]
    #[clap(name = "inspect", visible_alias = "show")]
    Inspect {
        /// Path to the metadata document
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Check that a package description parses and satisfies the schema
    #[command(arg_required_else_help = true)]
    Validate {
        /// Path to the metadata document
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },

    /// Evaluate declared dependencies and conflicts against installed versions
    #[command(arg_required_else_help = true)]
    Check {
        /// Path to the metadata document
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        file: PathBuf,

        /// Installed packages as NAME=VERSION pairs
        #[arg(required = false, value_parser = parse_installed)]
        installed: Vec<(String, String)>,
    },
}

fn parse_installed(spec: &str) -> Result<(String, String), String> {
    match spec.split_once('=') {
        Some((name, version)) if !name.is_empty() && !version.is_empty() => {
            Ok((name.to_string(), version.to_string()))
        }
        _ => Err(format!("'{spec}' is not a NAME=VERSION pair")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_version_pairs() {
        assert_eq!(
            parse_installed("base=1.2.3").unwrap(),
            ("base".to_string(), "1.2.3".to_string())
        );
    }

    #[test]
    fn rejects_malformed_pairs() {
        assert!(parse_installed("base").is_err());
        assert!(parse_installed("=1.0").is_err());
        assert!(parse_installed("base=").is_err());
    }
}
