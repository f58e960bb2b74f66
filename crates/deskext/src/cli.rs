//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Developer tooling for desktop extensions
#[derive(Parser, Debug)]
#[command(name = "deskext")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load an extension manifest and show what the host would accept
    Inspect {
        /// Extension directory containing manifest.json
        dir: PathBuf,

        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Print every id mapping between host and API names
    Mappings {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Load an extension, drive one control of each kind, then unload it
    Simulate {
        /// Extension directory containing manifest.json
        dir: PathBuf,
    },

    /// Show version information
    Version,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_inspect() {
        let cli = Cli::parse_from(["deskext", "inspect", "ext/depth", "--json"]);
        match cli.command {
            Commands::Inspect { dir, json } => {
                assert_eq!(dir, PathBuf::from("ext/depth"));
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
