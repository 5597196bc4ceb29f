//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

use crate::core::BuildMode;

/// Static-site asset pipeline: SCSS, bundling, purging and hashed assets
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path; optional, defaults apply when missing
    #[arg(short = 'C', long, global = true, default_value = "pagepack.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build pages and assets into the output directory
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Start development server with hot reload
    #[command(visible_alias = "s")]
    Serve {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable file watching for auto-rebuild
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },
}

/// Shared build arguments for Build and Serve commands
#[derive(clap::Args, Debug, Clone)]
pub struct BuildArgs {
    /// Build mode (default: production for build, development for serve)
    #[arg(short, long, value_enum)]
    pub mode: Option<BuildMode>,

    /// Remove the output directory before writing
    #[arg(short, long)]
    pub clean: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_defaults() {
        let cli = Cli::try_parse_from(["pagepack", "build"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("pagepack.toml"));
        match cli.command {
            Commands::Build { build_args } => {
                assert_eq!(build_args.mode, None);
                assert!(!build_args.clean);
            }
            Commands::Serve { .. } => panic!("expected build"),
        }
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::try_parse_from([
            "pagepack", "serve", "--mode", "production", "-p", "3000", "--watch", "false", "-C",
            "site/pagepack.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("site/pagepack.toml"));
        match cli.command {
            Commands::Serve {
                build_args,
                port,
                watch,
                interface,
            } => {
                assert_eq!(build_args.mode, Some(BuildMode::Production));
                assert_eq!(port, Some(3000));
                assert_eq!(watch, Some(false));
                assert_eq!(interface, None);
            }
            Commands::Build { .. } => panic!("expected serve"),
        }
    }

    #[test]
    fn test_bare_watch_flag() {
        let cli = Cli::try_parse_from(["pagepack", "serve", "-w"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { watch: Some(true), .. }));
    }
}
