//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Default development server port.
pub const DEFAULT_PORT: u16 = 9356;

/// Cadence static blog generator CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new site skeleton and run the config wizard
    Init {
        /// Site directory (default: current directory)
        path: Option<PathBuf>,
    },

    /// Edit the site manifest interactively
    Config {
        /// Site directory (default: current directory)
        path: Option<PathBuf>,
    },

    /// Create a new post or page stub in the current site
    New {
        /// What kind of file to create
        kind: FileKind,

        /// Title of the new post or page
        title: String,

        /// Open the created file(s) in the default editor
        #[arg(long)]
        open: bool,
    },

    /// Build the site once into `public/`
    Build {
        /// Site directory (default: current directory)
        path: Option<PathBuf>,
    },

    /// Build, serve, and rebuild + reload on change
    Run {
        /// Site directory (default: current directory)
        path: Option<PathBuf>,

        /// Port for the development server
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,

        /// Open the site in the default browser
        #[arg(long)]
        open: bool,
    },
}

/// Content kinds `cadence new` can create.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Post,
    Page,
}

impl FileKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "post",
            Self::Page => "page",
        }
    }
}
