//! Root CLI structure for jackal-rs

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "jackal-rs")]
#[command(about = "Command-line tools for JKL skinned models and static meshes", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Skinned model operations
    Model {
        #[command(subcommand)]
        command: crate::commands::model::ModelCommands,
    },

    /// Static mesh operations
    Static {
        #[command(subcommand)]
        command: crate::commands::static_mesh::StaticCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
