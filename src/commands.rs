//! CLI command definitions
//!
//! Defines the clap commands for the checkall CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full verification matrix
    Run {
        #[command(flatten)]
        selection: FeatureSelection,

        /// Path to the Cargo.toml of the project to verify
        #[arg(long)]
        manifest_path: Option<PathBuf>,

        /// Build tool to invoke (default: cargo)
        #[arg(long)]
        tool: Option<String>,

        /// Verify up to N configurations concurrently
        #[arg(long, short)]
        jobs: Option<usize>,

        /// Restrict the commands run per configuration (comma-separated,
        /// e.g. "check,clippy"); execution order is always check, clippy,
        /// build, test
        #[arg(long, value_delimiter = ',')]
        only: Vec<String>,

        /// Print the invocations without running anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the configurations that would be verified
    Plan {
        #[command(flatten)]
        selection: FeatureSelection,

        /// Path to the Cargo.toml of the project to verify
        #[arg(long)]
        manifest_path: Option<PathBuf>,
    },

    /// Print the features discovered in the project manifest
    Features {
        /// Path to the Cargo.toml of the project to verify
        #[arg(long)]
        manifest_path: Option<PathBuf>,

        /// Include features with a leading underscore
        #[arg(long)]
        hidden: bool,
    },
}

/// Where the feature list comes from: explicit flags beat the config
/// file, which beats manifest discovery.
#[derive(Args)]
pub struct FeatureSelection {
    /// Features to test (comma-separated, repeatable); overrides discovery
    #[arg(long, short = 'F', value_delimiter = ',')]
    pub features: Vec<String>,

    /// Features to exclude from the final feature list
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Include features with a leading underscore in discovery
    #[arg(long)]
    pub hidden: bool,
}
