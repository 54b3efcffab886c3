//! CLI command handling
//!
//! Resolves the feature list and run options from flags, the optional
//! config file and the project manifest, then drives enumeration and
//! the verification matrix.

use std::collections::HashSet;
use std::path::Path;

use colored::Colorize;

use crate::commands::{Commands, FeatureSelection};
use crate::common::config::Config;
use crate::common::{Error, Result};
use crate::runner::{RunOptions, VerificationCommand};
use crate::{manifest, matrix, report, runner};

/// Enumerating more features than this is a configuration mistake, not a
/// sweep anyone will wait for.
const MAX_FEATURES: usize = 20;

/// Dispatch a CLI command. Returns false when a sweep had failures.
pub async fn dispatch(command: Commands) -> Result<bool> {
    match command {
        Commands::Run {
            selection,
            manifest_path,
            tool,
            jobs,
            only,
            dry_run,
        } => {
            let config = Config::load()?;
            let resolved_manifest = manifest::resolve_manifest_path(manifest_path.clone());
            let features = resolve_features(&selection, &config, &resolved_manifest)?;

            let tool = tool.unwrap_or_else(|| config.tool.clone());
            if !dry_run {
                which::which(&tool).map_err(|_| Error::ToolNotFound(tool.clone()))?;
            }

            let commands = resolve_commands(&only)?;
            let jobs = jobs.unwrap_or(config.jobs).max(1);

            let configurations = matrix::enumerate(&features);
            println!(
                "{} {} features, {} configurations",
                "Verifying:".cyan().bold(),
                features.len(),
                configurations.len()
            );

            let options = RunOptions {
                tool,
                manifest_path,
                commands,
                jobs,
                dry_run,
            };
            let outcomes = runner::run_matrix(&options, &configurations).await?;

            if dry_run {
                return Ok(true);
            }
            Ok(report::print_summary(&outcomes))
        }

        Commands::Plan {
            selection,
            manifest_path,
        } => {
            let config = Config::load()?;
            let resolved_manifest = manifest::resolve_manifest_path(manifest_path);
            let features = resolve_features(&selection, &config, &resolved_manifest)?;

            for configuration in matrix::enumerate(&features) {
                println!("{configuration}");
            }
            Ok(true)
        }

        Commands::Features {
            manifest_path,
            hidden,
        } => {
            let path = manifest::resolve_manifest_path(manifest_path);
            let features = manifest::discover_features(&path, hidden)?;

            if features.is_empty() {
                println!("No features found in {}", path.display());
            } else {
                for feature in &features {
                    println!("{feature}");
                }
            }
            Ok(true)
        }
    }
}

/// Resolve the feature list: explicit flags, then the config file, then
/// manifest discovery; skip lists apply to whichever source won.
fn resolve_features(
    selection: &FeatureSelection,
    config: &Config,
    manifest_path: &Path,
) -> Result<Vec<String>> {
    let mut features = if !selection.features.is_empty() {
        selection.features.clone()
    } else if !config.features.is_empty() {
        config.features.clone()
    } else {
        manifest::discover_features(manifest_path, selection.hidden)?
    };

    let skip: HashSet<&String> = selection.skip.iter().chain(&config.skip).collect();
    features.retain(|f| !skip.contains(f));

    let mut seen = HashSet::new();
    for feature in &features {
        if !seen.insert(feature.clone()) {
            return Err(Error::DuplicateFeature(feature.clone()));
        }
    }

    if features.len() > MAX_FEATURES {
        return Err(Error::Config(format!(
            "{} features would enumerate {} configurations; refusing more than {MAX_FEATURES} features",
            features.len(),
            matrix::configuration_count(features.len()),
        )));
    }

    Ok(features)
}

/// Filter the fixed command sequence down to the `--only` selection,
/// preserving execution order.
fn resolve_commands(only: &[String]) -> Result<Vec<VerificationCommand>> {
    if only.is_empty() {
        return Ok(VerificationCommand::ALL.to_vec());
    }

    let selected = only
        .iter()
        .map(|s| VerificationCommand::parse(s))
        .collect::<Result<HashSet<_>>>()?;

    Ok(VerificationCommand::ALL
        .into_iter()
        .filter(|c| selected.contains(c))
        .collect())
}
