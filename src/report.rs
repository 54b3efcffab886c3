//! Outcome aggregation
//!
//! The driver only curtails commands within a failing configuration; it
//! never produces a verdict for the sweep as a whole. This module records
//! what happened to each configuration and prints the final summary, so a
//! CI wrapper can key off a single exit code.

use colored::Colorize;

use crate::matrix::Configuration;
use crate::runner::VerificationCommand;

/// Terminal outcome of one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every command exited zero.
    Passed,
    /// This command exited non-zero; the rest were skipped.
    Failed { command: VerificationCommand },
}

/// What happened to one configuration during the sweep.
#[derive(Debug, Clone)]
pub struct ConfigOutcome {
    pub configuration: Configuration,
    /// Commands actually dispatched, including a failing one.
    pub commands_run: usize,
    pub outcome: Outcome,
}

impl ConfigOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Outcome::Passed)
    }
}

/// Print the per-configuration summary. Returns true when every
/// configuration passed.
pub fn print_summary(outcomes: &[ConfigOutcome]) -> bool {
    let failed = outcomes.iter().filter(|o| !o.passed()).count();

    println!("\n{}", "Summary:".cyan());
    for outcome in outcomes {
        match outcome.outcome {
            Outcome::Passed => {
                println!("  {} {}", "✓".green(), outcome.configuration);
            }
            Outcome::Failed { command } => {
                println!(
                    "  {} {} ({} failed)",
                    "✗".red(),
                    outcome.configuration,
                    command
                );
            }
        }
    }

    if failed == 0 {
        println!(
            "\n{} {}\n",
            "✓".green().bold(),
            format!("{} configurations passed", outcomes.len()).green().bold()
        );
        true
    } else {
        println!(
            "\n{} {}\n",
            "✗".red().bold(),
            format!("{failed} of {} configurations failed", outcomes.len())
                .red()
                .bold()
        );
        false
    }
}
