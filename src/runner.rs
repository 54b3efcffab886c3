//! Verification driver
//!
//! Executes the configuration matrix against the external build tool.
//! Each configuration runs check, clippy, build and test in order; the
//! first non-zero exit status aborts that configuration's remaining
//! commands, and the sweep then moves on to the next configuration.

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;

use colored::Colorize;
use tokio::process::Command as TokioCommand;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::common::{Error, Result};
use crate::matrix::Configuration;
use crate::report::{ConfigOutcome, Outcome};

/// One verification step, in the fixed order they run per configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerificationCommand {
    Check,
    Clippy,
    Build,
    Test,
}

impl VerificationCommand {
    /// All commands, in execution order.
    pub const ALL: [VerificationCommand; 4] =
        [Self::Check, Self::Clippy, Self::Build, Self::Test];

    /// Subcommand verb passed to the build tool.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Clippy => "clippy",
            Self::Build => "build",
            Self::Test => "test",
        }
    }

    /// Whether the command exercises all build targets.
    ///
    /// `test --all-targets` skips doctests, so test runs without it.
    pub fn all_targets(self) -> bool {
        !matches!(self, Self::Test)
    }

    /// Parse a command name as given on the command line.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "check" => Ok(Self::Check),
            "clippy" => Ok(Self::Clippy),
            "build" => Ok(Self::Build),
            "test" => Ok(Self::Test),
            _ => Err(Error::UnknownCommand(s.to_string())),
        }
    }
}

impl fmt::Display for VerificationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Options controlling a matrix run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Build tool binary to invoke.
    pub tool: String,
    /// Manifest path forwarded to every invocation, when set.
    pub manifest_path: Option<PathBuf>,
    /// Commands run per configuration, in execution order.
    pub commands: Vec<VerificationCommand>,
    /// How many configurations to verify concurrently.
    pub jobs: usize,
    /// Print invocations without running them.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tool: "cargo".to_string(),
            manifest_path: None,
            commands: VerificationCommand::ALL.to_vec(),
            jobs: 1,
            dry_run: false,
        }
    }
}

/// The materialized command line for one (configuration, command) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Build the command line for running `command` under `configuration`.
    pub fn new(
        options: &RunOptions,
        command: VerificationCommand,
        configuration: &Configuration,
    ) -> Self {
        let mut args = vec![command.verb().to_string()];
        if command.all_targets() {
            args.push("--all-targets".to_string());
        }
        args.extend(configuration.flags());
        if let Some(path) = &options.manifest_path {
            args.push("--manifest-path".to_string());
            args.push(path.display().to_string());
        }
        Self {
            program: options.tool.clone(),
            args,
        }
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.program, self.args.join(" "))
    }
}

/// Progress of a single configuration through its command sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Running,
    Aborted(VerificationCommand),
}

/// Run the command sequence for one configuration.
///
/// The child inherits stdout/stderr; its exit status is the only signal
/// observed. Spawn failures are OS-level problems and fatal to the run.
async fn run_configuration(
    options: &RunOptions,
    configuration: &Configuration,
) -> Result<ConfigOutcome> {
    let mut progress = Progress::Running;
    let mut commands_run = 0;

    for &command in &options.commands {
        if matches!(progress, Progress::Aborted(_)) {
            break;
        }

        let invocation = Invocation::new(options, command, configuration);
        println!("{} {}", ">>".blue().bold(), invocation);

        if options.dry_run {
            continue;
        }

        tracing::debug!(%invocation, "spawning");
        let status = TokioCommand::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|error| Error::Spawn {
                command: invocation.to_string(),
                error,
            })?;

        commands_run += 1;
        if !status.success() {
            tracing::debug!(%invocation, code = ?status.code(), "command failed");
            progress = Progress::Aborted(command);
        }
    }

    let outcome = match progress {
        Progress::Running => Outcome::Passed,
        Progress::Aborted(command) => Outcome::Failed { command },
    };

    Ok(ConfigOutcome {
        configuration: configuration.clone(),
        commands_run,
        outcome,
    })
}

/// Execute the full verification matrix.
///
/// Configurations run in enumeration order; with `jobs > 1` up to that
/// many run concurrently, each keeping its own abort scope. The sweep
/// always completes regardless of how many configurations fail, and the
/// returned outcomes follow enumeration order.
pub async fn run_matrix(
    options: &RunOptions,
    configurations: &[Configuration],
) -> Result<Vec<ConfigOutcome>> {
    if options.jobs <= 1 {
        let mut outcomes = Vec::with_capacity(configurations.len());
        for configuration in configurations {
            outcomes.push(run_configuration(options, configuration).await?);
        }
        return Ok(outcomes);
    }

    let semaphore = Arc::new(Semaphore::new(options.jobs));
    let mut workers = JoinSet::new();

    for (index, configuration) in configurations.iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let options = options.clone();
        let configuration = configuration.clone();
        workers.spawn(async move {
            // Never closed while workers hold a reference.
            let _permit = semaphore.acquire().await.expect("semaphore closed");
            (index, run_configuration(&options, &configuration).await)
        });
    }

    let mut slots: Vec<Option<ConfigOutcome>> = configurations.iter().map(|_| None).collect();
    while let Some(joined) = workers.join_next().await {
        let (index, outcome) =
            joined.map_err(|e| Error::Internal(format!("worker panicked: {e}")))?;
        slots[index] = Some(outcome?);
    }

    Ok(slots.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_order_is_fixed() {
        let verbs: Vec<&str> = VerificationCommand::ALL.iter().map(|c| c.verb()).collect();
        assert_eq!(verbs, vec!["check", "clippy", "build", "test"]);
    }

    #[test]
    fn test_only_test_skips_all_targets() {
        assert!(VerificationCommand::Check.all_targets());
        assert!(VerificationCommand::Clippy.all_targets());
        assert!(VerificationCommand::Build.all_targets());
        assert!(!VerificationCommand::Test.all_targets());
    }

    #[test]
    fn test_parse_command_names() {
        assert_eq!(
            VerificationCommand::parse("clippy").unwrap(),
            VerificationCommand::Clippy
        );
        assert!(VerificationCommand::parse("lint").is_err());
    }

    #[test]
    fn test_invocation_command_line() {
        let options = RunOptions::default();
        let configuration =
            Configuration::FeatureSubset(vec!["a".to_string(), "b".to_string()]);

        let invocation =
            Invocation::new(&options, VerificationCommand::Check, &configuration);
        assert_eq!(invocation.program, "cargo");
        assert_eq!(
            invocation.args,
            vec![
                "check",
                "--all-targets",
                "--no-default-features",
                "--features",
                "a,b"
            ]
        );

        let invocation = Invocation::new(&options, VerificationCommand::Test, &configuration);
        assert_eq!(
            invocation.args,
            vec!["test", "--no-default-features", "--features", "a,b"]
        );
    }

    #[test]
    fn test_invocation_forwards_manifest_path() {
        let options = RunOptions {
            manifest_path: Some(PathBuf::from("crates/core/Cargo.toml")),
            ..RunOptions::default()
        };
        let invocation = Invocation::new(
            &options,
            VerificationCommand::Build,
            &Configuration::AllFeatures,
        );
        assert_eq!(
            invocation.args,
            vec![
                "build",
                "--all-targets",
                "--all-features",
                "--manifest-path",
                "crates/core/Cargo.toml"
            ]
        );
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;

        /// A fake build tool that logs its argv and fails on a pattern.
        fn fake_tool(dir: &Path, fail_case: Option<&str>) -> (String, PathBuf) {
            let log = dir.join("invocations.log");
            let fail = match fail_case {
                Some(pattern) => format!("case \"$*\" in {pattern}) exit 1 ;; esac\n"),
                None => String::new(),
            };
            let script = format!(
                "#!/bin/sh\necho \"$*\" >> \"{}\"\n{}exit 0\n",
                log.display(),
                fail
            );
            let path = dir.join("fake-cargo");
            fs::write(&path, script).expect("write fake tool");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
            (path.display().to_string(), log)
        }

        fn read_log(log: &Path) -> Vec<String> {
            fs::read_to_string(log)
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }

        #[tokio::test]
        async fn test_failure_aborts_configuration_only() {
            let dir = tempfile::tempdir().expect("temp dir");
            let (tool, log) = fake_tool(dir.path(), Some("check*\"--features a\""));

            let options = RunOptions {
                tool,
                ..RunOptions::default()
            };
            let configurations = vec![
                Configuration::FeatureSubset(vec!["a".to_string()]),
                Configuration::FeatureSubset(vec!["b".to_string()]),
            ];

            let outcomes = run_matrix(&options, &configurations).await.expect("run");

            assert_eq!(
                outcomes[0].outcome,
                Outcome::Failed {
                    command: VerificationCommand::Check
                }
            );
            assert_eq!(outcomes[0].commands_run, 1);
            assert_eq!(outcomes[1].outcome, Outcome::Passed);
            assert_eq!(outcomes[1].commands_run, 4);

            // Only the failing check ran for {a}; the full sequence ran for {b}.
            let lines = read_log(&log);
            assert_eq!(lines.len(), 5);
            assert_eq!(lines[0], "check --all-targets --no-default-features --features a");
            assert_eq!(lines[1], "check --all-targets --no-default-features --features b");
            assert_eq!(lines[4], "test --no-default-features --features b");
        }

        #[tokio::test]
        async fn test_concurrent_outcomes_keep_enumeration_order() {
            let dir = tempfile::tempdir().expect("temp dir");
            let (tool, _log) = fake_tool(dir.path(), None);

            let options = RunOptions {
                tool,
                jobs: 4,
                ..RunOptions::default()
            };
            let features: Vec<String> = vec!["a".to_string(), "b".to_string()];
            let configurations = crate::matrix::enumerate(&features);

            let outcomes = run_matrix(&options, &configurations).await.expect("run");

            assert_eq!(outcomes.len(), configurations.len());
            for (outcome, configuration) in outcomes.iter().zip(&configurations) {
                assert_eq!(&outcome.configuration, configuration);
                assert_eq!(outcome.outcome, Outcome::Passed);
            }
        }

        #[tokio::test]
        async fn test_dry_run_spawns_nothing() {
            let dir = tempfile::tempdir().expect("temp dir");
            let (tool, log) = fake_tool(dir.path(), None);

            let options = RunOptions {
                tool,
                dry_run: true,
                ..RunOptions::default()
            };
            let outcomes = run_matrix(&options, &[Configuration::AllFeatures])
                .await
                .expect("run");

            assert_eq!(outcomes[0].outcome, Outcome::Passed);
            assert_eq!(outcomes[0].commands_run, 0);
            assert!(read_log(&log).is_empty());
        }
    }
}
