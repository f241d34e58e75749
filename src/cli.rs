//! CLI argument parsing and run setup

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

use quack::dependency::ChildProcess;
use quack::output::{OutputConfig, Reporter};
use quack::planner::{Engine, Invocation, RunSummary};
use quack::suggestions;

/// quack - Assemble a source tree from the profiles of a YAML manifest
#[derive(Parser, Debug)]
#[command(name = "quack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Manifest file, relative to the working root [default: quack.yaml]
    #[arg(short = 'y', long, value_name = "FILE", env = "QUACK_MANIFEST")]
    yaml: Option<String>,

    /// Profile to run [default: init]
    #[arg(short, long, value_name = "NAME", env = "QUACK_PROFILE")]
    profile: Option<String>,

    /// Working root (defaults to current directory)
    #[arg(short = 'C', long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Colorize output (always, never, auto)
    #[arg(long, value_name = "WHEN", default_value = "auto")]
    color: String,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Suppress progress output
    #[arg(short, long)]
    quiet: bool,

    /// Run dependency builds as separate quack processes
    #[arg(long)]
    isolated_deps: bool,
}

impl Cli {
    /// Run the selected profile
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level);

        let reporter = Reporter::new(OutputConfig::from_env_and_flag(&self.color), self.quiet);

        let root = match &self.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        if !root.is_dir() {
            return Err(suggestions::root_not_found(&root));
        }

        let invocation = Invocation {
            root,
            manifest: self.yaml.clone(),
            profile: self.profile.clone(),
        };
        let manifest_path = invocation.manifest_path();
        if !manifest_path.is_file() {
            return Err(suggestions::manifest_not_found(&manifest_path));
        }

        let mut engine = Engine::new(reporter);
        if self.isolated_deps {
            engine = engine.isolated(ChildProcess::current_exe()?.with_args(self.forwarded_args()));
        }

        let summary = engine.run(&invocation)?;
        report(&summary);
        Ok(())
    }

    /// Flags every child build inherits.
    fn forwarded_args(&self) -> Vec<String> {
        let mut args = vec![
            "--color".to_string(),
            self.color.clone(),
            "--log-level".to_string(),
            self.log_level.clone(),
            "--isolated-deps".to_string(),
        ];
        if self.quiet {
            args.push("--quiet".to_string());
        }
        args
    }
}

/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    // A second initialization (tests) is harmless.
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .try_init();
}

fn report(summary: &RunSummary) {
    let warnings = summary
        .dependencies
        .iter()
        .map(|outcome| outcome.warnings.len())
        .chain(summary.fetched.iter().map(|outcome| outcome.warnings.len()))
        .sum::<usize>();
    if warnings > 0 {
        warn!("Finished with {} cleanup warning(s)", warnings);
    }
    info!(
        "{} dependencies built, {} modules fetched, {} modules cleaned",
        summary.dependencies.len(),
        summary.fetched.len(),
        summary.cleaned.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["quack"]).unwrap();
        assert_eq!(cli.color, "auto");
        assert_eq!(cli.log_level, "warn");
        assert!(!cli.quiet);
        assert!(!cli.isolated_deps);
        assert!(cli.root.is_none());
    }

    #[test]
    fn test_short_flags() {
        let cli = Cli::try_parse_from(["quack", "-y", "build.yaml", "-p", "release", "-C", "/work", "-q"])
            .unwrap();
        assert_eq!(cli.yaml.as_deref(), Some("build.yaml"));
        assert_eq!(cli.profile.as_deref(), Some("release"));
        assert_eq!(cli.root, Some(PathBuf::from("/work")));
        assert!(cli.quiet);
    }

    #[test]
    fn test_forwarded_args() {
        let cli = Cli::try_parse_from(["quack", "--color", "never", "--quiet", "--isolated-deps"]).unwrap();
        assert_eq!(
            cli.forwarded_args(),
            vec!["--color", "never", "--log-level", "warn", "--isolated-deps", "--quiet"]
        );
    }

    #[test]
    fn test_missing_root_is_reported() {
        let cli = Cli::try_parse_from(["quack", "-C", "/definitely/not/here"]).unwrap();
        let error = cli.execute().unwrap_err();
        assert!(error.to_string().contains("Working root does not exist"));
    }

    #[test]
    fn test_missing_manifest_is_reported() {
        let temp = tempfile::TempDir::new().unwrap();
        let root = temp.path().to_string_lossy().to_string();
        let cli = Cli::try_parse_from(["quack", "-C", &root, "-y", "absent.yaml"]).unwrap();
        let error = cli.execute().unwrap_err();
        assert!(error.to_string().contains("Manifest not found"));
        assert!(error.to_string().contains("QUACK_MANIFEST"));
    }
}
