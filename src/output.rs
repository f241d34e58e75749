//! # Output Configuration
//!
//! This module controls how progress is printed: whether colors, glyphs and
//! spinners are used, and the [`Reporter`] that prints the per-module and
//! per-dependency progress lines. These lines are advisory output for humans,
//! not a machine-readable contract; diagnostics go through `log` instead.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::time::Duration;

/// Output configuration for controlling colors and emojis.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors, glyphs and spinners should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// # Arguments
    /// * `color_flag` - The value of the --color CLI flag: "always", "never", or "auto"
    ///
    /// In auto mode, colors are disabled if:
    /// - `NO_COLOR` environment variable is set (any value, including empty)
    /// - `CLICOLOR=0` is set
    /// - `TERM=dumb` is set
    /// - stdout is not a TTY (unless `CLICOLOR_FORCE=1`)
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    /// Detect whether color output is supported based on environment.
    fn detect_color_support() -> bool {
        // The presence of NO_COLOR (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    pub fn without_color() -> Self {
        Self { use_color: false }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns the appropriate string based on color configuration.
///
/// When colors are enabled, returns the emoji. When disabled, returns
/// the plain text alternative.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}

/// Prints progress for module fetches, cleans and dependency builds.
#[derive(Debug, Clone)]
pub struct Reporter {
    config: OutputConfig,
    quiet: bool,
}

impl Reporter {
    pub fn new(config: OutputConfig, quiet: bool) -> Self {
        Self { config, quiet }
    }

    /// A reporter that prints nothing.
    pub fn silent() -> Self {
        Self::new(OutputConfig::without_color(), true)
    }

    /// Announce a clone. On a color terminal a spinner runs until the
    /// returned handle is finished or dropped.
    pub fn clone_started(&self, url: &str) -> CloneProgress {
        if self.quiet {
            return CloneProgress {
                reporter: self.clone(),
                spinner: None,
            };
        }

        let spinner = if self.config.use_color {
            let spinner = ProgressBar::new_spinner();
            if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                spinner.set_style(spinner_style);
            }
            spinner.set_message(format!("Cloning: {url}"));
            spinner.enable_steady_tick(Duration::from_millis(100));
            Some(spinner)
        } else {
            println!("Cloning: {url}");
            None
        };

        CloneProgress {
            reporter: self.clone(),
            spinner,
        }
    }

    /// Report that a declared subpath was missing from the clone.
    pub fn subpath_skipped(&self, subpath: &str) {
        if !self.quiet {
            println!("{subpath} folder does not exist. Skipped.");
        }
    }

    /// Report that a module path was removed from the working tree.
    pub fn cleaned(&self, name: &str) {
        if !self.quiet {
            println!("Cleaned {name}");
        }
    }

    /// Report the target directory of a dependency build.
    pub fn dependency(&self, target: &str) {
        if !self.quiet {
            println!("..{target}");
        }
    }

    /// Close a dependency build's block of output.
    pub fn dependency_finished(&self) {
        if !self.quiet {
            println!();
        }
    }

    fn success_mark(&self) -> String {
        let mark = emoji(&self.config, "\u{2713}", "[ok]");
        if self.config.use_color {
            style(mark).green().to_string()
        } else {
            mark.to_string()
        }
    }
}

/// Handle for an in-flight clone started by [`Reporter::clone_started`].
#[derive(Debug)]
pub struct CloneProgress {
    reporter: Reporter,
    spinner: Option<ProgressBar>,
}

impl CloneProgress {
    /// Replace the clone line with the resolved revision and a success mark.
    pub fn finish(mut self, name: &str, revision: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
        if !self.reporter.quiet {
            println!("  Cloned: {name} ({revision})");
            println!("{}", self.reporter.success_mark());
        }
    }
}

impl Drop for CloneProgress {
    fn drop(&mut self) {
        // A failed clone must not leave the spinner ticking over the error.
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}
