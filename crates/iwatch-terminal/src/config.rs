//! XDG-compliant configuration loading.
//!
//! An optional YAML file supplies defaults; command-line flags override it.

use crate::app::{TuiConfig, DEFAULT_TICK_RATE_MS};
use crate::cli::Cli;
use crate::error::WatchError;
use iwatch_core::{DisplayState, HighlightMode, DEFAULT_INTERVAL};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Contents of `config.yaml`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Seconds between refreshes.
    pub interval: Option<u32>,
    /// `none`, `char`, `word`, or `line`.
    pub highlight: Option<String>,
    /// Start paused.
    pub paused: Option<bool>,
    /// Longest single wait for input, in milliseconds.
    pub tick_rate_ms: Option<u64>,
}

impl FileConfig {
    /// Config paths to search, given the values of `XDG_CONFIG_HOME` and
    /// `HOME`.
    pub fn config_paths_from(xdg_config: Option<&str>, home: Option<&str>) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(xdg) = xdg_config.filter(|s| !s.is_empty()) {
            paths.push(PathBuf::from(xdg).join("iwatch/config.yaml"));
        }
        if let Some(home) = home.filter(|s| !s.is_empty()) {
            paths.push(PathBuf::from(home).join(".config/iwatch/config.yaml"));
        }
        paths
    }

    /// Get XDG-compliant config paths to search
    /// Order: `$XDG_CONFIG_HOME/iwatch/config.yaml`, `~/.config/iwatch/config.yaml`
    pub fn config_paths() -> Vec<PathBuf> {
        let xdg = std::env::var("XDG_CONFIG_HOME").ok();
        let home = std::env::var("HOME").ok();
        Self::config_paths_from(xdg.as_deref(), home.as_deref())
    }

    /// Parse and validate YAML text. `path` is only used in error messages.
    pub fn parse(contents: &str, path: &Path) -> Result<Self, WatchError> {
        let error = |message: String| WatchError::Config {
            path: path.to_path_buf(),
            message,
        };

        let blank = contents.lines().all(|line| {
            let line = line.trim();
            line.is_empty() || line.starts_with('#')
        });
        if blank {
            return Ok(Self::default());
        }

        let config: Self =
            serde_yaml_ng::from_str(contents).map_err(|e| error(e.to_string()))?;

        if config.interval == Some(0) {
            return Err(error("interval must be at least 1 second".into()));
        }
        if config.tick_rate_ms == Some(0) {
            return Err(error("tick_rate_ms must be positive".into()));
        }
        if let Some(name) = &config.highlight {
            if HighlightMode::from_name(name).is_none() {
                return Err(error(format!(
                    "unknown highlight mode {name:?} (expected none, char, word, or line)"
                )));
            }
        }
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self, WatchError> {
        let contents = fs::read_to_string(path).map_err(|e| WatchError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::parse(&contents, path)
    }

    /// Load the first config file found on the search path, falling back to
    /// defaults. Broken files are logged and skipped.
    pub fn load() -> Self {
        for path in Self::config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => return config,
                Err(e) => warn!(error = %e, "ignoring config file"),
            }
        }
        Self::default()
    }

    /// Validated highlight mode.
    pub fn highlight_mode(&self) -> Option<HighlightMode> {
        self.highlight.as_deref().and_then(HighlightMode::from_name)
    }

    /// Generate default configuration as YAML string
    pub fn default_yaml() -> String {
        format!(
            r"# iwatch configuration file
# Location: ~/.config/iwatch/config.yaml
# Command-line flags take precedence over these values.

# Seconds between refreshes
interval: {DEFAULT_INTERVAL}

# Initial highlight mode: none | char | word | line
highlight: none

# Start with timed refreshes paused
paused: false

# Longest single wait for input, in milliseconds
tick_rate_ms: {DEFAULT_TICK_RATE_MS}
"
        )
    }
}

/// Effective settings after merging the config file and the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Seconds between refreshes.
    pub interval: u32,
    /// Initial highlight mode.
    pub highlight: HighlightMode,
    /// Start paused.
    pub paused: bool,
    /// Input poll slice in milliseconds.
    pub tick_rate_ms: u64,
    /// Initial line offset.
    pub start_line: usize,
    /// Initial column offset.
    pub start_column: usize,
}

impl Settings {
    /// Command-line values win over file values, file values over defaults.
    pub fn resolve(cli: &Cli, file: &FileConfig) -> Self {
        Self {
            interval: cli.interval.or(file.interval).unwrap_or(DEFAULT_INTERVAL),
            highlight: cli
                .highlight_mode()
                .or_else(|| file.highlight_mode())
                .unwrap_or_default(),
            paused: cli.paused || file.paused.unwrap_or(false),
            tick_rate_ms: file.tick_rate_ms.unwrap_or(DEFAULT_TICK_RATE_MS),
            start_line: cli.start_line,
            start_column: cli.start_column,
        }
    }

    /// Initial display state.
    pub fn display_state(&self) -> DisplayState {
        DisplayState::new()
            .with_interval(self.interval)
            .with_highlight_mode(self.highlight)
            .with_paused(self.paused)
            .with_offsets(self.start_line, self.start_column)
    }

    /// Scheduler configuration.
    pub fn tui_config(&self) -> TuiConfig {
        TuiConfig {
            tick_rate_ms: self.tick_rate_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use iwatch_core::{MAXCOLUMN, MAXLINE};

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("iwatch").chain(args.iter().copied())).unwrap()
    }

    fn parse(yaml: &str) -> Result<FileConfig, WatchError> {
        FileConfig::parse(yaml, Path::new("test.yaml"))
    }

    #[test]
    fn test_config_paths_order() {
        let paths = FileConfig::config_paths_from(Some("/xdg"), Some("/home/u"));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("/xdg/iwatch/config.yaml"),
                PathBuf::from("/home/u/.config/iwatch/config.yaml"),
            ]
        );
    }

    #[test]
    fn test_config_paths_without_xdg() {
        let paths = FileConfig::config_paths_from(None, Some("/home/u"));
        assert_eq!(paths.len(), 1);
        assert!(FileConfig::config_paths_from(Some(""), None).is_empty());
    }

    #[test]
    fn test_default_yaml_parses_to_defaults() {
        let config = parse(&FileConfig::default_yaml()).unwrap();
        assert_eq!(config.interval, Some(DEFAULT_INTERVAL));
        assert_eq!(config.highlight_mode(), Some(HighlightMode::None));
        assert_eq!(config.paused, Some(false));
        assert_eq!(config.tick_rate_ms, Some(DEFAULT_TICK_RATE_MS));
    }

    #[test]
    fn test_partial_file() {
        let config = parse("highlight: word\n").unwrap();
        assert_eq!(config.highlight_mode(), Some(HighlightMode::Word));
        assert_eq!(config.interval, None);
    }

    #[test]
    fn test_empty_and_comment_only_files() {
        assert_eq!(parse("").unwrap(), FileConfig::default());
        assert_eq!(parse("# nothing here\n\n").unwrap(), FileConfig::default());
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = parse("interval: 0\n").unwrap_err();
        assert!(matches!(err, WatchError::Config { .. }));
    }

    #[test]
    fn test_rejects_unknown_mode() {
        let err = parse("highlight: sparkle\n").unwrap_err();
        assert!(err.to_string().contains("sparkle"));
    }

    #[test]
    fn test_rejects_unknown_field() {
        assert!(parse("colour: red\n").is_err());
    }

    #[test]
    fn test_rejects_malformed_yaml() {
        assert!(parse("interval: [1, 2\n").is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = FileConfig::load_from_file(Path::new("/nonexistent/iwatch.yaml")).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = parse("interval: 9\nhighlight: line\ntick_rate_ms: 50\n").unwrap();
        let settings = Settings::resolve(&cli(&["-i", "3", "-r", "date"]), &file);
        assert_eq!(settings.interval, 3);
        assert_eq!(settings.highlight, HighlightMode::Char);
        assert_eq!(settings.tick_rate_ms, 50);
    }

    #[test]
    fn test_file_fills_gaps() {
        let file = parse("interval: 9\nhighlight: line\npaused: true\n").unwrap();
        let settings = Settings::resolve(&cli(&["date"]), &file);
        assert_eq!(settings.interval, 9);
        assert_eq!(settings.highlight, HighlightMode::Line);
        assert!(settings.paused);
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::resolve(&cli(&["date"]), &FileConfig::default());
        assert_eq!(settings.interval, DEFAULT_INTERVAL);
        assert_eq!(settings.highlight, HighlightMode::None);
        assert!(!settings.paused);
        assert_eq!(settings.tui_config().tick_rate_ms, DEFAULT_TICK_RATE_MS);
    }

    #[test]
    fn test_display_state_clamps_offsets() {
        let settings = Settings::resolve(&cli(&["-s", "5000", "-c", "5000", "date"]), &FileConfig::default());
        let state = settings.display_state();
        assert_eq!(state.line_offset(), MAXLINE - 1);
        assert_eq!(state.column_offset(), MAXCOLUMN - 1);
    }
}
