//! Command-line surface.

use clap::Parser;
use iwatch_core::{CommandSpec, HighlightMode};
use std::path::PathBuf;

/// Watch a program with update and highlight.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "iwatch", version, about, long_about = None)]
pub struct Cli {
    /// Seconds between refreshes
    #[arg(short = 'i', value_name = "SECONDS", value_parser = clap::value_parser!(u32).range(1..))]
    pub interval: Option<u32>,

    /// Highlight changed characters
    #[arg(short = 'r', overrides_with_all = ["word_mode", "line_mode"])]
    pub char_mode: bool,

    /// Highlight changed words
    #[arg(short = 'w', overrides_with_all = ["char_mode", "line_mode"])]
    pub word_mode: bool,

    /// Highlight changed lines
    #[arg(short = 'e', overrides_with_all = ["char_mode", "word_mode"])]
    pub line_mode: bool,

    /// Start with timed refreshes paused
    #[arg(short = 'p')]
    pub paused: bool,

    /// First output line shown
    #[arg(short = 's', value_name = "LINE", default_value_t = 0)]
    pub start_line: usize,

    /// First output column shown
    #[arg(short = 'c', value_name = "COLUMN", default_value_t = 0)]
    pub start_column: usize,

    /// Path to config file (YAML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Command to run, with its arguments
    #[arg(
        value_name = "COMMAND",
        required_unless_present = "dump_config",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub command: Vec<String>,
}

impl Cli {
    /// Highlight mode chosen on the command line, if any.
    pub fn highlight_mode(&self) -> Option<HighlightMode> {
        if self.char_mode {
            Some(HighlightMode::Char)
        } else if self.word_mode {
            Some(HighlightMode::Word)
        } else if self.line_mode {
            Some(HighlightMode::Line)
        } else {
            None
        }
    }

    /// The watched command, if one was given.
    pub fn command_spec(&self) -> Option<CommandSpec> {
        CommandSpec::new(self.command.clone())
    }
}
