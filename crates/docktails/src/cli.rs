use clap::{ArgAction, Parser};

use crate::conf::TailConfig;

/// Tail the logs of every running Docker container in one terminal.
#[derive(Parser, Debug, Default)]
#[command(name = "docktails")]
#[command(about = "Follow logs from all running Docker containers, with colors")]
#[command(version)]
pub struct Cli {
    /// Pretty-print JSON found in log lines
    #[arg(long, value_name = "BOOL", action = ArgAction::Set, num_args = 0..=1, default_missing_value = "true")]
    pub json: Option<bool>,

    /// Only tail containers whose name starts with this prefix
    #[arg(long, value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// Path to a TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Flags take precedence over file and environment settings.
    pub fn apply(&self, config: &mut TailConfig) {
        if let Some(json) = self.json {
            config.pretty_json = json;
        }
        if let Some(prefix) = &self.prefix {
            config.name_prefix = prefix.clone();
        }
    }
}
