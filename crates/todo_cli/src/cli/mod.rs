use clap::{Parser, Subcommand};
use todo_core::config::{ConfigOverrides, canonicalize_key};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // None starts an interactive session.
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit the composer: adds a task, or saves the task being edited
    ///
    /// Example: todo add "Buy milk" --due 2025-01-02
    #[command(alias = "submit")]
    Add {
        text: Option<String>,
        /// Due date (YYYY-MM-DD or RFC3339)
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        /// Submit without a due date
        #[arg(long, conflicts_with = "due")]
        no_due: bool,
    },
    /// Edit a task; without TEXT or --due only loads it into the composer
    ///
    /// Example: todo edit k3j9x0a "Buy oat milk"
    Edit {
        id: String,
        text: Option<String>,
        #[arg(long, value_name = "DATE")]
        due: Option<String>,
        #[arg(long, conflicts_with = "due")]
        no_due: bool,
    },
    /// Toggle a task between pending and completed
    ///
    /// Example: todo done k3j9x0a
    Done { id: String },
    /// Delete a task
    ///
    /// Example: todo delete k3j9x0a --yes
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every task
    ///
    /// Example: todo clear
    Clear {
        #[arg(short, long)]
        yes: bool,
    },
    /// Choose which tasks are shown; without a value opens the filter menu
    ///
    /// Example: todo filter pending
    Filter { value: Option<String> },
    /// Show the task list
    ///
    /// Example: todo list --filter completed
    List {
        #[arg(long)]
        filter: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field = canonicalize_key(field);
    if canonical_field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    match canonical_field.as_str() {
        "theme" => {
            if remainder.is_some() {
                return Err("theme override cannot have subfields".to_string());
            }
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Theme,
                value,
            })
        }
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
        }
    }
    Ok(overrides)
}
