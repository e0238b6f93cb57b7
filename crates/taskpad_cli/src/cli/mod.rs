use clap::{Parser, Subcommand};
use taskpad_core::config::{ConfigOverrides, canonical_key};
use taskpad_core::controller::EmptyEditPolicy;
use taskpad_core::error::AppError;
use taskpad_core::ids::IdStrategy;

/// In-memory task list. Commands are read from stdin, one per line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output JSON
    #[arg(long)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE")]
    pub config_override: Vec<String>,
}

/// One line typed into the session.
#[derive(Parser, Debug)]
#[command(
    name = "taskpad",
    no_binary_name = true,
    disable_version_flag = true,
    disable_help_subcommand = true
)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Replace the contents of the input box
    ///
    /// Example: type Buy milk
    Type {
        /// Rest of the line, verbatim (quote it to keep edge spaces)
        #[arg(default_value = "", hide_default_value = true, allow_hyphen_values = true)]
        text: String,
    },
    /// Press the add / confirm-edit button
    ///
    /// Example: submit
    Submit,
    /// Type TEXT and submit it in one step
    ///
    /// Example: add "Buy milk"
    Add {
        /// Rest of the line, verbatim
        #[arg(allow_hyphen_values = true)]
        text: String,
    },
    /// Load a task into the input box for editing
    ///
    /// Example: edit 1
    Edit {
        /// Task id, or position in the visible list
        target: String,
    },
    /// Abandon the current edit
    ///
    /// Example: cancel
    Cancel,
    /// Mark a task complete or incomplete
    ///
    /// Example: toggle 1
    Toggle {
        /// Task id, or position in the visible list
        target: String,
    },
    /// Delete a task
    ///
    /// Example: delete 1
    Delete {
        /// Task id, or position in the visible list
        target: String,
    },
    /// Filter the list by text (case-insensitive); no query clears it
    ///
    /// Example: search milk
    Search {
        /// Rest of the line, verbatim
        #[arg(default_value = "", hide_default_value = true, allow_hyphen_values = true)]
        query: String,
    },
    /// Show the tasks matching the current search
    ///
    /// Example: list
    List,
    /// Show the input box, edit state and search query
    ///
    /// Example: status
    Status,
}

/// First line of a clap error, without the `error: ` prefix.
pub fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

/// Splits off the first word; the remainder keeps its inner spacing.
pub fn split_first_word(line: &str) -> (&str, &str) {
    line.split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim_start()))
        .unwrap_or((line, ""))
}

/// Free-text commands take the rest of the line as typed, bypassing clap
/// so text such as `-h` or `--` reaches the controller. A remainder that is
/// one double-quoted string is unquoted.
pub fn parse_text_command(line: &str) -> Option<Result<Command, AppError>> {
    let (word, rest) = split_first_word(line);
    let text = unquote(rest);

    let command = match word {
        "type" => Command::Type { text },
        "search" => Command::Search { query: text },
        "add" if rest.is_empty() => {
            return Some(Err(AppError::invalid_input("add requires TEXT")));
        }
        "add" => Command::Add { text },
        _ => return None,
    };
    Some(Ok(command))
}

fn unquote(rest: &str) -> String {
    if rest.len() >= 2
        && rest.starts_with('"')
        && rest.ends_with('"')
        && let Ok(mut parts) = crate::session::split_command_line(rest)
        && parts.len() == 1
    {
        return parts.remove(0);
    }
    rest.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    EditPolicy,
    Ids,
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

    let canonical_field =
        canonical_key(field).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            return Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            });
        }
        "theme" => ConfigOverrideTarget::Theme,
        "edit_policy" => ConfigOverrideTarget::EditPolicy,
        "ids" => ConfigOverrideTarget::Ids,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if remainder.is_some() {
        return Err(format!("{canonical_field} override cannot have subfields"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Collects every `--config-override` argument into one override set.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, AppError> {
    let mut overrides = ConfigOverrides::default();

    for entry in raw {
        let parsed = parse_config_override(entry).map_err(AppError::invalid_input)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::EditPolicy => {
                let policy = EmptyEditPolicy::parse(&parsed.value).ok_or_else(|| {
                    AppError::invalid_input(format!("unknown edit policy '{}'", parsed.value))
                })?;
                overrides.edit_policy = Some(policy);
            }
            ConfigOverrideTarget::Ids => {
                let ids = IdStrategy::parse(&parsed.value).ok_or_else(|| {
                    AppError::invalid_input(format!("unknown id strategy '{}'", parsed.value))
                })?;
                overrides.ids = Some(ids);
            }
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
        }
    }

    Ok(overrides)
}
