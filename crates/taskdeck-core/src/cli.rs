use std::ffi::OsString;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::anyhow;
use clap::{ArgAction, Args, Parser, Subcommand};
use taskdeck_shared::{TaskField, TaskPriority, TaskStatus};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct PreprocessedArgs {
    pub cleaned_args: Vec<OsString>,
    pub rc_overrides: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct KeyVal {
    pub key: String,
    pub value: String,
}

impl std::str::FromStr for KeyVal {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, v) = s
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got: {s}"))?;
        Ok(Self {
            key: k.trim().to_string(),
            value: v.trim().to_string(),
        })
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "taskdeck",
    version,
    about = "Taskdeck: terminal client for the task board API",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_parser = clap::builder::ValueParser::new(|s: &str| s.parse::<KeyVal>()),
        action = ArgAction::Append
    )]
    pub rc_overrides: Vec<KeyVal>,

    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    #[arg(long = "api-url")]
    pub api_url: Option<String>,

    #[arg(long = "token")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl GlobalCli {
    /// `--api-url` / `--token` expressed as config overrides.
    pub fn flag_overrides(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(url) = &self.api_url {
            out.push(("api.url".to_string(), url.clone()));
        }
        if let Some(token) = &self.token {
            out.push(("api.token".to_string(), token.clone()));
        }
        out
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List your tasks.
    List,
    /// Show one task.
    Show { id: String },
    /// Create a task.
    Add(DraftArgs),
    /// Edit a task; unspecified fields keep their current value.
    Edit {
        id: String,
        #[command(flatten)]
        fields: DraftArgs,
    },
    /// Flip a task between complete and incomplete.
    Toggle { id: String },
    /// Delete a task.
    Delete { id: String },
}

#[derive(Args, Debug, Clone, Default, PartialEq)]
pub struct DraftArgs {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, value_parser = parse_status)]
    pub status: Option<TaskStatus>,

    #[arg(long, short = 'p', value_parser = parse_priority)]
    pub priority: Option<TaskPriority>,
}

impl DraftArgs {
    /// Field edits in form order, only for flags that were given.
    pub fn edits(&self) -> Vec<(TaskField, String)> {
        let mut edits = Vec::new();
        if let Some(title) = &self.title {
            edits.push((TaskField::Title, title.clone()));
        }
        if let Some(description) = &self.description {
            edits.push((TaskField::Description, description.clone()));
        }
        if let Some(status) = self.status {
            edits.push((TaskField::Status, status.as_str().to_string()));
        }
        if let Some(priority) = self.priority {
            edits.push((TaskField::Priority, priority.as_str().to_string()));
        }
        edits
    }
}

fn parse_status(s: &str) -> Result<TaskStatus, String> {
    s.to_ascii_lowercase().parse()
}

fn parse_priority(s: &str) -> Result<TaskPriority, String> {
    let mut chars = s.chars();
    let normalized = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    };
    normalized.parse()
}

pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

/// Pulls `rc.key=value` / `rc.key:value` words out of the argument list.
#[tracing::instrument(skip_all)]
pub fn preprocess_args(raw: &[OsString]) -> anyhow::Result<PreprocessedArgs> {
    let mut cleaned = Vec::with_capacity(raw.len());
    let mut overrides: Vec<(String, String)> = Vec::new();

    let mut iter = raw.iter().cloned();
    if let Some(bin) = iter.next() {
        cleaned.push(bin);
    }

    for arg in iter {
        let s = arg.to_string_lossy();
        if let Some(rest) = s.strip_prefix("rc.") {
            let parsed = if let Some((k, v)) = rest.split_once('=') {
                Some((format!("rc.{k}"), v.to_string()))
            } else if let Some((k, v)) = rest.split_once(':') {
                Some((format!("rc.{k}"), v.to_string()))
            } else {
                None
            };

            if let Some((k, v)) = parsed {
                debug!(key = %k, "captured positional rc override");
                overrides.push((k, v));
                continue;
            }
        }

        cleaned.push(arg);
    }

    Ok(PreprocessedArgs {
        cleaned_args: cleaned,
        rc_overrides: overrides,
    })
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use clap::Parser;
    use taskdeck_shared::{TaskField, TaskPriority, TaskStatus};

    use super::{Command, DraftArgs, GlobalCli, preprocess_args};

    fn args(words: &[&str]) -> Vec<OsString> {
        words.iter().map(OsString::from).collect()
    }

    #[test]
    fn positional_rc_overrides_are_extracted() {
        let pre = preprocess_args(&args(&["taskdeck", "rc.color=off", "list", "rc.api.timeout:5"]))
            .expect("preprocess");
        assert_eq!(pre.cleaned_args, args(&["taskdeck", "list"]));
        assert_eq!(
            pre.rc_overrides,
            vec![
                ("rc.color".to_string(), "off".to_string()),
                ("rc.api.timeout".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn edit_flags_parse_case_insensitively() {
        let cli = GlobalCli::try_parse_from([
            "taskdeck", "edit", "t1", "--status", "Complete", "--priority", "high",
        ])
        .expect("parse");
        assert_eq!(
            cli.command,
            Some(Command::Edit {
                id: "t1".to_string(),
                fields: DraftArgs {
                    status: Some(TaskStatus::Complete),
                    priority: Some(TaskPriority::High),
                    ..DraftArgs::default()
                },
            })
        );
    }

    #[test]
    fn draft_edits_only_include_given_flags() {
        let draft = DraftArgs {
            description: Some("write it".to_string()),
            priority: Some(TaskPriority::Low),
            ..DraftArgs::default()
        };
        assert_eq!(
            draft.edits(),
            vec![
                (TaskField::Description, "write it".to_string()),
                (TaskField::Priority, "Low".to_string()),
            ]
        );
    }

    #[test]
    fn connection_flags_become_overrides() {
        let cli = GlobalCli::try_parse_from(["taskdeck", "--api-url", "http://h/api", "--token", "t", "list"])
            .expect("parse");
        assert_eq!(cli.flag_overrides().len(), 2);
        assert_eq!(cli.command, Some(Command::List));
    }
}
