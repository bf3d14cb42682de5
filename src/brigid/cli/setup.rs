use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "brigid", bin_name = "brigid", version)]
#[command(about = "Command line client for the Brigid software and release catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true, help_heading = "Options")]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true, help_heading = "Options")]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Work with Software objects
    #[command(subcommand, display_order = 1)]
    Software(SoftwareCommands),

    /// Work with Release objects
    #[command(subcommand, display_order = 2)]
    Releases(ReleaseCommands),

    /// Print the evaluated settings as JSON
    #[command(display_order = 3)]
    Settings,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ListDisplay {
    #[default]
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum DetailDisplay {
    #[default]
    Template,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum SoftwareCommands {
    /// List Software objects, possibly with filters
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Render method for the results
        #[arg(long, value_enum, default_value_t = ListDisplay::Table)]
        display: ListDisplay,

        /// Limit paged list requests to this number of items
        #[arg(long, default_value_t = 100)]
        limit: u32,

        /// Filter results by name
        #[arg(long)]
        name: Option<String>,

        /// Filter results by machine_name
        #[arg(long)]
        machine_name: Option<String>,

        /// Filter results by author username
        #[arg(long)]
        author_username: Option<String>,
    },

    /// Get a single Software object
    #[command(display_order = 2)]
    Retrieve {
        /// Software.id or Software.machine_name
        identifier: String,

        /// Render method for the object
        #[arg(long, value_enum, default_value_t = DetailDisplay::Template)]
        display: DetailDisplay,
    },

    /// Create a Software object from a JSON or YAML file
    #[command(display_order = 3)]
    Create {
        /// File holding the new object's fields
        file: PathBuf,
    },

    /// Update attributes of a Software object
    #[command(display_order = 4)]
    Update {
        /// Software.id or Software.machine_name
        identifier: String,

        /// Set Software.name
        #[arg(long)]
        name: Option<String>,

        /// Set Software.trello_board_url
        #[arg(long)]
        trello_board_url: Option<String>,

        /// Set Software.documentation_url
        #[arg(long)]
        documentation_url: Option<String>,

        /// Set any other field (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        set: Vec<(String, String)>,
    },

    /// Delete a Software object
    #[command(alias = "rm", display_order = 5)]
    Delete {
        /// Software.id or Software.machine_name
        identifier: String,
    },

    /// Import a Software object from its git repository
    #[command(display_order = 6)]
    Import {
        /// URL of the upstream git repository
        url: String,
    },

    /// Re-sync a Software object from its upstream git provider
    #[command(display_order = 7)]
    Sync {
        /// Software.id or Software.machine_name
        identifier: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ReleaseCommands {
    /// List Release objects, possibly with filters
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Render method for the results
        #[arg(long, value_enum, default_value_t = ListDisplay::Table)]
        display: ListDisplay,

        /// Limit paged list requests to this number of items
        #[arg(long, default_value_t = 100)]
        limit: u32,

        /// Filter results by the software's machine_name
        #[arg(long)]
        software_machine_name: Option<String>,

        /// Filter results by the software's id
        #[arg(long)]
        software_id: Option<i64>,

        /// Filter results by version
        #[arg(long = "version", value_name = "VERSION")]
        release_version: Option<String>,

        /// Only releases made after this time (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_timestamp)]
        released_after: Option<DateTime<Utc>>,

        /// Only releases made before this time (RFC 3339 or YYYY-MM-DD)
        #[arg(long, value_parser = parse_timestamp)]
        released_before: Option<DateTime<Utc>>,
    },

    /// Get a single Release object
    #[command(display_order = 2)]
    Retrieve {
        /// Release.id or "{Software.machine_name}:{Release.version}"
        identifier: String,

        /// Render method for the object
        #[arg(long, value_enum, default_value_t = DetailDisplay::Template)]
        display: DetailDisplay,
    },

    /// Create a Release object from a JSON or YAML file
    #[command(display_order = 3)]
    Create {
        /// File holding the new object's fields
        file: PathBuf,
    },

    /// Update attributes of a Release object
    #[command(display_order = 4)]
    Update {
        /// Release.id or "{Software.machine_name}:{Release.version}"
        identifier: String,

        /// Set Release.sha
        #[arg(long)]
        sha: Option<String>,

        /// Set Release.changelog
        #[arg(long)]
        changelog: Option<String>,

        /// Set any other field (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        set: Vec<(String, String)>,
    },

    /// Delete a Release object
    #[command(alias = "rm", display_order = 5)]
    Delete {
        /// Release.id or "{Software.machine_name}:{Release.version}"
        identifier: String,
    },

    /// Import one tagged release of a Software from its git repository
    #[command(display_order = 6)]
    Import {
        /// Software.id or Software.machine_name
        software: String,

        /// Version tag, like 1.2.3
        version: String,
    },

    /// Import every tagged release of a Software
    #[command(name = "import-all", display_order = 7)]
    ImportAll {
        /// Software.id or Software.machine_name
        software: String,
    },

    /// Re-sync a Release object from its upstream git provider
    #[command(display_order = 8)]
    Sync {
        /// Release.id or "{Software.machine_name}:{Release.version}"
        identifier: String,
    },
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`.
/// Values without an offset are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(ts.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
        .ok_or_else(|| format!("\"{}\" is not a timestamp (try 2021-06-01 or RFC 3339)", raw))
}

pub fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got \"{}\"", raw)),
    }
}

/// Initializes `env_logger` on stderr. `RUST_LOG` takes precedence over the flags.
pub fn init_logging(verbose: u8, debug: bool) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log_level(verbose, debug))
        .format_timestamp(None)
        .target(env_logger::Target::Stderr)
        .parse_default_env();
    let _ = builder.try_init();
}

fn log_level(verbose: u8, debug: bool) -> LevelFilter {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if debug {
        level.max(LevelFilter::Debug)
    } else {
        level
    }
}
