//! # CLI Dispatch
//!
//! The only place that knows about stdout and process-wide setup. Each handler calls
//! one `BrigidApi` method and renders what comes back; errors bubble up to `main`,
//! which prints them once and exits non-zero.
//!
//! - `run()`: parse, load settings, start logging, dispatch
//! - `http_client()` / `releases_client()`: the transport, with the group's timeout
//! - `init_context()`: wraps it in the API facade
//! - `handle_*()`: per-operation handlers shared by both resource groups

use super::render::{
    print_messages, render_detail, render_json, render_records_json, render_table, NO_RESULTS,
};
use super::setup::{
    init_logging, Cli, Commands, DetailDisplay, ListDisplay, ReleaseCommands, SoftwareCommands,
};
use brigid::api::BrigidApi;
use brigid::client::http::HttpClient;
use brigid::commands::list::{FilterValue, ListRequest};
use brigid::config::Settings;
use brigid::error::{BrigidError, Result};
use brigid::resources::{EndpointDescriptor, RELEASES, SOFTWARE};
use clap::Parser;
use console::Term;
use log::debug;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// `releases import-all` can run for minutes on the server.
const RELEASES_TIMEOUT: Duration = Duration::from_secs(300);

struct AppContext {
    api: BrigidApi<HttpClient>,
    use_color: bool,
    template_dir: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    if cli.no_color {
        colored::control::set_override(false);
    }
    let use_color = !cli.no_color && Term::stdout().features().colors_supported();

    let settings = Settings::load()?;
    init_logging(cli.verbose, settings.debug);
    debug!("API base URL: {}", settings.base_url);

    match cli.command {
        Commands::Settings => handle_settings(&settings),
        Commands::Software(cmd) => {
            let mut ctx = init_context(http_client(&settings), &settings, use_color);
            dispatch_software(&mut ctx, cmd)
        }
        Commands::Releases(cmd) => {
            let mut ctx = init_context(releases_client(&settings), &settings, use_color);
            dispatch_releases(&mut ctx, cmd)
        }
    }
}

fn http_client(settings: &Settings) -> HttpClient {
    HttpClient::new(&settings.base_url, settings.api_token.clone(), settings.timeout())
}

/// Same as [`http_client`], but never shorter than [`RELEASES_TIMEOUT`].
fn releases_client(settings: &Settings) -> HttpClient {
    let client = http_client(settings);
    let timeout = client.timeout().max(RELEASES_TIMEOUT);
    client.with_timeout(timeout)
}

fn init_context(client: HttpClient, settings: &Settings, use_color: bool) -> AppContext {
    debug!("Request timeout: {:?}", client.timeout());
    AppContext {
        api: BrigidApi::new(client),
        use_color,
        template_dir: settings.template_dir.clone(),
    }
}

fn dispatch_software(ctx: &mut AppContext, cmd: SoftwareCommands) -> Result<()> {
    match cmd {
        SoftwareCommands::List {
            display,
            limit,
            name,
            machine_name,
            author_username,
        } => {
            let request = list_request(
                limit,
                vec![
                    ("name", name.map(FilterValue::Text)),
                    ("machine_name", machine_name.map(FilterValue::Text)),
                    ("author_username", author_username.map(FilterValue::Text)),
                ],
            );
            handle_list(ctx, &SOFTWARE, display, &request)
        }
        SoftwareCommands::Retrieve {
            identifier,
            display,
        } => handle_retrieve(ctx, &SOFTWARE, &identifier, display),
        SoftwareCommands::Create { file } => handle_create(ctx, &SOFTWARE, &file),
        SoftwareCommands::Update {
            identifier,
            name,
            trello_board_url,
            documentation_url,
            set,
        } => {
            let fields = update_fields(
                vec![
                    ("name", name),
                    ("trello_board_url", trello_board_url),
                    ("documentation_url", documentation_url),
                ],
                set,
            );
            handle_update(ctx, &SOFTWARE, &identifier, &fields)
        }
        SoftwareCommands::Delete { identifier } => handle_delete(ctx, &SOFTWARE, &identifier),
        SoftwareCommands::Import { url } => {
            let result = ctx.api.import_software(&url)?;
            print_messages(&result.messages, ctx.use_color);
            Ok(())
        }
        SoftwareCommands::Sync { identifier } => handle_sync(ctx, &SOFTWARE, &identifier),
    }
}

fn dispatch_releases(ctx: &mut AppContext, cmd: ReleaseCommands) -> Result<()> {
    match cmd {
        ReleaseCommands::List {
            display,
            limit,
            software_machine_name,
            software_id,
            release_version,
            released_after,
            released_before,
        } => {
            let request = list_request(
                limit,
                vec![
                    (
                        "software_machine_name",
                        software_machine_name.map(FilterValue::Text),
                    ),
                    ("software_id", software_id.map(FilterValue::Integer)),
                    ("version", release_version.map(FilterValue::Text)),
                    ("released_after", released_after.map(FilterValue::Timestamp)),
                    ("released_before", released_before.map(FilterValue::Timestamp)),
                ],
            );
            handle_list(ctx, &RELEASES, display, &request)
        }
        ReleaseCommands::Retrieve {
            identifier,
            display,
        } => handle_retrieve(ctx, &RELEASES, &identifier, display),
        ReleaseCommands::Create { file } => handle_create(ctx, &RELEASES, &file),
        ReleaseCommands::Update {
            identifier,
            sha,
            changelog,
            set,
        } => {
            let fields = update_fields(vec![("sha", sha), ("changelog", changelog)], set);
            handle_update(ctx, &RELEASES, &identifier, &fields)
        }
        ReleaseCommands::Delete { identifier } => handle_delete(ctx, &RELEASES, &identifier),
        ReleaseCommands::Import { software, version } => {
            let result = ctx.api.import_release(&software, &version)?;
            print_messages(&result.messages, ctx.use_color);
            Ok(())
        }
        ReleaseCommands::ImportAll { software } => {
            let result = ctx.api.import_all_releases(&software)?;
            if !result.listed.is_empty() {
                println!("{}", render_table(&RELEASES, &result.listed));
            }
            print_messages(&result.messages, ctx.use_color);
            Ok(())
        }
        ReleaseCommands::Sync { identifier } => handle_sync(ctx, &RELEASES, &identifier),
    }
}

fn list_request(limit: u32, filters: Vec<(&str, Option<FilterValue>)>) -> ListRequest {
    ListRequest {
        filters: filters
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
            .collect(),
        limit,
        expand: None,
    }
}

/// Explicit flags first, in declaration order, then `--set` pairs as given.
fn update_fields(
    flags: Vec<(&str, Option<String>)>,
    set: Vec<(String, String)>,
) -> Vec<(String, Value)> {
    flags
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), Value::String(v))))
        .chain(set.into_iter().map(|(k, v)| (k, Value::String(v))))
        .collect()
}

fn handle_list(
    ctx: &mut AppContext,
    descriptor: &EndpointDescriptor,
    display: ListDisplay,
    request: &ListRequest,
) -> Result<()> {
    let result = ctx.api.list(descriptor, request)?;
    if result.listed.is_empty() {
        println!("{}", NO_RESULTS);
    } else {
        match display {
            ListDisplay::Table => println!("{}", render_table(descriptor, &result.listed)),
            ListDisplay::Json => println!("{}", render_records_json(&result.listed)?),
        }
    }
    print_messages(&result.messages, ctx.use_color);
    Ok(())
}

fn handle_retrieve(
    ctx: &mut AppContext,
    descriptor: &EndpointDescriptor,
    identifier: &str,
    display: DetailDisplay,
) -> Result<()> {
    let result = ctx.api.retrieve(descriptor, identifier, None)?;
    let record = result.affected.first().ok_or_else(|| {
        BrigidError::NotFound(format!(
            "Could not find a {} object that matches \"{}\"",
            descriptor.object_name, identifier
        ))
    })?;
    let output = match display {
        DetailDisplay::Template => render_detail(
            descriptor,
            record,
            ctx.template_dir.as_deref(),
            ctx.use_color,
        )?,
        DetailDisplay::Json => render_json(record)?,
    };
    println!("{}", output);
    Ok(())
}

fn handle_create(ctx: &mut AppContext, descriptor: &EndpointDescriptor, file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)?;
    // YAML is a superset of JSON, so one parser covers both file types.
    let fields: Value = serde_yaml::from_str(&content)?;
    let result = ctx.api.create(descriptor, fields)?;
    print_messages(&result.messages, ctx.use_color);
    Ok(())
}

fn handle_update(
    ctx: &mut AppContext,
    descriptor: &EndpointDescriptor,
    identifier: &str,
    fields: &[(String, Value)],
) -> Result<()> {
    let result = ctx.api.partial_update(descriptor, identifier, fields)?;
    print_messages(&result.messages, ctx.use_color);
    Ok(())
}

fn handle_delete(ctx: &mut AppContext, descriptor: &EndpointDescriptor, identifier: &str) -> Result<()> {
    let result = ctx.api.delete(descriptor, identifier)?;
    print_messages(&result.messages, ctx.use_color);
    Ok(())
}

fn handle_sync(ctx: &mut AppContext, descriptor: &EndpointDescriptor, identifier: &str) -> Result<()> {
    let result = ctx.api.sync(descriptor, identifier)?;
    print_messages(&result.messages, ctx.use_color);
    Ok(())
}

fn handle_settings(settings: &Settings) -> Result<()> {
    println!("{}", render_json(&settings.masked())?);
    Ok(())
}
