//! CLI Tooling
//!
//! One-shot commands (`play`, `ls`, `history`, `describe`, `providers`) return their output
//! as a string; `shell` runs an interactive browser on the same session.

use crate::config::{ConfigLoader, ExplorerConfig};
use crate::describe::{Describer, GeminiDescriber};
use crate::error::ExplorerError;
use crate::handoff::LaunchDescriptor;
use crate::history::HistoryEntry;
use crate::provider::ProviderKind;
use crate::session::{Properties, Session};
use crate::store::Node;
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

/// Streamtree CLI - browse mounted drives and hand videos to an external player
#[derive(Parser)]
#[command(name = "streamtree")]
#[command(about = "Browse local, simulated and remote drives as one tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold logging flags into the loaded configuration.
    pub fn apply_logging_overrides(&self, config: &mut ExplorerConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive browser
    Shell,
    /// Mount a provider, walk to a container and play one of its videos
    Play {
        /// Provider to mount (gdrive, dropbox, onedrive, local)
        #[arg(long)]
        mount: String,
        /// Container ids below the mount point, separated by '/'
        #[arg(long, value_delimiter = '/')]
        path: Vec<String>,
        /// Id or name of the video to activate
        #[arg(long)]
        target: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Build the launch descriptor without launching or recording history
        #[arg(long)]
        dry_run: bool,
    },
    /// List a container
    Ls {
        /// Provider to mount first; omitted lists the empty root
        #[arg(long)]
        mount: Option<String>,
        /// Container ids below the mount point, separated by '/'
        #[arg(long, value_delimiter = '/')]
        path: Vec<String>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show watch history
    History {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Remove every entry
        #[arg(long)]
        clear: bool,
    },
    /// One-line advisory description of a file name
    Describe { name: String },
    /// Show registered providers and their backends
    Providers {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Commands understood by the interactive shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Enter(String),
    Up,
    Pwd,
    Mount(String),
    Play(String),
    Info(String),
    History,
    Replay(usize),
    Refresh,
    Help,
    Quit,
}

/// Parse one shell line. Empty lines yield `None`.
pub fn parse_shell_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let argument = |name: &str| {
        if rest.is_empty() {
            Err(format!("{} needs an argument", name))
        } else {
            Ok(rest.to_string())
        }
    };
    let command = match verb {
        "ls" => ShellCommand::List,
        "cd" if rest == ".." => ShellCommand::Up,
        "cd" => ShellCommand::Enter(argument("cd")?),
        "up" => ShellCommand::Up,
        "pwd" => ShellCommand::Pwd,
        "mount" => ShellCommand::Mount(argument("mount")?),
        "play" => ShellCommand::Play(argument("play")?),
        "info" => ShellCommand::Info(argument("info")?),
        "history" => ShellCommand::History,
        "replay" => {
            let index = argument("replay")?
                .parse::<usize>()
                .map_err(|_| "replay takes a history number".to_string())?;
            ShellCommand::Replay(index)
        }
        "refresh" => ShellCommand::Refresh,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("Unknown command: {}", other)),
    };
    Ok(Some(command))
}

/// Find a child by id, falling back to a case-insensitive name match.
pub fn resolve_child<'a>(children: &'a [Node], token: &str) -> Option<&'a Node> {
    children
        .iter()
        .find(|node| node.id == token)
        .or_else(|| children.iter().find(|node| node.name.eq_ignore_ascii_case(token)))
}

const SHELL_HELP: &str = "ls | cd <child> | cd .. | up | pwd | mount <provider> | play <video> | info <child> | history | replay <n> | refresh | quit";

/// CLI context: configuration, the async runtime and one explorer session
pub struct CliContext {
    config: ExplorerConfig,
    session: Session,
    runtime: tokio::runtime::Runtime,
}

impl CliContext {
    /// Load configuration (optionally from an explicit file) and open a session.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, ExplorerError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Self::from_config(config)
    }

    pub fn from_config(config: ExplorerConfig) -> Result<Self, ExplorerError> {
        let runtime = tokio::runtime::Runtime::new().map_err(|e| {
            ExplorerError::ConfigError(format!("Failed to start async runtime: {}", e))
        })?;
        let session = Session::from_config(&config)?;
        Ok(Self {
            config,
            session,
            runtime,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ExplorerError> {
        match command {
            Commands::Shell => self.handle_shell(),
            Commands::Play {
                mount,
                path,
                target,
                format,
                dry_run,
            } => self.handle_play(mount, path, target, format, *dry_run),
            Commands::Ls {
                mount,
                path,
                format,
            } => self.handle_ls(mount.as_deref(), path, format),
            Commands::History { format, clear } => self.handle_history(format, *clear),
            Commands::Describe { name } => self.handle_describe(name),
            Commands::Providers { format } => self.handle_providers(format),
        }
    }

    /// Mount `slug` and enter its mount point followed by each id in `path`.
    fn walk(&self, slug: &str, path: &[String]) -> Result<(), ExplorerError> {
        let kind = ProviderKind::parse(slug)?;
        self.runtime.block_on(async {
            let mount = self.session.mount(kind).await?;
            self.session.enter(&mount.id).await?;
            for step in path.iter().filter(|s| !s.is_empty()) {
                let children = self.session.current_children();
                let id = resolve_child(&children, step)
                    .map(|node| node.id.clone())
                    .unwrap_or_else(|| step.clone());
                self.session.enter(&id).await?;
            }
            Ok(())
        })
    }

    fn handle_play(
        &self,
        mount: &str,
        path: &[String],
        target: &str,
        format: &str,
        dry_run: bool,
    ) -> Result<String, ExplorerError> {
        self.walk(mount, path)?;
        let children = self.session.current_children();
        let target_id = resolve_child(&children, target)
            .map(|node| node.id.clone())
            .unwrap_or_else(|| target.to_string());
        let descriptor = if dry_run {
            self.session.prepare_launch(&target_id)?
        } else {
            self.session.activate(&target_id)?
        };
        info!(target = %target_id, dry_run, "Play command complete");
        match format {
            "json" => Ok(format_descriptor_json(&descriptor)),
            _ => Ok(format_descriptor_text(&descriptor)),
        }
    }

    fn handle_ls(&self, mount: Option<&str>, path: &[String], format: &str) -> Result<String, ExplorerError> {
        if let Some(slug) = mount {
            self.walk(slug, path)?;
        }
        let children = self.session.current_children();
        match format {
            "json" => Ok(format_listing_json(&children)),
            _ => Ok(format_listing_text(&children)),
        }
    }

    fn handle_history(&self, format: &str, clear: bool) -> Result<String, ExplorerError> {
        if clear {
            self.session.clear_history();
            return Ok("History cleared".to_string());
        }
        let entries = self.session.history();
        match format {
            "json" => Ok(format_history_json(&entries)),
            _ => Ok(format_history_text(&entries)),
        }
    }

    fn handle_describe(&self, name: &str) -> Result<String, ExplorerError> {
        let describer = GeminiDescriber::from_config(&self.config.describe);
        Ok(self.runtime.block_on(describer.describe(name)))
    }

    fn handle_providers(&self, format: &str) -> Result<String, ExplorerError> {
        let registry = self.session.providers();
        let rows: Vec<(ProviderKind, String, bool)> = registry
            .kinds()
            .into_iter()
            .filter_map(|kind| {
                registry
                    .get(kind)
                    .ok()
                    .map(|entry| (kind, format!("{:?}", entry.adapter.backend()).to_lowercase(), entry.requires_auth))
            })
            .collect();
        if format == "json" {
            let items: Vec<_> = rows
                .iter()
                .map(|(kind, backend, auth)| {
                    json!({ "provider": kind.slug(), "name": kind.display_name(), "backend": backend, "requires_auth": auth })
                })
                .collect();
            return Ok(serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string()));
        }
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Provider", "Name", "Backend", "Auth"]);
        for (kind, backend, auth) in rows {
            table.add_row(vec![
                kind.slug().to_string(),
                kind.display_name().to_string(),
                backend,
                if auth { "bearer" } else { "-" }.to_string(),
            ]);
        }
        Ok(format!("{}\n", table))
    }

    fn handle_shell(&self) -> Result<String, ExplorerError> {
        use dialoguer::Input;

        println!("{}", format_section_heading("Streamtree"));
        println!("{}", SHELL_HELP.dimmed());
        loop {
            let prompt = self.prompt_path();
            let line: String = Input::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| ExplorerError::ConfigError(format!("Input error: {}", e)))?;

            let command = match parse_shell_line(&line) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(message) => {
                    println!("{}", message.yellow());
                    continue;
                }
            };
            if command == ShellCommand::Quit {
                break;
            }
            match self.run_shell_command(command) {
                Ok(output) if !output.is_empty() => println!("{}", output),
                Ok(_) => {}
                Err(e) if e.is_notice() => println!("{}", e.to_string().yellow()),
                Err(e) => println!("{}", format!("Error: {}", e).red()),
            }
        }
        Ok("Bye".to_string())
    }

    fn prompt_path(&self) -> String {
        match self.session.breadcrumbs() {
            Ok(crumbs) => crumbs
                .iter()
                .map(|crumb| crumb.name.as_str())
                .collect::<Vec<_>>()
                .join(" / "),
            Err(_) => self.session.current_id(),
        }
    }

    fn run_shell_command(&self, command: ShellCommand) -> Result<String, ExplorerError> {
        let children = self.session.current_children();
        let pick = |token: &str| {
            resolve_child(&children, token)
                .map(|node| node.id.clone())
                .ok_or_else(|| ExplorerError::NodeNotFound(token.to_string()))
        };
        match command {
            ShellCommand::List => Ok(format_listing_text(&children)),
            ShellCommand::Enter(token) => {
                let id = pick(&token)?;
                self.runtime.block_on(self.session.enter(&id))?;
                Ok(format_listing_text(&self.session.current_children()))
            }
            ShellCommand::Up => {
                self.session.go_up();
                Ok(String::new())
            }
            ShellCommand::Pwd => Ok(self.prompt_path()),
            ShellCommand::Mount(slug) => {
                let kind = ProviderKind::parse(&slug)?;
                println!("{}", format!("Connecting to {}...", kind.display_name()).dimmed());
                let mount = self.runtime.block_on(self.session.mount(kind))?;
                Ok(format!("Mounted {} ({})", mount.name, mount.id))
            }
            ShellCommand::Play(token) => {
                let id = pick(&token)?;
                let descriptor = self.session.activate(&id)?;
                Ok(format_descriptor_text(&descriptor))
            }
            ShellCommand::Info(token) => {
                let id = pick(&token)?;
                let properties = self.runtime.block_on(self.session.properties(&id))?;
                Ok(format_properties_text(&properties))
            }
            ShellCommand::History => Ok(format_history_text(&self.session.history())),
            ShellCommand::Replay(index) => {
                let entry = index
                    .checked_sub(1)
                    .and_then(|i| self.session.history().get(i).cloned())
                    .ok_or_else(|| ExplorerError::NodeNotFound(format!("history #{}", index)))?;
                match self.runtime.block_on(self.session.replay(&entry))? {
                    Some(descriptor) => Ok(format_descriptor_text(&descriptor)),
                    None => Ok(format!(
                        "{} is not in the loaded tree; mount its drive and browse to it first",
                        entry.file_name
                    )),
                }
            }
            ShellCommand::Refresh => {
                self.runtime.block_on(self.session.refresh())?;
                Ok(format_listing_text(&self.session.current_children()))
            }
            ShellCommand::Help => Ok(SHELL_HELP.to_string()),
            ShellCommand::Quit => Ok(String::new()),
        }
    }
}

/// Format a section heading with bold/underline. Respects NO_COLOR and TTY.
pub fn format_section_heading(title: &str) -> String {
    format!("{}", title.bold().underline())
}

pub fn format_listing_text(children: &[Node]) -> String {
    if children.is_empty() {
        return "Empty folder".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Id", "Name", "Kind", "Size", "Date"]);
    for node in children {
        let name = match &node.capacity {
            Some(capacity) => format!(
                "{} [{} / {}]",
                node.name, capacity.used_label, capacity.total_label
            ),
            None => node.name.clone(),
        };
        table.add_row(vec![
            node.id.clone(),
            name,
            node.kind.label().to_string(),
            node.size_label.clone().unwrap_or_else(|| "-".to_string()),
            node.date_label.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    format!("{}\n", table)
}

pub fn format_listing_json(children: &[Node]) -> String {
    serde_json::to_string_pretty(children).unwrap_or_else(|_| "[]".to_string())
}

pub fn format_descriptor_text(descriptor: &LaunchDescriptor) -> String {
    let mut out = format!(
        "Playing {} in {} ({} item{})",
        descriptor.title,
        descriptor.target_application_id,
        descriptor.item_count,
        if descriptor.item_count == 1 { "" } else { "s" }
    );
    if descriptor.auth_header.is_some() {
        out.push_str(" with bearer auth");
    }
    out
}

pub fn format_descriptor_json(descriptor: &LaunchDescriptor) -> String {
    serde_json::to_string_pretty(descriptor).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_history_text(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history yet".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["#", "Name", "Watched", "Folder"]);
    for (index, entry) in entries.iter().enumerate() {
        let watched = Utc
            .timestamp_millis_opt(entry.timestamp)
            .single()
            .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            (index + 1).to_string(),
            entry.file_name.clone(),
            watched,
            entry.file_path.clone(),
        ]);
    }
    format!("{}\n", table)
}

pub fn format_history_json(entries: &[HistoryEntry]) -> String {
    serde_json::to_string_pretty(entries).unwrap_or_else(|_| "[]".to_string())
}

pub fn format_properties_text(properties: &Properties) -> String {
    let node = &properties.node;
    let mut out = format!("{}\n", format_section_heading(&node.name));
    out.push_str(&format!("  Kind: {}\n", node.kind.label()));
    if let Some(size) = &node.size_label {
        out.push_str(&format!("  Size: {}\n", size));
    }
    if let Some(date) = &node.date_label {
        out.push_str(&format!("  Date: {}\n", date));
    }
    if let Some(kind) = properties.provider {
        out.push_str(&format!("  Provider: {}\n", kind.display_name()));
    }
    let location: Vec<&str> = properties.location.iter().map(|c| c.name.as_str()).collect();
    out.push_str(&format!("  Location: {}\n", location.join(" / ")));
    if let Some(url) = node.stream_url() {
        out.push_str(&format!("  Source: {}\n", url));
    }
    out.push_str(&format!("  About: {}", properties.description));
    out
}
