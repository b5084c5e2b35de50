//! Interactive browse shell
//!
//! Reads one command per line, applies it to a single catalog session and
//! prints the result. Lines are split with shell quoting rules and parsed
//! by clap, so `create --title "Gin Fizz" --description "..."` works.
//!
//! Searches are debounced: a `search` line is held until no further input
//! arrives within the configured quiet period, and only the latest one is
//! sent. Any other command flushes a held search first.

use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use barback_core::catalog::{Filter, RecordChanges, RecordDraft};
use barback_core::{BarbackConfig, CatalogProvider, CatalogSession};

use crate::catalog_cli::open_session;
use crate::render::{write_record, write_view};

const PROMPT: &str = "barback> ";

#[derive(Parser, Debug)]
#[clap(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[clap(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ShellCommand {
    /// Show the current page
    #[clap(alias = "ls")]
    List,

    /// Search by name (an empty search restores the browse data)
    Search {
        /// Words to search for
        query: Vec<String>,
    },

    /// Clear the search and filter, then reload
    Clear,

    /// Show all records or only favorites
    Filter {
        /// all | favorites
        filter: Filter,
    },

    /// Jump to a page
    Page { page: usize },

    /// Change the number of records per page
    PageSize { size: usize },

    /// Toggle the favorite flag
    Like { id: String },

    /// Delete a record
    #[clap(alias = "rm")]
    Delete { id: String },

    /// Create a local record
    Create {
        #[clap(long)]
        title: String,
        #[clap(long)]
        description: String,
        #[clap(long)]
        category: Option<String>,
        #[clap(long)]
        image: Option<String>,
    },

    /// Start editing a record
    Edit { id: String },

    /// Save the record being edited (empty --category/--image clears them)
    Save {
        #[clap(long)]
        title: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long)]
        category: Option<String>,
        #[clap(long)]
        image: Option<String>,
    },

    /// Discard the record being edited
    Cancel,

    /// Show one record in full
    Show { id: String },

    /// List provider categories
    Categories,

    /// Show load status and counters
    Status,

    /// Leave the shell
    #[clap(alias = "exit")]
    Quit,
}

/// Parse one input line. Blank lines yield `None`.
///
/// Errors carry the text to show the user, including clap's help output.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, String> {
    let words = shell_words::split(line).map_err(|e| format!("Could not parse line: {e}"))?;
    if words.is_empty() {
        return Ok(None);
    }

    ShellLine::try_parse_from(words)
        .map(|parsed| Some(parsed.command))
        .map_err(|e| e.to_string())
}

/// Whether the shell keeps reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

fn optional_field(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let v = v.trim().to_string();
        if v.is_empty() {
            None
        } else {
            Some(v)
        }
    })
}

/// Command executor over one session
pub struct Shell<P> {
    session: CatalogSession<P>,
}

impl<P: CatalogProvider> Shell<P> {
    pub fn new(session: CatalogSession<P>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &CatalogSession<P> {
        &self.session
    }

    fn show_view(&self, out: &mut impl Write) -> Result<()> {
        write_view(out, &self.session.store().view())
    }

    pub async fn execute(&mut self, command: ShellCommand, out: &mut impl Write) -> Result<Flow> {
        debug!("Shell command: {:?}", command);

        match command {
            ShellCommand::List => self.show_view(out)?,
            ShellCommand::Search { query } => {
                self.session.search(&query.join(" ")).await;
                self.show_view(out)?;
            }
            ShellCommand::Clear => {
                self.session.clear_search().await;
                self.show_view(out)?;
            }
            ShellCommand::Filter { filter } => {
                self.session.store_mut().set_filter(filter);
                self.show_view(out)?;
            }
            ShellCommand::Page { page } => {
                self.session.store_mut().set_page(page);
                self.show_view(out)?;
            }
            ShellCommand::PageSize { size } => {
                self.session.store_mut().set_page_size(size);
                self.show_view(out)?;
            }
            ShellCommand::Like { id } => match self.session.store_mut().toggle_like(&id) {
                Some(true) => writeln!(out, "Added '{id}' to favorites")?,
                Some(false) => writeln!(out, "Removed '{id}' from favorites")?,
                None => writeln!(out, "Record '{id}' not found")?,
            },
            ShellCommand::Delete { id } => match self.session.store_mut().remove(&id) {
                Some(record) => writeln!(out, "Deleted '{}' ({})", record.title, record.id)?,
                None => writeln!(out, "Record '{id}' not found")?,
            },
            ShellCommand::Create {
                title,
                description,
                category,
                image,
            } => {
                let draft = RecordDraft {
                    id: None,
                    title,
                    description,
                    category,
                    image,
                };
                let errors = draft.validate();
                if errors.is_empty() {
                    let id = self.session.store_mut().create(draft.normalized());
                    writeln!(out, "Created '{id}'")?;
                } else {
                    for error in errors {
                        writeln!(out, "Invalid: {error}")?;
                    }
                }
            }
            ShellCommand::Edit { id } => {
                if self.session.store_mut().start_edit(&id) {
                    if let Some(record) = self.session.store().editing() {
                        write_record(out, record)?;
                    }
                    writeln!(out, "\nEditing '{id}'. Use `save --title ...` or `cancel`.")?;
                } else {
                    writeln!(out, "Record '{id}' not found")?;
                }
            }
            ShellCommand::Save {
                title,
                description,
                category,
                image,
            } => {
                if self.session.store().editing().is_none() {
                    writeln!(out, "Nothing to save")?;
                    return Ok(Flow::Continue);
                }

                let changes = RecordChanges {
                    title,
                    description,
                    category: optional_field(category),
                    image: optional_field(image),
                    ..Default::default()
                }
                .normalized();

                let errors = changes.validate();
                if !errors.is_empty() {
                    for error in errors {
                        writeln!(out, "Invalid: {error}")?;
                    }
                    writeln!(out, "Still editing. Fix the fields or `cancel`.")?;
                    return Ok(Flow::Continue);
                }

                match self.session.store_mut().commit_edit(changes) {
                    Some(id) => writeln!(out, "Saved '{id}'")?,
                    None => writeln!(out, "Nothing to save")?,
                }
            }
            ShellCommand::Cancel => {
                self.session.store_mut().cancel_edit();
                writeln!(out, "Edit cancelled")?;
            }
            ShellCommand::Show { id } => match self.session.open(&id).await {
                Some(record) => write_record(out, &record)?,
                None => writeln!(out, "Record '{id}' not found")?,
            },
            ShellCommand::Categories => match self.session.categories().await {
                Ok(categories) => {
                    for category in categories {
                        writeln!(out, "  {category}")?;
                    }
                }
                Err(e) => writeln!(out, "Failed to fetch categories: {e}")?,
            },
            ShellCommand::Status => {
                let store = self.session.store();
                writeln!(out, "Status:   {}", store.status())?;
                if let Some(error) = store.error() {
                    writeln!(out, "Error:    {error}")?;
                }
                writeln!(out, "Records:  {}", store.len())?;
                writeln!(out, "Filter:   {}", store.filter())?;
                writeln!(out, "Search:   \"{}\"", store.search())?;
                writeln!(out, "Page:     {} (size {})", store.page(), store.page_size())?;
                if let Some(record) = store.editing() {
                    writeln!(out, "Editing:  {} ({})", record.title, record.id)?;
                }
            }
            ShellCommand::Quit => return Ok(Flow::Quit),
        }

        Ok(Flow::Continue)
    }
}

/// Run the shell on stdin/stdout until `quit` or end of input
pub async fn run(config: &BarbackConfig) -> Result<()> {
    let mut shell = Shell::new(open_session(config)?);
    let mut stdout = std::io::stdout();

    println!("Loading catalog...");
    shell.session.load_initial().await;
    shell.show_view(&mut stdout)?;

    let input = BufReader::new(tokio::io::stdin());
    run_lines(&mut shell, input, &mut stdout, config.browse.search_debounce()).await
}

/// Feed lines from `input` through `shell` until `quit` or end of input.
///
/// A `search` line is held until `debounce` passes with no further input;
/// a newer search replaces it. Any other command, and end of input, runs
/// the held search first.
pub async fn run_lines<P, R>(
    shell: &mut Shell<P>,
    input: R,
    out: &mut impl Write,
    debounce: Duration,
) -> Result<()>
where
    P: CatalogProvider,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut pending_search: Option<ShellCommand> = None;

    loop {
        let line = match pending_search.take() {
            Some(search) => match tokio::time::timeout(debounce, lines.next_line()).await {
                Ok(line) => {
                    pending_search = Some(search);
                    line?
                }
                Err(_quiet) => {
                    shell.execute(search, out).await?;
                    continue;
                }
            },
            None => {
                write!(out, "{PROMPT}")?;
                out.flush()?;
                lines.next_line().await?
            }
        };

        let Some(line) = line else {
            break;
        };

        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };

        if matches!(command, ShellCommand::Search { .. }) {
            if pending_search.is_some() {
                debug!("Replacing held search");
            }
            pending_search = Some(command);
            continue;
        }

        if let Some(search) = pending_search.take() {
            shell.execute(search, out).await?;
        }
        if shell.execute(command, out).await? == Flow::Quit {
            return Ok(());
        }
    }

    if let Some(search) = pending_search.take() {
        shell.execute(search, out).await?;
    }
    Ok(())
}
