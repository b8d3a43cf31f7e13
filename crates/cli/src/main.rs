// pagesel - browse a remotely paginated artworks table and keep a row
// selection across pages

mod exit_codes;
mod fetcher;
mod tui;
mod util;

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use pagesel_artic::{ArticClient, Artwork, ClientOptions};
use pagesel_config::Settings;
use pagesel_engine::auto_select::parse_target;
use pagesel_engine::{FetchError, FetchOutcome, Page, PaginationController, TableSession};

use exit_codes::{fetch_exit_code, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

/// Fallback width for plain output when stdout is not a terminal.
const PLAIN_WIDTH: usize = 120;

#[derive(Parser)]
#[command(name = "pagesel")]
#[command(about = "Select rows across pages of a remote artworks table")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where pages come from. Flags override the settings file.
#[derive(Args, Clone, Debug, Default)]
struct SourceArgs {
    /// Artworks API base URL
    #[arg(long, env = "PAGESEL_API_BASE", value_name = "URL")]
    api_base: Option<String>,

    /// Rows per page
    #[arg(long, value_name = "N")]
    page_size: Option<usize>,

    /// Settings file (default: platform config dir)
    #[arg(long, env = "PAGESEL_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive table
    #[command(after_help = "\
Keys:
  up/down, j/k     move the cursor
  space            toggle the row under the cursor
  a                toggle every row on the page
  n/p, PgDn/PgUp   next/previous page
  /                select the first N rows
  r                reload the page
  ?                help
  q                quit")]
    Browse {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Fetch one page and print it
    #[command(after_help = "\
Examples:
  pagesel page 1
  pagesel page 3 --page-size 25 --json")]
    Page {
        /// Page number (1-based)
        page: usize,

        #[command(flatten)]
        source: SourceArgs,

        /// Print the page as JSON
        #[arg(long)]
        json: bool,
    },

    /// Select the first N rows, visiting pages in order, and print the ids
    #[command(after_help = "\
Examples:
  pagesel select --first 30
  pagesel select --first 30 --deselect 27992,28560 --json
  pagesel select --first 30 --pages 1")]
    Select {
        /// Number of rows to select
        #[arg(long, value_name = "N")]
        first: String,

        /// Pages to visit (default: as many as the target spans)
        #[arg(long, value_name = "K")]
        pages: Option<usize>,

        /// Uncheck these ids when their page is visited (repeatable, comma-separated)
        #[arg(long = "deselect", value_name = "ID")]
        deselect: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,

        /// Print a JSON summary instead of one id per line
        #[arg(long)]
        json: bool,
    },
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  pagesel-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   debug",
            "\ntarget:  ", env!("TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("GIT_COMMIT_HASH"), ")",
            "\nengine:  pagesel-engine ", env!("CARGO_PKG_VERSION"),
            "\nbuild:   release",
            "\ntarget:  ", env!("TARGET"),
        )
    }
}

fn init_logging() {
    // Silent unless RUST_LOG is set; the TUI owns the terminal otherwise.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("off")).init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            // No subcommand = show help
            eprintln!("Usage: pagesel <command> [options]");
            eprintln!("       pagesel --help for more information");
            Ok(())
        }
        Some(Commands::Browse { source }) => cmd_browse(source),
        Some(Commands::Page { page, source, json }) => cmd_page(page, source, json),
        Some(Commands::Select {
            first,
            pages,
            deselect,
            source,
            json,
        }) => cmd_select(first, pages, deselect, source, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Create error from a failed page fetch with the matching exit code.
    pub fn fetch(context: &str, err: FetchError) -> Self {
        let code = fetch_exit_code(&err);
        let hint = match &err {
            FetchError::Network(_) => Some("check --api-base and your network connection".to_string()),
            FetchError::Http(429, _) => Some("rate limited; wait a moment and retry".to_string()),
            FetchError::Http(404, _) => Some("is --api-base pointing at /api/v1?".to_string()),
            _ => None,
        };
        Self { code, message: format!("{}: {}", context, err), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// shared setup
// ============================================================================

fn load_settings(args: &SourceArgs) -> Settings {
    let mut settings = match &args.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    };
    if let Some(api_base) = &args.api_base {
        settings.api_base = api_base.trim_end_matches('/').to_string();
    }
    if let Some(page_size) = args.page_size {
        settings.page_size = page_size;
    }
    log::debug!(
        "settings: api_base={} page_size={} retries={}",
        settings.api_base,
        settings.page_size,
        settings.max_retries
    );
    settings
}

fn build_client(settings: &Settings) -> Result<ArticClient, CliError> {
    ArticClient::new(ClientOptions {
        api_base: settings.api_base.clone(),
        timeout: Duration::from_secs(settings.timeout_secs),
        max_retries: settings.max_retries,
        ..ClientOptions::default()
    })
    .map_err(|e| CliError::io(e.to_string()))
}

fn new_session(settings: &Settings) -> Result<TableSession<Artwork>, CliError> {
    if settings.page_size == 0 {
        return Err(CliError::args("--page-size must be at least 1"));
    }
    let pager = PaginationController::new(settings.page_size)
        .with_error_message(settings.error_message.clone());
    Ok(TableSession::with_pager(pager))
}

/// Visit `page` synchronously. A failed fetch becomes a CLI error.
fn visit(
    session: &mut TableSession<Artwork>,
    client: &ArticClient,
    page: usize,
) -> Result<(), CliError> {
    match session.visit_page(page, client) {
        FetchOutcome::Applied | FetchOutcome::Stale => Ok(()),
        FetchOutcome::Failed(e) => {
            let context = session.view().error.unwrap_or("fetch failed").to_string();
            Err(CliError::fetch(&format!("{} (page {})", context, page), e))
        }
    }
}

fn terminal_width() -> usize {
    crossterm::terminal::size()
        .map(|(w, _)| w as usize)
        .unwrap_or(PLAIN_WIDTH)
}

// ============================================================================
// browse
// ============================================================================

fn cmd_browse(source: SourceArgs) -> Result<(), CliError> {
    let settings = load_settings(&source);
    let client = build_client(&settings)?;
    let mut session = new_session(&settings)?;

    if !io::stdout().is_terminal() {
        // Piped: print the first page instead of opening the table.
        visit(&mut session, &client, 1)?;
        let mut out = io::stdout().lock();
        return tui::print_plain(&mut out, session.pager().items(), PLAIN_WIDTH).map_err(CliError::io);
    }

    let label = client.api_base().to_string();
    tui::run(client, session, label).map_err(CliError::io)
}

// ============================================================================
// page
// ============================================================================

/// `page --json` output: the page plus what is known about the dataset.
#[derive(Serialize)]
struct PageJson {
    #[serde(flatten)]
    page: Page<Artwork>,
    page_size: usize,
    total: usize,
    total_pages: usize,
}

fn cmd_page(page: usize, source: SourceArgs, json: bool) -> Result<(), CliError> {
    if page == 0 {
        return Err(CliError::args("page numbers start at 1"));
    }
    let settings = load_settings(&source);
    let client = build_client(&settings)?;
    let mut session = new_session(&settings)?;
    visit(&mut session, &client, page)?;

    let view = session.view();
    let mut out = io::stdout().lock();
    if json {
        let body = PageJson {
            page: Page::new(view.current_page, view.items.to_vec()),
            page_size: view.page_size,
            total: view.total,
            total_pages: view.total_pages,
        };
        let text = serde_json::to_string_pretty(&body).map_err(|e| CliError::io(e.to_string()))?;
        writeln!(out, "{}", text).map_err(|e| CliError::io(e.to_string()))?;
        return Ok(());
    }

    tui::print_plain(&mut out, view.items, terminal_width()).map_err(CliError::io)?;
    writeln!(
        out,
        "page {}/{} ({} items)",
        view.current_page, view.total_pages, view.total
    )
    .map_err(|e| CliError::io(e.to_string()))
}

// ============================================================================
// select
// ============================================================================

fn cmd_select(
    first: String,
    pages: Option<usize>,
    deselect: Vec<String>,
    source: SourceArgs,
    json: bool,
) -> Result<(), CliError> {
    let target = parse_target(&first).map_err(|e| {
        CliError::args(e.to_string()).with_hint("--first takes a whole number of rows, e.g. --first 40")
    })?;
    let deselect = util::parse_id_list(&deselect).map_err(CliError::args)?;
    if pages == Some(0) {
        return Err(CliError::args("--pages must be at least 1"));
    }

    let settings = load_settings(&source);
    let client = build_client(&settings)?;
    let mut session = new_session(&settings)?;

    visit(&mut session, &client, 1)?;
    session
        .submit_auto_select(&first)
        .map_err(|e| CliError::args(e.to_string()))?;

    let last_page = pages
        .unwrap_or(usize::MAX)
        .min(session.pager().total_pages());
    log::info!("selecting first {} rows, at most {} page(s)", target, last_page);

    let mut visited = 1;
    uncheck_resident(&mut session, &deselect);
    for page in 2..=last_page {
        // Without --pages, stop once later pages cannot add to the target.
        if pages.is_none() && session.auto_select_exhausted_at(page) {
            break;
        }
        visit(&mut session, &client, page)?;
        uncheck_resident(&mut session, &deselect);
        visited += 1;
    }

    let selected = session.selected_ids();
    let mut out = io::stdout().lock();
    if json {
        let mut deselected: Vec<u64> = session.ledger().deselected().iter().copied().collect();
        deselected.sort_unstable();
        let body = serde_json::json!({
            "target": target,
            "pages_visited": visited,
            "total": session.pager().total(),
            "selected": selected,
            "deselected": deselected,
        });
        let text = serde_json::to_string_pretty(&body).map_err(|e| CliError::io(e.to_string()))?;
        return writeln!(out, "{}", text).map_err(|e| CliError::io(e.to_string()));
    }

    for id in selected {
        writeln!(out, "{}", id).map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

/// Uncheck any requested id that is on the resident page and checked.
fn uncheck_resident(session: &mut TableSession<Artwork>, ids: &[u64]) {
    let on_page: Vec<u64> = session
        .pager()
        .items()
        .iter()
        .map(|art| art.id)
        .filter(|id| ids.contains(id) && session.ledger().is_selected(id))
        .collect();
    for id in on_page {
        session.toggle_row(&id);
    }
}
