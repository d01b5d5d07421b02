// Storefront entry point: runs the buy or sell page in a terminal.
//
// Startup sequence:
// 1. Parse the command line
// 2. Load config (copying defaults on first run)
// 3. Initialize tracing (log to file, not terminal)
// 4. Parse the launch query into page context
// 5. Create channels, the terminal host, and the HTTP client
// 6. Spawn the page task
// 7. Run the TUI until the page closes or the user quits
// 8. Cleanup, then print what was handed to the host

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use storefront_core::api::HttpMarketApi;
use storefront_core::config::{self, ContextSource};
use storefront_core::context::QueryParams;
use storefront_core::executor::TransportKind;
use storefront_core::page::{self, PageKind};
use storefront_core::theme;
use storefront_core::workflow::{self, Workflow, WorkflowSettings};
use storefront_tui::host::TerminalHost;
use storefront_tui::protocol::ChannelView;
use storefront_tui::tui::{self, ScreenState};
use tokio::sync::mpsc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Marketplace buy and sell pages in the terminal")]
struct Cli {
    /// Directory holding `config/` and `defaults/`.
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    /// Override the configured submission transport.
    #[arg(long, value_enum)]
    transport: Option<TransportArg>,

    /// Override where the buy page gets item details.
    #[arg(long, value_enum)]
    source: Option<SourceArg>,

    #[command(subcommand)]
    page: PageCommand,
}

#[derive(Debug, Subcommand)]
enum PageCommand {
    /// Buy an item. QUERY is the launch link or its query string.
    Buy { query: String },
    /// List an item for sale. QUERY is the launch link or its query string.
    Sell { query: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TransportArg {
    HostBridge,
    Http,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SourceArg {
    Query,
    Api,
}

impl From<TransportArg> for TransportKind {
    fn from(arg: TransportArg) -> Self {
        match arg {
            TransportArg::HostBridge => TransportKind::HostBridge,
            TransportArg::Http => TransportKind::Http,
        }
    }
}

impl From<SourceArg> for ContextSource {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Query => ContextSource::Query,
            SourceArg::Api => ContextSource::Api,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Parse the command line
    let cli = Cli::parse();
    let (kind, raw_query) = match &cli.page {
        PageCommand::Buy { query } => (PageKind::Buy, query.as_str()),
        PageCommand::Sell { query } => (PageKind::Sell, query.as_str()),
    };

    // 2. Load config
    let mut config =
        config::load_config(&cli.config_dir).context("failed to load configuration")?;
    if let Some(transport) = cli.transport {
        config.transport = transport.into();
    }
    if let Some(source) = cli.source {
        config.context_source = source.into();
    }

    // 3. Initialize tracing
    init_tracing(&cli.config_dir, &config.logging.level)?;
    info!(
        page = kind.name(),
        transport = ?config.transport,
        source = ?config.context_source,
        "storefront starting up"
    );

    // 4. Page context from the launch query
    let context = page::load(kind, &QueryParams::parse(raw_query));

    // 5. Channels, host, HTTP client
    let (ui_tx, ui_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::channel(64);
    let (task_tx, task_rx) = mpsc::channel(16);

    let host = Arc::new(TerminalHost::new(&config.host, ui_tx.clone()));
    let api = HttpMarketApi::from_config(&config.api).context("failed to build HTTP client")?;
    info!(base_url = %api.base_url(), "HTTP client ready");

    let workflow = Workflow::new(
        kind,
        context,
        WorkflowSettings::from_config(&config),
        host.clone(),
        Arc::new(api),
        ChannelView::new(ui_tx),
        task_tx,
    );

    // 6. Spawn the page task
    let page_handle = tokio::spawn(async move {
        if let Err(e) = workflow::run(events_rx, task_rx, workflow).await {
            error!("page loop error: {}", e);
        }
    });

    // 7. Run the TUI (blocks until the page closes or the user quits)
    let screen = ScreenState::new(kind, theme::warning_color(&config.host.theme));
    if let Err(e) = tui::run(ui_rx, events_tx, host.clone(), screen).await {
        error!("TUI error: {}", e);
    }

    // 8. Cleanup: wait for the page task to finish (with timeout)
    if tokio::time::timeout(std::time::Duration::from_secs(5), page_handle)
        .await
        .is_err()
    {
        error!("page task did not stop in time");
    }

    for message in host.sent_messages() {
        println!("{message}");
    }

    info!(closed = host.is_closed(), "storefront shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (not the terminal, which is used by the TUI).
fn init_tracing(base_dir: &Path, level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("storefront.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "storefront={level},storefront_core={level},storefront_tui={level},warn"
            ))
        }))
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
