//! querywiz - terminal client for streaming data agents

use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;
use crossterm::tty::IsTty;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use querywiz::cli::{self, Screen};
use querywiz::config::Settings;
use querywiz::messaging::TerminalRenderer;
use querywiz::stream::{ChatTransport, HttpTransport, ReplayTransport};

/// querywiz - watch an agent think, call tools and answer
#[derive(Parser, Debug)]
#[command(name = "wiz")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Chat endpoint (overrides settings.json)
    #[arg(long, env = "QUERYWIZ_ENDPOINT")]
    endpoint: Option<String>,

    /// Execute a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Replay a recorded SSE stream instead of calling the endpoint
    #[arg(long, value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Render a saved conversation snapshot (JSON) and exit
    #[arg(long, value_name = "FILE", conflicts_with_all = ["prompt", "replay"])]
    render: Option<PathBuf>,

    /// Disable colors
    #[arg(long)]
    no_color: bool,

    /// Settings file (defaults to the XDG config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Working directory (like git -C)
    #[arg(short = 'C', long, visible_alias = "directory")]
    cwd: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short = 'd', long)]
    debug: bool,

    /// Enable verbose logging (equivalent to RUST_LOG=trace)
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Change working directory if specified (do this early)
    if let Some(cwd) = &args.cwd {
        std::env::set_current_dir(cwd)?;
    }

    init_tracing(&args);

    let settings = match &args.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let succeeded = runtime.block_on(run(args, settings))?;
    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

fn init_tracing(args: &Args) {
    let default_filter = if args.verbose {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        "warn" // Quiet by default for normal use
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if args.debug || args.verbose {
        tracing::info!("Debug logging enabled");
    }
}

async fn run(args: Args, settings: Settings) -> anyhow::Result<bool> {
    let tty = stdout().is_tty();
    let color = settings.color && !args.no_color && tty;
    let live = settings.live_redraw && tty;

    let renderer = TerminalRenderer::new().with_color(color);
    let mut screen = Screen::new(renderer, stdout()).with_live_redraw(live);

    if let Some(path) = &args.render {
        cli::render_snapshot_file(path, &mut screen)?;
        return Ok(true);
    }

    let delay = settings.replay_delay();
    let endpoint = args.endpoint.unwrap_or(settings.endpoint);
    let transport: Box<dyn ChatTransport> = match &args.replay {
        Some(path) => Box::new(ReplayTransport::from_file(path)?.with_delay(delay)),
        None => Box::new(HttpTransport::new(endpoint.clone()).with_protocol(settings.protocol)),
    };

    match args.prompt {
        Some(prompt) => cli::run_single_prompt(transport.as_ref(), &prompt, &mut screen).await,
        None => {
            cli::run_interactive(transport.as_ref(), screen, &endpoint, color).await?;
            Ok(true)
        }
    }
}
