mod app;
mod config;
mod graph;
mod source;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::NodePalette;
use source::GraphSource;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the graph query service.
    #[arg(long, env = "KG_BACKEND_URL", required_unless_present = "file")]
    backend_url: Option<String>,

    /// Load the graph from a JSON file instead of the query service.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Query submitted on start-up.
    #[arg(long)]
    query: Option<String>,

    /// JSON object mapping node types to hex colors.
    #[arg(long, env = "KG_NODE_COLORS")]
    node_colors: Option<String>,

    /// Seed for the initial layout jitter.
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kg_explorer=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> eframe::Result<()> {
    init_tracing();
    let args = Args::parse();

    let source = match (args.file, args.backend_url) {
        (Some(path), _) => GraphSource::File(path),
        (None, Some(url)) => GraphSource::Backend(url),
        (None, None) => GraphSource::Backend(String::new()),
    };
    let palette = NodePalette::from_override(args.node_colors.as_deref());
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "kg-explorer",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ExplorerApp::new(
                cc,
                source,
                args.query,
                palette,
                args.seed,
            )))
        }),
    )
}
