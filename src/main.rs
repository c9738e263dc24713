use clap::Parser;
use pivotrec::{init_tracing, server::create_router, AppState, Config};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Serve collaborative-filtering recommendations over HTTP", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Start with an empty rating table instead of generated sample data
    #[arg(long)]
    empty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = Config::load_or_default(&args.config)?;
    info!("Starting Pivotrec server with config: {:?}", config.server);

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.server.workers.max(1))
        .build_global()?;

    let state = if args.empty {
        AppState::empty(config.clone())
    } else {
        AppState::new(config.clone())?
    };
    let summary = state.recommendation_service.summary();
    info!(
        "Loaded dataset v{}: {} ratings, {} users, {} items",
        summary.version, summary.records, summary.users, summary.items
    );

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.socket_addr()).await?;
    info!("Server listening on {}", config.server.socket_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
