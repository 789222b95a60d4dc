use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cinematch::{
    config::Config,
    models::SimilarityQuery,
    routes::{create_router, AppState},
    services::{ingest, recommend_from_store},
    storage::DatasetStore,
};

/// Content-based movie recommendations from TMDB data
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Fetch popular movies from TMDB and replace the stored dataset
    Ingest {
        /// Upper bound on stored movies; defaults to MAX_MOVIES
        #[arg(long)]
        max_movies: Option<usize>,
    },
    /// Print the movies most similar to TITLE
    Recommend {
        title: String,
        /// Number of recommendations; defaults to RECOMMENDATION_COUNT
        #[arg(short, long)]
        n: Option<usize>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinematch=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Ingest { max_movies } => {
            let store = DatasetStore::new(config.dataset_path.clone());
            let report = ingest(&config, &store, max_movies.unwrap_or(config.max_movies)).await?;
            println!(
                "Stored {} movies in {}",
                report.movies,
                report.dataset_path.display()
            );
            Ok(())
        }
        Command::Recommend { title, n } => {
            let store = DatasetStore::new(config.dataset_path.clone());
            let query = SimilarityQuery::new(title, n.unwrap_or(config.recommendation_count));
            let results = recommend_from_store(store, query, config.image_base_url.clone()).await?;

            for (rank, movie) in results.iter().enumerate() {
                println!(
                    "{}. {} ({:.1}) [score {:.3}]",
                    rank + 1,
                    movie.title,
                    movie.vote_average,
                    movie.score
                );
                if let Some(poster) = &movie.poster_url {
                    println!("   {}", poster);
                }
            }
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let bind_address = config.bind_address();
    let state = Arc::new(AppState::from_config(config)?);

    state.ensure_dataset().await;

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {}", bind_address))?;
    tracing::info!(address = %bind_address, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
