//! cinedex - movie browser data layer CLI.

/// Application configuration (TOML).
mod config;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use cinedex_api::tmdb::{Movie, TmdbClient};
use cinedex_store::{MovieStore, Operation};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, resolve_config_path};

/// Environment variable holding the API bearer token.
const TOKEN_ENV: &str = "TMDB_API_TOKEN";

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List one page of movies.
    Movies(MoviesArgs),
    /// Show details of one movie.
    Details(DetailsArgs),
    /// List all movie genres.
    Genres,
    /// List movies of one genre.
    ByGenre(ByGenreArgs),
    /// Search movies by title.
    Search(SearchArgs),
    /// Run several operations concurrently and print the resulting view state.
    Browse(BrowseArgs),
    /// Manage the config file.
    Config(ConfigCommand),
}

/// Arguments for the `movies` subcommand.
#[derive(clap::Args)]
struct MoviesArgs {
    /// Page number (1-based).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
}

/// Arguments for the `details` subcommand.
#[derive(clap::Args)]
struct DetailsArgs {
    /// Movie ID (e.g. 550).
    #[arg(long, required = true)]
    id: u64,
}

/// Arguments for the `by-genre` subcommand.
#[derive(clap::Args)]
struct ByGenreArgs {
    /// Genre ID (e.g. "28").
    #[arg(long, required = true)]
    genre: String,
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Title to search for.
    #[arg(long, required = true)]
    query: String,
}

/// Arguments for the `browse` subcommand.
#[derive(clap::Args)]
struct BrowseArgs {
    /// Movie list page to fetch.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    page: u32,
    /// Also fetch movies of this genre ID.
    #[arg(long)]
    genre: Option<String>,
    /// Also search by this title.
    #[arg(long)]
    query: Option<String>,
    /// Also fetch details of this movie ID.
    #[arg(long)]
    details: Option<u64>,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write a default config file if none exists.
    Init,
    /// Show the effective config.
    Show,
}

/// Builds a `TmdbClient` from the config and the `TMDB_API_TOKEN` environment variable.
///
/// # Errors
///
/// Returns an error if `TMDB_API_TOKEN` is not set, the config is invalid,
/// or the client fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &AppConfig) -> Result<TmdbClient> {
    let api_token = std::env::var(TOKEN_ENV)
        .with_context(|| format!("{TOKEN_ENV} environment variable is required"))?;

    let mut builder = TmdbClient::builder().api_token(api_token).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(url) = config.api.base_url()? {
        builder = builder.base_url(url);
    }
    if let Some(ref language) = config.api.language {
        builder = builder.language(language);
    }
    if let Some(interval) = config.api.min_interval() {
        builder = builder.min_interval(interval);
    }

    builder.build().context("failed to build TMDB client")
}

/// Loads config and builds the store every data subcommand runs against.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the client cannot be built.
#[instrument(skip_all)]
fn build_store(dir: Option<&Path>) -> Result<MovieStore<TmdbClient>> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    let client = build_tmdb_client(&config)?;
    tracing::debug!(base_url = %client.base_url(), "TMDB client ready");
    Ok(MovieStore::new(client))
}

/// Logs a movie list as a table.
fn log_movies(movies: &[Movie]) {
    tracing::info!("ID\tReleaseDate\tRating\tTitle");
    for movie in movies {
        tracing::info!(
            "{}\t{}\t{:.1}\t{}",
            movie.id,
            movie.release_date.as_deref().unwrap_or("-"),
            movie.vote_average,
            movie.title,
        );
    }
    tracing::info!("Total: {} movies", movies.len());
}

/// Runs the `movies` subcommand.
///
/// # Errors
///
/// Returns an error if the store cannot be built or the fetch fails.
#[instrument(skip_all)]
async fn run_movies(args: &MoviesArgs, dir: Option<&Path>) -> Result<()> {
    let store = build_store(dir)?;
    let movies = store
        .fetch_all_movies(args.page)
        .await
        .context(Operation::FetchAllMovies.name())?;

    tracing::info!("Page {}", args.page);
    log_movies(&movies);
    Ok(())
}

/// Runs the `details` subcommand.
///
/// # Errors
///
/// Returns an error if the store cannot be built or the fetch fails.
#[instrument(skip_all)]
async fn run_details(args: &DetailsArgs, dir: Option<&Path>) -> Result<()> {
    let store = build_store(dir)?;
    let movie = store
        .fetch_movie_details(args.id)
        .await
        .context(Operation::FetchMovieDetails.name())?;

    tracing::info!("ID: {}", movie.id);
    tracing::info!("Title: {}", movie.title);
    tracing::info!(
        "Original Title: {}",
        movie.original_title.as_deref().unwrap_or("-")
    );
    tracing::info!(
        "Release Date: {}",
        movie.release_date.as_deref().unwrap_or("-")
    );
    tracing::info!(
        "Runtime: {}",
        movie
            .runtime
            .map_or_else(|| String::from("-"), |r| format!("{r}min"))
    );
    tracing::info!(
        "Genres: {}",
        movie
            .genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    tracing::info!(
        "Rating: {:.1} ({} votes)",
        movie.vote_average,
        movie.vote_count
    );
    tracing::info!("Overview: {}", movie.overview.as_deref().unwrap_or("-"));
    Ok(())
}

/// Runs the `genres` subcommand.
///
/// # Errors
///
/// Returns an error if the store cannot be built or the fetch fails.
#[instrument(skip_all)]
async fn run_genres(dir: Option<&Path>) -> Result<()> {
    let store = build_store(dir)?;
    let genres = store
        .fetch_all_genres()
        .await
        .context(Operation::FetchAllGenres.name())?;

    tracing::info!("ID\tName");
    for genre in &genres {
        tracing::info!("{}\t{}", genre.id, genre.name);
    }
    tracing::info!("Total: {} genres", genres.len());
    Ok(())
}

/// Runs the `by-genre` subcommand.
///
/// # Errors
///
/// Returns an error if the store cannot be built or the fetch fails.
#[instrument(skip_all)]
async fn run_by_genre(args: &ByGenreArgs, dir: Option<&Path>) -> Result<()> {
    let store = build_store(dir)?;
    let movies = store
        .fetch_movies_by_genre(&args.genre)
        .await
        .context(Operation::FetchMoviesByGenre.name())?;

    tracing::info!("Genre {}", args.genre);
    log_movies(&movies);
    Ok(())
}

/// Runs the `search` subcommand.
///
/// # Errors
///
/// Returns an error if the store cannot be built or the search fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, dir: Option<&Path>) -> Result<()> {
    let store = build_store(dir)?;
    let movies = store
        .search_movies_by_name(&args.query)
        .await
        .context(Operation::SearchMoviesByName.name())?;

    tracing::info!("Search \"{}\"", args.query);
    log_movies(&movies);
    Ok(())
}

/// Runs the `browse` subcommand.
///
/// Issues the genre list and movie page, plus any optional operations,
/// concurrently against one store, then logs the final view state as JSON.
///
/// # Errors
///
/// Returns an error if the store cannot be built, the state cannot be
/// serialized, or any of the operations failed.
#[instrument(skip_all)]
async fn run_browse(args: &BrowseArgs, dir: Option<&Path>) -> Result<()> {
    let store = build_store(dir)?;

    let (movies, genres, by_genre, search, details) = tokio::join!(
        store.fetch_all_movies(args.page),
        store.fetch_all_genres(),
        async {
            match args.genre {
                Some(ref genre) => Some(store.fetch_movies_by_genre(genre).await.map(drop)),
                None => None,
            }
        },
        async {
            match args.query {
                Some(ref query) => Some(store.search_movies_by_name(query).await.map(drop)),
                None => None,
            }
        },
        async {
            match args.details {
                Some(id) => Some(store.fetch_movie_details(id).await.map(drop)),
                None => None,
            }
        },
    );

    let outcomes = [
        (Operation::FetchAllMovies, Some(movies.map(drop))),
        (Operation::FetchAllGenres, Some(genres.map(drop))),
        (Operation::FetchMoviesByGenre, by_genre),
        (Operation::SearchMoviesByName, search),
        (Operation::FetchMovieDetails, details),
    ];

    let mut failed = 0usize;
    for (operation, outcome) in outcomes {
        match outcome {
            Some(Ok(())) => tracing::info!(operation = operation.name(), "fulfilled"),
            Some(Err(error)) => {
                failed = failed.saturating_add(1);
                tracing::warn!(operation = operation.name(), %error, "rejected");
            }
            None => {}
        }
    }

    let state = store.snapshot();
    let json = serde_json::to_string_pretty(&state).context("failed to serialize view state")?;
    tracing::info!("{json}");

    if failed > 0 {
        bail!("{failed} operation(s) failed");
    }
    Ok(())
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the config path cannot be resolved or the file cannot be written.
#[instrument(skip_all)]
fn run_config_init(dir: Option<&Path>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    if config_path.exists() {
        tracing::info!("Config already exists: {}", config_path.display());
        return Ok(());
    }
    AppConfig::default()
        .save(&config_path)
        .context("failed to save config")?;
    tracing::info!("Wrote {}", config_path.display());
    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded.
#[instrument(skip_all)]
fn run_config_show(dir: Option<&Path>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;

    tracing::info!("Config: {}", config_path.display());
    tracing::info!(
        "api.base_url: {}",
        config.api.base_url.as_deref().unwrap_or("(default)")
    );
    tracing::info!(
        "api.language: {}",
        config.api.language.as_deref().unwrap_or("(none)")
    );
    tracing::info!(
        "api.min_interval_ms: {}",
        config
            .api
            .min_interval_ms
            .map_or_else(|| String::from("(default)"), |ms| ms.to_string())
    );
    tracing::info!(
        "{TOKEN_ENV}: {}",
        if std::env::var_os(TOKEN_ENV).is_some() {
            "set"
        } else {
            "not set"
        }
    );
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    let dir = cli.dir.as_deref();
    match cli.command {
        Commands::Movies(args) => run_movies(&args, dir).await,
        Commands::Details(args) => run_details(&args, dir).await,
        Commands::Genres => run_genres(dir).await,
        Commands::ByGenre(args) => run_by_genre(&args, dir).await,
        Commands::Search(args) => run_search(&args, dir).await,
        Commands::Browse(args) => run_browse(&args, dir).await,
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Init => run_config_init(dir),
            ConfigSubcommands::Show => run_config_show(dir),
        },
    }
}
