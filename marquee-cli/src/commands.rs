//! CLI command implementations

use std::sync::Arc;

use anyhow::Result;
use clap::Subcommand;
use marquee_core::catalog::{CatalogClient, Movie, MovieCatalog};
use marquee_core::config::MarqueeConfig;
use marquee_core::format::{
    ImageUrls, extract_year, format_currency, format_genres, format_production_companies,
    format_rating, format_runtime,
};
use marquee_core::paging::{LoadState, PagingError, spawn_pager};
use marquee_core::{DetailCache, MarqueeError, MovieDetailsService};
use marquee_search::{SearchState, is_valid_query, spawn_search};

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// List movies now playing in theaters
    NowPlaying {
        /// Number of pages to load
        #[arg(short, long, default_value = "1")]
        pages: usize,
    },
    /// Show the full record for one movie
    Details {
        /// Catalog id of the movie
        id: u32,
    },
    /// Search movies by title
    Search {
        /// Title text to search for
        query: String,
    },
}

/// Handle the CLI command
///
/// # Errors
/// Returns appropriate error based on the command that fails
pub async fn handle_command(command: Commands) -> Result<()> {
    let config = MarqueeConfig::from_env();
    if config.api.api_key.is_empty() {
        return Err(MarqueeError::Configuration {
            reason: "MARQUEE_API_KEY is not set".to_string(),
        }
        .into());
    }

    let catalog: Arc<dyn MovieCatalog> =
        Arc::new(CatalogClient::from_config(&config.api).map_err(MarqueeError::from)?);

    match command {
        Commands::NowPlaying { pages } => now_playing(catalog, &config, pages).await,
        Commands::Details { id } => show_details(catalog, &config, id).await,
        Commands::Search { query } => search(catalog, &config, &query).await,
    }
}

/// Print the first `pages` pages of the now-playing listing
///
/// # Errors
/// - `MarqueeError::Catalog` - A page failed to load
/// - `MarqueeError::Paging` - Pager stopped unexpectedly
pub async fn now_playing(
    catalog: Arc<dyn MovieCatalog>,
    config: &MarqueeConfig,
    pages: usize,
) -> Result<()> {
    let pager = spawn_pager(catalog, config.paging.clone());
    let mut snapshots = pager.subscribe();

    let mut loaded_pages = 0;
    while loaded_pages < pages.max(1) {
        let snapshot = snapshots
            .wait_for(|s| (s.is_idle() && s.pages.len() > loaded_pages) || has_failed(s))
            .await
            .map_err(|_| MarqueeError::Paging(PagingError::ActorStopped))?
            .clone();

        for state in [&snapshot.refresh, &snapshot.append] {
            if let Some(error) = state.error() {
                return Err(MarqueeError::from(error.clone()).into());
            }
        }

        for page in &snapshot.pages[loaded_pages..] {
            println!("Page {}", page.key);
            println!("{:-<60}", "");
            for movie in &snapshot.items[page.item_range.clone()] {
                print_movie_line(movie);
            }
        }
        loaded_pages = snapshot.pages.len();

        let end_reached = matches!(
            snapshot.append,
            LoadState::NotLoading {
                end_of_pagination_reached: true
            }
        );
        if end_reached || loaded_pages >= pages {
            break;
        }
        pager
            .item_accessed(snapshot.items.len().saturating_sub(1))
            .await
            .map_err(MarqueeError::from)?;
    }

    pager.shutdown().await.map_err(MarqueeError::from)?;
    Ok(())
}

fn has_failed(snapshot: &marquee_core::PagingSnapshot) -> bool {
    snapshot.refresh.error().is_some() || snapshot.append.error().is_some()
}

/// Print the full record for one movie
///
/// # Errors
/// - `MarqueeError::Catalog` - Lookup failed, e.g. unknown id
pub async fn show_details(
    catalog: Arc<dyn MovieCatalog>,
    config: &MarqueeConfig,
    id: u32,
) -> Result<()> {
    let cache = Arc::new(DetailCache::from_config(&config.cache));
    let service = MovieDetailsService::new(catalog, cache);
    let details = service.movie_details(id).await.map_err(MarqueeError::from)?;
    let images = ImageUrls::new(config.images.clone());

    println!("{} ({})", details.title, extract_year(details.release_date.as_deref()));
    println!("{:-<60}", "");
    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        println!("\"{tagline}\"");
    }
    println!(
        "Rating:     {} ({} votes)",
        format_rating(details.vote_average),
        details.vote_count
    );
    println!("Runtime:    {}", format_runtime(details.runtime));
    println!("Status:     {}", details.status);
    println!("Genres:     {}", format_genres(&details.genres));
    println!("Budget:     {}", format_currency(details.budget));
    println!("Revenue:    {}", format_currency(details.revenue));
    println!(
        "Companies:  {}",
        format_production_companies(&details.production_companies)
    );
    println!("Poster:     {}", images.poster_url(details.poster_path.as_deref()));
    println!("Backdrop:   {}", images.backdrop_url(details.backdrop_path.as_deref()));
    println!();
    println!("{}", details.overview);

    Ok(())
}

/// Run one debounced search and print the results
///
/// # Errors
/// - `MarqueeError::Catalog` - Search failed
pub async fn search(
    catalog: Arc<dyn MovieCatalog>,
    config: &MarqueeConfig,
    query: &str,
) -> Result<()> {
    if !is_valid_query(query, config.search.min_query_length) {
        println!(
            "Query must be at least {} characters",
            config.search.min_query_length
        );
        return Ok(());
    }

    let search = spawn_search(catalog, config.search.clone());
    let mut states = search.subscribe();
    search.set_query(query).await?;

    let state = states
        .wait_for(|s| matches!(s, SearchState::Success(_) | SearchState::Error(_)))
        .await?
        .clone();

    match state {
        SearchState::Success(movies) if movies.is_empty() => {
            println!("No movies match \"{}\"", query.trim());
        }
        SearchState::Success(movies) => {
            println!("Results for \"{}\"", query.trim());
            println!("{:-<60}", "");
            for movie in &movies {
                print_movie_line(movie);
            }
        }
        SearchState::Error(message) => anyhow::bail!(message),
        SearchState::Idle | SearchState::Loading => {}
    }

    Ok(())
}

fn print_movie_line(movie: &Movie) {
    let year = extract_year(movie.release_date.as_deref());
    if year.is_empty() {
        println!("{:>8}  {}  [{}]", movie.id, movie.title, format_rating(movie.vote_average));
    } else {
        println!(
            "{:>8}  {} ({year})  [{}]",
            movie.id,
            movie.title,
            format_rating(movie.vote_average)
        );
    }
}
