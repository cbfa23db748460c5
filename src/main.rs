use clap::{Parser, Subcommand};
use rickmorty_explorer::config::DEFAULT_BASE_URL;
use rickmorty_explorer::state::{
    CharacterDetailsController, CharacterEpisodesController, PagedListController, SearchController,
    SearchViewState, SeasonGroups, SeasonsController,
};
use rickmorty_explorer::transport::query;
use rickmorty_explorer::{
    Character, CharacterStatus, ExplorerConfig, ExplorerError, QueryParams, ViewState, connect,
};
use std::process;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Browse characters and episodes of the Rick and Morty API
#[derive(Debug, Parser)]
#[command(name = "rickmorty-explorer", version, about)]
struct Cli {
    /// Root URL of the API
    #[arg(long, env = "RICKMORTY_API_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Timeout for each HTTP request, in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List characters page by page, as an infinite grid would load them
    Characters {
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,

        /// Only list characters with this status (alive, dead, unknown)
        #[arg(long)]
        status: Option<String>,
    },

    /// Show the details of one character
    Character { id: u32 },

    /// List the episodes a character appears in, by season
    CharacterEpisodes { id: u32 },

    /// List every episode of the show, by season
    Episodes,

    /// Search characters by name
    Search {
        query: String,

        /// Hide results with this status (repeatable)
        #[arg(long = "hide-status")]
        hide_status: Vec<String>,
    },
}

/// Unwraps a settled view state, turning error states into errors
fn settled<T>(state: ViewState<T>) -> Result<T, ExplorerError> {
    match state {
        ViewState::Content(content) => Ok(content),
        ViewState::Error(message) => Err(ExplorerError::View(message)),
        ViewState::Loading => Err(ExplorerError::View("Still loading".to_string())),
    }
}

fn print_character_line(character: &Character) {
    println!(
        "  #{:<4} {:<32} {:<8} {}",
        character.id,
        character.name,
        character.status.display_name(),
        character.species
    );
}

fn print_seasons(seasons: &SeasonGroups) {
    for (season, episodes) in seasons.iter() {
        println!(
            "\n=== Season {} ({} unique characters) ===",
            season,
            seasons.unique_character_count(season)
        );
        for episode in episodes {
            println!("  {} - {} ({})", episode.code(), episode.name, episode.air_date);
        }
    }
}

async fn run(cli: Cli) -> Result<(), ExplorerError> {
    let config = ExplorerConfig::default()
        .with_base_url(cli.base_url)
        .with_request_timeout(Duration::from_secs(cli.timeout_secs));
    let repository = connect(&config)?;

    match cli.command {
        Command::Characters { pages, status } => {
            let params = match status.as_deref() {
                Some(status) => query([("status", status)]),
                None => QueryParams::new(),
            };
            let controller: PagedListController<_, Character> =
                PagedListController::with_query(repository, params, &config);

            controller.load_initial().await;
            for _ in 1..pages {
                if !controller.load_next_page().await {
                    break;
                }
            }

            let list = settled(controller.state().value())?;
            println!(
                "Loaded {} of {} characters ({}/{} pages)\n",
                list.items.len(),
                list.total_count,
                list.pages_loaded,
                list.total_pages
            );
            for character in &list.items {
                print_character_line(character);
            }
            if let Some(error) = list.load_error {
                eprintln!("\nStopped early: {}", error);
            }
        }
        Command::Character { id } => {
            let controller = CharacterDetailsController::new(repository);
            controller.load(id).await;

            let details = settled(controller.state().value())?;
            println!(
                "{} ({})\n",
                details.character.name,
                details.character.status.display_name()
            );
            for point in &details.data_points {
                println!("  {}: {}", point.title, point.description);
            }
        }
        Command::CharacterEpisodes { id } => {
            let controller = CharacterEpisodesController::new(repository);
            controller.load(id).await;

            let content = settled(controller.state().value())?;
            println!(
                "{} appears in {} episode(s)",
                content.character.name,
                content.seasons.episode_count()
            );
            if content.seasons.is_empty() {
                println!("No episodes found");
            } else {
                print_seasons(&content.seasons);
            }
        }
        Command::Episodes => {
            let controller = SeasonsController::new(repository);
            controller.refresh().await;

            let seasons = settled(controller.state().value())?;
            println!("Found {} episode(s)", seasons.episode_count());
            print_seasons(&seasons);
        }
        Command::Search { query, hide_status } => {
            let controller = SearchController::new(repository, &config);
            let mut receiver = controller.state().subscribe();
            controller.set_query(query);

            let state = receiver
                .wait_for(|state| {
                    matches!(
                        state,
                        SearchViewState::Content(_) | SearchViewState::Error(_)
                    )
                })
                .await
                .map_err(|_| ExplorerError::View("Search stopped unexpectedly".to_string()))?
                .clone();

            if let SearchViewState::Error(message) = state {
                return Err(ExplorerError::View(message));
            }

            for status in &hide_status {
                controller.toggle_facet(CharacterStatus::parse(status));
            }

            if let SearchViewState::Content(results) = controller.state().value() {
                println!("{} results for '{}'", results.count(), results.query);
                for status in &results.filter.statuses {
                    let marker = if results.filter.is_selected(*status) { "x" } else { " " };
                    println!(
                        "  [{}] {} ({})",
                        marker,
                        status.display_name(),
                        results.status_count(*status)
                    );
                }
                println!();
                for character in results.visible() {
                    print_character_line(character);
                }
            }
            controller.close();
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rickmorty_explorer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("\nError: {}", e);
        process::exit(1);
    }
}
