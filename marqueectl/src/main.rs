//! `marqueectl`: browse the Marquee movie catalogue from a terminal.

mod browse;
mod render;
mod session;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use marquee_core::model::{MovieId, PageIndex, PersonId};
use marquee_core::{
    ApiClient, ClientConfig, Feed, FeedSource, PageWindowCache, Spotlight,
    hydrate_favorites,
};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use session::{RegisterArgs, SessionArgs};

#[derive(Parser)]
#[command(
    name = "marqueectl",
    about = "Browse the Marquee movie catalogue",
    version
)]
struct Cli {
    /// TOML file whose keys override the environment
    #[arg(long, global = true, env = "MARQUEE_CONFIG")]
    config: Option<PathBuf>,
    /// Catalogue API base URL (overrides config and environment)
    #[arg(long, global = true)]
    backend_url: Option<String>,
    #[command(flatten)]
    session: SessionArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Page through a ranked list or your favorites, one window at a time
    Browse {
        #[arg(value_enum)]
        list: ListArg,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Page through search results the same way as `browse`
    Search {
        query: String,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Cycle through the top of the most-popular list
    Spotlight {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show a movie's full record
    Movie { id: String },
    /// Show a person's full record
    Person { id: String },
    /// Show the signed-in user's profile
    Profile,
    /// List or edit favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// Check credentials against the API
    Login,
    /// Create an account
    Register(RegisterArgs),
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorites with their full records
    List,
    /// Add a movie to favorites
    Add { id: String },
    /// Remove a movie from favorites
    Remove { id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ListArg {
    MostPopular,
    TopRated,
    Favorites,
}

impl From<ListArg> for Feed {
    fn from(list: ListArg) -> Self {
        match list {
            ListArg::MostPopular => Feed::MostPopular,
            ListArg::TopRated => Feed::TopRated,
            ListArg::Favorites => Feed::Favorites,
        }
    }
}

#[derive(Args, Debug, Clone, Copy)]
struct WindowArgs {
    /// Items requested per page
    #[arg(long)]
    page_size: Option<usize>,
    /// Items shown per window
    #[arg(long)]
    view_size: Option<usize>,
}

impl WindowArgs {
    fn apply(self, config: &mut ClientConfig) {
        if let Some(page_size) = self.page_size {
            config.page_size = page_size;
        }
        if let Some(view_size) = self.view_size {
            config.view_size = view_size;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::load(cli.config.as_deref())
        .context("failed to load configuration")?;
    if let Some(url) = cli.backend_url {
        config.backend_url = url;
    }

    match cli.command {
        Command::Browse { list, window } => {
            window.apply(&mut config);
            let feed = Feed::from(list);
            let client = connect(&config)?;
            if feed.requires_session() {
                session::sign_in(&client, &cli.session).await?;
            }
            browse_feed(&config, client, feed).await
        }
        Command::Search { query, window } => {
            window.apply(&mut config);
            let client = connect(&config)?;
            browse_feed(&config, client, Feed::search(query)).await
        }
        Command::Spotlight { limit } => {
            let client = connect(&config)?;
            let limit = limit.unwrap_or_else(|| config.spotlight_limit());
            let spotlight =
                Spotlight::new(FeedSource::new(client, Feed::MostPopular), limit);
            let stdin = BufReader::new(tokio::io::stdin());
            browse::run_spotlight(&spotlight, stdin, &mut std::io::stdout())
                .await
        }
        Command::Movie { id } => {
            let client = connect(&config)?;
            let id = MovieId::from_string(id).context("invalid movie id")?;
            let movie = client
                .movie(&id)
                .await
                .with_context(|| format!("failed to load movie {id}"))?;
            render::movie(&mut std::io::stdout(), &movie)?;
            Ok(())
        }
        Command::Person { id } => {
            let client = connect(&config)?;
            let id = PersonId::from_string(id).context("invalid person id")?;
            let person = client
                .person(&id)
                .await
                .with_context(|| format!("failed to load person {id}"))?;
            render::person(&mut std::io::stdout(), &person)?;
            Ok(())
        }
        Command::Profile => {
            let client = connect(&config)?;
            session::sign_in(&client, &cli.session).await?;
            let profile =
                client.profile().await.context("failed to load profile")?;
            render::profile(&mut std::io::stdout(), &profile)?;
            Ok(())
        }
        Command::Favorites { action } => {
            let client = connect(&config)?;
            session::sign_in(&client, &cli.session).await?;
            favorites(&client, &config, action).await
        }
        Command::Login => {
            let client = connect(&config)?;
            let session = session::login(&client, &cli.session).await?;
            let name = session
                .user
                .as_ref()
                .map(|user| user.username.clone())
                .unwrap_or_else(|| "user".to_string());
            println!("Signed in as {name}");
            Ok(())
        }
        Command::Register(args) => {
            let client = connect(&config)?;
            let message = session::register(&client, &cli.session, args).await?;
            println!(
                "{}",
                message.unwrap_or_else(|| "Registered successfully".to_string())
            );
            Ok(())
        }
    }
}

fn connect(config: &ClientConfig) -> Result<ApiClient> {
    ApiClient::from_config(config).context("failed to create API client")
}

async fn browse_feed(
    config: &ClientConfig,
    client: ApiClient,
    feed: Feed,
) -> Result<()> {
    let window = config
        .window_config_for(&feed)
        .context("invalid window size")?;
    let title = feed.title();
    let cache = PageWindowCache::new(FeedSource::new(client, feed), window);
    let stdin = BufReader::new(tokio::io::stdin());
    browse::run_window(&cache, &title, stdin, &mut std::io::stdout()).await
}

async fn favorites(
    client: &ApiClient,
    config: &ClientConfig,
    action: FavoritesAction,
) -> Result<()> {
    let mut out = std::io::stdout();
    match action {
        FavoritesAction::List => {
            let first = client
                .favorites(PageIndex::FIRST, config.page_size)
                .await
                .context("failed to load favorites")?;
            if first.is_empty() {
                writeln!(out, "No favorites yet.")?;
                return Ok(());
            }
            let hydrated = hydrate_favorites(client, first.data).await;
            render::favorites(&mut out, &hydrated)?;
        }
        FavoritesAction::Add { id } => {
            let id = MovieId::from_string(id).context("invalid movie id")?;
            let message = client
                .add_favorite(&id)
                .await
                .with_context(|| format!("failed to add {id} to favorites"))?;
            writeln!(
                out,
                "{}",
                message.unwrap_or_else(|| format!("Added {id} to favorites"))
            )?;
        }
        FavoritesAction::Remove { id } => {
            let id = MovieId::from_string(id).context("invalid movie id")?;
            let message = client.remove_favorite(&id).await.with_context(
                || format!("failed to remove {id} from favorites"),
            )?;
            writeln!(
                out,
                "{}",
                message
                    .unwrap_or_else(|| format!("Removed {id} from favorites"))
            )?;
        }
    }
    Ok(())
}
