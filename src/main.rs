use chrono::Utc;
use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use starfield::cli::{Cli, Commands};
use starfield::config::Config;
use starfield::domain::{
    FeedKind, FeedState, FeedStatus, FilterUpdate, SearchOptions, SearchSort, TrendingPeriod,
};
use starfield::errors::{StarfieldError, StarfieldResult};
use starfield::services::{ArticleStore, StoreEvent};
use starfield::sources::{NewsSource, NytSource};
use starfield::visual::{ColorPolicy, ColorResolver, StarfieldLayout};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("starfield=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> StarfieldResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::from_env()?;
    let source = NytSource::new(&config)?;

    let policy = if cli.hash_colors {
        ColorPolicy::HashPalette
    } else {
        ColorPolicy::FlatDefault
    };
    let colors = ColorResolver::new(policy);

    if let Commands::CheckKey = cli.command {
        return cmd_check_key(&source, &config).await;
    }

    let store = ArticleStore::new(source, config.store_settings());

    match cli.command {
        Commands::Latest { section } => cmd_latest(&store, &colors, &section).await,
        Commands::Trending { period } => cmd_trending(&store, &colors, period).await,
        Commands::Search {
            query,
            sort,
            begin_date,
            end_date,
            page,
        } => {
            let options = SearchOptions {
                sort,
                begin_date,
                end_date,
                page,
            };
            cmd_search(&store, &colors, &query, &options).await
        }
        Commands::Watch { section } => cmd_watch(&store, &colors, &section).await,
        Commands::CheckKey => Ok(()),
    }
}

async fn cmd_check_key(source: &NytSource, config: &Config) -> StarfieldResult<()> {
    if config.api_key.is_none() {
        return Err(StarfieldError::Config("NYT_API_KEY is not set".to_string()));
    }

    println!("Checking API key against {}...", config.base_url);
    source.check_credentials().await?;
    println!("API key accepted.");

    Ok(())
}

async fn select_section<S: NewsSource>(store: &ArticleStore<S>, section: &str) {
    let section = section.trim().to_lowercase();
    if store.filters().await.section == section {
        store.refresh_recent().await;
    } else {
        store.update_filters(FilterUpdate::section(section)).await;
    }
}

async fn cmd_latest<S: NewsSource>(
    store: &ArticleStore<S>,
    colors: &ColorResolver,
    section: &str,
) -> StarfieldResult<()> {
    select_section(store, section).await;

    let state = store.feed(FeedKind::Recent).await;
    print_feed("Latest articles", FeedKind::Recent, &state, colors)
}

async fn cmd_trending<S: NewsSource>(
    store: &ArticleStore<S>,
    colors: &ColorResolver,
    period: TrendingPeriod,
) -> StarfieldResult<()> {
    if store.filters().await.trending_period == period {
        store.refresh_trending().await;
    } else {
        store
            .update_filters(FilterUpdate::trending_period(period))
            .await;
    }

    let state = store.feed(FeedKind::Trending).await;
    let heading = format!("Most viewed, last {} day(s)", period.days());
    print_feed(&heading, FeedKind::Trending, &state, colors)
}

async fn cmd_search<S: NewsSource>(
    store: &ArticleStore<S>,
    colors: &ColorResolver,
    query: &str,
    options: &SearchOptions,
) -> StarfieldResult<()> {
    if query.trim().is_empty() {
        return Err(StarfieldError::InvalidInput(
            "Search query is empty".to_string(),
        ));
    }

    let state = store.search(query, options).await;
    let heading = match options.sort {
        SearchSort::Relevance => format!("Results for \"{}\"", query.trim()),
        sort => format!("Results for \"{}\" ({} first)", query.trim(), sort.as_str()),
    };
    print_feed(&heading, FeedKind::Search, &state, colors)
}

async fn cmd_watch<S: NewsSource>(
    store: &ArticleStore<S>,
    colors: &ColorResolver,
    section: &str,
) -> StarfieldResult<()> {
    let mut events = store.subscribe();

    // the first poll tick fetches with this section
    store
        .set_filters(FilterUpdate::section(section.trim().to_lowercase()))
        .await;
    let poller = store.start();

    println!(
        "Watching latest articles every {}s (Ctrl-C to stop)...\n",
        store.settings().poll_interval.as_secs()
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut printed_once = false;
    let mut last_error: Option<String> = None;

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!("\nStopping.");
                break;
            }
            event = events.recv() => match event {
                Ok(StoreEvent::FeedUpdated(FeedKind::Recent)) => {
                    let state = store.feed(FeedKind::Recent).await;
                    if state.is_loading {
                        continue;
                    }

                    match (&state.status, &state.error) {
                        (FeedStatus::Failed, Some(error)) => {
                            if last_error.as_deref() != Some(error.as_str()) {
                                eprintln!("  ! {}", error);
                                last_error = Some(error.clone());
                            }
                        }
                        (FeedStatus::Ready, _) => {
                            last_error = None;
                            if !printed_once {
                                print_feed("Latest articles", FeedKind::Recent, &state, colors)?;
                                printed_once = true;
                            }
                        }
                        _ => {}
                    }
                }
                Ok(StoreEvent::NoveltyRaised(notification)) => {
                    println!("* {}", notification.format());
                    let layout = StarfieldLayout::new(colors);
                    for article in &store.new_articles().await {
                        print_star(&layout.star_for(FeedKind::Recent, article, Utc::now()));
                    }
                    println!();
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Event receiver lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    poller.shutdown().await;
    store.shutdown();

    Ok(())
}

fn print_feed(
    heading: &str,
    kind: FeedKind,
    state: &FeedState,
    colors: &ColorResolver,
) -> StarfieldResult<()> {
    if let Some(error) = &state.error {
        return Err(StarfieldError::Fetch(error.clone()));
    }

    if let Some(notice) = &state.notice {
        println!("{}", notice);
        return Ok(());
    }

    if state.articles.is_empty() {
        println!("No articles.");
        return Ok(());
    }

    let layout = StarfieldLayout::new(colors);
    let stars = layout.layout(kind, &state.articles, Utc::now());

    println!("{} ({} articles):\n", heading, stars.len());
    for star in &stars {
        print_star(star);
    }

    Ok(())
}

fn print_star(star: &starfield::visual::Star) {
    println!("  {} {}", star.color, star.title);
    println!(
        "    section: {}  size: {:.2}  orbit: {}  speed: {:.2}  at ({:.1}, {:.1}, {:.1})",
        star.section.as_deref().unwrap_or("-"),
        star.size,
        star.orbit,
        star.speed,
        star.position[0],
        star.position[1],
        star.position[2]
    );
}
