use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use blog_feed_browser::api::ApiClient;
use blog_feed_browser::config::Config;
use blog_feed_browser::debounce::Debouncer;
use blog_feed_browser::feed::{load_detail, FeedController, FeedPhase, FeedQuery};
use blog_feed_browser::prefs::Preferences;
use blog_feed_browser::scroll::{ScrollMode, SentinelBridge};
use blog_feed_browser::theme::{Theme, ThemeContext};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    init_tracing()?;

    info!("Starting blog-feed-browser");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    info!(api_base_url = %config.api_base_url, page_size = config.page_size, "Configuration loaded");

    let mut prefs = Preferences::load(&config.prefs_path).await;
    if let Ok(val) = std::env::var("INFINITE_SCROLL") {
        let enabled = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes" | "on");
        prefs
            .set_infinite_scroll(enabled)
            .await
            .context("Failed to persist scroll preference")?;
    }
    let mode = ScrollMode::from_infinite_flag(prefs.infinite_scroll());
    info!(?mode, "Scroll mode loaded from preferences");

    let theme = ThemeContext::new(Theme::Light);
    info!(theme = theme.get().as_str(), "Theme initialized");

    let client = ApiClient::new(&config).context("Failed to build API client")?;

    match client.list_tags().await {
        Ok(tags) => info!(available_tags = tags.len(), "Tag enumeration fetched"),
        Err(e) => warn!("Tag enumeration unavailable: {e}"),
    }

    let controller = Arc::new(FeedController::new(
        client.clone(),
        FeedQuery::new("", config.tag.clone(), config.page_size),
    ));

    // The input-state owner debounces the raw search term and forwards the
    // settled value to the controller, which begins a new query epoch.
    let search_debouncer = Debouncer::new(String::new(), config.debounce_window);
    {
        let controller = Arc::clone(&controller);
        let tag = config.tag.clone();
        let page_size = config.page_size;
        let mut debounced = search_debouncer.subscribe();
        tokio::spawn(async move {
            while debounced.changed().await.is_ok() {
                let term = debounced.borrow_and_update().clone();
                controller
                    .set_query(FeedQuery::new(term, tag.clone(), page_size))
                    .await;
            }
        });
    }

    let bridge = SentinelBridge::spawn(mode, Arc::clone(&controller));

    tokio::select! {
        result = session(&config, &client, &controller, &search_debouncer, &bridge, mode) => result?,
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    Ok(())
}

/// Drive one full feed session: start the first epoch, drain all pages in
/// the configured scroll mode, then show the tags and the first post's
/// detail view.
async fn session(
    config: &Config,
    client: &ApiClient,
    controller: &Arc<FeedController>,
    search_debouncer: &Debouncer<String>,
    bridge: &SentinelBridge,
    mode: ScrollMode,
) -> Result<()> {
    let mut updates = controller.subscribe();

    if config.search_term.is_empty() {
        controller.refresh().await;
    } else {
        info!(search_term = %config.search_term, "Debouncing search input");
        search_debouncer.submit(config.search_term.clone());
    }

    loop {
        updates
            .changed()
            .await
            .context("Feed controller went away")?;
        let snapshot = updates.borrow_and_update().clone();
        match snapshot.phase {
            FeedPhase::Settled if snapshot.has_more => match mode {
                ScrollMode::Infinite => bridge.notify_visible(),
                ScrollMode::Manual => controller.load_more().await,
            },
            FeedPhase::Settled => break,
            FeedPhase::Failed => {
                let message = snapshot.error.as_deref().unwrap_or("unknown error");
                error!(message, "Feed fetch failed; stopping session");
                break;
            }
            FeedPhase::Idle | FeedPhase::Loading => {}
        }
    }

    let snapshot = controller.snapshot();
    if snapshot.is_empty_result() {
        println!("No posts found.");
        return Ok(());
    }

    println!(
        "Loaded {} of {} posts:",
        snapshot.posts.len(),
        snapshot.total
    );
    for post in snapshot.posts.iter() {
        println!(
            "  #{} {} [{}] ({} likes)",
            post.id,
            post.title,
            post.tags.join(", "),
            post.reactions.likes
        );
    }
    println!("Tags in feed: {}", snapshot.unique_tags.join(", "));

    if let Some(first) = snapshot.posts.first() {
        let detail = load_detail(client, first.clone()).await;
        println!("\n--- {} ---", detail.post.title);
        println!("{}", detail.post.body);
        match (&detail.user, &detail.user_error) {
            (Some(user), _) => println!("by {}", user.display_name()),
            (None, Some(message)) => println!("author unavailable: {message}"),
            (None, None) => {}
        }
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,blog_feed_browser=debug"));

    // Check if JSON logging is requested
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| matches!(v.to_lowercase().as_str(), "json" | "structured"))
        .unwrap_or(false);

    if use_json {
        // Structured JSON logging for production
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    } else {
        // Pretty-printed logging for development
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;
    }

    Ok(())
}
