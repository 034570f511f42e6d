use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ai_client::Gemini;
use showcase_common::{Config, SnapshotStore};
use showcase_scout::classifier::{GeminiClassifier, KeywordClassifier, NoopClassifier};
use showcase_scout::digest::{render_digest, write_digest};
use showcase_scout::engagement::HttpEngagementFetcher;
use showcase_scout::maintenance::{clean_false_positives, refresh_engagement};
use showcase_scout::pipeline::Crawler;
use showcase_scout::profiles::{CrawlProfile, ProfileName};
use showcase_scout::sources::{LinkedInApi, SerpSearcher, YouTubeSearcher};
use showcase_scout::traits::{Classifier, NoopSearcher, VideoSearcher};

#[derive(Parser)]
#[command(name = "scout", about = "Finds and curates examples of software built with AI tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search, classify and write a new snapshot
    Crawl {
        /// Keyword set and pacing: general, design or linkedin
        #[arg(long, default_value = "general")]
        profile: ProfileName,
        /// Stop once this many examples are accepted
        #[arg(long)]
        target: Option<usize>,
        /// Score by tool keywords instead of calling Gemini
        #[arg(long)]
        no_model: bool,
    },
    /// Re-scrape LinkedIn engagement counts in the latest snapshot
    Engagement,
    /// Remove keyword-flagged false positives from the latest snapshot
    Clean,
    /// Render the review digest for the latest snapshot
    Digest,
    /// Report which integrations are configured and reachable
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("showcase=info".parse()?)
                .add_directive("scout=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_redacted();
    let store = SnapshotStore::new(&config.data_dir);

    match cli.command {
        Command::Crawl {
            profile,
            target,
            no_model,
        } => {
            let mut profile = CrawlProfile::for_name(profile);
            if let Some(target) = target {
                profile = profile.with_target(target);
            }
            let crawler = build_crawler(&config, store, no_model).await?;
            let report = crawler.run(&profile).await?;
            match report.path {
                Some(path) => info!(path = %path.display(), accepted = report.accepted, "Snapshot written"),
                None => info!(accepted = report.accepted, total = report.written, "Crawl finished"),
            }
        }
        Command::Engagement => {
            let fetcher = HttpEngagementFetcher::new()?;
            refresh_engagement(&store, &fetcher).await?;
        }
        Command::Clean => {
            let report = clean_false_positives(&store)?;
            for (title, reason) in report.removed.iter().take(10) {
                info!(title = title.as_str(), %reason, "Removed example");
            }
        }
        Command::Digest => {
            let records = store.load().context("Failed to load snapshot")?;
            let email_to = config.email_to.as_deref().unwrap_or_else(|| {
                warn!("EMAIL_TO not set, digest links will have no recipient");
                ""
            });
            let today = Local::now().date_naive();
            let html = render_digest(&records, email_to, today);
            write_digest(&config.data_dir, &html, today)?;
        }
        Command::Check => check(&config).await,
    }

    Ok(())
}

async fn build_crawler(config: &Config, store: SnapshotStore, no_model: bool) -> Result<Crawler> {
    let videos: Arc<dyn VideoSearcher> = match &config.youtube_api_key {
        Some(key) => Arc::new(YouTubeSearcher::new(key)?),
        None => {
            warn!("YOUTUBE_API_KEY not set, skipping YouTube");
            Arc::new(NoopSearcher { source: "youtube" })
        }
    };

    let classifier: Arc<dyn Classifier> = match &config.gemini_api_key {
        _ if no_model => {
            info!("Scoring by tool keywords, Gemini not used");
            Arc::new(KeywordClassifier)
        }
        Some(key) => {
            let gemini = GeminiClassifier::connect(key, &config.gemini_model).await;
            info!(model = gemini.model(), "Classifier ready");
            Arc::new(gemini)
        }
        None => {
            warn!("GEMINI_API_KEY not set, every candidate will score zero");
            Arc::new(NoopClassifier)
        }
    };

    let mut crawler = Crawler::new(videos, classifier, store);

    if let Some(key) = &config.serpapi_key {
        let engagement = Arc::new(HttpEngagementFetcher::new()?);
        crawler = crawler.with_post_searcher(Arc::new(SerpSearcher::new(key, engagement)?));
    } else {
        warn!("SERPAPI_KEY not set, skipping LinkedIn search via SerpAPI");
    }
    if let Some(token) = &config.linkedin_access_token {
        crawler = crawler.with_post_searcher(Arc::new(LinkedInApi::new(token)?));
    }

    Ok(crawler)
}

async fn check(config: &Config) {
    match &config.youtube_api_key {
        Some(key) => match YouTubeSearcher::new(key) {
            Ok(youtube) => match youtube.ping().await {
                Ok(()) => info!("YouTube API reachable"),
                Err(e) => warn!(error = %e, "YouTube API check failed"),
            },
            Err(e) => warn!(error = %e, "YouTube client could not be built"),
        },
        None => warn!("YOUTUBE_API_KEY not set"),
    }

    match &config.gemini_api_key {
        Some(key) => match Gemini::new(key.as_str(), config.gemini_model.as_str()).ping().await {
            Ok(()) => info!(model = config.gemini_model.as_str(), "Gemini model reachable"),
            Err(e) => warn!(model = config.gemini_model.as_str(), error = %e, "Gemini check failed"),
        },
        None => warn!("GEMINI_API_KEY not set"),
    }

    if config.serpapi_key.is_none() && config.linkedin_access_token.is_none() {
        warn!("Neither SERPAPI_KEY nor LINKEDIN_ACCESS_TOKEN set, LinkedIn search disabled");
    }
    if config.email_to.is_none() {
        warn!("EMAIL_TO not set");
    }
}
