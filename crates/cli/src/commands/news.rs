//! News commands - list, show, and watch the article feed

use anyhow::{Context, Result, bail};
use newsdesk_adapters::news::{HttpNewsSource, StubNewsSource};
use newsdesk_domain::store::{NewsStore, StoreConfig};
use newsdesk_domain::{Article, FetchOutcome, NewsSource, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use time::format_description::well_known::Rfc3339;
use tokio::time::interval;

use crate::args::{NewsArgs, NewsCommands};
use crate::config::AppConfig;

type Store = NewsStore<dyn NewsSource, SystemClock>;

pub async fn execute(args: NewsArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    let store = build_store(&config)?;

    match args.command {
        NewsCommands::List { category, json } => list(&store, category.as_deref(), json).await,
        NewsCommands::Show { category, id, json } => show(&store, &category, &id, json).await,
        NewsCommands::Watch { category, interval } => {
            let interval_secs = interval.unwrap_or(config.watch.poll_interval_secs);
            watch(&store, category.as_deref(), interval_secs).await
        }
    }
}

fn build_store(config: &AppConfig) -> Result<Store> {
    let source = build_news_source(config)?;
    let store_config = StoreConfig {
        staleness_window: Duration::from_secs(config.cache.staleness_window_secs),
        fetch_timeout: Duration::from_secs(config.api.timeout_secs),
        related_limit: config.cache.related_limit,
    };
    Ok(NewsStore::new(source, Arc::new(SystemClock), store_config))
}

pub(crate) fn build_news_source(config: &AppConfig) -> Result<Arc<dyn NewsSource>> {
    match config.api.provider.as_str() {
        "http" => {
            let base_url = config.api.base_url.trim().trim_end_matches('/').to_string();
            if base_url.is_empty() {
                bail!("News API base_url is required for the http provider");
            }
            Ok(Arc::new(HttpNewsSource::with_timeout(
                base_url,
                Duration::from_secs(config.api.timeout_secs),
            )))
        }
        "stub" => Ok(Arc::new(StubNewsSource::sample())),
        other => bail!("Unknown news provider: {}", other),
    }
}

async fn list(store: &Store, category: Option<&str>, json: bool) -> Result<()> {
    let result = match category {
        Some(name) => store.fetch_category_news(name).await,
        None => store.fetch_all_news().await,
    };

    let state = store.state();
    let articles = match category {
        Some(_) => &state.category_news,
        None => &state.all_news,
    };

    if let Err(error) = result {
        // Stale-but-present data beats an error page.
        if articles.is_empty() {
            return Err(error).context("Failed to fetch news");
        }
        tracing::warn!(error = %error, "fetch failed; showing stale results");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(articles)?);
        return Ok(());
    }

    let heading = format!("News ({})", category.unwrap_or("all"));
    println!("{}", heading);
    println!("{}", "=".repeat(heading.len()));
    println!();

    if articles.is_empty() {
        println!("No articles.");
    }
    for article in articles {
        print_headline(article);
    }

    Ok(())
}

async fn show(store: &Store, category: &str, id: &str, json: bool) -> Result<()> {
    store
        .fetch_news_detail(category, id)
        .await
        .with_context(|| format!("Failed to fetch article {} in {}", id, category))?;

    let state = store.state();
    let article = state
        .current_article
        .as_ref()
        .context("No article after fetch")?;

    if json {
        let payload = serde_json::json!({
            "article": article,
            "related": state.related_news,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("{}", article.title);
    println!("{}", "=".repeat(article.title.len()));
    if let Some(source) = &article.source {
        println!("Source: {}", source);
    }
    println!("Published: {}", format_published(article));
    if let Some(url) = &article.url {
        println!("Link: {}", url);
    }
    println!();

    if let Some(content) = article.content.as_deref().or(article.description.as_deref()) {
        println!("{}", content);
        println!();
    }

    println!("Related articles");
    println!("----------------");
    if state.related_news.is_empty() {
        println!("(none)");
    }
    for related in &state.related_news {
        print_headline(related);
    }

    Ok(())
}

async fn watch(store: &Store, category: Option<&str>, interval_secs: u64) -> Result<()> {
    println!(
        "Watching {} news every {}s; Ctrl-C to stop.",
        category.unwrap_or("all"),
        interval_secs
    );

    let mut ticker = interval(Duration::from_secs(interval_secs.max(1)));

    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        tracing::info!("Shutdown signal received");
    };
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let result = match category {
                    Some(name) => store.fetch_category_news(name).await,
                    None => store.fetch_all_news().await,
                };
                match result {
                    Ok(FetchOutcome::Fetched) => {
                        let state = store.state();
                        let articles = match category {
                            Some(_) => &state.category_news,
                            None => &state.all_news,
                        };
                        println!();
                        println!("Top headlines:");
                        for article in articles.iter().take(5) {
                            print_headline(article);
                        }
                    }
                    Ok(FetchOutcome::Cached) => {
                        tracing::debug!("cache still fresh, nothing to report");
                    }
                    Err(error) => {
                        tracing::error!(error = %error, "poll failed");
                    }
                }
            }
            _ = &mut shutdown => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    Ok(())
}

fn print_headline(article: &Article) {
    println!(
        "- [{}] {} ({})",
        article.id,
        article.title,
        format_published(article)
    );
    if let Some(description) = article.description.as_deref().filter(|d| !d.is_empty()) {
        println!("    {}", description);
    }
}

fn format_published(article: &Article) -> String {
    article
        .published_at
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_else(|| "undated".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_news_source_rejects_unknown_provider() {
        let mut config = AppConfig::default();
        config.api.provider = "carrier-pigeon".to_string();
        assert!(build_news_source(&config).is_err());
    }

    #[test]
    fn build_news_source_requires_base_url_for_http() {
        let mut config = AppConfig::default();
        config.api.base_url = "   ".to_string();
        assert!(build_news_source(&config).is_err());
    }

    #[test]
    fn build_news_source_accepts_stub() {
        let mut config = AppConfig::default();
        config.api.provider = "stub".to_string();
        assert!(build_news_source(&config).is_ok());
    }
}
