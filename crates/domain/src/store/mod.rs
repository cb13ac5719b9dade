//! Observable news store
//!
//! `NewsStore` owns all article state for the session. Mutation happens only
//! through the commit helper, which applies a change inside a short lock
//! scope (never held across an await) and then broadcasts a snapshot over a
//! watch channel for the presentation layer.

mod user;

pub use user::{UserState, UserStore};

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::watch;

use crate::freshness::{CacheKey, FreshnessTracker, DEFAULT_STALENESS_WINDOW};
use crate::model::{Article, FetchOutcome};
use crate::normalize::{normalize, validate, validate_all};
use crate::ports::{Clock, FetchError, NewsSource};
use crate::related::{assemble_related, DEFAULT_RELATED_LIMIT};

/// Default bound on each remote call: 10 seconds.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Characters of `content` used when a detail record has no description.
const DESCRIPTION_FALLBACK_CHARS: usize = 150;

/// Tuning knobs for the store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// How long a successful fetch satisfies subsequent reads
    pub staleness_window: Duration,
    /// Deadline applied to every remote call
    pub fetch_timeout: Duration,
    /// Maximum entries in the related-articles list
    pub related_limit: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            staleness_window: DEFAULT_STALENESS_WINDOW,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            related_limit: DEFAULT_RELATED_LIMIT,
        }
    }
}

/// Observable article state
#[derive(Debug, Clone, Default)]
pub struct NewsState {
    pub all_news: Vec<Article>,
    pub category_news: Vec<Article>,
    pub current_article: Option<Article>,
    pub related_news: Vec<Article>,
    pub loading: bool,
    pub loading_related: bool,
    /// Latest fetch failure; cleared at the start of the next attempt
    pub last_error: Option<FetchError>,
}

struct Inner {
    state: NewsState,
    freshness: FreshnessTracker,
}

/// In-memory news store over a `NewsSource`
pub struct NewsStore<S, C>
where
    S: NewsSource + ?Sized,
    C: Clock + ?Sized,
{
    source: Arc<S>,
    clock: Arc<C>,
    config: StoreConfig,
    inner: Mutex<Inner>,
    tx: watch::Sender<NewsState>,
}

impl<S, C> NewsStore<S, C>
where
    S: NewsSource + ?Sized,
    C: Clock + ?Sized,
{
    pub fn new(source: Arc<S>, clock: Arc<C>, config: StoreConfig) -> Self {
        let state = NewsState::default();
        let (tx, _rx) = watch::channel(state.clone());
        let freshness = FreshnessTracker::new(config.staleness_window);

        Self {
            source,
            clock,
            config,
            inner: Mutex::new(Inner { state, freshness }),
            tx,
        }
    }

    /// Subscribe to state snapshots; one is broadcast after every mutation
    pub fn subscribe(&self) -> watch::Receiver<NewsState> {
        self.tx.subscribe()
    }

    /// Current state snapshot
    pub fn state(&self) -> NewsState {
        self.lock().state.clone()
    }

    /// Fetch the cross-category article list, deduplicated and sorted.
    ///
    /// Served from cache when the `all` key is fresh and the list is
    /// non-empty; otherwise one remote call is made.
    pub async fn fetch_all_news(&self) -> Result<FetchOutcome, FetchError> {
        let now = self.clock.now();
        {
            let inner = self.lock();
            if inner.freshness.is_fresh(&CacheKey::All, now) && !inner.state.all_news.is_empty() {
                tracing::debug!(key = %CacheKey::All, "serving cached article list");
                return Ok(FetchOutcome::Cached);
            }
        }

        self.commit(|inner| {
            inner.state.loading = true;
            inner.state.last_error = None;
        });

        match self.with_deadline(self.source.all_news()).await {
            Ok(raw) => {
                let articles = normalize(raw);
                tracing::info!(count = articles.len(), "fetched all news");
                self.commit(|inner| {
                    inner.state.all_news = articles;
                    inner.state.loading = false;
                    inner.freshness.mark(CacheKey::All, now);
                });
                Ok(FetchOutcome::Fetched)
            }
            Err(error) => {
                tracing::warn!(error = %error, "failed to fetch all news");
                self.fail(error)
            }
        }
    }

    /// Fetch one category's article list, deduplicated and sorted.
    pub async fn fetch_category_news(&self, category: &str) -> Result<FetchOutcome, FetchError> {
        let now = self.clock.now();
        let key = CacheKey::category(category);
        {
            let inner = self.lock();
            if inner.freshness.is_fresh(&key, now) && !inner.state.category_news.is_empty() {
                tracing::debug!(key = %key, "serving cached category list");
                return Ok(FetchOutcome::Cached);
            }
        }

        self.commit(|inner| {
            inner.state.loading = true;
            inner.state.last_error = None;
        });

        match self.with_deadline(self.source.category_news(category)).await {
            Ok(raw) => {
                let articles = normalize(raw);
                tracing::info!(category, count = articles.len(), "fetched category news");
                self.commit(|inner| {
                    inner.state.category_news = articles;
                    inner.state.loading = false;
                    inner.freshness.mark(key, now);
                });
                Ok(FetchOutcome::Fetched)
            }
            Err(error) => {
                tracing::warn!(category, error = %error, "failed to fetch category news");
                self.fail(error)
            }
        }
    }

    /// Fetch one article's detail record, then refresh the related list.
    ///
    /// The related fetch is issued only after the detail state commit, and
    /// runs even when the detail itself was served from cache.
    pub async fn fetch_news_detail(
        &self,
        category: &str,
        id: &str,
    ) -> Result<FetchOutcome, FetchError> {
        let now = self.clock.now();
        let key = CacheKey::detail(category, id);
        let cached = {
            let inner = self.lock();
            inner.freshness.is_fresh(&key, now)
                && inner
                    .state
                    .current_article
                    .as_ref()
                    .is_some_and(|article| article.id == id)
        };
        if cached {
            tracing::debug!(key = %key, "serving cached article detail");
            self.fetch_related_news(category, id).await;
            return Ok(FetchOutcome::Cached);
        }

        self.commit(|inner| {
            inner.state.loading = true;
            inner.state.last_error = None;
        });

        match self.with_deadline(self.source.news_detail(category, id)).await {
            Ok(raw) => {
                let Some(mut article) = validate(raw) else {
                    let error = FetchError::Contract("article record missing id or title".into());
                    tracing::warn!(key = %key, "detail record failed validation");
                    return self.fail(error);
                };
                apply_detail_defaults(&mut article, now);
                if article.category.is_none() {
                    article.category = Some(category.to_string());
                }

                tracing::info!(key = %key, "fetched article detail");
                self.commit(|inner| {
                    inner.state.current_article = Some(article);
                    inner.state.loading = false;
                    inner.freshness.mark(key, now);
                });

                self.fetch_related_news(category, id).await;
                Ok(FetchOutcome::Fetched)
            }
            Err(error) => {
                tracing::warn!(key = %key, error = %error, "failed to fetch article detail");
                self.fail(error)
            }
        }
    }

    /// Rebuild the related-articles list for a target article.
    ///
    /// Never surfaces an error: a failed input fetch contributes an empty
    /// pool and assembly proceeds with whatever remains.
    pub async fn fetch_related_news(&self, category: &str, id: &str) {
        self.commit(|inner| inner.state.loading_related = true);

        let same_category = self.related_pool_category(category).await;
        let all_news = self.related_pool_all().await;
        let related = assemble_related(id, &same_category, &all_news, self.config.related_limit);

        tracing::debug!(target = id, count = related.len(), "assembled related articles");
        self.commit(|inner| {
            inner.state.related_news = related;
            inner.state.loading_related = false;
        });
    }

    /// Same-category pool: reuse the held list when it was stamped for this
    /// category, otherwise fetch without touching the cache bookkeeping.
    async fn related_pool_category(&self, category: &str) -> Vec<Article> {
        let reusable = {
            let inner = self.lock();
            (!inner.state.category_news.is_empty()
                && inner.freshness.has_stamp(&CacheKey::category(category)))
            .then(|| inner.state.category_news.clone())
        };
        if let Some(articles) = reusable {
            return articles;
        }

        match self.with_deadline(self.source.category_news(category)).await {
            Ok(raw) => validate_all(raw),
            Err(error) => {
                tracing::warn!(category, error = %error, "related pool (category) unavailable");
                Vec::new()
            }
        }
    }

    async fn related_pool_all(&self) -> Vec<Article> {
        let reusable = {
            let inner = self.lock();
            (!inner.state.all_news.is_empty() && inner.freshness.has_stamp(&CacheKey::All))
                .then(|| inner.state.all_news.clone())
        };
        if let Some(articles) = reusable {
            return articles;
        }

        match self.with_deadline(self.source.all_news()).await {
            Ok(raw) => validate_all(raw),
            Err(error) => {
                tracing::warn!(error = %error, "related pool (all) unavailable");
                Vec::new()
            }
        }
    }

    /// Bound a remote call by the configured deadline.
    async fn with_deadline<T, F>(&self, fetch: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        match tokio::time::timeout(self.config.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }

    fn fail(&self, error: FetchError) -> Result<FetchOutcome, FetchError> {
        self.commit(|inner| {
            inner.state.loading = false;
            inner.state.last_error = Some(error.clone());
        });
        Err(error)
    }

    /// Apply a mutation and broadcast the resulting snapshot.
    fn commit(&self, apply: impl FnOnce(&mut Inner)) {
        let snapshot = {
            let mut inner = self.lock();
            apply(&mut inner);
            inner.state.clone()
        };
        self.tx.send_replace(snapshot);
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Detail records come back sparse: fall back to a content excerpt for the
/// description and to the fetch time for the timestamp.
fn apply_detail_defaults(article: &mut Article, now: time::OffsetDateTime) {
    if article.description.as_deref().is_none_or(str::is_empty) {
        article.description = article
            .content
            .as_deref()
            .map(|content| content.chars().take(DESCRIPTION_FALLBACK_CHARS).collect());
    }
    if article.published_at.is_none() {
        article.published_at = Some(now);
    }
}
