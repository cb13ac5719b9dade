//! Stub news source for testing and offline mode

use async_trait::async_trait;
use newsdesk_domain::{FetchError, NewsSource, RawArticle};

/// Stub news source serving a fixed article set
pub struct StubNewsSource {
    articles: Vec<RawArticle>,
    error: Option<FetchError>,
}

impl StubNewsSource {
    /// Create a stub with a small fixture set spanning several categories
    pub fn sample() -> Self {
        Self::with_articles(sample_articles())
    }

    /// Create a stub serving the given articles
    pub fn with_articles(articles: Vec<RawArticle>) -> Self {
        Self {
            articles,
            error: None,
        }
    }

    /// Create a stub that always fails
    pub fn with_error(error: FetchError) -> Self {
        Self {
            articles: vec![],
            error: Some(error),
        }
    }

    fn check_error(&self) -> Result<(), FetchError> {
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl Default for StubNewsSource {
    fn default() -> Self {
        Self::sample()
    }
}

#[async_trait]
impl NewsSource for StubNewsSource {
    async fn all_news(&self) -> Result<Vec<RawArticle>, FetchError> {
        self.check_error()?;
        Ok(self.articles.clone())
    }

    async fn category_news(&self, category: &str) -> Result<Vec<RawArticle>, FetchError> {
        self.check_error()?;
        Ok(self
            .articles
            .iter()
            .filter(|article| article.category.as_deref() == Some(category))
            .cloned()
            .collect())
    }

    async fn news_detail(&self, category: &str, id: &str) -> Result<RawArticle, FetchError> {
        self.check_error()?;
        self.articles
            .iter()
            .find(|article| {
                article.id.as_deref() == Some(id)
                    && article.category.as_deref() == Some(category)
            })
            .cloned()
            .ok_or_else(|| {
                FetchError::Transport(format!("unexpected status 404: no article {} in {}", id, category))
            })
    }
}

fn sample_articles() -> Vec<RawArticle> {
    fn fixture(
        id: &str,
        category: &str,
        title: &str,
        published_at: &str,
        image: bool,
    ) -> RawArticle {
        RawArticle {
            id: Some(id.to_string()),
            title: Some(title.to_string()),
            description: Some(format!("{} - summary", title)),
            content: Some(format!("{} - full text of the article.", title)),
            image_url: image.then(|| format!("https://cdn.example.com/{}.jpg", id)),
            url: Some(format!("https://news.example.com/{}/{}", category, id)),
            source: Some("example-wire".to_string()),
            published_at: Some(published_at.to_string()),
            category: Some(category.to_string()),
        }
    }

    vec![
        fixture("t1", "technology", "Chip makers race ahead", "2024-05-03T08:00:00Z", true),
        fixture("t2", "technology", "New framework released", "2024-05-02T10:30:00Z", false),
        fixture("s1", "science", "Probe reaches orbit", "2024-05-04T06:15:00Z", true),
        fixture("s2", "science", "Lab grows novel crystal", "2024-05-01T18:45:00Z", false),
        fixture("b1", "business", "Markets rally on earnings", "2024-05-03T21:00:00Z", true),
        fixture("g1", "general", "City opens new library", "2024-04-30T12:00:00Z", false),
    ]
}
