//! Client for the Gutendex catalogue of Project Gutenberg books.

use std::future::Future;

use anyhow::{Context, Result};
use tracing::debug;

use crate::{config::Config, types::candidate::RawBookRecord};

pub mod schema;

/// Anything able to turn a title into candidate records.
pub trait BookSource {
    fn fetch_by_title(
        &self,
        title: &str,
    ) -> impl Future<Output = Result<Vec<RawBookRecord>>> + Send;
}

#[derive(Debug, Clone)]
pub struct Gutendex {
    client:  reqwest::Client,
    api_url: String,
}

impl Gutendex {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            client:  reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone())
    }

    /// Decodes a search response body, reporting the path of the offending
    /// field when the payload doesn't match.
    pub fn decode(body: &str) -> Result<Vec<RawBookRecord>> {
        let deserializer = &mut serde_json::Deserializer::from_str(body);
        let results: schema::SearchResults = serde_path_to_error::deserialize(deserializer)
            .context("Unexpected response from the catalogue")?;
        Ok(results
            .results
            .into_iter()
            .map(RawBookRecord::from)
            .collect())
    }
}

impl BookSource for Gutendex {
    async fn fetch_by_title(&self, title: &str) -> Result<Vec<RawBookRecord>> {
        debug!("Searching {} for {title:?}", self.api_url);
        let resp = self
            .client
            .get(&self.api_url)
            .query(&[("search", title)])
            .send()
            .await
            .context("Couldn't reach the catalogue")?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Catalogue answered with status {status}");
        }
        let body = resp.text().await?;
        Self::decode(&body)
    }
}
