//! Fetch collaborators: turn a word into its entry document or a confirmed absence.

use crate::checkpoint::{Archive, CheckpointError};
use crate::controls::CrawlControls;
use crate::html::{PageContent, ResultPage};
use reqwest::Client;
use std::path::PathBuf;
use thiserror::Error;
use url::form_urlencoded;
use url::Url;

const USER_AGENT: &str = "vortcrawl/0.1 (dictionary headword harvester)";
const WORD_PLACEHOLDER: &str = "{word}";

/// Terminal result of searching one word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The entry document for the word.
    Found(String),
    /// The source confirmed it has no entry for the word.
    NotFound,
}

/// Any failure that is not a confirmed absence. Always fatal for the run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete in time.
    #[error("timed out waiting for {url}")]
    Timeout {
        /// Requested URL.
        url: String,
    },
    /// Connection or protocol failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        source: reqwest::Error,
    },
    /// The source answered with a non-success status.
    #[error("{url} answered with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The page had neither results nor the no-entry marker.
    #[error("{url} contained neither results nor the no-entry marker")]
    MissingContent {
        /// Requested URL.
        url: String,
    },
    /// The search URL could not be built.
    #[error("cannot build a search url for {word:?}: {source}")]
    Url {
        /// Word being searched.
        word: String,
        /// Parse failure.
        source: url::ParseError,
    },
    /// An archived entry could not be read.
    #[error(transparent)]
    Archive(#[from] CheckpointError),
}

impl FetchError {
    /// Short error class used in diagnostics.
    pub fn class(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "status",
            Self::MissingContent { .. } => "missing-content",
            Self::Url { .. } => "url",
            Self::Archive(_) => "archive",
        }
    }
}

/// Source of entry documents.
///
/// Exactly one fetch is in flight at a time; the crawl engine awaits each
/// call before starting the next.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    /// Searches `word`.
    async fn fetch(&self, word: &str) -> Result<FetchOutcome, FetchError>;
}

/// Searches the live dictionary over HTTP.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    url_template: String,
    page: ResultPage,
}

impl HttpFetcher {
    /// Builds a client honoring the controls' timeout and URL template.
    pub fn new(controls: &CrawlControls) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(controls.fetch_timeout())
            .build()?;
        Ok(Self {
            client,
            url_template: controls.url_template().to_string(),
            page: ResultPage::default(),
        })
    }

    /// Search URL for `word`.
    pub fn url_for(&self, word: &str) -> Result<Url, FetchError> {
        let encoded: String = form_urlencoded::byte_serialize(word.as_bytes()).collect();
        Url::parse(&self.url_template.replace(WORD_PLACEHOLDER, &encoded)).map_err(|source| {
            FetchError::Url {
                word: word.to_string(),
                source,
            }
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, word: &str) -> Result<FetchOutcome, FetchError> {
        let url = self.url_for(word)?;
        let label = url.to_string();
        let transport_error = |err: reqwest::Error| {
            if err.is_timeout() {
                FetchError::Timeout { url: label.clone() }
            } else {
                FetchError::Transport {
                    url: label.clone(),
                    source: err,
                }
            }
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: label.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.text().await.map_err(transport_error)?;

        match self.page.classify(&body) {
            PageContent::Entries(document) => Ok(FetchOutcome::Found(document)),
            PageContent::NoEntry => Ok(FetchOutcome::NotFound),
            PageContent::Unrecognized => Err(FetchError::MissingContent { url: label }),
        }
    }
}

/// Replays a raw-document archive written by an earlier crawl.
///
/// Only found words are ever archived, so a word without an archive file is
/// reported as not found.
#[derive(Debug, Clone)]
pub struct ArchiveFetcher {
    archive: Archive,
}

impl ArchiveFetcher {
    /// Replays the archive in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            archive: Archive::new(dir),
        }
    }
}

impl Fetcher for ArchiveFetcher {
    async fn fetch(&self, word: &str) -> Result<FetchOutcome, FetchError> {
        Ok(match self.archive.load(word)? {
            Some(document) => FetchOutcome::Found(document),
            None => FetchOutcome::NotFound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn url_template_encodes_word() {
        let fetcher = HttpFetcher::new(&CrawlControls::default()).expect("client");
        let url = fetcher.url_for("ĉu kaj?").expect("url");
        assert_eq!(url.as_str(), "https://vortaro.net/?s=%C4%89u+kaj%3F");
    }

    #[test]
    fn error_classes_are_stable() {
        let err = FetchError::Timeout {
            url: "https://vortaro.net/?s=x".to_string(),
        };
        assert_eq!(err.class(), "timeout");
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn archive_replay_maps_files_to_outcomes() {
        let dir = TempDir::new().expect("tempdir");
        let archive = Archive::new(dir.path());
        archive.store("hundo", "<p>hundo</p>").expect("store");

        let fetcher = ArchiveFetcher::new(dir.path());
        assert_eq!(
            fetcher.fetch("hundo").await.expect("fetch"),
            FetchOutcome::Found("<p>hundo</p>".to_string())
        );
        assert_eq!(
            fetcher.fetch("kato").await.expect("fetch"),
            FetchOutcome::NotFound
        );
    }
}
