//! Loaders for the read-only base event list.
//!
//! A base source is fetched once at startup. Every failure is reported as
//! `NoticeBoardError::SourceLoad`; the event store decides what to do with it.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};

use crate::error::{NoticeBoardError, NoticeBoardResult};
use crate::event::Event;

const USER_AGENT: &str = concat!("noticeboard/", env!("CARGO_PKG_VERSION"));

/// Somewhere the base events can be fetched from.
pub trait BaseSource {
    fn fetch(&self) -> impl Future<Output = NoticeBoardResult<Vec<Event>>> + Send;

    /// Human-readable location, for logs.
    fn describe(&self) -> String;
}

/// Parse a JSON array of events.
pub fn parse_events(bytes: &[u8]) -> NoticeBoardResult<Vec<Event>> {
    serde_json::from_slice(bytes)
        .map_err(|e| NoticeBoardError::SourceLoad(format!("Invalid event list: {e}")))
}

/// Base events served over HTTP(S). Always requested fresh.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> NoticeBoardResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| NoticeBoardError::SourceLoad(e.to_string()))?;

        Ok(HttpSource {
            url: url.into(),
            client,
        })
    }
}

impl BaseSource for HttpSource {
    async fn fetch(&self) -> NoticeBoardResult<Vec<Event>> {
        let response = self
            .client
            .get(&self.url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await
            .map_err(|e| NoticeBoardError::SourceLoad(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NoticeBoardError::SourceLoad(format!(
                "{} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| NoticeBoardError::SourceLoad(e.to_string()))?;

        parse_events(&body)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Base events bundled as a JSON file on disk.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl BaseSource for FileSource {
    async fn fetch(&self) -> NoticeBoardResult<Vec<Event>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            NoticeBoardError::SourceLoad(format!("{}: {e}", self.path.display()))
        })?;
        parse_events(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// The default event list compiled into the binary.
pub const BUNDLED_EVENTS: &[u8] = include_bytes!("../data/events.json");

/// Base events from the list shipped with the crate.
pub struct BundledSource;

impl BaseSource for BundledSource {
    async fn fetch(&self) -> NoticeBoardResult<Vec<Event>> {
        parse_events(BUNDLED_EVENTS)
    }

    fn describe(&self) -> String {
        "bundled event list".to_string()
    }
}

/// A fixed, in-memory event list.
pub struct StaticSource(pub Vec<Event>);

impl BaseSource for StaticSource {
    async fn fetch(&self) -> NoticeBoardResult<Vec<Event>> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        format!("{} built-in events", self.0.len())
    }
}

/// Where the configured base list lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Url(String),
    Path(PathBuf),
    /// The list compiled in as `BUNDLED_EVENTS`.
    Bundled,
}

impl SourceLocation {
    /// `http://` and `https://` values are URLs, anything else a file path.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            SourceLocation::Url(value.to_string())
        } else {
            let expanded = shellexpand::tilde(value).into_owned();
            SourceLocation::Path(PathBuf::from(expanded))
        }
    }

    pub fn into_source(self, timeout: Duration) -> NoticeBoardResult<AnySource> {
        Ok(match self {
            SourceLocation::Url(url) => AnySource::Http(HttpSource::new(url, timeout)?),
            SourceLocation::Path(path) => AnySource::File(FileSource::new(path)),
            SourceLocation::Bundled => AnySource::Bundled(BundledSource),
        })
    }
}

/// Any of the built-in sources, selected at runtime from configuration.
pub enum AnySource {
    Http(HttpSource),
    File(FileSource),
    Bundled(BundledSource),
    Static(StaticSource),
}

impl BaseSource for AnySource {
    async fn fetch(&self) -> NoticeBoardResult<Vec<Event>> {
        match self {
            AnySource::Http(s) => s.fetch().await,
            AnySource::File(s) => s.fetch().await,
            AnySource::Bundled(s) => s.fetch().await,
            AnySource::Static(s) => s.fetch().await,
        }
    }

    fn describe(&self) -> String {
        match self {
            AnySource::Http(s) => s.describe(),
            AnySource::File(s) => s.describe(),
            AnySource::Bundled(s) => s.describe(),
            AnySource::Static(s) => s.describe(),
        }
    }
}
