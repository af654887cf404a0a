//! Retrieve the raw text of a playlist source, over HTTP or from a local file
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ureq::{Agent, AgentBuilder};

/// Where a playlist is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    /// `http://` and `https://` locations (any case) are urls, everything else is a path with `~` expanded
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(location.to_string())
        } else {
            Source::File(PathBuf::from(shellexpand::tilde(location).as_ref()))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{url}"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchErrorKind {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("connection failed: {0}")]
    ConnectionRefused(String),
    #[error("server responded with status {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to fetch \"{location}\": {kind}")]
pub struct FetchError {
    pub location: String,
    #[source]
    pub kind: FetchErrorKind,
}

impl FetchError {
    pub fn new(source: &Source, kind: FetchErrorKind) -> Self {
        Self {
            location: source.to_string(),
            kind,
        }
    }

    /// A malformed location or a host refusing the connection stops the run regardless of the skip policy
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            FetchErrorKind::InvalidUrl(_) | FetchErrorKind::ConnectionRefused(_)
        )
    }
}

/// Anything that can turn a [`Source`] into playlist text
pub trait Fetch {
    fn fetch(&self, source: &Source) -> Result<String, FetchError>;
}

/// Blocking fetcher, one attempt per source
pub struct Fetcher {
    client: Agent,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Self {
        let client = AgentBuilder::new()
            .timeout_connect(timeout)
            .timeout_read(timeout)
            .build();

        Self { client }
    }

    fn get(&self, source: &Source, url: &str) -> Result<String, FetchError> {
        let resp = self.client.get(url).call().map_err(|err| {
            let kind = match err {
                ureq::Error::Status(code, _) => FetchErrorKind::Status(code),
                ureq::Error::Transport(transport) => match transport.kind() {
                    ureq::ErrorKind::InvalidUrl | ureq::ErrorKind::UnknownScheme => {
                        FetchErrorKind::InvalidUrl(transport.to_string())
                    }
                    ureq::ErrorKind::ConnectionFailed => {
                        FetchErrorKind::ConnectionRefused(transport.to_string())
                    }
                    _ => FetchErrorKind::Transport(transport.to_string()),
                },
            };
            FetchError::new(source, kind)
        })?;

        // not "into_string", as that caps the body at 10 megabytes
        let mut reader = resp.into_reader();
        let mut resp_data = Vec::new();
        reader
            .read_to_end(&mut resp_data)
            .map_err(|err| FetchError::new(source, err.into()))?;

        Ok(String::from_utf8_lossy(&resp_data).into_owned())
    }

    fn read_file(source: &Source, path: &Path) -> Result<String, FetchError> {
        let data = std::fs::read(path).map_err(|err| FetchError::new(source, err.into()))?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }
}

impl Fetch for Fetcher {
    fn fetch(&self, source: &Source) -> Result<String, FetchError> {
        match source {
            Source::Url(url) => self.get(source, url),
            Source::File(path) => Self::read_file(source, path),
        }
    }
}
