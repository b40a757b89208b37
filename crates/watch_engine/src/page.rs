use std::fmt;

/// Raw body of one catalog page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogPage {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
    /// Where the page was finally served from, after redirects.
    pub final_url: String,
}

/// Anything that kept the cycle from getting an observed snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The URL or a configured header could not be turned into a request.
    BadRequest,
    /// The site refused the client (401, 403, 429).
    Blocked(u16),
    HttpStatus(u16),
    Timeout,
    TooManyRedirects,
    Oversized { limit: u64 },
    NotHtml(String),
    Decode,
    Parse,
    Network,
}

impl FailureKind {
    /// Whether the next scheduled cycle has a fair chance of succeeding.
    pub fn is_transient(&self) -> bool {
        match self {
            FailureKind::Timeout | FailureKind::Network => true,
            FailureKind::Blocked(code) => *code == 429,
            FailureKind::HttpStatus(code) => *code >= 500,
            _ => false,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::BadRequest => write!(f, "bad request"),
            FailureKind::Blocked(code) => write!(f, "blocked by site ({code})"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timed out"),
            FailureKind::TooManyRedirects => write!(f, "too many redirects"),
            FailureKind::Oversized { limit } => write!(f, "page larger than {limit} bytes"),
            FailureKind::NotHtml(content_type) => write!(f, "not an html page ({content_type})"),
            FailureKind::Decode => write!(f, "undecodable page"),
            FailureKind::Parse => write!(f, "unexpected page structure"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
