mod gemini;

use std::future::Future;

use crate::models::{ParseResult, Transaction};

pub use gemini::GeminiParser;

/// What the user handed over to be read.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseRequest {
    Text(String),
    Image {
        bytes: Vec<u8>,
        mime: String
    },
    Audio {
        bytes: Vec<u8>,
        mime: String
    }
}

/// The generative model behind the tracker.
///
/// Implementations never fail past this boundary: transport errors, timeouts and
/// malformed answers all come back as `None`.
pub trait Parser: Send + Sync + 'static {
    fn parse(&self, request: ParseRequest) -> impl Future<Output = Option<ParseResult>> + Send;

    /// One sentence about the given recent spends.
    fn insight(&self, recent: &[Transaction]) -> impl Future<Output = Option<String>> + Send;
}

/// Used when no API key is configured; every request comes back empty.
pub struct OfflineParser;

impl Parser for OfflineParser {
    async fn parse(&self, _request: ParseRequest) -> Option<ParseResult> {
        None
    }

    async fn insight(&self, _recent: &[Transaction]) -> Option<String> {
        None
    }
}
