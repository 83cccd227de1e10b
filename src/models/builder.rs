use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::models::errors::BuildError;
use crate::models::{Category, Transaction};
use crate::types::{Amount, TransactionId};

const PHOTO_RECEIPT_LABEL: &str = "Photo Receipt";
const MANUAL_ENTRY_LABEL: &str = "Manual Entry";

const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Whatever fields the parser managed to extract. Any subset may be missing.
///
/// Each field is read on its own: a field of the wrong JSON type is dropped
/// without discarding the rest of the payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParseResult {
    #[serde(default, deserialize_with = "lenient_number")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub merchant: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: Option<String>
}

impl ParseResult {
    /// Reads a JSON object. Anything that is not an object yields `None`.
    pub fn from_json(payload: &str) -> Option<ParseResult> {
        serde_json::from_str(payload.trim()).ok()
    }

    /// Whether a usable, non-zero amount was read.
    pub fn has_amount(&self) -> bool {
        self.amount.is_some_and(|amount| amount.is_finite() && amount > 0.0)
    }
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_str().map(str::to_string))
}

/// Fallbacks taken from the input panel when the parse result is missing fields.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    /// Raw text the user typed, possibly empty.
    pub manual_text: String,
    /// Image attached before the parse finished.
    pub pending_image: Option<String>,
    pub is_auto_captured: bool,
    /// Image handed over together with this parse. Wins over `pending_image`.
    pub explicit_image: Option<String>
}

impl BuildContext {
    pub fn manual(text: impl Into<String>) -> Self {
        Self {
            manual_text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_pending_image(mut self, image: Option<String>) -> Self {
        self.pending_image = image;
        self
    }

    pub fn with_explicit_image(mut self, image: Option<String>) -> Self {
        self.explicit_image = image;
        self
    }

    #[cfg(test)]
    pub fn auto_captured(mut self, is_auto_captured: bool) -> Self {
        self.is_auto_captured = is_auto_captured;
        self
    }

    fn attached_image(&self) -> Option<&String> {
        self.explicit_image.as_ref().or(self.pending_image.as_ref())
    }
}

/// Source of transaction ids. Every call must return an id never handed out before.
pub trait IdGenerator: Send + Sync + 'static {
    fn next_id(&self) -> TransactionId;
}

/// Random ids, e.g. `tx-3f1c...`.
pub struct UuidIds {
    prefix: &'static str
}

impl UuidIds {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }
}

impl IdGenerator for UuidIds {
    fn next_id(&self) -> TransactionId {
        format!("{}-{}", self.prefix, Uuid::new_v4().simple())
    }
}

/// Deterministic ids `prefix-1`, `prefix-2`, ...
#[cfg(test)]
pub struct SequentialIds {
    prefix: &'static str,
    next: std::sync::atomic::AtomicU64
}

#[cfg(test)]
impl SequentialIds {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, next: std::sync::atomic::AtomicU64::new(1) }
    }
}

#[cfg(test)]
impl IdGenerator for SequentialIds {
    fn next_id(&self) -> TransactionId {
        format!("{}-{}", self.prefix, self.next.fetch_add(1, std::sync::atomic::Ordering::Relaxed))
    }
}

/// Turns a (possibly empty) parse result plus input fallbacks into a [`Transaction`].
///
/// The builder is pure apart from drawing an id; clearing the input panel after a
/// successful build is up to the caller.
pub struct TransactionBuilder<I: IdGenerator> {
    ids: I
}

impl<I: IdGenerator> TransactionBuilder<I> {
    pub fn new(ids: I) -> Self {
        Self { ids }
    }

    pub fn build(&self, parsed: Option<&ParseResult>, context: &BuildContext) -> Result<Transaction, BuildError> {
        self.build_at(parsed, context, Utc::now())
    }

    /// Builds using `now` as the creation time.
    ///
    /// # Errors
    /// Returns `BuildError::NoAmount` when neither the parse result nor the manual text
    /// yields an amount and no image is attached. Every other field always resolves.
    pub fn build_at(&self, parsed: Option<&ParseResult>, context: &BuildContext, now: DateTime<Utc>) -> Result<Transaction, BuildError> {
        let amount = resolve_amount(parsed, context)
            .ok_or_else(|| BuildError::no_amount(context))?;

        let transaction = Transaction {
            id: self.ids.next_id(),
            amount,
            merchant: resolve_merchant(parsed, context),
            category: parsed
                .and_then(|parsed| parsed.category.as_deref())
                .and_then(Category::recognize)
                .unwrap_or(Category::Misc),
            timestamp: parsed
                .and_then(|parsed| parsed.timestamp.as_deref())
                .and_then(parse_timestamp)
                .unwrap_or(now),
            is_auto_captured: context.is_auto_captured,
            receipt_image: context.attached_image().cloned()
        };

        debug!("Built transaction [{}] of {} at [{}]", transaction.id, transaction.amount, transaction.merchant);

        Ok(transaction)
    }
}

fn resolve_amount(parsed: Option<&ParseResult>, context: &BuildContext) -> Option<Amount> {
    let from_parse = parsed
        .and_then(|parsed| parsed.amount)
        .and_then(|amount| match Amount::from_f64(amount) {
            Ok(amount) => Some(amount),
            Err(error) => {
                debug!("Ignoring parsed amount: {error}");
                None
            }
        });

    from_parse
        .or_else(|| Amount::parse_leading(&context.manual_text).ok())
        .or_else(|| context.attached_image().map(|_| Amount::zero()))
}

fn resolve_merchant(parsed: Option<&ParseResult>, context: &BuildContext) -> String {
    let from_parse = parsed
        .and_then(|parsed| parsed.merchant.as_deref())
        .map(str::trim)
        .filter(|merchant| !merchant.is_empty());

    // The first token may well be the amount itself ("120 for lunch" -> "120"); kept as-is.
    let from_text = context.manual_text.split_whitespace().next();

    let placeholder = if context.attached_image().is_some() { PHOTO_RECEIPT_LABEL } else { MANUAL_ENTRY_LABEL };

    from_parse.or(from_text).unwrap_or(placeholder).to_string()
}

/// Reads an RFC 3339 timestamp, a naive local date-time, or a bare date (UTC midnight).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.with_timezone(&Utc));
    }

    for format in NAIVE_TIMESTAMP_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Local.from_local_datetime(&naive).earliest().map(|local| local.with_timezone(&Utc));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
