use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Category;
use crate::types::{Amount, TransactionId};

pub const AUTO_CAPTURED_LABEL: &str = "Auto Transaction";
pub const MANUAL_LOG_LABEL: &str = "Manual Log";

/// One logged expense, as persisted and as shown in the feed.
///
/// Instances are only produced by [`TransactionBuilder`](crate::models::TransactionBuilder),
/// the SMS simulator, or by loading a previously saved list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: Amount,
    pub merchant: String,
    pub category: Category,
    /// Round-trips as an ISO-8601 string.
    pub timestamp: DateTime<Utc>,
    /// Ingested by the SMS simulator rather than confirmed by the user. Display only.
    pub is_auto_captured: bool,
    /// A `data:` URL of the attached receipt photo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt_image: Option<String>
}

/// Display projection for anonymous mode. Stored records are never touched.
pub fn anonymized(transactions: &[Transaction]) -> Vec<Transaction> {
    transactions.iter()
        .map(|transaction| Transaction {
            merchant: if transaction.is_auto_captured { AUTO_CAPTURED_LABEL } else { MANUAL_LOG_LABEL }.to_string(),
            ..transaction.clone()
        })
        .collect()
}

/// Demo entries written on the very first launch, newest first.
pub fn seed_transactions(now: DateTime<Utc>) -> Vec<Transaction> {
    vec![
        Transaction {
            id: "tx1".to_string(),
            amount: Amount::from(25),
            merchant: "Chai Point".to_string(),
            category: Category::Food,
            timestamp: now,
            is_auto_captured: true,
            receipt_image: None
        },
        Transaction {
            id: "tx2".to_string(),
            amount: Amount::from(80),
            merchant: "Quick Cab".to_string(),
            category: Category::Travel,
            timestamp: now - Duration::hours(1),
            is_auto_captured: true,
            receipt_image: None
        }
    ]
}
