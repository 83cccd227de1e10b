
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::models::{Category, IdGenerator, Transaction};
use crate::types::Amount;

pub const SMS_TEMPLATES: [&str; 5] = [
    "Paid ₹20.00 for Chai at Raju Tea Stall. Ref: UPI 432109.",
    "Your a/c X1234 debited by ₹35.00 to Auto Rickshaw. Bal: ₹4500.",
    "Success: ₹199 paid for Monthly Netflix Sub.",
    "UPI: ₹45 sent to Om Sweets for Samosa.",
    "Wallet Debit: ₹12 for public parking."
];

static RUPEE_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"₹(\d+\.?\d*)").expect("rupee amount pattern is valid")
});

/// Turns canned bank alerts into auto-captured transactions.
pub struct SmsSimulator<I: IdGenerator> {
    ids: I
}

impl<I: IdGenerator> SmsSimulator<I> {
    pub fn new(ids: I) -> Self {
        Self { ids }
    }

    /// Reads one alert. The first rupee figure is the amount (zero if there is none).
    pub fn from_message(&self, message: &str, now: DateTime<Utc>) -> Transaction {
        let amount = message_amount(message).unwrap_or_default();

        let (merchant, category) = if message.contains("Chai") {
            ("Raju Tea", Category::Food)
        } else if message.contains("Rickshaw") {
            ("Auto Rickshaw", Category::Travel)
        } else {
            ("Digital Payment", Category::Misc)
        };

        Transaction {
            id: self.ids.next_id(),
            amount,
            merchant: merchant.to_string(),
            category,
            timestamp: now,
            is_auto_captured: true,
            receipt_image: None
        }
    }

    pub fn from_template(&self, index: usize, now: DateTime<Utc>) -> Transaction {
        self.from_message(SMS_TEMPLATES[index % SMS_TEMPLATES.len()], now)
    }
}

fn message_amount(message: &str) -> Option<Amount> {
    RUPEE_AMOUNT.captures(message)?.get(1)?.as_str().parse().ok()
}
