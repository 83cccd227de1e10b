mod builder;
mod errors;
mod settings;
mod stats;
#[cfg(test)]
mod tests;
mod transaction;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};

pub use builder::{BuildContext, IdGenerator, ParseResult, TransactionBuilder, UuidIds};
#[cfg(test)]
pub use builder::{parse_timestamp, SequentialIds};
pub use errors::BuildError;
pub use settings::{Language, SettingKey, Settings};
pub use stats::{category_breakdown, compute_stats, CategoryTotal, LeakageStats};
#[cfg(test)]
pub use stats::compute_stats_on;
pub use transaction::{anonymized, seed_transactions, Transaction};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Travel,
    Subscriptions,
    Impulse,
    Misc,
    Utilities
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Food,
        Category::Travel,
        Category::Subscriptions,
        Category::Impulse,
        Category::Misc,
        Category::Utilities
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Travel => "Travel",
            Category::Subscriptions => "Subscriptions",
            Category::Impulse => "Impulse",
            Category::Misc => "Misc",
            Category::Utilities => "Utilities"
        }
    }

    /// Matches a category name regardless of case or surrounding whitespace.
    pub fn recognize(name: &str) -> Option<Category> {
        let name = name.trim();
        Category::ALL.into_iter().find(|category| category.as_str().eq_ignore_ascii_case(name))
    }
}

impl Display for Category {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
