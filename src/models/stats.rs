use chrono::{Local, NaiveDate, TimeZone};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Category, Transaction};
use crate::types::Amount;

const SCORE_PER_TRANSACTION: u64 = 2;
const SCORE_AMOUNT_STEP: u32 = 20;
const MAX_SCORE: u64 = 100;
const DAYS_PER_WEEK: u32 = 7;

/// Figures derived from the full transaction list. Never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakageStats {
    pub today_total: Amount,
    /// Today's total projected over seven days, not a trailing sum.
    pub week_total: Amount,
    /// 0 to 100, higher means more small spends slipping through.
    pub leakage_score: u8,
    /// Category logged most often (by count, not amount).
    pub top_category: Category
}

/// Per-category spend for the insights chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: Category,
    pub total: Amount,
    pub count: usize,
    /// Bar length as a percentage of the largest category total.
    pub share: u8
}

/// Computes stats against the local calendar date right now.
pub fn compute_stats(transactions: &[Transaction]) -> LeakageStats {
    compute_stats_on(transactions, Local::now().date_naive(), &Local)
}

/// Computes stats treating `today` in timezone `tz` as the current day.
pub fn compute_stats_on<Tz: TimeZone>(transactions: &[Transaction], today: NaiveDate, tz: &Tz) -> LeakageStats {
    let mut today_total = Amount::zero();

    for transaction in transactions {
        if transaction.timestamp.with_timezone(tz).date_naive() == today {
            today_total += transaction.amount;
        }
    }

    let count = u64::try_from(transactions.len()).unwrap_or(u64::MAX);
    let score = count.saturating_mul(SCORE_PER_TRANSACTION)
        .saturating_add(today_total.floor_div(SCORE_AMOUNT_STEP))
        .min(MAX_SCORE);

    LeakageStats {
        today_total,
        week_total: today_total.times(DAYS_PER_WEEK),
        leakage_score: u8::try_from(score).unwrap_or(u8::MAX),
        top_category: top_category(transactions)
    }
}

/// Most frequent category. Ties go to whichever category shows up first in the list.
fn top_category(transactions: &[Transaction]) -> Category {
    let mut counts: Vec<(Category, usize)> = Vec::new();

    for transaction in transactions {
        match counts.iter_mut().find(|(category, _)| *category == transaction.category) {
            Some((_, count)) => *count += 1,
            None => counts.push((transaction.category, 1))
        }
    }

    // sort_by is stable, so first-seen order survives among equal counts
    counts.sort_by(|left, right| right.1.cmp(&left.1));

    counts.first()
        .map(|(category, _)| *category)
        .unwrap_or(Category::Food)
}

pub fn category_breakdown(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Category::ALL.into_iter()
        .map(|category| CategoryTotal { category, total: Amount::zero(), count: 0, share: 0 })
        .collect();

    for transaction in transactions {
        if let Some(entry) = totals.iter_mut().find(|entry| entry.category == transaction.category) {
            entry.total += transaction.amount;
            entry.count += 1;
        }
    }

    let largest = totals.iter()
        .map(|entry| entry.total.value())
        .max()
        .unwrap_or(Decimal::ZERO)
        .max(Decimal::ONE);

    for entry in &mut totals {
        entry.share = entry.total.value().checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(largest))
            .and_then(|share| share.round().to_u8())
            .unwrap_or(100);
    }

    totals
}
