use super::{
    anonymized, category_breakdown, compute_stats_on, parse_timestamp, seed_transactions, BuildContext, BuildError,
    Category, IdGenerator, LeakageStats, ParseResult, SequentialIds, Settings, SettingKey, Transaction,
    TransactionBuilder
};

use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::types::{Amount, AmountError};

const RECEIPT: &str = "data:image/png;base64,iVBORw0KGgo=";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
}

fn today() -> NaiveDate {
    now().date_naive()
}

fn create_transaction(id: &str, amount: &str, category: Category, timestamp: DateTime<Utc>) -> Result<Transaction> {
    Ok(Transaction {
        id: id.to_string(),
        amount: Amount::from_str(amount)?,
        merchant: "Somewhere".to_string(),
        category,
        timestamp,
        is_auto_captured: false,
        receipt_image: None
    })
}

fn builder() -> TransactionBuilder<SequentialIds> {
    TransactionBuilder::new(SequentialIds::new("tx"))
}

#[test]
fn test_stats_for_empty_list_defaults_to_food() {
    let stats = compute_stats_on(&[], today(), &Utc);

    assert_eq!(stats, LeakageStats {
        today_total: Amount::zero(),
        week_total: Amount::zero(),
        leakage_score: 0,
        top_category: Category::Food
    });
}

#[test]
fn test_stats_only_sum_todays_transactions() -> Result<()> {
    let transactions = vec![
        create_transaction("1", "45", Category::Food, now())?,
        create_transaction("2", "15.5", Category::Travel, now() - Duration::hours(11))?,
        create_transaction("3", "500", Category::Impulse, now() - Duration::days(1))?,
    ];

    let stats = compute_stats_on(&transactions, today(), &Utc);

    assert_eq!(stats.today_total.to_string(), "60.5");
    assert_eq!(stats.week_total.to_string(), "423.5");
    // 3 transactions overall * 2 + floor(60.5 / 20)
    assert_eq!(stats.leakage_score, 9);

    Ok(())
}

#[test]
fn test_stats_week_total_is_seven_times_today() -> Result<()> {
    let transactions = vec![
        create_transaction("1", "19.99", Category::Food, now())?,
        create_transaction("2", "0.01", Category::Food, now())?,
    ];

    let stats = compute_stats_on(&transactions, today(), &Utc);

    assert_eq!(stats.week_total, stats.today_total.times(7));

    Ok(())
}

#[test]
fn test_stats_score_grows_with_count_and_caps_at_one_hundred() -> Result<()> {
    let mut transactions = Vec::new();
    let mut previous_score = 0;

    for index in 0..60 {
        transactions.push(create_transaction(&index.to_string(), "3", Category::Misc, now())?);
        let score = compute_stats_on(&transactions, today(), &Utc).leakage_score;

        assert!(score >= previous_score);
        assert!(score <= 100);
        previous_score = score;
    }

    assert_eq!(previous_score, 100);

    let large_spend = vec![create_transaction("big", "100000", Category::Impulse, now())?];

    assert_eq!(compute_stats_on(&large_spend, today(), &Utc).leakage_score, 100);

    Ok(())
}

#[test]
fn test_stats_top_category_is_by_count_not_amount() -> Result<()> {
    let mut transactions = Vec::new();

    for index in 0..3 {
        transactions.push(create_transaction(&format!("f{index}"), "900", Category::Food, now())?);
    }
    for index in 0..5 {
        transactions.push(create_transaction(&format!("t{index}"), "1", Category::Travel, now())?);
    }
    transactions.push(create_transaction("m0", "1", Category::Misc, now())?);

    assert_eq!(compute_stats_on(&transactions, today(), &Utc).top_category, Category::Travel);

    Ok(())
}

#[test]
fn test_stats_top_category_tie_goes_to_first_seen() -> Result<()> {
    let transactions = vec![
        create_transaction("1", "5", Category::Utilities, now())?,
        create_transaction("2", "5", Category::Travel, now())?,
        create_transaction("3", "5", Category::Travel, now())?,
        create_transaction("4", "5", Category::Utilities, now())?,
    ];

    assert_eq!(compute_stats_on(&transactions, today(), &Utc).top_category, Category::Utilities);

    Ok(())
}

#[test]
fn test_stats_are_repeatable_for_the_same_list() -> Result<()> {
    let transactions = vec![
        create_transaction("1", "45", Category::Food, now())?,
        create_transaction("2", "80", Category::Travel, now() - Duration::days(2))?,
    ];

    assert_eq!(compute_stats_on(&transactions, today(), &Utc), compute_stats_on(&transactions, today(), &Utc));

    Ok(())
}

#[test]
fn test_stats_respect_the_given_timezone_for_today() -> Result<()> {
    let late_evening_utc = Utc.with_ymd_and_hms(2025, 3, 13, 22, 0, 0).unwrap();
    let transactions = vec![create_transaction("1", "40", Category::Food, late_evening_utc)?];
    let ahead = chrono::FixedOffset::east_opt(5 * 3600).ok_or_else(|| anyhow!("bad offset"))?;

    assert_eq!(compute_stats_on(&transactions, today(), &ahead).today_total.to_string(), "40");
    assert!(compute_stats_on(&transactions, today(), &Utc).today_total.is_zero());

    Ok(())
}

#[test]
fn test_category_breakdown_covers_every_category() -> Result<()> {
    let transactions = vec![
        create_transaction("1", "50", Category::Food, now())?,
        create_transaction("2", "25", Category::Food, now())?,
        create_transaction("3", "150", Category::Travel, now())?,
    ];

    let breakdown = category_breakdown(&transactions);

    assert_eq!(breakdown.len(), Category::ALL.len());
    assert_eq!(breakdown[0].category, Category::Food);
    assert_eq!(breakdown[0].total.to_string(), "75");
    assert_eq!(breakdown[0].count, 2);
    assert_eq!(breakdown[0].share, 50);
    assert_eq!(breakdown[1].share, 100);
    assert_eq!(breakdown[5].share, 0);

    Ok(())
}

#[test]
fn test_build_fails_without_amount_or_image() {
    let result = builder().build_at(None, &BuildContext::manual(""), now());

    assert!(matches!(result, Err(BuildError::NoAmount { .. })));
}

#[test]
fn test_build_fails_for_text_without_number() {
    let result = builder().build_at(None, &BuildContext::manual("coffee with friends"), now());

    assert!(matches!(result, Err(BuildError::NoAmount { .. })));
}

#[test]
fn test_build_uses_complete_parse_result() -> Result<()> {
    let parsed = ParseResult {
        amount: Some(45.0),
        merchant: Some("Chai Point".to_string()),
        category: Some("Food".to_string()),
        timestamp: Some("2024-01-01T10:00:00Z".to_string())
    };

    let transaction = builder().build_at(Some(&parsed), &BuildContext::manual("chai"), now())?;

    assert_eq!(transaction.id, "tx-1");
    assert_eq!(transaction.amount.to_string(), "45");
    assert_eq!(transaction.merchant, "Chai Point");
    assert_eq!(transaction.category, Category::Food);
    assert_eq!(transaction.timestamp, Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    assert!(!transaction.is_auto_captured);
    assert!(transaction.receipt_image.is_none());

    Ok(())
}

#[test]
fn test_build_falls_back_to_manual_text() -> Result<()> {
    let transaction = builder().build_at(None, &BuildContext::manual("120 for lunch"), now())?;

    assert_eq!(transaction.amount.to_string(), "120");
    // The first token doubles as the merchant, even when it is the amount.
    assert_eq!(transaction.merchant, "120");
    assert_eq!(transaction.category, Category::Misc);
    assert_eq!(transaction.timestamp, now());

    Ok(())
}

#[test]
fn test_build_with_image_defaults_amount_to_zero() -> Result<()> {
    let parsed = ParseResult { category: Some("Alien".to_string()), ..ParseResult::default() };
    let context = BuildContext::manual("")
        .with_pending_image(Some("data:image/png;base64,old".to_string()))
        .with_explicit_image(Some(RECEIPT.to_string()));

    let transaction = builder().build_at(Some(&parsed), &context, now())?;

    assert!(transaction.amount.is_zero());
    assert_eq!(transaction.category, Category::Misc);
    assert_eq!(transaction.merchant, "Photo Receipt");
    assert_eq!(transaction.receipt_image.as_deref(), Some(RECEIPT));

    Ok(())
}

#[test]
fn test_build_uses_pending_image_when_no_explicit_image() -> Result<()> {
    let context = BuildContext::manual("").with_pending_image(Some(RECEIPT.to_string()));

    let transaction = builder().build_at(None, &context, now())?;

    assert_eq!(transaction.receipt_image.as_deref(), Some(RECEIPT));
    assert_eq!(transaction.merchant, "Photo Receipt");

    Ok(())
}

#[test]
fn test_build_rejects_negative_parsed_amount_and_falls_through() -> Result<()> {
    let parsed = ParseResult { amount: Some(-30.0), ..ParseResult::default() };

    let transaction = builder().build_at(Some(&parsed), &BuildContext::manual("12 samosa"), now())?;
    assert_eq!(transaction.amount.to_string(), "12");

    let result = builder().build_at(Some(&parsed), &BuildContext::manual(""), now());
    assert!(matches!(result, Err(BuildError::NoAmount { .. })));

    Ok(())
}

#[test]
fn test_build_rejects_non_finite_parsed_amount_and_falls_through() -> Result<()> {
    for amount in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let parsed = ParseResult { amount: Some(amount), ..ParseResult::default() };

        let transaction = builder().build_at(Some(&parsed), &BuildContext::manual("12 samosa"), now())?;
        assert_eq!(transaction.amount.to_string(), "12");

        let context = BuildContext::manual("").with_pending_image(Some(RECEIPT.to_string()));
        let transaction = builder().build_at(Some(&parsed), &context, now())?;
        assert!(transaction.amount.is_zero());
        assert_eq!(transaction.merchant, "Photo Receipt");
    }

    Ok(())
}

#[test]
fn test_build_ignores_parsed_amount_beyond_decimal_range() -> Result<()> {
    let parsed = ParseResult { amount: Some(1e40), ..ParseResult::default() };

    assert_eq!(Amount::from_f64(1e40), Err(AmountError::OutOfRange));

    let transaction = builder().build_at(Some(&parsed), &BuildContext::manual("30 parking"), now())?;
    assert_eq!(transaction.amount.to_string(), "30");

    let result = builder().build_at(Some(&parsed), &BuildContext::manual(""), now());
    assert!(matches!(result, Err(BuildError::NoAmount { .. })));

    Ok(())
}

#[test]
fn test_build_placeholder_merchant_for_blank_input() -> Result<()> {
    let parsed = ParseResult { amount: Some(10.0), merchant: Some("   ".to_string()), ..ParseResult::default() };

    let transaction = builder().build_at(Some(&parsed), &BuildContext::manual("   "), now())?;

    assert_eq!(transaction.merchant, "Manual Entry");

    Ok(())
}

#[test]
fn test_build_recognizes_category_case_insensitively() -> Result<()> {
    let parsed = ParseResult { amount: Some(199.0), category: Some(" subscriptions ".to_string()), ..ParseResult::default() };

    let transaction = builder().build_at(Some(&parsed), &BuildContext::manual(""), now())?;

    assert_eq!(transaction.category, Category::Subscriptions);

    Ok(())
}

#[test]
fn test_build_invalid_timestamp_falls_back_to_now() -> Result<()> {
    let parsed = ParseResult { amount: Some(5.0), timestamp: Some("yesterday-ish".to_string()), ..ParseResult::default() };

    let transaction = builder().build_at(Some(&parsed), &BuildContext::manual(""), now())?;

    assert_eq!(transaction.timestamp, now());

    Ok(())
}

#[test]
fn test_build_copies_auto_captured_flag_and_draws_fresh_ids() -> Result<()> {
    let builder = builder();
    let context = BuildContext::manual("5 parking").auto_captured(true);

    let first = builder.build_at(None, &context, now())?;
    let second = builder.build_at(None, &context, now())?;

    assert!(first.is_auto_captured);
    assert_ne!(first.id, second.id);

    Ok(())
}

#[test]
fn test_sequential_ids_count_up() {
    let ids = SequentialIds::new("auto");

    assert_eq!(ids.next_id(), "auto-1");
    assert_eq!(ids.next_id(), "auto-2");
}

#[test]
fn test_parse_result_keeps_well_typed_fields() -> Result<()> {
    let parsed = ParseResult::from_json(r#"{"amount":"45","merchant":"Om Sweets","category":7,"timestamp":null}"#)
        .ok_or_else(|| anyhow!("payload should parse"))?;

    assert_eq!(parsed, ParseResult {
        amount: None,
        merchant: Some("Om Sweets".to_string()),
        category: None,
        timestamp: None
    });
    assert!(!parsed.has_amount());
    assert!(!ParseResult { amount: Some(0.0), ..ParseResult::default() }.has_amount());
    assert!(ParseResult { amount: Some(0.5), ..ParseResult::default() }.has_amount());

    assert!(ParseResult::from_json("not json").is_none());
    assert!(ParseResult::from_json("42").is_none());
    assert_eq!(ParseResult::from_json("{}"), Some(ParseResult::default()));

    Ok(())
}

#[test]
fn test_parse_timestamp_accepts_common_shapes() {
    assert_eq!(parse_timestamp("2024-01-01T10:00:00.000Z"), Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()));
    assert_eq!(parse_timestamp("2024-01-01T15:30:00+05:30"), Some(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()));
    assert_eq!(parse_timestamp("2024-01-01"), Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    assert!(parse_timestamp("2024-01-01T10:00:00").is_some());
    assert!(parse_timestamp("").is_none());
    assert!(parse_timestamp("2024-13-45").is_none());
}

#[test]
fn test_transaction_round_trips_timestamp_as_iso_string() -> Result<()> {
    let transaction = create_transaction("tx-9", "12.5", Category::Impulse, now())?;

    let json = serde_json::to_value(&transaction)?;

    assert_eq!(json["timestamp"], "2025-03-14T12:00:00Z");
    assert_eq!(json["isAutoCaptured"], false);
    assert!(json.get("receiptImage").is_none());
    assert_eq!(serde_json::from_value::<Transaction>(json)?, transaction);

    Ok(())
}

#[test]
fn test_anonymized_view_masks_merchant_only() -> Result<()> {
    let mut auto = create_transaction("a", "20", Category::Food, now())?;
    auto.is_auto_captured = true;
    let manual = create_transaction("m", "30", Category::Travel, now())?;

    let masked = anonymized(&[auto.clone(), manual.clone()]);

    assert_eq!(masked[0].merchant, "Auto Transaction");
    assert_eq!(masked[1].merchant, "Manual Log");
    assert_eq!(masked[0].amount, auto.amount);
    assert_eq!(manual.merchant, "Somewhere");

    Ok(())
}

#[test]
fn test_seed_transactions_are_newest_first() {
    let seeded = seed_transactions(now());

    assert_eq!(seeded.len(), 2);
    assert_eq!(seeded[0].merchant, "Chai Point");
    assert!(seeded[0].timestamp > seeded[1].timestamp);
    assert!(seeded.iter().all(|transaction| transaction.is_auto_captured));
}

#[test]
fn test_settings_defaults_and_toggle() {
    let mut settings = Settings::default();

    assert!(settings.local_encryption);
    assert!(settings.sms_parsing);
    assert!(!settings.anonymous_mode);

    assert!(settings.toggle(SettingKey::AnonymousMode));
    assert!(settings.get(SettingKey::AnonymousMode));
    assert!(!settings.toggle(SettingKey::SmsParsing));
}
