mod actors;
mod config;
mod engine;
mod models;
mod parser;
mod sms;
mod storage;
mod types;

use std::fs;
use std::io::{stderr, stdout, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser as _;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::config::{mime_for_path, Cli, Command};
use crate::engine::{data_url, ImageOutcome, Tracker, TrackerError};
use crate::models::{IdGenerator, SettingKey, Transaction, UuidIds};
use crate::parser::{GeminiParser, OfflineParser, Parser};
use crate::storage::{FileStorage, KeyValueStore, Store};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.log_filter());

    match cli.api_key.clone() {
        Some(api_key) => {
            let parser = GeminiParser::new(&api_key, &cli.model, &cli.api_base, cli.timeout())?;
            run(cli, parser).await
        }
        None => {
            info!("No API key configured, entries are read from the typed text only");
            run(cli, OfflineParser).await
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: stdout carries command output, so logging goes to stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

async fn run<P: Parser>(cli: Cli, parser: P) -> Result<ExitCode> {
    let data_dir = cli.data_dir();
    info!("Using data directory {}", data_dir.display());

    let store = Store::new(FileStorage::new(data_dir));
    let tracker = Tracker::open(store, parser, UuidIds::new("tx"), UuidIds::new("auto"))?;

    let outcome = execute(&tracker, cli.command).await;

    tracker.shutdown().await?;

    match outcome {
        Ok(code) => Ok(code),
        Err(TrackerError::Build(error)) => {
            eprintln!("Could not log this entry: {error}");
            Ok(ExitCode::FAILURE)
        }
        Err(TrackerError::Storage(error)) => {
            eprintln!("Nothing was changed: {error}");
            Ok(ExitCode::FAILURE)
        }
        Err(TrackerError::SmsParsingDisabled) => {
            eprintln!("{}", TrackerError::SmsParsingDisabled);
            Ok(ExitCode::FAILURE)
        }
        Err(error) => Err(error.into())
    }
}

async fn execute<P, K, I>(tracker: &Tracker<P, K, I>, command: Command) -> Result<ExitCode, TrackerError>
where
    P: Parser,
    K: KeyValueStore,
    I: IdGenerator,
{
    match command {
        Command::Add { text, image } => {
            let pending_image = match image {
                Some(path) => {
                    let Some(bytes) = read_capture(&path) else { return Ok(ExitCode::FAILURE) };
                    Some(data_url(mime_for_path(&path), &bytes))
                }
                None => None
            };
            let transaction = tracker.log_text(&text.join(" "), pending_image).await?;
            print_logged(&transaction);
        }
        Command::Photo { path, note } => {
            let Some(bytes) = read_capture(&path) else { return Ok(ExitCode::FAILURE) };

            match tracker.log_image(bytes, mime_for_path(&path), &note).await? {
                ImageOutcome::Logged(transaction) => print_logged(&transaction),
                ImageOutcome::Pending(image) => {
                    let transaction = tracker.log_text(&note, Some(image)).await?;
                    print_logged(&transaction);
                }
            }
        }
        Command::Voice { path, mime } => {
            let Some(bytes) = read_capture(&path) else { return Ok(ExitCode::FAILURE) };
            let mime = mime.unwrap_or_else(|| mime_for_path(&path).to_string());

            let transaction = tracker.log_audio(bytes, &mime).await?;
            print_logged(&transaction);
        }
        Command::Sms => {
            let transaction = tracker.simulate_sms().await?;
            print_logged(&transaction);
        }
        Command::Delete { id } => {
            if !tracker.delete(&id).await? {
                eprintln!("No transaction with id {id}");
                return Ok(ExitCode::FAILURE);
            }
            println!("Deleted {id}");
        }
        Command::List => {
            let transactions = tracker.transactions().await?;
            write_output(|output| write_transactions(output, &transactions));
        }
        Command::Stats => {
            let stats = tracker.stats().await?;
            println!("today_total: {}", stats.today_total);
            println!("week_total: {}", stats.week_total);
            println!("leakage_score: {}", stats.leakage_score);
            println!("top_category: {}", stats.top_category);
        }
        Command::Breakdown => {
            let breakdown = tracker.breakdown().await?;
            write_output(|output| {
                let mut writer = csv::Writer::from_writer(output);
                writer.write_record(["category", "total", "count", "share"])?;
                for entry in &breakdown {
                    writer.write_record([entry.category.to_string(), entry.total.to_string(), entry.count.to_string(), entry.share.to_string()])?;
                }
                writer.flush()?;
                Ok(())
            });
        }
        Command::Insight => println!("{}", tracker.insight().await?),
        Command::Settings { key: Some(key) } => {
            let value = tracker.toggle_setting(key).await?;
            println!("{key}: {}", on_off(value));
        }
        Command::Settings { key: None } => {
            let settings = tracker.settings().await;
            for key in SettingKey::ALL {
                println!("{key}: {}", on_off(settings.get(key)));
            }
        }
        Command::Lang { code: Some(language) } => {
            tracker.set_language(language).await?;
            println!("{} ({})", language.code(), language.label());
        }
        Command::Lang { code: None } => {
            let language = tracker.language().await;
            println!("{} ({})", language.code(), language.label());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn print_logged(transaction: &Transaction) {
    println!("Logged {}: {} at {} ({})", transaction.id, transaction.amount, transaction.merchant, transaction.category);
}

fn read_capture(path: &Path) -> Option<Vec<u8>> {
    match fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(error) => {
            eprintln!("Could not read {}: {error}", path.display());
            None
        }
    }
}

fn write_output<F>(render: F)
where
    F: FnOnce(&mut dyn Write) -> Result<()>,
{
    let mut output = BufWriter::new(stdout().lock());

    if let Err(error) = render(&mut output).and_then(|_| output.flush().map_err(Into::into)) {
        eprintln!("Could not write output: {error:#}");
    }
}

fn write_transactions(output: &mut dyn Write, transactions: &[Transaction]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["id", "amount", "merchant", "category", "timestamp", "auto_captured"])?;

    for transaction in transactions {
        writer.write_record([
            transaction.id.clone(),
            transaction.amount.to_string(),
            transaction.merchant.clone(),
            transaction.category.to_string(),
            transaction.timestamp.to_rfc3339(),
            transaction.is_auto_captured.to_string()
        ])?;
    }

    writer.flush()?;

    Ok(())
}
