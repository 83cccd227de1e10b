use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use moka::future::Cache;
use rand::Rng;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::actors::LedgerActor;
use crate::engine::TrackerError;
use crate::models::{
    anonymized, category_breakdown, compute_stats, seed_transactions, BuildContext, CategoryTotal, IdGenerator,
    Language, LeakageStats, ParseResult, SettingKey, Settings, Transaction, TransactionBuilder
};
use crate::parser::{ParseRequest, Parser};
use crate::sms::{SmsSimulator, SMS_TEMPLATES};
use crate::storage::{KeyValueStore, Store};

const EMPTY_TEXT_PROMPT: &str = "Manual Entry";
const INSIGHT_WINDOW: usize = 5;
const NO_SPENDS_INSIGHT: &str = "Start logging small spends to see patterns.";
const FALLBACK_INSIGHT: &str = "Awareness is the first step to financial calm.";
const BLANK_INSIGHT: &str = "Monitoring the invisible...";

/// Inlines a capture as a `data:` URL, the form receipt images are stored in.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Result of reading a receipt photo.
#[derive(Debug)]
pub enum ImageOutcome {
    /// The photo carried an amount and has been logged with the image attached.
    Logged(Transaction),
    /// Nothing usable was read; the `data:` URL is handed back to attach to a manual entry.
    Pending(String)
}

/// The application shell: routes captured input through the parser and the
/// builder into the ledger, and owns settings, language and insights.
///
/// Must be opened inside a tokio runtime.
pub struct Tracker<P: Parser, K: KeyValueStore, I: IdGenerator> {
    store: Arc<Store<K>>,
    parser: P,
    builder: TransactionBuilder<I>,
    sms: SmsSimulator<I>,
    ledger: LedgerActor,
    settings: RwLock<Settings>,
    language: RwLock<Language>,
    insights: Cache<String, String>
}

impl<P: Parser, K: KeyValueStore, I: IdGenerator> Tracker<P, K, I> {
    /// Loads persisted state. A store that never held transactions is seeded with demo entries.
    pub fn open(store: Store<K>, parser: P, transaction_ids: I, sms_ids: I) -> Result<Self, TrackerError> {
        let store = Arc::new(store);

        let transactions = match store.load_transactions() {
            Some(transactions) => transactions,
            None => {
                info!("First launch, seeding demo transactions");
                let seeded = seed_transactions(Utc::now());
                store.save_transactions(&seeded)?;
                seeded
            }
        };

        let settings = store.load_settings();
        let language = store.load_language();

        Ok(Self {
            ledger: LedgerActor::new(store.clone(), transactions),
            store,
            parser,
            builder: TransactionBuilder::new(transaction_ids),
            sms: SmsSimulator::new(sms_ids),
            settings: RwLock::new(settings),
            language: RwLock::new(language),
            insights: Cache::builder()
                .max_capacity(64)
                .time_to_live(Duration::from_secs(15 * 60))
                .build()
        })
    }

    /// Logs typed text, optionally with a photo attached earlier.
    pub async fn log_text(&self, text: &str, pending_image: Option<String>) -> Result<Transaction, TrackerError> {
        let prompt = if text.is_empty() { EMPTY_TEXT_PROMPT } else { text };
        let parsed = self.parser.parse(ParseRequest::Text(prompt.to_string())).await;
        let context = BuildContext::manual(text).with_pending_image(pending_image);

        self.record(parsed.as_ref(), &context).await
    }

    /// Reads a receipt photo. `note` is whatever the user had typed alongside it.
    pub async fn log_image(&self, bytes: Vec<u8>, mime: &str, note: &str) -> Result<ImageOutcome, TrackerError> {
        let image = data_url(mime, &bytes);
        let parsed = self.parser.parse(ParseRequest::Image { bytes, mime: mime.to_string() }).await;

        match parsed {
            Some(parsed) if parsed.has_amount() => {
                let context = BuildContext::manual(note).with_explicit_image(Some(image));
                Ok(ImageOutcome::Logged(self.record(Some(&parsed), &context).await?))
            }
            _ => {
                debug!("No amount read from image, keeping it pending");
                Ok(ImageOutcome::Pending(image))
            }
        }
    }

    pub async fn log_audio(&self, bytes: Vec<u8>, mime: &str) -> Result<Transaction, TrackerError> {
        let parsed = self.parser.parse(ParseRequest::Audio { bytes, mime: mime.to_string() }).await;

        self.record(parsed.as_ref(), &BuildContext::default()).await
    }

    /// Logs one randomly chosen bank alert.
    pub async fn simulate_sms(&self) -> Result<Transaction, TrackerError> {
        let index = rand::thread_rng().gen_range(0..SMS_TEMPLATES.len());
        self.simulate_sms_template(index).await
    }

    pub async fn simulate_sms_template(&self, index: usize) -> Result<Transaction, TrackerError> {
        if !self.settings.read().await.sms_parsing {
            return Err(TrackerError::SmsParsingDisabled);
        }

        let transaction = self.sms.from_template(index, Utc::now());
        self.append(transaction).await
    }

    /// Whether a transaction with this id existed.
    pub async fn delete(&self, id: &str) -> Result<bool, TrackerError> {
        let removed = self.ledger.remove(id).await.ok_or(TrackerError::LedgerClosed)??;
        Ok(removed)
    }

    /// Transactions as they should be displayed, newest first.
    pub async fn transactions(&self) -> Result<Vec<Transaction>, TrackerError> {
        let transactions = self.snapshot().await?;

        if self.settings.read().await.anonymous_mode {
            return Ok(anonymized(&transactions));
        }

        Ok(transactions)
    }

    pub async fn stats(&self) -> Result<LeakageStats, TrackerError> {
        Ok(compute_stats(&self.snapshot().await?))
    }

    pub async fn breakdown(&self) -> Result<Vec<CategoryTotal>, TrackerError> {
        Ok(category_breakdown(&self.snapshot().await?))
    }

    /// One sentence about the most recent spends. Answers are cached per set of transactions.
    pub async fn insight(&self) -> Result<String, TrackerError> {
        let mut recent = self.snapshot().await?;

        if recent.is_empty() {
            return Ok(NO_SPENDS_INSIGHT.to_string());
        }

        recent.truncate(INSIGHT_WINDOW);

        let key = recent.iter()
            .map(|transaction| transaction.id.as_str())
            .collect::<Vec<_>>()
            .join(",");

        if let Some(cached) = self.insights.get(&key).await {
            return Ok(cached);
        }

        let insight = match self.parser.insight(&recent).await {
            Some(text) if !text.trim().is_empty() => {
                self.insights.insert(key, text.clone()).await;
                text
            }
            Some(_) => BLANK_INSIGHT.to_string(),
            None => FALLBACK_INSIGHT.to_string()
        };

        Ok(insight)
    }

    pub async fn settings(&self) -> Settings {
        *self.settings.read().await
    }

    /// Flips one setting, saves it, and returns its new value.
    pub async fn toggle_setting(&self, key: SettingKey) -> Result<bool, TrackerError> {
        let mut settings = self.settings.write().await;
        let mut updated = *settings;
        let value = updated.toggle(key);

        self.store.save_settings(&updated)?;
        *settings = updated;
        info!("Setting [{key}] is now {value}");

        Ok(value)
    }

    pub async fn language(&self) -> Language {
        *self.language.read().await
    }

    pub async fn set_language(&self, language: Language) -> Result<(), TrackerError> {
        let mut current = self.language.write().await;

        self.store.save_language(language)?;
        *current = language;

        Ok(())
    }

    /// Waits for every queued ledger write to land.
    pub async fn shutdown(self) -> Result<(), TrackerError> {
        self.ledger.despawn().await?;
        Ok(())
    }

    async fn record(&self, parsed: Option<&ParseResult>, context: &BuildContext) -> Result<Transaction, TrackerError> {
        let transaction = self.builder.build(parsed, context)?;
        self.append(transaction).await
    }

    async fn append(&self, transaction: Transaction) -> Result<Transaction, TrackerError> {
        self.ledger.append(transaction.clone()).await.ok_or(TrackerError::LedgerClosed)??;

        Ok(transaction)
    }

    async fn snapshot(&self) -> Result<Vec<Transaction>, TrackerError> {
        self.ledger.snapshot().await.ok_or(TrackerError::LedgerClosed)
    }
}
