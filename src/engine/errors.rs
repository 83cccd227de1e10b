use thiserror::Error;
use tokio::task::JoinError;

use crate::models::BuildError;
use crate::storage::StorageError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("SMS parsing is disabled. Enable it first with `axiony settings sms-parsing`")]
    SmsParsingDisabled,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Transaction ledger has stopped")]
    LedgerClosed,
    #[error("Transaction ledger did not shut down cleanly: {0}")]
    Shutdown(#[from] JoinError)
}
