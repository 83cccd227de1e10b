use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::{spawn_blocking, JoinError, JoinHandle};
use tokio::spawn;
use tracing::{debug, error, warn};

use crate::models::Transaction;
use crate::storage::{KeyValueStore, StorageError, Store};
use crate::types::TransactionId;

pub enum LedgerCommand {
    Append {
        transaction: Transaction,
        reply: oneshot::Sender<Result<(), StorageError>>
    },
    Remove {
        id: TransactionId,
        reply: oneshot::Sender<Result<bool, StorageError>>
    },
    Snapshot {
        reply: oneshot::Sender<Vec<Transaction>>
    }
}

/// Sole owner of the newest-first transaction list.
///
/// Commands are applied one at a time in arrival order, and every mutation is
/// written through to the store before the next command is looked at. A mutation
/// the store refuses is rolled back and the error is handed to the caller.
pub struct LedgerActor {
    sender: mpsc::UnboundedSender<LedgerCommand>,
    handle: JoinHandle<()>
}

impl LedgerActor {
    /// Spawns the actor task seeded with `initial`.
    pub fn new<K: KeyValueStore>(store: Arc<Store<K>>, initial: Vec<Transaction>) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<LedgerCommand>();

        let handle = spawn(async move {
            let mut transactions = initial;

            while let Some(command) = receiver.recv().await {
                match command {
                    LedgerCommand::Append { transaction, reply } => {
                        let id = transaction.id.clone();
                        let amount = transaction.amount;
                        transactions.insert(0, transaction);

                        let result = persist(&store, &transactions).await;
                        match &result {
                            Ok(()) => debug!("Transaction [{id}] of {amount} appended"),
                            Err(error) => {
                                error!("Transaction [{id}] was not saved: {error}");
                                transactions.remove(0);
                            }
                        }

                        let _ = reply.send(result);
                    }
                    LedgerCommand::Remove { id, reply } => {
                        let Some(position) = transactions.iter().position(|transaction| transaction.id == id) else {
                            warn!("Transaction [{id}] was not found");
                            let _ = reply.send(Ok(false));
                            continue;
                        };

                        let removed = transactions.remove(position);

                        let result = persist(&store, &transactions).await;
                        match &result {
                            Ok(()) => debug!("Transaction [{id}] removed"),
                            Err(error) => {
                                error!("Removal of transaction [{id}] was not saved: {error}");
                                transactions.insert(position, removed);
                            }
                        }

                        let _ = reply.send(result.map(|_| true));
                    }
                    LedgerCommand::Snapshot { reply } => {
                        let _ = reply.send(transactions.clone());
                    }
                }
            }
        });

        Self { sender, handle }
    }

    /// Queues a command. Returns `false` once the actor has stopped.
    pub fn accept(&self, command: LedgerCommand) -> bool {
        self.sender.send(command).is_ok()
    }

    /// `None` if the actor has stopped, otherwise the outcome of saving the new list.
    pub async fn append(&self, transaction: Transaction) -> Option<Result<(), StorageError>> {
        let (reply, response) = oneshot::channel();

        if !self.accept(LedgerCommand::Append { transaction, reply }) {
            return None;
        }

        response.await.ok()
    }

    /// `None` if the actor has stopped, otherwise whether anything was removed and saved.
    pub async fn remove(&self, id: &str) -> Option<Result<bool, StorageError>> {
        let (reply, response) = oneshot::channel();

        if !self.accept(LedgerCommand::Remove { id: id.to_string(), reply }) {
            return None;
        }

        response.await.ok()
    }

    /// Current list, newest first, after every previously queued command.
    pub async fn snapshot(&self) -> Option<Vec<Transaction>> {
        let (reply, response) = oneshot::channel();

        if !self.accept(LedgerCommand::Snapshot { reply }) {
            return None;
        }

        response.await.ok()
    }

    /// Closes the queue and waits for the pending commands to drain.
    pub async fn despawn(self) -> Result<(), JoinError> {
        drop(self.sender);
        self.handle.await
    }
}

async fn persist<K: KeyValueStore>(store: &Arc<Store<K>>, transactions: &[Transaction]) -> Result<(), StorageError> {
    let store = store.clone();
    let snapshot = transactions.to_vec();

    spawn_blocking(move || store.save_transactions(&snapshot)).await?
}
