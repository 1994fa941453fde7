use crate::{
    domain::{CustomerId, Transaction},
    ports::transaction::{Error, TransactionPort},
};
use chrono::NaiveDateTime;
use std::{
    collections::HashMap,
    fs,
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};

#[derive(Clone, Debug)]
pub struct MemoryDatabase {
    transactions: Arc<Mutex<HashMap<CustomerId, Vec<Transaction>>>>,
}

impl MemoryDatabase {
    pub fn from_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let mut by_customer: HashMap<CustomerId, Vec<Transaction>> = HashMap::new();
        for transaction in transactions {
            by_customer
                .entry(transaction.customer_id)
                .or_default()
                .push(transaction);
        }

        Self {
            transactions: Arc::new(Mutex::new(by_customer)),
        }
    }

    /// Load transactions from a JSON file containing an array of transactions
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let content = fs::read_to_string(path).map_err(|err| Error::Adapter(Box::new(err)))?;
        let transactions: Vec<Transaction> =
            serde_json::from_str(&content).map_err(|err| Error::Adapter(Box::new(err)))?;

        Ok(Self::from_transactions(transactions))
    }

    #[cfg(test)]
    fn insert(&self, transaction: Transaction) -> Result<(), Error> {
        self.transactions
            .lock()?
            .entry(transaction.customer_id)
            .or_default()
            .push(transaction);

        Ok(())
    }

    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.transactions.lock()?.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }
}

#[async_trait::async_trait]
impl TransactionPort for MemoryDatabase {
    async fn fetch(
        &self,
        customer_id: CustomerId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>, Error> {
        let mut transactions: Vec<Transaction> = self
            .transactions
            .lock()?
            .get(&customer_id)
            .map(|transactions| {
                transactions
                    .iter()
                    .filter(|transaction| {
                        transaction.timestamp >= start && transaction.timestamp <= end
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        transactions.sort_by_key(|transaction| (transaction.timestamp, transaction.id));

        Ok(transactions)
    }
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self {
            transactions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Erased [`PoisonError`]
///
/// `PoisonError` keeps the `MutexGuard` internally, which is not send. Thus we erase the error
/// and only keep the string representation instead.
#[derive(Debug, thiserror::Error)]
#[error("poison error: {0}")]
pub struct ErasedPoisonError(String);

impl<T> From<PoisonError<T>> for Error {
    fn from(err: PoisonError<T>) -> Self {
        Self::Adapter(Box::new(ErasedPoisonError(err.to_string())))
    }
}
