use chrono::NaiveDateTime;

use crate::domain::{CustomerId, Transaction};

/// Source of the transactions rewards are computed from
#[mockall::automock]
#[async_trait::async_trait]
pub trait TransactionPort {
    /// Transactions of a customer with a timestamp in `[start, end]`, both bounds inclusive
    async fn fetch(
        &self,
        customer_id: CustomerId,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Transaction>, Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Concrete adapter errors
    ///
    /// This could represent any errors from a concrete adapter that is not part of the domain
    /// model, such as connectivity, configuration, or permission errors.
    #[error("adapter error: {0:?}")]
    Adapter(Box<dyn std::error::Error + Send + Sync>),
}
