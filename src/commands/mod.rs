use std::{borrow::Cow, str::FromStr, sync::Arc};

use crate::domain::CustomerId;

pub mod calculate_rewards;

pub struct DomainLogic<T> {
    transactions: Arc<T>,
    empty_policy: EmptyPolicy,
}

impl<T> DomainLogic<T> {
    pub fn new(transactions: Arc<T>, empty_policy: EmptyPolicy) -> Self {
        Self {
            transactions,
            empty_policy,
        }
    }
}

impl<T> Clone for DomainLogic<T> {
    fn clone(&self) -> Self {
        Self {
            transactions: self.transactions.clone(),
            empty_policy: self.empty_policy,
        }
    }
}

/// How to report a period without any transaction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Return a summary with no monthly buckets and zero points
    #[default]
    Empty,
    /// Fail with [`Error::NoData`]
    NotFound,
}

impl FromStr for EmptyPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(Self::Empty),
            "not-found" => Ok(Self::NotFound),
            other => Err(Error::InvalidInput(
                format!("unknown empty policy '{other}', expected 'empty' or 'not-found'").into(),
            )),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("transaction port error: {0:?}")]
    Store(#[from] crate::ports::transaction::Error),

    #[error("invalid input: {0}")]
    InvalidInput(Cow<'static, str>),

    /// No transaction for the customer in the requested period
    ///
    /// Only returned with [`EmptyPolicy::NotFound`].
    #[error("no transactions found for customer {customer_id} in the given period")]
    NoData { customer_id: CustomerId },
}
