use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    domain::{month_range, CustomerId, RewardSummary},
    ports::transaction::TransactionPort,
};
use chrono::NaiveDateTime;
use tower::Service;
use tracing::{debug, info};

use super::{DomainLogic, EmptyPolicy, Error};

/// Rewards query for a customer over a period
///
/// Fields are optional so that missing values can be reported as invalid input instead of being
/// rejected earlier with a less precise error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CalculateRewardsRequest {
    pub customer_id: Option<CustomerId>,
    /// Start of the period, inclusive
    pub start: Option<NaiveDateTime>,
    /// End of the period, inclusive
    pub end: Option<NaiveDateTime>,
}

impl CalculateRewardsRequest {
    pub fn new(customer_id: CustomerId, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            customer_id: Some(customer_id),
            start: Some(start),
            end: Some(end),
        }
    }

    /// Request covering a whole calendar month
    pub fn for_month(
        customer_id: Option<CustomerId>,
        year: i32,
        month: u32,
    ) -> Result<Self, Error> {
        let (start, end) = month_range(year, month).ok_or_else(|| {
            Error::InvalidInput(format!("{year}/{month} is not a valid month").into())
        })?;

        Ok(Self {
            customer_id,
            start: Some(start),
            end: Some(end),
        })
    }

    fn validate(&self) -> Result<(CustomerId, NaiveDateTime, NaiveDateTime), Error> {
        let (Some(customer_id), Some(start), Some(end)) = (self.customer_id, self.start, self.end)
        else {
            return Err(Error::InvalidInput(
                "customer id, start date, and end date must be provided".into(),
            ));
        };
        if end < start {
            return Err(Error::InvalidInput(
                "end date cannot be before start date".into(),
            ));
        }

        Ok((customer_id, start, end))
    }
}

/// Fetch the transactions of a customer and compute their reward points
///
/// Input is validated before the store is queried. Store failures are not retried.
#[tracing::instrument(skip(store))]
pub async fn calculate_rewards<T>(
    store: &T,
    empty_policy: EmptyPolicy,
    req: CalculateRewardsRequest,
) -> Result<RewardSummary, Error>
where
    T: TransactionPort + ?Sized,
{
    let (customer_id, start, end) = req.validate()?;

    let transactions = store.fetch(customer_id, start, end).await?;
    debug!(count = transactions.len(), "fetched transactions");

    if transactions.is_empty() && empty_policy == EmptyPolicy::NotFound {
        return Err(Error::NoData { customer_id });
    }

    let summary = RewardSummary::calculate(customer_id, transactions);
    info!(
        customer_id,
        months = summary.monthly_points.len(),
        total_points = summary.total_points,
        "calculated rewards"
    );

    Ok(summary)
}

impl<T> Service<CalculateRewardsRequest> for DomainLogic<T>
where
    T: TransactionPort + Send + Sync + 'static,
{
    type Response = RewardSummary;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CalculateRewardsRequest) -> Self::Future {
        let transactions = self.transactions.clone();
        let empty_policy = self.empty_policy;
        Box::pin(async move { calculate_rewards(transactions.as_ref(), empty_policy, req).await })
    }
}
