use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{
    commands::{calculate_rewards::CalculateRewardsRequest, DomainLogic, Error},
    domain::{CustomerId, RewardSummary},
    ports::transaction::TransactionPort,
};

use super::error::AppError;

/// Query parameters of the rewards endpoints
///
/// Everything is kept as raw strings so that parse failures become domain errors.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardsQuery {
    pub customer_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/health
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/rewards?customerId=..&startDate=..&endDate=..
pub async fn get_rewards<T>(
    State(logic): State<DomainLogic<T>>,
    query: Result<Query<RewardsQuery>, QueryRejection>,
) -> Result<Json<RewardSummary>, AppError>
where
    T: TransactionPort + Send + Sync + 'static,
{
    let Query(params) =
        query.map_err(|rejection| Error::InvalidInput(rejection.body_text().into()))?;
    let req = CalculateRewardsRequest {
        customer_id: parse_customer_id(params.customer_id.as_deref())?,
        start: parse_timestamp("startDate", params.start_date.as_deref())?,
        end: parse_timestamp("endDate", params.end_date.as_deref())?,
    };

    let summary = logic.oneshot(req).await?;
    Ok(Json(summary))
}

/// GET /api/rewards/{year}/{month}?customerId=..
pub async fn get_rewards_by_month<T>(
    State(logic): State<DomainLogic<T>>,
    path: Result<Path<(i32, u32)>, PathRejection>,
    query: Result<Query<RewardsQuery>, QueryRejection>,
) -> Result<Json<RewardSummary>, AppError>
where
    T: TransactionPort + Send + Sync + 'static,
{
    let Path((year, month)) =
        path.map_err(|rejection| Error::InvalidInput(rejection.body_text().into()))?;
    let Query(params) =
        query.map_err(|rejection| Error::InvalidInput(rejection.body_text().into()))?;
    let customer_id = parse_customer_id(params.customer_id.as_deref())?;
    let req = CalculateRewardsRequest::for_month(customer_id, year, month)?;

    let summary = logic.oneshot(req).await?;
    Ok(Json(summary))
}

/// Empty values count as missing
fn parse_customer_id(value: Option<&str>) -> Result<Option<CustomerId>, Error> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            Error::InvalidInput(format!("customerId '{value}' is not a valid identifier").into())
        }),
    }
}

/// Parse an ISO-8601 date-time
///
/// Local date-times (`2023-01-01T00:00:00`) are taken as is and seconds may be omitted
/// (`2023-01-01T00:00`). Date-times with an offset keep their wall-clock part.
fn parse_timestamp(name: &str, value: Option<&str>) -> Result<Option<NaiveDateTime>, Error> {
    let value = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(value) => value,
    };

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.naive_local()))
        .map(Some)
        .map_err(|_| {
            Error::InvalidInput(format!("{name} '{value}' is not an ISO-8601 date-time").into())
        })
}
