use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Serialize};

/// Identifier of a customer, shared with the transaction store
pub type CustomerId = u64;

/// English month names, indexed by zero-based month
///
/// This is a fixed table so that bucket keys never depend on the host locale.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Amount above which every currency unit earns two points
const UPPER_TIER: Decimal = Decimal::ONE_HUNDRED;
/// Amount above which every currency unit earns one point, up to [`UPPER_TIER`]
const LOWER_TIER: Decimal = Decimal::from_parts(50, 0, 0, false, 0);
const UPPER_TIER_RATE: Decimal = Decimal::TWO;

/// A purchase made by a customer
///
/// Transactions are owned by the store and only read here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: u64,
    pub customer_id: CustomerId,
    /// Purchase amount in currency units
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    /// Local date and time of the purchase
    pub timestamp: NaiveDateTime,
}

impl Transaction {
    pub fn points(&self) -> u64 {
        points_for(self.amount)
    }

    /// Key of the monthly bucket this transaction falls into
    pub fn month_label(&self) -> &'static str {
        month_label(&self.timestamp)
    }
}

/// Reward points for a customer over a period
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardSummary {
    pub customer_id: CustomerId,
    /// Points per calendar month name
    ///
    /// Only months that have at least one transaction are present. The year is not part of the
    /// key: a range spanning several years merges the same month of each year into one bucket.
    pub monthly_points: BTreeMap<String, u64>,
    /// Sum of all values in `monthly_points`
    pub total_points: u64,
    /// Transactions the summary was computed from
    pub transactions: Vec<Transaction>,
}

impl RewardSummary {
    /// Aggregate already filtered transactions into monthly buckets
    pub fn calculate(customer_id: CustomerId, transactions: Vec<Transaction>) -> Self {
        let mut monthly_points = BTreeMap::new();
        for transaction in &transactions {
            let bucket: &mut u64 = monthly_points
                .entry(transaction.month_label().to_string())
                .or_default();
            *bucket = bucket.saturating_add(transaction.points());
        }

        let total_points = monthly_points
            .values()
            .fold(0u64, |total, points| total.saturating_add(*points));

        Self {
            customer_id,
            monthly_points,
            total_points,
            transactions,
        }
    }

    pub fn empty(customer_id: CustomerId) -> Self {
        Self::calculate(customer_id, Vec::new())
    }
}

/// Reward points earned by a single purchase amount
///
/// Every unit above 100 earns two points, every unit between 50 and 100 earns one. Each tier is
/// truncated toward zero before being added, and amounts of 50 or less (including zero and
/// negative amounts) earn nothing.
pub fn points_for(amount: Decimal) -> u64 {
    let mut amount = amount;
    let mut points = Decimal::ZERO;

    if amount > UPPER_TIER {
        points = points.saturating_add(
            (amount - UPPER_TIER)
                .saturating_mul(UPPER_TIER_RATE)
                .trunc(),
        );
        amount = UPPER_TIER;
    }
    if amount > LOWER_TIER {
        points = points.saturating_add((amount - LOWER_TIER).trunc());
    }

    if points.is_sign_negative() {
        return 0;
    }
    points.to_u64().unwrap_or(u64::MAX)
}

pub fn month_label(timestamp: &NaiveDateTime) -> &'static str {
    MONTH_NAMES[timestamp.month0() as usize]
}

/// Inclusive range covering a whole calendar month
///
/// The range goes from the first second of the month to one second before the start of the next
/// month. Returns `None` when the month is not in `1..=12` or the year cannot be represented.
pub fn month_range(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?.and_hms_opt(0, 0, 0)?;
    let end = start
        .checked_add_months(Months::new(1))?
        .checked_sub_signed(Duration::seconds(1))?;

    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use rust_decimal_macros::dec;
    use speculoos::prelude::*;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn transaction(id: u64, amount: Decimal, timestamp: NaiveDateTime) -> Transaction {
        Transaction {
            id,
            customer_id: 1,
            amount,
            timestamp,
        }
    }

    #[rstest]
    #[case(dec!(-20), 0)]
    #[case(dec!(0), 0)]
    #[case(dec!(10), 0)]
    #[case(dec!(50), 0)]
    #[case(dec!(50.99), 0)]
    #[case(dec!(51), 1)]
    #[case(dec!(75), 25)]
    #[case(dec!(75.5), 25)]
    #[case(dec!(100), 50)]
    #[case(dec!(100.7), 51)]
    #[case(dec!(120), 90)]
    #[case(dec!(120.5), 91)]
    #[case(dec!(150), 150)]
    #[case(dec!(200), 250)]
    fn test_points_for(#[case] amount: Decimal, #[case] expected: u64) {
        // GIVEN a purchase amount

        // WHEN calculating the points
        let res = points_for(amount);

        // THEN it should match the tiered formula
        assert_that!(res).is_equal_to(expected);
    }

    #[test]
    fn test_points_for_huge_amount() {
        assert_that!(points_for(Decimal::MAX)).is_equal_to(u64::MAX);
    }

    #[rstest]
    fn test_points_between_tiers(#[values(51, 64, 87, 100)] amount: u32) {
        let expected = u64::from(amount) - 50;
        assert_that!(points_for(Decimal::from(amount))).is_equal_to(expected);
    }

    #[rstest]
    fn test_points_above_upper_tier(#[values(101, 133, 250, 1000)] amount: u32) {
        let expected = 2 * (u64::from(amount) - 100) + 50;
        assert_that!(points_for(Decimal::from(amount))).is_equal_to(expected);
    }

    #[test]
    fn test_calculate_two_months() {
        // GIVEN transactions in January and February
        let transactions = vec![
            transaction(1, dec!(120.0), at(2023, 1, 15)),
            transaction(2, dec!(75.0), at(2023, 2, 20)),
        ];

        // WHEN aggregating them
        let summary = RewardSummary::calculate(1, transactions.clone());

        // THEN each month gets its own bucket
        assert_eq!(summary.monthly_points.len(), 2);
        assert_eq!(summary.monthly_points.get("January"), Some(&90));
        assert_eq!(summary.monthly_points.get("February"), Some(&25));
        assert_eq!(summary.total_points, 115);
        assert_that!(summary.transactions).is_equal_to(transactions);
    }

    #[test]
    fn test_calculate_quarter() {
        let summary = RewardSummary::calculate(
            1,
            vec![
                transaction(1, dec!(120.0), at(2023, 1, 15)),
                transaction(2, dec!(80.0), at(2023, 2, 20)),
                transaction(3, dec!(200.0), at(2023, 3, 10)),
            ],
        );

        assert_eq!(summary.monthly_points.get("January"), Some(&90));
        assert_eq!(summary.monthly_points.get("February"), Some(&30));
        assert_eq!(summary.monthly_points.get("March"), Some(&250));
        assert_eq!(summary.total_points, 370);
    }

    #[test]
    fn test_calculate_same_month_sums() {
        let summary = RewardSummary::calculate(
            1,
            vec![
                transaction(1, dec!(50.0), at(2023, 1, 10)),
                transaction(2, dec!(100.0), at(2023, 1, 15)),
            ],
        );

        assert_eq!(summary.monthly_points.len(), 1);
        assert_eq!(summary.monthly_points.get("January"), Some(&50));
        assert_eq!(summary.total_points, 50);
    }

    #[test]
    fn test_calculate_zero_point_month_is_kept() {
        // A month with only small purchases still shows up, with 0 points
        let summary =
            RewardSummary::calculate(1, vec![transaction(1, dec!(50.0), at(2023, 1, 1))]);

        assert_eq!(summary.monthly_points.get("January"), Some(&0));
        assert_eq!(summary.total_points, 0);
    }

    #[test]
    fn test_calculate_merges_years() {
        let summary = RewardSummary::calculate(
            1,
            vec![
                transaction(1, dec!(60), at(2022, 1, 5)),
                transaction(2, dec!(70), at(2023, 1, 5)),
            ],
        );

        assert_eq!(summary.monthly_points.len(), 1);
        assert_eq!(summary.monthly_points.get("January"), Some(&30));
    }

    #[test]
    fn test_calculate_empty() {
        let summary = RewardSummary::empty(7);

        assert_eq!(summary.customer_id, 7);
        assert_that!(summary.monthly_points.is_empty()).is_true();
        assert_eq!(summary.total_points, 0);
        assert_that!(summary.transactions.is_empty()).is_true();
    }

    #[test]
    fn test_total_is_sum_of_buckets() {
        let transactions = (1..=12)
            .map(|month| {
                transaction(
                    month as u64,
                    Decimal::from(40 + month * 13),
                    at(2023, month, 3),
                )
            })
            .collect();

        let summary = RewardSummary::calculate(1, transactions);

        assert_eq!(summary.monthly_points.len(), 12);
        assert_that!(summary.total_points)
            .is_equal_to(summary.monthly_points.values().sum::<u64>());
    }

    #[rstest]
    #[case(1, "January")]
    #[case(6, "June")]
    #[case(12, "December")]
    fn test_month_label(#[case] month: u32, #[case] expected: &str) {
        assert_that!(month_label(&at(2024, month, 1))).is_equal_to(expected);
    }

    #[rstest]
    #[case(2023, 1, at(2023, 1, 31))]
    #[case(2024, 2, at(2024, 2, 29))]
    #[case(2023, 2, at(2023, 2, 28))]
    #[case(2023, 4, at(2023, 4, 30))]
    #[case(2023, 12, at(2023, 12, 31))]
    fn test_month_range(#[case] year: i32, #[case] month: u32, #[case] last_day: NaiveDateTime) {
        // WHEN deriving the range of a month
        let res = month_range(year, month);

        // THEN it covers the first second to the last second of the month
        let expected_start = at(year, month, 1).date().and_hms_opt(0, 0, 0).unwrap();
        let expected_end = last_day.date().and_hms_opt(23, 59, 59).unwrap();
        assert_that!(res).is_some().is_equal_to((expected_start, expected_end));
    }

    #[rstest]
    #[case(2023, 0)]
    #[case(2023, 13)]
    #[case(i32::MAX, 1)]
    fn test_month_range_invalid(#[case] year: i32, #[case] month: u32) {
        assert_that!(month_range(year, month)).is_none();
    }

    #[test]
    fn test_transaction_json() {
        let json = r#"{"id":3,"customerId":9,"amount":120.5,"timestamp":"2023-01-15T10:00:00"}"#;

        let res: Transaction = serde_json::from_str(json).unwrap();

        assert_that!(res).is_equal_to(Transaction {
            id: 3,
            customer_id: 9,
            amount: dec!(120.5),
            timestamp: at(2023, 1, 15),
        });
    }
}
