//! Monthly aggregation and lag features
//!
//! Both the trainers and the forecaster go through this module so that the
//! feature vectors seen at request time have exactly the shape used at
//! training time.
//!
//! - Month key is the first calendar day of the transaction's month.
//! - `month_num` is the calendar month (1..=12), not a sequential index.
//! - Lags shift by rows within a partition, so a gap month is not filled in.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Transaction, TransactionType};

/// Number of lagged values in every feature vector
pub const LAGS: usize = 3;

/// Months of history needed before a prediction can be made
pub const MIN_HISTORY_MONTHS: usize = LAGS;

/// How transactions are grouped before monthly aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    /// One series per user
    User,
    /// One series per (user, category)
    UserCategory,
}

/// Totals for one partition in one month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub user_id: i64,
    pub category: Option<String>,
    /// First day of the month
    pub month: NaiveDate,
    pub expense_total: f64,
    pub income_total: f64,
    /// Count of every transaction in the group (income included)
    pub num_tx: usize,
    /// Mean amount of every transaction in the group
    pub avg_tx: f64,
}

impl MonthlyAggregate {
    pub fn savings(&self) -> f64 {
        self.income_total - self.expense_total
    }

    pub fn month_num(&self) -> u32 {
        self.month.month()
    }
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

#[derive(Default)]
struct Accumulator {
    expense: f64,
    income: f64,
    amount_sum: f64,
    count: usize,
}

/// Group transactions into monthly aggregates, sorted by partition then month
pub fn monthly_aggregates(txs: &[Transaction], partition: Partition) -> Vec<MonthlyAggregate> {
    let mut groups: BTreeMap<(i64, Option<String>, NaiveDate), Accumulator> = BTreeMap::new();

    for tx in txs {
        let category = match partition {
            Partition::User => None,
            Partition::UserCategory => Some(tx.category.clone()),
        };
        let acc = groups
            .entry((tx.user_id, category, month_start(tx.date)))
            .or_default();

        let amount = tx.amount();
        match tx.kind {
            TransactionType::Expense => acc.expense += amount,
            TransactionType::Income => acc.income += amount,
        }
        acc.amount_sum += amount;
        acc.count += 1;
    }

    groups
        .into_iter()
        .map(|((user_id, category, month), acc)| MonthlyAggregate {
            user_id,
            category,
            month,
            expense_total: acc.expense,
            income_total: acc.income,
            num_tx: acc.count,
            avg_tx: acc.amount_sum / acc.count as f64,
        })
        .collect()
}

/// An aggregate together with the three preceding values of its series
#[derive(Debug, Clone, PartialEq)]
pub struct LaggedRow {
    pub aggregate: MonthlyAggregate,
    /// `lags[0]` is the previous row, `lags[2]` three rows back
    pub lags: [f64; LAGS],
}

impl LaggedRow {
    pub fn expense_features(&self) -> ExpenseFeatures {
        ExpenseFeatures {
            month_num: self.aggregate.month_num(),
            lags: self.lags,
            num_tx: self.aggregate.num_tx,
            avg_tx: self.aggregate.avg_tx,
        }
    }

    pub fn savings_features(&self) -> SavingsFeatures {
        SavingsFeatures {
            month_num: self.aggregate.month_num(),
            lags: self.lags,
        }
    }
}

/// Attach lag-1/2/3 of `value` within each partition, dropping rows without a full set
///
/// `aggs` must be sorted by partition then month, as `monthly_aggregates` returns them.
pub fn with_lags(aggs: &[MonthlyAggregate], value: fn(&MonthlyAggregate) -> f64) -> Vec<LaggedRow> {
    let mut rows = Vec::new();

    for series in partitions(aggs) {
        for i in LAGS..series.len() {
            rows.push(LaggedRow {
                aggregate: series[i].clone(),
                lags: [
                    value(&series[i - 1]),
                    value(&series[i - 2]),
                    value(&series[i - 3]),
                ],
            });
        }
    }

    rows
}

/// Split sorted aggregates into contiguous per-partition slices
pub fn partitions(aggs: &[MonthlyAggregate]) -> Vec<&[MonthlyAggregate]> {
    let mut out = Vec::new();
    let mut start = 0;

    for i in 1..=aggs.len() {
        let boundary = i == aggs.len()
            || aggs[i].user_id != aggs[start].user_id
            || aggs[i].category != aggs[start].category;
        if boundary {
            if start < i {
                out.push(&aggs[start..i]);
            }
            start = i;
        }
    }

    out
}

/// Features for the expense models: `[month_num, lag1, lag2, lag3, num_tx, avg_tx]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpenseFeatures {
    pub month_num: u32,
    pub lags: [f64; LAGS],
    pub num_tx: usize,
    pub avg_tx: f64,
}

impl ExpenseFeatures {
    pub const WIDTH: usize = 6;

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.month_num as f64,
            self.lags[0],
            self.lags[1],
            self.lags[2],
            self.num_tx as f64,
            self.avg_tx,
        ]
    }

    /// Features for the month after a single series' history
    ///
    /// `series` is one partition, oldest first. The most recent month provides
    /// lag-1 along with `num_tx` and `avg_tx`.
    pub fn latest(series: &[MonthlyAggregate], month_num: u32) -> Option<Self> {
        if series.len() < MIN_HISTORY_MONTHS {
            return None;
        }
        let n = series.len();
        Some(Self {
            month_num,
            lags: [
                series[n - 1].expense_total,
                series[n - 2].expense_total,
                series[n - 3].expense_total,
            ],
            num_tx: series[n - 1].num_tx,
            avg_tx: series[n - 1].avg_tx,
        })
    }

    /// Features for predicting `series[i]` from the three months before it
    ///
    /// Used for backtests; count and mean come from the month before the target.
    pub fn backtest(series: &[MonthlyAggregate], i: usize) -> Option<Self> {
        if i < LAGS || i >= series.len() {
            return None;
        }
        Some(Self {
            month_num: series[i].month_num(),
            lags: [
                series[i - 1].expense_total,
                series[i - 2].expense_total,
                series[i - 3].expense_total,
            ],
            num_tx: series[i - 1].num_tx,
            avg_tx: series[i - 1].avg_tx,
        })
    }
}

/// Features for the savings model: `[month_num, lag1, lag2, lag3]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavingsFeatures {
    pub month_num: u32,
    pub lags: [f64; LAGS],
}

impl SavingsFeatures {
    pub const WIDTH: usize = 4;

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.month_num as f64, self.lags[0], self.lags[1], self.lags[2]]
    }

    pub fn latest(series: &[MonthlyAggregate], month_num: u32) -> Option<Self> {
        if series.len() < MIN_HISTORY_MONTHS {
            return None;
        }
        let n = series.len();
        Some(Self {
            month_num,
            lags: [
                series[n - 1].savings(),
                series[n - 2].savings(),
                series[n - 3].savings(),
            ],
        })
    }

    pub fn backtest(series: &[MonthlyAggregate], i: usize) -> Option<Self> {
        if i < LAGS || i >= series.len() {
            return None;
        }
        Some(Self {
            month_num: series[i].month_num(),
            lags: [
                series[i - 1].savings(),
                series[i - 2].savings(),
                series[i - 3].savings(),
            ],
        })
    }
}
