//! Transaction ledger backing the forecasts.
//!
//! The ledger is a CSV file with the header `id,date,description,amount,type`.
//! `type` is `income`, `expense`, or `opening`; opening rows set the
//! balance the transactions start from and are not transactions themselves.
//!
//! ```text
//! id,date,description,amount,type
//! 0,2024-01-01,Opening balance,1500.00,opening
//! 1,2024-01-03,Client invoice,3200.00,income
//! 2,2024-01-05,Office rent,1200.00,expense
//! ```

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// Months averaged when the caller does not say
pub const DEFAULT_AVERAGE_MONTHS: u32 = 3;

/// Occurrences needed for a description to count as recurring
pub const DEFAULT_MIN_OCCURRENCES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u32,
    pub date: NaiveDate,
    pub description: String,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// Average monthly figures over a window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAverages {
    pub avg_monthly_income: f64,
    pub avg_monthly_expenses: f64,
    pub avg_monthly_net: f64,
}

/// One occurrence of a recurring transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Occurrence {
    pub id: u32,
    pub date: NaiveDate,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

/// A CSV row before it is split into opening balance and transactions.
#[derive(Debug, Deserialize)]
struct LedgerRow {
    id: u32,
    date: NaiveDate,
    description: String,
    amount: f64,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    opening_balance: f64,
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new(opening_balance: f64, transactions: Vec<Transaction>) -> Self {
        Self {
            opening_balance,
            transactions,
        }
    }

    /// Load a ledger CSV file.
    pub fn load(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let file = std::fs::File::open(path.as_ref())?;
        Self::from_reader(file)
    }

    /// Parse ledger CSV from a reader.
    pub fn from_reader<R: Read>(reader: R) -> LedgerResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

        let mut ledger = Ledger::default();
        for (index, row) in csv_reader.deserialize::<LedgerRow>().enumerate() {
            let row = row?;
            // header is line 1
            let line = index as u64 + 2;
            let kind = match row.kind.to_lowercase().as_str() {
                "income" => TransactionKind::Income,
                "expense" => TransactionKind::Expense,
                "opening" => {
                    ledger.opening_balance += row.amount;
                    continue;
                }
                other => {
                    return Err(LedgerError::InvalidRow {
                        line,
                        message: format!("unknown type '{}'", other),
                    })
                }
            };
            if !row.amount.is_finite() || row.amount < 0.0 {
                return Err(LedgerError::InvalidRow {
                    line,
                    message: format!("amount must be a non-negative number, got {}", row.amount),
                });
            }
            ledger.transactions.push(Transaction {
                id: row.id,
                date: row.date,
                description: row.description,
                amount: row.amount,
                kind,
            });
        }
        Ok(ledger)
    }

    pub fn opening_balance(&self) -> f64 {
        self.opening_balance
    }

    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Opening balance plus income minus expenses.
    pub fn balance(&self) -> f64 {
        self.transactions
            .iter()
            .fold(self.opening_balance, |balance, tx| match tx.kind {
                TransactionKind::Income => balance + tx.amount,
                TransactionKind::Expense => balance - tx.amount,
            })
    }

    /// Transactions dated within `[start, end]`; either bound may be open.
    pub fn transactions(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|tx| start.map_or(true, |s| tx.date >= s))
            .filter(|tx| end.map_or(true, |e| tx.date <= e))
            .cloned()
            .collect()
    }

    /// Income and expenses since `today - 30 * months` days, per month.
    ///
    /// `months` of 0 is treated as 1.
    pub fn monthly_averages(&self, months: u32, today: NaiveDate) -> MonthlyAverages {
        let months = months.max(1);
        let start = today - Duration::days(30 * i64::from(months));

        let (income, expenses) = self
            .transactions
            .iter()
            .filter(|tx| tx.date >= start)
            .fold((0.0, 0.0), |(income, expenses), tx| match tx.kind {
                TransactionKind::Income => (income + tx.amount, expenses),
                TransactionKind::Expense => (income, expenses + tx.amount),
            });

        let avg_income = income / f64::from(months);
        let avg_expenses = expenses / f64::from(months);
        MonthlyAverages {
            avg_monthly_income: avg_income,
            avg_monthly_expenses: avg_expenses,
            avg_monthly_net: avg_income - avg_expenses,
        }
    }

    /// Transactions grouped by description, keeping groups with at least
    /// `min_occurrences` entries.
    pub fn recurring(&self, min_occurrences: usize) -> BTreeMap<String, Vec<Occurrence>> {
        let mut by_description: BTreeMap<String, Vec<Occurrence>> = BTreeMap::new();
        for tx in &self.transactions {
            by_description
                .entry(tx.description.clone())
                .or_default()
                .push(Occurrence {
                    id: tx.id,
                    date: tx.date,
                    amount: tx.amount,
                    kind: tx.kind,
                });
        }
        by_description.retain(|_, occurrences| occurrences.len() >= min_occurrences);
        by_description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
id,date,description,amount,type
0,2024-01-01,Opening balance,1000.00,opening
1,2024-01-03,Client invoice,3000.00,income
2,2024-01-05,Office rent,1200.00,expense
3,2024-02-03,Client invoice,3000.00,income
4,2024-02-05,Office rent,1200.00,expense
5,2024-02-20,Printer,300.00,expense
";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Ledger {
        Ledger::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_opening_rows_are_not_transactions() {
        let ledger = sample();
        assert_eq!(ledger.opening_balance(), 1000.0);
        assert_eq!(ledger.all().len(), 5);
    }

    #[test]
    fn test_balance() {
        // 1000 + 6000 - 2700
        assert_eq!(sample().balance(), 4300.0);
        assert_eq!(Ledger::default().balance(), 0.0);
    }

    #[test]
    fn test_transactions_date_filter_is_inclusive() {
        let ledger = sample();
        let feb = ledger.transactions(Some(date(2024, 2, 3)), Some(date(2024, 2, 5)));
        assert_eq!(feb.iter().map(|t| t.id).collect::<Vec<_>>(), vec![3, 4]);
        assert_eq!(ledger.transactions(None, None).len(), 5);
        assert_eq!(ledger.transactions(Some(date(2024, 2, 6)), None).len(), 1);
    }

    #[test]
    fn test_monthly_averages_window() {
        let ledger = sample();
        // window starts 2024-01-05: drops the first invoice only
        let averages = ledger.monthly_averages(3, date(2024, 4, 4));
        assert_eq!(averages.avg_monthly_income, 1000.0);
        assert_eq!(averages.avg_monthly_expenses, 900.0);
        assert_eq!(averages.avg_monthly_net, 100.0);

        let zero = ledger.monthly_averages(0, date(2024, 2, 20));
        assert_eq!(zero.avg_monthly_income, 3000.0);
    }

    #[test]
    fn test_recurring_groups_by_description() {
        let recurring = sample().recurring(DEFAULT_MIN_OCCURRENCES);
        assert_eq!(
            recurring.keys().collect::<Vec<_>>(),
            vec!["Client invoice", "Office rent"]
        );
        assert_eq!(recurring["Office rent"].len(), 2);
        assert_eq!(sample().recurring(1).len(), 3);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let csv = "id,date,description,amount,type\n1,2024-01-01,Refund,5,refund\n";
        match Ledger::from_reader(csv.as_bytes()) {
            Err(LedgerError::InvalidRow { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("refund"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_csv_error() {
        let csv = "id,date,description,amount,type\n1,03/01/2024,Rent,5,expense\n";
        assert!(matches!(Ledger::from_reader(csv.as_bytes()), Err(LedgerError::Csv(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let ledger = Ledger::load(file.path()).unwrap();
        assert_eq!(ledger, sample());

        assert!(matches!(Ledger::load("/nonexistent/ledger.csv"), Err(LedgerError::Io(_))));
    }
}
