//! Transaction history and tab filters

use crate::{SimulatorError, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// History tab selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryFilter {
    All,
    Successful,
    Failed,
    Flagged,
}

impl HistoryFilter {
    pub const ALL_TABS: [HistoryFilter; 4] = [
        HistoryFilter::All,
        HistoryFilter::Successful,
        HistoryFilter::Failed,
        HistoryFilter::Flagged,
    ];

    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Successful => transaction.is_successful(),
            HistoryFilter::Failed => !transaction.is_successful(),
            HistoryFilter::Flagged => transaction.is_flagged(),
        }
    }

    pub fn tab_name(&self) -> &'static str {
        match self {
            HistoryFilter::All => "all",
            HistoryFilter::Successful => "successful",
            HistoryFilter::Failed => "failed",
            HistoryFilter::Flagged => "flagged",
        }
    }
}

impl std::fmt::Display for HistoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tab_name())
    }
}

impl FromStr for HistoryFilter {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(HistoryFilter::All),
            "successful" => Ok(HistoryFilter::Successful),
            "failed" => Ok(HistoryFilter::Failed),
            "flagged" => Ok(HistoryFilter::Flagged),
            other => Err(SimulatorError::UnknownTab(other.to_string())),
        }
    }
}

/// Read-only filtered view, newest first
pub fn filter_history(history: &[Transaction], filter: HistoryFilter) -> Vec<&Transaction> {
    history.iter().filter(|t| filter.matches(t)).collect()
}

/// Per-tab counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub flagged: usize,
}

impl HistorySummary {
    pub fn count(&self, filter: HistoryFilter) -> usize {
        match filter {
            HistoryFilter::All => self.total,
            HistoryFilter::Successful => self.successful,
            HistoryFilter::Failed => self.failed,
            HistoryFilter::Flagged => self.flagged,
        }
    }
}

/// Newest-first transaction history. Records are only ever prepended or cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    transactions: Vec<Transaction>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a stored history, already newest first
    pub fn from_stored(transactions: Vec<Transaction>) -> Self {
        Self { transactions }
    }

    pub(crate) fn prepend(&mut self, transaction: Transaction) {
        self.transactions.insert(0, transaction);
    }

    pub(crate) fn clear(&mut self) {
        self.transactions.clear();
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn filter(&self, filter: HistoryFilter) -> Vec<&Transaction> {
        filter_history(&self.transactions, filter)
    }

    pub fn summary(&self) -> HistorySummary {
        let mut summary = HistorySummary {
            total: self.transactions.len(),
            ..Default::default()
        };
        for transaction in &self.transactions {
            if transaction.is_successful() {
                summary.successful += 1;
            } else {
                summary.failed += 1;
            }
            if transaction.is_flagged() {
                summary.flagged += 1;
            }
        }
        summary
    }

    /// Get history statistics keyed by tab name
    pub fn get_stats(&self) -> HashMap<String, usize> {
        let summary = self.summary();
        HistoryFilter::ALL_TABS
            .iter()
            .map(|tab| (tab.tab_name().to_string(), summary.count(*tab)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PaymentMethod, TransactionStatus};
    use chrono::Utc;

    fn create_transaction(id: &str, status: TransactionStatus, flags: &[&str]) -> Transaction {
        Transaction {
            id: id.to_string(),
            timestamp: Utc::now(),
            amount: 75.0,
            method: PaymentMethod::Card,
            status,
            fraud_flags: flags.iter().map(|f| f.to_string()).collect(),
            token: "NDExMTExMTExMTExMTEx...".to_string(),
        }
    }

    fn sample_history() -> History {
        let mut history = History::new();
        history.prepend(create_transaction("txn_1", TransactionStatus::Success, &[]));
        history.prepend(create_transaction(
            "txn_2",
            TransactionStatus::Failed,
            &["Test card number used"],
        ));
        history.prepend(create_transaction(
            "txn_3",
            TransactionStatus::Success,
            &["Unusually low transaction amount"],
        ));
        history.prepend(create_transaction("txn_4", TransactionStatus::Failed, &[]));
        history
    }

    fn ids(transactions: &[&Transaction]) -> Vec<String> {
        transactions.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_prepend_keeps_newest_first() {
        let history = sample_history();
        assert_eq!(history.transactions()[0].id, "txn_4");
        assert_eq!(history.transactions()[3].id, "txn_1");
    }

    #[test]
    fn test_filters_preserve_order() {
        let history = sample_history();
        assert_eq!(
            ids(&history.filter(HistoryFilter::All)),
            vec!["txn_4", "txn_3", "txn_2", "txn_1"]
        );
        assert_eq!(
            ids(&history.filter(HistoryFilter::Successful)),
            vec!["txn_3", "txn_1"]
        );
        assert_eq!(
            ids(&history.filter(HistoryFilter::Failed)),
            vec!["txn_4", "txn_2"]
        );
        assert_eq!(
            ids(&history.filter(HistoryFilter::Flagged)),
            vec!["txn_3", "txn_2"]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let history = sample_history();
        let before = history.clone();
        let flagged = HistoryFilter::Flagged;
        let first = ids(&filter_history(history.transactions(), flagged));
        let second = ids(&filter_history(history.transactions(), flagged));
        assert_eq!(first, second);
        assert_eq!(history, before);
    }

    #[test]
    fn test_summary_and_stats() {
        let history = sample_history();
        assert_eq!(
            history.summary(),
            HistorySummary {
                total: 4,
                successful: 2,
                failed: 2,
                flagged: 2,
            }
        );
        let stats = history.get_stats();
        assert_eq!(stats["all"], 4);
        assert_eq!(stats["flagged"], 2);
    }

    #[test]
    fn test_clear() {
        let mut history = sample_history();
        history.clear();
        assert!(history.is_empty());
        assert!(history.filter(HistoryFilter::All).is_empty());
        assert_eq!(history.summary(), HistorySummary::default());
    }

    #[test]
    fn test_tab_parsing() {
        for tab in HistoryFilter::ALL_TABS {
            assert_eq!(tab.tab_name().parse::<HistoryFilter>().unwrap(), tab);
        }
        let parsed: HistoryFilter = "Flagged".parse().unwrap();
        assert_eq!(parsed, HistoryFilter::Flagged);
        assert!(matches!(
            "pending".parse::<HistoryFilter>(),
            Err(SimulatorError::UnknownTab(_))
        ));
    }
}
