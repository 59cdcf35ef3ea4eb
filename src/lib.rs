//! # Payment Simulator
//!
//! A mock payment processor for demonstrations and front-end testing. It accepts card,
//! PayPal or bank details, derives a placeholder token, raises heuristic fraud flags,
//! approves or declines the payment at random and keeps a newest-first transaction
//! history behind a pluggable store.
//!
//! ## Features
//!
//! - **Tokenization stub**: reversible base64 placeholder, explicitly not secure
//! - **Fraud heuristics**: test cards, unusual amounts, card length, disposable email domains
//! - **Approval simulation**: sentinel card numbers with fixed outcomes, random draw otherwise
//! - **History**: newest-first, persisted after every mutation, filterable by tab
//! - **Delayed submission**: async single-slot queue that mimics a processing delay
//!
//! Nothing here moves money or protects card data. It is a demo.

pub mod approval;
pub mod fraud_patterns;
pub mod history;
pub mod simulator;
pub mod storage;
pub mod tokenizer;

pub use approval::{
    decide, ApprovalDecision, ApprovalPolicy, RandomSource, SeededRandom, SequenceRandom,
    ThreadRandom,
};
pub use fraud_patterns::{check_for_fraud, FraudChecker, FraudIndicator, FraudRules};
pub use history::{filter_history, History, HistoryFilter, HistorySummary};
pub use simulator::{
    classify, generate_id, OutcomeKind, PaymentOutcome, PaymentSimulator, SimulatorConfig,
    SubmissionQueue,
};
pub use storage::{FileStore, HistoryStore, MemoryStore, DEFAULT_STORAGE_KEY};
pub use tokenizer::tokenize;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Simulator errors. A declined payment is an outcome, not an error.
#[derive(Error, Debug)]
pub enum SimulatorError {
    #[error("Storage failure: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("A payment is already being processed")]
    SubmissionInFlight,

    #[error("Unknown history tab: {0}")]
    UnknownTab(String),

    #[error("Unknown payment method: {0}")]
    UnknownMethod(String),

    #[error("Payment task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, SimulatorError>;

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Paypal,
    Bank,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::Paypal => write!(f, "paypal"),
            PaymentMethod::Bank => write!(f, "bank"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "card" => Ok(PaymentMethod::Card),
            "paypal" => Ok(PaymentMethod::Paypal),
            "bank" => Ok(PaymentMethod::Bank),
            other => Err(SimulatorError::UnknownMethod(other.to_string())),
        }
    }
}

/// Method-specific payment fields. Values are taken as entered, never validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentDetails {
    Card {
        card_number: String,
        expiry_date: String,
        cvv: String,
    },
    Paypal {
        paypal_email: String,
    },
    Bank {
        routing_number: String,
        account_number: String,
    },
}

/// A submitted payment. Ephemeral: only the derived [`Transaction`] is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInput {
    pub amount: f64,
    pub name: String,
    pub email: String,
    pub details: PaymentDetails,
}

impl PaymentInput {
    /// Card payment. Whitespace in the card number is stripped, so "4242 4242 4242 4242"
    /// is treated the same as "4242424242424242".
    pub fn card(
        amount: f64,
        name: impl Into<String>,
        email: impl Into<String>,
        card_number: &str,
        expiry_date: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            name: name.into(),
            email: email.into(),
            details: PaymentDetails::Card {
                card_number: card_number.split_whitespace().collect(),
                expiry_date: expiry_date.into(),
                cvv: cvv.into(),
            },
        }
    }

    pub fn paypal(
        amount: f64,
        name: impl Into<String>,
        email: impl Into<String>,
        paypal_email: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            name: name.into(),
            email: email.into(),
            details: PaymentDetails::Paypal {
                paypal_email: paypal_email.into(),
            },
        }
    }

    pub fn bank(
        amount: f64,
        name: impl Into<String>,
        email: impl Into<String>,
        routing_number: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            name: name.into(),
            email: email.into(),
            details: PaymentDetails::Bank {
                routing_number: routing_number.into(),
                account_number: account_number.into(),
            },
        }
    }

    pub fn method(&self) -> PaymentMethod {
        match self.details {
            PaymentDetails::Card { .. } => PaymentMethod::Card,
            PaymentDetails::Paypal { .. } => PaymentMethod::Paypal,
            PaymentDetails::Bank { .. } => PaymentMethod::Bank,
        }
    }

    /// Card number, if this is a non-empty card payment
    pub fn card_number(&self) -> Option<&str> {
        match &self.details {
            PaymentDetails::Card { card_number, .. } if !card_number.is_empty() => {
                Some(card_number)
            }
            _ => None,
        }
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Success,
    Failed,
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionStatus::Success => write!(f, "success"),
            TransactionStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Record of one simulated payment. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(deserialize_with = "amount_or_nan")]
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
    pub fraud_flags: Vec<String>,
    pub token: String,
}

impl Transaction {
    pub fn is_successful(&self) -> bool {
        self.status == TransactionStatus::Success
    }

    pub fn is_flagged(&self) -> bool {
        !self.fraud_flags.is_empty()
    }

    /// Export as JSON
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// serde_json writes non-finite amounts as null
fn amount_or_nan<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(d)?.unwrap_or(f64::NAN))
}
