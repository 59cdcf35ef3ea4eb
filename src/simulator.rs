//! Payment simulation session
//!
//! [`PaymentSimulator`] owns the history and drives one payment at a time through
//! tokenization, fraud checks, the approval draw and persistence. [`SubmissionQueue`]
//! adds the simulated processing delay with a single in-flight slot.

use crate::approval::{ApprovalPolicy, RandomSource, ThreadRandom};
use crate::fraud_patterns::{FraudChecker, FraudRules};
use crate::history::{History, HistoryFilter};
use crate::storage::HistoryStore;
use crate::tokenizer::tokenize;
use crate::{PaymentInput, Result, SimulatorError, Transaction, TransactionStatus};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

/// Message surfaced when an approved payment carries fraud flags
pub const REVIEW_MESSAGE: &str =
    "Payment processed but flagged for review due to potential fraud indicators.";

/// Simulator configuration
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    pub fraud_rules: FraudRules,
    pub approval: ApprovalPolicy,
    /// Wait before a queued submission is processed
    pub processing_delay: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            fraud_rules: FraudRules::default(),
            approval: ApprovalPolicy::default(),
            processing_delay: Duration::from_secs(2),
        }
    }
}

/// Which alert the payer sees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    Success,
    /// Approved, but flagged for review
    Warning,
    Failure,
}

/// Result of one processed payment
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub transaction: Transaction,
    pub approved: bool,
    pub message: String,
    pub kind: OutcomeKind,
}

impl PaymentOutcome {
    pub fn fraud_flags(&self) -> &[String] {
        &self.transaction.fraud_flags
    }

    /// Message for the alert matching [`OutcomeKind`]
    pub fn display_message(&self) -> &str {
        match self.kind {
            OutcomeKind::Warning => REVIEW_MESSAGE,
            OutcomeKind::Success | OutcomeKind::Failure => &self.message,
        }
    }
}

/// Classify an outcome. A decline always fails; an approval with flags is a warning.
pub fn classify(approved: bool, fraud_flags: &[String]) -> OutcomeKind {
    match (approved, fraud_flags.is_empty()) {
        (false, _) => OutcomeKind::Failure,
        (true, false) => OutcomeKind::Warning,
        (true, true) => OutcomeKind::Success,
    }
}

/// Fresh transaction id
pub fn generate_id() -> String {
    format!("txn_{}", Uuid::new_v4().simple())
}

/// Payment simulator session
pub struct PaymentSimulator<S: HistoryStore, R: RandomSource = ThreadRandom> {
    config: SimulatorConfig,
    fraud_checker: FraudChecker,
    store: S,
    rng: R,
    history: History,
}

impl<S: HistoryStore> PaymentSimulator<S, ThreadRandom> {
    /// Open a session with default configuration, loading the stored history
    pub fn open(store: S) -> Result<Self> {
        Self::with_config(store, ThreadRandom, SimulatorConfig::default())
    }
}

impl<S: HistoryStore, R: RandomSource> PaymentSimulator<S, R> {
    /// Open a session with a custom random source and configuration
    pub fn with_config(store: S, rng: R, config: SimulatorConfig) -> Result<Self> {
        let history = History::from_stored(store.load()?);
        info!(count = history.len(), "Loaded transaction history");
        Ok(Self {
            fraud_checker: FraudChecker::with_rules(config.fraud_rules.clone()),
            config,
            store,
            rng,
            history,
        })
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Process a payment, record it at the front of the history and persist the history
    pub fn process_payment(&mut self, input: &PaymentInput) -> Result<PaymentOutcome> {
        let token = tokenize(input);
        let fraud_flags = self.fraud_checker.check(input);
        let decision = self.config.approval.decide(input, &mut self.rng);

        let transaction = Transaction {
            id: generate_id(),
            timestamp: Utc::now(),
            amount: input.amount,
            method: input.method(),
            status: if decision.approved {
                TransactionStatus::Success
            } else {
                TransactionStatus::Failed
            },
            fraud_flags,
            token,
        };

        self.history.prepend(transaction.clone());
        self.store.save(self.history.transactions())?;

        let kind = classify(decision.approved, &transaction.fraud_flags);
        info!(
            id = %transaction.id,
            method = %transaction.method,
            amount = transaction.amount,
            status = %transaction.status,
            token = %transaction.token,
            flags = transaction.fraud_flags.len(),
            "Recorded transaction"
        );
        if kind == OutcomeKind::Warning {
            warn!(id = %transaction.id, "Approved payment flagged for review");
        }

        Ok(PaymentOutcome {
            transaction,
            approved: decision.approved,
            message: decision.message,
            kind,
        })
    }

    /// Empty the history and persist the empty collection. Irreversible.
    pub fn clear_history(&mut self) -> Result<()> {
        let removed = self.history.len();
        self.history.clear();
        self.store.save(self.history.transactions())?;
        info!(removed, "Cleared transaction history");
        Ok(())
    }

    pub fn filter_history(&self, filter: HistoryFilter) -> Vec<&Transaction> {
        self.history.filter(filter)
    }
}

/// Resets the in-flight slot once a submission completes
struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Async front door with a simulated processing delay and one in-flight submission
pub struct SubmissionQueue<S: HistoryStore, R: RandomSource = ThreadRandom> {
    simulator: Arc<Mutex<PaymentSimulator<S, R>>>,
    in_flight: Arc<AtomicBool>,
    delay: Duration,
}

impl<S: HistoryStore, R: RandomSource> Clone for SubmissionQueue<S, R> {
    fn clone(&self) -> Self {
        Self {
            simulator: Arc::clone(&self.simulator),
            in_flight: Arc::clone(&self.in_flight),
            delay: self.delay,
        }
    }
}

impl<S, R> SubmissionQueue<S, R>
where
    S: HistoryStore + Send + 'static,
    R: RandomSource + Send + 'static,
{
    pub fn new(simulator: PaymentSimulator<S, R>) -> Self {
        let delay = simulator.config().processing_delay;
        Self {
            simulator: Arc::new(Mutex::new(simulator)),
            in_flight: Arc::new(AtomicBool::new(false)),
            delay,
        }
    }

    pub fn is_processing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Wait out the processing delay, then process the payment.
    ///
    /// Rejected with [`SimulatorError::SubmissionInFlight`] while another submission is
    /// pending. Nothing is recorded until the payment completes. The work runs on its own
    /// task, so dropping the returned future does not cancel the payment.
    pub async fn submit(&self, input: PaymentInput) -> Result<PaymentOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Rejected submission while another payment is processing");
            return Err(SimulatorError::SubmissionInFlight);
        }
        let slot = InFlight(Arc::clone(&self.in_flight));
        let simulator = Arc::clone(&self.simulator);
        let delay = self.delay;

        let task = tokio::spawn(async move {
            let _slot = slot;
            tokio::time::sleep(delay).await;
            let mut simulator = simulator.lock().await;
            simulator.process_payment(&input)
        });
        task.await?
    }

    /// Snapshot of the history, newest first
    pub async fn history(&self) -> Vec<Transaction> {
        let simulator = self.simulator.lock().await;
        simulator.history().transactions().to_vec()
    }

    pub async fn filter_history(&self, filter: HistoryFilter) -> Vec<Transaction> {
        let simulator = self.simulator.lock().await;
        simulator
            .filter_history(filter)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.simulator.lock().await.clear_history()
    }
}
