//! Simulated approval decision
//!
//! Three sentinel card numbers always produce the same outcome. Every other payment is
//! approved at random, with the draw taken from an injectable [`RandomSource`].

use crate::{PaymentInput, PaymentMethod};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tracing::debug;

/// Card that is always approved
pub const APPROVED_CARD: &str = "4242424242424242";
/// Card that is always declined
pub const DECLINED_CARD: &str = "4000000000000002";
/// Card that always fails with insufficient funds
pub const INSUFFICIENT_FUNDS_CARD: &str = "4000000000009995";

pub const SUCCESS_MESSAGE: &str = "Payment processed successfully!";
pub const DECLINED_MESSAGE: &str = "Card declined. Please use a different payment method.";
pub const INSUFFICIENT_FUNDS_MESSAGE: &str = "Insufficient funds.";
pub const FAILURE_MESSAGE: &str = "Transaction failed. Please try again.";

/// Source of uniform draws in `[0, 1)`
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Thread-local OS-seeded generator
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&mut self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Reproducible generator for demos and benchmarks
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}

/// Replays a fixed list of draws, cycling when exhausted. Empty yields `0.5`.
#[derive(Debug, Clone, Default)]
pub struct SequenceRandom {
    values: VecDeque<f64>,
}

impl SequenceRandom {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&mut self) -> f64 {
        match self.values.pop_front() {
            Some(v) => {
                self.values.push_back(v);
                v
            }
            None => 0.5,
        }
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_f64(&mut self) -> f64 {
        (**self).next_f64()
    }
}

/// Approval rates for the random path
#[derive(Debug, Clone)]
pub struct ApprovalPolicy {
    /// Probability that a non-sentinel card is approved
    pub card_approval_rate: f64,
    /// Probability that a PayPal or bank payment is approved
    pub other_approval_rate: f64,
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            card_approval_rate: 0.8,
            other_approval_rate: 0.9,
        }
    }
}

/// Approval outcome and the message shown to the payer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalDecision {
    pub approved: bool,
    pub message: String,
}

impl ApprovalDecision {
    fn approved() -> Self {
        Self {
            approved: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    fn declined(message: &str) -> Self {
        Self {
            approved: false,
            message: message.to_string(),
        }
    }
}

impl ApprovalPolicy {
    /// Decide a payment. Consumes one draw unless a sentinel card short-circuits.
    pub fn decide<R: RandomSource + ?Sized>(
        &self,
        input: &PaymentInput,
        rng: &mut R,
    ) -> ApprovalDecision {
        let rate = match input.method() {
            PaymentMethod::Card => {
                match input.card_number() {
                    Some(APPROVED_CARD) => return ApprovalDecision::approved(),
                    Some(DECLINED_CARD) => return ApprovalDecision::declined(DECLINED_MESSAGE),
                    Some(INSUFFICIENT_FUNDS_CARD) => {
                        return ApprovalDecision::declined(INSUFFICIENT_FUNDS_MESSAGE)
                    }
                    _ => {}
                }
                self.card_approval_rate
            }
            PaymentMethod::Paypal | PaymentMethod::Bank => self.other_approval_rate,
        };

        // Approve when the draw clears the failure share
        let draw = rng.next_f64();
        let approved = draw > 1.0 - rate;
        debug!(method = %input.method(), draw, approved, "Random approval draw");

        if approved {
            ApprovalDecision::approved()
        } else {
            ApprovalDecision::declined(FAILURE_MESSAGE)
        }
    }
}

/// Decide a payment with the default policy
pub fn decide<R: RandomSource + ?Sized>(input: &PaymentInput, rng: &mut R) -> ApprovalDecision {
    ApprovalPolicy::default().decide(input, rng)
}
