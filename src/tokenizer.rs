//! Placeholder tokenization.
//!
//! The token is the base64 encoding of the sensitive fields, cut to 20 characters and
//! suffixed with `...`. Base64 is reversible, so the prefix leaks the first 15 bytes of
//! the input. This is NOT secure and stands in for a real tokenization vault.

use crate::{PaymentDetails, PaymentInput};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

const TOKEN_PREFIX_LEN: usize = 20;
const TOKEN_SUFFIX: &str = "...";

/// Derive the display token for a payment
pub fn tokenize(input: &PaymentInput) -> String {
    let sensitive = sensitive_data(&input.details);
    let encoded = STANDARD.encode(sensitive.as_bytes());
    // base64 output is ASCII, so byte slicing is char-safe
    let cut = encoded.len().min(TOKEN_PREFIX_LEN);
    format!("{}{}", &encoded[..cut], TOKEN_SUFFIX)
}

fn sensitive_data(details: &PaymentDetails) -> String {
    match details {
        PaymentDetails::Card {
            card_number,
            expiry_date,
            cvv,
        } => format!("{card_number}{expiry_date}{cvv}"),
        PaymentDetails::Paypal { paypal_email } => paypal_email.clone(),
        PaymentDetails::Bank {
            routing_number,
            account_number,
        } => format!("{routing_number}{account_number}"),
    }
}
