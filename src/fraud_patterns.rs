//! Heuristic fraud indicators
//!
//! Flags never decline a payment on their own. They only mark it for review.

use crate::{PaymentInput, PaymentMethod};
use regex::Regex;
use std::ops::RangeInclusive;
use std::sync::OnceLock;
use tracing::warn;

/// Fraud indicator raised by a single check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FraudIndicator {
    TestCard,
    HighAmount,
    LowAmount,
    InvalidCardNumber,
    TemporaryEmail,
}

impl FraudIndicator {
    pub fn description(&self) -> &'static str {
        match self {
            FraudIndicator::TestCard => "Test card number used",
            FraudIndicator::HighAmount => "Unusually high transaction amount",
            FraudIndicator::LowAmount => "Unusually low transaction amount",
            FraudIndicator::InvalidCardNumber => "Invalid card number format",
            FraudIndicator::TemporaryEmail => "Temporary email address detected",
        }
    }
}

impl std::fmt::Display for FraudIndicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Fraud check configuration
#[derive(Debug, Clone)]
pub struct FraudRules {
    /// Well-known test card numbers
    pub test_cards: Vec<String>,
    /// Card amounts strictly above this are flagged
    pub high_amount: f64,
    /// Card amounts strictly below this are flagged
    pub low_amount: f64,
    /// Accepted digit count for card numbers
    pub card_length: RangeInclusive<usize>,
    /// Disposable email domains
    pub temporary_email_domains: Vec<String>,
    /// Also require a valid Luhn checksum. Off by default: only the length is checked.
    pub luhn_checksum: bool,
}

impl Default for FraudRules {
    fn default() -> Self {
        Self {
            test_cards: vec![
                "4242424242424242".to_string(),
                "4000000000000002".to_string(),
                "4000000000009995".to_string(),
                "5555555555554444".to_string(),
                "2223003122003222".to_string(),
            ],
            high_amount: 100_000.0,
            low_amount: 10.0,
            card_length: 13..=19,
            temporary_email_domains: vec![
                "tempmail.com".to_string(),
                "mailinator.com".to_string(),
                "guerrillamail.com".to_string(),
            ],
            luhn_checksum: false,
        }
    }
}

/// Fraud heuristic checker
#[derive(Debug, Clone, Default)]
pub struct FraudChecker {
    rules: FraudRules,
}

impl FraudChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: FraudRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &FraudRules {
        &self.rules
    }

    /// Run every check in order. Each check contributes at most one indicator.
    pub fn indicators(&self, input: &PaymentInput) -> Vec<FraudIndicator> {
        let mut indicators = Vec::new();

        if input.method() == PaymentMethod::Card {
            // Test cards
            if let Some(number) = input.card_number() {
                if self.rules.test_cards.iter().any(|c| c == number) {
                    indicators.push(FraudIndicator::TestCard);
                }
            }

            // Unusual amounts. NaN trips neither.
            if input.amount > self.rules.high_amount {
                indicators.push(FraudIndicator::HighAmount);
            }
            if input.amount < self.rules.low_amount {
                indicators.push(FraudIndicator::LowAmount);
            }

            // Card number format
            if let Some(number) = input.card_number() {
                if !self.is_valid_card_number(number) {
                    indicators.push(FraudIndicator::InvalidCardNumber);
                }
            }
        }

        if self.is_temporary_email(&input.email) {
            indicators.push(FraudIndicator::TemporaryEmail);
        }

        if !indicators.is_empty() {
            warn!(
                method = %input.method(),
                amount = input.amount,
                count = indicators.len(),
                "Fraud indicators raised"
            );
        }

        indicators
    }

    /// Run every check and return the human-readable flags
    pub fn check(&self, input: &PaymentInput) -> Vec<String> {
        self.indicators(input)
            .into_iter()
            .map(|i| i.description().to_string())
            .collect()
    }

    /// Length check on the digits of a card number, plus Luhn when enabled
    pub fn is_valid_card_number(&self, card_number: &str) -> bool {
        let digits = digits_only(card_number);
        if !self.rules.card_length.contains(&digits.len()) {
            return false;
        }
        !self.rules.luhn_checksum || luhn_valid(&digits)
    }

    fn is_temporary_email(&self, email: &str) -> bool {
        if email.is_empty() {
            return false;
        }
        // Domain is the segment right after the first '@'
        match email.split('@').nth(1) {
            Some(domain) => self
                .rules
                .temporary_email_domains
                .iter()
                .any(|d| d == domain),
            None => false,
        }
    }
}

/// Check a payment against the default rules
pub fn check_for_fraud(input: &PaymentInput) -> Vec<String> {
    FraudChecker::new().check(input)
}

fn digits_only(value: &str) -> String {
    static NON_DIGIT: OnceLock<Regex> = OnceLock::new();
    let re = NON_DIGIT.get_or_init(|| Regex::new(r"\D").expect("literal pattern"));
    re.replace_all(value, "").into_owned()
}

fn luhn_valid(digits: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in digits.chars().rev().enumerate() {
        let Some(mut d) = c.to_digit(10) else {
            return false;
        };
        if i % 2 == 1 {
            d *= 2;
            if d > 9 {
                d -= 9;
            }
        }
        sum += d;
    }
    sum % 10 == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(number: &str, amount: f64) -> PaymentInput {
        PaymentInput::card(amount, "Ana", "ana@example.com", number, "12/30", "123")
    }

    #[test]
    fn test_clean_card_payment() {
        let flags = check_for_fraud(&card("4111111111111111", 250.0));
        assert!(flags.is_empty());
    }

    #[test]
    fn test_test_card_and_high_amount_in_order() {
        let flags = check_for_fraud(&card("4242424242424242", 200_000.0));
        assert_eq!(
            flags,
            vec![
                "Test card number used".to_string(),
                "Unusually high transaction amount".to_string(),
            ]
        );
    }

    #[test]
    fn test_amount_boundaries() {
        assert!(check_for_fraud(&card("4111111111111111", 100_000.0)).is_empty());
        assert!(check_for_fraud(&card("4111111111111111", 10.0)).is_empty());
        assert_eq!(
            check_for_fraud(&card("4111111111111111", 9.99)),
            vec!["Unusually low transaction amount".to_string()]
        );
    }

    #[test]
    fn test_non_finite_and_negative_amounts() {
        assert!(check_for_fraud(&card("4111111111111111", f64::NAN)).is_empty());
        assert_eq!(
            check_for_fraud(&card("4111111111111111", f64::INFINITY)),
            vec!["Unusually high transaction amount".to_string()]
        );
        assert_eq!(
            check_for_fraud(&card("4111111111111111", -5.0)),
            vec!["Unusually low transaction amount".to_string()]
        );
    }

    #[test]
    fn test_amount_checks_only_apply_to_cards() {
        let input = PaymentInput::paypal(500_000.0, "Ana", "", "ana@example.com");
        assert!(check_for_fraud(&input).is_empty());

        let input = PaymentInput::bank(1.0, "Ana", "", "110000000", "000123456789");
        assert!(check_for_fraud(&input).is_empty());
    }

    #[test]
    fn test_invalid_card_length() {
        let flags = check_for_fraud(&card("411111111111", 50.0));
        assert_eq!(flags, vec!["Invalid card number format".to_string()]);

        let flags = check_for_fraud(&card("41111111111111111111", 50.0));
        assert_eq!(flags, vec!["Invalid card number format".to_string()]);
    }

    #[test]
    fn test_length_check_counts_digits_only() {
        // 12 digits padded with dashes is still too short
        let flags = check_for_fraud(&card("4111-1111-1111", 50.0));
        assert_eq!(flags, vec!["Invalid card number format".to_string()]);

        // 13 digits with separators passes
        assert!(check_for_fraud(&card("4111-1111-1111-1", 50.0)).is_empty());
    }

    #[test]
    fn test_empty_card_number_skips_format_check() {
        assert!(check_for_fraud(&card("", 50.0)).is_empty());
    }

    #[test]
    fn test_length_only_by_default() {
        // Fails Luhn but has a valid length
        assert!(check_for_fraud(&card("4111111111111112", 50.0)).is_empty());
    }

    #[test]
    fn test_luhn_checksum_when_enabled() {
        let checker = FraudChecker::with_rules(FraudRules {
            luhn_checksum: true,
            ..Default::default()
        });
        assert!(checker.is_valid_card_number("4111111111111111"));
        assert!(checker.is_valid_card_number("4242 4242 4242 4242"));
        assert!(!checker.is_valid_card_number("4111111111111112"));
        assert_eq!(
            checker.check(&card("4111111111111112", 50.0)),
            vec!["Invalid card number format".to_string()]
        );
    }

    #[test]
    fn test_temporary_email_any_method() {
        let paypal = PaymentInput::paypal(50.0, "Ana", "x@mailinator.com", "x@mailinator.com");
        assert_eq!(
            check_for_fraud(&paypal),
            vec!["Temporary email address detected".to_string()]
        );

        let bank = PaymentInput::bank(1_000_000.0, "Ana", "x@mailinator.com", "1", "2");
        let flags = check_for_fraud(&bank);
        assert_eq!(flags, vec!["Temporary email address detected".to_string()]);

        let flags = check_for_fraud(&PaymentInput::card(
            5.0,
            "Ana",
            "x@mailinator.com",
            "4242424242424242",
            "12/30",
            "123",
        ));
        assert_eq!(flags.last().unwrap(), "Temporary email address detected");
        assert_eq!(flags.len(), 3);
    }

    #[test]
    fn test_email_domain_must_match_exactly() {
        let input = PaymentInput::paypal(50.0, "Ana", "x@mail.mailinator.com", "p@example.com");
        assert!(check_for_fraud(&input).is_empty());

        let input = PaymentInput::paypal(50.0, "Ana", "no-at-sign", "p@example.com");
        assert!(check_for_fraud(&input).is_empty());
    }

    #[test]
    fn test_custom_rules() {
        let checker = FraudChecker::with_rules(FraudRules {
            high_amount: 1_000.0,
            temporary_email_domains: vec!["burner.io".to_string()],
            ..Default::default()
        });
        let input = PaymentInput::card(5_000.0, "Ana", "a@burner.io", "4111111111111111", "", "");
        assert_eq!(
            checker.indicators(&input),
            vec![FraudIndicator::HighAmount, FraudIndicator::TemporaryEmail]
        );
    }

    #[test]
    fn test_deterministic() {
        let input = card("4000000000000002", 3.0);
        assert_eq!(check_for_fraud(&input), check_for_fraud(&input));
    }
}
