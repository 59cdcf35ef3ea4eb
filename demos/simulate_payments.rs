//! Payment simulation example
//!
//! Runs the sentinel cards, a few random payments and a flagged payment through the
//! simulator, then prints each history tab.
//!
//! Usage: cargo run --example simulate_payments [log_level]

use payment_simulator::{
    HistoryFilter, MemoryStore, OutcomeKind, PaymentInput, PaymentSimulator, SeededRandom,
    SimulatorConfig, SubmissionQueue,
};
use std::io::stderr;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let log_level = std::env::args()
        .nth(1)
        .map(|s| parse_log_level(&s))
        .unwrap_or(LevelFilter::WARN);
    setup_logging(log_level);

    println!("=== Payment Simulator ===\n");

    let config = SimulatorConfig {
        processing_delay: Duration::from_millis(250),
        ..Default::default()
    };
    let simulator =
        PaymentSimulator::with_config(MemoryStore::new(), SeededRandom::new(2024), config)?;
    let queue = SubmissionQueue::new(simulator);

    let payments = vec![
        (
            "1. Always-approved test card",
            PaymentInput::card(
                1_500.0,
                "Ana Silva",
                "ana@example.com",
                "4242 4242 4242 4242",
                "12/30",
                "123",
            ),
        ),
        (
            "2. Always-declined test card",
            PaymentInput::card(
                80.0,
                "Ana Silva",
                "ana@example.com",
                "4000 0000 0000 0002",
                "12/30",
                "123",
            ),
        ),
        (
            "3. Insufficient funds test card",
            PaymentInput::card(
                80.0,
                "Ana Silva",
                "ana@example.com",
                "4000 0000 0000 9995",
                "12/30",
                "123",
            ),
        ),
        (
            "4. Regular card",
            PaymentInput::card(
                640.0,
                "Ben Okafor",
                "ben@example.com",
                "4111 1111 1111 1111",
                "07/29",
                "987",
            ),
        ),
        (
            "5. PayPal with disposable email",
            PaymentInput::paypal(120.0, "Cy Lee", "cy@mailinator.com", "cy@mailinator.com"),
        ),
        (
            "6. Bank transfer",
            PaymentInput::bank(
                9_800.0,
                "Dee Park",
                "dee@example.com",
                "110000000",
                "000123456789",
            ),
        ),
    ];

    for (label, input) in payments {
        println!("{label}");
        let outcome = queue.submit(input).await?;
        let alert = match outcome.kind {
            OutcomeKind::Success => "SUCCESS",
            OutcomeKind::Warning => "WARNING",
            OutcomeKind::Failure => "ERROR",
        };
        println!("   {alert}: {}", outcome.display_message());
        println!("   Token: {}", outcome.transaction.token);
        for flag in outcome.fraud_flags() {
            println!("   Fraud indicator: {flag}");
        }
        println!();
    }

    for tab in HistoryFilter::ALL_TABS {
        let transactions = queue.filter_history(tab).await;
        println!("[{tab}] {} transaction(s)", transactions.len());
        for txn in transactions {
            let fraud = if txn.is_flagged() { " FRAUD" } else { "" };
            println!(
                "   {} {} {:.2} {} {}{}",
                txn.timestamp.format("%Y-%m-%d %H:%M:%S"),
                txn.method,
                txn.amount,
                txn.token,
                txn.status.to_string().to_uppercase(),
                fraud
            );
        }
    }

    queue.clear_history().await?;
    println!("\nHistory cleared: {} remaining", queue.history().await.len());

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'warn'", level);
            LevelFilter::WARN
        }
    }
}

fn setup_logging(level: LevelFilter) {
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}
