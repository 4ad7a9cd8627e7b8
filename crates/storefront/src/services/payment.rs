//! Simulated payment gateway.
//!
//! There is no real payment provider behind the storefront; orders are
//! settled offline. The gateway sleeps for a configured delay and then
//! approves, which keeps the checkout flow honest about latency: the
//! submit handler still has to bracket an async side effect, bound it
//! with a timeout, and resolve the checkout session either way.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

/// Failure charging the shopper's card.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway refused the charge.
    #[error("payment declined: {0}")]
    Declined(String),

    /// The gateway did not answer within the submission timeout.
    #[error("payment gateway timed out")]
    TimedOut,
}

/// Proof of a successful charge.
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub reference: Uuid,
    pub amount: Decimal,
    pub processed_at: DateTime<Utc>,
}

/// A payment processor the checkout flow can charge against.
pub trait PaymentGateway: Send + Sync {
    /// Charge the given amount, resolving to a receipt or a failure.
    fn charge(
        &self,
        amount: Decimal,
    ) -> impl Future<Output = Result<PaymentReceipt, GatewayError>> + Send;
}

/// Gateway that waits a fixed delay and approves every charge.
#[derive(Debug, Clone)]
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl PaymentGateway for SimulatedGateway {
    fn charge(
        &self,
        amount: Decimal,
    ) -> impl Future<Output = Result<PaymentReceipt, GatewayError>> + Send {
        let delay = self.delay;
        async move {
            tokio::time::sleep(delay).await;
            let receipt = PaymentReceipt {
                reference: Uuid::new_v4(),
                amount,
                processed_at: Utc::now(),
            };
            tracing::info!(reference = %receipt.reference, %amount, "simulated charge approved");
            Ok(receipt)
        }
    }
}

/// Charge through the gateway with a hard deadline.
///
/// # Errors
///
/// Returns [`GatewayError::TimedOut`] when the deadline elapses, or the
/// gateway's own error when the charge fails in time.
pub async fn charge_with_timeout<G: PaymentGateway>(
    gateway: &G,
    amount: Decimal,
    limit: Duration,
) -> Result<PaymentReceipt, GatewayError> {
    match tokio::time::timeout(limit, gateway.charge(amount)).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::TimedOut),
    }
}
