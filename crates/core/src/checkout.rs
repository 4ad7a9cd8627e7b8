//! Checkout session: the two-step wizard state machine.
//!
//! A strictly linear flow - `Information` then `Payment` - ending in
//! `Complete`, with `Cancelled` reachable from either step. Each forward
//! transition is guarded by field validation; a rejected transition leaves
//! the session exactly where it was. Completion clears the cart exactly
//! once.
//!
//! The payment side effect itself (the simulated gateway call) lives with
//! the caller. The session brackets it: [`CheckoutSession::begin_submission`]
//! locks the machine into `Submitting` so a second submit is a no-op, then
//! [`CheckoutSession::complete_submission`] or
//! [`CheckoutSession::fail_submission`] resolves the attempt.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::{CartState, CartStore, CartTotals};
use rust_decimal::Decimal;

// =============================================================================
// Input schemas
// =============================================================================

/// Step-1 contact and shipping fields. All required, non-empty.
///
/// Format validation (email shape, phone digits) belongs to the input
/// widgets; the state machine only enforces presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl CustomerInfo {
    /// Check that every field is present.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming each missing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("First Name", &self.first_name),
            ("Last Name", &self.last_name),
            ("Email", &self.email),
            ("Phone", &self.phone),
            ("Address", &self.address),
            ("City", &self.city),
            ("State", &self.state),
            ("Zip Code", &self.zip_code),
        ];
        ValidationError::require_all(&fields)
    }

    /// Full name for order records.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }
}

/// Step-2 card fields. All required, non-empty. The gateway is simulated,
/// so nothing beyond presence is checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub card_number: String,
    pub card_name: String,
    pub exp_date: String,
    pub cvv: String,
}

impl PaymentInfo {
    /// Check that every field is present.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming each missing field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("Card Number", &self.card_number),
            ("Cardholder Name", &self.card_name),
            ("Expiration Date", &self.exp_date),
            ("CVV", &self.cvv),
        ];
        ValidationError::require_all(&fields)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// A step transition was rejected because required fields are missing.
///
/// Recoverable: the session stays in its current step and the caller
/// re-prompts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    missing: Vec<&'static str>,
}

impl ValidationError {
    fn require_all(fields: &[(&'static str, &String)]) -> Result<(), Self> {
        let missing: Vec<&'static str> = fields
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(label, _)| *label)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Self { missing })
        }
    }

    /// Labels of the fields that were empty.
    #[must_use]
    pub fn missing(&self) -> &[&'static str] {
        &self.missing
    }
}

/// A checkout operation was invalid for the session's current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Guard failure on a step transition.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation does not apply to the current step.
    #[error("checkout is not at the {expected:?} step")]
    WrongStep { expected: CheckoutStep },

    /// The session has been cancelled and accepts no further input.
    #[error("checkout session was cancelled")]
    Cancelled,
}

// =============================================================================
// States
// =============================================================================

/// Wizard step. Linear, no branching, no skipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStep {
    Information,
    Payment,
}

/// Session status, orthogonal to the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStatus {
    /// Accepting input.
    Editing,
    /// A submission is in flight; further edits and submits are rejected.
    Submitting,
    /// Terminal. The cart has been cleared.
    Complete,
    /// Terminal. Session state discarded, cart untouched.
    Cancelled,
}

/// Outcome of a submission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// The guard passed; run the payment side effect exactly once, then
    /// resolve with `complete_submission` or `fail_submission`.
    Started,
    /// A prior submission is in flight or already completed; do nothing.
    AlreadyInFlight,
}

// =============================================================================
// Order summary snapshot
// =============================================================================

/// One display line in the order summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub name: String,
    pub quantity: u32,
    pub line_total: Decimal,
}

/// Read-only snapshot of the cart taken when the payment step is entered.
///
/// Internally consistent for the duration of the step: the total shown is
/// the total that will be charged, even if the cart changes underneath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub lines: Vec<SummaryLine>,
    pub totals: CartTotals,
}

impl OrderSummary {
    fn capture(cart: &CartState) -> Self {
        Self {
            lines: cart
                .items()
                .iter()
                .map(|item| SummaryLine {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    line_total: item.line_total(),
                })
                .collect(),
            totals: cart.totals(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// The transient checkout wizard. Not persisted across reloads.
#[derive(Debug)]
pub struct CheckoutSession {
    step: CheckoutStep,
    status: CheckoutStatus,
    customer: Option<CustomerInfo>,
    payment: Option<PaymentInfo>,
    summary: Option<OrderSummary>,
    last_error: Option<String>,
}

impl Default for CheckoutSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutSession {
    /// Start a fresh session at the information step.
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: CheckoutStep::Information,
            status: CheckoutStatus::Editing,
            customer: None,
            payment: None,
            summary: None,
            last_error: None,
        }
    }

    #[must_use]
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    #[must_use]
    pub fn status(&self) -> CheckoutStatus {
        self.status
    }

    #[must_use]
    pub fn customer(&self) -> Option<&CustomerInfo> {
        self.customer.as_ref()
    }

    /// The cart snapshot shown during the payment step.
    #[must_use]
    pub fn summary(&self) -> Option<&OrderSummary> {
        self.summary.as_ref()
    }

    /// Error surfaced by the most recent failed submission, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Advance from `Information` to `Payment`.
    ///
    /// Captures the order-summary snapshot from the cart on success.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::Validation`] when a required field is empty (the
    /// session stays at `Information`), [`CheckoutError::WrongStep`] when
    /// not at the information step, [`CheckoutError::Cancelled`] after
    /// cancellation.
    pub fn submit_information(
        &mut self,
        info: CustomerInfo,
        cart: &CartState,
    ) -> Result<(), CheckoutError> {
        self.ensure_open()?;
        if self.step != CheckoutStep::Information {
            return Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Information,
            });
        }
        info.validate()?;
        self.customer = Some(info);
        self.summary = Some(OrderSummary::capture(cart));
        self.step = CheckoutStep::Payment;
        Ok(())
    }

    /// Return from `Payment` to `Information`, keeping entered fields.
    /// No-op anywhere else.
    pub fn back(&mut self) {
        if self.step == CheckoutStep::Payment && self.status == CheckoutStatus::Editing {
            self.step = CheckoutStep::Information;
            self.summary = None;
        }
    }

    /// Request submission of the order.
    ///
    /// On `Submission::Started` the caller must run the payment side effect
    /// exactly once and resolve via [`Self::complete_submission`] or
    /// [`Self::fail_submission`]. A session already `Submitting` or
    /// `Complete` reports `AlreadyInFlight` so double-submits cannot double
    /// the side effect.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::WrongStep`] before the payment step,
    /// [`CheckoutError::Validation`] when card fields are missing,
    /// [`CheckoutError::Cancelled`] after cancellation.
    pub fn begin_submission(&mut self, payment: PaymentInfo) -> Result<Submission, CheckoutError> {
        match self.status {
            CheckoutStatus::Submitting | CheckoutStatus::Complete => {
                return Ok(Submission::AlreadyInFlight);
            }
            CheckoutStatus::Cancelled => return Err(CheckoutError::Cancelled),
            CheckoutStatus::Editing => {}
        }
        if self.step != CheckoutStep::Payment {
            return Err(CheckoutError::WrongStep {
                expected: CheckoutStep::Payment,
            });
        }
        payment.validate()?;
        self.payment = Some(payment);
        self.last_error = None;
        self.status = CheckoutStatus::Submitting;
        Ok(Submission::Started)
    }

    /// Resolve an in-flight submission as successful.
    ///
    /// Transitions to `Complete` and clears the cart. Guarded so the clear
    /// happens exactly once; calls outside `Submitting` are no-ops.
    pub fn complete_submission(&mut self, cart: &mut CartStore) {
        if self.status != CheckoutStatus::Submitting {
            return;
        }
        self.status = CheckoutStatus::Complete;
        cart.clear();
    }

    /// Resolve an in-flight submission as failed (gateway error or
    /// timeout). Returns to the payment step with the error surfaced; the
    /// cart is untouched.
    pub fn fail_submission(&mut self, reason: impl Into<String>) {
        if self.status != CheckoutStatus::Submitting {
            return;
        }
        self.status = CheckoutStatus::Editing;
        self.step = CheckoutStep::Payment;
        self.last_error = Some(reason.into());
    }

    /// Abandon the session from either step. Discards entered state and
    /// never touches the cart. No-op once a submission is in flight or the
    /// session is terminal.
    pub fn cancel(&mut self) {
        if self.status == CheckoutStatus::Editing {
            self.status = CheckoutStatus::Cancelled;
            self.customer = None;
            self.payment = None;
            self.summary = None;
        }
    }

    fn ensure_open(&self) -> Result<(), CheckoutError> {
        match self.status {
            CheckoutStatus::Cancelled => Err(CheckoutError::Cancelled),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::num::NonZeroU32;
    use std::str::FromStr;
    use std::sync::Arc;

    use super::*;
    use crate::cart::{CartItemId, MemoryStorage, ProductDescriptor};

    fn customer() -> CustomerInfo {
        CustomerInfo {
            first_name: "Rhonda".into(),
            last_name: "Miller".into(),
            email: "nonna@example.com".into(),
            phone: "(318) 555-1234".into(),
            address: "12 Grove St".into(),
            city: "Shreveport".into(),
            state: "LA".into(),
            zip_code: "71101".into(),
        }
    }

    fn payment() -> PaymentInfo {
        PaymentInfo {
            card_number: "4242 4242 4242 4242".into(),
            card_name: "Rhonda Miller".into(),
            exp_date: "12/27".into(),
            cvv: "123".into(),
        }
    }

    fn cart_with_items() -> CartStore {
        let mut cart = CartStore::open(Arc::new(MemoryStorage::new()));
        cart.add_item(
            ProductDescriptor {
                id: CartItemId::from("1"),
                name: "Vintage Lamp".into(),
                price: "$89.99".into(),
                image_src: "/lamp.jpg".into(),
            },
            NonZeroU32::new(2).unwrap(),
        );
        cart
    }

    fn session_at_payment(cart: &CartStore) -> CheckoutSession {
        let mut session = CheckoutSession::new();
        session.submit_information(customer(), cart.state()).unwrap();
        session
    }

    #[test]
    fn missing_customer_field_rejects_and_stays_at_information() {
        let cart = cart_with_items();
        let mut session = CheckoutSession::new();
        let mut info = customer();
        info.email = String::new();

        let err = session.submit_information(info, cart.state()).unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
        assert_eq!(session.step(), CheckoutStep::Information);
        assert_eq!(session.status(), CheckoutStatus::Editing);
    }

    #[test]
    fn whitespace_only_field_counts_as_missing() {
        let cart = cart_with_items();
        let mut session = CheckoutSession::new();
        let mut info = customer();
        info.city = "   ".into();

        assert!(session.submit_information(info, cart.state()).is_err());
    }

    #[test]
    fn complete_information_advances_to_payment() {
        let cart = cart_with_items();
        let mut session = CheckoutSession::new();
        session.submit_information(customer(), cart.state()).unwrap();
        assert_eq!(session.step(), CheckoutStep::Payment);
    }

    #[test]
    fn validation_error_names_each_missing_field() {
        let info = CustomerInfo {
            first_name: "Rhonda".into(),
            ..CustomerInfo::default()
        };
        let err = info.validate().unwrap_err();
        assert_eq!(err.missing().len(), 7);
        assert!(err.missing().contains(&"Email"));
        assert!(!err.missing().contains(&"First Name"));
    }

    #[test]
    fn summary_is_snapshotted_at_payment_entry() {
        let mut cart = cart_with_items();
        let session = session_at_payment(&cart);

        // Mutate the cart after entering the payment step.
        cart.update_quantity(&CartItemId::from("1"), 10);

        let summary = session.summary().unwrap();
        assert_eq!(summary.lines.len(), 1);
        assert_eq!(summary.lines[0].quantity, 2);
        assert_eq!(
            summary.totals.total,
            Decimal::from_str("185.97").unwrap() // 2 * 89.99 + 5.99
        );
    }

    #[test]
    fn submission_requires_payment_step() {
        let mut session = CheckoutSession::new();
        let err = session.begin_submission(payment()).unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::WrongStep {
                expected: CheckoutStep::Payment
            }
        ));
    }

    #[test]
    fn missing_card_field_rejects_submission() {
        let cart = cart_with_items();
        let mut session = session_at_payment(&cart);
        let mut card = payment();
        card.cvv = String::new();

        let err = session.begin_submission(card).unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(_)));
        assert_eq!(session.status(), CheckoutStatus::Editing);
    }

    #[test]
    fn completion_clears_cart_exactly_once() {
        let mut cart = cart_with_items();
        let mut session = session_at_payment(&cart);

        assert_eq!(
            session.begin_submission(payment()).unwrap(),
            Submission::Started
        );
        session.complete_submission(&mut cart);

        assert_eq!(session.status(), CheckoutStatus::Complete);
        assert!(cart.items().is_empty());
        assert_eq!(cart.item_count(), 0);

        // A stray second resolution must not clear (or otherwise disturb)
        // anything a second time.
        session.complete_submission(&mut cart);
        assert_eq!(session.status(), CheckoutStatus::Complete);
    }

    #[test]
    fn double_submit_runs_side_effect_once() {
        let cart = cart_with_items();
        let mut session = session_at_payment(&cart);
        let mut charges = 0;

        for _ in 0..2 {
            if session.begin_submission(payment()).unwrap() == Submission::Started {
                charges += 1;
            }
        }
        assert_eq!(charges, 1);
        assert_eq!(session.status(), CheckoutStatus::Submitting);
    }

    #[test]
    fn submit_after_complete_is_a_noop() {
        let mut cart = cart_with_items();
        let mut session = session_at_payment(&cart);
        session.begin_submission(payment()).unwrap();
        session.complete_submission(&mut cart);

        assert_eq!(
            session.begin_submission(payment()).unwrap(),
            Submission::AlreadyInFlight
        );
    }

    #[test]
    fn failed_submission_returns_to_payment_with_error() {
        let mut cart = cart_with_items();
        let mut session = session_at_payment(&cart);
        session.begin_submission(payment()).unwrap();
        session.fail_submission("payment gateway timed out");

        assert_eq!(session.step(), CheckoutStep::Payment);
        assert_eq!(session.status(), CheckoutStatus::Editing);
        assert_eq!(session.last_error(), Some("payment gateway timed out"));
        // Cart untouched: no partial clear.
        assert_eq!(cart.item_count(), 2);

        // The shopper can retry.
        assert_eq!(
            session.begin_submission(payment()).unwrap(),
            Submission::Started
        );
    }

    #[test]
    fn cancel_from_either_step_leaves_cart_untouched() {
        let cart = cart_with_items();

        let mut at_information = CheckoutSession::new();
        at_information.cancel();
        assert_eq!(at_information.status(), CheckoutStatus::Cancelled);

        let mut at_payment = session_at_payment(&cart);
        at_payment.cancel();
        assert_eq!(at_payment.status(), CheckoutStatus::Cancelled);
        assert!(at_payment.customer().is_none());
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn cancelled_session_rejects_further_input() {
        let cart = cart_with_items();
        let mut session = CheckoutSession::new();
        session.cancel();

        let err = session
            .submit_information(customer(), cart.state())
            .unwrap_err();
        assert_eq!(err, CheckoutError::Cancelled);
    }

    #[test]
    fn back_returns_to_information_keeping_fields() {
        let cart = cart_with_items();
        let mut session = session_at_payment(&cart);
        session.back();

        assert_eq!(session.step(), CheckoutStep::Information);
        assert_eq!(session.customer().unwrap().first_name, "Rhonda");
    }
}
