//! Checkout route handlers.
//!
//! The checkout is a two-step wizard driven by the state machine in the
//! core crate. The flow is stateless over HTTP: the information fields ride
//! along as hidden inputs on the payment step, and each POST rebuilds the
//! [`CheckoutSession`] from them before advancing. The cart in the session
//! record is the only server-side state.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use nonna_rues_core::{
    CheckoutError, CheckoutSession, Customer, CustomerInfo, OrderItem, PaymentInfo,
    ShippingAddress, price,
};

use crate::error::Result;
use crate::filters;
use crate::models::cart::{flush_cart, open_cart};
use crate::services::payment::charge_with_timeout;
use crate::services::settings::SiteChrome;
use crate::state::AppState;

// =============================================================================
// Form payloads
// =============================================================================

/// Step-1 contact and shipping fields as posted by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

impl CustomerForm {
    fn info(&self) -> CustomerInfo {
        CustomerInfo {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
        }
    }
}

/// Step-2 payload: customer fields from the hidden inputs plus the card.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_name: String,
    #[serde(default)]
    pub exp_date: String,
    #[serde(default)]
    pub cvv: String,
}

impl SubmitForm {
    fn customer(&self) -> CustomerForm {
        CustomerForm {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
        }
    }

    fn payment(&self) -> PaymentInfo {
        PaymentInfo {
            card_number: self.card_number.clone(),
            card_name: self.card_name.clone(),
            exp_date: self.exp_date.clone(),
            cvv: self.cvv.clone(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// One line of the order summary shown on the payment step.
#[derive(Clone)]
pub struct SummaryLineView {
    pub name: String,
    pub quantity: u32,
    pub line_total: String,
}

/// Formatted order summary for the payment step.
#[derive(Clone)]
pub struct SummaryView {
    pub lines: Vec<SummaryLineView>,
    pub subtotal: String,
    pub shipping: String,
    pub total: String,
}

impl SummaryView {
    fn from_session(session: &CheckoutSession) -> Option<Self> {
        let summary = session.summary()?;
        Some(Self {
            lines: summary
                .lines
                .iter()
                .map(|line| SummaryLineView {
                    name: line.name.clone(),
                    quantity: line.quantity,
                    line_total: price::format_display(line.line_total),
                })
                .collect(),
            subtotal: price::format_display(summary.totals.subtotal),
            shipping: price::format_display(summary.totals.shipping),
            total: price::format_display(summary.totals.total),
        })
    }
}

/// Information step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/information.html")]
pub struct InformationTemplate {
    pub chrome: SiteChrome,
    pub customer: CustomerForm,
    pub missing: Vec<&'static str>,
}

/// Payment step template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/payment.html")]
pub struct PaymentTemplate {
    pub chrome: SiteChrome,
    pub customer: CustomerForm,
    pub summary: SummaryView,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the information step. An empty cart has nothing to check out.
#[instrument(skip(state, session))]
pub async fn information(State(state): State<AppState>, session: Session) -> Response {
    let (cart, _) = open_cart(&session).await;
    if cart.state().is_empty() {
        return Redirect::to("/cart").into_response();
    }

    InformationTemplate {
        chrome: state.settings().chrome().await,
        customer: CustomerForm::default(),
        missing: Vec::new(),
    }
    .into_response()
}

/// Advance to the payment step.
///
/// Validation failures re-render the information form with the entered
/// values and the list of missing fields.
#[instrument(skip(state, session, form))]
pub async fn submit_information(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CustomerForm>,
) -> Response {
    let (cart, _) = open_cart(&session).await;
    if cart.state().is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let chrome = state.settings().chrome().await;
    let mut checkout = CheckoutSession::new();
    match checkout.submit_information(form.info(), cart.state()) {
        Ok(()) => {
            let Some(summary) = SummaryView::from_session(&checkout) else {
                return Redirect::to("/cart").into_response();
            };
            PaymentTemplate {
                chrome,
                customer: form,
                summary,
                error: None,
            }
            .into_response()
        }
        Err(CheckoutError::Validation(err)) => InformationTemplate {
            chrome,
            customer: form,
            missing: err.missing().to_vec(),
        }
        .into_response(),
        Err(_) => Redirect::to("/checkout").into_response(),
    }
}

/// Return from the payment step, keeping the entered fields.
#[instrument(skip(state, form))]
pub async fn back(State(state): State<AppState>, Form(form): Form<CustomerForm>) -> Response {
    InformationTemplate {
        chrome: state.settings().chrome().await,
        customer: form,
        missing: Vec::new(),
    }
    .into_response()
}

/// Place the order.
///
/// Rebuilds the checkout session from the posted fields, locks it into a
/// submission, runs the gateway charge under the configured timeout, and
/// resolves: success records the order, clears the cart, and redirects to
/// the cart page's confirmation banner; failure returns to the payment step
/// with the reason surfaced.
#[instrument(skip(state, session, form))]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SubmitForm>,
) -> Result<Response> {
    let (mut cart, storage) = open_cart(&session).await;
    if cart.state().is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let chrome = state.settings().chrome().await;
    let customer_form = form.customer();

    let mut checkout = CheckoutSession::new();
    if let Err(CheckoutError::Validation(err)) =
        checkout.submit_information(customer_form.info(), cart.state())
    {
        return Ok(InformationTemplate {
            chrome,
            customer: customer_form,
            missing: err.missing().to_vec(),
        }
        .into_response());
    }
    let Some(summary) = SummaryView::from_session(&checkout) else {
        return Ok(Redirect::to("/cart").into_response());
    };

    // A rebuilt session cannot see an earlier request's Submitting status,
    // so the in-flight registry extends the exactly-once guard across
    // concurrent POSTs from the same shopper. The permit is held until the
    // handler returns.
    let submission_key = session
        .id()
        .map_or_else(|| "anonymous".to_owned(), |id| id.to_string());
    let Some(_permit) = state.submissions().try_begin(&submission_key) else {
        tracing::info!("duplicate submission while one is in flight");
        return Ok(PaymentTemplate {
            chrome,
            customer: customer_form,
            summary,
            error: Some("Your order is already being processed.".to_owned()),
        }
        .into_response());
    };

    if let Err(err) = checkout.begin_submission(form.payment()) {
        let message = match err {
            CheckoutError::Validation(err) => err.to_string(),
            other => other.to_string(),
        };
        return Ok(PaymentTemplate {
            chrome,
            customer: customer_form,
            summary,
            error: Some(message),
        }
        .into_response());
    }

    // The submission guard passed: the charge runs exactly once.
    let totals = checkout
        .summary()
        .map(|s| s.totals)
        .unwrap_or_else(|| cart.totals());
    let charge = charge_with_timeout(
        state.gateway(),
        totals.total,
        state.config().submit_timeout,
    )
    .await;

    match charge {
        Ok(receipt) => {
            let info = customer_form.info();
            let order = state
                .db()
                .orders
                .create(
                    Customer {
                        name: info.full_name(),
                        email: info.email.clone(),
                    },
                    cart.items()
                        .iter()
                        .map(|item| OrderItem {
                            product_id: item.id.to_string(),
                            title: item.name.clone(),
                            price: item.unit_price(),
                            quantity: item.quantity,
                        })
                        .collect(),
                    totals.total,
                    ShippingAddress {
                        street: info.address,
                        city: info.city,
                        state: info.state,
                        zip_code: info.zip_code,
                    },
                )
                .await?;

            checkout.complete_submission(&mut cart);
            flush_cart(&session, &storage).await;
            tracing::info!(
                order_number = order.order_number,
                reference = %receipt.reference,
                "order placed"
            );
            Ok(Redirect::to("/cart?success=true").into_response())
        }
        Err(err) => {
            tracing::warn!(error = %err, "payment submission failed");
            checkout.fail_submission(err.to_string());
            let error = checkout.last_error().map(ToOwned::to_owned);
            Ok(PaymentTemplate {
                chrome,
                customer: customer_form,
                summary,
                error,
            }
            .into_response())
        }
    }
}

/// Abandon checkout. The cart is untouched.
#[instrument]
pub async fn cancel() -> Redirect {
    Redirect::to("/cart")
}
