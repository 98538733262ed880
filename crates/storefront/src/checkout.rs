//! Order checkout.
//!
//! [`Checkout`] turns the stored cart plus a [`CheckoutForm`] into an
//! [`OrderPayload`], sends it through an [`OrderGateway`] and clears the cart
//! once the backend accepts the order.
//!
//! # Flow
//!
//! ```text
//! Idle -> Validating -> Submitting -> Success | Failed -> Idle
//! ```
//!
//! Validation failures return to `Idle` without touching the network. Only
//! one submission runs at a time per `Checkout`; a second call made while
//! one is in flight returns [`SubmitOutcome::Ignored`] immediately.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use meatshop_core::{
    Email, EmailError, OrderId, OrderLine, OrderPayload, OrderReceipt, PhoneError, PhoneNumber,
    Price,
};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::cart::{Cart, CartItem, CartStore, item_count, total};
use crate::error::add_breadcrumb;
use crate::notice::Notice;

/// Why a checkout form was rejected.
#[derive(Debug, Error)]
pub enum CheckoutValidationError {
    #[error("Please enter your name")]
    MissingName,

    #[error("Please enter a valid email")]
    InvalidEmail(#[source] EmailError),

    #[error("Enter the phone as 8XXXXXXXXXX or +7XXXXXXXXXX")]
    InvalidPhone(#[source] PhoneError),

    #[error("Your cart is empty")]
    EmptyCart,
}

/// Raw checkout form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl CheckoutForm {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Validate the form against `cart` and build the order payload.
    ///
    /// Checks run in order: name, email, phone, then a non-empty cart. The
    /// first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first `CheckoutValidationError` encountered.
    pub fn validate(&self, cart: &Cart) -> Result<OrderPayload, CheckoutValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CheckoutValidationError::MissingName);
        }
        let email = Email::parse(&self.email).map_err(CheckoutValidationError::InvalidEmail)?;
        let phone_number =
            PhoneNumber::parse(&self.phone).map_err(CheckoutValidationError::InvalidPhone)?;
        if cart.is_empty() {
            return Err(CheckoutValidationError::EmptyCart);
        }

        Ok(OrderPayload {
            name: name.to_string(),
            email,
            phone_number,
            items: cart.items().map(order_line).collect(),
        })
    }
}

fn order_line(item: &CartItem) -> OrderLine {
    OrderLine {
        product_id: item.product().id,
        name: item.product().name.clone(),
        qty: item.quantity(),
        price: item.unit_price().amount(),
    }
}

/// The backend call that places an order.
pub trait OrderGateway: Send + Sync {
    /// Submit an order and return the backend's receipt.
    fn create_order(
        &self,
        payload: &OrderPayload,
    ) -> impl Future<Output = Result<OrderReceipt, ApiError>> + Send;
}

impl OrderGateway for ApiClient {
    fn create_order(
        &self,
        payload: &OrderPayload,
    ) -> impl Future<Output = Result<OrderReceipt, ApiError>> + Send {
        Self::create_order(self, payload)
    }
}

/// Result of [`Checkout::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// Another submission was already in flight; nothing was done.
    Ignored,
    /// The form or cart failed validation; nothing was sent.
    Invalid(CheckoutValidationError),
    /// The backend accepted the order and the cart was cleared.
    Placed { order_id: OrderId },
    /// The backend rejected the order or could not be reached. The cart is
    /// unchanged.
    Failed(ApiError),
}

impl SubmitOutcome {
    /// The notice to show the user, if any.
    #[must_use]
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Self::Ignored => None,
            Self::Invalid(err) => Some(Notice::warning(err.to_string())),
            Self::Placed { order_id } => Some(Notice::success(format!(
                "Order placed! No. {order_id}"
            ))),
            Self::Failed(err) => Some(Notice::error(format!(
                "Could not place order: {}",
                err.user_message()
            ))),
        }
    }

    /// Whether an order was placed.
    #[must_use]
    pub const fn is_placed(&self) -> bool {
        matches!(self, Self::Placed { .. })
    }
}

/// Observable state of a [`Checkout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutState {
    Idle,
    Submitting,
}

/// What the checkout button shows before the form opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutPreview {
    Empty,
    Ready { item_count: usize, total: Price },
}

impl CheckoutPreview {
    /// The notice for this preview.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Empty => Notice::warning(CheckoutValidationError::EmptyCart.to_string()),
            Self::Ready { item_count, total } => {
                Notice::info(format!("Items in order: {item_count} | Total: {total}"))
            }
        }
    }
}

/// Summarize the cart for the checkout button.
#[must_use]
pub fn preview(cart: &Cart) -> CheckoutPreview {
    if cart.is_empty() {
        CheckoutPreview::Empty
    } else {
        CheckoutPreview::Ready {
            item_count: item_count(cart),
            total: total(cart),
        }
    }
}

/// Releases the in-flight flag when dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Order submission over a cart store and a gateway.
#[derive(Debug)]
pub struct Checkout<G> {
    gateway: G,
    cart: CartStore,
    submitting: AtomicBool,
}

impl<G: OrderGateway> Checkout<G> {
    pub const fn new(gateway: G, cart: CartStore) -> Self {
        Self {
            gateway,
            cart,
            submitting: AtomicBool::new(false),
        }
    }

    /// The cart store orders are taken from.
    pub const fn cart_store(&self) -> &CartStore {
        &self.cart
    }

    /// Whether a submission is in flight.
    pub fn state(&self) -> CheckoutState {
        if self.submitting.load(Ordering::Acquire) {
            CheckoutState::Submitting
        } else {
            CheckoutState::Idle
        }
    }

    /// Summarize the stored cart for the checkout button.
    pub fn preview(&self) -> CheckoutPreview {
        preview(&self.cart.get())
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.submitting))
    }

    /// Validate the form against the stored cart and place the order.
    ///
    /// The in-flight flag is held from the start of the call until it
    /// returns, or until the returned future is dropped.
    #[instrument(skip(self, form))]
    pub async fn submit(&self, form: &CheckoutForm) -> SubmitOutcome {
        let Some(_in_flight) = self.begin() else {
            debug!("Order submission already in flight, ignoring");
            return SubmitOutcome::Ignored;
        };

        let cart = self.cart.get();
        let payload = match form.validate(&cart) {
            Ok(payload) => payload,
            Err(err) => {
                debug!(error = %err, "Checkout form rejected");
                return SubmitOutcome::Invalid(err);
            }
        };

        add_breadcrumb(
            "checkout",
            "Submitting order",
            Some(&[("items", payload.items.len().to_string().as_str())]),
        );

        match self.gateway.create_order(&payload).await {
            Ok(receipt) => {
                if let Err(e) = self.cart.clear() {
                    tracing::error!(
                        order_id = %receipt.id,
                        error = %e,
                        "Order placed but the cart could not be cleared"
                    );
                }
                info!(order_id = %receipt.id, "Order placed");
                SubmitOutcome::Placed {
                    order_id: receipt.id,
                }
            }
            Err(err) => {
                if err.is_unexpected() {
                    let event_id = sentry::capture_error(&err);
                    tracing::error!(error = %err, sentry_event_id = %event_id, "Order submission failed");
                } else {
                    warn!(error = %err, "Order rejected by backend");
                }
                SubmitOutcome::Failed(err)
            }
        }
    }
}
