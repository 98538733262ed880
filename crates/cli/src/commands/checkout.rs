//! Checkout commands.
//!
//! # Usage
//!
//! ```bash
//! meatshop checkout preview
//! meatshop checkout submit --name "Ivan Petrov" --email ivan@example.ru --phone +79001234567
//! ```

use meatshop_storefront::checkout::preview as preview_cart;
use meatshop_storefront::{ApiClient, Checkout, CheckoutForm, StorefrontConfig, SubmitOutcome};
use tracing::{info, warn};

use super::{CommandError, cart_store};

/// Log the item count and total of the stored cart.
pub fn preview(config: &StorefrontConfig) {
    let notice = preview_cart(&cart_store(config).get()).notice();
    if notice.is_problem() {
        warn!("{notice}");
    } else {
        info!("{notice}");
    }
}

/// Validate the form against the stored cart and place the order.
pub async fn submit(
    config: &StorefrontConfig,
    name: String,
    email: String,
    phone: String,
) -> Result<(), CommandError> {
    let client = ApiClient::new(config)?;
    let checkout = Checkout::new(client, cart_store(config));
    let form = CheckoutForm::new(name, email, phone);

    let outcome = checkout.submit(&form).await;
    let message = outcome
        .notice()
        .map_or_else(|| "Order submission is already in progress".to_string(), |n| n.message);

    match outcome {
        SubmitOutcome::Placed { .. } => {
            info!("{message}");
            Ok(())
        }
        SubmitOutcome::Invalid(err) => Err(CommandError::Storefront(err.into())),
        SubmitOutcome::Ignored | SubmitOutcome::Failed(_) => Err(CommandError::Rejected(message)),
    }
}
