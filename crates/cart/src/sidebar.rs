//! Cart sidebar view state.
//!
//! The sidebar owns the [`Checkout`]. Closing or reopening it cancels a
//! pending confirmation so the timer cannot fire against a view the user has
//! already left.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::checkout::{Checkout, CheckoutEvent, CheckoutPhase, CheckoutSessionId, Receipt};
use crate::error::CheckoutError;
use crate::ledger::CartLedger;
use crate::store::KeyValueStore;

#[derive(Debug)]
pub struct CartSidebar {
    open: bool,
    checkout: Checkout,
}

impl CartSidebar {
    /// A closed sidebar and the receiver for its checkout timer events.
    #[must_use]
    pub fn new(checkout_delay: Duration) -> (Self, mpsc::UnboundedReceiver<CheckoutEvent>) {
        let (checkout, events) = Checkout::new(checkout_delay);
        (
            Self {
                open: false,
                checkout,
            },
            events,
        )
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.checkout.phase()
    }

    /// Open the sidebar on the cart contents.
    ///
    /// Any pending confirmation is cancelled and a completed checkout is
    /// acknowledged, so the sidebar always opens in `Reviewing`.
    pub fn open(&mut self) {
        self.checkout.cancel();
        self.checkout.acknowledge();
        self.open = true;
        debug!("Cart sidebar opened");
    }

    /// Close the sidebar, cancelling any pending confirmation.
    pub fn close(&mut self) {
        self.checkout.cancel();
        self.open = false;
        debug!("Cart sidebar closed");
    }

    /// Press "Checkout".
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::SidebarClosed` if the sidebar is not open, or
    /// any error from [`Checkout::begin`].
    pub fn checkout<S: KeyValueStore>(
        &mut self,
        ledger: &CartLedger<S>,
    ) -> Result<CheckoutSessionId, CheckoutError> {
        if !self.open {
            return Err(CheckoutError::SidebarClosed);
        }
        self.checkout.begin(ledger)
    }

    /// Feed a timer event back in. On completion the cart is cleared and the
    /// sidebar closes.
    pub fn handle_checkout_event<S: KeyValueStore>(
        &mut self,
        event: CheckoutEvent,
        ledger: &mut CartLedger<S>,
    ) -> Option<Receipt> {
        let receipt = self.checkout.complete(event, ledger)?;
        self.open = false;
        Some(receipt)
    }
}
