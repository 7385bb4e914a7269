//! Simulated checkout.
//!
//! `Reviewing -> Confirming -> Completed`. Starting a checkout spawns a
//! one-shot timer that, after the configured delay, sends a
//! [`CheckoutEvent`] for its session on a channel. The owner of the ledger
//! feeds that event back into [`Checkout::complete`], which clears the cart
//! only if the event's session is still the one being confirmed. Cancelling
//! aborts the timer and forgets the session, so a timer that already fired
//! is ignored as stale.

use core::fmt;
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::CheckoutError;
use crate::ledger::CartLedger;
use crate::store::KeyValueStore;

/// Identifies one checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckoutSessionId(Uuid);

impl CheckoutSessionId {
    fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CheckoutSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Where the checkout flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutPhase {
    /// The user is looking at their cart.
    #[default]
    Reviewing,
    /// "Order confirmed" is showing; the cart clears when the delay elapses.
    Confirming(CheckoutSessionId),
    /// The cart was cleared by this session.
    Completed(CheckoutSessionId),
}

/// The confirmation delay for a session has elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutEvent {
    pub session: CheckoutSessionId,
}

/// What was checked out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub session: CheckoutSessionId,
    pub items: u64,
    pub total: Decimal,
}

/// Checkout state machine plus its pending timer.
#[derive(Debug)]
pub struct Checkout {
    delay: Duration,
    phase: CheckoutPhase,
    timer: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<CheckoutEvent>,
}

impl Checkout {
    /// Delay between "order confirmed" and the cart clearing.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(3);

    /// Create a checkout and the receiver its timer events arrive on.
    #[must_use]
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<CheckoutEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let checkout = Self {
            delay,
            phase: CheckoutPhase::Reviewing,
            timer: None,
            events,
        };
        (checkout, receiver)
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.phase
    }

    /// Whether a confirmation is pending.
    #[must_use]
    pub const fn is_confirming(&self) -> bool {
        matches!(self.phase, CheckoutPhase::Confirming(_))
    }

    /// Start confirming the current cart and arm the timer.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::AlreadyConfirming` while a confirmation is pending
    /// - `CheckoutError::EmptyCart` if the ledger has no lines
    /// - `CheckoutError::NoRuntime` outside a Tokio runtime
    #[instrument(skip(self, ledger), fields(items = ledger.total_items()))]
    pub fn begin<S: KeyValueStore>(
        &mut self,
        ledger: &CartLedger<S>,
    ) -> Result<CheckoutSessionId, CheckoutError> {
        if self.is_confirming() {
            return Err(CheckoutError::AlreadyConfirming);
        }
        if ledger.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let runtime = Handle::try_current().map_err(|_| CheckoutError::NoRuntime)?;

        let session = CheckoutSessionId::generate();
        let events = self.events.clone();
        let delay = self.delay;
        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            // The receiver may be gone if the event loop already exited.
            let _ = events.send(CheckoutEvent { session });
        }));
        self.phase = CheckoutPhase::Confirming(session);

        info!(%session, delay_ms = delay.as_millis(), "Checkout confirming");
        Ok(session)
    }

    /// Abort a pending confirmation. Returns the cancelled session, if any.
    pub fn cancel(&mut self) -> Option<CheckoutSessionId> {
        let CheckoutPhase::Confirming(session) = self.phase else {
            return None;
        };
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.phase = CheckoutPhase::Reviewing;
        info!(%session, "Checkout cancelled");
        Some(session)
    }

    /// Apply a timer event.
    ///
    /// Clears the ledger and moves to `Completed` if the event belongs to the
    /// pending session. Events for any other session are stale and ignored.
    /// Each session completes at most once.
    pub fn complete<S: KeyValueStore>(
        &mut self,
        event: CheckoutEvent,
        ledger: &mut CartLedger<S>,
    ) -> Option<Receipt> {
        if self.phase != CheckoutPhase::Confirming(event.session) {
            debug!(session = %event.session, "Ignoring stale checkout event");
            return None;
        }

        let receipt = Receipt {
            session: event.session,
            items: ledger.total_items(),
            total: ledger.total_price(),
        };
        ledger.clear();
        self.timer = None;
        self.phase = CheckoutPhase::Completed(event.session);

        info!(
            session = %receipt.session,
            items = receipt.items,
            total = %receipt.total,
            "Checkout completed"
        );
        Some(receipt)
    }

    /// Leave `Completed` and go back to `Reviewing`.
    pub const fn acknowledge(&mut self) {
        if let CheckoutPhase::Completed(_) = self.phase {
            self.phase = CheckoutPhase::Reviewing;
        }
    }
}

impl Drop for Checkout {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
