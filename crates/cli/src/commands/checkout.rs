//! `shopfront checkout` - simulated checkout.
//!
//! Shows the cart, then "Order Confirmed!", waits out the confirmation delay
//! and clears the cart. Interrupting (Ctrl-C) during the wait cancels the
//! checkout and keeps the cart.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use shopfront_cart::{CartLedger, CartSidebar, CartView, KeyValueStore};
use tracing::info;

use crate::render;

/// Run a checkout, cancelling on Ctrl-C.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` if there is nothing to buy, or an I/O
/// error from writing the output.
pub async fn run<W: Write, S: KeyValueStore>(
    out: &mut W,
    ledger: &mut CartLedger<S>,
    delay: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    run_until(out, ledger, delay, async {
        // If the signal handler cannot be installed, never cancel.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    })
    .await
}

/// Run a checkout that is cancelled if `cancel` resolves first.
///
/// # Errors
///
/// Returns `CheckoutError::EmptyCart` if there is nothing to buy, or an I/O
/// error from writing the output.
pub async fn run_until<W, S, F>(
    out: &mut W,
    ledger: &mut CartLedger<S>,
    delay: Duration,
    cancel: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    W: Write,
    S: KeyValueStore,
    F: Future<Output = ()>,
{
    let (mut sidebar, mut events) = CartSidebar::new(delay);
    sidebar.open();
    render::cart(out, &CartView::from(&*ledger))?;
    writeln!(out)?;

    sidebar.checkout(ledger)?;
    render::confirming(out)?;
    out.flush()?;

    tokio::select! {
        Some(event) = events.recv() => {
            if let Some(receipt) = sidebar.handle_checkout_event(event, ledger) {
                render::receipt(out, &receipt)?;
            }
        }
        () = cancel => {
            sidebar.close();
            info!("Checkout interrupted");
            writeln!(out, "Checkout cancelled; your cart was kept")?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use shopfront_cart::{CheckoutError, MemoryStore};
    use shopfront_core::{Catalog, ProductId};

    fn filled_ledger() -> CartLedger<MemoryStore> {
        let mut ledger = CartLedger::new(Arc::new(Catalog::demo()), MemoryStore::new());
        let backpack = ledger.catalog().get(ProductId::new(5)).unwrap().clone();
        ledger.add_to_cart(&backpack).unwrap();
        ledger
    }

    #[tokio::test(start_paused = true)]
    async fn test_checkout_clears_after_delay() {
        let mut ledger = filled_ledger();
        let mut out = Vec::new();
        run_until(
            &mut out,
            &mut ledger,
            Duration::from_secs(3),
            std::future::pending(),
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Order Confirmed!"));
        assert!(text.contains("Checked out 1 item(s) for $49.99"));
        assert!(ledger.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_keeps_cart() {
        let mut ledger = filled_ledger();
        let mut out = Vec::new();
        run_until(
            &mut out,
            &mut ledger,
            Duration::from_secs(3),
            tokio::time::sleep(Duration::from_secs(1)),
        )
        .await
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Checkout cancelled"));
        assert_eq!(ledger.total_items(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_cart_is_error() {
        let mut ledger = CartLedger::new(Arc::new(Catalog::demo()), MemoryStore::new());
        let mut out = Vec::new();
        let err = run_until(
            &mut out,
            &mut ledger,
            Duration::from_secs(3),
            std::future::pending(),
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<CheckoutError>(),
            Some(&CheckoutError::EmptyCart)
        );
    }
}
