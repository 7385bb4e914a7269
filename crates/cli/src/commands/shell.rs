//! `shopfront shell` - interactive storefront.
//!
//! One event loop handles both user input lines and checkout timer events, so
//! the ledger is only ever touched from one place, one event at a time.

use std::io::Write;
use std::str::FromStr;

use rust_decimal::Decimal;
use shopfront_cart::{
    CartError, CartLedger, CartSidebar, CartView, CheckoutEvent, CheckoutPhase, KeyValueStore,
};
use shopfront_core::{CategoryFilter, FilterState, Price, ProductId};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::render;

const HELP: &str = "\
Commands:
  catalog                 show the filtered catalog
  filter <category|All>   choose a category
  price <max>             set the price ceiling (0-300)
  add <id>                add one unit to the cart
  inc <id> / dec <id>     +/- one unit of a cart line
  qty <id> <n>            set a line's quantity (0 removes)
  remove <id>             remove a line
  clear                   empty the cart
  open / close            open or close the cart sidebar
  cart                    show the cart sidebar
  checkout                check out (sidebar must be open)
  help                    show this help
  quit                    leave";

/// Errors parsing a shell input line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command: {0} (try 'help')")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("{0}")]
    Invalid(String),
}

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    Catalog,
    Filter(CategoryFilter),
    Price(Decimal),
    Add(ProductId),
    Increment(ProductId),
    Decrement(ProductId),
    Quantity(ProductId, i64),
    Remove(ProductId),
    Clear,
    Open,
    Close,
    Cart,
    Checkout,
    Quit,
}

fn product_id(arg: Option<&str>, usage: &'static str) -> Result<ProductId, ParseError> {
    let raw = arg.ok_or(ParseError::Usage(usage))?;
    raw.parse()
        .map_err(|_| ParseError::Invalid(format!("not a product id: {raw}")))
}

impl FromStr for ShellCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_ascii_lowercase();
        let arg = words.next();

        let parsed = match command.as_str() {
            "help" | "?" => Self::Help,
            "catalog" | "ls" => Self::Catalog,
            "filter" => {
                let raw = arg.ok_or(ParseError::Usage("filter <category|All>"))?;
                Self::Filter(
                    raw.parse()
                        .map_err(|e: shopfront_core::CategoryParseError| {
                            ParseError::Invalid(e.to_string())
                        })?,
                )
            }
            "price" => {
                let raw = arg.ok_or(ParseError::Usage("price <max>"))?;
                Self::Price(Price::parse_amount(raw).map_err(|e| ParseError::Invalid(e.to_string()))?)
            }
            "add" => Self::Add(product_id(arg, "add <id>")?),
            "inc" | "+" => Self::Increment(product_id(arg, "inc <id>")?),
            "dec" | "-" => Self::Decrement(product_id(arg, "dec <id>")?),
            "qty" => {
                let id = product_id(arg, "qty <id> <n>")?;
                let raw = words.next().ok_or(ParseError::Usage("qty <id> <n>"))?;
                let quantity = raw
                    .parse::<i64>()
                    .map_err(|_| ParseError::Invalid(format!("not a whole number: {raw}")))?;
                Self::Quantity(id, quantity)
            }
            "remove" | "rm" => Self::Remove(product_id(arg, "remove <id>")?),
            "clear" => Self::Clear,
            "open" => Self::Open,
            "close" => Self::Close,
            "cart" => Self::Cart,
            "checkout" => Self::Checkout,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(ParseError::UnknownCommand(other.to_string())),
        };
        Ok(parsed)
    }
}

/// Whether the event loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Presentation state for the interactive session.
pub struct Shell<'a, W, S> {
    out: W,
    ledger: &'a mut CartLedger<S>,
    sidebar: CartSidebar,
    filter: FilterState,
}

impl<'a, W: Write, S: KeyValueStore> Shell<'a, W, S> {
    /// Create a shell and the receiver for its checkout timer events.
    pub fn new(
        out: W,
        ledger: &'a mut CartLedger<S>,
        checkout_delay: std::time::Duration,
    ) -> (Self, mpsc::UnboundedReceiver<CheckoutEvent>) {
        let (sidebar, events) = CartSidebar::new(checkout_delay);
        (
            Self {
                out,
                ledger,
                sidebar,
                filter: FilterState::default(),
            },
            events,
        )
    }

    /// Current filter.
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub const fn sidebar(&self) -> &CartSidebar {
        &self.sidebar
    }

    pub fn ledger(&self) -> &CartLedger<S> {
        self.ledger
    }

    /// Consume the shell, returning its output sink.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Handle one input line. Parse and cart errors are reported to the user,
    /// not returned.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing the output fails.
    pub fn handle_line(&mut self, line: &str) -> std::io::Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        match line.parse::<ShellCommand>() {
            Ok(command) => self.handle(command),
            Err(e) => {
                writeln!(self.out, "{e}")?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Handle one command.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing the output fails.
    pub fn handle(&mut self, command: ShellCommand) -> std::io::Result<Flow> {
        debug!(?command, "Shell command");
        match command {
            ShellCommand::Help => writeln!(self.out, "{HELP}")?,
            ShellCommand::Catalog => render::catalog(&mut self.out, self.ledger, &self.filter)?,
            ShellCommand::Filter(category) => {
                self.filter.category = category;
                render::catalog(&mut self.out, self.ledger, &self.filter)?;
            }
            ShellCommand::Price(ceiling) => {
                self.filter.set_price_ceiling(ceiling);
                render::catalog(&mut self.out, self.ledger, &self.filter)?;
            }
            ShellCommand::Add(id) => self.add(id)?,
            ShellCommand::Increment(id) => {
                let quantity = self.ledger.quantity_of(id);
                if quantity == 0 {
                    writeln!(self.out, "Product {id} is not in the cart")?;
                } else {
                    self.set_quantity(id, i64::from(quantity) + 1)?;
                }
            }
            ShellCommand::Decrement(id) => {
                let quantity = self.ledger.quantity_of(id);
                if quantity == 0 {
                    writeln!(self.out, "Product {id} is not in the cart")?;
                } else {
                    self.set_quantity(id, i64::from(quantity) - 1)?;
                }
            }
            ShellCommand::Quantity(id, quantity) => self.set_quantity(id, quantity)?,
            ShellCommand::Remove(id) => {
                if let Some(line) = self.ledger.remove_from_cart(id) {
                    writeln!(self.out, "Removed {}", line.product().name)?;
                }
                self.refresh()?;
            }
            ShellCommand::Clear => {
                self.ledger.clear();
                self.refresh()?;
            }
            ShellCommand::Open => {
                self.sidebar.open();
                self.refresh()?;
            }
            ShellCommand::Close => {
                self.sidebar.close();
                render::badge(&mut self.out, self.ledger.total_items())?;
            }
            ShellCommand::Cart => render::cart(&mut self.out, &CartView::from(&*self.ledger))?,
            ShellCommand::Checkout => match self.sidebar.checkout(self.ledger) {
                Ok(_) => render::confirming(&mut self.out)?,
                Err(e) => writeln!(self.out, "Cannot check out: {e}")?,
            },
            ShellCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Apply a checkout timer event.
    ///
    /// # Errors
    ///
    /// Returns an error only if writing the output fails.
    pub fn handle_checkout_event(&mut self, event: CheckoutEvent) -> std::io::Result<()> {
        if let Some(receipt) = self.sidebar.handle_checkout_event(event, self.ledger) {
            render::receipt(&mut self.out, &receipt)?;
            render::badge(&mut self.out, self.ledger.total_items())?;
        }
        Ok(())
    }

    fn add(&mut self, id: ProductId) -> std::io::Result<()> {
        let Some(product) = self.ledger.catalog().get(id).cloned() else {
            return writeln!(self.out, "{}", CartError::UnknownProduct(id));
        };
        match self.ledger.add_to_cart(&product) {
            Ok(0) => writeln!(self.out, "{} is out of stock", product.name)?,
            Ok(quantity) => writeln!(self.out, "{} - In Cart ({quantity})", product.name)?,
            Err(e) => writeln!(self.out, "{e}")?,
        }
        render::badge(&mut self.out, self.ledger.total_items())
    }

    fn set_quantity(&mut self, id: ProductId, quantity: i64) -> std::io::Result<()> {
        if let Err(e) = self.ledger.set_quantity(id, quantity) {
            writeln!(self.out, "{e}")?;
        }
        self.refresh()
    }

    /// Re-render the sidebar if it is showing the cart, otherwise the badge.
    fn refresh(&mut self) -> std::io::Result<()> {
        if self.sidebar.is_open() && self.sidebar.phase() == CheckoutPhase::Reviewing {
            render::cart(&mut self.out, &CartView::from(&*self.ledger))
        } else {
            render::badge(&mut self.out, self.ledger.total_items())
        }
    }
}

/// Drive a shell from `input` until EOF or `quit`.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn run<R, W, S>(
    input: R,
    out: W,
    ledger: &mut CartLedger<S>,
    checkout_delay: std::time::Duration,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    S: KeyValueStore,
{
    let (mut shell, mut events) = Shell::new(out, ledger, checkout_delay);
    shell.handle(ShellCommand::Help)?;
    shell.handle(ShellCommand::Catalog)?;

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if shell.handle_line(&line)? == Flow::Quit {
                    break;
                }
            }
            Some(event) = events.recv() => shell.handle_checkout_event(event)?,
        }
        shell.out.flush()?;
    }
    Ok(())
}
