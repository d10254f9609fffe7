//! The checkout flow: entry-point resolution and the per-customer order
//! session state machine.

pub mod entry;
pub mod session;

pub use entry::{resolve_entry, EntryParams, EntryResolution};
pub use session::{CheckoutStep, CustomerDetails, DetailsInput, OrderSession, PaymentMethod};
