pub mod ledger;
pub mod payment;

use thiserror::Error;

use crate::storage::kv::StorageError;

pub use ledger::{CashRegister, DailyReport};
pub use payment::{totals_by_method, LineItem, MethodTotal, Payment, PaymentMethod};

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("Payment has no items")]
    EmptyPayment,
    #[error("Invalid quantity for '{0}'")]
    InvalidQuantity(String),
}
