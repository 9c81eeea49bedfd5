use rust_decimal::Decimal;

use crate::types::{CustomerId, InstallmentId, ProductId};

/// Error type that can be returned by fallible operations in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error reading or writing CSV files; could wrap IO or parsing errors
    #[error("Error processing CSV: {0}")]
    Csv(#[from] csv::Error),
    /// Error creating the data directory or opening a store
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A stored row contradicts itself, e.g. paid + remaining != total
    #[error("Corrupt record: {0}")]
    Corrupt(String),
    /// Operator text that should have been a number
    #[error("{field} must be numeric, got {value:?}")]
    NotNumeric {
        /// Which input was being parsed
        field: &'static str,
        /// The rejected text
        value: String,
    },
    /// Identifiers start at 1
    #[error("{0} must be a positive integer")]
    NonPositiveId(&'static str),
    /// A required text field was blank
    #[error("{0} cannot be empty")]
    Empty(&'static str),
    /// Phone numbers are blank or at least ten digits
    #[error("Invalid phone number {0:?}: expected at least 10 digits")]
    InvalidPhone(String),
    /// Prices and paid amounts cannot go below zero
    #[error("{field} cannot be negative, got {amount}")]
    NegativeAmount {
        /// Which amount was rejected
        field: &'static str,
        /// The rejected amount
        amount: Decimal,
    },
    /// More decimal places than the ledger keeps
    #[error("{field} has more than {places} decimal places, got {amount}")]
    TooManyDecimals {
        /// Which amount was rejected
        field: &'static str,
        /// The rejected amount
        amount: Decimal,
        /// Places the ledger keeps
        places: u32,
    },
    /// A sum of amounts does not fit in a decimal
    #[error("{0} is too large to compute")]
    AmountOverflow(&'static str),
    /// Every identifier up to the maximum is taken
    #[error("No {0} identifiers left to assign")]
    IdsExhausted(&'static str),
    /// Payments must move the balance
    #[error("Payment must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),
    /// The down payment of a new plan is larger than its total
    #[error("Paid amount {paid} exceeds total price {total}")]
    PaidExceedsTotal {
        /// Requested paid amount
        paid: Decimal,
        /// Total price of the plan
        total: Decimal,
    },
    /// A payment is larger than what is still owed
    #[error("Payment {payment} exceeds remaining balance {remaining} of installment {id}")]
    Overpayment {
        /// The plan being paid
        id: InstallmentId,
        /// Requested payment
        payment: Decimal,
        /// Balance still owed
        remaining: Decimal,
    },
    /// Customer identifiers must be unique
    #[error("Customer ID {0} already exists")]
    DuplicateCustomer(CustomerId),
    /// Product identifiers must be unique
    #[error("Product ID {0} already exists")]
    DuplicateProduct(ProductId),
    /// No customer has this identifier
    #[error("Customer {0} not found")]
    CustomerNotFound(CustomerId),
    /// No product has this identifier
    #[error("Product {0} not found")]
    ProductNotFound(ProductId),
    /// No installment has this identifier
    #[error("Installment {0} not found")]
    InstallmentNotFound(InstallmentId),
    /// A customer with open or past installments cannot be removed
    #[error("Customer {0} is referenced by installments")]
    CustomerInUse(CustomerId),
    /// A product with open or past installments cannot be removed
    #[error("Product {0} is referenced by installments")]
    ProductInUse(ProductId),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
