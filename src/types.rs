//! Common datatypes supporting functions throughout the installment ledger

use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::errors::Error;

/// The number of decimals to track for all amounts
pub const DECIMAL_SCALE: u32 = 2;

/// Rescales an amount to [`DECIMAL_SCALE`] places.
#[must_use]
pub fn rescaled(mut amount: Decimal) -> Decimal {
    amount.rescale(DECIMAL_SCALE);
    amount
}

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Unique identifier for a customer
    CustomerId
);
record_id!(
    /// Unique identifier for a product
    ProductId
);
record_id!(
    /// Unique identifier for an installment plan
    InstallmentId
);

/// A row that lives in one of the flat CSV stores.
pub trait Record: Serialize + DeserializeOwned {
    /// The identifier type of this record
    type Id: Copy + Eq + Display + From<u32> + Into<u32>;

    /// Header row written at the top of the store
    const HEADERS: &'static [&'static str];

    /// Lowercase name of the record kind, used in messages
    const KIND: &'static str;

    /// Returns the unique identifier of this record
    fn id(&self) -> Self::Id;

    /// Verifies a row read back from disk.
    ///
    /// # Errors
    /// [`Error::Corrupt`] if the stored fields contradict each other
    fn check(&self) -> Result<(), Error> {
        Ok(())
    }
}

/// A person buying products on installments
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Customer {
    #[serde(rename = "customer_id")]
    pub(crate) id: CustomerId,
    pub(crate) name: String,
    pub(crate) phone: String,
    pub(crate) address: String,
}

impl Customer {
    /// Returns the customer's identifier
    #[must_use]
    #[inline]
    pub fn id(&self) -> CustomerId {
        self.id
    }

    /// Returns the customer's name
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the customer's phone number
    #[must_use]
    #[inline]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Returns the customer's address
    #[must_use]
    #[inline]
    pub fn address(&self) -> &str {
        &self.address
    }
}

impl Record for Customer {
    type Id = CustomerId;
    const HEADERS: &'static [&'static str] = &["customer_id", "name", "phone", "address"];
    const KIND: &'static str = "customer";

    fn id(&self) -> CustomerId {
        self.id
    }
}

/// Something a customer can buy
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Product {
    #[serde(rename = "product_id")]
    pub(crate) id: ProductId,
    #[serde(rename = "product_name")]
    pub(crate) name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub(crate) price: Decimal,
}

impl Product {
    /// Returns the product's identifier
    #[must_use]
    #[inline]
    pub fn id(&self) -> ProductId {
        self.id
    }

    /// Returns the product's name
    #[must_use]
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the list price
    #[must_use]
    #[inline]
    pub fn price(&self) -> Decimal {
        self.price
    }
}

impl Record for Product {
    type Id = ProductId;
    const HEADERS: &'static [&'static str] = &["product_id", "product_name", "price"];
    const KIND: &'static str = "product";

    fn id(&self) -> ProductId {
        self.id
    }
}

/// Whether anything is still owed on an [`Installment`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallmentStatus {
    /// Nothing remains to be paid
    FullyPaid,
    /// Some balance is still outstanding
    Pending,
}

impl Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FullyPaid => write!(f, "FULLY PAID"),
            Self::Pending => write!(f, "PENDING"),
        }
    }
}

/// A payment plan linking one customer to one product.
///
/// `remaining_amount` is stored alongside the other amounts so the file is
/// readable on its own, but it is always recomputed as
/// `total_price - paid_amount` whenever the plan changes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Installment {
    #[serde(rename = "installment_id")]
    pub(crate) id: InstallmentId,
    pub(crate) customer_id: CustomerId,
    pub(crate) product_id: ProductId,
    #[serde(with = "rust_decimal::serde::str")]
    pub(crate) total_price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub(crate) paid_amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub(crate) remaining_amount: Decimal,
}

impl Installment {
    /// Builds a new plan, deriving the remaining balance.
    ///
    /// Callers are expected to have validated `0 <= paid_amount <= total_price`.
    pub(crate) fn new(
        id: InstallmentId,
        customer_id: CustomerId,
        product_id: ProductId,
        total_price: Decimal,
        paid_amount: Decimal,
    ) -> Self {
        let total_price = rescaled(total_price);
        let paid_amount = rescaled(paid_amount);
        Self {
            id,
            customer_id,
            product_id,
            total_price,
            paid_amount,
            remaining_amount: total_price - paid_amount,
        }
    }

    /// Returns the plan's identifier
    #[must_use]
    #[inline]
    pub fn id(&self) -> InstallmentId {
        self.id
    }

    /// Returns the customer paying for this plan
    #[must_use]
    #[inline]
    pub fn customer_id(&self) -> CustomerId {
        self.customer_id
    }

    /// Returns the product bought on this plan
    #[must_use]
    #[inline]
    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    /// Returns the agreed total price
    #[must_use]
    #[inline]
    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Returns how much has been paid so far
    #[must_use]
    #[inline]
    pub fn paid_amount(&self) -> Decimal {
        self.paid_amount
    }

    /// Returns how much is still owed
    #[must_use]
    #[inline]
    pub fn remaining_amount(&self) -> Decimal {
        self.remaining_amount
    }

    /// Returns whether the plan has been paid off
    #[must_use]
    pub fn status(&self) -> InstallmentStatus {
        if self.remaining_amount.is_zero() {
            InstallmentStatus::FullyPaid
        } else {
            InstallmentStatus::Pending
        }
    }
}

impl Record for Installment {
    type Id = InstallmentId;
    const HEADERS: &'static [&'static str] = &[
        "installment_id",
        "customer_id",
        "product_id",
        "total_price",
        "paid_amount",
        "remaining_amount",
    ];
    const KIND: &'static str = "installment";

    fn id(&self) -> InstallmentId {
        self.id
    }

    fn check(&self) -> Result<(), Error> {
        let consistent = self.paid_amount >= Decimal::ZERO
            && self.paid_amount <= self.total_price
            && self.paid_amount + self.remaining_amount == self.total_price;
        if consistent {
            Ok(())
        } else {
            Err(Error::Corrupt(format!(
                "installment {} has total {}, paid {}, remaining {}",
                self.id, self.total_price, self.paid_amount, self.remaining_amount
            )))
        }
    }
}

/// Input for adding a customer. A missing `id` gets the next free identifier.
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    /// Requested identifier, if any
    pub id: Option<CustomerId>,
    /// Customer name; must not be blank
    pub name: String,
    /// Phone number; blank or at least ten digits
    pub phone: String,
    /// Postal address
    pub address: String,
}

/// Fields to change on an existing customer; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    /// New name
    pub name: Option<String>,
    /// New phone number
    pub phone: Option<String>,
    /// New address
    pub address: Option<String>,
}

/// Input for adding a product. A missing `id` gets the next free identifier.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    /// Requested identifier, if any
    pub id: Option<ProductId>,
    /// Product name; must not be blank
    pub name: String,
    /// List price; must not be negative
    pub price: Decimal,
}

/// Fields to change on an existing product; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    /// New name
    pub name: Option<String>,
    /// New list price
    pub price: Option<Decimal>,
}

/// Input for opening an installment plan
#[derive(Debug, Clone)]
pub struct NewInstallment {
    /// Customer paying for the plan
    pub customer_id: CustomerId,
    /// Product being bought
    pub product_id: ProductId,
    /// Agreed total; defaults to the product's current price
    pub total_price: Option<Decimal>,
    /// Down payment made when opening the plan
    pub paid_amount: Decimal,
}
