use log::info;
use rust_decimal::Decimal;

use crate::{
    config::Config,
    errors::{Error, Result},
    io,
    types::{
        rescaled, Customer, CustomerId, CustomerUpdate, Installment, InstallmentId,
        NewCustomer, NewInstallment, NewProduct, Product, ProductId, ProductUpdate,
    },
    validate::{ledger_scale, non_negative, normalize_phone, require_text},
};

/// The installment ledger, backed by three CSV stores.
///
/// Every operation loads the store(s) it needs in full, works on the in-memory
/// copy and rewrites the affected store. Nothing is cached between calls, so
/// the files are always the source of truth.
///
/// # Limitations
/// Only one process may use the data directory at a time. Operations touching
/// more than one store are not atomic across files.
#[derive(Debug, Clone)]
pub struct Ledger {
    config: Config,
}

impl Ledger {
    /// Opens the ledger, creating the data directory and empty stores if needed.
    ///
    /// # Errors
    /// [`Error::Io`] or [`Error::Csv`] if the stores cannot be created
    pub fn open(config: Config) -> Result<Self> {
        io::initialize(&config)?;
        Ok(Self { config })
    }

    /// Returns the configuration this ledger was opened with
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Lists every customer, in file order.
    ///
    /// # Errors
    /// [`Error::Io`] or [`Error::Csv`] if the store cannot be read
    pub fn customers(&self) -> Result<Vec<Customer>> {
        io::load_records(&self.config.customers_path())
    }

    /// Finds a customer by identifier.
    ///
    /// # Errors
    /// [`Error::CustomerNotFound`] if no customer has this id
    pub fn customer(&self, id: CustomerId) -> Result<Customer> {
        self.customers()?
            .into_iter()
            .find(|customer| customer.id == id)
            .ok_or(Error::CustomerNotFound(id))
    }

    /// Adds a customer, assigning the next free id when none is requested.
    ///
    /// # Errors
    /// [`Error::DuplicateCustomer`], [`Error::Empty`] for a blank name,
    /// [`Error::InvalidPhone`]
    pub fn add_customer(&self, new: NewCustomer) -> Result<Customer> {
        let path = self.config.customers_path();
        let mut customers: Vec<Customer> = io::load_records(&path)?;
        let id = match new.id {
            Some(id) if customers.iter().any(|customer| customer.id == id) => {
                return Err(Error::DuplicateCustomer(id))
            }
            Some(id) => id,
            None => io::next_id(&customers)?,
        };
        let customer = Customer {
            id,
            name: require_text("Name", &new.name)?,
            phone: normalize_phone(&new.phone)?,
            address: new.address.trim().to_owned(),
        };
        customers.push(customer.clone());
        io::save_records(&path, &customers)?;
        info!("Added customer {} ({})", customer.id, customer.name);
        Ok(customer)
    }

    /// Changes the given fields of a customer in place.
    ///
    /// # Errors
    /// [`Error::CustomerNotFound`], plus the validation errors of [`Ledger::add_customer`]
    pub fn update_customer(&self, id: CustomerId, update: CustomerUpdate) -> Result<Customer> {
        let path = self.config.customers_path();
        let mut customers: Vec<Customer> = io::load_records(&path)?;
        let customer = customers
            .iter_mut()
            .find(|customer| customer.id == id)
            .ok_or(Error::CustomerNotFound(id))?;
        if let Some(name) = update.name {
            customer.name = require_text("Name", &name)?;
        }
        if let Some(phone) = update.phone {
            customer.phone = normalize_phone(&phone)?;
        }
        if let Some(address) = update.address {
            customer.address = address.trim().to_owned();
        }
        let updated = customer.clone();
        io::save_records(&path, &customers)?;
        info!("Updated customer {}", id);
        Ok(updated)
    }

    /// Removes a customer that no installment refers to.
    ///
    /// # Errors
    /// [`Error::CustomerNotFound`], [`Error::CustomerInUse`]
    pub fn delete_customer(&self, id: CustomerId) -> Result<Customer> {
        let path = self.config.customers_path();
        let mut customers: Vec<Customer> = io::load_records(&path)?;
        let index = customers
            .iter()
            .position(|customer| customer.id == id)
            .ok_or(Error::CustomerNotFound(id))?;
        if self.installments()?.iter().any(|plan| plan.customer_id == id) {
            return Err(Error::CustomerInUse(id));
        }
        let removed = customers.remove(index);
        io::save_records(&path, &customers)?;
        info!("Deleted customer {}", id);
        Ok(removed)
    }

    /// Lists every product, in file order.
    ///
    /// # Errors
    /// [`Error::Io`] or [`Error::Csv`] if the store cannot be read
    pub fn products(&self) -> Result<Vec<Product>> {
        io::load_records(&self.config.products_path())
    }

    /// Finds a product by identifier.
    ///
    /// # Errors
    /// [`Error::ProductNotFound`] if no product has this id
    pub fn product(&self, id: ProductId) -> Result<Product> {
        self.products()?
            .into_iter()
            .find(|product| product.id == id)
            .ok_or(Error::ProductNotFound(id))
    }

    /// Adds a product, assigning the next free id when none is requested.
    ///
    /// # Errors
    /// [`Error::DuplicateProduct`], [`Error::Empty`], [`Error::NegativeAmount`]
    pub fn add_product(&self, new: NewProduct) -> Result<Product> {
        let path = self.config.products_path();
        let mut products: Vec<Product> = io::load_records(&path)?;
        let id = match new.id {
            Some(id) if products.iter().any(|product| product.id == id) => {
                return Err(Error::DuplicateProduct(id))
            }
            Some(id) => id,
            None => io::next_id(&products)?,
        };
        let product = Product {
            id,
            name: require_text("Product name", &new.name)?,
            price: non_negative("Price", new.price)?,
        };
        products.push(product.clone());
        io::save_records(&path, &products)?;
        info!("Added product {} ({}) at {}", product.id, product.name, product.price);
        Ok(product)
    }

    /// Changes the given fields of a product in place.
    ///
    /// Existing installments keep the total they were opened with.
    ///
    /// # Errors
    /// [`Error::ProductNotFound`], plus the validation errors of [`Ledger::add_product`]
    pub fn update_product(&self, id: ProductId, update: ProductUpdate) -> Result<Product> {
        let path = self.config.products_path();
        let mut products: Vec<Product> = io::load_records(&path)?;
        let product = products
            .iter_mut()
            .find(|product| product.id == id)
            .ok_or(Error::ProductNotFound(id))?;
        if let Some(name) = update.name {
            product.name = require_text("Product name", &name)?;
        }
        if let Some(price) = update.price {
            product.price = non_negative("Price", price)?;
        }
        let updated = product.clone();
        io::save_records(&path, &products)?;
        info!("Updated product {}", id);
        Ok(updated)
    }

    /// Removes a product that no installment refers to.
    ///
    /// # Errors
    /// [`Error::ProductNotFound`], [`Error::ProductInUse`]
    pub fn delete_product(&self, id: ProductId) -> Result<Product> {
        let path = self.config.products_path();
        let mut products: Vec<Product> = io::load_records(&path)?;
        let index = products
            .iter()
            .position(|product| product.id == id)
            .ok_or(Error::ProductNotFound(id))?;
        if self.installments()?.iter().any(|plan| plan.product_id == id) {
            return Err(Error::ProductInUse(id));
        }
        let removed = products.remove(index);
        io::save_records(&path, &products)?;
        info!("Deleted product {}", id);
        Ok(removed)
    }

    /// Lists every installment plan, in file order.
    ///
    /// # Errors
    /// [`Error::Io`] or [`Error::Csv`] if the store cannot be read,
    /// [`Error::Corrupt`] for a row whose amounts don't add up
    pub fn installments(&self) -> Result<Vec<Installment>> {
        io::load_records(&self.config.installments_path())
    }

    /// Finds an installment plan by identifier.
    ///
    /// # Errors
    /// [`Error::InstallmentNotFound`] if no plan has this id
    pub fn installment(&self, id: InstallmentId) -> Result<Installment> {
        self.installments()?
            .into_iter()
            .find(|plan| plan.id == id)
            .ok_or(Error::InstallmentNotFound(id))
    }

    /// Opens a plan for an existing customer and product.
    ///
    /// Without an explicit total, the product's current price is used. The
    /// remaining amount is derived as `total - paid`.
    ///
    /// # Errors
    /// [`Error::CustomerNotFound`], [`Error::ProductNotFound`],
    /// [`Error::NegativeAmount`], [`Error::PaidExceedsTotal`]
    pub fn create_installment(&self, new: NewInstallment) -> Result<Installment> {
        self.customer(new.customer_id)?;
        let product = self.product(new.product_id)?;
        let total = non_negative("Total price", new.total_price.unwrap_or(product.price))?;
        let paid = non_negative("Paid amount", new.paid_amount)?;
        if paid > total {
            return Err(Error::PaidExceedsTotal { paid, total });
        }

        let path = self.config.installments_path();
        let mut installments: Vec<Installment> = io::load_records(&path)?;
        let plan = Installment::new(
            io::next_id(&installments)?,
            new.customer_id,
            new.product_id,
            total,
            paid,
        );
        installments.push(plan.clone());
        io::save_records(&path, &installments)?;
        info!(
            "Created installment {} for customer {} on product {}: total {}, paid {}",
            plan.id, plan.customer_id, plan.product_id, plan.total_price, plan.paid_amount
        );
        Ok(plan)
    }

    /// Applies a payment against the remaining balance of a plan.
    ///
    /// # Errors
    /// [`Error::InstallmentNotFound`], [`Error::NonPositiveAmount`] for zero or
    /// negative payments, [`Error::TooManyDecimals`], [`Error::Overpayment`] when
    /// the payment exceeds the remaining balance
    pub fn make_payment(&self, id: InstallmentId, amount: Decimal) -> Result<Installment> {
        let payment = ledger_scale("Payment amount", amount)?;
        let path = self.config.installments_path();
        let mut installments: Vec<Installment> = io::load_records(&path)?;
        let plan = installments
            .iter_mut()
            .find(|plan| plan.id == id)
            .ok_or(Error::InstallmentNotFound(id))?;
        if payment <= Decimal::ZERO {
            return Err(Error::NonPositiveAmount(payment));
        }
        if payment > plan.remaining_amount {
            return Err(Error::Overpayment {
                id,
                payment,
                remaining: plan.remaining_amount,
            });
        }
        plan.paid_amount += payment;
        plan.remaining_amount = plan.total_price - plan.paid_amount;
        let updated = plan.clone();
        io::save_records(&path, &installments)?;
        info!(
            "Payment of {} on installment {}: paid {}, remaining {}",
            payment, id, updated.paid_amount, updated.remaining_amount
        );
        Ok(updated)
    }

    /// Lists the plans of an existing customer.
    ///
    /// # Errors
    /// [`Error::CustomerNotFound`]
    pub fn customer_installments(&self, customer_id: CustomerId) -> Result<Vec<Installment>> {
        self.customer(customer_id)?;
        Ok(self
            .installments()?
            .into_iter()
            .filter(|plan| plan.customer_id == customer_id)
            .collect())
    }

    /// Sums what an existing customer still owes across all plans.
    ///
    /// # Errors
    /// [`Error::CustomerNotFound`], [`Error::AmountOverflow`] if the total
    /// does not fit in a decimal
    pub fn customer_balance(&self, customer_id: CustomerId) -> Result<Decimal> {
        let balance = self
            .customer_installments(customer_id)?
            .iter()
            .try_fold(Decimal::ZERO, |sum, plan| {
                sum.checked_add(plan.remaining_amount)
            })
            .ok_or(Error::AmountOverflow("Customer balance"))?;
        Ok(rescaled(balance))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use super::*;

    fn ledger() -> (TempDir, Ledger) {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Ledger::open(Config::new(dir.path())).unwrap();
        (dir, ledger)
    }

    fn seeded() -> (TempDir, Ledger) {
        let (dir, ledger) = ledger();
        ledger
            .add_customer(NewCustomer {
                id: Some(1.into()),
                name: "Ann".to_owned(),
                phone: "0123456789".to_owned(),
                address: "1 Main St".to_owned(),
            })
            .unwrap();
        ledger
            .add_product(NewProduct {
                id: Some(10.into()),
                name: "Fridge".to_owned(),
                price: dec!(1000),
            })
            .unwrap();
        (dir, ledger)
    }

    fn open_plan(ledger: &Ledger, paid: Decimal) -> Installment {
        ledger
            .create_installment(NewInstallment {
                customer_id: 1.into(),
                product_id: 10.into(),
                total_price: None,
                paid_amount: paid,
            })
            .unwrap()
    }

    #[test]
    fn test_add_and_find_customer() {
        let (_dir, ledger) = seeded();
        let customer = ledger.customer(1.into()).unwrap();
        assert_eq!(customer.name(), "Ann");
        assert!(matches!(
            ledger.customer(2.into()),
            Err(Error::CustomerNotFound(_))
        ));
    }

    #[test]
    fn test_duplicate_customer_rejected() {
        let (_dir, ledger) = seeded();
        let result = ledger.add_customer(NewCustomer {
            id: Some(1.into()),
            name: "Bob".to_owned(),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::DuplicateCustomer(_))));
        assert_eq!(ledger.customers().unwrap().len(), 1);
    }

    #[test]
    fn test_customer_id_auto_assigned() {
        let (_dir, ledger) = seeded();
        let customer = ledger
            .add_customer(NewCustomer {
                name: "Bob".to_owned(),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(customer.id(), CustomerId::from(2));
    }

    #[test]
    fn test_blank_name_rejected() {
        let (_dir, ledger) = ledger();
        let result = ledger.add_customer(NewCustomer {
            name: "  ".to_owned(),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::Empty(_))));
        let result = ledger.add_product(NewProduct {
            name: String::new(),
            price: dec!(1),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::Empty(_))));
    }

    #[test]
    fn test_update_customer_keeps_untouched_fields() {
        let (_dir, ledger) = seeded();
        let updated = ledger
            .update_customer(
                1.into(),
                CustomerUpdate {
                    address: Some("2 High St".to_owned()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name(), "Ann");
        assert_eq!(updated.address(), "2 High St");
        assert_eq!(ledger.customer(1.into()).unwrap(), updated);
    }

    #[test]
    fn test_duplicate_product_and_negative_price_rejected() {
        let (_dir, ledger) = seeded();
        let result = ledger.add_product(NewProduct {
            id: Some(10.into()),
            name: "Oven".to_owned(),
            price: dec!(5),
        });
        assert!(matches!(result, Err(Error::DuplicateProduct(_))));
        let result = ledger.add_product(NewProduct {
            name: "Oven".to_owned(),
            price: dec!(-5),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::NegativeAmount { .. })));
    }

    #[test]
    fn test_update_product_price() {
        let (_dir, ledger) = seeded();
        let plan = open_plan(&ledger, dec!(0));
        let updated = ledger
            .update_product(
                10.into(),
                ProductUpdate {
                    price: Some(dec!(1200)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.price(), dec!(1200));
        assert_eq!(updated.name(), "Fridge");
        // Existing plans keep their agreed total
        assert_eq!(
            ledger.installment(plan.id()).unwrap().total_price(),
            dec!(1000)
        );
    }

    #[test]
    fn test_create_installment_computes_remaining() {
        let (_dir, ledger) = seeded();
        let plan = open_plan(&ledger, dec!(200));
        assert_eq!(plan.id(), InstallmentId::from(1));
        assert_eq!(plan.total_price(), dec!(1000));
        assert_eq!(plan.remaining_amount(), dec!(800));
        assert_eq!(plan.paid_amount() + plan.remaining_amount(), plan.total_price());
        assert_eq!(open_plan(&ledger, dec!(0)).id(), InstallmentId::from(2));
    }

    #[test]
    fn test_create_installment_with_explicit_total() {
        let (_dir, ledger) = seeded();
        let plan = ledger
            .create_installment(NewInstallment {
                customer_id: 1.into(),
                product_id: 10.into(),
                total_price: Some(dec!(900)),
                paid_amount: dec!(900),
            })
            .unwrap();
        assert_eq!(plan.remaining_amount(), dec!(0));
    }

    #[test]
    fn test_create_installment_rejects_bad_references() {
        let (_dir, ledger) = seeded();
        let result = ledger.create_installment(NewInstallment {
            customer_id: 99.into(),
            product_id: 10.into(),
            total_price: None,
            paid_amount: dec!(0),
        });
        assert!(matches!(result, Err(Error::CustomerNotFound(_))));
        let result = ledger.create_installment(NewInstallment {
            customer_id: 1.into(),
            product_id: 99.into(),
            total_price: None,
            paid_amount: dec!(0),
        });
        assert!(matches!(result, Err(Error::ProductNotFound(_))));
        assert!(ledger.installments().unwrap().is_empty());
    }

    #[test]
    fn test_create_installment_rejects_bad_amounts() {
        let (_dir, ledger) = seeded();
        let result = ledger.create_installment(NewInstallment {
            customer_id: 1.into(),
            product_id: 10.into(),
            total_price: None,
            paid_amount: dec!(1000.01),
        });
        assert!(matches!(result, Err(Error::PaidExceedsTotal { .. })));
        let result = ledger.create_installment(NewInstallment {
            customer_id: 1.into(),
            product_id: 10.into(),
            total_price: None,
            paid_amount: dec!(-1),
        });
        assert!(matches!(result, Err(Error::NegativeAmount { .. })));
        let result = ledger.create_installment(NewInstallment {
            customer_id: 1.into(),
            product_id: 10.into(),
            total_price: Some(dec!(-1)),
            paid_amount: dec!(0),
        });
        assert!(matches!(result, Err(Error::NegativeAmount { .. })));
    }

    #[test]
    fn test_payment_series() {
        let (_dir, ledger) = seeded();
        let plan = open_plan(&ledger, dec!(200));
        let plan = ledger.make_payment(plan.id(), dec!(300)).unwrap();
        assert_eq!(plan.paid_amount(), dec!(500));
        assert_eq!(plan.remaining_amount(), dec!(500));
        let result = ledger.make_payment(plan.id(), dec!(600));
        assert!(matches!(result, Err(Error::Overpayment { .. })));
        // Rejected payments leave the stored plan alone
        assert_eq!(ledger.installment(plan.id()).unwrap(), plan);
        let plan = ledger.make_payment(plan.id(), dec!(500)).unwrap();
        assert_eq!(plan.remaining_amount(), dec!(0));
        assert_eq!(plan.paid_amount(), plan.total_price());
    }

    #[test]
    fn test_payment_rejects_unknown_and_non_positive() {
        let (_dir, ledger) = seeded();
        let plan = open_plan(&ledger, dec!(0));
        assert!(matches!(
            ledger.make_payment(5.into(), dec!(1)),
            Err(Error::InstallmentNotFound(_))
        ));
        assert!(matches!(
            ledger.make_payment(plan.id(), dec!(-1)),
            Err(Error::NonPositiveAmount(_))
        ));
        assert!(matches!(
            ledger.make_payment(plan.id(), dec!(0)),
            Err(Error::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_delete_refused_while_referenced() {
        let (_dir, ledger) = seeded();
        open_plan(&ledger, dec!(0));
        assert!(matches!(
            ledger.delete_customer(1.into()),
            Err(Error::CustomerInUse(_))
        ));
        assert!(matches!(
            ledger.delete_product(10.into()),
            Err(Error::ProductInUse(_))
        ));
    }

    #[test]
    fn test_delete_unreferenced() {
        let (_dir, ledger) = seeded();
        ledger.delete_customer(1.into()).unwrap();
        ledger.delete_product(10.into()).unwrap();
        assert!(ledger.customers().unwrap().is_empty());
        assert!(ledger.products().unwrap().is_empty());
        assert!(matches!(
            ledger.delete_customer(1.into()),
            Err(Error::CustomerNotFound(_))
        ));
    }

    #[test]
    fn test_auto_id_after_largest_id() {
        let (_dir, ledger) = ledger();
        ledger
            .add_customer(NewCustomer {
                id: Some(u32::MAX.into()),
                name: "Ann".to_owned(),
                ..Default::default()
            })
            .unwrap();
        let result = ledger.add_customer(NewCustomer {
            name: "Bob".to_owned(),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::IdsExhausted("customer"))));
        assert_eq!(ledger.customers().unwrap().len(), 1);
    }

    #[test]
    fn test_payment_finer_than_cents_rejected() {
        let (_dir, ledger) = seeded();
        let plan = open_plan(&ledger, dec!(0));
        assert!(matches!(
            ledger.make_payment(plan.id(), dec!(100.004)),
            Err(Error::TooManyDecimals { .. })
        ));
        assert!(matches!(
            ledger.make_payment(plan.id(), dec!(0.004)),
            Err(Error::TooManyDecimals { .. })
        ));
        assert_eq!(ledger.installment(plan.id()).unwrap(), plan);
    }

    #[test]
    fn test_balance_overflow_is_an_error() {
        let (_dir, ledger) = seeded();
        ledger
            .update_product(
                10.into(),
                ProductUpdate {
                    price: Some(Decimal::MAX),
                    ..Default::default()
                },
            )
            .unwrap();
        open_plan(&ledger, dec!(0));
        open_plan(&ledger, dec!(0));
        assert!(matches!(
            ledger.customer_balance(1.into()),
            Err(Error::AmountOverflow(_))
        ));
    }

    #[test]
    fn test_customer_balance_and_plans() {
        let (_dir, ledger) = seeded();
        open_plan(&ledger, dec!(200));
        open_plan(&ledger, dec!(950.50));
        assert_eq!(ledger.customer_installments(1.into()).unwrap().len(), 2);
        assert_eq!(ledger.customer_balance(1.into()).unwrap(), dec!(849.50));
        assert!(matches!(
            ledger.customer_balance(3.into()),
            Err(Error::CustomerNotFound(_))
        ));
    }
}
