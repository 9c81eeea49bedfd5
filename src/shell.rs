//! Menu-driven front end over a [`Ledger`]
//!
//! The shell reads one answer per line and writes plain text, so it can be
//! driven by a terminal or by a scripted buffer. Every operation reports its
//! outcome as a single `✓`/`✗` line and returns to the menu it came from;
//! ledger errors never end the session. End of input ends the session.

use std::io::{self, BufRead, Write};

use log::warn;

use crate::{
    errors::{Error, Result},
    ops::Ledger,
    types::{
        Customer, CustomerId, CustomerUpdate, Installment, InstallmentId, NewCustomer,
        NewInstallment, NewProduct, Product, ProductId, ProductUpdate,
    },
    validate::{parse_amount, parse_id, parse_optional_amount, parse_optional_id},
};

const RULE_WIDTH: usize = 60;

/// Interactive menu loop reading from `R` and writing to `W`
#[derive(Debug)]
pub struct Shell<R, W> {
    ledger: Ledger,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    /// Creates a shell over an opened ledger
    pub fn new(ledger: Ledger, input: R, output: W) -> Self {
        Self {
            ledger,
            input,
            output,
        }
    }

    /// Runs the start menu until the operator exits or input runs out.
    ///
    /// # Errors
    /// Only failures to read from or write to the terminal are returned
    pub fn run(&mut self) -> io::Result<()> {
        match self.start_menu() {
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => self.farewell(),
            other => other,
        }
    }

    /// Returns the writer, e.g. to inspect scripted output
    pub fn into_output(self) -> W {
        self.output
    }

    fn start_menu(&mut self) -> io::Result<()> {
        loop {
            self.banner("INSTALLMENT MANAGEMENT SYSTEM")?;
            self.options(&["Admin Panel (Full Control)", "Customer Panel (View Only)", "Exit"])?;
            match self.prompt("Enter choice (1-3): ")?.as_str() {
                "1" => self.admin_panel()?,
                "2" => self.customer_panel()?,
                "3" => return self.farewell(),
                _ => self.invalid_choice()?,
            }
        }
    }

    fn admin_panel(&mut self) -> io::Result<()> {
        loop {
            self.banner("ADMIN PANEL")?;
            self.options(&[
                "Customer Management",
                "Product Management",
                "Installment Management",
                "Back to Start",
            ])?;
            match self.prompt("Enter choice (1-4): ")?.as_str() {
                "1" => self.customer_menu()?,
                "2" => self.product_menu()?,
                "3" => self.installment_menu()?,
                "4" => return Ok(()),
                _ => self.invalid_choice()?,
            }
        }
    }

    fn customer_panel(&mut self) -> io::Result<()> {
        loop {
            self.banner("CUSTOMER PANEL (View Only)")?;
            self.options(&[
                "View All Customers",
                "View All Products",
                "View All Installments",
                "Back to Start",
            ])?;
            match self.prompt("Enter choice (1-4): ")?.as_str() {
                "1" => self.view_customers()?,
                "2" => self.view_products()?,
                "3" => self.view_installments()?,
                "4" => return Ok(()),
                _ => self.invalid_choice()?,
            }
        }
    }

    fn customer_menu(&mut self) -> io::Result<()> {
        loop {
            self.banner("CUSTOMER MANAGEMENT")?;
            self.options(&[
                "Add Customer",
                "View All Customers",
                "Search Customer",
                "Update Customer",
                "Delete Customer",
                "Back to Main Menu",
            ])?;
            match self.prompt("Enter choice (1-6): ")?.as_str() {
                "1" => self.add_customer()?,
                "2" => self.view_customers()?,
                "3" => self.search_customer()?,
                "4" => self.update_customer()?,
                "5" => self.delete_customer()?,
                "6" => return Ok(()),
                _ => self.invalid_choice()?,
            }
        }
    }

    fn product_menu(&mut self) -> io::Result<()> {
        loop {
            self.banner("PRODUCT MANAGEMENT")?;
            self.options(&[
                "Add Product",
                "View All Products",
                "Search Product",
                "Update Product",
                "Delete Product",
                "Back to Main Menu",
            ])?;
            match self.prompt("Enter choice (1-6): ")?.as_str() {
                "1" => self.add_product()?,
                "2" => self.view_products()?,
                "3" => self.search_product()?,
                "4" => self.update_product()?,
                "5" => self.delete_product()?,
                "6" => return Ok(()),
                _ => self.invalid_choice()?,
            }
        }
    }

    fn installment_menu(&mut self) -> io::Result<()> {
        loop {
            self.banner("INSTALLMENT MANAGEMENT")?;
            self.options(&[
                "Create Installment",
                "View All Installments",
                "Search Installment",
                "Make Payment",
                "Customer Total Balance",
                "Customer Installments",
                "Back to Main Menu",
            ])?;
            match self.prompt("Enter choice (1-7): ")?.as_str() {
                "1" => self.create_installment()?,
                "2" => self.view_installments()?,
                "3" => self.search_installment()?,
                "4" => self.make_payment()?,
                "5" => self.customer_balance()?,
                "6" => self.customer_installments()?,
                "7" => return Ok(()),
                _ => self.invalid_choice()?,
            }
        }
    }

    fn add_customer(&mut self) -> io::Result<()> {
        self.heading("Add Customer")?;
        let id = self.prompt("Enter customer ID (blank for next free): ")?;
        let name = self.prompt("Enter name: ")?;
        let phone = self.prompt("Enter phone: ")?;
        let address = self.prompt("Enter address: ")?;
        let outcome = parse_optional_id("Customer ID", &id).and_then(|id| {
            self.ledger.add_customer(NewCustomer {
                id,
                name,
                phone,
                address,
            })
        });
        self.report(outcome.map(|customer| {
            format!("Customer {} added with ID {}", customer.name(), customer.id())
        }))
    }

    fn view_customers(&mut self) -> io::Result<()> {
        self.heading("All Customers")?;
        match self.ledger.customers() {
            Ok(customers) if customers.is_empty() => writeln!(self.output, "No customers found."),
            Ok(customers) => self.customer_table(&customers),
            Err(err) => self.fail(err),
        }
    }

    fn search_customer(&mut self) -> io::Result<()> {
        self.heading("Search Customer")?;
        let id = self.prompt("Enter customer ID: ")?;
        let outcome = parse_id::<CustomerId>("Customer ID", &id)
            .and_then(|id| self.ledger.customer(id));
        match outcome {
            Ok(customer) => {
                writeln!(self.output, "\nID: {}", customer.id())?;
                writeln!(self.output, "Name: {}", customer.name())?;
                writeln!(self.output, "Phone: {}", customer.phone())?;
                writeln!(self.output, "Address: {}", customer.address())
            }
            Err(err) => self.fail(err),
        }
    }

    fn update_customer(&mut self) -> io::Result<()> {
        self.heading("Update Customer")?;
        let id = self.prompt("Enter customer ID: ")?;
        let update = CustomerUpdate {
            name: blank_as_none(self.prompt("Enter new name (blank to skip): ")?),
            phone: blank_as_none(self.prompt("Enter new phone (blank to skip): ")?),
            address: blank_as_none(self.prompt("Enter new address (blank to skip): ")?),
        };
        let outcome = parse_id::<CustomerId>("Customer ID", &id)
            .and_then(|id| self.ledger.update_customer(id, update));
        self.report(outcome.map(|customer| format!("Customer {} updated", customer.id())))
    }

    fn delete_customer(&mut self) -> io::Result<()> {
        self.heading("Delete Customer")?;
        let id = self.prompt("Enter customer ID: ")?;
        if !self.confirm()? {
            return writeln!(self.output, "✗ Cancelled");
        }
        let outcome = parse_id::<CustomerId>("Customer ID", &id)
            .and_then(|id| self.ledger.delete_customer(id));
        self.report(outcome.map(|customer| format!("Customer {} deleted", customer.id())))
    }

    fn add_product(&mut self) -> io::Result<()> {
        self.heading("Add Product")?;
        let id = self.prompt("Enter product ID (blank for next free): ")?;
        let name = self.prompt("Enter product name: ")?;
        let price = self.prompt("Enter price: ")?;
        let outcome = parse_optional_id("Product ID", &id).and_then(|id| {
            let price = parse_amount("Price", &price)?;
            self.ledger.add_product(NewProduct { id, name, price })
        });
        self.report(outcome.map(|product| {
            format!("Product {} added with ID {}", product.name(), product.id())
        }))
    }

    fn view_products(&mut self) -> io::Result<()> {
        self.heading("All Products")?;
        match self.ledger.products() {
            Ok(products) if products.is_empty() => writeln!(self.output, "No products found."),
            Ok(products) => self.product_table(&products),
            Err(err) => self.fail(err),
        }
    }

    fn search_product(&mut self) -> io::Result<()> {
        self.heading("Search Product")?;
        let id = self.prompt("Enter product ID: ")?;
        let outcome =
            parse_id::<ProductId>("Product ID", &id).and_then(|id| self.ledger.product(id));
        match outcome {
            Ok(product) => {
                writeln!(self.output, "\nID: {}", product.id())?;
                writeln!(self.output, "Name: {}", product.name())?;
                writeln!(self.output, "Price: {}", product.price())
            }
            Err(err) => self.fail(err),
        }
    }

    fn update_product(&mut self) -> io::Result<()> {
        self.heading("Update Product")?;
        let id = self.prompt("Enter product ID: ")?;
        let name = blank_as_none(self.prompt("Enter new name (blank to skip): ")?);
        let price = self.prompt("Enter new price (blank to skip): ")?;
        let outcome = parse_id::<ProductId>("Product ID", &id).and_then(|id| {
            let price = parse_optional_amount("Price", &price)?;
            self.ledger.update_product(id, ProductUpdate { name, price })
        });
        self.report(outcome.map(|product| format!("Product {} updated", product.id())))
    }

    fn delete_product(&mut self) -> io::Result<()> {
        self.heading("Delete Product")?;
        let id = self.prompt("Enter product ID: ")?;
        if !self.confirm()? {
            return writeln!(self.output, "✗ Cancelled");
        }
        let outcome =
            parse_id::<ProductId>("Product ID", &id).and_then(|id| self.ledger.delete_product(id));
        self.report(outcome.map(|product| format!("Product {} deleted", product.id())))
    }

    fn create_installment(&mut self) -> io::Result<()> {
        self.heading("Create Installment")?;
        let customer_id = self.prompt("Enter customer ID: ")?;
        let product_id = self.prompt("Enter product ID: ")?;
        let total = self.prompt("Enter total price (blank for product price): ")?;
        let paid = self.prompt("Enter paid amount: ")?;
        let outcome = parse_new_installment(&customer_id, &product_id, &total, &paid)
            .and_then(|new| self.ledger.create_installment(new));
        self.report(outcome.map(|plan| {
            format!(
                "Installment {} created. Remaining amount: {}",
                plan.id(),
                plan.remaining_amount()
            )
        }))
    }

    fn view_installments(&mut self) -> io::Result<()> {
        self.heading("All Installments")?;
        match self.ledger.installments() {
            Ok(plans) if plans.is_empty() => writeln!(self.output, "No installments found."),
            Ok(plans) => self.installment_table(&plans),
            Err(err) => self.fail(err),
        }
    }

    fn search_installment(&mut self) -> io::Result<()> {
        self.heading("Search Installment")?;
        let id = self.prompt("Enter installment ID: ")?;
        let outcome = parse_id::<InstallmentId>("Installment ID", &id)
            .and_then(|id| self.ledger.installment(id));
        match outcome {
            Ok(plan) => {
                writeln!(self.output, "\nInstallment ID: {}", plan.id())?;
                writeln!(self.output, "Customer ID: {}", plan.customer_id())?;
                writeln!(self.output, "Product ID: {}", plan.product_id())?;
                writeln!(self.output, "Total Price: {}", plan.total_price())?;
                writeln!(self.output, "Paid Amount: {}", plan.paid_amount())?;
                writeln!(self.output, "Remaining: {}", plan.remaining_amount())?;
                writeln!(self.output, "Status: {}", plan.status())
            }
            Err(err) => self.fail(err),
        }
    }

    fn make_payment(&mut self) -> io::Result<()> {
        self.heading("Make Payment")?;
        let id = self.prompt("Enter installment ID: ")?;
        let amount = self.prompt("Enter payment amount: ")?;
        let outcome = parse_id::<InstallmentId>("Installment ID", &id).and_then(|id| {
            let amount = parse_amount("Payment amount", &amount)?;
            self.ledger.make_payment(id, amount)
        });
        self.report(outcome.map(|plan| {
            format!(
                "Payment recorded. Paid: {}, Remaining: {}",
                plan.paid_amount(),
                plan.remaining_amount()
            )
        }))
    }

    fn customer_balance(&mut self) -> io::Result<()> {
        self.heading("Customer Total Balance")?;
        let id = self.prompt("Enter customer ID: ")?;
        let outcome = parse_id::<CustomerId>("Customer ID", &id)
            .and_then(|id| self.ledger.customer_balance(id));
        self.report(outcome.map(|balance| format!("Total Balance: {balance}")))
    }

    fn customer_installments(&mut self) -> io::Result<()> {
        self.heading("Customer Installments")?;
        let id = self.prompt("Enter customer ID: ")?;
        let outcome = parse_id::<CustomerId>("Customer ID", &id)
            .and_then(|id| self.ledger.customer_installments(id));
        match outcome {
            Ok(plans) if plans.is_empty() => writeln!(self.output, "✗ No installments found"),
            Ok(plans) => self.installment_table(&plans),
            Err(err) => self.fail(err),
        }
    }

    fn customer_table(&mut self, customers: &[Customer]) -> io::Result<()> {
        writeln!(
            self.output,
            "{:<12} | {:<20} | {:<15} | {:<20}",
            "ID", "Name", "Phone", "Address"
        )?;
        writeln!(self.output, "{}", "-".repeat(75))?;
        for customer in customers {
            writeln!(
                self.output,
                "{:<12} | {:<20} | {:<15} | {:<20}",
                customer.id().to_string(),
                customer.name(),
                customer.phone(),
                customer.address()
            )?;
        }
        Ok(())
    }

    fn product_table(&mut self, products: &[Product]) -> io::Result<()> {
        writeln!(self.output, "{:<12} | {:<25} | {:>12}", "ID", "Name", "Price")?;
        writeln!(self.output, "{}", "-".repeat(55))?;
        for product in products {
            writeln!(
                self.output,
                "{:<12} | {:<25} | {:>12}",
                product.id().to_string(),
                product.name(),
                product.price().to_string()
            )?;
        }
        Ok(())
    }

    fn installment_table(&mut self, plans: &[Installment]) -> io::Result<()> {
        writeln!(
            self.output,
            "{:<5} {:<9} {:<8} {:<12} {:<12} {:<12} {:<10}",
            "ID", "Customer", "Product", "Total", "Paid", "Remaining", "Status"
        )?;
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH + 12))?;
        for plan in plans {
            writeln!(
                self.output,
                "{:<5} {:<9} {:<8} {:<12} {:<12} {:<12} {:<10}",
                plan.id().to_string(),
                plan.customer_id().to_string(),
                plan.product_id().to_string(),
                plan.total_price().to_string(),
                plan.paid_amount().to_string(),
                plan.remaining_amount().to_string(),
                plan.status().to_string()
            )?;
        }
        Ok(())
    }

    /// Prints `✓ message` or `✗ error` for one finished operation
    fn report(&mut self, outcome: Result<String>) -> io::Result<()> {
        match outcome {
            Ok(message) => writeln!(self.output, "✓ {message}"),
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: Error) -> io::Result<()> {
        warn!("Operation rejected: {err}");
        writeln!(self.output, "✗ {err}")
    }

    fn confirm(&mut self) -> io::Result<bool> {
        Ok(self.prompt("Confirm (yes/no): ")?.eq_ignore_ascii_case("yes"))
    }

    /// Writes `label` and reads one trimmed line of input
    fn prompt(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"));
        }
        Ok(line.trim().to_owned())
    }

    fn banner(&mut self, title: &str) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(self.output, "\n{rule}\n      {title}\n{rule}")
    }

    fn options(&mut self, labels: &[&str]) -> io::Result<()> {
        for (number, label) in labels.iter().enumerate() {
            writeln!(self.output, "{}. {label}", number + 1)?;
        }
        writeln!(self.output, "{}", "-".repeat(RULE_WIDTH))
    }

    fn heading(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.output, "\n--- {title} ---")
    }

    fn invalid_choice(&mut self) -> io::Result<()> {
        writeln!(self.output, "✗ Invalid choice")
    }

    fn farewell(&mut self) -> io::Result<()> {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(
            self.output,
            "\n{rule}\nThank you for using Installment Management System!\n{rule}"
        )
    }
}

fn parse_new_installment(
    customer_id: &str,
    product_id: &str,
    total: &str,
    paid: &str,
) -> Result<NewInstallment> {
    Ok(NewInstallment {
        customer_id: parse_id("Customer ID", customer_id)?,
        product_id: parse_id("Product ID", product_id)?,
        total_price: parse_optional_amount("Total price", total)?,
        paid_amount: parse_amount("Paid amount", paid)?,
    })
}

fn blank_as_none(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
