#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
/// Location of the data files
pub mod config;
/// Error handling and the crate [`Error`](errors::Error) type
pub mod errors;
/// Reading, rewriting and bootstrapping the CSV stores
pub mod io;
/// Bookkeeping operations on customers, products and installments
pub mod ops;
/// Interactive menu front end
pub mod shell;
/// Data types used throughout the ledger
pub mod types;
/// Parsing and validation of operator input
pub mod validate;

pub use config::Config;
pub use errors::{Error, Result};
pub use ops::Ledger;
pub use shell::Shell;
