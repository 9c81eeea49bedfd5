//! Where the ledger keeps its files.

use std::path::{Path, PathBuf};

/// Ledger configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the three CSV stores
    pub data_dir: PathBuf,
}

impl Config {
    /// Creates a configuration rooted at `data_dir`
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of the customer store
    #[must_use]
    pub fn customers_path(&self) -> PathBuf {
        self.data_dir.join("customers.csv")
    }

    /// Path of the product store
    #[must_use]
    pub fn products_path(&self) -> PathBuf {
        self.data_dir.join("products.csv")
    }

    /// Path of the installment store
    #[must_use]
    pub fn installments_path(&self) -> PathBuf {
        self.data_dir.join("installments.csv")
    }

    /// Returns the data directory
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_live_under_data_dir() {
        let config = Config::new("/tmp/ledger");
        assert_eq!(config.customers_path(), Path::new("/tmp/ledger/customers.csv"));
        assert_eq!(config.products_path(), Path::new("/tmp/ledger/products.csv"));
        assert_eq!(
            config.installments_path(),
            Path::new("/tmp/ledger/installments.csv")
        );
    }

    #[test]
    fn test_default_data_dir() {
        assert_eq!(Config::default().data_dir(), Path::new("data"));
    }
}
