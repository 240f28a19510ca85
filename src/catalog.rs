//! Read-only book catalog served by the book helper.
//!
//! The catalog is a JSON array of [`BookData`] records loaded once at startup.
//! There is no write path; a catalog that cannot be read or parsed is a fatal
//! error for the helper.
use std::{fs, io, path::Path};

use log::{info, warn};
use thiserror::Error;

use crate::protocol::BookData;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog '{path}': {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to parse catalog '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    books: Vec<BookData>,
}

impl Catalog {
    pub fn new(books: Vec<BookData>) -> Self {
        Self { books }
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: display.clone(),
            source,
        })?;
        let books: Vec<BookData> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: display.clone(),
                source,
            })?;

        let catalog = Self::new(books);
        if catalog.is_empty() {
            warn!("catalog {display} has no books; every inquiry will be NotFound");
        } else {
            info!("loaded {} books from {display}", catalog.len());
        }
        Ok(catalog)
    }

    /// First record whose title matches exactly (case-sensitive).
    pub fn find(&self, title: &str) -> Option<&BookData> {
        self.books.iter().find(|book| book.title == title)
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
