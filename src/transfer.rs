use std::fs;
use std::path::Path;

use anyhow::Result;
use serde_json::Value;

use crate::error::QuoteError;
use crate::quote::{Quote, QuoteBook};

/// Serialize the full book to an indented JSON document at `path`.
pub fn export_quotes(book: &QuoteBook, path: &Path) -> Result<()> {
    let document = serde_json::to_string_pretty(book.all())?;
    fs::write(path, document)?;
    Ok(())
}

/// Parse `document` as a JSON array of quotes and append every record to
/// the book. Returns the number of quotes appended; the book is untouched
/// on any failure. Individual fields are not validated on this path.
pub fn import_document(book: &mut QuoteBook, document: &str) -> Result<usize, QuoteError> {
    let value: Value = serde_json::from_str(document)?;
    if !value.is_array() {
        return Err(QuoteError::Format);
    }

    let quotes: Vec<Quote> = serde_json::from_value(value)?;
    let count = quotes.len();
    book.append_all(quotes);
    Ok(count)
}

/// Read and import the document at `path`.
pub fn import_file(book: &mut QuoteBook, path: &Path) -> Result<usize> {
    let document = fs::read_to_string(path)?;
    Ok(import_document(book, &document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_export_then_import_appends_originals() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("quotes.json");

        let book = QuoteBook::seeded();
        export_quotes(&book, &path).unwrap();

        // Importing the export back appends, never replaces.
        let mut book = book;
        let count = import_file(&mut book, &path).unwrap();

        assert_eq!(count, 3);
        assert_eq!(book.len(), 6);
        assert_eq!(&book.all()[..3], &book.all()[3..]);
    }

    #[test]
    fn test_import_appends_to_existing_collection() {
        let mut book = QuoteBook::seeded();
        let document = r#"[{"text":"New","category":"X"}]"#;

        let count = import_document(&mut book, document).unwrap();

        assert_eq!(count, 1);
        assert_eq!(book.len(), 4);
        assert_eq!(book.all()[3], Quote::new("New", "X"));
        assert_eq!(book.all()[0].category, "Motivation");
    }

    #[test]
    fn test_import_rejects_non_array_document() {
        let mut book = QuoteBook::seeded();
        let document = r#"{"text":"Not a list","category":"X"}"#;

        let err = import_document(&mut book, document).unwrap_err();

        assert!(matches!(err, QuoteError::Format));
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_import_rejects_malformed_document() {
        let mut book = QuoteBook::seeded();

        let err = import_document(&mut book, "not json at all").unwrap_err();

        assert!(matches!(err, QuoteError::Parse(_)));
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_import_rejects_misshapen_elements() {
        let mut book = QuoteBook::seeded();
        let document = r#"[{"quote":"wrong field names"}]"#;

        let err = import_document(&mut book, document).unwrap_err();

        assert!(matches!(err, QuoteError::Parse(_)));
        assert_eq!(book.len(), 3);
    }
}
