use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::QuoteError;

/// Sentinel category meaning "no filter applied".
pub const ALL_CATEGORIES: &str = "all";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Quote {
    pub text: String,
    pub category: String,
}

impl Quote {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

/// The in-memory quote collection, the session's source of truth.
///
/// Insertion order is significant: it drives random selection and list
/// rendering. Every quote has non-empty text and category once it passes
/// validation in [`QuoteBook::add`]; bulk paths (`replace_all`,
/// `append_all`) take their input as already shaped.
pub struct QuoteBook {
    quotes: Vec<Quote>,
}

impl QuoteBook {
    pub fn new() -> Self {
        Self { quotes: Vec::new() }
    }

    pub fn with_quotes(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    /// Starter collection used the first time the app runs.
    pub fn seeded() -> Self {
        Self::with_quotes(vec![
            Quote::new(
                "The best way to predict the future is to create it.",
                "Motivation",
            ),
            Quote::new(
                "Success is not final, failure is not fatal: it is the courage to continue that counts.",
                "Success",
            ),
            Quote::new("Happiness depends upon ourselves.", "Happiness"),
        ])
    }

    /// Validate and append a new quote.
    ///
    /// Both fields are trimmed; an empty result fails without touching the
    /// collection, and the caller must not persist or re-render on failure.
    pub fn add(&mut self, text: &str, category: &str) -> Result<(), QuoteError> {
        let text = text.trim();
        let category = category.trim();

        if text.is_empty() {
            return Err(QuoteError::EmptyText);
        }
        if category.is_empty() {
            return Err(QuoteError::EmptyCategory);
        }

        self.quotes.push(Quote::new(text, category));
        Ok(())
    }

    /// Append a batch of records as-is. Used by the import path, which
    /// checks document shape but not individual fields.
    pub fn append_all(&mut self, quotes: Vec<Quote>) {
        self.quotes.extend(quotes);
    }

    /// Discard the current contents and replace them with `quotes`.
    /// Only the sync engine's overwrite policy calls this.
    pub fn replace_all(&mut self, quotes: Vec<Quote>) {
        self.quotes = quotes;
    }

    pub fn all(&self) -> &[Quote] {
        &self.quotes
    }

    /// Quotes in the given category, in insertion order.
    /// The `"all"` sentinel returns the full collection unfiltered.
    pub fn by_category(&self, category: &str) -> Vec<&Quote> {
        if category == ALL_CATEGORIES {
            return self.quotes.iter().collect();
        }
        self.quotes
            .iter()
            .filter(|q| q.category == category)
            .collect()
    }

    /// Distinct categories in order of first occurrence.
    pub fn categories(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut categories = Vec::new();

        for quote in &self.quotes {
            if seen.insert(quote.category.clone()) {
                categories.push(quote.category.clone());
            }
        }

        categories
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

impl Default for QuoteBook {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_appends_valid_quote() {
        let mut book = QuoteBook::seeded();
        assert_eq!(book.len(), 3);

        book.add("Carpe diem", "Motivation").unwrap();

        assert_eq!(book.len(), 4);
        let added = &book.all()[3];
        assert_eq!(added.text, "Carpe diem");
        assert_eq!(added.category, "Motivation");
    }

    #[test]
    fn test_add_trims_whitespace() {
        let mut book = QuoteBook::new();
        book.add("  spaced out  ", "  Calm ").unwrap();

        assert_eq!(book.all()[0].text, "spaced out");
        assert_eq!(book.all()[0].category, "Calm");
    }

    #[test]
    fn test_add_rejects_empty_text() {
        let mut book = QuoteBook::seeded();
        let err = book.add("   ", "Motivation").unwrap_err();

        assert!(matches!(err, QuoteError::EmptyText));
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_add_rejects_empty_category() {
        let mut book = QuoteBook::seeded();
        let err = book.add("A fine quote", "").unwrap_err();

        assert!(matches!(err, QuoteError::EmptyCategory));
        assert_eq!(book.len(), 3);
    }

    #[test]
    fn test_by_category_all_equals_full_collection() {
        let book = QuoteBook::seeded();
        let all: Vec<&Quote> = book.all().iter().collect();
        assert_eq!(book.by_category(ALL_CATEGORIES), all);
    }

    #[test]
    fn test_by_category_filters_in_order() {
        let mut book = QuoteBook::seeded();
        book.add("Carpe diem", "Motivation").unwrap();

        let motivation = book.by_category("Motivation");
        assert_eq!(motivation.len(), 2);
        assert_eq!(
            motivation[0].text,
            "The best way to predict the future is to create it."
        );
        assert_eq!(motivation[1].text, "Carpe diem");
    }

    #[test]
    fn test_categories_deduped_in_first_occurrence_order() {
        let mut book = QuoteBook::seeded();
        book.add("Carpe diem", "Motivation").unwrap();

        assert_eq!(book.categories(), vec!["Motivation", "Success", "Happiness"]);
    }

    #[test]
    fn test_replace_all_discards_previous_contents() {
        let mut book = QuoteBook::seeded();
        let replacement = vec![Quote::new("Only one left", "Solitude")];

        book.replace_all(replacement.clone());

        assert_eq!(book.len(), 1);
        assert_eq!(book.all(), replacement.as_slice());
    }
}
