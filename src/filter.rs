use anyhow::Result;

use crate::quote::{QuoteBook, ALL_CATEGORIES};
use crate::storage::{self, KeyValueStore};

/// The user's current category selection, persisted across sessions.
pub struct CategoryFilter {
    selected: String,
}

impl CategoryFilter {
    pub fn new() -> Self {
        Self {
            selected: ALL_CATEGORIES.to_string(),
        }
    }

    /// Restore the persisted selection, falling back to `"all"` when it is
    /// absent or names a category no longer present in the book.
    pub fn restore(store: &dyn KeyValueStore, book: &QuoteBook) -> Self {
        let selected = storage::load_filter(store)
            .ok()
            .flatten()
            .filter(|category| {
                category == ALL_CATEGORIES
                    || book.categories().iter().any(|known| known == category)
            })
            .unwrap_or_else(|| ALL_CATEGORIES.to_string());

        Self { selected }
    }

    pub fn selected(&self) -> &str {
        &self.selected
    }

    pub fn is_all(&self) -> bool {
        self.selected == ALL_CATEGORIES
    }

    /// Store and persist a new selection.
    pub fn set(&mut self, category: &str, store: &mut dyn KeyValueStore) -> Result<()> {
        self.selected = category.to_string();
        storage::save_filter(store, category)
    }

    /// The `"all"` sentinel followed by every category in the book, in
    /// first-occurrence order. Populates the filter picker.
    pub fn available_categories(book: &QuoteBook) -> Vec<String> {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        categories.extend(book.categories());
        categories
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_restore_defaults_to_all_when_absent() {
        let store = MemoryStore::new();
        let book = QuoteBook::seeded();

        let filter = CategoryFilter::restore(&store, &book);

        assert_eq!(filter.selected(), ALL_CATEGORIES);
        assert!(filter.is_all());
    }

    #[test]
    fn test_restore_recovers_persisted_selection() {
        let mut store = MemoryStore::new();
        let book = QuoteBook::seeded();
        storage::save_filter(&mut store, "Success").unwrap();

        let filter = CategoryFilter::restore(&store, &book);

        assert_eq!(filter.selected(), "Success");
    }

    #[test]
    fn test_restore_falls_back_for_stale_selection() {
        let mut store = MemoryStore::new();
        let book = QuoteBook::seeded();
        storage::save_filter(&mut store, "Retired").unwrap();

        let filter = CategoryFilter::restore(&store, &book);

        assert_eq!(filter.selected(), ALL_CATEGORIES);
    }

    #[test]
    fn test_set_persists_selection() {
        let mut store = MemoryStore::new();
        let mut filter = CategoryFilter::new();

        filter.set("Happiness", &mut store).unwrap();

        assert_eq!(filter.selected(), "Happiness");
        assert_eq!(
            storage::load_filter(&store).unwrap(),
            Some("Happiness".to_string())
        );
    }

    #[test]
    fn test_available_categories_leads_with_sentinel() {
        let book = QuoteBook::seeded();

        assert_eq!(
            CategoryFilter::available_categories(&book),
            vec!["all", "Motivation", "Success", "Happiness"]
        );
    }
}
