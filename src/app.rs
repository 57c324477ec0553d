use std::path::{Path, PathBuf};

use rand::Rng;
use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::QuoteError;
use crate::filter::CategoryFilter;
use crate::quote::{Quote, QuoteBook};
use crate::storage::{self, KeyValueStore};
use crate::sync::SyncEngine;
use crate::transfer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Quote,
    List,
    Add,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Text,
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    Import,
    Export,
}

/// Modal path input for import/export.
pub struct PathPrompt {
    pub purpose: PromptPurpose,
    pub input: String,
    pub cursor: usize,
}

/// Transient notification shown in the footer until its ticks run out.
pub struct StatusMessage {
    pub text: String,
    pub error: bool,
    ticks_left: u8,
}

// ~3.6s at the 300ms UI tick
const STATUS_TICKS: u8 = 12;

pub struct App {
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,

    // Components
    pub book: QuoteBook,
    pub store: Box<dyn KeyValueStore>,
    pub filter: CategoryFilter,
    pub sync: SyncEngine,

    // Quote view
    pub current_quote: Option<Quote>,

    // List view
    pub list_state: ListState,

    // Add form. Buffers are created once and survive screen switches, so
    // reopening the form never rebuilds or clears in-progress input.
    pub form_text: String,
    pub form_text_cursor: usize,
    pub form_category: String,
    pub form_category_cursor: usize,
    pub form_focus: FormField,

    // Category picker popup
    pub show_category_picker: bool,
    pub picker_state: ListState,

    // Import/export path prompt popup
    pub path_prompt: Option<PathPrompt>,

    // Status + animation
    pub status: Option<StatusMessage>,
    pub spinner_frame: u8,

    // In-flight post of the most recent add
    pub post_task: Option<JoinHandle<Result<Quote, QuoteError>>>,
}

impl App {
    pub fn new(
        book: QuoteBook,
        store: Box<dyn KeyValueStore>,
        filter: CategoryFilter,
        sync: SyncEngine,
    ) -> Self {
        let mut app = Self {
            should_quit: false,
            screen: Screen::Quote,
            input_mode: InputMode::Normal,

            book,
            store,
            filter,
            sync,

            current_quote: None,

            list_state: ListState::default(),

            form_text: String::new(),
            form_text_cursor: 0,
            form_category: String::new(),
            form_category_cursor: 0,
            form_focus: FormField::Text,

            show_category_picker: false,
            picker_state: ListState::default(),

            path_prompt: None,

            status: None,
            spinner_frame: 0,

            post_task: None,
        };

        app.show_random();
        app
    }

    /// The quotes the current filter lets through, in insertion order.
    pub fn visible_quotes(&self) -> Vec<&Quote> {
        self.book.by_category(self.filter.selected())
    }

    // --- quote view ---

    /// Pick a uniformly random quote from the filtered view. A no-op when
    /// the view is empty; the renderer shows a hint instead.
    pub fn show_random(&mut self) {
        let visible = self.book.by_category(self.filter.selected());
        if visible.is_empty() {
            self.current_quote = None;
            return;
        }

        let index = rand::thread_rng().gen_range(0..visible.len());
        self.current_quote = Some(visible[index].clone());
    }

    // --- add form ---

    pub fn open_add_form(&mut self) {
        self.screen = Screen::Add;
        self.input_mode = InputMode::Editing;
        // Form buffers intentionally untouched: the form is built once.
    }

    pub fn focused_form_buffer(&mut self) -> (&mut String, &mut usize) {
        match self.form_focus {
            FormField::Text => (&mut self.form_text, &mut self.form_text_cursor),
            FormField::Category => (&mut self.form_category, &mut self.form_category_cursor),
        }
    }

    pub fn submit_new_quote(&mut self) {
        match self.book.add(&self.form_text, &self.form_category) {
            Ok(()) => {
                self.persist_quotes();

                let added = self.book.all().last().cloned();
                self.form_text.clear();
                self.form_text_cursor = 0;
                self.form_category.clear();
                self.form_category_cursor = 0;
                self.form_focus = FormField::Text;

                if let Some(quote) = added {
                    self.current_quote = Some(quote.clone());
                    self.start_post(quote);
                }

                self.set_status("Quote added");
                self.screen = Screen::Quote;
                self.input_mode = InputMode::Normal;
            }
            Err(err) => {
                // Validation failure: nothing persisted, form left as-is.
                self.set_error(err.to_string());
            }
        }
    }

    fn start_post(&mut self, quote: Quote) {
        // One tracked post at a time; a further add while one is in flight
        // stays local until the next reconciliation.
        if self.post_task.is_some() {
            debug!("post slot busy, new quote stays local until next sync");
            return;
        }
        self.post_task = Some(self.sync.post(quote));
    }

    // --- filter ---

    pub fn open_category_picker(&mut self) {
        self.show_category_picker = true;
        let options = CategoryFilter::available_categories(&self.book);
        let current = options
            .iter()
            .position(|category| category == self.filter.selected())
            .unwrap_or(0);
        self.picker_state.select(Some(current));
    }

    pub fn picker_nav_down(&mut self) {
        let len = CategoryFilter::available_categories(&self.book).len();
        if len > 0 {
            let i = self.picker_state.selected().unwrap_or(0);
            self.picker_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn picker_nav_up(&mut self) {
        let i = self.picker_state.selected().unwrap_or(0);
        self.picker_state.select(Some(i.saturating_sub(1)));
    }

    pub fn pick_category(&mut self) {
        let options = CategoryFilter::available_categories(&self.book);
        if let Some(choice) = self.picker_state.selected().and_then(|i| options.get(i)) {
            let choice = choice.clone();
            if let Err(err) = self.filter.set(&choice, self.store.as_mut()) {
                warn!(error = %err, "could not persist category selection");
            }
            self.list_state.select(Some(0));
            self.show_random();
            self.set_status(format!("Filter: {}", choice));
        }
        self.show_category_picker = false;
    }

    // --- list navigation ---

    pub fn list_nav_down(&mut self) {
        let len = self.visible_quotes().len();
        if len > 0 {
            let i = self.list_state.selected().unwrap_or(0);
            self.list_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn list_nav_up(&mut self) {
        let i = self.list_state.selected().unwrap_or(0);
        self.list_state.select(Some(i.saturating_sub(1)));
    }

    // --- import/export ---

    pub fn open_path_prompt(&mut self, purpose: PromptPurpose) {
        let input = "quotes.json".to_string();
        let cursor = input.chars().count();
        self.path_prompt = Some(PathPrompt {
            purpose,
            input,
            cursor,
        });
    }

    pub fn confirm_path_prompt(&mut self) {
        let Some(prompt) = self.path_prompt.take() else {
            return;
        };

        let trimmed = prompt.input.trim();
        if trimmed.is_empty() {
            self.set_error("Enter a file path");
            self.path_prompt = Some(prompt);
            return;
        }

        let path = PathBuf::from(trimmed);
        match prompt.purpose {
            PromptPurpose::Export => self.run_export(&path),
            PromptPurpose::Import => self.run_import(&path),
        }
    }

    pub fn run_export(&mut self, path: &Path) {
        match transfer::export_quotes(&self.book, path) {
            Ok(()) => {
                info!(path = %path.display(), count = self.book.len(), "exported quotes");
                self.set_status(format!(
                    "Exported {} quotes to {}",
                    self.book.len(),
                    path.display()
                ));
            }
            Err(err) => {
                warn!(error = %err, path = %path.display(), "export failed");
                self.set_error(format!("Export failed: {}", err));
            }
        }
    }

    pub fn run_import(&mut self, path: &Path) {
        match transfer::import_file(&mut self.book, path) {
            Ok(count) => {
                self.persist_quotes();
                info!(path = %path.display(), count, "imported quotes");
                if self.current_quote.is_none() {
                    self.show_random();
                }
                self.set_status(format!("Imported {} quotes", count));
            }
            Err(err) => {
                warn!(error = %err, path = %path.display(), "import failed");
                self.set_error(format!("Import failed: {}", err));
            }
        }
    }

    // --- sync ---

    pub fn begin_sync(&mut self, manual: bool) {
        if self.sync.start() {
            if manual {
                self.set_status("Syncing with server...");
            }
        } else if manual {
            self.set_status("Sync already in progress");
        }
        // A dropped timer tick is silent.
    }

    /// Collect finished background work. Called on every UI tick.
    pub async fn collect_background_work(&mut self) {
        if let Some(result) = self.sync.poll(&mut self.book).await {
            match result {
                Ok(outcome) => {
                    if outcome.replaced {
                        self.persist_quotes();
                        // The shown quote may no longer exist.
                        self.show_random();
                        self.list_state.select(Some(0));
                    }
                    self.set_status(outcome.message());
                }
                Err(err) => self.set_error(format!("Sync failed: {}", err)),
            }
        }

        let post_finished = self
            .post_task
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(false);
        if post_finished {
            if let Some(task) = self.post_task.take() {
                match task.await {
                    Ok(Ok(echoed)) => {
                        info!(text = %echoed.text, "server acknowledged posted quote");
                    }
                    Ok(Err(err)) => {
                        // The local add stands; no rollback.
                        warn!(error = %err, "posting quote failed");
                        self.set_error(format!("Could not post quote: {}", err));
                    }
                    Err(err) => warn!(error = %err, "post task did not complete"),
                }
            }
        }
    }

    // --- status + ticks ---

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            error: false,
            ticks_left: STATUS_TICKS,
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            error: true,
            ticks_left: STATUS_TICKS,
        });
    }

    /// UI heartbeat: spinner frames and status expiry.
    pub fn tick(&mut self) {
        if self.sync.in_flight() {
            self.spinner_frame = (self.spinner_frame + 1) % 3;
        }

        let expired = match &mut self.status {
            Some(status) => {
                status.ticks_left = status.ticks_left.saturating_sub(1);
                status.ticks_left == 0
            }
            None => false,
        };
        if expired {
            self.status = None;
        }
    }

    fn persist_quotes(&mut self) {
        if let Err(err) = storage::save_quotes(self.store.as_mut(), self.book.all()) {
            warn!(error = %err, "could not persist quotes");
            self.set_error("Could not save quotes to disk");
        }
    }
}
