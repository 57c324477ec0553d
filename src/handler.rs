use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, FormField, InputMode, PromptPurpose, Screen};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

fn insert_char(buffer: &mut String, cursor: &mut usize, c: char) {
    let byte_idx = char_to_byte_index(buffer, *cursor);
    buffer.insert(byte_idx, c);
    *cursor += 1;
}

fn delete_char_before(buffer: &mut String, cursor: &mut usize) {
    if *cursor > 0 {
        let byte_idx = char_to_byte_index(buffer, *cursor - 1);
        buffer.remove(byte_idx);
        *cursor -= 1;
    }
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick();
            app.collect_background_work().await;
        }
        AppEvent::SyncTick => app.begin_sync(false),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global quit that works in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // Popups take precedence over the active screen
    if app.show_category_picker {
        handle_category_picker(app, key);
        return;
    }
    if app.path_prompt.is_some() {
        handle_path_prompt(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Quote => handle_quote_normal(app, key),
        Screen::List => handle_list_normal(app, key),
        // The add form is always in editing mode; recover if we ever land
        // here with it on screen.
        Screen::Add => app.input_mode = InputMode::Editing,
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match app.screen {
        Screen::Add => handle_add_editing(app, key),
        _ => app.input_mode = InputMode::Normal,
    }
}

fn handle_quote_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // New random quote
        KeyCode::Char('n') | KeyCode::Char(' ') => app.show_random(),

        // Screens and popups
        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('l') => {
            if app.list_state.selected().is_none() && !app.visible_quotes().is_empty() {
                app.list_state.select(Some(0));
            }
            app.screen = Screen::List;
        }
        KeyCode::Char('f') => app.open_category_picker(),

        // Sync and transfer
        KeyCode::Char('s') => app.begin_sync(true),
        KeyCode::Char('e') => app.open_path_prompt(PromptPurpose::Export),
        KeyCode::Char('i') => app.open_path_prompt(PromptPurpose::Import),

        _ => {}
    }
}

fn handle_list_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.list_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.list_nav_up(),
        KeyCode::Char('g') => app.list_state.select(Some(0)),
        KeyCode::Char('G') => {
            let len = app.visible_quotes().len();
            if len > 0 {
                app.list_state.select(Some(len - 1));
            }
        }

        // Show the selected quote on the quote screen
        KeyCode::Enter => {
            let selected = app
                .list_state
                .selected()
                .and_then(|i| app.visible_quotes().get(i).map(|quote| (*quote).clone()));
            if let Some(quote) = selected {
                app.current_quote = Some(quote);
                app.screen = Screen::Quote;
            }
        }

        // Back to the quote screen
        KeyCode::Esc | KeyCode::Char('h') => app.screen = Screen::Quote,

        KeyCode::Char('a') => app.open_add_form(),
        KeyCode::Char('f') => app.open_category_picker(),
        KeyCode::Char('s') => app.begin_sync(true),
        KeyCode::Char('e') => app.open_path_prompt(PromptPurpose::Export),
        KeyCode::Char('i') => app.open_path_prompt(PromptPurpose::Import),

        _ => {}
    }
}

fn handle_add_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        // Leave the form; in-progress input is kept for next time
        KeyCode::Esc => {
            app.screen = Screen::Quote;
            app.input_mode = InputMode::Normal;
        }

        KeyCode::Tab => {
            app.form_focus = match app.form_focus {
                FormField::Text => FormField::Category,
                FormField::Category => FormField::Text,
            };
        }

        KeyCode::Enter => app.submit_new_quote(),

        KeyCode::Backspace => {
            let (buffer, cursor) = app.focused_form_buffer();
            delete_char_before(buffer, cursor);
        }
        KeyCode::Left => {
            let (_, cursor) = app.focused_form_buffer();
            *cursor = cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let (buffer, cursor) = app.focused_form_buffer();
            *cursor = (*cursor + 1).min(buffer.chars().count());
        }
        KeyCode::Home => {
            let (_, cursor) = app.focused_form_buffer();
            *cursor = 0;
        }
        KeyCode::End => {
            let (buffer, cursor) = app.focused_form_buffer();
            *cursor = buffer.chars().count();
        }

        KeyCode::Char(c) => {
            let (buffer, cursor) = app.focused_form_buffer();
            insert_char(buffer, cursor, c);
        }

        _ => {}
    }
}

fn handle_category_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.picker_nav_up(),
        KeyCode::Enter => app.pick_category(),
        KeyCode::Esc | KeyCode::Char('f') => app.show_category_picker = false,
        _ => {}
    }
}

fn handle_path_prompt(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.path_prompt = None,
        KeyCode::Enter => app.confirm_path_prompt(),

        KeyCode::Backspace => {
            if let Some(prompt) = &mut app.path_prompt {
                delete_char_before(&mut prompt.input, &mut prompt.cursor);
            }
        }
        KeyCode::Left => {
            if let Some(prompt) = &mut app.path_prompt {
                prompt.cursor = prompt.cursor.saturating_sub(1);
            }
        }
        KeyCode::Right => {
            if let Some(prompt) = &mut app.path_prompt {
                prompt.cursor = (prompt.cursor + 1).min(prompt.input.chars().count());
            }
        }
        KeyCode::Char(c) => {
            if let Some(prompt) = &mut app.path_prompt {
                insert_char(&mut prompt.input, &mut prompt.cursor, c);
            }
        }

        _ => {}
    }
}
