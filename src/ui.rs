use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use crate::app::{App, FormField, PromptPurpose, Screen};
use crate::filter::CategoryFilter;
use crate::quote::ALL_CATEGORIES;
use crate::sync::SyncPhase;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Quote => render_quote_screen(app, frame, body_area),
        Screen::List => render_list_screen(app, frame, body_area),
        Screen::Add => render_add_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Render popups (in order of priority)
    if app.show_category_picker {
        render_category_picker(app, frame, area);
    } else if app.path_prompt.is_some() {
        render_path_prompt(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let filter_indicator = if app.filter.is_all() {
        String::new()
    } else {
        format!(" [{}]", app.filter.selected())
    };

    let sync_indicator = match app.sync.phase() {
        SyncPhase::Fetching | SyncPhase::Reconciling => {
            format!(" syncing{}", ".".repeat(app.spinner_frame as usize + 1))
        }
        SyncPhase::Failed => " sync failed".to_string(),
        SyncPhase::Idle => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(" Quotebook ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(filter_indicator, Style::default().fg(Color::Yellow)),
        Span::styled(sync_indicator, Style::default().fg(Color::Magenta)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_quote_screen(app: &App, frame: &mut Frame, area: Rect) {
    let visible_count = app.visible_quotes().len();
    let block = Block::default().borders(Borders::ALL).title(" Random Quote ");

    match &app.current_quote {
        Some(quote) => {
            let count_line = if app.filter.is_all() {
                format!("{} quotes", visible_count)
            } else {
                format!("{} quotes in {}", visible_count, app.filter.selected())
            };

            let lines = vec![
                Line::default(),
                Line::from(Span::styled(quote.text.clone(), Style::default().bold())),
                Line::default(),
                Line::from(Span::styled(
                    format!("- {}", quote.category),
                    Style::default().fg(Color::Cyan).italic(),
                )),
                Line::default(),
                Line::from(Span::styled(
                    count_line,
                    Style::default().fg(Color::DarkGray),
                )),
            ];

            let paragraph = Paragraph::new(Text::from(lines))
                .block(block)
                .wrap(Wrap { trim: true })
                .centered();
            frame.render_widget(paragraph, area);
        }
        None => {
            let hint = if app.book.is_empty() {
                "No quotes yet. Press 'a' to add one."
            } else {
                "No quotes in this category. Press 'f' to change the filter."
            };

            let paragraph = Paragraph::new(hint)
                .block(block)
                .style(Style::default().fg(Color::DarkGray))
                .centered();
            frame.render_widget(paragraph, area);
        }
    }
}

fn render_list_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .book
        .by_category(app.filter.selected())
        .iter()
        .map(|quote| {
            ListItem::new(Line::from(vec![
                Span::raw(quote.text.clone()),
                Span::styled(
                    format!("  [{}]", quote.category),
                    Style::default().fg(Color::Cyan),
                ),
            ]))
        })
        .collect();

    let title = if app.filter.is_all() {
        " All Quotes ".to_string()
    } else {
        format!(" Quotes: {} ", app.filter.selected())
    };

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_add_screen(app: &App, frame: &mut Frame, area: Rect) {
    let [text_area, category_area, help_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let border_style = |field: FormField| {
        if app.form_focus == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    let text_input = Paragraph::new(app.form_text.clone()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(FormField::Text))
            .title(" Quote text "),
    );
    frame.render_widget(text_input, text_area);

    let category_input = Paragraph::new(app.form_category.clone()).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(FormField::Category))
            .title(" Category "),
    );
    frame.render_widget(category_input, category_area);

    let help = Paragraph::new("Tab switches fields, Enter adds the quote, Esc goes back.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, help_area);

    // Show cursor in the focused field
    let (cursor, field_area) = match app.form_focus {
        FormField::Text => (app.form_text_cursor, text_area),
        FormField::Category => (app.form_category_cursor, category_area),
    };
    let cursor_x = (cursor as u16).min(field_area.width.saturating_sub(2));
    frame.set_cursor_position((field_area.x + 1 + cursor_x, field_area.y + 1));
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    // A transient status message replaces the key hints until it expires
    if let Some(status) = &app.status {
        let style = if status.error {
            Style::default().bg(Color::Red).fg(Color::White)
        } else {
            Style::default().bg(Color::Green).fg(Color::Black)
        };
        let message = Paragraph::new(format!(" {} ", status.text)).style(style);
        frame.render_widget(message, area);
        return;
    }

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.screen {
        Screen::Quote => vec![
            Span::styled(" n ", key_style),
            Span::styled(" next ", label_style),
            Span::styled(" a ", key_style),
            Span::styled(" add ", label_style),
            Span::styled(" l ", key_style),
            Span::styled(" list ", label_style),
            Span::styled(" f ", key_style),
            Span::styled(" filter ", label_style),
            Span::styled(" s ", key_style),
            Span::styled(" sync ", label_style),
            Span::styled(" e ", key_style),
            Span::styled(" export ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" import ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        Screen::List => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" show ", label_style),
            Span::styled(" f ", key_style),
            Span::styled(" filter ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" back ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
        Screen::Add => vec![
            Span::styled(" Tab ", key_style),
            Span::styled(" field ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" save ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" back ", label_style),
        ],
    };

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_width = width.min(area.width.saturating_sub(4));
    let popup_height = height.min(area.height.saturating_sub(2));
    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;
    Rect::new(popup_x, popup_y, popup_width, popup_height)
}

fn render_category_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let options = CategoryFilter::available_categories(&app.book);
    let height = (options.len() as u16 + 2).min(12);
    let popup_area = centered_popup(area, 40, height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = options
        .iter()
        .map(|category| {
            if category == ALL_CATEGORIES {
                ListItem::new("all categories")
            } else {
                ListItem::new(category.clone())
            }
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Filter by category "),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.picker_state);
}

fn render_path_prompt(app: &App, frame: &mut Frame, area: Rect) {
    let Some(prompt) = &app.path_prompt else {
        return;
    };

    let popup_area = centered_popup(area, 60, 7);
    frame.render_widget(Clear, popup_area);

    let title = match prompt.purpose {
        PromptPurpose::Export => " Export quotes to JSON ",
        PromptPurpose::Import => " Import quotes from JSON ",
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let instructions = Paragraph::new("Type a file path. Press Enter to confirm, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, Rect::new(inner.x, inner.y, inner.width, 1));

    let input = Paragraph::new(prompt.input.clone()).style(Style::default().fg(Color::Cyan));
    let input_area = Rect::new(inner.x, inner.y + 2, inner.width, 1);
    frame.render_widget(input, input_area);

    // Show cursor
    let cursor_x = (prompt.cursor as u16).min(input_area.width.saturating_sub(1));
    frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
}
