use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::App;

/// Render the page's rows, highlighting fuzzy-filter matches.
pub(super) fn render_rows(frame: &mut Frame, area: Rect, app: &App) {
    let labels = app.row_labels();
    let display = app.display_indices();
    let q = app.filter_query.trim();

    // Center the selected item when possible by creating a visible window.
    // Only build ListItems for the visible window.
    let total = display.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = display.iter().position(|&i| i == app.selected).unwrap_or(0);
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let visible_items: Vec<ListItem> = display[start..end]
        .iter()
        .map(|&i| {
            let title = &labels[i];
            match App::fuzzy_match_positions(title, q).filter(|_| !q.is_empty()) {
                Some(positions) => ListItem::new(uppercase_positions(title, &positions)),
                None => ListItem::new(title.clone()),
            }
        })
        .collect();

    let title = if total == labels.len() {
        format!(" {} ", app.route().title())
    } else {
        format!(" {} ({}/{}) ", app.route().title(), total, labels.len())
    };
    let list = List::new(visible_items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if total > 0 {
        state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Uppercase the characters of `title` at `positions` (char indices).
fn uppercase_positions(title: &str, positions: &[usize]) -> String {
    let mut rendered = String::new();
    let mut pos_iter = positions.iter().copied();
    let mut next_pos = pos_iter.next();

    for (ci, ch) in title.chars().enumerate() {
        if next_pos == Some(ci) {
            rendered.extend(ch.to_uppercase());
            next_pos = pos_iter.next();
        } else {
            rendered.push(ch);
        }
    }
    rendered
}
