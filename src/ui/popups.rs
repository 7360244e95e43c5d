use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, Popup};
use crate::catalog::Track;
use crate::extras::{Lyrics, TrackExtras};

use super::format::{centered_rect_sized, format_duration_mmss_ceil};

fn popup_block(title: &str) -> Block<'_> {
    Block::default()
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
        .borders(Borders::ALL)
        .title(title)
}

/// Overlay the open popup, kept inside `area` so the bars stay visible.
pub(super) fn render_popup(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    current: Option<&Track>,
    extras: &TrackExtras,
) {
    let Some(popup) = &app.popup else {
        return;
    };
    match popup {
        Popup::Metadata => {
            let popup_area = centered_rect_sized(72, 11, area);
            frame.render_widget(Clear, popup_area);
            let meta = match app.selected_track() {
                Some(track) => metadata_text(track),
                None => "No track selected".to_string(),
            };
            let paragraph = Paragraph::new(meta)
                .block(popup_block(" metadata (K closes) "))
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, popup_area);
        }
        Popup::Lyrics => {
            let popup_area = centered_rect_sized(72, area.height.saturating_sub(2), area);
            frame.render_widget(Clear, popup_area);
            let text = match (current, extras.lyrics()) {
                (None, _) => "Nothing playing.".to_string(),
                (Some(_), Lyrics::NotRequested | Lyrics::Loading) => {
                    "Loading lyrics...".to_string()
                }
                (Some(_), Lyrics::Ready(None)) => "No lyrics available.".to_string(),
                (Some(_), Lyrics::Ready(Some(text))) => text.clone(),
            };
            let title = match current {
                Some(track) => format!(" lyrics: {} (y closes) ", track.name),
                None => " lyrics (y closes) ".to_string(),
            };
            let paragraph = Paragraph::new(text)
                .block(popup_block(&title))
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, popup_area);
        }
        Popup::AddToPlaylist { cursor, .. } => {
            let height = (app.playlists().len() as u16).saturating_add(2);
            let popup_area = centered_rect_sized(48, height, area);
            frame.render_widget(Clear, popup_area);
            let items: Vec<ListItem> = app
                .playlists()
                .iter()
                .map(|p| ListItem::new(p.name.clone()))
                .collect();
            let list = List::new(items)
                .block(popup_block(" add to playlist (enter/esc) "))
                .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
                .highlight_symbol("> ");
            let mut state = ListState::default();
            state.select(Some(*cursor));
            frame.render_stateful_widget(list, popup_area, &mut state);
        }
        Popup::NewPlaylist { name } => {
            let popup_area = centered_rect_sized(48, 3, area);
            frame.render_widget(Clear, popup_area);
            let paragraph = Paragraph::new(format!("{name}_"))
                .block(popup_block(" new playlist (enter/esc) "));
            frame.render_widget(paragraph, popup_area);
        }
    }
}

fn metadata_text(track: &Track) -> String {
    format!(
        "Title: {}\nBand: {}\nAlbum: {}\nGenre: {}\nYear: {}\nDuration: {}\nPath: {}",
        track.name,
        track.band_name.as_deref().unwrap_or("-"),
        track.album_name.as_deref().unwrap_or("-"),
        track.genre.as_deref().unwrap_or("-"),
        track
            .release_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "-".to_string()),
        format_duration_mmss_ceil(track.duration),
        track.audio_url,
    )
}
