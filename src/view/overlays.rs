//! Overlay rendering (error notification, playlist picker, help popup, now playing)

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::model::UiState;
use crate::player::{PlaybackPhase, PlaybackSnapshot, ScrubCoordinator};
use super::utils::format_duration;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.width.saturating_sub(width) / 2,
        y: area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

pub fn render_error_notification(frame: &mut Frame, ui_state: &UiState) {
    if let Some(ref error_msg) = ui_state.error_message {
        let area = frame.area();

        // Fixed width popup (responsive to screen size)
        let popup_width = 52.min(area.width.saturating_sub(4));
        let inner_width = popup_width.saturating_sub(4).max(1) as usize; // account for borders

        let error_line_count = ((error_msg.chars().count() as f32) / (inner_width as f32)).ceil() as u16;

        // Height: top border (1) + error lines + bottom border (1)
        let popup_height = (2 + error_line_count.max(1)).min(area.height.saturating_sub(4));
        let popup_area = centered(area, popup_width, popup_height);

        frame.render_widget(Clear, popup_area);

        let error_widget = Paragraph::new(error_msg.to_string())
            .style(Style::default().fg(Color::Red))
            .wrap(ratatui::widgets::Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Error (Esc to dismiss) ")
                    .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
                    .style(Style::default().bg(Color::Black)),
            );

        frame.render_widget(error_widget, popup_area);
    }
}

pub fn render_playlist_picker(frame: &mut Frame, ui_state: &UiState) {
    let area = frame.area();

    let max_name_len = ui_state
        .playlists
        .iter()
        .map(|p| p.name.chars().count() + 10)
        .max()
        .unwrap_or(30);

    let popup_width = (max_name_len as u16 + 6).clamp(35, 60);
    let popup_height = (ui_state.playlists.len() as u16 + 4)
        .min(area.height.saturating_sub(4))
        .max(6);
    let popup_area = centered(area, popup_width, popup_height);

    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = ui_state
        .playlists
        .iter()
        .enumerate()
        .map(|(i, playlist)| {
            let style = if i == ui_state.picker_selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("📻 {} ({})", playlist.name, playlist.track_count)).style(style)
        })
        .collect();

    let track_name = ui_state
        .picker_track
        .as_ref()
        .map(|t| t.name.as_str())
        .unwrap_or("track");
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" Add \"{}\" to (↑↓ Enter Esc) ", track_name))
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.picker_selected));

    frame.render_stateful_widget(list, popup_area, &mut list_state);
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = [
        ("", "── Navigation ──"),
        ("Tab / Shift+Tab", "Cycle sections"),
        ("↑ / ↓", "Move selection"),
        ("← / →", "Switch songs / artists"),
        ("Enter", "Select / Play list from here"),
        ("Backspace / Esc", "Go back"),
        ("G", "Focus search"),
        ("L", "Focus playlists"),
        ("U", "Show play queue"),
        ("", ""),
        ("", "── Playback ──"),
        ("Space", "Play / Pause"),
        ("N", "Next track"),
        ("P", "Previous / restart track"),
        (", / .", "Seek back / forward"),
        ("Mouse drag", "Scrub the progress bar"),
        ("F", "Now playing panel"),
        ("", ""),
        ("", "── Actions ──"),
        ("X", "Like / Unlike track"),
        ("K", "Add to playlist"),
        ("A", "Open artist"),
        ("B", "Open album"),
        ("Delete", "Remove from playlist"),
        ("", ""),
        ("", "── General ──"),
        ("H", "Toggle this help"),
        ("Q", "Quit"),
    ];

    let popup_height = (keybindings.len() as u16 + 2).min(area.height.saturating_sub(4));
    let popup_area = centered(area, 62, popup_height);

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                // Section header or empty line
                Line::from(Span::styled(
                    format!("{:^38}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>18}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Help (H or Esc to close) ")
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                .style(Style::default().bg(Color::Black)),
        )
        .style(Style::default().bg(Color::Black));

    frame.render_widget(help_text, popup_area);
}

/// Full-width now playing panel drawn over the sidebar and content.
pub fn render_now_playing(frame: &mut Frame, area: Rect, playback: &PlaybackSnapshot, scrub: &ScrubCoordinator) {
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Now Playing (F or Esc to close) ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(item) = &playback.current_item else {
        let idle = Paragraph::new("Nothing is playing. Pick a track and press Enter.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        frame.render_widget(idle, inner);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(6), // Track info
            Constraint::Length(1), // Gauge
            Constraint::Length(2), // Status
            Constraint::Min(0),
        ])
        .split(inner);

    let mut info = vec![
        Line::from(Span::styled(
            item.title.clone(),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(item.artist.clone(), Style::default().fg(Color::Cyan))),
        Line::from(""),
    ];
    if !item.artwork_uri.is_empty() {
        info.push(Line::from(Span::styled(
            format!("Artwork: {}", item.artwork_uri),
            Style::default().fg(Color::DarkGray),
        )));
    }
    frame.render_widget(Paragraph::new(info).alignment(Alignment::Center), chunks[1]);

    let position_ms = scrub.display_position_ms(playback.position_ms, playback.duration_ms);
    let ratio = if playback.duration_ms > 0 {
        (position_ms as f64 / playback.duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let gauge_area = Rect {
        x: chunks[2].x + 2,
        width: chunks[2].width.saturating_sub(4),
        ..chunks[2]
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio)
        .label(format!(
            "{} / {}",
            format_duration(position_ms),
            format_duration(playback.duration_ms)
        ));
    frame.render_widget(gauge, gauge_area);

    let state = match playback.phase {
        PlaybackPhase::Loading => "⏳ Loading",
        PlaybackPhase::Playing => "▶ Playing",
        PlaybackPhase::Paused => "⏸ Paused",
        PlaybackPhase::Idle => "Stopped",
    };
    let queue = match playback.queue_index {
        Some(index) => format!("Track {} of {}", index + 1, playback.queue_len),
        None => "Not from the queue".to_string(),
    };
    let status = Paragraph::new(format!("{}  ·  {}", state, queue))
        .style(Style::default().fg(Color::Yellow))
        .alignment(Alignment::Center);
    frame.render_widget(status, chunks[3]);
}
