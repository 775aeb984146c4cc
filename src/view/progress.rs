//! Mini-player gauge

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::player::{PlaybackPhase, PlaybackSnapshot, ScrubCoordinator};
use super::utils::format_duration;

/// Draw the gauge and return its inner area.
pub fn render_progress_bar(
    frame: &mut Frame,
    area: Rect,
    playback: &PlaybackSnapshot,
    scrub: &ScrubCoordinator,
) -> Rect {
    let status_text = match (&playback.current_item, playback.phase) {
        (None, _) => " No track playing".to_string(),
        (Some(item), PlaybackPhase::Loading) => format!(" ⏳ {} | {}", item.title, item.artist),
        (Some(item), _) if playback.is_playing => format!(" ▶ {} | {}", item.title, item.artist),
        (Some(item), _) => format!("⏸  {} | {}", item.title, item.artist),
    };

    let position_ms = scrub.display_position_ms(playback.position_ms, playback.duration_ms);
    let time_str = format!(
        "{} / {}",
        format_duration(position_ms),
        format_duration(playback.duration_ms)
    );

    let ratio = if playback.duration_ms > 0 {
        (position_ms as f64 / playback.duration_ms as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let queue_info = match playback.queue_index {
        Some(index) => format!(" Queue {}/{} ", index + 1, playback.queue_len),
        None if playback.queue_len > 0 => format!(" Queue -/{} ", playback.queue_len),
        None => " Queue empty ".to_string(),
    };

    let gauge_color = if scrub.is_scrubbing() { Color::Yellow } else { Color::Green };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("{} ", status_text))
        .title_bottom(Line::from(queue_info).right_aligned());
    let inner = block.inner(area);

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(ratio)
        .label(time_str);

    frame.render_widget(gauge, area);
    inner
}
