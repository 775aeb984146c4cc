//! Main content area rendering (search results, track lists, playlist, queue)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{
    ActiveSection, CatalogArtist, ContentState, ContentView, PlaylistDetail, SearchResultSection, SearchResults,
    TrackRow, UiState,
};
use crate::player::{PlayableItem, PlaybackSnapshot};
use super::utils::{calculate_num_width, format_duration, render_scrollable_list, track_column_widths, truncate_string};

fn border_style(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

fn row_style(selected: bool, is_focused: bool, is_playing: bool) -> Style {
    if selected && is_focused {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if is_playing {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}

fn header_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub fn render_main_content(
    frame: &mut Frame,
    area: Rect,
    ui_state: &UiState,
    content_state: &ContentState,
    playback: &PlaybackSnapshot,
) {
    let is_focused = ui_state.active_section == ActiveSection::MainContent;
    let playing_id = playback.current_item.as_ref().and_then(|item| item.track_id.as_deref());

    if content_state.is_loading {
        let loading = Paragraph::new("Loading...")
            .style(Style::default().fg(Color::Yellow))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Content ")
                    .border_style(border_style(is_focused)),
            );
        frame.render_widget(loading, area);
        return;
    }

    match &content_state.view {
        ContentView::Empty => {
            let content = Paragraph::new("Type in search and press Enter to find music\n\nUse Tab to navigate between sections\nUse ↑/↓ to select items\nPress Enter to open or play\nPress H for all keys")
                .style(Style::default().fg(Color::DarkGray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .padding(Padding::horizontal(1))
                        .border_style(border_style(is_focused)),
                );
            frame.render_widget(content, area);
        }
        ContentView::SearchResults {
            results,
            section,
            track_index,
            artist_index,
        } => {
            render_search_results(
                frame,
                area,
                results,
                *section,
                (*track_index, *artist_index),
                is_focused,
                playing_id,
            );
        }
        ContentView::Popular { tracks, selected_index } => {
            render_track_list(frame, area, " Popular on Jamendo ", tracks, *selected_index, is_focused, playing_id);
        }
        ContentView::LikedSongs { tracks, selected_index } => {
            render_track_list(frame, area, " Liked Songs ", tracks, *selected_index, is_focused, playing_id);
        }
        ContentView::Collection {
            heading,
            tracks,
            selected_index,
        } => {
            let title = format!(" {} (a: artist, b: album, Backspace: back) ", heading);
            render_track_list(frame, area, &title, tracks, *selected_index, is_focused, playing_id);
        }
        ContentView::PlaylistDetail { detail, selected_index } => {
            render_playlist_detail(frame, area, detail, *selected_index, is_focused, playing_id);
        }
        ContentView::Queue { items, selected_index } => {
            render_queue(frame, area, items, *selected_index, is_focused, playback);
        }
    }
}

fn render_search_results(
    frame: &mut Frame,
    area: Rect,
    results: &SearchResults,
    section: SearchResultSection,
    (track_index, artist_index): (usize, usize),
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Category tabs
            Constraint::Min(0),    // Results list
        ])
        .split(area);

    let tabs = [
        (SearchResultSection::Tracks, format!(" Songs ({}) ", results.tracks.len())),
        (SearchResultSection::Artists, format!(" Artists ({}) ", results.artists.len())),
    ];
    let tabs_content: Vec<Span> = tabs
        .into_iter()
        .flat_map(|(tab_section, title)| {
            let style = if tab_section == section {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            vec![Span::styled(title, style), Span::raw("  ")]
        })
        .collect();

    let tabs = Paragraph::new(Line::from(tabs_content)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Results (←/→ to switch) ")
            .border_style(border_style(is_focused)),
    );
    frame.render_widget(tabs, chunks[0]);

    let content_width = chunks[1].width.saturating_sub(4) as usize;
    let (list_items, selected_index, empty_msg) = match section {
        SearchResultSection::Tracks => (
            render_track_items(&results.tracks, track_index, is_focused, playing_id, content_width),
            track_index + 1, // +1 for header row
            "No songs found",
        ),
        SearchResultSection::Artists => (
            render_artist_items(&results.artists, artist_index, is_focused, content_width),
            artist_index + 1,
            "No artists found",
        ),
    };

    let list_block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));

    if list_items.len() <= 1 {
        let empty = Paragraph::new(format!("  {}", empty_msg))
            .style(Style::default().fg(Color::DarkGray))
            .block(list_block);
        frame.render_widget(empty, chunks[1]);
    } else {
        render_scrollable_list(frame, chunks[1], list_items, selected_index, list_block);
    }
}

fn render_track_items(
    tracks: &[TrackRow],
    selected_index: usize,
    is_focused: bool,
    playing_id: Option<&str>,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let (num_width, _liked_width, title_width, artist_width, _duration_width) =
        track_column_widths(content_width, tracks.len());

    // Create header as first item
    let mut items = vec![ListItem::new(format!(
        " {:<num_width$}   {}   {:<title_width$}   {:<artist_width$}   {}",
        "#",
        "  ",
        "Title",
        "Artist",
        "Time",
        num_width = num_width,
        title_width = title_width,
        artist_width = artist_width
    ))
    .style(header_style())];

    let track_items = tracks.iter().enumerate().map(|(i, row)| {
        let track = &row.track;
        let is_playing = playing_id.is_some_and(|id| id == track.id);
        let style = row_style(i == selected_index, is_focused, is_playing);

        let liked_indicator = if row.liked { "💚" } else { "  " };
        let playing_indicator = if is_playing { "▶" } else { " " };
        let track_num = format!("{}{:<num_width$}", playing_indicator, i + 1, num_width = num_width);
        let title_str = truncate_string(&track.name, title_width);
        let artist_str = truncate_string(&track.artist_name, artist_width);
        let duration = if track.audio.is_empty() {
            "  --  ".to_string()
        } else {
            format_duration(track.duration * 1000)
        };

        ListItem::new(format!(
            "{}   {}   {}   {}   {}",
            track_num, liked_indicator, title_str, artist_str, duration
        ))
        .style(style)
    });

    items.extend(track_items);
    items
}

fn render_artist_items(
    artists: &[CatalogArtist],
    artist_index: usize,
    is_focused: bool,
    content_width: usize,
) -> Vec<ListItem<'static>> {
    let num_width = calculate_num_width(artists.len());
    let name_width = content_width.saturating_sub(1 + num_width + 3);

    let mut items = vec![ListItem::new(format!(
        " {:<num_w$}   {:<name_w$}",
        "#",
        "Artist",
        num_w = num_width,
        name_w = name_width
    ))
    .style(header_style())];

    items.extend(artists.iter().enumerate().map(|(i, artist)| {
        ListItem::new(format!(
            " {:<num_w$}   {}",
            i + 1,
            truncate_string(&artist.name, name_width),
            num_w = num_width
        ))
        .style(row_style(i == artist_index, is_focused, false))
    }));
    items
}

fn render_track_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    tracks: &[TrackRow],
    selected_index: usize,
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let content_width = area.width.saturating_sub(4) as usize;
    let mut track_items = render_track_items(tracks, selected_index, is_focused, playing_id, content_width);
    if tracks.is_empty() {
        track_items.push(ListItem::new("       Nothing here yet").style(Style::default().fg(Color::DarkGray)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));

    render_scrollable_list(frame, area, track_items, selected_index + 1, block);
}

fn render_playlist_detail(
    frame: &mut Frame,
    area: Rect,
    detail: &PlaylistDetail,
    selected_index: usize,
    is_focused: bool,
    playing_id: Option<&str>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(0),    // Tracks
        ])
        .split(area);

    let total_secs: u64 = detail.tracks.iter().map(|row| row.track.duration).sum();
    let header_text = format!(
        "📻 {}\n {} tracks, {} | Enter: Play from selected | Del: Remove | Backspace: Go back",
        detail.name,
        detail.tracks.len(),
        format_duration(total_secs * 1000)
    );
    let header = Paragraph::new(header_text)
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .padding(Padding::horizontal(1))
                .borders(Borders::ALL)
                .border_style(border_style(is_focused)),
        );
    frame.render_widget(header, chunks[0]);

    render_track_list(frame, chunks[1], " Tracks ", &detail.tracks, selected_index, is_focused, playing_id);
}

fn render_queue(
    frame: &mut Frame,
    area: Rect,
    items: &[PlayableItem],
    selected_index: usize,
    is_focused: bool,
    playback: &PlaybackSnapshot,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Currently playing
            Constraint::Min(0),    // Queue
        ])
        .split(area);

    let cp_text = match &playback.current_item {
        Some(item) if playback.queue_index.is_none() => format!("{}  -  {} (not in queue)", item.title, item.artist),
        Some(item) => format!("{}  -  {}", item.title, item.artist),
        None => "No track playing".to_string(),
    };
    let cp_widget = Paragraph::new(cp_text).style(Style::default().fg(Color::Cyan)).block(
        Block::default()
            .padding(Padding::horizontal(1))
            .borders(Borders::ALL)
            .title(" 🎵 Now Playing ")
            .border_style(border_style(is_focused)),
    );
    frame.render_widget(cp_widget, chunks[0]);

    let content_width = chunks[1].width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(items.len());
    let title_width = (content_width.saturating_sub(1 + num_width + 3 + 3 + 3 + 6) * 55) / 100;
    let artist_width = content_width.saturating_sub(1 + num_width + 3 + title_width + 3 + 3 + 6);

    let mut list_items = vec![ListItem::new(format!(
        " {:<num_width$}   {:<title_width$}   {:<artist_width$}   {}",
        "#",
        "Title",
        "Artist",
        "Time",
        num_width = num_width,
        title_width = title_width,
        artist_width = artist_width
    ))
    .style(header_style())];

    list_items.extend(items.iter().enumerate().map(|(i, item)| {
        let is_playing = playback.queue_index == Some(i);
        let playing_indicator = if is_playing { "▶" } else { " " };
        let duration = item.duration_ms.map(format_duration).unwrap_or_else(|| "--".to_string());

        ListItem::new(format!(
            "{}{:<num_width$}   {}   {}   {}",
            playing_indicator,
            i + 1,
            truncate_string(&item.title, title_width),
            truncate_string(&item.artist, artist_width),
            duration,
            num_width = num_width
        ))
        .style(row_style(i == selected_index, is_focused, is_playing))
    }));

    if items.is_empty() {
        list_items.push(ListItem::new("       Queue is empty").style(Style::default().fg(Color::DarkGray)));
    }

    let queue_block = Block::default()
        .borders(Borders::ALL)
        .title(" Play Queue ")
        .padding(Padding::horizontal(1))
        .border_style(border_style(is_focused));

    render_scrollable_list(frame, chunks[1], list_items, selected_index + 1, queue_block);
}
