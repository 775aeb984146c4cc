//! Layout rendering (top bar, sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{ActiveSection, LibraryItem, UiState};

fn section_border(ui_state: &UiState, section: ActiveSection) -> Style {
    if ui_state.active_section == section {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    }
}

fn entry_style(selected: bool, focused: bool) -> Style {
    if selected && focused {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if selected {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    }
}

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(25), // Account
        ])
        .split(area);

    let search_style = if ui_state.active_section == ActiveSection::Search {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let search_text = if ui_state.search_query.is_empty() {
        "Type to search Jamendo..."
    } else {
        &ui_state.search_query
    };

    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .padding(Padding::horizontal(1))
            .border_style(section_border(ui_state, ActiveSection::Search)),
    );
    frame.render_widget(search, chunks[0]);

    let (account_text, account_style) = match &ui_state.account {
        Some(username) => (format!("👤 {}", username), Style::default().fg(Color::Cyan)),
        None => ("Not logged in".to_string(), Style::default().fg(Color::DarkGray)),
    };
    let account = Paragraph::new(account_text)
        .style(account_style)
        .block(Block::default().borders(Borders::ALL).title(" Account "));
    frame.render_widget(account, chunks[1]);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(LibraryItem::ALL.len() as u16 + 2),
            Constraint::Min(0),
        ])
        .split(area);

    let library_focused = ui_state.active_section == ActiveSection::Library;
    let library_items: Vec<ListItem> = LibraryItem::ALL
        .iter()
        .enumerate()
        .map(|(i, item)| {
            ListItem::new(item.label()).style(entry_style(i == ui_state.library_selected, library_focused))
        })
        .collect();

    let library = List::new(library_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Library ")
            .padding(Padding::horizontal(1))
            .border_style(section_border(ui_state, ActiveSection::Library)),
    );
    frame.render_widget(library, chunks[0]);

    let playlists_focused = ui_state.active_section == ActiveSection::Playlists;
    let playlist_items: Vec<ListItem> = if ui_state.account.is_none() {
        vec![ListItem::new("Log in to see playlists").style(Style::default().fg(Color::DarkGray))]
    } else {
        ui_state
            .playlists
            .iter()
            .enumerate()
            .map(|(i, item)| {
                ListItem::new(format!("{} ({})", item.name, item.track_count))
                    .style(entry_style(i == ui_state.playlist_selected, playlists_focused))
            })
            .collect()
    };

    let playlists = List::new(playlist_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Playlists ")
                .padding(Padding::horizontal(1))
                .border_style(section_border(ui_state, ActiveSection::Playlists)),
        )
        .highlight_style(Style::default()); // Highlight handled by item styles

    let mut list_state = ListState::default();
    list_state.select(Some(ui_state.playlist_selected));

    frame.render_stateful_widget(playlists, chunks[1], &mut list_state);
}
