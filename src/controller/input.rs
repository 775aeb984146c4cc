//! Key and mouse event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::model::{ActiveSection, LibraryItem};
use super::AppController;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let model = self.model.lock().await;

        // Esc abandons a drag on the progress bar without seeking
        if key.code == KeyCode::Esc {
            let mut scrub = model.scrub.lock().await;
            if scrub.is_scrubbing() {
                scrub.cancel();
                return Ok(());
            }
        }

        // Handle error message first (blocks all other interactions)
        if model.has_error().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    model.clear_error().await;
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        // Handle help popup
        if model.is_help_popup_open().await {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => {
                    model.hide_help_popup().await;
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        // Handle playlist picker modal
        if model.is_playlist_picker_open().await {
            return match key.code {
                KeyCode::Up => {
                    model.picker_move_up().await;
                    Ok(())
                }
                KeyCode::Down => {
                    model.picker_move_down().await;
                    Ok(())
                }
                KeyCode::Enter => {
                    let selection = model.picker_selection().await;
                    model.hide_playlist_picker().await;
                    drop(model);
                    if let Some((playlist, track)) = selection {
                        self.add_track_to_playlist(&playlist, &track).await;
                    }
                    Ok(())
                }
                KeyCode::Esc | KeyCode::Char('k') | KeyCode::Char('K') => {
                    model.hide_playlist_picker().await;
                    Ok(())
                }
                _ => Ok(()),
            }
        }

        // The now playing panel covers the content; Esc closes it
        if key.code == KeyCode::Esc && self.player.now_playing_visible().await {
            self.player.set_now_playing_visible(false).await;
            return Ok(());
        }

        let ui_state = model.get_ui_state().await;

        // Handle search input when in search section
        if ui_state.active_section == ActiveSection::Search {
            match key.code {
                KeyCode::Tab => {
                    if key.modifiers.contains(KeyModifiers::SHIFT) {
                        model.cycle_section_backward().await;
                    } else {
                        model.cycle_section_forward().await;
                    }
                    return Ok(());
                }
                KeyCode::Enter => {
                    let query = ui_state.search_query.trim().to_string();
                    drop(model);
                    if !query.is_empty() {
                        self.perform_search(&query).await;
                    }
                    return Ok(());
                }
                KeyCode::Esc => {
                    model.update_search_query(String::new()).await;
                    return Ok(());
                }
                KeyCode::Backspace => {
                    model.backspace_search().await;
                    return Ok(());
                }
                KeyCode::Char(c) => {
                    // Q still quits even in search mode when Ctrl is pressed
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        model.set_should_quit(true).await;
                        return Ok(());
                    }
                    model.append_to_search(c).await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Handle MainContent section navigation
        if ui_state.active_section == ActiveSection::MainContent {
            match key.code {
                KeyCode::Up => {
                    model.content_move_up().await;
                    return Ok(());
                }
                KeyCode::Down => {
                    model.content_move_down().await;
                    return Ok(());
                }
                KeyCode::Left | KeyCode::Right => {
                    model.navigate_search_section().await;
                    return Ok(());
                }
                KeyCode::Enter => {
                    let selected = model.get_selected_content_item().await;
                    drop(model);
                    if let Some(item) = selected {
                        self.spawn(|controller| async move { controller.handle_selected_item(item).await });
                    }
                    return Ok(());
                }
                KeyCode::Backspace | KeyCode::Esc => {
                    model.navigate_back().await;
                    return Ok(());
                }
                KeyCode::Char('x') | KeyCode::Char('X') => {
                    drop(model);
                    self.toggle_liked_track().await;
                    return Ok(());
                }
                KeyCode::Char('k') | KeyCode::Char('K') => {
                    drop(model);
                    self.open_playlist_picker().await;
                    return Ok(());
                }
                KeyCode::Char('a') | KeyCode::Char('A') => {
                    drop(model);
                    self.open_selected_artist().await;
                    return Ok(());
                }
                KeyCode::Char('b') | KeyCode::Char('B') => {
                    drop(model);
                    self.open_selected_album().await;
                    return Ok(());
                }
                KeyCode::Delete => {
                    drop(model);
                    self.remove_selected_from_playlist().await;
                    return Ok(());
                }
                _ => {}
            }
        }

        // Global keybindings
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                model.set_should_quit(true).await;
            }
            KeyCode::Tab => {
                if key.modifiers.contains(KeyModifiers::SHIFT) {
                    model.cycle_section_backward().await;
                } else {
                    model.cycle_section_forward().await;
                }
            }
            KeyCode::BackTab => {
                model.cycle_section_backward().await;
            }
            KeyCode::Up => {
                model.move_selection_up().await;
            }
            KeyCode::Down => {
                model.move_selection_down().await;
            }
            KeyCode::Enter => match ui_state.active_section {
                ActiveSection::Library => {
                    let item = model.selected_library_item().await;
                    drop(model);
                    self.open_library_item(item).await;
                }
                ActiveSection::Playlists => {
                    if let Some(playlist) = model.get_selected_playlist().await {
                        drop(model);
                        self.open_playlist(&playlist.id).await;
                    }
                }
                _ => {}
            },
            // Play/Pause toggle
            KeyCode::Char(' ') => {
                drop(model);
                self.spawn(|controller| async move { controller.toggle_playback().await });
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(model);
                self.spawn(|controller| async move { controller.next_track().await });
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(model);
                self.spawn(|controller| async move { controller.previous_track().await });
            }
            KeyCode::Char(',') | KeyCode::Char('<') => {
                drop(model);
                self.seek_relative(false).await;
            }
            KeyCode::Char('.') | KeyCode::Char('>') => {
                drop(model);
                self.seek_relative(true).await;
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                drop(model);
                self.toggle_now_playing().await;
            }
            // Focus search
            KeyCode::Char('g') | KeyCode::Char('G') => {
                model.set_active_section(ActiveSection::Search).await;
            }
            // Focus playlists
            KeyCode::Char('l') | KeyCode::Char('L') => {
                model.set_active_section(ActiveSection::Playlists).await;
            }
            KeyCode::Char('u') | KeyCode::Char('U') => {
                drop(model);
                self.open_library_item(LibraryItem::PlayQueue).await;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                model.show_help_popup().await;
            }
            _ => {}
        }
        Ok(())
    }

    /// Press, drag and release on the progress bar scrub through the track.
    pub async fn handle_mouse_event(&self, event: MouseEvent) -> Result<()> {
        let (bar, scrub) = {
            let model = self.model.lock().await;
            (model.progress_bar().await, model.scrub.clone())
        };
        let Some(bar) = bar else {
            return Ok(());
        };

        let mut scrub = scrub.lock().await;
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if bar.contains(event.column, event.row) && self.player.snapshot().await.current_item.is_some() {
                    scrub.begin(bar.offset(event.column));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                scrub.update(bar.offset(event.column));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if scrub.is_scrubbing() {
                    scrub.update(bar.offset(event.column));
                    scrub.commit(&self.player).await;
                }
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyEventState;
    use tokio::sync::Mutex;

    use super::*;
    use crate::config::{CatalogConfig, PlayerConfig};
    use crate::model::{AppModel, BackendClient, BarArea, CatalogTrack, JamendoClient, LikedTracksCache};
    use crate::player::testing::{Call, FakeEngine};
    use crate::player::PlaybackController;

    fn app() -> (AppController, Arc<FakeEngine>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let engine = FakeEngine::new();
        let player = PlaybackController::start(engine.clone(), &PlayerConfig::default());
        let model = AppModel::new(
            JamendoClient::new(&CatalogConfig::default()).unwrap(),
            BackendClient::new("http://localhost:9").unwrap(),
            LikedTracksCache::new(dir.path().join("liked.json")),
        );
        (AppController::new(Arc::new(Mutex::new(model)), player, 5000), engine, dir)
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row: 40,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[tokio::test]
    async fn typing_goes_to_the_search_box() {
        let (app, _engine, _dir) = app();
        for c in "air q".chars() {
            app.handle_key_event(press(KeyCode::Char(c))).await.unwrap();
        }

        let model = app.model.lock().await;
        assert_eq!(model.get_ui_state().await.search_query, "air q");
        assert!(!model.should_quit().await);
        drop(model);
        app.player.shutdown().await;
    }

    #[tokio::test]
    async fn q_quits_outside_search() {
        let (app, _engine, _dir) = app();
        app.handle_key_event(press(KeyCode::Tab)).await.unwrap();
        app.handle_key_event(press(KeyCode::Char('q'))).await.unwrap();

        assert!(app.model.lock().await.should_quit().await);
        app.player.shutdown().await;
    }

    #[tokio::test]
    async fn f_toggles_now_playing_and_esc_closes_it() {
        let (app, _engine, _dir) = app();
        app.handle_key_event(press(KeyCode::Tab)).await.unwrap();

        app.handle_key_event(press(KeyCode::Char('f'))).await.unwrap();
        assert!(app.player.now_playing_visible().await);

        app.handle_key_event(press(KeyCode::Esc)).await.unwrap();
        assert!(!app.player.now_playing_visible().await);
        app.player.shutdown().await;
    }

    #[tokio::test]
    async fn dragging_the_bar_seeks_once_on_release() {
        let (app, engine, _dir) = app();
        let track = CatalogTrack {
            id: "1".into(),
            name: "Song".into(),
            duration: 100,
            audio: "https://cdn/1.mp3".into(),
            ..Default::default()
        };
        app.play_track_list(&[track], 0).await;
        engine.emit(true, 1_000, 100_000, false);
        for _ in 0..100 {
            if app.player.snapshot().await.duration_ms == 100_000 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        app.model
            .lock()
            .await
            .set_progress_bar(BarArea { x: 10, y: 40, width: 200, height: 1 })
            .await;

        app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 20)).await.unwrap();
        app.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 40)).await.unwrap();
        app.handle_mouse_event(mouse(MouseEventKind::Drag(MouseButton::Left), 60)).await.unwrap();
        app.handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 60)).await.unwrap();

        let seeks: Vec<Call> = engine
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Seek(_)))
            .collect();
        assert_eq!(seeks, vec![Call::Seek(25_000)]);
        assert!(!app.model.lock().await.scrub.lock().await.is_scrubbing());
        app.player.shutdown().await;
    }

    #[tokio::test]
    async fn esc_abandons_a_drag() {
        let (app, engine, _dir) = app();
        let track = CatalogTrack {
            id: "1".into(),
            name: "Song".into(),
            duration: 100,
            audio: "https://cdn/1.mp3".into(),
            ..Default::default()
        };
        app.play_track_list(&[track], 0).await;
        app.model
            .lock()
            .await
            .set_progress_bar(BarArea { x: 0, y: 40, width: 100, height: 1 })
            .await;

        app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 30)).await.unwrap();
        assert!(app.model.lock().await.scrub.lock().await.is_scrubbing());

        app.handle_key_event(press(KeyCode::Esc)).await.unwrap();
        app.handle_mouse_event(mouse(MouseEventKind::Up(MouseButton::Left), 70)).await.unwrap();

        assert!(!app.model.lock().await.scrub.lock().await.is_scrubbing());
        assert!(!engine.calls().iter().any(|c| matches!(c, Call::Seek(_))));
        app.player.shutdown().await;
    }
}
