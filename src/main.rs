use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Terminal};
use tokio::sync::Mutex;

use jamendo_rs::audio::RodioEngine;
use jamendo_rs::auth::{self, SessionStore};
use jamendo_rs::config::Config;
use jamendo_rs::controller::AppController;
use jamendo_rs::log_api_result;
use jamendo_rs::logging;
use jamendo_rs::model::{AppModel, BackendClient, BarArea, JamendoClient, LikedTracksCache, LIKED_TRACKS_CACHE_FILE};
use jamendo_rs::player::PlaybackController;
use jamendo_rs::view::AppView;

#[derive(Parser)]
#[command(name = "jamendo-rs")]
#[command(about = "Terminal music player for the Jamendo catalog", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Jamendo API client id
    #[arg(long, env = "JAMENDO_CLIENT_ID", global = true, hide_env_values = true)]
    client_id: Option<String>,

    /// Playlist/auth backend base URL
    #[arg(long, env = "JAMENDO_RS_BACKEND_URL", global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the player (default)
    Play {
        /// Search for this right away
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Log in to the playlist backend
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create a backend account and log in
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Manage playlists
    Playlists {
        #[command(subcommand)]
        action: PlaylistCommand,
    },
}

#[derive(Subcommand)]
enum PlaylistCommand {
    List,
    Create { name: String },
    Rename { id: String, name: String },
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(client_id) = cli.client_id {
        config.catalog.client_id = client_id;
    }
    if let Some(backend_url) = cli.backend_url {
        config.backend.base_url = backend_url;
    }

    let _log_guard = match logging::init_logging(&config.logging.directory) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: Failed to initialize logging: {}", e);
            None
        }
    };

    tracing::info!("=== jamendo-rs starting ===");

    let data_dir = Config::data_dir()?;
    let backend = BackendClient::new(&config.backend.base_url)?;
    let sessions = SessionStore::new(&data_dir);

    match cli.command.unwrap_or(Commands::Play { query: None }) {
        Commands::Play { query } => run_player(config, data_dir, backend, sessions, query).await,
        Commands::Login { email, password } => {
            let session = auth::login(&backend, &sessions, &email, &password).await?;
            println!("Logged in as {}", session.user.username);
            Ok(())
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let session = auth::register(&backend, &sessions, &username, &email, &password).await?;
            println!("Registered and logged in as {}", session.user.username);
            Ok(())
        }
        Commands::Logout => {
            auth::logout(&backend, &sessions).await?;
            println!("Logged out");
            Ok(())
        }
        Commands::Playlists { action } => playlists_command(&backend, &sessions, action).await,
    }
}

async fn playlists_command(backend: &BackendClient, sessions: &SessionStore, action: PlaylistCommand) -> Result<()> {
    if auth::restore_session(backend, sessions).await?.is_none() {
        bail!("Not logged in. Run `jamendo-rs login` first.");
    }

    match action {
        PlaylistCommand::List => {
            let result = backend.playlists().await;
            log_api_result!("list_playlists", result);
            for playlist in result? {
                println!("{}\t{}\t{} tracks", playlist.id, playlist.name, playlist.tracks.len());
            }
        }
        PlaylistCommand::Create { name } => {
            let result = backend.create_playlist(&name).await;
            log_api_result!("create_playlist", result);
            let playlist = result?;
            println!("Created {} ({})", playlist.name, playlist.id);
        }
        PlaylistCommand::Rename { id, name } => {
            let result = backend.rename_playlist(&id, &name).await;
            log_api_result!("rename_playlist", result);
            println!("Renamed to {}", result?.name);
        }
        PlaylistCommand::Delete { id } => {
            let result = backend.delete_playlist(&id).await;
            log_api_result!("delete_playlist", result);
            result?;
            println!("Deleted {}", id);
        }
    }
    Ok(())
}

async fn run_player(
    config: Config,
    data_dir: PathBuf,
    backend: BackendClient,
    sessions: SessionStore,
    query: Option<String>,
) -> Result<()> {
    let jamendo = JamendoClient::new(&config.catalog)?;
    let user = match auth::restore_session(&backend, &sessions).await {
        Ok(user) => user,
        Err(e) => {
            tracing::warn!(error = %e, "Could not restore session");
            None
        }
    };
    let liked_cache = LikedTracksCache::new(data_dir.join(LIKED_TRACKS_CACHE_FILE));

    let engine = RodioEngine::new(Duration::from_millis(config.player.status_interval_ms))?;
    let player = PlaybackController::start(Arc::new(engine), &config.player);

    let app_model = AppModel::new(jamendo, backend, liked_cache);
    app_model.set_account(user.map(|u| u.username)).await;
    let model = Arc::new(Mutex::new(app_model));
    let controller = AppController::new(model.clone(), player.clone(), config.player.seek_step_ms);

    let res = run_session(model, controller, query).await;

    // The engine is released on every exit path
    player.shutdown().await;

    if let Err(err) = &res {
        tracing::error!(error = ?err, "Application error");
    }
    tracing::info!("jamendo-rs shutting down");
    res
}

async fn run_session(model: Arc<Mutex<AppModel>>, controller: AppController, query: Option<String>) -> Result<()> {
    {
        let model = model.lock().await;
        if !model.jamendo.has_client_id() {
            model
                .set_error("No Jamendo client_id set. Add it to config.toml or set JAMENDO_CLIENT_ID.".to_string())
                .await;
        }
    }

    controller.sync_liked_tracks().await;
    controller.load_user_playlists().await;
    if let Some(query) = query.filter(|q| !q.trim().is_empty()) {
        model.lock().await.update_search_query(query.clone()).await;
        controller.perform_search(&query).await;
    }

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
        let _ = disable_raw_mode();
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, model, controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> Result<()> {
    loop {
        let (ui_state, content_state, should_quit, scrub) = {
            let model_guard = model.lock().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            let scrub = model_guard.scrub.lock().await.clone();
            (
                model_guard.get_ui_state().await,
                model_guard.get_content_state().await,
                model_guard.should_quit().await,
                scrub,
            )
        };
        let playback = controller.player().snapshot().await;

        let mut bar = Rect::default();
        terminal.draw(|f| {
            bar = AppView::render(f, &playback, &scrub, &ui_state, &content_state);
        })?;
        model
            .lock()
            .await
            .set_progress_bar(BarArea {
                x: bar.x,
                y: bar.y,
                width: bar.width,
                height: bar.height,
            })
            .await;

        if should_quit {
            break;
        }

        if event::poll(Duration::from_millis(50))? {
            let handled = match event::read()? {
                Event::Key(key) => controller.handle_key_event(key).await,
                Event::Mouse(mouse) => controller.handle_mouse_event(mouse).await,
                _ => Ok(()),
            };
            if let Err(e) = handled {
                tracing::error!(error = %e, "Event handling failed");
            }
        }
    }

    Ok(())
}
