//! rodio-backed [`AudioEngine`]
//!
//! rodio's output stream is not `Send`, so it lives on a dedicated
//! `audio-engine` thread. The async side fetches audio bytes, then hands
//! commands to that thread and waits for the reply. While a source plays the
//! thread reports its position every status interval, and reports completion
//! exactly once when the sink runs dry.

use std::io::Cursor;
use std::sync::mpsc::{self as std_mpsc, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tokio::sync::{mpsc, oneshot};

use crate::player::{AudioEngine, EngineError, EngineStatus, SourceToken};

type Reply = oneshot::Sender<Result<(), EngineError>>;
type StatusSender = Arc<Mutex<Option<mpsc::UnboundedSender<EngineStatus>>>>;

enum Command {
    Load {
        bytes: Option<Vec<u8>>,
        token: SourceToken,
        reply: Reply,
    },
    Play(Reply),
    Pause(Reply),
    Seek(Duration, Reply),
    Shutdown,
}

pub struct RodioEngine {
    http: reqwest::Client,
    commands: Mutex<Option<std_mpsc::Sender<Command>>>,
    status: StatusSender,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl RodioEngine {
    /// Open the default output device and start the engine thread.
    pub fn new(status_interval: Duration) -> Result<Self, EngineError> {
        let (command_tx, command_rx) = std_mpsc::channel();
        let (init_tx, init_rx) = std_mpsc::sync_channel(1);
        let status: StatusSender = Arc::new(Mutex::new(None));

        let thread_status = status.clone();
        let thread = std::thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(output) => output,
                    Err(e) => {
                        let _ = init_tx.send(Err(EngineError::Output(e.to_string())));
                        return;
                    }
                };
                let _ = init_tx.send(Ok(()));

                let mut worker = EngineThread::new(handle, thread_status);
                worker.run(command_rx, status_interval);
            })
            .map_err(|e| EngineError::Output(e.to_string()))?;

        init_rx
            .recv()
            .map_err(|_| EngineError::Output("audio thread exited during startup".to_string()))??;

        tracing::info!(interval_ms = status_interval.as_millis() as u64, "Audio output opened");
        Ok(Self {
            http: reqwest::Client::new(),
            commands: Mutex::new(Some(command_tx)),
            status,
            thread: Mutex::new(Some(thread)),
        })
    }

    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, EngineError> {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            let response = self
                .http
                .get(uri)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| EngineError::Fetch(e.to_string()))?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| EngineError::Fetch(e.to_string()))?;
            Ok(bytes.to_vec())
        } else {
            tokio::fs::read(uri)
                .await
                .map_err(|e| EngineError::Fetch(format!("{}: {}", uri, e)))
        }
    }

    async fn request(&self, build: impl FnOnce(Reply) -> Command) -> Result<(), EngineError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        {
            let commands = self.commands.lock().map_err(|_| EngineError::Released)?;
            let sender = commands.as_ref().ok_or(EngineError::Released)?;
            sender.send(build(reply_tx)).map_err(|_| EngineError::Released)?;
        }
        reply_rx.await.map_err(|_| EngineError::Released)?
    }
}

#[async_trait]
impl AudioEngine for RodioEngine {
    async fn load(&self, source: Option<&str>, token: SourceToken) -> Result<(), EngineError> {
        let bytes = match source {
            Some(uri) => {
                tracing::debug!(uri, "Fetching audio");
                let bytes = self.fetch(uri).await?;
                tracing::debug!(uri, bytes = bytes.len(), "Audio fetched");
                Some(bytes)
            }
            None => None,
        };
        self.request(|reply| Command::Load { bytes, token, reply }).await
    }

    async fn play(&self) -> Result<(), EngineError> {
        self.request(Command::Play).await
    }

    async fn pause(&self) -> Result<(), EngineError> {
        self.request(Command::Pause).await
    }

    async fn seek(&self, position: Duration) -> Result<(), EngineError> {
        self.request(|reply| Command::Seek(position, reply)).await
    }

    fn status_events(&self) -> mpsc::UnboundedReceiver<EngineStatus> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut status) = self.status.lock() {
            *status = Some(tx);
        }
        rx
    }

    async fn release(&self) -> Result<(), EngineError> {
        let sender = self.commands.lock().map_err(|_| EngineError::Released)?.take();
        let Some(sender) = sender else {
            return Ok(());
        };
        let _ = sender.send(Command::Shutdown);

        let thread = self.thread.lock().map_err(|_| EngineError::Released)?.take();
        if let Some(thread) = thread {
            tokio::task::spawn_blocking(move || thread.join())
                .await
                .map_err(|e| EngineError::Output(e.to_string()))?
                .map_err(|_| EngineError::Output("audio thread panicked".to_string()))?;
        }
        Ok(())
    }
}

impl Drop for RodioEngine {
    fn drop(&mut self) {
        if let Ok(mut commands) = self.commands.lock() {
            if let Some(sender) = commands.take() {
                let _ = sender.send(Command::Shutdown);
            }
        }
    }
}

struct EngineThread {
    handle: OutputStreamHandle,
    status: StatusSender,
    sink: Option<Sink>,
    token: SourceToken,
    duration: Option<Duration>,
    finish_reported: bool,
}

impl EngineThread {
    fn new(handle: OutputStreamHandle, status: StatusSender) -> Self {
        Self {
            handle,
            status,
            sink: None,
            token: SourceToken::default(),
            duration: None,
            finish_reported: false,
        }
    }

    fn run(&mut self, commands: std_mpsc::Receiver<Command>, interval: Duration) {
        loop {
            match commands.recv_timeout(interval) {
                Ok(Command::Shutdown) => break,
                Ok(command) => self.handle_command(command),
                Err(RecvTimeoutError::Timeout) => self.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        tracing::debug!("Audio engine thread stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Load { bytes, token, reply } => {
                let _ = reply.send(self.load(bytes, token));
            }
            Command::Play(reply) => {
                if let Some(sink) = &self.sink {
                    sink.play();
                    self.report(false);
                }
                let _ = reply.send(Ok(()));
            }
            Command::Pause(reply) => {
                if let Some(sink) = &self.sink {
                    sink.pause();
                    self.report(false);
                }
                let _ = reply.send(Ok(()));
            }
            Command::Seek(position, reply) => {
                let result = match &self.sink {
                    Some(sink) => sink
                        .try_seek(position)
                        .map_err(|e| EngineError::Seek(e.to_string())),
                    None => Ok(()),
                };
                if result.is_ok() && self.sink.is_some() {
                    self.finish_reported = false;
                    self.report(false);
                }
                let _ = reply.send(result);
            }
            Command::Shutdown => {}
        }
    }

    fn load(&mut self, bytes: Option<Vec<u8>>, token: SourceToken) -> Result<(), EngineError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        self.token = token;
        self.duration = None;
        self.finish_reported = false;

        let Some(bytes) = bytes else {
            return Ok(());
        };

        let source = Decoder::new(Cursor::new(bytes)).map_err(|e| EngineError::Decode(e.to_string()))?;
        self.duration = source.total_duration();

        let sink = Sink::try_new(&self.handle).map_err(|e| EngineError::Output(e.to_string()))?;
        sink.pause();
        sink.append(source);
        self.sink = Some(sink);
        Ok(())
    }

    fn tick(&mut self) {
        let Some(sink) = &self.sink else {
            return;
        };

        if sink.empty() {
            if !self.finish_reported {
                self.finish_reported = true;
                self.report(true);
            }
        } else if !sink.is_paused() {
            self.report(false);
        }
    }

    fn report(&self, finished: bool) {
        let Some(sink) = &self.sink else {
            return;
        };

        let position = match (finished, self.duration) {
            (true, Some(duration)) => duration,
            _ => sink.get_pos(),
        };
        let status = EngineStatus {
            source: self.token,
            playing: !finished && !sink.is_paused() && !sink.empty(),
            position,
            duration: self.duration,
            did_just_finish: finished,
        };

        if let Ok(sender) = self.status.lock() {
            if let Some(sender) = sender.as_ref() {
                let _ = sender.send(status);
            }
        }
    }
}
