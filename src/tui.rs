//! Terminal lifecycle and the async event loop.

use crate::app::{App, Command};
use crate::entry::WeatherSnapshot;
use crate::error::LookupError;
use crate::store::EntryStore;
use crate::ui;
use crate::weather::WeatherClient;
use chrono::Local;
use color_eyre::Result;
use crossterm::{
    event::{Event, EventStream, KeyEvent, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout};
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

enum AppMessage {
    Key(KeyEvent),
    Resize,
    InputClosed,
    Weather {
        request: u64,
        result: Result<WeatherSnapshot, LookupError>,
    },
}

/// Raw-mode alternate screen, restored on drop.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl Tui {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        stdout().execute(EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout());
        let terminal = Terminal::new(backend)?;

        Ok(Tui { terminal })
    }

    fn draw<S: EntryStore>(&mut self, app: &App<S>) -> Result<()> {
        self.terminal.draw(|frame| ui::draw(frame, app))?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to leave raw mode: {e}");
        }
        if let Err(e) = stdout().execute(LeaveAlternateScreen) {
            warn!("Failed to leave alternate screen: {e}");
        }
        let _ = self.terminal.show_cursor();
    }
}

/// Runs the dashboard until the user quits.
///
/// One loop owns `app`. Key presses arrive from a reader task and finished
/// weather lookups from their own tasks, all over one channel; the loop also
/// wakes for the search debounce and status expiry deadlines.
pub async fn run<S: EntryStore>(app: &mut App<S>, weather: WeatherClient) -> Result<()> {
    let mut tui = Tui::new()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<AppMessage>();
    spawn_event_reader(tx.clone());

    loop {
        tui.draw(app)?;

        let deadline = app.next_deadline();
        let message = tokio::select! {
            message = rx.recv() => message,
            _ = wait_until(deadline) => None,
        };

        app.set_today(Local::now().date_naive());
        let now = Instant::now();
        match message {
            Some(AppMessage::Key(key)) => match app.handle_key(key, now) {
                Some(Command::Quit) => break,
                Some(Command::FetchWeather { request, city }) => {
                    spawn_weather_fetch(&weather, request, city, &tx);
                }
                None => {}
            },
            Some(AppMessage::Weather { request, result }) => app.weather_result(request, result),
            Some(AppMessage::InputClosed) => {
                warn!("Terminal input closed");
                break;
            }
            Some(AppMessage::Resize) | None => {}
        }
        app.tick(now);
    }

    info!("Closing journal");
    Ok(())
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
        None => std::future::pending().await,
    }
}

fn spawn_event_reader(tx: mpsc::UnboundedSender<AppMessage>) {
    tokio::spawn(async move {
        let mut reader = EventStream::new();
        loop {
            let message = match reader.next().await {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => AppMessage::Key(key),
                Some(Ok(Event::Resize(..))) => AppMessage::Resize,
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    warn!("Failed to read terminal event: {e}");
                    AppMessage::InputClosed
                }
                None => AppMessage::InputClosed,
            };
            let closed = matches!(message, AppMessage::InputClosed);
            if tx.send(message).is_err() || closed {
                break;
            }
        }
    });
}

fn spawn_weather_fetch(
    client: &WeatherClient,
    request: u64,
    city: String,
    tx: &mpsc::UnboundedSender<AppMessage>,
) {
    let client = client.clone();
    let tx = tx.clone();
    tokio::spawn(async move {
        debug!(request, %city, "Fetching weather");
        let result = client.fetch(&city).await;
        let _ = tx.send(AppMessage::Weather { request, result });
    });
}
