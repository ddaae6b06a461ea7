//! Terminal UI: the orb session state machine, its overlay, and the local terminal host.

pub(crate) mod constants;
mod draw;
mod input;
mod overlay;
pub mod runner;
pub mod session;
mod spinner;

pub use runner::{Services, SessionRunner};
pub use session::{Event, Session, Viewport};

use std::io;

use crossterm::event::{Event as TermEvent, EventStream};
use crossterm::execute;
use futures::StreamExt;
use rand::Rng;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::config::Config;
use crate::orb::{ColorProfile, HUE_PERIOD_FRAMES, Theme};

/// Guard that restores terminal state on drop (including on panic).
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        use crossterm::cursor::Hide;
        use crossterm::terminal::{EnterAlternateScreen, enable_raw_mode};

        enable_raw_mode()?;
        let guard = Self;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        use crossterm::cursor::Show;
        use crossterm::terminal::{LeaveAlternateScreen, disable_raw_mode};
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = disable_raw_mode();
    }
}

/// Starting frame for a new session: pinned by config, otherwise random within one
/// color cycle.
pub(crate) fn pick_start_frame(config: &Config) -> u64 {
    config
        .start_frame
        .unwrap_or_else(|| rand::thread_rng().gen_range(0..HUE_PERIOD_FRAMES))
}

/// Run one session on the controlling terminal until the user quits.
pub async fn run(config: &Config, services: Services) -> io::Result<()> {
    let (width, height) = crossterm::terminal::size()?;
    let profile = config.color.unwrap_or_else(ColorProfile::detect);
    let start_frame = pick_start_frame(config);
    log::info!("Local session {width}x{height}, {profile:?}, start frame {start_frame}");

    let session = Session::new(Viewport::new(width, height), start_frame, Theme::new(profile));

    let _guard = TerminalGuard::enter()?;
    let runner = SessionRunner::new(io::stdout(), session, services)?;
    let input = tokio::spawn(forward_terminal_events(
        runner.sender(),
        runner.cancel_token(),
    ));
    let result = runner.run().await;
    input.abort();
    result
}

/// Forward key and resize events from the terminal into the session.
/// Ends the session when the terminal stops delivering input.
async fn forward_terminal_events(tx: mpsc::Sender<Event>, cancel: CancellationToken) {
    let mut events = EventStream::new();
    loop {
        let next = tokio::select! {
            _ = cancel.cancelled() => break,
            next = events.next() => next,
        };
        let event = match next {
            Some(Ok(TermEvent::Key(key))) => Event::Key(key),
            Some(Ok(TermEvent::Resize(width, height))) => {
                Event::Resize(Viewport::new(width, height))
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                log::error!("Terminal input failed: {e}");
                cancel.cancel();
                break;
            }
            None => {
                cancel.cancel();
                break;
            }
        };
        if tx.send(event).await.is_err() {
            break;
        }
    }
}
