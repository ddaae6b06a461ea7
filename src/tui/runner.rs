//! Drives one session: feeds events into the state machine, performs the effects it
//! returns, and redraws after every event.
//!
//! The same runner serves the local terminal and each remote connection; only the writer
//! behind the terminal backend and the source of input events differ.

use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use ratatui::backend::CrosstermBackend;
use ratatui::{Terminal, TerminalOptions};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::core::oracle::Oracle;
use crate::core::transcript::Transcript;

use super::constants::{EVENT_CHANNEL_CAPACITY, SPINNER_INTERVAL, TICK_INTERVAL};
use super::draw::draw;
use super::session::{Effect, Event, Session};

/// Process-wide collaborators shared by every session.
#[derive(Clone)]
pub struct Services {
    pub oracle: Arc<Oracle>,
    pub transcript: Arc<Transcript>,
}

/// Result of applying effects: continue the loop or exit.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum HandleResult {
    Continue,
    Break,
}

pub struct SessionRunner<W: Write> {
    session: Session,
    terminal: Terminal<CrosstermBackend<W>>,
    services: Services,
    events_tx: mpsc::Sender<Event>,
    events_rx: mpsc::Receiver<Event>,
    cancel: CancellationToken,
}

impl<W: Write> SessionRunner<W> {
    /// Bind a session to a writer. The terminal viewport starts at the session's size.
    pub fn new(writer: W, session: Session, services: Services) -> io::Result<Self> {
        let terminal = Terminal::with_options(
            CrosstermBackend::new(writer),
            TerminalOptions {
                viewport: ratatui::Viewport::Fixed(session.viewport().area()),
            },
        )?;
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            session,
            terminal,
            services,
            events_tx,
            events_rx,
            cancel: CancellationToken::new(),
        })
    }

    /// Sender for input events (keys, resizes) coming from the session's transport.
    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.events_tx.clone()
    }

    /// Cancelled when the session ends; cancel it to end the session from outside.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run until the user quits or the token is cancelled. Timers and in-flight
    /// questions are abandoned on exit.
    pub async fn run(mut self) -> io::Result<()> {
        let _guard = self.cancel.clone().drop_guard();

        let effects = self.session.start();
        self.apply(effects);
        self.terminal.draw(|f| draw(f, &self.session))?;

        loop {
            let event = tokio::select! {
                _ = self.cancel.cancelled() => break,
                event = self.events_rx.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            if let Event::Resize(viewport) = &event {
                self.terminal.resize(viewport.area())?;
            }
            let effects = self.session.update(event);
            if self.apply(effects) == HandleResult::Break {
                break;
            }
            self.terminal.draw(|f| draw(f, &self.session))?;
        }
        Ok(())
    }

    /// Perform effects in order. Stops at `Quit`.
    fn apply(&self, effects: Vec<Effect>) -> HandleResult {
        for effect in effects {
            match effect {
                Effect::ScheduleTick => self.schedule(TICK_INTERVAL, Event::Tick),
                Effect::ScheduleSpinnerTick(run) => {
                    self.schedule(SPINNER_INTERVAL, Event::SpinnerTick(run))
                }
                Effect::Transcribe(question) => {
                    let transcript = Arc::clone(&self.services.transcript);
                    // file io stays off the runtime workers
                    tokio::task::spawn_blocking(move || {
                        if let Err(e) = transcript.append(&question) {
                            log::warn!(
                                "Failed to write transcript {}: {}",
                                transcript.path().display(),
                                e
                            );
                        }
                    });
                }
                Effect::Ask(question) => self.spawn_ask(question),
                Effect::Quit => return HandleResult::Break,
            }
        }
        HandleResult::Continue
    }

    /// Deliver `event` after `delay`, unless the session ends first.
    fn schedule(&self, delay: Duration, event: Event) {
        let tx = self.events_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _ = tx.send(event).await;
                }
            }
        });
    }

    fn spawn_ask(&self, question: String) {
        let tx = self.events_tx.clone();
        let cancel = self.cancel.clone();
        let oracle = Arc::clone(&self.services.oracle);
        log::info!("Asking {}", oracle.endpoint());
        tokio::spawn(async move {
            let event = tokio::select! {
                _ = cancel.cancelled() => return,
                result = oracle.ask(&question) => match result {
                    Ok(answer) => Event::Answer(answer),
                    Err(e) => Event::AnswerFailed(e),
                },
            };
            let _ = tx.send(event).await;
        });
    }
}
