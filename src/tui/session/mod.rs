//! Per-session interaction state machine.
//!
//! `Session::update` consumes one [`Event`] and returns the side effects the host must
//! perform ([`Effect`]). The session itself never touches the network, the transcript, or
//! timers, so every transition is testable by inspecting the returned effects.

#[cfg(test)]
mod tests;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::layout::Rect;
use ratatui::text::Line;

use crate::core::oracle::OracleError;
use crate::orb::{Scene, Theme, compose};

use super::constants::{FALLBACK_ANSWER, INPUT_CHAR_LIMIT};
use super::input::TextInput;
use super::overlay;
use super::spinner::Spinner;

/// Which overlay the session shows and which keys it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interaction {
    /// Collecting a question.
    #[default]
    Idle,
    /// Waiting for the answer service.
    Thinking,
    /// Showing an answer (or the fallback message) until Enter.
    ShowingAnswer,
}

/// Widest display a session allocates a screen buffer for.
pub const MAX_VIEWPORT_WIDTH: u16 = 500;
/// Tallest display a session allocates a screen buffer for.
pub const MAX_VIEWPORT_HEIGHT: u16 = 200;

/// Display size in character cells, capped at
/// [`MAX_VIEWPORT_WIDTH`] x [`MAX_VIEWPORT_HEIGHT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    /// Size as reported by a terminal or remote client, clamped to the cap.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width.min(MAX_VIEWPORT_WIDTH),
            height: height.min(MAX_VIEWPORT_HEIGHT),
        }
    }

    /// Screen buffer area. Clamped again so a hand-built viewport cannot size the buffer.
    pub fn area(self) -> Rect {
        let Self { width, height } = Self::new(self.width, self.height);
        Rect::new(0, 0, width, height)
    }
}

/// Everything a session reacts to, in arrival order.
#[derive(Debug)]
pub enum Event {
    Resize(Viewport),
    Key(KeyEvent),
    /// Animation clock tick.
    Tick,
    /// Spinner tick for the given spinner run.
    SpinnerTick(u64),
    /// The answer service replied.
    Answer(String),
    /// The answer service call failed.
    AnswerFailed(OracleError),
}

/// Side effects requested by a transition, performed by the host in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver `Event::Tick` after one frame interval.
    ScheduleTick,
    /// Deliver `Event::SpinnerTick(run)` after one spinner interval.
    ScheduleSpinnerTick(u64),
    /// Append the question to the transcript.
    Transcribe(String),
    /// Send the question to the answer service; its completion comes back as an event.
    Ask(String),
    /// End the session.
    Quit,
}

pub struct Session {
    frame: u64,
    viewport: Viewport,
    interaction: Interaction,
    input: TextInput,
    answer: String,
    spinner: Spinner,
    theme: Theme,
}

impl Session {
    /// New idle session. `start_frame` seeds the animation clock so that sessions start at
    /// different points of the color cycle.
    pub fn new(viewport: Viewport, start_frame: u64, theme: Theme) -> Self {
        Self {
            frame: start_frame,
            viewport,
            interaction: Interaction::Idle,
            input: TextInput::new(INPUT_CHAR_LIMIT),
            answer: String::new(),
            spinner: Spinner::default(),
            theme,
        }
    }

    /// Effects to perform when the session starts: arm the animation clock.
    pub fn start(&self) -> Vec<Effect> {
        vec![Effect::ScheduleTick]
    }

    pub fn update(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::Resize(viewport) => {
                self.viewport = viewport;
                vec![]
            }
            Event::Tick => {
                self.frame = self.frame.wrapping_add(1);
                vec![Effect::ScheduleTick]
            }
            Event::SpinnerTick(run) => {
                if self.interaction == Interaction::Thinking && self.spinner.tick(run) {
                    vec![Effect::ScheduleSpinnerTick(run)]
                } else {
                    vec![]
                }
            }
            Event::Key(key) => self.handle_key(key),
            Event::Answer(answer) => {
                if self.interaction != Interaction::Thinking {
                    log::debug!("discarding answer received outside of thinking state");
                    return vec![];
                }
                if answer.is_empty() {
                    log::error!("Error getting answer: {}", OracleError::EmptyWisdom);
                    self.show_answer(FALLBACK_ANSWER.to_string());
                } else {
                    self.show_answer(answer);
                }
                vec![]
            }
            Event::AnswerFailed(err) => {
                if self.interaction != Interaction::Thinking {
                    log::debug!("discarding failure received outside of thinking state: {err}");
                    return vec![];
                }
                log::error!("Error getting answer: {err}");
                self.show_answer(FALLBACK_ANSWER.to_string());
                vec![]
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Effect> {
        if key.kind != KeyEventKind::Press {
            return vec![];
        }
        if is_quit(&key) {
            return vec![Effect::Quit];
        }
        match self.interaction {
            Interaction::Thinking => vec![],
            Interaction::ShowingAnswer => {
                if key.code == KeyCode::Enter {
                    self.answer.clear();
                    self.input.reset();
                    self.input.focus();
                    self.interaction = Interaction::Idle;
                }
                vec![]
            }
            Interaction::Idle => {
                if key.code != KeyCode::Enter {
                    self.input.handle_key(key);
                    return vec![];
                }
                if self.input.value().is_empty() {
                    return vec![];
                }
                let question = self.input.take();
                self.input.blur();
                self.interaction = Interaction::Thinking;
                let run = self.spinner.restart();
                vec![
                    Effect::Transcribe(question.clone()),
                    Effect::Ask(question),
                    Effect::ScheduleSpinnerTick(run),
                ]
            }
        }
    }

    fn show_answer(&mut self, answer: String) {
        self.answer = answer;
        self.input.reset();
        self.interaction = Interaction::ShowingAnswer;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn input(&self) -> &TextInput {
        &self.input
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Render the current frame.
    pub fn view(&self) -> Vec<Line<'static>> {
        let panel = overlay::panel(self);
        compose::render(&Scene {
            width: self.viewport.width,
            frame: self.frame,
            panel: &panel,
            theme: &self.theme,
        })
    }
}

/// Ctrl+C quits from every state.
fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}
