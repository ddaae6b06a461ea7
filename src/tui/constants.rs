//! TUI constants: timing, labels, and limits.

use std::time::Duration;

/// Animation frame interval (20 fps).
pub(crate) const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Spinner frame interval while waiting for an answer.
pub(crate) const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Shown in place of an answer whenever the answer service fails.
pub(crate) const FALLBACK_ANSWER: &str = "The cosmos is silent. Your question remains unanswered.";

pub(super) const PROMPT: &str = "What is the knowledge you seek?";

pub(super) const THINKING_LABEL: &str = " consulting the cosmos...";

pub(super) const ANSWER_HINT: &str = "Ask another question [enter]";

/// Maximum characters accepted by the question input.
pub(super) const INPUT_CHAR_LIMIT: usize = 200;

/// Frames per half blink of the input cursor.
pub(super) const CURSOR_BLINK_FRAMES: u64 = 10;

/// Spinner frames (dot pattern, 8 frames, trailing gap included).
pub(super) const SPINNER_FRAMES: &[&str] = &["⣾ ", "⣽ ", "⣻ ", "⢿ ", "⡿ ", "⣟ ", "⣯ ", "⣷ "];

/// Pending events buffered per session.
pub(crate) const EVENT_CHANNEL_CAPACITY: usize = 256;
