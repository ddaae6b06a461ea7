use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use reqwest::StatusCode;

use super::*;
use crate::orb::compose::{FOOTER_ROWS, HEADER_ROWS, OrbLayout};
use crate::tui::constants::FALLBACK_ANSWER;

fn session() -> Session {
    Session::new(Viewport::new(80, 40), 0, Theme::default())
}

fn key(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

fn ctrl_c() -> Event {
    Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
}

fn type_text(session: &mut Session, text: &str) {
    for c in text.chars() {
        assert!(session.update(key(KeyCode::Char(c))).is_empty());
    }
}

/// Type and submit `question`, returning the submission effects.
fn ask(session: &mut Session, question: &str) -> Vec<Effect> {
    type_text(session, question);
    session.update(key(KeyCode::Enter))
}

#[test]
fn starts_idle_with_focused_empty_input() {
    let s = session();
    assert_eq!(s.interaction(), Interaction::Idle);
    assert_eq!(s.input().value(), "");
    assert!(s.input().is_focused());
    assert_eq!(s.start(), vec![Effect::ScheduleTick]);
}

#[test]
fn empty_enter_does_nothing() {
    let mut s = session();
    assert!(s.update(key(KeyCode::Enter)).is_empty());
    assert_eq!(s.interaction(), Interaction::Idle);
}

#[test]
fn whitespace_question_is_still_a_question() {
    let mut s = session();
    let effects = ask(&mut s, "   ");
    assert_eq!(s.interaction(), Interaction::Thinking);
    assert_eq!(effects[0], Effect::Transcribe("   ".to_string()));
    assert_eq!(effects[1], Effect::Ask("   ".to_string()));
}

#[test]
fn submitting_a_question_starts_thinking() {
    let mut s = session();
    let effects = ask(&mut s, "why?");
    assert_eq!(s.interaction(), Interaction::Thinking);
    assert_eq!(
        effects,
        vec![
            Effect::Transcribe("why?".to_string()),
            Effect::Ask("why?".to_string()),
            Effect::ScheduleSpinnerTick(1),
        ]
    );
    assert_eq!(s.input().value(), "");
    assert!(!s.input().is_focused());
}

#[test]
fn keys_are_ignored_while_thinking() {
    let mut s = session();
    ask(&mut s, "why?");
    assert!(s.update(key(KeyCode::Char('x'))).is_empty());
    assert!(s.update(key(KeyCode::Enter)).is_empty());
    assert_eq!(s.interaction(), Interaction::Thinking);
    assert_eq!(s.input().value(), "");
}

#[test]
fn answer_is_shown() {
    let mut s = session();
    ask(&mut s, "why?");
    assert!(s.update(Event::Answer("Look within.".to_string())).is_empty());
    assert_eq!(s.interaction(), Interaction::ShowingAnswer);
    assert_eq!(s.answer(), "Look within.");
}

#[test]
fn failure_shows_fallback() {
    let mut s = session();
    ask(&mut s, "why?");
    s.update(Event::AnswerFailed(OracleError::Status(
        StatusCode::INTERNAL_SERVER_ERROR,
    )));
    assert_eq!(s.interaction(), Interaction::ShowingAnswer);
    assert_eq!(s.answer(), FALLBACK_ANSWER);
}

#[test]
fn empty_answer_shows_fallback() {
    let mut s = session();
    ask(&mut s, "why?");
    s.update(Event::Answer(String::new()));
    assert_eq!(s.answer(), FALLBACK_ANSWER);
}

#[test]
fn whitespace_answer_is_shown_as_is() {
    let mut s = session();
    ask(&mut s, "why?");
    s.update(Event::Answer("  ".to_string()));
    assert_eq!(s.interaction(), Interaction::ShowingAnswer);
    assert_eq!(s.answer(), "  ");
}

#[test]
fn enter_dismisses_answer() {
    let mut s = session();
    ask(&mut s, "why?");
    s.update(Event::Answer("Look within.".to_string()));

    // typing does not edit the hidden input while an answer is shown
    s.update(key(KeyCode::Char('x')));
    assert!(s.update(key(KeyCode::Enter)).is_empty());

    assert_eq!(s.interaction(), Interaction::Idle);
    assert_eq!(s.answer(), "");
    assert_eq!(s.input().value(), "");
    assert!(s.input().is_focused());
}

#[test]
fn second_question_restarts_spinner_run() {
    let mut s = session();
    ask(&mut s, "one");
    s.update(Event::Answer("a".to_string()));
    s.update(key(KeyCode::Enter));
    let effects = ask(&mut s, "two");
    assert_eq!(effects.last(), Some(&Effect::ScheduleSpinnerTick(2)));
}

#[test]
fn late_completions_are_ignored() {
    let mut s = session();
    assert!(s.update(Event::Answer("stray".to_string())).is_empty());
    assert_eq!(s.interaction(), Interaction::Idle);

    ask(&mut s, "why?");
    s.update(Event::Answer("first".to_string()));
    s.update(Event::AnswerFailed(OracleError::EmptyWisdom));
    assert_eq!(s.answer(), "first");
}

#[test]
fn tick_advances_frame_and_reschedules() {
    let mut s = Session::new(Viewport::new(80, 40), 7, Theme::default());
    assert_eq!(s.update(Event::Tick), vec![Effect::ScheduleTick]);
    assert_eq!(s.frame(), 8);

    ask(&mut s, "why?");
    assert_eq!(s.update(Event::Tick), vec![Effect::ScheduleTick]);
    assert_eq!(s.frame(), 9);
}

#[test]
fn spinner_ticks_only_while_thinking() {
    let mut s = session();
    assert!(s.update(Event::SpinnerTick(0)).is_empty());

    ask(&mut s, "why?");
    let before = s.spinner().glyph();
    assert_eq!(
        s.update(Event::SpinnerTick(1)),
        vec![Effect::ScheduleSpinnerTick(1)]
    );
    assert_ne!(s.spinner().glyph(), before);

    // stale run
    assert!(s.update(Event::SpinnerTick(0)).is_empty());

    s.update(Event::Answer("done".to_string()));
    assert!(s.update(Event::SpinnerTick(1)).is_empty());
}

#[test]
fn ctrl_c_quits_from_every_state() {
    let mut s = session();
    assert_eq!(s.update(ctrl_c()), vec![Effect::Quit]);

    ask(&mut s, "why?");
    assert_eq!(s.update(ctrl_c()), vec![Effect::Quit]);

    s.update(Event::Answer("ok".to_string()));
    assert_eq!(s.update(ctrl_c()), vec![Effect::Quit]);
}

#[test]
fn key_releases_are_ignored() {
    let mut s = session();
    let mut release = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
    release.kind = KeyEventKind::Release;
    s.update(Event::Key(release));
    assert_eq!(s.input().value(), "");
}

#[test]
fn resize_applies_in_any_state() {
    let mut s = session();
    ask(&mut s, "why?");
    assert!(s.update(Event::Resize(Viewport::new(120, 50))).is_empty());
    assert_eq!(s.viewport(), Viewport::new(120, 50));
    assert_eq!(s.interaction(), Interaction::Thinking);
}

#[test]
fn view_matches_layout_for_every_state() {
    let mut s = session();
    let expected = |s: &Session| {
        HEADER_ROWS + OrbLayout::for_width(s.viewport().width).visible_height + FOOTER_ROWS
    };
    assert_eq!(s.view().len(), expected(&s));

    ask(&mut s, "why?");
    assert_eq!(s.view().len(), expected(&s));

    s.update(Event::Resize(Viewport::new(0, 0)));
    s.update(Event::Answer("A long answer that wraps over several rows of the orb.".into()));
    let lines = s.view();
    assert_eq!(lines.len(), expected(&s));
    let text: String = lines
        .iter()
        .flat_map(|l| l.spans.iter().map(|s| s.content.as_ref()))
        .collect();
    assert!(text.contains("Ask another question [enter]"));
}

#[test]
fn oversized_viewport_is_clamped() {
    let viewport = Viewport::new(u16::MAX, u16::MAX);
    assert_eq!(viewport, Viewport::new(MAX_VIEWPORT_WIDTH, MAX_VIEWPORT_HEIGHT));

    let raw = Viewport {
        width: u16::MAX,
        height: u16::MAX,
    };
    let area = raw.area();
    assert_eq!((area.width, area.height), (MAX_VIEWPORT_WIDTH, MAX_VIEWPORT_HEIGHT));

    let mut s = session();
    s.update(Event::Resize(Viewport::new(u16::MAX, 300)));
    assert_eq!(s.viewport(), Viewport::new(500, 200));
}
