//! Overlay panel for each interaction state: question box, spinner, or answer.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::orb::compose::OrbLayout;
use crate::orb::{Panel, Theme};

use super::constants::{ANSWER_HINT, CURSOR_BLINK_FRAMES, PROMPT, THINKING_LABEL};
use super::input::TextInput;
use super::session::{Interaction, Session};
use super::spinner::Spinner;

/// Horizontal padding around text inside the panel.
const PAD_X: usize = 2;
/// Horizontal padding inside the input box.
const INPUT_PAD_X: usize = 3;
/// Orb columns kept visible beside a wrapped answer.
const ANSWER_MARGIN: usize = 8;

/// Panel for the session's current state.
pub(super) fn panel(session: &Session) -> Panel {
    let layout = OrbLayout::for_width(session.viewport().width);
    let theme = session.theme();
    match session.interaction() {
        Interaction::Idle => question_panel(session.input(), layout.width, session.frame(), theme),
        Interaction::Thinking => thinking_panel(session.spinner(), theme),
        Interaction::ShowingAnswer => answer_panel(session.answer(), layout.width, theme),
    }
}

fn question_panel(input: &TextInput, orb_width: usize, frame: u64, theme: &Theme) -> Panel {
    let text = theme.color(theme.text);
    let background = theme.color(theme.input_background);

    let prompt = vec![Line::from(Span::styled(
        format!(" {PROMPT} "),
        Style::default().fg(text),
    ))];

    let field_width = orb_width / 2;
    let box_width = field_width + 2 * INPUT_PAD_X;
    let box_style = Style::default().fg(text).bg(background);
    let blank = || Line::from(Span::styled(" ".repeat(box_width), box_style));

    let (visible, cursor_col) = input.window(field_width);
    let cursor_on = input.is_focused() && (frame / CURSOR_BLINK_FRAMES) % 2 == 0;

    let mut field = vec![Span::styled(" ".repeat(INPUT_PAD_X), box_style)];
    let before: String = visible.chars().take(cursor_col).collect();
    let under = visible.chars().nth(cursor_col);
    let after: String = visible.chars().skip(cursor_col + 1).collect();
    field.push(Span::styled(before, box_style));
    if field_width > 0 {
        let cursor_style = if cursor_on {
            box_style.add_modifier(Modifier::REVERSED)
        } else {
            box_style
        };
        field.push(Span::styled(under.unwrap_or(' ').to_string(), cursor_style));
    }
    field.push(Span::styled(after, box_style));
    let used = visible.chars().count().max(cursor_col + 1).min(field_width);
    field.push(Span::styled(
        " ".repeat(field_width - used + INPUT_PAD_X),
        box_style,
    ));

    let input_box = vec![blank(), Line::from(field), blank()];
    Panel::new(center_blocks(vec![prompt, input_box]))
}

fn thinking_panel(spinner: &Spinner, theme: &Theme) -> Panel {
    let pad = " ".repeat(PAD_X);
    Panel::new(vec![
        Line::default(),
        Line::from(vec![
            Span::raw(pad.clone()),
            Span::styled(spinner.glyph(), Style::default().fg(theme.spinner)),
            Span::raw(THINKING_LABEL),
            Span::raw(pad),
        ]),
        Line::default(),
    ])
}

fn answer_panel(answer: &str, orb_width: usize, theme: &Theme) -> Panel {
    let pad = " ".repeat(PAD_X);
    let wrap_width = orb_width.saturating_sub(ANSWER_MARGIN + 2 * PAD_X).max(1);

    let mut answer_block = vec![Line::default()];
    answer_block.extend(
        textwrap::wrap(answer, wrap_width)
            .into_iter()
            .map(|row| Line::from(format!("{pad}{row}{pad}"))),
    );
    answer_block.push(Line::default());

    let hint = vec![Line::from(Span::styled(
        format!("{pad}{ANSWER_HINT}{pad}"),
        Style::default().fg(theme.hint),
    ))];

    Panel::new(center_blocks(vec![answer_block, hint]))
}

/// Stack blocks vertically, centering each block on the widest one.
fn center_blocks(blocks: Vec<Vec<Line<'static>>>) -> Vec<Line<'static>> {
    let block_width =
        |block: &[Line<'static>]| block.iter().map(Line::width).max().unwrap_or(0);
    let width = blocks.iter().map(|b| block_width(b)).max().unwrap_or(0);
    blocks
        .into_iter()
        .flat_map(|block| {
            let indent = (width - block_width(&block)) / 2;
            block.into_iter().map(move |line| {
                if indent == 0 {
                    return line;
                }
                let mut spans = vec![Span::raw(" ".repeat(indent))];
                spans.extend(line.spans);
                Line::from(spans).style(line.style)
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::constants::SPINNER_FRAMES;

    fn text_of(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn typed(text: &str) -> TextInput {
        let mut input = TextInput::new(200);
        for c in text.chars() {
            input.insert(c);
        }
        input
    }

    #[test]
    fn question_panel_has_prompt_and_box() {
        let theme = Theme::default();
        let panel = question_panel(&typed("why?"), 80, 0, &theme);
        assert_eq!(panel.height(), 4);
        // box: 40-cell field plus 3 cells of padding each side
        assert_eq!(panel.width(), 46);
        assert!(text_of(&panel.lines()[0]).contains(PROMPT));
        assert!(text_of(&panel.lines()[2]).contains("why?"));
        assert!(panel.lines().iter().all(|l| l.width() == 46));
    }

    #[test]
    fn question_panel_cursor_blinks() {
        let theme = Theme::default();
        let input = typed("hi");
        let reversed = |panel: &Panel| {
            panel.lines()[2]
                .spans
                .iter()
                .any(|s| s.style.add_modifier.contains(Modifier::REVERSED))
        };
        assert!(reversed(&question_panel(&input, 80, 0, &theme)));
        assert!(!reversed(&question_panel(&input, 80, CURSOR_BLINK_FRAMES, &theme)));
    }

    #[test]
    fn long_question_scrolls_inside_box() {
        let theme = Theme::default();
        let input = typed(&"a".repeat(150));
        let panel = question_panel(&input, 60, 0, &theme);
        assert!(panel.lines().iter().all(|l| l.width() == panel.width()));
        assert_eq!(panel.width(), 36);
    }

    #[test]
    fn thinking_panel_shows_spinner() {
        let theme = Theme::default();
        let panel = thinking_panel(&Spinner::default(), &theme);
        assert_eq!(panel.height(), 3);
        let body = text_of(&panel.lines()[1]);
        assert!(body.starts_with(&format!("  {}", SPINNER_FRAMES[0])));
        assert!(body.contains("consulting the cosmos..."));
    }

    #[test]
    fn answer_panel_wraps_and_adds_hint() {
        let theme = Theme::default();
        let answer = "The river does not hurry, yet it reaches the sea. Walk as the river walks.";
        let panel = answer_panel(answer, 60, &theme);
        assert!(panel.width() <= 60);
        assert!(panel.height() > 4);
        let last = text_of(&panel.lines()[panel.height() - 1]);
        assert!(last.contains(ANSWER_HINT));
    }

    #[test]
    fn short_answer_is_centered_over_hint() {
        let theme = Theme::default();
        let panel = answer_panel("Yes.", 80, &theme);
        // hint is the widest block: "  Ask another question [enter]  " = 32 cells
        assert_eq!(panel.width(), 32);
        let line = text_of(&panel.lines()[1]);
        assert_eq!(line.trim(), "Yes.");
        assert!(line.starts_with(&" ".repeat(12)));
    }
}
