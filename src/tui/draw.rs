//! Frame rendering: the composed orb scene as a single paragraph.

use ratatui::Frame;
use ratatui::text::Text;
use ratatui::widgets::Paragraph;

use super::session::Session;

pub(super) fn draw(f: &mut Frame, session: &Session) {
    let text = Text::from(session.view());
    f.render_widget(Paragraph::new(text), f.area());
}
