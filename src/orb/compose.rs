//! Compositor: header banner, orb rows with the overlay panel spliced in, footer.
//!
//! Everything here is a pure function of its inputs; a frame is rebuilt from scratch on
//! every draw.

use std::borrow::Cow;

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::field::{self, OrbGeometry, Pixel};
use super::palette::PaletteSet;
use super::theme::Theme;

/// Block-letter title shown above the orb.
const BANNER: [&str; 6] = [
    "██████╗  ██████╗ ███╗   ██╗██████╗ ███████╗██████╗ ",
    "██╔══██╗██╔═══██╗████╗  ██║██╔══██╗██╔════╝██╔══██╗",
    "██████╔╝██║   ██║██╔██╗ ██║██║  ██║█████╗  ██████╔╝",
    "██╔═══╝ ██║   ██║██║╚██╗██║██║  ██║██╔══╝  ██╔══██╗",
    "██║     ╚██████╔╝██║ ╚████║██████╔╝███████╗██║  ██║",
    "╚═╝      ╚═════╝ ╚═╝  ╚═══╝╚═════╝ ╚══════╝╚═╝  ╚═╝",
];

/// Rows taken by the header: the banner plus one blank row above and below.
pub const HEADER_ROWS: usize = BANNER.len() + 2;

/// Rows taken by the footer: a blank separator and the quit hint.
pub const FOOTER_ROWS: usize = 2;

/// Width used before the terminal has reported its size.
pub const DEFAULT_WIDTH: u16 = 60;

/// Widest orb drawn, however wide the terminal.
pub const MAX_WIDTH: u16 = 98;

const FOOTER_HINT: &str = "Press Ctrl+C to quit.";
const GLYPH: &str = "█";
/// Share of the sphere drawn; the lower part falls below the horizon.
const VISIBLE_FRACTION: f64 = 0.6;
/// Rows the panel sits below the exact vertical center.
const PANEL_NUDGE: i64 = 3;

/// Width the frame is laid out for.
pub fn effective_width(width: u16) -> u16 {
    match width {
        0 => DEFAULT_WIDTH,
        w => w.min(MAX_WIDTH),
    }
}

/// Layout quantities, all derived from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbLayout {
    pub width: usize,
    pub geometry: OrbGeometry,
    pub visible_height: usize,
}

impl OrbLayout {
    pub fn for_width(width: u16) -> Self {
        let width = usize::from(effective_width(width));
        let geometry = OrbGeometry::for_width(width);
        let visible_height = (geometry.height as f64 * VISIBLE_FRACTION) as usize;
        Self {
            width,
            geometry,
            visible_height,
        }
    }
}

/// Rectangular block of pre-rendered text composited over the orb.
/// Every line is padded to the panel width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    lines: Vec<Line<'static>>,
    width: usize,
}

impl Panel {
    /// Build a panel, folding line-level styles into spans and right-padding short lines.
    pub fn new(lines: Vec<Line<'static>>) -> Self {
        let width = lines.iter().map(Line::width).max().unwrap_or(0);
        let lines = lines
            .into_iter()
            .map(|line| {
                let pad = width - line.width();
                let mut spans: Vec<Span<'static>> = line
                    .spans
                    .into_iter()
                    .map(|span| Span::styled(span.content, line.style.patch(span.style)))
                    .collect();
                if pad > 0 {
                    spans.push(Span::raw(" ".repeat(pad)));
                }
                Line::from(spans)
            })
            .collect();
        Self { lines, width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.lines.len()
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    /// This panel cut down to at most `max_width` columns.
    fn fitted(&self, max_width: usize) -> Cow<'_, Panel> {
        if self.width <= max_width {
            return Cow::Borrowed(self);
        }
        Cow::Owned(Panel {
            lines: self
                .lines
                .iter()
                .map(|line| truncate_line(line, max_width))
                .collect(),
            width: max_width,
        })
    }
}

/// Copy of `line` holding at most `width` columns, padded back to exactly `width` when a
/// wide character straddles the cut.
fn truncate_line(line: &Line<'static>, width: usize) -> Line<'static> {
    let mut spans = Vec::new();
    let mut used = 0;
    for span in &line.spans {
        let span_width = span.width();
        if used + span_width <= width {
            used += span_width;
            spans.push(span.clone());
            continue;
        }
        let mut kept = String::new();
        for c in span.content.chars() {
            let mut buf = [0u8; 4];
            let w = textwrap::core::display_width(c.encode_utf8(&mut buf));
            if used + w > width {
                break;
            }
            used += w;
            kept.push(c);
        }
        if !kept.is_empty() {
            spans.push(Span::styled(kept, span.style));
        }
        break;
    }
    if used < width {
        spans.push(Span::raw(" ".repeat(width - used)));
    }
    Line::from(spans)
}

/// Accumulates a row, merging neighbouring cells that share a style into one span.
#[derive(Default)]
struct RowBuilder {
    spans: Vec<Span<'static>>,
    run: String,
    style: Style,
}

impl RowBuilder {
    fn push(&mut self, text: &str, style: Style) {
        if style != self.style {
            self.flush();
            self.style = style;
        }
        self.run.push_str(text);
    }

    fn splice(&mut self, line: &Line<'static>) {
        self.flush();
        self.spans.extend(line.spans.iter().cloned());
    }

    fn flush(&mut self) {
        if !self.run.is_empty() {
            self.spans
                .push(Span::styled(std::mem::take(&mut self.run), self.style));
        }
    }

    fn finish(mut self) -> Line<'static> {
        self.flush();
        Line::from(self.spans)
    }
}

/// Inputs for one frame.
pub struct Scene<'a> {
    pub width: u16,
    pub frame: u64,
    pub panel: &'a Panel,
    pub theme: &'a Theme,
}

/// Render the whole frame: header, orb, footer.
pub fn render(scene: &Scene<'_>) -> Vec<Line<'static>> {
    let layout = OrbLayout::for_width(scene.width);
    let palette = PaletteSet::for_frame(scene.frame);

    let mut lines = Vec::with_capacity(HEADER_ROWS + layout.visible_height + FOOTER_ROWS);
    lines.extend(render_header(layout.width, scene.frame, &palette, scene.theme));
    lines.extend(render_orb(
        &layout,
        scene.frame,
        &palette,
        scene.panel,
        scene.theme,
    ));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        FOOTER_HINT,
        Style::default().fg(scene.theme.color(scene.theme.footer)),
    )));
    lines
}

/// Banner rows colored through the scrolling gradient, centered in `width`.
pub fn render_header(
    width: usize,
    frame: u64,
    palette: &PaletteSet,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let block_width = BANNER
        .iter()
        .map(|row| row.chars().count())
        .max()
        .unwrap_or(0);
    let indent = " ".repeat(width.saturating_sub(block_width) / 2);

    let mut lines = Vec::with_capacity(HEADER_ROWS);
    lines.push(Line::default());
    for text in BANNER {
        let len = text.chars().count();
        let mut row = RowBuilder::default();
        row.push(&indent, Style::default());
        let mut buf = [0u8; 4];
        for (i, c) in text.chars().enumerate() {
            let color = theme.color(palette.gradient_color(i, len, frame));
            row.push(c.encode_utf8(&mut buf), Style::default().fg(color));
        }
        lines.push(row.finish());
    }
    lines.push(Line::default());
    lines
}

/// The visible orb rows, with `panel` spliced in at its placement.
pub fn render_orb(
    layout: &OrbLayout,
    frame: u64,
    palette: &PaletteSet,
    panel: &Panel,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let panel = panel.fitted(layout.width);
    let orb_width = layout.width as i64;
    let panel_width = panel.width() as i64;
    let panel_height = panel.height() as i64;
    let start_x = orb_width / 2 - panel_width / 2;
    let start_y = layout.visible_height as i64 / 2 - panel_height / 2 + PANEL_NUDGE;

    let pixels = |row: &mut RowBuilder, y: i64, xs: std::ops::Range<i64>| {
        for x in xs {
            push_pixel(row, x, y, layout.geometry, frame, palette, theme);
        }
    };

    (0..layout.visible_height as i64)
        .map(|y| {
            let mut row = RowBuilder::default();
            let panel_row = y - start_y;
            if (0..panel_height).contains(&panel_row) {
                pixels(&mut row, y, 0..start_x.clamp(0, orb_width));
                row.splice(&panel.lines()[panel_row as usize]);
                pixels(&mut row, y, (start_x + panel_width).max(0)..orb_width);
            } else {
                pixels(&mut row, y, 0..orb_width);
            }
            row.finish()
        })
        .collect()
}

fn push_pixel(
    row: &mut RowBuilder,
    x: i64,
    y: i64,
    geometry: OrbGeometry,
    frame: u64,
    palette: &PaletteSet,
    theme: &Theme,
) {
    match field::sample(x, y, geometry, frame) {
        Pixel::Blank => row.push(" ", Style::default()),
        Pixel::Rim => row.push(GLYPH, Style::default().fg(theme.color(theme.rim))),
        Pixel::Body { swirl } => {
            let color = theme.color(palette.body_color(swirl));
            row.push(GLYPH, Style::default().fg(color));
        }
    }
}
