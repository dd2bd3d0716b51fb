use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Status row under the history: typing indicator, or a local notice
#[derive(Debug, Clone, Copy)]
pub struct StatusLine<'a> {
    pub awaiting: bool,
    pub pending: usize,
    pub notice: Option<&'a str>,
    pub tick: u64,
}

impl StatusLine<'_> {
    fn dots(&self) -> &'static str {
        match (self.tick / 20) % 4 {
            0 => ".",
            1 => "..",
            2 => "...",
            _ => "   ",
        }
    }
}

impl Widget for StatusLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }

        let line = if self.awaiting {
            let mut spans = vec![
                Span::styled("🤖 ", Style::default().fg(Color::Green)),
                Span::styled("Murmur is typing", Style::default().fg(Color::Green)),
                Span::styled(self.dots(), Style::default().fg(Color::Yellow)),
            ];
            if self.pending > 1 {
                spans.push(Span::styled(
                    format!("  ({} replies pending)", self.pending),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        } else if let Some(notice) = self.notice {
            Line::from(vec![
                Span::styled("ℹ ", Style::default().fg(Color::Blue)),
                Span::styled(notice, Style::default().fg(Color::Gray)),
            ])
        } else {
            return;
        };

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
