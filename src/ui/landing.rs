//! Decorative landing view shown before the first message

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

const GRADIENT: [Color; 6] = [
    Color::Rgb(255, 121, 198),
    Color::Rgb(189, 147, 249),
    Color::Rgb(139, 233, 253),
    Color::Rgb(80, 250, 123),
    Color::Rgb(241, 250, 140),
    Color::Rgb(255, 184, 108),
];

const SPARKS: [&str; 4] = ["·", "∙", "✦", "⋆"];

/// Title, tagline and drifting sparks
#[derive(Debug, Clone, Copy)]
pub struct LandingBanner<'a> {
    pub title: &'a str,
    pub tagline: &'a str,
    pub tick: u64,
}

impl LandingBanner<'_> {
    fn title_line(&self) -> Line<'static> {
        let shift = (self.tick / 6) as usize;
        let spans: Vec<Span> = self
            .title
            .chars()
            .enumerate()
            .map(|(i, c)| {
                let color = GRADIENT[(i + shift) % GRADIENT.len()];
                Span::styled(
                    format!("{c} "),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                )
            })
            .collect();
        Line::from(spans)
    }

    fn render_sparks(&self, area: Rect, buf: &mut Buffer) {
        if area.width < 4 || area.height < 2 {
            return;
        }

        let count = (area.width as u64 * area.height as u64 / 60).clamp(4, 40);
        for i in 0..count {
            // Cheap deterministic scatter; each spark drifts upwards slowly.
            let seed = i.wrapping_mul(2_654_435_761) ^ 0x9e37_79b9;
            let x = area.x + (seed % area.width as u64) as u16;
            let drift = (self.tick / 10 + seed / 7) % area.height as u64;
            let y = area.y + (area.height as u64 - 1 - drift) as u16;
            let glyph = SPARKS[((seed >> 3) + self.tick / 15) as usize % SPARKS.len()];
            let color = GRADIENT[(seed >> 5) as usize % GRADIENT.len()];
            buf.set_string(x, y, glyph, Style::default().fg(color).add_modifier(Modifier::DIM));
        }
    }
}

impl Widget for LandingBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.render_sparks(area, buf);

        let lines = [
            self.title_line(),
            Line::default(),
            Line::from(Span::styled(
                self.tagline.to_string(),
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            )),
            Line::default(),
            Line::from(Span::styled(
                "type a message and press Enter · /help for commands",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let top = area.y + area.height.saturating_sub(lines.len() as u16) / 2;
        for (i, line) in lines.iter().enumerate() {
            let y = top + i as u16;
            if y >= area.bottom() {
                break;
            }
            let width = line.width() as u16;
            let x = area.x + area.width.saturating_sub(width) / 2;
            buf.set_line(x, y, line, area.width.saturating_sub(x - area.x));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                text.push_str(buf.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn renders_tagline_centered_within_area() {
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        LandingBanner {
            title: "murmur",
            tagline: "say something",
            tick: 42,
        }
        .render(area, &mut buf);

        let text = rendered_text(&buf);
        assert!(text.contains("say something"));
        assert!(text.contains("m u r m u r"));
    }

    #[test]
    fn tiny_area_does_not_panic() {
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);
        LandingBanner {
            title: "murmur",
            tagline: "a much longer tagline than fits",
            tick: 7,
        }
        .render(area, &mut buf);
    }
}
