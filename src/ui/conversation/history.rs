//! Conversation history display component

use crate::conversation::{ConversationController, Message};
use crate::events::Origin;
use crate::reveal::RevealBoard;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Scroll state for the history pane.
///
/// The offset counts lines up from the bottom, so 0 always shows the newest
/// message.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    scroll_offset: usize,
    last_seen: (usize, bool),
    show_timestamps: bool,
}

impl ConversationHistory {
    pub fn new(show_timestamps: bool) -> Self {
        Self {
            show_timestamps,
            ..Self::default()
        }
    }

    /// Jump back to the newest message when the message count or the
    /// awaiting flag changed since the last call
    pub fn follow(&mut self, message_count: usize, awaiting: bool) -> bool {
        if self.last_seen == (message_count, awaiting) {
            return false;
        }
        self.last_seen = (message_count, awaiting);
        self.scroll_to_bottom();
        true
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// Borrow everything needed to draw one frame
    pub fn view<'a>(
        &'a self,
        controller: &'a ConversationController,
        reveals: &'a RevealBoard,
        tick: u64,
    ) -> HistoryView<'a> {
        HistoryView {
            history: self,
            controller,
            reveals,
            tick,
        }
    }
}

/// Frame-local widget over the conversation
#[derive(Debug)]
pub struct HistoryView<'a> {
    history: &'a ConversationHistory,
    controller: &'a ConversationController,
    reveals: &'a RevealBoard,
    tick: u64,
}

impl Widget for HistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" 💬 Conversation ");

        let inner_area = block.inner(area);
        block.render(area, buf);
        if inner_area.width == 0 || inner_area.height == 0 {
            return;
        }

        let mut all_lines: Vec<Line> = Vec::new();
        for message in self.controller.conversation().messages() {
            all_lines.extend(self.render_message(message, inner_area.width));
            // spacing between messages
            all_lines.push(Line::default());
        }
        all_lines.pop();

        // Determine the range of lines to display from the bottom
        let height = inner_area.height as usize;
        let total = all_lines.len();
        let max_offset = total.saturating_sub(height);
        let offset = self.history.scroll_offset.min(max_offset);
        let start = max_offset - offset;

        for (i, line) in all_lines.iter().skip(start).take(height).enumerate() {
            buf.set_line(inner_area.x, inner_area.y + i as u16, line, inner_area.width);
        }

        if max_offset > 0 {
            let mut state = ScrollbarState::new(max_offset).position(start);
            Scrollbar::default()
                .orientation(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .render(area, buf, &mut state);
        }
    }
}

impl<'a> HistoryView<'a> {
    /// Render a single message into lines
    fn render_message(&self, message: &'a Message, width: u16) -> Vec<Line<'a>> {
        let origin = message.origin();
        let mut header = vec![
            Span::raw(format!("{} ", origin.icon())),
            Span::styled(
                origin.display_name(),
                Self::content_style(origin).add_modifier(Modifier::BOLD),
            ),
        ];
        if self.history.show_timestamps {
            let timestamp = message.created_at().with_timezone(&chrono::Local).format("%H:%M:%S");
            header.push(Span::styled(
                format!("  {timestamp}"),
                Style::default().fg(Color::DarkGray),
            ));
        }
        let mut lines = vec![Line::from(header)];

        let body_width = width.saturating_sub(2) as usize;
        match origin {
            Origin::User => {
                for content_line in wrap_text(message.text(), body_width) {
                    lines.push(Self::body_line(content_line, Self::content_style(origin)));
                }
            }
            Origin::Assistant if self.controller.is_pending(message.id()) => {
                let frame = SPINNER[(self.tick / 4) as usize % SPINNER.len()];
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(frame, Style::default().fg(Color::Yellow)),
                    Span::styled(" thinking", Style::default().fg(Color::DarkGray)),
                ]));
            }
            Origin::Assistant => {
                let (visible, revealing) = match self.reveals.get(message.id()) {
                    Some(revealer) => (revealer.visible(), revealer.is_revealing()),
                    None => (message.text(), false),
                };

                let content_lines = wrap_text(visible, body_width.saturating_sub(1));
                let last = content_lines.len().saturating_sub(1);
                for (i, content_line) in content_lines.into_iter().enumerate() {
                    let mut line = Self::body_line(content_line, Self::content_style(origin));
                    if revealing && i == last {
                        line.spans.push(Span::styled("▋", Style::default().fg(Color::Yellow)));
                    }
                    lines.push(line);
                }
            }
        }

        lines
    }

    fn body_line(content: String, style: Style) -> Line<'a> {
        Line::from(vec![Span::raw("  "), Span::styled(content, style)])
    }

    /// Get content style based on origin
    fn content_style(origin: Origin) -> Style {
        match origin {
            Origin::User => Style::default().fg(Color::Cyan),
            Origin::Assistant => Style::default().fg(Color::Green),
        }
    }
}

/// Wrap text to fit within the given width, keeping explicit line breaks
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current_line = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if current_len > 0 && current_len + 1 + word_len > width {
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
            }
            if current_len > 0 {
                current_line.push(' ');
                current_len += 1;
            }

            // Hard-split words longer than a whole line.
            let mut rest = word;
            while current_len + rest.chars().count() > width {
                let take = width - current_len;
                let split = rest.char_indices().nth(take).map_or(rest.len(), |(i, _)| i);
                current_line.push_str(&rest[..split]);
                lines.push(std::mem::take(&mut current_line));
                current_len = 0;
                rest = &rest[split..];
            }
            current_line.push_str(rest);
            current_len += rest.chars().count();
        }

        lines.push(current_line);
    }

    lines
}
