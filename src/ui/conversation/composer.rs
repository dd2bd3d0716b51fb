use crate::ui::conversation::commands::{SlashCommand, parse_slash_command};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

/// Result returned when the user interacts with the composer
#[derive(Debug, PartialEq)]
pub enum ComposerResult {
    Submitted(String),
    Command(SlashCommand),
    None,
}

/// State for the input line; the cursor counts chars, not bytes
#[derive(Debug, Clone, Default)]
pub struct TextAreaState {
    pub content: String,
    pub cursor_position: usize,
}

impl TextAreaState {
    fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, position: usize) -> usize {
        self.content
            .char_indices()
            .nth(position)
            .map_or(self.content.len(), |(index, _)| index)
    }
}

/// Single-line message composer
#[derive(Debug, Clone)]
pub struct ConversationComposer {
    state: TextAreaState,
    placeholder: String,
}

impl ConversationComposer {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            state: TextAreaState::default(),
            placeholder: placeholder.into(),
        }
    }

    /// Handle key input; a submission empties the field
    pub fn handle_key(&mut self, key: KeyEvent) -> ComposerResult {
        if key.kind != KeyEventKind::Press {
            return ComposerResult::None;
        }

        match key.code {
            KeyCode::Enter => {
                if self.state.content.trim().is_empty() {
                    return ComposerResult::None;
                }
                let content = std::mem::take(&mut self.state.content);
                self.state.cursor_position = 0;
                return match parse_slash_command(&content) {
                    Some(command) => ComposerResult::Command(command),
                    None => ComposerResult::Submitted(content),
                };
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.insert_char(c);
            }
            KeyCode::Backspace => {
                self.backspace();
            }
            KeyCode::Delete => {
                self.delete();
            }
            KeyCode::Left => {
                self.state.cursor_position = self.state.cursor_position.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.state.cursor_position < self.state.char_len() {
                    self.state.cursor_position += 1;
                }
            }
            KeyCode::Home => {
                self.state.cursor_position = 0;
            }
            KeyCode::End => {
                self.state.cursor_position = self.state.char_len();
            }
            _ => {}
        }

        ComposerResult::None
    }

    /// Insert text at the cursor, e.g. from a paste
    pub fn insert_str(&mut self, text: &str) {
        for c in text.chars().filter(|c| *c != '\r' && *c != '\n') {
            self.insert_char(c);
        }
    }

    fn insert_char(&mut self, c: char) {
        let index = self.state.byte_index(self.state.cursor_position);
        self.state.content.insert(index, c);
        self.state.cursor_position += 1;
    }

    fn backspace(&mut self) -> bool {
        if self.state.cursor_position == 0 {
            return false;
        }
        self.state.cursor_position -= 1;
        let index = self.state.byte_index(self.state.cursor_position);
        self.state.content.remove(index);
        true
    }

    fn delete(&mut self) -> bool {
        if self.state.cursor_position >= self.state.char_len() {
            return false;
        }
        let index = self.state.byte_index(self.state.cursor_position);
        self.state.content.remove(index);
        true
    }

    pub fn content(&self) -> &str {
        &self.state.content
    }

    pub fn cursor_position(&self) -> usize {
        self.state.cursor_position
    }
}

impl Widget for &ConversationComposer {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" ✎ Message ")
            .style(Style::default().fg(Color::Green));

        let inner_area = block.inner(area);
        block.render(area, buf);
        if inner_area.width == 0 || inner_area.height == 0 {
            return;
        }

        if self.state.content.is_empty() {
            let line = Line::from(vec![
                Span::styled("▌", Style::default().fg(Color::Green)),
                Span::styled(&self.placeholder, Style::default().fg(Color::DarkGray)),
            ]);
            buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
            return;
        }

        // Keep the cursor in view by scrolling the line horizontally.
        let width = inner_area.width as usize;
        let skip = (self.state.cursor_position + 1).saturating_sub(width);
        let mut content: String = self.state.content.chars().skip(skip).collect();
        let cursor = self.state.cursor_position - skip;
        let index = content
            .char_indices()
            .nth(cursor)
            .map_or(content.len(), |(index, _)| index);
        content.insert(index, '▌');

        let line = Line::from(vec![Span::styled(content, Style::default().fg(Color::White))]);
        buf.set_line(inner_area.x, inner_area.y, &line, inner_area.width);
    }
}
