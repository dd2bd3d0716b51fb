use crate::config::Config;
use crate::conversation::{ConversationController, MessageId};
use crate::events::Completion;
use crate::reveal::RevealBoard;
use crate::ui::LandingBanner;
use crate::ui::conversation::{
    ComposerResult, ConversationComposer, ConversationHistory, SlashCommand, StatusLine,
    get_help_text,
};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    widgets::Widget,
};

/// Actions that can be requested by the conversation manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    None,
    Exit,
}

/// Which screen is on display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Landing,
    Conversation,
}

/// Ties the controller, the reveal animations and the widgets together
#[derive(Debug)]
pub struct ConversationManager {
    controller: ConversationController,
    reveals: RevealBoard,
    composer: ConversationComposer,
    history: ConversationHistory,
    notice: Option<String>,
    title: String,
    tagline: String,
    scroll_step: usize,
    tick: u64,
}

impl ConversationManager {
    pub fn new(controller: ConversationController, config: &Config) -> Self {
        Self {
            controller,
            reveals: RevealBoard::new(config.reveal_interval()),
            composer: ConversationComposer::new("say something…"),
            history: ConversationHistory::new(config.ui.show_timestamps),
            notice: None,
            title: config.ui.title.clone(),
            tagline: config.ui.tagline.clone(),
            scroll_step: usize::from(config.ui.scroll_step.max(1)),
            tick: 0,
        }
    }

    pub fn view(&self) -> View {
        if self.controller.conversation().is_empty() {
            View::Landing
        } else {
            View::Conversation
        }
    }

    pub fn controller(&self) -> &ConversationController {
        &self.controller
    }

    pub fn reveals(&self) -> &RevealBoard {
        &self.reveals
    }

    pub fn composer(&self) -> &ConversationComposer {
        &self.composer
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Handle key input
    pub fn handle_key(&mut self, key: KeyEvent) -> ConversationAction {
        if key.kind != KeyEventKind::Press {
            return ConversationAction::None;
        }

        match key.code {
            KeyCode::Esc => return ConversationAction::Exit,
            KeyCode::Char('c') | KeyCode::Char('d')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                return ConversationAction::Exit;
            }
            KeyCode::PageUp => {
                self.history.scroll_up(self.scroll_step);
                return ConversationAction::None;
            }
            KeyCode::PageDown => {
                self.history.scroll_down(self.scroll_step);
                return ConversationAction::None;
            }
            _ => {}
        }

        match self.composer.handle_key(key) {
            ComposerResult::Submitted(input) => {
                self.submit(&input);
                ConversationAction::None
            }
            ComposerResult::Command(command) => self.handle_slash_command(command),
            ComposerResult::None => ConversationAction::None,
        }
    }

    /// Text pasted into the terminal goes to the composer
    pub fn handle_paste(&mut self, text: &str) {
        self.composer.insert_str(text);
    }

    /// Send a message; blank input is ignored
    pub fn submit(&mut self, input: &str) -> Option<MessageId> {
        let id = self.controller.submit(input)?;
        self.notice = None;
        self.refresh();
        Some(id)
    }

    /// Wait for the next request to finish
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.controller.next_completion().await
    }

    pub fn apply_completion(&mut self, completion: Completion) {
        if self.controller.apply(completion) {
            self.refresh();
        }
    }

    /// Frame tick: advance animations and pick up stray completions
    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
        if self.controller.poll_completions() > 0 {
            self.refresh();
        }
        self.reveals.poll();
    }

    fn refresh(&mut self) {
        self.reveals.sync(self.controller.conversation());
        self.history.follow(
            self.controller.conversation().len(),
            self.controller.awaiting_response(),
        );
    }

    fn handle_slash_command(&mut self, command: SlashCommand) -> ConversationAction {
        tracing::debug!(command = command.command(), "slash command");
        match command {
            SlashCommand::Help => {
                self.notice = Some(get_help_text());
                ConversationAction::None
            }
            SlashCommand::Clear => {
                self.controller.clear();
                self.notice = Some("conversation cleared".to_string());
                self.refresh();
                ConversationAction::None
            }
            SlashCommand::Quit => ConversationAction::Exit,
        }
    }
}

impl Widget for &ConversationManager {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),    // Landing or history
                Constraint::Length(1), // Status
                Constraint::Length(3), // Composer
            ])
            .split(area);

        match self.view() {
            View::Landing => LandingBanner {
                title: &self.title,
                tagline: &self.tagline,
                tick: self.tick,
            }
            .render(chunks[0], buf),
            View::Conversation => self
                .history
                .view(&self.controller, &self.reveals, self.tick)
                .render(chunks[0], buf),
        }

        StatusLine {
            awaiting: self.controller.awaiting_response(),
            pending: self.controller.pending_count(),
            notice: self.notice.as_deref(),
            tick: self.tick,
        }
        .render(chunks[1], buf);

        self.composer.render(chunks[2], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatTransport;
    use crate::events::Origin;
    use crate::testing::ScriptedTransport;
    use std::sync::Arc;
    use std::time::Duration;

    fn manager() -> (Arc<ScriptedTransport>, ConversationManager) {
        let transport = Arc::new(ScriptedTransport::default());
        let config = Config::default();
        let controller = ConversationController::new(
            Arc::clone(&transport) as Arc<dyn ChatTransport>,
            config.fallback_message.clone(),
        );
        (transport, ConversationManager::new(controller, &config))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_line(manager: &mut ConversationManager, text: &str) -> ConversationAction {
        for c in text.chars() {
            manager.handle_key(press(KeyCode::Char(c)));
        }
        manager.handle_key(press(KeyCode::Enter))
    }

    fn rendered_text(manager: &ConversationManager, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        manager.render(area, &mut buf);
        let mut text = String::new();
        for y in 0..height {
            for x in 0..width {
                text.push_str(buf.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[tokio::test]
    async fn enter_submits_two_messages_and_clears_input() {
        let (transport, mut manager) = manager();
        let _reply = transport.expect("hello");
        assert_eq!(manager.view(), View::Landing);

        assert_eq!(type_line(&mut manager, "hello"), ConversationAction::None);

        let messages = manager.controller().conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].origin(), Origin::User);
        assert_eq!(messages[1].origin(), Origin::Assistant);
        assert_eq!(messages[1].text(), "");
        assert_eq!(manager.composer().content(), "");
        assert!(manager.controller().awaiting_response());
        assert_eq!(manager.view(), View::Conversation);
    }

    #[tokio::test]
    async fn whitespace_input_sends_nothing() {
        let (transport, mut manager) = manager();

        type_line(&mut manager, "   ");
        tokio::task::yield_now().await;

        assert!(manager.controller().conversation().is_empty());
        assert!(transport.calls().is_empty());
        assert_eq!(manager.view(), View::Landing);
    }

    #[tokio::test(start_paused = true)]
    async fn reply_is_revealed_after_it_arrives() {
        let (transport, mut manager) = manager();
        let reply = transport.expect("hello");

        let id = manager.submit("hello").unwrap();
        assert_eq!(manager.reveals().get(id).unwrap().visible(), "");

        reply.send(Ok("hi there".into())).unwrap();
        let completion = manager.next_completion().await.unwrap();
        manager.apply_completion(completion);
        assert!(!manager.controller().awaiting_response());
        assert_eq!(manager.controller().conversation().get(id).unwrap().text(), "hi there");
        assert_eq!(manager.reveals().get(id).unwrap().visible(), "");

        // 8 chars at 30ms per step: the full text is on screen at 240ms.
        tokio::time::sleep(Duration::from_millis(215)).await;
        manager.on_tick();
        assert_eq!(manager.reveals().get(id).unwrap().visible(), "hi ther");

        tokio::time::sleep(Duration::from_millis(30)).await;
        manager.on_tick();
        assert_eq!(manager.reveals().get(id).unwrap().visible(), "hi there");
        assert!(!manager.reveals().is_animating());
    }

    #[tokio::test]
    async fn failed_request_shows_fallback() {
        let (transport, mut manager) = manager();
        let reply = transport.expect("x");

        let id = manager.submit("x").unwrap();
        reply.send(Err("refused".into())).unwrap();
        let completion = manager.next_completion().await.unwrap();
        manager.apply_completion(completion);

        let reply = manager.controller().conversation().get(id).unwrap();
        assert_eq!(reply.text(), "connection failed");
        assert!(!manager.controller().awaiting_response());
    }

    #[tokio::test]
    async fn clear_command_empties_conversation() {
        let (transport, mut manager) = manager();
        let _reply = transport.expect("first");
        manager.submit("first").unwrap();

        assert_eq!(type_line(&mut manager, "/clear"), ConversationAction::None);
        assert!(manager.controller().conversation().is_empty());
        assert!(manager.reveals().is_empty());
        assert!(!manager.controller().awaiting_response());
        assert_eq!(manager.view(), View::Landing);
        assert_eq!(manager.notice(), Some("conversation cleared"));
    }

    #[tokio::test]
    async fn help_sets_notice_and_next_submit_clears_it() {
        let (transport, mut manager) = manager();
        type_line(&mut manager, "/help");
        assert!(manager.notice().unwrap().contains("/quit"));
        assert!(manager.controller().conversation().is_empty());

        let _reply = transport.expect("thanks");
        type_line(&mut manager, "thanks");
        assert_eq!(manager.notice(), None);
    }

    #[tokio::test]
    async fn quit_paths_exit() {
        let (_transport, mut manager) = manager();
        assert_eq!(type_line(&mut manager, "/quit"), ConversationAction::Exit);
        assert_eq!(manager.handle_key(press(KeyCode::Esc)), ConversationAction::Exit);
        assert_eq!(
            manager.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            ConversationAction::Exit
        );
    }

    #[tokio::test]
    async fn new_messages_scroll_history_back_to_bottom() {
        let (transport, mut manager) = manager();
        let _first = transport.expect("first");
        manager.submit("first").unwrap();

        manager.handle_key(press(KeyCode::PageUp));
        assert_eq!(manager.history().scroll_offset(), 5);

        let _second = transport.expect("second");
        manager.submit("second").unwrap();
        assert_eq!(manager.history().scroll_offset(), 0);
    }

    #[tokio::test]
    async fn renders_landing_then_conversation() {
        let (transport, mut manager) = manager();
        let landing = rendered_text(&manager, 70, 16);
        assert!(landing.contains("say something and watch it answer"));

        let _reply = transport.expect("ping");
        manager.submit("ping").unwrap();
        let conversation = rendered_text(&manager, 70, 16);
        assert!(conversation.contains("ping"));
        assert!(conversation.contains("thinking"));
        assert!(conversation.contains("Murmur is typing"));
    }
}
