use crate::client::HttpTransport;
use crate::config::Config;
use crate::conversation::ConversationController;
use crate::ui::conversation::{ConversationAction, ConversationManager};
use anyhow::{Context, Result};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

/// Redraw cadence; reveal frames are picked up on these ticks
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Main application state
pub struct App {
    manager: ConversationManager,
    running: bool,
}

impl App {
    pub fn new(manager: ConversationManager) -> Self {
        Self {
            manager,
            running: true,
        }
    }

    /// Main event loop: terminal input, request completions and frame ticks
    pub async fn run(&mut self, terminal: &mut Tui) -> Result<()> {
        let mut events = EventStream::new();
        let mut frames = tokio::time::interval(FRAME_INTERVAL);
        frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        while self.running {
            terminal
                .draw(|frame| frame.render_widget(&self.manager, frame.size()))
                .context("Failed to draw frame")?;

            tokio::select! {
                maybe_event = events.next() => match maybe_event {
                    Some(Ok(event)) => self.handle_event(event),
                    Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                    None => self.running = false,
                },
                Some(completion) = self.manager.next_completion() => {
                    self.manager.apply_completion(completion);
                }
                _ = frames.tick() => self.manager.on_tick(),
            }
        }

        tracing::info!("exiting");
        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if self.manager.handle_key(key) == ConversationAction::Exit {
                    self.running = false;
                }
            }
            Event::Paste(text) => self.manager.handle_paste(&text),
            _ => {}
        }
    }
}

/// Build the app from configuration and run it until the user quits
pub async fn run(config: Config) -> Result<()> {
    let transport = HttpTransport::new(&config)?;
    tracing::info!(endpoint = transport.endpoint(), "starting chat session");

    let controller =
        ConversationController::new(Arc::new(transport), config.fallback_message.clone());
    let mut app = App::new(ConversationManager::new(controller, &config));

    let mut terminal = setup_terminal()?;
    let result = app.run(&mut terminal).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    // Restore the terminal before the panic message is printed.
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
        prev_hook(info);
    }));

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    Terminal::new(CrosstermBackend::new(stdout)).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), DisableBracketedPaste, LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}
