use crate::conversation::{Conversation, MessageId};
use crate::events::Origin;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::task::JoinHandle;

/// Typewriter animation over one complete string.
///
/// Each [`set_text`](Self::set_text) with a new text identity aborts the
/// running timer and starts a fresh one that emits cursor values `0..=N`,
/// one per interval, then stops. Every restart gets its own channel, so
/// frames from an aborted timer are never observed.
#[derive(Debug)]
pub struct TextRevealer {
    text: Arc<str>,
    shown: usize,
    total: usize,
    interval: Duration,
    frames: Option<mpsc::UnboundedReceiver<usize>>,
    task: Option<JoinHandle<()>>,
}

impl TextRevealer {
    pub fn new(interval: Duration) -> Self {
        Self {
            text: Arc::from(""),
            shown: 0,
            total: 0,
            interval,
            frames: None,
            task: None,
        }
    }

    /// Start revealing `text`; a no-op when it is the text already shown.
    /// Must be called from within a tokio runtime.
    pub fn set_text(&mut self, text: Arc<str>) {
        if Arc::ptr_eq(&self.text, &text) {
            return;
        }

        self.cancel();
        self.shown = 0;
        self.total = text.chars().count();
        self.text = text;

        if self.total == 0 {
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let total = self.total;
        let interval = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            for shown in 0..=total {
                ticker.tick().await;
                if tx.send(shown).is_err() {
                    return;
                }
            }
        }));
        self.frames = Some(rx);
    }

    /// Drain frames that have already been emitted; true if the cursor moved
    pub fn poll(&mut self) -> bool {
        let Some(frames) = self.frames.as_mut() else {
            return false;
        };

        let before = self.shown;
        let mut latest = before;
        let finished = loop {
            match frames.try_recv() {
                Ok(shown) => latest = latest.max(shown),
                Err(TryRecvError::Empty) => break false,
                Err(TryRecvError::Disconnected) => break true,
            }
        };

        self.advance(latest);
        if finished {
            self.finish();
        }
        self.shown != before
    }

    /// Wait for the next emitted cursor value; `None` once the reveal is over
    pub async fn next_frame(&mut self) -> Option<usize> {
        let frames = self.frames.as_mut()?;
        match frames.recv().await {
            Some(shown) => {
                self.advance(shown);
                Some(shown)
            }
            None => {
                self.finish();
                None
            }
        }
    }

    /// Prefix currently on screen
    pub fn visible(&self) -> &str {
        match self.text.char_indices().nth(self.shown) {
            Some((end, _)) => &self.text[..end],
            None => &self.text,
        }
    }

    pub fn shown(&self) -> usize {
        self.shown
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_revealing(&self) -> bool {
        self.shown < self.total
    }

    fn advance(&mut self, shown: usize) {
        self.shown = self.shown.max(shown).min(self.total);
    }

    fn finish(&mut self) {
        self.frames = None;
        self.task = None;
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.frames = None;
    }
}

impl Drop for TextRevealer {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// One revealer per assistant message, kept in step with the conversation
#[derive(Debug)]
pub struct RevealBoard {
    interval: Duration,
    revealers: HashMap<MessageId, TextRevealer>,
}

impl RevealBoard {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            revealers: HashMap::new(),
        }
    }

    /// Create, restart or drop revealers to match the conversation
    pub fn sync(&mut self, conversation: &Conversation) {
        let live: HashSet<MessageId> = conversation.messages().iter().map(|m| m.id()).collect();
        self.revealers.retain(|id, _| live.contains(id));

        let interval = self.interval;
        for message in conversation
            .messages()
            .iter()
            .filter(|m| m.origin() == Origin::Assistant)
        {
            self.revealers
                .entry(message.id())
                .or_insert_with(|| TextRevealer::new(interval))
                .set_text(Arc::clone(message.shared_text()));
        }
    }

    /// Advance every revealer; true if anything on screen changed
    pub fn poll(&mut self) -> bool {
        self.revealers
            .values_mut()
            .fold(false, |changed, revealer| revealer.poll() || changed)
    }

    pub fn get(&self, id: MessageId) -> Option<&TextRevealer> {
        self.revealers.get(&id)
    }

    pub fn get_mut(&mut self, id: MessageId) -> Option<&mut TextRevealer> {
        self.revealers.get_mut(&id)
    }

    pub fn is_animating(&self) -> bool {
        self.revealers.values().any(TextRevealer::is_revealing)
    }

    pub fn len(&self) -> usize {
        self.revealers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revealers.is_empty()
    }
}
