use crate::client::ChatTransport;
use crate::events::{Completion, Origin};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Opaque message identifier, used only to reconcile replies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(Uuid);

impl MessageId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single turn in the conversation
#[derive(Debug, Clone)]
pub struct Message {
    id: MessageId,
    text: Arc<str>,
    origin: Origin,
    created_at: DateTime<Utc>,
}

impl Message {
    fn new(origin: Origin, text: Arc<str>) -> Self {
        Self {
            id: MessageId::new(),
            text,
            origin,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Shared handle to the text; a new allocation marks a new text identity
    pub fn shared_text(&self) -> &Arc<str> {
        &self.text
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Ordered message sequence; order is insertion order and never changes
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub(crate) fn push(&mut self, origin: Origin, text: Arc<str>) -> MessageId {
        let message = Message::new(origin, text);
        let id = message.id;
        self.messages.push(message);
        id
    }

    /// Swap the text of one message in place; nothing else about it changes
    pub(crate) fn replace_text(&mut self, id: MessageId, text: Arc<str>) -> bool {
        match self.messages.iter_mut().find(|m| m.id == id) {
            Some(message) => {
                message.text = text;
                true
            }
            None => false,
        }
    }

    fn clear(&mut self) {
        self.messages.clear();
    }
}

/// Owns the conversation and every request issued on its behalf.
///
/// Mutation happens only through [`submit`](Self::submit),
/// [`resolve`](Self::resolve) and [`reject`](Self::reject). Requests run as
/// spawned tasks and report back through a channel that the UI loop drains,
/// so completions land in completion order while message positions stay where
/// `submit` put them.
pub struct ConversationController {
    conversation: Conversation,
    transport: Arc<dyn ChatTransport>,
    fallback_message: Arc<str>,
    in_flight: HashMap<MessageId, JoinHandle<()>>,
    completion_tx: mpsc::UnboundedSender<Completion>,
    completion_rx: mpsc::UnboundedReceiver<Completion>,
}

impl ConversationController {
    pub fn new(transport: Arc<dyn ChatTransport>, fallback_message: impl Into<String>) -> Self {
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let fallback_message: String = fallback_message.into();

        Self {
            conversation: Conversation::default(),
            transport,
            fallback_message: Arc::from(fallback_message),
            in_flight: HashMap::new(),
            completion_tx,
            completion_rx,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// True while at least one request is outstanding
    pub fn awaiting_response(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Whether the placeholder `id` is still waiting for its reply
    pub fn is_pending(&self, id: MessageId) -> bool {
        self.in_flight.contains_key(&id)
    }

    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Append the user message and its placeholder, then dispatch the request.
    ///
    /// Blank input is ignored. Returns the placeholder id. Must be called
    /// from within a tokio runtime.
    pub fn submit(&mut self, user_text: &str) -> Option<MessageId> {
        if user_text.trim().is_empty() {
            return None;
        }

        self.conversation.push(Origin::User, Arc::from(user_text));
        let id = self.conversation.push(Origin::Assistant, Arc::from(""));

        let transport = Arc::clone(&self.transport);
        let tx = self.completion_tx.clone();
        let text = user_text.to_string();
        let handle = tokio::spawn(async move {
            let outcome = transport.send(&text).await;
            // Fails only once the controller is gone.
            let _ = tx.send(Completion { id, outcome });
        });
        self.in_flight.insert(id, handle);

        tracing::debug!(%id, pending = self.in_flight.len(), "request dispatched");
        Some(id)
    }

    /// Fill placeholder `id` with the reply text
    pub fn resolve(&mut self, id: MessageId, text: String) -> bool {
        if !self.settle(id) {
            return false;
        }
        tracing::info!(%id, chars = text.chars().count(), "reply received");
        self.conversation.replace_text(id, Arc::from(text))
    }

    /// Fill placeholder `id` with the fallback text; there is no retry
    pub fn reject(&mut self, id: MessageId, error: anyhow::Error) -> bool {
        if !self.settle(id) {
            return false;
        }
        tracing::warn!(%id, error = %format!("{error:#}"), "request failed");
        let fallback = Arc::clone(&self.fallback_message);
        self.conversation.replace_text(id, fallback)
    }

    /// Route a completion to `resolve` or `reject`
    pub fn apply(&mut self, completion: Completion) -> bool {
        let Completion { id, outcome } = completion;
        match outcome {
            Ok(text) => self.resolve(id, text),
            Err(error) => self.reject(id, error),
        }
    }

    /// Apply every completion that has already arrived, without waiting
    pub fn poll_completions(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(completion) = self.completion_rx.try_recv() {
            if self.apply(completion) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait for the next completion; pends forever while nothing is in flight
    pub async fn next_completion(&mut self) -> Option<Completion> {
        self.completion_rx.recv().await
    }

    /// Drop every message and abandon the outstanding requests
    pub fn clear(&mut self) {
        self.abort_in_flight();
        self.conversation.clear();
    }

    fn settle(&mut self, id: MessageId) -> bool {
        if self.in_flight.remove(&id).is_some() {
            return true;
        }
        tracing::debug!(%id, "ignoring completion for a request that is no longer tracked");
        false
    }

    fn abort_in_flight(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
    }
}

impl fmt::Debug for ConversationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversationController")
            .field("messages", &self.conversation.len())
            .field("pending", &self.in_flight.len())
            .finish()
    }
}

impl Drop for ConversationController {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
