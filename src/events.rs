use crate::conversation::MessageId;

/// Author of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    User,
    Assistant,
}

impl Origin {
    pub fn display_name(&self) -> &'static str {
        match self {
            Origin::User => "You",
            Origin::Assistant => "Murmur",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Origin::User => "👤",
            Origin::Assistant => "🤖",
        }
    }
}

/// Outcome of one outbound request, tagged with the placeholder it fills
#[derive(Debug)]
pub struct Completion {
    pub id: MessageId,
    pub outcome: anyhow::Result<String>,
}
