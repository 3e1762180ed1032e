use super::{Content, Message, User};
use chrono::{DateTime, Utc};

/// Host event kinds cogs can subscribe to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    MessageCreate,
    GuildMemberAdd,
    GuildMemberRemove,
    VoiceStateUpdate,
    InteractionCreate,
    Other(String),
}

impl EventKind {
    pub fn as_str(&self) -> &str {
        match self {
            EventKind::MessageCreate => "messageCreate",
            EventKind::GuildMemberAdd => "guildMemberAdd",
            EventKind::GuildMemberRemove => "guildMemberRemove",
            EventKind::VoiceStateUpdate => "voiceStateUpdate",
            EventKind::InteractionCreate => "interactionCreate",
            EventKind::Other(s) => s,
        }
    }
}

impl From<&str> for EventKind {
    fn from(name: &str) -> Self {
        match name {
            "messageCreate" => EventKind::MessageCreate,
            "guildMemberAdd" => EventKind::GuildMemberAdd,
            "guildMemberRemove" => EventKind::GuildMemberRemove,
            "voiceStateUpdate" => EventKind::VoiceStateUpdate,
            "interactionCreate" => EventKind::InteractionCreate,
            other => EventKind::Other(other.to_string()),
        }
    }
}

/// An event delivered by the host's event bus
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub guild_id: Option<String>,
    pub user: Option<User>,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            name: kind.as_str().to_string(),
            guild_id: None,
            user: None,
            payload: serde_json::Value::Null,
            timestamp: Utc::now(),
        }
    }

    pub fn with_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from(self.name.as_str())
    }

    /// `messageCreate` for a plain text message
    pub fn message_create(message: &Message) -> Self {
        let text = message.content.text().unwrap_or_default();
        let mut event = Event::new(EventKind::MessageCreate)
            .with_guild(message.guild_id.clone())
            .with_payload(serde_json::json!({ "id": message.id, "content": text }));
        event.user = message.sender.clone();
        event
    }

    /// The `content` field of a message payload, if any
    pub fn content(&self) -> Option<&str> {
        self.payload.get("content").and_then(|c| c.as_str())
    }
}

/// A single command invocation
#[derive(Debug, Clone)]
pub struct Invocation {
    pub id: String,
    pub command: String,
    pub args: Vec<String>,
    pub guild_id: String,
    pub user: User,
    pub timestamp: DateTime<Utc>,
}

impl Invocation {
    pub fn new(guild_id: impl Into<String>, user: User, command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            command: command.into(),
            args,
            guild_id: guild_id.into(),
            user,
            timestamp: Utc::now(),
        }
    }

    /// Build an invocation from a parsed command message
    pub fn from_message(message: &Message) -> Option<Self> {
        let Content::Command { name, args } = &message.content else {
            return None;
        };
        let user = message.sender.clone().unwrap_or_else(|| User::new("unknown"));
        Some(Self::new(message.guild_id.clone(), user, name.clone(), args.clone()))
    }

    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}
