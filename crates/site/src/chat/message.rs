/// Stable identifier for one chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub u64);

impl MessageId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// Chat speaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Author {
    User,
    Bot,
}

impl Author {
    /// Class list for the rendered bubble.
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "chat-message user",
            Self::Bot => "chat-message bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub author: Author,
    /// Plain text; `\n` marks a line break.
    pub text: String,
    pub created_at_unix_millis: u64,
}

impl ChatMessage {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split('\n')
    }
}

/// Append-only conversation log, oldest first.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    next_id: u64,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        author: Author,
        text: impl Into<String>,
        created_at_unix_millis: u64,
    ) -> MessageId {
        let id = MessageId::new(self.next_id);
        self.next_id += 1;
        self.messages.push(ChatMessage {
            id,
            author,
            text: text.into(),
            created_at_unix_millis,
        });
        id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_follow_insertion_order() {
        let mut log = MessageLog::new();
        let first = log.push(Author::Bot, "ようこそ", 10);
        let second = log.push(Author::User, "料金は？", 20);

        assert!(first < second);
        assert_eq!(
            log.messages().iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![first, second]
        );
        assert_eq!(log.last().map(|m| m.author), Some(Author::User));
    }

    #[test]
    fn role_classes_and_lines() {
        assert_eq!(Author::User.css_class(), "chat-message user");
        assert_eq!(Author::Bot.css_class(), "chat-message bot");

        let mut log = MessageLog::new();
        log.push(Author::Bot, "一行目\n\n三行目", 0);
        assert_eq!(
            log.messages()[0].lines().collect::<Vec<_>>(),
            vec!["一行目", "", "三行目"]
        );
    }
}
