//! Built-in conversation templates.

use crate::conversation::{Conversation, Message, MessageStatus, Participant, Sender};

/// Keys and one-line descriptions of every built-in template.
pub const TEMPLATE_KEYS: &[(&str, &str)] = &[
    ("starter", "Two-line hello, a minimal smoke test"),
    ("sales", "A customer asks about a product and buys it"),
    ("support", "A login problem walked through with tech support"),
    ("invite", "Friends planning a barbecue"),
];

/// Look up a built-in template by key.
pub fn by_name(key: &str) -> Option<Conversation> {
    match key {
        "starter" => Some(starter()),
        "sales" => Some(sales()),
        "support" => Some(support()),
        "invite" => Some(invite()),
        _ => None,
    }
}

/// All built-in templates, in listing order.
pub fn all() -> Vec<(&'static str, Conversation)> {
    TEMPLATE_KEYS
        .iter()
        .filter_map(|(key, _)| by_name(key).map(|c| (*key, c)))
        .collect()
}

fn message(
    id: &str,
    text: &str,
    sender: Sender,
    timestamp: &str,
    status: MessageStatus,
) -> Message {
    Message {
        id: id.to_string(),
        text: text.to_string(),
        sender,
        timestamp: timestamp.to_string(),
        status,
        image: None,
    }
}

/// The conversation used when nothing else is specified.
pub fn starter() -> Conversation {
    Conversation {
        id: "starter".to_string(),
        contact: Participant {
            name: "Contact".to_string(),
            avatar: None,
            status: Some("online".to_string()),
        },
        user: Participant::named("You"),
        messages: vec![
            message(
                "1",
                "Hello! How can I help?",
                Sender::Contact,
                "10:30",
                MessageStatus::Read,
            ),
            message(
                "2",
                "Hi! Just trying out the tool 😊",
                Sender::Own,
                "10:31",
                MessageStatus::Read,
            ),
        ],
        show_watermark: false,
    }
}

fn sales() -> Conversation {
    Conversation {
        id: "template-sales".to_string(),
        contact: Participant {
            name: "Interested Customer".to_string(),
            avatar: None,
            status: Some("online".to_string()),
        },
        user: Participant::named("You"),
        messages: vec![
            message(
                "1",
                "Hi! I saw your product and really liked it. Is it still available?",
                Sender::Contact,
                "10:30",
                MessageStatus::Read,
            ),
            message(
                "2",
                "Hello! Yes, we have it in stock. Which model would you like?",
                Sender::Own,
                "10:31",
                MessageStatus::Read,
            ),
            message(
                "3",
                "The premium one. How much is it?",
                Sender::Contact,
                "10:32",
                MessageStatus::Read,
            ),
            message(
                "4",
                "$299.90 up front, or three installments interest-free!",
                Sender::Own,
                "10:33",
                MessageStatus::Read,
            ),
            message(
                "5",
                "Perfect! I'll take it 😊",
                Sender::Contact,
                "10:35",
                MessageStatus::Read,
            ),
        ],
        show_watermark: true,
    }
}

fn support() -> Conversation {
    Conversation {
        id: "template-support".to_string(),
        contact: Participant {
            name: "Tech Support".to_string(),
            avatar: None,
            status: Some("available".to_string()),
        },
        user: Participant::named("You"),
        messages: vec![
            message(
                "1",
                "Hi! I'm having a problem with the app",
                Sender::Own,
                "14:20",
                MessageStatus::Read,
            ),
            message(
                "2",
                "Hello! Describe the problem so I can help.",
                Sender::Contact,
                "14:21",
                MessageStatus::Read,
            ),
            message(
                "3",
                "I can't log in",
                Sender::Own,
                "14:22",
                MessageStatus::Read,
            ),
            message(
                "4",
                "Got it. Let me check your account. One moment...",
                Sender::Contact,
                "14:23",
                MessageStatus::Read,
            ),
            message(
                "5",
                "Done! Problem fixed. Try logging in again.",
                Sender::Contact,
                "14:25",
                MessageStatus::Read,
            ),
        ],
        show_watermark: true,
    }
}

fn invite() -> Conversation {
    Conversation {
        id: "template-invite".to_string(),
        contact: Participant {
            name: "Best Friend".to_string(),
            avatar: None,
            status: Some("online".to_string()),
        },
        user: Participant::named("You"),
        messages: vec![
            message(
                "1",
                "Hey, what are you doing tomorrow?",
                Sender::Own,
                "19:15",
                MessageStatus::Read,
            ),
            message(
                "2",
                "Nothing special, why?",
                Sender::Contact,
                "19:16",
                MessageStatus::Read,
            ),
            message(
                "3",
                "Barbecue at my place? 🍖",
                Sender::Own,
                "19:17",
                MessageStatus::Read,
            ),
            message(
                "4",
                "Nice! What time?",
                Sender::Contact,
                "19:18",
                MessageStatus::Read,
            ),
            message(
                "5",
                "From 4pm on. Be there!",
                Sender::Own,
                "19:19",
                MessageStatus::Delivered,
            ),
        ],
        show_watermark: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_key_resolves() {
        for (key, _) in TEMPLATE_KEYS {
            let conversation = by_name(key);
            assert!(conversation.is_some(), "template {key} missing");
        }
        assert_eq!(all().len(), TEMPLATE_KEYS.len());
    }

    #[test]
    fn test_unknown_key_is_none() {
        assert!(by_name("does-not-exist").is_none());
    }

    #[test]
    fn test_templates_have_messages_and_distinct_ids() {
        let templates = all();
        for (key, conversation) in &templates {
            assert!(
                !conversation.messages.is_empty(),
                "template {key} has no messages"
            );
            let mut ids: Vec<_> = conversation.messages.iter().map(|m| &m.id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(
                ids.len(),
                conversation.messages.len(),
                "template {key} has duplicate message ids"
            );
        }
    }

    #[test]
    fn test_templates_round_trip_through_json() {
        for (key, conversation) in all() {
            let json = serde_json::to_string(&conversation).unwrap();
            let parsed: Conversation = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed.id, conversation.id, "template {key}");
            assert_eq!(parsed.messages.len(), conversation.messages.len());
        }
    }
}
