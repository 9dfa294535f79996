// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram messages into transport-neutral [`InboundMessage`]s.

use kaonashi_core::types::{Attachment, ConversationId, InboundMessage, MessageId, ReplyTarget};
use teloxide::types::Message;

/// Converts a Telegram message into an [`InboundMessage`].
///
/// Document captions stand in for the text body. Returns `None` for messages
/// that carry neither text nor a document (stickers, locations, service
/// messages), since nothing downstream can act on them.
pub fn to_inbound_message(msg: &Message) -> Option<InboundMessage> {
    let attachment = msg.document().map(|doc| Attachment {
        file_id: doc.file.id.to_string(),
        file_name: doc.file_name.clone(),
        size: Some(u64::from(doc.file.size)),
    });
    let text = msg.text().or_else(|| msg.caption()).map(str::to_owned);

    if text.is_none() && attachment.is_none() {
        return None;
    }

    let reply_to = msg.reply_to_message().map(|parent| ReplyTarget {
        message_id: Some(MessageId(parent.id.0.to_string())),
        text: parent.text().map(str::to_owned),
    });

    Some(InboundMessage {
        id: MessageId(msg.id.0.to_string()),
        conversation_id: ConversationId(msg.chat.id.0),
        sender_id: msg.from.as_ref().map(|u| u.id.0.to_string()),
        text,
        reply_to,
        attachment,
        timestamp: msg.date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn private_chat(id: i64) -> serde_json::Value {
        serde_json::json!({"id": id, "type": "private", "first_name": "Test"})
    }

    fn sender(id: u64) -> serde_json::Value {
        serde_json::json!({"id": id, "is_bot": false, "first_name": "Test"})
    }

    fn parse(json: serde_json::Value) -> Message {
        serde_json::from_value(json).expect("failed to deserialize mock message")
    }

    #[test]
    fn maps_plain_text_message() {
        let msg = parse(serde_json::json!({
            "message_id": 7,
            "date": 1700000000i64,
            "chat": private_chat(42),
            "from": sender(42),
            "text": "/checkpwned",
        }));

        let inbound = to_inbound_message(&msg).unwrap();
        assert_eq!(inbound.id, MessageId("7".into()));
        assert_eq!(inbound.conversation_id, ConversationId(42));
        assert_eq!(inbound.sender_id.as_deref(), Some("42"));
        assert_eq!(inbound.text.as_deref(), Some("/checkpwned"));
        assert!(inbound.reply_to.is_none());
        assert!(inbound.attachment.is_none());
        assert_eq!(inbound.timestamp.timestamp(), 1700000000);
    }

    #[test]
    fn maps_reply_target() {
        let msg = parse(serde_json::json!({
            "message_id": 9,
            "date": 1700000100i64,
            "chat": private_chat(42),
            "from": sender(42),
            "text": "alice@example.com",
            "reply_to_message": {
                "message_id": 8,
                "date": 1700000050i64,
                "chat": private_chat(42),
                "from": {"id": 1000, "is_bot": true, "first_name": "Kaonashi"},
                "text": "Please enter your email address:",
            },
        }));

        let inbound = to_inbound_message(&msg).unwrap();
        let reply = inbound.reply_to.unwrap();
        assert_eq!(reply.message_id, Some(MessageId("8".into())));
        assert_eq!(reply.text.as_deref(), Some("Please enter your email address:"));
    }

    #[test]
    fn maps_document_with_caption() {
        let msg = parse(serde_json::json!({
            "message_id": 3,
            "date": 1700000000i64,
            "chat": private_chat(42),
            "from": sender(42),
            "caption": "here you go",
            "document": {
                "file_id": "BQACAgIAAxkBAAIB",
                "file_unique_id": "AgADBQAC",
                "file_name": "config.json",
                "mime_type": "application/json",
                "file_size": 187,
            },
        }));

        let inbound = to_inbound_message(&msg).unwrap();
        let attachment = inbound.attachment.unwrap();
        assert_eq!(attachment.file_id, "BQACAgIAAxkBAAIB");
        assert_eq!(attachment.file_name.as_deref(), Some("config.json"));
        assert_eq!(attachment.size, Some(187));
        assert_eq!(inbound.text.as_deref(), Some("here you go"));
    }

    #[test]
    fn document_without_caption_has_no_text() {
        let msg = parse(serde_json::json!({
            "message_id": 4,
            "date": 1700000000i64,
            "chat": private_chat(42),
            "document": {
                "file_id": "BQAC",
                "file_unique_id": "AgAD",
                "file_size": 10,
            },
        }));

        let inbound = to_inbound_message(&msg).unwrap();
        assert!(inbound.text.is_none());
        assert!(inbound.sender_id.is_none());
        assert_eq!(inbound.text_or_empty(), "");
    }

    #[test]
    fn group_chat_keeps_negative_id() {
        let msg = parse(serde_json::json!({
            "message_id": 1,
            "date": 1700000000i64,
            "chat": {"id": -100123i64, "type": "supergroup", "title": "Ops"},
            "from": sender(5),
            "text": "/checkmalware",
        }));

        let inbound = to_inbound_message(&msg).unwrap();
        assert_eq!(inbound.conversation_id, ConversationId(-100123));
    }

    #[test]
    fn location_is_ignored() {
        let msg = parse(serde_json::json!({
            "message_id": 2,
            "date": 1700000000i64,
            "chat": private_chat(42),
            "from": sender(42),
            "location": {"latitude": 35.68, "longitude": 139.69},
        }));

        assert!(to_inbound_message(&msg).is_none());
    }
}
