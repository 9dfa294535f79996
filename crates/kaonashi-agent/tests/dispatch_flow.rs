// SPDX-FileCopyrightText: 2026 Kaonashi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end conversation flows through the dispatcher with mock adapters.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use kaonashi_agent::Dispatcher;
use kaonashi_agent::correlator::{EMAIL_PROMPT, HASH_PROMPT};
use kaonashi_agent::format;
use kaonashi_config::model::KaonashiConfig;
use kaonashi_core::types::{
    Attachment, BreachRecord, ConversationId, EngineVerdict, InboundMessage, LookupKind,
    LookupResult, MalwareVerdict, MessageId, ReplyTarget,
};
use kaonashi_test_utils::{MockLookup, MockTransport, RECIPIENT, TestHarness, credentials_json};
use secrecy::ExposeSecret;
use tokio_util::sync::CancellationToken;

const DIGEST: &str = "d41d8cd98f00b204e9800998ecf8427e";

fn harness() -> TestHarness {
    TestHarness::builder().build().unwrap()
}

fn record(name: &str, domain: &str) -> BreachRecord {
    BreachRecord {
        source_name: name.into(),
        domain: domain.into(),
        breach_date: "2013-10-04".into(),
        title: name.into(),
    }
}

fn flagged_verdict() -> MalwareVerdict {
    let mut engines = BTreeMap::new();
    engines.insert(
        "Kaspersky".to_string(),
        EngineVerdict {
            category: "malicious".into(),
            result: Some("HEUR:Trojan.Win32.Generic".into()),
        },
    );
    engines.insert(
        "ClamAV".to_string(),
        EngineVerdict {
            category: "undetected".into(),
            result: None,
        },
    );
    MalwareVerdict::from_engines(engines)
}

#[tokio::test]
async fn checkmalware_scenario_reports_positive() {
    let mut h = harness();
    h.malware
        .push_result(LookupResult::Malware(flagged_verdict()))
        .await;

    h.say(RECIPIENT, "/checkmalware").await;
    let prompt = h.last_sent().await;
    assert_eq!(prompt.message.content, "Please enter the hash of the file:");
    assert!(prompt.message.force_reply);
    assert_eq!(prompt.message.conversation_id, RECIPIENT);

    h.reply_to(RECIPIENT, &prompt, DIGEST).await;

    let answer = h.last_sent().await;
    assert_eq!(answer.message.content, "Positive Found: This is a malware 💀");
    assert!(!answer.message.force_reply);

    let calls = h.malware.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, DIGEST);
    assert_eq!(calls[0].key, "vt-initial");
    assert_eq!(h.breach.call_count().await, 0);
}

#[tokio::test]
async fn checkpwned_lists_breaches_in_order() {
    let mut h = harness();
    h.breach
        .push_result(LookupResult::BreachList(vec![
            record("Adobe", "adobe.com"),
            record("LinkedIn", "linkedin.com"),
        ]))
        .await;

    h.say(RECIPIENT, "/checkpwned").await;
    let prompt = h.last_sent().await;
    assert_eq!(prompt.message.content, EMAIL_PROMPT);

    h.reply_to(RECIPIENT, &prompt, "  user@example.com \n").await;

    let text = h.last_sent().await.message.content;
    assert!(text.starts_with("Your email has been pwned in the following breaches:\n\n"));
    let adobe = text.find("Name: Adobe").unwrap();
    let linkedin = text.find("Name: LinkedIn").unwrap();
    assert!(adobe < linkedin);
    assert!(!text.contains("Description"));

    let calls = h.breach.calls().await;
    assert_eq!(calls[0].query, "user@example.com");
    assert_eq!(calls[0].key, "hibp-initial");
}

#[tokio::test]
async fn unknown_email_is_good_news() {
    let mut h = harness();
    h.say(RECIPIENT, "/checkpwned").await;
    let prompt = h.last_sent().await;
    h.reply_to(RECIPIENT, &prompt, "user@example.com").await;

    assert_eq!(h.last_sent().await.message.content, format::NOT_PWNED);
}

#[tokio::test]
async fn email_answer_survives_interleaved_chatter() {
    let mut h = harness();
    let other = ConversationId(7);

    h.say(RECIPIENT, "/checkpwned").await;
    let prompt = h.last_sent().await;

    h.say(RECIPIENT, "hello?").await;
    h.say(other, "/checkmalware").await;
    let other_prompt = h.last_sent().await;
    h.reply_to(other, &other_prompt, DIGEST).await;
    h.say(RECIPIENT, "still there").await;

    h.reply_to(RECIPIENT, &prompt, "user@example.com").await;

    assert_eq!(h.breach.call_count().await, 1);
    assert_eq!(h.malware.call_count().await, 1);
    assert_eq!(h.malware.calls().await[0].query, DIGEST);
}

#[tokio::test]
async fn reply_to_superseded_prompt_is_ignored() {
    let mut h = harness();

    h.say(RECIPIENT, "/checkpwned").await;
    let first = h.last_sent().await;
    h.say(RECIPIENT, "/checkmalware").await;
    let second = h.last_sent().await;
    let sent_before = h.transport.sent_count().await;

    h.reply_to(RECIPIENT, &first, "user@example.com").await;
    assert_eq!(h.breach.call_count().await, 0);
    assert_eq!(h.malware.call_count().await, 0);
    assert_eq!(h.transport.sent_count().await, sent_before);

    h.reply_to(RECIPIENT, &second, DIGEST).await;
    assert_eq!(h.malware.call_count().await, 1);
}

#[tokio::test]
async fn command_sent_as_reply_answers_old_prompt_and_issues_new_one() {
    let mut h = harness();
    h.say(RECIPIENT, "/checkpwned").await;
    let first = h.last_sent().await;
    let sent_before = h.transport.sent_count().await;

    h.reply_to(RECIPIENT, &first, "/checkpwned").await;

    let sent = h.transport.sent_messages().await;
    let new: Vec<_> = sent[sent_before..].iter().collect();
    assert_eq!(new.len(), 2);
    assert_eq!(new[0].message.content, EMAIL_PROMPT);
    assert!(new[0].message.force_reply);
    assert_eq!(new[1].message.content, format::INVALID_EMAIL);
    assert_eq!(h.breach.call_count().await, 0);

    let second = new[0].clone();
    h.reply_to(RECIPIENT, &second, "user@example.com").await;
    assert_eq!(h.breach.call_count().await, 1);
    assert_eq!(h.breach.calls().await[0].query, "user@example.com");
}

#[tokio::test]
async fn command_sent_as_text_matched_reply_keeps_new_prompt() {
    let mut h = harness();
    h.say(RECIPIENT, "/checkmalware").await;
    let sent_before = h.transport.sent_count().await;

    h.reply_with(
        RECIPIENT,
        ReplyTarget {
            message_id: None,
            text: Some(HASH_PROMPT.into()),
        },
        "/checkpwned",
    )
    .await;

    let sent = h.transport.sent_messages().await;
    assert_eq!(sent.len(), sent_before + 2);
    assert_eq!(sent[sent_before].message.content, EMAIL_PROMPT);
    assert_eq!(sent[sent_before + 1].message.content, format::INVALID_DIGEST);
    assert_eq!(h.malware.call_count().await, 0);

    let prompt = sent[sent_before].clone();
    h.reply_to(RECIPIENT, &prompt, "user@example.com").await;
    assert_eq!(h.breach.call_count().await, 1);
}

#[tokio::test]
async fn service_error_sends_generic_failure() {
    let mut h = harness();
    h.malware
        .push_result(LookupResult::ServiceError(
            "403 Forbidden: WrongCredentialsError".into(),
        ))
        .await;

    h.say(RECIPIENT, "/checkmalware").await;
    let prompt = h.last_sent().await;
    h.reply_to(RECIPIENT, &prompt, DIGEST).await;

    let text = h.last_sent().await.message.content;
    assert_eq!(text, "An error occurred while checking for malware.");
    assert!(!text.contains("403"));

    // The dispatcher keeps going after a failed lookup.
    h.say(RECIPIENT, "/checkpwned").await;
    assert_eq!(h.last_sent().await.message.content, EMAIL_PROMPT);
}

#[tokio::test]
async fn invalid_email_consumes_prompt() {
    let mut h = harness();
    h.say(RECIPIENT, "/checkpwned").await;
    let prompt = h.last_sent().await;

    h.reply_to(RECIPIENT, &prompt, "not an email").await;
    assert_eq!(h.last_sent().await.message.content, format::INVALID_EMAIL);
    assert_eq!(h.breach.call_count().await, 0);

    let sent_before = h.transport.sent_count().await;
    h.reply_to(RECIPIENT, &prompt, "user@example.com").await;
    assert_eq!(h.breach.call_count().await, 0);
    assert_eq!(h.transport.sent_count().await, sent_before);
}

#[tokio::test]
async fn invalid_digest_is_rejected() {
    let mut h = harness();
    h.say(RECIPIENT, "/checkmalware").await;
    let prompt = h.last_sent().await;

    h.reply_to(RECIPIENT, &prompt, "not-a-hash").await;
    assert_eq!(h.last_sent().await.message.content, format::INVALID_DIGEST);
    assert_eq!(h.malware.call_count().await, 0);
}

#[tokio::test]
async fn expired_prompt_is_not_answered() {
    let mut h = TestHarness::builder().with_prompt_ttl(60).build().unwrap();
    h.say(RECIPIENT, "/checkpwned").await;
    let prompt = h.last_sent().await;
    let sent_before = h.transport.sent_count().await;

    h.advance(61);
    h.reply_to(RECIPIENT, &prompt, "user@example.com").await;

    assert_eq!(h.breach.call_count().await, 0);
    assert_eq!(h.transport.sent_count().await, sent_before);
}

#[tokio::test]
async fn text_only_reply_target_falls_back_to_prompt_text() {
    let mut h = harness();
    h.say(RECIPIENT, "/checkmalware").await;

    h.reply_with(
        RECIPIENT,
        ReplyTarget {
            message_id: None,
            text: Some(HASH_PROMPT.into()),
        },
        DIGEST,
    )
    .await;

    assert_eq!(h.malware.call_count().await, 1);
}

#[tokio::test]
async fn unsent_prompt_still_matches_by_text() {
    let mut h = harness();
    h.transport.fail_sends(true);
    h.say(RECIPIENT, "/checkpwned").await;
    h.transport.fail_sends(false);

    h.reply_with(
        RECIPIENT,
        ReplyTarget {
            message_id: Some(MessageId("unknown".into())),
            text: Some(EMAIL_PROMPT.into()),
        },
        "user@example.com",
    )
    .await;

    assert_eq!(h.breach.call_count().await, 1);
}

#[tokio::test]
async fn unrelated_messages_get_no_reply() {
    let mut h = harness();
    h.say(RECIPIENT, "hello").await;
    h.reply_with(RECIPIENT, ReplyTarget::default(), "user@example.com")
        .await;

    assert_eq!(h.transport.sent_count().await, 0);
}

#[tokio::test]
async fn config_upload_replaces_credentials() {
    let mut h = harness();
    let payload = credentials_json(RECIPIENT, "rotated");

    h.upload(RECIPIENT, payload.as_bytes()).await;

    assert_eq!(
        h.last_sent().await.message.content,
        "Gnom...Gnom...Config file eaten successfully. /checkmalware or /checkpwned"
    );
    assert_eq!(
        h.store.current().breach_service_key.expose_secret(),
        "hibp-rotated"
    );
    let persisted = std::fs::read_to_string(h.store.path()).unwrap();
    assert_eq!(persisted, payload);

    h.say(RECIPIENT, "/checkpwned").await;
    let prompt = h.last_sent().await;
    h.reply_to(RECIPIENT, &prompt, "user@example.com").await;
    assert_eq!(h.breach.calls().await[0].key, "hibp-rotated");
}

#[tokio::test]
async fn incomplete_upload_keeps_current_credentials() {
    let mut h = harness();
    h.upload(
        RECIPIENT,
        br#"{"telegram_bot_token":"123:t","chat_id":4242,"hibp_api_key":"only-this"}"#,
    )
    .await;

    assert_eq!(
        h.last_sent().await.message.content,
        "An error occurred while updating the config file."
    );
    assert_eq!(
        h.store.current().malware_service_key.expose_secret(),
        "vt-initial"
    );
}

#[tokio::test]
async fn upload_from_other_conversation_is_ignored() {
    let mut h = harness();
    h.upload(ConversationId(7), credentials_json(ConversationId(7), "evil").as_bytes())
        .await;

    assert_eq!(h.transport.sent_count().await, 0);
    assert_eq!(h.store.current().recipient_id, RECIPIENT);
    assert_eq!(
        h.store.current().breach_service_key.expose_secret(),
        "hibp-initial"
    );
}

#[tokio::test]
async fn configured_recipient_owns_uploads_and_greeting() {
    let owner = ConversationId(9001);
    let TestHarness {
        mut dispatcher,
        transport,
        store,
        ..
    } = TestHarness::builder().with_recipient(owner).build().unwrap();
    assert_eq!(store.current().recipient_id, owner);

    transport.close();
    dispatcher.run(CancellationToken::new()).await.unwrap();

    let sent = transport.sent_messages().await;
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|s| s.message.conversation_id == owner));
}

#[tokio::test]
async fn upload_from_default_chat_is_ignored_for_other_recipient() {
    let mut h = TestHarness::builder()
        .with_recipient(ConversationId(9001))
        .build()
        .unwrap();

    h.upload(RECIPIENT, credentials_json(RECIPIENT, "rotated").as_bytes())
        .await;

    assert_eq!(h.transport.sent_count().await, 0);
    assert_eq!(h.store.current().recipient_id, ConversationId(9001));
}

#[tokio::test]
async fn unreadable_attachment_reports_fetch_failure() {
    let mut h = harness();
    h.deliver(InboundMessage {
        id: MessageId("doc".into()),
        conversation_id: RECIPIENT,
        sender_id: None,
        text: None,
        reply_to: None,
        attachment: Some(Attachment {
            file_id: "missing".into(),
            file_name: Some("config.json".into()),
            size: Some(10),
        }),
        timestamp: chrono::Utc::now(),
    })
    .await;

    assert_eq!(
        h.last_sent().await.message.content,
        "An error occurred while getting the file."
    );
}

#[tokio::test]
async fn run_greets_then_dispatches_until_closed() {
    let h = harness();
    let TestHarness {
        mut dispatcher,
        transport,
        ..
    } = h;

    transport
        .inject_message(InboundMessage {
            id: MessageId("1".into()),
            conversation_id: RECIPIENT,
            sender_id: None,
            text: Some("/checkpwned".into()),
            reply_to: None,
            attachment: None,
            timestamp: chrono::Utc::now(),
        })
        .await;
    transport.close();

    tokio::time::timeout(
        Duration::from_secs(5),
        dispatcher.run(CancellationToken::new()),
    )
    .await
    .expect("dispatcher did not stop")
    .unwrap();

    let sent = transport.sent_messages().await;
    assert_eq!(sent.len(), 3);
    assert_eq!(sent[0].message.content, format::GREETING);
    assert_eq!(sent[1].message.content, format::CONFIG_REQUEST);
    assert!(sent[..2].iter().all(|s| s.message.conversation_id == RECIPIENT));
    assert_eq!(sent[2].message.content, EMAIL_PROMPT);
}

#[tokio::test]
async fn run_stops_on_cancel() {
    let TestHarness {
        mut dispatcher,
        transport,
        ..
    } = harness();
    let cancel = CancellationToken::new();
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(5), dispatcher.run(cancel))
        .await
        .expect("dispatcher did not stop")
        .unwrap();

    assert_eq!(transport.sent_count().await, 2);
}

#[tokio::test]
async fn swapped_lookup_clients_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, credentials_json(RECIPIENT, "x")).unwrap();
    let store = Arc::new(kaonashi_config::CredentialStore::open(&path).unwrap());

    let result = Dispatcher::new(
        Box::new(MockTransport::new()),
        Arc::new(MockLookup::new(LookupKind::Malware)),
        Arc::new(MockLookup::new(LookupKind::Breach)),
        store,
        &KaonashiConfig::default(),
    );
    assert!(result.is_err());
}
