use super::*;

#[test]
fn case_state_new_is_idle_and_empty() {
    let id = Uuid::new_v4();
    let cs = CaseState::new(id, "prompt".into(), AiProvider::HuggingFace);
    assert_eq!(cs.case.id, id);
    assert!(cs.case.messages.is_empty());
    assert_eq!(cs.phase, ConversationPhase::Idle);
    assert_eq!(cs.provider, AiProvider::HuggingFace);
}

#[test]
fn message_new_assigns_unique_ids() {
    let case_id = Uuid::new_v4();
    let a = Message::new(case_id, Sender::User, "a".into(), Vec::new());
    let b = Message::new(case_id, Sender::User, "a".into(), Vec::new());
    assert_ne!(a.id, b.id);
    assert_eq!(a.case_id, case_id);
    assert!(a.timestamp > 0);
}

#[test]
fn message_serde_omits_empty_attachments() {
    let msg = Message::new(Uuid::nil(), Sender::Assistant, "hi".into(), Vec::new());
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["sender"], "assistant");
    assert!(json.get("attachments").is_none());

    let restored: Message = serde_json::from_value(json).unwrap();
    assert_eq!(restored, msg);
}

#[test]
fn message_serde_keeps_attachments() {
    let files = vec![FileRef { name: "contract.pdf".into(), size: 2048 }];
    let msg = Message::new(Uuid::nil(), Sender::User, "see attached".into(), files.clone());
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["attachments"][0]["name"], "contract.pdf");
    assert_eq!(json["attachments"][0]["size"], 2048);
}

#[test]
fn snapshot_reflects_runtime_state() {
    let id = Uuid::new_v4();
    let mut cs = CaseState::new(id, "prompt".into(), AiProvider::OpenAi);
    cs.phase = ConversationPhase::AwaitingResponse;
    cs.case
        .messages
        .push(Message::new(id, Sender::User, "q".into(), Vec::new()));

    let snap = cs.snapshot();
    assert_eq!(snap.id, id);
    assert_eq!(snap.messages.len(), 1);
    assert_eq!(snap.phase, ConversationPhase::AwaitingResponse);
    let json = serde_json::to_value(&snap).unwrap();
    assert_eq!(json["phase"], "awaiting_response");
    assert_eq!(json["provider"], "openai");
}

#[test]
fn session_provider_config_uses_matching_key() {
    let session = Session::new(test_helpers::test_keys(), AiProvider::OpenAi);
    assert_eq!(session.provider_config(AiProvider::HuggingFace).api_key, "hf-test");
    assert_eq!(session.provider_config(AiProvider::OpenAi).api_key, "sk-test");
}
