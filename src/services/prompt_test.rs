use super::*;
use uuid::Uuid;

fn history(contents: &[(Sender, &str)]) -> Vec<Message> {
    let case_id = Uuid::new_v4();
    contents
        .iter()
        .map(|(sender, content)| Message::new(case_id, *sender, (*content).to_string(), Vec::new()))
        .collect()
}

#[test]
fn compose_empty_history_yields_only_new_input() {
    let turns = compose(&[], "What does Art. 1382 cover?");
    assert_eq!(turns, vec![AiMessage::user("What does Art. 1382 cover?")]);
}

#[test]
fn compose_preserves_roles_and_order() {
    let history = history(&[(Sender::User, "q1"), (Sender::Assistant, "a1"), (Sender::User, "q2"), (Sender::Assistant, "a2")]);
    let turns = compose(&history, "q3");

    assert_eq!(turns.len(), history.len() + 1);
    let roles: Vec<AiRole> = turns.iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![AiRole::User, AiRole::Assistant, AiRole::User, AiRole::Assistant, AiRole::User]);
    let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, vec!["q1", "a1", "q2", "a2", "q3"]);
}

#[test]
fn compose_never_emits_system_turns() {
    let history = history(&[(Sender::Assistant, "greeting")]);
    let turns = compose(&history, "hello");
    assert!(turns.iter().all(|t| t.role != AiRole::System));
    assert_eq!(turns.last().unwrap().content, "hello");
}

#[test]
fn save_replaces_prompt_and_keeps_messages() {
    let id = Uuid::new_v4();
    let mut case = Case { id, system_prompt: DEFAULT_SYSTEM_PROMPT.into(), messages: history(&[(Sender::User, "q")]) };
    save_system_prompt(&mut case, "Focus on Belgian tenancy law.".into());
    assert_eq!(case.system_prompt, "Focus on Belgian tenancy law.");
    assert_eq!(case.messages.len(), 1);

    reset_system_prompt(&mut case);
    assert_eq!(case.system_prompt, DEFAULT_SYSTEM_PROMPT);
}

#[test]
fn default_prompt_targets_belgian_law() {
    assert!(DEFAULT_SYSTEM_PROMPT.starts_with("You are a legal assistant AI"));
    assert!(DEFAULT_SYSTEM_PROMPT.contains("Belgian law"));
}

#[test]
fn blank_prompt_resolves_to_default() {
    assert_eq!(resolve_system_prompt(None), DEFAULT_SYSTEM_PROMPT);
    assert_eq!(resolve_system_prompt(Some(" \n ".into())), DEFAULT_SYSTEM_PROMPT);
    assert_eq!(resolve_system_prompt(Some("Tax law.".into())), "Tax law.");

    let mut case = Case { id: Uuid::new_v4(), system_prompt: "custom".into(), messages: Vec::new() };
    save_system_prompt(&mut case, "   ".into());
    assert_eq!(case.system_prompt, DEFAULT_SYSTEM_PROMPT);
}
