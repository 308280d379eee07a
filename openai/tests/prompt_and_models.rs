use bridge_openai::flatten_prompt;
use bridge_openai::infer_owner;
use bridge_openai::request::MessageContent;
use bridge_openai::request::OaiMessage;

fn text_message(role: &str, text: &str) -> OaiMessage {
    OaiMessage {
        role: role.to_string(),
        content: Some(MessageContent::Text(text.to_string())),
        tool_calls: None,
        tool_call_id: None,
    }
}

#[test]
fn flattens_a_multi_turn_conversation_without_tool_results() {
    let messages = vec![
        text_message("system", "You are terse."),
        text_message("user", "ping"),
        text_message("assistant", "pong"),
        text_message("user", "ping again"),
    ];
    let prompt = flatten_prompt(&messages);
    assert!(prompt.starts_with("You are terse."));
    assert!(prompt.contains("User: ping\n\nAssistant: pong"));
    assert!(!prompt.contains("Based on the tool results"));
}

#[test]
fn infers_owner_for_every_default_listed_model() {
    for model in ["gpt-4o", "claude-opus-4", "gemini-2.0-flash", "grok-2", "cursor-small"] {
        assert_ne!(infer_owner(model), "");
    }
}
