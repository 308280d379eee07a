//! Flattens an OpenAI message array into the single text prompt a fresh
//! vendor turn is opened with.

use crate::request::OaiMessage;

pub fn flatten_prompt(messages: &[OaiMessage]) -> String {
    let mut sections = Vec::new();

    let system_contents: Vec<String> = messages
        .iter()
        .filter(|m| m.role == "system")
        .map(OaiMessage::content_text)
        .collect();
    if !system_contents.is_empty() {
        sections.push(system_contents.join("\n"));
    }

    let mut saw_tool_result = false;

    for message in messages.iter().filter(|m| m.role != "system") {
        match message.role.as_str() {
            "user" => sections.push(format!("User: {}", message.content_text())),
            "assistant" => {
                if let Some(calls) = &message.tool_calls {
                    let mut block = format!("Assistant: {}", message.content_text());
                    for call in calls {
                        block.push_str(&format!(
                            "\n[Called tool: {}({})]",
                            call.function.name, call.function.arguments
                        ));
                    }
                    sections.push(block);
                } else {
                    sections.push(format!("Assistant: {}", message.content_text()));
                }
            }
            "tool" => {
                saw_tool_result = true;
                let tool_call_id = message.tool_call_id.as_deref().unwrap_or("unknown");
                sections.push(format!(
                    "[Tool result for {}]: {}",
                    tool_call_id,
                    message.content_text()
                ));
            }
            _ => {}
        }
    }

    if saw_tool_result {
        sections.push(
            "\nBased on the tool results above, please continue your response:".to_string(),
        );
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::MessageContent;
    use crate::request::OaiFunctionCall;
    use crate::request::OaiToolCallResponse;

    fn text_message(role: &str, text: &str) -> OaiMessage {
        OaiMessage {
            role: role.to_string(),
            content: Some(MessageContent::Text(text.to_string())),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    #[test]
    fn flattens_a_simple_user_turn() {
        let messages = vec![
            text_message("system", "Be concise."),
            text_message("user", "hi there"),
        ];
        let prompt = flatten_prompt(&messages);
        assert_eq!(prompt, "Be concise.\n\nUser: hi there");
    }

    #[test]
    fn renders_tool_calls_and_results_with_the_trailing_continuation_line() {
        let mut assistant = text_message("assistant", "");
        assistant.tool_calls = Some(vec![OaiToolCallResponse {
            id: "call_abcd1234_0".to_string(),
            tool_type: Some("function".to_string()),
            function: OaiFunctionCall {
                name: "bash".to_string(),
                arguments: r#"{"command":"ls"}"#.to_string(),
            },
        }]);
        let mut tool_result = text_message("tool", "file1\nfile2");
        tool_result.tool_call_id = Some("call_abcd1234_0".to_string());

        let messages = vec![text_message("user", "list files"), assistant, tool_result];
        let prompt = flatten_prompt(&messages);

        assert!(prompt.contains("[Called tool: bash({\"command\":\"ls\"})]"));
        assert!(prompt.contains("[Tool result for call_abcd1234_0]: file1\nfile2"));
        assert!(prompt.ends_with("Based on the tool results above, please continue your response:"));
    }
}
