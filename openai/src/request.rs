//! The inbound OpenAI wire shapes `POST /v1/chat/completions` accepts.

use serde::Deserialize;
use serde_json::Value;

use crate::error::AdapterError;
use crate::error::Result;

#[derive(Debug, Deserialize, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<OaiMessage>,
    #[serde(default)]
    pub stream: bool,
    #[serde(default)]
    pub tools: Option<Vec<OaiToolDef>>,
    #[serde(default)]
    pub tool_choice: Option<Value>,
}

impl ChatCompletionRequest {
    /// `messages` must be present and non-empty; every role must be one this
    /// adapter understands.
    pub fn validate(&self) -> Result<()> {
        if self.messages.is_empty() {
            return Err(AdapterError::EmptyMessages);
        }
        for message in &self.messages {
            if !matches!(
                message.role.as_str(),
                "system" | "user" | "assistant" | "tool"
            ) {
                return Err(AdapterError::UnsupportedRole(message.role.clone()));
            }
        }
        Ok(())
    }

    pub fn tools_provided(&self) -> bool {
        self.tools.as_ref().is_some_and(|tools| !tools.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OaiMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<MessageContent>,
    #[serde(default)]
    pub tool_calls: Option<Vec<OaiToolCallResponse>>,
    #[serde(default)]
    pub tool_call_id: Option<String>,
}

impl OaiMessage {
    /// Flattens either string or array-of-text-block content into plain
    /// text, per the OpenAI content union.
    pub fn content_text(&self) -> String {
        match &self.content {
            Some(MessageContent::Text(text)) => text.clone(),
            Some(MessageContent::Blocks(blocks)) => blocks
                .iter()
                .filter_map(|b| b.text.clone())
                .collect::<Vec<_>>()
                .join(""),
            None => String::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Deserialize, Clone)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OaiToolCallResponse {
    pub id: String,
    #[serde(rename = "type", default)]
    pub tool_type: Option<String>,
    pub function: OaiFunctionCall,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OaiFunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OaiToolDef {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: OaiFunctionDef,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OaiFunctionDef {
    pub name: String,
    pub description: Option<String>,
    pub parameters: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_messages() {
        let req = ChatCompletionRequest {
            model: "auto".to_string(),
            messages: Vec::new(),
            stream: false,
            tools: None,
            tool_choice: None,
        };
        assert!(matches!(req.validate(), Err(AdapterError::EmptyMessages)));
    }

    #[test]
    fn rejects_an_unknown_role() {
        let req = ChatCompletionRequest {
            model: "auto".to_string(),
            messages: vec![OaiMessage {
                role: "narrator".to_string(),
                content: Some(MessageContent::Text("hi".to_string())),
                tool_calls: None,
                tool_call_id: None,
            }],
            stream: false,
            tools: None,
            tool_choice: None,
        };
        assert!(matches!(
            req.validate(),
            Err(AdapterError::UnsupportedRole(_))
        ));
    }

    #[test]
    fn flattens_array_content_blocks_to_text() {
        let message = OaiMessage {
            role: "user".to_string(),
            content: Some(MessageContent::Blocks(vec![
                ContentBlock {
                    block_type: "text".to_string(),
                    text: Some("hello ".to_string()),
                },
                ContentBlock {
                    block_type: "text".to_string(),
                    text: Some("world".to_string()),
                },
            ])),
            tool_calls: None,
            tool_call_id: None,
        };
        assert_eq!(message.content_text(), "hello world");
    }
}
