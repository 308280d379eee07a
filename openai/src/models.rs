//! `GET /v1/models`: a static-ish listing derived from whatever model ids
//! clients have actually requested, since the vendor has no models-list
//! endpoint of its own.

use crate::sse::ModelInfo;
use crate::sse::ModelsResponse;

const KNOWN_MODELS: &[&str] = &[
    "gpt-4o",
    "gpt-4o-mini",
    "o1",
    "o3-mini",
    "claude-3-5-sonnet",
    "claude-3-7-sonnet",
    "claude-opus-4",
    "gemini-2.0-flash",
    "gemini-2.5-pro",
    "grok-2",
    "cursor-small",
];

/// Best-effort vendor inference from a model id's naming convention.
pub fn infer_owner(model_name: &str) -> &'static str {
    let lower = model_name.to_ascii_lowercase();
    let looks_like_o_series =
        lower.starts_with('o') && lower.chars().nth(1).is_some_and(|c| c.is_ascii_digit());
    if lower.starts_with("gpt") || looks_like_o_series {
        "openai"
    } else if lower.starts_with("claude") {
        "anthropic"
    } else if lower.starts_with("gemini") {
        "google"
    } else if lower.starts_with("grok") {
        "xai"
    } else {
        "cursor"
    }
}

pub fn list_models(created: u64) -> ModelsResponse {
    ModelsResponse {
        object: "list",
        data: KNOWN_MODELS
            .iter()
            .map(|&id| ModelInfo {
                id: id.to_string(),
                object: "model",
                created,
                owned_by: infer_owner(id).to_string(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_known_vendor_prefixes() {
        assert_eq!(infer_owner("gpt-4o"), "openai");
        assert_eq!(infer_owner("o3-mini"), "openai");
        assert_eq!(infer_owner("claude-3-7-sonnet"), "anthropic");
        assert_eq!(infer_owner("gemini-2.5-pro"), "google");
        assert_eq!(infer_owner("grok-2"), "xai");
        assert_eq!(infer_owner("cursor-small"), "cursor");
    }

    #[test]
    fn lists_every_known_model_once() {
        let response = list_models(0);
        assert_eq!(response.data.len(), KNOWN_MODELS.len());
    }
}
