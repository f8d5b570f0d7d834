//! The two generation modes over retrieved chunks.
//!
//! Explanation is best-effort per chunk; answering is all-or-nothing
//! and refuses to call the provider without grounding context.

use chorus_core::{Answer, ChorusError, ChunkMatch};

use crate::llm::{ChatMessage, LlmClient, Role};
use crate::prompt::{build_answer_prompt, build_answer_system_prompt, build_explain_prompt};

/// Explain each chunk of code independently.
///
/// Produces one labelled section per successful chunk, in input order,
/// numbered from 1. A chunk whose provider call fails is logged and
/// skipped; the run continues and the section numbering keeps the
/// original positions.
pub async fn explain_chunks(client: &LlmClient, chunks: &[String]) -> Vec<String> {
    let mut sections = Vec::new();

    for (idx, chunk) in chunks.iter().enumerate() {
        let prompt = build_explain_prompt(chunk);
        match client.complete(&prompt).await {
            Ok(text) => sections.push(format!("### Analysis for Chunk {}:\n\n{text}\n", idx + 1)),
            Err(e) => eprintln!("warning: failed to analyze chunk {}: {e}", idx + 1),
        }
    }

    sections
}

/// Answer a question grounded in retrieved snippets.
///
/// Matches without stored text contribute nothing; if no match carries
/// text the provider is never called and the query fails with
/// [`ChorusError::NoContext`].
///
/// # Errors
///
/// Returns [`ChorusError::NoContext`] when no grounding text is
/// available, or [`ChorusError::Generation`] if the provider call
/// fails.
pub async fn answer(
    client: &LlmClient,
    query: &str,
    matches: &[ChunkMatch],
) -> Result<Answer, ChorusError> {
    if !matches.iter().any(|m| m.code.is_some()) {
        return Err(ChorusError::NoContext);
    }

    let messages = vec![
        ChatMessage {
            role: Role::System,
            content: build_answer_system_prompt(),
        },
        ChatMessage {
            role: Role::User,
            content: build_answer_prompt(query, matches),
        },
    ];

    let text = client.chat(messages).await?;
    Ok(Answer {
        query: query.to_string(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chorus_core::LlmConfig;

    fn unreachable_client() -> LlmClient {
        // Closed local port: any call that reaches the provider fails.
        LlmClient::new(&LlmConfig {
            api_key: Some("test-key".into()),
            base_url: Some("http://127.0.0.1:1".into()),
            ..LlmConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn answer_without_context_never_calls_provider() {
        let client = unreachable_client();
        let matches = vec![ChunkMatch {
            id: "0".into(),
            score: 0.9,
            code: None,
        }];

        // NoContext, not a transport error: the check fires first.
        let result = answer(&client, "what is this?", &matches).await;
        assert!(matches!(result, Err(ChorusError::NoContext)));
    }

    #[tokio::test]
    async fn answer_with_empty_matches_is_no_context() {
        let client = unreachable_client();
        let result = answer(&client, "anything", &[]).await;
        assert!(matches!(result, Err(ChorusError::NoContext)));
    }

    #[tokio::test]
    async fn answer_propagates_provider_failure() {
        let client = unreachable_client();
        let matches = vec![ChunkMatch {
            id: "0".into(),
            score: 0.9,
            code: Some("fn main() {}".into()),
        }];

        let result = answer(&client, "what is this?", &matches).await;
        assert!(matches!(result, Err(ChorusError::Generation(_))));
    }

    #[tokio::test]
    async fn explain_skips_failing_chunks() {
        let client = unreachable_client();
        let chunks = vec!["fn a() {}".to_string(), "fn b() {}".to_string()];

        let sections = explain_chunks(&client, &chunks).await;
        assert!(sections.is_empty());
    }
}
