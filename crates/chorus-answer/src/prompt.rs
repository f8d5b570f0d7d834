use chorus_core::ChunkMatch;

const ANSWER_SYSTEM_PROMPT: &str =
    "You are a helpful assistant that tailors responses to specific code snippets.";

/// Build the system prompt for grounded question answering.
///
/// # Examples
///
/// ```
/// use chorus_answer::prompt::build_answer_system_prompt;
///
/// let prompt = build_answer_system_prompt();
/// assert!(prompt.contains("code snippets"));
/// ```
pub fn build_answer_system_prompt() -> String {
    ANSWER_SYSTEM_PROMPT.to_string()
}

/// Build the user prompt asking for an explanation of one code chunk.
///
/// # Examples
///
/// ```
/// use chorus_answer::prompt::build_explain_prompt;
///
/// let prompt = build_explain_prompt("fn main() {}");
/// assert!(prompt.contains("fn main() {}"));
/// ```
pub fn build_explain_prompt(chunk: &str) -> String {
    format!("Here is a chunk of code:\n\n{chunk}\n\nPlease explain what this code does in detail.")
}

/// Build the user prompt grounding a question in retrieved snippets.
///
/// Each text-bearing match is labelled with its record id so the
/// response can reference specific snippets; matches without stored
/// text are skipped. The question follows the snippets.
///
/// # Examples
///
/// ```
/// use chorus_core::ChunkMatch;
/// use chorus_answer::prompt::build_answer_prompt;
///
/// let matches = vec![ChunkMatch {
///     id: "3".into(),
///     score: 0.9,
///     code: Some("fn auth() {}".into()),
/// }];
/// let prompt = build_answer_prompt("how does auth work?", &matches);
/// assert!(prompt.contains("### Code Snippet (ID: 3):"));
/// assert!(prompt.contains("how does auth work?"));
/// ```
pub fn build_answer_prompt(query: &str, matches: &[ChunkMatch]) -> String {
    let mut prompt = String::from("You have the following code snippets from the application:\n\n");

    for m in matches {
        if let Some(code) = &m.code {
            prompt.push_str(&format!("### Code Snippet (ID: {}):\n{code}\n\n", m.id));
        }
    }

    prompt.push_str(&format!(
        "### Question:\n{query}\n\nPlease provide a detailed response tailored to the code snippets provided above."
    ));
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_match(id: &str, code: &str) -> ChunkMatch {
        ChunkMatch {
            id: id.into(),
            score: 0.5,
            code: Some(code.into()),
        }
    }

    #[test]
    fn explain_prompt_wraps_chunk() {
        let prompt = build_explain_prompt("let x = 1;");
        assert!(prompt.starts_with("Here is a chunk of code:"));
        assert!(prompt.contains("let x = 1;"));
        assert!(prompt.ends_with("explain what this code does in detail."));
    }

    #[test]
    fn answer_prompt_labels_each_snippet() {
        let matches = vec![text_match("0", "fn a() {}"), text_match("7", "fn b() {}")];
        let prompt = build_answer_prompt("what do these do?", &matches);
        assert!(prompt.contains("### Code Snippet (ID: 0):\nfn a() {}"));
        assert!(prompt.contains("### Code Snippet (ID: 7):\nfn b() {}"));
        assert!(prompt.contains("### Question:\nwhat do these do?"));
    }

    #[test]
    fn answer_prompt_skips_textless_matches() {
        let matches = vec![
            text_match("0", "fn a() {}"),
            ChunkMatch {
                id: "1".into(),
                score: 0.4,
                code: None,
            },
        ];
        let prompt = build_answer_prompt("q", &matches);
        assert!(prompt.contains("ID: 0"));
        assert!(!prompt.contains("ID: 1"));
    }

    #[test]
    fn question_follows_the_snippets() {
        let matches = vec![text_match("0", "code")];
        let prompt = build_answer_prompt("q", &matches);
        let snippet_pos = prompt.find("### Code Snippet").unwrap();
        let question_pos = prompt.find("### Question:").unwrap();
        assert!(snippet_pos < question_pos);
    }
}
