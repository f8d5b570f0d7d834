//! Answer artifact on disk.

use std::path::Path;

use chorus_core::{Answer, ChorusError};

/// Write the answer artifact, overwriting any previous one.
///
/// The artifact records both the prompt and the response in the layout
/// produced by [`Answer::to_markdown`], so a run's output is
/// self-describing.
///
/// # Errors
///
/// Returns [`ChorusError::Io`] if the file cannot be written.
///
/// # Examples
///
/// ```no_run
/// use chorus_core::Answer;
/// use chorus_answer::artifact::write_artifact;
///
/// let answer = Answer {
///     query: "how does auth work?".into(),
///     text: "The auth module...".into(),
/// };
/// write_artifact(&answer, "gpt_response.md").unwrap();
/// ```
pub fn write_artifact(answer: &Answer, path: impl AsRef<Path>) -> Result<(), ChorusError> {
    std::fs::write(path.as_ref(), answer.to_markdown())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_has_prompt_and_response_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpt_response.md");
        let answer = Answer {
            query: "what does split do?".into(),
            text: "It splits.".into(),
        };

        write_artifact(&answer, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "# Response\n\n## Prompt\nwhat does split do?\n\n## Response\nIt splits."
        );
    }

    #[test]
    fn artifact_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpt_response.md");

        let first = Answer {
            query: "q1".into(),
            text: "a1".into(),
        };
        let second = Answer {
            query: "q2".into(),
            text: "a2".into(),
        };
        write_artifact(&first, &path).unwrap();
        write_artifact(&second, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("q2"));
        assert!(!content.contains("q1"));
    }

    #[test]
    fn missing_parent_directory_is_an_io_error() {
        let result = write_artifact(
            &Answer {
                query: "q".into(),
                text: "a".into(),
            },
            "/nonexistent-dir/gpt_response.md",
        );
        assert!(matches!(result, Err(ChorusError::Io(_))));
    }
}
