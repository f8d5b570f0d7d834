use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A bounded contiguous slice of source text: the unit of embedding and
/// storage.
///
/// The `id` is the string form of the chunk's sequential position within
/// its source, assigned once per ingestion run and reused as the store id.
///
/// # Examples
///
/// ```
/// use chorus_core::Chunk;
///
/// let chunk = Chunk {
///     id: "0".into(),
///     text: "fn main() {}".into(),
/// };
/// assert_eq!(chunk.id, "0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Sequential position within the source, as a string.
    pub id: String,
    /// Chunk text. Bounded by the chunking policy, except when a single
    /// atomic unit is itself larger.
    pub text: String,
}

/// A result from a similarity query against the vector index.
///
/// `code` is the stored chunk text from the record's metadata. It is
/// `None` when the record carried no `code` field — such matches are
/// still reported (id + score) rather than dropped, and callers filter
/// separately when only text-bearing matches matter.
///
/// # Examples
///
/// ```
/// use chorus_core::ChunkMatch;
///
/// let m = ChunkMatch {
///     id: "3".into(),
///     score: 0.92,
///     code: Some("fn main() {}".into()),
/// };
/// assert!(m.code.is_some());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMatch {
    /// Stored record id.
    pub id: String,
    /// Similarity score as reported by the index. The pipeline relies
    /// only on "best first, top_k total"; the metric defines direction.
    pub score: f64,
    /// Stored chunk text, when the record carried it.
    pub code: Option<String>,
}

/// The final generated answer paired with its originating query.
///
/// # Examples
///
/// ```
/// use chorus_core::Answer;
///
/// let answer = Answer {
///     query: "what does main do?".into(),
///     text: "It prints a greeting.".into(),
/// };
/// let md = answer.to_markdown();
/// assert!(md.starts_with("# Response"));
/// assert!(md.contains("## Prompt"));
/// assert!(md.contains("## Response"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The free-text query the answer responds to.
    pub query: String,
    /// The generated answer text.
    pub text: String,
}

impl Answer {
    /// Render the answer artifact: a top-level title, a prompt section
    /// echoing the query, and a response section, in that fixed order.
    pub fn to_markdown(&self) -> String {
        format!(
            "# Response\n\n## Prompt\n{}\n\n## Response\n{}",
            self.query, self.text
        )
    }
}

/// Output format for CLI results.
///
/// # Examples
///
/// ```
/// use chorus_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summaries.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_markdown_sections_in_order() {
        let answer = Answer {
            query: "Q".into(),
            text: "A".into(),
        };
        let md = answer.to_markdown();
        let prompt_pos = md.find("## Prompt").unwrap();
        let response_pos = md.find("## Response").unwrap();
        assert!(md.starts_with("# Response"));
        assert!(prompt_pos < response_pos);
        assert!(md.contains("\nQ\n"));
        assert!(md.ends_with("A"));
    }

    #[test]
    fn chunk_match_without_code_deserializes() {
        let json = r#"{"id": "7", "score": 0.4, "code": null}"#;
        let m: ChunkMatch = serde_json::from_str(json).unwrap();
        assert_eq!(m.id, "7");
        assert!(m.code.is_none());
    }

    #[test]
    fn output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
