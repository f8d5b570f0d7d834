//! Pure text-splitting strategies.
//!
//! Two interchangeable policies, both deterministic and total:
//! line-oriented greedy accumulation for source code, and mechanical
//! fixed-width slicing as a safety net before embedding arbitrary text.

use chorus_core::Chunk;

/// Split source text into line-oriented chunks of bounded joined length.
///
/// Lines are accumulated greedily: a line joins the current chunk while
/// the chunk's rejoined length (newline separators included) plus the
/// line's length stays within `max_size`. A line that would exceed the
/// bound closes the current chunk and starts a new one. The bound is
/// best-effort: a single line longer than `max_size` still forms its own
/// chunk — lines are never split.
///
/// Chunk ids are the string form of the chunk's position, starting at
/// `"0"`. Empty input produces zero chunks; any non-empty input produces
/// at least one.
///
/// # Examples
///
/// ```
/// use chorus_index::chunker::split_lines;
///
/// let chunks = split_lines("def f():\n    return 1\n", 500);
/// assert_eq!(chunks.len(), 1);
/// assert_eq!(chunks[0].id, "0");
/// assert_eq!(chunks[0].text, "def f():\n    return 1");
/// ```
pub fn split_lines(text: &str, max_size: usize) -> Vec<Chunk> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for line in text.lines() {
        // Joined length of the current chunk if this line were added,
        // newline separators included.
        let joined = if current.is_empty() {
            line.len()
        } else {
            current_len + current.len() + line.len()
        };
        if joined <= max_size || current.is_empty() {
            current_len += line.len();
            current.push(line);
        } else {
            chunks.push(current.join("\n"));
            current = vec![line];
            current_len = line.len();
        }
    }

    if !current.is_empty() {
        chunks.push(current.join("\n"));
    }

    chunks
        .into_iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            id: i.to_string(),
            text,
        })
        .collect()
}

/// Partition text into consecutive slices of exactly `width` characters.
///
/// The last slice may be shorter. Purely mechanical, no semantic
/// awareness; counts characters, not bytes, so multi-byte input never
/// splits inside a code point. A `width` of zero yields the whole text
/// as one slice.
///
/// # Examples
///
/// ```
/// use chorus_index::chunker::split_fixed;
///
/// let slices = split_fixed("abcdefg", 3);
/// assert_eq!(slices, vec!["abc", "def", "g"]);
/// ```
pub fn split_fixed(text: &str, width: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }
    if width == 0 {
        return vec![text.to_string()];
    }

    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(width)
        .map(|slice| slice.iter().collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejoined_chunks_reconstruct_the_source() {
        let source = "fn a() {}\nfn b() {}\nfn c() {}\nfn d() {}\n";
        let chunks = split_lines(source, 20);
        let rejoined = chunks
            .iter()
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(rejoined, source.trim_end_matches('\n'));
    }

    #[test]
    fn chunks_stay_within_bound() {
        let source = "short\n".repeat(100);
        let chunks = split_lines(&source, 50);
        for chunk in &chunks {
            assert!(chunk.text.len() <= 50, "oversized chunk: {:?}", chunk.text);
        }
    }

    #[test]
    fn oversized_line_forms_its_own_chunk() {
        let long = "x".repeat(600);
        let source = format!("short\n{long}\nshort");
        let chunks = split_lines(&source, 500);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "short");
        assert_eq!(chunks[1].text, long);
        assert_eq!(chunks[2].text, "short");
    }

    #[test]
    fn ids_are_sequential_positions() {
        let chunks = split_lines("a\nb\nc", 1);
        let ids: Vec<&str> = chunks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["0", "1", "2"]);
    }

    #[test]
    fn empty_input_produces_zero_chunks() {
        assert!(split_lines("", 500).is_empty());
    }

    #[test]
    fn blank_input_produces_one_chunk() {
        let chunks = split_lines("\n", 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "");
    }

    #[test]
    fn single_chunk_when_source_fits() {
        let source = "def f():\n    return 1\n";
        let chunks = split_lines(source, 500);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "def f():\n    return 1");
    }

    #[test]
    fn fixed_width_slice_count_is_ceil() {
        // L = 10, S = 4 -> ceil(10/4) = 3 slices
        let slices = split_fixed("abcdefghij", 4);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0].len(), 4);
        assert_eq!(slices[1].len(), 4);
        assert_eq!(slices[2].len(), 2);
    }

    #[test]
    fn fixed_width_exact_multiple() {
        let slices = split_fixed("abcdef", 3);
        assert_eq!(slices, vec!["abc", "def"]);
    }

    #[test]
    fn fixed_width_empty_input() {
        assert!(split_fixed("", 10).is_empty());
    }

    #[test]
    fn fixed_width_counts_chars_not_bytes() {
        let slices = split_fixed("héllo wörld", 5);
        assert_eq!(slices.len(), 3);
        assert_eq!(slices[0], "héllo");
    }

    #[test]
    fn splitting_is_deterministic() {
        let source = "a\nbb\nccc\ndddd\n";
        assert_eq!(split_lines(source, 6), split_lines(source, 6));
        assert_eq!(split_fixed(source, 3), split_fixed(source, 3));
    }
}
