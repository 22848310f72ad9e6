//! Page cleanup and overlapping chunk splitting.

use std::sync::OnceLock;

use regex::Regex;

/// Chunking limits, all measured in characters.
#[derive(Debug, Clone, Copy)]
pub struct ChunkerConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_chunks: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            chunk_overlap: 100,
            max_chunks: 500,
        }
    }
}

/// A piece of page text tagged with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChunk {
    pub text: String,
    pub source: String,
    pub chunk_index: usize,
}

/// Splits `text` into overlapping windows. Each window except the last is cut
/// back to a sentence ending when one falls in its final fifth.
pub fn split_into_chunks(text: &str, source: &str, config: &ChunkerConfig) -> Vec<TextChunk> {
    let chars: Vec<char> = text.chars().collect();
    let total_chars = chars.len();
    let mut chunks = Vec::new();

    if total_chars == 0 || config.chunk_size == 0 {
        return chunks;
    }

    let mut start = 0;

    while start < total_chars && chunks.len() < config.max_chunks {
        let end = (start + config.chunk_size).min(total_chars);
        let window: String = chars[start..end].iter().collect();

        let cut = if end < total_chars {
            find_sentence_boundary(&window)
        } else {
            window.as_str()
        };

        let trimmed = cut.trim();
        if !trimmed.is_empty() {
            chunks.push(TextChunk {
                text: trimmed.to_string(),
                source: source.to_string(),
                chunk_index: chunks.len(),
            });
        }

        if end == total_chars {
            break;
        }
        // Next window overlaps the end of what was actually emitted.
        let emitted = cut.chars().count();
        start = (start + emitted)
            .saturating_sub(config.chunk_overlap)
            .max(start + 1);
    }

    chunks
}

fn find_sentence_boundary(text: &str) -> &str {
    const ENDINGS: [&str; 6] = [". ", "! ", "? ", ".\n", "!\n", "?\n"];

    let mut search_start = (text.len() * 80) / 100;
    while !text.is_char_boundary(search_start) {
        search_start += 1;
    }
    let tail = &text[search_start..];

    for ending in ENDINGS {
        if let Some(pos) = tail.rfind(ending) {
            return &text[..search_start + pos + ending.len()];
        }
    }

    text
}

fn block_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)<script\b.*?</script\s*>|<style\b.*?</style\s*>|<!--.*?-->")
            .expect("block pattern")
    })
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag pattern"))
}

/// Reduces an HTML page to its visible text, one non-empty line per line.
pub fn strip_html(html: &str) -> String {
    let without_blocks = block_pattern().replace_all(html, " ");
    let without_tags = tag_pattern().replace_all(&without_blocks, "\n");
    let decoded = decode_entities(&without_tags);

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
