//! Extractive answer synthesis.
//!
//! Builds the final answer from the filtered documents without a language
//! model:
//! 1. Pick a heading from the query's category
//! 2. Split the top documents into sentences and drop near-duplicates
//! 3. Rank sentences by how many query words they contain
//! 4. Join the best ones and append a confidence note

use std::cmp::Reverse;
use std::collections::HashSet;

use super::category::Category;
use super::types::{FilteredContext, RetrievedDocument};

pub const NOT_RELEVANT_ANSWER: &str = "I found some F1 information but it doesn't seem directly relevant to your question. Could you please be more specific?";

const MAX_CONTEXT_DOCS: usize = 3;
const MIN_CONTEXT_CHARS: usize = 50;
const MIN_SENTENCE_CHARS: usize = 20;
const DUPLICATE_JACCARD: f64 = 0.8;
const MAX_CANDIDATE_SENTENCES: usize = 8;
const MAX_ANSWER_SENTENCES: usize = 5;
const MIN_QUERY_WORD_CHARS: usize = 3;

const HIGH_CONFIDENCE_NOTE: &str = "\n\n✅ *High confidence answer based on reliable F1 sources.*";
const MODERATE_CONFIDENCE_NOTE: &str =
    "\n\n⚠️ *Moderate confidence - you may want to verify this information.*";

#[derive(Debug, Clone, Copy, Default)]
pub struct Synthesizer;

impl Synthesizer {
    pub fn synthesize(&self, query: &str, context: &FilteredContext) -> String {
        let contexts = extract_contexts(&context.documents);
        if contexts.is_empty() {
            return NOT_RELEVANT_ANSWER.to_string();
        }

        let category = Category::classify(query);
        let sentences = dedupe_sentences(
            contexts
                .iter()
                .flat_map(|text| split_sentences(text))
                .collect(),
        );
        let ranked = prioritize(sentences, &query_words(query));

        let mut answer = String::from(category.heading());
        answer.push_str(&ranked.join(". "));
        answer.push('.');
        answer.push_str(confidence_note(context.mean_similarity));

        tracing::debug!(
            "Synthesized {:?} answer from {} context(s), {} sentence(s)",
            category,
            contexts.len(),
            ranked.len()
        );
        answer
    }
}

/// Trimmed text of the top documents, skipping snippets too short to be useful.
fn extract_contexts(docs: &[RetrievedDocument]) -> Vec<&str> {
    docs.iter()
        .take(MAX_CONTEXT_DOCS)
        .map(|doc| doc.text.trim())
        .filter(|text| text.chars().count() > MIN_CONTEXT_CHARS)
        .collect()
}

fn split_sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

fn word_set(sentence: &str) -> HashSet<String> {
    sentence
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

/// Keeps a sentence only if no earlier-kept sentence is a near-duplicate of it.
fn dedupe_sentences(sentences: Vec<&str>) -> Vec<&str> {
    let mut kept: Vec<(&str, HashSet<String>)> = Vec::new();

    for sentence in sentences {
        let words = word_set(sentence);
        let mut duplicate = false;
        for (_, kept_words) in &kept {
            if jaccard(kept_words, &words) > DUPLICATE_JACCARD {
                duplicate = true;
                break;
            }
        }
        if !duplicate {
            kept.push((sentence, words));
        }
    }

    kept.into_iter()
        .take(MAX_CANDIDATE_SENTENCES)
        .map(|(sentence, _)| sentence)
        .collect()
}

fn query_words(query: &str) -> Vec<String> {
    query
        .to_lowercase()
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > MIN_QUERY_WORD_CHARS)
        .map(str::to_string)
        .collect()
}

/// Stable sort by query-word hits, best first, truncated to the answer size.
fn prioritize<'a>(mut sentences: Vec<&'a str>, words: &[String]) -> Vec<&'a str> {
    sentences.sort_by_key(|sentence| {
        let lower = sentence.to_lowercase();
        Reverse(words.iter().filter(|w| lower.contains(w.as_str())).count())
    });
    sentences.truncate(MAX_ANSWER_SENTENCES);
    sentences
}

fn confidence_note(mean_similarity: f32) -> &'static str {
    if mean_similarity > 0.7 {
        HIGH_CONFIDENCE_NOTE
    } else if mean_similarity > 0.5 {
        MODERATE_CONFIDENCE_NOTE
    } else {
        ""
    }
}
