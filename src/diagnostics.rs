//! Pipeline validation and smoke queries for a deployed knowledge base.

use std::time::{Duration, Instant};

use crate::rag::{RagError, RagService};

pub const SAMPLE_QUERY: &str = "What is Formula 1?";

pub const SMOKE_QUERIES: [&str; 10] = [
    "Who is the current Formula 1 World Champion?",
    "Which F1 team has the fastest car this season?",
    "Tell me about Lewis Hamilton's career",
    "What are the F1 technical regulations for 2024?",
    "Which circuits are new to F1 this season?",
    "Compare Hamilton vs Verstappen career stats",
    "When is the next Formula 1 race?",
    "What is DRS in Formula 1?",
    "Tell me about Formula 1 history",
    "What are the current constructor standings?",
];

const MEANINGFUL_ANSWER_CHARS: usize = 50;
const PREVIEW_CHARS: usize = 100;
const SNIPPET_CHARS: usize = 150;
const TOP_SNIPPETS: usize = 2;

/// Timing and shape of one answered query.
#[derive(Debug, Clone)]
pub struct QueryCheck {
    pub query: String,
    pub elapsed: Duration,
    pub confidence: f32,
    pub retrieved: usize,
    pub sources: Vec<String>,
    pub answer: String,
    /// `(similarity, leading text)` of the best retrieved chunks.
    pub top_snippets: Vec<(f32, String)>,
}

impl QueryCheck {
    pub fn is_meaningful(&self) -> bool {
        self.answer.chars().count() > MEANINGFUL_ANSWER_CHARS
    }

    pub fn preview(&self) -> String {
        truncate_chars(&self.answer, PREVIEW_CHARS)
    }
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub configured: bool,
    pub healthy: bool,
    pub sample: Option<QueryCheck>,
    pub error: Option<String>,
}

impl ValidationReport {
    pub fn passed(&self) -> bool {
        self.configured && self.healthy && self.sample.is_some()
    }
}

pub async fn run_query(service: &RagService, query: &str) -> Result<QueryCheck, RagError> {
    let started = Instant::now();
    let response = service.answer(query).await?;
    let elapsed = started.elapsed();

    let top_snippets = response
        .retrieved_docs
        .iter()
        .take(TOP_SNIPPETS)
        .map(|doc| (doc.similarity, truncate_chars(&doc.text, SNIPPET_CHARS)))
        .collect();

    Ok(QueryCheck {
        query: query.to_string(),
        elapsed,
        confidence: response.confidence,
        retrieved: response.retrieved_docs.len(),
        sources: response.sources,
        answer: response.answer,
        top_snippets,
    })
}

/// Configuration, then health check, then one timed sample query. Stops at
/// the first step that fails.
pub async fn validate(service: Option<&RagService>) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(service) = service else {
        return report;
    };
    report.configured = true;

    report.healthy = service.health_check().await;
    if !report.healthy {
        return report;
    }

    match run_query(service, SAMPLE_QUERY).await {
        Ok(check) => report.sample = Some(check),
        Err(err) => {
            tracing::error!("Sample query failed: {}", err);
            report.error = Some(err.to_string());
        }
    }

    report
}

fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
