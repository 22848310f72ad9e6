use super::types::{FilteredContext, RetrievedDocument};

/// Documents at or below this similarity never reach the synthesizer.
pub const SIMILARITY_THRESHOLD: f32 = 0.3;
/// Multiplier applied to the mean similarity before capping at 1.0.
pub const CONFIDENCE_BOOST: f32 = 1.2;

#[derive(Debug, Clone)]
pub enum Relevance {
    Relevant(FilteredContext),
    /// Nothing cleared the threshold. Carries the confidence computed over
    /// the full retrieved set for diagnostics.
    NoRelevantContext { confidence: f32 },
}

#[derive(Debug, Clone, Copy)]
pub struct RelevanceFilter {
    threshold: f32,
    boost: f32,
}

impl Default for RelevanceFilter {
    fn default() -> Self {
        Self {
            threshold: SIMILARITY_THRESHOLD,
            boost: CONFIDENCE_BOOST,
        }
    }
}

impl RelevanceFilter {
    pub fn filter(&self, docs: &[RetrievedDocument]) -> Relevance {
        let mean_similarity = mean_similarity(docs);
        let confidence = self.confidence_from_mean(mean_similarity, docs.len());

        let documents: Vec<RetrievedDocument> = docs
            .iter()
            .filter(|doc| doc.similarity > self.threshold)
            .cloned()
            .collect();

        if documents.is_empty() {
            return Relevance::NoRelevantContext { confidence };
        }

        Relevance::Relevant(FilteredContext {
            documents,
            mean_similarity,
            confidence,
        })
    }

    /// `min(mean * boost, 1.0)` over every retrieved document; 0 for an empty set.
    pub fn confidence(&self, docs: &[RetrievedDocument]) -> f32 {
        self.confidence_from_mean(mean_similarity(docs), docs.len())
    }

    fn confidence_from_mean(&self, mean: f32, count: usize) -> f32 {
        if count == 0 {
            return 0.0;
        }
        (mean * self.boost).clamp(0.0, 1.0)
    }
}

pub fn mean_similarity(docs: &[RetrievedDocument]) -> f32 {
    if docs.is_empty() {
        return 0.0;
    }
    docs.iter().map(|doc| doc.similarity).sum::<f32>() / docs.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(similarity: f32) -> RetrievedDocument {
        RetrievedDocument {
            id: format!("doc-{}", similarity),
            text: "Charles Leclerc won at Monza in 2019.".to_string(),
            source: "https://www.formula1.com".to_string(),
            similarity,
        }
    }

    #[test]
    fn confidence_uses_every_document() {
        let filter = RelevanceFilter::default();
        let docs = vec![doc(0.9), doc(0.1), doc(0.2)];

        match filter.filter(&docs) {
            Relevance::Relevant(ctx) => {
                assert_eq!(ctx.documents.len(), 1);
                assert!((ctx.mean_similarity - 0.4).abs() < 1e-6);
                assert!((ctx.confidence - 0.48).abs() < 1e-6);
            }
            other => panic!("expected relevant context, got {:?}", other),
        }
    }

    #[test]
    fn confidence_is_capped_at_one() {
        let filter = RelevanceFilter::default();
        assert_eq!(filter.confidence(&[doc(0.95), doc(0.9)]), 1.0);
    }

    #[test]
    fn threshold_is_exclusive() {
        let filter = RelevanceFilter::default();
        match filter.filter(&[doc(0.3), doc(0.25)]) {
            Relevance::NoRelevantContext { confidence } => {
                assert!((confidence - 0.33).abs() < 1e-6);
            }
            other => panic!("expected no relevant context, got {:?}", other),
        }
    }

    #[test]
    fn empty_input_has_zero_confidence() {
        let filter = RelevanceFilter::default();
        assert_eq!(filter.confidence(&[]), 0.0);
        assert!(matches!(
            filter.filter(&[]),
            Relevance::NoRelevantContext { confidence } if confidence == 0.0
        ));
    }

    #[test]
    fn filtered_documents_keep_store_order() {
        let filter = RelevanceFilter::default();
        let Relevance::Relevant(ctx) = filter.filter(&[doc(0.8), doc(0.1), doc(0.6)]) else {
            panic!("expected relevant context");
        };
        let sims: Vec<f32> = ctx.documents.iter().map(|d| d.similarity).collect();
        assert_eq!(sims, vec![0.8, 0.6]);
    }
}
