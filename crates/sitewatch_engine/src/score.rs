use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("scorer backend failed: {0}")]
    Backend(String),
}

/// Scores visible text for defacement-like content, in `[0, 1]`.
///
/// Implementations may be arbitrarily slow or CPU-bound; the pipeline
/// always invokes them on the blocking pool, never on the async threads.
pub trait AnomalyScorer: Send + Sync {
    fn score(&self, visible_text: &str) -> Result<f32, ScoreError>;
}

/// Simple, deterministic phrase-marker heuristic used as a placeholder
/// for a real classifier.
#[derive(Debug, Clone)]
pub struct MarkerScorer {
    markers: Vec<String>,
}

impl MarkerScorer {
    pub fn new(markers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            markers: markers
                .into_iter()
                .map(|marker| marker.into().to_lowercase())
                .collect(),
        }
    }
}

impl Default for MarkerScorer {
    fn default() -> Self {
        Self::new(["hacked by", "defaced by", "owned by", "was here"])
    }
}

impl AnomalyScorer for MarkerScorer {
    fn score(&self, visible_text: &str) -> Result<f32, ScoreError> {
        let lower = visible_text.to_lowercase();
        let hits = self
            .markers
            .iter()
            .filter(|marker| lower.contains(marker.as_str()))
            .count();
        if hits == 0 {
            return Ok(0.0);
        }
        // One marker already clears the default threshold; more saturate
        // toward 1.
        let score = 0.6 + 0.1 * (hits as f32 - 1.0);
        Ok(score.min(1.0))
    }
}
