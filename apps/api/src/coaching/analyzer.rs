//! Feedback Analyzer — pluggable, trait-based producer of coaching notes.
//!
//! Default: `LlmFeedbackAnalyzer` (one Claude call per analysis). The monitor
//! registry holds an `Arc<dyn FeedbackAnalyzer>` so tests can swap in a fake.
//!
//! The analyzer only ever sees a bounded trailing window of the transcript —
//! the most recent `ANALYSIS_WINDOW` turns — so each note stays focused on
//! what just happened instead of re-summarizing the whole conversation.

use async_trait::async_trait;

use crate::coaching::prompts::{render_coaching_prompt, COACHING_SYSTEM};
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::transcript::TranscriptTurn;

/// Maximum number of trailing turns handed to the analyzer.
pub const ANALYSIS_WINDOW: usize = 4;

/// Selects the trailing window the analyzer is allowed to see.
pub fn trailing_window(turns: &[TranscriptTurn]) -> &[TranscriptTurn] {
    let start = turns.len().saturating_sub(ANALYSIS_WINDOW);
    &turns[start..]
}

#[async_trait]
pub trait FeedbackAnalyzer: Send + Sync {
    /// Produces a free-text coaching note for the given recent turns.
    /// `newest` is the last turn of `recent`, passed separately so backends
    /// can highlight it without re-deriving it.
    async fn analyze(
        &self,
        recent: &[TranscriptTurn],
        newest: &TranscriptTurn,
    ) -> Result<String, AppError>;
}

/// Claude-backed analyzer used in production.
pub struct LlmFeedbackAnalyzer {
    llm: LlmClient,
}

impl LlmFeedbackAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl FeedbackAnalyzer for LlmFeedbackAnalyzer {
    async fn analyze(
        &self,
        recent: &[TranscriptTurn],
        newest: &TranscriptTurn,
    ) -> Result<String, AppError> {
        let prompt = render_coaching_prompt(recent, newest);
        let note = self
            .llm
            .call_text(&prompt, COACHING_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Coaching analysis failed: {e}")))?;
        Ok(note.trim().to_string())
    }
}
