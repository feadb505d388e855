//! Extractive answer composer.
//!
//! Builds a bounded context from retrieved hits and answers with its first
//! two sentences. No language model is involved.

use secondbrain_core::{Answer, Hit};

pub const NO_ANSWER: &str = "I couldn't find relevant information in your memory.";

#[derive(Debug, Clone)]
pub struct RagAgent {
    max_context_chars: usize,
}

impl Default for RagAgent {
    fn default() -> Self {
        Self::new(2000)
    }
}

impl RagAgent {
    pub fn new(max_context_chars: usize) -> Self {
        Self { max_context_chars }
    }

    /// Concatenate hit texts, labelled with their source, until the character
    /// budget is spent. The last text that fits partially is truncated.
    pub fn build_context(&self, hits: &[Hit]) -> String {
        let mut parts = Vec::new();
        let mut total = 0usize;

        for hit in hits {
            let Some(text) = hit.text.as_deref().filter(|t| !t.is_empty()) else {
                continue;
            };

            let len = text.chars().count();
            let text: String = if total + len > self.max_context_chars {
                let remaining = self.max_context_chars.saturating_sub(total);
                if remaining == 0 {
                    break;
                }
                text.chars().take(remaining).collect()
            } else {
                text.to_string()
            };

            total += text.chars().count();
            parts.push(format!(
                "Source ({}:{}): {}",
                display_or_none(hit.source_id.as_ref()),
                display_or_none(hit.chunk_index.as_ref()),
                text
            ));
        }

        parts.join("\n\n")
    }

    pub fn generate_answer(&self, _query: &str, hits: &[Hit]) -> Answer {
        let context = self.build_context(hits);

        let answer = if context.is_empty() {
            NO_ANSWER.to_string()
        } else {
            let mut sentences = context.split('.');
            let first = sentences.next().unwrap_or_default().trim();
            let second = sentences.next().unwrap_or_default().trim();
            format!("{first}. {second}").trim().to_string()
        };

        Answer {
            answer,
            sources: hits.iter().map(Hit::source_ref).collect(),
        }
    }
}

fn display_or_none<T: std::fmt::Display>(value: Option<&T>) -> String {
    value.map_or_else(|| "None".to_string(), |v| v.to_string())
}
