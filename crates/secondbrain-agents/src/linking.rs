//! Suggests `RELATED_TO` links between chunks by embedding similarity.
//!
//! Works on vectors already computed for indexing, so linking never embeds.

use std::collections::HashMap;

use secondbrain_graph::EdgeRelation;
use secondbrain_vector::cosine_similarity;

/// A chunk to consider for linking, with its embedding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkNode<'a> {
    pub id: &'a str,
    pub vector: &'a [f32],
}

/// A suggested edge. `source` precedes `target` in the input order.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkCandidate {
    pub source: String,
    pub target: String,
    pub relation: EdgeRelation,
    pub score: f32,
}

pub struct LinkingAgent {
    threshold: f32,
    max_links_per_node: usize,
}

impl LinkingAgent {
    pub fn new(threshold: f32, max_links_per_node: usize) -> Self {
        Self {
            threshold,
            max_links_per_node,
        }
    }

    pub fn find_links(&self, nodes: &[LinkNode<'_>]) -> Vec<LinkCandidate> {
        if nodes.len() < 2 || self.max_links_per_node == 0 {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for (i, a) in nodes.iter().enumerate() {
            for b in &nodes[i + 1..] {
                if a.id == b.id {
                    continue;
                }
                let score = cosine_similarity(a.vector, b.vector);
                if score >= self.threshold {
                    candidates.push(LinkCandidate {
                        source: a.id.to_string(),
                        target: b.id.to_string(),
                        relation: EdgeRelation::RelatedTo,
                        score,
                    });
                }
            }
        }

        // Strongest first, then cap per source node.
        candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        let mut per_source: HashMap<String, usize> = HashMap::new();
        candidates.retain(|c| {
            let count = per_source.entry(c.source.clone()).or_insert(0);
            *count += 1;
            *count <= self.max_links_per_node
        });

        tracing::debug!(
            nodes = nodes.len(),
            links = candidates.len(),
            threshold = self.threshold,
            "Link suggestions computed"
        );
        candidates
    }
}
