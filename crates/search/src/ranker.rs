use std::collections::BTreeSet;

use scene::entity::{MapEntity, TextField};
use serde::Serialize;

use crate::score::{MatchKind, match_kind};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub entity: MapEntity,
    /// In `(0, 1]`.
    pub score: f32,
    /// Fields that matched the query at all (substring or subsequence).
    pub matched_fields: BTreeSet<TextField>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Fields an entity is scored on.
    pub fields: Vec<TextField>,
    pub max_results: Option<usize>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fields: TextField::ALL.to_vec(),
            max_results: None,
        }
    }
}

/// Scores one entity: the best match over the configured fields.
pub fn score_entity(
    entity: &MapEntity,
    query: &str,
    fields: &[TextField],
) -> (MatchKind, BTreeSet<TextField>) {
    let mut best = MatchKind::None;
    let mut matched = BTreeSet::new();
    for field in fields {
        let Some(text) = entity.text(*field) else {
            continue;
        };
        let kind = match_kind(text, query);
        if kind == MatchKind::None {
            continue;
        }
        matched.insert(*field);
        best = best.max(kind);
    }
    (best, matched)
}

/// Ranks `entities` against `query`.
///
/// Ordering contract:
/// - Score descending.
/// - Equal scores: name ascending (case-insensitive), then discovery order.
///
/// A blank query yields no results; entities scoring 0 are excluded.
pub fn rank<'a>(
    entities: impl IntoIterator<Item = &'a MapEntity>,
    query: &str,
    options: &SearchOptions,
) -> Vec<SearchResult> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, String, SearchResult)> = Vec::new();
    for (order, entity) in entities.into_iter().enumerate() {
        let (kind, matched_fields) = score_entity(entity, query, &options.fields);
        if kind == MatchKind::None {
            continue;
        }
        scored.push((
            order,
            entity.name.to_lowercase(),
            SearchResult {
                entity: entity.clone(),
                score: kind.score(),
                matched_fields,
            },
        ));
    }

    scored.sort_by(|(oa, na, a), (ob, nb, b)| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| na.cmp(nb))
            .then_with(|| oa.cmp(ob))
    });

    let mut out: Vec<SearchResult> = scored.into_iter().map(|(_, _, r)| r).collect();
    if let Some(max) = options.max_results {
        out.truncate(max);
    }
    tracing::debug!(query, results = out.len(), "search ranked");
    out
}
