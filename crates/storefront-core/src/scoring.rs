//! Weighted substring relevance for search results.
//!
//! Matching is plain, case-insensitive substring counting over the already
//! fetched candidates; it does not tokenize and does not depend on which
//! search engine produced the results.

use std::cmp::Ordering;

use crate::models::ComponentSearchView;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Flat bonus when the name contains the query.
    pub name: f32,
    /// Flat bonus when the organization contains the query.
    pub organization: f32,
    /// Per occurrence in the description, each tag, each attribute label and type label.
    pub occurrence: f32,
    /// Raw totals are divided by this and clamped to 1.0.
    pub normalizer: f32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            name: 100.0,
            organization: 50.0,
            occurrence: 5.0,
            normalizer: 150.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RelevanceScorer {
    weights: ScoreWeights,
}

impl RelevanceScorer {
    pub const fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub const fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Sets `search_score` on every candidate. A blank query leaves scores untouched.
    ///
    /// So does a query of only `*` wildcards such as `"**"`. Matching its empty
    /// remainder would award every named candidate the name and organization
    /// bonuses, so it is treated as blank instead.
    pub fn score(&self, query: &str, candidates: &mut [ComponentSearchView]) {
        let Some(needle) = normalize_query(query) else {
            return;
        };
        for candidate in candidates {
            candidate.search_score = self.score_one(&needle, candidate);
        }
    }

    fn score_one(&self, needle: &str, candidate: &ComponentSearchView) -> f32 {
        let weights = &self.weights;
        let mut raw = 0.0_f32;

        if contains(candidate.name.as_deref(), needle) {
            raw += weights.name;
        }
        if contains(candidate.organization.as_deref(), needle) {
            raw += weights.organization;
        }

        let mut occurrences = count_matches(candidate.description.as_deref(), needle);
        for tag in &candidate.tags {
            occurrences += count_matches(Some(&tag.text), needle);
        }
        for attribute in &candidate.attributes {
            occurrences += count_matches(Some(&attribute.label), needle);
            occurrences += count_matches(Some(&attribute.type_label), needle);
        }
        raw += occurrences as f32 * weights.occurrence;

        (raw / weights.normalizer).min(1.0)
    }
}

/// Lower-cases and drops `*` wildcards; `None` when nothing is left to match.
fn normalize_query(query: &str) -> Option<String> {
    if query.trim().is_empty() {
        return None;
    }
    let needle = query.replace('*', "").to_lowercase();
    (!needle.is_empty()).then_some(needle)
}

fn contains(field: Option<&str>, needle: &str) -> bool {
    field
        .filter(|value| !value.trim().is_empty())
        .is_some_and(|value| value.to_lowercase().contains(needle))
}

fn count_matches(field: Option<&str>, needle: &str) -> usize {
    field
        .filter(|value| !value.is_empty())
        .map_or(0, |value| value.to_lowercase().matches(needle).count())
}

/// Highest score first; component id breaks ties so output order is deterministic.
pub fn sort_by_score_desc(candidates: &mut [ComponentSearchView]) {
    candidates.sort_by(|a, b| {
        b.search_score
            .partial_cmp(&a.search_score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.component_id.cmp(&b.component_id))
    });
}

#[cfg(test)]
mod tests {
    use super::{RelevanceScorer, ScoreWeights, normalize_query, sort_by_score_desc};
    use crate::models::{ComponentSearchView, ComponentTag, SearchResultAttribute};

    fn score_of(query: &str, candidate: ComponentSearchView) -> f32 {
        let mut candidates = vec![candidate];
        RelevanceScorer::default().score(query, &mut candidates);
        candidates[0].search_score
    }

    fn approx(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < 0.0001,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn name_match_is_a_flat_hundred() {
        approx(
            score_of("alpha", ComponentSearchView::named("c1", "Alpha System")),
            100.0 / 150.0,
        );
        // repeated occurrences in the name still count once
        approx(
            score_of("alpha", ComponentSearchView::named("c1", "alpha alpha alpha")),
            100.0 / 150.0,
        );
    }

    #[test]
    fn organization_match_is_a_flat_fifty() {
        let candidate = ComponentSearchView {
            component_id: "c2".to_string(),
            organization: Some("Alpha Corp".to_string()),
            ..ComponentSearchView::default()
        };
        approx(score_of("alpha", candidate), 50.0 / 150.0);
    }

    #[test]
    fn description_counts_every_occurrence() {
        let candidate = ComponentSearchView {
            component_id: "c3".to_string(),
            description: Some("Alpha builds on the ALPHA core".to_string()),
            ..ComponentSearchView::default()
        };
        approx(score_of("alpha", candidate), 10.0 / 150.0);
    }

    #[test]
    fn name_plus_organization_lands_exactly_on_the_clamp() {
        let candidate = ComponentSearchView {
            component_id: "c4".to_string(),
            name: Some("Alpha".to_string()),
            organization: Some("Alpha Corp".to_string()),
            ..ComponentSearchView::default()
        };
        assert_eq!(score_of("alpha", candidate), 1.0);
    }

    #[test]
    fn totals_above_the_normalizer_are_clamped() {
        let candidate = ComponentSearchView {
            component_id: "c5".to_string(),
            name: Some("Alpha".to_string()),
            organization: Some("Alpha Corp".to_string()),
            description: Some("alpha alpha".to_string()),
            ..ComponentSearchView::default()
        };
        assert_eq!(score_of("alpha", candidate), 1.0);
    }

    #[test]
    fn tags_and_attributes_add_per_occurrence() {
        let candidate = ComponentSearchView {
            component_id: "c6".to_string(),
            tags: vec![
                ComponentTag {
                    text: "mapping".to_string(),
                },
                ComponentTag {
                    text: "Map Map".to_string(),
                },
            ],
            attributes: vec![SearchResultAttribute {
                label: "Map Services".to_string(),
                type_label: "Geo map type".to_string(),
            }],
            ..ComponentSearchView::default()
        };
        // 1 + 2 tag hits, 1 label hit, 1 type-label hit
        approx(score_of("map", candidate), 25.0 / 150.0);
    }

    #[test]
    fn wildcards_are_stripped_and_case_is_ignored() {
        approx(
            score_of("AL*PHA*", ComponentSearchView::named("c7", "The alpha release")),
            100.0 / 150.0,
        );
    }

    #[test]
    fn occurrences_do_not_overlap() {
        let candidate = ComponentSearchView {
            component_id: "c8".to_string(),
            description: Some("aaaa".to_string()),
            ..ComponentSearchView::default()
        };
        approx(score_of("aa", candidate), 10.0 / 150.0);
    }

    #[test]
    fn blank_query_leaves_scores_untouched() {
        let mut candidates = vec![
            ComponentSearchView::named("c1", "Alpha"),
            ComponentSearchView {
                search_score: 0.25,
                ..ComponentSearchView::named("c2", "Beta")
            },
        ];
        let scorer = RelevanceScorer::default();
        scorer.score("", &mut candidates);
        scorer.score("   ", &mut candidates);
        scorer.score("**", &mut candidates);
        assert_eq!(candidates[0].search_score, 0.0);
        assert_eq!(candidates[1].search_score, 0.25);
    }

    #[test]
    fn missing_fields_contribute_nothing() {
        let candidate = ComponentSearchView {
            component_id: "c9".to_string(),
            name: None,
            organization: Some("   ".to_string()),
            description: None,
            ..ComponentSearchView::default()
        };
        assert_eq!(score_of("alpha", candidate), 0.0);
    }

    #[test]
    fn non_matching_candidate_is_reset_to_zero() {
        let mut candidates = vec![ComponentSearchView {
            search_score: 0.9,
            ..ComponentSearchView::named("c1", "Gamma")
        }];
        RelevanceScorer::default().score("alpha", &mut candidates);
        assert_eq!(candidates[0].search_score, 0.0);
    }

    #[test]
    fn custom_weights_are_honoured() {
        let scorer = RelevanceScorer::new(ScoreWeights {
            name: 10.0,
            organization: 0.0,
            occurrence: 0.0,
            normalizer: 20.0,
        });
        let mut candidates = vec![ComponentSearchView::named("c1", "alpha")];
        scorer.score("alpha", &mut candidates);
        approx(candidates[0].search_score, 0.5);
    }

    #[test]
    fn normalize_query_lowercases_and_strips_wildcards() {
        assert_eq!(normalize_query("*Foo*Bar").as_deref(), Some("foobar"));
        assert_eq!(normalize_query("*"), None);
        assert_eq!(normalize_query("\t"), None);
    }

    #[test]
    fn sort_by_score_desc_breaks_ties_by_component_id() {
        let mut candidates = vec![
            ComponentSearchView {
                search_score: 0.5,
                ..ComponentSearchView::named("b", "B")
            },
            ComponentSearchView {
                search_score: 0.9,
                ..ComponentSearchView::named("c", "C")
            },
            ComponentSearchView {
                search_score: 0.5,
                ..ComponentSearchView::named("a", "A")
            },
        ];
        sort_by_score_desc(&mut candidates);
        let ids = candidates
            .iter()
            .map(|c| c.component_id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }
}
