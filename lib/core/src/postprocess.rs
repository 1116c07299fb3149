//! Entity post-processing
//!
//! Turns the raw spans of a token-classification model into the entity list
//! returned to callers:
//!
//! ```text
//! raw spans → combine (optional) → remove overlaps → filter by term type
//! ```
//!
//! The order is fixed. Overlap removal runs on the combined set so a merged
//! span competes with its own constituents, and filtering runs last so it
//! sees final categories including `COMBINED_FINANCIAL`.

use crate::entity::{slice_chars, Entity, EntityGroup};
use crate::options::{NerOptions, OverlapPolicy, TermTypes};

/// Stateless pipeline configured with an overlap policy
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityPostProcessor {
    policy: OverlapPolicy,
}

impl EntityPostProcessor {
    pub fn new(policy: OverlapPolicy) -> Self {
        Self { policy }
    }

    /// Run combine, overlap removal and filtering in that order.
    pub fn process(
        &self,
        text: &str,
        entities: Vec<Entity>,
        options: &NerOptions,
        term_types: &TermTypes,
    ) -> Vec<Entity> {
        let combined = combine_entities(entities, text, options.combine_financial_entities);
        let non_overlapping = remove_overlapping_entities(combined, self.policy);
        filter_entities(non_overlapping, term_types)
    }
}

/// Merge combinable spans with an adjacent organization span.
///
/// Single left-to-right sweep. A combinable span first tries the preceding
/// span (if it is organization-like and not already consumed), then the
/// following one. Merging with the following span skips it. No span is
/// merged twice and no 3-way merge happens within one call.
pub fn combine_entities(entities: Vec<Entity>, text: &str, enabled: bool) -> Vec<Entity> {
    if !enabled {
        return entities;
    }

    let mut combined = Vec::with_capacity(entities.len());
    let mut consumed = vec![false; entities.len()];
    let mut i = 0;

    while i < entities.len() {
        let current = &entities[i];

        if current.entity_group.is_combinable() {
            if i > 0 && !consumed[i - 1] && entities[i - 1].entity_group.is_organization() {
                combined.push(create_combined_entity(&entities[i - 1], current, text));
                consumed[i - 1] = true;
                consumed[i] = true;
                i += 1;
                continue;
            }

            if let Some(next) = entities.get(i + 1) {
                if next.entity_group.is_organization() {
                    combined.push(create_combined_entity(current, next, text));
                    consumed[i] = true;
                    consumed[i + 1] = true;
                    i += 2;
                    continue;
                }
            }
        }

        combined.push(current.clone());
        i += 1;
    }

    combined
}

/// Build the `COMBINED_FINANCIAL` span covering both inputs.
///
/// The surface text is re-sliced from the source so anything between the
/// two parts is included.
pub fn create_combined_entity(first: &Entity, second: &Entity, text: &str) -> Entity {
    let start = first.start.min(second.start);
    let end = first.effective_end().max(second.effective_end());

    Entity {
        entity_group: EntityGroup::CombinedFinancial,
        word: slice_chars(text, start, end),
        start,
        end,
        score: (first.score + second.score) / 2.0,
        original_entities: Some(vec![first.clone(), second.clone()]),
    }
}

/// Resolve overlapping spans, preferring the highest score at contested bounds.
///
/// Spans are sorted by `(start asc, end desc, score desc)` and scanned once.
/// A span starting at or after the last accepted end is always accepted.
/// Otherwise the run of spans sharing its exact bounds is collapsed to its
/// best-scoring member, which is kept only if it extends past the last
/// accepted end (under [`OverlapPolicy::Compatible`]).
pub fn remove_overlapping_entities(entities: Vec<Entity>, policy: OverlapPolicy) -> Vec<Entity> {
    let mut sorted = entities;
    sorted.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.effective_end().cmp(&a.effective_end()))
            .then_with(|| b.score.total_cmp(&a.score))
    });

    let mut non_overlapping: Vec<Entity> = Vec::with_capacity(sorted.len());
    let mut last_end: Option<usize> = None;
    let mut iter = sorted.into_iter().peekable();

    while let Some(current) = iter.next() {
        if last_end.map_or(true, |end| current.start >= end) {
            last_end = Some(current.effective_end());
            non_overlapping.push(current);
            continue;
        }

        let bounds = (current.start, current.effective_end());
        let mut best = current;
        while let Some(next) = iter.next_if(|e| (e.start, e.effective_end()) == bounds) {
            if next.score > best.score {
                best = next;
            }
        }

        if policy == OverlapPolicy::Strict {
            continue;
        }

        let best_end = best.effective_end();
        if last_end.map_or(true, |end| best_end > end) {
            last_end = Some(best_end);
            non_overlapping.push(best);
        }
    }

    non_overlapping
}

/// Keep spans whose category matches a requested term type.
pub fn filter_entities(entities: Vec<Entity>, term_types: &TermTypes) -> Vec<Entity> {
    if term_types.all_financial_terms {
        return entities;
    }

    entities
        .into_iter()
        .filter(|entity| {
            let group = &entity.entity_group;
            (term_types.company && group.is_organization())
                || (term_types.product && group.is_product())
                || (term_types.transaction && group.is_transaction())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn span(group: &str, start: usize, end: usize, score: f64) -> Entity {
        Entity::new(group, "", start, end, score)
    }

    fn bounds(entities: &[Entity]) -> Vec<(usize, usize)> {
        entities.iter().map(|e| (e.start, e.end)).collect()
    }

    #[test]
    fn test_combine_disabled_is_noop() {
        let input = vec![span("ORG", 0, 5, 0.9), span("MONEY", 6, 10, 0.8)];
        let output = combine_entities(input.clone(), "Acme $100", false);
        assert_eq!(output, input);
    }

    #[test]
    fn test_combine_produces_valid_span() {
        let text = "Acme Co $500000";
        let input = vec![span("ORG", 0, 7, 0.9), span("MONEY", 8, 15, 0.7)];
        let output = combine_entities(input, text, true);

        let combined: Vec<&Entity> = output.iter().filter(|e| e.is_combined()).collect();
        assert_eq!(combined.len(), 1);
        let merged = combined[0];
        assert_eq!((merged.start, merged.end), (0, 15));
        assert!((merged.score - 0.8).abs() < 1e-9);
        assert_eq!(merged.entity_group, EntityGroup::CombinedFinancial);
        assert_eq!(merged.word, "Acme Co $500000");
        assert_eq!(merged.original_entities.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_combine_with_following_skips_it() {
        let text = "12% Acme Bank";
        let input = vec![
            span("PERCENT", 0, 3, 0.6),
            span("ORG", 4, 13, 0.8),
            span("MISC", 14, 14, 0.1),
        ];
        let output = combine_entities(input, text, true);

        assert_eq!(output.len(), 2);
        assert_eq!(output[0].entity_group, EntityGroup::CombinedFinancial);
        assert_eq!(output[0].word, "12% Acme Bank");
        assert_eq!(output[1].entity_group, EntityGroup::Misc);
    }

    #[test]
    fn test_combine_consumed_span_not_merged_again() {
        // ORG ORG MONEY: the first pair merges, MONEY cannot reuse the consumed ORG
        let text = "Acme Beta $5";
        let input = vec![
            span("ORG", 0, 4, 0.9),
            span("ORG", 5, 9, 0.7),
            span("MONEY", 10, 12, 0.5),
        ];
        let output = combine_entities(input, text, true);

        assert_eq!(output.len(), 2);
        assert_eq!(output[0].entity_group, EntityGroup::CombinedFinancial);
        assert_eq!(bounds(&output[..1]), vec![(0, 9)]);
        assert_eq!(output[1].entity_group, EntityGroup::Money);
    }

    #[test]
    fn test_combine_prefers_preceding_organization() {
        let text = "Acme $100 Beta";
        let input = vec![
            span("ORG", 0, 4, 0.9),
            span("MONEY", 5, 9, 0.7),
            span("ORG", 10, 14, 0.8),
        ];
        let output = combine_entities(input.clone(), text, true);

        // ORG is emitted before MONEY looks back at it, the trailing ORG stays alone
        assert_eq!(output.len(), 3);
        assert_eq!(output[0], input[0]);
        assert_eq!(output[1].entity_group, EntityGroup::CombinedFinancial);
        assert_eq!((output[1].start, output[1].end), (0, 9));
        assert_eq!(output[1].word, "Acme $100");
        assert_eq!(output[1].original_entities, Some(vec![input[0].clone(), input[1].clone()]));
        assert_eq!(output[2], input[2]);

        let processed = EntityPostProcessor::default().process(
            text,
            input,
            &NerOptions { combine_financial_entities: true },
            &TermTypes::all(),
        );
        assert_eq!(bounds(&processed), vec![(0, 9), (10, 14)]);
        assert_eq!(processed[0].entity_group, EntityGroup::CombinedFinancial);
        assert_eq!(processed[1].entity_group, EntityGroup::Org);
    }

    #[test]
    fn test_adjacent_organization_spans_not_combined() {
        let text = "Acme Bank Beta Corp";
        let input = vec![span("ORGANIZATION", 0, 9, 0.9), span("ORGANIZATION", 10, 19, 0.8)];
        assert_eq!(combine_entities(input.clone(), text, true), input);

        let company = TermTypes { company: true, ..TermTypes::default() };
        let output = EntityPostProcessor::default().process(
            text,
            input,
            &NerOptions { combine_financial_entities: true },
            &company,
        );
        assert_eq!(bounds(&output), vec![(0, 9), (10, 19)]);
        assert!(output.iter().all(|e| e.entity_group == EntityGroup::Organization));
    }

    #[test]
    fn test_combine_ignores_non_combinable() {
        let text = "Widget Acme";
        let input = vec![span("PRODUCT", 0, 6, 0.9), span("ORG", 7, 11, 0.9)];
        let output = combine_entities(input.clone(), text, true);
        assert_eq!(output, input);
    }

    #[test]
    fn test_remove_overlapping_same_bounds_keeps_best() {
        let input = vec![span("ORG", 0, 5, 0.3), span("MISC", 0, 5, 0.7)];
        let output = remove_overlapping_entities(input, OverlapPolicy::Compatible);
        assert_eq!(output.len(), 1);
        assert_eq!(output[0].entity_group, EntityGroup::Misc);
    }

    #[test]
    fn test_remove_overlapping_prefers_longer_at_same_start() {
        let input = vec![span("ORG", 0, 4, 0.99), span("COMBINED_FINANCIAL", 0, 10, 0.5)];
        let output = remove_overlapping_entities(input, OverlapPolicy::Compatible);
        assert_eq!(bounds(&output), vec![(0, 10)]);
    }

    #[test]
    fn test_remove_overlapping_with_nan_scores() {
        let input = vec![
            span("ORG", 0, 5, f64::NAN),
            span("ORG", 0, 5, 0.4),
            span("MONEY", 0, 5, f64::NAN),
            span("MISC", 6, 9, 0.2),
            span("MISC", 6, 9, f64::NAN),
        ];
        for policy in [OverlapPolicy::Compatible, OverlapPolicy::Strict] {
            let output = remove_overlapping_entities(input.clone(), policy);
            assert_eq!(bounds(&output), vec![(0, 5), (6, 9)]);
            let again = remove_overlapping_entities(input.clone(), policy);
            assert_eq!(bounds(&again), bounds(&output));
        }
    }

    #[test]
    fn test_scenario_b_compatible_quirk() {
        let input = vec![
            span("ORG", 0, 5, 0.6),
            span("ORG", 0, 5, 0.9),
            span("MONEY", 3, 8, 0.95),
        ];
        let output = remove_overlapping_entities(input, OverlapPolicy::Compatible);

        assert_eq!(bounds(&output), vec![(0, 5), (3, 8)]);
        assert!((output[0].score - 0.9).abs() < 1e-9);
        assert!((output[1].score - 0.95).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_b_strict() {
        let input = vec![
            span("ORG", 0, 5, 0.6),
            span("ORG", 0, 5, 0.9),
            span("MONEY", 3, 8, 0.95),
        ];
        let output = remove_overlapping_entities(input, OverlapPolicy::Strict);

        assert_eq!(bounds(&output), vec![(0, 5)]);
        assert!((output[0].score - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_span_is_zero_width() {
        let input = vec![span("ORG", 4, 2, 0.9), span("MONEY", 0, 6, 0.5)];
        let output = remove_overlapping_entities(input, OverlapPolicy::Compatible);
        // [0,6) accepted first; the collapsed span at 4 never extends past it
        assert_eq!(bounds(&output), vec![(0, 6)]);

        let output = remove_overlapping_entities(vec![span("ORG", 4, 2, 0.9)], OverlapPolicy::Compatible);
        assert_eq!(output.len(), 1);
    }

    fn random_spans(rng: &mut impl Rng, count: usize) -> Vec<Entity> {
        (0..count)
            .map(|_| {
                let start = rng.random_range(0..40);
                let len = rng.random_range(1..8);
                let score = rng.random_range(0..100) as f64 / 100.0;
                span("ORG", start, start + len, score)
            })
            .collect()
    }

    #[test]
    fn test_strict_never_overlaps() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let output = remove_overlapping_entities(random_spans(&mut rng, 12), OverlapPolicy::Strict);
            for pair in output.windows(2) {
                assert!(pair[0].end <= pair[1].start, "{:?} overlaps {:?}", pair[0], pair[1]);
            }
        }
    }

    #[test]
    fn test_remove_overlapping_is_idempotent() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for policy in [OverlapPolicy::Compatible, OverlapPolicy::Strict] {
            for _ in 0..200 {
                let once = remove_overlapping_entities(random_spans(&mut rng, 12), policy);
                let twice = remove_overlapping_entities(once.clone(), policy);
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_results_sorted_by_start() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let output = remove_overlapping_entities(random_spans(&mut rng, 30), OverlapPolicy::Compatible);
        assert!(output.windows(2).all(|pair| pair[0].start <= pair[1].start));
    }

    #[test]
    fn test_filter_all_terms_keeps_everything() {
        let input = vec![span("ORG", 0, 1, 0.1), span("PER", 2, 3, 0.2), span("DATE", 4, 5, 0.3)];
        assert_eq!(filter_entities(input.clone(), &TermTypes::all()), input);
    }

    #[test]
    fn test_filter_no_flags_is_empty() {
        let input = vec![span("ORG", 0, 1, 0.1), span("MONEY", 2, 3, 0.2)];
        assert!(filter_entities(input, &TermTypes::default()).is_empty());
    }

    #[test]
    fn test_filter_by_category() {
        let input = vec![span("ORGANIZATION", 0, 4, 0.9)];

        let company = TermTypes { company: true, ..TermTypes::default() };
        assert_eq!(filter_entities(input.clone(), &company).len(), 1);

        let product = TermTypes { product: true, ..TermTypes::default() };
        assert!(filter_entities(input, &product).is_empty());

        let mixed = vec![
            span("MISC", 0, 1, 0.5),
            span("PERCENT", 2, 3, 0.5),
            span("COMBINED_FINANCIAL", 4, 5, 0.5),
        ];
        let transaction = TermTypes { transaction: true, product: true, ..TermTypes::default() };
        assert_eq!(bounds(&filter_entities(mixed, &transaction)), vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn test_process_scenario_a() {
        let processor = EntityPostProcessor::default();
        let input = vec![span("ORG", 0, 5, 0.9), span("MONEY", 6, 10, 0.8)];
        let options = NerOptions { combine_financial_entities: true };

        let output = processor.process("Acme $100", input, &options, &TermTypes::all());

        assert_eq!(output.len(), 1);
        assert_eq!(bounds(&output), vec![(0, 10)]);
        assert_eq!(output[0].entity_group, EntityGroup::CombinedFinancial);
        assert!((output[0].score - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_process_combined_dropped_by_company_filter() {
        let processor = EntityPostProcessor::default();
        let input = vec![span("ORG", 0, 5, 0.9), span("MONEY", 6, 10, 0.8)];
        let options = NerOptions { combine_financial_entities: true };
        let company = TermTypes { company: true, ..TermTypes::default() };

        // the ORG constituent loses to the wider combined span before filtering
        let output = processor.process("Acme $100", input, &options, &company);
        assert!(output.is_empty());
    }

    #[test]
    fn test_process_empty_input() {
        let processor = EntityPostProcessor::new(OverlapPolicy::Strict);
        let output = processor.process("", Vec::new(), &NerOptions::default(), &TermTypes::all());
        assert!(output.is_empty());
    }
}
