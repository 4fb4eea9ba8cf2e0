//! Unit tests for the arbitration engine

#[cfg(test)]
mod tests {
    use super::super::*;
    use std::collections::BTreeMap;

    fn unit(v: Vec<f32>) -> Vec<f32> {
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.into_iter().map(|x| x / norm).collect()
    }

    fn sources(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_verdict_bounds_hold() {
        let vectors = vec![
            unit(vec![1.0, 0.0, 0.0]),
            unit(vec![1.0, 0.05, 0.0]),
            unit(vec![0.0, 1.0, 0.0]),
            unit(vec![-1.0, 0.0, 0.2]),
        ];
        let srcs = sources(&["A", "B", "C", "D"]);

        let verdicts = ArbitrationEngine::default().analyze(&vectors, &srcs);
        assert_eq!(verdicts.len(), 4);

        for verdict in &verdicts {
            assert!(verdict.intensity >= 0.0 && verdict.intensity <= 1.0);
            for score in verdict.source_scores.values() {
                assert!((0.0..=1.0).contains(score));
            }
            // Self-similarity is excluded, three foreign sources remain
            assert_eq!(verdict.source_scores.len(), 3);
        }
    }

    #[test]
    fn test_copies_raise_intensity_and_explanation() {
        // Two near-identical items from different sources, one dissenter
        let vectors = vec![
            unit(vec![1.0, 0.01]),
            unit(vec![1.0, 0.012]),
            unit(vec![0.0, 1.0]),
        ];
        let srcs = sources(&["WireA", "CopyCat", "Dissent"]);

        let verdicts = ArbitrationEngine::new(0.92).analyze(&vectors, &srcs);

        assert!(verdicts[0].intensity > verdicts[2].intensity);
        assert!(verdicts[0].explanation.contains("CopyCat"));
        assert!(verdicts[2].explanation.contains("No source crosses"));
    }

    #[test]
    fn test_same_source_duplicates_are_not_copies() {
        let vectors = vec![unit(vec![1.0, 0.0]), unit(vec![1.0, 0.001])];
        let srcs = sources(&["Same", "Same"]);

        let verdicts = ArbitrationEngine::new(0.92).analyze(&vectors, &srcs);
        assert!(!verdicts[0].explanation.contains("mirrored"));
        // The shared source still appears in the score map
        assert!(verdicts[0].source_scores.contains_key("Same"));
    }

    #[test]
    fn test_source_scores_record_max_per_source() {
        let vectors = vec![
            unit(vec![1.0, 0.0]),
            unit(vec![1.0, 0.1]),
            unit(vec![0.0, 1.0]),
        ];
        // Items 1 and 2 share a source; item 0 should see the closer one
        let srcs = sources(&["Lead", "Echo", "Echo"]);

        let verdicts = ArbitrationEngine::new(0.92).analyze(&vectors, &srcs);
        let echo_score = verdicts[0].source_scores["Echo"];
        let sim_close = crate::analysis::cosine_similarity(&vectors[0], &vectors[1]) as f64;
        assert!((echo_score - sim_close).abs() < 1e-6);
    }

    #[test]
    fn test_lower_copy_threshold_catches_looser_matches() {
        let vectors = vec![unit(vec![1.0, 0.5]), unit(vec![1.0, 0.1])];
        let srcs = sources(&["A", "B"]);

        let strict = ArbitrationEngine::new(0.98).analyze(&vectors, &srcs);
        let loose = ArbitrationEngine::new(0.82).analyze(&vectors, &srcs);

        assert!(!strict[0].explanation.contains("mirrored"));
        assert!(loose[0].explanation.contains("mirrored"));
    }

    #[test]
    fn test_single_item_bundle() {
        let verdicts =
            ArbitrationEngine::default().analyze(&[unit(vec![1.0, 0.0])], &sources(&["Solo"]));
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].intensity, 0.0);
        assert!(verdicts[0].source_scores.is_empty());
        assert_eq!(global_entropy(&verdicts[0].source_scores), 0.0);
    }

    #[test]
    fn test_winner_weights_credibility_and_breaks_ties_first() {
        let mut a = BTreeMap::new();
        a.insert("x".to_string(), 0.5);
        let mut b = BTreeMap::new();
        b.insert("x".to_string(), 0.5);

        let verdicts = vec![
            Verdict {
                intensity: 0.0,
                source_scores: a,
                explanation: String::new(),
            },
            Verdict {
                intensity: 0.0,
                source_scores: b,
                explanation: String::new(),
            },
        ];

        // Equal centrality and credibility: first occurrence wins
        assert_eq!(select_winner(&verdicts, &[0.5, 0.5]), 0);
        // Higher credibility flips it
        assert_eq!(select_winner(&verdicts, &[0.5, 0.9]), 1);
    }

    #[test]
    fn test_entropy_equal_scores_is_log_k() {
        let mut scores = BTreeMap::new();
        for name in ["a", "b", "c", "d"] {
            scores.insert(name.to_string(), 0.25);
        }
        let entropy = global_entropy(&scores);
        assert!((entropy - (4.0f64).ln()).abs() < 1e-6);
    }

    #[test]
    fn test_entropy_single_dominant_is_zero() {
        let mut scores = BTreeMap::new();
        scores.insert("only".to_string(), 0.9);
        scores.insert("silent".to_string(), 0.0);
        let entropy = global_entropy(&scores);
        assert!(entropy.abs() < 1e-6);
    }

    #[test]
    fn test_entropy_empty_scores() {
        assert_eq!(global_entropy(&BTreeMap::new()), 0.0);
    }
}
