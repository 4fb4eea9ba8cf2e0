//! Unit tests for analysis stages

#[cfg(test)]
mod tests {
    use super::super::claims::{batch_extract_claims, extract_claim};
    use super::super::cluster::{cluster_count, cluster_vectors};
    use super::super::coordination::score_coordination;
    use super::super::cosine_similarity;
    use super::super::dedupe::{dedupe_by_vectors, DEDUP_THRESHOLD};
    use super::super::hard_data::{extract_hard_data, format_for_prompt};
    use super::super::psychology::analyze_psychology;
    use super::super::sentiment::*;
    use crate::types::{AsymmetryLevel, Mood};

    fn unit(v: Vec<f32>) -> Vec<f32> {
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        v.into_iter().map(|x| x / norm).collect()
    }

    #[test]
    fn test_cosine_similarity_bounds() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&a, &b)).abs() < 1e-6);
        assert_eq!(cosine_similarity(&a, &[]), 0.0);
    }

    #[test]
    fn test_extract_claim_prefers_long_first_clause() {
        let claim = extract_claim("Oil prices surged after the OPEC meeting ended. Analysts differ.");
        assert_eq!(claim, "Oil prices surged after the OPEC meeting ended");
    }

    #[test]
    fn test_extract_claim_skips_short_lead() {
        // Four-word lead falls through to the second clause
        let claim = extract_claim("BREAKING NEWS UPDATE ALERT. Oil output cut extended through the year");
        assert_eq!(claim, "Oil output cut extended through the year");
    }

    #[test]
    fn test_extract_claim_caps_length() {
        let long = "word ".repeat(200);
        let claim = extract_claim(&long);
        assert!(claim.chars().count() <= 300);
    }

    #[test]
    fn test_batch_extract_preserves_order() {
        let texts = vec![
            "First headline stands alone here today".to_string(),
            "".to_string(),
        ];
        let claims = batch_extract_claims(&texts);
        assert_eq!(claims.len(), 2);
        assert!(claims[0].starts_with("First headline"));
        assert!(claims[1].is_empty());
    }

    #[test]
    fn test_dedupe_drops_near_duplicates() {
        let base = unit(vec![1.0, 0.2, 0.1]);
        let near = unit(vec![1.0, 0.21, 0.1]);
        let far = unit(vec![0.0, 1.0, 0.0]);

        let (kept, vectors) = dedupe_by_vectors(
            vec!["a", "b", "c"],
            vec![base.clone(), near, far],
            DEDUP_THRESHOLD,
        );

        assert_eq!(kept, vec!["a", "c"]);
        assert_eq!(vectors.len(), 2);

        // Survivors stay mutually below the threshold
        for i in 0..vectors.len() {
            for j in 0..vectors.len() {
                if i != j {
                    assert!(cosine_similarity(&vectors[i], &vectors[j]) < DEDUP_THRESHOLD);
                }
            }
        }
    }

    #[test]
    fn test_dedupe_keeps_order_and_first_wins() {
        let v = unit(vec![1.0, 0.0]);
        let (kept, _) = dedupe_by_vectors(
            vec![1, 2, 3],
            vec![v.clone(), v.clone(), unit(vec![0.0, 1.0])],
            DEDUP_THRESHOLD,
        );
        assert_eq!(kept, vec![1, 3]);
    }

    #[test]
    fn test_cluster_count_bounds() {
        assert_eq!(cluster_count(3), 2);
        assert_eq!(cluster_count(10), 2);
        assert_eq!(cluster_count(15), 3);
        assert_eq!(cluster_count(40), 4);
        assert_eq!(cluster_count(500), 4);
    }

    #[test]
    fn test_small_bundle_gets_single_cluster() {
        let vectors = vec![unit(vec![1.0, 0.0]), unit(vec![0.0, 1.0])];
        assert_eq!(cluster_vectors(&vectors), vec![0, 0]);
        assert!(cluster_vectors(&[]).is_empty());
    }

    #[test]
    fn test_clustering_separates_opposed_groups() {
        let mut vectors = Vec::new();
        for i in 0..5 {
            vectors.push(unit(vec![1.0, 0.01 * i as f32]));
        }
        for i in 0..5 {
            vectors.push(unit(vec![0.01 * i as f32, 1.0]));
        }

        let labels = cluster_vectors(&vectors);
        assert_eq!(labels.len(), 10);

        // Same-side items share a label, opposite sides differ
        assert!(labels[..5].iter().all(|&l| l == labels[0]));
        assert!(labels[5..].iter().all(|&l| l == labels[5]));
        assert_ne!(labels[0], labels[5]);

        // Deterministic across runs
        assert_eq!(labels, cluster_vectors(&vectors));
    }

    #[tokio::test]
    async fn test_lexicon_labels() {
        let model = LexiconSentiment::new();
        let texts = vec![
            "Markets rally sharply as profits surge".to_string(),
            "Shares crash amid panic and heavy losses".to_string(),
            "The committee met on Tuesday".to_string(),
        ];

        let predictions = model.classify_batch(&texts).await.unwrap();
        assert_eq!(predictions[0].label, SentimentLabel::Positive);
        assert_eq!(predictions[1].label, SentimentLabel::Negative);
        assert_eq!(predictions[2].label, SentimentLabel::Neutral);

        let signed = signed_scores(&predictions);
        assert!(signed[0] > 0.0 && signed[0] <= 1.0);
        assert!(signed[1] < 0.0 && signed[1] >= -1.0);
        assert_eq!(signed[2], 0.0);
    }

    #[test]
    fn test_negation_flips_sentiment() {
        let model = LexiconSentiment::new();
        let plain = model.compound("profits surge");
        let negated = model.compound("profits won't surge");
        assert!(plain > 0.0);
        assert!(negated < plain);
    }

    #[test]
    fn test_coordination_dominated_by_few_sources() {
        let sources: Vec<String> = ["PumpDaily", "PumpDaily", "PumpDaily", "PumpDaily", "A", "B"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let score = score_coordination(&sources);
        assert!(score >= 0.6);
        assert!(score <= 1.0);

        assert_eq!(score_coordination(&[]), 0.0);

        // Fully spread across many sources scores lower than a dominated set
        let spread: Vec<String> = (0..10).map(|i| format!("src{}", i)).collect();
        assert!(score_coordination(&spread) < score);
    }

    #[test]
    fn test_psychology_trap_and_mood() {
        let report = analyze_psychology(&[0.8, 0.9, 0.7], 0.4, 0.8);
        assert_eq!(report.mood, Mood::Euforia);
        assert!(report.is_trap);
        assert!(!report.is_crowded);
        assert_eq!(report.asymmetry_level, AsymmetryLevel::Alta);
    }

    #[test]
    fn test_psychology_crowded_low_asymmetry() {
        let report = analyze_psychology(&[-0.8, -0.7], 0.8, 0.2);
        assert_eq!(report.mood, Mood::Medo);
        assert!(report.is_crowded);
        assert!(!report.is_trap);
        assert_eq!(report.asymmetry_level, AsymmetryLevel::Baixa);
    }

    #[test]
    fn test_psychology_neutral_empty() {
        let report = analyze_psychology(&[], 0.0, 0.0);
        assert_eq!(report.mood, Mood::Neutro);
        assert_eq!(report.sentiment_score, 0.0);
    }

    #[test]
    fn test_hard_data_extraction() {
        let texts = vec![
            "Oil jumped +5.4% to $82 while the fund raised USD 100 M".to_string(),
            "A later report repeated the +5.4% move and a -0.2% dip".to_string(),
        ];
        let data = extract_hard_data(&texts);

        assert!(data.percentages.contains(&"+5.4%".to_string()));
        assert!(data.percentages.contains(&"-0.2%".to_string()));
        // Repeated matches are deduplicated, first-seen order kept
        assert_eq!(data.percentages.iter().filter(|p| *p == "+5.4%").count(), 1);
        assert_eq!(data.percentages[0], "+5.4%");

        assert!(data.monetary.iter().any(|m| m.starts_with("$")));
        assert!(data.monetary.iter().any(|m| m.starts_with("USD 100")));
        assert!(data.key_numbers.is_empty());
    }

    #[test]
    fn test_hard_data_caps_at_ten() {
        let text = (0..30).map(|i| format!("{}%", i)).collect::<Vec<_>>().join(" ");
        let data = extract_hard_data(&[text]);
        assert_eq!(data.percentages.len(), 10);
    }

    #[test]
    fn test_prompt_formatting() {
        let empty = format_for_prompt(&crate::types::HardData::default());
        assert!(empty.contains("No concrete numeric data"));

        let data = extract_hard_data(&["up 3% on $10 bn inflows".to_string()]);
        let prompt = format_for_prompt(&data);
        assert!(prompt.contains("3%"));
        assert!(prompt.contains("$10 bn"));
    }
}
