use super::*;
use meridian_protocols::knowledge::{KnowledgeItem, SourceMeta, SourceType};

fn item(source: SourceType, id: &str) -> KnowledgeItem {
    let meta = match source {
        SourceType::Message => SourceMeta::Message {
            sender: None,
            sent_at: None,
        },
        SourceType::Document => SourceMeta::Document {
            author: None,
            updated_at: None,
        },
        SourceType::Transcript => SourceMeta::Transcript {
            meeting_id: None,
            speaker: None,
            recorded_at: None,
        },
        SourceType::Event => SourceMeta::Event {
            organizer: None,
            starts_at: None,
        },
    };
    KnowledgeItem::new(id, format!("{} {}", source, id), "body", meta)
}

fn vector_hit(source: SourceType, id: &str, similarity: f32) -> VectorHit {
    VectorHit {
        item: item(source, id),
        similarity,
    }
}

fn lexical_hit(source: SourceType, id: &str, score: f32) -> LexicalHit {
    LexicalHit {
        item: item(source, id),
        score,
    }
}

#[test]
fn test_overlapping_item_appears_once_with_summed_score() {
    let vector = vec![vector_hit(SourceType::Message, "m1", 0.9)];
    let lexical = vec![lexical_hit(SourceType::Message, "m1", 4.2)];

    let results = reciprocal_rank_fusion(&vector, &lexical, &FusionConfig::default());

    assert_eq!(results.len(), 1);
    let expected = 1.0 / 61.0 + 1.0 / 61.0;
    assert!((results[0].fused_score - expected).abs() < 1e-6);
    assert_eq!(results[0].vector_rank, Some(1));
    assert_eq!(results[0].keyword_rank, Some(1));
    assert_eq!(results[0].similarity, Some(0.9));
}

#[test]
fn test_same_id_different_sources_are_distinct() {
    let vector = vec![vector_hit(SourceType::Message, "42", 0.9)];
    let lexical = vec![lexical_hit(SourceType::Document, "42", 4.2)];

    let results = reciprocal_rank_fusion(&vector, &lexical, &FusionConfig::default());
    assert_eq!(results.len(), 2);
}

#[test]
fn test_overlap_outranks_single_list_leaders() {
    // Vector leg after the similarity floor: [A, B]; lexical leg: [B, D].
    let vector = vec![
        vector_hit(SourceType::Document, "A", 0.9),
        vector_hit(SourceType::Document, "B", 0.8),
    ];
    let lexical = vec![
        lexical_hit(SourceType::Document, "B", 5.0),
        lexical_hit(SourceType::Document, "D", 3.0),
    ];

    let results = reciprocal_rank_fusion(&vector, &lexical, &FusionConfig::default());
    let ids: Vec<&str> = results.iter().map(|r| r.item.id.as_str()).collect();

    // B sums 1/62 + 1/61 and beats A's 1/61, which beats D's 1/62.
    assert_eq!(ids, vec!["B", "A", "D"]);

    let b = &results[0];
    assert!((b.fused_score - (1.0 / 62.0 + 1.0 / 61.0)).abs() < 1e-6);
    assert_eq!(b.vector_rank, Some(2));
    assert_eq!(b.keyword_rank, Some(1));
}

#[test]
fn test_fusion_is_deterministic() {
    let vector = vec![
        vector_hit(SourceType::Message, "a", 0.9),
        vector_hit(SourceType::Message, "b", 0.8),
        vector_hit(SourceType::Transcript, "c", 0.7),
    ];
    let lexical = vec![
        lexical_hit(SourceType::Document, "d", 5.0),
        lexical_hit(SourceType::Message, "a", 4.0),
    ];

    let first = reciprocal_rank_fusion(&vector, &lexical, &FusionConfig::default());
    for _ in 0..10 {
        let again = reciprocal_rank_fusion(&vector, &lexical, &FusionConfig::default());
        let first_keys: Vec<_> = first.iter().map(|r| r.item.key()).collect();
        let again_keys: Vec<_> = again.iter().map(|r| r.item.key()).collect();
        assert_eq!(first_keys, again_keys);
    }
}

#[test]
fn test_equal_scores_tie_break_by_key() {
    // Two items each found only at rank 1 of one list: identical fused
    // scores, so the key decides.
    let vector = vec![vector_hit(SourceType::Message, "z", 0.9)];
    let lexical = vec![lexical_hit(SourceType::Document, "a", 5.0)];

    let results = reciprocal_rank_fusion(&vector, &lexical, &FusionConfig::default());
    // message sorts before document in the SourceType ordering.
    assert_eq!(results[0].item.id, "z");
    assert_eq!(results[1].item.id, "a");
}

#[test]
fn test_better_rank_strictly_increases_score() {
    let lexical: Vec<LexicalHit> = (0..10)
        .map(|i| lexical_hit(SourceType::Document, &format!("d{}", i), 1.0))
        .collect();

    let at_rank_10 = reciprocal_rank_fusion(&[], &lexical, &FusionConfig::default());
    let d9_low = at_rank_10
        .iter()
        .find(|r| r.item.id == "d9")
        .unwrap()
        .fused_score;

    // Move d9 to the front.
    let mut promoted = lexical.clone();
    let last = promoted.pop().unwrap();
    promoted.insert(0, last);

    let at_rank_1 = reciprocal_rank_fusion(&[], &promoted, &FusionConfig::default());
    let d9_high = at_rank_1
        .iter()
        .find(|r| r.item.id == "d9")
        .unwrap()
        .fused_score;

    assert!(d9_high > d9_low);
}

#[test]
fn test_empty_inputs() {
    let results = reciprocal_rank_fusion(&[], &[], &FusionConfig::default());
    assert!(results.is_empty());

    let vector = vec![vector_hit(SourceType::Message, "a", 0.9)];
    let results = reciprocal_rank_fusion(&vector, &[], &FusionConfig::default());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].keyword_rank, None);

    let lexical = vec![lexical_hit(SourceType::Message, "a", 4.0)];
    let results = reciprocal_rank_fusion(&[], &lexical, &FusionConfig::default());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].vector_rank, None);
    assert_eq!(results[0].similarity, None);
}

#[test]
fn test_output_is_sorted_descending() {
    let vector: Vec<VectorHit> = (0..5)
        .map(|i| vector_hit(SourceType::Message, &format!("m{}", i), 0.9))
        .collect();
    let lexical: Vec<LexicalHit> = (0..5)
        .map(|i| lexical_hit(SourceType::Document, &format!("d{}", i), 1.0))
        .collect();

    let results = reciprocal_rank_fusion(&vector, &lexical, &FusionConfig::default());
    for pair in results.windows(2) {
        assert!(pair[0].fused_score >= pair[1].fused_score);
    }
}

#[test]
fn test_items_in_both_lists_beat_single_list_items() {
    let vector = vec![
        vector_hit(SourceType::Message, "only_vector", 0.95),
        vector_hit(SourceType::Message, "both", 0.90),
    ];
    let lexical = vec![lexical_hit(SourceType::Message, "both", 4.0)];

    let results = reciprocal_rank_fusion(&vector, &lexical, &FusionConfig::default());
    assert_eq!(results[0].item.id, "both");
}
