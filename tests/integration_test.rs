use pivotrec::algorithms::*;
use pivotrec::config::GeneratorConfig;
use pivotrec::services::data::generate_synthetic_ratings;
use pivotrec::*;
use std::collections::{BTreeSet, HashSet};

fn records(rows: &[(i64, i64, f64)]) -> Vec<RatingRecord> {
    rows.iter()
        .map(|&(user_id, item_id, rating)| RatingRecord::new(user_id, item_id, rating))
        .collect()
}

fn sample_table(seed: u64) -> Vec<RatingRecord> {
    let config = GeneratorConfig {
        num_users: 60,
        num_items: 40,
        seed: Some(seed),
        ..GeneratorConfig::default()
    };
    generate_synthetic_ratings(&config).unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    let ratings = records(&[
        (1, 10, 5.0),
        (1, 20, 1.0),
        (2, 10, 5.0),
        (2, 20, 5.0),
        (2, 30, 4.0),
    ]);

    let pivot = build_pivot(&ratings);
    assert_eq!(pivot.user_ids(), &[1, 2]);
    assert_eq!(pivot.item_ids(), &[10, 20, 30]);

    let users = user_similarity(&pivot);
    let items = item_similarity(&pivot);

    let recs = recommend_for_user(1, &pivot, &users, 2, 3.0);
    assert_eq!(recs, vec![30]);
    assert!(!recs.contains(&10));
    assert!(!recs.contains(&20));

    // Item 20 shares both raters with item 10, item 30 only one.
    assert!(items.get(10, 30).unwrap() < items.get(10, 20).unwrap());
    assert_eq!(recommend_similar_items(10, &items, 5), vec![20, 30]);
}

#[test]
fn test_pivot_axes_match_input_ids() {
    let ratings = sample_table(1);
    let pivot = build_pivot(&ratings);

    let users: BTreeSet<i64> = ratings.iter().map(|r| r.user_id).collect();
    let items: BTreeSet<i64> = ratings.iter().map(|r| r.item_id).collect();

    assert_eq!(pivot.user_ids(), users.into_iter().collect::<Vec<_>>().as_slice());
    assert_eq!(pivot.item_ids(), items.into_iter().collect::<Vec<_>>().as_slice());
}

#[test]
fn test_similarity_properties_on_generated_data() {
    let pivot = build_pivot(&sample_table(2));

    for sim in [user_similarity(&pivot), item_similarity(&pivot)] {
        let values = sim.values();
        for i in 0..sim.len() {
            assert!((values[[i, i]] - 1.0).abs() < 1e-9);
            for j in 0..sim.len() {
                assert!((values[[i, j]] - values[[j, i]]).abs() < 1e-12);
            }
        }
    }
}

#[test]
fn test_user_recommendations_never_include_rated_items() {
    let pivot = build_pivot(&sample_table(3));
    let users = user_similarity(&pivot);

    for &user_id in pivot.user_ids() {
        let rated: HashSet<i64> = pivot.rated_items(user_id).into_iter().collect();
        let recs = recommend_for_user(user_id, &pivot, &users, 10, 3.0);

        assert!(recs.len() <= 10);
        assert!(recs.iter().all(|item| !rated.contains(item)));
        let unique: HashSet<i64> = recs.iter().copied().collect();
        assert_eq!(unique.len(), recs.len());
    }
}

#[test]
fn test_output_length_is_min_of_request_and_candidates() {
    let pivot = build_pivot(&sample_table(4));
    let users = user_similarity(&pivot);
    let items = item_similarity(&pivot);
    let user_id = pivot.user_ids()[0];

    let all = recommend_for_user(user_id, &pivot, &users, usize::MAX, 0.0);
    for n in [1, 3, all.len(), all.len() + 5] {
        let recs = recommend_for_user(user_id, &pivot, &users, n, 0.0);
        assert_eq!(recs.len(), n.min(all.len()));
        assert_eq!(recs.as_slice(), &all[..recs.len()]);
    }

    let item_id = pivot.item_ids()[0];
    let others = pivot.item_ids().len() - 1;
    for n in [1, others, others + 3] {
        assert_eq!(recommend_similar_items(item_id, &items, n).len(), n.min(others));
    }
}

#[test]
fn test_neighbor_ratings_at_threshold_are_excluded() {
    let pivot = build_pivot(&records(&[
        (1, 1, 5.0),
        (2, 1, 5.0),
        (2, 2, 4.0),
        (2, 3, 4.5),
    ]));
    let users = user_similarity(&pivot);

    assert_eq!(recommend_for_user(1, &pivot, &users, 5, 4.0), vec![3]);
    assert_eq!(recommend_for_user(1, &pivot, &users, 5, 3.9), vec![2, 3]);
}

#[test]
fn test_unrated_user_vector_is_dissimilar_to_everything() {
    // User 3 only has a zero rating, which fills to a zero vector.
    let pivot = build_pivot(&records(&[(1, 1, 4.0), (2, 1, 3.0), (3, 2, 0.0)]));
    let users = user_similarity(&pivot);

    assert_eq!(users.get(3, 3), Some(0.0));
    assert_eq!(users.get(3, 1), Some(0.0));
    assert_eq!(users.get(1, 1), Some(1.0));
}

#[test]
fn test_unknown_ids_are_not_errors() {
    let model = CollaborativeFilter::fit(&sample_table(5));

    assert!(model.recommend_for_user(-1, 5, 0.0).is_empty());
    assert!(model.recommend_similar_items(-1, 5).is_empty());
}

#[test]
fn test_empty_table_flows_through() {
    let model = CollaborativeFilter::fit(&[]);

    assert!(model.pivot.is_empty());
    assert!(model.user_similarity.is_empty());
    assert!(model.item_similarity.is_empty());
    assert!(model.recommend_for_user(1, 5, 4.0).is_empty());
    assert!(model.recommend_similar_items(1, 5).is_empty());
}
