use pivotrec::algorithms::{CollaborativeFilter, Recommender};
use pivotrec::services::data::generate_synthetic_ratings;
use pivotrec::utils::extract_item_metadata;
use pivotrec::*;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::default();
    println!("Generating {} users x {} items", config.generator.num_users, config.generator.num_items);

    // 1. Rating table (the dashboard's "generate sample" mode)
    let ratings = generate_synthetic_ratings(&config.generator)?;
    let metadata = extract_item_metadata(&ratings);

    // 2. Pivot + user/item similarity
    let model = CollaborativeFilter::fit(&ratings);
    let (users, items) = model.pivot.shape();
    println!("Pivot: {} users, {} items, {} rated cells", users, items, model.pivot.rating_count());

    // 3. User-based recommendations
    let user_id = model.pivot.user_ids()[0];
    let recs = model.recommend_for_user(
        user_id,
        config.recommendation.default_n,
        config.recommendation.min_rating_threshold,
    );
    println!("\nRecommended for user {}:", user_id);
    for item_id in &recs {
        let category = metadata
            .get(item_id)
            .and_then(|m| m.category.as_deref())
            .unwrap_or("N/A");
        println!("  item {} ({})", item_id, category);
    }

    // 4. Nearest users
    println!("\nUsers most like {}:", user_id);
    for (other, score) in model.similar_users(user_id, 3) {
        println!("  user {} similarity {:.3}", other, score);
    }

    // 5. Item-based similar items
    let item_id = model.pivot.item_ids()[0];
    println!("\nItems similar to {}:", item_id);
    for (other, score) in model.similar_items_scored(item_id, config.recommendation.default_n) {
        println!("  item {} similarity {:.3}", other, score);
    }

    Ok(())
}
