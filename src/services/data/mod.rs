use crate::config::GeneratorConfig;
use crate::error::{DataError, DataResult};
use crate::models::RatingRecord;
use crate::utils::validation::validate_rating_records;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Synthesises a fashion-store rating table.
///
/// Produces `num_users * ratings_per_user` rows with uniformly drawn user ids,
/// item ids and integer ratings in 1..=5. Every item gets one category and one
/// price, so repeated rows for an item agree on their metadata. The same seed
/// always yields the same table.
pub fn generate_synthetic_ratings(config: &GeneratorConfig) -> DataResult<Vec<RatingRecord>> {
    if config.num_users == 0 || config.num_items == 0 {
        return Err(DataError::InvalidGenerator(
            "num_users and num_items must be at least 1".to_string(),
        ));
    }
    if config.num_users > config.max_users || config.num_items > config.max_items {
        return Err(DataError::InvalidGenerator(format!(
            "at most {} users and {} items can be generated, got {} x {}",
            config.max_users, config.max_items, config.num_users, config.num_items
        )));
    }
    if config.categories.is_empty() {
        return Err(DataError::InvalidGenerator("categories cannot be empty".to_string()));
    }
    if !(config.price_min.is_finite() && config.price_max.is_finite()) || config.price_min > config.price_max {
        return Err(DataError::InvalidGenerator(format!(
            "invalid price range {}..{}",
            config.price_min, config.price_max
        )));
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let n_rows = config
        .num_users
        .checked_mul(config.ratings_per_user)
        .ok_or_else(|| DataError::InvalidGenerator("too many rows requested".to_string()))?;
    let num_users = config.num_users as i64;
    let num_items = config.num_items as i64;

    let rows: Vec<(i64, i64, f64)> = (0..n_rows)
        .map(|_| {
            (
                rng.gen_range(1..=num_users),
                rng.gen_range(1..=num_items),
                f64::from(rng.gen_range(1..=5u8)),
            )
        })
        .collect();

    let item_categories: Vec<&String> = (0..config.num_items)
        .filter_map(|_| config.categories.choose(&mut rng))
        .collect();
    let prices: Vec<f64> = (0..config.num_items)
        .map(|_| round_cents(rng.gen_range(config.price_min..=config.price_max)))
        .collect();

    let records: Vec<RatingRecord> = rows
        .into_iter()
        .map(|(user_id, item_id, rating)| {
            let slot = (item_id - 1) as usize;
            RatingRecord {
                user_id,
                item_id,
                rating,
                category: item_categories.get(slot).map(|c| c.to_string()),
                price: prices.get(slot).copied(),
            }
        })
        .collect();

    info!(
        users = config.num_users,
        items = config.num_items,
        rows = records.len(),
        seed = ?config.seed,
        "Generated synthetic ratings"
    );
    Ok(records)
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Reads a rating table with `User_ID`, `Item_ID`, `Rating` and optional
/// `Category`, `Price` columns.
pub fn load_csv<R: Read>(reader: R) -> DataResult<Vec<RatingRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let records = csv_reader
        .deserialize::<RatingRecord>()
        .collect::<Result<Vec<_>, _>>()?;

    validate_rating_records(&records)?;
    Ok(records)
}

pub fn load_csv_path<P: AsRef<Path>>(path: P) -> DataResult<Vec<RatingRecord>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let records = load_csv(file)?;
    info!("Loaded {} ratings from {}", records.len(), path.display());
    Ok(records)
}

pub fn save_csv<W: Write>(writer: W, records: &[RatingRecord]) -> DataResult<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(["User_ID", "Item_ID", "Rating", "Category", "Price"])?;
    for record in records {
        csv_writer.write_record([
            record.user_id.to_string(),
            record.item_id.to_string(),
            record.rating.to_string(),
            record.category.clone().unwrap_or_default(),
            record.price.map(|p| p.to_string()).unwrap_or_default(),
        ])?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_csv_path<P: AsRef<Path>>(path: P, records: &[RatingRecord]) -> DataResult<()> {
    let file = std::fs::File::create(path.as_ref())?;
    save_csv(file, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn small_config(seed: Option<u64>) -> GeneratorConfig {
        GeneratorConfig {
            num_users: 20,
            num_items: 15,
            seed,
            ..GeneratorConfig::default()
        }
    }

    #[test]
    fn test_generated_table_shape() {
        let config = small_config(Some(7));
        let records = generate_synthetic_ratings(&config).unwrap();

        assert_eq!(records.len(), 200);
        for record in &records {
            assert!((1..=20).contains(&record.user_id));
            assert!((1..=15).contains(&record.item_id));
            assert!((1.0..=5.0).contains(&record.rating));
            assert_eq!(record.rating.fract(), 0.0);
            let price = record.price.unwrap();
            assert!((20.0..=100.0).contains(&price));
            assert!(config.categories.contains(record.category.as_ref().unwrap()));
        }
    }

    #[test]
    fn test_item_metadata_is_consistent() {
        let records = generate_synthetic_ratings(&small_config(Some(3))).unwrap();
        let mut seen: HashMap<i64, (Option<String>, Option<f64>)> = HashMap::new();

        for record in records {
            let entry = seen
                .entry(record.item_id)
                .or_insert((record.category.clone(), record.price));
            assert_eq!(entry.0, record.category);
            assert_eq!(entry.1, record.price);
        }
    }

    #[test]
    fn test_seed_is_deterministic() {
        let a = generate_synthetic_ratings(&small_config(Some(42))).unwrap();
        let b = generate_synthetic_ratings(&small_config(Some(42))).unwrap();
        let c = generate_synthetic_ratings(&small_config(Some(43))).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_rejects_bad_generator_settings() {
        let mut config = small_config(None);
        config.num_items = 0;
        assert!(generate_synthetic_ratings(&config).is_err());

        let mut config = small_config(None);
        config.categories.clear();
        assert!(generate_synthetic_ratings(&config).is_err());

        let mut config = small_config(None);
        config.ratings_per_user = usize::MAX;
        assert!(generate_synthetic_ratings(&config).is_err());

        let mut config = small_config(None);
        config.price_min = 50.0;
        config.price_max = 10.0;
        assert!(generate_synthetic_ratings(&config).is_err());
    }

    #[test]
    fn test_rejects_tables_above_the_size_limit() {
        let mut config = small_config(Some(1));
        config.num_users = usize::MAX / 2;
        assert!(matches!(
            generate_synthetic_ratings(&config),
            Err(DataError::InvalidGenerator(_))
        ));

        let mut config = small_config(Some(1));
        config.num_items = config.max_items + 1;
        assert!(matches!(
            generate_synthetic_ratings(&config),
            Err(DataError::InvalidGenerator(_))
        ));

        let mut config = small_config(Some(1));
        config.num_users = config.max_users;
        config.ratings_per_user = 1;
        assert_eq!(generate_synthetic_ratings(&config).unwrap().len(), config.max_users);
    }

    #[test]
    fn test_load_csv_with_optional_columns() {
        let data = "User_ID,Item_ID,Rating,Category,Price\n1,10,5,Hat,25.5\n2,10,3.5,,\n";
        let records = load_csv(data.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0], RatingRecord::new(1, 10, 5.0).with_category("Hat").with_price(25.5));
        assert_eq!(records[1], RatingRecord::new(2, 10, 3.5));
    }

    #[test]
    fn test_load_csv_core_columns_only() {
        let data = "User_ID,Item_ID,Rating\n3,30,4\n";
        let records = load_csv(data.as_bytes()).unwrap();
        assert_eq!(records, vec![RatingRecord::new(3, 30, 4.0)]);
    }

    #[test]
    fn test_load_csv_rejects_malformed_rows() {
        let missing_column = "User_ID,Item_ID\n1,10\n";
        assert!(matches!(load_csv(missing_column.as_bytes()), Err(DataError::Csv(_))));

        let non_numeric = "User_ID,Item_ID,Rating\n1,10,great\n";
        assert!(matches!(load_csv(non_numeric.as_bytes()), Err(DataError::Csv(_))));

        let not_a_number = "User_ID,Item_ID,Rating\n1,10,NaN\n";
        assert!(matches!(
            load_csv(not_a_number.as_bytes()),
            Err(DataError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_save_then_load_preserves_table() {
        let records = generate_synthetic_ratings(&small_config(Some(11))).unwrap();
        let mut buffer = Vec::new();
        save_csv(&mut buffer, &records).unwrap();

        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.starts_with("User_ID,Item_ID,Rating,Category,Price\n"));
        assert_eq!(load_csv(buffer.as_slice()).unwrap(), records);
    }
}
