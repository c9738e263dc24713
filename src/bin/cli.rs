use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pivotrec::services::data;
use pivotrec::services::recommendation::RecommendationService;
use pivotrec::{init_tracing, Config, RecommendationItem, RecommendationRequest};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Query recommendations from a rating table", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Rating table with User_ID, Item_ID, Rating columns; generated when omitted
    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long)]
    users: Option<usize>,

    #[arg(long)]
    items: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Items to suggest to a user
    User {
        user_id: i64,
        #[arg(short, long)]
        n: Option<usize>,
        #[arg(short, long)]
        threshold: Option<f64>,
    },
    /// Items similar to an item
    Item {
        item_id: i64,
        #[arg(short, long)]
        n: Option<usize>,
    },
    /// Write the rating table to a CSV file
    Export {
        #[arg(short, long)]
        out: PathBuf,
    },
    /// Print table dimensions
    Summary,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = Config::load_or_default(&args.config)?;
    if let Some(users) = args.users {
        config.generator.num_users = users;
    }
    if let Some(items) = args.items {
        config.generator.num_items = items;
    }
    if args.seed.is_some() {
        config.generator.seed = args.seed;
    }

    let config = Arc::new(config);
    let service = RecommendationService::new(config.clone());
    match &args.csv {
        Some(path) => {
            let records = data::load_csv_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            service.replace_ratings(records)?;
        }
        None => {
            let records = data::generate_synthetic_ratings(&config.generator)?;
            service.replace_ratings(records)?;
        }
    }

    match args.command {
        Command::User { user_id, n, threshold } => {
            let request = RecommendationRequest {
                user_id,
                num_recommendations: n.unwrap_or(config.recommendation.default_n),
                min_rating_threshold: threshold.unwrap_or(config.recommendation.min_rating_threshold),
            };
            let response = service.recommend_for_user(&request)?;
            if response.recommendations.is_empty() {
                println!(
                    "No recommendations found for user {} (user may be unknown or have rated most items)",
                    user_id
                );
            } else {
                println!("Recommended items for user {}:", user_id);
                print_items(&response.recommendations);
            }
        }
        Command::Item { item_id, n } => {
            let response = service.similar_items(item_id, n.unwrap_or(config.recommendation.default_n))?;
            if response.similar_items.is_empty() {
                println!("No similar items found for item {}", item_id);
            } else {
                println!("Items similar to {}:", item_id);
                print_items(&response.similar_items);
            }
        }
        Command::Export { out } => {
            let records = service.records();
            data::save_csv_path(&out, &records)?;
            info!("Wrote {} ratings to {}", records.len(), out.display());
        }
        Command::Summary => {
            let summary = service.summary();
            println!(
                "{} ratings, {} users, {} items, {} rated cells",
                summary.records, summary.users, summary.items, summary.rated_cells
            );
        }
    }

    Ok(())
}

fn print_items(items: &[RecommendationItem]) {
    for item in items {
        let category = item.category.as_deref().unwrap_or("N/A");
        let price = item
            .price
            .map(|p| format!("${:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        match item.score {
            Some(score) => println!("  item {:>6}  {:<10} {:>9}  similarity {:.3}", item.item_id, category, price, score),
            None => println!("  item {:>6}  {:<10} {:>9}", item.item_id, category, price),
        }
    }
}
