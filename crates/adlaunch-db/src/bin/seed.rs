//! # Seed Data Generator
//!
//! Populates the database with a demo entity tree for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./adlaunch_dev.db with the default tree
//! cargo run -p adlaunch-db --bin seed
//!
//! # More keywords per ad group
//! cargo run -p adlaunch-db --bin seed -- --keywords 25
//!
//! # Specify database path and owner
//! cargo run -p adlaunch-db --bin seed -- --db ./data/adlaunch.db --owner owner-42
//! ```
//!
//! ## Generated Tree
//! ```text
//! PlatformAccount (valid refresh token)
//!   └── Campaign × 2   (resource "offer-demo", draft)
//!         └── AdGroup × 2   (draft)
//!               ├── Keyword × N   (draft, staggered created_at)
//!               └── Creative × 1  (draft, 5 headlines / 3 descriptions)
//! PlatformAccount (no refresh token)
//!   └── Campaign × 1   (resource "offer-demo", draft)
//! ```
//! Every row starts in `draft` so the whole tree can be pushed through the
//! sync engine.

use chrono::{Duration, Utc};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use adlaunch_core::{
    AdGroup, BudgetType, Campaign, Creative, EntityStatus, Keyword, MatchType, PlatformAccount,
    SyncState,
};
use adlaunch_db::{Database, DbConfig};

/// Keyword stems combined with modifiers for realistic test data
const KEYWORD_STEMS: &[&str] = &[
    "running shoes",
    "trail sneakers",
    "marathon trainers",
    "lightweight runners",
    "waterproof hiking boots",
];

const MODIFIERS: &[&str] = &["", "buy ", "best ", "cheap ", "women's ", "men's "];

const MATCH_TYPES: &[MatchType] = &[MatchType::Broad, MatchType::Phrase, MatchType::Exact];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,adlaunch=debug,sqlx=warn")),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut keywords_per_group: usize = 10;
    let mut db_path = String::from("./adlaunch_dev.db");
    let mut owner_id = String::from("demo-owner");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--keywords" | "-k" => {
                if i + 1 < args.len() {
                    keywords_per_group = args[i + 1].parse().unwrap_or(10);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner_id = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("AdLaunch Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -k, --keywords <N>   Keywords per ad group (default: 10)");
                println!("  -d, --db <PATH>      Database file path (default: ./adlaunch_dev.db)");
                println!("  -o, --owner <ID>     Owner id for every row (default: demo-owner)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, owner = %owner_id, keywords_per_group, "Seeding demo tree");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    let existing = db.accounts().list_for_owner(&owner_id).await?;
    if !existing.is_empty() {
        warn!(
            accounts = existing.len(),
            "Owner already has accounts; skipping seed to avoid duplicates"
        );
        return Ok(());
    }

    let funded = PlatformAccount {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.clone(),
        customer_id: "1234567890".to_string(),
        refresh_token: Some(format!("demo-refresh-{}", Uuid::new_v4())),
        is_active: true,
    };
    let unlinked = PlatformAccount {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.clone(),
        customer_id: "9876543210".to_string(),
        refresh_token: None,
        is_active: true,
    };
    db.accounts().insert(&funded).await?;
    db.accounts().insert(&unlinked).await?;

    let mut totals = (0usize, 0usize, 0usize, 0usize);
    let base_time = Utc::now();

    for (account, campaign_count) in [(&funded, 2), (&unlinked, 1)] {
        for c in 0..campaign_count {
            let campaign = Campaign {
                id: Uuid::new_v4().to_string(),
                owner_id: owner_id.clone(),
                account_id: account.id.clone(),
                resource_id: "offer-demo".to_string(),
                name: format!("Demo campaign {} ({})", c + 1, account.customer_id),
                budget_micros: 25_000_000,
                budget_type: BudgetType::Daily,
                status: EntityStatus::Enabled,
                start_date: Some(base_time.date_naive()),
                end_date: None,
                sync: SyncState::draft(),
            };
            db.campaigns().insert(&campaign).await?;
            totals.0 += 1;

            for g in 0..2 {
                let ad_group = AdGroup {
                    id: Uuid::new_v4().to_string(),
                    owner_id: owner_id.clone(),
                    campaign_id: campaign.id.clone(),
                    name: format!("Ad group {}", g + 1),
                    status: EntityStatus::Enabled,
                    cpc_bid_micros: Some(1_500_000),
                    sync: SyncState::draft(),
                };
                db.ad_groups().insert(&ad_group).await?;
                totals.1 += 1;

                for k in 0..keywords_per_group {
                    let keyword = generate_keyword(&owner_id, &ad_group.id, k, base_time + Duration::milliseconds(k as i64));
                    if let Err(e) = db.keywords().insert(&keyword).await {
                        warn!(text = %keyword.text, error = %e, "Failed to insert keyword");
                        continue;
                    }
                    totals.2 += 1;
                }

                let creative = Creative {
                    id: Uuid::new_v4().to_string(),
                    owner_id: owner_id.clone(),
                    ad_group_id: ad_group.id.clone(),
                    headlines: vec![
                        "Run Further For Less".to_string(),
                        "Free Shipping Today".to_string(),
                        "New Trail Collection".to_string(),
                        "Shop Running Shoes".to_string(),
                        "Rated 4.8 By Runners".to_string(),
                    ],
                    descriptions: vec![
                        "Lightweight trainers built for every distance.".to_string(),
                        "Order by 5pm for next-day delivery.".to_string(),
                        "Free returns within 60 days.".to_string(),
                    ],
                    final_url: "https://shop.example.com/running".to_string(),
                    path1: Some("running".to_string()),
                    path2: Some("shoes".to_string()),
                    sync: SyncState::draft(),
                };
                db.creatives().insert(&creative).await?;
                totals.3 += 1;
            }
        }
    }

    info!(
        campaigns = totals.0,
        ad_groups = totals.1,
        keywords = totals.2,
        creatives = totals.3,
        "Seed complete"
    );

    Ok(())
}

/// Generates one keyword with a rotating match type.
fn generate_keyword(
    owner_id: &str,
    ad_group_id: &str,
    seed: usize,
    created_at: chrono::DateTime<Utc>,
) -> Keyword {
    let stem = KEYWORD_STEMS[seed % KEYWORD_STEMS.len()];
    let modifier = MODIFIERS[(seed / KEYWORD_STEMS.len()) % MODIFIERS.len()];

    Keyword {
        id: Uuid::new_v4().to_string(),
        owner_id: owner_id.to_string(),
        ad_group_id: ad_group_id.to_string(),
        text: format!("{modifier}{stem}"),
        match_type: MATCH_TYPES[seed % MATCH_TYPES.len()],
        status: EntityStatus::Enabled,
        final_url: None,
        is_negative: false,
        created_at,
        sync: SyncState::draft(),
    }
}
