//! Database seeder for Hearth development and testing.
//!
//! Seeds a test host, guest, and a couple of listings with different
//! cancellation policies for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use hearth_db::entities::{listings, sea_orm_active_enums::CancellationPolicy, users};

/// Test host ID (consistent for all seeds)
const TEST_HOST_ID: &str = "00000000-0000-0000-0000-000000000001";
/// Test guest ID (consistent for all seeds)
const TEST_GUEST_ID: &str = "00000000-0000-0000-0000-000000000002";
/// Flexible-policy listing ID
const TEST_LISTING_FLEXIBLE_ID: &str = "00000000-0000-0000-0000-000000000011";
/// Strict-policy listing ID
const TEST_LISTING_STRICT_ID: &str = "00000000-0000-0000-0000-000000000012";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = hearth_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    println!("Seeding test users...");
    seed_user(&db, TEST_HOST_ID, "host@hearth.dev", "Test Host").await;
    seed_user(&db, TEST_GUEST_ID, "guest@hearth.dev", "Test Guest").await;

    println!("Seeding test listings...");
    seed_listing(
        &db,
        TEST_LISTING_FLEXIBLE_ID,
        "Lakeside cabin",
        Decimal::new(100, 0),
        Decimal::new(20, 0),
        CancellationPolicy::Flexible,
    )
    .await;
    seed_listing(
        &db,
        TEST_LISTING_STRICT_ID,
        "Downtown loft",
        Decimal::new(185, 0),
        Decimal::new(45, 0),
        CancellationPolicy::Strict,
    )
    .await;

    println!("Seeding complete!");
}

fn parse_id(id: &str) -> Uuid {
    Uuid::parse_str(id).expect("seed ids are valid uuids")
}

/// Seeds a user if it does not exist yet.
async fn seed_user(db: &DatabaseConnection, id: &str, email: &str, full_name: &str) {
    if users::Entity::find_by_id(parse_id(id))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  User {email} already exists, skipping...");
        return;
    }

    let user = users::ActiveModel {
        id: Set(parse_id(id)),
        email: Set(email.to_string()),
        full_name: Set(full_name.to_string()),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = user.insert(db).await {
        eprintln!("Failed to insert user {email}: {e}");
    } else {
        println!("  Created user: {email}");
    }
}

/// Seeds a listing owned by the test host if it does not exist yet.
async fn seed_listing(
    db: &DatabaseConnection,
    id: &str,
    title: &str,
    nightly_rate: Decimal,
    cleaning_fee: Decimal,
    policy: CancellationPolicy,
) {
    if listings::Entity::find_by_id(parse_id(id))
        .one(db)
        .await
        .ok()
        .flatten()
        .is_some()
    {
        println!("  Listing {title} already exists, skipping...");
        return;
    }

    let listing = listings::ActiveModel {
        id: Set(parse_id(id)),
        host_id: Set(parse_id(TEST_HOST_ID)),
        title: Set(title.to_string()),
        nightly_rate: Set(nightly_rate),
        cleaning_fee: Set(cleaning_fee),
        cancellation_policy: Set(policy),
        created_at: Set(Utc::now().into()),
        updated_at: Set(Utc::now().into()),
    };

    if let Err(e) = listing.insert(db).await {
        eprintln!("Failed to insert listing {title}: {e}");
    } else {
        println!("  Created listing: {title}");
    }
}
