//! Seed script for development. Populates a fresh database with sample data.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires the `DATABASE_URL` environment variable (reads .env).

use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const ADMIN_PASSWORD: &str = "Test123!";
const SEED_WEEKS: i64 = 12;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let db_url = std::env::var("DATABASE_URL")?;
    let pool = reportdash::db::create_pool(&db_url, 5).await?;

    reportdash::db::run_migrations(&pool).await?;

    println!("=== reportdash Seed Script ===");

    seed_accounts(&pool).await?;
    seed_weekly_reports(&pool).await?;

    println!("\n=== Seed complete! ===");
    println!("Admin login: admin@reportdash.local / {ADMIN_PASSWORD}");
    println!("Non-admin login: viewer@reportdash.local / viewer123");

    Ok(())
}

async fn seed_accounts(pool: &PgPool) -> anyhow::Result<()> {
    let accounts = [
        ("admin@reportdash.local", ADMIN_PASSWORD, "Administrator", true),
        ("viewer@reportdash.local", "viewer123", "Viewer", false),
    ];

    for (email, password, display_name, is_admin) in accounts {
        let hash = reportdash::services::auth::hash_password(password)?;
        sqlx::query(
            "INSERT INTO admin_accounts (id, email, password_hash, display_name, is_admin)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (email) DO UPDATE
             SET password_hash = EXCLUDED.password_hash, is_admin = EXCLUDED.is_admin",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(&hash)
        .bind(display_name)
        .bind(is_admin)
        .execute(pool)
        .await?;
    }

    println!("[done] Upserted admin and viewer accounts");
    Ok(())
}

async fn seed_weekly_reports(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weekly_reports")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        println!("[skip] weekly_reports already has {count} rows");
        return Ok(());
    }

    let now = Utc::now();
    for weeks_ago in (0..SEED_WEEKS).rev() {
        let created_at = now - Duration::weeks(weeks_ago);
        let index = (SEED_WEEKS - weeks_ago) as f64;
        let label = created_at.format("%G-W%V").to_string();

        sqlx::query(
            "INSERT INTO weekly_reports (week_label, new_users, active_users, total_transactions, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(label)
        .bind(40.0 + index * 12.0)
        .bind(900.0 + index * 85.0)
        .bind(2_500.0 + index * 310.0)
        .bind(created_at)
        .execute(pool)
        .await?;
    }

    println!("[done] Inserted {SEED_WEEKS} weekly reports");
    Ok(())
}
