//! Seed the initial administrator account. Idempotent: an existing user with
//! the target email short-circuits.

use anyhow::{Context, Result};
use clap::Parser;
use uuid::Uuid;

use navhub::auth::password::hash_password;
use navhub::db;
use navhub::models::user::Role;

#[derive(Debug, Parser)]
#[command(name = "navhub-seed", about = "Create the initial navhub administrator")]
struct Args {
    #[arg(long, default_value = "admin")]
    username: String,

    #[arg(long, default_value = "admin@example.com")]
    email: String,

    #[arg(long, env = "NAVHUB_ADMIN_PASSWORD", default_value = "admin123")]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let pool = db::connect_lazy().context("database setup failed")?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&args.email)
        .fetch_one(&pool)
        .await
        .context("failed to query users")?;

    if existing > 0 {
        println!("admin user already exists, skipping ({})", args.email);
        return Ok(());
    }

    let password_hash = hash_password(&args.password).context("failed to hash password")?;

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (id, username, email, password_hash, role, bio) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(&args.username)
    .bind(&args.email)
    .bind(&password_hash)
    .bind(Role::Admin.as_str())
    .bind("System administrator")
    .fetch_one(&pool)
    .await
    .context("failed to insert admin user")?;

    println!(
        "created admin user {} <{}> ({})",
        args.username, args.email, id
    );
    Ok(())
}
