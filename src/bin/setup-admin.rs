//! Creates the admin account from `ADMIN_USERNAME` / `ADMIN_PASSWORD`.
//! Safe to run repeatedly: an existing account is left untouched.

use ncc_backend::{auth, db};
use std::process::exit;

fn required_env(key: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => {
            eprintln!("{} must be set", key);
            eprintln!("Usage: DATABASE_URL=... ADMIN_USERNAME=... ADMIN_PASSWORD=... setup-admin");
            exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let url = required_env("DATABASE_URL");
    let url = url.trim_matches(|c| c == '"' || c == '\'').to_string();
    let username = required_env("ADMIN_USERNAME");
    let password = required_env("ADMIN_PASSWORD");

    let pool = match db::init_pool(&db::DbConfig::new(url)).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Could not connect to the database: {}", e);
            exit(1);
        }
    };
    if let Err(e) = db::run_migrations(&pool).await {
        eprintln!("Migrations failed: {}", e);
        exit(1);
    }

    let store = db::PgStore::new(pool);
    match auth::ensure_admin(&store, &username, &password).await {
        Ok(true) => println!("Admin user '{}' created.", username),
        Ok(false) => println!("Admin user '{}' already exists; nothing to do.", username),
        Err(e) => {
            eprintln!("Error creating admin user: {}", e);
            exit(1);
        }
    }
}
