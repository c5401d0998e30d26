use std::{net::SocketAddr, sync::Arc};

use dotenvy::dotenv;
use mockall_double::double;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[double]
use database::AppDatabase;
use jobs::spawn_all_jobs;
use mailer::{LogMailer, Mailer, SmtpMailer};
use models::{Role, User};
use state::AppState;
use store::{memory::MemoryStore, Store, UserStore};
use utils::{get_epoch_ts, normalize_email};

pub mod app;
pub mod constants;
pub mod database;
pub mod handlers;
pub mod jobs;
pub mod jwt;
pub mod mailer;
pub mod models;
pub mod services;
pub mod state;
pub mod store;
pub mod swagger;
pub mod utils;

pub async fn start_web_server() -> anyhow::Result<()> {
    // import .env file
    dotenv().ok();
    initialize_logging();
    let store = build_store().await?;
    let mailer = build_mailer()?;
    seed_admin(store.as_ref()).await?;
    spawn_all_jobs(store.clone());
    start_server(AppState::new(store, mailer)).await
}

fn initialize_logging() {
    // create default env filter
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or("purok_incident_backend=debug,tower_http=debug".into());

    // initialize tracing subscriber for logging
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();
}

async fn build_store() -> anyhow::Result<Arc<dyn Store>> {
    let backend = std::env::var("STORE_BACKEND").unwrap_or("mongo".to_owned());
    match backend.as_str() {
        "memory" => {
            tracing::warn!("Using the in-memory store, data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        "mongo" => {
            // create database client
            let db_client = AppDatabase::new().await?;
            db_client.ensure_indexes().await?;
            Ok(Arc::new(db_client))
        }
        other => Err(anyhow::anyhow!("Unknown STORE_BACKEND: {other}")),
    }
}

fn build_mailer() -> anyhow::Result<Arc<dyn Mailer>> {
    let transport = std::env::var("MAIL_TRANSPORT").unwrap_or("log".to_owned());
    match transport.as_str() {
        "log" => Ok(Arc::new(LogMailer)),
        "smtp" => Ok(Arc::new(SmtpMailer::from_env()?)),
        other => Err(anyhow::anyhow!("Unknown MAIL_TRANSPORT: {other}")),
    }
}

/// Create the admin account named by `ADMIN_EMAIL` & `ADMIN_PASSWORD` unless it exists already
async fn seed_admin(store: &dyn Store) -> anyhow::Result<()> {
    let (Ok(email), Ok(password)) = (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD"))
    else {
        return Ok(());
    };
    let email = normalize_email(&email);
    if store.find_user_by_email(&email).await?.is_some() {
        return Ok(());
    }
    let now = get_epoch_ts();
    let admin = User {
        id: store.next_user_id().await?,
        name: std::env::var("ADMIN_NAME").unwrap_or("Administrator".to_owned()),
        email,
        password_hash: services::password::hash_password(&password).await?,
        role: Role::Admin,
        is_active: true,
        email_verified: true,
        created_ts: Some(now),
        ..Default::default()
    };
    if store.insert_user(&admin).await? {
        tracing::info!("Seeded admin user {} with id {}", admin.email, admin.id);
    }
    Ok(())
}

async fn start_server(state: AppState) -> anyhow::Result<()> {
    // read the port number from env variable
    let port = utils::env_or("PORT", 3000u16);
    // build the socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    // create the app instance
    let app = app::build_app(state);
    tracing::debug!("Starting the app in: {addr}");
    // start serving the app in the socket address
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
