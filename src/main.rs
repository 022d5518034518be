use clap::Parser;
use tokio::net::TcpListener;

use crate::backend::{AvailabilityBackend, BookingBackend, Directory};
use crate::booking::BookingEngine;
use crate::configuration::Configuration;
use crate::configuration_handler::ConfigurationHandler;
use crate::database::DatabaseStore;
use crate::http::AppState;
use crate::ledger::AvailabilityLedger;
use crate::local_store::LocalStore;
use crate::notification::LogNotifier;

mod backend;
mod booking;
mod configuration;
mod configuration_handler;
mod context;
mod database;
mod error;
mod http;
mod ledger;
mod local_store;
mod notification;
mod schema;
#[cfg(test)]
mod testutils;
mod types;

#[derive(Parser)]
#[command(
    name = "restaurant_booking",
    about = "Booking-slot allocation and lifecycle service"
)]
struct Args {
    /// Address to bind, e.g. 127.0.0.1:3000
    #[arg(long)]
    bind_address: Option<String>,
    /// PostgreSQL connection URL; falls back to the in-memory store when absent
    #[arg(long)]
    database_url: Option<String>,
    /// Seed the in-memory store with demo availability
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("restaurant_booking=info")),
        )
        .init();

    let args = Args::parse();
    let config = ConfigurationHandler::from_env().apply_overrides(
        args.bind_address,
        args.database_url,
        args.demo,
    );

    let listener = TcpListener::bind(config.bind_address()).await.unwrap();
    tracing::info!(address = %config.bind_address(), "starting server");

    match config.database_url() {
        Some(url) => match DatabaseStore::new(&url) {
            Ok(store) => run(store, &config, listener).await,
            Err(err) => {
                tracing::error!(error = %err, "failed to connect to PostgreSQL");
                std::process::exit(1);
            }
        },
        None => {
            let store = LocalStore::default();
            if config.seed_demo_data() {
                match store.seed_demo_data() {
                    Ok((restaurant_id, user_id)) => {
                        tracing::info!(%restaurant_id, %user_id, "seeded demo availability")
                    }
                    Err(err) => tracing::error!(error = %err, "failed to seed demo availability"),
                }
            }
            run(store, &config, listener).await;
        }
    }
}

async fn run<S>(store: S, config: &impl Configuration, listener: TcpListener)
where
    S: AvailabilityBackend + BookingBackend + Directory,
{
    let state = AppState::new(
        AvailabilityLedger::new(store.clone()),
        BookingEngine::new(store, LogNotifier),
        config.operation_timeout(),
    );
    http::serve(state, listener).await;
}
