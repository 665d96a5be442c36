//! Simple comet server example with a ticking producer channel
//!
//! Run with: cargo run --example comet_server [BIND_ADDR]
//!
//! BIND_ADDR is a socket address such as `0.0.0.0:8080`; without it the
//! server listens on 127.0.0.1:8080.
//!
//! ## Subscribing (long-poll)
//!
//! The server prints the clock channel's id at startup. Subscribe with:
//!
//!   curl -X POST http://localhost:8080/ \
//!        -H 'Content-Type: application/x-ocsigen-comet' \
//!        --data 'registration=<CHANNEL_ID>'
//!
//! The request blocks until the next tick (at most `timeout` seconds) and
//! answers with `<CHANNEL_ID>:tick%20N`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use comet_rs::{CometConfig, CometExtension, DeliveryResult};

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    arg.parse()
        .map_err(|_| format!("invalid bind address '{}', expected IP:PORT such as {}", arg, DEFAULT_BIND_ADDR))
}

fn print_usage() {
    eprintln!("Usage: comet_server [BIND_ADDR]");
    eprintln!("  BIND_ADDR    socket address to listen on (default: {})", DEFAULT_BIND_ADDR);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => DEFAULT_BIND_ADDR.parse().unwrap(),
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("comet_rs=debug".parse()?)
                .add_directive("comet_server=debug".parse()?),
        )
        .init();

    let config = CometConfig::from_attributes([("timeout", "20.0"), ("max_virtual_channels", "")])?;
    let extension = Arc::new(CometExtension::new(config));

    // Producer: one channel that ticks every two seconds while anyone waits.
    let clock = extension.registry().create()?;
    let mut outcomes = clock.take_outcomes().expect("fresh channel");

    println!("Starting comet server on {}", bind_addr);
    println!();
    println!("=== Subscribe to the clock channel ===");
    println!(
        "curl -X POST http://{}/ \\\n     -H 'Content-Type: application/x-ocsigen-comet' \\\n     --data 'registration={}'",
        bind_addr,
        clock.id()
    );
    println!();

    let ticker = clock.clone();
    tokio::spawn(async move {
        let mut tick: u64 = 0;
        loop {
            tokio::time::sleep(Duration::from_secs(2)).await;
            tick += 1;
            if ticker.listeners() == 0 {
                continue;
            }
            let waiters = ticker.send(format!("tick {}", tick), Some(tick as i64));
            tracing::debug!(tick = tick, waiters = waiters, "Published");
        }
    });

    tokio::spawn(async move {
        while let Some(outcome) = outcomes.recv().await {
            match outcome.result {
                DeliveryResult::Delivered => {
                    tracing::info!(tag = outcome.tag, "Tick delivered")
                }
                DeliveryResult::Failed => {
                    tracing::warn!(tag = outcome.tag, "Tick lost in transit")
                }
            }
        }
    });

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let stats = Arc::clone(extension.stats());

    tokio::select! {
        result = async { axum::serve(listener, extension.router()).await } => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            let snapshot = stats.snapshot();
            println!(
                "\nShutting down: {} requests, {} waits, {} events, {} timeouts",
                snapshot.requests, snapshot.waits, snapshot.events, snapshot.timeouts
            );
        }
    }

    Ok(())
}
