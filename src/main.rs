//! roadtrip-planner CLI entry point
//!
//! Road trip itinerary planner - CLI + web app

use roadtrip_planner::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
