//! Example: Print today's FLO chart
//!
//! Run with: cargo run -p pmoflo --features logging --example daily_chart
//! Or with a config file: cargo run -p pmoflo --example daily_chart -- flo.yaml
//! Add `--json` to dump the whole chart as JSON.

use pmoflo::{FloChart, FloConfig};
use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let as_json = args.iter().any(|a| a == "--json");

    let config = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => FloConfig::load(path)?,
        None => FloConfig::default(),
    };

    println!("Fetching {}...\n", config.chart_url);

    let mut chart = FloChart::from_config(&config);
    chart.fetch_entries()?;

    if as_json {
        println!("{}", chart.to_json()?);
        return Ok(());
    }

    if let (Some(name), Some(date)) = (chart.name(), chart.date()) {
        println!("{} - {}", name, date.format("%Y-%m-%d %H:%M"));
        println!("---");
    }

    for entry in &chart {
        let movement = match entry.movement() {
            _ if entry.is_new => "NEW".to_string(),
            0 => "-".to_string(),
            m if m > 0 => format!("+{}", m),
            m => m.to_string(),
        };
        println!(
            "{:>3}. [{:>4}] {} - {}",
            entry.rank, movement, entry.artist, entry.title
        );
    }

    Ok(())
}
