//! Folio CLI - Command line interface over the analytics engine.
//!
//! Reads portfolio snapshots as JSON and prints JSON responses, so dashboards
//! and scripts can consume the metrics without linking the library.

use clap::{Parser, Subcommand};
use folio_analytics::{
    portfolio::try_position_size, AnalyticsConfig, ApiResponse, Metrics, PortfolioSnapshot,
    RiskAssessment,
};
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio analytics CLI - portfolio performance and risk metrics")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.folio/analytics.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate performance metrics for a snapshot
    Metrics {
        /// Snapshot JSON file with positions, values and returns
        #[arg(short, long)]
        input: PathBuf,
        /// Per-period risk-free rate (overrides config)
        #[arg(long)]
        risk_free_rate: Option<f64>,
    },
    /// Calculate portfolio heat and risk level for a snapshot
    Risk {
        /// Snapshot JSON file with positions
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Calculate a stop-loss based position size
    Size {
        /// Total portfolio value
        #[arg(short = 'v', long)]
        portfolio_value: f64,
        /// Percent of the portfolio to risk (defaults to config)
        #[arg(short, long)]
        risk_percent: Option<f64>,
        /// Stop-loss distance in percent (defaults to config)
        #[arg(short, long)]
        stop_loss_percent: Option<f64>,
    },
    /// Classify a heat value into a risk level
    Classify {
        /// Portfolio heat
        #[arg(long)]
        heat: f64,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match AnalyticsConfig::load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                println!("{}", render(ApiResponse::<()>::err(e.to_string())));
                std::process::exit(1);
            }
        },
        None => AnalyticsConfig::load(),
    };

    let output = match cli.command {
        Commands::Metrics {
            input,
            risk_free_rate,
        } => handle_metrics(&config, input, risk_free_rate),
        Commands::Risk { input } => handle_risk(&config, input),
        Commands::Size {
            portfolio_value,
            risk_percent,
            stop_loss_percent,
        } => handle_size(&config, portfolio_value, risk_percent, stop_loss_percent),
        Commands::Classify { heat } => handle_classify(&config, heat),
    };

    println!("{}", output);
}

fn render<T: Serialize>(response: ApiResponse<T>) -> String {
    serde_json::to_string_pretty(&response).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize response: {}", e);
        r#"{"ok": false, "error": "serialization failed"}"#.to_string()
    })
}

fn handle_metrics(config: &AnalyticsConfig, input: PathBuf, risk_free_rate: Option<f64>) -> String {
    let snapshot = match PortfolioSnapshot::load_from_path(&input) {
        Ok(snapshot) => snapshot,
        Err(e) => return render(ApiResponse::<()>::err(e.to_string())),
    };
    let risk_free_rate = risk_free_rate.unwrap_or(config.risk_free_rate);

    tracing::debug!(
        "Calculating metrics for {} positions, {} values, {} returns",
        snapshot.positions.len(),
        snapshot.values.len(),
        snapshot.returns.len()
    );

    render(ApiResponse::ok(json!({
        "metrics": Metrics::calculate(&snapshot, risk_free_rate),
        "risk_free_rate": risk_free_rate,
    })))
}

fn handle_risk(config: &AnalyticsConfig, input: PathBuf) -> String {
    let snapshot = match PortfolioSnapshot::load_from_path(&input) {
        Ok(snapshot) => snapshot,
        Err(e) => return render(ApiResponse::<()>::err(e.to_string())),
    };

    let assessment = RiskAssessment::assess(&snapshot.positions, &config.risk_limits);
    render(ApiResponse::ok(json!({
        "heat": assessment.heat,
        "level": assessment.level.label(),
        "color": assessment.level.color(),
        "open_positions": snapshot.positions.iter().filter(|p| p.is_open()).count(),
    })))
}

fn handle_size(
    config: &AnalyticsConfig,
    portfolio_value: f64,
    risk_percent: Option<f64>,
    stop_loss_percent: Option<f64>,
) -> String {
    let risk_percent = risk_percent.unwrap_or(config.default_risk_percent);
    let stop_loss_percent = stop_loss_percent.unwrap_or(config.default_stop_loss_percent);

    match try_position_size(portfolio_value, risk_percent, stop_loss_percent) {
        Ok(size) => render(ApiResponse::ok(json!({
            "position_size": size,
            "risk_amount": portfolio_value * risk_percent / 100.0,
            "risk_percent": risk_percent,
            "stop_loss_percent": stop_loss_percent,
        }))),
        Err(e) => render(ApiResponse::<()>::err(e.to_string())),
    }
}

fn handle_classify(config: &AnalyticsConfig, heat: f64) -> String {
    let level = config.risk_limits.classify(heat);
    render(ApiResponse::ok(json!({
        "heat": heat,
        "level": level.label(),
        "color": level.color(),
    })))
}
