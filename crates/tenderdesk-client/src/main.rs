//! TenderDesk CLI
//!
//! Command-line front end for the tender-bidding dashboard: classify a bid
//! amount, search tenders, and run single or bulk win predictions against the
//! backend.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tenderdesk_classifiers::{format_grouped, format_large_unit, PriceClassifier};
use tenderdesk_client::{DashboardConfig, HttpTenderApi};
use tenderdesk_core::{parse_amount, BulkBid, Error, SessionContext, TenderApi};
use tenderdesk_results::{export_file_name, ExportFormat, PredictionBoard};
use tenderdesk_search::{FilterController, FilterField, FilterState, FilterValue, SearchPanel};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "tenderdesk")]
#[command(about = "Tender search and bid decision support", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "tenderdesk.yaml")]
    config: PathBuf,

    /// Backend API URL
    #[arg(long, env = "TENDERDESK_API_URL")]
    api_url: Option<String>,

    /// Login e-mail
    #[arg(long, env = "TENDERDESK_EMAIL")]
    email: Option<String>,

    /// Login password
    #[arg(long, env = "TENDERDESK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a bid amount against a tender's floor and ceiling
    Classify {
        /// Bid amount; separators and currency signs are ignored
        amount: String,

        /// Minimum acceptable price
        #[arg(long)]
        floor: Option<String>,

        /// Estimated (reference) price
        #[arg(long)]
        ceiling: Option<String>,
    },

    /// Search tender listings
    Search {
        #[command(flatten)]
        filters: FilterArgs,

        /// Bid method
        #[arg(long)]
        bid_method: Option<String>,

        /// Minimum estimated price
        #[arg(long)]
        min_price: Option<String>,

        /// Maximum estimated price
        #[arg(long)]
        max_price: Option<String>,

        /// Page to show (1-based)
        #[arg(long, default_value = "1")]
        page: usize,
    },

    /// Predict the outcome of one bid
    Predict {
        /// Tender identifier
        tender_id: String,

        /// Bid amount
        amount: String,
    },

    /// Predict every tender matching the filters
    Bulk {
        #[command(flatten)]
        filters: FilterArgs,

        /// Bid as a percentage of each tender's estimated price
        #[arg(long, conflicts_with = "amount")]
        ratio: Option<u32>,

        /// Same absolute bid for every tender
        #[arg(long)]
        amount: Option<String>,

        /// Write the results to a file
        #[arg(long)]
        export: bool,

        /// Export file path (defaults to bulk_prediction_<date>.<ext>)
        #[arg(short, long, requires = "export")]
        output: Option<PathBuf>,

        /// Export format: csv or json
        #[arg(long, default_value = "csv")]
        format: ExportFormat,
    },
}

#[derive(clap::Args, Debug)]
struct FilterArgs {
    /// Prefecture
    #[arg(long)]
    prefecture: Option<String>,

    /// Municipality
    #[arg(long)]
    municipality: Option<String>,

    /// Use type
    #[arg(long)]
    use_type: Option<String>,
}

impl FilterArgs {
    fn edits(&self) -> Vec<(FilterField, FilterValue)> {
        [
            (FilterField::Region, &self.prefecture),
            (FilterField::SubRegion, &self.municipality),
            (FilterField::UseType, &self.use_type),
        ]
        .into_iter()
        .filter_map(|(field, value)| {
            value
                .as_deref()
                .map(|value| (field, FilterValue::from_input(value)))
        })
        .collect()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);
    describe_metrics();

    // Load configuration
    let mut config = DashboardConfig::load(&cli.config)?;
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    config.validate()?;
    info!(backend = %config.api.base_url, "configuration loaded");

    match &cli.command {
        Command::Classify {
            amount,
            floor,
            ceiling,
        } => classify(&config, amount, floor.as_deref(), ceiling.as_deref()),
        Command::Search {
            filters,
            bid_method,
            min_price,
            max_price,
            page,
        } => {
            let api = connect(&cli, &config, false).await?;
            let mut edits = filters.edits();
            for (field, value) in [
                (FilterField::BidMethod, bid_method),
                (FilterField::MinPrice, min_price),
                (FilterField::MaxPrice, max_price),
            ] {
                if let Some(value) = value {
                    edits.push((field, FilterValue::from_input(value)));
                }
            }
            search(api, &config, edits, *page).await
        }
        Command::Predict { tender_id, amount } => {
            let api = connect(&cli, &config, true).await?;
            predict(api, &config, tender_id, amount).await
        }
        Command::Bulk {
            filters,
            ratio,
            amount,
            export,
            output,
            format,
        } => {
            let api = connect(&cli, &config, true).await?;
            let bid = match (ratio, amount) {
                (_, Some(amount)) => BulkBid::Amount(parse_amount(amount).unwrap_or(0)),
                (Some(ratio), None) => BulkBid::Ratio(*ratio),
                (None, None) => BulkBid::Ratio(config.bulk.default_ratio_percent),
            };
            let output = if *export {
                Some(output.clone().unwrap_or_else(|| {
                    PathBuf::from(export_file_name(chrono::Local::now().date_naive(), *format))
                }))
            } else {
                None
            };
            bulk(api, &config, filters, bid, output, *format).await
        }
    }
}

/// A connected backend and, when logged in, the session
struct Connection {
    api: Arc<dyn TenderApi>,
    session: Option<Arc<SessionContext>>,
}

impl Connection {
    fn company_name(&self) -> &str {
        self.session
            .as_ref()
            .map(|session| session.company_name())
            .unwrap_or_default()
    }
}

async fn connect(cli: &Cli, config: &DashboardConfig, require_login: bool) -> Result<Connection> {
    let api = HttpTenderApi::new(&config.api)?;

    match (&cli.email, &cli.password) {
        (Some(email), Some(password)) => {
            let session = api.login(email, password).await.map_err(user_facing)?;
            info!(company = %session.company_name(), "session established");
            Ok(Connection {
                api: Arc::new(api.with_session(Arc::clone(&session))),
                session: Some(session),
            })
        }
        _ if require_login => {
            bail!("this command requires --email and --password (or TENDERDESK_EMAIL / TENDERDESK_PASSWORD)")
        }
        _ => Ok(Connection {
            api: Arc::new(api),
            session: None,
        }),
    }
}

fn classify(
    config: &DashboardConfig,
    amount: &str,
    floor: Option<&str>,
    ceiling: Option<&str>,
) -> Result<()> {
    let classifier = PriceClassifier::new(config.pricing.clone());
    let floor = floor.and_then(parse_amount);
    let ceiling = ceiling.and_then(parse_amount);

    match classifier.classify(parse_amount(amount), floor, ceiling) {
        Some(assessment) => {
            println!("{}円 ({})", assessment.grouped, assessment.large_unit);
            println!("[{}] {}", assessment.category.label(), assessment.message());
        }
        None => println!("入札額を入力してください"),
    }
    Ok(())
}

async fn search(
    connection: Connection,
    config: &DashboardConfig,
    edits: Vec<(FilterField, FilterValue)>,
    page: usize,
) -> Result<()> {
    let mut panel = SearchPanel::new(connection.api, config.scheduler_config());
    if !panel.load_options().await {
        if let Some(message) = panel.options_error() {
            warn!("{}", message);
        }
    }

    for (field, value) in edits {
        panel.set_field(field, value);
    }
    print_filters(panel.filters().state());

    panel.search_now().await;
    panel.set_page(page.saturating_sub(1));

    let view = panel.view();
    if let Some(error) = &view.error {
        bail!("{}", error);
    }

    let classifier = PriceClassifier::new(config.pricing.clone());
    for tender in view.page_records() {
        let estimated = tender
            .estimated_price
            .map(format_large_unit)
            .unwrap_or_else(|| "―".to_string());
        let suggested = classifier
            .suggested_bid(tender)
            .map(format_grouped)
            .unwrap_or_else(|| "―".to_string());
        println!(
            "{}\t{}\t{} {}\t予定価格 {}\t推奨入札額 {}",
            tender.tender_id, tender.title, tender.prefecture, tender.municipality, estimated, suggested
        );
    }
    println!("{}", view.page.label(view.records.len()));
    Ok(())
}

async fn predict(
    connection: Connection,
    config: &DashboardConfig,
    tender_id: &str,
    amount: &str,
) -> Result<()> {
    let company = connection.company_name().to_string();
    let mut board = PredictionBoard::new(connection.api, config.bulk_settings());

    let record = board
        .predict_single(tender_id, parse_amount(amount), &company)
        .await
        .map_err(user_facing)?;

    println!(
        "{}: ランク {} ({}) 勝率 {}% 信頼度 {}",
        record.tender_id,
        record.rank,
        record.rank.description(),
        (record.win_probability * 100.0).round(),
        record.confidence.label()
    );
    if !record.recommendation.is_empty() {
        println!("{}", record.recommendation);
    }
    if let Some(reason) = &record.judgment_reason {
        println!("判断理由: {}", reason);
    }
    for note in &record.risk_notes {
        println!("- {}", note);
    }
    Ok(())
}

async fn bulk(
    connection: Connection,
    config: &DashboardConfig,
    filters: &FilterArgs,
    bid: BulkBid,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> Result<()> {
    let company = connection.company_name().to_string();
    let mut board = PredictionBoard::new(connection.api, config.bulk_settings());

    let mut controller = FilterController::new();
    for (field, value) in filters.edits() {
        controller.set_field(field, value);
    }

    board
        .run_bulk(&controller.state().to_request(), bid, &company)
        .await
        .map_err(user_facing)?;

    let summary = board.summary();
    println!(
        "対象 {} 件 / 推奨 {} 件 / 平均勝率 {}%",
        summary.total,
        summary.recommended,
        summary.mean_percent()
    );
    for (rank, count) in &summary.rank_counts {
        println!("  {}: {}", rank, count);
    }
    for record in board.page_records() {
        println!(
            "{}\t{}\t{}\t{}%",
            record.tender_id,
            record.display_name().unwrap_or_default(),
            record.rank,
            (record.win_probability * 100.0).round()
        );
    }

    if let Some(path) = output {
        let count = board.export(&path, format).map_err(user_facing)?;
        println!("{} 件を {} に出力しました", count, path.display());
    }
    Ok(())
}

fn print_filters(state: &FilterState) {
    let active: Vec<String> = state
        .iter()
        .filter(|(_, value)| !value.is_any())
        .map(|(field, value)| format!("{}={}", field, value))
        .collect();
    if !active.is_empty() {
        info!(filters = %active.join(" "), "searching");
    }
}

/// Log the technical detail, surface only the localized message
fn user_facing(err: Error) -> anyhow::Error {
    warn!(error = %err, "command failed");
    anyhow::anyhow!("{}", err.user_message())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("tenderdesk=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tenderdesk=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Register metric descriptions; a no-op until a recorder is installed
fn describe_metrics() {
    metrics::describe_counter!(
        "tenderdesk_search_dispatched_total",
        "Tender searches sent to the backend"
    );
    metrics::describe_counter!(
        "tenderdesk_search_discarded_total",
        "Search responses dropped because a newer change superseded them"
    );
    metrics::describe_counter!(
        "tenderdesk_search_failed_total",
        "Searches whose latest response was an error"
    );
    metrics::describe_counter!(
        "tenderdesk_bulk_predictions_total",
        "Completed bulk prediction runs"
    );
    metrics::describe_counter!(
        "tenderdesk_api_requests_total",
        "Backend API requests by endpoint"
    );
}
