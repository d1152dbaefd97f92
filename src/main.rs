use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use cma_dashboard::{
    calculate_mortgage, config::Config, export::write_comparables_csv, logging, Dashboard,
    MlsClient, MortgageParameters,
};

#[derive(Parser)]
#[command(name = "cma-dashboard", version, about = "Comparative market analysis dashboard")]
struct Cli {
    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the data directory holding the local store and exports
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal dashboard (default)
    Tui,
    /// Run the recommendation engine and print the executive summary
    Summary,
    /// Print valuation metrics for the subject property
    Metrics,
    /// Monthly payment for a loan
    Mortgage {
        #[arg(long)]
        loan: f64,
        /// Annual rate in percent
        #[arg(long)]
        rate: f64,
        /// Term in years
        #[arg(long, default_value_t = 30)]
        term: u32,
    },
    /// Write the comparables table as CSV
    ExportCsv { path: PathBuf },
    /// Write the JSON report bundle and the text report into a directory
    ExportReport { path: PathBuf },
    /// Fetch comparables from the simulated MLS feed
    FetchMls { address: String },
    /// Sign in with a demo account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session
    Logout,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let command = cli.command.unwrap_or(Command::Tui);
    if !matches!(command, Command::Tui) {
        logging::init_stderr();
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    match command {
        Command::Tui => run_ui_mode(&config, &runtime),
        Command::Summary => run_summary(&config),
        Command::Metrics => run_metrics(&config),
        Command::Mortgage { loan, rate, term } => run_mortgage(loan, rate, term),
        Command::ExportCsv { path } => {
            let dashboard = Dashboard::open(&config)?;
            write_comparables_csv(&path, dashboard.comparables())?;
            println!("✓ Exported {} comparables to {}", dashboard.comparables().len(), path.display());
            Ok(())
        }
        Command::ExportReport { path } => {
            let dashboard = Dashboard::open(&config)?;
            let (json, text) = dashboard.report_bundle(Utc::now()).write_to_dir(&path)?;
            println!("✓ Report bundle: {}", json.display());
            println!("✓ Text report:   {}", text.display());
            Ok(())
        }
        Command::FetchMls { address } => runtime.block_on(run_fetch_mls(&config, &address)),
        Command::Login { email, password } => {
            let mut dashboard = Dashboard::open(&config)?;
            dashboard.login(&email, &password)?;
            println!("✅ Signed in as {}", email);
            Ok(())
        }
        Command::Logout => {
            let mut dashboard = Dashboard::open(&config)?;
            dashboard.logout();
            println!("✓ Signed out");
            Ok(())
        }
    }
}

fn run_summary(config: &Config) -> Result<()> {
    let mut dashboard = Dashboard::open(config)?;
    let recommendation = dashboard.run_recommendations(Utc::now());
    println!("{}", recommendation.summary);
    Ok(())
}

fn run_metrics(config: &Config) -> Result<()> {
    let dashboard = Dashboard::open(config)?;
    let metrics = dashboard.metrics();
    let property = dashboard.property();

    println!("📊 {}", property.address);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Avg $/sq ft:      ${:.0}", metrics.avg_price_per_sqft);
    println!("Estimated value:  ${:.0}", metrics.estimated_value);
    println!("Equity:           ${:.0}", metrics.equity);
    println!("Appreciation:     {:.1}%", metrics.appreciation_percent);
    println!("Comparables used: {}", metrics.comparables_used);
    if let Some(err) = metrics.error {
        println!("⚠️  {}", err);
    }
    Ok(())
}

fn run_mortgage(loan: f64, rate: f64, term: u32) -> Result<()> {
    let params = MortgageParameters {
        loan_amount: loan,
        interest_rate: rate,
        loan_term: term,
        ..MortgageParameters::default()
    };
    let breakdown = calculate_mortgage(&params);
    if let Some(err) = breakdown.error {
        anyhow::bail!("Mortgage calculation failed: {}", err);
    }

    println!("💰 ${:.0} at {}% for {} years", loan, rate, term);
    println!("Principal & interest: ${:.2}", breakdown.monthly_principal_and_interest);
    println!("Total monthly:        ${:.2}", breakdown.total_monthly_payment);
    println!("Total interest:       ${:.2}", breakdown.total_interest_over_life);
    Ok(())
}

async fn run_fetch_mls(config: &Config, address: &str) -> Result<()> {
    println!("🛰️  Fetching MLS comparables for {}...", address);
    let listings = MlsClient::from_config(&config.mls)
        .fetch_comparables(address)
        .await?;

    for listing in &listings {
        println!(
            "  {} | {} | ${:.0} | {} sq ft | ${:.0}/sq ft",
            listing.address,
            listing.status.as_str(),
            listing.list_price,
            listing.sqft,
            listing.price_per_sqft
        );
    }
    println!("✓ {} comparables", listings.len());
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config, runtime: &tokio::runtime::Runtime) -> Result<()> {
    use cma_dashboard::{ui, ComparableRefresher};

    println!("🖥️  Loading CMA Dashboard...\n");
    logging::init_file(&config.log_path())?;

    let dashboard = Dashboard::open(config)?;
    // Refresher tasks are spawned onto this runtime from the UI thread.
    let _guard = runtime.enter();
    let (refresher, updates) = ComparableRefresher::from_config(&config.mls);

    let mut app = ui::App::new(dashboard, refresher, updates, config.data_dir.clone());
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config, _runtime: &tokio::runtime::Runtime) -> Result<()> {
    eprintln!("❌ TUI not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    std::process::exit(1);
}
