//! Shoplens — batch analytics over an e-commerce warehouse snapshot.
//!
//! Loads the CSV extracts, builds the immutable snapshot, and runs the
//! selected report (or the whole suite), rendering tables to stdout and
//! optionally exporting them as CSV.

mod tables;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use shoplens_core::config::AppConfig;
use shoplens_core::snapshot::WarehouseSnapshot;
use shoplens_ingest::load_warehouse;
use shoplens_reporting::{Dimension, ReportCatalog};

#[derive(Parser, Debug)]
#[command(name = "shoplens")]
#[command(about = "Batch analytics over an e-commerce warehouse snapshot")]
#[command(version)]
struct Cli {
    /// Orders CSV (overrides config)
    #[arg(long, env = "SHOPLENS__DATA__ORDERS_PATH")]
    orders: Option<String>,

    /// Order items CSV (overrides config)
    #[arg(long, env = "SHOPLENS__DATA__ORDER_ITEMS_PATH")]
    order_items: Option<String>,

    /// Users CSV (overrides config)
    #[arg(long, env = "SHOPLENS__DATA__USERS_PATH")]
    users: Option<String>,

    /// Products CSV (overrides config)
    #[arg(long, env = "SHOPLENS__DATA__PRODUCTS_PATH")]
    products: Option<String>,

    /// Distribution centers CSV (overrides config)
    #[arg(long, env = "SHOPLENS__DATA__DISTRIBUTION_CENTERS_PATH")]
    distribution_centers: Option<String>,

    /// Directory to write CSV exports of the generated reports
    #[arg(long)]
    export_dir: Option<PathBuf>,

    #[command(subcommand)]
    report: Report,
}

#[derive(Subcommand, Debug)]
enum Report {
    /// Run the full report suite
    All,
    /// Revenue/profit rollup by one grouping dimension
    Revenue {
        #[arg(long, value_enum, default_value_t = DimensionArg::Month)]
        by: DimensionArg,
    },
    /// Monthly revenue with cumulative running total
    RunningTotal,
    /// Return rate per product category
    Returns,
    /// Low/Mid/High order-value segmentation
    OrderValue,
    /// RFM quartile scoring and customer segments
    Rfm,
    /// Customers inactive beyond the churn threshold
    Churn {
        /// Inactivity threshold in days (overrides config)
        #[arg(long)]
        threshold_days: Option<i64>,
    },
    /// Signup-to-first-order conversion windows
    Conversion,
    /// Most frequently co-purchased product pairs
    Basket {
        /// Number of top pairs to show (overrides config)
        #[arg(long)]
        top: Option<usize>,
    },
    /// Shipping/delivery latency per distribution center
    Logistics,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DimensionArg {
    Year,
    Month,
    DayOfWeek,
    User,
    Product,
    Category,
    Brand,
    DistributionCenter,
    Country,
}

impl From<DimensionArg> for Dimension {
    fn from(arg: DimensionArg) -> Self {
        match arg {
            DimensionArg::Year => Dimension::Year,
            DimensionArg::Month => Dimension::Month,
            DimensionArg::DayOfWeek => Dimension::DayOfWeek,
            DimensionArg::User => Dimension::User,
            DimensionArg::Product => Dimension::Product,
            DimensionArg::Category => Dimension::Category,
            DimensionArg::Brand => Dimension::Brand,
            DimensionArg::DistributionCenter => Dimension::DistributionCenter,
            DimensionArg::Country => Dimension::Country,
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shoplens=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(path) = cli.orders {
        config.data.orders_path = path;
    }
    if let Some(path) = cli.order_items {
        config.data.order_items_path = path;
    }
    if let Some(path) = cli.users {
        config.data.users_path = path;
    }
    if let Some(path) = cli.products {
        config.data.products_path = path;
    }
    if let Some(path) = cli.distribution_centers {
        config.data.distribution_centers_path = path;
    }
    if let Report::Churn {
        threshold_days: Some(days),
    } = cli.report
    {
        config.churn.inactivity_days = days;
    }
    if let Report::Basket { top: Some(n) } = cli.report {
        config.basket.top_pairs = n;
    }

    let (snapshot, ingest) = load_warehouse(&config.data)?;
    if ingest.rejected_count() > 0 {
        info!(
            rejected = ingest.rejected_count(),
            "Some rows were excluded during ingest; reports cover the rest"
        );
    }

    let catalog = ReportCatalog::new();
    run_report(&cli.report, &snapshot, &config, &catalog);

    for name in catalog.names() {
        if let Some(table) = catalog.get(&name) {
            println!("{}", table.to_text());
        }
    }

    if let Some(dir) = cli.export_dir {
        std::fs::create_dir_all(&dir)?;
        for name in catalog.names() {
            if let Some(csv) = catalog.export_csv(&name) {
                let path = dir.join(format!("{name}.csv"));
                std::fs::write(&path, csv)?;
                info!(path = %path.display(), "Report exported");
            }
        }
    }

    Ok(())
}

fn run_report(
    report: &Report,
    snapshot: &WarehouseSnapshot,
    config: &AppConfig,
    catalog: &ReportCatalog,
) {
    match report {
        Report::All => {
            for dim in [Dimension::Year, Dimension::Month, Dimension::Category, Dimension::Country]
            {
                tables::revenue_table(snapshot, dim, catalog);
            }
            tables::running_total_table(snapshot, catalog);
            tables::return_rate_table(snapshot, catalog);
            tables::order_value_table(snapshot, &config.order_value, catalog);
            tables::rfm_tables(snapshot, catalog);
            tables::churn_table(snapshot, config.churn.inactivity_days, catalog);
            tables::conversion_table(snapshot, catalog);
            tables::basket_table(snapshot, config.basket.top_pairs, catalog);
            tables::logistics_table(snapshot, catalog);
        }
        Report::Revenue { by } => tables::revenue_table(snapshot, (*by).into(), catalog),
        Report::RunningTotal => tables::running_total_table(snapshot, catalog),
        Report::Returns => tables::return_rate_table(snapshot, catalog),
        Report::OrderValue => tables::order_value_table(snapshot, &config.order_value, catalog),
        Report::Rfm => tables::rfm_tables(snapshot, catalog),
        Report::Churn { .. } => {
            tables::churn_table(snapshot, config.churn.inactivity_days, catalog)
        }
        Report::Conversion => tables::conversion_table(snapshot, catalog),
        Report::Basket { .. } => tables::basket_table(snapshot, config.basket.top_pairs, catalog),
        Report::Logistics => tables::logistics_table(snapshot, catalog),
    }
}
