use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use search_bulk::works_file::load_works;
use search_bulk::{BulkSettings, Dependencies, IndexingError};
use search_bulk_repository::{BulkRequestFailedError, BulkWork, SearchError};

#[derive(Parser)]
#[command(name = "search-bulk")]
#[command(about = "Submit a file of index mutations as a single bulk request", long_about = None)]
struct Cli {
    /// JSON file containing the works, in submission order
    works_file: PathBuf,

    /// Refresh the touched indexes as part of the bulk request
    #[arg(long)]
    refresh: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn report_failures(report: &BulkRequestFailedError) {
    warn!(
        succeeded = report.successful().len(),
        failed = report.failed().len(),
        "Bulk request completed with failures"
    );
    for work in report.failed() {
        for mutation in work.mutations() {
            warn!(
                kind = ?mutation.kind,
                index = %mutation.index,
                document_id = %mutation.document_id,
                "Mutation not applied"
            );
        }
    }
    for handler_error in report.suppressed() {
        warn!(error = %handler_error, "Result handler error");
    }
}

async fn run(cli: Cli) -> Result<(), IndexingError> {
    let mut settings = BulkSettings::from_env()?;
    settings.refresh |= cli.refresh;

    let dependencies = Dependencies::new(settings)?;
    let works = load_works(&cli.works_file).await?;

    let bulk = BulkWork::builder(works)
        .refresh(dependencies.refresh)
        .build()?;

    info!(
        bulk_id = %bulk.id(),
        works = bulk.len(),
        mutations = bulk.mutations().len(),
        "Submitting bulk request"
    );

    match bulk.execute(&dependencies.context).await {
        Ok(()) => {
            let dirty = dependencies.context.take_dirty_indexes();
            if !dirty.is_empty() {
                info!(indexes = ?dirty, "Indexes awaiting refresh");
            }
            Ok(())
        }
        Err(SearchError::BulkRequestFailed(report)) => {
            report_failures(&report);
            Err(SearchError::BulkRequestFailed(report).into())
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => {
            info!("Bulk submission finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Bulk submission failed");
            ExitCode::FAILURE
        }
    }
}
