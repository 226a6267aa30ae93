//! The `collect` command: one browser session, one JSON file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use mapscrape_core::{report_filename, AppConfig, BusinessRecord, SelectorTable};
use mapscrape_scraper::{
    ChromeSurface, CollectionSession, LaunchOptions, ProgressSink, SessionEvent, SessionRequest,
    StopSignal,
};

#[derive(Debug, Args)]
pub(crate) struct CollectArgs {
    /// What to search for, e.g. "taksi" or "eczane"
    #[arg(long, short)]
    pub(crate) query: String,

    /// Where to search; appended to the query
    #[arg(long, short, default_value = "")]
    pub(crate) location: String,

    /// Number of records to collect (defaults to MAPSCRAPE_TARGET_COUNT)
    #[arg(long, short, value_parser = clap::value_parser!(u64).range(1..))]
    pub(crate) target: Option<u64>,

    /// Show the browser window
    #[arg(long)]
    pub(crate) headful: bool,

    /// Skip opening each listing's detail view
    #[arg(long)]
    pub(crate) no_enrich: bool,

    /// Output file; defaults to a dated name in MAPSCRAPE_OUTPUT_DIR
    #[arg(long, short)]
    pub(crate) output: Option<PathBuf>,

    /// Selector override file (defaults to MAPSCRAPE_SELECTORS_PATH)
    #[arg(long)]
    pub(crate) selectors: Option<PathBuf>,
}

impl CollectArgs {
    /// The configuration with this invocation's flags applied.
    pub(crate) fn apply(&self, config: &AppConfig) -> AppConfig {
        let mut config = config.clone();
        if let Some(target) = self.target {
            config.target_count = usize::try_from(target).unwrap_or(usize::MAX);
        }
        if self.headful {
            config.headless = false;
        }
        if self.no_enrich {
            config.enrich_details = false;
        }
        if let Some(path) = &self.selectors {
            config.selectors_path = Some(path.clone());
        }
        config
    }

    pub(crate) fn request(&self, config: &AppConfig) -> SessionRequest {
        SessionRequest {
            query: self.query.trim().to_owned(),
            location: self.location.trim().to_owned(),
            target_count: config.target_count,
            enrich_details: config.enrich_details,
        }
    }

    /// Where records are written for a run on `date`.
    pub(crate) fn output_path(&self, config: &AppConfig, date: chrono::NaiveDate) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            config.output_dir.join(report_filename(
                self.query.trim(),
                self.location.trim(),
                date,
                "json",
            ))
        })
    }
}

/// Prints one line per collected record.
struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn emit(&mut self, event: SessionEvent) {
        if let SessionEvent::Progress(progress) = event {
            println!(
                "[{:>5.1}%] {:>4}  {}",
                progress.percent, progress.collected, progress.name
            );
        }
    }
}

/// Runs a collection session and writes its records.
///
/// Records gathered before a fatal browser error are still written before
/// the error is returned.
///
/// # Errors
///
/// Returns an error if configuration or selectors are invalid, the browser
/// cannot be launched, the session fails, or the output cannot be written.
pub(crate) async fn run_collect(base: &AppConfig, args: &CollectArgs) -> anyhow::Result<()> {
    let config = args.apply(base);
    let table = mapscrape_core::load_selector_table(config.selectors_path.as_deref())?;
    let request = args.request(&config);
    let output = args.output_path(&config, chrono::Local::now().date_naive());

    let stop = StopSignal::new();
    let interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current batch");
            interrupt.stop();
        }
    });

    let surface = ChromeSurface::launch(&LaunchOptions {
        headless: config.headless,
        chrome_path: config.chrome_path.clone(),
        ..LaunchOptions::default()
    })
    .await
    .context("failed to start the browser")?;

    let outcome = collect_with(&surface, &table, &config, &request, &stop).await;
    if let Err(err) = surface.close().await {
        tracing::warn!(error = %err, "browser did not close cleanly");
    }

    match outcome {
        Ok(report) => {
            write_records(&output, &report.records)?;
            println!("{}", crate::report::format_scan_report(&report.summary, &report.records));
            println!("records written to {}", output.display());
            Ok(())
        }
        Err(failure) => {
            if !failure.records.is_empty() {
                write_records(&output, &failure.records)?;
                println!(
                    "{} partial records written to {}",
                    failure.records.len(),
                    output.display()
                );
            }
            Err(failure.into())
        }
    }
}

async fn collect_with(
    surface: &ChromeSurface,
    table: &SelectorTable,
    config: &AppConfig,
    request: &SessionRequest,
    stop: &StopSignal,
) -> Result<mapscrape_scraper::SessionReport, mapscrape_scraper::SessionFailure> {
    if let Err(error) = surface.open_search(&request.query, &request.location).await {
        return Err(mapscrape_scraper::SessionFailure {
            error,
            records: Vec::new(),
        });
    }
    CollectionSession::from_config(table, config)
        .run(surface, request, &mut ConsoleProgress, stop)
        .await
}

/// Writes `records` as pretty JSON, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub(crate) fn write_records(path: &Path, records: &[BusinessRecord]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), count = records.len(), "records written");
    Ok(())
}

#[cfg(test)]
#[path = "collect_test.rs"]
mod tests;
