//! Import command implementation.

use super::{Destination, Source};
use pressmigrate_engine::{RunOptions, RunReport};
use serde::Serialize;
use std::error::Error;

/// Import run summary.
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    /// Run identifier.
    pub run_id: String,
    /// Content type imported.
    pub post_type: String,
    /// Records reconciled.
    pub imported: u64,
    /// Records that failed.
    pub failed: u64,
    /// Pages fetched.
    pub pages: u64,
    /// Watermark after the run.
    pub last_id: u64,
    /// True when the source is exhausted.
    pub done: bool,
    /// Wall time in milliseconds.
    pub duration_ms: u128,
}

impl ImportSummary {
    fn new(post_type: &str, report: &RunReport) -> Self {
        Self {
            run_id: report.run_id.to_string(),
            post_type: post_type.to_string(),
            imported: report.records_imported,
            failed: report.records_failed,
            pages: report.pages,
            last_id: report.final_cursor,
            done: report.done,
            duration_ms: report.duration.as_millis(),
        }
    }
}

/// Builds run options from command-line flags.
pub fn options(
    post_type: &str,
    status: &str,
    total: Option<u64>,
    batch_size: u32,
    start_id: Option<u64>,
) -> RunOptions {
    let mut options = RunOptions::new(post_type, status).with_page_size(batch_size);
    if let Some(total) = total {
        options = options.with_target_total(total);
    }
    if let Some(start_id) = start_id {
        options = options.with_start_cursor(start_id);
    }
    options
}

/// Runs the import command.
pub fn run(
    source: &Source,
    dest: &Destination,
    options: &RunOptions,
    format: &str,
) -> Result<(), Box<dyn Error>> {
    let session = dest.session(source, options.page_size)?;

    // Completed pages are committed as they finish; this also keeps what a
    // failed page applied before the failure.
    let result = session.driver.run(options);
    session.save()?;
    let report = result?;
    let summary = ImportSummary::new(&options.post_type, &report);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => {
            println!("Run:       {}", summary.run_id);
            println!("Type:      {}", summary.post_type);
            println!("Imported:  {}", summary.imported);
            println!("Failed:    {}", summary.failed);
            println!("Pages:     {}", summary.pages);
            println!("Last ID:   {}", summary.last_id);
            println!("Done:      {}", if summary.done { "yes" } else { "no" });
            println!("Duration:  {} ms", summary.duration_ms);
            if let Some(path) = session.store_path() {
                println!("Snapshot:  {}", path.display());
            }
        }
    }
    Ok(())
}
