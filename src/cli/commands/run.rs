//! Run command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Run the pipeline for `max_cycles` cycles, or forever.
pub async fn run_pipeline(once: bool, max_cycles: Option<u64>, settings: Settings) -> Result<()> {
    preflight::check(Operation::Run, &settings)?;

    let max_cycles = if once { Some(1) } else { max_cycles };
    match max_cycles {
        Some(1) => Output::info("Running a single cycle"),
        Some(n) => Output::info(&format!("Running {} cycles", n)),
        None => Output::info("Running until interrupted (Ctrl+C to stop)"),
    }

    let pipeline = Pipeline::new(settings)?;
    let summary = pipeline.run(max_cycles).await;

    println!();
    Output::info(&format!(
        "Cycles complete: {} succeeded, {} failed",
        summary.succeeded, summary.failed
    ));

    if summary.failed > 0 {
        anyhow::bail!("{} cycle(s) failed", summary.failed);
    }

    Output::success("All cycles completed.");
    Ok(())
}
