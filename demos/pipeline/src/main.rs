use std::io::Write;

use anyhow::Context;
use tracing::info;

use taskflow_core::{Pipeline, PipelineConfig, PipelineOutcome};
use taskflow_model::TaskReport;
use taskflow_observe::{LoggerConfig, logger_init};

/// `text` (default) or `json`.
const ENV_OUTPUT: &str = "TASKFLOW_OUTPUT";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1) Logger
    let log_cfg = LoggerConfig::from_env()?;
    logger_init(&log_cfg)?;

    // 2) Config
    let cfg = PipelineConfig::from_env().context("loading pipeline configuration")?;
    let json = std::env::var(ENV_OUTPUT).is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    // 3) Pipeline, stopped early on Ctrl+C
    let pipeline = Pipeline::new(cfg);
    let cancel = pipeline.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received; stopping pipeline");
            cancel.cancel();
        }
    });

    let outcome = pipeline.run().await?;

    // 4) Presentation
    let mut out = std::io::stdout().lock();
    if json {
        print_json(&mut out, &outcome)?;
    } else {
        print_text(&mut out, &outcome)?;
    }
    Ok(())
}

fn print_text(out: &mut impl Write, outcome: &PipelineOutcome) -> std::io::Result<()> {
    writeln!(out, "Errors:")?;
    for err in &outcome.errors {
        writeln!(out, "{err}")?;
    }

    writeln!(out, "Done tasks:")?;
    for report in sorted_reports(outcome) {
        writeln!(out, "{report}")?;
    }
    Ok(())
}

fn print_json(out: &mut impl Write, outcome: &PipelineOutcome) -> anyhow::Result<()> {
    for err in &outcome.errors {
        let line = serde_json::json!({
            "id": err.id(),
            "error": err.to_string(),
            "stale": err.is_stale(),
        });
        writeln!(out, "{line}")?;
    }
    for report in sorted_reports(outcome) {
        writeln!(out, "{}", serde_json::to_string(&report)?)?;
    }
    Ok(())
}

fn sorted_reports(outcome: &PipelineOutcome) -> Vec<TaskReport> {
    let mut reports: Vec<_> = outcome.results.values().map(|t| t.report()).collect();
    reports.sort_by_key(|r| r.created_at);
    reports
}
