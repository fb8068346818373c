//! Run command - de-identify every item in an input directory

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Table};
use deidcm::{Orchestrator, PolicyMode, RunConfig, RunReport};
use deidcm_dicom::WireCodec;
use std::path::PathBuf;
use std::sync::Arc;

/// Arguments for the run command
#[derive(Debug)]
pub struct RunArgs {
    pub input_dir: PathBuf,
    pub work_dir: Option<PathBuf>,
    pub mode: PolicyMode,
    pub keep_list: Option<PathBuf>,
    pub redact_list: Option<PathBuf>,
    pub skip_private_tags: bool,
    pub no_bundle: bool,
    pub no_clear: bool,
    pub dicomdir_pipeline: bool,
    pub json: bool,
}

pub fn execute(args: RunArgs) -> Result<()> {
    if !args.input_dir.is_dir() {
        anyhow::bail!("input directory not found: {}", args.input_dir.display());
    }

    let mut config = RunConfig::new(&args.input_dir);
    if let Some(work_dir) = args.work_dir {
        config.work_dir = work_dir;
    }
    config.mode = args.mode;
    config.keep_list = args.keep_list;
    config.redact_list = args.redact_list;
    config.skip_private_tags = args.skip_private_tags;
    config.bundle = !args.no_bundle;
    config.clear_previous = !args.no_clear;
    config.dicomdir_via_pipeline = args.dicomdir_pipeline;

    let orchestrator =
        Orchestrator::new(config, Arc::new(WireCodec)).context("Failed to load tag policy")?;
    let report = orchestrator.run().context("Run failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_report(report: &RunReport) {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Total", "Redacted", "Skipped", "Failed"]);
    table.add_row(vec![
        report.total.to_string(),
        report.redacted.to_string(),
        report.skipped.to_string(),
        report.failed.len().to_string(),
    ]);
    println!("{table}");

    if !report.failed.is_empty() {
        let mut failures = Table::new();
        failures.load_preset(UTF8_FULL);
        failures.set_header(vec!["Failed item", "Reason"]);
        for failure in &report.failed {
            failures.add_row(vec![failure.item.clone(), failure.reason.clone()]);
        }
        println!("{failures}");
    }
}
