//! Inspect command - classify a single item without redacting it

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL, Table};
use deidcm::classify;
use deidcm_dicom::WireCodec;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Debug)]
pub struct InspectArgs {
    pub path: PathBuf,
    pub json: bool,
}

pub fn execute(args: InspectArgs) -> Result<()> {
    if !args.path.exists() {
        anyhow::bail!("no such item: {}", args.path.display());
    }
    let class = classify(&args.path, &WireCodec);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&class)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Item", "Directory", "Compressed", "DICOM"]);
    table.add_row(vec![
        args.path.display().to_string(),
        class.is_directory.to_string(),
        class.is_compressed.to_string(),
        class.contains_dicom.to_string(),
    ]);
    println!("{table}");
    Ok(())
}
