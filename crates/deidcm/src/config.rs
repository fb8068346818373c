//! Run configuration
//!
//! One immutable value object built by the CLI and passed by reference
//! into the classifier, redactors, and orchestrator. Nothing in the
//! engine reads flags from the environment or mutates shared state
//! between runs.

use std::path::PathBuf;

/// Which policy list drives instance redaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyMode {
    /// Only listed top-level tags survive.
    #[default]
    Keep,
    /// Listed tags are removed wherever they occur, including nested.
    Redact,
}

/// Configuration for one de-identification run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Directory whose immediate entries are the items to process.
    pub input_dir: PathBuf,
    /// Where output artifacts materialize before bundling.
    /// Defaults to the process working directory.
    pub work_dir: PathBuf,
    /// Policy list used by the instance redactor.
    pub mode: PolicyMode,
    /// Optional override path for the keep list.
    pub keep_list: Option<PathBuf>,
    /// Optional override path for the redact list.
    pub redact_list: Option<PathBuf>,
    /// Leave private (odd-group) tags untouched.
    pub skip_private_tags: bool,
    /// Collect outputs into `<input_dir>/deidentified_output` after the run.
    pub bundle: bool,
    /// Remove previous output directories and stale artifacts before
    /// processing, so a re-run never trips over leftovers.
    pub clear_previous: bool,
    /// Route DICOMDIR files through the generic instance pipeline
    /// instead of the dedicated length-preserving path.
    pub dicomdir_via_pipeline: bool,
}

impl RunConfig {
    /// Config with defaults for everything but the input directory.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            work_dir: PathBuf::from("."),
            mode: PolicyMode::Keep,
            keep_list: None,
            redact_list: None,
            skip_private_tags: false,
            bundle: true,
            clear_previous: true,
            dicomdir_via_pipeline: false,
        }
    }
}
