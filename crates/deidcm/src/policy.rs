//! Tag policy lists
//!
//! Plaintext lists, one tag identifier per line (standard keyword or
//! hex pair), `#`-prefixed comments and blank lines ignored. Default
//! lists ship embedded in the binary; a run config may point at
//! override files instead. Loaded once per run, read-only after.

use crate::config::PolicyMode;
use crate::error::{DeidError, Result};
use deidcm_dicom::Tag;
use std::fs;
use std::path::Path;

const DEFAULT_KEEP_LIST: &str = include_str!("../config/keep_tags.txt");
const DEFAULT_REDACT_LIST: &str = include_str!("../config/redact_tags.txt");

/// A loaded, deduplicated tag list.
#[derive(Debug, Clone)]
pub struct TagPolicy {
    mode: PolicyMode,
    tags: Vec<Tag>,
}

impl TagPolicy {
    /// Load the list for `mode`, from `override_path` if given, else
    /// the embedded default. A missing or unreadable override, or any
    /// unparseable line, is a config error.
    pub fn load(mode: PolicyMode, override_path: Option<&Path>) -> Result<Self> {
        let text = match override_path {
            Some(path) => fs::read_to_string(path).map_err(|e| {
                DeidError::Config(format!("cannot read tag list {}: {e}", path.display()))
            })?,
            None => match mode {
                PolicyMode::Keep => DEFAULT_KEEP_LIST.to_string(),
                PolicyMode::Redact => DEFAULT_REDACT_LIST.to_string(),
            },
        };
        let tags = parse_list(&text)?;
        Ok(Self { mode, tags })
    }

    pub fn mode(&self) -> PolicyMode {
        self.mode
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Listed tags, in file order.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Parse a list body: trim, skip blanks and `#` comments, dedup
/// preserving first-seen order.
fn parse_list(text: &str) -> Result<Vec<Tag>> {
    let mut tags = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let tag: Tag = line
            .parse()
            .map_err(|e| DeidError::Config(format!("bad tag list entry {line:?}: {e}")))?;
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lists_parse() {
        let keep = TagPolicy::load(PolicyMode::Keep, None).unwrap();
        let redact = TagPolicy::load(PolicyMode::Redact, None).unwrap();
        assert!(!keep.is_empty());
        assert!(redact.contains(Tag::new(0x0010, 0x0010)));
        assert!(!keep.contains(Tag::new(0x0010, 0x0010)));
    }

    #[test]
    fn test_parse_skips_comments_and_dedups() {
        let tags = parse_list(
            "# comment\nPatientName\n\n  (0010,0010)  \npatientid\nPatientID\n",
        )
        .unwrap();
        assert_eq!(
            tags,
            vec![Tag::new(0x0010, 0x0010), Tag::new(0x0010, 0x0020)]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_identifier() {
        assert!(matches!(
            parse_list("NotATag\n"),
            Err(DeidError::Config(_))
        ));
    }

    #[test]
    fn test_missing_override_is_config_error() {
        let err = TagPolicy::load(
            PolicyMode::Keep,
            Some(Path::new("/definitely/not/here.txt")),
        )
        .unwrap_err();
        assert!(matches!(err, DeidError::Config(_)));
    }
}
