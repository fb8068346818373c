//! Instance redaction
//!
//! Keep mode filters the top level flat: everything not on the list is
//! deleted. Redact mode walks the whole tree depth-first for each
//! listed tag; sequence elements recurse into their items rather than
//! matching themselves, and every occurrence at every depth is
//! deleted. Redacted elements are removed, not blanked.

use crate::config::PolicyMode;
use crate::policy::TagPolicy;
use deidcm_dicom::{DataSet, Tag};

/// Redacts a parsed instance header in place.
pub struct InstanceRedactor<'a> {
    policy: &'a TagPolicy,
}

impl<'a> InstanceRedactor<'a> {
    pub fn new(policy: &'a TagPolicy) -> Self {
        Self { policy }
    }

    /// Mutate `header` per the policy mode. Unless `skip_private`,
    /// every private (odd-group) element is deleted as well, at every
    /// depth, regardless of list membership.
    pub fn redact(&self, header: &mut DataSet, skip_private: bool) {
        match self.policy.mode() {
            PolicyMode::Keep => self.filter_tags(header),
            PolicyMode::Redact => {
                for &tag in self.policy.tags() {
                    remove_recursive(header, tag);
                }
            }
        }
        if !skip_private {
            remove_private(header);
        }
    }

    /// Keep-list pass: delete every top-level element not on the list.
    fn filter_tags(&self, header: &mut DataSet) {
        header.retain(|elem| self.policy.contains(elem.tag));
    }
}

/// Depth-first pre-order removal of every occurrence of `target`.
/// Sequence elements recurse into all items; non-sequence elements are
/// deleted on tag match.
fn remove_recursive(dataset: &mut DataSet, target: Tag) {
    for tag in dataset.tags() {
        let is_sequence = match dataset.get_mut(tag) {
            Some(elem) => match elem.items_mut() {
                Some(items) => {
                    for item in items {
                        remove_recursive(item, target);
                    }
                    true
                }
                None => false,
            },
            None => continue,
        };
        if !is_sequence && tag == target {
            dataset.remove(tag);
        }
    }
}

/// Delete every private (odd-group) element, then walk the items of
/// the sequences that survive so nested private elements go too.
fn remove_private(dataset: &mut DataSet) {
    dataset.retain(|elem| !elem.tag.is_private());
    for tag in dataset.tags() {
        if let Some(items) = dataset.get_mut(tag).and_then(|elem| elem.items_mut()) {
            for item in items {
                remove_private(item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::TagPolicy;
    use deidcm_dicom::{Element, Vr};
    use deidcm_test_utils::{
        instance_with_target_at_depth, sample_instance, MODALITY, PATIENT_NAME,
        REFERENCED_PATIENT_SEQUENCE, ROWS, SOP_INSTANCE_UID,
    };

    fn keep_policy() -> TagPolicy {
        TagPolicy::load(PolicyMode::Keep, None).unwrap()
    }

    fn redact_policy() -> TagPolicy {
        TagPolicy::load(PolicyMode::Redact, None).unwrap()
    }

    #[test]
    fn test_keep_mode_filters_unlisted_top_level_tags() {
        let policy = keep_policy();
        let mut header = sample_instance("DOE^JOHN");
        InstanceRedactor::new(&policy).redact(&mut header, true);

        for tag in header.tags() {
            assert!(policy.contains(tag), "unlisted tag {tag} survived");
        }
        assert!(header.contains(SOP_INSTANCE_UID));
        assert!(header.contains(MODALITY));
        assert!(header.contains(ROWS));
        assert!(!header.contains(PATIENT_NAME));
    }

    #[test]
    fn test_private_tags_removed_unless_skipped() {
        let private = Tag::new(0x0009, 0x0010);
        let policy = redact_policy();

        let mut header = sample_instance("DOE^JOHN");
        InstanceRedactor::new(&policy).redact(&mut header, true);
        assert!(header.contains(private));

        let mut header = sample_instance("DOE^JOHN");
        InstanceRedactor::new(&policy).redact(&mut header, false);
        assert!(!header.contains(private));
    }

    #[test]
    fn test_private_tags_removed_inside_sequences() {
        let private = Tag::new(0x0009, 0x0010);
        let policy = redact_policy();
        let nested: DataSet = [
            Element::text(MODALITY, Vr::Cs, "CT"),
            Element::text(private, Vr::Lo, "VENDOR PHI"),
        ]
        .into_iter()
        .collect();
        let mut header: DataSet = [
            Element::text(MODALITY, Vr::Cs, "CT"),
            Element::sequence(REFERENCED_PATIENT_SEQUENCE, vec![nested]),
        ]
        .into_iter()
        .collect();

        InstanceRedactor::new(&policy).redact(&mut header, false);
        assert!(!contains_anywhere(&header, private));
        assert!(contains_anywhere(&header, MODALITY));
    }

    #[test]
    fn test_redact_mode_removes_target_at_all_depths() {
        let policy = redact_policy();
        for depth in 0..=3 {
            let mut header = instance_with_target_at_depth(PATIENT_NAME, depth);
            InstanceRedactor::new(&policy).redact(&mut header, true);
            assert!(
                !contains_anywhere(&header, PATIENT_NAME),
                "target survived at depth {depth}"
            );
            assert!(contains_anywhere(&header, MODALITY));
        }
    }

    #[test]
    fn test_redact_mode_removes_repeated_occurrences_across_branches() {
        let policy = redact_policy();
        let branch_a: DataSet = [Element::text(PATIENT_NAME, Vr::Pn, "A")].into_iter().collect();
        let branch_b: DataSet = [Element::text(PATIENT_NAME, Vr::Pn, "B")].into_iter().collect();
        let mut header: DataSet = [
            Element::text(PATIENT_NAME, Vr::Pn, "TOP"),
            Element::sequence(REFERENCED_PATIENT_SEQUENCE, vec![branch_a, branch_b]),
        ]
        .into_iter()
        .collect();

        InstanceRedactor::new(&policy).redact(&mut header, true);
        assert!(!contains_anywhere(&header, PATIENT_NAME));
        // the sequence itself survives, emptied of the target
        assert!(header.contains(REFERENCED_PATIENT_SEQUENCE));
    }

    #[test]
    fn test_sequence_with_target_tag_recurses_instead_of_deleting() {
        let policy = redact_policy();
        let nested: DataSet = [Element::text(MODALITY, Vr::Cs, "CT")].into_iter().collect();
        // a sequence element whose own tag is on the redact list
        let mut header: DataSet = [Element::sequence(PATIENT_NAME, vec![nested])]
            .into_iter()
            .collect();
        InstanceRedactor::new(&policy).redact(&mut header, true);
        assert!(header.contains(PATIENT_NAME));
    }

    fn contains_anywhere(dataset: &DataSet, target: Tag) -> bool {
        dataset.iter().any(|elem| match elem.items() {
            Some(items) => items.iter().any(|item| contains_anywhere(item, target)),
            None => elem.tag == target,
        })
    }
}
