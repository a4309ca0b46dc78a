//! Splitting a tentative selection against the persisted set.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Delete,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Add => write!(f, "+"),
            ChangeKind::Delete => write!(f, "-"),
        }
    }
}

/// Selected dates split into the ones to create and the ones to remove.
///
/// Every selected date lands in exactly one of the two sets. Persisted dates
/// outside the selection appear in neither.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub to_add: BTreeSet<NaiveDate>,
    pub to_delete: BTreeSet<NaiveDate>,
}

impl Partition {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }

    pub fn dates(&self, kind: ChangeKind) -> &BTreeSet<NaiveDate> {
        match kind {
            ChangeKind::Add => &self.to_add,
            ChangeKind::Delete => &self.to_delete,
        }
    }
}

/// `to_add = selection \ persisted`, `to_delete = selection ∩ persisted`.
///
/// Selecting a date that is already a working day means "remove it".
pub fn partition(selection: &BTreeSet<NaiveDate>, persisted: &BTreeSet<NaiveDate>) -> Partition {
    let (to_delete, to_add): (BTreeSet<_>, BTreeSet<_>) = selection
        .iter()
        .copied()
        .partition(|date| persisted.contains(date));

    Partition { to_add, to_delete }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(days: &[u32]) -> BTreeSet<NaiveDate> {
        days.iter()
            .map(|d| NaiveDate::from_ymd_opt(2025, 1, *d).unwrap())
            .collect()
    }

    #[test]
    fn test_selected_working_day_becomes_delete() {
        let result = partition(&dates(&[1, 2]), &dates(&[2]));

        assert_eq!(result.to_add, dates(&[1]));
        assert_eq!(result.to_delete, dates(&[2]));
    }

    #[test]
    fn test_unselected_persisted_dates_are_untouched() {
        let result = partition(&dates(&[5]), &dates(&[1, 2, 3, 31]));

        assert_eq!(result.to_add, dates(&[5]));
        assert!(result.to_delete.is_empty());
    }

    #[test]
    fn test_empty_selection_yields_empty_partition() {
        assert!(partition(&BTreeSet::new(), &dates(&[1, 2])).is_empty());
    }

    #[test]
    fn test_partition_is_exact_bipartition() {
        let persisted = dates(&[2, 4, 6, 8, 10]);
        let selections = [dates(&[]), dates(&[1, 2, 3]), dates(&[2, 4]), dates(&[1, 3, 5, 7, 9, 10])];

        for selection in &selections {
            let result = partition(selection, &persisted);

            let union: BTreeSet<_> = result.to_add.union(&result.to_delete).copied().collect();
            assert_eq!(&union, selection);
            assert!(result.to_add.is_disjoint(&result.to_delete));
            assert_eq!(
                result.to_add,
                selection.difference(&persisted).copied().collect()
            );
            assert_eq!(
                result.to_delete,
                selection.intersection(&persisted).copied().collect()
            );
        }
    }
}
