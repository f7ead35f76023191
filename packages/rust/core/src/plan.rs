//! Decide what a run does with the records a fetch returned.
//!
//! Compares fetched records against the document numbers already in the
//! metadata log and the text artifacts already on disk.

use std::collections::HashSet;

use eo_tracker_shared::{MetadataRow, OrderRecord};

/// Work derived from one fetch.
#[derive(Debug, Default)]
pub(crate) struct RunPlan<'a> {
    /// Rows to append to the metadata log, in API order.
    pub rows: Vec<MetadataRow>,
    /// Records skipped because their document number is already logged or
    /// appeared earlier in the same batch.
    pub duplicates: usize,
    /// Records whose full text should be fetched and converted.
    pub conversions: Vec<&'a OrderRecord>,
}

/// Partition `orders` into new rows, duplicates, and conversions.
///
/// A record without a document number is still logged and queued for
/// conversion, where it fails validation and is reported as skipped.
/// Logged records are converted again only when `has_artifact` says their
/// text file is missing.
pub(crate) fn plan_run<'a, F>(
    orders: &'a [OrderRecord],
    logged: &HashSet<String>,
    has_artifact: F,
) -> RunPlan<'a>
where
    F: Fn(&str) -> bool,
{
    let mut plan = RunPlan::default();
    let mut seen: HashSet<&str> = HashSet::new();

    for order in orders {
        let Some(id) = order.document_id() else {
            plan.rows.push(order.to_metadata_row());
            plan.conversions.push(order);
            continue;
        };

        if !seen.insert(id) {
            plan.duplicates += 1;
            continue;
        }

        if logged.contains(id) {
            plan.duplicates += 1;
            if !has_artifact(id) {
                plan.conversions.push(order);
            }
        } else {
            plan.rows.push(order.to_metadata_row());
            plan.conversions.push(order);
        }
    }

    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: Option<&str>) -> OrderRecord {
        OrderRecord {
            document_number: id.map(String::from),
            publication_date: Some("2025-02-24".into()),
            ..Default::default()
        }
    }

    fn ids<'a>(plan: &RunPlan<'a>) -> Vec<Option<&'a str>> {
        plan.conversions.iter().map(|o| o.document_id()).collect()
    }

    #[test]
    fn fresh_records_are_logged_and_converted() {
        let orders = vec![order(Some("2025-1")), order(Some("2025-2"))];
        let plan = plan_run(&orders, &HashSet::new(), |_| false);

        assert_eq!(plan.rows.len(), 2);
        assert_eq!(plan.rows[0].document_number, "2025-1");
        assert_eq!(plan.duplicates, 0);
        assert_eq!(ids(&plan), vec![Some("2025-1"), Some("2025-2")]);
    }

    #[test]
    fn logged_records_are_not_relogged() {
        let orders = vec![order(Some("2025-1")), order(Some("2025-2"))];
        let logged: HashSet<String> = ["2025-1".to_string()].into();
        let plan = plan_run(&orders, &logged, |_| true);

        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.rows[0].document_number, "2025-2");
        assert_eq!(plan.duplicates, 1);
        assert_eq!(ids(&plan), vec![Some("2025-2")]);
    }

    #[test]
    fn logged_record_without_artifact_is_converted_again() {
        let orders = vec![order(Some("2025-1"))];
        let logged: HashSet<String> = ["2025-1".to_string()].into();
        let plan = plan_run(&orders, &logged, |_| false);

        assert!(plan.rows.is_empty());
        assert_eq!(plan.duplicates, 1);
        assert_eq!(ids(&plan), vec![Some("2025-1")]);
    }

    #[test]
    fn repeats_within_batch_collapse() {
        let orders = vec![order(Some("2025-1")), order(Some(" 2025-1 "))];
        let plan = plan_run(&orders, &HashSet::new(), |_| false);

        assert_eq!(plan.rows.len(), 1);
        assert_eq!(plan.duplicates, 1);
        assert_eq!(plan.conversions.len(), 1);
    }

    #[test]
    fn record_without_number_is_logged_and_queued() {
        let orders = vec![order(None), order(Some(""))];
        let plan = plan_run(&orders, &HashSet::new(), |_| false);

        assert_eq!(plan.rows.len(), 2);
        assert_eq!(plan.conversions.len(), 2);
        assert_eq!(plan.duplicates, 0);
    }
}
