use shared::protocol::SubscriptionRecord;

/// Stable checked-first partition: every `checked = true` record precedes
/// every `checked = false` record, and source order is preserved inside
/// each group.
pub fn checked_first(mut records: Vec<SubscriptionRecord>) -> Vec<SubscriptionRecord> {
    records.sort_by_key(|record| !record.checked);
    records
}

#[cfg(test)]
mod tests {
    use shared::domain::SubscriptionId;
    use uuid::Uuid;

    use super::*;

    fn record(id: u128, checked: bool) -> SubscriptionRecord {
        SubscriptionRecord {
            id: SubscriptionId(Uuid::from_u128(id)),
            title: format!("subscription-{id}"),
            email: "alice@example.com".to_string(),
            checked,
            price_cents: 999,
            renews_at: None,
        }
    }

    fn ids(records: &[SubscriptionRecord]) -> Vec<u128> {
        records.iter().map(|record| record.id.0.as_u128()).collect()
    }

    #[test]
    fn checked_records_come_first_and_groups_keep_source_order() {
        let input = vec![
            record(1, false),
            record(2, true),
            record(3, false),
            record(4, true),
        ];

        let sorted = checked_first(input);

        assert_eq!(ids(&sorted), vec![2, 4, 1, 3]);
        assert_eq!(checked_first(sorted.clone()), sorted);
    }

    #[test]
    fn already_partitioned_input_is_unchanged() {
        let input = vec![
            record(7, true),
            record(8, true),
            record(9, false),
        ];

        let once = checked_first(input.clone());
        let twice = checked_first(once.clone());

        assert_eq!(ids(&once), ids(&input));
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(checked_first(Vec::new()).is_empty());
    }
}
