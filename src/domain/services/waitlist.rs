use chrono::{NaiveDate, NaiveTime};

use crate::domain::models::waitlist::{WaitlistEntry, WaitlistStatus};

/// The slot freed by a cancellation, expressed in the policy timezone's
/// local date and time so it can be matched against waitlist requests.
#[derive(Debug, Clone)]
pub struct FreedSlot {
    pub service_type: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

/// Orders entries for promotion: priority descending, then creation time
/// ascending, then id ascending. The id tie-break makes the order a strict
/// total order, so promotion is deterministic even for equal-priority
/// entries created in the same instant.
pub fn rank(mut entries: Vec<WaitlistEntry>) -> Vec<WaitlistEntry> {
    entries.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
    entries
}

/// Picks the entry to promote into a freed slot, if any. Matching entries
/// are WAITING, request the same service on the same date, and their
/// requested time lies within `window_min` minutes of the freed time
/// (0 = exact). An empty match set is a normal outcome, not an error.
pub fn select_promotion(
    slot: &FreedSlot,
    entries: Vec<WaitlistEntry>,
    window_min: i64,
) -> Option<WaitlistEntry> {
    let candidates: Vec<WaitlistEntry> = entries
        .into_iter()
        .filter(|e| e.status == WaitlistStatus::Waiting)
        .filter(|e| e.service_type == slot.service_type && e.requested_date == slot.date)
        .filter(|e| {
            let gap = (e.requested_time - slot.time).num_minutes().abs();
            gap <= window_min
        })
        .collect();

    rank(candidates).into_iter().next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::waitlist::{NewWaitlistParams, WaitlistEntry};
    use chrono::{Duration, NaiveDate, NaiveTime, Utc};

    fn entry(priority: i32, created_offset_min: i64) -> WaitlistEntry {
        let mut e = WaitlistEntry::new(NewWaitlistParams {
            client_id: "client-1".to_string(),
            client_name: "Dana".to_string(),
            client_email: "dana@example.com".to_string(),
            client_phone: "555-0100".to_string(),
            service_type: "dog-walk".to_string(),
            requested_date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            requested_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration_min: 30,
            pets: vec!["Rex".to_string()],
            special_instructions: None,
            priority,
            estimated_wait_min: 0,
        });
        e.created_at = Utc::now() + Duration::minutes(created_offset_min);
        e
    }

    #[test]
    fn rank_orders_by_priority_then_creation() {
        let a = entry(50, 1); // t1
        let b = entry(90, 2); // t2
        let c = entry(50, 0); // t0

        let ranked = rank(vec![a.clone(), b.clone(), c.clone()]);
        assert_eq!(ranked[0].id, b.id);
        assert_eq!(ranked[1].id, c.id);
        assert_eq!(ranked[2].id, a.id);
    }

    #[test]
    fn rank_is_a_strict_total_order() {
        let mut a = entry(50, 0);
        let mut b = entry(50, 0);
        a.created_at = b.created_at;
        a.id = "aaa".to_string();
        b.id = "bbb".to_string();

        let first = rank(vec![a.clone(), b.clone()]);
        let second = rank(vec![b, a]);
        assert_eq!(first[0].id, "aaa");
        assert_eq!(second[0].id, "aaa");
    }

    #[test]
    fn promotion_picks_the_top_ranked_match() {
        let slot = FreedSlot {
            service_type: "dog-walk".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };

        let low = entry(10, 0);
        let high = entry(90, 5);
        let chosen = select_promotion(&slot, vec![low, high.clone()], 0).unwrap();
        assert_eq!(chosen.id, high.id);
    }

    #[test]
    fn promotion_ignores_terminal_and_mismatched_entries() {
        let slot = FreedSlot {
            service_type: "dog-walk".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };

        let mut promoted = entry(90, 0);
        promoted.status = WaitlistStatus::Promoted;

        let mut other_service = entry(80, 0);
        other_service.service_type = "overnight".to_string();

        let mut other_time = entry(70, 0);
        other_time.requested_time = NaiveTime::from_hms_opt(15, 0, 0).unwrap();

        let matching = entry(10, 0);

        let chosen = select_promotion(
            &slot,
            vec![promoted, other_service, other_time, matching.clone()],
            0,
        )
        .unwrap();
        assert_eq!(chosen.id, matching.id);
    }

    #[test]
    fn promotion_window_widens_the_match() {
        let slot = FreedSlot {
            service_type: "dog-walk".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };

        let mut near = entry(50, 0);
        near.requested_time = NaiveTime::from_hms_opt(10, 30, 0).unwrap();

        assert!(select_promotion(&slot, vec![near.clone()], 0).is_none());
        assert!(select_promotion(&slot, vec![near], 30).is_some());
    }

    #[test]
    fn empty_match_set_is_not_an_error() {
        let slot = FreedSlot {
            service_type: "dog-walk".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, 4).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };
        assert!(select_promotion(&slot, Vec::new(), 0).is_none());
    }
}
