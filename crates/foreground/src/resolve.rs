//! Foreground resolution from usage records.
//!
//! Pure domain logic - no I/O, no platform dependencies.

use crate::state::{UsageEvent, UsageEventKind};
use focusgate_policy::AppId;
use std::collections::HashMap;

/// App of the chronologically last foreground transition, if any.
///
/// Events are ordered by timestamp; ties keep the order the platform
/// reported them in.
pub fn last_foreground(events: &[UsageEvent]) -> Option<&AppId> {
    let mut ordered: Vec<&UsageEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.timestamp_ms);

    ordered
        .into_iter()
        .rev()
        .find(|e| e.kind == UsageEventKind::MovedToForeground)
        .map(|e| &e.app_id)
}

/// App with the most recent last-used timestamp.
///
/// Ties resolve to the lexically greatest id so the answer does not depend
/// on map iteration order.
pub fn most_recently_used(usage: &HashMap<AppId, i64>) -> Option<&AppId> {
    usage
        .iter()
        .max_by(|(a_id, a_ts), (b_id, b_ts)| a_ts.cmp(b_ts).then_with(|| a_id.cmp(b_id)))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_foreground_wins() {
        let events = vec![
            UsageEvent::foreground("com.a", 100),
            UsageEvent::background("com.a", 200),
            UsageEvent::foreground("com.b", 210),
        ];
        assert_eq!(last_foreground(&events), Some(&AppId::new("com.b")));
    }

    #[test]
    fn test_out_of_order_events_are_sorted() {
        let events = vec![
            UsageEvent::foreground("com.late", 500),
            UsageEvent::foreground("com.early", 100),
        ];
        assert_eq!(last_foreground(&events), Some(&AppId::new("com.late")));
    }

    #[test]
    fn test_only_background_events_is_indeterminate() {
        let events = vec![UsageEvent::background("com.a", 100)];
        assert_eq!(last_foreground(&events), None);
    }

    #[test]
    fn test_most_recently_used() {
        let usage = HashMap::from([
            (AppId::new("com.a"), 100),
            (AppId::new("com.b"), 300),
            (AppId::new("com.c"), 200),
        ]);
        assert_eq!(most_recently_used(&usage), Some(&AppId::new("com.b")));
        assert_eq!(most_recently_used(&HashMap::new()), None);
    }

    #[test]
    fn test_most_recently_used_tie_is_deterministic() {
        let usage = HashMap::from([(AppId::new("com.a"), 100), (AppId::new("com.b"), 100)]);
        assert_eq!(most_recently_used(&usage), Some(&AppId::new("com.b")));
    }
}
