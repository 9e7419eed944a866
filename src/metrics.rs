//! Derived metrics over the raw edge and event lists. Counts are recomputed
//! from the edge set on every call so they can never drift from it.

use std::collections::BTreeMap;

use chrono::{DateTime, Timelike, Utc};

use crate::data::{FollowEdge, RetweetEvent};

/// Number of edges pointing at `handle` (its follower count).
pub fn count_incoming(handle: &str, edges: &[FollowEdge]) -> usize {
    edges.iter().filter(|edge| edge.target == handle).count()
}

/// Number of edges leaving `handle` (how many accounts it follows).
pub fn count_outgoing(handle: &str, edges: &[FollowEdge]) -> usize {
    edges.iter().filter(|edge| edge.source == handle).count()
}

/// Does `candidate` follow `target`?
pub fn is_follower(candidate: &str, target: &str, edges: &[FollowEdge]) -> bool {
    edges
        .iter()
        .any(|edge| edge.target == target && edge.source == candidate)
}

/// Does `source` follow `candidate`?
pub fn is_followed_by(candidate: &str, source: &str, edges: &[FollowEdge]) -> bool {
    edges
        .iter()
        .any(|edge| edge.source == source && edge.target == candidate)
}

/// The follow direction a story step counts along.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FollowMetric {
    Followers,
    Following,
}

impl FollowMetric {
    pub fn count(self, handle: &str, edges: &[FollowEdge]) -> usize {
        match self {
            Self::Followers => count_incoming(handle, edges),
            Self::Following => count_outgoing(handle, edges),
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Self::Followers => "seguidores",
            Self::Following => "siguiendo",
        }
    }
}

/// A group of events sharing a timestamp, with the running total of events
/// seen up to and including it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bucket {
    pub at: DateTime<Utc>,
    pub total: usize,
}

/// Groups events by their exact timestamp, sorts the groups ascending, and
/// prefix-sums the group sizes. Events with identical timestamps collapse
/// into a single bucket; the final bucket's total equals the event count.
pub fn cumulative_event_counts(events: &[RetweetEvent]) -> Vec<Bucket> {
    let mut groups: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    for event in events {
        *groups.entry(event.created_at).or_insert(0) += 1;
    }

    let mut total = 0;
    groups
        .into_iter()
        .map(|(at, size)| {
            total += size;
            Bucket { at, total }
        })
        .collect()
}

/// Appends a synthetic event at `now` so the cumulative curve reaches the
/// right edge of the time axis. The instant is truncated to whole seconds,
/// matching the fixed-millisecond formatter the datasets were written with.
pub fn anchor_to_now(events: &mut Vec<RetweetEvent>, now: DateTime<Utc>) {
    let created_at = now.with_nanosecond(0).unwrap_or(now);
    events.push(RetweetEvent { created_at });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FollowEdge;

    fn edges() -> Vec<FollowEdge> {
        vec![
            FollowEdge::new("A", "B"),
            FollowEdge::new("A", "C"),
            FollowEdge::new("D", "B"),
        ]
    }

    fn event(millis: i64) -> RetweetEvent {
        RetweetEvent {
            created_at: DateTime::<Utc>::from_timestamp_millis(millis).unwrap(),
        }
    }

    #[test]
    fn incoming_and_outgoing_counts_match_edge_filters() {
        let edges = edges();
        assert_eq!(count_incoming("B", &edges), 2);
        assert_eq!(count_incoming("C", &edges), 1);
        assert_eq!(count_incoming("A", &edges), 0);
        assert_eq!(count_outgoing("A", &edges), 2);
        assert_eq!(count_outgoing("B", &edges), 0);
    }

    #[test]
    fn follow_predicates_match_edge_existence() {
        let edges = edges();
        assert!(is_followed_by("B", "A", &edges));
        assert!(!is_followed_by("C", "D", &edges));
        assert!(is_follower("A", "B", &edges));
        assert!(!is_follower("B", "A", &edges));
    }

    #[test]
    fn follow_metric_selects_the_direction() {
        let edges = edges();
        assert_eq!(FollowMetric::Followers.count("B", &edges), 2);
        assert_eq!(FollowMetric::Following.count("B", &edges), 0);
        assert_eq!(FollowMetric::Following.count("A", &edges), 2);
    }

    #[test]
    fn cumulative_counts_are_sorted_and_non_decreasing() {
        let events = vec![event(3000), event(1000), event(2000), event(1000)];
        let buckets = cumulative_event_counts(&events);
        assert!(buckets.windows(2).all(|pair| pair[0].at < pair[1].at));
        assert!(buckets.windows(2).all(|pair| pair[0].total <= pair[1].total));
        assert_eq!(buckets.last().unwrap().total, events.len());
    }

    #[test]
    fn identical_timestamps_collapse_into_one_bucket() {
        // t1, t1, t2, t3 -> [(t1, 2), (t2, 3), (t3, 4)]
        let events = vec![event(1000), event(1000), event(2000), event(3000)];
        let buckets = cumulative_event_counts(&events);
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[0].total, 2);
        assert_eq!(buckets[1].total, 3);
        assert_eq!(buckets[2].total, 4);
    }

    #[test]
    fn empty_event_list_yields_no_buckets() {
        assert!(cumulative_event_counts(&[]).is_empty());
    }

    #[test]
    fn now_anchor_is_truncated_to_whole_seconds() {
        let now = DateTime::<Utc>::from_timestamp_millis(10_750).unwrap();
        let mut events = vec![event(1000)];
        anchor_to_now(&mut events, now);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].created_at.timestamp_millis(), 10_000);
    }
}
