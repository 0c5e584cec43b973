// Window filter - Derives dashboard counters from a cache snapshot
//
// Everything here is a pure function of (entry, window, now). Malformed
// records are skipped rather than reported.
use crate::application::session_cache::{CacheEntry, CollectionSlot};
use crate::domain::metrics::{DerivedMetrics, MetricState};
use crate::domain::records::{OccupancySnapshot, Reservation, parse_timestamp};
use crate::domain::window::TimeWindow;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

pub fn derive_metrics(entry: &CacheEntry, window: TimeWindow, now: DateTime<Utc>) -> DerivedMetrics {
    // User and spot totals are point-in-time sizes; only reservation and
    // occupancy figures are scoped to the window.
    let total_users = collection_size(&entry.users);
    let total_parking_spots = collection_size(&entry.parking_spots);

    let (active_reservations_in_window, total_reservations_in_window) = match &entry.reservations {
        CollectionSlot::Absent => (MetricState::Ready(0), MetricState::Ready(0)),
        CollectionSlot::Failed(e) => (
            MetricState::Error(e.to_string()),
            MetricState::Error(e.to_string()),
        ),
        CollectionSlot::Loaded(reservations) => {
            let in_window = reservations_in_window(reservations, window, now);
            (
                MetricState::Ready(distinct_held_spots(&in_window)),
                MetricState::Ready(in_window.len() as u64),
            )
        }
    };

    let occupancy_rate_in_window = match &entry.occupancy {
        CollectionSlot::Absent => MetricState::Ready(0.0),
        CollectionSlot::Failed(e) => MetricState::Error(e.to_string()),
        CollectionSlot::Loaded(snapshots) => {
            MetricState::Ready(average_occupancy(snapshots, window, now))
        }
    };

    DerivedMetrics {
        total_users,
        total_parking_spots,
        active_reservations_in_window,
        total_reservations_in_window,
        occupancy_rate_in_window,
    }
}

fn collection_size<T>(slot: &CollectionSlot<T>) -> MetricState<u64> {
    match slot {
        CollectionSlot::Absent => MetricState::Ready(0),
        CollectionSlot::Loaded(items) => MetricState::Ready(items.len() as u64),
        CollectionSlot::Failed(e) => MetricState::Error(e.to_string()),
    }
}

/// Reservations whose effective date lies within the window. Reservations
/// without a usable date are left out.
pub fn reservations_in_window(
    reservations: &[Reservation],
    window: TimeWindow,
    now: DateTime<Utc>,
) -> Vec<&Reservation> {
    reservations
        .iter()
        .filter(|r| {
            r.effective_date()
                .is_some_and(|date| window.contains(now, date))
        })
        .collect()
}

/// Number of distinct spots held by pending/active/confirmed/occupied
/// reservations. Several bookings of one spot count once; reservations
/// without a spot reference add nothing.
fn distinct_held_spots(reservations: &[&Reservation]) -> u64 {
    reservations
        .iter()
        .filter(|r| r.status.holds_spot())
        .filter_map(|r| r.parking_spot_id.as_deref())
        .collect::<HashSet<_>>()
        .len() as u64
}

fn average_occupancy(snapshots: &[OccupancySnapshot], window: TimeWindow, now: DateTime<Utc>) -> f64 {
    let rates: Vec<f64> = snapshots
        .iter()
        .filter(|s| {
            s.recorded_at
                .as_deref()
                .and_then(parse_timestamp)
                .is_some_and(|at| window.contains(now, at))
        })
        .filter_map(OccupancySnapshot::occupancy_percent)
        .collect();

    if rates.is_empty() {
        return 0.0;
    }
    rates.iter().sum::<f64>() / rates.len() as f64
}
