// Dashboard counters derived from cached collections
use serde::Serialize;

/// One counter's state. `Ready(0)` (loaded, nothing there) and `Error`
/// (failed to load) are deliberately distinct.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "camelCase")]
pub enum MetricState<T> {
    Loading,
    Ready(T),
    Error(String),
}

impl<T> MetricState<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub total_users: MetricState<u64>,
    pub total_parking_spots: MetricState<u64>,
    pub active_reservations_in_window: MetricState<u64>,
    pub total_reservations_in_window: MetricState<u64>,
    pub occupancy_rate_in_window: MetricState<f64>,
}

impl DerivedMetrics {
    pub fn loading() -> Self {
        Self {
            total_users: MetricState::Loading,
            total_parking_spots: MetricState::Loading,
            active_reservations_in_window: MetricState::Loading,
            total_reservations_in_window: MetricState::Loading,
            occupancy_rate_in_window: MetricState::Loading,
        }
    }

    pub fn errored_counters(&self) -> usize {
        [
            self.total_users.is_error(),
            self.total_parking_spots.is_error(),
            self.active_reservations_in_window.is_error(),
            self.total_reservations_in_window.is_error(),
            self.occupancy_rate_in_window.is_error(),
        ]
        .into_iter()
        .filter(|errored| *errored)
        .count()
    }

    /// Every counter flagged with the same error.
    pub fn failed(message: &str) -> Self {
        Self {
            total_users: MetricState::Error(message.to_string()),
            total_parking_spots: MetricState::Error(message.to_string()),
            active_reservations_in_window: MetricState::Error(message.to_string()),
            total_reservations_in_window: MetricState::Error(message.to_string()),
            occupancy_rate_in_window: MetricState::Error(message.to_string()),
        }
    }
}
