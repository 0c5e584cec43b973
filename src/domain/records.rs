// Marketplace records as served by the remote API
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;

// `id` and `_id` may both be present; either one identifies the record.
fn record_id(id: Option<String>, object_id: Option<String>) -> Result<String, String> {
    id.or(object_id)
        .ok_or_else(|| "record has neither `id` nor `_id`".to_string())
}

#[derive(Deserialize)]
struct IdentityWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
}

// Users and spots are only counted, so only their identity is decoded.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "IdentityWire")]
pub struct User {
    #[allow(dead_code)]
    pub id: String,
}

impl TryFrom<IdentityWire> for User {
    type Error = String;

    fn try_from(wire: IdentityWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record_id(wire.id, wire.object_id)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "IdentityWire")]
pub struct ParkingSpot {
    #[allow(dead_code)]
    pub id: String,
}

impl TryFrom<IdentityWire> for ParkingSpot {
    type Error = String;

    fn try_from(wire: IdentityWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record_id(wire.id, wire.object_id)?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Pending,
    Active,
    Confirmed,
    Occupied,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl ReservationStatus {
    /// Statuses that hold a spot for the reservation's duration.
    pub fn holds_spot(self) -> bool {
        matches!(
            self,
            Self::Pending | Self::Active | Self::Confirmed | Self::Occupied
        )
    }
}

/// A spot reference: a bare id, or the spot document itself when the API
/// populates it.
#[derive(Deserialize)]
#[serde(untagged)]
enum SpotRefWire {
    Id(String),
    Populated(IdentityWire),
}

impl SpotRefWire {
    fn into_id(self) -> Option<String> {
        match self {
            Self::Id(id) => Some(id),
            Self::Populated(wire) => wire.id.or(wire.object_id),
        }
    }
}

#[derive(Deserialize)]
struct ReservationWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default, rename = "startTime", alias = "start_time")]
    start_time: Option<String>,
    #[serde(default, rename = "endTime", alias = "end_time")]
    end_time: Option<String>,
    status: ReservationStatus,
    #[serde(default, rename = "parkingSpotId", alias = "parking_spot_id")]
    parking_spot: Option<SpotRefWire>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ReservationWire")]
pub struct Reservation {
    #[allow(dead_code)]
    pub id: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub status: ReservationStatus,
    /// `None` when the reservation carries no usable spot reference.
    pub parking_spot_id: Option<String>,
}

impl TryFrom<ReservationWire> for Reservation {
    type Error = String;

    fn try_from(wire: ReservationWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record_id(wire.id, wire.object_id)?,
            start_time: wire.start_time,
            end_time: wire.end_time,
            status: wire.status,
            parking_spot_id: wire.parking_spot.and_then(SpotRefWire::into_id),
        })
    }
}

impl Reservation {
    /// The date used for windowing: start time, falling back to end time.
    ///
    /// A present but unparsable start time does not fall through to the end
    /// time; the reservation simply has no usable date.
    pub fn effective_date(&self) -> Option<DateTime<Utc>> {
        match (&self.start_time, &self.end_time) {
            (Some(start), _) => parse_timestamp(start),
            (None, Some(end)) => parse_timestamp(end),
            (None, None) => None,
        }
    }
}

#[derive(Deserialize)]
struct OccupancyWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default, rename = "recordedAt", alias = "recorded_at")]
    recorded_at: Option<String>,
    #[serde(rename = "occupiedSpots", alias = "occupied_spots")]
    occupied_spots: u64,
    #[serde(rename = "totalSpots", alias = "total_spots")]
    total_spots: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "OccupancyWire")]
pub struct OccupancySnapshot {
    #[allow(dead_code)]
    pub id: String,
    pub recorded_at: Option<String>,
    pub occupied_spots: u64,
    pub total_spots: u64,
}

impl TryFrom<OccupancyWire> for OccupancySnapshot {
    type Error = String;

    fn try_from(wire: OccupancyWire) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record_id(wire.id, wire.object_id)?,
            recorded_at: wire.recorded_at,
            occupied_spots: wire.occupied_spots,
            total_spots: wire.total_spots,
        })
    }
}

impl OccupancySnapshot {
    /// Occupied share in percent, `None` when the snapshot has no capacity.
    pub fn occupancy_percent(&self) -> Option<f64> {
        if self.total_spots == 0 {
            return None;
        }
        Some(self.occupied_spots as f64 / self.total_spots as f64 * 100.0)
    }
}

/// Parse an API timestamp. Accepts RFC 3339, naive date-times (taken as UTC)
/// and bare dates (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn reservation(start: Option<&str>, end: Option<&str>) -> Reservation {
        Reservation {
            id: "r1".to_string(),
            start_time: start.map(str::to_string),
            end_time: end.map(str::to_string),
            status: ReservationStatus::Confirmed,
            parking_spot_id: Some("s1".to_string()),
        }
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 4, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2026-03-04T10:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-04T12:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-04T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-04T10:30:00.000"), Some(expected));
        assert_eq!(
            parse_timestamp("2026-03-04"),
            Some(Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("next tuesday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_effective_date_prefers_start() {
        let r = reservation(Some("2026-03-04"), Some("2026-03-09"));
        assert_eq!(
            r.effective_date(),
            Some(Utc.with_ymd_and_hms(2026, 3, 4, 0, 0, 0).unwrap())
        );

        let r = reservation(None, Some("2026-03-09"));
        assert_eq!(
            r.effective_date(),
            Some(Utc.with_ymd_and_hms(2026, 3, 9, 0, 0, 0).unwrap())
        );

        assert_eq!(reservation(None, None).effective_date(), None);
        assert_eq!(reservation(Some("garbage"), Some("2026-03-09")).effective_date(), None);
    }

    #[test]
    fn test_reservation_wire_shape() {
        let json = r#"{
            "_id": "abc",
            "startTime": "2026-03-04T10:00:00Z",
            "status": "occupied",
            "parkingSpotId": "spot-9"
        }"#;
        let r: Reservation = serde_json::from_str(json).unwrap();
        assert_eq!(r.id, "abc");
        assert_eq!(r.status, ReservationStatus::Occupied);
        assert_eq!(r.parking_spot_id.as_deref(), Some("spot-9"));
        assert!(r.end_time.is_none());

        let r: Reservation = serde_json::from_str(
            r#"{"id": "x", "status": "rescheduled", "parking_spot_id": "s"}"#,
        )
        .unwrap();
        assert_eq!(r.status, ReservationStatus::Unknown);
        assert!(!r.status.holds_spot());
    }

    #[test]
    fn test_identity_accepts_both_id_keys() {
        let u: User = serde_json::from_str(r#"{"_id": "u1", "id": "u1"}"#).unwrap();
        assert_eq!(u.id, "u1");

        let s: ParkingSpot = serde_json::from_str(r#"{"_id": "s1"}"#).unwrap();
        assert_eq!(s.id, "s1");

        let r: Reservation = serde_json::from_str(
            r#"{"_id": "r1", "id": "r1", "status": "active", "parkingSpotId": "s1"}"#,
        )
        .unwrap();
        assert_eq!(r.id, "r1");

        let o: OccupancySnapshot = serde_json::from_str(
            r#"{"_id": "o1", "id": "o1", "occupiedSpots": 1, "totalSpots": 2}"#,
        )
        .unwrap();
        assert_eq!(o.id, "o1");

        assert!(serde_json::from_str::<User>(r#"{"name": "anonymous"}"#).is_err());
    }

    #[test]
    fn test_spot_reference_shapes() {
        let populated: Reservation = serde_json::from_str(
            r#"{"id": "r1", "status": "active", "parkingSpotId": {"_id": "s2", "title": "Garage"}}"#,
        )
        .unwrap();
        assert_eq!(populated.parking_spot_id.as_deref(), Some("s2"));

        let null: Reservation =
            serde_json::from_str(r#"{"id": "r2", "status": "active", "parkingSpotId": null}"#)
                .unwrap();
        assert_eq!(null.parking_spot_id, None);

        let missing: Reservation =
            serde_json::from_str(r#"{"id": "r3", "status": "pending"}"#).unwrap();
        assert_eq!(missing.parking_spot_id, None);
    }

    #[test]
    fn test_holds_spot() {
        assert!(ReservationStatus::Pending.holds_spot());
        assert!(ReservationStatus::Active.holds_spot());
        assert!(ReservationStatus::Confirmed.holds_spot());
        assert!(ReservationStatus::Occupied.holds_spot());
        assert!(!ReservationStatus::Completed.holds_spot());
        assert!(!ReservationStatus::Cancelled.holds_spot());
    }

    #[test]
    fn test_occupancy_percent() {
        let snapshot = OccupancySnapshot {
            id: "o1".to_string(),
            recorded_at: None,
            occupied_spots: 3,
            total_spots: 12,
        };
        assert_eq!(snapshot.occupancy_percent(), Some(25.0));

        let empty = OccupancySnapshot {
            total_spots: 0,
            ..snapshot
        };
        assert_eq!(empty.occupancy_percent(), None);
    }
}
