//! Outlet and catchment records as returned by the backend.

use serde::{Deserialize, Deserializer, Serialize};

/// Backend identifier for an outlet.
///
/// The backend is free to send either a JSON number or a string; both are kept
/// in their textual form since the id is only ever echoed back in a URL path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OutletId(String);

impl OutletId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OutletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OutletId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<i64> for OutletId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for OutletId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A physical store location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlet {
    pub id: OutletId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Service tags in backend order, e.g. `"Drive-Thru"`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub services: Vec<String>,
}

impl Outlet {
    /// Returns the outlet's coordinates when both are usable for plotting.
    ///
    /// Missing, non-finite, and zero values all count as unset; the backend
    /// uses `0` for outlets it could not geocode.
    #[must_use]
    pub fn position(&self) -> Option<LatLng> {
        let usable = |v: Option<f64>| v.filter(|x| x.is_finite() && *x != 0.0);
        Some(LatLng::new(
            usable(self.latitude)?,
            usable(self.longitude)?,
        ))
    }
}

/// A secondary point associated with an outlet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatchmentPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl CatchmentPoint {
    #[must_use]
    pub const fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn outlet_id_accepts_number_and_string() {
        let from_num: OutletId = serde_json::from_value(json!(42)).unwrap();
        let from_str: OutletId = serde_json::from_value(json!("kl-7")).unwrap();
        assert_eq!(from_num.as_str(), "42");
        assert_eq!(from_str.as_str(), "kl-7");
    }

    #[test]
    fn outlet_deserializes_full_record() {
        let outlet: Outlet = serde_json::from_value(json!({
            "id": 3,
            "name": "McDonald's Bukit Bintang",
            "address": "Jalan Bukit Bintang, Kuala Lumpur",
            "latitude": 3.146,
            "longitude": 101.711,
            "services": ["24 Hours", "WiFi"]
        }))
        .unwrap();

        assert_eq!(outlet.id, OutletId::from(3));
        assert_eq!(outlet.services, vec!["24 Hours", "WiFi"]);
        assert_eq!(outlet.position(), Some(LatLng::new(3.146, 101.711)));
    }

    #[test]
    fn outlet_tolerates_null_fields() {
        let outlet: Outlet = serde_json::from_value(json!({
            "id": "x",
            "name": "Somewhere",
            "address": "Unknown",
            "latitude": null,
            "longitude": 101.0,
            "services": null
        }))
        .unwrap();

        assert!(outlet.services.is_empty());
        assert_eq!(outlet.position(), None);
    }

    #[test]
    fn position_treats_zero_and_nan_as_unset() {
        let mut outlet: Outlet = serde_json::from_value(json!({
            "id": 1, "latitude": 0.0, "longitude": 101.0
        }))
        .unwrap();
        assert_eq!(outlet.position(), None);

        outlet.latitude = Some(f64::NAN);
        assert_eq!(outlet.position(), None);

        outlet.latitude = Some(3.1);
        assert_eq!(outlet.position(), Some(LatLng::new(3.1, 101.0)));
    }

    #[test]
    fn catchment_point_ignores_extra_fields() {
        let point: CatchmentPoint = serde_json::from_value(json!({
            "latitude": 3.1, "longitude": 101.6, "name": "Residence"
        }))
        .unwrap();
        assert_eq!(point.position(), LatLng::new(3.1, 101.6));
    }
}
