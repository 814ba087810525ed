use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Marker color used when a record carries none.
pub const DEFAULT_COLOR: &str = "#3388ff";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A labeled map marker persisted in the remote store.
///
/// Every `Place` carries a remote-assigned id; a marker that has not been
/// saved yet is a [`PlaceDraft`] instead, so the two states cannot be mixed
/// up in the in-memory list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_color")]
    pub color: String,
    /// RFC 3339, stamped client-side when the record was last saved.
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl Place {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.lat, self.lng)
    }
}

/// A marker the user has placed but the remote has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceDraft {
    pub name: String,
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
    pub color: String,
    pub timestamp: Option<String>,
}

impl PlaceDraft {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            name: name.into(),
            address: None,
            lat,
            lng,
            color: DEFAULT_COLOR.to_string(),
            timestamp: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.name, self.lat, self.lng)
    }

    /// Finalize the draft with the id the remote assigned.
    pub fn into_place(self, id: String) -> Place {
        Place {
            id,
            name: self.name,
            address: self.address,
            lat: self.lat,
            lng: self.lng,
            color: self.color,
            timestamp: self.timestamp,
        }
    }
}

/// Rejected input, reported before anything is sent to the remote.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("place name must not be empty")]
    EmptyName,

    #[error("coordinates out of range: ({lat}, {lng})")]
    BadCoordinates { lat: f64, lng: f64 },
}

fn validate_fields(name: &str, lat: f64, lng: f64) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
    let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);
    if !lat_ok || !lng_ok {
        return Err(ValidationError::BadCoordinates { lat, lng });
    }
    Ok(())
}

/// The spreadsheet backend has returned both string and numeric ids
/// depending on how the row was created; normalize to a string.
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Same tolerance, for envelopes where the id may be absent entirely.
pub(crate) fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_parses_string_id() {
        let json = r#"{"id":"a1b2","name":"Coffee","lat":10.77,"lng":106.70}"#;
        let place: Place = serde_json::from_str(json).unwrap();
        assert_eq!(place.id, "a1b2");
        assert_eq!(place.name, "Coffee");
    }

    #[test]
    fn test_place_parses_numeric_id() {
        // Rows created through the sheet UI carry numeric ids
        let json = r#"{"id":1712345678901,"name":"Coffee","lat":10.77,"lng":106.70}"#;
        let place: Place = serde_json::from_str(json).unwrap();
        assert_eq!(place.id, "1712345678901");
    }

    #[test]
    fn test_place_defaults_color_when_absent() {
        let json = r#"{"id":"1","name":"Pho","lat":10.0,"lng":106.0}"#;
        let place: Place = serde_json::from_str(json).unwrap();
        assert_eq!(place.color, DEFAULT_COLOR);
        assert!(place.address.is_none());
        assert!(place.timestamp.is_none());
    }

    #[test]
    fn test_place_serde_round_trip() {
        let place = Place {
            id: "7".to_string(),
            name: "Bánh mì".to_string(),
            address: Some("123 Lê Lợi".to_string()),
            lat: 10.7769,
            lng: 106.7009,
            color: "#ff6b6b".to_string(),
            timestamp: Some("2024-06-01T08:00:00+00:00".to_string()),
        };
        let json = serde_json::to_string(&place).unwrap();
        let back: Place = serde_json::from_str(&json).unwrap();
        assert_eq!(back, place);
    }

    #[test]
    fn test_draft_rejects_empty_name() {
        let draft = PlaceDraft::new("", 10.0, 106.0);
        assert_eq!(draft.validate(), Err(ValidationError::EmptyName));

        let draft = PlaceDraft::new("   ", 10.0, 106.0);
        assert_eq!(draft.validate(), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_draft_rejects_bad_coordinates() {
        assert!(PlaceDraft::new("A", f64::NAN, 106.0).validate().is_err());
        assert!(PlaceDraft::new("A", 91.0, 106.0).validate().is_err());
        assert!(PlaceDraft::new("A", 10.0, -181.0).validate().is_err());
        assert!(PlaceDraft::new("A", 10.0, f64::INFINITY).validate().is_err());
    }

    #[test]
    fn test_draft_accepts_valid_input() {
        let draft = PlaceDraft::new("Chợ Bến Thành", 10.772, 106.698);
        assert_eq!(draft.validate(), Ok(()));
        assert_eq!(draft.color, DEFAULT_COLOR);
    }

    #[test]
    fn test_draft_finalizes_into_place() {
        let mut draft = PlaceDraft::new("A", 1.0, 2.0);
        draft.timestamp = Some("2024-06-01T08:00:00+00:00".to_string());
        let place = draft.into_place("42".to_string());
        assert_eq!(place.id, "42");
        assert_eq!(place.lat, 1.0);
        assert_eq!(
            place.timestamp.as_deref(),
            Some("2024-06-01T08:00:00+00:00")
        );
    }
}
