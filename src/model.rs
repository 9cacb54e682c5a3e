//! Bus records as returned by the API and as persisted.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

pub const FIELD_ID: &str = "id";
pub const FIELD_LABEL: &str = "number";
pub const FIELD_STOPS: &str = "stops";
pub const FIELD_ROUTES: &str = "routes";
pub const FIELD_FLOW_COORDINATES: &str = "flowCoordinates";

/// One row of the bus list: just enough to request the full record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityStub {
    pub id: i64,
    /// Public route number, e.g. `"65"` or `"1A"`.
    #[serde(rename = "number", deserialize_with = "label_from_any")]
    pub label: String,
}

// Some rows carry the route number as a JSON number.
fn label_from_any<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        other => Ok(other.to_string()),
    }
}

/// Full record for one bus, kept exactly as the API returned it.
///
/// Field order is preserved so the saved document reads like the upstream
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityDetail(Map<String, Value>);

impl EntityDetail {
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn id(&self) -> Option<i64> {
        self.0.get(FIELD_ID).and_then(Value::as_i64)
    }

    pub fn label(&self) -> Option<&str> {
        self.0.get(FIELD_LABEL).and_then(Value::as_str)
    }

    /// Stop entries, or `None` when the field is absent or not an array.
    pub fn stops(&self) -> Option<&Vec<Value>> {
        self.0.get(FIELD_STOPS).and_then(Value::as_array)
    }

    /// Route entries, or `None` when the field is absent or not an array.
    pub fn routes(&self) -> Option<&Vec<Value>> {
        self.0.get(FIELD_ROUTES).and_then(Value::as_array)
    }

    /// Number of points across all route geometries.
    pub fn flow_coordinate_count(&self) -> usize {
        self.routes()
            .map(|routes| routes.iter().map(flow_coordinates_len).sum())
            .unwrap_or(0)
    }
}

/// Length of a route's `flowCoordinates` array; zero when absent.
pub fn flow_coordinates_len(route: &Value) -> usize {
    route
        .get(FIELD_FLOW_COORDINATES)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// Successfully fetched details, in listing order.
pub type ResultCollection = Vec<EntityDetail>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail(value: Value) -> EntityDetail {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_stub_reads_number_as_label() {
        let stubs: Vec<EntityStub> = serde_json::from_value(json!([
            {"id": 1, "number": "A", "carrier": "BakuBus"},
            {"id": 2, "number": 65},
        ]))
        .unwrap();

        assert_eq!(stubs[0], EntityStub { id: 1, label: "A".to_string() });
        assert_eq!(stubs[1].label, "65");
    }

    #[test]
    fn test_detail_must_be_object() {
        let result: Result<EntityDetail, _> = serde_json::from_value(json!([1, 2]));
        assert!(result.is_err());
    }

    #[test]
    fn test_detail_accessors() {
        let d = detail(json!({
            "id": 1,
            "number": "A",
            "stops": [{"stop": {"latitude": 40.1, "longitude": 49.8}}],
            "routes": [
                {"flowCoordinates": [[40.1, 49.8], [40.2, 49.9]]},
                {"flowCoordinates": [[40.3, 49.7]]},
                {"name": "no geometry"}
            ]
        }));

        assert_eq!(d.id(), Some(1));
        assert_eq!(d.label(), Some("A"));
        assert_eq!(d.stops().map(Vec::len), Some(1));
        assert_eq!(d.routes().map(Vec::len), Some(3));
        assert_eq!(d.flow_coordinate_count(), 3);
    }

    #[test]
    fn test_detail_preserves_field_order() {
        let raw = r#"{"number":"A","routes":[],"id":1,"stops":[]}"#;
        let d: EntityDetail = serde_json::from_str(raw).unwrap();
        let keys: Vec<_> = d.fields().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["number", "routes", "id", "stops"]);
        assert_eq!(serde_json::to_string(&d).unwrap(), raw);
    }

    #[test]
    fn test_non_array_collections_are_none() {
        let d = detail(json!({"id": 3, "stops": "n/a", "routes": null}));
        assert!(d.stops().is_none());
        assert!(d.routes().is_none());
        assert_eq!(d.flow_coordinate_count(), 0);
    }
}
