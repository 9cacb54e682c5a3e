//! Advisory integrity checks on a fetched bus record.
//!
//! Nothing here rejects or modifies a record. The orchestrator logs whatever
//! comes back and keeps the record regardless.

use std::fmt;

use serde_json::Value;

use crate::model::{
    EntityDetail, FIELD_ID, FIELD_LABEL, FIELD_ROUTES, FIELD_STOPS, flow_coordinates_len,
};

/// Top-level fields every bus record should carry.
pub const REQUIRED_FIELDS: [&str; 4] = [FIELD_ID, FIELD_LABEL, FIELD_STOPS, FIELD_ROUTES];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    /// Required field absent or `null`.
    MissingField(&'static str),
    /// `stops` or `routes` present but empty. An empty `routes` array is also
    /// reported as [`ValidationWarning::NoRouteGeometry`].
    EmptyCollection(&'static str),
    /// None of the stops has both coordinates.
    NoStopCoordinates { stops: usize },
    /// None of the routes has a flow geometry.
    NoRouteGeometry { routes: usize },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationWarning::MissingField(field) => write!(f, "missing field '{field}'"),
            ValidationWarning::EmptyCollection(field) => write!(f, "field '{field}' is empty"),
            ValidationWarning::NoStopCoordinates { stops } => {
                write!(f, "no stop coordinates found ({stops} stops)")
            }
            ValidationWarning::NoRouteGeometry { routes } => {
                write!(f, "no route flow coordinates found ({routes} routes)")
            }
        }
    }
}

/// Runs every check against `detail`; all checks run even when earlier
/// ones fail.
///
/// `id` and `label` come from the bus list and are only used for logging.
pub fn check(detail: &EntityDetail, id: i64, label: &str) -> Vec<ValidationWarning> {
    let mut warnings: Vec<ValidationWarning> = REQUIRED_FIELDS
        .iter()
        .filter(|field| detail.get(field).is_none_or(Value::is_null))
        .map(|field| ValidationWarning::MissingField(*field))
        .collect();

    if let Some(stops) = detail.stops() {
        if stops.is_empty() {
            warnings.push(ValidationWarning::EmptyCollection(FIELD_STOPS));
        } else if !stops.iter().any(stop_has_coordinates) {
            warnings.push(ValidationWarning::NoStopCoordinates { stops: stops.len() });
        }
    }

    if let Some(routes) = detail.routes() {
        if routes.is_empty() {
            warnings.push(ValidationWarning::EmptyCollection(FIELD_ROUTES));
        }
        if !routes.iter().any(|route| flow_coordinates_len(route) > 0) {
            warnings.push(ValidationWarning::NoRouteGeometry {
                routes: routes.len(),
            });
        }
    }

    if !warnings.is_empty() {
        tracing::trace!(id, label, count = warnings.len(), "Validation finished");
    }
    warnings
}

fn stop_has_coordinates(entry: &Value) -> bool {
    let Some(position) = entry.get("stop") else {
        return false;
    };
    is_present(position.get("latitude")) && is_present(position.get("longitude"))
}

// Null and "" count as absent; 0.0 is a real coordinate.
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}
