use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::{
    client::{data_list, ApiClient, ApiError},
    configuration::ApiEndpoints,
    credentials::Credentials,
    transport::Transport,
};

/// A room type as listed by the API, reduced to the fields our runs need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoomType {
    #[serde(rename = "roomTypeID")]
    pub room_type_id: String,
    #[serde(rename = "roomTypeName")]
    pub room_type_name: String,
    #[serde(rename = "roomTypeUnits")]
    pub room_type_units: u32,
    #[serde(rename = "maxGuests")]
    pub max_guests: u32,
}

impl RoomType {
    // Missing unit counts default to 0 and missing guest limits to 1.
    fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            room_type_id: text_field(value, "roomTypeID").unwrap_or_default(),
            room_type_name: text_field(value, "roomTypeName").unwrap_or_default(),
            room_type_units: count_field(value, "roomTypeUnits").unwrap_or(0),
            max_guests: count_field(value, "maxGuests").unwrap_or(1),
        })
    }
}

fn text_field(value: &Value, key: &str) -> Option<String> {
    match value.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn count_field(value: &Value, key: &str) -> Option<u32> {
    match value.get(key)? {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Lists the room types of the configured property. Null entries in the listing are skipped.
pub fn list_room_types<T: Transport>(
    client: &ApiClient<T>,
    endpoints: &ApiEndpoints,
    credentials: &Credentials,
) -> Result<Vec<RoomType>, ApiError> {
    let response = client.get(
        &endpoints.room_types_url(),
        &[("propertyID", credentials.property_id())],
        credentials,
    )?;
    let room_types: Vec<RoomType> = data_list(&response)
        .map(|entries| entries.iter().filter_map(RoomType::from_value).collect())
        .unwrap_or_default();
    info!(count = room_types.len(), "listed room types");
    Ok(room_types)
}

/// Checks that the credentials are accepted by listing the room types.
pub fn test_connection<T: Transport>(
    client: &ApiClient<T>,
    endpoints: &ApiEndpoints,
    credentials: &Credentials,
) -> Result<(), ApiError> {
    client
        .get(
            &endpoints.room_types_url(),
            &[("propertyID", credentials.property_id())],
            credentials,
        )
        .map(|_| ())
}
