// src/models.rs
use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Closed set of part categories offered by the storefront. The spaced
/// display names are also the wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, EnumIter)]
pub enum Category {
    Chassis,
    Engine,
    Transmission,
    Body,
    Suspension,
    Brakes,
    #[strum(serialize = "Electrical system")]
    #[serde(rename = "Electrical system")]
    ElectricalSystem,
    #[strum(serialize = "Exhaust system")]
    #[serde(rename = "Exhaust system")]
    ExhaustSystem,
    Accessories,
    #[strum(serialize = "Wheels and Tyres")]
    #[serde(rename = "Wheels and Tyres")]
    WheelsAndTyres,
}

/// One vehicle a part fits. `year` stays free-form ("2005, 2006", "All Years").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibleVehicle {
    pub make: String,
    pub model: String,
    pub year: String,
}

/// Product record as returned by `GET {base}/products/{id}`.
///
/// The catalog stores `price` and `countInStock` as numbers but the admin
/// edits them as text, so both are folded to their string form on arrival.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub name: String,
    pub slug: String,
    #[serde(deserialize_with = "string_from_scalar")]
    pub price: String,
    #[serde(default)]
    pub image: String,
    pub category: String,
    pub brand: String,
    #[serde(deserialize_with = "string_from_scalar")]
    pub count_in_stock: String,
    pub description: String,
    #[serde(default)]
    pub compatible_vehicles: Vec<CompatibleVehicle>,
}

/// Body of `PUT {base}/products/{id}`. Scalars are sent exactly as the admin
/// typed them; the catalog owns the casting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: String,
    pub slug: String,
    pub price: String,
    pub category: String,
    pub image: String,
    pub brand: String,
    pub count_in_stock: String,
    pub description: String,
    pub compatible_vehicles: Vec<CompatibleVehicle>,
}

/// Short-lived signature/timestamp pair from `GET {base}/cloudinary-sign`
/// authorizing one direct upload to the media host.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadTicket {
    pub signature: String,
    #[serde(deserialize_with = "string_from_scalar")]
    pub timestamp: String,
}

/// Accepts a JSON string or number and yields its string form. Null maps to
/// the empty string so a missing value surfaces as a required-field error
/// instead of a decode failure.
fn string_from_scalar<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}
