//! Core types for Dealdesk
//!
//! Listings and advisor requests are free-form documents owned by the
//! document store. The structs here name the fields the handlers actually
//! read and keep everything else in a flattened residual map, so arbitrary
//! extra fields round-trip untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON document as stored in (and returned by) the document store.
pub type Document = serde_json::Map<String, Value>;

/// A property listing.
///
/// Only `address`, `price` and `dealType` are ever required, and only by the
/// AI Q&A prompt. Everything else is passed through as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Price as submitted: callers send numbers or numeric strings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub extra: Document,
}

impl Property {
    /// Convert into the document shape the store persists.
    pub fn into_document(self) -> Document {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Document::new(),
        }
    }
}

/// A request for expert review of a property, linking a user to a listing.
///
/// `propertyId` and `userId` are foreign keys by identifier string only;
/// nothing enforces that the referenced documents exist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Lifecycle status. Forced to "pending" on create; any caller value is
    /// accepted on update.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// Server-assigned creation timestamp (RFC 3339), overwriting any
    /// caller-supplied value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(flatten)]
    pub extra: Document,
}

impl AdvisorRequest {
    pub fn into_document(self) -> Document {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Document::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn property_round_trips_extra_fields() {
        let input = json!({
            "address": "12 Elm St",
            "price": 250000,
            "dealType": "Fix & Flip",
            "iqScore": 87,
            "images": ["a.jpg", "b.jpg"]
        });

        let property: Property = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(property.address.as_deref(), Some("12 Elm St"));
        assert_eq!(property.extra.get("iqScore"), Some(&json!(87)));

        let back = serde_json::to_value(&property).unwrap();
        assert_eq!(back, input);
    }

    #[test]
    fn advisor_request_keeps_unknown_fields() {
        let input = json!({
            "propertyId": "p1",
            "userId": "u1",
            "message": "please review",
            "status": "approved"
        });

        let request: AdvisorRequest = serde_json::from_value(input).unwrap();
        assert_eq!(request.property_id.as_deref(), Some("p1"));
        assert_eq!(request.status.as_deref(), Some("approved"));
        assert_eq!(
            request.extra.get("message"),
            Some(&json!("please review"))
        );
    }

    #[test]
    fn into_document_uses_wire_names() {
        let request = AdvisorRequest {
            property_id: Some("p1".into()),
            status: Some("pending".into()),
            ..Default::default()
        };

        let doc = request.into_document();
        assert!(doc.contains_key("propertyId"));
        assert!(doc.contains_key("status"));
        assert!(!doc.contains_key("property_id"));
    }
}
