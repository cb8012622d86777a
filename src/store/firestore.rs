//! Firestore REST v1 document store

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::types::Document;

use super::DocumentStore;

const BASE_URL: &str = "https://firestore.googleapis.com/v1";
const PAGE_SIZE: u32 = 300;

/// Firestore-backed `DocumentStore`.
///
/// Authenticates with a ready-made OAuth bearer token; acquiring and
/// refreshing credentials is the caller's concern. Every operation is one
/// blocking round trip (two for create, which patches the generated id back
/// into the document) with the client's default timeout.
pub struct FirestoreStore {
    client: reqwest::Client,
    documents_url: String,
    token: String,
}

impl FirestoreStore {
    pub fn new(project_id: &str, database_id: &str, token: String) -> Self {
        Self::with_base_url(BASE_URL, project_id, database_id, token)
    }

    /// Base URL override for tests against a local emulator.
    pub fn with_base_url(
        base_url: &str,
        project_id: &str,
        database_id: &str,
        token: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            documents_url: format!(
                "{}/projects/{}/databases/{}/documents",
                base_url, project_id, database_id
            ),
            token,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.documents_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_url, collection, id)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let text = resp.text().await.unwrap_or_default();
        Err(Error::Backend(format!("Firestore error ({}): {}", status, text)))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(token) = &page_token {
                query.push(("pageToken", token.clone()));
            }

            let resp = self
                .client
                .get(self.collection_url(collection))
                .bearer_auth(&self.token)
                .query(&query)
                .send()
                .await?;
            let page: ListResponse = Self::check(resp).await?.json().await?;

            for doc in page.documents {
                documents.push(decode_document(&doc));
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let resp = self
            .client
            .get(self.document_url(collection, id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let doc: FirestoreDocument = Self::check(resp).await?.json().await?;
        Ok(Some(decode_document(&doc)))
    }

    async fn create(&self, collection: &str, doc: Document) -> Result<String> {
        let resp = self
            .client
            .post(self.collection_url(collection))
            .bearer_auth(&self.token)
            .json(&json!({ "fields": encode_fields(&doc) }))
            .send()
            .await?;
        let created: FirestoreDocument = Self::check(resp).await?.json().await?;

        let id = created
            .name
            .rsplit('/')
            .next()
            .unwrap_or_default()
            .to_string();
        if id.is_empty() {
            return Err(Error::Backend("Firestore returned no document name".into()));
        }

        // Embed the generated id into the stored document, matching the
        // `id` field the API contract exposes.
        let resp = self
            .client
            .patch(self.document_url(collection, &id))
            .bearer_auth(&self.token)
            .query(&[("updateMask.fieldPaths", "id")])
            .json(&json!({ "fields": { "id": { "stringValue": id } } }))
            .send()
            .await?;
        Self::check(resp).await?;

        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Document) -> Result<()> {
        // updateMask limits the write to the supplied fields;
        // currentDocument.exists makes Firestore reject unknown ids.
        let mut query: Vec<(&str, String)> = vec![("currentDocument.exists", "true".to_string())];
        for field in patch.keys() {
            query.push(("updateMask.fieldPaths", field.clone()));
        }

        let resp = self
            .client
            .patch(self.document_url(collection, id))
            .bearer_auth(&self.token)
            .query(&query)
            .json(&json!({ "fields": encode_fields(&patch) }))
            .send()
            .await?;
        Self::check(resp).await?;

        Ok(())
    }
}

// --- REST types ---

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: serde_json::Map<String, Value>,
}

// --- Value codec ---
//
// Firestore wraps every value in a typed envelope: {"stringValue": "..."},
// {"mapValue": {"fields": {...}}} and so on. Integers travel as strings.

fn encode_fields(doc: &Document) -> Value {
    let fields: serde_json::Map<String, Value> = doc
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Value::Object(fields)
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => {
            let fields: serde_json::Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), encode_value(v)))
                .collect();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

fn decode_document(doc: &FirestoreDocument) -> Document {
    doc.fields
        .iter()
        .map(|(k, v)| (k.clone(), decode_value(v)))
        .collect()
}

fn decode_value(value: &Value) -> Value {
    let Some(envelope) = value.as_object() else {
        return Value::Null;
    };

    if let Some(s) = envelope.get("stringValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(s) = envelope.get("integerValue").and_then(Value::as_str) {
        return s
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::Null);
    }
    if let Some(n) = envelope.get("doubleValue").and_then(Value::as_f64) {
        return serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Some(b) = envelope.get("booleanValue").and_then(Value::as_bool) {
        return Value::Bool(b);
    }
    if envelope.contains_key("nullValue") {
        return Value::Null;
    }
    if let Some(s) = envelope.get("timestampValue").and_then(Value::as_str) {
        return Value::String(s.to_string());
    }
    if let Some(array) = envelope.get("arrayValue").and_then(Value::as_object) {
        let items = array
            .get("values")
            .and_then(Value::as_array)
            .map(|values| values.iter().map(decode_value).collect())
            .unwrap_or_default();
        return Value::Array(items);
    }
    if let Some(map) = envelope.get("mapValue").and_then(Value::as_object) {
        let fields = map
            .get("fields")
            .and_then(Value::as_object)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), decode_value(v)))
                    .collect()
            })
            .unwrap_or_default();
        return Value::Object(fields);
    }

    // Unsupported types (geo points, references) degrade to null.
    Value::Null
}
