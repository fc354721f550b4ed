//! Security scheme definitions.

use serde_json::{Map, Value};

use hypatia_schema::Document;

/// Definition of one named security scheme, rendered into the documentation
/// tree next to the per-route requirements that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityScheme {
    /// Scheme type (`"http"`, `"apiKey"`).
    pub scheme_type: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// HTTP auth scheme (`"bearer"`) for `http` schemes.
    pub scheme: Option<String>,
    /// Bearer token format hint (`"JWT"`).
    pub bearer_format: Option<String>,
    /// Credential location (`"header"`) for `apiKey` schemes.
    pub location: Option<String>,
    /// Credential name (header name) for `apiKey` schemes.
    pub name: Option<String>,
}

impl SecurityScheme {
    /// A JWT bearer-token scheme.
    #[must_use]
    pub fn bearer() -> Self {
        Self {
            scheme_type: "http".to_string(),
            description: Some("JWT Bearer token authentication".to_string()),
            scheme: Some("bearer".to_string()),
            bearer_format: Some("JWT".to_string()),
            location: None,
            name: None,
        }
    }

    /// An API-key scheme carried in the given header.
    #[must_use]
    pub fn api_key(header_name: impl Into<String>) -> Self {
        let header_name = header_name.into();
        Self {
            scheme_type: "apiKey".to_string(),
            description: Some(format!("API key authentication via {header_name} header")),
            scheme: None,
            bearer_format: None,
            location: Some("header".to_string()),
            name: Some(header_name),
        }
    }

    /// Renders the scheme as a generic document.
    #[must_use]
    pub fn to_document(&self) -> Document {
        let mut doc = Map::new();
        doc.insert("type".into(), Value::from(self.scheme_type.clone()));
        if let Some(description) = &self.description {
            doc.insert("description".into(), Value::from(description.clone()));
        }
        if let Some(scheme) = &self.scheme {
            doc.insert("scheme".into(), Value::from(scheme.clone()));
        }
        if let Some(format) = &self.bearer_format {
            doc.insert("bearerFormat".into(), Value::from(format.clone()));
        }
        if let Some(location) = &self.location {
            doc.insert("in".into(), Value::from(location.clone()));
        }
        if let Some(name) = &self.name {
            doc.insert("name".into(), Value::from(name.clone()));
        }
        Value::Object(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bearer_scheme_document() {
        let doc = SecurityScheme::bearer().to_document();
        assert_eq!(doc["type"], json!("http"));
        assert_eq!(doc["scheme"], json!("bearer"));
        assert_eq!(doc["bearerFormat"], json!("JWT"));
    }

    #[test]
    fn test_api_key_scheme_document() {
        let doc = SecurityScheme::api_key("X-Api-Key").to_document();
        assert_eq!(doc["type"], json!("apiKey"));
        assert_eq!(doc["in"], json!("header"));
        assert_eq!(doc["name"], json!("X-Api-Key"));
    }
}
