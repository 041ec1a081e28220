//! Deployment-lifecycle request and response documents.
//!
//! The wire shape is the CloudFormation custom-resource protocol: PascalCase
//! keys, a `ResponseURL` to `PUT` the outcome to, and free-form
//! `ResourceProperties`. Both property spellings seen in deployed templates are
//! accepted (`SqlScript` / `CreateSqlDocument`, `SqlDelimiter` / `Delimiter`,
//! and so on).

use serde::{Deserialize, Serialize};

/// Lifecycle phase of a request. Types this service does not act on are kept
/// verbatim so the request can still be acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RequestType {
    Create,
    Update,
    Delete,
    Other(String),
}

impl RequestType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for RequestType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Create" => Self::Create,
            "Update" => Self::Update,
            "Delete" => Self::Delete,
            _ => Self::Other(value),
        }
    }
}

impl From<RequestType> for String {
    fn from(value: RequestType) -> Self {
        match value {
            RequestType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceProperties {
    #[serde(default, alias = "SqlScript")]
    pub create_sql_document: Option<String>,
    #[serde(default)]
    pub update_sql_document: Option<String>,
    #[serde(default, alias = "SqlDelimiter")]
    pub delimiter: Option<String>,
    #[serde(default, alias = "DatabaseName")]
    pub database: Option<String>,
    #[serde(default, alias = "DBSecretArn")]
    pub secret_arn: Option<String>,
    #[serde(default, alias = "DBClusterArn")]
    pub cluster_arn: Option<String>,
}

impl ResourceProperties {
    /// Delimiter given by the template, or `fallback` when blank or absent.
    pub fn delimiter_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.delimiter
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or(fallback)
    }

    pub fn database(&self) -> Option<&str> {
        self.database
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleRequest {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL")]
    pub response_url: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    /// Left unparsed until a phase that executes needs it
    #[serde(default)]
    pub resource_properties: serde_json::Value,
}

impl LifecycleRequest {
    /// Typed view of `ResourceProperties`; an absent object reads as empty.
    pub fn properties(&self) -> Result<ResourceProperties, serde_json::Error> {
        if self.resource_properties.is_null() {
            return Ok(ResourceProperties::default());
        }
        ResourceProperties::deserialize(&self.resource_properties)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LifecycleResponse {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl LifecycleResponse {
    /// Response skeleton echoing the identifiers of `request`.
    pub fn for_request(
        request: &LifecycleRequest,
        status: ResponseStatus,
        reason: impl Into<String>,
        physical_resource_id: impl Into<String>,
    ) -> Self {
        Self {
            status,
            reason: reason.into(),
            physical_resource_id: physical_resource_id.into(),
            stack_id: request.stack_id.clone(),
            request_id: request.request_id.clone(),
            logical_resource_id: request.logical_resource_id.clone(),
            data: serde_json::Map::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }
}
