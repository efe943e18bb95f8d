//! Wire-level request and page types for catalog operations

use super::catalog::path_placeholders;
use super::types::{OperationDefinition, ParamLocation, ParamType};
use crate::error::{Error, Result};
use crate::http::RequestConfig;
use crate::pagination::{PagedRequest, PagedResponse};
use crate::types::{JsonObject, JsonValue, Method, ParamMap};
use serde::Serialize;
use std::collections::BTreeMap;

/// A list request for one catalog operation.
///
/// Path parameters are substituted when the request is built; the
/// continuation token and page-size hint are added per page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationRequest {
    /// Operation name
    pub operation: String,
    /// HTTP method
    pub method: Method,
    /// Route with path parameters substituted and encoded
    pub path: String,
    /// Non-paging query parameters
    pub query: BTreeMap<String, String>,
    /// JSON body (POST operations)
    pub body: Option<JsonObject>,
    /// Parameters as supplied by the caller
    pub params: ParamMap,
    /// Query parameter name of the continuation token
    pub token_param: String,
    /// Query parameter name of the page-size hint
    pub max_results_param: String,
    /// Continuation token for the next fetch
    pub token: Option<String>,
    /// Page-size hint
    pub max_results: Option<u32>,
}

impl OperationRequest {
    /// Build a request from caller parameters.
    ///
    /// Fails on parameters the operation does not declare, on missing
    /// required parameters and on `json` parameters that do not parse.
    pub fn build(
        definition: &OperationDefinition,
        params: &ParamMap,
        max_results: Option<u32>,
        token: Option<String>,
    ) -> Result<Self> {
        for name in params.keys() {
            if definition.param(name).is_none() {
                return Err(Error::invalid_parameter(
                    &definition.name,
                    name,
                    "not a parameter of this operation",
                ));
            }
        }
        for required in definition.required_params() {
            if params.get(&required.name).map_or(true, String::is_empty) {
                return Err(Error::missing_parameter(&definition.name, &required.name));
            }
        }

        let mut path = definition.path.clone();
        for placeholder in path_placeholders(&definition.path) {
            let value = params
                .get(placeholder)
                .ok_or_else(|| Error::missing_parameter(&definition.name, placeholder))?;
            path = path.replace(&format!("{{{placeholder}}}"), &encode_path_segment(value));
        }

        let mut query = BTreeMap::new();
        let mut body = JsonObject::new();
        for param in &definition.params {
            let Some(raw) = params.get(&param.name) else {
                continue;
            };
            match param.location {
                ParamLocation::Path => {}
                ParamLocation::Query => {
                    query.insert(param.name.clone(), raw.clone());
                }
                ParamLocation::Body => {
                    let value = match param.param_type {
                        ParamType::String => JsonValue::String(raw.clone()),
                        ParamType::Json => serde_json::from_str(raw).map_err(|e| {
                            Error::invalid_parameter(
                                &definition.name,
                                &param.name,
                                format!("expected JSON: {e}"),
                            )
                        })?,
                    };
                    body.insert(param.name.clone(), value);
                }
            }
        }

        Ok(Self {
            operation: definition.name.clone(),
            method: definition.method,
            path,
            query,
            body: (definition.method == Method::POST).then_some(body),
            params: params.clone(),
            token_param: definition.token_param.clone(),
            max_results_param: definition.max_results_param.clone(),
            token,
            max_results,
        })
    }

    /// HTTP request settings for the current page
    pub fn to_request_config(&self) -> RequestConfig {
        let mut config = RequestConfig::new();
        for (key, value) in &self.query {
            config = config.query(key, value);
        }
        if let Some(token) = &self.token {
            config = config.query(&self.token_param, token);
        }
        if let Some(max) = self.max_results {
            config = config.query(&self.max_results_param, max.to_string());
        }
        if let Some(body) = &self.body {
            config = config.json(JsonValue::Object(body.clone()));
        }
        config
    }
}

impl PagedRequest for OperationRequest {
    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    fn max_results(&self) -> Option<u32> {
        self.max_results
    }
}

/// Percent-encode a value for use as a single path segment
fn encode_path_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// One page of a catalog operation's JSON response
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPage {
    body: JsonValue,
    items_field: String,
    next_token_field: String,
}

impl JsonPage {
    /// Wrap a response body, checking the paging fields have the expected shape.
    ///
    /// A missing or null items field is an empty page.
    pub fn from_body(body: JsonValue, definition: &OperationDefinition) -> Result<Self> {
        let Some(object) = body.as_object() else {
            return Err(Error::decode(format!(
                "{}: expected a JSON object, got {}",
                definition.name,
                type_name(&body)
            )));
        };

        match object.get(&definition.items_field) {
            None | Some(JsonValue::Null | JsonValue::Array(_)) => {}
            Some(other) => {
                return Err(Error::decode(format!(
                    "{}: field '{}' should be an array, got {}",
                    definition.name,
                    definition.items_field,
                    type_name(other)
                )))
            }
        }
        match object.get(&definition.next_token_field) {
            None | Some(JsonValue::Null | JsonValue::String(_)) => {}
            Some(other) => {
                return Err(Error::decode(format!(
                    "{}: field '{}' should be a string, got {}",
                    definition.name,
                    definition.next_token_field,
                    type_name(other)
                )))
            }
        }

        Ok(Self {
            body,
            items_field: definition.items_field.clone(),
            next_token_field: definition.next_token_field.clone(),
        })
    }

    /// Consume the page, returning the response body
    pub fn into_body(self) -> JsonValue {
        self.body
    }
}

impl PagedResponse for JsonPage {
    type Item = JsonValue;

    fn next_token(&self) -> Option<&str> {
        self.body.get(&self.next_token_field).and_then(JsonValue::as_str)
    }

    fn take_items(&mut self) -> Vec<JsonValue> {
        match self.body.get_mut(&self.items_field).map(JsonValue::take) {
            Some(JsonValue::Array(items)) => items,
            _ => Vec::new(),
        }
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
