//! JSON-RPC 2.0 message types
//!
//! Requests carry a numeric id; responses echo it with either `result` or
//! `error`. Application error codes live in the server-defined range below
//! -32000 and map one-to-one onto `ServiceError` variants.

use crate::services::ServiceError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// Standard JSON-RPC codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Application codes
pub const NOT_FOUND: i32 = -32000;
pub const VALIDATION_ERROR: i32 = -32001;
pub const DUPLICATE_REGISTRATION: i32 = -32002;
pub const STORE_UNAVAILABLE: i32 = -32003;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: u64, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: u64, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error(message: String) -> Self {
        Self::new(PARSE_ERROR, message)
    }

    pub fn invalid_request(message: String) -> Self {
        Self::new(INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(METHOD_NOT_FOUND, format!("Method not found: {}", method))
    }

    pub fn invalid_params(message: String) -> Self {
        Self::new(INVALID_PARAMS, message)
    }

    pub fn internal_error(message: String) -> Self {
        Self::new(INTERNAL_ERROR, message)
    }

    pub fn not_found(message: String) -> Self {
        Self::new(NOT_FOUND, message)
    }
}

impl From<ServiceError> for RpcError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::NotFound { kind, id } => {
                Self::not_found(message).with_data(json!({ "kind": kind, "id": id }))
            }
            ServiceError::ValidationFailed { errors } => {
                Self::new(VALIDATION_ERROR, message).with_data(json!({ "errors": errors }))
            }
            ServiceError::DuplicateRegistration { namespace, id } => {
                Self::new(DUPLICATE_REGISTRATION, message)
                    .with_data(json!({ "namespace": namespace, "id": id }))
            }
            ServiceError::StoreUnavailable(_) => Self::new(STORE_UNAVAILABLE, message),
            ServiceError::Serialization(_) => Self::internal_error(message),
        }
    }
}
