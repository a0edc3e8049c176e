/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust response envelopes with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use serde::{Deserialize, Serialize};

use super::serde_helpers::string_lenient;
use crate::http::{EdgexError, Result};

/// Envelope code the venue uses for a successful call
pub const SUCCESS_CODE: &str = "SUCCESS";

/// Standard `{code, data, msg, errorParam}` wrapper around every REST reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub code: String,
    pub data: Option<T>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_param: Option<serde_json::Value>,
    #[serde(default, with = "string_lenient")]
    pub request_time: String,
    #[serde(default, with = "string_lenient")]
    pub response_time: String,
    #[serde(default)]
    pub trace_id: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Convert a non-success envelope into `EdgexError::Api`
    pub fn check(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(EdgexError::api_error(
                self.code.clone(),
                self.error_param.as_ref(),
            ))
        }
    }

    /// Payload of a successful envelope
    pub fn into_data(self) -> Result<T> {
        let checked = self.check()?;
        checked
            .data
            .ok_or_else(|| EdgexError::InvalidResponse("missing data field".to_string()))
    }
}

/// Cursor-paginated list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new", alias = "list")]
    pub data_list: Vec<T>,
    #[serde(default, with = "string_lenient")]
    pub next_page_offset_data: String,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.data_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_list.is_empty()
    }

    /// Whether the venue reported another page
    pub fn has_more(&self) -> bool {
        !self.next_page_offset_data.is_empty()
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            data_list: Vec::new(),
            next_page_offset_data: String::new(),
        }
    }
}
