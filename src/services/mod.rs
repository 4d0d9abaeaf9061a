//
// Copyright © 2025 Hardcore Engineering Inc.
//
// Licensed under the Eclipse Public License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License. You may
// obtain a copy of the License at https://www.eclipse.org/legal/epl-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//
// See the License for the specific language governing permissions and
// limitations under the License.
//

use reqwest::{Response, StatusCode};
use reqwest_middleware::RequestBuilder;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{self as json, Map, Value};
use tracing::*;

pub mod http;

pub use http::HttpConnection;

use super::{Error, Result};
use crate::config::Locale;

pub type HttpClient = reqwest_middleware::ClientWithMiddleware;

pub(crate) trait RequestBuilderExt {
    fn send_ext(self) -> impl Future<Output = Result<Response>>;
}

impl RequestBuilderExt for RequestBuilder {
    async fn send_ext(self) -> Result<Response> {
        let response = self.send().await?;

        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await?;

            match ApiError::parse(status, &body) {
                Some(error) => Err(Error::Api(error)),
                None => Err(Error::HttpError(status, body)),
            }
        }
    }
}

pub(crate) trait ResponseExt {
    fn json_body<T: DeserializeOwned>(self) -> impl Future<Output = Result<T>>;
}

impl ResponseExt for Response {
    async fn json_body<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.text().await?;

        // DELETE and status endpoints answer with an empty body
        if body.trim().is_empty() {
            return Ok(json::from_value(Value::Null)?);
        }

        json::from_str::<T>(&body).map_err(|error| {
            error!(%body, %error);
            Error::Serde(error)
        })
    }
}

/// Error body the API sends along with a non-success status.
#[derive(Deserialize, Debug, Clone, PartialEq, thiserror::Error)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,

    pub error: String,

    #[serde(default)]
    pub error_description: Option<String>,

    #[serde(default)]
    pub error_parameters: Option<Map<String, Value>>,

    #[serde(default)]
    pub error_propagate: Option<bool>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_description {
            Some(description) => write!(f, "{} {}: {}", self.status, self.error, description),
            None => write!(f, "{} {}", self.status, self.error),
        }
    }
}

impl ApiError {
    /// Recognizes the `{error, error_description, ...}` shape, anything else is `None`.
    pub fn parse(status: StatusCode, body: &str) -> Option<Self> {
        let value = json::from_str::<Value>(body).ok()?;
        Self::from_value(status, value)
    }

    pub fn from_value(status: StatusCode, value: Value) -> Option<Self> {
        if !value.get("error").is_some_and(Value::is_string) {
            return None;
        }

        json::from_value::<ApiError>(value)
            .ok()
            .map(|error| ApiError { status, ..error })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Transport used by the resource models.
///
/// Paths are relative to the API root, e.g. `/meeting/42`. A non-success response
/// carrying the API error shape must be reported as [`Error::Api`].
#[allow(async_fn_in_trait)]
pub trait Connection {
    async fn get(
        &self,
        path: &str,
        params: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<ApiResponse>;

    async fn post<Q: Serialize>(&self, path: &str, body: &Q) -> Result<ApiResponse>;

    async fn put<Q: Serialize>(&self, path: &str, body: &Q) -> Result<ApiResponse>;

    async fn delete(&self, path: &str) -> Result<ApiResponse>;

    fn locale(&self) -> &Locale;
}
