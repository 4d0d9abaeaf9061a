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

pub use reqwest::StatusCode;

mod config;
pub mod model;
pub mod models;
pub mod services;

#[doc(hidden)]
pub use paste;

pub use config::{Config, ConfigBuilder, ConfigBuilderError, Locale};
pub use model::{Collection, Handled, JsonOptions, Model, Record};
pub use services::{ApiError, ApiResponse, Connection, HttpConnection};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("ApiError: {0}")]
    Api(#[from] services::ApiError),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),

    #[error(transparent)]
    ReqwestMiddleware(#[from] reqwest_middleware::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    HttpError(reqwest::StatusCode, String),

    #[error(transparent)]
    Config(#[from] ::config::ConfigError),

    #[error("Unknown attribute {attribute} for {model}")]
    UnknownAttribute {
        model: &'static str,
        attribute: String,
    },

    #[error("Unknown association {association} for {model}")]
    UnknownAssociation {
        model: &'static str,
        association: String,
    },

    #[error("Cannot resolve model class {0:?}")]
    UnresolvedModel(String),

    #[error("{0}")]
    Other(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
