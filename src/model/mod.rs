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

use serde::Deserialize;
use serde_json::{self as json, Map, Value};

mod accessors;
mod associations;
pub mod coerce;
mod handled;
mod json_format;
mod macros;
mod record;
mod registry;
mod schema;

pub use accessors::Attribute;
pub use handled::Handled;
pub use json_format::{JsonOptions, JsonOptionsBuilder, JsonOptionsBuilderError};
pub use record::Record;
pub use registry::{DEFAULT_NAMESPACE, resolve};
pub use schema::{
    Association, AssociationKind, AttributeKind, AttributeOption, Computed, ComputedFn,
    Property, Schema, SchemaBuilder,
};

use crate::config::Locale;
use crate::{Error, Result};

pub type Attributes = Map<String, Value>;
pub type Timestamp = chrono::DateTime<chrono::FixedOffset>;

/// A typed resource backed by a [`Record`], usually generated by [`model!`](crate::model!).
pub trait Model: Sized {
    fn schema() -> &'static Schema;

    fn from_record(record: Record) -> Self;

    fn record(&self) -> &Record;

    fn new(attributes: Attributes) -> Result<Self> {
        Record::new(Self::schema(), attributes).map(Self::from_record)
    }

    fn with_locale(attributes: Attributes, locale: &Locale) -> Result<Self> {
        Record::with_locale(Self::schema(), attributes, locale).map(Self::from_record)
    }

    /// Instance built from an API object; values are taken as already canonical.
    fn from_api(attributes: Attributes, locale: &Locale) -> Result<Self> {
        Record::from_api(Self::schema(), attributes, locale).map(Self::from_record)
    }

    /// Single instance from a response body object.
    fn member(body: Value, locale: &Locale) -> Result<Self> {
        match body {
            Value::Object(attributes) => Self::from_api(attributes, locale),
            _ => Err(Error::Other("Unexpected member response")),
        }
    }

    /// Instances from a response body array.
    fn list(body: Value, locale: &Locale) -> Result<Vec<Self>> {
        match body {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(attributes) => Self::from_api(attributes, locale),
                    _ => Err(Error::Other("Unexpected list item")),
                })
                .collect(),
            _ => Err(Error::Other("Unexpected list response")),
        }
    }

    /// Page of instances from a `{items, filtered, total}` body.
    fn collection(body: Value, locale: &Locale) -> Result<Collection<Self>> {
        let page = json::from_value::<Page>(body)?;

        let all = page
            .items
            .into_iter()
            .map(|attributes| Self::from_api(attributes, locale))
            .collect::<Result<Vec<_>>>()?;

        let count = page.filtered.unwrap_or(all.len() as u64);
        let total_count = page.total.unwrap_or(count);

        Ok(Collection {
            all,
            count,
            total_count,
        })
    }

    fn id(&self) -> Value {
        self.record().id()
    }

    fn is_new_record(&self) -> bool {
        self.record().is_new_record()
    }

    fn as_json(&self, options: &JsonOptions) -> Result<Value> {
        self.record().as_json(options)
    }
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    items: Vec<Attributes>,
    filtered: Option<u64>,
    total: Option<u64>,
}

/// One page of a collection endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    pub all: Vec<T>,

    /// Items matching the filter
    pub count: u64,

    /// Items regardless of the filter
    pub total_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tag;
    use serde_json::json;

    #[test]
    fn decodes_collections() {
        let body = json!({
            "items": [{"text": "a", "count": 1}, {"text": "b", "count": "2"}],
            "filtered": 2,
            "total": 9
        });

        let page = Tag::collection(body, &Locale::default()).unwrap();

        assert_eq!(page.all.len(), 2);
        assert_eq!(page.all[1].count(), Some(2));
        assert_eq!(page.count, 2);
        assert_eq!(page.total_count, 9);

        let page = Tag::collection(json!({"items": [{"text": "a"}]}), &Locale::default()).unwrap();
        assert_eq!((page.count, page.total_count), (1, 1));
    }

    #[test]
    fn rejects_unexpected_shapes() {
        let locale = Locale::default();

        assert!(matches!(
            Tag::member(json!([1, 2]), &locale),
            Err(Error::Other(_))
        ));
        assert!(matches!(
            Tag::list(json!({"text": "a"}), &locale),
            Err(Error::Other(_))
        ));
        assert_eq!(
            Tag::list(json!([{"text": "a"}]), &locale)
                .unwrap()
                .len(),
            1
        );
    }
}
