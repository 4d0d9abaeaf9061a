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

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};
use tracing::*;

use super::coerce::{any_present_recursive, is_blank, to_integer, to_text};
use super::registry;
use super::schema::{AssociationKind, AttributeKind, Schema};
use crate::Result;
use crate::config::Locale;
use crate::services::ApiError;

/// Where constructor values come from. API values are already in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Origin {
    User,
    Api,
}

/// Parent link of a has_one child: writes on the child are mirrored into
/// `parent[key]`.
pub(super) struct BelongsTo {
    pub(super) parent: Weak<Inner>,
    pub(super) key: &'static str,
}

pub(super) struct Inner {
    pub(super) schema: &'static Schema,
    pub(super) locale: Locale,
    pub(super) attributes: RefCell<Map<String, Value>>,
    pub(super) belongs_to: Option<BelongsTo>,
    pub(super) singles: RefCell<HashMap<&'static str, Record>>,
    pub(super) collections: RefCell<HashMap<&'static str, Vec<Record>>>,
    pub(super) error: RefCell<Option<ApiError>>,
}

/// A model instance: raw API-shaped attributes plus the schema that types them.
///
/// `Record` is a handle. Clones share the same attribute store, so the record
/// returned twice from a cached association is the same instance
/// (see [`Record::ptr_eq`]). Records are not `Send`.
#[derive(Clone)]
pub struct Record {
    pub(super) inner: Rc<Inner>,
}

impl Record {
    /// Builds a record from user-supplied attributes.
    pub fn new(schema: &'static Schema, attributes: Map<String, Value>) -> Result<Self> {
        Self::build(schema, attributes, Origin::User, &Locale::default(), None)
    }

    pub fn with_locale(
        schema: &'static Schema,
        attributes: Map<String, Value>,
        locale: &Locale,
    ) -> Result<Self> {
        Self::build(schema, attributes, Origin::User, locale, None)
    }

    /// Builds a record from a decoded API body.
    pub fn from_api(
        schema: &'static Schema,
        attributes: Map<String, Value>,
        locale: &Locale,
    ) -> Result<Self> {
        Self::build(schema, attributes, Origin::Api, locale, None)
    }

    pub(super) fn build(
        schema: &'static Schema,
        attributes: Map<String, Value>,
        origin: Origin,
        locale: &Locale,
        belongs_to: Option<BelongsTo>,
    ) -> Result<Self> {
        let store = schema
            .valid_attributes()
            .map(|name| (name.to_owned(), Value::Null))
            .collect();

        let record = Self {
            inner: Rc::new(Inner {
                schema,
                locale: locale.clone(),
                attributes: RefCell::new(store),
                belongs_to,
                singles: RefCell::new(HashMap::new()),
                collections: RefCell::new(HashMap::new()),
                error: RefCell::new(None),
            }),
        };

        for (key, value) in attributes {
            record.assign(key, value, origin)?;
        }

        Ok(record)
    }

    fn assign(&self, key: String, value: Value, origin: Origin) -> Result<()> {
        let schema = self.inner.schema;

        if let Some(property) = schema.property(&key) {
            let value = self.coerce(property, value, origin);
            self.store(property.name, value, false);
        } else if let Some(property) = schema.default_element_property(&key) {
            self.put_default_element(property, value, false);
        } else if let Some(association) = schema.association_for_key(&key) {
            let value = match (association.kind, value) {
                // run nested values through the target's setters, keep them only if
                // something survives
                (AssociationKind::HasOne, Value::Object(nested)) => {
                    let target = registry::resolve(association.class)?;
                    let child = Self::build(target, nested, origin, &self.inner.locale, None)?;
                    let normalized = Value::Object(child.attributes());

                    if any_present_recursive(&normalized) {
                        normalized
                    } else {
                        Value::Null
                    }
                }

                (_, value) => value,
            };

            self.store(&key, value, false);
        } else {
            debug!(model = schema.name(), %key, "Dropping undeclared attribute");
        }

        Ok(())
    }

    pub(super) fn store(&self, key: &str, value: Value, propagate: bool) {
        if propagate {
            self.propagate(key, &value);
        }

        self.inner
            .attributes
            .borrow_mut()
            .insert(key.to_owned(), value);
    }

    fn propagate(&self, key: &str, value: &Value) {
        let Some(belongs_to) = &self.inner.belongs_to else {
            return;
        };

        if is_blank(value) {
            return;
        }

        let Some(parent) = belongs_to.parent.upgrade() else {
            return;
        };

        let mut attributes = parent.attributes.borrow_mut();
        let slot = attributes
            .entry(belongs_to.key)
            .or_insert_with(|| Value::Object(Map::new()));

        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }

        if let Value::Object(object) = slot {
            object.insert(key.to_owned(), value.clone());
        }
    }

    pub fn schema(&self) -> &'static Schema {
        self.inner.schema
    }

    pub fn locale(&self) -> &Locale {
        &self.inner.locale
    }

    /// Snapshot of the raw attribute map.
    pub fn attributes(&self) -> Map<String, Value> {
        self.inner.attributes.borrow().clone()
    }

    /// Raw stored value, `null` when absent.
    pub fn raw(&self, key: &str) -> Value {
        self.inner
            .attributes
            .borrow()
            .get(key)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Writes a raw value, bypassing coercion. Present values are mirrored into
    /// the owning parent.
    pub fn write(&self, key: &str, value: impl Into<Value>) {
        self.store(key, value.into(), true);
    }

    /// Replaces the raw attributes, e.g. with a server response, and drops
    /// association caches.
    pub fn replace_attributes(&self, attributes: Map<String, Value>) {
        *self.inner.attributes.borrow_mut() = attributes;
        self.clear_associations();
    }

    pub fn ptr_eq(&self, other: &Record) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Value of the identity property, `null` for models without one.
    pub fn id(&self) -> Value {
        let schema = self.inner.schema;
        let Some(property) = schema.identity().and_then(|name| schema.property(name)) else {
            return Value::Null;
        };

        let raw = self.raw(property.name);
        match property.kind {
            AttributeKind::Integer => to_integer(&raw).map_or(Value::Null, Value::from),
            _ => raw,
        }
    }

    pub fn is_new_record(&self) -> bool {
        is_blank(&self.id())
    }

    pub fn is_persisted(&self) -> bool {
        !self.is_new_record()
    }

    pub fn to_param(&self) -> Option<String> {
        to_text(&self.id())
    }

    /// Model name as the API spells reference types, e.g. `meeting`.
    pub fn api_friendly_ref_type(&self) -> String {
        self.inner.schema.name().to_lowercase()
    }

    pub fn api_error(&self) -> Option<ApiError> {
        self.inner.error.borrow().clone()
    }

    pub fn error_code(&self) -> Option<String> {
        self.inner
            .error
            .borrow()
            .as_ref()
            .map(|error| error.error.clone())
    }

    pub fn error_message(&self) -> Option<String> {
        self.inner
            .error
            .borrow()
            .as_ref()
            .and_then(|error| error.error_description.clone())
    }

    /// Parameters of the last captured error, `{}` when the server sent none.
    pub fn error_parameters(&self) -> Option<Map<String, Value>> {
        self.inner
            .error
            .borrow()
            .as_ref()
            .map(|error| error.error_parameters.clone().unwrap_or_default())
    }

    pub fn propagate_error(&self) -> bool {
        self.inner
            .error
            .borrow()
            .as_ref()
            .and_then(|error| error.error_propagate)
            .unwrap_or(false)
    }

    pub(super) fn capture_error(&self, error: ApiError) {
        *self.inner.error.borrow_mut() = Some(error);
    }

    pub fn clear_errors(&self) {
        *self.inner.error.borrow_mut() = None;
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        let id = self.id();
        !is_blank(&id) && id == other.id()
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(self.inner.schema.name())
            .field("attributes", &self.inner.attributes.borrow())
            .finish()
    }
}
