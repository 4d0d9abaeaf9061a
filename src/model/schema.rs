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

use std::collections::HashMap;

use serde_json::Value;

use super::Record;
use super::coerce::{pluralize, singularize};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AttributeKind {
    String,
    Integer,
    Boolean,
    Date,
    Datetime,
    Array,
    Hash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AttributeOption {
    /// Datetime getter returns the stored offset instead of the display zone
    KeepTimezone,

    /// Datetime setter treats user input as display-zone time and stores UTC
    ConvertIncomingToUtc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub options: Vec<AttributeOption>,
}

impl Property {
    pub fn has(&self, option: AttributeOption) -> bool {
        self.options.contains(&option)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AssociationKind {
    HasOne,
    HasMany,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    pub name: &'static str,
    pub kind: AssociationKind,

    /// Target model, resolved through the registry on first access
    pub class: &'static str,

    /// Raw attribute the association is built from
    pub property: &'static str,
}

pub type ComputedFn = fn(&Record) -> Result<Value>;

#[derive(Debug, Clone)]
pub struct Computed {
    pub name: &'static str,
    pub read: ComputedFn,
}

/// Declared shape of a model: its properties, associations and computed attributes.
#[derive(Debug, Clone)]
pub struct Schema {
    name: &'static str,
    identity: Option<&'static str>,
    properties: Vec<Property>,
    associations: Vec<Association>,
    computed: Vec<Computed>,
    json_attributes: Vec<&'static str>,
    lookup: HashMap<String, usize>,
}

impl Schema {
    pub fn builder(name: &'static str) -> SchemaBuilder {
        SchemaBuilder {
            schema: Schema {
                name,
                identity: None,
                properties: Vec::new(),
                associations: Vec::new(),
                computed: Vec::new(),
                json_attributes: Vec::new(),
                lookup: HashMap::new(),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn identity(&self) -> Option<&'static str> {
        self.identity
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn valid_attributes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.properties.iter().map(|property| property.name)
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    pub fn json_attributes(&self) -> &[&'static str] {
        &self.json_attributes
    }

    /// Looks up a property by its name or, for arrays, its pluralized synonym.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.lookup.get(name).map(|index| &self.properties[*index])
    }

    pub fn association(&self, name: &str) -> Option<&Association> {
        self.associations
            .iter()
            .find(|association| association.name == name)
    }

    /// Association whose raw data lives under `key`.
    pub fn association_for_key(&self, key: &str) -> Option<&Association> {
        self.associations
            .iter()
            .find(|association| association.property == key || association.name == key)
    }

    pub fn computed(&self, name: &str) -> Option<&Computed> {
        self.computed.iter().find(|computed| computed.name == name)
    }

    /// Array property behind a `default_<singular>` accessor name.
    pub fn default_element_property(&self, name: &str) -> Option<&Property> {
        let singular = name.strip_prefix("default_")?;

        self.properties.iter().find(|property| {
            property.kind == AttributeKind::Array && singularize(property.name) == singular
        })
    }
}

pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    /// Property acting as the model's `id`.
    pub fn identity(mut self, name: &'static str) -> Self {
        self.schema.identity = Some(name);
        self
    }

    pub fn property(self, name: &'static str, kind: AttributeKind) -> Self {
        self.property_with(name, kind, &[])
    }

    pub fn property_with(
        mut self,
        name: &'static str,
        kind: AttributeKind,
        options: &[AttributeOption],
    ) -> Self {
        self.schema.properties.push(Property {
            name,
            kind,
            options: options.to_vec(),
        });
        self
    }

    pub fn has_one(self, name: &'static str, class: &'static str) -> Self {
        self.association(name, AssociationKind::HasOne, class, name)
    }

    pub fn has_one_as(self, name: &'static str, class: &'static str, property: &'static str) -> Self {
        self.association(name, AssociationKind::HasOne, class, property)
    }

    pub fn has_many(self, name: &'static str, class: &'static str) -> Self {
        self.association(name, AssociationKind::HasMany, class, name)
    }

    pub fn has_many_as(
        self,
        name: &'static str,
        class: &'static str,
        property: &'static str,
    ) -> Self {
        self.association(name, AssociationKind::HasMany, class, property)
    }

    fn association(
        mut self,
        name: &'static str,
        kind: AssociationKind,
        class: &'static str,
        property: &'static str,
    ) -> Self {
        self.schema.associations.push(Association {
            name,
            kind,
            class,
            property,
        });
        self
    }

    /// Derived attribute readable by name, e.g. through `JsonOptions::methods`.
    pub fn computed(mut self, name: &'static str, read: ComputedFn) -> Self {
        self.schema.computed.push(Computed { name, read });
        self
    }

    /// Includes an extra readable attribute in formatted JSON.
    pub fn output_as_json(mut self, name: &'static str) -> Self {
        if !self.schema.json_attributes.contains(&name) {
            self.schema.json_attributes.push(name);
        }
        self
    }

    pub fn build(mut self) -> Schema {
        let mut lookup = HashMap::new();

        for (index, property) in self.schema.properties.iter().enumerate() {
            lookup.insert(property.name.to_owned(), index);
        }

        for (index, property) in self.schema.properties.iter().enumerate() {
            if property.kind == AttributeKind::Array {
                let plural = pluralize(property.name);
                if plural != property.name {
                    lookup.entry(plural).or_insert(index);
                }
            }
        }

        self.schema.lookup = lookup;
        self.schema
    }
}
