use std::rc::Rc;

use serde_json::Value;
use tracing::*;

use super::record::{BelongsTo, Origin, Record};
use super::registry;
use super::schema::{Association, AssociationKind};
use crate::{Error, Result};

impl Record {
    fn association(&self, name: &str, kind: AssociationKind) -> Result<&'static Association> {
        let schema = self.inner.schema;

        schema
            .association(name)
            .filter(|association| association.kind == kind)
            .ok_or_else(|| Error::UnknownAssociation {
                model: schema.name(),
                association: name.to_owned(),
            })
    }

    /// Nested record behind a has_one association. Built once and cached; writes on
    /// it are mirrored into this record's raw data.
    pub fn single(&self, name: &str) -> Result<Option<Record>> {
        let association = self.association(name, AssociationKind::HasOne)?;

        if let Some(cached) = self.inner.singles.borrow().get(association.name) {
            return Ok(Some(cached.clone()));
        }

        let nested = match self.raw(association.property) {
            Value::Object(nested) if !nested.is_empty() => nested,
            _ => return Ok(None),
        };

        let target = registry::resolve(association.class)?;
        let belongs_to = BelongsTo {
            parent: Rc::downgrade(&self.inner),
            key: association.property,
        };

        debug!(model = self.inner.schema.name(), association = association.name, "Building has_one");
        let child = Record::build(
            target,
            nested,
            Origin::Api,
            &self.inner.locale,
            Some(belongs_to),
        )?;

        self.inner
            .singles
            .borrow_mut()
            .insert(association.name, child.clone());

        Ok(Some(child))
    }

    /// Drops the cached has_one record so the next read rebuilds it.
    pub fn clear_single(&self, name: &str) -> Result<()> {
        let association = self.association(name, AssociationKind::HasOne)?;
        self.inner.singles.borrow_mut().remove(association.name);
        Ok(())
    }

    /// Records behind a has_many association. A non-empty result is cached; an empty
    /// one is rebuilt on the next read.
    pub fn many(&self, name: &str) -> Result<Vec<Record>> {
        let association = self.association(name, AssociationKind::HasMany)?;

        if let Some(cached) = self.inner.collections.borrow().get(association.name) {
            return Ok(cached.clone());
        }

        let items = match self.raw(association.property) {
            Value::Array(items) => items,
            _ => return Ok(Vec::new()),
        };

        let target = registry::resolve(association.class)?;

        debug!(model = self.inner.schema.name(), association = association.name, "Building has_many");
        let members = items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(attributes) => Some(attributes),
                _ => None,
            })
            .map(|attributes| {
                Record::build(target, attributes, Origin::Api, &self.inner.locale, None)
            })
            .collect::<Result<Vec<_>>>()?;

        if !members.is_empty() {
            self.inner
                .collections
                .borrow_mut()
                .insert(association.name, members.clone());
        }

        Ok(members)
    }

    pub fn has_many_present(&self, name: &str) -> Result<bool> {
        Ok(!self.many(name)?.is_empty())
    }

    /// Drops every association cache.
    pub fn clear_associations(&self) {
        self.inner.singles.borrow_mut().clear();
        self.inner.collections.borrow_mut().clear();
    }
}
