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

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use super::coerce::{
    ISO_DATE_FORMAT, db_format, is_iso_date, is_present, local_to_utc, parse_date,
    parse_datetime, parse_local_datetime, to_boolean, to_integer, to_text,
};
use super::record::{Origin, Record};
use super::schema::{AssociationKind, AttributeKind, AttributeOption, Property};
use crate::{Error, Result};

/// Typed result of reading an attribute by name, before JSON formatting.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Value(Value),
    Date(NaiveDate),
    Datetime(DateTime<FixedOffset>),
    One(Option<Record>),
    Many(Vec<Record>),
}

impl Record {
    fn property(&self, name: &str) -> Result<&'static Property> {
        let schema = self.inner.schema;

        schema.property(name).ok_or_else(|| Error::UnknownAttribute {
            model: schema.name(),
            attribute: name.to_owned(),
        })
    }

    /// Raw value behind a property name or synonym.
    fn stored(&self, name: &str) -> Value {
        let key = self
            .inner
            .schema
            .property(name)
            .map_or(name, |property| property.name);

        self.raw(key)
    }

    pub fn string(&self, name: &str) -> Option<String> {
        to_text(&self.stored(name))
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        to_integer(&self.stored(name))
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        to_boolean(&self.stored(name))
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        parse_date(&self.stored(name))
    }

    /// Stored datetime, shown in the locale's time zone unless the property keeps
    /// its own offset.
    pub fn datetime(&self, name: &str) -> Option<DateTime<FixedOffset>> {
        let datetime = parse_datetime(&self.stored(name))?;

        let convert = self
            .inner
            .schema
            .property(name)
            .is_none_or(|property| !property.has(AttributeOption::KeepTimezone));

        if convert {
            Some(datetime.with_timezone(&self.inner.locale.time_zone))
        } else {
            Some(datetime)
        }
    }

    /// Stored list, never `None`.
    pub fn array(&self, name: &str) -> Vec<Value> {
        match self.stored(name) {
            Value::Array(items) => items,
            _ => Vec::new(),
        }
    }

    pub fn hash(&self, name: &str) -> Option<Map<String, Value>> {
        match self.stored(name) {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Sets a declared property through its kind's coercion.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let property = self.property(name)?;
        let value = self.coerce(property, value.into(), Origin::User);
        self.store(property.name, value, true);
        Ok(())
    }

    pub fn set_date(&self, name: &str, date: NaiveDate) -> Result<()> {
        let property = self.property(name)?;
        let value = Value::String(date.format(ISO_DATE_FORMAT).to_string());
        self.store(property.name, value, true);
        Ok(())
    }

    /// Stores an absolute instant in canonical UTC form.
    pub fn set_datetime<Tz: TimeZone>(&self, name: &str, datetime: DateTime<Tz>) -> Result<()> {
        let property = self.property(name)?;
        self.store(property.name, Value::String(db_format(&datetime)), true);
        Ok(())
    }

    /// Stores a wall-clock time. Properties converting incoming values read it in the
    /// display zone, the rest read it as UTC.
    pub fn set_local_datetime(&self, name: &str, datetime: NaiveDateTime) -> Result<()> {
        let property = self.property(name)?;

        let local = property
            .has(AttributeOption::ConvertIncomingToUtc)
            .then(|| local_to_utc(&datetime, &self.inner.locale.time_zone))
            .flatten();
        let utc = local.unwrap_or_else(|| Utc.from_utc_datetime(&datetime));

        self.store(property.name, Value::String(db_format(&utc)), true);
        Ok(())
    }

    pub(super) fn coerce(&self, property: &Property, value: Value, origin: Origin) -> Value {
        match property.kind {
            AttributeKind::String | AttributeKind::Hash => value,
            AttributeKind::Integer => to_integer(&value).map_or(Value::Null, Value::from),
            AttributeKind::Boolean => to_boolean(&value).map_or(Value::Null, Value::Bool),
            AttributeKind::Date => self.coerce_date(value),
            AttributeKind::Datetime => self.coerce_datetime(property, value, origin),
            AttributeKind::Array => match value {
                Value::Array(items) => Value::Array(items.into_iter().filter(is_present).collect()),
                other => other,
            },
        }
    }

    fn coerce_date(&self, value: Value) -> Value {
        let Some(text) = to_text(&value) else {
            return Value::Null;
        };

        if is_present(&value) && !is_iso_date(&text) {
            match NaiveDate::parse_from_str(text.trim(), &self.inner.locale.date_format) {
                Ok(date) => Value::String(date.format(ISO_DATE_FORMAT).to_string()),
                Err(_) => Value::String(text),
            }
        } else {
            Value::String(text)
        }
    }

    fn coerce_datetime(&self, property: &Property, value: Value, origin: Origin) -> Value {
        if property.has(AttributeOption::ConvertIncomingToUtc)
            && origin == Origin::User
            && is_present(&value)
        {
            let utc = value
                .as_str()
                .and_then(|text| parse_local_datetime(text, &self.inner.locale.time_zone));

            if let Some(utc) = utc {
                return Value::String(db_format(&utc));
            }
        }

        to_text(&value).map_or(Value::Null, Value::String)
    }

    /// First element of an array property, if present.
    pub fn default_element(&self, name: &str) -> Option<Value> {
        self.array(name).into_iter().next().filter(is_present)
    }

    /// Replaces the first element of an array property, or starts a one-element list.
    pub fn set_default_element(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let property = self.property(name)?;
        self.put_default_element(property, value.into(), true);
        Ok(())
    }

    pub(super) fn put_default_element(&self, property: &Property, value: Value, propagate: bool) {
        let mut items = match self.raw(property.name) {
            Value::Array(items) if items.first().is_some_and(is_present) => items,
            _ => Vec::new(),
        };

        match items.first_mut() {
            Some(first) => *first = value,
            None => items.push(value),
        }

        items.retain(|item| !item.is_null());
        self.store(property.name, Value::Array(items), propagate);
    }

    /// Reads `key` out of the hash property `hash`, creating an empty hash first.
    pub fn delegated(&self, hash: &str, key: &str) -> Result<Value> {
        let property = self.property(hash)?;

        if !self.raw(property.name).is_object() {
            self.store(property.name, Value::Object(Map::new()), true);
        }

        let key = key.trim_end_matches(['?', '!']);
        Ok(self.raw(property.name).get(key).cloned().unwrap_or(Value::Null))
    }

    pub fn set_delegated(&self, hash: &str, key: &str, value: impl Into<Value>) -> Result<()> {
        let property = self.property(hash)?;

        let mut object = match self.raw(property.name) {
            Value::Object(object) => object,
            _ => Map::new(),
        };

        object.insert(key.trim_end_matches(['?', '!']).to_owned(), value.into());
        self.store(property.name, Value::Object(object), true);
        Ok(())
    }

    fn typed(&self, property: &Property) -> Attribute {
        let name = property.name;

        match property.kind {
            AttributeKind::String => Attribute::Value(self.raw(name)),
            AttributeKind::Integer => {
                Attribute::Value(self.integer(name).map_or(Value::Null, Value::from))
            }
            AttributeKind::Boolean => {
                Attribute::Value(self.boolean(name).map_or(Value::Null, Value::Bool))
            }
            AttributeKind::Date => self
                .date(name)
                .map_or(Attribute::Value(Value::Null), Attribute::Date),
            AttributeKind::Datetime => self
                .datetime(name)
                .map_or(Attribute::Value(Value::Null), Attribute::Datetime),
            AttributeKind::Array => Attribute::Value(Value::Array(self.array(name))),
            AttributeKind::Hash => {
                Attribute::Value(self.hash(name).map_or(Value::Null, Value::Object))
            }
        }
    }

    /// Reads any declared name: `id`, properties and their synonyms, `<boolean>?`,
    /// `<has_many>?`, associations, computed attributes and `default_<singular>`.
    pub fn read(&self, name: &str) -> Result<Attribute> {
        let schema = self.inner.schema;

        if name == "id" && schema.identity().is_some() {
            return Ok(Attribute::Value(self.id()));
        }

        if let Some(property) = schema.property(name) {
            return Ok(self.typed(property));
        }

        if let Some(stem) = name.strip_suffix('?') {
            if let Some(property) = schema.property(stem) {
                return Ok(Attribute::Value(
                    self.boolean(property.name).map_or(Value::Null, Value::Bool),
                ));
            }

            if schema
                .association(stem)
                .is_some_and(|association| association.kind == AssociationKind::HasMany)
            {
                return Ok(Attribute::Value(Value::Bool(self.has_many_present(stem)?)));
            }
        }

        if let Some(association) = schema.association(name) {
            return match association.kind {
                AssociationKind::HasOne => Ok(Attribute::One(self.single(name)?)),
                AssociationKind::HasMany => Ok(Attribute::Many(self.many(name)?)),
            };
        }

        if let Some(computed) = schema.computed(name) {
            return Ok(Attribute::Value((computed.read)(self)?));
        }

        if let Some(property) = schema.default_element_property(name) {
            return Ok(Attribute::Value(
                self.default_element(property.name).unwrap_or(Value::Null),
            ));
        }

        Err(Error::UnknownAttribute {
            model: schema.name(),
            attribute: name.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use crate::model::Model;
    use crate::models::Meeting;
    use serde_json::json;

    fn meeting() -> Record {
        Record::new(Meeting::schema(), Map::new()).unwrap()
    }

    #[test]
    fn integer_accessors() {
        let record = meeting();

        record.set("space_id", "42").unwrap();
        assert_eq!(record.integer("space_id"), Some(42));
        assert_eq!(record.raw("space_id"), json!(42));

        record.set("space_id", 17).unwrap();
        assert_eq!(record.integer("space_id"), Some(17));

        for blank in [json!(""), json!("  "), json!(null)] {
            record.set("space_id", blank).unwrap();
            assert_eq!(record.integer("space_id"), None);
            assert_eq!(record.raw("space_id"), Value::Null);
        }
    }

    #[test]
    fn boolean_accessors() {
        let record = meeting();

        for truthy in ["Yes", "TRUE", "1"] {
            record.set("subscribed", truthy).unwrap();
            assert_eq!(record.boolean("subscribed"), Some(true), "{truthy}");
        }

        for falsy in ["no", "0", "whatever"] {
            record.set("subscribed", falsy).unwrap();
            assert_eq!(record.boolean("subscribed"), Some(false), "{falsy}");
        }

        record.set("subscribed", false).unwrap();
        assert_eq!(record.raw("subscribed"), json!(false));
        assert_eq!(record.boolean("subscribed"), Some(false));

        record.set("subscribed", "").unwrap();
        assert_eq!(record.boolean("subscribed"), None);
        assert_eq!(record.raw("subscribed"), Value::Null);
    }

    #[test]
    fn array_accessors() {
        let record = meeting();

        assert_eq!(record.array("participant_ids"), Vec::<Value>::new());

        record
            .set("participant_ids", json!([1, "", null, 2, "  ", 3]))
            .unwrap();
        assert_eq!(record.array("participant_ids"), [json!(1), json!(2), json!(3)]);
    }

    #[test]
    fn default_element_accessors() {
        let record = meeting();

        assert_eq!(record.default_element("rights"), None);

        record.set_default_element("rights", "view").unwrap();
        assert_eq!(record.array("rights"), [json!("view")]);

        record.set("rights", json!(["view", "edit"])).unwrap();
        record.set_default_element("rights", "delete").unwrap();
        assert_eq!(record.array("rights"), [json!("delete"), json!("edit")]);
        assert_eq!(record.default_element("rights"), Some(json!("delete")));

        record.set_default_element("rights", Value::Null).unwrap();
        assert_eq!(record.array("rights"), [json!("edit")]);

        assert!(matches!(
            record.read("default_right").unwrap(),
            Attribute::Value(value) if value == json!("edit")
        ));
    }

    #[test]
    fn date_accessors() {
        let locale = Locale {
            date_format: String::from("%d/%m/%Y"),
            ..Locale::default()
        };
        let record = Record::with_locale(Meeting::schema(), Map::new(), &locale).unwrap();

        record.set("start_date", "24/12/2024").unwrap();
        assert_eq!(record.raw("start_date"), json!("2024-12-24"));
        assert_eq!(record.date("start_date"), NaiveDate::from_ymd_opt(2024, 12, 24));

        record.set("start_date", "2025-01-02").unwrap();
        assert_eq!(record.raw("start_date"), json!("2025-01-02"));

        record.set("start_date", "next tuesday").unwrap();
        assert_eq!(record.raw("start_date"), json!("next tuesday"));
        assert_eq!(record.date("start_date"), None);

        record
            .set_date("start_date", NaiveDate::from_ymd_opt(2011, 2, 3).unwrap())
            .unwrap();
        assert_eq!(record.raw("start_date"), json!("2011-02-03"));
    }

    #[test]
    fn datetime_accessors_convert_between_zones() {
        let locale = Locale {
            time_zone: FixedOffset::east_opt(2 * 3600).unwrap(),
            ..Locale::default()
        };
        let record = Record::with_locale(Meeting::schema(), Map::new(), &locale).unwrap();

        // user input is local time for starts_on
        record.set("starts_on", "2011-02-03 14:00:00").unwrap();
        assert_eq!(record.raw("starts_on"), json!("2011-02-03 12:00:00"));
        assert_eq!(
            record.datetime("starts_on").unwrap().to_rfc3339(),
            "2011-02-03T14:00:00+02:00"
        );

        // created_on does not convert incoming values
        record.set("created_on", "2011-02-03 14:00:00").unwrap();
        assert_eq!(record.raw("created_on"), json!("2011-02-03 14:00:00"));

        let naive = NaiveDate::from_ymd_opt(2011, 2, 3)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        record.set_local_datetime("ends_on", naive).unwrap();
        assert_eq!(record.raw("ends_on"), json!("2011-02-03 07:30:00"));

        record
            .set_datetime("created_on", Utc.with_ymd_and_hms(2020, 5, 1, 8, 0, 0).unwrap())
            .unwrap();
        assert_eq!(record.raw("created_on"), json!("2020-05-01 08:00:00"));
    }

    #[test]
    fn api_values_are_not_converted() {
        let locale = Locale {
            time_zone: FixedOffset::east_opt(2 * 3600).unwrap(),
            ..Locale::default()
        };
        let body = json!({"starts_on": "2011-02-03 14:00:00"});
        let record = Record::from_api(
            Meeting::schema(),
            body.as_object().cloned().unwrap(),
            &locale,
        )
        .unwrap();

        assert_eq!(record.raw("starts_on"), json!("2011-02-03 14:00:00"));
    }

    #[test]
    fn keep_timezone_skips_display_conversion() {
        static STAMPED: std::sync::LazyLock<crate::model::Schema> =
            std::sync::LazyLock::new(|| {
                crate::model::Schema::builder("Stamped")
                    .property_with(
                        "kept",
                        AttributeKind::Datetime,
                        &[AttributeOption::KeepTimezone],
                    )
                    .property("shown", AttributeKind::Datetime)
                    .build()
            });

        let locale = Locale {
            time_zone: FixedOffset::east_opt(2 * 3600).unwrap(),
            ..Locale::default()
        };
        let body = json!({
            "kept": "2020-05-01T08:00:00+05:00",
            "shown": "2020-05-01T08:00:00+05:00"
        });
        let record =
            Record::from_api(&STAMPED, body.as_object().cloned().unwrap(), &locale).unwrap();

        let kept = record.datetime("kept").unwrap();
        assert_eq!(kept.offset().local_minus_utc(), 5 * 3600);
        assert_eq!(kept.to_rfc3339(), "2020-05-01T08:00:00+05:00");

        let shown = record.datetime("shown").unwrap();
        assert_eq!(shown.offset().local_minus_utc(), 2 * 3600);
        assert_eq!(shown.to_rfc3339(), "2020-05-01T05:00:00+02:00");
        assert_eq!(kept, shown);
    }

    #[test]
    fn hash_delegation() {
        let record = meeting();

        assert_eq!(record.delegated("ref", "type").unwrap(), Value::Null);
        assert_eq!(record.raw("ref"), json!({}));

        record.set_delegated("ref", "type", "space").unwrap();
        record.set_delegated("ref", "id", 9).unwrap();
        assert_eq!(record.hash("ref").unwrap()["type"], json!("space"));
        assert_eq!(record.delegated("ref", "id?").unwrap(), json!(9));
    }

    #[test]
    fn unknown_names_fail() {
        let record = meeting();

        assert!(matches!(
            record.set("nope", 1),
            Err(Error::UnknownAttribute { model: "Meeting", .. })
        ));
        assert!(matches!(
            record.read("nope"),
            Err(Error::UnknownAttribute { .. })
        ));
    }
}
