use chrono::SecondsFormat;
use derive_builder::Builder;
use serde_json::{Map, Value};

use super::accessors::Attribute;
use super::coerce::ISO_DATE_FORMAT;
use super::record::Record;
use super::schema::AssociationKind;
use crate::Result;

/// Options of [`Record::as_json`].
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(setter(into))]
pub struct JsonOptions {
    /// Read every value through its typed getter instead of copying raw data
    #[builder(default)]
    pub formatted: bool,

    /// Inline associations when formatted
    #[builder(default = "true")]
    pub nested: bool,

    /// Extra accessors to include by name
    #[builder(default)]
    pub methods: Vec<String>,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self {
            formatted: false,
            nested: true,
            methods: Vec::new(),
        }
    }
}

impl JsonOptions {
    pub fn formatted() -> Self {
        Self {
            formatted: true,
            ..Self::default()
        }
    }

    fn without_methods(&self) -> Self {
        Self {
            methods: Vec::new(),
            ..self.clone()
        }
    }
}

impl Attribute {
    /// JSON form of a typed value. Records nest as their own JSON.
    pub fn to_json(&self, options: &JsonOptions) -> Result<Value> {
        let value = match self {
            Attribute::Value(value) => value.clone(),
            Attribute::Date(date) => Value::String(date.format(ISO_DATE_FORMAT).to_string()),
            Attribute::Datetime(datetime) => {
                Value::String(datetime.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            Attribute::One(None) => Value::Null,
            Attribute::One(Some(record)) => record.as_json(&options.without_methods())?,
            Attribute::Many(records) => {
                let nested = options.without_methods();
                Value::Array(
                    records
                        .iter()
                        .map(|record| record.as_json(&nested))
                        .collect::<Result<_>>()?,
                )
            }
        };

        Ok(value)
    }
}

impl Record {
    /// Serializes the record, see [`JsonOptions`].
    pub fn as_json(&self, options: &JsonOptions) -> Result<Value> {
        let schema = self.schema();
        let mut result = Map::new();

        if schema.identity().is_some() {
            result.insert(String::from("id"), self.id());
        }

        if options.formatted {
            for property in schema.properties() {
                let value = self.read(property.name)?.to_json(options)?;
                result.insert(property.name.to_owned(), value);
            }

            for name in schema.json_attributes() {
                let value = self.read(name)?.to_json(options)?;
                result.insert((*name).to_owned(), value);
            }

            if options.nested {
                for association in schema.associations() {
                    let value = match association.kind {
                        AssociationKind::HasOne => Attribute::One(self.single(association.name)?),
                        AssociationKind::HasMany => Attribute::Many(self.many(association.name)?),
                    };
                    result.insert(association.name.to_owned(), value.to_json(options)?);
                }
            }
        } else {
            result.extend(self.attributes());
        }

        for name in &options.methods {
            let value = self.read(name)?.to_json(options)?;
            result.insert(name.clone(), value);
        }

        Ok(Value::Object(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Locale;
    use crate::model::Model;
    use crate::models::{Meeting, Tag};
    use chrono::FixedOffset;
    use serde_json::json;

    fn meeting(value: Value) -> Record {
        Record::new(Meeting::schema(), value.as_object().cloned().unwrap()).unwrap()
    }

    #[test]
    fn unformatted_is_id_plus_raw_data() {
        let record = meeting(json!({"meeting_id": "3", "title": "Sync", "liked": "2"}));
        let json = record.as_json(&JsonOptions::default()).unwrap();

        assert_eq!(json["id"], json!(3));
        assert_eq!(json["meeting_id"], json!(3));
        assert_eq!(json["title"], json!("Sync"));
        assert_eq!(json["liked"], json!(2));
        assert_eq!(json["notes"], Value::Null);
    }

    #[test]
    fn formatted_round_trip() {
        let record = meeting(json!({
            "meeting_id": 10,
            "title": "Planning",
            "start_date": "2011-02-03",
            "subscribed": "yes",
            "created_by": {"user_id": 4, "name": "Ann"},
            "participants": [{"status": "accepted", "user": {"user_id": 5}}]
        }));
        record.set("created_on", "2011-02-03 14:05:00").unwrap();

        let json = record.as_json(&JsonOptions::formatted()).unwrap();

        assert_eq!(json["id"], json!(10));
        assert_eq!(json["start_date"], json!("2011-02-03"));
        assert_eq!(json["created_on"], json!("2011-02-03T14:05:00Z"));
        assert_eq!(json["subscribed"], json!(true));
        assert_eq!(json["rights"], json!([]));
        assert_eq!(json["created_by"]["name"], json!("Ann"));
        assert_eq!(json["created_by"]["id"], json!(4));
        assert_eq!(json["participants"][0]["status"], json!("accepted"));
        assert_eq!(json["participants"][0]["user"]["user_id"], json!(5));
        assert_eq!(json["reminder"], Value::Null);

        let rebuilt = meeting(json.clone());
        let again = rebuilt.as_json(&JsonOptions::formatted()).unwrap();
        assert_eq!(again, json);
    }

    #[test]
    fn datetimes_render_in_the_display_zone() {
        let locale = Locale {
            time_zone: FixedOffset::east_opt(3600).unwrap(),
            ..Locale::default()
        };
        let body = json!({"meeting_id": 1, "starts_on": "2011-02-03 14:00:00"});
        let record =
            Record::from_api(Meeting::schema(), body.as_object().cloned().unwrap(), &locale)
                .unwrap();

        let json = record.as_json(&JsonOptions::formatted()).unwrap();
        assert_eq!(json["starts_on"], json!("2011-02-03T15:00:00+01:00"));
    }

    #[test]
    fn not_nested_skips_associations() {
        let record = meeting(json!({"created_by": {"name": "Ann"}}));
        let options = JsonOptionsBuilder::default()
            .formatted(true)
            .nested(false)
            .build()
            .unwrap();

        let json = record.as_json(&options).unwrap();
        assert!(json.get("created_by").is_none());
        assert!(json.get("participants").is_none());
    }

    #[test]
    fn methods_are_read_by_name() {
        let record = meeting(json!({"subscribed": "1", "rights": ["view"], "participants": []}));
        let options = JsonOptionsBuilder::default()
            .methods(vec![
                String::from("subscribed?"),
                String::from("default_right"),
                String::from("participants?"),
            ])
            .build()
            .unwrap();

        let json = record.as_json(&options).unwrap();
        assert_eq!(json["subscribed?"], json!(true));
        assert_eq!(json["default_right"], json!("view"));
        assert_eq!(json["participants?"], json!(false));

        let options = JsonOptionsBuilder::default()
            .methods(vec![String::from("nope")])
            .build()
            .unwrap();
        assert!(record.as_json(&options).is_err());
    }

    #[test]
    fn models_without_identity_have_no_id() {
        let tag = Record::new(Tag::schema(), json!({"text": "a"}).as_object().cloned().unwrap())
            .unwrap();

        let json = tag.as_json(&JsonOptions::formatted()).unwrap();
        assert_eq!(json, json!({"count": null, "text": "a"}));
    }
}
