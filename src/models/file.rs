use serde_json::Value;

use super::User;
use crate::Result;
use crate::model::Record;

fn is_image(record: &Record) -> Result<Value> {
    let image = record
        .string("mimetype")
        .is_some_and(|mimetype| mimetype.starts_with("image/"));

    Ok(Value::Bool(image))
}

crate::model! {
    /// File attached to a meeting or comment.
    pub struct FileAttachment {
        identity: "file_id",
        properties {
            file_id: Integer,
            name: String,
            description: String,
            mimetype: String,
            size: Integer,
            link: String,
            thumbnail_link: String,
            hosted_by: String,
            created_on: Datetime,
        }
        has_one {
            created_by: User,
        }
        computed {
            is_image => is_image,
        }
    }
}
