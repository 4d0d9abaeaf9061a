use super::{FileAttachment, User};

crate::model! {
    /// Client application a resource was created through.
    pub struct Via {
        identity: "id",
        properties {
            via_id: Integer as "id",
            auth_client_id: Integer,
            name: String,
            url: String,
            display: Boolean,
        }
    }
}

crate::model! {
    pub struct Comment {
        identity: "comment_id",
        properties {
            comment_id: Integer,
            value: String,
            rich_value: String,
            external_id: String,
            space_id: Integer,
            created_on: Datetime,
            like_count: Integer,
            is_liked: Boolean,
        }
        has_one {
            created_by: User,
            created_via: Via,
        }
        has_many {
            files: FileAttachment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use serde_json::json;

    #[test]
    fn comments_nest_their_author_and_files() {
        let comment = Comment::new(
            json!({
                "comment_id": 3,
                "value": "Looks good",
                "created_by": {"user_id": 1, "name": "Ann"},
                "created_via": {"id": 2, "name": "Podio", "display": false},
                "files": [{"file_id": 8, "name": "notes.txt"}]
            })
            .as_object()
            .cloned()
            .unwrap(),
        )
        .unwrap();

        assert_eq!(comment.value().as_deref(), Some("Looks good"));
        assert_eq!(comment.created_by().unwrap().unwrap().name().as_deref(), Some("Ann"));

        let via = comment.created_via().unwrap().unwrap();
        assert_eq!(via.via_id(), Some(2));
        assert_eq!(via.display(), Some(false));
        assert_eq!(via.id(), json!(2));

        let files = comment.files().unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_id(), Some(8));
        assert!(comment.has_files().unwrap());
    }
}
