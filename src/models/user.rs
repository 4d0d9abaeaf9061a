crate::model! {
    /// A Podio user as embedded in other resources.
    pub struct User {
        identity: "user_id",
        properties {
            user_id: Integer,
            profile_id: Integer,
            name: String,
            avatar: Integer,
            link: String,
            mail: Array plural mails default mail,
            locale: String,
            timezone: String,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use serde_json::json;

    #[test]
    fn typed_accessors() {
        let user = User::new(
            json!({"user_id": "12", "name": "Ann", "mails": ["ann@example.com", ""]})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();

        assert_eq!(user.user_id(), Some(12));
        assert_eq!(user.name().as_deref(), Some("Ann"));
        assert_eq!(user.mail(), [json!("ann@example.com")]);
        assert_eq!(user.id(), json!(12));

        user.set_avatar("7").unwrap();
        assert_eq!(user.avatar(), Some(7));
    }

    #[test]
    fn mail_synonyms() {
        let user = User::new(Default::default()).unwrap();
        assert_eq!(user.default_mail(), None);
        assert!(user.mails().is_empty());

        user.set_default_mail("ann@example.com").unwrap();
        assert_eq!(user.mails(), [json!("ann@example.com")]);

        user.set_mails(json!(["old@example.com", "alt@example.com"])).unwrap();
        user.set_default_mail("new@example.com").unwrap();
        assert_eq!(user.default_mail(), Some(json!("new@example.com")));
        assert_eq!(
            user.mail(),
            [json!("new@example.com"), json!("alt@example.com")]
        );
    }
}
