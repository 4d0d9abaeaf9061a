crate::model! {
    /// Reminder set on a meeting, in minutes before its start.
    pub struct Reminder {
        properties {
            remind_delta: Integer,
        }
    }
}

crate::model! {
    pub struct Recurrence {
        identity: "recurrence_id",
        properties {
            recurrence_id: Integer,
            name: String,
            config: Hash,
            step: Integer,
            until: Date,
        }
    }
}
