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

use reqwest::StatusCode;
use serde_json::{Value, json};

use super::{Comment, FileAttachment, Recurrence, Reminder, User, Via};
use crate::config::Locale;
use crate::model::coerce::compact_nulls;
use crate::model::{Attributes, Handled, Model};
use crate::services::Connection;
use crate::{Error, Result};

crate::model! {
    /// A calendar meeting, optionally attached to another object through `ref`.
    pub struct Meeting {
        identity: "meeting_id",
        properties {
            meeting_id: Integer,
            rights: Array default right,
            title: String,
            start_date: Date,
            starts_on: Datetime [ConvertIncomingToUtc],
            ends_on: Datetime [ConvertIncomingToUtc],
            participant_ids: Array default participant_id,
            plugin: String,
            plugin_data: Hash,
            location: String,
            agenda: String,
            notes: String,
            subscribed: Boolean,
            liked: Integer,
            external_id: String,
            external_url: String,
            external_phone: String,
            external_password: String,
            external_recording_url: String,
            created_on: Datetime,
            deleted_on: Datetime,
            link: String,
            /// Object the meeting belongs to, `{type, id, ...}`
            reference: Hash as "ref",
            space_id: Integer,

            /// Only sent on creation
            ref_id: Integer,
            /// Only sent on creation
            ref_type: String,
            /// Only sent on creation
            file_ids: Array default file_id,
        }
        has_one {
            created_by: User,
            created_via: Via,
            reminder: Reminder,
            recurrence: Recurrence,
        }
        has_many {
            participants: MeetingParticipant,
            files: FileAttachment,
            comments: Comment,
        }
    }
}

crate::model! {
    /// A user invited to a meeting and their answer.
    pub struct MeetingParticipant {
        properties {
            status: String,
        }
        has_one {
            user: User,
        }
    }
}

/// Meetings of one period of a summary plus the counters sent along.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryGroup {
    pub meetings: Vec<Meeting>,
    pub extra: Attributes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MeetingSummary {
    pub past: SummaryGroup,
    pub today: SummaryGroup,
    pub future: SummaryGroup,
}

impl SummaryGroup {
    fn decode(value: Option<Value>, locale: &Locale) -> Result<Self> {
        let mut extra = match value {
            Some(Value::Object(group)) => group,
            Some(Value::Null) | None => Attributes::new(),
            Some(_) => return Err(Error::Other("Unexpected summary group")),
        };

        let meetings = match extra.remove("meetings") {
            Some(Value::Null) | None => Vec::new(),
            Some(meetings) => Meeting::list(meetings, locale)?,
        };

        Ok(Self { meetings, extra })
    }
}

impl MeetingSummary {
    fn decode(body: Value, locale: &Locale) -> Result<Self> {
        let Value::Object(mut body) = body else {
            return Err(Error::Other("Unexpected summary response"));
        };

        Ok(Self {
            past: SummaryGroup::decode(body.remove("past"), locale)?,
            today: SummaryGroup::decode(body.remove("today"), locale)?,
            future: SummaryGroup::decode(body.remove("future"), locale)?,
        })
    }
}

impl Meeting {
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn create_from(conn: &impl Connection, attributes: &Attributes) -> Result<Self> {
        let response = conn.post("/meeting/", attributes).await?;
        Self::member(response.body, conn.locale())
    }

    /// Creates a meeting attached to `{ref_type}/{ref_id}`.
    #[tracing::instrument(level = "debug", skip(conn, attributes))]
    pub async fn create_with_ref(
        conn: &impl Connection,
        ref_type: &str,
        ref_id: i64,
        attributes: &Attributes,
    ) -> Result<Self> {
        let path = format!("/meeting/{ref_type}/{ref_id}/");
        let response = conn.post(&path, attributes).await?;
        Self::member(response.body, conn.locale())
    }

    #[tracing::instrument(level = "debug", skip(conn, attributes))]
    pub async fn update_from(
        conn: &impl Connection,
        id: i64,
        attributes: &Attributes,
    ) -> Result<Self> {
        let path = format!("/meeting/{id}");
        let response = conn.put(&path, attributes).await?;
        Self::member(response.body, conn.locale())
    }

    /// Deletes a meeting, returning the response status.
    #[tracing::instrument(level = "debug", skip(conn))]
    pub async fn delete(conn: &impl Connection, id: i64) -> Result<StatusCode> {
        Ok(conn.delete(&format!("/meeting/{id}")).await?.status)
    }

    pub async fn find(conn: &impl Connection, id: i64) -> Result<Self> {
        let response = conn.get(&format!("/meeting/{id}"), []).await?;
        Self::member(response.body, conn.locale())
    }

    /// Meetings attached to `{ref_type}/{ref_id}`, filtered by `params`.
    pub async fn find_for_reference(
        conn: &impl Connection,
        ref_type: &str,
        ref_id: i64,
        params: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<Vec<Self>> {
        let path = format!("/meeting/{ref_type}/{ref_id}/");
        let response = conn.get(&path, params).await?;
        Self::list(response.body, conn.locale())
    }

    pub async fn find_all(
        conn: &impl Connection,
        params: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<Vec<Self>> {
        let response = conn.get("/meeting/", params).await?;
        Self::list(response.body, conn.locale())
    }

    pub async fn find_summary(conn: &impl Connection) -> Result<MeetingSummary> {
        let response = conn.get("/meeting/summary", []).await?;
        MeetingSummary::decode(response.body, conn.locale())
    }

    pub async fn find_summary_for_reference(
        conn: &impl Connection,
        ref_type: &str,
        ref_id: i64,
    ) -> Result<MeetingSummary> {
        let path = format!("/meeting/{ref_type}/{ref_id}/summary");
        let response = conn.get(&path, []).await?;
        MeetingSummary::decode(response.body, conn.locale())
    }

    /// Summary of the meetings the current user takes part in.
    pub async fn find_personal_summary(conn: &impl Connection) -> Result<MeetingSummary> {
        let response = conn.get("/meeting/personal/summary", []).await?;
        MeetingSummary::decode(response.body, conn.locale())
    }

    /// Answers an invitation, e.g. with `accepted` or `declined`.
    #[tracing::instrument(level = "debug", skip(conn))]
    pub async fn set_participation_status(
        conn: &impl Connection,
        id: i64,
        status: &str,
    ) -> Result<StatusCode> {
        let path = format!("/meeting/{id}/status");
        Ok(conn.post(&path, &json!({ "status": status })).await?.status)
    }

    fn required_id(&self) -> Result<i64> {
        self.meeting_id().ok_or(Error::Other("Meeting has no meeting_id"))
    }

    /// Creates this meeting on the server and refreshes it from the response.
    /// API errors are kept on the meeting.
    pub async fn create(&self, conn: &impl Connection) -> Result<Handled<()>> {
        let operation = async {
            let attributes = compact_nulls(&self.record.attributes());

            let reference = self
                .ref_type()
                .filter(|ref_type| !ref_type.trim().is_empty())
                .zip(self.ref_id());

            let created = match reference {
                Some((ref_type, ref_id)) => {
                    Self::create_with_ref(conn, &ref_type, ref_id, &attributes).await?
                }
                None => Self::create_from(conn, &attributes).await?,
            };

            self.record.replace_attributes(created.record.attributes());
            Ok::<_, Error>(())
        };

        self.record.handle_api_errors(operation).await
    }

    /// Sends every attribute and refreshes the meeting from the response.
    pub async fn update(&self, conn: &impl Connection) -> Result<()> {
        let id = self.required_id()?;

        let updated = Self::update_from(conn, id, &self.record.attributes()).await?;
        self.record.replace_attributes(updated.record.attributes());

        Ok(())
    }

    /// Deletes this meeting. API errors are kept on the meeting.
    pub async fn destroy(&self, conn: &impl Connection) -> Result<Handled<StatusCode>> {
        let id = self.required_id()?;
        self.record.handle_api_errors(Self::delete(conn, id)).await
    }

    pub fn error_code(&self) -> Option<String> {
        self.record.error_code()
    }

    pub fn error_message(&self) -> Option<String> {
        self.record.error_message()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JsonOptions;
    use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};

    fn meeting(value: Value) -> Meeting {
        Meeting::new(value.as_object().cloned().unwrap()).unwrap()
    }

    #[test]
    fn typed_accessors() {
        let meeting = meeting(json!({
            "meeting_id": "77",
            "title": "Retro",
            "subscribed": "yes",
            "liked": "",
            "participant_ids": [1, "", 2],
            "ref": {"type": "space", "id": 5},
            "start_date": "2024-03-01"
        }));

        assert_eq!(meeting.meeting_id(), Some(77));
        assert_eq!(meeting.id(), json!(77));
        assert_eq!(meeting.title().as_deref(), Some("Retro"));
        assert_eq!(meeting.subscribed(), Some(true));
        assert_eq!(meeting.liked(), None);
        assert_eq!(meeting.participant_ids(), [json!(1), json!(2)]);
        assert_eq!(meeting.reference().unwrap()["type"], json!("space"));
        assert_eq!(meeting.start_date(), NaiveDate::from_ymd_opt(2024, 3, 1));
        assert!(!meeting.is_new_record());

        meeting.set_liked("3").unwrap();
        assert_eq!(meeting.liked(), Some(3));

        meeting
            .set_ends_on(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
            .unwrap();
        assert_eq!(
            meeting.ends_on().unwrap().with_timezone(&FixedOffset::east_opt(0).unwrap()),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap().fixed_offset()
        );
    }

    #[test]
    fn associations_are_typed() {
        let meeting = meeting(json!({
            "created_by": {"user_id": 1, "name": "Ann"},
            "reminder": {"remind_delta": 10},
            "participants": [{"status": "accepted", "user": {"user_id": 2}}]
        }));

        let author = meeting.created_by().unwrap().unwrap();
        assert_eq!(author.name().as_deref(), Some("Ann"));

        // cached until cleared
        let again = meeting.created_by().unwrap().unwrap();
        assert!(author.record().ptr_eq(again.record()));
        meeting.clear_created_by().unwrap();
        let rebuilt = meeting.created_by().unwrap().unwrap();
        assert!(!author.record().ptr_eq(rebuilt.record()));

        assert_eq!(meeting.reminder().unwrap().unwrap().remind_delta(), Some(10));
        assert!(meeting.recurrence().unwrap().is_none());

        let participants = meeting.participants().unwrap();
        assert_eq!(participants[0].status().as_deref(), Some("accepted"));
        assert_eq!(participants[0].user().unwrap().unwrap().user_id(), Some(2));
        assert!(meeting.has_participants().unwrap());
        assert!(!meeting.has_comments().unwrap());
    }

    #[test]
    fn child_writes_reach_the_meeting() {
        let meeting = meeting(json!({"created_by": {"user_id": 1, "name": "Ann"}}));

        let author = meeting.created_by().unwrap().unwrap();
        author.set_name("Bea").unwrap();

        let json = meeting.as_json(&JsonOptions::default()).unwrap();
        assert_eq!(json["created_by"]["name"], json!("Bea"));

        let formatted = meeting.as_json(&JsonOptions::formatted()).unwrap();
        assert_eq!(formatted["created_by"]["name"], json!("Bea"));
    }

    #[test]
    fn empty_participants() {
        let meeting = meeting(json!({"participants": []}));

        assert!(meeting.participants().unwrap().is_empty());
        assert!(!meeting.has_participants().unwrap());
    }

    #[test]
    fn summaries_split_meetings_from_counters() {
        let body = json!({
            "past": {"meetings": [{"meeting_id": 1}], "total": 1},
            "today": {"meetings": [], "total": 0},
            "future": {"meetings": [{"meeting_id": 2}, {"meeting_id": 3}], "total": 2, "other": 4}
        });

        let summary = MeetingSummary::decode(body, &Locale::default()).unwrap();

        assert_eq!(summary.past.meetings[0].meeting_id(), Some(1));
        assert!(summary.today.meetings.is_empty());
        assert_eq!(summary.future.meetings.len(), 2);
        assert_eq!(summary.future.extra["total"], json!(2));
        assert_eq!(summary.future.extra["other"], json!(4));
        assert!(!summary.future.extra.contains_key("meetings"));

        assert!(MeetingSummary::decode(json!([]), &Locale::default()).is_err());
    }
}
