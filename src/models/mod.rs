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

use crate::model::{Model, Schema};

mod comment;
mod file;
mod meeting;
mod reminder;
mod tag;
mod user;

pub use comment::{Comment, Via};
pub use file::FileAttachment;
pub use meeting::{Meeting, MeetingParticipant, MeetingSummary, SummaryGroup};
pub use reminder::{Recurrence, Reminder};
pub use tag::Tag;
pub use user::User;

/// Models reachable by association class name.
pub(crate) const CATALOGUE: &[(&str, fn() -> &'static Schema)] = &[
    ("Comment", <Comment as Model>::schema),
    ("FileAttachment", <FileAttachment as Model>::schema),
    ("Meeting", <Meeting as Model>::schema),
    ("MeetingParticipant", <MeetingParticipant as Model>::schema),
    ("Recurrence", <Recurrence as Model>::schema),
    ("Reminder", <Reminder as Model>::schema),
    ("Tag", <Tag as Model>::schema),
    ("User", <User as Model>::schema),
    ("Via", <Via as Model>::schema),
];
