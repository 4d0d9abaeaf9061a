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

use serde_json::Value;

use crate::Result;
use crate::model::{Attributes, Model};
use crate::services::Connection;

crate::model! {
    /// A tag and how often it is used.
    pub struct Tag {
        properties {
            count: Integer,
            text: String,
        }
    }
}

impl Tag {
    /// Tags the object `{tagable_type}/{tagable_id}`, returning the raw response body.
    #[tracing::instrument(level = "debug", skip(conn, attributes))]
    pub async fn create(
        conn: &impl Connection,
        tagable_type: &str,
        tagable_id: i64,
        attributes: &Value,
    ) -> Result<Value> {
        let path = format!("/tag/{tagable_type}/{tagable_id}/");
        Ok(conn.post(&path, attributes).await?.body)
    }

    /// Replaces the tags of `{tagable_type}/{tagable_id}`.
    #[tracing::instrument(level = "debug", skip(conn, attributes))]
    pub async fn update(
        conn: &impl Connection,
        tagable_type: &str,
        tagable_id: i64,
        attributes: &Value,
    ) -> Result<Value> {
        let path = format!("/tag/{tagable_type}/{tagable_id}/");
        Ok(conn.put(&path, attributes).await?.body)
    }

    pub async fn find_by_app(
        conn: &impl Connection,
        app_id: i64,
        limit: u32,
        text: Option<&str>,
    ) -> Result<Vec<Self>> {
        let path = format!("/tag/app/{app_id}/");
        let response = conn.get(&path, search_params(limit, text)).await?;

        Self::list(response.body, conn.locale())
    }

    /// Most used tags of an app, as the raw response body.
    pub async fn find_top_by_app(
        conn: &impl Connection,
        app_id: i64,
        limit: u32,
        text: Option<&str>,
    ) -> Result<Value> {
        let path = format!("/tag/app/{app_id}/top/");
        Ok(conn.get(&path, search_params(limit, text)).await?.body)
    }

    /// Record fields as a plain JSON object.
    pub fn attributes(&self) -> Attributes {
        self.record.attributes()
    }
}

fn search_params(limit: u32, text: Option<&str>) -> Vec<(String, Value)> {
    let mut params = vec![(String::from("limit"), Value::from(limit))];

    if let Some(text) = text {
        params.push((String::from("text"), Value::from(text)));
    }

    params
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn count_is_an_integer() {
        let tag = Tag::new(json!({"text": "rust", "count": "3"}).as_object().cloned().unwrap())
            .unwrap();

        assert_eq!(tag.count(), Some(3));
        assert_eq!(tag.text().as_deref(), Some("rust"));
        assert_eq!(tag.attributes()["count"], json!(3));
    }

    #[test]
    fn search_params_skip_missing_text() {
        assert_eq!(search_params(5, None), [(String::from("limit"), json!(5))]);
        assert_eq!(search_params(5, Some("a b")).len(), 2);
    }
}
