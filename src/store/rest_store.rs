use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use spdlog::debug;

use crate::error::BlogError;
use crate::post::{PostTypeRow, RawPost, TopicRow};
use crate::store::{ContentStore, POSTS_TABLE, POST_TYPES_TABLE, TOPICS_TABLE};

/// Error body returned by the REST layer of the store
#[derive(Deserialize, Debug)]
struct RestError {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// [`ContentStore`] over the PostgREST interface (`{url}/rest/v1/{table}`)
pub struct RestStore {
    client: Client,
    base: Url,
    key: String,
}

impl RestStore {
    pub fn new(url: &str, key: String, timeout: Option<Duration>) -> Result<Self, BlogError> {
        if key.is_empty() {
            return Err(BlogError::Config("store key is empty".to_string()));
        }

        let mut base = Url::parse(url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut builder = Client::builder().user_agent(concat!("folio/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(RestStore {
            client: builder.build()?,
            base,
            key,
        })
    }

    fn table_url(&self, table: &str, query: &[(&str, String)]) -> Result<Url, BlogError> {
        let mut url = self.base.join(&format!("rest/v1/{}", table))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<T>, BlogError> {
        let url = self.table_url(table, query)?;
        debug!("Querying {} {:?}", table, query);

        let resp = self.client.get(url)
            .header("apikey", &self.key)
            .bearer_auth(&self.key)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Self::store_error(status, &body));
        }

        Ok(resp.json::<Vec<T>>().await?)
    }

    fn store_error(status: StatusCode, body: &str) -> BlogError {
        match serde_json::from_str::<RestError>(body) {
            Ok(err) => {
                let code = err.code.unwrap_or_else(|| status.as_u16().to_string());
                let mut message = err.message.unwrap_or_else(|| status.to_string());
                if let Some(details) = err.details {
                    message = format!("{} ({})", message, details);
                }
                if let Some(hint) = err.hint {
                    message = format!("{}. Hint: {}", message, hint);
                }
                BlogError::Store { code, message }
            }
            Err(_) => BlogError::store(status.as_u16().to_string(), body.to_string()),
        }
    }

    fn eq(value: &str) -> String {
        format!("eq.{}", value)
    }
}

#[async_trait]
impl ContentStore for RestStore {
    async fn fetch_posts(&self, limit: Option<usize>) -> Result<Vec<RawPost>, BlogError> {
        let mut query = vec![("select", "*".to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }
        self.select(POSTS_TABLE, &query).await
    }

    async fn fetch_post(&self, id: &str) -> Result<Option<RawPost>, BlogError> {
        let query = [
            ("select", "*".to_string()),
            ("id", Self::eq(id)),
            ("limit", "1".to_string()),
        ];
        let rows: Vec<RawPost> = self.select(POSTS_TABLE, &query).await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_post_types(&self, post_id: Option<&str>) -> Result<Vec<PostTypeRow>, BlogError> {
        let mut query = vec![("select", "*".to_string())];
        if let Some(post_id) = post_id {
            query.push(("post_id", Self::eq(post_id)));
        }
        self.select(POST_TYPES_TABLE, &query).await
    }

    async fn fetch_topics(&self, post_id: Option<&str>) -> Result<Vec<TopicRow>, BlogError> {
        let mut query = vec![("select", "*".to_string())];
        if let Some(post_id) = post_id {
            query.push(("post_id", Self::eq(post_id)));
        }
        self.select(TOPICS_TABLE, &query).await
    }

    async fn ping(&self) -> Result<(), BlogError> {
        let query = [("select", "id".to_string()), ("limit", "1".to_string())];
        let _: Vec<serde_json::Value> = self.select(POSTS_TABLE, &query).await?;
        Ok(())
    }

    fn host(&self) -> String {
        self.base.host_str().unwrap_or("invalid url").to_string()
    }
}
