use std::sync::Arc;

use reqwest::Method;
use reqwest_middleware::{ClientBuilder, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{self as json, Value};
use tracing::*;
use url::Url;

use super::{ApiResponse, Connection, HttpClient, RequestBuilderExt, ResponseExt};
use crate::Result;
use crate::config::{Config, Locale};

struct HttpConnectionInner {
    base: Url,
    client: HttpClient,
    token: Option<SecretString>,
    locale: Locale,
}

/// [`Connection`] speaking JSON over reqwest, authenticated with a bearer token.
#[derive(Clone)]
pub struct HttpConnection {
    inner: Arc<HttpConnectionInner>,
}

impl HttpConnection {
    pub fn new(config: &Config) -> Self {
        let client = ClientBuilder::new(reqwest::Client::new()).build();
        Self::with_client(config, client)
    }

    pub fn with_client(config: &Config, client: HttpClient) -> Self {
        let mut base = config.api_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Self {
            inner: Arc::new(HttpConnectionInner {
                base,
                client,
                token: config.token.clone(),
                locale: config.locale(),
            }),
        }
    }

    pub fn base(&self) -> &Url {
        &self.inner.base
    }

    fn url(&self, path: &str) -> Result<Url> {
        Ok(self.inner.base.join(path.trim_start_matches('/'))?)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self.inner.client.request(method, url);

        match &self.inner.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn execute(&self, request: RequestBuilder) -> Result<ApiResponse> {
        let response = request.send_ext().await?;
        let status = response.status();
        let body = response.json_body::<Value>().await?;

        trace!(type = "json", %status, %body, "http response");

        Ok(ApiResponse { status, body })
    }
}

impl Connection for HttpConnection {
    #[tracing::instrument(level = "trace", skip(self, params), fields(method = "get"))]
    async fn get(
        &self,
        path: &str,
        params: impl IntoIterator<Item = (String, Value)>,
    ) -> Result<ApiResponse> {
        let mut url = self.url(path)?;

        let params = params.into_iter().collect::<Vec<_>>();
        if !params.is_empty() {
            let mut qp = url.query_pairs_mut();
            for (name, value) in params {
                if let Value::String(string) = &value {
                    qp.append_pair(&name, string);
                } else {
                    qp.append_pair(&name, &value.to_string());
                }
            }
        }

        trace!(%url, "http request");

        self.execute(self.request(Method::GET, url)).await
    }

    #[tracing::instrument(level = "trace", skip(self, body), fields(method = "post"))]
    async fn post<Q: Serialize>(&self, path: &str, body: &Q) -> Result<ApiResponse> {
        let url = self.url(path)?;
        let body = json::to_value(body)?;

        trace!(%url, %body, "http request");

        self.execute(self.request(Method::POST, url).json(&body))
            .await
    }

    #[tracing::instrument(level = "trace", skip(self, body), fields(method = "put"))]
    async fn put<Q: Serialize>(&self, path: &str, body: &Q) -> Result<ApiResponse> {
        let url = self.url(path)?;
        let body = json::to_value(body)?;

        trace!(%url, %body, "http request");

        self.execute(self.request(Method::PUT, url).json(&body)).await
    }

    #[tracing::instrument(level = "trace", skip(self), fields(method = "delete"))]
    async fn delete(&self, path: &str) -> Result<ApiResponse> {
        let url = self.url(path)?;

        trace!(%url, "http request");

        self.execute(self.request(Method::DELETE, url)).await
    }

    fn locale(&self) -> &Locale {
        &self.inner.locale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigBuilder;

    fn connection(api_url: &str) -> HttpConnection {
        let config = ConfigBuilder::default()
            .api_url(Url::parse(api_url).unwrap())
            .build()
            .unwrap();

        HttpConnection::new(&config)
    }

    #[test]
    fn joins_paths_below_base() {
        let check = |base: &str, path: &str, expected: &str| {
            assert_eq!(connection(base).url(path).unwrap().as_str(), expected);
        };

        check("https://api.podio.com", "/meeting/5", "https://api.podio.com/meeting/5");
        check("https://api.podio.com/", "meeting/", "https://api.podio.com/meeting/");
        check(
            "http://localhost:8080/podio",
            "/tag/app/1/top/",
            "http://localhost:8080/podio/tag/app/1/top/",
        );
    }
}
