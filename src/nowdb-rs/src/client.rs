use crate::{ClientError, Result};
use nowdb_core::{ClientConfig, Operation, Params, Response};
use reqwest::Client as HttpClient;

/// NowDB operation client
pub struct Client {
    config: ClientConfig,
    client: HttpClient,
}

impl Client {
    /// Create a client for the default NowDB endpoint
    pub fn new(
        token: impl Into<String>,
        project: impl Into<String>,
        app_id: impl Into<String>,
        collection: Option<String>,
    ) -> Result<Self> {
        let mut config = ClientConfig::new(token, project, app_id);
        config.collection = collection;
        Self::with_config(config)
    }

    /// Create a client from a full configuration. The base URL is checked here
    /// so a bad one fails before any request is made.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        if let Err(e) = reqwest::Url::parse(&config.base_url) {
            return Err(ClientError::InvalidBaseUrl {
                url: config.base_url.clone(),
                message: e.to_string(),
            });
        }

        let mut builder = HttpClient::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(ClientError::Config)?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn collection(&self) -> Option<&str> {
        self.config.collection.as_deref()
    }

    /// Switch the collection used by every subsequent operation
    pub fn set_active_collection(&mut self, collection: impl Into<String>) {
        self.config.collection = Some(collection.into());
    }

    /// Create a document from the given fields
    pub async fn insert(&self, fields: impl Into<Params>) -> Result<Response> {
        self.send(Operation::Insert, fields.into()).await
    }

    /// List documents in the active collection.
    /// Accepts `SelectOptions` or raw `Params` (limit, offset, order, mixin).
    pub async fn select_all(&self, options: impl Into<Params>) -> Result<Response> {
        self.send(Operation::SelectAll, options.into()).await
    }

    /// Get a document by ID
    pub async fn select_by_id(&self, id: impl AsRef<str>) -> Result<Response> {
        self.send(Operation::SelectId, Params::new().with("id", id.as_ref()))
            .await
    }

    /// Find documents whose attributes match the given values
    pub async fn select_where(&self, criteria: impl Into<Params>) -> Result<Response> {
        self.send(Operation::SelectWhere, criteria.into()).await
    }

    /// Fresh form body for one call: stored fields overlaid with the call's
    /// params. Stored config is never written to.
    fn payload(&self, params: &Params) -> Params {
        self.config.credentials().merged_over(params)
    }

    #[tracing::instrument(skip(self, params), fields(collection = self.collection().unwrap_or_default()))]
    async fn send(&self, operation: Operation, params: Params) -> Result<Response> {
        let url = self.config.endpoint(operation);
        let payload = self.payload(&params);
        tracing::debug!(url = %url, params = params.len(), "Sending operation");

        let response = self.client.post(&url).form(&payload).send().await?;
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "Received response");

        if !status.is_success() {
            return Err(ClientError::Protocol {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.text().await?;
        let decoded = Response::from_body(body, self.config.decode_policy(), operation)?;
        if decoded.is_text() {
            tracing::warn!("Response body is not JSON, returning raw text");
        }

        Ok(decoded)
    }
}
