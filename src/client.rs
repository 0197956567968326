//! Main engine client with builder pattern.
//!
//! Provides the primary interface for connecting to a Trino or Presto
//! coordinator and executing statements.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::auth::AuthProvider;
use crate::error::{Result, TrinoLinkError};
use crate::headers::HeaderFlavor;
use crate::registry;
use crate::statement::{insert_header, StatementBuilder};
use crate::transport::{Transport, DEFAULT_QUERY_TIMEOUT};

/// Main engine client.
///
/// Use [`TrinoClientBuilder`] to construct instances with custom
/// configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use trino_link::TrinoClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = TrinoClient::builder()
///     .base_url("http://localhost:8080")
///     .user("alice")
///     .catalog("hive")
///     .schema("default")
///     .build()?;
///
/// let mut rows = client.query("SELECT 1").await?;
/// while let Some(row) = rows.next_row().await? {
///     println!("{:?}", row);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TrinoClient {
    base_url: String,
    transport: Transport,
    flavor: HeaderFlavor,
    base_headers: HeaderMap,
}

impl TrinoClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> TrinoClientBuilder {
        TrinoClientBuilder::new()
    }

    /// Begin building a statement execution.
    ///
    /// # Example
    /// ```rust,no_run
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = trino_link::TrinoClient::builder().base_url("http://localhost:8080").user("alice").build()?;
    /// let mut rows = client
    ///     .statement("SELECT * FROM nation WHERE regionkey = ?")
    ///     .param(3i64)
    ///     .execute()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn statement(&self, sql: impl Into<String>) -> StatementBuilder<'_> {
        StatementBuilder::new(self, sql.into())
    }

    /// Submit a statement with no bound arguments and no overrides.
    pub async fn query(&self, sql: impl Into<String>) -> Result<crate::cursor::RowCursor> {
        self.statement(sql).execute().await
    }

    /// The statement protocol has no transaction surface.
    pub fn begin_transaction(&self) -> Result<()> {
        Err(TrinoLinkError::Unsupported("transactions"))
    }

    /// Header namespace this client speaks.
    pub fn flavor(&self) -> HeaderFlavor {
        self.flavor
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.transport
    }

    pub(crate) fn base_headers(&self) -> &HeaderMap {
        &self.base_headers
    }
}

/// Builder for configuring [`TrinoClient`] instances.
pub struct TrinoClientBuilder {
    base_url: Option<String>,
    flavor: HeaderFlavor,
    user: Option<String>,
    source: String,
    catalog: Option<String>,
    schema: Option<String>,
    session_properties: Vec<(String, String)>,
    auth: AuthProvider,
    query_timeout: Duration,
    custom_client: Option<String>,
    http_client: Option<reqwest::Client>,
}

impl TrinoClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            flavor: HeaderFlavor::Trino,
            user: None,
            source: "trino-link".to_string(),
            catalog: None,
            schema: None,
            session_properties: Vec::new(),
            auth: AuthProvider::none(),
            query_timeout: DEFAULT_QUERY_TIMEOUT,
            custom_client: None,
            http_client: None,
        }
    }

    /// Set the coordinator URL, e.g. `http://localhost:8080`
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Select the header namespace (`X-Trino-*` or `X-Presto-*`)
    pub fn flavor(mut self, flavor: HeaderFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    /// Set the user statements run as
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the source reported to the engine (defaults to `trino-link`)
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the default catalog for unqualified table names
    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Set the default schema for unqualified table names
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Add a session property sent with every statement
    pub fn session_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.session_properties.push((key.into(), value.into()));
        self
    }

    /// Set authentication credentials
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use trino_link::{TrinoClient, AuthProvider};
    ///
    /// # fn example() -> trino_link::Result<()> {
    /// let client = TrinoClient::builder()
    ///     .base_url("https://trino.example.com")
    ///     .user("alice")
    ///     .auth(AuthProvider::basic("alice", "secret"))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn auth(mut self, auth: AuthProvider) -> Self {
        self.auth = auth;
        self
    }

    /// Default per-request timeout when an execution carries no deadline
    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    /// Use a preregistered HTTP client from the process-wide registry
    /// (see [`register_custom_client`](crate::registry::register_custom_client))
    pub fn custom_client(mut self, key: impl Into<String>) -> Self {
        self.custom_client = Some(key.into());
        self
    }

    /// Use this HTTP client instead of building one
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<TrinoClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| TrinoLinkError::Configuration("base_url is required".into()))?;

        let http_client = if let Some(client) = self.http_client {
            client
        } else if let Some(key) = &self.custom_client {
            registry::custom_client(key).ok_or_else(|| {
                TrinoLinkError::Configuration(format!("no custom client registered as {:?}", key))
            })?
        } else {
            // Keep-alive pooling: one coordinator serves every page fetch of
            // an execution, so idle connections are worth holding on to.
            reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(10))
                .pool_max_idle_per_host(10)
                .pool_idle_timeout(Duration::from_secs(90))
                .build()
                .map_err(|e| TrinoLinkError::Configuration(e.to_string()))?
        };

        let mut base_headers = HeaderMap::new();
        if let Some(user) = &self.user {
            insert_header(&mut base_headers, self.flavor.user(), user)?;
        }
        insert_header(&mut base_headers, self.flavor.source(), &self.source)?;
        if let Some(catalog) = &self.catalog {
            insert_header(&mut base_headers, self.flavor.catalog(), catalog)?;
        }
        if let Some(schema) = &self.schema {
            insert_header(&mut base_headers, self.flavor.schema(), schema)?;
        }
        if !self.session_properties.is_empty() {
            let joined = self
                .session_properties
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(",");
            insert_header(&mut base_headers, self.flavor.session(), &joined)?;
        }
        self.auth.apply_to_headers(&mut base_headers)?;

        Ok(TrinoClient {
            base_url,
            transport: Transport::new(http_client, self.query_timeout),
            flavor: self.flavor,
            base_headers,
        })
    }
}
