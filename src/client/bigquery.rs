//! BigQuery client module
//!
//! Provides `BigQueryClient`, a service-account authenticated client scoped to
//! one project and dataset. Every statement runs as a synchronous query job.

use crate::config::WarehouseConfig;
use crate::{Error, Result};
use gcp_bigquery_client::Client;
use gcp_bigquery_client::model::get_query_results_parameters::GetQueryResultsParameters;
use gcp_bigquery_client::model::job_reference::JobReference;
use gcp_bigquery_client::model::query_request::QueryRequest;
use gcp_bigquery_client::model::query_response::{QueryResponse, ResultSet};
use gcp_bigquery_client::yup_oauth2::ServiceAccountKey;

/// How long one request waits for a query job before it polls again
const QUERY_TIMEOUT_MS: i32 = 120_000;

/// BigQuery client for one `project.dataset`
pub struct BigQueryClient {
    client: Client,
    project_id: String,
    dataset: String,
}

impl BigQueryClient {
    /// Authenticate with the configured service-account key file
    ///
    /// # Errors
    /// Returns [`Error::Connection`] if the key file is missing or malformed, or
    /// the credentials are rejected
    pub async fn connect(config: &WarehouseConfig) -> Result<Self> {
        let path = &config.key_file;
        let key_json = std::fs::read_to_string(path).map_err(|e| {
            Error::Connection(format!(
                "Failed to read service account key '{}': {}",
                path.display(),
                e
            ))
        })?;

        let key: ServiceAccountKey = serde_json::from_str(&key_json).map_err(|e| {
            Error::Connection(format!(
                "Failed to parse service account key '{}': {}",
                path.display(),
                e
            ))
        })?;
        log::debug!("Authenticating to BigQuery as {}", key.client_email);
        let key_email = key.client_email.clone();

        let client = Client::from_service_account_key(key, false)
            .await
            .map_err(|e| {
                Error::Connection(format!("Failed to authenticate with BigQuery: {}", e))
            })?;

        let client = Self {
            client,
            project_id: config.project_id.clone(),
            dataset: config.dataset.clone(),
        };

        // the authenticator only fetches a token on the first request
        client.ping().await.map_err(|e| match e {
            Error::Load(message) => Error::Connection(format!(
                "BigQuery rejected the service account '{}': {}",
                key_email, message
            )),
            other => other,
        })?;

        Ok(client)
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Unquoted `project.dataset.table` name
    pub fn table_name(&self, table: &str) -> String {
        format!("{}.{}.{}", self.project_id, self.dataset, table)
    }

    /// Backtick-quoted `project.dataset.table` path usable in SQL
    pub fn table_path(&self, table: &str) -> String {
        crate::warehouse::quote_identifier(&self.table_name(table))
    }

    /// Run `sql` as a query job and wait for it to finish
    ///
    /// Jobs still running when the request returns are polled until BigQuery
    /// reports them complete or failed.
    ///
    /// # Errors
    /// Returns [`Error::Load`] with BigQuery's message if the job fails
    pub async fn execute(&self, sql: impl Into<String>) -> Result<ResultSet> {
        let mut request = QueryRequest::new(sql.into());
        request.timeout_ms = Some(QUERY_TIMEOUT_MS);

        let mut response = self
            .client
            .job()
            .query(&self.project_id, request)
            .await
            .map_err(|e| Error::Load(e.to_string()))?;

        while let Some((job_id, location)) =
            pending_job(response.job_complete, response.job_reference.as_ref())?
        {
            log::debug!("Waiting for BigQuery job {}", job_id);
            let parameters = GetQueryResultsParameters {
                location,
                timeout_ms: Some(QUERY_TIMEOUT_MS),
                ..Default::default()
            };
            let results = self
                .client
                .job()
                .get_query_results(&self.project_id, &job_id, parameters)
                .await
                .map_err(|e| Error::Load(format!("job {}: {}", job_id, e)))?;
            response = QueryResponse::from(results);
        }

        Ok(ResultSet::new_from_query_response(response))
    }

    /// `SELECT COUNT(*)` against `table`
    pub async fn count_rows(&self, table: &str) -> Result<u64> {
        let mut rs = self
            .execute(format!("SELECT COUNT(*) FROM {}", self.table_path(table)))
            .await?;

        if !rs.next_row() {
            return Ok(0);
        }

        let count = rs
            .get_i64(0)
            .map_err(|e| Error::Load(format!("Invalid count for '{}': {}", table, e)))?
            .unwrap_or(0);

        Ok(count.max(0) as u64)
    }

    /// Run a trivial query to prove the credentials work
    pub async fn ping(&self) -> Result<()> {
        self.execute("SELECT 1").await.map(|_| ())
    }
}

/// Job id and location of a job that has not finished yet, `None` once it is done
fn pending_job(
    job_complete: Option<bool>,
    job_reference: Option<&JobReference>,
) -> Result<Option<(String, Option<String>)>> {
    if job_complete != Some(false) {
        return Ok(None);
    }

    match job_reference.and_then(|r| r.job_id.clone()) {
        Some(job_id) => Ok(Some((
            job_id,
            job_reference.and_then(|r| r.location.clone()),
        ))),
        None => Err(Error::Load(
            "query job is still running but BigQuery returned no job id".to_string(),
        )),
    }
}
