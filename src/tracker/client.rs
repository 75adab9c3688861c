use futures::future::join_all;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, error, info};
use url::Url;

use crate::config::PluginConfig;
use crate::db::ExperienceEntry;
use crate::error::UploadError;
use crate::tracker::round::{Category, RoundSnapshot};

/// Outcome of flushing one round. Informational only; nothing is retried.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub succeeded: Vec<Category>,
    pub failed: Vec<(Category, UploadError)>,
}

impl UploadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// HTTP client the plugin uses to reach the stats backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base: Url,
    api_key: String,
    debug: bool,
}

impl BackendClient {
    pub fn new(config: &PluginConfig) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(config.upload_timeout())
            .build()?;

        let mut base = Url::parse(&config.endpoint_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http,
            base,
            api_key: config.api_key.clone(),
            debug: config.debug,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, UploadError> {
        Ok(self.base.join(path)?)
    }

    pub async fn post(&self, category: Category, body: &Value) -> Result<(), UploadError> {
        let url = self.endpoint(category.path())?;
        if self.debug {
            debug!("POST {} {}", url, body);
        }

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Rejected {
                path: category.path().to_string(),
                status: status.as_u16(),
            });
        }

        if self.debug {
            let text = response.text().await.unwrap_or_default();
            debug!("{} answered {}: {}", category, status, text);
        }
        Ok(())
    }

    /// Sends every non-empty category of the round concurrently.
    pub async fn upload_round(&self, snapshot: RoundSnapshot) -> UploadReport {
        let uploads = snapshot.uploads();
        if uploads.is_empty() {
            debug!("Nothing to upload for this round");
            return UploadReport::default();
        }

        let results = join_all(uploads.iter().map(|(category, body)| async move {
            (*category, self.post(*category, body).await)
        }))
        .await;

        let mut report = UploadReport::default();
        for (category, result) in results {
            match result {
                Ok(()) => report.succeeded.push(category),
                Err(e) => {
                    error!("Failed to upload {}: {}", category, e);
                    report.failed.push((category, e));
                }
            }
        }

        info!(
            "Round upload finished: {} succeeded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        );
        report
    }

    /// Experience of each id; ids the backend does not mention count as 0.
    pub async fn fetch_experience(&self, user_ids: &[String]) -> Result<HashMap<String, i64>, UploadError> {
        let mut url = self.endpoint("public/experience")?;
        {
            let mut query = url.query_pairs_mut();
            for id in user_ids {
                query.append_pair("userId", id);
            }
        }
        if self.debug {
            debug!("GET {}", url);
        }

        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, &self.api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UploadError::Rejected {
                path: "public/experience".to_string(),
                status: status.as_u16(),
            });
        }

        let entries: Vec<ExperienceEntry> = response.json().await?;
        let found: HashMap<String, i64> = entries
            .into_iter()
            .map(|e| (e.user_id, e.experience))
            .collect();

        Ok(user_ids
            .iter()
            .map(|id| (id.clone(), found.get(id).copied().unwrap_or(0)))
            .collect())
    }
}
