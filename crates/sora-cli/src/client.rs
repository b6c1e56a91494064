//! HTTP client for the SORA server.

use anyhow::{bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sora_core::{ProjectAssessment, SiteAssessment, SiteInput};

/// Client for a running SORA server.
pub struct SoraClient {
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct CreateProjectRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedProject {
    pub project_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ProjectView {
    pub project_id: String,
    pub name: String,
    pub assessment: ProjectAssessment,
}

impl SoraClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a project and return its server-assigned id.
    pub async fn create_project(&self, name: &str, client: Option<&str>) -> Result<CreatedProject> {
        let url = format!("{}/v1/projects", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&CreateProjectRequest { name, client })
            .send()
            .await
            .context("Failed to create project")?;
        read_json(response).await
    }

    /// Store a site in a project and return its assessment.
    pub async fn put_site(&self, project_id: &str, input: &SiteInput) -> Result<SiteAssessment> {
        if input.site_id.trim().is_empty() {
            bail!("site input has no site_id");
        }
        let url = format!(
            "{}/v1/projects/{}/sites/{}",
            self.base_url, project_id, input.site_id
        );
        let response = self
            .client
            .put(&url)
            .json(input)
            .send()
            .await
            .with_context(|| format!("Failed to submit site {}", input.site_id))?;
        read_json(response).await
    }

    pub async fn get_project(&self, project_id: &str) -> Result<ProjectView> {
        let url = format!("{}/v1/projects/{}", self.base_url, project_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to fetch project")?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        bail!("Server returned {}: {}", status, text);
    }
    response.json().await.context("Failed to decode server response")
}
