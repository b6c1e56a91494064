//! In-memory project store using DashMap, written through to SQLite.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sora_core::{ProjectAssessment, SiteAssessment, SiteInput, SoraError, SoraTables};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::persistence::{projects as projects_db, Database};

/// A project and the site inputs assessed for it, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub name: String,
    pub client: Option<String>,
    pub sites: Vec<SiteRecord>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
    pub input: SiteInput,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("project {0} not found")]
    ProjectNotFound(String),
    #[error("site {0} not found")]
    SiteNotFound(String),
    #[error(transparent)]
    Sora(#[from] SoraError),
}

/// Application state - reference tables plus the project store.
pub struct AppState {
    tables: Arc<SoraTables>,
    projects: DashMap<String, Project>,
    /// Serializes site writes per project so SQLite sees them in memory order
    site_writes: DashMap<String, Arc<Mutex<()>>>,
    database: Option<Database>,
}

impl AppState {
    pub fn new(tables: SoraTables) -> Self {
        Self {
            tables: Arc::new(tables),
            projects: DashMap::new(),
            site_writes: DashMap::new(),
            database: None,
        }
    }

    pub fn with_database(tables: SoraTables, database: Database) -> Self {
        Self {
            database: Some(database),
            ..Self::new(tables)
        }
    }

    pub fn tables(&self) -> &SoraTables {
        &self.tables
    }

    fn site_write_lock(&self, project_id: &str) -> Arc<Mutex<()>> {
        self.site_writes
            .entry(project_id.to_string())
            .or_default()
            .clone()
    }

    /// Populate the store from the database.
    pub async fn load_from_database(&self) -> anyhow::Result<()> {
        let Some(db) = &self.database else {
            return Ok(());
        };

        let projects = projects_db::load_all_projects(db.pool()).await?;
        let count = projects.len();
        for project in projects {
            for site in &project.sites {
                if let Err(err) = sora_core::assess_site(&self.tables, &site.input) {
                    tracing::warn!(
                        "Stored site {} of project {} no longer assesses: {}",
                        site.input.site_id,
                        project.project_id,
                        err
                    );
                }
            }
            self.projects.insert(project.project_id.clone(), project);
        }

        tracing::info!("Loaded {} projects from database", count);
        Ok(())
    }

    pub async fn create_project(&self, name: String, client: Option<String>) -> Project {
        let now = Utc::now();
        let project = Project {
            project_id: Uuid::new_v4().to_string(),
            name,
            client,
            sites: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.projects
            .insert(project.project_id.clone(), project.clone());

        if let Some(db) = &self.database {
            if let Err(err) = projects_db::upsert_project(db.pool(), &project).await {
                tracing::warn!("Failed to persist project {}: {}", project.project_id, err);
            }
        }

        project
    }

    pub fn list_projects(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self.projects.iter().map(|r| r.value().clone()).collect();
        projects.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        projects
    }

    pub fn get_project(&self, project_id: &str) -> Option<Project> {
        self.projects.get(project_id).map(|r| r.value().clone())
    }

    pub async fn remove_project(&self, project_id: &str) -> bool {
        let lock = self.site_write_lock(project_id);
        let _writing = lock.lock().await;
        if self.projects.remove(project_id).is_none() {
            self.site_writes.remove(project_id);
            return false;
        }

        if let Some(db) = &self.database {
            if let Err(err) = projects_db::delete_project(db.pool(), project_id).await {
                tracing::warn!("Failed to delete project {}: {}", project_id, err);
            }
        }
        self.site_writes.remove(project_id);
        true
    }

    /// Assess a site and store its inputs, replacing any site with the same id.
    ///
    /// Inputs that fail classification are never stored.
    pub async fn upsert_site(
        &self,
        project_id: &str,
        input: SiteInput,
    ) -> Result<SiteAssessment, StoreError> {
        let assessment = sora_core::assess_site(&self.tables, &input)?;
        let lock = self.site_write_lock(project_id);
        let _writing = lock.lock().await;
        let now = Utc::now();
        let record = SiteRecord {
            input,
            updated_at: now,
        };

        let (position, header) = {
            let mut project = self
                .projects
                .get_mut(project_id)
                .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
            let existing = project
                .sites
                .iter()
                .position(|site| site.input.site_id == record.input.site_id);
            let position = match existing {
                Some(index) => {
                    project.sites[index] = record.clone();
                    index
                }
                None => {
                    project.sites.push(record.clone());
                    project.sites.len() - 1
                }
            };
            project.updated_at = now;
            (position, project.clone())
        };

        if let Some(db) = &self.database {
            let pool = db.pool();
            let result = match projects_db::upsert_site(pool, project_id, position, &record).await
            {
                Ok(()) => projects_db::upsert_project(pool, &header).await,
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                tracing::warn!(
                    "Failed to persist site {} of project {}: {}",
                    record.input.site_id,
                    project_id,
                    err
                );
            }
        }

        tracing::debug!(
            "Assessed site {} of project {}: within_scope={} sail={:?}",
            record.input.site_id,
            project_id,
            assessment.within_scope,
            assessment.sail
        );
        Ok(assessment)
    }

    /// Remove a site. Later sites shift down so stored positions stay dense.
    pub async fn remove_site(&self, project_id: &str, site_id: &str) -> Result<(), StoreError> {
        let lock = self.site_write_lock(project_id);
        let _writing = lock.lock().await;
        let (removed_at, shifted) = {
            let mut project = self
                .projects
                .get_mut(project_id)
                .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
            let index = project
                .sites
                .iter()
                .position(|site| site.input.site_id == site_id)
                .ok_or_else(|| StoreError::SiteNotFound(site_id.to_string()))?;
            project.sites.remove(index);
            project.updated_at = Utc::now();
            (index, project.sites[index..].to_vec())
        };

        if let Some(db) = &self.database {
            let pool = db.pool();
            let mut result = projects_db::delete_site(pool, project_id, site_id)
                .await
                .map(|_| ());
            for (offset, record) in shifted.iter().enumerate() {
                if result.is_err() {
                    break;
                }
                result =
                    projects_db::upsert_site(pool, project_id, removed_at + offset, record).await;
            }
            if let Err(err) = result {
                tracing::warn!(
                    "Failed to delete site {} of project {}: {}",
                    site_id,
                    project_id,
                    err
                );
            }
        }
        Ok(())
    }

    /// Recompute the project assessment from its stored inputs.
    pub fn assess_project(&self, project_id: &str) -> Result<ProjectAssessment, StoreError> {
        let project = self
            .get_project(project_id)
            .ok_or_else(|| StoreError::ProjectNotFound(project_id.to_string()))?;
        let inputs: Vec<SiteInput> = project.sites.into_iter().map(|site| site.input).collect();
        Ok(sora_core::assess_project(&self.tables, &inputs)?)
    }

    /// Drop every project from memory and the database.
    pub async fn reset(&self) -> anyhow::Result<()> {
        self.projects.clear();
        if let Some(db) = &self.database {
            crate::persistence::clear_all(db.pool()).await?;
        }
        Ok(())
    }
}
