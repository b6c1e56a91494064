//! Project and site input persistence operations.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sora_core::SiteInput;
use sqlx::SqlitePool;
use std::collections::HashMap;

use crate::state::{Project, SiteRecord};

/// Upsert a project header (sites are written separately).
pub async fn upsert_project(pool: &SqlitePool, project: &Project) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO projects (project_id, name, client, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(project_id) DO UPDATE SET
            name = ?2, client = ?3, updated_at = ?5
        "#,
    )
    .bind(&project.project_id)
    .bind(&project.name)
    .bind(&project.client)
    .bind(project.created_at.to_rfc3339())
    .bind(project.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Upsert one site input at its position within the project.
pub async fn upsert_site(
    pool: &SqlitePool,
    project_id: &str,
    position: usize,
    site: &SiteRecord,
) -> Result<()> {
    let input_json = serde_json::to_string(&site.input)?;

    sqlx::query(
        r#"
        INSERT INTO site_inputs (project_id, site_id, position, input, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(project_id, site_id) DO UPDATE SET
            position = ?3, input = ?4, updated_at = ?5
        "#,
    )
    .bind(project_id)
    .bind(&site.input.site_id)
    .bind(position as i64)
    .bind(&input_json)
    .bind(site.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a project and all of its site inputs.
pub async fn delete_project(pool: &SqlitePool, project_id: &str) -> Result<bool> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM site_inputs WHERE project_id = ?1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;
    let result = sqlx::query("DELETE FROM projects WHERE project_id = ?1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(result.rows_affected() > 0)
}

/// Delete one site input.
pub async fn delete_site(pool: &SqlitePool, project_id: &str, site_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM site_inputs WHERE project_id = ?1 AND site_id = ?2")
        .bind(project_id)
        .bind(site_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all projects with their site inputs in stored order.
pub async fn load_all_projects(pool: &SqlitePool) -> Result<Vec<Project>> {
    let project_rows = sqlx::query_as::<_, ProjectRow>(
        "SELECT project_id, name, client, created_at, updated_at FROM projects",
    )
    .fetch_all(pool)
    .await?;

    let site_rows = sqlx::query_as::<_, SiteRow>(
        "SELECT project_id, site_id, position, input, updated_at FROM site_inputs ORDER BY project_id, position",
    )
    .fetch_all(pool)
    .await?;

    let mut sites: HashMap<String, Vec<SiteRecord>> = HashMap::new();
    for row in site_rows {
        let project_id = row.project_id.clone();
        let record: SiteRecord = row.try_into()?;
        sites.entry(project_id).or_default().push(record);
    }

    Ok(project_rows
        .into_iter()
        .map(|row| {
            let sites = sites.remove(&row.project_id).unwrap_or_default();
            Project {
                created_at: parse_timestamp(&row.created_at),
                updated_at: parse_timestamp(&row.updated_at),
                project_id: row.project_id,
                name: row.name,
                client: row.client,
                sites,
            }
        })
        .collect())
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

// Internal row types for SQLx
#[derive(sqlx::FromRow)]
struct ProjectRow {
    project_id: String,
    name: String,
    client: Option<String>,
    created_at: String,
    updated_at: String,
}

#[derive(sqlx::FromRow)]
struct SiteRow {
    project_id: String,
    site_id: String,
    #[allow(dead_code)]
    position: i64,
    input: String,
    updated_at: String,
}

impl TryFrom<SiteRow> for SiteRecord {
    type Error = anyhow::Error;

    fn try_from(row: SiteRow) -> Result<Self> {
        let mut input: SiteInput = serde_json::from_str(&row.input)?;
        input.site_id = row.site_id;

        Ok(SiteRecord {
            input,
            updated_at: parse_timestamp(&row.updated_at),
        })
    }
}
