use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewProject, Project, ProjectRow};

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Newest first.
    async fn list(&self) -> anyhow::Result<Vec<Project>>;
    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Project>>;
    async fn create(&self, project: NewProject) -> anyhow::Result<Project>;
    async fn save(&self, project: &Project) -> anyhow::Result<()>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<()>;
}

const PROJECT_COLUMNS: &str =
    "id, title, description, github_url, live_url, image_public_id, image_url, created_at";

#[derive(Clone)]
pub struct PgProjectStore {
    db: PgPool,
}

impl PgProjectStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn list(&self) -> anyhow::Result<Vec<Project>> {
        let rows = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"
        ))
        .fetch_all(&self.db)
        .await
        .context("list projects")?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    async fn find(&self, id: Uuid) -> anyhow::Result<Option<Project>> {
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find project")?;
        Ok(row.map(Project::from))
    }

    async fn create(&self, project: NewProject) -> anyhow::Result<Project> {
        let (image_public_id, image_url) = match project.image {
            Some(i) => (Some(i.public_id), Some(i.url)),
            None => (None, None),
        };
        let row = sqlx::query_as::<_, ProjectRow>(&format!(
            r#"
            INSERT INTO projects (title, description, github_url, live_url, image_public_id, image_url)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROJECT_COLUMNS}
            "#
        ))
        .bind(project.title)
        .bind(project.description)
        .bind(project.github_url)
        .bind(project.live_url)
        .bind(image_public_id)
        .bind(image_url)
        .fetch_one(&self.db)
        .await
        .context("insert project")?;
        Ok(row.into())
    }

    async fn save(&self, project: &Project) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE projects
               SET title = $2,
                   description = $3,
                   github_url = $4,
                   live_url = $5,
                   image_public_id = $6,
                   image_url = $7
             WHERE id = $1
            "#,
        )
        .bind(project.id)
        .bind(&project.title)
        .bind(&project.description)
        .bind(&project.github_url)
        .bind(&project.live_url)
        .bind(project.image.as_ref().map(|i| i.public_id.as_str()))
        .bind(project.image.as_ref().map(|i| i.url.as_str()))
        .execute(&self.db)
        .await
        .context("update project")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete project")?;
        Ok(())
    }
}
