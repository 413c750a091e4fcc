use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::storage::HostedImage;

#[derive(Debug, Clone)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub image: Option<HostedImage>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub image: Option<HostedImage>,
}

#[derive(Debug, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub image_public_id: Option<String>,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<ProjectRow> for Project {
    fn from(r: ProjectRow) -> Self {
        let image = match (r.image_public_id, r.image_url) {
            (Some(public_id), Some(url)) => Some(HostedImage { public_id, url }),
            _ => None,
        };
        Self {
            id: r.id,
            title: r.title,
            description: r.description,
            github_url: r.github_url,
            live_url: r.live_url,
            image,
            created_at: r.created_at,
        }
    }
}
