use serde::Serialize;

use crate::{auth::dto::PublicUser, projects::dto::ProjectView};

/// Uniform JSON body returned by every endpoint.
#[derive(Debug, Default, Serialize)]
pub struct Envelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<ProjectView>>,
}

impl Envelope {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Self::ok()
        }
    }

    pub fn failure(text: impl Into<String>) -> Self {
        Self {
            message: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn failure_error(text: impl Into<String>) -> Self {
        Self {
            error: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn with_user(mut self, user: impl Into<PublicUser>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn with_project(mut self, project: impl Into<ProjectView>) -> Self {
        self.project = Some(project.into());
        self
    }

    pub fn with_projects(mut self, projects: Vec<ProjectView>) -> Self {
        self.projects = Some(projects);
        self
    }
}
