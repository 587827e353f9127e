// Workspace endpoints
//
// Workspaces are ensured rather than created blindly: the existence check
// is a best-effort guard, not a lock.

use tracing::{debug, info};

use crate::error::Error;
use crate::rest::client::{GeoServerClient, require};
use crate::rest::models::{Ensured, WorkspaceEnvelope};

impl GeoServerClient {
    /// Check whether a workspace exists.
    ///
    /// `GET /rest/workspaces/{workspace}.json`
    pub async fn workspace_exists(&self, workspace: &str) -> Result<bool, Error> {
        require("workspace", workspace)?;
        let url = self.rest_url(&["workspaces", &format!("{workspace}.json")])?;
        self.exists(url).await
    }

    /// Create a workspace unless it already exists.
    ///
    /// `POST /rest/workspaces.json` with `{"workspace": {"name": "..."}}`
    pub async fn ensure_workspace(&self, workspace: &str) -> Result<Ensured, Error> {
        if self.workspace_exists(workspace).await? {
            debug!(workspace, "workspace already exists");
            return Ok(Ensured::AlreadyExists);
        }

        let url = self.rest_url(&["workspaces.json"])?;
        self.post_json(url, &WorkspaceEnvelope::named(workspace))
            .await?;
        info!(workspace, "created workspace");
        Ok(Ensured::Created)
    }
}
