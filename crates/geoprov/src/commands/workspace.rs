//! Workspace command handlers.

use geoprov_api::Provisioner;

use crate::cli::{GlobalOpts, WorkspaceArgs, WorkspaceCommand};
use crate::error::CliError;

pub async fn handle(
    client: &impl Provisioner,
    args: WorkspaceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        WorkspaceCommand::Create { workspace } => {
            let result = client.create_workspace(&workspace).await?;
            super::print_ensured("workspace", &workspace, result, global);
            Ok(())
        }
    }
}
