//! Data store command handlers.

use geoprov_api::Provisioner;

use crate::cli::{DatastoreArgs, DatastoreCommand, GlobalOpts};
use crate::error::CliError;

pub async fn handle(
    client: &impl Provisioner,
    args: DatastoreArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DatastoreCommand::Create {
            workspace,
            store,
            shapefile_path,
        } => {
            let result = client
                .create_datastore(&workspace, &store, &shapefile_path)
                .await?;
            super::print_ensured("data store", &format!("{workspace}:{store}"), result, global);
            Ok(())
        }
    }
}
