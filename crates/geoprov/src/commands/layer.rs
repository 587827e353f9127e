//! Layer command handlers.

use serde_json::json;

use geoprov_api::{DEFAULT_SRS, Provisioner};

use crate::cli::{GlobalOpts, LayerArgs, LayerCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &impl Provisioner,
    args: LayerArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LayerCommand::Publish {
            workspace,
            store,
            layer,
        } => {
            client.publish_layer(&workspace, &store, &layer).await?;
            let data = json!({
                "workspace": workspace,
                "store": store,
                "layer": layer,
                "srs": DEFAULT_SRS,
            });
            let out = output::render(global.output, &data, |_| {
                output::done(&format!("published {workspace}:{layer} ({DEFAULT_SRS})"))
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
