//! Shapefile command handlers.

use std::fmt::Write;

use geoprov_api::{Provisioner, ShapefileDownload};

use crate::cli::{GlobalOpts, ShapefileArgs, ShapefileCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &impl Provisioner,
    args: ShapefileArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ShapefileCommand::Upload {
            workspace,
            store,
            dir,
        } => {
            let uploaded = client.update_shapefile(&workspace, &store, &dir).await?;
            let out = output::render(global.output, &uploaded, |files| {
                if files.is_empty() {
                    return output::unchanged(&format!("no .shp files in {}", dir.display()));
                }
                let mut text = output::done(&format!(
                    "uploaded {} file(s) to {workspace}:{store}",
                    files.len()
                ));
                for file in files {
                    let _ = write!(text, "\n  {}", file.display());
                }
                text
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShapefileCommand::Fetch {
            workspace,
            store,
            layer,
            destination,
        } => {
            let download = client
                .get_shapefile(&workspace, &store, &layer, &destination)
                .await?;
            let out = output::render(global.output, &download, download_summary);
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

/// Text summary for a finished export.
pub fn download_summary(download: &ShapefileDownload) -> String {
    let mut text = output::done(&format!(
        "saved {} ({} bytes)",
        download.archive_path.display(),
        download.archive_size
    ));
    for file in &download.files {
        let _ = write!(text, "\n  {}", file.display());
    }
    text
}
