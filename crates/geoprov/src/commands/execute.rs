//! Execute command handler.

use std::fmt::Write;

use geoprov_api::{ExecuteOutcome, Provisioner};

use crate::cli::{ExecuteArgs, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &impl Provisioner,
    args: ExecuteArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let outcome = client
        .execute(
            &args.workspace,
            &args.store,
            &args.shapefile_path,
            &args.layer,
            args.mode.into(),
        )
        .await?;

    let out = output::render(global.output, &outcome, |outcome| match outcome {
        ExecuteOutcome::Provisioned(report) => {
            let mut text = output::done(&format!(
                "provisioned {}:{}",
                args.workspace, report.layer
            ));
            let _ = write!(
                text,
                "\n  workspace: {:?}\n  data store: {:?}\n  uploaded: {} file(s)",
                report.workspace,
                report.datastore,
                report.uploaded.len()
            );
            text
        }
        ExecuteOutcome::Retrieved(download) => super::shapefile::download_summary(download),
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
