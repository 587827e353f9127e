//! Command handlers.
//!
//! Every handler takes the client through the `Provisioner` trait, so the
//! dispatch here is the only place that knows about `GeoServerClient`.

pub mod config_cmd;
pub mod datastore;
pub mod execute;
pub mod layer;
pub mod shapefile;
pub mod workspace;

use serde::Serialize;

use geoprov_api::{Ensured, Provisioner};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;
use crate::output;

/// Route a connected command to its handler.
pub async fn dispatch(
    cmd: Command,
    client: &impl Provisioner,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Workspace(args) => workspace::handle(client, args, global).await,
        Command::Datastore(args) => datastore::handle(client, args, global).await,
        Command::Shapefile(args) => shapefile::handle(client, args, global).await,
        Command::Layer(args) => layer::handle(client, args, global).await,
        Command::Execute(args) => execute::handle(client, args, global).await,
        Command::Config(_) | Command::Completions(_) => unreachable!("handled before connect"),
    }
}

/// Output shape shared by the ensure-style commands.
#[derive(Debug, Serialize)]
struct EnsureSummary<'a> {
    resource: &'static str,
    name: &'a str,
    result: Ensured,
}

fn print_ensured(resource: &'static str, name: &str, result: Ensured, global: &GlobalOpts) {
    let summary = EnsureSummary {
        resource,
        name,
        result,
    };
    let out = output::render(global.output, &summary, |s| match s.result {
        Ensured::Created => output::done(&format!("created {} '{}'", s.resource, s.name)),
        Ensured::AlreadyExists => {
            output::unchanged(&format!("{} '{}' already exists", s.resource, s.name))
        }
    });
    output::print_output(&out, global.quiet);
}
