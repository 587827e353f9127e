mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use geoprov_api::CancellationToken;
use geoprov_config::{Overrides, Sources};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a server connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "geoprov", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = geoprov_config::load_config()?;
            let settings =
                geoprov_config::resolve(&cfg, &overrides(&cli.global), &Sources::system())?;
            tracing::info!(
                profile = %settings.profile,
                url = %settings.url,
                user = %settings.username,
                "connecting"
            );

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    on_interrupt.cancel();
                }
            });

            let client = settings.connect()?.with_cancellation(cancel);

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &client, &cli.global).await
        }
    }
}

/// Flag values that take precedence over profiles and the environment.
fn overrides(global: &GlobalOpts) -> Overrides {
    Overrides {
        profile: global.profile.clone(),
        url: global.url.clone(),
        username: global.username.clone(),
        password: global.password.clone().map(SecretString::from),
        timeout: global.timeout,
        connect_timeout: global.connect_timeout,
        insecure: global.insecure,
    }
}
