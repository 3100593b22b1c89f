//! `meroxa` binary entrypoint.

use std::io;
use std::process::ExitCode;

use meroxa_builder::{Cli, CommandError, Context};
use tracing_subscriber::EnvFilter;

use meroxa_cli::{build_session, root, GlobalFlags};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run()) {
        Ok(()) => ExitCode::SUCCESS,
        // Help, version and usage errors print themselves with clap's exit code.
        Err(CommandError::Parse(e)) => e.exit(),
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), CommandError> {
    let mut cli = Cli::new(root());
    let invocation = cli.parse_from(std::env::args_os())?;

    let mut globals = GlobalFlags::default();
    invocation.bind(&mut globals)?;
    let session = build_session(&globals)?;

    let ctx = Context::new(globals.timeout);
    let token = ctx.token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    invocation.run(&session, &ctx).await
}
