//! `meroxa version`.

use meroxa_builder::{
    capabilities, Command, CommandError, Context, Docs, ExecuteFuture, HasDocs, HasExecute,
    HasLogger, Logger,
};

/// Prints `meroxa/<version> <os>/<arch>`.
#[derive(Debug, Default)]
pub struct Version {
    logger: Logger,
}

impl Command for Version {
    fn usage(&self) -> &str {
        "version"
    }
    capabilities!(docs, logger, execute);
}

impl HasDocs for Version {
    fn docs(&self) -> Docs {
        Docs::short("Display the Meroxa CLI version")
    }
}

impl HasLogger for Version {
    fn attach_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }
}

impl HasExecute for Version {
    fn execute<'a>(&'a mut self, _ctx: &'a Context) -> ExecuteFuture<'a> {
        Box::pin(async move {
            self.logger.info(version_line());
            Ok::<_, CommandError>(())
        })
    }
}

fn version_line() -> String {
    format!(
        "meroxa/{} {}/{}",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}
