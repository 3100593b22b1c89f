//! `meroxa whoami`.

use std::sync::Arc;

use meroxa_builder::{
    capabilities, Command, CommandError, Context, Docs, ExecuteFuture, HasClient, HasDocs,
    HasExecute, HasLogger, Logger, PlatformClient,
};

/// Shows the logged-in user.
#[derive(Default)]
pub struct WhoAmI {
    client: Option<Arc<dyn PlatformClient>>,
    logger: Logger,
}

impl Command for WhoAmI {
    fn usage(&self) -> &str {
        "whoami"
    }
    capabilities!(docs, client, logger, execute);
}

impl HasDocs for WhoAmI {
    fn docs(&self) -> Docs {
        Docs {
            short: "Display the current logged in user".to_string(),
            example: "meroxa whoami".to_string(),
            ..Docs::default()
        }
    }
}

impl HasClient for WhoAmI {
    fn attach_client(&mut self, client: Arc<dyn PlatformClient>) {
        self.client = Some(client);
    }
}

impl HasLogger for WhoAmI {
    fn attach_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }
}

impl HasExecute for WhoAmI {
    fn execute<'a>(&'a mut self, _ctx: &'a Context) -> ExecuteFuture<'a> {
        Box::pin(async move {
            let client = super::client(self.client.as_ref())?;
            let user = client.get_user().await?;
            self.logger.info(&user.email);
            self.logger.json(&user);
            Ok::<_, CommandError>(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meroxa_client::{FakeClient, User};

    #[tokio::test]
    async fn prints_email_and_json() {
        let user = User {
            uuid: "u-1".to_string(),
            email: "ada@example.com".to_string(),
            ..User::default()
        };
        let (logger, captured) = Logger::capture();
        let mut cmd = WhoAmI::default();
        cmd.attach_logger(logger);
        cmd.attach_client(Arc::new(FakeClient::new().with_user(user)));

        cmd.execute(&Context::default()).await.expect("runs");

        assert_eq!(captured.leveled_output(), "ada@example.com\n");
        assert!(captured.json_output().contains(r#""uuid": "u-1""#));
    }
}
