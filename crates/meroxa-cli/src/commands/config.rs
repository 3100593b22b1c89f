//! `meroxa config`: inspect and edit the CLI config file.

use std::collections::BTreeMap;

use anyhow::anyhow;
use meroxa_builder::{
    assemble, capabilities, Command, CommandError, Context, Docs, ExecuteFuture, HasAliases,
    HasArgs, HasConfig, HasDocs, HasExecute, HasLogger, HasSubCommands, Logger, Node,
    SharedConfig,
};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

/// Namespace for the config commands.
#[derive(Debug, Default)]
pub struct ConfigCommand;

impl Command for ConfigCommand {
    fn usage(&self) -> &str {
        "config"
    }
    capabilities!(docs, aliases, sub_commands);
}

impl HasDocs for ConfigCommand {
    fn docs(&self) -> Docs {
        Docs::short("Manage your Meroxa CLI configuration")
    }
}

impl HasAliases for ConfigCommand {
    fn aliases(&self) -> Vec<String> {
        vec!["cfg".to_string()]
    }
}

impl HasSubCommands for ConfigCommand {
    fn sub_commands(&self) -> Vec<Node> {
        vec![assemble(Describe::default()), assemble(Set::default())]
    }
}

/// Prints every config value, with tokens obfuscated.
#[derive(Debug, Default)]
pub struct Describe {
    config: Option<SharedConfig>,
    logger: Logger,
}

#[derive(Debug, Serialize)]
struct Described {
    path: String,
    config: BTreeMap<String, Value>,
}

impl Command for Describe {
    fn usage(&self) -> &str {
        "describe"
    }
    capabilities!(docs, config, logger, execute);
}

impl HasDocs for Describe {
    fn docs(&self) -> Docs {
        Docs {
            short: "Show Meroxa CLI configuration details".to_string(),
            long: "This command will return the content of your configuration file where you \
                   could find your `access_token` and `refresh_token`. The file lives in your \
                   user config directory unless --cli-config-file points elsewhere."
                .to_string(),
            example: "$ meroxa config describe\n\
                      Using meroxa config located in \"/home/me/.config/meroxa/config.json\"\n\n\
                      access_token: c0f928b...c337a0d\n\
                      actor: user@email.com"
                .to_string(),
        }
    }
}

impl HasConfig for Describe {
    fn attach_config(&mut self, config: SharedConfig) {
        self.config = Some(config);
    }
}

impl HasLogger for Describe {
    fn attach_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }
}

impl HasExecute for Describe {
    fn execute<'a>(&'a mut self, _ctx: &'a Context) -> ExecuteFuture<'a> {
        Box::pin(async move {
            let config = self
                .config
                .as_ref()
                .ok_or_else(|| CommandError::Other(anyhow!("config was not attached")))?
                .read();
            let path = config
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_default();

            self.logger
                .info(format!("Using meroxa config located in {path:?}\n"));
            let mut described = Described {
                path,
                config: BTreeMap::new(),
            };
            for key in config.keys() {
                let shown = key.to_lowercase();
                let value = config.get_string(key).unwrap_or_default();
                self.logger.info(format!("{shown}: {}", obfuscate(&shown, &value)));
                if let Some(raw) = config.get(key) {
                    described.config.insert(shown, raw.clone());
                }
            }
            self.logger.json(&described);
            Ok::<_, CommandError>(())
        })
    }
}

/// Shortens token values to their ends, e.g. `c0f928b...c337a0d`.
fn obfuscate(key: &str, value: &str) -> String {
    const MAX_VISIBLE: usize = 7;

    if !key.contains("token") {
        return value.to_string();
    }
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 5 {
        return "*".repeat(chars.len());
    }
    let visible = ((chars.len() - 3) / 2).min(MAX_VISIBLE);
    let head: String = chars[..visible].iter().collect();
    let tail: String = chars[chars.len() - visible..].iter().collect();
    format!("{head}...{tail}")
}

/// Writes `KEY=VALUE` pairs into the config.
#[derive(Debug, Default)]
pub struct Set {
    config: Option<SharedConfig>,
    logger: Logger,
    pairs: Vec<(String, String)>,
}

impl Command for Set {
    fn usage(&self) -> &str {
        "set KEY=VALUE"
    }
    capabilities!(docs, args, config, logger, execute);
}

impl HasDocs for Set {
    fn docs(&self) -> Docs {
        Docs {
            short: "Update your Meroxa CLI configuration file with a specific key=value".to_string(),
            long: "This command will let you update your Meroxa configuration file to customize \
                   your CLI experience. A key with a format such as MyKey will be converted \
                   automatically to MY_KEY."
                .to_string(),
            example: "$ meroxa config set DisableNotificationsUpdate=true\n\
                      $ meroxa config set DISABLE_NOTIFICATIONS_UPDATE=true\n\
                      $ meroxa config set OneKey=true AnotherKey=false\n\
                      $ meroxa config set ApiUrl=https://staging.meroxa.com"
                .to_string(),
        }
    }
}

impl HasArgs for Set {
    fn parse_args(&mut self, args: &[String]) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::Args(
                "requires at least one KEY=VALUE pair (example: meroxa config set KEY=VALUE)"
                    .to_string(),
            ));
        }
        self.pairs = args
            .iter()
            .map(|arg| parse_pair(arg))
            .collect::<Result<_, _>>()?;
        Ok(())
    }
}

impl HasConfig for Set {
    fn attach_config(&mut self, config: SharedConfig) {
        self.config = Some(config);
    }
}

impl HasLogger for Set {
    fn attach_logger(&mut self, logger: Logger) {
        self.logger = logger;
    }
}

impl HasExecute for Set {
    fn execute<'a>(&'a mut self, _ctx: &'a Context) -> ExecuteFuture<'a> {
        Box::pin(async move {
            let config = self
                .config
                .as_ref()
                .ok_or_else(|| CommandError::Other(anyhow!("config was not attached")))?;
            for (key, value) in &self.pairs {
                self.logger.info(format!(
                    "Updating your Meroxa configuration file with {key}={value}..."
                ));
                config.write().set(key, value.as_str());
            }
            self.logger.info("Done!");
            Ok::<_, CommandError>(())
        })
    }
}

fn parse_pair(arg: &str) -> Result<(String, String), CommandError> {
    let parts: Vec<&str> = arg.split('=').collect();
    let [key, value] = parts.as_slice() else {
        return Err(CommandError::Args(
            "a key=value needs to contain at least and only one `=` sign".to_string(),
        ));
    };
    Ok((normalize_key(key)?, (*value).to_string()))
}

/// `MyKey` and `my_key` both become `MY_KEY`.
fn normalize_key(key: &str) -> Result<String, CommandError> {
    let first_cap = Regex::new("(.)([A-Z][a-z]+)").map_err(anyhow::Error::from)?;
    let all_cap = Regex::new("([a-z0-9])([A-Z])").map_err(anyhow::Error::from)?;
    let snake = first_cap.replace_all(key, "${1}_${2}");
    let snake = all_cap.replace_all(&snake, "${1}_${2}");
    Ok(snake.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use meroxa_config::{Config, ACCESS_TOKEN};
    use test_case::test_case;

    #[test_case("DisableNotificationsUpdate", "DISABLE_NOTIFICATIONS_UPDATE")]
    #[test_case("DISABLE_NOTIFICATIONS_UPDATE", "DISABLE_NOTIFICATIONS_UPDATE")]
    #[test_case("ApiUrl", "API_URL")]
    #[test_case("apiUrl", "API_URL")]
    #[test_case("key", "KEY")]
    fn keys_are_normalized(raw: &str, want: &str) {
        assert_eq!(normalize_key(raw).expect("valid"), want);
    }

    #[test_case("access_token", "abc", "***")]
    #[test_case("access_token", "abcdefghij", "abc...hij")]
    #[test_case("refresh_token", "c0f928bad40e40c5a7facf281c337a0d", "c0f928b...c337a0d")]
    #[test_case("actor", "user@example.com", "user@example.com")]
    fn tokens_are_obfuscated(key: &str, value: &str, want: &str) {
        assert_eq!(obfuscate(key, value), want);
    }

    #[test]
    fn set_requires_pairs() {
        let err = Set::default().parse_args(&[]).expect_err("no args");
        assert_eq!(
            err.to_string(),
            "requires at least one KEY=VALUE pair (example: meroxa config set KEY=VALUE)"
        );
    }

    #[test_case("KEY"; "no equals sign")]
    #[test_case("A=B=C"; "two equals signs")]
    fn set_rejects_malformed_pairs(arg: &str) {
        let err = Set::default()
            .parse_args(&[arg.to_string()])
            .expect_err("malformed");
        assert!(err.to_string().contains("only one `=` sign"));
    }

    #[tokio::test]
    async fn set_writes_normalized_keys() {
        let config = Config::in_memory().shared();
        let (logger, captured) = Logger::capture();
        let mut cmd = Set::default();
        cmd.attach_logger(logger);
        cmd.attach_config(config.clone());
        cmd.parse_args(&["OneKey=true".to_string(), "other=1".to_string()])
            .expect("valid");

        cmd.execute(&Context::default()).await.expect("runs");

        assert_eq!(config.read().get_string("ONE_KEY").as_deref(), Some("true"));
        assert_eq!(config.read().get_string("OTHER").as_deref(), Some("1"));
        assert!(captured.leveled_output().ends_with("Done!\n"));
    }

    #[tokio::test]
    async fn describe_lists_sorted_lowercase_keys() {
        let mut config = Config::in_memory();
        config.set(ACCESS_TOKEN, "c0f928bad40e40c5a7facf281c337a0d");
        config.set("ACTOR", "user@example.com");
        let (logger, captured) = Logger::capture();
        let mut cmd = Describe::default();
        cmd.attach_logger(logger);
        cmd.attach_config(config.shared());

        cmd.execute(&Context::default()).await.expect("runs");

        let out = captured.leveled_output();
        assert!(out.contains("access_token: c0f928b...c337a0d\nactor: user@example.com\n"));
        assert!(captured.json_output().contains(r#""actor": "user@example.com""#));
    }
}
