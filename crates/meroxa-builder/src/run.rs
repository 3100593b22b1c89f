//! Parsing argv against an assembled tree and running the selected node.

use std::ffi::OsString;

use clap::parser::{MatchesError, ValueSource};
use clap::ArgMatches;
use meroxa_config::Config;
use tracing::debug;

use crate::assemble::{Node, PostStep, PreStep, ARGS_ID};
use crate::autoupdate;
use crate::command::Command;
use crate::context::Context;
use crate::error::CommandError;
use crate::feature_flag::{check_feature_flag, check_gate};
use crate::flags::{build_flags, Flag, FlagSet, FlagValue, Target};
use crate::session::Session;

/// An assembled command tree bound to its parser.
pub struct Cli {
    root: Node,
    command: clap::Command,
}

impl std::fmt::Debug for Cli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cli").field("root", &self.root).finish_non_exhaustive()
    }
}

impl Cli {
    /// Bind `root` to a parser.
    pub fn new(root: Node) -> Self {
        let command = root.to_clap();
        Self { root, command }
    }

    /// Root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Parse `argv`, whose first item is the program name, and select the
    /// node to run. Help and version requests come back as
    /// [`CommandError::Parse`].
    pub fn parse_from<I, T>(&mut self, argv: I) -> Result<Invocation<'_>, CommandError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = self.command.try_get_matches_from_mut(argv)?;

        let mut path = Vec::new();
        let mut names = Vec::new();
        let mut node = &self.root;
        let mut current = &matches;
        while let Some((name, sub)) = current.subcommand() {
            let Some(idx) = node.children.iter().position(|c| c.name == name) else {
                break;
            };
            path.push(idx);
            names.push(name.to_string());
            node = &node.children[idx];
            current = sub;
        }
        let runnable = node.runnable;
        let leaf_matches = current.clone();

        let help = if runnable {
            None
        } else {
            Some(self.render_help(&names))
        };

        Ok(Invocation {
            root: &mut self.root,
            path,
            names,
            matches: leaf_matches,
            help,
        })
    }

    fn render_help(&self, names: &[String]) -> String {
        let argv = std::iter::once(self.command.get_name().to_string())
            .chain(names.iter().cloned())
            .chain(std::iter::once("--help".to_string()));
        match self.command.clone().try_get_matches_from(argv) {
            Err(e) => e.render().to_string(),
            Ok(_) => String::new(),
        }
    }
}

/// The node selected by argv together with its parsed values.
pub struct Invocation<'a> {
    root: &'a mut Node,
    path: Vec<usize>,
    names: Vec<String>,
    matches: ArgMatches,
    help: Option<String>,
}

impl std::fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Invocation")
            .field("path", &self.names)
            .field("matches", &self.matches)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct Switches {
    skip_confirm: bool,
    hide_headers: bool,
}

impl Invocation<'_> {
    /// Names of the selected command below the root.
    pub fn command_path(&self) -> &[String] {
        &self.names
    }

    /// Positional arguments given to the selected command.
    pub fn args(&self) -> Vec<String> {
        positional(&self.matches)
    }

    /// Write the values of persistent flags declared by `set` into it. Used
    /// to read root-level options such as `--json` before a session exists.
    pub fn bind(&self, set: &mut dyn FlagSet) -> Result<(), CommandError> {
        for flag in build_flags(set) {
            if let Some(value) = resolve(&flag, &self.matches)? {
                if let Target::Field(name) = flag.target {
                    write_field(set, &flag, name, value)?;
                }
            }
        }
        Ok(())
    }

    /// Run the selected node: bind flags, run its pre-steps, execute, then
    /// run its post-steps. The first error stops the run.
    ///
    /// Feature-flag gates of parent commands are checked together with the
    /// node's own gate, before confirmation. A node without an execute step
    /// prints its help instead.
    pub async fn run(self, session: &Session, ctx: &Context) -> Result<(), CommandError> {
        let Invocation {
            root,
            path,
            matches,
            help,
            ..
        } = self;

        let enforce_required = help.is_none();
        let mut gates = Vec::new();
        let mut node: &mut Node = root;
        for &idx in &path {
            bind_node(node, &matches, true, &mut Switches::default())?;
            if enforce_required {
                check_required(node, &matches)?;
            }
            if let Some(gate) = node.command.as_feature_flag() {
                gates.push(gate.feature_flag());
            }
            node = &mut node.children[idx];
        }

        let mut switches = Switches::default();
        bind_node(node, &matches, false, &mut switches)?;

        if let Some(help) = help {
            check_gates(std::mem::take(&mut gates), session)?;
            if let Some(gate) = node.command.as_feature_flag() {
                check_feature_flag(gate, session)?;
            }
            session.logger().print(help);
            return Ok(());
        }
        check_required(node, &matches)?;

        if let Some(message) = &node.deprecated {
            session
                .logger()
                .warn(format!("Command {:?} is deprecated, {message}", node.name));
        }

        let args = positional(&matches);
        let command = node.command.as_mut();
        let mut pending_gates = Some(gates);
        for &step in &node.pre_steps {
            if step >= PreStep::CheckFeatureFlag {
                if let Some(gates) = pending_gates.take() {
                    check_gates(gates, session)?;
                }
            }
            debug!(command = %node.name, ?step, "running pre-step");
            run_pre_step(step, command, &args, &switches, session, ctx)?;
        }
        if let Some(gates) = pending_gates.take() {
            check_gates(gates, session)?;
        }

        if let Some(exec) = command.as_execute() {
            debug!(command = %node.name, "executing");
            tokio::select! {
                biased;
                () = ctx.cancelled() => return Err(CommandError::Cancelled),
                result = exec.execute(ctx) => result?,
            }
        }

        for &step in &node.post_steps {
            debug!(command = %node.name, ?step, "running post-step");
            match step {
                PostStep::WriteConfig => {
                    if let Some(config) = session.config() {
                        config.read().write()?;
                    }
                }
                PostStep::NotifyUpdates => autoupdate::notify_if_due(session, ctx).await,
            }
        }
        Ok(())
    }
}

fn positional(matches: &ArgMatches) -> Vec<String> {
    match matches.try_get_many::<String>(ARGS_ID) {
        Ok(Some(values)) => values.cloned().collect(),
        _ => Vec::new(),
    }
}

fn check_gates(gates: Vec<(String, CommandError)>, session: &Session) -> Result<(), CommandError> {
    for (flag, fallback) in gates {
        check_gate(&flag, fallback, session)?;
    }
    Ok(())
}

/// Value of `flag` from the parse, its default when absent, or `None` when
/// the parser does not know the flag.
fn resolve(flag: &Flag, matches: &ArgMatches) -> Result<Option<FlagValue>, CommandError> {
    let raw: Vec<String> = match matches.try_get_many::<String>(&flag.long) {
        Ok(Some(values)) => values.cloned().collect(),
        Ok(None) => return Ok(Some(flag.default.clone())),
        Err(MatchesError::UnknownArgument { .. }) => return Ok(None),
        Err(e) => {
            return Err(CommandError::InvalidFlag {
                flag: flag.long.clone(),
                value: String::new(),
                reason: e.to_string(),
            });
        }
    };
    flag.kind
        .parse_all(&raw)
        .map(Some)
        .map_err(|reason| CommandError::InvalidFlag {
            flag: flag.long.clone(),
            value: raw.join(","),
            reason,
        })
}

fn write_field(
    set: &mut dyn FlagSet,
    flag: &Flag,
    name: &str,
    value: FlagValue,
) -> Result<(), CommandError> {
    let Some(field) = set.field_mut(name) else {
        return Ok(());
    };
    let shown = value.to_string();
    field
        .assign(value)
        .map_err(|reason| CommandError::InvalidFlag {
            flag: flag.long.clone(),
            value: shown,
            reason,
        })
}

fn bind_node(
    node: &mut Node,
    matches: &ArgMatches,
    persistent_only: bool,
    switches: &mut Switches,
) -> Result<(), CommandError> {
    for flag in &node.flags {
        if persistent_only && !flag.persistent {
            continue;
        }
        let Some(value) = resolve(flag, matches)? else {
            continue;
        };
        match flag.target {
            Target::SkipConfirm => switches.skip_confirm |= value == FlagValue::Bool(true),
            Target::HideHeaders => switches.hide_headers = value == FlagValue::Bool(true),
            Target::Field(name) => {
                if let Some(owner) = node.command.as_flags() {
                    write_field(owner.flags(), flag, name, value)?;
                }
            }
        }
    }
    Ok(())
}

/// Fail unless every required persistent flag of `node` was typed on the
/// command line. Clap enforces the non-persistent ones itself.
fn check_required(node: &Node, matches: &ArgMatches) -> Result<(), CommandError> {
    for flag in &node.flags {
        if !flag.required || !flag.persistent {
            continue;
        }
        let given = matches!(matches.try_contains_id(&flag.long), Ok(true))
            && matches.value_source(&flag.long) == Some(ValueSource::CommandLine);
        if !given {
            return Err(CommandError::MissingFlag(flag.long.clone()));
        }
    }
    Ok(())
}

fn run_pre_step(
    step: PreStep,
    command: &mut dyn Command,
    args: &[String],
    switches: &Switches,
    session: &Session,
    ctx: &Context,
) -> Result<(), CommandError> {
    match step {
        PreStep::AttachLogger => {
            if let Some(target) = command.as_logger() {
                target.attach_logger(session.logger().clone());
            }
        }
        PreStep::AttachConfig => {
            if let Some(target) = command.as_config() {
                let config = session
                    .config()
                    .cloned()
                    .unwrap_or_else(|| Config::in_memory().shared());
                target.attach_config(config);
            }
        }
        PreStep::HideHeaders => {
            if let Some(target) = command.as_no_headers() {
                target.set_hide_headers(switches.hide_headers);
            }
        }
        PreStep::ParseArgs => {
            if let Some(target) = command.as_args() {
                target.parse_args(args)?;
            }
        }
        PreStep::AttachClient => {
            if let Some(target) = command.as_client() {
                target.attach_client(session.new_client()?);
            }
        }
        PreStep::CheckFeatureFlag => {
            if let Some(gate) = command.as_feature_flag() {
                check_feature_flag(gate, session)?;
            }
        }
        PreStep::Confirm => {
            if switches.skip_confirm {
                debug!("confirmation skipped by flag");
                return Ok(());
            }
            let want = if let Some(c) = command.as_confirm_with_value() {
                c.value_to_confirm(ctx)
            } else if let Some(c) = command.as_confirm() {
                c.confirm(ctx)
            } else {
                return Ok(());
            };
            session.confirm(&want)?;
        }
    }
    Ok(())
}
