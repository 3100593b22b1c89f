//! Turns a command descriptor into a wired [`Node`].

use std::collections::BTreeSet;
use std::fmt;

use clap::{Arg, ArgAction};

use crate::command::{Command, Docs};
use crate::flags::{build_flags, Flag, Target};

/// Parser id of the positional arguments.
pub(crate) const ARGS_ID: &str = "__args";

/// Side effects run before execute, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreStep {
    /// Hand the session logger to the command.
    AttachLogger,
    /// Hand the shared config to the command.
    AttachConfig,
    /// Pass the `--no-headers` switch on.
    HideHeaders,
    /// Validate and store positional arguments.
    ParseArgs,
    /// Build and hand over an API client.
    AttachClient,
    /// Check the account's entitlement.
    CheckFeatureFlag,
    /// Ask the user to type the confirmation value.
    Confirm,
}

/// Side effects run after a successful execute, in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PostStep {
    /// Flush the shared config to disk.
    WriteConfig,
    /// Print the weekly upgrade notice when due.
    NotifyUpdates,
}

/// An assembled command and its children.
pub struct Node {
    pub(crate) name: String,
    pub(crate) usage: String,
    pub(crate) docs: Docs,
    pub(crate) aliases: Vec<String>,
    pub(crate) flags: Vec<Flag>,
    pub(crate) takes_args: bool,
    pub(crate) hidden: bool,
    pub(crate) deprecated: Option<String>,
    pub(crate) pre_steps: Vec<PreStep>,
    pub(crate) runnable: bool,
    pub(crate) post_steps: Vec<PostStep>,
    pub(crate) children: Vec<Node>,
    pub(crate) command: Box<dyn Command>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("usage", &self.usage)
            .field("aliases", &self.aliases)
            .field("flags", &self.flags)
            .field("pre_steps", &self.pre_steps)
            .field("runnable", &self.runnable)
            .field("post_steps", &self.post_steps)
            .field("children", &self.children)
            .finish_non_exhaustive()
    }
}

impl Node {
    /// First word of the usage line.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full usage line.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Help text.
    pub fn docs(&self) -> &Docs {
        &self.docs
    }

    /// Alternative names.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Flags registered on this node, builtins included.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// Whether positional arguments are accepted.
    pub fn takes_args(&self) -> bool {
        self.takes_args
    }

    /// Whether the node is left out of help.
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Deprecation message, if any.
    pub fn deprecation(&self) -> Option<&str> {
        self.deprecated.as_deref()
    }

    /// Pre-steps in run order.
    pub fn pre_steps(&self) -> &[PreStep] {
        &self.pre_steps
    }

    /// Whether the node has an execute step. Others print their help.
    pub fn is_runnable(&self) -> bool {
        self.runnable
    }

    /// Post-steps in run order.
    pub fn post_steps(&self) -> &[PostStep] {
        &self.post_steps
    }

    /// Child nodes.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Descendant reached by following child names.
    pub fn find(&self, path: &[&str]) -> Option<&Node> {
        path.iter().try_fold(self, |node, name| {
            node.children.iter().find(|child| child.name == *name)
        })
    }

    /// Parser definition for this node and its children.
    pub fn to_clap(&self) -> clap::Command {
        self.build_clap(&BTreeSet::new())
    }

    #[allow(clippy::panic)]
    fn build_clap(&self, inherited: &BTreeSet<String>) -> clap::Command {
        let mut cmd = clap::Command::new(self.name.clone())
            .visible_aliases(self.aliases.clone())
            .hide(self.hidden || self.deprecated.is_some());
        if !self.docs.short.is_empty() {
            cmd = cmd.about(self.docs.short.clone());
        }
        if !self.docs.long.is_empty() {
            cmd = cmd.long_about(self.docs.long.clone());
        }
        if !self.docs.example.is_empty() {
            cmd = cmd.after_help(format!("Examples:\n{}", self.docs.example));
        }

        let mut scope = inherited.clone();
        for flag in &self.flags {
            if inherited.contains(&flag.long) {
                panic!(
                    "command {}: flag --{} shadows a persistent flag of a parent command",
                    self.name, flag.long
                );
            }
            if flag.persistent {
                scope.insert(flag.long.clone());
            }
            cmd = cmd.arg(flag.to_arg());
        }

        if self.takes_args {
            cmd = cmd.arg(
                Arg::new(ARGS_ID)
                    .value_name(args_value_name(&self.usage))
                    .num_args(1..)
                    .action(ArgAction::Append),
            );
            if !self.children.is_empty() {
                cmd = cmd.args_conflicts_with_subcommands(true);
            }
        }

        for child in &self.children {
            cmd = cmd.subcommand(child.build_clap(&scope));
        }
        cmd
    }
}

/// Placeholder shown for positional arguments, from the usage line.
fn args_value_name(usage: &str) -> String {
    let rest: Vec<String> = usage
        .split_whitespace()
        .skip(1)
        .map(|word| word.replace(['[', ']'], "").trim_end_matches("...").to_string())
        .filter(|word| !word.is_empty())
        .collect();
    if rest.is_empty() {
        "ARGS".to_string()
    } else {
        rest.join(" ")
    }
}

/// Probe every capability of `command` and wire it into a [`Node`].
///
/// # Panics
///
/// On descriptor-authoring mistakes: an empty usage line, a malformed flags
/// struct (see [`build_flags`]), or a flag name that is empty or used twice
/// on the same command.
#[allow(clippy::panic)]
pub fn assemble<C: Command>(mut command: C) -> Node {
    let usage = command.usage().trim().to_string();
    let Some(name) = usage.split_whitespace().next().map(str::to_string) else {
        panic!("command usage must not be empty");
    };

    let docs = command.as_docs().map(|d| d.docs()).unwrap_or_default();
    let aliases = command
        .as_aliases()
        .map(|a| a.aliases())
        .unwrap_or_default();
    let hidden = command.as_hidden().is_some_and(|h| h.hidden());
    let deprecated = command.as_deprecated().map(|d| d.deprecated());

    let mut flags = command
        .as_flags()
        .map(|f| build_flags(f.flags()))
        .unwrap_or_default();
    let mut pre_steps = Vec::new();

    if command.as_logger().is_some() {
        pre_steps.push(PreStep::AttachLogger);
    }
    let has_config = command.as_config().is_some();
    if has_config {
        pre_steps.push(PreStep::AttachConfig);
    }
    if command.as_no_headers().is_some() {
        pre_steps.push(PreStep::HideHeaders);
        flags.push(Flag::switch(
            "no-headers",
            None,
            "display output without headers",
            Target::HideHeaders,
        ));
    }
    let takes_args = command.as_args().is_some();
    if takes_args {
        pre_steps.push(PreStep::ParseArgs);
    }
    if command.as_client().is_some() {
        pre_steps.push(PreStep::AttachClient);
    }
    if command.as_feature_flag().is_some() {
        pre_steps.push(PreStep::CheckFeatureFlag);
    }
    if command.as_confirm().is_some() || command.as_confirm_with_value().is_some() {
        pre_steps.push(PreStep::Confirm);
        flags.push(Flag::switch(
            "force",
            Some('f'),
            "skip confirmation",
            Target::SkipConfirm,
        ));
        flags.push(Flag::switch("yolo", None, "skip confirmation", Target::SkipConfirm).hide());
    }

    check_flags(&name, &flags);

    let runnable = command.as_execute().is_some();
    let mut post_steps = Vec::new();
    if has_config {
        post_steps.push(PostStep::WriteConfig);
    }
    if runnable {
        post_steps.push(PostStep::NotifyUpdates);
    }

    let children = command
        .as_sub_commands()
        .map(|s| s.sub_commands())
        .unwrap_or_default();

    Node {
        name,
        usage,
        docs,
        aliases,
        flags,
        takes_args,
        hidden,
        deprecated,
        pre_steps,
        runnable,
        post_steps,
        children,
        command: Box::new(command),
    }
}

#[allow(clippy::panic)]
fn check_flags(command: &str, flags: &[Flag]) {
    let mut longs = BTreeSet::new();
    let mut shorts = BTreeSet::new();
    for flag in flags {
        if flag.long.is_empty() {
            panic!("command {command}: flag for {:?} has no long name", flag.target);
        }
        if !longs.insert(flag.long.as_str()) {
            panic!("command {command}: flag --{} is defined twice", flag.long);
        }
        if let Some(short) = flag.short {
            if !shorts.insert(short) {
                panic!("command {command}: shorthand -{short} is defined twice");
            }
        }
    }
}
