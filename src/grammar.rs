//! Seam to clap, the grammar engine.
//!
//! Every node owns one `clap::Command` describing its own level (name, help,
//! aliases, flags, arguments). For a parse the per-node commands are cloned
//! and nested into a single command tree, with help layout and examples
//! attached on the way.

use std::mem;

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{Arg, ArgAction, Command};
use itertools::Itertools;
use tracing::instrument;

use crate::arena::{CommandArena, NodeId};
use crate::errors::ParseError;
use crate::node::Example;

pub(crate) const HELP_ID: &str = "help";
pub(crate) const VERSION_ID: &str = "version";
const HELP_TEXT: &str = "Output usage information.";
const VERSION_TEXT: &str = "Show application version.";

/// Root help has no header line.
const ROOT_TEMPLATE: &str = "{usage-heading}\n  {usage}\n\n{all-args}{after-help}";
const SUBCOMMAND_TEMPLATE: &str = "{about}\n\n{usage-heading}\n  {usage}\n\n{all-args}{after-help}";

/// Grammar handle for a single node.
pub(crate) fn new_handle(name: &str, help: &str) -> Command {
    Command::new(name.to_string())
        .about(help.to_string())
        .disable_help_flag(true)
        .disable_version_flag(true)
        .disable_help_subcommand(true)
        .arg(
            Arg::new(HELP_ID)
                .short('h')
                .long(HELP_ID)
                .help(HELP_TEXT)
                .action(ArgAction::Help),
        )
}

/// Apply a by-value clap builder step to a handle held in place.
pub(crate) fn update(handle: &mut Command, f: impl FnOnce(Command) -> Command) {
    *handle = f(mem::take(handle));
}

/// Long flag taking a value, before caller configuration.
///
/// Flags are global: they are also accepted after any descendant command.
pub(crate) fn flag(name: &str, help: &str) -> Arg {
    Arg::new(name.to_string())
        .long(name.to_string())
        .help(help.to_string())
        .global(true)
}

/// Positional argument, before caller configuration.
pub(crate) fn positional(name: &str, help: &str) -> Arg {
    Arg::new(name.to_string())
        .value_name(name.to_string())
        .help(help.to_string())
}

pub(crate) fn is_reserved(id: &str) -> bool {
    id == HELP_ID || id == VERSION_ID
}

/// Nest the grammar handles of `id` and all its descendants into one command.
#[instrument(level = "trace", skip(arena))]
pub(crate) fn assemble(arena: &CommandArena, id: NodeId) -> Command {
    let node = arena.node(id);
    let template = if node.parent.is_none() {
        ROOT_TEMPLATE
    } else {
        SUBCOMMAND_TEMPLATE
    };
    let mut cmd = node.grammar.clone().help_template(template);
    if !node.examples.is_empty() {
        cmd = cmd.after_help(examples_section(&node.examples));
    }
    for &child in &node.children {
        cmd = cmd.subcommand(assemble(arena, child));
    }
    cmd
}

/// Root command ready for parsing: argv carries no program name.
pub(crate) fn application(arena: &CommandArena, program: &str, version: Option<&str>) -> Command {
    let mut cmd = assemble(arena, arena.root())
        .bin_name(program.to_string())
        .no_binary_name(true);
    if let Some(version) = version {
        cmd = cmd.version(version.to_string()).arg(
            Arg::new(VERSION_ID)
                .long(VERSION_ID)
                .help(VERSION_TEXT)
                .action(ArgAction::Version),
        );
    }
    cmd
}

/// `Examples:` block, each example as its help line then `$ usage`.
///
/// clap separates after-help from the argument list with a blank line.
fn examples_section(examples: &[Example]) -> String {
    let body = examples
        .iter()
        .map(|e| format!("  {}\n  $ {}", e.help, e.usage))
        .join("\n\n");
    format!("Examples:\n\n{body}")
}

/// Boil a clap error down to a one-line message.
///
/// Unknown flags, arguments and subcommands all read `unexpected <token>`.
pub(crate) fn parse_error(err: &clap::Error) -> ParseError {
    let token = match err.kind() {
        ErrorKind::UnknownArgument => err.get(ContextKind::InvalidArg),
        ErrorKind::InvalidSubcommand => err.get(ContextKind::InvalidSubcommand),
        _ => None,
    };
    if let Some(ContextValue::String(token)) = token {
        return ParseError::unexpected(token);
    }
    ParseError::new(summarize(&err.render().to_string()))
}

fn summarize(rendered: &str) -> String {
    let text = rendered.trim().trim_start_matches("error:").trim_start();
    let first_block = text.split("\n\n").next().unwrap_or(text);
    first_block
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_examples_when_rendering_section_then_keeps_declared_order() {
        let examples = vec![
            Example {
                usage: "say <something>".into(),
                help: "say something".into(),
            },
            Example {
                usage: "say <something> [else]".into(),
                help: "say something else".into(),
            },
        ];
        assert_eq!(
            examples_section(&examples),
            "Examples:\n\n  say something\n  $ say <something>\n\n  say something else\n  $ say <something> [else]"
        );
    }

    #[test]
    fn given_rendered_clap_error_when_summarizing_then_drops_prefix_and_usage() {
        let rendered = "error: the following required arguments were not provided:\n  <NAME>\n\nUsage: say <NAME>\n\nFor more information, try '--help'.\n";
        assert_eq!(
            summarize(rendered),
            "the following required arguments were not provided: <NAME>"
        );
    }

    #[test]
    fn given_unknown_argument_when_mapping_error_then_reads_unexpected_token() {
        let err = new_handle("say", "same command")
            .no_binary_name(true)
            .try_get_matches_from(["blargle"])
            .unwrap_err();
        assert_eq!(parse_error(&err).message(), "unexpected blargle");
    }

    #[test]
    fn given_unknown_flag_when_mapping_error_then_reads_unexpected_token() {
        let err = new_handle("say", "same command")
            .no_binary_name(true)
            .try_get_matches_from(["--nope"])
            .unwrap_err();
        assert_eq!(parse_error(&err).message(), "unexpected --nope");
    }
}
