//! Default-child selection ahead of the grammar parse.
//!
//! clap only descends into a subcommand when its name is on the command
//! line. To select a default child the argument vector is walked once with
//! the tree's own name/alias tables and the default child's name is spliced
//! in wherever no sibling matches.
//!
//! A default child is only taken from a node that declares no positional
//! arguments: when the parent has positionals, an unmatched token is one of
//! its values.

use clap::Arg;
use tracing::{debug, instrument};

use crate::arena::{CommandArena, NodeId};
use crate::grammar::HELP_ID;

/// Return `argv` with default child names inserted.
#[instrument(level = "debug", skip(arena))]
pub(crate) fn expand_defaults(arena: &CommandArena, argv: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(argv.len() + 1);
    let mut current = arena.root();
    let mut help_seen = false;
    let mut i = 0;

    loop {
        let token = argv.get(i).map(String::as_str);
        match token {
            None | Some("--") => {
                if help_seen {
                    break;
                }
                match take_default(arena, current, &mut out) {
                    Some(default) => current = default,
                    None => break,
                }
            }
            Some(t) if is_flag(t) => {
                let (consumed, is_help) = flag_width(arena, current, t);
                help_seen |= is_help;
                let end = (i + consumed).min(argv.len());
                out.extend_from_slice(&argv[i..end]);
                i = end;
            }
            Some(t) => {
                if let Some(child) = arena.child_named(current, t) {
                    out.push(t.to_string());
                    current = child;
                    i += 1;
                    continue;
                }
                match take_default(arena, current, &mut out) {
                    Some(default) => current = default,
                    None => break,
                }
            }
        }
    }

    out.extend_from_slice(&argv[i.min(argv.len())..]);
    out
}

fn take_default(arena: &CommandArena, current: NodeId, out: &mut Vec<String>) -> Option<NodeId> {
    if arena.node(current).has_positionals() {
        return None;
    }
    let default = arena.default_child(current)?;
    let name = arena.node(default).name().to_string();
    debug!(name = %name, "selecting default command");
    out.push(name);
    Some(default)
}

fn is_flag(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

/// Tokens taken by the flag at `token` (itself plus a detached value) and
/// whether it is the help flag. Unknown flags take one token and are left
/// for the grammar to reject.
fn flag_width(arena: &CommandArena, current: NodeId, token: &str) -> (usize, bool) {
    let (arg, inline_value) = if let Some(long) = token.strip_prefix("--") {
        let (name, value) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        (find_flag(arena, current, |a| matches_long(a, name)), value)
    } else {
        let mut chars = token.chars().skip(1);
        let short = chars.next();
        let attached = chars.next().is_some();
        (find_flag(arena, current, |a| a.get_short() == short), attached)
    };

    match arg {
        Some(arg) => {
            let is_help = arg.get_id() == HELP_ID;
            let width = if arg.get_action().takes_values() && !inline_value {
                2
            } else {
                1
            };
            (width, is_help)
        }
        None => (1, false),
    }
}

/// Flag of `current`, or a global flag of one of its ancestors.
fn find_flag(
    arena: &CommandArena,
    current: NodeId,
    matches: impl Fn(&Arg) -> bool,
) -> Option<&Arg> {
    arena.path_to(current).into_iter().rev().find_map(|id| {
        arena
            .node(id)
            .grammar
            .get_arguments()
            .find(|a| (id == current || a.is_global_set()) && matches(a))
    })
}

fn matches_long(arg: &Arg, name: &str) -> bool {
    arg.get_long() == Some(name)
        || arg
            .get_all_aliases()
            .is_some_and(|aliases| aliases.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{flag, update};

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    /// say -> { en (default) -> { formal }, fr }
    fn sample() -> CommandArena {
        let mut arena = CommandArena::new("say", "say things");
        let root = arena.root();
        update(&mut arena.node_mut(root).grammar, |g| {
            g.arg(flag("name", "who to greet"))
        });
        let en = arena.insert_child(root, "en", "say in english");
        arena.node_mut(en).is_default = true;
        arena.insert_child(en, "formal", "be formal");
        arena.insert_child(root, "fr", "say in french");
        arena
    }

    #[test]
    fn given_empty_argv_when_expanding_then_selects_default_child() {
        assert_eq!(expand_defaults(&sample(), &argv(&[])), argv(&["en"]));
    }

    #[test]
    fn given_named_sibling_when_expanding_then_leaves_argv_alone() {
        assert_eq!(expand_defaults(&sample(), &argv(&["fr"])), argv(&["fr"]));
    }

    #[test]
    fn given_unmatched_token_when_expanding_then_default_child_gets_it() {
        assert_eq!(
            expand_defaults(&sample(), &argv(&["formal"])),
            argv(&["en", "formal"])
        );
    }

    #[test]
    fn given_flag_value_when_expanding_then_value_is_not_a_command() {
        assert_eq!(
            expand_defaults(&sample(), &argv(&["--name", "fr"])),
            argv(&["--name", "fr", "en"])
        );
        assert_eq!(
            expand_defaults(&sample(), &argv(&["--name=fr", "fr"])),
            argv(&["--name=fr", "fr"])
        );
    }

    #[test]
    fn given_parent_flag_after_child_when_expanding_then_value_is_skipped() {
        let mut arena = sample();
        let en = arena.child_named(arena.root(), "en").unwrap();
        arena.insert_child(en, "loud", "shout it");
        let formal = arena.child_named(en, "formal").unwrap();
        arena.node_mut(formal).is_default = true;
        assert_eq!(
            expand_defaults(&arena, &argv(&["en", "--name", "loud"])),
            argv(&["en", "--name", "loud", "formal"])
        );
    }

    #[test]
    fn given_help_flag_when_expanding_then_no_default_is_added() {
        assert_eq!(expand_defaults(&sample(), &argv(&["-h"])), argv(&["-h"]));
    }

    #[test]
    fn given_parent_with_positionals_when_expanding_then_default_is_skipped() {
        let mut arena = sample();
        let root = arena.root();
        update(&mut arena.node_mut(root).grammar, |g| {
            g.arg(crate::grammar::positional("words", "what to say"))
        });
        assert_eq!(
            expand_defaults(&arena, &argv(&["hello"])),
            argv(&["hello"])
        );
    }
}
