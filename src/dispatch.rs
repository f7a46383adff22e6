//! Parse-dispatch protocol.
//!
//! One call resolves an argument vector to a single path through the tree
//! and then either renders help/version text, reports a [`ParseError`], or
//! runs the before-hooks of every node on the path (root first, registration
//! order within a node) followed by the selected node's run action.

use std::io::Write;

use clap::error::ErrorKind;
use clap::ArgMatches;
use tracing::{debug, instrument, trace};

use crate::arena::{CommandArena, NodeId};
use crate::errors::{DispatchError, DispatchResult, ParseError};
use crate::{grammar, resolve};

/// How a parse call ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Help was requested and written; no hook or action ran.
    HelpRendered,
    /// Version was requested and written; no hook or action ran.
    VersionRendered,
    /// Hooks and the action (if any) of the resolved command ran.
    /// `path` holds the command names from the root down.
    Completed { path: Vec<String> },
}

pub(crate) struct Dispatcher<'t, W: Write> {
    pub(crate) arena: &'t mut CommandArena,
    pub(crate) writer: &'t mut W,
    pub(crate) program: &'t str,
    pub(crate) version: Option<&'t str>,
}

impl<'t, W: Write> Dispatcher<'t, W> {
    #[instrument(level = "debug", skip(self), fields(program = %self.program))]
    pub(crate) fn dispatch(self, argv: Vec<String>) -> DispatchResult<Outcome> {
        let argv = resolve::expand_defaults(self.arena, &argv);
        let matches = match grammar::application(self.arena, self.program, self.version)
            .try_get_matches_from(argv)
        {
            Ok(matches) => matches,
            Err(err) => return self.short_circuit(err),
        };

        let path = self.resolve_path(&matches)?;
        self.bind_values(&path);
        let path: Vec<NodeId> = path.into_iter().map(|(id, _)| id).collect();
        debug!(path = ?self.arena.names_to(path[path.len() - 1]), "resolved");
        self.run_chain(&path)
    }

    /// Help and version requests end the call successfully; every other
    /// grammar error becomes a [`ParseError`] without writing anything.
    fn short_circuit(self, err: clap::Error) -> DispatchResult<Outcome> {
        let outcome = match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Outcome::HelpRendered
            }
            ErrorKind::DisplayVersion => Outcome::VersionRendered,
            _ => {
                let parse_error = grammar::parse_error(&err);
                debug!(error = %parse_error, "parse failed");
                return Err(parse_error.into());
            }
        };
        debug!(?outcome, "short circuit");
        write!(self.writer, "{}", err.render())
            .and_then(|_| self.writer.flush())
            .map_err(|e| DispatchError::io("writing usage", e))?;
        Ok(outcome)
    }

    /// Pair every node on the matched path with its level of the matches.
    fn resolve_path<'m>(
        &self,
        matches: &'m ArgMatches,
    ) -> DispatchResult<Vec<(NodeId, &'m ArgMatches)>> {
        let mut path = vec![(self.arena.root(), matches)];
        let mut current = self.arena.root();
        let mut level = matches;
        while let Some((name, sub)) = level.subcommand() {
            current = self
                .arena
                .child_named(current, name)
                .ok_or_else(|| ParseError::unexpected(name))?;
            path.push((current, sub));
            level = sub;
        }
        Ok(path)
    }

    fn bind_values(&self, path: &[(NodeId, &ArgMatches)]) {
        for (_, node) in self.arena.iter() {
            node.values.iter().for_each(|v| v.reset());
        }
        for &(id, matches) in path {
            for value in &self.arena.node(id).values {
                value.bind(matches);
            }
        }
    }

    fn run_chain(self, path: &[NodeId]) -> DispatchResult<Outcome> {
        for &id in path {
            let node = self.arena.node_mut(id);
            for (i, hook) in node.before_hooks.iter_mut().enumerate() {
                trace!(command = %node.name, hook = i, "before hook");
                hook().map_err(DispatchError::Hook)?;
            }
        }

        let target = path[path.len() - 1];
        let node = self.arena.node_mut(target);
        match node.run_action.as_mut() {
            Some(action) => {
                trace!(command = %node.name, "run action");
                action().map_err(DispatchError::Action)?;
            }
            None => debug!(command = %node.name, "no run action"),
        }
        Ok(Outcome::Completed {
            path: self.arena.names_to(target),
        })
    }
}
