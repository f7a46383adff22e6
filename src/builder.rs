//! Mutable node handles used while declaring the tree.

use clap::Arg;
use tracing::{debug, instrument};

use crate::arena::{CommandArena, NodeId};
use crate::errors::{BuildError, BuildResult, CallbackResult};
use crate::grammar;
use crate::node::{CommandNode, Example};
use crate::value::Value;

/// Mutable handle to one node of a [`CommandTree`](crate::CommandTree).
///
/// Obtained from [`CommandTree::command`](crate::CommandTree::command),
/// [`CommandTree::root_mut`](crate::CommandTree::root_mut) or from another
/// handle's [`command`](NodeMut::command).
pub struct NodeMut<'a> {
    arena: &'a mut CommandArena,
    id: NodeId,
}

impl<'a> NodeMut<'a> {
    pub(crate) fn new(arena: &'a mut CommandArena, id: NodeId) -> Self {
        Self { arena, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn node(&self) -> &CommandNode {
        self.arena.node(self.id)
    }

    fn node_mut(&mut self) -> &mut CommandNode {
        self.arena.node_mut(self.id)
    }

    /// Create a nested command.
    ///
    /// Fails if `name` is already the name or alias of a sibling.
    pub fn command(&mut self, name: &str, help: &str) -> BuildResult<NodeMut<'_>> {
        NodeMut::new(&mut *self.arena, self.id).into_command(name, help)
    }

    /// Like [`command`](NodeMut::command), handing over this handle's borrow.
    #[instrument(level = "debug", skip(self), fields(parent = %self.node().name))]
    pub(crate) fn into_command(self, name: &str, help: &str) -> BuildResult<NodeMut<'a>> {
        self.ensure_free(self.id, name)?;
        let child = self.arena.insert_child(self.id, name, help);
        Ok(NodeMut::new(self.arena, child))
    }

    /// Reopen an existing child by name or alias.
    pub fn child(&mut self, name: &str) -> Option<NodeMut<'_>> {
        let child = self.arena.child_named(self.id, name)?;
        Some(NodeMut::new(&mut *self.arena, child))
    }

    /// Alternate name, resolved exactly like the primary one.
    #[instrument(level = "debug", skip(self), fields(command = %self.node().name))]
    pub fn alias(&mut self, name: &str) -> BuildResult<&mut Self> {
        if let Some(parent) = self.node().parent {
            self.ensure_free(parent, name)?;
        }
        let node = self.node_mut();
        node.aliases.push(name.to_string());
        grammar::update(&mut node.grammar, |g| g.alias(name.to_string()));
        Ok(self)
    }

    /// Make this the command selected when no sibling matches.
    ///
    /// Marking the same node twice is a no-op; the root has no siblings and
    /// is left unchanged.
    #[instrument(level = "debug", skip(self), fields(command = %self.node().name))]
    pub fn mark_default(&mut self) -> BuildResult<&mut Self> {
        let Some(parent) = self.node().parent else {
            debug!("root command cannot be a default");
            return Ok(self);
        };
        if let Some(existing) = self.arena.default_child(parent) {
            if existing != self.id {
                return Err(BuildError::MultipleDefaults {
                    parent: self.arena.node(parent).name.clone(),
                    existing: self.arena.node(existing).name.clone(),
                    requested: self.node().name.clone(),
                });
            }
        }
        self.node_mut().is_default = true;
        Ok(self)
    }

    /// Long flag `--<name>` taking one value.
    pub fn flag(&mut self, name: &str, help: &str) -> BuildResult<Value> {
        self.flag_with(name, help, |a| a)
    }

    /// Long flag `--<name>`, further configured through clap's [`Arg`] builder.
    #[instrument(level = "debug", skip(self, configure), fields(command = %self.node().name))]
    pub fn flag_with(
        &mut self,
        name: &str,
        help: &str,
        configure: impl FnOnce(Arg) -> Arg,
    ) -> BuildResult<Value> {
        let arg = configure(grammar::flag(name, help));
        // clap rejects required globals
        let arg = if arg.is_required_set() {
            arg.global(false)
        } else {
            arg
        };
        self.register(arg)
    }

    /// Positional argument, in declaration order.
    pub fn arg(&mut self, name: &str, help: &str) -> BuildResult<Value> {
        self.arg_with(name, help, |a| a)
    }

    /// Positional argument, further configured through clap's [`Arg`] builder.
    #[instrument(level = "debug", skip(self, configure), fields(command = %self.node().name))]
    pub fn arg_with(
        &mut self,
        name: &str,
        help: &str,
        configure: impl FnOnce(Arg) -> Arg,
    ) -> BuildResult<Value> {
        self.register(configure(grammar::positional(name, help)))
    }

    pub fn example(&mut self, usage: &str, help: &str) -> &mut Self {
        self.node_mut().examples.push(Example {
            usage: usage.to_string(),
            help: help.to_string(),
        });
        self
    }

    /// Add a hook run before any descendant's hooks and the selected action.
    pub fn before(&mut self, hook: impl FnMut() -> CallbackResult + 'static) -> &mut Self {
        self.node_mut().before_hooks.push(Box::new(hook));
        self
    }

    /// Set the action run when this command is selected; replaces any earlier one.
    pub fn run(&mut self, action: impl FnMut() -> CallbackResult + 'static) -> &mut Self {
        let node = self.node_mut();
        if node.run_action.is_some() {
            debug!(command = %node.name, "replacing run action");
        }
        node.run_action = Some(Box::new(action));
        self
    }

    /// Hand this node to a configuration function.
    pub fn configure(&mut self, f: impl FnOnce(&mut NodeMut<'a>)) -> &mut Self {
        f(self);
        self
    }

    fn ensure_free(&self, parent: NodeId, name: &str) -> BuildResult<()> {
        if self.arena.child_named(parent, name).is_some() {
            return Err(BuildError::DuplicateName {
                parent: self.arena.node(parent).name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn register(&mut self, arg: Arg) -> BuildResult<Value> {
        let id = arg.get_id().as_str().to_string();
        if grammar::is_reserved(&id) {
            return Err(BuildError::ReservedName(id));
        }
        if self.node().parent.is_none() && arg.get_long() == Some(grammar::VERSION_ID) {
            return Err(BuildError::ReservedName(grammar::VERSION_ID.to_string()));
        }
        if self.clashes_with_tree(&arg) {
            return Err(BuildError::DuplicateArgument {
                command: self.node().name.clone(),
                name: id,
            });
        }
        let node = self.node_mut();
        grammar::update(&mut node.grammar, |g| g.arg(arg));
        let value = Value::new(id);
        node.values.push(value.clone());
        Ok(value)
    }

    /// Whether `arg` collides with an argument clap would see next to it:
    /// those on this node, global flags of ancestors and, for a global
    /// flag, everything below.
    fn clashes_with_tree(&self, arg: &Arg) -> bool {
        let path = self.arena.path_to(self.id);
        let ancestors = path[..path.len() - 1]
            .iter()
            .flat_map(|&id| self.arena.node(id).grammar.get_arguments())
            .filter(|existing| existing.is_global_set());
        let descendants = self
            .arena
            .subtree(self.id)
            .skip(1)
            .filter(|_| arg.is_global_set())
            .flat_map(|(_, node)| node.grammar.get_arguments());
        self.node()
            .grammar
            .get_arguments()
            .chain(ancestors)
            .chain(descendants)
            .any(|existing| clashes(existing, arg))
    }
}

fn clashes(existing: &Arg, arg: &Arg) -> bool {
    existing.get_id() == arg.get_id()
        || (arg.get_long().is_some() && existing.get_long() == arg.get_long())
        || (arg.get_short().is_some() && existing.get_short() == arg.get_short())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::ArgAction;

    #[test]
    fn given_sibling_name_when_creating_command_then_fails() {
        let mut arena = CommandArena::new("say", "same command");
        let root_id = arena.root();
        let mut root = NodeMut::new(&mut arena, root_id);
        root.command("en", "say in english").unwrap();
        let err = root.command("en", "again").err();
        assert_eq!(
            err,
            Some(BuildError::DuplicateName {
                parent: "say".into(),
                name: "en".into()
            })
        );
    }

    #[test]
    fn given_sibling_alias_when_creating_command_then_fails() {
        let mut arena = CommandArena::new("say", "same command");
        let root_id = arena.root();
        let mut root = NodeMut::new(&mut arena, root_id);
        root.command("en", "say in english")
            .unwrap()
            .alias("english")
            .unwrap();
        assert!(matches!(
            root.command("english", "again"),
            Err(BuildError::DuplicateName { .. })
        ));
        let mut fr = root.command("fr", "say in french").unwrap();
        assert!(matches!(
            fr.alias("en"),
            Err(BuildError::DuplicateName { .. })
        ));
    }

    #[test]
    fn given_reserved_or_duplicate_flag_when_registering_then_fails() {
        let mut arena = CommandArena::new("say", "same command");
        let root_id = arena.root();
        let mut root = NodeMut::new(&mut arena, root_id);
        assert_eq!(
            root.flag("help", "mine").unwrap_err(),
            BuildError::ReservedName("help".into())
        );
        root.flag_with("loud", "shout", |a| a.short('l').action(ArgAction::SetTrue))
            .unwrap();
        assert!(matches!(
            root.flag("loud", "again"),
            Err(BuildError::DuplicateArgument { .. })
        ));
        assert!(matches!(
            root.flag_with("lower", "whisper", |a| a.short('l')),
            Err(BuildError::DuplicateArgument { .. })
        ));
        assert!(matches!(
            root.flag_with("quiet", "hush", |a| a.short('h')),
            Err(BuildError::DuplicateArgument { .. })
        ));
    }

    #[test]
    fn given_version_long_when_registering_then_reserved_on_root_only() {
        let mut arena = CommandArena::new("say", "same command");
        let root_id = arena.root();
        let mut root = NodeMut::new(&mut arena, root_id);
        assert_eq!(
            root.flag_with("ver", "which release", |a| a.long("version"))
                .unwrap_err(),
            BuildError::ReservedName("version".into())
        );
        let mut en = root.command("en", "say in english").unwrap();
        assert!(en.flag_with("ver", "which release", |a| a.long("version")).is_ok());
    }

    #[test]
    fn given_parent_flag_when_relative_reuses_it_then_duplicate_argument() {
        let mut arena = CommandArena::new("say", "same command");
        let root_id = arena.root();
        let mut root = NodeMut::new(&mut arena, root_id);
        root.flag_with("loud", "shout", |a| a.short('l').action(ArgAction::SetTrue))
            .unwrap();
        let mut en = root.command("en", "say in english").unwrap();
        assert!(matches!(
            en.flag_with("lower", "whisper", |a| a.short('l')),
            Err(BuildError::DuplicateArgument { .. })
        ));
        assert!(matches!(
            en.arg("loud", "what to shout"),
            Err(BuildError::DuplicateArgument { .. })
        ));
        en.flag("times", "repeat").unwrap();
        assert_eq!(
            root.flag("times", "again").unwrap_err(),
            BuildError::DuplicateArgument {
                command: "say".into(),
                name: "times".into()
            }
        );
    }

    #[test]
    fn given_required_flag_when_registering_then_kept_local() {
        let mut arena = CommandArena::new("say", "same command");
        let root_id = arena.root();
        let mut root = NodeMut::new(&mut arena, root_id);
        root.flag_with("name", "who", |a| a.required(true)).unwrap();
        root.flag("lang", "language").unwrap();
        let args: Vec<_> = root
            .node()
            .grammar
            .get_arguments()
            .filter(|a| a.get_id() != grammar::HELP_ID)
            .map(|a| (a.get_id().as_str().to_string(), a.is_global_set()))
            .collect();
        assert_eq!(
            args,
            vec![("name".to_string(), false), ("lang".to_string(), true)]
        );
    }

    #[test]
    fn given_second_run_action_when_set_then_replaces_first() {
        let mut arena = CommandArena::new("say", "same command");
        let root_id = arena.root();
        let mut root = NodeMut::new(&mut arena, root_id);
        root.run(|| Err("first".into())).run(|| Ok(()));
        assert!(root.node().has_run_action());

        let action = arena.node_mut(root_id).run_action.as_mut().unwrap();
        assert!(action().is_ok());
    }
}
