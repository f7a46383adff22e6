use std::fmt;

use crate::arena::NodeId;
use crate::errors::CallbackResult;
use crate::value::Value;

/// Zero-argument callback used for before-hooks and run actions.
pub type Callback = Box<dyn FnMut() -> CallbackResult>;

/// A usage line with its one-line explanation, shown under `Examples:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Example {
    pub usage: String,
    pub help: String,
}

/// One level of the command tree.
pub struct CommandNode {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) aliases: Vec<String>,
    pub(crate) is_default: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) before_hooks: Vec<Callback>,
    pub(crate) run_action: Option<Callback>,
    pub(crate) examples: Vec<Example>,
    /// Grammar handle for this level only; children are attached when the
    /// whole tree is assembled for a parse.
    pub(crate) grammar: clap::Command,
    pub(crate) values: Vec<Value>,
}

impl CommandNode {
    pub(crate) fn new(name: &str, help: &str, parent: Option<NodeId>) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            aliases: Vec::new(),
            is_default: false,
            parent,
            children: Vec::new(),
            before_hooks: Vec::new(),
            run_action: None,
            examples: Vec::new(),
            grammar: crate::grammar::new_handle(name, help),
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in registration order.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn examples(&self) -> &[Example] {
        &self.examples
    }

    pub fn before_hook_count(&self) -> usize {
        self.before_hooks.len()
    }

    pub fn has_run_action(&self) -> bool {
        self.run_action.is_some()
    }

    /// True if `token` is this node's name or one of its aliases.
    pub fn answers_to(&self, token: &str) -> bool {
        self.name == token || self.aliases.iter().any(|a| a == token)
    }

    pub(crate) fn has_positionals(&self) -> bool {
        self.grammar.get_positionals().next().is_some()
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("name", &self.name)
            .field("help", &self.help)
            .field("aliases", &self.aliases)
            .field("is_default", &self.is_default)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("before_hooks", &self.before_hooks.len())
            .field("run_action", &self.run_action.is_some())
            .field("examples", &self.examples)
            .finish()
    }
}
