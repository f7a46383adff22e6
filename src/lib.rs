//! Hierarchical command trees on top of clap.
//!
//! Declare a root command and nested subcommands, attach flags, arguments,
//! examples, before-hooks and a run action to each, then hand an argument
//! vector to [`CommandTree::parse`]. The vector is resolved to exactly one
//! command path; the before-hooks of every command on that path run root
//! first, followed by the selected command's run action.
//!
//! ```
//! use cmdtree::{CommandTree, Outcome};
//!
//! let mut say = CommandTree::with_writer("say", "same command", Vec::new());
//! say.before(|| Ok(()));
//! let mut en = say.command("en", "say in english").unwrap();
//! let words = en.arg("words", "what to say").unwrap();
//! en.run(move || {
//!     println!("{}", words.get().unwrap_or_default());
//!     Ok(())
//! });
//!
//! let outcome = say.parse(["en", "hello"]).unwrap();
//! assert_eq!(outcome, Outcome::Completed { path: vec!["say".into(), "en".into()] });
//! ```

pub mod arena;
pub mod builder;
pub mod dispatch;
pub mod errors;
pub mod exitcode;
mod grammar;
pub mod node;
pub mod outline;
mod resolve;
pub mod tree;
pub mod util;
pub mod value;

pub use arena::{CommandArena, NodeId};
pub use builder::NodeMut;
pub use dispatch::Outcome;
pub use errors::{
    BuildError, BuildResult, CallbackError, CallbackResult, DispatchError, DispatchResult,
    ParseError,
};
pub use node::{CommandNode, Example};
pub use outline::CommandOutline;
pub use tree::CommandTree;
pub use value::Value;
