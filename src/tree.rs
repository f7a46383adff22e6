//! Root of a command tree and its tree-wide settings.

use std::fmt::Display;
use std::io::{self, Write};

use clap_complete::Shell;
use tracing::{instrument, warn};

use crate::arena::{CommandArena, NodeId};
use crate::builder::NodeMut;
use crate::dispatch::{Dispatcher, Outcome};
use crate::errors::{BuildResult, CallbackResult, DispatchResult};
use crate::grammar;
use crate::value::Value;

/// A program's command hierarchy plus the writer its help and errors go to.
///
/// The writer defaults to standard error ([`CommandTree::new`]); any other
/// `Write` can be injected with [`CommandTree::with_writer`] or swapped in
/// later with [`CommandTree::writer`].
///
/// ```
/// use cmdtree::CommandTree;
///
/// let mut say = CommandTree::with_writer("say", "same command", Vec::new());
/// say.command("en", "say in english")
///     .unwrap()
///     .run(|| Ok(()));
/// say.parse(["en"]).unwrap();
/// ```
pub struct CommandTree<W = io::Stderr> {
    arena: CommandArena,
    program: String,
    version: Option<String>,
    writer: W,
}

impl CommandTree<io::Stderr> {
    pub fn new(name: &str, help: &str) -> Self {
        Self::with_writer(name, help, io::stderr())
    }
}

impl<W: Write> CommandTree<W> {
    pub fn with_writer(name: &str, help: &str, writer: W) -> Self {
        Self {
            arena: CommandArena::new(name, help),
            program: name.to_string(),
            version: None,
            writer,
        }
    }

    /// Redirect help, usage and error text.
    pub fn writer<V: Write>(self, writer: V) -> CommandTree<V> {
        CommandTree {
            arena: self.arena,
            program: self.program,
            version: self.version,
            writer,
        }
    }

    pub fn writer_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Expose `--version` on the root, printing `version`.
    pub fn version(&mut self, version: &str) -> &mut Self {
        self.version = Some(version.to_string());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arena(&self) -> &CommandArena {
        &self.arena
    }

    pub fn root_mut(&mut self) -> NodeMut<'_> {
        let root = self.arena.root();
        NodeMut::new(&mut self.arena, root)
    }

    pub fn node_mut(&mut self, id: NodeId) -> NodeMut<'_> {
        NodeMut::new(&mut self.arena, id)
    }

    pub fn command(&mut self, name: &str, help: &str) -> BuildResult<NodeMut<'_>> {
        self.root_mut().into_command(name, help)
    }

    pub fn flag(&mut self, name: &str, help: &str) -> BuildResult<Value> {
        self.root_mut().flag(name, help)
    }

    pub fn flag_with(
        &mut self,
        name: &str,
        help: &str,
        configure: impl FnOnce(clap::Arg) -> clap::Arg,
    ) -> BuildResult<Value> {
        self.root_mut().flag_with(name, help, configure)
    }

    pub fn arg(&mut self, name: &str, help: &str) -> BuildResult<Value> {
        self.root_mut().arg(name, help)
    }

    pub fn arg_with(
        &mut self,
        name: &str,
        help: &str,
        configure: impl FnOnce(clap::Arg) -> clap::Arg,
    ) -> BuildResult<Value> {
        self.root_mut().arg_with(name, help, configure)
    }

    pub fn example(&mut self, usage: &str, help: &str) -> &mut Self {
        self.root_mut().example(usage, help);
        self
    }

    pub fn before(&mut self, hook: impl FnMut() -> CallbackResult + 'static) -> &mut Self {
        self.root_mut().before(hook);
        self
    }

    pub fn run(&mut self, action: impl FnMut() -> CallbackResult + 'static) -> &mut Self {
        self.root_mut().run(action);
        self
    }

    /// Resolve `argv` (without the program name) and run the selected
    /// command's hooks and action.
    ///
    /// Help and version requests are written to the writer and return
    /// successfully without running anything. Unresolvable input returns a
    /// [`ParseError`](crate::ParseError) and writes nothing. Hook and action
    /// errors are returned as-is and stop the chain.
    pub fn parse<I, T>(&mut self, argv: I) -> DispatchResult<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let argv = argv.into_iter().map(Into::into).collect();
        Dispatcher {
            arena: &mut self.arena,
            writer: &mut self.writer,
            program: &self.program,
            version: self.version.as_deref(),
        }
        .dispatch(argv)
    }

    /// [`parse`](Self::parse), reporting any error through [`fatal`](Self::fatal)
    /// before handing it back. Terminating the process is left to the caller.
    pub fn must_parse<I, T>(&mut self, argv: I) -> DispatchResult<Outcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let result = self.parse(argv);
        if let Err(err) = &result {
            if let Err(e) = self.fatal(err) {
                warn!(error = %e, "cannot write error report");
            }
        }
        result
    }

    /// Write `<program>: error: <message>` followed by the full usage text.
    #[instrument(level = "debug", skip(self, err))]
    pub fn fatal(&mut self, err: &dyn Display) -> io::Result<()> {
        writeln!(self.writer, "{}: error: {}", self.program, err)?;
        writeln!(self.writer)?;
        self.usage()
    }

    /// Write the root usage text.
    pub fn usage(&mut self) -> io::Result<()> {
        let help = self.grammar().render_help();
        write!(self.writer, "{help}")?;
        self.writer.flush()
    }

    /// Write a shell completion script for the whole tree to `out`.
    pub fn completions(&self, shell: Shell, out: &mut dyn Write) {
        let mut cmd = self.grammar();
        clap_complete::generate(shell, &mut cmd, self.program.clone(), out);
    }

    fn grammar(&self) -> clap::Command {
        grammar::application(&self.arena, &self.program, self.version.as_deref())
    }
}
