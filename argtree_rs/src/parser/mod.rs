//! The parser: an arena of commands and arguments plus the declaration API.
//!
//! # Module Structure
//!
//! - [`config`] - construction-time settings (help names, sink, exit action, width)
//! - `tokens` - the shared token vector with its consumption mask
//! - `matcher` - per-token matching of one argument
//! - `coerce` - storing values and applying defaults
//! - `driver` - the recursive parse over the command tree
//! - `helpers` - "did you mean" suggestions
//!
//! # Usage
//!
//! ```
//! use argtree::{ArgOptions, Parser};
//!
//! let mut parser = Parser::new("proxy", "SOCKS5 proxy");
//! let root = parser.root();
//! let port = parser
//!     .text(root, "p", "port", ArgOptions::new().default_value("1080"))
//!     .unwrap();
//!
//! parser.parse(["proxy", "--port=9050"]).unwrap();
//! assert_eq!(parser.get(&port), "9050");
//! ```

pub mod config;

mod coerce;
mod driver;
mod helpers;
mod matcher;
mod tokens;

use std::fs::OpenOptions;

use crate::argument::{ArgId, ArgOptions, Argument};
use crate::command::{Command, CommandId};
use crate::error::{Error, Result};
use crate::value::{CellValue, Handle, Kind, ListKind, OpenedFile};

pub use config::ParserConfig;

#[derive(Debug)]
pub struct Parser {
    pub(crate) commands: Vec<Command>,
    pub(crate) arguments: Vec<Argument>,
    pub(crate) config: ParserConfig,
    pub(crate) help_requested: Option<CommandId>,
    /// Set once `parse` ran, whatever its outcome.
    pub(crate) finished: bool,
}

impl Parser {
    /// Create a root command with the default configuration.
    pub fn new(name: &str, description: &str) -> Self {
        Self::with_config(name, description, ParserConfig::default())
    }

    pub fn with_config(name: &str, description: &str, config: ParserConfig) -> Self {
        let mut parser = Self {
            commands: vec![Command::new(name, description, None)],
            arguments: Vec::new(),
            config,
            help_requested: None,
            finished: false,
        };
        parser.install_help(CommandId::ROOT);
        parser
    }

    pub fn root(&self) -> CommandId {
        CommandId::ROOT
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Append a subcommand to `parent`.
    ///
    /// # Panics
    ///
    /// If `parent` was issued by another parser.
    pub fn add_command(&mut self, parent: CommandId, name: &str, description: &str) -> CommandId {
        let id = CommandId(self.commands.len());
        self.commands.push(Command::new(name, description, Some(parent)));
        self.commands[parent.0].children.push(id);
        self.install_help(id);
        id
    }

    fn install_help(&mut self, command: CommandId) {
        let Some(names) = &self.config.help else {
            return;
        };
        let help = Argument::help_for(command, names.short, &names.long);
        let id = ArgId(self.arguments.len());
        self.arguments.push(help);
        self.commands[command.0].arguments.push(id);
    }

    // ------------------------------------------------------------------
    // Declaration
    // ------------------------------------------------------------------

    /// Boolean switch; bundles with other short flags (`-vc`).
    pub fn flag(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        options: ArgOptions,
    ) -> Result<Handle<bool>> {
        self.declare(command, short, long, Kind::Flag, options)
    }

    /// Number of occurrences; `-vvv` counts three.
    pub fn counter(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        options: ArgOptions,
    ) -> Result<Handle<i64>> {
        self.declare(command, short, long, Kind::Counter, options)
    }

    pub fn int(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        options: ArgOptions,
    ) -> Result<Handle<i64>> {
        self.declare(command, short, long, Kind::Int, options)
    }

    pub fn float(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        options: ArgOptions,
    ) -> Result<Handle<f64>> {
        self.declare(command, short, long, Kind::Float, options)
    }

    pub fn text(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        options: ArgOptions,
    ) -> Result<Handle<String>> {
        self.declare(command, short, long, Kind::Text, options)
    }

    /// Path opened with `open` as soon as it matches or its default applies.
    pub fn file(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        open: OpenOptions,
        options: ArgOptions,
    ) -> Result<Handle<Option<OpenedFile>>> {
        self.declare(command, short, long, Kind::File(open), options)
    }

    /// Text that must be one of `allowed`.
    pub fn selector<I, S>(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        allowed: I,
        options: ArgOptions,
    ) -> Result<Handle<String>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = allowed.into_iter().map(Into::into).collect();
        self.declare(command, short, long, Kind::Selector(allowed), options)
    }

    pub fn int_list(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        options: ArgOptions,
    ) -> Result<Handle<Vec<i64>>> {
        self.declare(command, short, long, Kind::List(ListKind::Int), options)
    }

    pub fn float_list(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        options: ArgOptions,
    ) -> Result<Handle<Vec<f64>>> {
        self.declare(command, short, long, Kind::List(ListKind::Float), options)
    }

    pub fn text_list(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        options: ArgOptions,
    ) -> Result<Handle<Vec<String>>> {
        self.declare(command, short, long, Kind::List(ListKind::Text), options)
    }

    pub fn file_list(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        open: OpenOptions,
        options: ArgOptions,
    ) -> Result<Handle<Vec<OpenedFile>>> {
        self.declare(command, short, long, Kind::List(ListKind::File(open)), options)
    }

    fn declare<T: CellValue>(
        &mut self,
        command: CommandId,
        short: &str,
        long: &str,
        kind: Kind,
        options: ArgOptions,
    ) -> Result<Handle<T>> {
        let argument = Argument::new(command, short, long, kind, options)?;
        self.check_collisions(command, &argument)?;

        let id = ArgId(self.arguments.len());
        self.arguments.push(argument);
        self.commands[command.0].arguments.push(id);
        Ok(Handle::new(id))
    }

    /// A name must be free on the command, on every ancestor and on every
    /// descendant. Help arguments never reach this check, so each level
    /// keeps its own.
    fn check_collisions(&self, command: CommandId, argument: &Argument) -> Result<()> {
        let mut scope = self.ancestors(command);
        scope.extend(self.descendants(command));

        for id in scope {
            for existing in &self.commands[id.0].arguments {
                if let Some(name) = argument.clashes_with(&self.arguments[existing.0]) {
                    return Err(Error::DuplicateName { name });
                }
            }
        }
        Ok(())
    }

    /// `command` and its ancestors, innermost first.
    pub(crate) fn ancestors(&self, command: CommandId) -> Vec<CommandId> {
        let mut chain = vec![command];
        let mut current = self.commands[command.0].parent;
        while let Some(id) = current {
            chain.push(id);
            current = self.commands[id.0].parent;
        }
        chain
    }

    fn descendants(&self, command: CommandId) -> Vec<CommandId> {
        let mut found = Vec::new();
        let mut stack: Vec<CommandId> = self.commands[command.0].children.clone();
        while let Some(id) = stack.pop() {
            found.push(id);
            stack.extend(self.commands[id.0].children.iter().copied());
        }
        found
    }

    // ------------------------------------------------------------------
    // Reading results
    // ------------------------------------------------------------------

    /// Current content of a value cell.
    ///
    /// # Panics
    ///
    /// If `handle` was issued by another parser.
    pub fn get<T: CellValue>(&self, handle: &Handle<T>) -> &T {
        let argument = &self.arguments[handle.id().0];
        match T::from_value(&argument.value) {
            Some(value) => value,
            None => panic!(
                "handle {:?} does not belong to this parser (found {})",
                handle.id(),
                argument.kind.describe()
            ),
        }
    }

    /// Whether the command line supplied the value, as opposed to a default.
    pub fn matched<T>(&self, handle: &Handle<T>) -> bool {
        self.arguments[handle.id().0].parsed
    }

    pub fn argument(&self, id: ArgId) -> &Argument {
        &self.arguments[id.0]
    }

    /// Arguments declared on `command`, in declaration order.
    pub fn arguments(&self, command: CommandId) -> impl Iterator<Item = &Argument> {
        self.commands[command.0]
            .arguments
            .iter()
            .map(|id| &self.arguments[id.0])
    }

    pub fn command(&self, id: CommandId) -> &Command {
        &self.commands[id.0]
    }

    pub fn happened(&self, id: CommandId) -> bool {
        self.commands[id.0].happened
    }

    /// Deepest command whose name matched; the root when none below it did.
    pub fn invoked_command(&self) -> CommandId {
        let mut current = CommandId::ROOT;
        while let Some(child) = self.commands[current.0]
            .children
            .iter()
            .copied()
            .find(|child| self.commands[child.0].happened)
        {
            current = child;
        }
        current
    }

    /// The command whose help argument fired during the last parse.
    pub fn help_requested(&self) -> Option<CommandId> {
        self.help_requested
    }
}

// ============================================================================
// Tests
// ============================================================================
