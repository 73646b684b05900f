//! Command tree nodes.
//!
//! Commands live in the parser's arena and refer to each other by
//! [`CommandId`]. A command owns its children and arguments through the
//! arena; `parent` is a navigation link only.

use crate::argument::{ArgId, DISABLED_DESCRIPTION};

/// Index of a command inside its parser. The root is always `CommandId::ROOT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandId(pub(crate) usize);

impl CommandId {
    pub const ROOT: CommandId = CommandId(0);
}

#[derive(Debug)]
pub struct Command {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) arguments: Vec<ArgId>,
    pub(crate) children: Vec<CommandId>,
    pub(crate) parent: Option<CommandId>,
    pub(crate) happened: bool,
    pub(crate) parsed: bool,
}

impl Command {
    pub(crate) fn new(name: &str, description: &str, parent: Option<CommandId>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            arguments: Vec::new(),
            children: Vec::new(),
            parent,
            happened: false,
            parsed: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    pub fn children(&self) -> &[CommandId] {
        &self.children
    }

    pub fn argument_ids(&self) -> &[ArgId] {
        &self.arguments
    }

    /// Whether this command's name was matched by the last parse.
    pub fn happened(&self) -> bool {
        self.happened
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }

    pub fn is_hidden(&self) -> bool {
        self.description == DISABLED_DESCRIPTION
    }
}
