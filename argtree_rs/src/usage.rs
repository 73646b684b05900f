//! Usage text for any command of the tree.
//!
//! The layout is greedy: every piece (a command name, an argument signature,
//! a description) is appended to the current line, wrapping onto a new
//! line indented under the first breadcrumb once the line width is reached.

use crate::argument::Argument;
use crate::command::CommandId;
use crate::error::Error;
use crate::parser::Parser;

/// Text placed above the usage block.
#[derive(Debug, Clone, Copy)]
pub enum Message<'a> {
    Error(&'a Error),
    Text(&'a str),
}

impl<'a> From<&'a Error> for Message<'a> {
    fn from(error: &'a Error) -> Self {
        Message::Error(error)
    }
}

impl<'a> From<&'a str> for Message<'a> {
    fn from(text: &'a str) -> Self {
        Message::Text(text)
    }
}

impl Parser {
    /// Render usage for `command`, optionally preceded by `message`.
    ///
    /// When a subcommand of `command` happened, its usage is rendered
    /// instead. A `SubcommandRequired` error renders the usage of the command
    /// that is missing its subcommand.
    pub fn render_usage(&self, command: CommandId, message: Option<Message<'_>>) -> String {
        if let Some(child) = self.commands[command.0]
            .children
            .iter()
            .copied()
            .find(|child| self.commands[child.0].happened)
        {
            return self.render_usage(child, message);
        }

        let mut out = String::new();
        match message {
            Some(Message::Error(error)) => {
                out.push_str(&format!("{}\n", error));
                if let Some(target) = error.subcommand_required() {
                    out.push_str(&self.render_usage(target, None));
                    return out;
                }
            }
            Some(Message::Text(text)) => out.push_str(&format!("{}\n", text)),
            None => {}
        }

        let width = self.config.line_width();
        let chain = self.ancestors(command);
        let arguments = self.visible_arguments(&chain);
        let target = &self.commands[command.0];
        let root_name = &self.commands[CommandId::ROOT.0].name;
        let padding = format!("usage: {}", root_name).chars().count();

        out.push_str("usage:");
        for id in chain.iter().rev() {
            append_wrapped(&mut out, &self.commands[id.0].name, width, padding, true);
        }
        if !target.children.is_empty() {
            append_wrapped(&mut out, "<Command>", width, padding, true);
        }
        for argument in &arguments {
            append_wrapped(&mut out, &argument.signature(), width, padding, true);
        }

        out.push_str("\n\n");
        if !target.description.is_empty() && !target.is_hidden() {
            out.push_str(&" ".repeat(padding));
            append_wrapped(&mut out, &target.description, width, padding, true);
            out.push_str("\n\n");
        }

        self.render_commands(&mut out, command, width);
        render_arguments(&mut out, &arguments, width);
        out
    }

    /// Arguments of the whole chain, innermost command first, without
    /// hidden ones and with a single help entry.
    fn visible_arguments(&self, chain: &[CommandId]) -> Vec<&Argument> {
        let mut seen_help = false;
        let mut visible = Vec::new();
        for id in chain {
            for argument in self.arguments(*id) {
                if argument.is_hidden() {
                    continue;
                }
                if argument.is_help() {
                    if seen_help {
                        continue;
                    }
                    seen_help = true;
                }
                visible.push(argument);
            }
        }
        visible
    }

    fn render_commands(&self, out: &mut String, command: CommandId, width: usize) {
        let children: Vec<_> = self.commands[command.0]
            .children
            .iter()
            .map(|id| &self.commands[id.0])
            .filter(|child| !child.is_hidden())
            .collect();
        if children.is_empty() {
            return;
        }

        let padding = children
            .iter()
            .map(|child| child.name.chars().count() + 4)
            .max()
            .unwrap_or_default();

        out.push_str("Commands:\n\n");
        for child in children {
            let mut line = format!("  {}", child.name);
            let fill = padding.saturating_sub(line.chars().count() + 1);
            line.push_str(&" ".repeat(fill));
            append_wrapped(&mut line, &child.description, width, padding, true);
            out.push_str(&line);
            out.push('\n');
        }
        out.push('\n');
    }
}

fn render_arguments(out: &mut String, arguments: &[&Argument], width: usize) {
    if arguments.is_empty() {
        return;
    }

    let padding = arguments
        .iter()
        .map(|argument| argument.long().chars().count() + 9)
        .max()
        .unwrap_or_default();

    out.push_str("Arguments:\n\n");
    for argument in arguments {
        let mut line = match argument.short() {
            Some(short) => format!("  -{}  --{}", short, argument.long()),
            None => format!("      --{}", argument.long()),
        };
        let fill = padding.saturating_sub(line.chars().count());
        line.push_str(&" ".repeat(fill));
        let help = argument.help_message();
        if !help.is_empty() {
            append_wrapped(&mut line, &help, width, padding, true);
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.push('\n');
}

fn last_line(text: &str) -> &str {
    text.rsplit('\n').next().unwrap_or(text)
}

/// Append `piece` after a space, wrapping when the line would reach `width`.
///
/// A piece that does not fit is split on spaces as long as more than a tenth
/// of the line is still free; otherwise it moves whole to a fresh line
/// indented by `padding`. A line holding only indentation is never broken.
fn append_wrapped(
    out: &mut String,
    piece: &str,
    width: usize,
    padding: usize,
    can_split: bool,
) {
    let line = last_line(out);
    let used = line.chars().count();
    if used + 1 + piece.chars().count() >= width {
        let has_room = width.saturating_sub(used) > width / 10;
        if has_room && can_split && piece.contains(' ') {
            for word in piece.split(' ') {
                append_wrapped(out, word, width, padding, false);
            }
            return;
        }
        if !line.trim().is_empty() {
            out.push('\n');
            out.push_str(&" ".repeat(padding));
        }
    }
    out.push(' ');
    out.push_str(piece);
}

// ============================================================================
// Tests
// ============================================================================
