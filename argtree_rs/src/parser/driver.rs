//! Recursive parse over the command tree.
//!
//! Each command walks `Unvisited -> NameConsumed -> SubcommandsParsed ->
//! Parsed`. Subcommands run before the command's own arguments, so a token is
//! offered to the innermost invoked command first and to the root last. Only
//! the root reports leftovers, once every visited command had its turn.

use tracing::{debug, trace};

use super::Parser;
use super::coerce;
use super::helpers::suggest_long_name;
use super::matcher::{self, Occurrence};
use super::tokens::Tokens;
use crate::argument::{ArgId, Argument};
use crate::command::CommandId;
use crate::error::{Error, Result};

/// Outcome of scanning the tokens for one argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    Done,
    HelpShown,
}

impl Parser {
    /// Parse a full argument vector, program token included.
    ///
    /// The first token becomes the root's name. The tree is frozen once this
    /// returns, successfully or not: later calls return `Ok(())` without
    /// looking at `argv`.
    pub fn parse<I, S>(&mut self, argv: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.finished {
            return Ok(());
        }
        self.finished = true;

        let mut tokens = Tokens::new(argv);
        self.help_requested = None;
        self.parse_command(CommandId::ROOT, &mut tokens)?;

        if self.help_requested.is_some() {
            return Ok(());
        }

        let leftovers = tokens.leftovers();
        if leftovers.is_empty() {
            return Ok(());
        }
        let visible: Vec<&Argument> = self
            .ancestors(self.invoked_command())
            .into_iter()
            .flat_map(|id| self.arguments(id))
            .collect();
        let suggestion = suggest_long_name(&leftovers, visible);
        Err(Error::UnrecognizedArguments {
            tokens: leftovers,
            suggestion,
        })
    }

    /// Parse arguments without the program token.
    pub fn parse_args<I, S>(&mut self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = self.commands[CommandId::ROOT.0].name.clone();
        self.parse(std::iter::once(name).chain(args.into_iter().map(Into::into)))
    }

    fn parse_command(&mut self, id: CommandId, tokens: &mut Tokens) -> Result<()> {
        if self.commands[id.0].parsed {
            return Ok(());
        }
        let Some(front) = tokens.front() else {
            return Ok(());
        };

        if id == CommandId::ROOT {
            self.commands[id.0].name = front.to_string();
        } else if front != self.commands[id.0].name {
            return Ok(());
        }

        self.commands[id.0].happened = true;
        tokens.consume_front();
        debug!(command = %self.commands[id.0].name, "command invoked");

        let children = self.commands[id.0].children.clone();
        if !children.is_empty() {
            if tokens.is_exhausted() {
                return Err(Error::SubcommandRequired {
                    command: id,
                    name: self.commands[id.0].name.clone(),
                });
            }
            for child in children {
                self.parse_command(child, tokens)?;
                if self.help_requested.is_some() {
                    return Ok(());
                }
                if self.commands[child.0].happened {
                    break;
                }
            }
        }

        let arguments = self.commands[id.0].arguments.clone();
        for arg_id in arguments {
            if self.scan_argument(arg_id, tokens)? == Scan::HelpShown {
                return Ok(());
            }
            self.finish_argument(arg_id)?;
        }

        self.commands[id.0].parsed = true;
        Ok(())
    }

    /// Offer every unclaimed token to one argument.
    fn scan_argument(&mut self, arg_id: ArgId, tokens: &mut Tokens) -> Result<Scan> {
        let mut index = 0;
        while index < tokens.len() {
            let Some(token) = tokens.get(index).map(str::to_string) else {
                index += 1;
                continue;
            };

            let argument = &self.arguments[arg_id.0];
            trace!(argument = %argument.long(), token = %token, "checking token");
            let Some(occurrence) = matcher::check(argument, &token)? else {
                index += 1;
                continue;
            };
            let values = collect_values(tokens, index, &occurrence, argument.arity())
                .ok_or_else(|| Error::MissingValue {
                    argument: argument.display_name(),
                })?;

            if argument.is_help() {
                let owner = argument.owner();
                self.show_help(owner);
                return Ok(Scan::HelpShown);
            }

            self.apply(arg_id, &occurrence, &values)?;
            consume(tokens, index, &token, &occurrence, values.len());
            index += 1;
        }
        Ok(Scan::Done)
    }

    fn apply(&mut self, arg_id: ArgId, occurrence: &Occurrence, values: &[String]) -> Result<()> {
        let argument = &mut self.arguments[arg_id.0];
        if argument.unique && (argument.parsed || occurrence.count > 1) {
            return Err(Error::DuplicateOccurrence {
                argument: argument.display_name(),
            });
        }
        if let Some(validator) = &argument.validator {
            validator(values).map_err(|message| Error::ValidationFailed {
                argument: argument.display_name(),
                message,
            })?;
        }
        coerce::store(argument, values, occurrence.count)?;
        argument.parsed = true;
        debug!(
            argument = %argument.display_name(),
            count = occurrence.count,
            values = values.len(),
            "argument matched"
        );
        Ok(())
    }

    /// Required check and default, once the argument saw every token.
    fn finish_argument(&mut self, arg_id: ArgId) -> Result<()> {
        let argument = &mut self.arguments[arg_id.0];
        if argument.parsed {
            return Ok(());
        }
        if argument.required {
            return Err(Error::MissingRequired {
                argument: argument.display_name(),
            });
        }
        coerce::apply_default(argument)
    }

    fn show_help(&mut self, command: CommandId) {
        debug!(command = %self.commands[command.0].name, "help requested");
        let usage = self.render_usage(command, None);
        (self.config.output)(&usage);
        self.help_requested = Some(command);
        if self.config.exit_on_help {
            (self.config.exit)(0);
        }
    }
}

/// Value tokens of a match: the inline value, or the unclaimed tokens right
/// after `index`. `None` when too few remain.
fn collect_values(
    tokens: &Tokens,
    index: usize,
    occurrence: &Occurrence,
    arity: usize,
) -> Option<Vec<String>> {
    if let Some(inline) = &occurrence.inline {
        return Some(vec![inline.clone()]);
    }
    (1..=occurrence.values_needed(arity))
        .map(|offset| tokens.get(index + offset).map(str::to_string))
        .collect()
}

fn consume(tokens: &mut Tokens, index: usize, token: &str, occurrence: &Occurrence, values: usize) {
    match matcher::remainder(token, occurrence) {
        Some(rest) => tokens.rewrite(index, rest),
        None => tokens.consume(index),
    }
    if occurrence.inline.is_none() {
        for offset in 1..=values {
            tokens.consume(index + offset);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
