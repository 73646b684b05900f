//! Per-token matching of one argument.
//!
//! Long form: `--name`, or `--name=value` which carries its single value
//! inline. Short form: `-x`, where arity-1 arguments bundle freely (`-vvc`)
//! and a value-taking argument must close the bundle (`-vp 1080`, `-vp=1080`).

use crate::argument::Argument;
use crate::error::{Error, Result};

const MARKER: char = '-';
const SEPARATOR: char = '=';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Form {
    Long,
    Short(char),
}

/// A positive match of an argument against one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Occurrence {
    /// Occurrences within the token: 1, or more for bundled short flags.
    pub(crate) count: usize,
    pub(crate) form: Form,
    /// Value given after `=`; no further tokens are consumed when present.
    pub(crate) inline: Option<String>,
}

impl Occurrence {
    /// Following tokens this match takes as values.
    pub(crate) fn values_needed(&self, arity: usize) -> usize {
        if self.inline.is_some() {
            0
        } else {
            arity - 1
        }
    }
}

fn is_long_form(name: &str) -> bool {
    name.len() > 2
        && name.starts_with("--")
        && !name[2..].starts_with(MARKER)
}

fn is_short_form(name: &str) -> bool {
    name.len() > 1 && name.starts_with(MARKER) && !name[1..].starts_with(MARKER)
}

/// Decide whether `token` names `arg`.
///
/// `Ok(None)` is no match. Errors are matches that can never succeed: an
/// inline value handed to a flag, an empty inline value, or a value-taking
/// short name repeated inside one bundle.
pub(crate) fn check(arg: &Argument, token: &str) -> Result<Option<Occurrence>> {
    let (name, inline) = match token.split_once(SEPARATOR) {
        Some((name, value)) => (name, Some(value)),
        None => (token, None),
    };

    if is_long_form(name) && name[2..] == *arg.long() {
        return match inline {
            None => Ok(Some(Occurrence {
                count: 1,
                form: Form::Long,
                inline: None,
            })),
            Some(_) if arg.arity() == 1 => Err(Error::TooManyValues {
                argument: arg.display_name(),
            }),
            Some("") => Err(Error::MissingValue {
                argument: arg.display_name(),
            }),
            Some(value) => Ok(Some(Occurrence {
                count: 1,
                form: Form::Long,
                inline: Some(value.to_string()),
            })),
        };
    }

    let Some(short) = arg.short() else {
        return Ok(None);
    };
    if !is_short_form(name) {
        return Ok(None);
    }

    let bundle = &name[1..];
    let count = bundle.chars().filter(|c| *c == short).count();
    if count == 0 {
        return Ok(None);
    }
    let closes_bundle = bundle.ends_with(short);

    if arg.arity() == 1 {
        // An inline value belongs to whatever closes the bundle.
        if inline.is_some() && closes_bundle {
            return Err(Error::TooManyValues {
                argument: arg.display_name(),
            });
        }
        return Ok(Some(Occurrence {
            count,
            form: Form::Short(short),
            inline: None,
        }));
    }

    if count > 1 {
        return Err(Error::ParameterMustFollow {
            argument: arg.display_name(),
        });
    }
    if !closes_bundle {
        return Ok(None);
    }
    match inline {
        Some("") => Err(Error::MissingValue {
            argument: arg.display_name(),
        }),
        inline => Ok(Some(Occurrence {
            count: 1,
            form: Form::Short(short),
            inline: inline.map(str::to_string),
        })),
    }
}

/// What remains of a token after `occurrence` claimed its part, or `None`
/// when nothing is left and the whole slot is consumed.
pub(crate) fn remainder(token: &str, occurrence: &Occurrence) -> Option<String> {
    let Form::Short(short) = occurrence.form else {
        return None;
    };
    let (name, inline) = match token.split_once(SEPARATOR) {
        Some((name, value)) => (name, Some(value)),
        None => (token, None),
    };
    let stripped: String = name.chars().filter(|c| *c != short).collect();
    if stripped.len() <= 1 {
        return None;
    }
    match inline {
        Some(value) if occurrence.inline.is_none() => {
            Some(format!("{}{}{}", stripped, SEPARATOR, value))
        }
        _ => Some(stripped),
    }
}

// ============================================================================
// Tests
// ============================================================================
