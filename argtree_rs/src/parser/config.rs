//! Parser configuration captured at construction time.
//!
//! The help action is the only place where the engine produces output or
//! ends the process, so both the sink and the exit action live here and can
//! be swapped out by tests.

use std::fmt;

use crate::argument::{check_long_name, parse_short_name};
use crate::error::Result;

/// Receives rendered usage text when a help argument matches.
pub type OutputSink = Box<dyn Fn(&str) + Send + Sync>;

/// Called with status 0 after help was printed.
pub type ExitAction = Box<dyn Fn(i32) + Send + Sync>;

pub const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HelpNames {
    pub(crate) short: Option<char>,
    pub(crate) long: String,
}

pub struct ParserConfig {
    pub(crate) help: Option<HelpNames>,
    pub(crate) exit_on_help: bool,
    pub(crate) width: usize,
    pub(crate) output: OutputSink,
    pub(crate) exit: ExitAction,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            help: Some(HelpNames {
                short: Some('h'),
                long: "help".to_string(),
            }),
            exit_on_help: true,
            width: DEFAULT_WIDTH,
            output: Box::new(|text| print!("{}", text)),
            exit: Box::new(|code| std::process::exit(code)),
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register help under other names than `-h`/`--help`.
    ///
    /// Pass an empty `short` for a long-only help argument.
    pub fn help_names(mut self, short: &str, long: &str) -> Result<Self> {
        let short = parse_short_name(short)?;
        check_long_name(long)?;
        self.help = Some(HelpNames {
            short,
            long: long.to_string(),
        });
        Ok(self)
    }

    /// Do not register a help argument on any command.
    pub fn without_help(mut self) -> Self {
        self.help = None;
        self
    }

    /// When false, help prints usage and the parse returns without calling
    /// the exit action.
    pub fn exit_on_help(mut self, exit: bool) -> Self {
        self.exit_on_help = exit;
        self
    }

    /// Target line width of usage text.
    pub fn width(mut self, width: usize) -> Self {
        self.width = width.max(20);
        self
    }

    pub fn output<F>(mut self, sink: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.output = Box::new(sink);
        self
    }

    pub fn on_exit<F>(mut self, action: F) -> Self
    where
        F: Fn(i32) + Send + Sync + 'static,
    {
        self.exit = Box::new(action);
        self
    }

    pub fn help_enabled(&self) -> bool {
        self.help.is_some()
    }

    pub fn line_width(&self) -> usize {
        self.width
    }
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("help", &self.help)
            .field("exit_on_help", &self.exit_on_help)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults_register_dash_h() {
        let config = ParserConfig::default();
        assert_eq!(
            config.help,
            Some(HelpNames {
                short: Some('h'),
                long: "help".into()
            })
        );
        assert!(config.exit_on_help);
        assert_eq!(config.line_width(), DEFAULT_WIDTH);
    }

    #[test]
    fn custom_help_names_are_validated() {
        assert!(matches!(
            ParserConfig::new().help_names("hh", "help"),
            Err(Error::InvalidShortName(_))
        ));
        let config = ParserConfig::new().help_names("", "usage").unwrap();
        assert_eq!(config.help.map(|h| h.long), Some("usage".to_string()));
    }

    #[test]
    fn width_has_a_floor() {
        assert_eq!(ParserConfig::new().width(5).line_width(), 20);
    }
}
