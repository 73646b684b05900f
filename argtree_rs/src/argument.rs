//! Declared arguments: names, kind, constraints and the cell they fill.

use std::fmt;

use crate::command::CommandId;
use crate::error::{Error, Result};
use crate::value::{DefaultValue, Kind, Value};

/// Description that hides a command or an argument from usage output.
pub const DISABLED_DESCRIPTION: &str = "DISABLEDDESCRIPTIONWILLNOTSHOWUP";

/// Callback run on the raw value tokens of every match, before coercion.
pub type Validator = Box<dyn Fn(&[String]) -> std::result::Result<(), String> + Send + Sync>;

/// Index of an argument inside its parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgId(pub(crate) usize);

/// Optional constraints for a declared argument.
#[derive(Default)]
pub struct ArgOptions {
    pub(crate) required: bool,
    pub(crate) help: String,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) validator: Option<Validator>,
}

impl ArgOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the parse with `MissingRequired` when the argument never matches.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    /// Keep the argument out of usage output.
    pub fn hidden(mut self) -> Self {
        self.help = DISABLED_DESCRIPTION.to_string();
        self
    }

    pub fn default_value(mut self, value: impl Into<DefaultValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Check the raw tokens of every occurrence; an `Err` message aborts the
    /// parse with `ValidationFailed`.
    pub fn validate<F>(mut self, validator: F) -> Self
    where
        F: Fn(&[String]) -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        self.validator = Some(Box::new(validator));
        self
    }
}

impl fmt::Debug for ArgOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgOptions")
            .field("required", &self.required)
            .field("help", &self.help)
            .field("default", &self.default)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Regular,
    Help,
}

/// An argument bound to one command and one value cell.
pub struct Argument {
    pub(crate) owner: CommandId,
    pub(crate) short: Option<char>,
    pub(crate) long: String,
    pub(crate) kind: Kind,
    pub(crate) unique: bool,
    pub(crate) required: bool,
    pub(crate) help: String,
    pub(crate) default: Option<DefaultValue>,
    pub(crate) validator: Option<Validator>,
    pub(crate) role: Role,
    pub(crate) parsed: bool,
    pub(crate) value: Value,
}

impl Argument {
    pub(crate) fn new(
        owner: CommandId,
        short: &str,
        long: &str,
        kind: Kind,
        options: ArgOptions,
    ) -> Result<Self> {
        let short = parse_short_name(short)?;
        check_long_name(long)?;
        Ok(Self {
            owner,
            short,
            long: long.to_string(),
            unique: kind.is_unique(),
            value: kind.zero_value(),
            kind,
            required: options.required,
            help: options.help,
            default: options.default,
            validator: options.validator,
            role: Role::Regular,
            parsed: false,
        })
    }

    /// The auto-registered help argument. Names are validated by the config.
    pub(crate) fn help_for(owner: CommandId, short: Option<char>, long: &str) -> Self {
        Self {
            owner,
            short,
            long: long.to_string(),
            kind: Kind::Flag,
            unique: true,
            required: false,
            help: "Print help information".to_string(),
            default: None,
            validator: None,
            role: Role::Help,
            parsed: false,
            value: Value::Flag(false),
        }
    }

    pub fn owner(&self) -> CommandId {
        self.owner
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn long(&self) -> &str {
        &self.long
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn is_hidden(&self) -> bool {
        self.help == DISABLED_DESCRIPTION
    }

    pub fn is_help(&self) -> bool {
        self.role == Role::Help
    }

    /// True once the command line supplied a value; defaults do not count.
    pub fn was_matched(&self) -> bool {
        self.parsed
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub(crate) fn arity(&self) -> usize {
        self.kind.arity()
    }

    /// `-p|--port`, or `--port` without a short name.
    pub fn display_name(&self) -> String {
        match self.short {
            Some(short) => format!("-{}|--{}", short, self.long),
            None => format!("--{}", self.long),
        }
    }

    /// Usage-line rendering, bracketed when the argument is optional.
    pub fn signature(&self) -> String {
        let name = self.display_name();
        let body = match &self.kind {
            Kind::Flag | Kind::Counter => name,
            Kind::Int => format!("{} <integer>", name),
            Kind::Float => format!("{} <float>", name),
            Kind::Text => format!("{} \"<value>\"", name),
            Kind::File(_) => format!("{} <file>", name),
            Kind::Selector(allowed) => format!("{} ({})", name, allowed.join("|")),
            Kind::List(element) => {
                let one = format!("{} {}", name, element.placeholder());
                format!("{} [{} ...]", one, one)
            }
        };
        if self.required {
            body
        } else {
            format!("[{}]", body)
        }
    }

    /// Help text for the `Arguments:` section.
    pub(crate) fn help_message(&self) -> String {
        let mut message = self.help.clone();
        if message.is_empty() {
            return message;
        }
        if let (false, Some(default)) = (self.required, &self.default) {
            message.push_str(&format!(". Default: {}", default));
        }
        message
    }

    /// Name shared with `other`, rendered the way it appears on the command line.
    pub(crate) fn clashes_with(&self, other: &Argument) -> Option<String> {
        if let (Some(mine), Some(theirs)) = (self.short, other.short) {
            if mine == theirs {
                return Some(format!("short name -{}", mine));
            }
        }
        if self.long == other.long {
            return Some(format!("long name --{}", self.long));
        }
        None
    }
}

impl fmt::Debug for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Argument")
            .field("owner", &self.owner)
            .field("short", &self.short)
            .field("long", &self.long)
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("parsed", &self.parsed)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

/// Short names are empty (none) or exactly one character other than the
/// marker and the value separator.
pub(crate) fn parse_short_name(short: &str) -> Result<Option<char>> {
    let mut chars = short.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Ok(None),
        (Some(c), None) if c != '-' && c != '=' && !c.is_whitespace() => Ok(Some(c)),
        _ => Err(Error::InvalidShortName(short.to_string())),
    }
}

pub(crate) fn check_long_name(long: &str) -> Result<()> {
    if long.is_empty() || long.starts_with('-') || long.contains('=') {
        return Err(Error::InvalidLongName(long.to_string()));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ListKind;
    use std::fs::OpenOptions;

    fn declare(short: &str, long: &str, kind: Kind, options: ArgOptions) -> Argument {
        Argument::new(CommandId::ROOT, short, long, kind, options).unwrap()
    }

    #[test]
    fn short_name_must_be_one_character() {
        assert_eq!(parse_short_name("").unwrap(), None);
        assert_eq!(parse_short_name("p").unwrap(), Some('p'));
        assert!(matches!(
            parse_short_name("pp"),
            Err(Error::InvalidShortName(name)) if name == "pp"
        ));
        assert!(parse_short_name("-").is_err());
    }

    #[test]
    fn long_name_must_be_present() {
        assert!(matches!(
            Argument::new(CommandId::ROOT, "p", "", Kind::Text, ArgOptions::new()),
            Err(Error::InvalidLongName(_))
        ));
        assert!(check_long_name("a=b").is_err());
        assert!(check_long_name("port").is_ok());
    }

    #[test]
    fn signatures_follow_kind() {
        let port = declare("p", "port", Kind::Text, ArgOptions::new());
        assert_eq!(port.signature(), "[-p|--port \"<value>\"]");

        let count = declare("", "count", Kind::Int, ArgOptions::new().required());
        assert_eq!(count.signature(), "--count <integer>");

        let mode = declare(
            "m",
            "mode",
            Kind::Selector(vec!["fast".into(), "slow".into()]),
            ArgOptions::new(),
        );
        assert_eq!(mode.signature(), "[-m|--mode (fast|slow)]");

        let input = declare("i", "input", Kind::File(OpenOptions::new()), ArgOptions::new());
        assert_eq!(input.signature(), "[-i|--input <file>]");

        let verbose = declare("v", "verbose", Kind::Counter, ArgOptions::new());
        assert_eq!(verbose.signature(), "[-v|--verbose]");
    }

    #[test]
    fn list_signature_repeats_itself() {
        let allow = declare("a", "allow", Kind::List(ListKind::Text), ArgOptions::new());
        assert_eq!(
            allow.signature(),
            "[-a|--allow \"<value>\" [-a|--allow \"<value>\" ...]]"
        );
    }

    #[test]
    fn help_message_mentions_default_of_optional_arguments() {
        let port = declare(
            "p",
            "port",
            Kind::Text,
            ArgOptions::new().help("Listen port").default_value("1080"),
        );
        assert_eq!(port.help_message(), "Listen port. Default: 1080");

        let user = declare(
            "u",
            "user",
            Kind::Text,
            ArgOptions::new()
                .help("User name")
                .default_value("anon")
                .required(),
        );
        assert_eq!(user.help_message(), "User name");
    }

    #[test]
    fn clash_reports_the_shared_name() {
        let a = declare("p", "port", Kind::Text, ArgOptions::new());
        let b = declare("p", "peer", Kind::Text, ArgOptions::new());
        let c = declare("", "port", Kind::Int, ArgOptions::new());
        let d = declare("q", "quiet", Kind::Flag, ArgOptions::new());

        assert_eq!(a.clashes_with(&b).as_deref(), Some("short name -p"));
        assert_eq!(a.clashes_with(&c).as_deref(), Some("long name --port"));
        assert_eq!(a.clashes_with(&d), None);
    }

    #[test]
    fn unique_follows_kind() {
        assert!(declare("p", "port", Kind::Text, ArgOptions::new()).unique);
        assert!(!declare("v", "verbose", Kind::Counter, ArgOptions::new()).unique);
        assert!(!declare("f", "force", Kind::Flag, ArgOptions::new()).unique);
    }
}
