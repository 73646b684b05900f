//! # argtree
//!
//! **Hierarchical command-line parsing** - declare typed value cells and
//! nested subcommands, hand over the argument vector, read the results.
//!
//! ## Features
//!
//! - **Typed cells** - flags, counters, integers, floats, text, files,
//!   selectors and lists of each, read back through typed handles
//! - **Subcommand trees** - any depth, with arguments inherited down the chain
//! - **Short-flag bundles** - `-vvc`, `-vp 1080`, `-vp=1080`
//! - **Usage text** - word-wrapped usage for any command, prepended errors included
//!
//! ## Quick Start
//!
//! ```rust
//! use argtree::{ArgOptions, CommandId, Parser};
//!
//! let mut parser = Parser::new("proxy", "SOCKS5 proxy");
//! let verbose = parser
//!     .counter(CommandId::ROOT, "v", "verbose", ArgOptions::new())
//!     .unwrap();
//! let serve = parser.add_command(CommandId::ROOT, "serve", "Run the proxy");
//! let port = parser
//!     .int(serve, "p", "port", ArgOptions::new().default_value(1080))
//!     .unwrap();
//!
//! parser.parse(["proxy", "serve", "-vv"]).unwrap();
//! assert_eq!(*parser.get(&verbose), 2);
//! assert_eq!(*parser.get(&port), 1080);
//! assert!(!parser.matched(&port));
//! ```
//!
//! ## Errors and usage
//!
//! ```rust
//! use argtree::{CommandId, Message, Parser};
//!
//! let mut parser = Parser::new("proxy", "");
//! parser.add_command(CommandId::ROOT, "check", "Validate settings");
//!
//! let err = parser.parse_args(Vec::<String>::new()).unwrap_err();
//! let text = parser.render_usage(CommandId::ROOT, Some(Message::from(&err)));
//! assert!(text.starts_with("subcommand required for `proxy`"));
//! ```

// ============================================================================
// Core Modules
// ============================================================================

mod argument;
mod command;
mod error;
mod usage;
mod value;

/// Declaration API, parse driver and parser configuration.
pub mod parser;

// ============================================================================
// Re-exports
// ============================================================================

pub use argument::{ArgId, ArgOptions, Argument, DISABLED_DESCRIPTION, Validator};
pub use command::{Command, CommandId};
pub use error::{Error, Result};
pub use parser::{Parser, ParserConfig};
pub use usage::Message;
pub use value::{CellValue, DefaultValue, Handle, Kind, ListKind, ListValue, OpenedFile, Value};
