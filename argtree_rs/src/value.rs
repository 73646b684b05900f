//! Value cells: the closed set of argument kinds and the storage they fill.
//!
//! Every argument is declared with a [`Kind`] and owns exactly one [`Value`]
//! whose shape is fixed by that kind for the lifetime of the parser. Callers
//! never touch a `Value` directly; they keep the typed [`Handle`] returned at
//! declaration time and read the cell through [`crate::Parser::get`].

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::argument::ArgId;

/// A file opened while parsing, together with the path it came from.
#[derive(Debug)]
pub struct OpenedFile {
    path: PathBuf,
    file: File,
}

impl OpenedFile {
    pub(crate) fn open(path: &str, options: &OpenOptions) -> io::Result<Self> {
        let file = options.open(path)?;
        Ok(Self {
            path: PathBuf::from(path),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self) -> &File {
        &self.file
    }
}

/// Element kind of a list argument.
#[derive(Debug, Clone)]
pub enum ListKind {
    Int,
    Float,
    Text,
    File(OpenOptions),
}

impl ListKind {
    pub(crate) fn placeholder(&self) -> &'static str {
        match self {
            ListKind::Int => "<integer>",
            ListKind::Float => "<float>",
            ListKind::Text => "\"<value>\"",
            ListKind::File(_) => "<file>",
        }
    }
}

/// The declared kind of an argument.
///
/// Fixed at declaration; drives coercion, default application and the
/// signature shown in usage text.
#[derive(Debug, Clone)]
pub enum Kind {
    /// Present or not. Bundles with other short flags.
    Flag,
    /// Number of occurrences, `-vvv` counts three.
    Counter,
    Int,
    Float,
    Text,
    /// Path opened eagerly with the given options.
    File(OpenOptions),
    /// Text restricted to a closed set of allowed values.
    Selector(Vec<String>),
    /// Repeatable argument collecting every occurrence.
    List(ListKind),
}

impl Kind {
    /// Tokens consumed by one match, the name token included.
    pub(crate) fn arity(&self) -> usize {
        match self {
            Kind::Flag | Kind::Counter => 1,
            _ => 2,
        }
    }

    /// Whether a second occurrence on the command line is an error.
    ///
    /// Repeating a flag sets it again and changes nothing, so only the
    /// single-valued kinds refuse repetition.
    pub(crate) fn is_unique(&self) -> bool {
        match self {
            Kind::Int | Kind::Float | Kind::Text | Kind::File(_) | Kind::Selector(_) => true,
            Kind::Flag | Kind::Counter | Kind::List(_) => false,
        }
    }

    pub(crate) fn zero_value(&self) -> Value {
        match self {
            Kind::Flag => Value::Flag(false),
            Kind::Counter => Value::Counter(0),
            Kind::Int => Value::Int(0),
            Kind::Float => Value::Float(0.0),
            Kind::Text => Value::Text(String::new()),
            Kind::File(_) => Value::File(None),
            Kind::Selector(_) => Value::Selector(String::new()),
            Kind::List(ListKind::Int) => Value::List(ListValue::Int(Vec::new())),
            Kind::List(ListKind::Float) => Value::List(ListValue::Float(Vec::new())),
            Kind::List(ListKind::Text) => Value::List(ListValue::Text(Vec::new())),
            Kind::List(ListKind::File(_)) => Value::List(ListValue::File(Vec::new())),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Kind::Flag => "flag",
            Kind::Counter => "counter",
            Kind::Int => "integer",
            Kind::Float => "float",
            Kind::Text => "text",
            Kind::File(_) => "file",
            Kind::Selector(_) => "selector",
            Kind::List(ListKind::Int) => "list of integers",
            Kind::List(ListKind::Float) => "list of floats",
            Kind::List(ListKind::Text) => "list of text",
            Kind::List(ListKind::File(_)) => "list of files",
        }
    }
}

/// Storage of one argument's result.
#[derive(Debug)]
pub enum Value {
    Flag(bool),
    Counter(i64),
    Int(i64),
    Float(f64),
    Text(String),
    File(Option<OpenedFile>),
    Selector(String),
    List(ListValue),
}

#[derive(Debug)]
pub enum ListValue {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
    File(Vec<OpenedFile>),
}

/// Default applied when an argument never matched.
///
/// The type is checked against the argument's kind only when the default is
/// applied, so a mismatch surfaces from `parse`, not from declaration. File
/// arguments take their default as a path (`Text` or `TextList`).
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    IntList(Vec<i64>),
    FloatList(Vec<f64>),
    TextList(Vec<String>),
}

impl DefaultValue {
    pub fn describe(&self) -> &'static str {
        match self {
            DefaultValue::Bool(_) => "bool",
            DefaultValue::Int(_) => "integer",
            DefaultValue::Float(_) => "float",
            DefaultValue::Text(_) => "text",
            DefaultValue::IntList(_) => "list of integers",
            DefaultValue::FloatList(_) => "list of floats",
            DefaultValue::TextList(_) => "list of text",
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
            let joined: Vec<String> = items.iter().map(ToString::to_string).collect();
            write!(f, "[{}]", joined.join(" "))
        }

        match self {
            DefaultValue::Bool(b) => write!(f, "{}", b),
            DefaultValue::Int(n) => write!(f, "{}", n),
            DefaultValue::Float(x) => write!(f, "{}", x),
            DefaultValue::Text(s) => write!(f, "{}", s),
            DefaultValue::IntList(items) => list(f, items),
            DefaultValue::FloatList(items) => list(f, items),
            DefaultValue::TextList(items) => list(f, items),
        }
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Bool(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Int(value)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Int(i64::from(value))
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Float(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Text(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::Text(value)
    }
}

impl From<Vec<i64>> for DefaultValue {
    fn from(value: Vec<i64>) -> Self {
        DefaultValue::IntList(value)
    }
}

impl From<Vec<f64>> for DefaultValue {
    fn from(value: Vec<f64>) -> Self {
        DefaultValue::FloatList(value)
    }
}

impl From<Vec<String>> for DefaultValue {
    fn from(value: Vec<String>) -> Self {
        DefaultValue::TextList(value)
    }
}

impl From<Vec<&str>> for DefaultValue {
    fn from(value: Vec<&str>) -> Self {
        DefaultValue::TextList(value.into_iter().map(str::to_string).collect())
    }
}

/// Rust type readable out of a value cell.
pub trait CellValue: Sized {
    fn from_value(value: &Value) -> Option<&Self>;
}

impl CellValue for bool {
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Flag(b) => Some(b),
            _ => None,
        }
    }
}

impl CellValue for i64 {
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Counter(n) | Value::Int(n) => Some(n),
            _ => None,
        }
    }
}

impl CellValue for f64 {
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Float(x) => Some(x),
            _ => None,
        }
    }
}

impl CellValue for String {
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::Text(s) | Value::Selector(s) => Some(s),
            _ => None,
        }
    }
}

impl CellValue for Option<OpenedFile> {
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::File(f) => Some(f),
            _ => None,
        }
    }
}

impl CellValue for Vec<i64> {
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::List(ListValue::Int(items)) => Some(items),
            _ => None,
        }
    }
}

impl CellValue for Vec<f64> {
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::List(ListValue::Float(items)) => Some(items),
            _ => None,
        }
    }
}

impl CellValue for Vec<String> {
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::List(ListValue::Text(items)) => Some(items),
            _ => None,
        }
    }
}

impl CellValue for Vec<OpenedFile> {
    fn from_value(value: &Value) -> Option<&Self> {
        match value {
            Value::List(ListValue::File(items)) => Some(items),
            _ => None,
        }
    }
}

/// Typed reference to one argument's value cell.
pub struct Handle<T> {
    id: ArgId,
    _cell: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(id: ArgId) -> Self {
        Self {
            id,
            _cell: PhantomData,
        }
    }

    pub fn id(&self) -> ArgId {
        self.id
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handle").field(&self.id).finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arity_splits_flags_from_value_kinds() {
        assert_eq!(Kind::Flag.arity(), 1);
        assert_eq!(Kind::Counter.arity(), 1);
        assert_eq!(Kind::Int.arity(), 2);
        assert_eq!(Kind::Selector(vec!["a".into()]).arity(), 2);
        assert_eq!(Kind::List(ListKind::Text).arity(), 2);
    }

    #[test]
    fn only_single_valued_kinds_are_unique() {
        assert!(Kind::Text.is_unique());
        assert!(Kind::File(OpenOptions::new()).is_unique());
        assert!(!Kind::Flag.is_unique());
        assert!(!Kind::Counter.is_unique());
        assert!(!Kind::List(ListKind::Int).is_unique());
    }

    #[test]
    fn zero_values_are_readable_through_cell_types() {
        let text = Kind::Text.zero_value();
        assert_eq!(String::from_value(&text), Some(&String::new()));

        let counter = Kind::Counter.zero_value();
        assert_eq!(i64::from_value(&counter), Some(&0));

        let files = Kind::List(ListKind::File(OpenOptions::new())).zero_value();
        assert!(Vec::<OpenedFile>::from_value(&files).is_some_and(Vec::is_empty));

        assert!(bool::from_value(&text).is_none());
    }

    #[test]
    fn default_value_display_matches_usage_text() {
        assert_eq!(DefaultValue::from("1080").to_string(), "1080");
        assert_eq!(DefaultValue::from(3).to_string(), "3");
        assert_eq!(DefaultValue::from(vec!["a", "b"]).to_string(), "[a b]");
    }
}
