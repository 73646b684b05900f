//! Writing matched tokens and defaults into value cells.

use std::fs::OpenOptions;

use tracing::debug;

use crate::argument::Argument;
use crate::error::{Error, Result};
use crate::value::{DefaultValue, Kind, ListKind, ListValue, OpenedFile, Value};

fn single<'a>(argument: &str, values: &'a [String]) -> Result<&'a str> {
    match values {
        [value] => Ok(value.as_str()),
        [] => Err(Error::MissingValue {
            argument: argument.to_string(),
        }),
        _ => Err(Error::TooManyValues {
            argument: argument.to_string(),
        }),
    }
}

fn parse_int(argument: &str, raw: &str) -> Result<i64> {
    raw.parse().map_err(|_| Error::BadTypedValue {
        argument: argument.to_string(),
        value: raw.to_string(),
        expected: "integer",
    })
}

fn parse_float(argument: &str, raw: &str) -> Result<f64> {
    raw.parse().map_err(|_| Error::BadTypedValue {
        argument: argument.to_string(),
        value: raw.to_string(),
        expected: "floating point",
    })
}

fn select(argument: &str, raw: &str, allowed: &[String]) -> Result<String> {
    if allowed.iter().any(|candidate| candidate == raw) {
        Ok(raw.to_string())
    } else {
        Err(Error::BadSelectorValue {
            argument: argument.to_string(),
            value: raw.to_string(),
            allowed: allowed.to_vec(),
        })
    }
}

fn open(argument: &str, path: &str, options: &OpenOptions) -> Result<OpenedFile> {
    OpenedFile::open(path, options).map_err(|source| Error::FileOpenFailed {
        argument: argument.to_string(),
        path: path.into(),
        source,
    })
}

/// Coerce the value tokens of one match and store them.
///
/// `count` is the number of occurrences inside the matched token; only
/// counters look at it. Lists append, everything else overwrites. A file
/// list that fails to open a path drops (and so closes) every file it had
/// already collected.
pub(crate) fn store(arg: &mut Argument, values: &[String], count: usize) -> Result<()> {
    let name = arg.display_name();
    let Argument { kind, value, .. } = arg;

    match kind {
        Kind::Flag => *value = Value::Flag(true),
        Kind::Counter => {
            if let Value::Counter(total) = value {
                *total += count as i64;
            }
        }
        Kind::Int => *value = Value::Int(parse_int(&name, single(&name, values)?)?),
        Kind::Float => *value = Value::Float(parse_float(&name, single(&name, values)?)?),
        Kind::Text => *value = Value::Text(single(&name, values)?.to_string()),
        Kind::File(options) => {
            let opened = open(&name, single(&name, values)?, options)?;
            *value = Value::File(Some(opened));
        }
        Kind::Selector(allowed) => {
            *value = Value::Selector(select(&name, single(&name, values)?, allowed)?);
        }
        Kind::List(element) => {
            let raw = single(&name, values)?;
            match (element, value) {
                (ListKind::Int, Value::List(ListValue::Int(items))) => {
                    items.push(parse_int(&name, raw)?)
                }
                (ListKind::Float, Value::List(ListValue::Float(items))) => {
                    items.push(parse_float(&name, raw)?)
                }
                (ListKind::Text, Value::List(ListValue::Text(items))) => {
                    items.push(raw.to_string())
                }
                (ListKind::File(options), Value::List(ListValue::File(items))) => {
                    match open(&name, raw, options) {
                        Ok(opened) => items.push(opened),
                        Err(err) => {
                            items.clear();
                            return Err(err);
                        }
                    }
                }
                _ => unreachable!("cell shape fixed by kind"),
            }
        }
    }
    Ok(())
}

/// Apply the configured default of an argument that never matched.
///
/// The default's type is checked here and only here.
pub(crate) fn apply_default(arg: &mut Argument) -> Result<()> {
    let name = arg.display_name();
    let Argument {
        kind,
        value,
        default,
        ..
    } = arg;
    let Some(default) = default.as_ref() else {
        return Ok(());
    };
    let mismatch = || Error::DefaultTypeMismatch {
        argument: name.clone(),
        expected: kind.describe(),
        found: default.describe(),
    };

    let applied = match (&*kind, default) {
        (Kind::Flag, DefaultValue::Bool(b)) => Value::Flag(*b),
        (Kind::Counter, DefaultValue::Int(n)) => Value::Counter(*n),
        (Kind::Int, DefaultValue::Int(n)) => Value::Int(*n),
        (Kind::Float, DefaultValue::Float(x)) => Value::Float(*x),
        (Kind::Text, DefaultValue::Text(s)) => Value::Text(s.clone()),
        (Kind::File(options), DefaultValue::Text(path)) => {
            Value::File(Some(open(&name, path, options)?))
        }
        (Kind::Selector(allowed), DefaultValue::Text(s)) => {
            Value::Selector(select(&name, s, allowed)?)
        }
        (Kind::List(element), _) => match (element, default) {
            (ListKind::Int, DefaultValue::IntList(items)) => {
                Value::List(ListValue::Int(items.clone()))
            }
            (ListKind::Float, DefaultValue::FloatList(items)) => {
                Value::List(ListValue::Float(items.clone()))
            }
            (ListKind::Text, DefaultValue::TextList(items)) => {
                Value::List(ListValue::Text(items.clone()))
            }
            (ListKind::File(options), DefaultValue::TextList(paths)) => {
                // Files opened so far close when `opened` drops on error.
                let mut opened = Vec::with_capacity(paths.len());
                for path in paths {
                    opened.push(open(&name, path, options)?);
                }
                Value::List(ListValue::File(opened))
            }
            _ => return Err(mismatch()),
        },
        (
            Kind::Flag
            | Kind::Counter
            | Kind::Int
            | Kind::Float
            | Kind::Text
            | Kind::File(_)
            | Kind::Selector(_),
            _,
        ) => return Err(mismatch()),
    };

    debug!(argument = %name, default = %default, "default applied");
    *value = applied;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::ArgOptions;
    use crate::command::CommandId;
    use crate::value::CellValue;
    use std::io::Write;
    use tempfile::TempDir;

    fn arg(kind: Kind, options: ArgOptions) -> Argument {
        Argument::new(CommandId::ROOT, "x", "xarg", kind, options).unwrap()
    }

    fn raw(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn counter_adds_occurrences() {
        let mut verbose = arg(Kind::Counter, ArgOptions::new());
        store(&mut verbose, &[], 3).unwrap();
        store(&mut verbose, &[], 1).unwrap();
        assert_eq!(i64::from_value(verbose.value()), Some(&4));
    }

    #[test]
    fn int_rejects_garbage() {
        let mut count = arg(Kind::Int, ArgOptions::new());
        let err = store(&mut count, &raw(&["ten"]), 1).unwrap_err();
        assert!(matches!(
            err,
            Error::BadTypedValue { expected: "integer", ref value, .. } if value == "ten"
        ));
        store(&mut count, &raw(&["-10"]), 1).unwrap();
        assert_eq!(i64::from_value(count.value()), Some(&-10));
    }

    #[test]
    fn float_parses() {
        let mut ratio = arg(Kind::Float, ArgOptions::new());
        store(&mut ratio, &raw(&["0.25"]), 1).unwrap();
        assert_eq!(f64::from_value(ratio.value()), Some(&0.25));
        assert!(store(&mut ratio, &raw(&["quarter"]), 1).is_err());
    }

    #[test]
    fn selector_checks_membership() {
        let mut format = arg(
            Kind::Selector(vec!["text".into(), "json".into()]),
            ArgOptions::new(),
        );
        assert!(matches!(
            store(&mut format, &raw(&["xml"]), 1),
            Err(Error::BadSelectorValue { .. })
        ));
        store(&mut format, &raw(&["json"]), 1).unwrap();
        assert_eq!(String::from_value(format.value()).map(String::as_str), Some("json"));
    }

    #[test]
    fn lists_append() {
        let mut ports = arg(Kind::List(ListKind::Int), ArgOptions::new());
        store(&mut ports, &raw(&["1"]), 1).unwrap();
        store(&mut ports, &raw(&["2"]), 1).unwrap();
        assert_eq!(Vec::<i64>::from_value(ports.value()), Some(&vec![1, 2]));
    }

    #[test]
    fn file_list_closes_siblings_on_failure() {
        let dir = TempDir::new().unwrap();
        let present = dir.path().join("present.txt");
        std::fs::File::create(&present)
            .unwrap()
            .write_all(b"ok")
            .unwrap();
        let missing = dir.path().join("missing.txt");

        let mut options = OpenOptions::new();
        options.read(true);
        let mut files = arg(Kind::List(ListKind::File(options)), ArgOptions::new());

        store(&mut files, &[present.display().to_string()], 1).unwrap();
        assert_eq!(Vec::<OpenedFile>::from_value(files.value()).map(Vec::len), Some(1));

        let err = store(&mut files, &[missing.display().to_string()], 1).unwrap_err();
        assert!(matches!(err, Error::FileOpenFailed { .. }));
        assert_eq!(Vec::<OpenedFile>::from_value(files.value()).map(Vec::len), Some(0));
    }

    #[test]
    fn default_is_type_checked_when_applied() {
        let mut port = arg(Kind::Int, ArgOptions::new().default_value("1080"));
        assert!(matches!(
            apply_default(&mut port),
            Err(Error::DefaultTypeMismatch {
                expected: "integer",
                found: "text",
                ..
            })
        ));

        let mut port = arg(Kind::Text, ArgOptions::new().default_value("1080"));
        apply_default(&mut port).unwrap();
        assert_eq!(String::from_value(port.value()).map(String::as_str), Some("1080"));
    }

    #[test]
    fn list_default_replaces_empty_list() {
        let mut tags = arg(
            Kind::List(ListKind::Text),
            ArgOptions::new().default_value(vec!["a", "b"]),
        );
        apply_default(&mut tags).unwrap();
        assert_eq!(
            Vec::<String>::from_value(tags.value()),
            Some(&vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn selector_default_must_be_allowed() {
        let mut format = arg(
            Kind::Selector(vec!["text".into()]),
            ArgOptions::new().default_value("yaml"),
        );
        assert!(matches!(
            apply_default(&mut format),
            Err(Error::BadSelectorValue { .. })
        ));
    }

    #[test]
    fn missing_default_is_a_no_op() {
        let mut flag = arg(Kind::Flag, ArgOptions::new());
        apply_default(&mut flag).unwrap();
        assert_eq!(bool::from_value(flag.value()), Some(&false));
    }

    #[test]
    #[should_panic(expected = "cell shape fixed by kind")]
    fn list_store_into_foreign_cell_panics() {
        let mut sizes = arg(Kind::List(ListKind::Int), ArgOptions::new());
        sizes.value = Value::Flag(false);
        let _ = store(&mut sizes, &["1".to_string()], 1);
    }
}
