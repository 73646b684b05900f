//! Suggestions for tokens nobody claimed.

use strsim::levenshtein;

use crate::argument::Argument;

/// Suggest a declared long name close to the first unclaimed `--token`.
/// Returns Some(`--name`) if a close match is found (distance <= 2).
pub(crate) fn suggest_long_name<'a, I>(leftovers: &[String], arguments: I) -> Option<String>
where
    I: IntoIterator<Item = &'a Argument>,
{
    let candidate = leftovers.iter().find_map(|token| {
        let name = token.split('=').next().unwrap_or(token);
        name.strip_prefix("--").filter(|rest| !rest.is_empty())
    })?;

    let mut best_match: Option<(&str, usize)> = None;
    for argument in arguments {
        if argument.is_hidden() {
            continue;
        }
        let distance = levenshtein(candidate, argument.long());
        if distance > 2 {
            continue;
        }
        match best_match {
            Some((_, best_dist)) if best_dist <= distance => {}
            _ => best_match = Some((argument.long(), distance)),
        }
    }

    best_match.map(|(long, _)| format!("--{}", long))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argument::ArgOptions;
    use crate::command::CommandId;
    use crate::value::Kind;

    fn args() -> Vec<Argument> {
        ["port", "user", "password"]
            .iter()
            .map(|long| {
                Argument::new(CommandId::ROOT, "", long, Kind::Text, ArgOptions::new()).unwrap()
            })
            .collect()
    }

    #[test]
    fn suggests_close_long_name() {
        let leftovers = vec!["--prot".to_string()];
        assert_eq!(
            suggest_long_name(&leftovers, &args()).as_deref(),
            Some("--port")
        );
    }

    #[test]
    fn ignores_inline_value_when_suggesting() {
        let leftovers = vec!["extra".to_string(), "--usr=bob".to_string()];
        assert_eq!(
            suggest_long_name(&leftovers, &args()).as_deref(),
            Some("--user")
        );
    }

    #[test]
    fn no_suggestion_for_distant_names() {
        let leftovers = vec!["--bogus".to_string()];
        assert_eq!(suggest_long_name(&leftovers, &args()), None);

        let leftovers = vec!["-x".to_string()];
        assert_eq!(suggest_long_name(&leftovers, &args()), None);
    }
}
