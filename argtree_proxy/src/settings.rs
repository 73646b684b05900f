//! Launch settings resolved from the parsed command line and the environment.
//!
//! Precedence, highest first: a value given on the command line, then the
//! environment, then the argument's declared default.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

use anyhow::{Context, Result, bail};
use argtree::{Handle, Parser};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use tracing::{debug, info};

use crate::cli::Handles;

pub const ENV_PORT: &str = "PROXY_PORT";
pub const ENV_USER: &str = "PROXY_USER";
pub const ENV_PASSWORD: &str = "PROXY_PASSWORD";
pub const ENV_CREDS: &str = "PROXY_CREDS";
pub const ENV_ALLOW: &str = "PROXY_ALLOW";
pub const ENV_DIAL_TIMEOUT: &str = "DIAL_TIMEOUT";

/// A destination rule: one address, or a network in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpRule {
    Addr(IpAddr),
    Net { network: IpAddr, prefix: u8 },
}

impl fmt::Display for IpRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpRule::Addr(addr) => write!(f, "{}", addr),
            IpRule::Net { network, prefix } => write!(f, "{}/{}", network, prefix),
        }
    }
}

impl Serialize for IpRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn parse_ip_rule(raw: &str) -> std::result::Result<IpRule, String> {
    let raw = raw.trim();
    let Some((network, prefix)) = raw.split_once('/') else {
        return raw
            .parse()
            .map(IpRule::Addr)
            .map_err(|_| format!("invalid IP address `{}`", raw));
    };
    let network: IpAddr = network
        .parse()
        .map_err(|_| format!("invalid network address in `{}`", raw))?;
    let max = if network.is_ipv4() { 32 } else { 128 };
    match prefix.parse::<u8>() {
        Ok(prefix) if prefix <= max => Ok(IpRule::Net { network, prefix }),
        _ => Err(format!("invalid prefix length in `{}`", raw)),
    }
}

pub fn parse_port(raw: &str) -> std::result::Result<u16, String> {
    match raw.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(format!("port must be between 1 and 65535, got `{}`", raw)),
    }
}

/// Seconds from `3` or `3s`.
fn parse_timeout(raw: &str) -> Option<u64> {
    raw.strip_suffix('s').unwrap_or(raw).parse().ok()
}

#[derive(Debug, Deserialize)]
struct CredentialEntry {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct Settings {
    pub listen: String,
    pub dial_timeout_secs: u64,
    /// User name to password. Only the names are ever printed.
    #[serde(rename = "users", serialize_with = "user_names")]
    pub credentials: BTreeMap<String, String>,
    #[serde(serialize_with = "pattern_sources")]
    pub allow: Vec<Regex>,
    pub allow_ip: Vec<IpRule>,
}

fn user_names<S: Serializer>(
    credentials: &BTreeMap<String, String>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(credentials.keys())
}

fn pattern_sources<S: Serializer>(
    patterns: &[Regex],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(patterns.iter().map(Regex::as_str))
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn joined<T: fmt::Display>(items: impl Iterator<Item = T>, empty: &str) -> String {
            let items: Vec<String> = items.map(|item| item.to_string()).collect();
            if items.is_empty() {
                empty.to_string()
            } else {
                items.join(", ")
            }
        }

        writeln!(f, "listen:       {}", self.listen)?;
        writeln!(f, "dial timeout: {}s", self.dial_timeout_secs)?;
        let users = joined(self.credentials.keys(), "none (no authentication)");
        writeln!(f, "users:        {}", users)?;
        let allow = joined(self.allow.iter().map(Regex::as_str), "any");
        writeln!(f, "allow:        {}", allow)?;
        writeln!(f, "allow ip:     {}", joined(self.allow_ip.iter(), "any"))
    }
}

/// Command-line value when one was given, else the environment, else the
/// declared default already sitting in the cell.
fn layered<F>(parser: &Parser, handle: &Handle<String>, env: &F, key: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    if parser.matched(handle) {
        return parser.get(handle).clone();
    }
    match env(key) {
        Some(value) => {
            debug!(variable = key, "value taken from environment");
            value
        }
        None => parser.get(handle).clone(),
    }
}

/// Build the credential table: `creds` entries first, then the user/password
/// pair when either half is set.
fn credentials(creds: &str, user: String, password: String) -> Result<BTreeMap<String, String>> {
    let mut table = BTreeMap::new();
    if !creds.trim().is_empty() {
        let entries: Vec<CredentialEntry> = serde_json::from_str(creds)
            .context("credentials must be a JSON list of {username, password}")?;
        for entry in entries {
            table.insert(entry.username, entry.password);
        }
    }
    if !user.is_empty() || !password.is_empty() {
        table.insert(user, password);
    }
    Ok(table)
}

/// Resolve the launch settings after a successful parse.
pub fn resolve<F>(parser: &Parser, handles: &Handles, env: F) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let port = layered(parser, &handles.port, &env, ENV_PORT);
    let port = parse_port(&port).map_err(anyhow::Error::msg)?;
    let bind: IpAddr = parser
        .get(&handles.bind)
        .parse()
        .with_context(|| format!("invalid bind address `{}`", parser.get(&handles.bind)))?;
    let listen = match bind {
        IpAddr::V4(addr) => format!("{}:{}", addr, port),
        IpAddr::V6(addr) => format!("[{}]:{}", addr, port),
    };

    let user = layered(parser, &handles.user, &env, ENV_USER);
    let password = layered(parser, &handles.password, &env, ENV_PASSWORD);
    let creds = layered(parser, &handles.creds, &env, ENV_CREDS);
    let credentials = credentials(&creds, user, password)?;

    let patterns: Vec<String> = if parser.matched(&handles.allow) {
        parser.get(&handles.allow).clone()
    } else {
        env(ENV_ALLOW)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|pattern| !pattern.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    };
    let allow = patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).with_context(|| format!("invalid allow pattern `{}`", pattern))
        })
        .collect::<Result<Vec<_>>>()?;

    let allow_ip = parser
        .get(&handles.allow_ip)
        .iter()
        .map(|raw| parse_ip_rule(raw).map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()?;

    let dial_timeout_secs = if parser.matched(&handles.timeout) {
        u64::try_from(*parser.get(&handles.timeout)).ok()
    } else {
        match env(ENV_DIAL_TIMEOUT) {
            Some(raw) => match parse_timeout(&raw) {
                Some(secs) => Some(secs),
                None => bail!("{} must be a number of seconds, got `{}`", ENV_DIAL_TIMEOUT, raw),
            },
            None => u64::try_from(*parser.get(&handles.timeout)).ok(),
        }
    };
    let Some(dial_timeout_secs) = dial_timeout_secs else {
        bail!("dial timeout must not be negative");
    };

    info!(
        listen = %listen,
        users = credentials.len(),
        allow = allow.len(),
        allow_ip = allow_ip.len(),
        "settings resolved"
    );
    Ok(Settings {
        listen,
        dial_timeout_secs,
        credentials,
        allow,
        allow_ip,
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use argtree::ParserConfig;

    use super::*;
    use crate::cli::declare;

    fn parsed(args: &[&str]) -> (Parser, Handles) {
        let config = ParserConfig::new().output(|_| {}).on_exit(|_| {});
        let (mut parser, handles) = declare(config).unwrap();
        parser.parse_args(args.iter().copied()).unwrap();
        (parser, handles)
    }

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let (parser, handles) = parsed(&["check"]);
        let settings = resolve(&parser, &handles, env(&[])).unwrap();
        assert_eq!(settings.listen, "0.0.0.0:1080");
        assert_eq!(settings.dial_timeout_secs, 3);
        assert!(settings.credentials.is_empty());
        assert!(settings.allow.is_empty());
    }

    #[test]
    fn environment_beats_default_and_flags_beat_environment() {
        let (parser, handles) = parsed(&["check"]);
        let vars = env(&[(ENV_PORT, "2000"), (ENV_DIAL_TIMEOUT, "5s")]);
        let settings = resolve(&parser, &handles, vars).unwrap();
        assert_eq!(settings.listen, "0.0.0.0:2000");
        assert_eq!(settings.dial_timeout_secs, 5);

        let (parser, handles) = parsed(&["check", "-p", "9050", "-t", "1"]);
        let vars = env(&[(ENV_PORT, "2000"), (ENV_DIAL_TIMEOUT, "5")]);
        let settings = resolve(&parser, &handles, vars).unwrap();
        assert_eq!(settings.listen, "0.0.0.0:9050");
        assert_eq!(settings.dial_timeout_secs, 1);
    }

    #[test]
    fn bad_port_from_environment_is_rejected() {
        let (parser, handles) = parsed(&["check"]);
        let err = resolve(&parser, &handles, env(&[(ENV_PORT, "0")])).unwrap_err();
        assert!(err.to_string().contains("between 1 and 65535"));
    }

    #[test]
    fn credential_pair_overrides_json_entry() {
        let (parser, handles) = parsed(&[
            "check",
            "--creds",
            r#"[{"username":"alice","password":"a"},{"username":"bob","password":"b"}]"#,
            "-u",
            "alice",
            "-P",
            "override",
        ]);
        let settings = resolve(&parser, &handles, env(&[])).unwrap();
        assert_eq!(settings.credentials.len(), 2);
        assert_eq!(settings.credentials["alice"], "override");
        assert_eq!(settings.credentials["bob"], "b");
    }

    #[test]
    fn credentials_from_environment() {
        let (parser, handles) = parsed(&["check"]);
        let settings = resolve(
            &parser,
            &handles,
            env(&[(ENV_USER, "carol"), (ENV_PASSWORD, "c")]),
        )
        .unwrap();
        assert_eq!(settings.credentials["carol"], "c");
    }

    #[test]
    fn malformed_creds_fail_with_context() {
        let (parser, handles) = parsed(&["check", "--creds", "{not json"]);
        let err = resolve(&parser, &handles, env(&[])).unwrap_err();
        assert!(format!("{:#}", err).starts_with("credentials must be a JSON list"));
    }

    #[test]
    fn allow_rules_from_flags_and_environment() {
        let (parser, handles) = parsed(&[
            "check",
            "-a",
            r"^.*\.example\.com$",
            "--allow-ip",
            "10.0.0.0/8",
            "--allow-ip=192.0.2.1",
        ]);
        let settings = resolve(&parser, &handles, env(&[(ENV_ALLOW, "ignored")])).unwrap();
        assert_eq!(settings.allow.len(), 1);
        assert!(settings.allow[0].is_match("api.example.com"));
        assert_eq!(
            settings.allow_ip,
            vec![
                IpRule::Net {
                    network: "10.0.0.0".parse().unwrap(),
                    prefix: 8
                },
                IpRule::Addr("192.0.2.1".parse().unwrap()),
            ]
        );

        let (parser, handles) = parsed(&["check"]);
        let settings = resolve(&parser, &handles, env(&[(ENV_ALLOW, "^a$, ^b$")])).unwrap();
        let sources: Vec<&str> = settings.allow.iter().map(Regex::as_str).collect();
        assert_eq!(sources, vec!["^a$", "^b$"]);
    }

    #[test]
    fn ip_rule_parsing() {
        assert!(parse_ip_rule("::1").is_ok());
        assert!(parse_ip_rule("2001:db8::/32").is_ok());
        assert!(parse_ip_rule("10.0.0.0/33").is_err());
        assert!(parse_ip_rule("10.0.0/8").is_err());
        assert!(parse_ip_rule("example.com").is_err());
    }

    #[test]
    fn json_never_contains_passwords() {
        let (parser, handles) = parsed(&["check", "-u", "dave", "-P", "hunter2", "-b", "::1"]);
        let settings = resolve(&parser, &handles, env(&[])).unwrap();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains(r#""users":["dave"]"#));
        assert!(json.contains(r#""listen":"[::1]:1080""#));
        assert!(!json.contains("hunter2"));
        assert!(!settings.to_string().contains("hunter2"));
    }
}
