//! Argument surface of the launcher.

use argtree::{ArgOptions, CommandId, Handle, Parser, ParserConfig, Result};

use crate::settings::{parse_ip_rule, parse_port};

pub const PROGRAM: &str = "argtree-proxy";

/// Handles to every declared cell, read back after the parse.
#[derive(Debug, Clone, Copy)]
pub struct Handles {
    pub port: Handle<String>,
    pub bind: Handle<String>,
    pub user: Handle<String>,
    pub password: Handle<String>,
    pub creds: Handle<String>,
    pub allow: Handle<Vec<String>>,
    pub allow_ip: Handle<Vec<String>>,
    pub timeout: Handle<i64>,
    pub verbose: Handle<i64>,
    pub show: CommandId,
    pub format: Handle<String>,
    pub check: CommandId,
}

fn first(values: &[String]) -> &str {
    values.first().map(String::as_str).unwrap_or_default()
}

pub fn declare(config: ParserConfig) -> Result<(Parser, Handles)> {
    let mut parser = Parser::with_config(PROGRAM, "SOCKS5 proxy launcher", config);
    let root = parser.root();

    let port = parser.text(
        root,
        "p",
        "port",
        ArgOptions::new()
            .help("Port to listen on")
            .default_value("1080")
            .validate(|values| parse_port(first(values)).map(|_| ())),
    )?;
    let bind = parser.text(
        root,
        "b",
        "bind",
        ArgOptions::new()
            .help("Address to listen on")
            .default_value("0.0.0.0")
            .validate(|values| {
                first(values)
                    .parse::<std::net::IpAddr>()
                    .map(|_| ())
                    .map_err(|err| err.to_string())
            }),
    )?;
    let user = parser.text(root, "u", "user", ArgOptions::new().help("Proxy user name"))?;
    let password = parser.text(
        root,
        "P",
        "password",
        ArgOptions::new().help("Password for --user"),
    )?;
    let creds = parser.text(
        root,
        "",
        "creds",
        ArgOptions::new().help(r#"JSON list of {"username","password"} objects"#),
    )?;
    let allow = parser.text_list(
        root,
        "a",
        "allow",
        ArgOptions::new()
            .help("Destination FQDN pattern, may repeat")
            .validate(|values| {
                regex::Regex::new(first(values))
                    .map(|_| ())
                    .map_err(|err| err.to_string())
            }),
    )?;
    let allow_ip = parser.text_list(
        root,
        "",
        "allow-ip",
        ArgOptions::new()
            .help("Destination IP or CIDR block, may repeat")
            .validate(|values| parse_ip_rule(first(values)).map(|_| ())),
    )?;
    let timeout = parser.int(
        root,
        "t",
        "timeout",
        ArgOptions::new()
            .help("Dial timeout in seconds")
            .default_value(3),
    )?;
    let verbose = parser.counter(
        root,
        "v",
        "verbose",
        ArgOptions::new().help("More logging, may repeat"),
    )?;

    let show = parser.add_command(root, "show", "Print the resolved configuration");
    let format = parser.selector(
        show,
        "f",
        "format",
        ["text", "json"],
        ArgOptions::new().help("Output format").default_value("text"),
    )?;
    let check = parser.add_command(root, "check", "Validate the configuration and exit");

    Ok((
        parser,
        Handles {
            port,
            bind,
            user,
            password,
            creds,
            allow,
            allow_ip,
            timeout,
            verbose,
            show,
            format,
            check,
        },
    ))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> ParserConfig {
        ParserConfig::new().output(|_| {}).on_exit(|_| {})
    }

    #[test]
    fn declarations_do_not_collide() {
        let (parser, handles) = declare(quiet()).unwrap();
        assert_eq!(parser.command(handles.show).name(), "show");
        assert_eq!(parser.command(handles.check).name(), "check");
    }

    #[test]
    fn port_validator_rejects_out_of_range() {
        let (mut parser, _) = declare(quiet()).unwrap();
        let err = parser.parse_args(["check", "-p", "70000"]).unwrap_err();
        assert!(err.to_string().starts_with("[-p|--port]"), "{err}");
    }

    #[test]
    fn allow_validator_rejects_bad_regex() {
        let (mut parser, _) = declare(quiet()).unwrap();
        assert!(parser.parse_args(["check", "-a", "(unclosed"]).is_err());
    }

    #[test]
    fn show_defaults_to_text() {
        let (mut parser, handles) = declare(quiet()).unwrap();
        parser.parse_args(["show", "-vv"]).unwrap();
        assert_eq!(parser.get(&handles.format), "text");
        assert_eq!(*parser.get(&handles.verbose), 2);
        assert_eq!(parser.invoked_command(), handles.show);
    }
}
