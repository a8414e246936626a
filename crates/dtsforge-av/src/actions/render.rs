//! Command line rendering for logs and batch files.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::str::FromStr;

/// Quoting rules used when turning an argument vector into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    /// Windows `cmd.exe` / MSVC argument conventions.
    Cmd,
    /// POSIX shell single quoting.
    #[serde(alias = "posix")]
    Sh,
}

impl QuoteStyle {
    /// Style matching the platform this binary was built for.
    pub fn native() -> Self {
        if cfg!(windows) {
            Self::Cmd
        } else {
            Self::Sh
        }
    }
}

impl Default for QuoteStyle {
    fn default() -> Self {
        Self::native()
    }
}

impl fmt::Display for QuoteStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cmd => write!(f, "cmd"),
            Self::Sh => write!(f, "sh"),
        }
    }
}

impl FromStr for QuoteStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cmd" | "bat" | "windows" => Ok(Self::Cmd),
            "posix" | "sh" | "unix" => Ok(Self::Sh),
            other => Err(format!("unknown quote style: {}", other)),
        }
    }
}

/// Join `argv` into a single command line using `style` quoting.
///
/// Non-UTF-8 arguments are rendered lossily.
pub fn render_command_line(argv: &[OsString], style: QuoteStyle) -> String {
    argv.iter()
        .map(|arg| {
            let arg = arg.to_string_lossy();
            match style {
                QuoteStyle::Cmd => quote_cmd(&arg),
                QuoteStyle::Sh => quote_posix(&arg),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_cmd(arg: &str) -> String {
    let needs_quotes = arg.is_empty() || arg.contains([' ', '\t']);
    let mut out = String::with_capacity(arg.len() + 2);
    if needs_quotes {
        out.push('"');
    }

    let mut backslashes = 0usize;
    for c in arg.chars() {
        match c {
            '\\' => backslashes += 1,
            '"' => {
                // Backslashes before a quote are doubled, then the quote is escaped.
                out.extend(std::iter::repeat('\\').take(backslashes * 2 + 1));
                out.push('"');
                backslashes = 0;
            }
            _ => {
                out.extend(std::iter::repeat('\\').take(backslashes));
                out.push(c);
                backslashes = 0;
            }
        }
    }

    if needs_quotes {
        out.extend(std::iter::repeat('\\').take(backslashes * 2));
        out.push('"');
    } else {
        out.extend(std::iter::repeat('\\').take(backslashes));
    }
    out
}

fn quote_posix(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}
