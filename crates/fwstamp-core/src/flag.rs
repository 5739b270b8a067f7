//! Preprocessor macro definitions and their compiler-flag rendering.

use std::fmt;
use std::fmt::Write as _;

/// Macro defined when nothing else is configured.
pub const DEFAULT_MACRO_NAME: &str = "FWVERSION";

/// How the `-D` switch is joined to the macro name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlagStyle {
    /// `-D NAME=...`
    #[default]
    Spaced,
    /// `-DNAME=...`
    Compact,
}

impl FlagStyle {
    /// Map the `flag.style` config value. Unknown values fall back to spaced;
    /// the config validator rejects them before they get here.
    pub fn from_config(style: &str) -> Self {
        match style {
            "compact" => Self::Compact,
            _ => Self::Spaced,
        }
    }
}

/// A string-valued preprocessor macro, e.g. `FWVERSION` = `"v1.2.0-14-gabc1234"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDefinition {
    name: String,
    value: String,
    style: FlagStyle,
}

impl MacroDefinition {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            style: FlagStyle::default(),
        }
    }

    pub fn with_style(mut self, style: FlagStyle) -> Self {
        self.style = style;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Render as a compiler flag, e.g. `-D FWVERSION=\"v1.2.0-14-gabc1234\"`.
    ///
    /// The quotes are backslash-escaped so they survive one round of shell
    /// parsing by the host build tool; the compiler then sees a C string
    /// literal.
    pub fn to_build_flag(&self) -> String {
        let switch = match self.style {
            FlagStyle::Spaced => "-D ",
            FlagStyle::Compact => "-D",
        };
        format!(
            "{switch}{}=\\\"{}\\\"",
            self.name,
            escape_for_flag(&self.value)
        )
    }

    /// The value as a C string literal, quotes included.
    pub fn c_string_literal(&self) -> String {
        format!("\"{}\"", escape_c(&self.value))
    }
}

impl fmt::Display for MacroDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_build_flag())
    }
}

/// Body of a C string literal: quotes, backslashes and ASCII control
/// characters escaped, so the value stays on one line.
fn escape_c(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => {
                let _ = write!(out, "\\{:03o}", u32::from(c));
            }
            _ => out.push(c),
        }
    }
    out
}

/// Escape the C literal body once more for the shell pass.
fn escape_for_flag(value: &str) -> String {
    let body = escape_c(value);
    let mut out = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            _ => out.push(c),
        }
    }
    out
}
