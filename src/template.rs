//! git-log style pretty-format expansion.
//!
//! Supported directives:
//!
//! - `%<key>`: value of the longest placeholder key matching at this position
//! - `%%`, `%n`, `%xNN`: literal percent, newline, ASCII character by hex
//!   code (`00` to `7f`)
//! - `%Creset`, `%Cred`, `%Cgreen`, `%Cblue`, `%C(<attrs>)`: ANSI colors,
//!   dropped entirely when colorizing is off
//! - `%<(N)`, `%>(N)`, `%><(N)`: left/right/center align the next placeholder
//!   in a column of N characters, optionally with `,trunc`, `,ltrunc` or
//!   `,mtrunc` to shorten overlong values with `..`; N is at most
//!   [`MAX_COLUMN_WIDTH`]
//!
//! Anything else after a `%` is copied through unchanged.

use std::collections::HashMap;

/// Text expansion capability used by the report renderer.
pub trait Expander {
    fn expand(
        &self,
        template: &str,
        placeholders: &HashMap<String, String>,
        colorize: bool,
    ) -> String;
}

/// Default [`Expander`] implementing git's pretty-format directives.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrettyFormat;

impl Expander for PrettyFormat {
    fn expand(
        &self,
        template: &str,
        placeholders: &HashMap<String, String>,
        colorize: bool,
    ) -> String {
        expand(template, placeholders, colorize)
    }
}

/// ANSI SGR escape for the given parameter list, e.g. `"31"` or `"1;32"`.
pub fn sgr(params: &str) -> String {
    format!("\x1b[{params}m")
}

/// Widest column a width directive may request.
pub const MAX_COLUMN_WIDTH: usize = u16::MAX as usize;

const RESET: &str = "0";

const COLOR_NAMES: &[(&str, &str)] = &[
    ("reset", "0"),
    ("bold", "1"),
    ("dim", "2"),
    ("ul", "4"),
    ("blink", "5"),
    ("reverse", "7"),
    ("black", "30"),
    ("red", "31"),
    ("green", "32"),
    ("yellow", "33"),
    ("blue", "34"),
    ("magenta", "35"),
    ("cyan", "36"),
    ("white", "37"),
];

const SHORT_COLORS: &[(&str, &str)] = &[
    ("Creset", RESET),
    ("Cred", "31"),
    ("Cgreen", "32"),
    ("Cblue", "34"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trunc {
    Cut,
    End,
    Start,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Column {
    align: Align,
    width: usize,
    trunc: Trunc,
}

#[derive(Debug, PartialEq, Eq)]
enum Directive<'a> {
    Literal(char),
    Color(String),
    Column(Column),
    Value(&'a str),
}

fn expand(template: &str, placeholders: &HashMap<String, String>, colorize: bool) -> String {
    let mut out = String::with_capacity(template.len());
    let mut column: Option<Column> = None;
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let Some((directive, consumed)) = parse_directive(after, placeholders) else {
            out.push('%');
            rest = after;
            continue;
        };

        match directive {
            Directive::Literal(c) => out.push(c),
            Directive::Color(params) => {
                if colorize {
                    out.push_str(&sgr(&params));
                }
            }
            Directive::Column(spec) => column = Some(spec),
            Directive::Value(value) => match column.take() {
                Some(spec) => out.push_str(&fit(value, spec)),
                None => out.push_str(value),
            },
        }
        rest = &after[consumed..];
    }

    out.push_str(rest);
    out
}

/// Parse the directive following a `%`. Returns the directive and the number
/// of bytes it spans, or `None` when the text is not a known directive.
fn parse_directive<'a>(
    s: &str,
    placeholders: &'a HashMap<String, String>,
) -> Option<(Directive<'a>, usize)> {
    if s.starts_with('%') {
        return Some((Directive::Literal('%'), 1));
    }
    if let Some(inner) = s.strip_prefix("C(") {
        let close = inner.find(')')?;
        let params = color_params(&inner[..close])?;
        return Some((Directive::Color(params), 2 + close + 1));
    }
    if let Some((name, code)) = SHORT_COLORS.iter().find(|(name, _)| s.starts_with(name)) {
        return Some((Directive::Color(code.to_string()), name.len()));
    }
    const COLUMNS: [(&str, Align); 3] = [
        ("><(", Align::Center),
        ("<(", Align::Left),
        (">(", Align::Right),
    ];
    for (prefix, align) in COLUMNS {
        if let Some(inner) = s.strip_prefix(prefix) {
            let close = inner.find(')')?;
            let spec = column_spec(&inner[..close], align)?;
            return Some((Directive::Column(spec), prefix.len() + close + 1));
        }
    }
    if let Some(key) = placeholders
        .keys()
        .filter(|key| !key.is_empty() && s.starts_with(key.as_str()))
        .max_by_key(|key| key.len())
    {
        return Some((Directive::Value(&placeholders[key]), key.len()));
    }
    if s.starts_with('n') {
        return Some((Directive::Literal('\n'), 1));
    }
    if let Some(hex) = s.strip_prefix('x').and_then(|h| h.get(..2)) {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let byte = u8::from_str_radix(hex, 16).ok().filter(u8::is_ascii)?;
        return Some((Directive::Literal(char::from(byte)), 3));
    }
    None
}

fn color_params(attrs: &str) -> Option<String> {
    let codes: Option<Vec<&str>> = attrs
        .split_whitespace()
        .map(|word| {
            COLOR_NAMES
                .iter()
                .find(|(name, _)| *name == word)
                .map(|(_, code)| *code)
        })
        .collect();
    let codes = codes?;
    if codes.is_empty() {
        return None;
    }
    Some(codes.join(";"))
}

fn column_spec(inner: &str, align: Align) -> Option<Column> {
    let (width, mode) = match inner.split_once(',') {
        Some((width, mode)) => (width, Some(mode.trim())),
        None => (inner, None),
    };
    let width = width
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|w| *w <= MAX_COLUMN_WIDTH)?;
    let trunc = match mode {
        None => Trunc::Cut,
        Some("trunc") => Trunc::End,
        Some("ltrunc") => Trunc::Start,
        Some("mtrunc") => Trunc::Middle,
        Some(_) => return None,
    };
    Some(Column {
        align,
        width,
        trunc,
    })
}

/// Pad or truncate `value` to exactly `spec.width` characters.
fn fit(value: &str, spec: Column) -> String {
    let len = value.chars().count();
    if len > spec.width {
        return truncate(value, spec.width, spec.trunc);
    }
    let fill = spec.width - len;
    let (left, right) = match spec.align {
        Align::Left => (0, fill),
        Align::Right => (fill, 0),
        Align::Center => (fill / 2, fill - fill / 2),
    };
    format!("{}{value}{}", " ".repeat(left), " ".repeat(right))
}

fn truncate(value: &str, width: usize, trunc: Trunc) -> String {
    let chars: Vec<char> = value.chars().collect();
    if trunc == Trunc::Cut || width < 2 {
        return chars[..width].iter().collect();
    }
    let keep = width - 2;
    match trunc {
        Trunc::End | Trunc::Cut => format!("{}..", chars[..keep].iter().collect::<String>()),
        Trunc::Start => format!("..{}", chars[chars.len() - keep..].iter().collect::<String>()),
        Trunc::Middle => {
            let head = keep / 2;
            let tail = keep - head;
            format!(
                "{}..{}",
                chars[..head].iter().collect::<String>(),
                chars[chars.len() - tail..].iter().collect::<String>()
            )
        }
    }
}
