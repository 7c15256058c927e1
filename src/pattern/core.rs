//! Pattern core - template compilation and the match/extract hot path.

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Maximum number of template variables before heap allocation.
/// Most REST paths carry ≤4 variables (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_VARS: usize = 8;

/// Stack-allocated storage for extracted path variables.
///
/// Variable names use `Arc<str>` because they come from the compiled
/// pattern (known at startup); `Arc::clone()` is an atomic increment
/// instead of a per-request string copy. Values are per-request data
/// captured from the URL and stay `String`.
pub type PathVars = SmallVec<[(Arc<str>, String); MAX_INLINE_VARS]>;

/// Placeholder names: leading word character, then word chars plus `.` and `-`.
static VAR_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").expect("variable name regex is valid")
});

/// Error raised while compiling a URI template.
///
/// All variants are startup-time failures: a template that does not
/// compile aborts registration before the route table is built.
#[derive(Debug, Clone)]
pub enum PatternError {
    /// The template string was empty.
    Empty,
    /// A `{` placeholder was never closed.
    UnterminatedVariable {
        /// The offending template
        template: String,
    },
    /// A placeholder name violated `[A-Za-z0-9_][A-Za-z0-9_.-]*`.
    InvalidVariableName {
        /// The offending name
        name: String,
    },
    /// The same variable name appeared twice in one template.
    ///
    /// Precedence between repeated names would be unspecified, so the
    /// template is rejected outright.
    DuplicateVariable {
        /// The repeated name
        name: String,
    },
    /// A custom variable regex (or the assembled pattern) failed to compile.
    InvalidRegex {
        /// The template being compiled
        template: String,
        /// The regex engine's complaint
        message: String,
    },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::Empty => write!(f, "URI template is empty"),
            PatternError::UnterminatedVariable { template } => {
                write!(f, "unterminated '{{' placeholder in template '{}'", template)
            }
            PatternError::InvalidVariableName { name } => {
                write!(
                    f,
                    "invalid template variable name '{}': expected [A-Za-z0-9_][A-Za-z0-9_.-]*",
                    name
                )
            }
            PatternError::DuplicateVariable { name } => {
                write!(f, "template variable '{}' declared more than once", name)
            }
            PatternError::InvalidRegex { template, message } => {
                write!(f, "template '{}' does not compile: {}", template, message)
            }
        }
    }
}

impl std::error::Error for PatternError {}

/// The compiled, immutable form of a URI template.
///
/// Owns an anchored regex, the ordered variable names, and the literal
/// character count used by the longest-match rule. Compiled once at
/// registration; matching and extraction never mutate it.
#[derive(Debug, Clone)]
pub struct PathPattern {
    /// Normalized template text (after literal encoding)
    template: String,
    /// Anchored regex with one named group per variable
    regex: Regex,
    /// Variable names in declaration order
    var_names: Vec<Arc<str>>,
    /// Internal capture-group names, parallel to `var_names`
    groups: Vec<String>,
    /// Count of literal (non-placeholder, non-wildcard) characters
    literal_len: usize,
}

impl PathPattern {
    /// Compile a URI template into a matchable pattern.
    ///
    /// The template is parsed character by character: wildcards and
    /// placeholders become regex fragments, everything else is escaped
    /// literally. The resulting regex is anchored at both ends, so a
    /// pattern matches whole paths only; a trailing `*` or `**` extends
    /// the match over the remainder.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] for an empty template, an unterminated
    /// or misnamed placeholder, a repeated variable name, or a custom
    /// variable regex that does not compile.
    pub fn compile(template: &str) -> Result<Self, PatternError> {
        if template.is_empty() {
            return Err(PatternError::Empty);
        }

        let mut pattern = String::with_capacity(template.len() + 8);
        pattern.push('^');
        let mut var_names: Vec<Arc<str>> = Vec::new();
        let mut groups: Vec<String> = Vec::new();
        let mut literal_len = 0usize;

        let mut chars = template.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let body = read_placeholder(template, &mut chars)?;
                    let (name, var_regex) = match body.split_once(':') {
                        Some((name, regex)) => (name, Some(regex)),
                        None => (body.as_str(), None),
                    };
                    if !VAR_NAME_RE.is_match(name) {
                        return Err(PatternError::InvalidVariableName {
                            name: name.to_string(),
                        });
                    }
                    if var_names.iter().any(|v| v.as_ref() == name) {
                        return Err(PatternError::DuplicateVariable {
                            name: name.to_string(),
                        });
                    }
                    let group = format!("v{}", var_names.len());
                    pattern.push_str("(?P<");
                    pattern.push_str(&group);
                    pattern.push('>');
                    pattern.push_str(var_regex.unwrap_or("[^/]+"));
                    pattern.push(')');
                    var_names.push(Arc::from(name));
                    groups.push(group);
                }
                '*' => {
                    if chars.peek() == Some(&'*') {
                        chars.next();
                        pattern.push_str(".*");
                    } else {
                        pattern.push_str("[^/]*");
                    }
                }
                '?' => pattern.push_str("[^/]"),
                c => {
                    push_literal(&mut pattern, c);
                    literal_len += c.len_utf8();
                }
            }
        }
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|e| PatternError::InvalidRegex {
            template: template.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            var_names,
            groups,
            literal_len,
        })
    }

    /// Test whether a concrete path matches this pattern.
    ///
    /// Pure read against the compiled regex; safe to call concurrently
    /// and safe to cache.
    #[inline]
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Extract the template variables from a matching path.
    ///
    /// Returns the captured substrings in declaration order, or `None`
    /// when the path does not match. Values are the raw captured text;
    /// no percent-decoding is applied.
    #[must_use]
    pub fn extract(&self, path: &str) -> Option<PathVars> {
        let caps = self.regex.captures(path)?;
        let mut vars = PathVars::new();
        for (name, group) in self.var_names.iter().zip(&self.groups) {
            let value = caps
                .name(group)
                .map(|m| m.as_str().to_string())
                .unwrap_or_default();
            vars.push((Arc::clone(name), value));
        }
        Some(vars)
    }

    /// The normalized template text this pattern was compiled from.
    #[inline]
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Variable names in declaration order.
    #[must_use]
    pub fn var_names(&self) -> &[Arc<str>] {
        &self.var_names
    }

    /// Count of literal characters in the template.
    ///
    /// Placeholder and wildcard syntax contributes nothing; this is the
    /// metric behind the longest-match rule, so `/api/user/list` (14)
    /// outranks `/api/user/{id}` (10) on a path both match.
    #[inline]
    #[must_use]
    pub fn literal_len(&self) -> usize {
        self.literal_len
    }
}

/// Read a `{...}` placeholder body, honoring one nested brace level so
/// counted quantifiers like `{value:\d{2,4}}` survive.
fn read_placeholder(
    template: &str,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> Result<String, PatternError> {
    let mut body = String::new();
    let mut depth = 0usize;
    for c in chars.by_ref() {
        match c {
            '{' => {
                depth += 1;
                body.push(c);
            }
            '}' => {
                if depth == 0 {
                    return Ok(body);
                }
                depth -= 1;
                body.push(c);
            }
            _ => body.push(c),
        }
    }
    Err(PatternError::UnterminatedVariable {
        template: template.to_string(),
    })
}

/// Append one literal character to the regex under construction,
/// escaping regex metacharacters.
fn push_literal(pattern: &mut String, c: char) {
    if c.is_ascii() && !c.is_ascii_alphanumeric() && c != '/' && c != '%' && c != '-' && c != '_' {
        pattern.push('\\');
    }
    pattern.push(c);
}

/// Percent-encode the literal portions of a URI template, leaving
/// placeholder and wildcard syntax intact.
///
/// Applied exactly once, at registration time, so literal segments match
/// the on-wire (undecoded) request path. Characters legal in a path
/// segment per RFC 3986 pass through unchanged; `%` passes through so
/// already-encoded templates are not encoded twice.
#[must_use]
pub fn encode_literals(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut depth = 0usize;
    for c in template.chars() {
        match c {
            '{' => {
                depth += 1;
                out.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                out.push(c);
            }
            _ if depth > 0 => out.push(c),
            '*' | '?' => out.push(c),
            c if is_path_safe(c) => out.push(c),
            c => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).as_bytes() {
                    out.push('%');
                    out.push(char::from(HEX[(byte >> 4) as usize]));
                    out.push(char::from(HEX[(byte & 0x0f) as usize]));
                }
            }
        }
    }
    out
}

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// RFC 3986 pchar plus `/` and `%`.
const fn is_path_safe(c: char) -> bool {
    matches!(c,
        'A'..='Z' | 'a'..='z' | '0'..='9'
        | '-' | '.' | '_' | '~'
        | '!' | '$' | '&' | '\'' | '(' | ')' | '+' | ',' | ';' | '='
        | ':' | '@' | '/' | '%')
}
