//! Line tokenising helpers for the OBJ8 readers.

/// First whitespace-separated token of a line, if any.
#[inline]
pub fn first_token(line: &str) -> Option<&str> {
    line.split_whitespace().next()
}

/// Leading whitespace of a line, kept when a line is re-emitted.
#[inline]
pub fn indentation(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Parse a token as an unsigned integer, reporting the token on failure.
pub fn parse_count(token: &str, line: usize, what: &str) -> crate::Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| crate::Error::parse(line, format!("{what}: expected an integer, got '{token}'")))
}
