//! Parser for prefixed text commands
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

/// Extract the command name from a message, e.g. `!setwelcome` -> `setwelcome`.
///
/// The prefix must start the message (leading whitespace allowed) and be
/// followed directly by the name. Names are lowercased; a `@botname` suffix
/// (`!help@Herald`) is dropped. Returns `None` for anything else.
pub fn parse_command(prefix: &str, content: &str) -> Option<String> {
    let rest = content.trim_start().strip_prefix(prefix)?;
    let token = rest.split_whitespace().next()?;
    if rest.starts_with(char::is_whitespace) {
        return None;
    }

    let name = token.split('@').next().unwrap_or(token);
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(name.to_ascii_lowercase())
}
