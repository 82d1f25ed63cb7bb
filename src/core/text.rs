//! Text helpers for outbound Discord messages
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//!
//! ## Changelog
//! - 1.1.0: Fallback notice wording
//! - 1.0.0: Line-aware splitting for long welcome messages

use serenity::model::id::UserId;

/// Discord message content limit, in characters
pub const MESSAGE_LIMIT: usize = 2000;

/// Split a message into pieces Discord will accept.
///
/// Prefers breaking at newlines; a single line longer than the limit is cut on
/// character boundaries. Empty input yields no pieces.
pub fn split_for_message(text: &str) -> Vec<String> {
    split_text(text, MESSAGE_LIMIT)
}

pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    if text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        // +1 for the newline that rejoins it to `current`
        let needed = if current.is_empty() { line_len } else { line_len + 1 };

        if current_len + needed <= max_chars {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
            current_len += needed;
            continue;
        }

        if !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len <= max_chars {
            current.push_str(line);
            current_len = line_len;
        } else {
            let chars: Vec<char> = line.chars().collect();
            for window in chars.chunks(max_chars) {
                pieces.push(window.iter().collect());
            }
        }
    }

    if !current.trim().is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Group-visible notice asking a user to open their DMs.
pub fn fallback_notice(user_id: UserId) -> String {
    format!(
        "<@{}> please enable direct messages from server members so I can send you the welcome message!",
        user_id.0
    )
}

/// `Some(text)` when the text has visible content.
pub fn non_blank(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}
