use crate::error::{Error, Result};

/// Characters never allowed in a track or directory name.
///
/// Covers path separators, glob/shell metacharacters, quotes, and the
/// characters Windows rejects in file names. ASCII control characters are
/// rejected separately by [`is_disallowed`].
pub const DISALLOWED: &[char] = &[
    '/', '\\', ':', '*', '?', '"', '\'', '`', '<', '>', '|', '#', '%', '&', '{', '}', '$', '!',
    '@', '+', '=',
];

pub fn is_disallowed(c: char) -> bool {
    c.is_ascii_control() || DISALLOWED.contains(&c)
}

/// Remove every unsafe character from `name`.
///
/// Each pass deletes the first run of disallowed characters and retries on
/// the shortened string, stopping once a pass finds nothing to delete. The
/// length strictly shrinks on every pass, so the loop terminates. The result
/// is a subsequence of the input and may be empty.
pub fn sanitize(name: &str) -> String {
    let mut current = name.to_string();

    loop {
        let Some(start) = current.find(is_disallowed) else {
            return current;
        };
        let end = current[start..]
            .find(|c: char| !is_disallowed(c))
            .map_or(current.len(), |offset| start + offset);

        let before = current.len();
        current.replace_range(start..end, "");
        debug_assert!(current.len() < before);
    }
}

/// Like [`sanitize`], but trims the result and fails when nothing usable
/// is left. Names made only of dots are rejected too, since `.` and `..`
/// name existing directories.
pub fn sanitize_non_empty(name: &str) -> Result<String> {
    let clean = sanitize(name);
    let clean = clean.trim();
    if clean.is_empty() || clean.chars().all(|c| c == '.') {
        return Err(Error::EmptyNameAfterSanitization {
            original: name.to_string(),
        });
    }
    Ok(clean.to_string())
}
