// src/watch/target.rs

use url::Url;

use crate::errors::{CastwatchError, Result};

/// Turn user input into a channel identifier.
///
/// - `https://twitcasting.tv/user123/movie/1` → `user123` (first path segment)
/// - `user123` → `user123`
/// - `https://twitcasting.tv/` → empty, rejected as `InvalidTarget`
pub fn resolve_target(input: &str) -> Result<String> {
    let trimmed = input.trim();

    let id = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Url::parse(trimmed)
            .ok()
            .and_then(|url| {
                url.path_segments()?
                    .find(|seg| !seg.is_empty())
                    .map(str::to_string)
            })
            .unwrap_or_default()
    } else {
        trimmed.to_string()
    };

    if id.is_empty() {
        return Err(CastwatchError::InvalidTarget {
            input: input.to_string(),
        });
    }
    Ok(id)
}
