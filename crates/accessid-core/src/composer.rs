//! Identifier composition.
//!
//! [`compose`] turns a configuration, a breadcrumb path and a request into an
//! identifier of the form
//!
//! ```text
//! namespace.screen[.breadcrumb...][.role].objectid
//! ```
//!
//! The function is pure: identical inputs always give byte-identical output.
//! Identifiers longer than [`MAX_IDENTIFIER_LENGTH`] are cut on a segment
//! boundary after the `namespace.screen` prefix and suffixed with a short
//! SHA-1 digest of the dropped part, so two long identifiers that share a
//! prefix still differ.

use sha1::{Digest, Sha1};

use crate::breadcrumb::Breadcrumb;
use crate::config::{FALLBACK_NAMESPACE, FALLBACK_SCREEN_CONTEXT, IdentifierConfig};

/// Upper bound on the byte length of every composed identifier.
pub const MAX_IDENTIFIER_LENGTH: usize = 80;

/// Number of hex characters in a truncation digest.
pub const DIGEST_LENGTH: usize = 8;

/// Separator between identifier segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// Object id used when the requested one normalizes to nothing.
pub const FALLBACK_OBJECT_ID: &str = "element";

/// A single identifier request from the decoration layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentifierRequest {
    /// Caller-chosen element name, normalized before use.
    pub object_id: String,
    /// Element role such as `button` or `label`.
    pub role: String,
    /// Screen context to use instead of the configured one.
    pub context_override: Option<String>,
}

impl IdentifierRequest {
    pub fn new(object_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            role: role.into(),
            context_override: None,
        }
    }

    /// Use `context` as the screen segment for this request only.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_override = Some(context.into());
        self
    }
}

/// Result of [`compose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedIdentifier {
    /// The identifier.
    pub value: String,
    /// The candidate exceeded the length bound and was digested.
    pub truncated: bool,
    /// The configured namespace was empty.
    pub namespace_fallback: bool,
    /// Neither an override nor a configured screen context was available.
    pub screen_fallback: bool,
}

/// Compose an identifier.
pub fn compose(
    config: &IdentifierConfig,
    breadcrumb: &Breadcrumb,
    request: &IdentifierRequest,
) -> ComposedIdentifier {
    let namespace = sanitize_segment(&config.namespace);
    let namespace_fallback = namespace.is_none();
    let namespace = namespace.unwrap_or_else(|| FALLBACK_NAMESPACE.to_string());

    let screen = request
        .context_override
        .as_deref()
        .and_then(sanitize_segment)
        .or_else(|| config.screen_context.as_deref().and_then(sanitize_segment));
    let screen_fallback = screen.is_none();
    let screen = screen.unwrap_or_else(|| FALLBACK_SCREEN_CONTEXT.to_string());

    let mut segments = vec![namespace, screen];
    let protected_len = segments[0].len() + 1 + segments[1].len();

    if config.track_hierarchy {
        for segment in breadcrumb.iter().filter_map(sanitize_segment) {
            // Sanitizing can make neighbours equal again.
            if segments.len() > 2 && segments.last() == Some(&segment) {
                continue;
            }
            segments.push(segment);
        }
    }

    if config.include_element_types {
        if let Some(role) = sanitize_segment(&request.role) {
            segments.push(role);
        }
    }

    segments.push(normalize_object_id(&request.object_id));

    let candidate = segments.join(&SEGMENT_SEPARATOR.to_string());
    let truncated = candidate.len() > MAX_IDENTIFIER_LENGTH;
    let value = if truncated {
        truncate_with_digest(&candidate, protected_len)
    } else {
        candidate
    };

    ComposedIdentifier {
        value,
        truncated,
        namespace_fallback,
        screen_fallback,
    }
}

/// Lower-case an object id and reduce it to `[a-z0-9_]` words joined by `-`.
///
/// ```
/// use accessid_core::composer::normalize_object_id;
///
/// assert_eq!(normalize_object_id("AddFuelButton"), "addfuelbutton");
/// assert_eq!(normalize_object_id("Save & Close"), "save-close");
/// assert_eq!(normalize_object_id("!!!"), "element");
/// ```
pub fn normalize_object_id(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len());
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            normalized.push(c);
        } else if !normalized.is_empty() && !normalized.ends_with('-') {
            normalized.push('-');
        }
    }
    while normalized.ends_with('-') {
        normalized.pop();
    }
    if normalized.is_empty() {
        FALLBACK_OBJECT_ID.to_string()
    } else {
        normalized
    }
}

/// Short, stable hex digest of `text`.
pub fn digest(text: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..DIGEST_LENGTH].to_string()
}

/// Trim a segment and replace whitespace and separators inside it.
/// Returns `None` for segments that are empty after trimming.
fn sanitize_segment(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(
        trimmed
            .chars()
            .map(|c| {
                if c.is_whitespace() || c == SEGMENT_SEPARATOR {
                    '-'
                } else {
                    c
                }
            })
            .collect(),
    )
}

fn truncate_with_digest(candidate: &str, protected_len: usize) -> String {
    let budget = MAX_IDENTIFIER_LENGTH - DIGEST_LENGTH - 1;

    let (head, remainder) = if protected_len <= budget {
        let cut = candidate
            .char_indices()
            .filter(|&(i, c)| c == SEGMENT_SEPARATOR && i >= protected_len && i <= budget)
            .map(|(i, _)| i)
            .last()
            .unwrap_or(protected_len);
        (&candidate[..cut], &candidate[cut + 1..])
    } else {
        let cut = (0..=budget)
            .rev()
            .find(|&i| candidate.is_char_boundary(i))
            .unwrap_or(0);
        // A cut right after a separator would leave an empty segment.
        (
            candidate[..cut].trim_end_matches(SEGMENT_SEPARATOR),
            candidate[cut..].trim_start_matches(SEGMENT_SEPARATOR),
        )
    };

    let mut value = String::with_capacity(MAX_IDENTIFIER_LENGTH);
    value.push_str(head);
    value.push(SEGMENT_SEPARATOR);
    value.push_str(&digest(remainder));
    value
}
