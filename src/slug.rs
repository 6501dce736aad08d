//! Slug derivation.
//!
//! A slug is the tenant's primary key and its DNS label: lowercase ASCII
//! letters and digits separated by single hyphens, never starting or ending
//! with one.

/// Derives the slug for a business name.
///
/// The name is lower-cased, every run of characters outside `a-z0-9` becomes
/// one hyphen, and hyphens at either end are dropped. Non-ASCII letters count
/// as separators. The result may be empty (e.g. `"!!!"`); callers reject that.
///
/// ```rust
/// assert_eq!(sitegen::slug::slugify("Acme Plumbing & Electric!!"), "acme-plumbing-electric");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Returns `true` if `s` is already in slug form, i.e. `slugify(s) == s` and
/// `s` is non-empty.
pub fn is_canonical(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('-')
        && !s.ends_with('-')
        && !s.contains("--")
        && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
