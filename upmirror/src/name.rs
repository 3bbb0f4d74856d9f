//! Splitting of entry names into stem and extension.

/// Split `name` around its last `.`.
///
/// The extension is what follows the last dot, without the dot.
/// Without any dot, the extension is empty and the stem is the whole name.
/// Comparison is left to the caller and is case-sensitive.
pub fn split(name: &str) -> (&str, &str) {
    name.rsplit_once('.').unwrap_or((name, ""))
}

/// The name without its extension
pub fn stem(name: &str) -> &str {
    split(name).0
}

/// The extension of the name, possibly empty
pub fn extension(name: &str) -> &str {
    split(name).1
}
