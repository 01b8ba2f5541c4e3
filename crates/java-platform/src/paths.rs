/// Rewrites Windows-style separators as `/`.
///
/// JVM services accept forward slashes on every platform, so rendered
/// configuration always uses them regardless of the host's native separator.
#[must_use]
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}
