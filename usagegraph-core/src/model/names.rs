//! Name helpers for fully-qualified class identifiers.
//!
//! A class identifier is its qualified name (`com.example.Foo`). Everything
//! else is derived by splitting on the last `.`.

/// Returns the simple name (`Foo` for `com.example.Foo`).
pub fn simple_name(qualified: &str) -> &str {
    match qualified.rfind('.') {
        Some(idx) => &qualified[idx + 1..],
        None => qualified,
    }
}

/// Returns the package name (`com.example` for `com.example.Foo`), empty for
/// names without a package.
pub fn package_name(qualified: &str) -> &str {
    match qualified.rfind('.') {
        Some(idx) if idx > 0 => &qualified[..idx],
        _ => "",
    }
}

/// Default bean name: the simple name with its first character lower-cased.
///
/// `com.example.MemberController` → `memberController`
pub fn default_bean_name(qualified: &str) -> String {
    let simple = simple_name(qualified);
    let mut chars = simple.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds the `class.method` key used for method-level sets and reports.
pub fn method_key(class: &str, method: &str) -> String {
    format!("{}.{}", class, method)
}

/// Splits a `class.method` key on its last `.`.
///
/// Returns `None` when the key has no `.`.
pub fn split_method_key(key: &str) -> Option<(&str, &str)> {
    key.rfind('.').map(|idx| (&key[..idx], &key[idx + 1..]))
}
