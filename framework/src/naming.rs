//! Name derivation for services and providers
//!
//! Services that don't override their name get one derived from the type:
//! `AllCapsLog` becomes `all-caps-log`, `PrintLog` becomes `print-log`.

/// Convert an upper camel case identifier into kebab case
///
/// A new segment starts at every uppercase letter that follows a lowercase
/// letter or digit. A run of capitals stays together as an acronym, so
/// `HTTPClient` becomes `http-client`. Existing `_`, `-` and space separators
/// are normalized to a single `-`.
///
/// # Example
/// ```
/// use servicekit::naming::kebab_case;
///
/// assert_eq!(kebab_case("AllCapsLog"), "all-caps-log");
/// ```
pub fn kebab_case(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | ' ') {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }

        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower);

            if boundary && !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
        }

        out.extend(c.to_lowercase());
    }

    if out.ends_with('-') {
        out.pop();
    }

    out
}

/// The bare identifier of a type: no module path, generics or `dyn` prefix
///
/// `dyn my_app::logging::Log + Send` yields `Log`.
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let full = full.strip_prefix("dyn ").unwrap_or(full);
    let base = full.split(&['<', ' '][..]).next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Default service name for a type, e.g. `print-log` for `PrintLog`
pub fn service_name_of<T: ?Sized>() -> String {
    kebab_case(short_type_name::<T>())
}
