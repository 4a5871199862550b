//! Small string helpers shared by the renderer and routing modules.

/// Convert a CamelCase name to snake_case.
///
/// Runs of uppercase letters are kept together, so acronyms split at the
/// boundary rather than between every letter.
///
/// # Examples
///
/// ```
/// use restroute::util::camel_to_snake;
///
/// assert_eq!(camel_to_snake("SplitAtTheBoundaries"), "split_at_the_boundaries");
/// assert_eq!(camel_to_snake("XYZResource"), "xyz_resource");
/// assert_eq!(camel_to_snake("ResourceXYZ"), "resource_xyz");
/// assert_eq!(camel_to_snake("XYZ"), "xyz");
/// ```
pub fn camel_to_snake(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev_lower = i > 0 && chars[i - 1].is_lowercase();
            // Last letter of an uppercase run followed by a lowercase letter
            // starts a new word: "XYZName" -> "xyz_name".
            let next_lower = i > 0
                && chars[i - 1].is_uppercase()
                && chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev_lower || next_lower {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out.trim_matches('_').to_string()
}

/// Derive the label of a resource from its declared name.
///
/// Strips a trailing `Resource` (if any) and converts the remainder to
/// snake_case. Used by the generic HTML backend to build template paths:
/// `UserResource` and `User` both label as `user`.
pub fn resource_label(name: &str) -> String {
    let trimmed = match name.strip_suffix("Resource") {
        Some(rest) if !rest.is_empty() => rest,
        _ => name,
    };
    camel_to_snake(trimmed)
}
