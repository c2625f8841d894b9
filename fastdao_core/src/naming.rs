//! Conversions between entity field names (camelCase), column names (snake_case)
//! and accessor names (`getUserName`).
//!
//! All functions are pure and total. `camel_to_snake` applies a strict
//! per-character rule, so consecutive capitals are split (`"ID"` -> `"i_d"`);
//! `snake_to_camel` is its inverse for identifiers that start with a lowercase
//! letter and contain no underscores.

/// `"userName"` -> `"user_name"`, `"UserAccount"` -> `"user_account"`, `"ID"` -> `"i_d"`.
pub fn camel_to_snake(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// `"user_name"` -> `"userName"`.
pub fn snake_to_camel(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut upper_next = false;
    for ch in s.chars() {
        if ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// `"getUserName"` -> `"userName"`.
pub fn accessor_to_field(name: &str) -> String {
    let rest = name.strip_prefix("get").unwrap_or(name);
    let mut chars = rest.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `"getUserName"` -> `"user_name"`.
pub fn accessor_to_column(name: &str) -> String {
    camel_to_snake(&accessor_to_field(name))
}
