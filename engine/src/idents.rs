//! Element-identifier encodings for the three authoring tools whose
//! documents the panel accepts. The conventions are kept as separate
//! code paths on purpose: the tool that produced a document cannot be
//! inferred at parse time, so every encoding of every name is
//! registered defensively in the matching index.

/// The three supported authoring-tool identifier conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdConvention {
    /// Escapes disallowed characters as `_x<HEX>_`; a leading digit
    /// forces the first character to be escaped too.
    Illustrator,
    /// Collapses each disallowed character to a single underscore.
    Inkscape,
    /// Older convention with a wider allowed set; a leading digit is
    /// prefixed with a bare underscore instead of escaped.
    Legacy,
}

pub const ALL_CONVENTIONS: [IdConvention; 3] = [
    IdConvention::Illustrator,
    IdConvention::Inkscape,
    IdConvention::Legacy,
];

fn allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | ':' | '.')
}

fn allowed_legacy(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '[' | ']' | '{' | '}' | '_' | '.' | ':' | '-')
}

fn hex_escape(c: char) -> String {
    format!("_x{:X}_", c as u32)
}

/// Encode a display name into the element identifier a given authoring
/// tool would have produced. Deterministic and total for any string.
pub fn encode_id(name: &str, convention: IdConvention) -> String {
    match convention {
        IdConvention::Illustrator => {
            let mut out = String::with_capacity(name.len());
            for c in name.chars() {
                if allowed(c) {
                    out.push(c);
                } else if c == ' ' {
                    out.push('_');
                } else {
                    out.push_str(&hex_escape(c));
                }
            }
            if let Some(first) = out.chars().next()
                && first.is_ascii_digit()
            {
                out = format!("{}{}", hex_escape(first), &out[first.len_utf8()..]);
            }
            out
        }
        IdConvention::Inkscape => name
            .chars()
            .map(|c| if allowed(c) { c } else { '_' })
            .collect(),
        IdConvention::Legacy => {
            let mut out = String::with_capacity(name.len());
            let mut chars = name.chars().peekable();
            while let Some(c) = chars.next() {
                if allowed_legacy(c) {
                    out.push(c);
                } else {
                    out.push('_');
                    // A disallowed character absorbs one following
                    // whitespace character.
                    if chars.peek().is_some_and(|next| next.is_whitespace()) {
                        chars.next();
                    }
                }
            }
            if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
                out.insert(0, '_');
            }
            out
        }
    }
}

/// Best-effort inverse of the primary encoding: `_x<hex>_` escapes are
/// decoded and remaining underscores become spaces. Used only to derive
/// a display name from a raw element identifier that has no explicit
/// title; collisions are possible and accepted.
pub fn decode_id(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    let bytes = id.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        // _x<two hex digits>_
        if bytes[i] == b'_'
            && i + 4 < bytes.len()
            && bytes[i + 1] == b'x'
            && bytes[i + 4] == b'_'
            && bytes[i + 2].is_ascii_hexdigit()
            && bytes[i + 3].is_ascii_hexdigit()
        {
            let hex = &id[i + 2..i + 4];
            if let Ok(code) = u32::from_str_radix(hex, 16)
                && let Some(c) = char::from_u32(code)
            {
                out.push(c);
                i += 5;
                continue;
            }
        }
        if bytes[i] == b'_' {
            out.push(' ');
            i += 1;
        } else {
            let c = id[i..].chars().next().unwrap_or('_');
            out.push(c);
            i += c.len_utf8();
        }
    }
    out
}
