//! Shared utility functions and constants

/// Width of the horizontal rules around conflict previews
pub const SEPARATOR_WIDTH: usize = 60;

/// Inner width of the boxed section headers
pub const BOX_WIDTH: usize = 56;

/// Pick the singular or plural form for `count`
pub fn plural<'a>(count: usize, singular: &'a str, plural: &'a str) -> &'a str {
    if count == 1 {
        singular
    } else {
        plural
    }
}

/// Tree branch glyph for item `index` of `len`
pub fn tree_prefix(index: usize, len: usize) -> &'static str {
    if index + 1 == len {
        "└─"
    } else {
        "├─"
    }
}

/// Center `s` within `width` columns (counted in chars)
pub fn center(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let left = (width - len) / 2;
    let right = width - len - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}
