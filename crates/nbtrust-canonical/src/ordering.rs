use std::cmp::Ordering;

/// Compares two keys by Unicode code point, one scalar value at a time.
///
/// This is the order Python's `sorted()` gives `str` keys. It differs from
/// UTF-16 code-unit order for characters outside the BMP: U+FFFD sorts before
/// U+1F60E here even though its code unit is larger than the lead surrogate.
pub fn compare_code_points(a: &str, b: &str) -> Ordering {
    a.chars().cmp(b.chars())
}
