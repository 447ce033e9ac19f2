use std::borrow::Cow;
use std::iter::FusedIterator;

use crate::number::format_float;
use crate::ordering::compare_code_points;
use crate::value::{Mapping, Value};

const TRUE: &str = "True";
const FALSE: &str = "False";
const NONE: &str = "None";

/// Lazy, single-pass stream of canonical text tokens.
///
/// Tokens are emitted depth-first with no separators: strings verbatim,
/// `True`/`False`/`None` for the literals, numbers in their canonical text,
/// and for mappings each key followed by the tokens of its value, keys in
/// code-point order. Concatenating every token gives the signed payload.
///
/// The stream borrows the document and keeps an explicit stack, so nesting
/// depth is bounded by memory rather than by the call stack.
pub struct Tokens<'a> {
    stack: Vec<Frame<'a>>,
}

enum Frame<'a> {
    Value(&'a Value),
    Sequence(std::slice::Iter<'a, Value>),
    Mapping(std::vec::IntoIter<(&'a str, &'a Value)>),
}

/// Starts a token stream over `value`.
pub fn tokens(value: &Value) -> Tokens<'_> {
    Tokens {
        stack: vec![Frame::Value(value)],
    }
}

/// Concatenates the whole token stream. Mostly useful for inspection; the
/// digest engine consumes [`tokens`] directly.
pub fn canonical_string(value: &Value) -> String {
    tokens(value).collect()
}

fn sorted_entries(map: &Mapping) -> std::vec::IntoIter<(&str, &Value)> {
    let mut entries: Vec<(&str, &Value)> = map
        .iter()
        .filter(|(_, v)| !matches!(v, Value::Absent))
        .map(|(k, v)| (k.as_str(), v))
        .collect();
    entries.sort_by(|a, b| compare_code_points(a.0, b.0));
    entries.into_iter()
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Cow<'a, str>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                Frame::Value(value) => match value {
                    Value::String(s) => return Some(Cow::Borrowed(s)),
                    Value::Bool(true) => return Some(Cow::Borrowed(TRUE)),
                    Value::Bool(false) => return Some(Cow::Borrowed(FALSE)),
                    Value::Null => return Some(Cow::Borrowed(NONE)),
                    Value::Integer(i) => return Some(Cow::Borrowed(i.as_str())),
                    Value::Float(f) => return Some(Cow::Owned(format_float(*f))),
                    Value::Sequence(items) => self.stack.push(Frame::Sequence(items.iter())),
                    Value::Mapping(map) => self.stack.push(Frame::Mapping(sorted_entries(map))),
                    Value::Absent => {}
                },
                Frame::Sequence(mut items) => {
                    if let Some(item) = items.next() {
                        self.stack.push(Frame::Sequence(items));
                        self.stack.push(Frame::Value(item));
                    }
                }
                Frame::Mapping(mut entries) => {
                    if let Some((key, value)) = entries.next() {
                        self.stack.push(Frame::Mapping(entries));
                        self.stack.push(Frame::Value(value));
                        return Some(Cow::Borrowed(key));
                    }
                }
            }
        }
    }
}

impl FusedIterator for Tokens<'_> {}
