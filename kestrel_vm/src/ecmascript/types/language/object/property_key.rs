// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::ecmascript::execution::Agent;
use crate::ecmascript::types::{String, Symbol, Value};
use crate::heap::mark::{HeapMark, WorkQueues};

/// ### [Property key](https://tc39.es/ecma262/#sec-object-type)
///
/// A property key is either a String or a Symbol. Strings that are canonical
/// [array indices](https://tc39.es/ecma262/#array-index) (`"n"` for
/// `n ∈ [0, 2³²−1)`) are carried in integer form so that integer-keyed
/// lookups and the ascending-order enumeration requirement need no string
/// parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Integer(u32),
    String(String),
    Symbol(Symbol),
}

impl PropertyKey {
    pub fn from_str(agent: &mut Agent, key: &str) -> Self {
        if let Some(index) = parse_array_index(key) {
            PropertyKey::Integer(index)
        } else {
            PropertyKey::String(String::from_str(agent, key))
        }
    }

    pub fn from_static_str(agent: &mut Agent, key: &'static str) -> Self {
        Self::from_str(agent, key)
    }

    pub fn from_string(agent: &mut Agent, key: std::string::String) -> Self {
        Self::from_str(agent, &key)
    }

    pub(crate) fn from_js_string(agent: &Agent, key: String) -> Self {
        if let Some(index) = agent[key].as_str().and_then(parse_array_index) {
            PropertyKey::Integer(index)
        } else {
            PropertyKey::String(key)
        }
    }

    pub fn is_array_index(self) -> bool {
        matches!(self, PropertyKey::Integer(_))
    }

    pub fn is_symbol(self) -> bool {
        matches!(self, PropertyKey::Symbol(_))
    }

    /// The key as a language value; integer keys convert back to their
    /// canonical String form.
    pub fn into_value(self, agent: &mut Agent) -> Value {
        match self {
            PropertyKey::Integer(index) => {
                Value::String(String::from_string(agent, index.to_string()))
            }
            PropertyKey::String(string) => Value::String(string),
            PropertyKey::Symbol(symbol) => Value::Symbol(symbol),
        }
    }

    /// A printable rendering for diagnostics and error messages.
    pub(crate) fn as_display_string(self, agent: &mut Agent) -> std::string::String {
        match self {
            PropertyKey::Integer(index) => index.to_string(),
            PropertyKey::String(string) => string.to_string_lossy(agent).into_owned(),
            PropertyKey::Symbol(symbol) => symbol
                .descriptive_string(agent)
                .to_string_lossy(agent)
                .into_owned(),
        }
    }
}

/// Parses a canonical array index string: all digits, no superfluous leading
/// zero, and numerically below 2³²−1.
pub(crate) fn parse_array_index(key: &str) -> Option<u32> {
    if key.is_empty() || key.len() > 10 {
        return None;
    }
    if key.len() > 1 && key.starts_with('0') {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = key.parse::<u64>().ok()?;
    if value < u32::MAX as u64 {
        Some(value as u32)
    } else {
        None
    }
}

impl From<u32> for PropertyKey {
    fn from(value: u32) -> Self {
        PropertyKey::Integer(value)
    }
}

impl From<String> for PropertyKey {
    fn from(value: String) -> Self {
        PropertyKey::String(value)
    }
}

impl From<Symbol> for PropertyKey {
    fn from(value: Symbol) -> Self {
        PropertyKey::Symbol(value)
    }
}

impl HeapMark for PropertyKey {
    fn mark_values(&self, queues: &mut WorkQueues) {
        match self {
            PropertyKey::Integer(_) => {}
            PropertyKey::String(string) => string.mark_values(queues),
            PropertyKey::Symbol(symbol) => symbol.mark_values(queues),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::parse_array_index;

    #[test]
    fn array_index_canonicality() {
        assert_eq!(parse_array_index("0"), Some(0));
        assert_eq!(parse_array_index("4294967294"), Some(4294967294));
        // 2³²−1 is not an array index.
        assert_eq!(parse_array_index("4294967295"), None);
        assert_eq!(parse_array_index("01"), None);
        assert_eq!(parse_array_index("-1"), None);
        assert_eq!(parse_array_index(""), None);
        assert_eq!(parse_array_index("1e3"), None);
    }
}
