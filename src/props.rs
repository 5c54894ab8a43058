//! Attribute sourced props.
//!
//! A component declares a [`PropSchema`]: the attribute names it reads and
//! the kind each one is coerced into. The schema is resolved once, when the
//! element is connected, against the attributes of the host node.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use std::fmt::{self, Display, Formatter};

/// The primitive kinds a prop can be coerced into.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PropKind {
    /// The raw attribute text.
    String,
    /// A finite floating point number.
    Number,
    /// `true` for a bare attribute, `"true"` or the attribute's own name;
    /// `false` for `"false"`.
    Boolean,
}

impl Display for PropKind {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = match self {
            PropKind::String => "string",
            PropKind::Number => "number",
            PropKind::Boolean => "boolean",
        };
        write!(f, "{}", name)
    }
}

impl PropKind {
    /// Coerce the raw attribute text of prop `name`.
    pub fn parse(self, name: &str, raw: &str) -> Result<PropValue> {
        let mismatch = || Error::PropTypeMismatch {
            name: name.to_string(),
            expected: self,
            value: raw.to_string(),
        };
        match self {
            PropKind::String => Ok(PropValue::String(raw.to_string())),
            PropKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(PropValue::Number)
                .ok_or_else(mismatch),
            PropKind::Boolean => {
                let value = raw.trim();
                if value.is_empty()
                    || value.eq_ignore_ascii_case("true")
                    || value.eq_ignore_ascii_case(name)
                {
                    Ok(PropValue::Boolean(true))
                } else if value.eq_ignore_ascii_case("false") {
                    Ok(PropValue::Boolean(false))
                } else {
                    Err(mismatch())
                }
            }
        }
    }
}

/// A resolved prop value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    #[allow(missing_docs)]
    String(String),
    #[allow(missing_docs)]
    Number(f64),
    #[allow(missing_docs)]
    Boolean(bool),
}

impl PropValue {
    /// The string, if this is a string prop.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The number, if this is a number prop.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The flag, if this is a boolean prop.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PropSpec {
    kind: PropKind,
    required: bool,
}

/// The props a component reads from its host node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropSchema(IndexMap<&'static str, PropSpec>);

impl PropSchema {
    #[allow(missing_docs)]
    pub fn new() -> PropSchema {
        PropSchema::default()
    }

    /// Declare an optional prop. An absent attribute resolves to no value.
    pub fn prop(mut self, name: &'static str, kind: PropKind) -> PropSchema {
        self.0.insert(name, PropSpec { kind, required: false });
        self
    }

    /// Declare a prop whose attribute must be present.
    pub fn required(mut self, name: &'static str, kind: PropKind) -> PropSchema {
        self.0.insert(name, PropSpec { kind, required: true });
        self
    }

    /// Number of declared props.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read every declared prop through `read` and coerce it.
    pub fn resolve<F>(&self, mut read: F) -> Result<Props>
    where
        F: FnMut(&str) -> Result<Option<String>>,
    {
        let mut props = IndexMap::with_capacity(self.0.len());
        for (name, spec) in self.0.iter() {
            let value = match read(name)? {
                Some(raw) => Some(spec.kind.parse(name, &raw)?),
                None if spec.required => return Err(Error::MissingProp(name.to_string())),
                None => None,
            };
            props.insert(name.to_string(), value);
        }
        Ok(Props(props))
    }
}

/// Resolved props of one element instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props(IndexMap<String, Option<PropValue>>);

impl Props {
    /// The value of a prop, `None` when undeclared or absent.
    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.0.get(name).and_then(Option::as_ref)
    }

    /// Shorthand for a string prop.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropValue::as_str)
    }

    /// Shorthand for a number prop.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropValue::as_number)
    }

    /// Shorthand for a boolean prop.
    pub fn bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(PropValue::as_bool)
    }

    /// Whether the prop is part of the schema.
    pub fn is_declared(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }
}
