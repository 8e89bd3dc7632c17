//! Handler Shapes
//!
//! A [`Shape`] is a small runtime description of a value a handler takes or
//! returns. A [`Signature`] lists the shapes of a handler's inputs and
//! outputs, and is what registration validates.
//!
//! Typed handlers get their signature from the compiler (see
//! [`Handler`](crate::handler::Handler)); dynamic handlers spell it out and
//! have their payloads checked against it at dispatch time.
//!
//! # Example
//!
//! ```
//! use jrpc_server::shape::{Shape, Signature};
//!
//! let signature = Signature::new(
//!     vec![Shape::Context, Shape::structure([("a", Shape::Integer), ("b", Shape::Integer)])],
//!     vec![Shape::Integer, Shape::Error],
//! );
//! assert!(signature.validate().is_ok());
//! assert_eq!(signature.to_string(), "fn(Context, {a: integer, b: integer}) -> (integer, Error)");
//! ```

use std::fmt;

use serde_json::Value;

use crate::error::RegistrationError;

/// Runtime type tag for one handler input or output.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// The call context.
    Context,
    Bool,
    /// A JSON number without a fractional part.
    Integer,
    /// Any JSON number.
    Float,
    String,
    /// A JSON object with named members. Members not listed are ignored.
    Struct(Vec<Field>),
    Sequence(Box<Shape>),
    /// `null` or the inner shape. An optional struct member may be absent.
    Optional(Box<Shape>),
    /// Any JSON value.
    Any,
    /// A serde type, named for diagnostics; its structure is checked by serde.
    Typed(String),
    /// A type that cannot travel as a payload.
    Opaque(String),
    /// The error capability.
    Error,
}

/// A named member of a [`Shape::Struct`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub shape: Shape,
}

impl Shape {
    pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, Shape)>) -> Self {
        Shape::Struct(
            fields
                .into_iter()
                .map(|(name, shape)| Field {
                    name: name.into(),
                    shape,
                })
                .collect(),
        )
    }

    pub fn sequence(inner: Shape) -> Self {
        Shape::Sequence(Box::new(inner))
    }

    pub fn optional(inner: Shape) -> Self {
        Shape::Optional(Box::new(inner))
    }

    /// Names a serde type by its Rust type name.
    pub fn typed<T: ?Sized>() -> Self {
        Shape::Typed(std::any::type_name::<T>().to_owned())
    }

    pub fn opaque(name: impl Into<String>) -> Self {
        Shape::Opaque(name.into())
    }

    /// Whether values of this shape can be carried in `params` or `result`.
    pub fn is_payload(&self) -> bool {
        match self {
            Shape::Context | Shape::Error | Shape::Opaque(_) => false,
            Shape::Struct(fields) => fields.iter().all(|field| field.shape.is_payload()),
            Shape::Sequence(inner) | Shape::Optional(inner) => inner.is_payload(),
            Shape::Bool | Shape::Integer | Shape::Float | Shape::String | Shape::Any | Shape::Typed(_) => true,
        }
    }

    /// Whether a JSON value fits this shape.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Shape::Bool => value.is_boolean(),
            Shape::Integer => value.is_i64() || value.is_u64(),
            Shape::Float => value.is_number(),
            Shape::String => value.is_string(),
            Shape::Struct(fields) => match value {
                Value::Object(members) => fields.iter().all(|field| match members.get(&field.name) {
                    Some(member) => field.shape.accepts(member),
                    None => matches!(field.shape, Shape::Optional(_)),
                }),
                _ => false,
            },
            Shape::Sequence(inner) => match value {
                Value::Array(items) => items.iter().all(|item| inner.accepts(item)),
                _ => false,
            },
            Shape::Optional(inner) => value.is_null() || inner.accepts(value),
            Shape::Any | Shape::Typed(_) => true,
            Shape::Context | Shape::Opaque(_) | Shape::Error => false,
        }
    }

    /// Whether `value`, decoded as this shape, is the shape's zero value.
    ///
    /// `null` is zero for every shape. Struct members that are absent count
    /// as zero. Sequences, optionals and `Any` are zero only when `null`.
    pub fn is_zero(&self, value: &Value) -> bool {
        if value.is_null() {
            return true;
        }
        match self {
            Shape::Bool | Shape::Integer | Shape::Float | Shape::String | Shape::Typed(_) => {
                crate::zero::is_zero(value)
            }
            Shape::Struct(fields) => match value {
                Value::Object(members) => fields.iter().all(|field| {
                    members
                        .get(&field.name)
                        .map_or(true, |member| field.shape.is_zero(member))
                }),
                _ => false,
            },
            Shape::Sequence(_) | Shape::Optional(_) | Shape::Any => false,
            Shape::Context | Shape::Opaque(_) | Shape::Error => false,
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Context => f.write_str("Context"),
            Shape::Bool => f.write_str("bool"),
            Shape::Integer => f.write_str("integer"),
            Shape::Float => f.write_str("float"),
            Shape::String => f.write_str("string"),
            Shape::Struct(fields) => {
                f.write_str("{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.shape)?;
                }
                f.write_str("}")
            }
            Shape::Sequence(inner) => write!(f, "[{}]", inner),
            Shape::Optional(inner) => write!(f, "{}?", inner),
            Shape::Any => f.write_str("any"),
            Shape::Typed(name) | Shape::Opaque(name) => f.write_str(name),
            Shape::Error => f.write_str("Error"),
        }
    }
}

/// The calling shape of a handler: what it takes and what it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    inputs: Vec<Shape>,
    outputs: Vec<Shape>,
}

impl Signature {
    pub fn new(inputs: Vec<Shape>, outputs: Vec<Shape>) -> Self {
        Self { inputs, outputs }
    }

    pub fn inputs(&self) -> &[Shape] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Shape] {
        &self.outputs
    }

    /// The shape of the parameter value, if the handler takes one.
    pub fn param_shape(&self) -> Option<&Shape> {
        self.inputs.get(1)
    }

    pub fn result_shape(&self) -> Option<&Shape> {
        self.outputs.first()
    }

    pub fn takes_params(&self) -> bool {
        self.inputs.len() == 2
    }

    /// Checks the registration rules in order and reports the first one broken.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if !(1..=2).contains(&self.inputs.len()) {
            return Err(RegistrationError::InvalidArity(self.inputs.len()));
        }
        if self.inputs[0] != Shape::Context {
            return Err(RegistrationError::InvalidContextArg(self.inputs[0].clone()));
        }
        if let Some(param) = self.param_shape() {
            if !param.is_payload() {
                return Err(RegistrationError::InvalidParamType(param.clone()));
            }
        }
        if self.outputs.len() != 2 {
            return Err(RegistrationError::InvalidReturnArity(self.outputs.len()));
        }
        if !self.outputs[0].is_payload() {
            return Err(RegistrationError::InvalidResultType(self.outputs[0].clone()));
        }
        if self.outputs[1] != Shape::Error {
            return Err(RegistrationError::InvalidErrorType(self.outputs[1].clone()));
        }
        Ok(())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |shapes: &[Shape]| {
            shapes
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        write!(f, "fn({}) -> ({})", join(&self.inputs), join(&self.outputs))
    }
}
