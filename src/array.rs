//! Resizing and initialization of multi-dimensional arrays.
//!
//! An array is declared once with its full type, then expanded depth-first
//! starting from the outermost (right-most) dimension. Every dimension gets a
//! length check, dynamic ones are resized first, and every leaf element is
//! assigned and checked like a plain value.

use tracing::{debug, trace};

use crate::generate::{Comparison, Generate, Generator, Scope};
use crate::value;
use crate::{ArrayBase, ArrayType, Dimension};

impl ArrayBase {
    /// Solidity type name, `None` for bases that cannot be generated.
    pub fn type_name(&self) -> Option<String> {
        match self {
            ArrayBase::Integer(ty) => Some(ty.to_string()),
            ArrayBase::FixedByte(ty) => Some(ty.to_string()),
            ArrayBase::Address(ty) => Some(ty.to_string()),
            ArrayBase::Struct(_) | ArrayBase::Unset => None,
        }
    }

    fn value(&self, counter: u64) -> Option<String> {
        match self {
            ArrayBase::Integer(ty) => Some(value::integer_value(ty.signed, ty.width, counter)),
            ArrayBase::FixedByte(ty) => Some(value::fixed_byte_value(ty.width, counter)),
            ArrayBase::Address(_) => Some(value::address_value(counter)),
            ArrayBase::Struct(_) | ArrayBase::Unset => None,
        }
    }
}

/// `base` followed by one bracket per dimension, e.g. `uint8[3][]`.
pub fn type_string(base: &str, dimensions: &[Dimension]) -> String {
    dimensions
        .iter()
        .fold(base.to_string(), |ty, dim| ty + &dim.type_suffix())
}

impl ArrayType {
    /// Reason this array contributes nothing, if any.
    fn unsupported(&self, generator: &Generator) -> Option<&'static str> {
        let config = generator.config();
        let dimensions = self.dimensions.len();
        if dimensions == 0 || dimensions > config.max_array_dimensions() {
            Some("unsupported dimension count")
        } else if self.base.type_name().is_none() {
            Some("unsupported base type")
        } else if self.dimensions.iter().any(|dim| {
            dim.is_static && (dim.seed == 0 || u64::from(dim.seed) > config.max_static_length())
        }) {
            Some("static length out of bounds")
        } else {
            None
        }
    }
}

impl Generate for ArrayType {
    fn generate(&self, generator: &mut Generator) {
        if let Some(reason) = self.unsupported(generator) {
            debug!(array = %self, reason, "skipping array");
            return;
        }
        let Some(base) = self.base.type_name() else {
            return;
        };
        let name = generator.declare(&type_string(&base, &self.dimensions), false);
        expand(generator, &self.base, &base, &self.dimensions, &name);
    }
}

/// Resizes `var`, checks its length and recurses into every element, or
/// assigns and checks a base value once no dimensions remain.
pub fn expand(
    generator: &mut Generator,
    base: &ArrayBase,
    base_name: &str,
    dimensions: &[Dimension],
    var: &str,
) {
    let Some((outermost, inner)) = dimensions.split_last() else {
        if let Some(value) = base.value(generator.next_value()) {
            generator.checked_define(Comparison::Inequality, var, &value);
        }
        return;
    };

    let length = resize(generator, outermost, &type_string(base_name, dimensions), var);
    for i in 0..length {
        expand(generator, base, base_name, inner, &format!("{var}[{i}]"));
    }
}

/// Emits the resize for a dynamic dimension and the length check for any
/// dimension. Returns the dimension's length.
fn resize(generator: &mut Generator, dim: &Dimension, ty: &str, var: &str) -> u64 {
    let length = if dim.is_static {
        dim.resolve(0)
    } else {
        let length = dim.resolve(generator.next_value());
        match generator.scope() {
            Scope::State => generator.define(&format!("{var}.length"), &length.to_string()),
            Scope::Local => generator.define(var, &format!("new {ty}({length})")),
        }
        length
    };
    trace!(var, length, is_static = dim.is_static, "resize");
    generator.check(
        Comparison::Inequality,
        &format!("{var}.length"),
        &length.to_string(),
    );
    length
}
