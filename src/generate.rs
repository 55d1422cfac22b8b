//! Conversion of input trees into test programs.
//!
//! A [`Generator`] holds all mutable state of one conversion: the counters,
//! the output [`Builder`], and whether declarations currently live at
//! contract or function scope. Each tree node implements [`Generate`] and
//! writes its declarations, assignments, parameters and checks into it.
//!
//! Generation never fails. Shapes that cannot be expressed (structs, unset
//! variants, arrays with too few or too many dimensions) contribute nothing.

use tracing::{debug, trace, warn};

use crate::builder::Builder;
use crate::value::{self, Counters};
use crate::{
    AddressType, Contract, DynamicByteArrayType, FixedByteType, IntegerType, NonValueType,
    StructType, TestFunction, Type, ValueType, VarDecl,
};

/// Program generation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pragma: String,
    max_array_dimensions: usize,
    max_static_length: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pragma: ">=0.0".into(),
            max_array_dimensions: 4,
            max_static_length: 4,
        }
    }
}

impl Config {
    /// Version constraint following `pragma solidity`.
    pub fn with_pragma(mut self, pragma: impl Into<String>) -> Self {
        self.pragma = pragma.into();
        self
    }

    /// Arrays with more dimensions than this are skipped.
    pub fn with_max_array_dimensions(mut self, max: usize) -> Self {
        self.max_array_dimensions = max;
        self
    }

    /// Arrays with a static dimension longer than this are skipped.
    ///
    /// Static lengths are taken verbatim from the tree, so this bounds the
    /// number of elements an array expands into.
    pub fn with_max_static_length(mut self, max: u64) -> Self {
        self.max_static_length = max;
        self
    }

    pub fn pragma(&self) -> &str {
        &self.pragma
    }

    pub fn max_array_dimensions(&self) -> usize {
        self.max_array_dimensions
    }

    pub fn max_static_length(&self) -> u64 {
        self.max_static_length
    }
}

/// Where a declaration lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Contract storage. Assignments are deferred into `f()`.
    State,
    /// Locals of `f()`, reference types live in `memory`.
    Local,
}

/// How a generated value is compared against its expected literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Inequality,
    Bytes,
    String,
}

impl From<DynamicByteArrayType> for Comparison {
    fn from(ty: DynamicByteArrayType) -> Self {
        match ty {
            DynamicByteArrayType::Bytes => Comparison::Bytes,
            DynamicByteArrayType::String => Comparison::String,
        }
    }
}

/// Check ids at or above this value would be read as `g_external` failures.
const EXTERNAL_RETURN_BASE: u64 = 1000;

/// Mutable state of a single conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generator<'cfg> {
    counters: Counters,
    builder: Builder,
    scope: Scope,
    config: &'cfg Config,
}

impl<'cfg> Generator<'cfg> {
    pub fn new(config: &'cfg Config) -> Self {
        Generator {
            counters: Counters::new(),
            builder: Builder::new(),
            scope: Scope::State,
            config,
        }
    }

    pub fn config(&self) -> &'cfg Config {
        self.config
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    pub fn set_scope(&mut self, scope: Scope) {
        self.scope = scope;
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Draws the next value seed.
    pub fn next_value(&mut self) -> u64 {
        self.counters.next_value()
    }

    /// Declares a fresh variable of type `ty` and adds it to both callee
    /// parameter lists. Returns the variable's name.
    pub fn declare(&mut self, ty: &str, is_value: bool) -> String {
        let name = self.counters.next_name();
        let qualifier = match (is_value, self.scope) {
            (false, Scope::Local) => Some("memory"),
            _ => None,
        };
        let scope = self.scope;
        trace!(%name, ty, ?scope, "declare");
        self.builder.declare(ty, &name, qualifier);
        self.builder.param(ty, &name, is_value);
        name
    }

    pub fn define(&mut self, lhs: &str, rhs: &str) {
        match self.scope {
            Scope::State => self.builder.defer_assign(lhs, rhs),
            Scope::Local => self.builder.assign(lhs, rhs),
        }
    }

    /// Adds a check returning a fresh id when `lhs` differs from `rhs`.
    pub fn check(&mut self, comparison: Comparison, lhs: &str, rhs: &str) {
        let condition = match comparison {
            Comparison::Inequality => format!("{lhs} != {rhs}"),
            Comparison::Bytes => format!("!bytesCompare({lhs}, {rhs})"),
            Comparison::String => format!("!stringCompare({lhs}, {rhs})"),
        };
        let id = self.counters.next_check();
        if id == EXTERNAL_RETURN_BASE {
            warn!(id, "check ids now overlap the g_external return range");
        }
        self.builder.check(&condition, id);
    }

    pub fn checked_define(&mut self, comparison: Comparison, lhs: &str, rhs: &str) {
        self.define(lhs, rhs);
        self.check(comparison, lhs, rhs);
    }

    /// Declares, assigns and checks a single variable.
    fn leaf(&mut self, ty: &str, is_value: bool, comparison: Comparison, value: &str) {
        let name = self.declare(ty, is_value);
        self.checked_define(comparison, &name, value);
    }

    /// Renders the program built so far.
    pub fn finish(self) -> String {
        self.builder.render(self.config.pragma())
    }
}

/// Emission of declarations and checks for a tree node.
pub trait Generate {
    fn generate(&self, generator: &mut Generator);
}

impl Generate for IntegerType {
    fn generate(&self, generator: &mut Generator) {
        let value = value::integer_value(self.signed, self.width, generator.next_value());
        generator.leaf(&self.to_string(), true, Comparison::Inequality, &value);
    }
}

impl Generate for FixedByteType {
    fn generate(&self, generator: &mut Generator) {
        let value = value::fixed_byte_value(self.width, generator.next_value());
        generator.leaf(&self.to_string(), true, Comparison::Inequality, &value);
    }
}

impl Generate for AddressType {
    fn generate(&self, generator: &mut Generator) {
        let value = value::address_value(generator.next_value());
        generator.leaf(&self.to_string(), true, Comparison::Inequality, &value);
    }
}

impl Generate for DynamicByteArrayType {
    fn generate(&self, generator: &mut Generator) {
        let value = value::dynamic_bytes_value(generator.next_value());
        generator.leaf(&self.to_string(), false, (*self).into(), &value);
    }
}

impl Generate for StructType {
    fn generate(&self, _: &mut Generator) {
        debug!(fields = self.fields.len(), "skipping struct");
    }
}

impl Generate for ValueType {
    fn generate(&self, generator: &mut Generator) {
        match self {
            ValueType::Integer(ty) => ty.generate(generator),
            ValueType::FixedByte(ty) => ty.generate(generator),
            ValueType::Address(ty) => ty.generate(generator),
            ValueType::Unset => debug!("skipping unset value type"),
        }
    }
}

impl Generate for NonValueType {
    fn generate(&self, generator: &mut Generator) {
        match self {
            NonValueType::DynamicByteArray(ty) => ty.generate(generator),
            NonValueType::Array(ty) => ty.generate(generator),
            NonValueType::Struct(ty) => ty.generate(generator),
            NonValueType::Unset => debug!("skipping unset non-value type"),
        }
    }
}

impl Generate for Type {
    fn generate(&self, generator: &mut Generator) {
        match self {
            Type::Value(ty) => ty.generate(generator),
            Type::NonValue(ty) => ty.generate(generator),
            Type::Unset => debug!("skipping unset type"),
        }
    }
}

impl Generate for VarDecl {
    fn generate(&self, generator: &mut Generator) {
        self.ty.generate(generator);
    }
}

impl Generate for TestFunction {
    fn generate(&self, generator: &mut Generator) {
        generator.builder.open_test_function();
        // TODO: Support more than one local declaration.
        if let Some((first, rest)) = self.local_vars.split_first() {
            if !rest.is_empty() {
                debug!(ignored = rest.len(), "only the first local is converted");
            }
            first.generate(generator);
        }
        let variables = generator.counters.variables();
        generator.builder.close_test_function(variables);
    }
}

impl Generate for Contract {
    fn generate(&self, generator: &mut Generator) {
        generator.set_scope(Scope::State);
        for decl in &self.state_vars {
            decl.generate(generator);
        }
        generator.set_scope(Scope::Local);
        self.test_function.generate(generator);
    }
}
