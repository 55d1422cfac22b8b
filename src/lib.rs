//! Self-checking Solidity programs for fuzzing the ABI v2 coder.
//!
//! A [`Contract`] tree describes state variables and the locals of a single
//! test function. [`Generate`] walks the tree and emits a program which
//! assigns pseudo-random values to every variable, passes them through a
//! `public` and an `external` call, and returns the id of the first check
//! whose decoded value differs.
//!
//! ```
//! use abiv2fuzz::{Config, Contract, Parse};
//!
//! let contract = Contract::parse("uint8; function { bytes; }")
//!     .into_result()
//!     .unwrap();
//! let program = contract.to_solidity(&Config::default());
//! assert!(program.contains("uint8 x_0;"));
//! ```

use itertools::Itertools;
use std::fmt;

pub mod array;
pub mod builder;
pub mod error;
pub mod generate;
pub mod parse;
pub mod value;

pub use error::Error;
pub use generate::{Config, Generate, Generator, Scope};
pub use parse::Parse;

/// `uintN` or `intN`, with `N` a multiple of 8 in `8..=256`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegerType {
    pub width: u16,
    pub signed: bool,
}

impl IntegerType {
    /// Normalizes a raw grammar width into one of the 32 valid widths.
    pub fn from_seed(seed: u32, signed: bool) -> Self {
        IntegerType {
            width: 8 * ((seed % 32) as u16 + 1),
            signed,
        }
    }
}

/// `bytesN` with `N` in `1..=32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedByteType {
    pub width: u8,
}

impl FixedByteType {
    pub fn from_seed(seed: u32) -> Self {
        FixedByteType {
            width: (seed % 32) as u8 + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressType {
    pub payable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamicByteArrayType {
    Bytes,
    String,
}

/// Structs are accepted in the tree but never produce output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StructType {
    pub fields: Vec<Type>,
}

/// A single array dimension.
///
/// Static dimensions use `seed` as their length. Dynamic dimensions derive
/// their length from `seed` and the value counter, see [`Dimension::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dimension {
    pub is_static: bool,
    pub seed: u32,
}

impl Dimension {
    pub const MIN_DYNAMIC_LENGTH: u64 = 2;
    pub const DYNAMIC_LENGTH_SPREAD: u64 = 3;

    pub fn fixed(length: u32) -> Self {
        Dimension {
            is_static: true,
            seed: length,
        }
    }

    pub fn dynamic(seed: u32) -> Self {
        Dimension {
            is_static: false,
            seed,
        }
    }

    /// Length of this dimension given a freshly drawn counter value.
    ///
    /// Dynamic lengths always lie in `2..=4`.
    pub fn resolve(&self, counter: u64) -> u64 {
        if self.is_static {
            u64::from(self.seed)
        } else {
            (u64::from(self.seed) + counter) % Self::DYNAMIC_LENGTH_SPREAD
                + Self::MIN_DYNAMIC_LENGTH
        }
    }

    /// Solidity bracket for this dimension in a type string.
    pub fn type_suffix(&self) -> String {
        if self.is_static {
            format!("[{}]", self.seed)
        } else {
            "[]".into()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayBase {
    Integer(IntegerType),
    FixedByte(FixedByteType),
    Address(AddressType),
    Struct(StructType),
    Unset,
}

/// An array of a value base type.
///
/// Dimensions are listed in type-string order, so the last one is the
/// outermost: `uint8[3][]` is a dynamic array of `uint8[3]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    pub base: ArrayBase,
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Integer(IntegerType),
    FixedByte(FixedByteType),
    Address(AddressType),
    Unset,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NonValueType {
    DynamicByteArray(DynamicByteArrayType),
    Array(ArrayType),
    Struct(StructType),
    Unset,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Value(ValueType),
    NonValue(NonValueType),
    Unset,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VarDecl {
    pub ty: Type,
}

impl VarDecl {
    pub fn new(ty: Type) -> Self {
        VarDecl { ty }
    }
}

/// The function the factory contract calls.
///
/// Only the first local declaration is converted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct TestFunction {
    pub local_vars: Vec<VarDecl>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Contract {
    pub state_vars: Vec<VarDecl>,
    pub test_function: TestFunction,
}

impl Contract {
    /// Renders the complete test program for this tree.
    ///
    /// Each call starts from fresh counters, so the same tree always yields
    /// the same text.
    pub fn to_solidity(&self, config: &Config) -> String {
        let mut generator = Generator::new(config);
        self.generate(&mut generator);
        generator.finish()
    }
}

impl From<IntegerType> for Type {
    fn from(ty: IntegerType) -> Self {
        Type::Value(ValueType::Integer(ty))
    }
}

impl From<FixedByteType> for Type {
    fn from(ty: FixedByteType) -> Self {
        Type::Value(ValueType::FixedByte(ty))
    }
}

impl From<AddressType> for Type {
    fn from(ty: AddressType) -> Self {
        Type::Value(ValueType::Address(ty))
    }
}

impl From<DynamicByteArrayType> for Type {
    fn from(ty: DynamicByteArrayType) -> Self {
        Type::NonValue(NonValueType::DynamicByteArray(ty))
    }
}

impl From<ArrayType> for Type {
    fn from(ty: ArrayType) -> Self {
        Type::NonValue(NonValueType::Array(ty))
    }
}

impl From<StructType> for Type {
    fn from(ty: StructType) -> Self {
        Type::NonValue(NonValueType::Struct(ty))
    }
}

// Solidity type names. These are what end up in declarations and parameter
// lists, so they must stay valid Solidity.

impl fmt::Display for IntegerType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let prefix = if self.signed { "int" } else { "uint" };
        write!(f, "{prefix}{}", self.width)
    }
}

impl fmt::Display for FixedByteType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "bytes{}", self.width)
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.payable {
            write!(f, "address payable")
        } else {
            write!(f, "address")
        }
    }
}

impl fmt::Display for DynamicByteArrayType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DynamicByteArrayType::Bytes => write!(f, "bytes"),
            DynamicByteArrayType::String => write!(f, "string"),
        }
    }
}

// The remaining impls print the textual tree notation read by [`Parse`].

impl fmt::Display for StructType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "struct {{{}}}", self.fields.iter().join(", "))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.is_static, self.seed) {
            (true, n) => write!(f, "[{n}]"),
            (false, 0) => write!(f, "[]"),
            (false, n) => write!(f, "[*{n}]"),
        }
    }
}

impl fmt::Display for ArrayBase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArrayBase::Integer(ty) => write!(f, "{ty}"),
            ArrayBase::FixedByte(ty) => write!(f, "{ty}"),
            ArrayBase::Address(ty) => write!(f, "{ty}"),
            ArrayBase::Struct(ty) => write!(f, "{ty}"),
            ArrayBase::Unset => write!(f, "_"),
        }
    }
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.base)?;
        for dim in &self.dimensions {
            write!(f, "{dim}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Value(ValueType::Integer(ty)) => write!(f, "{ty}"),
            Type::Value(ValueType::FixedByte(ty)) => write!(f, "{ty}"),
            Type::Value(ValueType::Address(ty)) => write!(f, "{ty}"),
            Type::NonValue(NonValueType::DynamicByteArray(ty)) => write!(f, "{ty}"),
            Type::NonValue(NonValueType::Array(ty)) => write!(f, "{ty}"),
            Type::NonValue(NonValueType::Struct(ty)) => write!(f, "{ty}"),
            Type::Value(ValueType::Unset) | Type::NonValue(NonValueType::Unset) | Type::Unset => {
                write!(f, "_")
            }
        }
    }
}

impl fmt::Display for VarDecl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{};", self.ty)
    }
}

impl fmt::Display for TestFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "function {{")?;
        for decl in &self.local_vars {
            write!(f, " {decl}")?;
        }
        write!(f, " }}")
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for decl in &self.state_vars {
            writeln!(f, "{decl}")?;
        }
        write!(f, "{}", self.test_function)
    }
}
