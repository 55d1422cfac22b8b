//! Textual notation for input trees.
//!
//! ```text
//! uint8;
//! address payable[2][*7];
//! function {
//!     string;
//! }
//! ```
//!
//! Every line before `function` declares a state variable; the braces hold
//! the locals of the test function. Array dimensions are `[n]` for a static
//! length `n`, `[]` for a dynamic one, and `[*n]` for a dynamic one with
//! length seed `n`. `_` stands for an unset type.

use chumsky::ParseResult;
use chumsky::prelude::*;

use crate::{
    AddressType, ArrayBase, ArrayType, Contract, Dimension, DynamicByteArrayType, FixedByteType,
    IntegerType, NonValueType, StructType, TestFunction, Type, ValueType, VarDecl,
};

pub type Extra<'src> = extra::Err<Rich<'src, char>>;

pub trait Parse<'src>: Sized {
    fn parser() -> impl Parser<'src, &'src str, Self, Extra<'src>> + Clone;

    /// Parses the whole of `src`, surrounding whitespace allowed.
    fn parse(src: &'src str) -> ParseResult<Self, Rich<'src, char>> {
        Self::parser().padded().then_ignore(end()).parse(src)
    }
}

/// Single word types: integers, fixed bytes, `bytes`, `string` and `_`.
fn elementary(word: &str) -> Option<Type> {
    match word {
        "bytes" => Some(DynamicByteArrayType::Bytes.into()),
        "string" => Some(DynamicByteArrayType::String.into()),
        "_" => Some(Type::Unset),
        _ => {
            let integer = |digits: &str, signed| {
                digits
                    .parse::<u16>()
                    .ok()
                    .filter(|width| width % 8 == 0 && (8..=256).contains(width))
                    .map(|width| Type::from(IntegerType { width, signed }))
            };
            if let Some(digits) = word.strip_prefix("uint") {
                integer(digits, false)
            } else if let Some(digits) = word.strip_prefix("int") {
                integer(digits, true)
            } else if let Some(digits) = word.strip_prefix("bytes") {
                digits
                    .parse::<u8>()
                    .ok()
                    .filter(|width| (1..=32).contains(width))
                    .map(|width| Type::from(FixedByteType { width }))
            } else {
                None
            }
        }
    }
}

/// Array bases are value types, structs or unset.
fn array_base(ty: Type) -> Option<ArrayBase> {
    match ty {
        Type::Value(ValueType::Integer(ty)) => Some(ArrayBase::Integer(ty)),
        Type::Value(ValueType::FixedByte(ty)) => Some(ArrayBase::FixedByte(ty)),
        Type::Value(ValueType::Address(ty)) => Some(ArrayBase::Address(ty)),
        Type::NonValue(NonValueType::Struct(ty)) => Some(ArrayBase::Struct(ty)),
        Type::Unset => Some(ArrayBase::Unset),
        _ => None,
    }
}

fn number<'src>() -> impl Parser<'src, &'src str, u32, Extra<'src>> + Clone {
    text::int(10)
        .try_map(|digits: &str, span| digits.parse::<u32>().map_err(|e| Rich::custom(span, e)))
        .padded()
}

fn dimension<'src>() -> impl Parser<'src, &'src str, Dimension, Extra<'src>> + Clone {
    choice((
        just('*').padded().ignore_then(number()).map(Dimension::dynamic),
        number().map(Dimension::fixed),
    ))
    .or_not()
    .map(|dim| dim.unwrap_or(Dimension::dynamic(0)))
    .padded()
    .delimited_by(just('['), just(']'))
    .padded()
}

fn word<'src>(expected: &'static str) -> impl Parser<'src, &'src str, (), Extra<'src>> + Clone {
    text::ascii::ident()
        .padded()
        .filter(move |word: &&str| *word == expected)
        .ignored()
}

impl<'src> Parse<'src> for Type {
    fn parser() -> impl Parser<'src, &'src str, Self, Extra<'src>> + Clone {
        recursive(|ty| {
            let fields = ty
                .separated_by(just(',').padded())
                .allow_trailing()
                .collect::<Vec<_>>()
                .delimited_by(just('{').padded(), just('}').padded());

            let strukt = word("struct")
                .ignore_then(fields)
                .map(|fields| Type::from(StructType { fields }));

            let address = word("address")
                .ignore_then(word("payable").or_not())
                .map(|payable| {
                    Type::from(AddressType {
                        payable: payable.is_some(),
                    })
                });

            let other = text::ascii::ident().padded().try_map(|word: &str, span| {
                elementary(word).ok_or_else(|| Rich::custom(span, format!("unknown type `{word}`")))
            });

            choice((strukt, address, other))
                .then(dimension().repeated().collect::<Vec<_>>())
                .try_map(|(ty, dimensions), span| {
                    if dimensions.is_empty() {
                        return Ok(ty);
                    }
                    let base = array_base(ty.clone())
                        .ok_or_else(|| Rich::custom(span, format!("`{ty}` is not an array base")))?;
                    Ok(Type::from(ArrayType { base, dimensions }))
                })
        })
    }
}

impl<'src> Parse<'src> for VarDecl {
    fn parser() -> impl Parser<'src, &'src str, Self, Extra<'src>> + Clone {
        Type::parser()
            .then_ignore(just(';').padded())
            .map(VarDecl::new)
    }
}

impl<'src> Parse<'src> for TestFunction {
    fn parser() -> impl Parser<'src, &'src str, Self, Extra<'src>> + Clone {
        word("function")
            .ignore_then(
                VarDecl::parser()
                    .repeated()
                    .collect::<Vec<_>>()
                    .delimited_by(just('{').padded(), just('}').padded()),
            )
            .map(|local_vars| TestFunction { local_vars })
    }
}

impl<'src> Parse<'src> for Contract {
    fn parser() -> impl Parser<'src, &'src str, Self, Extra<'src>> + Clone {
        VarDecl::parser()
            .repeated()
            .collect::<Vec<_>>()
            .then(TestFunction::parser().or_not())
            .map(|(state_vars, test_function)| Contract {
                state_vars,
                test_function: test_function.unwrap_or_default(),
            })
    }
}
