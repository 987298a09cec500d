//! Semantic model boundary
//!
//! Rules never resolve symbols themselves. They ask a [`SemanticModel`]
//! for facts about nodes of one tree snapshot: the type of an expression,
//! the symbol a name binds to, the method an invocation calls, or the
//! constant value of an expression. Models are produced asynchronously by
//! a [`SemanticModelProvider`] and memoized per snapshot in a
//! [`SemanticCache`].

pub mod cache;
pub mod fixture;

use crate::result::Result;
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub use cache::SemanticCache;
pub use fixture::{FixtureModel, FixtureProvider};

/// Read-only oracle over one tree snapshot
pub trait SemanticModel: Send + Sync {
    /// Type of an expression
    fn type_of(&self, expression: &SyntaxNode) -> Option<TypeInfo>;

    /// Symbol an expression refers to
    fn symbol_of(&self, expression: &SyntaxNode) -> Option<Symbol>;

    /// Symbol introduced by a declaration node
    fn declared_symbol(&self, declaration: &SyntaxNode) -> Option<Symbol>;

    /// Method called by an invocation expression
    fn method_of(&self, invocation: &SyntaxNode) -> Option<MethodInfo>;

    /// Compile-time value of an expression or enum member
    fn constant_value(&self, node: &SyntaxNode) -> Option<ConstantValue>;
}

/// Produces semantic models on demand
#[async_trait]
pub trait SemanticModelProvider: Send + Sync {
    async fn semantic_model(
        &self,
        tree: &SyntaxTree,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn SemanticModel>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Array,
    Class,
    Struct,
    Interface,
    Enum,
    Error,
}

/// What rules need to know about a type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub name: String,
    pub kind: TypeKind,
    /// Constructed from `IEnumerable<T>` itself
    pub is_constructed_from_ienumerable: bool,
    /// Implements `IEnumerable<T>`
    pub implements_ienumerable: bool,
    /// Implements `ICollection<T>`
    pub implements_icollection: bool,
    pub is_immutable_array: bool,
    /// Has a public positional indexer
    pub has_public_indexer: bool,
    /// Has a public `Count` property
    pub has_public_count: bool,
    pub enum_underlying: Option<IntegralType>,
    pub has_flags_attribute: bool,
}

impl TypeInfo {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            is_constructed_from_ienumerable: false,
            implements_ienumerable: false,
            implements_icollection: false,
            is_immutable_array: false,
            has_public_indexer: false,
            has_public_count: false,
            enum_underlying: None,
            has_flags_attribute: false,
        }
    }

    pub fn error(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Error)
    }

    /// `T[]`: indexable, an `ICollection<T>`, counted by `Length`
    pub fn array(name: impl Into<String>) -> Self {
        Self {
            implements_ienumerable: true,
            implements_icollection: true,
            has_public_indexer: true,
            ..Self::new(name, TypeKind::Array)
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == TypeKind::Error
    }

    pub fn is_array(&self) -> bool {
        self.kind == TypeKind::Array
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Stable identity of a declared symbol within one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Local,
    Parameter,
    Field,
    Property,
    Method,
    EnumMember,
    Type,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Option<TypeInfo>,
    pub constant: Option<ConstantValue>,
}

impl Symbol {
    pub fn is_local(&self) -> bool {
        self.kind == SymbolKind::Local
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub name: String,
    /// Declared in `System.Linq.Enumerable`
    pub is_enumerable_extension: bool,
    /// Declared in `System.Linq.ImmutableArrayExtensions`
    pub is_immutable_array_extension: bool,
    /// Parameter count, the `this` parameter of extensions included
    pub parameter_count: usize,
    pub return_type: Option<TypeInfo>,
}

/// Integral enum underlying types, 8 to 64 bits wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntegralType {
    pub bits: u8,
    pub signed: bool,
}

impl IntegralType {
    pub const SBYTE: Self = Self::new(8, true);
    pub const BYTE: Self = Self::new(8, false);
    pub const SHORT: Self = Self::new(16, true);
    pub const USHORT: Self = Self::new(16, false);
    pub const INT: Self = Self::new(32, true);
    pub const UINT: Self = Self::new(32, false);
    pub const LONG: Self = Self::new(64, true);
    pub const ULONG: Self = Self::new(64, false);

    const fn new(bits: u8, signed: bool) -> Self {
        Self { bits, signed }
    }

    pub fn from_keyword(kind: SyntaxKind) -> Option<Self> {
        let ty = match kind {
            SyntaxKind::SbyteKw => Self::SBYTE,
            SyntaxKind::ByteKw => Self::BYTE,
            SyntaxKind::ShortKw => Self::SHORT,
            SyntaxKind::UshortKw => Self::USHORT,
            SyntaxKind::IntKw => Self::INT,
            SyntaxKind::UintKw => Self::UINT,
            SyntaxKind::LongKw => Self::LONG,
            SyntaxKind::UlongKw => Self::ULONG,
            _ => return None,
        };
        Some(ty)
    }

    /// `System.Int32` style names
    pub fn from_name(name: &str) -> Option<Self> {
        let ty = match name.strip_prefix("System.").unwrap_or(name) {
            "SByte" => Self::SBYTE,
            "Byte" => Self::BYTE,
            "Int16" => Self::SHORT,
            "UInt16" => Self::USHORT,
            "Int32" => Self::INT,
            "UInt32" => Self::UINT,
            "Int64" => Self::LONG,
            "UInt64" => Self::ULONG,
            _ => return None,
        };
        Some(ty)
    }

    pub fn min_value(self) -> i128 {
        if self.signed {
            -(1i128 << (self.bits - 1))
        } else {
            0
        }
    }

    pub fn max_value(self) -> i128 {
        if self.signed {
            (1i128 << (self.bits - 1)) - 1
        } else {
            (1i128 << self.bits) - 1
        }
    }

    pub fn contains(self, value: i128) -> bool {
        value >= self.min_value() && value <= self.max_value()
    }

    /// Largest power of two representable by the type
    pub fn max_flag_power(self) -> i128 {
        if self.signed {
            1i128 << (self.bits - 2)
        } else {
            1i128 << (self.bits - 1)
        }
    }
}

/// A folded compile-time constant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstantValue {
    SByte(i8),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Bool(bool),
    String(String),
    Null,
}

impl ConstantValue {
    /// Wrap `value` as the given integral type, if it fits
    pub fn integral(value: i128, ty: IntegralType) -> Option<Self> {
        if !ty.contains(value) {
            return None;
        }
        let constant = match (ty.bits, ty.signed) {
            (8, true) => Self::SByte(value as i8),
            (8, false) => Self::Byte(value as u8),
            (16, true) => Self::Int16(value as i16),
            (16, false) => Self::UInt16(value as u16),
            (32, true) => Self::Int32(value as i32),
            (32, false) => Self::UInt32(value as u32),
            (64, true) => Self::Int64(value as i64),
            (64, false) => Self::UInt64(value as u64),
            _ => return None,
        };
        Some(constant)
    }

    /// Integral value widened without loss
    pub fn as_i128(&self) -> Option<i128> {
        let value = match *self {
            Self::SByte(v) => v.into(),
            Self::Byte(v) => v.into(),
            Self::Int16(v) => v.into(),
            Self::UInt16(v) => v.into(),
            Self::Int32(v) => v.into(),
            Self::UInt32(v) => v.into(),
            Self::Int64(v) => v.into(),
            Self::UInt64(v) => v.into(),
            Self::Bool(_) | Self::String(_) | Self::Null => return None,
        };
        Some(value)
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::String(value) => write!(f, "{value:?}"),
            Self::Null => f.write_str("null"),
            other => match other.as_i128() {
                Some(value) => write!(f, "{value}"),
                None => Ok(()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_ranges() {
        assert_eq!(IntegralType::SBYTE.min_value(), -128);
        assert_eq!(IntegralType::BYTE.max_value(), 255);
        assert_eq!(IntegralType::ULONG.max_value(), u64::MAX as i128);
        assert!(IntegralType::INT.contains(-1));
        assert!(!IntegralType::UINT.contains(-1));
    }

    #[test]
    fn test_max_flag_power() {
        assert_eq!(IntegralType::SBYTE.max_flag_power(), 64);
        assert_eq!(IntegralType::BYTE.max_flag_power(), 128);
        assert_eq!(IntegralType::INT.max_flag_power(), 1 << 30);
        assert_eq!(IntegralType::ULONG.max_flag_power(), 1i128 << 63);
    }

    #[test]
    fn test_constant_round_trip() {
        let value = ConstantValue::integral(-5, IntegralType::SHORT).unwrap();
        assert_eq!(value, ConstantValue::Int16(-5));
        assert_eq!(value.as_i128(), Some(-5));
        assert_eq!(ConstantValue::integral(300, IntegralType::BYTE), None);
        assert_eq!(ConstantValue::Bool(true).as_i128(), None);
        assert_eq!(ConstantValue::UInt64(u64::MAX).to_string(), u64::MAX.to_string());
    }

    #[test]
    fn test_integral_names() {
        assert_eq!(IntegralType::from_name("System.Int64"), Some(IntegralType::LONG));
        assert_eq!(IntegralType::from_name("UInt16"), Some(IntegralType::USHORT));
        assert_eq!(
            IntegralType::from_keyword(SyntaxKind::SbyteKw),
            Some(IntegralType::SBYTE)
        );
        assert_eq!(IntegralType::from_keyword(SyntaxKind::BoolKw), None);
    }
}
