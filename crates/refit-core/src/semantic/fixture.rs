//! A small, syntax-driven semantic model
//!
//! [`FixtureModel`] answers semantic queries from the tree alone: names bind
//! to the nearest visible local, parameter or member declaration, declared
//! type text is mapped through a catalog of well-known collection types, and
//! enum members are folded to constants. It is what the command-line host
//! and the test suites use in place of a real compiler.

use super::{
    ConstantValue, IntegralType, MethodInfo, SemanticModel, SemanticModelProvider, Symbol,
    SymbolId, SymbolKind, TypeInfo, TypeKind,
};
use crate::error::RefitError;
use crate::result::Result;
use crate::syntax::ast::{
    AstNode, EnumDeclaration, InvocationExpression, LocalDeclarationStatement,
    MemberAccessExpression, VariableDeclarator,
};
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// LINQ methods recognised on sequence types
const ENUMERABLE_METHODS: &[&str] = &[
    "Any",
    "All",
    "Count",
    "First",
    "FirstOrDefault",
    "Last",
    "LastOrDefault",
    "ElementAt",
    "ElementAtOrDefault",
    "Where",
    "Select",
    "ToList",
    "ToArray",
];

/// Methods `ImmutableArray<T>` binds to `ImmutableArrayExtensions` instead
const IMMUTABLE_ARRAY_METHODS: &[&str] = &[
    "Any",
    "All",
    "First",
    "FirstOrDefault",
    "Last",
    "LastOrDefault",
    "ElementAt",
    "ElementAtOrDefault",
    "Where",
    "Select",
    "ToArray",
];

#[derive(Debug, Clone)]
struct EnumFacts {
    info: TypeInfo,
    members: Vec<EnumMemberFacts>,
}

#[derive(Debug, Clone)]
struct EnumMemberFacts {
    name: String,
    id: SymbolId,
    value: Option<ConstantValue>,
}

/// Semantic model computed from one tree snapshot
#[derive(Debug, Clone)]
pub struct FixtureModel {
    tree: SyntaxTree,
    types: HashMap<String, TypeInfo>,
    enums: HashMap<String, EnumFacts>,
    declared_types: HashMap<String, TypeKind>,
}

impl FixtureModel {
    pub fn new(tree: &SyntaxTree) -> Self {
        let mut enums = HashMap::new();
        let mut declared_types = HashMap::new();
        for node in tree.root().descendants() {
            let kind = match node.kind() {
                SyntaxKind::ClassDeclaration => TypeKind::Class,
                SyntaxKind::StructDeclaration => TypeKind::Struct,
                SyntaxKind::InterfaceDeclaration => TypeKind::Interface,
                SyntaxKind::EnumDeclaration => {
                    if let Some(facts) = EnumDeclaration::cast(node).and_then(|d| fold_enum(&d)) {
                        enums.insert(facts.info.name.clone(), facts);
                    }
                    continue;
                }
                _ => continue,
            };
            if let Some(name) = identifier_text(&node) {
                declared_types.insert(name, kind);
            }
        }
        tracing::trace!(
            enums = enums.len(),
            types = declared_types.len(),
            "Built fixture model"
        );
        Self {
            tree: tree.clone(),
            types: HashMap::new(),
            enums,
            declared_types,
        }
    }

    /// Register or override a type by its simple name
    pub fn with_type(mut self, name: impl Into<String>, info: TypeInfo) -> Self {
        self.types.insert(name.into(), info);
        self
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    /// Map a type syntax node to its facts
    pub fn type_from_syntax(&self, ty: &SyntaxNode) -> TypeInfo {
        let display = ty.trimmed_text();
        match ty.kind() {
            SyntaxKind::ArrayType => TypeInfo::array(display),
            SyntaxKind::NullableType => TypeInfo::new(display, TypeKind::Struct),
            SyntaxKind::PredefinedType => {
                let keyword = ty.first_token().map(|t| t.kind());
                predefined_type(keyword, display)
            }
            SyntaxKind::QualifiedName => match ty.child_nodes().last() {
                Some(right) => TypeInfo {
                    name: display,
                    ..self.type_from_syntax(&right)
                },
                None => TypeInfo::error(display),
            },
            SyntaxKind::IdentifierName | SyntaxKind::GenericName => {
                let Some(name) = identifier_text(ty) else {
                    return TypeInfo::error(display);
                };
                let arity = ty
                    .child_of_kind(SyntaxKind::TypeArgumentList)
                    .map(|list| list.child_nodes().count())
                    .unwrap_or(0);
                self.named_type(&name, arity, display)
            }
            _ => TypeInfo::error(display),
        }
    }

    fn named_type(&self, name: &str, arity: usize, display: String) -> TypeInfo {
        if let Some(info) = self.types.get(name) {
            return TypeInfo {
                name: display,
                ..info.clone()
            };
        }
        if let Some(facts) = self.enums.get(name) {
            return facts.info.clone();
        }
        if let Some(kind) = self.declared_types.get(name) {
            return TypeInfo::new(display, *kind);
        }
        catalog_type(name, arity, display.clone()).unwrap_or_else(|| TypeInfo::error(display))
    }

    fn declared_type_of(&self, declaration: &SyntaxNode) -> Option<TypeInfo> {
        let ty = declaration
            .child_nodes()
            .find(|n| n.kind() != SyntaxKind::AttributeList)?;
        Some(self.type_from_syntax(&ty))
    }

    // ------------------------------------------------------------------
    // Symbols
    // ------------------------------------------------------------------

    fn resolve(&self, reference: &SyntaxNode, name: &str) -> Option<Symbol> {
        let position = reference.span().start();
        for scope in reference.ancestors() {
            let found = match scope.kind() {
                SyntaxKind::Block | SyntaxKind::SwitchSection => scope
                    .child_nodes()
                    .take_while(|statement| statement.span().start() <= position)
                    .filter_map(LocalDeclarationStatement::cast)
                    .filter_map(|local| local.declaration())
                    .flat_map(|declaration| declaration.declarators())
                    .find(|declarator| declarator.name().as_deref() == Some(name))
                    .map(|declarator| self.declarator_symbol(&declarator, SymbolKind::Local)),
                SyntaxKind::MethodDeclaration | SyntaxKind::ConstructorDeclaration => scope
                    .child_of_kind(SyntaxKind::ParameterList)
                    .and_then(|list| {
                        list.child_nodes()
                            .find(|p| identifier_text(p).as_deref() == Some(name))
                    })
                    .and_then(|parameter| self.declared_symbol(&parameter)),
                kind if kind.is_type_declaration() => self.member_symbol(&scope, name),
                _ => None,
            };
            if found.is_some() {
                return found;
            }
        }

        if let Some(facts) = self.enums.get(name) {
            return Some(Symbol {
                id: SymbolId(0),
                name: name.to_string(),
                kind: SymbolKind::Type,
                ty: Some(facts.info.clone()),
                constant: None,
            });
        }
        None
    }

    fn member_symbol(&self, type_declaration: &SyntaxNode, name: &str) -> Option<Symbol> {
        for member in type_declaration.child_nodes() {
            match member.kind() {
                SyntaxKind::FieldDeclaration => {
                    let declarator = member
                        .child_of_kind(SyntaxKind::VariableDeclaration)
                        .into_iter()
                        .flat_map(|declaration| declaration.child_nodes())
                        .filter_map(VariableDeclarator::cast)
                        .find(|d| d.name().as_deref() == Some(name));
                    if let Some(declarator) = declarator {
                        return Some(self.declarator_symbol(&declarator, SymbolKind::Field));
                    }
                }
                SyntaxKind::PropertyDeclaration | SyntaxKind::MethodDeclaration
                    if identifier_text(&member).as_deref() == Some(name) =>
                {
                    return self.declared_symbol(&member);
                }
                _ => {}
            }
        }
        None
    }

    fn declarator_symbol(&self, declarator: &VariableDeclarator, kind: SymbolKind) -> Symbol {
        let ty = declarator
            .syntax()
            .parent()
            .and_then(|declaration| declaration.child_nodes().next())
            .and_then(|ty| {
                if ty.trimmed_text() == "var" {
                    let value = declarator.initializer()?.value()?;
                    self.type_of(&value)
                } else {
                    Some(self.type_from_syntax(&ty))
                }
            });
        Symbol {
            id: symbol_id(declarator.syntax()),
            name: declarator.name().unwrap_or_default(),
            kind,
            ty,
            constant: None,
        }
    }

    fn enum_member(&self, enum_name: &str, member: &str) -> Option<Symbol> {
        let facts = self.enums.get(enum_name)?;
        let found = facts.members.iter().find(|m| m.name == member)?;
        Some(Symbol {
            id: found.id,
            name: found.name.clone(),
            kind: SymbolKind::EnumMember,
            ty: Some(facts.info.clone()),
            constant: found.value.clone(),
        })
    }

    fn declared_method(&self, type_name: &str, method: &str) -> Option<MethodInfo> {
        let declaration = self
            .tree
            .root()
            .descendants()
            .filter(|n| n.kind().is_type_declaration())
            .filter(|n| identifier_text(n).as_deref() == Some(type_name))
            .flat_map(|n| n.child_nodes().collect::<Vec<_>>())
            .find(|n| {
                n.kind() == SyntaxKind::MethodDeclaration
                    && identifier_text(n).as_deref() == Some(method)
            })?;
        Some(self.method_info(&declaration))
    }

    fn method_info(&self, declaration: &SyntaxNode) -> MethodInfo {
        let parameter_count = declaration
            .child_of_kind(SyntaxKind::ParameterList)
            .map(|list| list.child_nodes().count())
            .unwrap_or(0);
        MethodInfo {
            name: identifier_text(declaration).unwrap_or_default(),
            is_enumerable_extension: false,
            is_immutable_array_extension: false,
            parameter_count,
            return_type: self.declared_type_of(declaration),
        }
    }
}

impl SemanticModel for FixtureModel {
    fn type_of(&self, expression: &SyntaxNode) -> Option<TypeInfo> {
        use SyntaxKind::*;
        match expression.kind() {
            IdentifierName | GenericName => self.symbol_of(expression)?.ty,
            SimpleMemberAccessExpression => {
                if let Some(symbol) = self.symbol_of(expression) {
                    return symbol.ty;
                }
                let access = MemberAccessExpression::cast(expression.clone())?;
                let receiver = self.type_of(&access.expression()?)?;
                match access.name_text()?.as_str() {
                    "Length" if receiver.is_array() || receiver.is_immutable_array => {
                        Some(TypeInfo::new("int", TypeKind::Struct))
                    }
                    "Count" if receiver.has_public_count => {
                        Some(TypeInfo::new("int", TypeKind::Struct))
                    }
                    _ => None,
                }
            }
            NumericLiteralExpression => {
                let text = expression.trimmed_text().to_ascii_lowercase();
                let name = if text.ends_with("ul") || text.ends_with("lu") {
                    "ulong"
                } else if text.ends_with('l') {
                    "long"
                } else if text.ends_with('u') {
                    "uint"
                } else {
                    "int"
                };
                Some(TypeInfo::new(name, TypeKind::Struct))
            }
            StringLiteralExpression => Some(predefined_type(Some(StringKw), "string".into())),
            CharacterLiteralExpression => Some(TypeInfo::new("char", TypeKind::Struct)),
            TrueLiteralExpression
            | FalseLiteralExpression
            | LogicalNotExpression
            | LogicalAndExpression
            | LogicalOrExpression
            | EqualsExpression
            | NotEqualsExpression
            | LessThanExpression
            | LessThanOrEqualExpression
            | GreaterThanExpression
            | GreaterThanOrEqualExpression
            | IsExpression => Some(TypeInfo::new("bool", TypeKind::Struct)),
            ParenthesizedExpression => self.type_of(&expression.child_nodes().next()?),
            CastExpression | ObjectCreationExpression | ArrayCreationExpression => {
                Some(self.type_from_syntax(&expression.child_nodes().next()?))
            }
            AsExpression => Some(self.type_from_syntax(&expression.child_nodes().last()?)),
            SyntaxKind::InvocationExpression => self.method_of(expression)?.return_type,
            _ => None,
        }
    }

    fn symbol_of(&self, expression: &SyntaxNode) -> Option<Symbol> {
        match expression.kind() {
            SyntaxKind::IdentifierName | SyntaxKind::GenericName => {
                let name = identifier_text(expression)?;
                self.resolve(expression, &name)
            }
            SyntaxKind::SimpleMemberAccessExpression => {
                let access = MemberAccessExpression::cast(expression.clone())?;
                let target = self.symbol_of(&access.expression()?)?;
                if target.kind != SymbolKind::Type {
                    return None;
                }
                self.enum_member(&target.name, &access.name_text()?)
            }
            SyntaxKind::ParenthesizedExpression => {
                self.symbol_of(&expression.child_nodes().next()?)
            }
            _ => None,
        }
    }

    fn declared_symbol(&self, declaration: &SyntaxNode) -> Option<Symbol> {
        let kind = match declaration.kind() {
            SyntaxKind::VariableDeclarator => {
                let owner = declaration.parent()?.parent()?;
                let kind = if owner.kind() == SyntaxKind::FieldDeclaration {
                    SymbolKind::Field
                } else {
                    SymbolKind::Local
                };
                let declarator = VariableDeclarator::cast(declaration.clone())?;
                return Some(self.declarator_symbol(&declarator, kind));
            }
            SyntaxKind::EnumMemberDeclaration => {
                let enum_name = identifier_text(&declaration.parent()?)?;
                return self.enum_member(&enum_name, &identifier_text(declaration)?);
            }
            SyntaxKind::Parameter => SymbolKind::Parameter,
            SyntaxKind::PropertyDeclaration => SymbolKind::Property,
            SyntaxKind::MethodDeclaration => SymbolKind::Method,
            kind if kind.is_type_declaration() || kind == SyntaxKind::EnumDeclaration => {
                SymbolKind::Type
            }
            _ => return None,
        };
        let ty = match kind {
            SymbolKind::Type => {
                let name = identifier_text(declaration)?;
                Some(self.named_type(&name, 0, name.clone()))
            }
            _ => self.declared_type_of(declaration),
        };
        Some(Symbol {
            id: symbol_id(declaration),
            name: identifier_text(declaration)?,
            kind,
            ty,
            constant: None,
        })
    }

    fn method_of(&self, invocation: &SyntaxNode) -> Option<MethodInfo> {
        let invocation = InvocationExpression::cast(invocation.clone())?;
        let callee = invocation.expression()?;
        let argument_count = invocation.arguments().len();
        match callee.kind() {
            SyntaxKind::SimpleMemberAccessExpression => {
                let access = MemberAccessExpression::cast(callee)?;
                let name = access.name_text()?;
                let receiver = self.type_of(&access.expression()?)?;
                if receiver.implements_ienumerable && ENUMERABLE_METHODS.contains(&name.as_str())
                {
                    let immutable = receiver.is_immutable_array
                        && IMMUTABLE_ARRAY_METHODS.contains(&name.as_str());
                    let return_type = match name.as_str() {
                        "Any" | "All" => Some(TypeInfo::new("bool", TypeKind::Struct)),
                        "Count" => Some(TypeInfo::new("int", TypeKind::Struct)),
                        _ => None,
                    };
                    return Some(MethodInfo {
                        name,
                        is_enumerable_extension: !immutable,
                        is_immutable_array_extension: immutable,
                        parameter_count: argument_count + 1,
                        return_type,
                    });
                }
                self.declared_method(&receiver.name, &name)
            }
            SyntaxKind::IdentifierName => {
                let name = identifier_text(&callee)?;
                let owner = callee.ancestors().find(|n| n.kind().is_type_declaration())?;
                let owner_name = identifier_text(&owner)?;
                self.declared_method(&owner_name, &name)
            }
            _ => None,
        }
    }

    fn constant_value(&self, node: &SyntaxNode) -> Option<ConstantValue> {
        match node.kind() {
            SyntaxKind::EnumMemberDeclaration => self.declared_symbol(node)?.constant,
            SyntaxKind::TrueLiteralExpression => Some(ConstantValue::Bool(true)),
            SyntaxKind::FalseLiteralExpression => Some(ConstantValue::Bool(false)),
            SyntaxKind::NullLiteralExpression => Some(ConstantValue::Null),
            SyntaxKind::StringLiteralExpression => {
                let text = node.trimmed_text();
                let inner = text.strip_prefix('"')?.strip_suffix('"')?;
                Some(ConstantValue::String(inner.to_string()))
            }
            _ => {
                if let Some(symbol) = self.symbol_of(node) {
                    return symbol.constant;
                }
                let value = evaluate(node, &|_| None)?;
                [IntegralType::INT, IntegralType::LONG, IntegralType::ULONG]
                    .into_iter()
                    .find_map(|ty| ConstantValue::integral(value, ty))
            }
        }
    }
}

/// Serves [`FixtureModel`]s, optionally with extra catalog types
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    types: HashMap<String, TypeInfo>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, name: impl Into<String>, info: TypeInfo) -> Self {
        self.types.insert(name.into(), info);
        self
    }
}

#[async_trait]
impl SemanticModelProvider for FixtureProvider {
    async fn semantic_model(
        &self,
        tree: &SyntaxTree,
        cancel: &CancellationToken,
    ) -> Result<Arc<dyn SemanticModel>> {
        if cancel.is_cancelled() {
            return Err(RefitError::Cancelled);
        }
        let model = self
            .types
            .iter()
            .fold(FixtureModel::new(tree), |model, (name, info)| {
                model.with_type(name.clone(), info.clone())
            });
        Ok(Arc::new(model))
    }
}

fn identifier_text(node: &SyntaxNode) -> Option<String> {
    node.child_tokens()
        .find(|t| t.kind() == SyntaxKind::Identifier)
        .map(|t| t.token_text().to_string())
}

fn symbol_id(declaration: &SyntaxNode) -> SymbolId {
    let anchor = declaration
        .child_tokens()
        .find(|t| t.kind() == SyntaxKind::Identifier)
        .unwrap_or_else(|| declaration.clone());
    SymbolId(u32::from(anchor.span().start()))
}

fn predefined_type(keyword: Option<SyntaxKind>, display: String) -> TypeInfo {
    match keyword {
        Some(SyntaxKind::StringKw) => TypeInfo {
            implements_ienumerable: true,
            has_public_indexer: true,
            ..TypeInfo::new(display, TypeKind::Class)
        },
        Some(SyntaxKind::ObjectKw) => TypeInfo::new(display, TypeKind::Class),
        _ => TypeInfo::new(display, TypeKind::Struct),
    }
}

/// Well-known generic collection types
fn catalog_type(name: &str, arity: usize, display: String) -> Option<TypeInfo> {
    let sequence = |kind| TypeInfo {
        implements_ienumerable: true,
        ..TypeInfo::new(display.clone(), kind)
    };
    let info = match (name, arity) {
        ("List" | "Collection", 1) => TypeInfo {
            implements_icollection: true,
            has_public_indexer: true,
            has_public_count: true,
            ..sequence(TypeKind::Class)
        },
        ("IList", 1) => TypeInfo {
            implements_icollection: true,
            has_public_indexer: true,
            has_public_count: true,
            ..sequence(TypeKind::Interface)
        },
        ("ICollection", 1) => TypeInfo {
            implements_icollection: true,
            has_public_count: true,
            ..sequence(TypeKind::Interface)
        },
        ("IReadOnlyList", 1) => TypeInfo {
            has_public_indexer: true,
            has_public_count: true,
            ..sequence(TypeKind::Interface)
        },
        ("HashSet", 1) => TypeInfo {
            implements_icollection: true,
            has_public_count: true,
            ..sequence(TypeKind::Class)
        },
        // the indexer is keyed, not positional
        ("Dictionary", 2) => TypeInfo {
            implements_icollection: true,
            has_public_count: true,
            ..sequence(TypeKind::Class)
        },
        ("IEnumerable", 1) => TypeInfo {
            is_constructed_from_ienumerable: true,
            ..sequence(TypeKind::Interface)
        },
        ("ImmutableArray", 1) => TypeInfo {
            implements_icollection: true,
            is_immutable_array: true,
            has_public_indexer: true,
            ..sequence(TypeKind::Struct)
        },
        ("String", 0) => predefined_type(Some(SyntaxKind::StringKw), display.clone()),
        _ => {
            return IntegralType::from_name(name)
                .map(|_| TypeInfo::new(display.clone(), TypeKind::Struct));
        }
    };
    Some(info)
}

fn fold_enum(declaration: &EnumDeclaration) -> Option<EnumFacts> {
    let name = declaration.name()?;
    let underlying = match declaration.base_type() {
        Some(ty) => underlying_type(&ty)?,
        None => IntegralType::INT,
    };
    let has_flags_attribute = declaration.attribute_lists().any(|list| {
        list.child_nodes().any(|attribute| {
            let text = attribute
                .child_nodes()
                .next()
                .map(|n| n.trimmed_text())
                .unwrap_or_default();
            matches!(
                text.strip_prefix("System.").unwrap_or(&text),
                "Flags" | "FlagsAttribute"
            )
        })
    });

    let mut known: HashMap<String, i128> = HashMap::new();
    let mut previous = Some(-1i128);
    let mut members = Vec::new();
    for member in declaration.members() {
        let member_name = member.name().unwrap_or_default();
        let value = match member.equals_value().and_then(|clause| clause.value()) {
            Some(expression) => evaluate(&expression, &|n| known.get(n).copied()),
            None => previous.and_then(|p| p.checked_add(1)),
        }
        .filter(|v| underlying.contains(*v));
        if let Some(value) = value {
            known.insert(member_name.clone(), value);
        }
        members.push(EnumMemberFacts {
            name: member_name,
            id: symbol_id(member.syntax()),
            value: value.and_then(|v| ConstantValue::integral(v, underlying)),
        });
        previous = value;
    }

    Some(EnumFacts {
        info: TypeInfo {
            enum_underlying: Some(underlying),
            has_flags_attribute,
            ..TypeInfo::new(name, TypeKind::Enum)
        },
        members,
    })
}

fn underlying_type(ty: &SyntaxNode) -> Option<IntegralType> {
    match ty.kind() {
        SyntaxKind::PredefinedType => IntegralType::from_keyword(ty.first_token()?.kind()),
        _ => IntegralType::from_name(&ty.trimmed_text()),
    }
}

/// Fold an integral constant expression
///
/// `lookup` resolves bare names, e.g. earlier members of the same enum.
pub(crate) fn evaluate(node: &SyntaxNode, lookup: &dyn Fn(&str) -> Option<i128>) -> Option<i128> {
    use SyntaxKind::*;
    let operand = |index: usize| {
        node.child_nodes()
            .nth(index)
            .and_then(|child| evaluate(&child, lookup))
    };
    match node.kind() {
        NumericLiteralExpression => parse_integer_literal(&node.trimmed_text()),
        ParenthesizedExpression | CheckedExpression => operand(0),
        CastExpression => operand(1),
        IdentifierName => lookup(&identifier_text(node)?),
        SimpleMemberAccessExpression => {
            let access = MemberAccessExpression::cast(node.clone())?;
            lookup(&access.name_text()?)
        }
        UnaryMinusExpression => operand(0)?.checked_neg(),
        UnaryPlusExpression => operand(0),
        BitwiseNotExpression => Some(!operand(0)?),
        _ => {
            let left = operand(0)?;
            let right = operand(1)?;
            match node.kind() {
                BitwiseOrExpression => Some(left | right),
                BitwiseAndExpression => Some(left & right),
                ExclusiveOrExpression => Some(left ^ right),
                AddExpression => left.checked_add(right),
                SubtractExpression => left.checked_sub(right),
                MultiplyExpression => left.checked_mul(right),
                DivideExpression => left.checked_div(right),
                ModuloExpression => left.checked_rem(right),
                LeftShiftExpression => left.checked_shl(u32::try_from(right).ok()?),
                RightShiftExpression => left.checked_shr(u32::try_from(right).ok()?),
                _ => None,
            }
        }
    }
}

fn parse_integer_literal(text: &str) -> Option<i128> {
    let digits = text.trim_end_matches(['u', 'U', 'l', 'L']).replace('_', "");
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        return i128::from_str_radix(hex, 16).ok();
    }
    digits.parse().ok()
}
