//! Syntax kinds for tokens and nodes
//!
//! One closed enumeration covers punctuation, keywords, literal tokens and
//! every node kind the fixture grammar produces. Classification helpers are
//! exhaustive `match`es so adding a kind forces every table to be revisited.

/// Kind tag of a token or node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SyntaxKind {
    // Special tokens
    EndOfFile,
    Identifier,
    NumericLiteral,
    StringLiteral,
    CharacterLiteral,

    // Punctuation
    OpenBrace,
    CloseBrace,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    Semicolon,
    Comma,
    Dot,
    Colon,
    Question,
    QuestionQuestion,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Ampersand,
    Bar,
    Caret,
    Exclamation,
    Tilde,
    Equals,
    EqualsEquals,
    ExclamationEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    LessLess,
    GreaterGreater,
    AmpersandAmpersand,
    BarBar,
    PlusPlus,
    MinusMinus,
    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    PercentEquals,
    AmpersandEquals,
    BarEquals,
    CaretEquals,
    LessLessEquals,
    GreaterGreaterEquals,
    QuestionQuestionEquals,

    // Keywords
    UsingKw,
    NamespaceKw,
    ClassKw,
    StructKw,
    InterfaceKw,
    EnumKw,
    PublicKw,
    PrivateKw,
    ProtectedKw,
    InternalKw,
    StaticKw,
    ReadonlyKw,
    ConstKw,
    AbstractKw,
    VirtualKw,
    OverrideKw,
    SealedKw,
    PartialKw,
    AsyncKw,
    NewKw,
    ReturnKw,
    IfKw,
    ElseKw,
    WhileKw,
    SwitchKw,
    CaseKw,
    DefaultKw,
    BreakKw,
    ContinueKw,
    ThrowKw,
    TrueKw,
    FalseKw,
    NullKw,
    ThisKw,
    TypeofKw,
    CheckedKw,
    UncheckedKw,
    IsKw,
    AsKw,
    VoidKw,
    BoolKw,
    ByteKw,
    SbyteKw,
    ShortKw,
    UshortKw,
    IntKw,
    UintKw,
    LongKw,
    UlongKw,
    CharKw,
    StringKw,
    ObjectKw,
    FloatKw,
    DoubleKw,
    DecimalKw,

    // Declarations
    CompilationUnit,
    UsingDirective,
    NamespaceDeclaration,
    ClassDeclaration,
    StructDeclaration,
    InterfaceDeclaration,
    EnumDeclaration,
    EnumMemberDeclaration,
    FieldDeclaration,
    PropertyDeclaration,
    AccessorList,
    AccessorDeclaration,
    MethodDeclaration,
    ConstructorDeclaration,
    ParameterList,
    Parameter,
    AttributeList,
    Attribute,
    BaseList,

    // Types and names
    PredefinedType,
    IdentifierName,
    GenericName,
    TypeArgumentList,
    QualifiedName,
    ArrayType,
    ArrayRankSpecifier,
    NullableType,

    // Variables
    VariableDeclaration,
    VariableDeclarator,
    EqualsValueClause,

    // Statements
    Block,
    LocalDeclarationStatement,
    ExpressionStatement,
    ReturnStatement,
    IfStatement,
    ElseClause,
    WhileStatement,
    SwitchStatement,
    SwitchSection,
    CaseSwitchLabel,
    DefaultSwitchLabel,
    BreakStatement,
    ContinueStatement,
    ThrowStatement,
    EmptyStatement,

    // Primary expressions
    NumericLiteralExpression,
    StringLiteralExpression,
    CharacterLiteralExpression,
    TrueLiteralExpression,
    FalseLiteralExpression,
    NullLiteralExpression,
    DefaultLiteralExpression,
    ThisExpression,
    ParenthesizedExpression,
    SimpleMemberAccessExpression,
    InvocationExpression,
    ArgumentList,
    Argument,
    ElementAccessExpression,
    BracketedArgumentList,
    ObjectCreationExpression,
    ArrayCreationExpression,
    TypeOfExpression,
    DefaultExpression,
    CheckedExpression,
    CastExpression,
    PostIncrementExpression,
    PostDecrementExpression,

    // Prefix unary
    UnaryPlusExpression,
    UnaryMinusExpression,
    LogicalNotExpression,
    BitwiseNotExpression,
    PreIncrementExpression,
    PreDecrementExpression,

    // Binary
    MultiplyExpression,
    DivideExpression,
    ModuloExpression,
    AddExpression,
    SubtractExpression,
    LeftShiftExpression,
    RightShiftExpression,
    LessThanExpression,
    LessThanOrEqualExpression,
    GreaterThanExpression,
    GreaterThanOrEqualExpression,
    IsExpression,
    AsExpression,
    EqualsExpression,
    NotEqualsExpression,
    BitwiseAndExpression,
    ExclusiveOrExpression,
    BitwiseOrExpression,
    LogicalAndExpression,
    LogicalOrExpression,
    CoalesceExpression,
    ConditionalExpression,

    // Assignment
    SimpleAssignmentExpression,
    AddAssignmentExpression,
    SubtractAssignmentExpression,
    MultiplyAssignmentExpression,
    DivideAssignmentExpression,
    ModuloAssignmentExpression,
    AndAssignmentExpression,
    OrAssignmentExpression,
    ExclusiveOrAssignmentExpression,
    LeftShiftAssignmentExpression,
    RightShiftAssignmentExpression,
    CoalesceAssignmentExpression,
}

use SyntaxKind::*;

impl SyntaxKind {
    /// Check if this kind is a leaf token
    pub fn is_token(self) -> bool {
        self < CompilationUnit
    }

    /// Check if this kind is a keyword token
    pub fn is_keyword(self) -> bool {
        (UsingKw..=DecimalKw).contains(&self)
    }

    /// Keyword or punctuation text; `None` for tokens with variable text and nodes
    pub fn fixed_text(self) -> Option<&'static str> {
        let text = match self {
            OpenBrace => "{",
            CloseBrace => "}",
            OpenParen => "(",
            CloseParen => ")",
            OpenBracket => "[",
            CloseBracket => "]",
            Semicolon => ";",
            Comma => ",",
            Dot => ".",
            Colon => ":",
            Question => "?",
            QuestionQuestion => "??",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Ampersand => "&",
            Bar => "|",
            Caret => "^",
            Exclamation => "!",
            Tilde => "~",
            Equals => "=",
            EqualsEquals => "==",
            ExclamationEquals => "!=",
            Less => "<",
            LessEquals => "<=",
            Greater => ">",
            GreaterEquals => ">=",
            LessLess => "<<",
            GreaterGreater => ">>",
            AmpersandAmpersand => "&&",
            BarBar => "||",
            PlusPlus => "++",
            MinusMinus => "--",
            PlusEquals => "+=",
            MinusEquals => "-=",
            StarEquals => "*=",
            SlashEquals => "/=",
            PercentEquals => "%=",
            AmpersandEquals => "&=",
            BarEquals => "|=",
            CaretEquals => "^=",
            LessLessEquals => "<<=",
            GreaterGreaterEquals => ">>=",
            QuestionQuestionEquals => "??=",
            UsingKw => "using",
            NamespaceKw => "namespace",
            ClassKw => "class",
            StructKw => "struct",
            InterfaceKw => "interface",
            EnumKw => "enum",
            PublicKw => "public",
            PrivateKw => "private",
            ProtectedKw => "protected",
            InternalKw => "internal",
            StaticKw => "static",
            ReadonlyKw => "readonly",
            ConstKw => "const",
            AbstractKw => "abstract",
            VirtualKw => "virtual",
            OverrideKw => "override",
            SealedKw => "sealed",
            PartialKw => "partial",
            AsyncKw => "async",
            NewKw => "new",
            ReturnKw => "return",
            IfKw => "if",
            ElseKw => "else",
            WhileKw => "while",
            SwitchKw => "switch",
            CaseKw => "case",
            DefaultKw => "default",
            BreakKw => "break",
            ContinueKw => "continue",
            ThrowKw => "throw",
            TrueKw => "true",
            FalseKw => "false",
            NullKw => "null",
            ThisKw => "this",
            TypeofKw => "typeof",
            CheckedKw => "checked",
            UncheckedKw => "unchecked",
            IsKw => "is",
            AsKw => "as",
            VoidKw => "void",
            BoolKw => "bool",
            ByteKw => "byte",
            SbyteKw => "sbyte",
            ShortKw => "short",
            UshortKw => "ushort",
            IntKw => "int",
            UintKw => "uint",
            LongKw => "long",
            UlongKw => "ulong",
            CharKw => "char",
            StringKw => "string",
            ObjectKw => "object",
            FloatKw => "float",
            DoubleKw => "double",
            DecimalKw => "decimal",
            _ => return None,
        };
        Some(text)
    }

    /// Look up a keyword by its text
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "using" => UsingKw,
            "namespace" => NamespaceKw,
            "class" => ClassKw,
            "struct" => StructKw,
            "interface" => InterfaceKw,
            "enum" => EnumKw,
            "public" => PublicKw,
            "private" => PrivateKw,
            "protected" => ProtectedKw,
            "internal" => InternalKw,
            "static" => StaticKw,
            "readonly" => ReadonlyKw,
            "const" => ConstKw,
            "abstract" => AbstractKw,
            "virtual" => VirtualKw,
            "override" => OverrideKw,
            "sealed" => SealedKw,
            "partial" => PartialKw,
            "async" => AsyncKw,
            "new" => NewKw,
            "return" => ReturnKw,
            "if" => IfKw,
            "else" => ElseKw,
            "while" => WhileKw,
            "switch" => SwitchKw,
            "case" => CaseKw,
            "default" => DefaultKw,
            "break" => BreakKw,
            "continue" => ContinueKw,
            "throw" => ThrowKw,
            "true" => TrueKw,
            "false" => FalseKw,
            "null" => NullKw,
            "this" => ThisKw,
            "typeof" => TypeofKw,
            "checked" => CheckedKw,
            "unchecked" => UncheckedKw,
            "is" => IsKw,
            "as" => AsKw,
            "void" => VoidKw,
            "bool" => BoolKw,
            "byte" => ByteKw,
            "sbyte" => SbyteKw,
            "short" => ShortKw,
            "ushort" => UshortKw,
            "int" => IntKw,
            "uint" => UintKw,
            "long" => LongKw,
            "ulong" => UlongKw,
            "char" => CharKw,
            "string" => StringKw,
            "object" => ObjectKw,
            "float" => FloatKw,
            "double" => DoubleKw,
            "decimal" => DecimalKw,
            _ => return None,
        };
        Some(kind)
    }

    /// Keywords that name a built-in type
    pub fn is_predefined_type_keyword(self) -> bool {
        matches!(
            self,
            VoidKw
                | BoolKw
                | ByteKw
                | SbyteKw
                | ShortKw
                | UshortKw
                | IntKw
                | UintKw
                | LongKw
                | UlongKw
                | CharKw
                | StringKw
                | ObjectKw
                | FloatKw
                | DoubleKw
                | DecimalKw
        )
    }

    /// Declaration modifiers
    pub fn is_modifier_keyword(self) -> bool {
        matches!(
            self,
            PublicKw
                | PrivateKw
                | ProtectedKw
                | InternalKw
                | StaticKw
                | ReadonlyKw
                | ConstKw
                | AbstractKw
                | VirtualKw
                | OverrideKw
                | SealedKw
                | PartialKw
                | AsyncKw
                | NewKw
        )
    }

    /// Statement node kinds
    pub fn is_statement(self) -> bool {
        matches!(
            self,
            Block
                | LocalDeclarationStatement
                | ExpressionStatement
                | ReturnStatement
                | IfStatement
                | WhileStatement
                | SwitchStatement
                | BreakStatement
                | ContinueStatement
                | ThrowStatement
                | EmptyStatement
        )
    }

    /// Member declarations that can appear in a namespace or type body
    pub fn is_member_declaration(self) -> bool {
        matches!(
            self,
            NamespaceDeclaration
                | ClassDeclaration
                | StructDeclaration
                | InterfaceDeclaration
                | EnumDeclaration
                | EnumMemberDeclaration
                | FieldDeclaration
                | PropertyDeclaration
                | MethodDeclaration
                | ConstructorDeclaration
        )
    }

    /// Declarations whose body holds other member declarations
    pub fn is_type_declaration(self) -> bool {
        matches!(
            self,
            ClassDeclaration | StructDeclaration | InterfaceDeclaration
        )
    }

    /// Binary operator expression kinds
    pub fn is_binary_expression(self) -> bool {
        (MultiplyExpression..=CoalesceExpression).contains(&self)
    }

    /// Prefix unary expression kinds
    pub fn is_prefix_unary_expression(self) -> bool {
        (UnaryPlusExpression..=PreDecrementExpression).contains(&self)
    }

    /// Assignment expression kinds
    pub fn is_assignment_expression(self) -> bool {
        (SimpleAssignmentExpression..=CoalesceAssignmentExpression).contains(&self)
    }

    /// Literal expression kinds
    pub fn is_literal_expression(self) -> bool {
        (NumericLiteralExpression..=DefaultLiteralExpression).contains(&self)
    }

    /// Expression node kinds, including names
    pub fn is_expression(self) -> bool {
        matches!(self, IdentifierName | GenericName | PredefinedType)
            || (NumericLiteralExpression..=CoalesceAssignmentExpression).contains(&self)
                && !matches!(self, ArgumentList | Argument | BracketedArgumentList)
    }

    /// Binary expression kind produced by an operator token
    pub fn binary_expression_for(token: SyntaxKind) -> Option<SyntaxKind> {
        let kind = match token {
            Star => MultiplyExpression,
            Slash => DivideExpression,
            Percent => ModuloExpression,
            Plus => AddExpression,
            Minus => SubtractExpression,
            LessLess => LeftShiftExpression,
            GreaterGreater => RightShiftExpression,
            Less => LessThanExpression,
            LessEquals => LessThanOrEqualExpression,
            Greater => GreaterThanExpression,
            GreaterEquals => GreaterThanOrEqualExpression,
            IsKw => IsExpression,
            AsKw => AsExpression,
            EqualsEquals => EqualsExpression,
            ExclamationEquals => NotEqualsExpression,
            Ampersand => BitwiseAndExpression,
            Caret => ExclusiveOrExpression,
            Bar => BitwiseOrExpression,
            AmpersandAmpersand => LogicalAndExpression,
            BarBar => LogicalOrExpression,
            QuestionQuestion => CoalesceExpression,
            _ => return None,
        };
        Some(kind)
    }

    /// Operator token of a binary expression kind
    pub fn binary_operator_token(self) -> Option<SyntaxKind> {
        let token = match self {
            MultiplyExpression => Star,
            DivideExpression => Slash,
            ModuloExpression => Percent,
            AddExpression => Plus,
            SubtractExpression => Minus,
            LeftShiftExpression => LessLess,
            RightShiftExpression => GreaterGreater,
            LessThanExpression => Less,
            LessThanOrEqualExpression => LessEquals,
            GreaterThanExpression => Greater,
            GreaterThanOrEqualExpression => GreaterEquals,
            IsExpression => IsKw,
            AsExpression => AsKw,
            EqualsExpression => EqualsEquals,
            NotEqualsExpression => ExclamationEquals,
            BitwiseAndExpression => Ampersand,
            ExclusiveOrExpression => Caret,
            BitwiseOrExpression => Bar,
            LogicalAndExpression => AmpersandAmpersand,
            LogicalOrExpression => BarBar,
            CoalesceExpression => QuestionQuestion,
            _ => return None,
        };
        Some(token)
    }

    /// Prefix unary expression kind produced by an operator token
    pub fn prefix_unary_expression_for(token: SyntaxKind) -> Option<SyntaxKind> {
        let kind = match token {
            Plus => UnaryPlusExpression,
            Minus => UnaryMinusExpression,
            Exclamation => LogicalNotExpression,
            Tilde => BitwiseNotExpression,
            PlusPlus => PreIncrementExpression,
            MinusMinus => PreDecrementExpression,
            _ => return None,
        };
        Some(kind)
    }

    /// Assignment expression kind produced by an operator token
    pub fn assignment_expression_for(token: SyntaxKind) -> Option<SyntaxKind> {
        let kind = match token {
            Equals => SimpleAssignmentExpression,
            PlusEquals => AddAssignmentExpression,
            MinusEquals => SubtractAssignmentExpression,
            StarEquals => MultiplyAssignmentExpression,
            SlashEquals => DivideAssignmentExpression,
            PercentEquals => ModuloAssignmentExpression,
            AmpersandEquals => AndAssignmentExpression,
            BarEquals => OrAssignmentExpression,
            CaretEquals => ExclusiveOrAssignmentExpression,
            LessLessEquals => LeftShiftAssignmentExpression,
            GreaterGreaterEquals => RightShiftAssignmentExpression,
            QuestionQuestionEquals => CoalesceAssignmentExpression,
            _ => return None,
        };
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_and_node_partition() {
        assert!(Identifier.is_token());
        assert!(DecimalKw.is_token());
        assert!(!CompilationUnit.is_token());
        assert!(!CoalesceAssignmentExpression.is_token());
    }

    #[test]
    fn test_keyword_round_trip() {
        for kind in [UsingKw, IfKw, ElseKw, IntKw, UlongKw, DecimalKw] {
            let text = kind.fixed_text().unwrap();
            assert_eq!(SyntaxKind::from_keyword(text), Some(kind));
            assert!(kind.is_keyword());
        }
        assert_eq!(SyntaxKind::from_keyword("var"), None);
    }

    #[test]
    fn test_operator_tables_agree() {
        for token in [Star, Less, GreaterEquals, AmpersandAmpersand, QuestionQuestion] {
            let expr = SyntaxKind::binary_expression_for(token).unwrap();
            assert!(expr.is_binary_expression());
            assert_eq!(expr.binary_operator_token(), Some(token));
        }
    }

    #[test]
    fn test_expression_classification() {
        assert!(IdentifierName.is_expression());
        assert!(InvocationExpression.is_expression());
        assert!(LogicalNotExpression.is_prefix_unary_expression());
        assert!(!ArgumentList.is_expression());
        assert!(!Block.is_expression());
        assert!(IfStatement.is_statement());
        assert!(EnumMemberDeclaration.is_member_declaration());
    }
}
