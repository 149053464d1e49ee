//! Tokens of the C++ subset Sable recognizes.

use crate::{Comment, Name, Span};

/// Kind of a lexed token.
///
/// Identifier and literal kinds carry their interned text; keywords and
/// punctuators are fieldless. The preprocessor runs before Sable, so there
/// are no preprocessing-token kinds here.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    Ident(Name),
    IntLit(Name),
    FloatLit(Name),
    CharLit(Name),
    StringLit(Name),

    // Declaration keywords
    KwNamespace,
    KwUsing,
    KwTypedef,
    KwClass,
    KwStruct,
    KwUnion,
    KwEnum,
    KwTemplate,
    KwTypename,
    KwOperator,
    KwFriend,
    KwExtern,
    KwStatic,
    KwInline,
    KwVirtual,
    KwExplicit,
    KwMutable,
    KwRegister,
    KwAuto,
    KwPublic,
    KwProtected,
    KwPrivate,

    // Type keywords
    KwConst,
    KwVolatile,
    KwSigned,
    KwUnsigned,
    KwChar,
    KwWcharT,
    KwBool,
    KwShort,
    KwInt,
    KwLong,
    KwFloat,
    KwDouble,
    KwVoid,

    // Statement and expression keywords
    KwIf,
    KwElse,
    KwWhile,
    KwDo,
    KwFor,
    KwSwitch,
    KwCase,
    KwDefault,
    KwBreak,
    KwContinue,
    KwReturn,
    KwGoto,
    KwTry,
    KwCatch,
    KwThrow,
    KwNew,
    KwDelete,
    KwThis,
    KwSizeof,
    KwTypeid,
    KwTrue,
    KwFalse,

    // Punctuators and operators
    Scope,      // ::
    Semi,       // ;
    Colon,      // :
    Comma,      // ,
    LBrace,     // {
    RBrace,     // }
    LParen,     // (
    RParen,     // )
    LBracket,   // [
    RBracket,   // ]
    Question,   // ?
    Dot,        // .
    DotStar,    // .*
    Arrow,      // ->
    ArrowStar,  // ->*
    Ellipsis,   // ...
    Tilde,      // ~
    Bang,       // !
    Plus,       // +
    Minus,      // -
    Star,       // *
    Slash,      // /
    Percent,    // %
    Caret,      // ^
    Amp,        // &
    Pipe,       // |
    Lt,         // <
    Gt,         // >
    Assign,     // =
    PlusAssign, // +=
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    CaretAssign,
    AmpAssign,
    PipeAssign,
    ShlAssign, // <<=
    ShrAssign, // >>=
    EqEq,      // ==
    NotEq,     // !=
    LtEq,      // <=
    GtEq,      // >=
    AmpAmp,    // &&
    PipePipe,  // ||
    Shl,       // <<
    Shr,       // >>
    Inc,       // ++
    Dec,       // --

    Eof,
}

impl TokenKind {
    /// The interned text of an identifier token, if this is one.
    #[inline]
    pub fn as_ident(self) -> Option<Name> {
        match self {
            TokenKind::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// `const` or `volatile`.
    #[inline]
    pub fn is_cv_qualifier(self) -> bool {
        matches!(self, TokenKind::KwConst | TokenKind::KwVolatile)
    }

    /// A builtin integral/floating type keyword (including `void`).
    #[inline]
    pub fn is_builtin_type(self) -> bool {
        matches!(
            self,
            TokenKind::KwChar
                | TokenKind::KwWcharT
                | TokenKind::KwBool
                | TokenKind::KwShort
                | TokenKind::KwInt
                | TokenKind::KwLong
                | TokenKind::KwFloat
                | TokenKind::KwDouble
                | TokenKind::KwVoid
                | TokenKind::KwSigned
                | TokenKind::KwUnsigned
        )
    }

    /// A storage-class or function specifier (`static`, `inline`, ...).
    #[inline]
    pub fn is_storage_spec(self) -> bool {
        matches!(
            self,
            TokenKind::KwStatic
                | TokenKind::KwExtern
                | TokenKind::KwInline
                | TokenKind::KwVirtual
                | TokenKind::KwExplicit
                | TokenKind::KwMutable
                | TokenKind::KwRegister
                | TokenKind::KwAuto
                | TokenKind::KwFriend
        )
    }

    /// `class`, `struct` or `union`.
    #[inline]
    pub fn is_class_key(self) -> bool {
        matches!(
            self,
            TokenKind::KwClass | TokenKind::KwStruct | TokenKind::KwUnion
        )
    }

    /// An assignment operator (including plain `=`).
    #[inline]
    pub fn is_assign_op(self) -> bool {
        matches!(
            self,
            TokenKind::Assign
                | TokenKind::PlusAssign
                | TokenKind::MinusAssign
                | TokenKind::StarAssign
                | TokenKind::SlashAssign
                | TokenKind::PercentAssign
                | TokenKind::CaretAssign
                | TokenKind::AmpAssign
                | TokenKind::PipeAssign
                | TokenKind::ShlAssign
                | TokenKind::ShrAssign
        )
    }

    /// Spelling of a fieldless token kind, for diagnostics and operator
    /// names. Identifier/literal kinds return `None`.
    pub fn fixed_spelling(self) -> Option<&'static str> {
        use TokenKind::*;
        Some(match self {
            Scope => "::",
            Semi => ";",
            Colon => ":",
            Comma => ",",
            LBrace => "{",
            RBrace => "}",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            Question => "?",
            Dot => ".",
            DotStar => ".*",
            Arrow => "->",
            ArrowStar => "->*",
            Ellipsis => "...",
            Tilde => "~",
            Bang => "!",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Caret => "^",
            Amp => "&",
            Pipe => "|",
            Lt => "<",
            Gt => ">",
            Assign => "=",
            PlusAssign => "+=",
            MinusAssign => "-=",
            StarAssign => "*=",
            SlashAssign => "/=",
            PercentAssign => "%=",
            CaretAssign => "^=",
            AmpAssign => "&=",
            PipeAssign => "|=",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
            EqEq => "==",
            NotEq => "!=",
            LtEq => "<=",
            GtEq => ">=",
            AmpAmp => "&&",
            PipePipe => "||",
            Shl => "<<",
            Shr => ">>",
            Inc => "++",
            Dec => "--",
            KwNamespace => "namespace",
            KwUsing => "using",
            KwTypedef => "typedef",
            KwClass => "class",
            KwStruct => "struct",
            KwUnion => "union",
            KwEnum => "enum",
            KwTemplate => "template",
            KwTypename => "typename",
            KwOperator => "operator",
            KwFriend => "friend",
            KwExtern => "extern",
            KwStatic => "static",
            KwInline => "inline",
            KwVirtual => "virtual",
            KwExplicit => "explicit",
            KwMutable => "mutable",
            KwRegister => "register",
            KwAuto => "auto",
            KwPublic => "public",
            KwProtected => "protected",
            KwPrivate => "private",
            KwConst => "const",
            KwVolatile => "volatile",
            KwSigned => "signed",
            KwUnsigned => "unsigned",
            KwChar => "char",
            KwWcharT => "wchar_t",
            KwBool => "bool",
            KwShort => "short",
            KwInt => "int",
            KwLong => "long",
            KwFloat => "float",
            KwDouble => "double",
            KwVoid => "void",
            KwIf => "if",
            KwElse => "else",
            KwWhile => "while",
            KwDo => "do",
            KwFor => "for",
            KwSwitch => "switch",
            KwCase => "case",
            KwDefault => "default",
            KwBreak => "break",
            KwContinue => "continue",
            KwReturn => "return",
            KwGoto => "goto",
            KwTry => "try",
            KwCatch => "catch",
            KwThrow => "throw",
            KwNew => "new",
            KwDelete => "delete",
            KwThis => "this",
            KwSizeof => "sizeof",
            KwTypeid => "typeid",
            KwTrue => "true",
            KwFalse => "false",
            Eof => "<eof>",
            Ident(_) | IntLit(_) | FloatLit(_) | CharLit(_) | StringLit(_) => return None,
        })
    }
}

/// A lexed token.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub const EOF: Token = Token {
        kind: TokenKind::Eof,
        span: Span::DUMMY,
    };
}

/// The eagerly lexed token stream for one translation unit.
///
/// The final token is always [`TokenKind::Eof`]. Comments are captured
/// out-of-band, ordered, each tagged with the index of the token that
/// follows it; the parser attaches them to declarations by position, so
/// speculative parses never consume them.
pub struct TokenList {
    tokens: Vec<Token>,
    comments: Vec<(u32, Comment)>,
}

impl TokenList {
    /// Build a token list. `tokens` must end with an EOF token.
    pub fn new(tokens: Vec<Token>, comments: Vec<(u32, Comment)>) -> Self {
        debug_assert!(matches!(
            tokens.last().map(|t| t.kind),
            Some(TokenKind::Eof)
        ));
        TokenList { tokens, comments }
    }

    /// Number of tokens, including the trailing EOF.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True if the list holds only the EOF token.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.len() <= 1
    }

    /// Token at `pos`, clamped to the trailing EOF.
    #[inline]
    pub fn get(&self, pos: usize) -> Token {
        if pos < self.tokens.len() {
            self.tokens[pos]
        } else {
            Token::EOF
        }
    }

    /// All tokens.
    #[inline]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Comments attached to token indices in `lo..hi`, in source order.
    pub fn comments_between(&self, lo: usize, hi: usize) -> Vec<Comment> {
        self.comments
            .iter()
            .filter(|(idx, _)| (*idx as usize) >= lo && (*idx as usize) < hi)
            .map(|(_, c)| c.clone())
            .collect()
    }
}
