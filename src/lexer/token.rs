use logos::Logos;

/// Consume a `/* ... */` comment. An unterminated comment runs to end of file.
fn block_comment(lex: &mut logos::Lexer<Token>) -> bool {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => lex.bump(end + 2),
        None => lex.bump(rest.len()),
    }
    true
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Keywords
    #[token("class")]
    Class,
    #[token("struct")]
    Struct,
    #[token("enum")]
    Enum,
    #[token("namespace")]
    Namespace,
    #[token("import")]
    Import,
    #[token("delegate")]
    Delegate,
    #[token("event")]
    Event,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("while")]
    While,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("const")]
    Const,
    #[token("this")]
    This,
    #[token("nullptr")]
    Nullptr,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("private")]
    Private,
    #[token("protected")]
    Protected,

    // Literals
    #[regex(r"0[xX][0-9a-fA-F_]+")]
    HexLit,

    #[regex(r"[0-9][0-9_]*")]
    IntLit,

    #[regex(r"[0-9][0-9_]*\.[0-9_]*([eE][+-]?[0-9]+)?[fF]")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?[fF]")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+[fF]")]
    FloatLit,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    #[regex(r"[0-9][0-9_]*[eE][+-]?[0-9]+")]
    DoubleLit,

    // Unterminated strings stop at end of line.
    #[regex(r#""([^"\\\n]|\\[^\n])*"?"#)]
    #[regex(r#"'([^'\\\n]|\\[^\n])*'?"#)]
    StringLit,

    #[regex(r#"f"([^"\\\n]|\\[^\n])*"?"#)]
    FormatStringLit,

    #[regex(r#"n"([^"\\\n]|\\[^\n])*"?"#)]
    NameLit,

    // Identifiers (contextual keywords such as `property`, `of`, `access` included)
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    // Operators
    #[token("++")]
    PlusPlus,
    #[token("+")]
    Plus,
    #[token("--")]
    MinusMinus,
    #[token("-")]
    Minus,
    #[token("**")]
    StarStar,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("**=")]
    StarStarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("&=")]
    AmpEq,
    #[token("|=")]
    PipeEq,
    #[token("^=")]
    CaretEq,
    #[token("<<=")]
    ShlEq,
    #[token(">>=")]
    ShrEq,
    #[token("=")]
    Eq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<<")]
    Shl,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("!")]
    Bang,
    #[token("?")]
    Question,
    #[token("@")]
    At,

    // Punctuation
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,

    // Trivia, removed from the token stream by `lex`
    #[regex(r"//[^\n]*")]
    LineComment,
    #[token("/*", block_comment)]
    BlockComment,
    #[regex(r"#[^\n]*")]
    Preprocessor,

    /// A character the lexer does not recognize. Kept so the parser fails the
    /// statement it appears in instead of the whole file.
    Unknown,
}

impl Token {
    pub fn is_trivia(&self) -> bool {
        matches!(self, Token::LineComment | Token::BlockComment | Token::Preprocessor)
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::HexLit
                | Token::IntLit
                | Token::FloatLit
                | Token::DoubleLit
                | Token::StringLit
                | Token::FormatStringLit
                | Token::NameLit
                | Token::True
                | Token::False
                | Token::Nullptr
        )
    }
}

/// Returns true if the given string is a reserved keyword.
pub fn is_keyword(s: &str) -> bool {
    matches!(s, "class" | "struct" | "enum" | "namespace" | "import" | "delegate" | "event"
        | "if" | "else" | "for" | "while" | "switch" | "case" | "default" | "break"
        | "continue" | "return" | "const" | "this" | "nullptr" | "true" | "false"
        | "private" | "protected")
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Class => write!(f, "class"),
            Token::Struct => write!(f, "struct"),
            Token::Enum => write!(f, "enum"),
            Token::Namespace => write!(f, "namespace"),
            Token::Import => write!(f, "import"),
            Token::Delegate => write!(f, "delegate"),
            Token::Event => write!(f, "event"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::For => write!(f, "for"),
            Token::While => write!(f, "while"),
            Token::Switch => write!(f, "switch"),
            Token::Case => write!(f, "case"),
            Token::Default => write!(f, "default"),
            Token::Break => write!(f, "break"),
            Token::Continue => write!(f, "continue"),
            Token::Return => write!(f, "return"),
            Token::Const => write!(f, "const"),
            Token::This => write!(f, "this"),
            Token::Nullptr => write!(f, "nullptr"),
            Token::True => write!(f, "true"),
            Token::False => write!(f, "false"),
            Token::Private => write!(f, "private"),
            Token::Protected => write!(f, "protected"),
            Token::HexLit => write!(f, "hex integer"),
            Token::IntLit => write!(f, "integer"),
            Token::FloatLit => write!(f, "float"),
            Token::DoubleLit => write!(f, "double"),
            Token::StringLit => write!(f, "string"),
            Token::FormatStringLit => write!(f, "format string"),
            Token::NameLit => write!(f, "name literal"),
            Token::Ident => write!(f, "identifier"),
            Token::PlusPlus => write!(f, "++"),
            Token::Plus => write!(f, "+"),
            Token::MinusMinus => write!(f, "--"),
            Token::Minus => write!(f, "-"),
            Token::StarStar => write!(f, "**"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::PlusEq => write!(f, "+="),
            Token::MinusEq => write!(f, "-="),
            Token::StarEq => write!(f, "*="),
            Token::StarStarEq => write!(f, "**="),
            Token::SlashEq => write!(f, "/="),
            Token::PercentEq => write!(f, "%="),
            Token::AmpEq => write!(f, "&="),
            Token::PipeEq => write!(f, "|="),
            Token::CaretEq => write!(f, "^="),
            Token::ShlEq => write!(f, "<<="),
            Token::ShrEq => write!(f, ">>="),
            Token::Eq => write!(f, "="),
            Token::EqEq => write!(f, "=="),
            Token::BangEq => write!(f, "!="),
            Token::Shl => write!(f, "<<"),
            Token::Lt => write!(f, "<"),
            Token::Gt => write!(f, ">"),
            Token::LtEq => write!(f, "<="),
            Token::GtEq => write!(f, ">="),
            Token::Amp => write!(f, "&"),
            Token::Pipe => write!(f, "|"),
            Token::Caret => write!(f, "^"),
            Token::Tilde => write!(f, "~"),
            Token::AmpAmp => write!(f, "&&"),
            Token::PipePipe => write!(f, "||"),
            Token::Bang => write!(f, "!"),
            Token::Question => write!(f, "?"),
            Token::At => write!(f, "@"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
            Token::ColonColon => write!(f, "::"),
            Token::Colon => write!(f, ":"),
            Token::Dot => write!(f, "."),
            Token::LineComment | Token::BlockComment => write!(f, "comment"),
            Token::Preprocessor => write!(f, "preprocessor directive"),
            Token::Unknown => write!(f, "unknown character"),
        }
    }
}
