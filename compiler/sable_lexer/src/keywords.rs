//! C++ keyword recognition.

use sable_ir::TokenKind;

/// Map an identifier spelling to its keyword kind, if it is one.
pub fn keyword(text: &str) -> Option<TokenKind> {
    use TokenKind::*;
    Some(match text {
        "namespace" => KwNamespace,
        "using" => KwUsing,
        "typedef" => KwTypedef,
        "class" => KwClass,
        "struct" => KwStruct,
        "union" => KwUnion,
        "enum" => KwEnum,
        "template" => KwTemplate,
        "typename" => KwTypename,
        "operator" => KwOperator,
        "friend" => KwFriend,
        "extern" => KwExtern,
        "static" => KwStatic,
        "inline" => KwInline,
        "virtual" => KwVirtual,
        "explicit" => KwExplicit,
        "mutable" => KwMutable,
        "register" => KwRegister,
        "auto" => KwAuto,
        "public" => KwPublic,
        "protected" => KwProtected,
        "private" => KwPrivate,
        "const" => KwConst,
        "volatile" => KwVolatile,
        "signed" => KwSigned,
        "unsigned" => KwUnsigned,
        "char" => KwChar,
        "wchar_t" => KwWcharT,
        "bool" => KwBool,
        "short" => KwShort,
        "int" => KwInt,
        "long" => KwLong,
        "float" => KwFloat,
        "double" => KwDouble,
        "void" => KwVoid,
        "if" => KwIf,
        "else" => KwElse,
        "while" => KwWhile,
        "do" => KwDo,
        "for" => KwFor,
        "switch" => KwSwitch,
        "case" => KwCase,
        "default" => KwDefault,
        "break" => KwBreak,
        "continue" => KwContinue,
        "return" => KwReturn,
        "goto" => KwGoto,
        "try" => KwTry,
        "catch" => KwCatch,
        "throw" => KwThrow,
        "new" => KwNew,
        "delete" => KwDelete,
        "this" => KwThis,
        "sizeof" => KwSizeof,
        "typeid" => KwTypeid,
        "true" => KwTrue,
        "false" => KwFalse,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_identifiers() {
        assert_eq!(keyword("class"), Some(TokenKind::KwClass));
        assert_eq!(keyword("wchar_t"), Some(TokenKind::KwWcharT));
        assert_eq!(keyword("classes"), None);
    }
}
