//! Type expressions for `var` annotations and composite literal types.

use crate::parser::Parser;
use gastro_lexer::TokenKind;
use gastro_types::ast::TypeExpr;

impl<'src> Parser<'src> {
    /// `[]T`, `[N]T`, `map[K]V`, `interface{}`, `any`, `*T`, `T`, `pkg.T`
    ///
    /// Fixed-size arrays are treated as slices.
    pub(crate) fn parse_type(&mut self) -> Option<TypeExpr> {
        match self.peek_kind().clone() {
            TokenKind::LBracket => {
                self.advance();
                if !self.eat(&TokenKind::RBracket) {
                    // Array length: a constant or `...`
                    while !self.check_exact(&TokenKind::RBracket) && !self.at_end() {
                        if matches!(self.peek_kind(), TokenKind::Newline | TokenKind::LBrace) {
                            break;
                        }
                        self.advance();
                    }
                    self.expect(&TokenKind::RBracket)?;
                }
                let elem = self.parse_type()?;
                Some(TypeExpr::Slice(Box::new(elem)))
            }
            TokenKind::Map => {
                self.advance();
                self.expect(&TokenKind::LBracket)?;
                let key = self.parse_type()?;
                self.expect(&TokenKind::RBracket)?;
                let value = self.parse_type()?;
                Some(TypeExpr::Map(Box::new(key), Box::new(value)))
            }
            TokenKind::Interface => {
                self.advance();
                if !self.check_exact(&TokenKind::LBrace) {
                    self.error_at_current("expected '{' after 'interface'");
                    return None;
                }
                self.skip_balanced();
                Some(TypeExpr::Interface)
            }
            TokenKind::Star => {
                self.advance();
                let inner = self.parse_type()?;
                Some(TypeExpr::Pointer(Box::new(inner)))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                if name == "any" {
                    return Some(TypeExpr::Interface);
                }
                if self.check_exact(&TokenKind::Dot)
                    && matches!(self.look_ahead(1), TokenKind::Identifier(_))
                {
                    self.advance();
                    let member = self.expect_identifier()?;
                    return Some(TypeExpr::Named(format!("{name}.{}", member.name)));
                }
                Some(TypeExpr::Named(name))
            }
            TokenKind::Func => {
                self.error_at_current("function types are not supported");
                None
            }
            other => {
                self.error_at_current(format!("expected type, got '{other}'"));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parse_frontmatter;
    use gastro_types::ast::{Stmt, TypeExpr};

    fn var_type(src: &str) -> TypeExpr {
        let program = parse_frontmatter(src).into_result().unwrap();
        match &program.stmts[0] {
            Stmt::Var(decl) => decl.type_ann.clone().unwrap(),
            other => panic!("expected var, got {other:?}"),
        }
    }

    #[test]
    fn test_named_and_qualified_types() {
        assert_eq!(var_type("var x int"), TypeExpr::Named("int".into()));
        assert_eq!(var_type("var t time.Time"), TypeExpr::Named("time.Time".into()));
    }

    #[test]
    fn test_collection_types() {
        assert_eq!(
            var_type("var xs []string"),
            TypeExpr::Slice(Box::new(TypeExpr::Named("string".into())))
        );
        assert_eq!(
            var_type("var xs [3]int"),
            TypeExpr::Slice(Box::new(TypeExpr::Named("int".into())))
        );
        assert_eq!(
            var_type("var m map[string][]int").to_string(),
            "map[string][]int"
        );
    }

    #[test]
    fn test_interface_and_any() {
        assert_eq!(var_type("var v interface{}"), TypeExpr::Interface);
        assert_eq!(var_type("var v any"), TypeExpr::Interface);
        assert_eq!(var_type("var p *User").to_string(), "*User");
    }
}
