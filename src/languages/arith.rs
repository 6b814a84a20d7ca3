//! Arithmetic expressions over the c-like tokens.
//!
//! The binary operators are left recursive, so `1 - 2 - 3` groups as `(1 - 2) - 3` without any
//! rewriting of the rules.

use crate::grammar::{Grammar, GrammarError};

pub const GRAMMAR: &str = r#"
(rule expr
  (| (=> add expr "+" term)
     (=> sub expr "-" term)
     term))

(rule term
  (| (=> mul term "*" factor)
     (=> div term "/" factor)
     factor))

(rule factor
  (| @Number
     @Identifier
     (=> group "(" expr ")")
     (=> neg "-" factor)))
"#;

pub fn grammar() -> Result<Grammar, GrammarError> {
    Grammar::from_sexp(GRAMMAR)
}
