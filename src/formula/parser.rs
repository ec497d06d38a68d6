//! Recursive-descent formula parser.
//!
//! Grammar, loosest-binding first:
//!
//! ```text
//! formula    := '=' comparison
//! comparison := concat (('=' | '<>' | '<' | '<=' | '>' | '>=') concat)*
//! concat     := additive ('&' additive)*
//! additive   := multiplicative (('+' | '-') multiplicative)*
//! multiplicative := power (('*' | '/') power)*
//! power      := unary ('^' power)?
//! unary      := ('+' | '-') unary | primary
//! primary    := number | string | function | range | address | '(' comparison ')'
//! ```
//!
//! The parser backtracks only at the primary level (function name vs. cell
//! address). Any leftover input after the expression fails the parse.

use super::{Address, BinaryOp, Expr, UnaryOp, parse_column};

/// Parse formula text into an expression tree.
///
/// Returns `None` when the input does not start with `=`, contains a syntax
/// error, or is not fully consumed.
pub fn parse(text: &str) -> Option<Expr> {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'=') {
        return None;
    }
    let mut parser = Parser {
        bytes,
        text,
        pos: 1,
    };
    let expr = parser.comparison()?;
    parser.skip_whitespace();
    if parser.pos != bytes.len() {
        return None;
    }
    Some(expr)
}

struct Parser<'a> {
    bytes: &'a [u8],
    text: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    fn comparison(&mut self) -> Option<Expr> {
        let mut lhs = self.concat()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some(b'=') => {
                    self.pos += 1;
                    BinaryOp::Eq
                },
                Some(b'<') => {
                    self.pos += 1;
                    if self.eat(b'>') {
                        BinaryOp::Ne
                    } else if self.eat(b'=') {
                        BinaryOp::Le
                    } else {
                        BinaryOp::Lt
                    }
                },
                Some(b'>') => {
                    self.pos += 1;
                    if self.eat(b'=') {
                        BinaryOp::Ge
                    } else {
                        BinaryOp::Gt
                    }
                },
                _ => break,
            };
            let rhs = self.concat()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn concat(&mut self) -> Option<Expr> {
        let mut lhs = self.additive()?;
        loop {
            self.skip_whitespace();
            if !self.eat(b'&') {
                break;
            }
            let rhs = self.additive()?;
            lhs = Expr::Binary(BinaryOp::Concat, Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn additive(&mut self) -> Option<Expr> {
        let mut lhs = self.multiplicative()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some(b'+') => BinaryOp::Add,
                Some(b'-') => BinaryOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.multiplicative()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn multiplicative(&mut self) -> Option<Expr> {
        let mut lhs = self.power()?;
        loop {
            self.skip_whitespace();
            let op = match self.peek() {
                Some(b'*') => BinaryOp::Mul,
                Some(b'/') => BinaryOp::Div,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.power()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    fn power(&mut self) -> Option<Expr> {
        let base = self.unary()?;
        self.skip_whitespace();
        if self.eat(b'^') {
            // Right-associative.
            let exponent = self.power()?;
            return Some(Expr::Binary(
                BinaryOp::Pow,
                Box::new(base),
                Box::new(exponent),
            ));
        }
        Some(base)
    }

    fn unary(&mut self) -> Option<Expr> {
        self.skip_whitespace();
        match self.peek() {
            Some(b'+') => {
                self.pos += 1;
                Some(Expr::Unary(UnaryOp::Plus, Box::new(self.unary()?)))
            },
            Some(b'-') => {
                self.pos += 1;
                Some(Expr::Unary(UnaryOp::Minus, Box::new(self.unary()?)))
            },
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Option<Expr> {
        self.skip_whitespace();
        match self.peek()? {
            b'(' => {
                self.pos += 1;
                let inner = self.comparison()?;
                self.skip_whitespace();
                if !self.eat(b')') {
                    return None;
                }
                Some(Expr::Group(Box::new(inner)))
            },
            b'"' => self.string(),
            b'0'..=b'9' | b'.' => self.number(),
            _ => {
                // Function call or cell address; try the function first and
                // fall back by rewinding.
                let saved = self.pos;
                if let Some(function) = self.function() {
                    return Some(function);
                }
                self.pos = saved;
                let start = self.address()?;
                self.skip_whitespace();
                if self.eat(b':') {
                    let end = self.address()?;
                    return Some(Expr::Range(start, end));
                }
                Some(Expr::Address(start))
            },
        }
    }

    fn string(&mut self) -> Option<Expr> {
        debug_assert_eq!(self.peek(), Some(b'"'));
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.bump() {
            if b == b'"' {
                return Some(Expr::Text(self.text[start..self.pos - 1].to_string()));
            }
        }
        None
    }

    fn number(&mut self) -> Option<Expr> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if self.eat(b'.') {
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.pos += 1;
            }
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            let saved = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if matches!(self.peek(), Some(b'0'..=b'9')) {
                while matches!(self.peek(), Some(b'0'..=b'9')) {
                    self.pos += 1;
                }
            } else {
                self.pos = saved;
            }
        }
        if self.pos == start {
            return None;
        }
        fast_float2::parse(&self.text[start..self.pos])
            .ok()
            .map(Expr::Number)
    }

    /// A function name followed by a parenthesized argument list.
    fn function(&mut self) -> Option<Expr> {
        let name = self.identifier()?;
        self.skip_whitespace();
        if !self.eat(b'(') {
            return None;
        }
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.eat(b')') {
            return Some(Expr::Function(name, args));
        }
        loop {
            args.push(self.comparison()?);
            self.skip_whitespace();
            if self.eat(b';') {
                continue;
            }
            if self.eat(b')') {
                return Some(Expr::Function(name, args));
            }
            return None;
        }
    }

    /// `[worksheet '.'] [table '.'] ['$'] column ['$'] row`
    fn address(&mut self) -> Option<Address> {
        let first_qualifier = self.qualifier();
        let second_qualifier = if first_qualifier.is_some() {
            self.qualifier()
        } else {
            None
        };
        let (worksheet, table) = match (first_qualifier, second_qualifier) {
            (Some(ws), Some(t)) => (Some(ws), Some(t)),
            (Some(t), None) => (None, Some(t)),
            _ => (None, None),
        };

        let absolute_column = self.eat(b'$');
        let column_start = self.pos;
        while matches!(self.peek(), Some(b'A'..=b'Z' | b'a'..=b'z')) {
            self.pos += 1;
        }
        let column = parse_column(&self.text[column_start..self.pos])?;

        let absolute_row = self.eat(b'$');
        let row_start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if row_start == self.pos {
            return None;
        }
        let row: u32 = self.text[row_start..self.pos].parse().ok()?;
        if row == 0 {
            return None;
        }

        Some(Address {
            column,
            row,
            absolute_column,
            absolute_row,
            table,
            worksheet,
        })
    }

    /// A `name.` qualifier before an address; rewinds when not present.
    fn qualifier(&mut self) -> Option<String> {
        let saved = self.pos;
        let name = match self.identifier() {
            Some(name) => name,
            None => {
                self.pos = saved;
                return None;
            },
        };
        if !self.eat(b'.') {
            self.pos = saved;
            return None;
        }
        // A qualifier must be followed by more address material.
        match self.peek() {
            Some(b'$' | b'A'..=b'Z' | b'a'..=b'z') => Some(name),
            _ => {
                self.pos = saved;
                None
            },
        }
    }

    fn identifier(&mut self) -> Option<String> {
        let start = self.pos;
        match self.peek()? {
            b'A'..=b'Z' | b'a'..=b'z' | b'_' => self.pos += 1,
            _ => return None,
        }
        while matches!(
            self.peek(),
            Some(b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_')
        ) {
            self.pos += 1;
        }
        Some(self.text[start..self.pos].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Formula, format_column};
    use super::*;

    fn address(column: u32, row: u32) -> Address {
        Address {
            column,
            row,
            absolute_column: false,
            absolute_row: false,
            table: None,
            worksheet: None,
        }
    }

    #[test]
    fn test_requires_leading_equals() {
        assert!(parse("not a formula").is_none());
        assert!(parse("1+2").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn test_rejects_trailing_garbage() {
        assert!(parse("=1+2)").is_none());
        assert!(parse("=A1 A2").is_none());
    }

    #[test]
    fn test_abs_of_mixed_address() {
        let expr = parse("=ABS($B2)").unwrap();
        let Expr::Function(name, args) = expr else {
            panic!("expected a function");
        };
        assert_eq!(name, "ABS");
        assert_eq!(args.len(), 1);
        let Expr::Address(addr) = &args[0] else {
            panic!("expected an address argument");
        };
        assert_eq!(addr.column, 2);
        assert_eq!(addr.row, 2);
        assert!(addr.absolute_column);
        assert!(!addr.absolute_row);
    }

    #[test]
    fn test_precedence() {
        let expr = parse("=1+2*3").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Add,
                Box::new(Expr::Number(1.0)),
                Box::new(Expr::Binary(
                    BinaryOp::Mul,
                    Box::new(Expr::Number(2.0)),
                    Box::new(Expr::Number(3.0)),
                )),
            )
        );
    }

    #[test]
    fn test_power_is_right_associative() {
        let expr = parse("=2^3^2").unwrap();
        assert_eq!(
            expr,
            Expr::Binary(
                BinaryOp::Pow,
                Box::new(Expr::Number(2.0)),
                Box::new(Expr::Binary(
                    BinaryOp::Pow,
                    Box::new(Expr::Number(3.0)),
                    Box::new(Expr::Number(2.0)),
                )),
            )
        );
    }

    #[test]
    fn test_range_and_qualifiers() {
        let expr = parse("=SUM(Sheet1.Table1.A1:Sheet1.Table1.B3)").unwrap();
        let Expr::Function(_, args) = expr else {
            panic!("expected a function");
        };
        let Expr::Range(start, end) = &args[0] else {
            panic!("expected a range argument");
        };
        assert_eq!(start.worksheet.as_deref(), Some("Sheet1"));
        assert_eq!(start.table.as_deref(), Some("Table1"));
        assert_eq!((start.column, start.row), (1, 1));
        assert_eq!((end.column, end.row), (2, 3));
    }

    #[test]
    fn test_single_qualifier_is_table() {
        let expr = parse("=Table1.C3").unwrap();
        let Expr::Address(addr) = expr else {
            panic!("expected an address");
        };
        assert_eq!(addr.worksheet, None);
        assert_eq!(addr.table.as_deref(), Some("Table1"));
        assert_eq!((addr.column, addr.row), (3, 3));
    }

    #[test]
    fn test_function_with_multiple_arguments() {
        let expr = parse("=IF(A1>0;\"yes\";\"no\")").unwrap();
        let Expr::Function(name, args) = expr else {
            panic!("expected a function");
        };
        assert_eq!(name, "IF");
        assert_eq!(args.len(), 3);
        assert_eq!(args[1], Expr::Text("yes".to_string()));
    }

    #[test]
    fn test_row_zero_is_invalid() {
        assert!(parse("=A0").is_none());
    }

    #[test]
    fn test_display_round_trip() {
        for source in [
            "=ABS($B2)",
            "=1+2*3",
            "=(1+2)*3",
            "=-2^2",
            "=SUM(A1;B2;C3)",
            "=Table1.$A$1:Table1.$C$7",
            "=\"a\"&\"b\"",
            "=1<=2",
        ] {
            let formula = Formula::parse(source).unwrap();
            let rendered = formula.to_string();
            let reparsed = Formula::parse(&rendered).unwrap();
            assert_eq!(formula, reparsed, "{} -> {}", source, rendered);
        }
    }

    #[test]
    fn test_large_column_round_trip() {
        let addr = address(parse_column("AMJ").unwrap(), 9);
        assert_eq!(format_column(addr.column), "AMJ");
    }

    mod round_trip {
        use super::*;
        use proptest::prelude::*;

        /// Expression trees whose rendering is unambiguous: binary and
        /// unary operands are parenthesized, so re-parsing must rebuild
        /// the exact same tree.
        fn arb_expr() -> impl Strategy<Value = Expr> {
            let leaf = prop_oneof![
                (0u32..10000).prop_map(|n| Expr::Number(f64::from(n))),
                "[a-z ]{0,8}".prop_map(Expr::Text),
                (1u32..1000, 1u32..1000, any::<bool>(), any::<bool>()).prop_map(
                    |(column, row, absolute_column, absolute_row)| {
                        Expr::Address(Address {
                            column,
                            row,
                            absolute_column,
                            absolute_row,
                            table: None,
                            worksheet: None,
                        })
                    }
                ),
            ];
            leaf.prop_recursive(3, 24, 3, |inner| {
                prop_oneof![
                    (inner.clone(), inner.clone()).prop_map(|(a, b)| {
                        Expr::Binary(
                            BinaryOp::Add,
                            Box::new(Expr::Group(Box::new(a))),
                            Box::new(Expr::Group(Box::new(b))),
                        )
                    }),
                    inner.clone().prop_map(|a| {
                        Expr::Unary(UnaryOp::Minus, Box::new(Expr::Group(Box::new(a))))
                    }),
                    proptest::collection::vec(inner, 0..3)
                        .prop_map(|args| Expr::Function("SUM".to_string(), args)),
                ]
            })
        }

        proptest! {
            #[test]
            fn prop_parse_render_round_trip(expr in arb_expr()) {
                let rendered = format!("={}", expr);
                prop_assert_eq!(parse(&rendered), Some(expr));
            }
        }
    }
}
