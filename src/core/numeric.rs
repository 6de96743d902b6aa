//! Numeric interpretation of LaTeX expression text
//!
//! The substituted expression is parsed with mitex-parser and the resulting
//! syntax tree is walked the same way the conversion pipeline walks LaTeX:
//! dispatch on `SyntaxKind`, recurse through containers, extract command
//! arguments through `CmdItem`. Instead of emitting markup, the walk
//! linearizes the tree into math tokens; a precedence-climbing pass then
//! computes the value and records every free symbol it resolves.
//!
//! Symbols are maximal alphabetic runs: a minted variable identifier is one
//! token, and `xy` is a single symbol, never `x * y`.

use std::collections::HashSet;

use fxhash::FxHashMap;
use mitex_parser::syntax::{CmdItem, SyntaxElement, SyntaxKind, SyntaxNode};
use mitex_spec_gen::DEFAULT_SPEC;
use rowan::ast::AstNode;

use crate::data::constants::{
    COMMAND_CONSTANTS, CONSTANTS, CONSTANT_COMMANDS, IGNORED_COMMANDS, OPERATOR_COMMANDS,
    TRANSPARENT_COMMANDS, UNARY_FUNCTIONS,
};
use crate::utils::error::{EvalError, EvalResult};

/// Result of interpreting one expression: the numeric value and the set of
/// symbols that were resolved through bindings (constants excluded).
#[derive(Debug, Clone, PartialEq)]
pub struct NumericEval {
    pub value: f64,
    pub symbols: HashSet<String>,
}

/// Parse and evaluate LaTeX expression text under the given bindings.
pub fn evaluate_numeric(
    latex: &str,
    bindings: &FxHashMap<String, f64>,
) -> EvalResult<NumericEval> {
    let tree = mitex_parser::parse(latex, DEFAULT_SPEC.clone());

    let mut tokens = Vec::new();
    linearize_node(&tree, &mut tokens)?;

    let mut parser = TokenParser::new(&tokens, bindings);
    let value = parser.parse_expression()?;
    parser.expect_end()?;

    if !value.is_finite() {
        return Err(EvalError::arithmetic(format!(
            "expression produced a non-finite value ({})",
            value
        )));
    }

    Ok(NumericEval {
        value,
        symbols: parser.symbols,
    })
}

// =============================================================================
// Tree linearization
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum MathToken {
    Number(f64),
    Symbol(String),
    Operator(char),
    LParen,
    RParen,
    Function(&'static str),
}

fn linearize_node(node: &SyntaxNode, out: &mut Vec<MathToken>) -> EvalResult<()> {
    for child in node.children_with_tokens() {
        linearize_element(child, out)?;
    }
    Ok(())
}

fn linearize_element(elem: SyntaxElement, out: &mut Vec<MathToken>) -> EvalResult<()> {
    use SyntaxKind::*;

    match elem.kind() {
        TokenError => {
            let text = element_text(&elem);
            Err(EvalError::parse(format!("invalid input '{}'", text.trim())))
        }

        // Containers - recurse
        ScopeRoot | ItemText | ItemParen | ClauseArgument | ItemFormula | ItemTypstCode => {
            if let SyntaxElement::Node(n) = elem {
                linearize_node(&n, out)?;
            }
            Ok(())
        }

        // Curly group acts as parenthesized grouping
        ItemCurly => {
            if let SyntaxElement::Node(n) = elem {
                out.push(MathToken::LParen);
                linearize_node(&n, out)?;
                out.push(MathToken::RParen);
            }
            Ok(())
        }

        // Bracket group likewise (outside command arguments)
        ItemBracket => {
            if let SyntaxElement::Node(n) = elem {
                out.push(MathToken::LParen);
                linearize_node(&n, out)?;
                out.push(MathToken::RParen);
            }
            Ok(())
        }

        // \left...\right
        ItemLR => linearize_lr(elem, out),
        ClauseLR => check_lr_delimiter(elem),

        // Subscript/superscript attachment
        ItemAttachComponent => linearize_attachment(elem, out),

        // Command with arguments
        ItemCmd => linearize_command(elem, out),

        // Zero-argument command symbol
        TokenCommandSym => linearize_command_sym(elem, out),

        // Plain word: numbers, symbols and ASCII operators
        TokenWord => {
            if let SyntaxElement::Token(t) = elem {
                lex_word(t.text(), out)?;
            }
            Ok(())
        }

        // Insignificant in arithmetic
        TokenWhiteSpace | TokenLineBreak | TokenComment | ItemBlockComment | TokenDollar
        | TokenBeginMath | TokenEndMath | TokenTilde | TokenLBrace | TokenRBrace
        | ClauseCommandName => Ok(()),

        TokenLParen => {
            out.push(MathToken::LParen);
            Ok(())
        }
        TokenRParen => {
            out.push(MathToken::RParen);
            Ok(())
        }
        TokenLBracket => {
            out.push(MathToken::LParen);
            Ok(())
        }
        TokenRBracket => {
            out.push(MathToken::RParen);
            Ok(())
        }
        TokenSlash => {
            out.push(MathToken::Operator('/'));
            Ok(())
        }
        TokenAsterisk => {
            out.push(MathToken::Operator('*'));
            Ok(())
        }
        TokenCaret => {
            out.push(MathToken::Operator('^'));
            Ok(())
        }

        TokenUnderscore => Err(EvalError::parse("unexpected subscript")),
        TokenComma => Err(EvalError::parse("unexpected token ','")),
        TokenApostrophe => Err(EvalError::parse("unexpected token '''")),
        TokenSemicolon => Err(EvalError::parse("unexpected token ';'")),
        TokenDitto => Err(EvalError::parse("unexpected token '\"'")),
        TokenAtSign => Err(EvalError::parse("unexpected token '@'")),
        TokenHash => Err(EvalError::parse("unexpected token '#'")),
        TokenAmpersand => Err(EvalError::parse("unexpected token '&'")),
        ItemNewLine => Err(EvalError::parse("unexpected line break")),
        ItemEnv | ItemBegin | ItemEnd => {
            Err(EvalError::parse("environments cannot be evaluated"))
        }
    }
}

fn element_text(elem: &SyntaxElement) -> String {
    match elem {
        SyntaxElement::Node(n) => n.text().to_string(),
        SyntaxElement::Token(t) => t.text().to_string(),
    }
}

/// `\left( ... \right)` becomes a plain parenthesized group. Only bracketing
/// delimiters are accepted; `\left| ... \right|` and friends are not
/// evaluable here.
fn linearize_lr(elem: SyntaxElement, out: &mut Vec<MathToken>) -> EvalResult<()> {
    let node = match elem {
        SyntaxElement::Node(n) => n,
        _ => return Ok(()),
    };

    out.push(MathToken::LParen);
    for child in node.children_with_tokens() {
        match &child {
            SyntaxElement::Node(cn) if cn.kind() == SyntaxKind::ClauseLR => {
                check_lr_delimiter(child.clone())?;
            }
            SyntaxElement::Token(t)
                if t.text().starts_with("\\left") || t.text().starts_with("\\right") =>
            {
                let stripped = t
                    .text()
                    .trim_start_matches("\\left")
                    .trim_start_matches("\\right")
                    .trim();
                if !matches!(stripped, "" | "(" | ")" | "[" | "]" | ".") {
                    return Err(EvalError::parse(format!(
                        "unsupported delimiter '{}'",
                        stripped
                    )));
                }
            }
            SyntaxElement::Token(t) if t.text().trim() == "." => {}
            _ => linearize_element(child, out)?,
        }
    }
    out.push(MathToken::RParen);
    Ok(())
}

fn check_lr_delimiter(elem: SyntaxElement) -> EvalResult<()> {
    if let SyntaxElement::Node(cn) = elem {
        for sub in cn.children_with_tokens() {
            if let SyntaxElement::Token(t) = sub {
                if t.kind() != SyntaxKind::ClauseCommandName {
                    let delim = t.text().trim();
                    if !matches!(delim, "" | "(" | ")" | "[" | "]" | ".") {
                        return Err(EvalError::parse(format!(
                            "unsupported delimiter '{}'",
                            delim
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}

/// Subscripts fold into the preceding symbol (`x_1` stays the composite
/// symbol `x_{1}`); superscripts become the power operator.
fn linearize_attachment(elem: SyntaxElement, out: &mut Vec<MathToken>) -> EvalResult<()> {
    let node = match elem {
        SyntaxElement::Node(n) => n,
        _ => return Ok(()),
    };

    let mut pending: Option<char> = None;
    for child in node.children_with_tokens() {
        match child.kind() {
            SyntaxKind::TokenUnderscore => pending = Some('_'),
            SyntaxKind::TokenCaret => pending = Some('^'),
            SyntaxKind::TokenWhiteSpace | SyntaxKind::TokenLineBreak => {}
            _ => match pending.take() {
                Some('^') => {
                    out.push(MathToken::Operator('^'));
                    out.push(MathToken::LParen);
                    linearize_element(child, out)?;
                    out.push(MathToken::RParen);
                }
                Some(_) => {
                    let script = strip_group(element_text(&child).trim());
                    match out.last_mut() {
                        Some(MathToken::Symbol(name)) => {
                            *name = format!("{}_{{{}}}", name, script);
                        }
                        _ => return Err(EvalError::parse("unexpected subscript")),
                    }
                }
                // Base before the script marker (usually a preceding sibling)
                None => linearize_element(child, out)?,
            },
        }
    }
    Ok(())
}

fn strip_group(text: &str) -> String {
    let text = text.trim();
    if text.len() >= 2 && text.starts_with('{') && text.ends_with('}') {
        text[1..text.len() - 1].trim().to_string()
    } else {
        text.to_string()
    }
}

fn linearize_command(elem: SyntaxElement, out: &mut Vec<MathToken>) -> EvalResult<()> {
    let node = match &elem {
        SyntaxElement::Node(n) => n.clone(),
        _ => return Ok(()),
    };

    let cmd = match CmdItem::cast(node) {
        Some(c) => c,
        None => return Ok(()),
    };

    let full_name = cmd
        .name_tok()
        .map(|t| t.text().to_string())
        .unwrap_or_default();
    let name = full_name.trim_start_matches('\\');

    if name.is_empty() || IGNORED_COMMANDS.contains_key(name) {
        return Ok(());
    }
    if let Some(op) = OPERATOR_COMMANDS.get(name) {
        out.push(MathToken::Operator(*op));
        return Ok(());
    }
    if let Some(placeholder) = CONSTANT_COMMANDS.get(name) {
        out.push(MathToken::Symbol(placeholder.to_string()));
        return Ok(());
    }

    match name {
        "frac" | "dfrac" | "tfrac" => {
            let args = required_args(&cmd);
            if args.len() != 2 {
                return Err(EvalError::parse(format!(
                    "\\{} expects two arguments",
                    name
                )));
            }
            out.push(MathToken::LParen);
            out.push(MathToken::LParen);
            linearize_node(&args[0], out)?;
            out.push(MathToken::RParen);
            out.push(MathToken::Operator('/'));
            out.push(MathToken::LParen);
            linearize_node(&args[1], out)?;
            out.push(MathToken::RParen);
            out.push(MathToken::RParen);
            Ok(())
        }

        "sqrt" => {
            let args = required_args(&cmd);
            if args.len() != 1 {
                return Err(EvalError::parse("\\sqrt expects one argument"));
            }
            match optional_arg(&cmd) {
                // \sqrt[n]{x} is x^(1/n)
                Some(index) => {
                    out.push(MathToken::LParen);
                    out.push(MathToken::LParen);
                    linearize_node(&args[0], out)?;
                    out.push(MathToken::RParen);
                    out.push(MathToken::Operator('^'));
                    out.push(MathToken::LParen);
                    out.push(MathToken::Number(1.0));
                    out.push(MathToken::Operator('/'));
                    out.push(MathToken::LParen);
                    linearize_node(&index, out)?;
                    out.push(MathToken::RParen);
                    out.push(MathToken::RParen);
                    out.push(MathToken::RParen);
                }
                None => {
                    out.push(MathToken::Function("sqrt"));
                    out.push(MathToken::LParen);
                    linearize_node(&args[0], out)?;
                    out.push(MathToken::RParen);
                }
            }
            Ok(())
        }

        "operatorname" => {
            let args = required_args(&cmd);
            let op_name = args
                .first()
                .map(|a| strip_group(a.text().to_string().trim()))
                .unwrap_or_default();
            match UNARY_FUNCTIONS.get_key(op_name.as_str()) {
                Some(key) => {
                    out.push(MathToken::Function(*key));
                    Ok(())
                }
                None => Err(EvalError::parse(format!(
                    "unsupported operator '{}'",
                    op_name
                ))),
            }
        }

        // \color{...} only carries its color argument; content follows as
        // siblings. \textcolor{...}{content} keeps its second argument.
        "color" => Ok(()),
        "textcolor" => {
            let args = required_args(&cmd);
            if args.len() >= 2 {
                out.push(MathToken::LParen);
                for arg in &args[1..] {
                    linearize_node(arg, out)?;
                }
                out.push(MathToken::RParen);
            }
            Ok(())
        }

        _ => {
            if let Some(key) = UNARY_FUNCTIONS.get_key(name) {
                out.push(MathToken::Function(*key));
                let args = required_args(&cmd);
                if !args.is_empty() {
                    out.push(MathToken::LParen);
                    for arg in &args {
                        linearize_node(arg, out)?;
                    }
                    out.push(MathToken::RParen);
                }
                return Ok(());
            }
            if TRANSPARENT_COMMANDS.get(name) == Some(&true) {
                let args = required_args(&cmd);
                out.push(MathToken::LParen);
                for arg in &args {
                    linearize_node(arg, out)?;
                }
                out.push(MathToken::RParen);
                return Ok(());
            }
            Err(EvalError::parse(format!(
                "unsupported command '\\{}'",
                name
            )))
        }
    }
}

fn linearize_command_sym(elem: SyntaxElement, out: &mut Vec<MathToken>) -> EvalResult<()> {
    let t = match elem {
        SyntaxElement::Token(t) => t,
        _ => return Ok(()),
    };
    let full_name = t.text().to_string();
    let name = full_name.trim_start_matches('\\');

    if name.is_empty() || IGNORED_COMMANDS.contains_key(name) {
        return Ok(());
    }
    if let Some(op) = OPERATOR_COMMANDS.get(name) {
        out.push(MathToken::Operator(*op));
        return Ok(());
    }
    if let Some(placeholder) = CONSTANT_COMMANDS.get(name) {
        out.push(MathToken::Symbol(placeholder.to_string()));
        return Ok(());
    }
    if let Some(key) = UNARY_FUNCTIONS.get_key(name) {
        out.push(MathToken::Function(*key));
        return Ok(());
    }
    if matches!(name, "left" | "right") {
        return Ok(());
    }

    // Anything else stays a free symbol; unbound symbols fail later with
    // a precise name (`\alpha`, `\beta`, ...).
    out.push(MathToken::Symbol(full_name));
    Ok(())
}

/// Required arguments of a command: curly `ClauseArgument` children in
/// order.
fn required_args(cmd: &CmdItem) -> Vec<SyntaxNode> {
    cmd.syntax()
        .children()
        .filter(|c| {
            c.kind() == SyntaxKind::ClauseArgument
                && c.children().any(|g| g.kind() == SyntaxKind::ItemCurly)
        })
        .collect()
}

fn optional_arg(cmd: &CmdItem) -> Option<SyntaxNode> {
    cmd.syntax().children().find(|c| {
        c.kind() == SyntaxKind::ClauseArgument
            && c.children().any(|g| g.kind() == SyntaxKind::ItemBracket)
    })
}

/// Sub-lex a word token: digit runs become numbers, alphabetic runs become
/// symbols, the rest must be ASCII operators.
fn lex_word(text: &str, out: &mut Vec<MathToken>) -> EvalResult<()> {
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() || c == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let run: String = chars[start..i].iter().collect();
            let value = run
                .parse::<f64>()
                .map_err(|_| EvalError::parse(format!("invalid number '{}'", run)))?;
            out.push(MathToken::Number(value));
        } else if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_alphabetic() {
                i += 1;
            }
            out.push(MathToken::Symbol(chars[start..i].iter().collect()));
        } else {
            match c {
                '+' | '-' | '*' | '/' | '^' | '!' => out.push(MathToken::Operator(c)),
                ' ' | '\t' => {}
                _ => {
                    return Err(EvalError::parse(format!("unexpected token '{}'", c)));
                }
            }
            i += 1;
        }
    }
    Ok(())
}

// =============================================================================
// Precedence-climbing evaluation
// =============================================================================

struct TokenParser<'a> {
    tokens: &'a [MathToken],
    pos: usize,
    bindings: &'a FxHashMap<String, f64>,
    symbols: HashSet<String>,
}

impl<'a> TokenParser<'a> {
    fn new(tokens: &'a [MathToken], bindings: &'a FxHashMap<String, f64>) -> Self {
        Self {
            tokens,
            pos: 0,
            bindings,
            symbols: HashSet::new(),
        }
    }

    fn peek(&self) -> Option<&MathToken> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&MathToken> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect_end(&self) -> EvalResult<()> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(EvalError::parse("unexpected trailing input"))
        }
    }

    fn parse_expression(&mut self) -> EvalResult<f64> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> EvalResult<f64> {
        let mut value = self.parse_multiplicative()?;
        loop {
            match self.peek() {
                Some(MathToken::Operator('+')) => {
                    self.bump();
                    value += self.parse_multiplicative()?;
                }
                Some(MathToken::Operator('-')) => {
                    self.bump();
                    value -= self.parse_multiplicative()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_multiplicative(&mut self) -> EvalResult<f64> {
        let mut value = self.parse_unary()?;
        loop {
            match self.peek() {
                Some(MathToken::Operator('*')) => {
                    self.bump();
                    value *= self.parse_unary()?;
                }
                Some(MathToken::Operator('/')) => {
                    self.bump();
                    value /= self.parse_unary()?;
                }
                // Juxtaposition is multiplication: `2x`, `2\pi`, `(a)(b)`
                Some(MathToken::Number(_))
                | Some(MathToken::Symbol(_))
                | Some(MathToken::Function(_))
                | Some(MathToken::LParen) => {
                    value *= self.parse_unary()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_unary(&mut self) -> EvalResult<f64> {
        match self.peek() {
            Some(MathToken::Operator('-')) => {
                self.bump();
                Ok(-self.parse_unary()?)
            }
            Some(MathToken::Operator('+')) => {
                self.bump();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> EvalResult<f64> {
        let base = self.parse_postfix()?;
        if let Some(MathToken::Operator('^')) = self.peek() {
            self.bump();
            // Right-associative; the exponent may carry its own sign
            let exponent = self.parse_unary()?;
            Ok(base.powf(exponent))
        } else {
            Ok(base)
        }
    }

    fn parse_postfix(&mut self) -> EvalResult<f64> {
        let mut value = self.parse_primary()?;
        while let Some(MathToken::Operator('!')) = self.peek() {
            self.bump();
            value = factorial(value)?;
        }
        Ok(value)
    }

    fn parse_primary(&mut self) -> EvalResult<f64> {
        match self.bump().cloned() {
            Some(MathToken::Number(value)) => Ok(value),
            Some(MathToken::Symbol(name)) => self.resolve_symbol(&name),
            Some(MathToken::Function(name)) => {
                let func = UNARY_FUNCTIONS
                    .get(name)
                    .ok_or_else(|| EvalError::parse(format!("unknown function '{}'", name)))?;
                let arg = self.parse_unary()?;
                Ok(func(arg))
            }
            Some(MathToken::LParen) => {
                let value = self.parse_additive()?;
                match self.bump() {
                    Some(MathToken::RParen) => Ok(value),
                    _ => Err(EvalError::parse("missing closing parenthesis")),
                }
            }
            Some(other) => Err(EvalError::parse(format!(
                "unexpected token {:?}",
                other
            ))),
            None => Err(EvalError::parse("unexpected end of expression")),
        }
    }

    fn resolve_symbol(&mut self, name: &str) -> EvalResult<f64> {
        if let Some(value) = self.bindings.get(name) {
            self.symbols.insert(name.to_string());
            return Ok(*value);
        }
        if let Some(value) = CONSTANTS.get(name) {
            return Ok(*value);
        }
        if let Some(value) = COMMAND_CONSTANTS.get(name) {
            return Ok(*value);
        }
        self.symbols.insert(name.to_string());
        Err(EvalError::unknown_symbol(name))
    }
}

fn factorial(value: f64) -> EvalResult<f64> {
    if value < 0.0 || value.fract() != 0.0 || value > 170.0 {
        return Err(EvalError::arithmetic(format!(
            "factorial of invalid operand {}",
            value
        )));
    }
    let mut result = 1.0;
    let mut n = 2.0;
    while n <= value {
        result *= n;
        n += 1.0;
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(latex: &str) -> EvalResult<NumericEval> {
        evaluate_numeric(latex, &FxHashMap::default())
    }

    fn eval_with(latex: &str, bindings: &[(&str, f64)]) -> EvalResult<NumericEval> {
        let map: FxHashMap<String, f64> = bindings
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect();
        evaluate_numeric(latex, &map)
    }

    #[test]
    fn test_plain_arithmetic() {
        assert_eq!(eval("1 + 2 * 3").unwrap().value, 7.0);
        assert_eq!(eval("(1 + 2) * 3").unwrap().value, 9.0);
        assert_eq!(eval("10 / 4").unwrap().value, 2.5);
        assert_eq!(eval("2 - 5").unwrap().value, -3.0);
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval("-3 + 5").unwrap().value, 2.0);
        assert_eq!(eval("2 * -3").unwrap().value, -6.0);
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_eq!(eval("2^3").unwrap().value, 8.0);
        assert_eq!(eval("2^{3}").unwrap().value, 8.0);
        assert_eq!(eval("2^{3^2}").unwrap().value, 512.0);
        assert_eq!(eval("2^{-1}").unwrap().value, 0.5);
    }

    #[test]
    fn test_frac() {
        assert_eq!(eval(r"\frac{1}{2}").unwrap().value, 0.5);
        assert_eq!(eval(r"\frac{1 + 1}{4}").unwrap().value, 0.5);
        assert_eq!(eval(r"1 + \frac{1}{2}").unwrap().value, 1.5);
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(eval(r"\sqrt{9}").unwrap().value, 3.0);
        assert_eq!(eval(r"\sqrt[3]{27}").unwrap().value, 27f64.powf(1.0 / 3.0));
    }

    #[test]
    fn test_cdot_and_times() {
        assert_eq!(eval(r"2 \cdot 3").unwrap().value, 6.0);
        assert_eq!(eval(r"2 \times 3").unwrap().value, 6.0);
        assert_eq!(eval(r"6 \div 3").unwrap().value, 2.0);
    }

    #[test]
    fn test_implicit_multiplication() {
        assert_eq!(eval_with("2x", &[("x", 5.0)]).unwrap().value, 10.0);
        assert_eq!(eval("2(3 + 1)").unwrap().value, 8.0);
        assert_eq!(eval("(2)(3)").unwrap().value, 6.0);
    }

    #[test]
    fn test_constants() {
        let pi = eval("PI").unwrap();
        assert!((pi.value - std::f64::consts::PI).abs() < 1e-12);
        assert!(pi.symbols.is_empty(), "constants are not free symbols");
        assert_eq!(eval("{PI}").unwrap().value, std::f64::consts::PI);

        let two_pi = eval("2{PI}").unwrap().value;
        assert!((two_pi - std::f64::consts::TAU).abs() < 1e-12);
    }

    #[test]
    fn test_functions() {
        assert!((eval(r"\sin{0}").unwrap().value).abs() < 1e-12);
        assert!((eval(r"\cos 0").unwrap().value - 1.0).abs() < 1e-12);
        assert!((eval(r"\ln{1}").unwrap().value).abs() < 1e-12);
        // \sin applies to the immediate operand, not the product
        let v = eval(r"\sin{0} + 1").unwrap().value;
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bound_symbols_are_reported() {
        let result = eval_with("n * 2", &[("n", 5.0)]).unwrap();
        assert_eq!(result.value, 10.0);
        assert!(result.symbols.contains("n"));
        assert_eq!(result.symbols.len(), 1);
    }

    #[test]
    fn test_symbols_are_maximal_runs() {
        // `xy` is one symbol; binding `y` alone leaves it unbound
        let err = eval_with("xy", &[("y", 2.0)]).unwrap_err();
        assert_eq!(err, EvalError::unknown_symbol("xy"));
    }

    #[test]
    fn test_unknown_symbol_fails() {
        let err = eval("q + 1").unwrap_err();
        assert_eq!(err, EvalError::unknown_symbol("q"));
    }

    #[test]
    fn test_unknown_command_symbol_fails_with_name() {
        let err = eval(r"\alpha + 1").unwrap_err();
        assert_eq!(err, EvalError::unknown_symbol("\\alpha"));
    }

    #[test]
    fn test_division_by_zero_is_arithmetic_error() {
        assert!(matches!(
            eval("1 / 0").unwrap_err(),
            EvalError::ArithmeticError { .. }
        ));
        assert!(matches!(
            eval(r"\frac{1}{0}").unwrap_err(),
            EvalError::ArithmeticError { .. }
        ));
    }

    #[test]
    fn test_malformed_input_fails() {
        assert!(eval("").is_err());
        assert!(eval("2 +").is_err());
        assert!(eval("(2").is_err());
        assert!(eval("2,5").is_err());
        assert!(eval(r"\sum_{i=1}^n i").is_err());
    }

    #[test]
    fn test_factorial() {
        assert_eq!(eval("5!").unwrap().value, 120.0);
        assert_eq!(eval("0!").unwrap().value, 1.0);
        assert!(eval("(-1)!").is_err());
    }

    #[test]
    fn test_left_right_delimiters() {
        assert_eq!(eval(r"\left( 1 + 2 \right) * 3").unwrap().value, 9.0);
    }

    #[test]
    fn test_spacing_commands_are_ignored() {
        assert_eq!(eval(r"1 \, + \quad 2").unwrap().value, 3.0);
    }

    #[test]
    fn test_styling_wrappers_are_transparent() {
        assert_eq!(eval(r"\mathrm{2} + 1").unwrap().value, 3.0);
    }
}
