//! Incremental expression editor
//!
//! Owns the arithmetic expression under construction as a sequence of typed
//! tokens, with the operand currently being typed kept as a suffix view of
//! the whole expression. Unary rewrites (√, x²) are carried as tokens that
//! record both the original operand and its computed replacement, so the
//! three renderings the calculator needs (what the user typed with markers
//! visible, the history line with markers stripped, and the evaluator input
//! with markers resolved to computed values) are all projections of one
//! structure instead of regex surgery on a display string.

use crate::{evaluator, Error, Result};

/// Binary calculator operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    /// Addition
    Add,
    /// Subtraction
    Subtract,
    /// Multiplication (displayed `×`, evaluated `*`)
    Multiply,
    /// Division (displayed `÷`, evaluated `/`)
    Divide,
}

impl BinOp {
    /// Keypad/display glyph.
    pub fn glyph(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '×',
            Self::Divide => '÷',
        }
    }

    fn ascii(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }
}

/// Unary functions that rewrite the current operand in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryFunc {
    /// Square root (`√x`)
    Sqrt,
    /// Square (`x²`)
    Square,
}

impl UnaryFunc {
    fn marker(self, original: &str) -> String {
        match self {
            Self::Sqrt => format!("√{original}"),
            Self::Square => format!("{original}²"),
        }
    }
}

/// One element of the expression under construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal being (or finished being) typed, including any
    /// unary minus and decimal point.
    Number(String),
    /// A binary operator.
    Op(BinOp),
    /// Opening parenthesis.
    Open,
    /// Closing parenthesis.
    Close,
    /// An operand replaced by one or more unary-function applications.
    /// `steps` records each application's original text in order;
    /// `computed` is the live replacement value the user keeps editing.
    Rewrite {
        /// Applied functions with the operand text each one consumed.
        steps: Vec<(UnaryFunc, String)>,
        /// The current computed value (still editable: digits, dot, sign).
        computed: String,
    },
}

/// Kind of the most recently entered token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LastToken {
    /// Nothing entered yet (or just cleared).
    #[default]
    None,
    /// A digit (or operand edit) came last.
    Digit,
    /// A binary operator came last.
    Operator,
    /// An opening parenthesis came last.
    OpenParen,
    /// A closing parenthesis came last.
    CloseParen,
    /// Equals was just evaluated; the next edit starts a fresh expression.
    Equals,
}

/// What a backspace removed, so the caller can keep the covert PIN buffer
/// in step with the visible operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backspace {
    /// A digit or decimal point of the current operand.
    RemovedDigit,
    /// Anything else (operator, parenthesis, rewrite).
    RemovedOther,
    /// Nothing to remove.
    Empty,
}

/// A completed calculation, ready for history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calculation {
    /// The expression as the user saw it (markers stripped, parens left
    /// exactly as typed).
    pub expression: String,
    /// The formatted result.
    pub result: String,
}

/// The mutable expression-under-construction state machine.
#[derive(Debug, Default)]
pub struct ExpressionEditor {
    tokens: Vec<Token>,
    current: String,
    has_decimal: bool,
    open_parens: u32,
    last_token: LastToken,
}

impl ExpressionEditor {
    /// New empty editor.
    pub fn new() -> Self {
        Self::default()
    }

    /// The operand currently being typed (may carry a unary minus).
    pub fn current_operand(&self) -> &str {
        &self.current
    }

    /// Kind of the last entered token.
    pub fn last_token(&self) -> LastToken {
        self.last_token
    }

    /// Count of parentheses still open.
    pub fn open_parens(&self) -> u32 {
        self.open_parens
    }

    /// True when nothing has been entered.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The expression exactly as built, rewrite markers visible
    /// (`√5→2.2360679775`).
    pub fn expression_raw(&self) -> String {
        self.render(Projection::Raw)
    }

    /// The expression with rewrite markers stripped to what was typed
    /// (`√5`). This is the history/expression-line form.
    pub fn expression_clean(&self) -> String {
        self.render(Projection::Clean)
    }

    /// What the main display line shows: the clean expression, or "0" when
    /// empty.
    pub fn display_text(&self) -> String {
        let text = self.expression_clean();
        if text.is_empty() {
            "0".to_string()
        } else {
            text
        }
    }

    /// Type a digit. Returns false when the digit was suppressed (a
    /// redundant leading zero) and therefore must not feed the PIN
    /// observer.
    pub fn digit(&mut self, d: char) -> bool {
        debug_assert!(d.is_ascii_digit());
        self.reset_after_equals();

        // No leading-zero runs: "0" on a lone "0" is dropped, a non-zero
        // digit replaces it.
        if self.current == "0" {
            if d == '0' {
                return false;
            }
            self.current.clear();
            match self.tokens.last_mut() {
                Some(Token::Number(s)) => {
                    s.pop();
                }
                Some(Token::Rewrite { computed, .. }) => {
                    computed.pop();
                }
                _ => {}
            }
        }

        self.current.push(d);
        self.push_operand_char(d);
        self.last_token = LastToken::Digit;
        true
    }

    /// The `00` key: both zeros entered as one chunk. Returns false when
    /// suppressed (operand is a lone "0").
    pub fn double_zero(&mut self) -> bool {
        self.reset_after_equals();
        if self.current == "0" {
            return false;
        }
        self.current.push_str("00");
        self.push_operand_char('0');
        self.push_operand_char('0');
        self.last_token = LastToken::Digit;
        true
    }

    /// Append a binary operator. A minus at the start of the expression or
    /// right after `(` begins a negative operand instead; a trailing
    /// operator is replaced, never doubled.
    pub fn operator(&mut self, op: BinOp) {
        if self.last_token == LastToken::Equals {
            // Seed the new expression with the previous result so the user
            // can chain off it.
            let seed = std::mem::take(&mut self.current);
            self.tokens.push(Token::Number(seed.clone()));
            self.current = seed;
            self.last_token = LastToken::Digit;
        }

        if op == BinOp::Subtract
            && (self.tokens.is_empty() || self.last_token == LastToken::OpenParen)
        {
            self.current.push('-');
            self.tokens.push(Token::Number("-".to_string()));
            self.last_token = LastToken::Digit;
            return;
        }

        if self.tokens.is_empty() {
            return;
        }

        if self.last_token == LastToken::Operator {
            self.tokens.pop();
        }
        self.tokens.push(Token::Op(op));
        self.current.clear();
        self.has_decimal = false;
        self.last_token = LastToken::Operator;
    }

    /// Type the decimal point. Returns false when rejected (the operand
    /// already has one); an empty operand gains a leading zero so ".5"
    /// reads "0.5".
    pub fn dot(&mut self) -> bool {
        if self.has_decimal {
            return false;
        }
        self.reset_after_equals();

        if self.current.is_empty() {
            self.current.push('0');
            self.push_operand_char('0');
        }
        self.current.push('.');
        self.push_operand_char('.');
        self.has_decimal = true;
        self.last_token = LastToken::Digit;
        true
    }

    /// Square root of the current operand.
    pub fn sqrt(&mut self) -> Result<()> {
        self.unary(UnaryFunc::Sqrt)
    }

    /// Square of the current operand.
    pub fn square(&mut self) -> Result<()> {
        self.unary(UnaryFunc::Square)
    }

    /// Percent: divides the current operand by 100, replacing its text in
    /// place with no rewrite marker, matching the on-disk history format.
    pub fn percent(&mut self) -> Result<()> {
        if self.current.is_empty() {
            return Ok(());
        }
        let value = self.parse_operand()?;
        let computed = evaluator::format_result(value / 100.0)?;
        self.replace_operand_text(&computed);
        self.set_current(computed);
        Ok(())
    }

    fn unary(&mut self, func: UnaryFunc) -> Result<()> {
        if self.current.is_empty() {
            return Ok(());
        }
        let value = self.parse_operand()?;
        if func == UnaryFunc::Sqrt && value < 0.0 {
            return Err(Error::InvalidOperand(
                "square root of a negative number".to_string(),
            ));
        }
        let result = match func {
            UnaryFunc::Sqrt => value.sqrt(),
            UnaryFunc::Square => value * value,
        };
        let computed = evaluator::format_result(result)?;

        let rewritten = match self.tokens.pop() {
            Some(Token::Number(original)) => Token::Rewrite {
                steps: vec![(func, original)],
                computed: computed.clone(),
            },
            Some(Token::Rewrite {
                mut steps,
                computed: prev,
            }) => {
                steps.push((func, prev));
                Token::Rewrite {
                    steps,
                    computed: computed.clone(),
                }
            }
            // Operand present but no token backing it: chaining a unary
            // function straight off an equals result.
            other => {
                if let Some(token) = other {
                    self.tokens.push(token);
                }
                Token::Rewrite {
                    steps: vec![(func, std::mem::take(&mut self.current))],
                    computed: computed.clone(),
                }
            }
        };
        self.tokens.push(rewritten);
        self.set_current(computed);
        Ok(())
    }

    /// Remove one trailing character (rewrite tokens are atomic and come
    /// off whole).
    pub fn backspace(&mut self) -> Backspace {
        if self.last_token == LastToken::Equals {
            // Backing out of a result drops the chaining seed.
            self.current.clear();
            self.has_decimal = false;
            self.last_token = LastToken::None;
            return Backspace::Empty;
        }

        let outcome = match self.tokens.last_mut() {
            None => return Backspace::Empty,
            Some(Token::Number(s)) => {
                let removed = s.pop();
                if s.is_empty() {
                    self.tokens.pop();
                }
                self.current.pop();
                if removed == Some('.') {
                    self.has_decimal = false;
                }
                Backspace::RemovedDigit
            }
            Some(Token::Op(_)) => {
                self.tokens.pop();
                self.rebuild_operand();
                Backspace::RemovedOther
            }
            Some(Token::Open) => {
                self.tokens.pop();
                self.open_parens = self.open_parens.saturating_sub(1);
                Backspace::RemovedOther
            }
            Some(Token::Close) => {
                self.tokens.pop();
                self.open_parens += 1;
                Backspace::RemovedOther
            }
            Some(Token::Rewrite { .. }) => {
                self.tokens.pop();
                self.rebuild_operand();
                Backspace::RemovedOther
            }
        };
        self.last_token = self.tail_kind();
        outcome
    }

    /// Open a parenthesis; a completed operand or `)` before it gets an
    /// implicit `×` (juxtaposition multiplies).
    pub fn open_paren(&mut self) {
        self.reset_after_equals();
        if !self.current.is_empty() || self.last_token == LastToken::CloseParen {
            self.tokens.push(Token::Op(BinOp::Multiply));
        }
        self.tokens.push(Token::Open);
        self.open_parens += 1;
        self.current.clear();
        self.has_decimal = false;
        self.last_token = LastToken::OpenParen;
    }

    /// Close a parenthesis; ignored unless one is open and the last token
    /// is not an operator.
    pub fn close_paren(&mut self) {
        if self.open_parens == 0 || self.last_token == LastToken::Operator {
            return;
        }
        self.tokens.push(Token::Close);
        self.open_parens -= 1;
        self.current.clear();
        self.has_decimal = false;
        self.last_token = LastToken::CloseParen;
    }

    /// Toggle a leading minus on the current operand.
    pub fn toggle_sign(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let toggled = if let Some(rest) = self.current.strip_prefix('-') {
            rest.to_string()
        } else {
            format!("-{}", self.current)
        };
        if self.last_token == LastToken::Equals {
            // Flip the chaining seed and materialize it as an expression.
            self.tokens.push(Token::Number(toggled.clone()));
        } else {
            self.replace_operand_text(&toggled);
        }
        self.set_current(toggled);
    }

    /// Reset all state.
    pub fn clear(&mut self) {
        self.tokens.clear();
        self.current.clear();
        self.has_decimal = false;
        self.open_parens = 0;
        self.last_token = LastToken::None;
    }

    /// Evaluate the expression. Open parentheses are auto-closed for
    /// evaluation only; the returned history entry shows the expression as
    /// typed. On failure the editor state is left untouched so the user can
    /// correct it. Returns `None` when there is nothing to evaluate.
    pub fn equals(&mut self) -> Result<Option<Calculation>> {
        if self.tokens.is_empty() {
            return Ok(None);
        }

        let expression = self.expression_clean();

        let mut evaluable = self.render(Projection::Evaluable);
        for _ in 0..self.open_parens {
            evaluable.push(')');
        }

        let value = evaluator::evaluate(&evaluable)?;
        let result = evaluator::format_result(value)?;

        // Keep only the result as a chaining seed; the expression itself is
        // cleared so continued typing cannot corrupt the recorded original.
        self.tokens.clear();
        self.open_parens = 0;
        self.set_current(result.clone());
        self.last_token = LastToken::Equals;

        Ok(Some(Calculation { expression, result }))
    }

    // ---- internals ----

    fn reset_after_equals(&mut self) {
        if self.last_token == LastToken::Equals {
            self.tokens.clear();
            self.current.clear();
            self.has_decimal = false;
            self.last_token = LastToken::None;
        }
    }

    /// Append one operand character to the token tail, extending an open
    /// number or rewrite value, or starting a new number token.
    fn push_operand_char(&mut self, c: char) {
        match self.tokens.last_mut() {
            Some(Token::Number(s)) => s.push(c),
            Some(Token::Rewrite { computed, .. }) => computed.push(c),
            _ => self.tokens.push(Token::Number(c.to_string())),
        }
    }

    /// Replace the text of the operand's backing token (number text or
    /// rewrite computed value).
    fn replace_operand_text(&mut self, text: &str) {
        match self.tokens.last_mut() {
            Some(Token::Number(s)) => *s = text.to_string(),
            Some(Token::Rewrite { computed, .. }) => *computed = text.to_string(),
            _ => self.tokens.push(Token::Number(text.to_string())),
        }
    }

    fn set_current(&mut self, text: String) {
        self.has_decimal = text.contains('.');
        self.current = text;
        self.last_token = LastToken::Digit;
    }

    /// After removing an operator or rewrite, the operand is whatever
    /// number (or computed value) now ends the expression.
    fn rebuild_operand(&mut self) {
        self.current = match self.tokens.last() {
            Some(Token::Number(s)) => s.clone(),
            Some(Token::Rewrite { computed, .. }) => computed.clone(),
            _ => String::new(),
        };
        self.has_decimal = self.current.contains('.');
    }

    fn tail_kind(&self) -> LastToken {
        match self.tokens.last() {
            None => LastToken::None,
            Some(Token::Number(_) | Token::Rewrite { .. }) => LastToken::Digit,
            Some(Token::Op(_)) => LastToken::Operator,
            Some(Token::Open) => LastToken::OpenParen,
            Some(Token::Close) => LastToken::CloseParen,
        }
    }

    fn parse_operand(&self) -> Result<f64> {
        self.current
            .parse()
            .map_err(|_| Error::InvalidOperand(format!("not a number: '{}'", self.current)))
    }

    fn render(&self, projection: Projection) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Number(s) => out.push_str(s),
                Token::Op(op) => out.push(match projection {
                    Projection::Evaluable => op.ascii(),
                    _ => op.glyph(),
                }),
                Token::Open => out.push('('),
                Token::Close => out.push(')'),
                Token::Rewrite { steps, computed } => match projection {
                    Projection::Raw => {
                        for (func, original) in steps {
                            out.push_str(&func.marker(original));
                            out.push('→');
                        }
                        out.push_str(computed);
                    }
                    Projection::Clean => {
                        for (func, original) in steps {
                            out.push_str(&func.marker(original));
                        }
                    }
                    Projection::Evaluable => out.push_str(computed),
                },
            }
        }
        out
    }
}

#[derive(Clone, Copy)]
enum Projection {
    Raw,
    Clean,
    Evaluable,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_digits(editor: &mut ExpressionEditor, digits: &str) {
        for d in digits.chars() {
            editor.digit(d);
        }
    }

    #[test]
    fn test_digits_build_operand_and_expression() {
        let mut editor = ExpressionEditor::new();
        type_digits(&mut editor, "123");
        assert_eq!(editor.expression_raw(), "123");
        assert_eq!(editor.current_operand(), "123");
        assert_eq!(editor.last_token(), LastToken::Digit);
    }

    #[test]
    fn test_operand_is_suffix_of_expression() {
        let mut editor = ExpressionEditor::new();
        type_digits(&mut editor, "12");
        editor.operator(BinOp::Add);
        type_digits(&mut editor, "34");
        assert_eq!(editor.expression_raw(), "12+34");
        assert!(editor.expression_raw().ends_with(editor.current_operand()));
    }

    #[test]
    fn test_leading_zero_suppression() {
        let mut editor = ExpressionEditor::new();
        assert!(editor.digit('0'));
        assert!(!editor.digit('0')); // redundant, suppressed
        assert!(editor.digit('7')); // replaces the lone zero
        assert_eq!(editor.expression_raw(), "7");
        assert_eq!(editor.current_operand(), "7");
    }

    #[test]
    fn test_nonzero_replaces_zero_valued_rewrite() {
        let mut editor = ExpressionEditor::new();
        editor.digit('0');
        editor.sqrt().unwrap();
        assert_eq!(editor.expression_raw(), "√0→0");
        // A computed zero is replaced just like a typed one.
        assert!(editor.digit('7'));
        assert_eq!(editor.expression_raw(), "√0→7");
        assert_eq!(editor.current_operand(), "7");
    }

    #[test]
    fn test_double_zero() {
        let mut editor = ExpressionEditor::new();
        editor.digit('5');
        assert!(editor.double_zero());
        assert_eq!(editor.expression_raw(), "500");
        assert_eq!(editor.current_operand(), "500");
        // Suppressed on a lone zero, like a plain zero.
        editor.clear();
        editor.digit('0');
        assert!(!editor.double_zero());
        assert_eq!(editor.expression_raw(), "0");
    }

    #[test]
    fn test_operator_replaces_trailing_operator() {
        let mut editor = ExpressionEditor::new();
        editor.digit('2');
        editor.operator(BinOp::Add);
        editor.operator(BinOp::Add);
        editor.digit('3');
        assert_eq!(editor.expression_raw(), "2+3");
        editor.clear();
        editor.digit('2');
        editor.operator(BinOp::Add);
        editor.operator(BinOp::Multiply);
        assert_eq!(editor.expression_raw(), "2×");
    }

    #[test]
    fn test_operator_on_empty_expression_is_ignored() {
        let mut editor = ExpressionEditor::new();
        editor.operator(BinOp::Add);
        assert!(editor.is_empty());
    }

    #[test]
    fn test_leading_minus_starts_negative_operand() {
        let mut editor = ExpressionEditor::new();
        editor.operator(BinOp::Subtract);
        editor.digit('5');
        assert_eq!(editor.expression_raw(), "-5");
        assert_eq!(editor.current_operand(), "-5");

        editor.clear();
        editor.open_paren();
        editor.operator(BinOp::Subtract);
        editor.digit('3');
        assert_eq!(editor.expression_raw(), "(-3");
        assert_eq!(editor.current_operand(), "-3");
    }

    #[test]
    fn test_dot_rules() {
        let mut editor = ExpressionEditor::new();
        assert!(editor.dot()); // empty operand gains a leading zero
        assert_eq!(editor.expression_raw(), "0.");
        editor.digit('5');
        assert!(!editor.dot()); // second point rejected
        assert_eq!(editor.expression_raw(), "0.5");
        assert_eq!(editor.current_operand(), "0.5");
    }

    #[test]
    fn test_sqrt_rewrite() {
        let mut editor = ExpressionEditor::new();
        editor.digit('5');
        editor.sqrt().unwrap();
        assert_eq!(editor.expression_raw(), "√5→2.2360679775");
        assert_eq!(editor.expression_clean(), "√5");
        assert_eq!(editor.current_operand(), "2.2360679775");
    }

    #[test]
    fn test_square_rewrite_chains_into_expression() {
        let mut editor = ExpressionEditor::new();
        editor.digit('5');
        editor.square().unwrap();
        assert_eq!(editor.expression_raw(), "5²→25");
        assert_eq!(editor.current_operand(), "25");
        editor.operator(BinOp::Add);
        editor.digit('1');
        let calc = editor.equals().unwrap().unwrap();
        assert_eq!(calc.expression, "5²+1");
        assert_eq!(calc.result, "26");
    }

    #[test]
    fn test_stacked_unary_functions() {
        let mut editor = ExpressionEditor::new();
        editor.digit('5');
        editor.square().unwrap();
        editor.sqrt().unwrap();
        assert_eq!(editor.expression_raw(), "5²→√25→5");
        assert_eq!(editor.current_operand(), "5");
    }

    #[test]
    fn test_sqrt_of_negative_is_rejected_without_state_change() {
        let mut editor = ExpressionEditor::new();
        editor.operator(BinOp::Subtract);
        editor.digit('4');
        let before = editor.expression_raw();
        assert!(matches!(editor.sqrt(), Err(Error::InvalidOperand(_))));
        assert_eq!(editor.expression_raw(), before);
        assert_eq!(editor.current_operand(), "-4");
    }

    #[test]
    fn test_percent_replaces_in_place_without_marker() {
        let mut editor = ExpressionEditor::new();
        type_digits(&mut editor, "50");
        editor.percent().unwrap();
        assert_eq!(editor.expression_raw(), "0.5");
        assert_eq!(editor.expression_clean(), "0.5");
        assert_eq!(editor.current_operand(), "0.5");
    }

    #[test]
    fn test_unary_on_empty_operand_is_noop() {
        let mut editor = ExpressionEditor::new();
        editor.digit('2');
        editor.operator(BinOp::Add);
        editor.sqrt().unwrap();
        editor.percent().unwrap();
        assert_eq!(editor.expression_raw(), "2+");
    }

    #[test]
    fn test_backspace_digits_then_operator_rebuilds_operand() {
        let mut editor = ExpressionEditor::new();
        type_digits(&mut editor, "12");
        editor.operator(BinOp::Add);
        editor.digit('7');
        assert_eq!(editor.backspace(), Backspace::RemovedDigit);
        assert_eq!(editor.expression_raw(), "12+");
        assert_eq!(editor.current_operand(), "");
        assert_eq!(editor.backspace(), Backspace::RemovedOther);
        assert_eq!(editor.expression_raw(), "12");
        assert_eq!(editor.current_operand(), "12");
        assert_eq!(editor.last_token(), LastToken::Digit);
    }

    #[test]
    fn test_backspace_over_decimal_point_clears_flag() {
        let mut editor = ExpressionEditor::new();
        editor.digit('3');
        editor.dot();
        editor.backspace();
        assert!(editor.dot()); // point accepted again
        assert_eq!(editor.expression_raw(), "3.");
    }

    #[test]
    fn test_backspace_over_parens_adjusts_count() {
        let mut editor = ExpressionEditor::new();
        editor.open_paren();
        editor.digit('2');
        editor.close_paren();
        assert_eq!(editor.open_parens(), 0);
        editor.backspace(); // removes ')'
        assert_eq!(editor.open_parens(), 1);
        editor.backspace(); // removes '2'
        editor.backspace(); // removes '('
        assert_eq!(editor.open_parens(), 0);
        assert!(editor.is_empty());
    }

    #[test]
    fn test_backspace_removes_rewrite_whole() {
        let mut editor = ExpressionEditor::new();
        type_digits(&mut editor, "12");
        editor.operator(BinOp::Add);
        editor.digit('9');
        editor.sqrt().unwrap();
        assert_eq!(editor.backspace(), Backspace::RemovedOther);
        assert_eq!(editor.expression_raw(), "12+");
        assert_eq!(editor.current_operand(), "");
    }

    #[test]
    fn test_implicit_multiplication_before_paren() {
        let mut editor = ExpressionEditor::new();
        editor.digit('2');
        editor.open_paren();
        editor.digit('3');
        assert_eq!(editor.expression_raw(), "2×(3");

        editor.clear();
        editor.open_paren();
        editor.digit('1');
        editor.close_paren();
        editor.open_paren();
        assert_eq!(editor.expression_raw(), "(1)×(");
    }

    #[test]
    fn test_close_paren_rules() {
        let mut editor = ExpressionEditor::new();
        editor.close_paren(); // nothing open
        assert!(editor.is_empty());
        editor.open_paren();
        editor.digit('2');
        editor.operator(BinOp::Add);
        editor.close_paren(); // can't close right after an operator
        assert_eq!(editor.expression_raw(), "(2+");
        editor.digit('3');
        editor.close_paren();
        assert_eq!(editor.expression_raw(), "(2+3)");
    }

    #[test]
    fn test_toggle_sign() {
        let mut editor = ExpressionEditor::new();
        type_digits(&mut editor, "12");
        editor.operator(BinOp::Add);
        type_digits(&mut editor, "34");
        editor.toggle_sign();
        assert_eq!(editor.expression_raw(), "12+-34");
        assert_eq!(editor.current_operand(), "-34");
        editor.toggle_sign();
        assert_eq!(editor.expression_raw(), "12+34");
        // No-op on empty operand.
        editor.clear();
        editor.toggle_sign();
        assert!(editor.is_empty());
    }

    #[test]
    fn test_equals_produces_calculation_and_chains() {
        let mut editor = ExpressionEditor::new();
        editor.digit('2');
        editor.operator(BinOp::Add);
        editor.digit('3');
        editor.operator(BinOp::Multiply);
        editor.digit('4');
        let calc = editor.equals().unwrap().unwrap();
        assert_eq!(calc.expression, "2+3×4");
        assert_eq!(calc.result, "14");
        assert_eq!(editor.last_token(), LastToken::Equals);
        assert_eq!(editor.current_operand(), "14");
        assert!(editor.is_empty());

        // Chaining: an operator seeds the next expression with the result.
        editor.operator(BinOp::Subtract);
        editor.digit('4');
        let calc = editor.equals().unwrap().unwrap();
        assert_eq!(calc.expression, "14-4");
        assert_eq!(calc.result, "10");
    }

    #[test]
    fn test_digit_after_equals_starts_fresh() {
        let mut editor = ExpressionEditor::new();
        editor.digit('7');
        editor.equals().unwrap();
        editor.digit('3');
        assert_eq!(editor.expression_raw(), "3");
        assert_eq!(editor.current_operand(), "3");
    }

    #[test]
    fn test_equals_autocloses_parens_for_eval_only() {
        let mut editor = ExpressionEditor::new();
        editor.open_paren();
        editor.digit('2');
        editor.operator(BinOp::Add);
        editor.digit('3');
        editor.operator(BinOp::Multiply);
        editor.open_paren();
        editor.digit('4');
        let calc = editor.equals().unwrap().unwrap();
        // History shows what was typed; the evaluation saw "(2+3*(4))".
        assert_eq!(calc.expression, "(2+3×(4");
        assert_eq!(calc.result, "14");
        assert_eq!(editor.open_parens(), 0);
    }

    #[test]
    fn test_equals_on_empty_is_none() {
        let mut editor = ExpressionEditor::new();
        assert!(editor.equals().unwrap().is_none());
    }

    #[test]
    fn test_equals_failure_preserves_state() {
        let mut editor = ExpressionEditor::new();
        editor.digit('1');
        editor.operator(BinOp::Divide);
        editor.digit('0');
        let before = editor.expression_raw();
        assert!(matches!(editor.equals(), Err(Error::Evaluation(_))));
        assert_eq!(editor.expression_raw(), before);
        assert_eq!(editor.current_operand(), "0");
        assert_eq!(editor.open_parens(), 0);
    }

    #[test]
    fn test_equals_result_seeds_unary_function() {
        let mut editor = ExpressionEditor::new();
        editor.digit('5');
        editor.equals().unwrap();
        editor.square().unwrap();
        assert_eq!(editor.expression_raw(), "5²→25");
        assert_eq!(editor.current_operand(), "25");
    }

    #[test]
    fn test_backspace_after_equals_drops_seed() {
        let mut editor = ExpressionEditor::new();
        editor.digit('5');
        editor.equals().unwrap();
        assert_eq!(editor.backspace(), Backspace::Empty);
        assert_eq!(editor.current_operand(), "");
        // Typing now starts a clean expression.
        editor.digit('3');
        assert_eq!(editor.expression_raw(), "3");
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut editor = ExpressionEditor::new();
        editor.open_paren();
        editor.digit('1');
        editor.dot();
        editor.clear();
        assert!(editor.is_empty());
        assert_eq!(editor.current_operand(), "");
        assert_eq!(editor.open_parens(), 0);
        assert_eq!(editor.last_token(), LastToken::None);
        assert_eq!(editor.display_text(), "0");
    }

    #[test]
    fn test_editing_a_rewrite_value_extends_it() {
        let mut editor = ExpressionEditor::new();
        editor.digit('5');
        editor.square().unwrap();
        editor.digit('3'); // user keeps typing onto the computed value
        assert_eq!(editor.expression_raw(), "5²→253");
        assert_eq!(editor.current_operand(), "253");
        editor.toggle_sign();
        assert_eq!(editor.expression_raw(), "5²→-253");
    }
}
