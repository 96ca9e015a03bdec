//! Infix expression evaluation
//!
//! Classic two-stack evaluator over `+ - * / ( )` with standard precedence
//! and unary minus, plus the display formatting rules for results.

use crate::{Error, Result};

/// Evaluate a normalized ASCII infix expression.
///
/// A `-` is parsed as a unary sign only at the start of the input or when
/// the preceding character is neither a digit nor `)`. Division by exactly
/// zero fails rather than producing infinity. An empty expression (or one
/// that leaves nothing on the stack) evaluates to 0.
pub fn evaluate(expr: &str) -> Result<f64> {
    let bytes = expr.as_bytes();
    let mut numbers: Vec<f64> = Vec::new();
    let mut operators: Vec<u8> = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];

        if c == b' ' {
            i += 1;
            continue;
        }

        let unary_minus = c == b'-'
            && (i == 0 || (!bytes[i - 1].is_ascii_digit() && bytes[i - 1] != b')'));

        if c.is_ascii_digit() || unary_minus {
            let start = i;
            if unary_minus {
                i += 1;
            }
            while i < bytes.len() && (bytes[i].is_ascii_digit() || bytes[i] == b'.') {
                i += 1;
            }
            let literal = &expr[start..i];
            let value: f64 = literal
                .parse()
                .map_err(|_| Error::Evaluation(format!("bad numeric literal '{literal}'")))?;
            numbers.push(value);
            continue;
        }

        match c {
            b'(' => operators.push(c),
            b')' => {
                while let Some(&op) = operators.last() {
                    if op == b'(' {
                        break;
                    }
                    operators.pop();
                    apply_top(op, &mut numbers)?;
                }
                operators.pop(); // discard the matching '('
            }
            b'+' | b'-' | b'*' | b'/' => {
                while let Some(&op) = operators.last() {
                    if precedence(c) > precedence(op) {
                        break;
                    }
                    operators.pop();
                    apply_top(op, &mut numbers)?;
                }
                operators.push(c);
            }
            _ => {
                return Err(Error::Evaluation(format!(
                    "unexpected character '{}'",
                    c as char
                )))
            }
        }
        i += 1;
    }

    while let Some(op) = operators.pop() {
        apply_top(op, &mut numbers)?;
    }

    Ok(numbers.pop().unwrap_or(0.0))
}

fn precedence(op: u8) -> u8 {
    match op {
        b'+' | b'-' => 1,
        b'*' | b'/' => 2,
        _ => 0, // parens never outrank an incoming operator
    }
}

/// Pop one operator's operands, apply, push the result. The second-popped
/// value is the left operand.
fn apply_top(op: u8, numbers: &mut Vec<f64>) -> Result<()> {
    let b = numbers
        .pop()
        .ok_or_else(|| Error::Evaluation("missing operand".into()))?;
    let a = numbers
        .pop()
        .ok_or_else(|| Error::Evaluation("missing operand".into()))?;
    let value = match op {
        b'+' => a + b,
        b'-' => a - b,
        b'*' => a * b,
        b'/' => {
            if b == 0.0 {
                return Err(Error::Evaluation("division by zero".into()));
            }
            a / b
        }
        _ => return Err(Error::Evaluation(format!("unknown operator '{}'", op as char))),
    };
    numbers.push(value);
    Ok(())
}

/// Format a result for display and history.
///
/// Integral values below 1e15 in magnitude render as plain integers.
/// Everything else renders with up to 10 fractional digits, trailing zeros
/// and a bare trailing point stripped; if that still exceeds 15 characters,
/// scientific notation with 6 fractional digits. NaN and infinities are an
/// evaluation failure, never a number.
pub fn format_result(value: f64) -> Result<String> {
    if value.is_nan() || value.is_infinite() {
        return Err(Error::Evaluation("non-finite result".into()));
    }
    if value == value.trunc() && value.abs() < 1e15 {
        return Ok(format!("{}", value as i64));
    }
    let mut formatted = format!("{value:.10}");
    if formatted.contains('.') {
        formatted.truncate(formatted.trim_end_matches('0').len());
        formatted.truncate(formatted.trim_end_matches('.').len());
    }
    if formatted.len() > 15 {
        formatted = scientific(value);
    }
    Ok(formatted)
}

/// `{:.6E}` renders a bare exponent (`1.234568E15`); the stored history
/// format carries an explicit sign and at least two digits (`1.234568E+15`).
fn scientific(value: f64) -> String {
    let rendered = format!("{value:.6E}");
    match rendered.split_once('E') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        None => rendered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_fmt(expr: &str) -> String {
        format_result(evaluate(expr).unwrap()).unwrap()
    }

    #[test]
    fn test_precedence() {
        assert_eq!(eval_fmt("2+3*4"), "14");
        assert_eq!(eval_fmt("2*3+4"), "10");
        assert_eq!(eval_fmt("10-4/2"), "8");
    }

    #[test]
    fn test_parentheses_override() {
        assert_eq!(eval_fmt("(2+3)*4"), "20");
        assert_eq!(eval_fmt("2*(3+4)"), "14");
        assert_eq!(eval_fmt("((1+2)*(3+4))"), "21");
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(eval_fmt("-5+2"), "-3");
        assert_eq!(eval_fmt("3*-2"), "-6");
        assert_eq!(eval_fmt("(-5)"), "-5");
        assert_eq!(eval_fmt("2-(-3)"), "5");
    }

    #[test]
    fn test_left_to_right_same_precedence() {
        assert_eq!(eval_fmt("10-3-2"), "5");
        assert_eq!(eval_fmt("100/10/2"), "5");
    }

    #[test]
    fn test_division_by_zero_fails() {
        assert!(matches!(evaluate("10/0"), Err(Error::Evaluation(_))));
        assert!(matches!(evaluate("1/(2-2)"), Err(Error::Evaluation(_))));
    }

    #[test]
    fn test_empty_input_is_zero() {
        assert_eq!(evaluate("").unwrap(), 0.0);
        assert_eq!(evaluate("   ").unwrap(), 0.0);
    }

    #[test]
    fn test_malformed_expression_fails() {
        assert!(evaluate("2+").is_err());
        assert!(evaluate("*3").is_err());
        assert!(evaluate("2+x").is_err());
    }

    #[test]
    fn test_decimal_arithmetic() {
        assert_eq!(eval_fmt("2.5+2.5"), "5");
        assert_eq!(eval_fmt("0.1*10"), "1");
        assert_eq!(eval_fmt("7/2"), "3.5");
    }

    #[test]
    fn test_integral_formatting() {
        assert_eq!(format_result(5.0).unwrap(), "5");
        assert_eq!(format_result(-42.0).unwrap(), "-42");
        assert_eq!(format_result(0.0).unwrap(), "0");
    }

    #[test]
    fn test_fractional_formatting_trims_zeros() {
        assert_eq!(format_result(3.5).unwrap(), "3.5");
        assert_eq!(format_result(0.125).unwrap(), "0.125");
        // 1/3 rounded to 10 fractional digits
        assert_eq!(format_result(1.0 / 3.0).unwrap(), "0.3333333333");
    }

    #[test]
    fn test_sqrt_five_rounds_to_ten_digits() {
        assert_eq!(format_result(5.0_f64.sqrt()).unwrap(), "2.2360679775");
    }

    #[test]
    fn test_huge_magnitude_uses_signed_scientific() {
        assert_eq!(format_result(1.23456789e15).unwrap(), "1.234568E+15");
        assert_eq!(format_result(-9.87e20).unwrap(), "-9.870000E+20");
    }

    #[test]
    fn test_non_finite_is_error() {
        assert!(format_result(f64::NAN).is_err());
        assert!(format_result(f64::INFINITY).is_err());
        assert!(format_result(f64::NEG_INFINITY).is_err());
    }
}
