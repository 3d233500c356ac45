//! Evaluation of arithmetic expression inputs.
//!
//! Inputs are converted to numbers and operators, reordered to reverse
//! Polish notation with the shunting-yard algorithm, then folded on a stack.
//! Any malformed part makes the whole expression yield `None`.

use crate::input::CharInput;
use crate::key::MathOp;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Expr {
    Num(f64),
    Op(Operator),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Operator {
    op: MathOp,
    args: usize,
    priority: u8,
}

impl Operator {
    fn new(op: MathOp) -> Option<Self> {
        let (args, priority) = match op {
            MathOp::Plus | MathOp::Minus => (2, 10),
            MathOp::Multiply | MathOp::Divide => (2, 20),
            MathOp::Percent | MathOp::Permill | MathOp::Permyriad => (1, 30),
            MathOp::Equal | MathOp::Dot | MathOp::Brackets => return None,
        };
        Some(Self { op, args, priority })
    }

    // All operators are left-associative.
    fn is_prior_to(&self, other: &Operator) -> bool {
        other.priority <= self.priority
    }

    fn call(&self, values: &[f64]) -> Option<f64> {
        if values.len() != self.args {
            return None;
        }
        let first = values[0];
        let second = values.get(1).copied().unwrap_or(0.0);
        match self.op {
            MathOp::Plus => Some(first + second),
            MathOp::Minus => Some(first - second),
            MathOp::Multiply => Some(first * second),
            MathOp::Divide if second != 0.0 => Some(first / second),
            MathOp::Divide => None,
            MathOp::Percent => Some(first * 0.01),
            MathOp::Permill => Some(first * 0.001),
            MathOp::Permyriad => Some(first * 0.0001),
            MathOp::Equal | MathOp::Dot | MathOp::Brackets => None,
        }
    }
}

/// Evaluate a run of expression inputs.
///
/// Bracket inputs are matched through their pair link and evaluated as a
/// sub-expression.
pub fn evaluate(inputs: &[&CharInput]) -> Option<f64> {
    if inputs.is_empty() {
        return None;
    }

    let mut exprs = Vec::with_capacity(inputs.len());
    let mut i = 0;
    while i < inputs.len() {
        let input = inputs[i];
        let expr = match input.single_math_op() {
            None => Expr::Num(parse_number(input)?),
            Some(MathOp::Brackets) => {
                let pair = input.pair()?;
                let close = inputs[i + 1..]
                    .iter()
                    .position(|other| other.id() == pair)
                    .map(|offset| i + 1 + offset)?;
                let value = evaluate(&inputs[i + 1..close])?;
                i = close;
                Expr::Num(value)
            }
            Some(op) => Expr::Op(Operator::new(op)?),
        };
        exprs.push(expr);
        i += 1;
    }

    calculate(&to_rpn(exprs))
}

fn to_rpn(exprs: Vec<Expr>) -> Vec<Expr> {
    let mut output = Vec::with_capacity(exprs.len());
    let mut operators: Vec<Operator> = Vec::new();

    for expr in exprs {
        match expr {
            Expr::Num(_) => output.push(expr),
            Expr::Op(o1) => {
                while let Some(o2) = operators.last().copied() {
                    if !o2.is_prior_to(&o1) {
                        break;
                    }
                    operators.pop();
                    output.push(Expr::Op(o2));
                }
                operators.push(o1);
            }
        }
    }
    while let Some(op) = operators.pop() {
        output.push(Expr::Op(op));
    }
    output
}

fn calculate(rpn: &[Expr]) -> Option<f64> {
    let mut values: Vec<f64> = Vec::new();
    for expr in rpn {
        match expr {
            Expr::Num(n) => values.push(*n),
            Expr::Op(op) => {
                if values.len() < op.args {
                    return None;
                }
                let args = values.split_off(values.len() - op.args);
                values.push(op.call(&args)?);
            }
        }
    }
    match values.as_slice() {
        [value] => Some(*value),
        _ => None,
    }
}

/// Read a number from digit and dot keys.
fn parse_number(input: &CharInput) -> Option<f64> {
    let keys = input.keys();
    let mut text = String::new();
    let mut has_dot = false;

    for (i, key) in keys.iter().enumerate() {
        let is_dot = key.is_math_op(MathOp::Dot);
        if i == 0 && !(is_dot || key.is_number()) {
            return None;
        }
        if is_dot {
            if has_dot {
                return None;
            }
            has_dot = true;
            // A trailing dot adds nothing.
            if keys.get(i + 1).is_some_and(|next| next.is_number()) {
                if i == 0 {
                    text.push('0');
                }
                text.push('.');
            }
        } else if key.is_number() {
            text.push_str(&key.text);
        } else {
            return None;
        }
    }

    if text.is_empty() {
        return None;
    }
    text.parse().ok()
}

/// Four decimals, trailing zeros and dot removed.
pub fn format_result(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{keys_from, Key};

    fn num(text: &str) -> CharInput {
        CharInput::from_keys(
            text.chars()
                .map(|c| {
                    if c == '.' {
                        Key::math(MathOp::Dot)
                    } else {
                        keys_from(&c.to_string()).remove(0)
                    }
                })
                .collect(),
        )
    }

    fn op(op: MathOp) -> CharInput {
        CharInput::from_key(Key::math(op))
    }

    fn eval(inputs: &[CharInput]) -> Option<f64> {
        let refs: Vec<&CharInput> = inputs.iter().collect();
        evaluate(&refs)
    }

    #[test]
    fn test_precedence() {
        let inputs = vec![
            num("1"),
            op(MathOp::Plus),
            num("2"),
            op(MathOp::Multiply),
            num("3"),
        ];
        assert_eq!(eval(&inputs), Some(7.0));
    }

    #[test]
    fn test_left_associative_minus() {
        let inputs = vec![num("10"), op(MathOp::Minus), num("4"), op(MathOp::Minus), num("3")];
        assert_eq!(eval(&inputs), Some(3.0));
    }

    #[test]
    fn test_percent_unary() {
        let inputs = vec![num("50"), op(MathOp::Percent)];
        assert_eq!(eval(&inputs), Some(0.5));
    }

    #[test]
    fn test_brackets() {
        let mut open = CharInput::from_key(Key::bracket("("));
        let mut close = CharInput::from_key(Key::bracket(")"));
        open.set_pair(Some(close.id()));
        close.set_pair(Some(open.id()));
        let inputs = vec![
            open,
            num("1"),
            op(MathOp::Plus),
            num("2"),
            close,
            op(MathOp::Multiply),
            num("3"),
        ];
        assert_eq!(eval(&inputs), Some(9.0));
    }

    #[test]
    fn test_divide_by_zero() {
        let inputs = vec![num("1"), op(MathOp::Divide), num("0")];
        assert_eq!(eval(&inputs), None);
    }

    #[test]
    fn test_leading_dot() {
        assert_eq!(eval(&[num(".5")]), Some(0.5));
        assert_eq!(eval(&[num("1..2")]), None);
    }

    #[test]
    fn test_dangling_operator() {
        assert_eq!(eval(&[num("1"), op(MathOp::Plus)]), None);
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(3.0), "3");
        assert_eq!(format_result(0.125), "0.125");
        assert_eq!(format_result(1.0 / 3.0), "0.3333");
        assert_eq!(format_result(0.00001), "0");
    }
}
