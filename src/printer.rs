use std::fmt;

use crate::types::{Number, Value};

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(i) => write!(f, "{}", i),
            // Debug keeps the fractional part: 2.0 rather than 2
            Number::Float(n) => write!(f, "{:?}", n),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Boolean(b) => write!(f, "{}", if *b { "#t" } else { "#f" }),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::Sequence(items) => {
                write!(f, "(")?;
                let mut first = true;
                for item in items.iter() {
                    if !first {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                    first = false;
                }
                write!(f, ")")
            }
            Value::Closure(closure) => write!(f, "#<lambda ({})>", closure.params.join(" ")),
            Value::Primitive(primitive) => write!(f, "#<primitive:{}>", primitive.name()),
            Value::Unit => Ok(()),
        }
    }
}

/// Canonical text of a value. `Unit` renders as the empty string.
pub fn render(value: &Value) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::evaluator::evaluate;
    use crate::parser::parse_str;

    fn render_eval(input: &str) -> String {
        let env = Environment::new_global_populated();
        let node = parse_str(input).expect("test input should parse");
        render(&evaluate(&node, &env).expect("test input should evaluate"))
    }

    #[test]
    fn test_render_numbers() {
        assert_eq!(render(&Value::integer(15)), "15");
        assert_eq!(render(&Value::integer(-3)), "-3");
        assert_eq!(render(&Value::float(2.0)), "2.0");
        assert_eq!(render(&Value::float(0.25)), "0.25");
        assert_eq!(render(&Value::float(1e100)), "1e100");
    }

    #[test]
    fn test_render_sequences() {
        assert_eq!(render_eval("(list 1 2 3)"), "(1 2 3)");
        assert_eq!(render_eval("(list)"), "()");
        assert_eq!(render_eval("(quote (a (b 2.5) ()))"), "(a (b 2.5) ())");
    }

    #[test]
    fn test_render_atoms() {
        assert_eq!(render_eval("(quote sym)"), "sym");
        assert_eq!(render_eval("(< 1 2)"), "#t");
        assert_eq!(render_eval("(> 1 2)"), "#f");
    }

    #[test]
    fn test_render_procedures() {
        assert_eq!(render_eval("car"), "#<primitive:car>");
        assert_eq!(render_eval("(lambda (x y) x)"), "#<lambda (x y)>");
    }

    #[test]
    fn test_render_unit_is_empty() {
        assert_eq!(render(&Value::Unit), "");
        assert_eq!(render_eval("(define x 1)"), "");
    }
}
