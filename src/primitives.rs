use std::cmp::Ordering;
use std::f64::consts;

use crate::environment::Environment;
use crate::evaluator::{EvalError, EvalResult};
use crate::procedure::{Primitive, PrimitiveFunc};
use crate::types::{Number, Value};

// Checks the number of arguments
macro_rules! check_arity {
    // Variant for minimum number of args
    ($args:expr, min $expected:expr, $name:expr) => {
        if $args.len() < $expected {
            return Err(EvalError::argument(
                $name,
                format!(
                    "expects at least {} arguments, got {}",
                    $expected,
                    $args.len()
                ),
            ));
        }
    };
    ($args:expr, $expected:expr, $name:expr) => {
        if $args.len() != $expected {
            return Err(EvalError::argument(
                $name,
                format!(
                    "expects exactly {} arguments, got {}",
                    $expected,
                    $args.len()
                ),
            ));
        }
    };
    // Variant for range of args (inclusive)
    ($args:expr, $min:expr, $max:expr, $name:expr) => {
        if !($min..=$max).contains(&$args.len()) {
            return Err(EvalError::argument(
                $name,
                format!(
                    "expects between {} and {} arguments, got {}",
                    $min,
                    $max,
                    $args.len()
                ),
            ));
        }
    };
}

const PRIMITIVES: &[(&str, PrimitiveFunc)] = &[
    // arithmetic
    ("+", prim_add),
    ("-", prim_sub),
    ("*", prim_mul),
    ("/", prim_div),
    // comparison
    ("=", prim_equals),
    ("<", prim_less_than),
    ("<=", prim_less_than_or_equals),
    (">", prim_greater_than),
    (">=", prim_greater_than_or_equals),
    // logic
    ("and", prim_and),
    ("or", prim_or),
    ("not", prim_not),
    // lists
    ("car", prim_car),
    ("cdr", prim_cdr),
    ("cons", prim_cons),
    ("list", prim_list),
    ("length", prim_length),
    ("append", prim_append),
    ("map", prim_map),
    // predicates
    ("null?", prim_is_null),
    ("list?", prim_is_list),
    ("number?", prim_is_number),
    ("symbol?", prim_is_symbol),
    ("procedure?", prim_is_procedure),
    ("eq?", prim_eq),
    ("equal?", prim_equal),
    // numeric helpers
    ("abs", prim_abs),
    ("max", prim_max),
    ("min", prim_min),
    ("round", prim_round),
    // math module
    ("sin", prim_sin),
    ("cos", prim_cos),
    ("tan", prim_tan),
    ("asin", prim_asin),
    ("acos", prim_acos),
    ("atan", prim_atan),
    ("atan2", prim_atan2),
    ("sinh", prim_sinh),
    ("cosh", prim_cosh),
    ("tanh", prim_tanh),
    ("exp", prim_exp),
    ("log", prim_log),
    ("log10", prim_log10),
    ("log2", prim_log2),
    ("sqrt", prim_sqrt),
    ("pow", prim_pow),
    ("fabs", prim_fabs),
    ("floor", prim_floor),
    ("ceil", prim_ceil),
    ("trunc", prim_trunc),
    ("hypot", prim_hypot),
    ("degrees", prim_degrees),
    ("radians", prim_radians),
    ("factorial", prim_factorial),
    ("gcd", prim_gcd),
];

/// Seeds `env` with every primitive procedure and named constant.
pub fn install(env: &mut Environment) {
    for (name, func) in PRIMITIVES {
        env.define(name.to_string(), Value::Primitive(Primitive::new(*name, *func)));
    }
    env.define("#t".to_string(), Value::Boolean(true));
    env.define("#f".to_string(), Value::Boolean(false));
    env.define("pi".to_string(), Value::float(consts::PI));
    env.define("e".to_string(), Value::float(consts::E));
    env.define("tau".to_string(), Value::float(consts::TAU));
    env.define("inf".to_string(), Value::float(f64::INFINITY));
    env.define("nan".to_string(), Value::float(f64::NAN));
}

// --- Argument helpers ---

fn expect_number(value: &Value, name: &str) -> EvalResult<Number> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(EvalError::type_mismatch(name, "number", other)),
    }
}

fn expect_float(value: &Value, name: &str) -> EvalResult<f64> {
    expect_number(value, name).map(Number::as_f64)
}

fn expect_integer(value: &Value, name: &str) -> EvalResult<i64> {
    match value {
        Value::Number(Number::Integer(i)) => Ok(*i),
        other => Err(EvalError::type_mismatch(name, "integer", other)),
    }
}

fn expect_sequence<'a>(value: &'a Value, name: &str) -> EvalResult<&'a [Value]> {
    match value {
        Value::Sequence(items) => Ok(&items[..]),
        other => Err(EvalError::type_mismatch(name, "list", other)),
    }
}

fn expect_numbers(args: &[Value], name: &str) -> EvalResult<Vec<Number>> {
    args.iter().map(|arg| expect_number(arg, name)).collect()
}

fn boolean(b: bool) -> EvalResult {
    Ok(Value::Boolean(b))
}

// --- Arithmetic ---

// Integers stay integral unless the operation overflows; any float operand
// makes the result a float.
fn combine(
    left: Number,
    right: Number,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Number {
    match (left, right) {
        (Number::Integer(a), Number::Integer(b)) => match int_op(a, b) {
            Some(result) => Number::Integer(result),
            None => Number::Float(float_op(a as f64, b as f64)),
        },
        (a, b) => Number::Float(float_op(a.as_f64(), b.as_f64())),
    }
}

/// Left fold over at least one number. A single argument comes back unchanged.
fn fold_numbers<F: Fn(Number, Number) -> EvalResult<Number>>(
    args: &[Value],
    operator: &str,
    func: F,
) -> EvalResult {
    check_arity!(args, min 1, operator);
    let numbers = expect_numbers(args, operator)?;
    let mut acc = numbers[0];
    for num in &numbers[1..] {
        acc = func(acc, *num)?;
    }
    Ok(Value::Number(acc))
}

pub fn prim_add(args: &[Value]) -> EvalResult {
    fold_numbers(args, "+", |acc, val| {
        Ok(combine(acc, val, i64::checked_add, |a, b| a + b))
    })
}

pub fn prim_sub(args: &[Value]) -> EvalResult {
    fold_numbers(args, "-", |acc, val| {
        Ok(combine(acc, val, i64::checked_sub, |a, b| a - b))
    })
}

pub fn prim_mul(args: &[Value]) -> EvalResult {
    fold_numbers(args, "*", |acc, val| {
        Ok(combine(acc, val, i64::checked_mul, |a, b| a * b))
    })
}

// True division: the result of dividing is always a float.
pub fn prim_div(args: &[Value]) -> EvalResult {
    fold_numbers(args, "/", |acc, val| {
        if val.is_zero() {
            Err(EvalError::argument("/", "division by zero"))
        } else {
            Ok(Number::Float(acc.as_f64() / val.as_f64()))
        }
    })
}

// --- Comparison ---

/// True iff every adjacent pair of arguments is ordered as `accept` allows.
/// A pair involving NaN is unordered and never accepted.
fn compare_numbers(args: &[Value], operator: &str, accept: fn(Ordering) -> bool) -> EvalResult {
    check_arity!(args, min 1, operator);
    let numbers = expect_numbers(args, operator)?;
    boolean(
        numbers
            .windows(2)
            .all(|pair| pair[0].numeric_cmp(pair[1]).is_some_and(accept)),
    )
}

pub fn prim_equals(args: &[Value]) -> EvalResult {
    check_arity!(args, min 1, "=");
    let numbers = expect_numbers(args, "=")?;
    boolean(numbers.windows(2).all(|pair| pair[0].numeric_eq(pair[1])))
}

pub fn prim_less_than(args: &[Value]) -> EvalResult {
    compare_numbers(args, "<", Ordering::is_lt)
}

pub fn prim_less_than_or_equals(args: &[Value]) -> EvalResult {
    compare_numbers(args, "<=", Ordering::is_le)
}

pub fn prim_greater_than(args: &[Value]) -> EvalResult {
    compare_numbers(args, ">", Ordering::is_gt)
}

pub fn prim_greater_than_or_equals(args: &[Value]) -> EvalResult {
    compare_numbers(args, ">=", Ordering::is_ge)
}

// --- Logic ---

pub fn prim_and(args: &[Value]) -> EvalResult {
    check_arity!(args, min 1, "and");
    boolean(args.iter().all(Value::is_truthy))
}

pub fn prim_or(args: &[Value]) -> EvalResult {
    check_arity!(args, min 1, "or");
    boolean(args.iter().any(Value::is_truthy))
}

pub fn prim_not(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, "not");
    boolean(!args[0].is_truthy())
}

// --- List Primitives ---

pub fn prim_car(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, "car");
    match expect_sequence(&args[0], "car")?.first() {
        Some(first) => Ok(first.clone()),
        None => Err(EvalError::argument("car", "cannot take car of empty list")),
    }
}

pub fn prim_cdr(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, "cdr");
    match expect_sequence(&args[0], "cdr")?.split_first() {
        Some((_, rest)) => Ok(Value::list(rest.to_vec())),
        None => Err(EvalError::argument("cdr", "cannot take cdr of empty list")),
    }
}

// (cons item list) -> (item . list); there are no dotted pairs, so the
// tail has to be a list.
pub fn prim_cons(args: &[Value]) -> EvalResult {
    check_arity!(args, 2, "cons");
    let tail = expect_sequence(&args[1], "cons")?;
    let mut items = Vec::with_capacity(tail.len() + 1);
    items.push(args[0].clone());
    items.extend_from_slice(tail);
    Ok(Value::list(items))
}

pub fn prim_list(args: &[Value]) -> EvalResult {
    Ok(Value::list(args.to_vec()))
}

pub fn prim_length(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, "length");
    let items = expect_sequence(&args[0], "length")?;
    Ok(Value::integer(items.len() as i64))
}

pub fn prim_append(args: &[Value]) -> EvalResult {
    let mut items = Vec::new();
    for arg in args {
        items.extend_from_slice(expect_sequence(arg, "append")?);
    }
    Ok(Value::list(items))
}

/// (map f list1 list2 ...) applies `f` element-wise, stopping at the
/// shortest list.
pub fn prim_map(args: &[Value]) -> EvalResult {
    check_arity!(args, min 2, "map");
    let Some(callable) = args[0].as_callable() else {
        return Err(EvalError::type_mismatch("map", "procedure", &args[0]));
    };
    let lists = args[1..]
        .iter()
        .map(|arg| expect_sequence(arg, "map"))
        .collect::<EvalResult<Vec<_>>>()?;
    let shortest = lists.iter().map(|list| list.len()).min().unwrap_or(0);

    let mut results = Vec::with_capacity(shortest);
    for i in 0..shortest {
        let call_args = lists.iter().map(|list| list[i].clone()).collect();
        results.push(callable.invoke(call_args)?);
    }
    Ok(Value::list(results))
}

// --- Type Predicates ---

macro_rules! is_type {
    ($args:expr, $type:pat, $name:expr) => {{
        check_arity!($args, 1, $name);
        boolean(matches!(&$args[0], $type))
    }};
}

pub fn prim_is_null(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, "null?");
    boolean(matches!(&args[0], Value::Sequence(items) if items.is_empty()))
}

pub fn prim_is_list(args: &[Value]) -> EvalResult {
    is_type!(args, Value::Sequence(_), "list?")
}

pub fn prim_is_number(args: &[Value]) -> EvalResult {
    is_type!(args, Value::Number(_), "number?")
}

pub fn prim_is_symbol(args: &[Value]) -> EvalResult {
    is_type!(args, Value::Symbol(_), "symbol?")
}

pub fn prim_is_procedure(args: &[Value]) -> EvalResult {
    is_type!(args, Value::Closure(_) | Value::Primitive(_), "procedure?")
}

pub fn prim_eq(args: &[Value]) -> EvalResult {
    check_arity!(args, 2, "eq?");
    boolean(args[0].is_identical(&args[1]))
}

pub fn prim_equal(args: &[Value]) -> EvalResult {
    check_arity!(args, 2, "equal?");
    boolean(args[0].is_equal(&args[1]))
}

// --- Numeric helpers ---

pub fn prim_abs(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, "abs");
    Ok(Value::Number(match expect_number(&args[0], "abs")? {
        Number::Integer(i) => match i.checked_abs() {
            Some(result) => Number::Integer(result),
            None => Number::Float((i as f64).abs()),
        },
        Number::Float(f) => Number::Float(f.abs()),
    }))
}

// The first extreme argument wins, keeping its own kind: (max 1 1.0) -> 1
fn extreme(args: &[Value], name: &str, wins: Ordering) -> EvalResult {
    check_arity!(args, min 1, name);
    let numbers = expect_numbers(args, name)?;
    let mut best = numbers[0];
    for num in &numbers[1..] {
        if num.numeric_cmp(best) == Some(wins) {
            best = *num;
        }
    }
    Ok(Value::Number(best))
}

pub fn prim_max(args: &[Value]) -> EvalResult {
    extreme(args, "max", Ordering::Greater)
}

pub fn prim_min(args: &[Value]) -> EvalResult {
    extreme(args, "min", Ordering::Less)
}

// (round x) rounds half to even and returns an integer;
// (round x digits) rounds to `digits` decimal places, staying integral for
// integer x and floating otherwise.
pub fn prim_round(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, 2, "round");
    let number = expect_number(&args[0], "round")?;
    match args.get(1) {
        None => match number {
            Number::Integer(i) => Ok(Value::integer(i)),
            Number::Float(f) => float_to_integer(f.round_ties_even(), "round"),
        },
        Some(digits) => {
            let digits = expect_integer(digits, "round")?;
            match number {
                Number::Integer(i) if digits >= 0 => Ok(Value::integer(i)),
                Number::Integer(i) => Ok(round_integer(i, digits.unsigned_abs())),
                Number::Float(_) => {
                    let scale = 10f64.powi(digits.clamp(-308, 308) as i32);
                    Ok(Value::float(
                        (number.as_f64() * scale).round_ties_even() / scale,
                    ))
                }
            }
        }
    }
}

/// Rounds `i` half to even at the `places`-th digit left of the point.
fn round_integer(i: i64, places: u64) -> Value {
    // Past 10^38 the scale no longer fits i128, and every i64 rounds to 0.
    let Some(scale) = u32::try_from(places)
        .ok()
        .and_then(|places| 10i128.checked_pow(places))
    else {
        return Value::integer(0);
    };
    let value = i128::from(i);
    let mut quotient = value.div_euclid(scale);
    let remainder = value.rem_euclid(scale);
    if 2 * remainder > scale || (2 * remainder == scale && quotient % 2 != 0) {
        quotient += 1;
    }
    let rounded = quotient * scale;
    match i64::try_from(rounded) {
        Ok(n) => Value::integer(n),
        Err(_) => Value::float(rounded as f64),
    }
}

fn float_to_integer(f: f64, name: &str) -> EvalResult {
    if !f.is_finite() {
        return Err(EvalError::argument(
            name,
            format!("cannot convert {} to an integer", f),
        ));
    }
    if f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Ok(Value::integer(f as i64))
    } else {
        Ok(Value::float(f))
    }
}

// --- Math module ---

fn unary_math(args: &[Value], name: &str, func: fn(f64) -> f64) -> EvalResult {
    check_arity!(args, 1, name);
    Ok(Value::float(func(expect_float(&args[0], name)?)))
}

fn binary_math(args: &[Value], name: &str, func: fn(f64, f64) -> f64) -> EvalResult {
    check_arity!(args, 2, name);
    Ok(Value::float(func(
        expect_float(&args[0], name)?,
        expect_float(&args[1], name)?,
    )))
}

fn domain_error(name: &str) -> EvalError {
    EvalError::argument(name, "math domain error")
}

pub fn prim_sin(args: &[Value]) -> EvalResult {
    unary_math(args, "sin", f64::sin)
}

pub fn prim_cos(args: &[Value]) -> EvalResult {
    unary_math(args, "cos", f64::cos)
}

pub fn prim_tan(args: &[Value]) -> EvalResult {
    unary_math(args, "tan", f64::tan)
}

pub fn prim_asin(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, "asin");
    let x = expect_float(&args[0], "asin")?;
    if !(-1.0..=1.0).contains(&x) {
        return Err(domain_error("asin"));
    }
    Ok(Value::float(x.asin()))
}

pub fn prim_acos(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, "acos");
    let x = expect_float(&args[0], "acos")?;
    if !(-1.0..=1.0).contains(&x) {
        return Err(domain_error("acos"));
    }
    Ok(Value::float(x.acos()))
}

pub fn prim_atan(args: &[Value]) -> EvalResult {
    unary_math(args, "atan", f64::atan)
}

pub fn prim_atan2(args: &[Value]) -> EvalResult {
    binary_math(args, "atan2", f64::atan2)
}

pub fn prim_sinh(args: &[Value]) -> EvalResult {
    unary_math(args, "sinh", f64::sinh)
}

pub fn prim_cosh(args: &[Value]) -> EvalResult {
    unary_math(args, "cosh", f64::cosh)
}

pub fn prim_tanh(args: &[Value]) -> EvalResult {
    unary_math(args, "tanh", f64::tanh)
}

pub fn prim_exp(args: &[Value]) -> EvalResult {
    unary_math(args, "exp", f64::exp)
}

// (log x) is the natural log; (log x base) uses the given base.
pub fn prim_log(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, 2, "log");
    let x = expect_float(&args[0], "log")?;
    if x <= 0.0 {
        return Err(domain_error("log"));
    }
    match args.get(1) {
        None => Ok(Value::float(x.ln())),
        Some(base) => {
            let base = expect_float(base, "log")?;
            if base <= 0.0 || base == 1.0 {
                return Err(domain_error("log"));
            }
            Ok(Value::float(x.ln() / base.ln()))
        }
    }
}

fn positive_log(args: &[Value], name: &str, func: fn(f64) -> f64) -> EvalResult {
    check_arity!(args, 1, name);
    let x = expect_float(&args[0], name)?;
    if x <= 0.0 {
        return Err(domain_error(name));
    }
    Ok(Value::float(func(x)))
}

pub fn prim_log10(args: &[Value]) -> EvalResult {
    positive_log(args, "log10", f64::log10)
}

pub fn prim_log2(args: &[Value]) -> EvalResult {
    positive_log(args, "log2", f64::log2)
}

pub fn prim_sqrt(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, "sqrt");
    let x = expect_float(&args[0], "sqrt")?;
    if x < 0.0 {
        return Err(domain_error("sqrt"));
    }
    Ok(Value::float(x.sqrt()))
}

pub fn prim_pow(args: &[Value]) -> EvalResult {
    binary_math(args, "pow", f64::powf)
}

pub fn prim_fabs(args: &[Value]) -> EvalResult {
    unary_math(args, "fabs", f64::abs)
}

fn integral_math(args: &[Value], name: &str, func: fn(f64) -> f64) -> EvalResult {
    check_arity!(args, 1, name);
    match expect_number(&args[0], name)? {
        Number::Integer(i) => Ok(Value::integer(i)),
        Number::Float(f) => float_to_integer(func(f), name),
    }
}

pub fn prim_floor(args: &[Value]) -> EvalResult {
    integral_math(args, "floor", f64::floor)
}

pub fn prim_ceil(args: &[Value]) -> EvalResult {
    integral_math(args, "ceil", f64::ceil)
}

pub fn prim_trunc(args: &[Value]) -> EvalResult {
    integral_math(args, "trunc", f64::trunc)
}

pub fn prim_hypot(args: &[Value]) -> EvalResult {
    binary_math(args, "hypot", f64::hypot)
}

pub fn prim_degrees(args: &[Value]) -> EvalResult {
    unary_math(args, "degrees", f64::to_degrees)
}

pub fn prim_radians(args: &[Value]) -> EvalResult {
    unary_math(args, "radians", f64::to_radians)
}

pub fn prim_factorial(args: &[Value]) -> EvalResult {
    check_arity!(args, 1, "factorial");
    let n = expect_integer(&args[0], "factorial")?;
    if n < 0 {
        return Err(EvalError::argument(
            "factorial",
            "not defined for negative values",
        ));
    }
    let mut acc: i64 = 1;
    for k in 2..=n {
        acc = acc
            .checked_mul(k)
            .ok_or_else(|| EvalError::argument("factorial", "result does not fit in an integer"))?;
    }
    Ok(Value::integer(acc))
}

pub fn prim_gcd(args: &[Value]) -> EvalResult {
    let mut acc: u64 = 0;
    for arg in args {
        let mut b = expect_integer(arg, "gcd")?.unsigned_abs();
        let mut a = acc;
        while b != 0 {
            (a, b) = (b, a % b);
        }
        acc = a;
    }
    i64::try_from(acc)
        .map(Value::integer)
        .map_err(|_| EvalError::argument("gcd", "result does not fit in an integer"))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::EnvRef;
    use crate::evaluator::evaluate;
    use crate::parser::parse_str;
    use crate::source::Span;

    fn eval_in(input: &str, env: &EnvRef) -> EvalResult {
        let node = parse_str(input).expect("test input should parse");
        evaluate(&node, env)
    }

    fn assert_eval(input: &str, expected: Value) {
        let env = Environment::new_global_populated();
        match eval_in(input, &env) {
            Ok(result) => assert_eq!(result, expected, "Input: '{}'", input),
            Err(e) => panic!("Evaluation failed for input '{}': {}", input, e),
        }
    }

    fn assert_eval_error(input: &str, expected_error_variant: &EvalError) {
        let env = Environment::new_global_populated();
        match eval_in(input, &env) {
            Ok(result) => panic!(
                "Expected evaluation to fail for input '{}', but got: {:?}",
                input, result
            ),
            Err(e) => assert_eq!(
                std::mem::discriminant(&e),
                std::mem::discriminant(expected_error_variant),
                "Input: '{}', Expected error variant like {:?}, got: {:?}",
                input,
                expected_error_variant,
                e
            ),
        }
    }

    fn ints(values: &[i64]) -> Value {
        Value::list(values.iter().map(|v| Value::integer(*v)).collect())
    }

    fn argument_error() -> EvalError {
        EvalError::argument("", "")
    }

    fn type_error() -> EvalError {
        EvalError::TypeMismatch {
            procedure: String::new(),
            expected: "",
            found: "",
            span: Span::default(),
        }
    }

    #[test]
    fn test_arithmetic() {
        assert_eval("(+ 1 2 3)", Value::integer(6));
        assert_eval("(* 2 3 4)", Value::integer(24));
        assert_eval("(- 10 3 2)", Value::integer(5));
        assert_eval("(- 5)", Value::integer(5)); // left fold: single argument unchanged
        assert_eval("(+ 1 2.5)", Value::float(3.5));
        assert_eval("(/ 10 4)", Value::float(2.5));
        assert_eval("(/ 6 3)", Value::float(2.0));
        assert_eval("(/ 20 2 5)", Value::float(2.0));
    }

    #[test]
    fn test_integer_overflow_falls_back_to_float() {
        assert_eval(
            "(+ 9223372036854775807 1)",
            Value::float(9223372036854775807.0 + 1.0),
        );
    }

    #[test]
    fn test_arithmetic_errors() {
        assert_eval_error("(+)", &argument_error());
        assert_eval_error("(/)", &argument_error());
        assert_eval_error("(/ 1 0)", &argument_error());
        assert_eval_error("(/ 1 0.0)", &argument_error());
        assert_eval_error("(+ 1 (quote a))", &type_error());
        assert_eval_error("(* (list 1) 2)", &type_error());
    }

    #[test]
    fn test_comparison() {
        assert_eval("(= 5 5 5)", Value::Boolean(true));
        assert_eval("(= 5 5.0)", Value::Boolean(true));
        assert_eval("(= 5 5 6)", Value::Boolean(false));
        assert_eval("(< 1 2 3)", Value::Boolean(true));
        assert_eval("(< 1 3 2)", Value::Boolean(false));
        assert_eval("(<= 5 5 6)", Value::Boolean(true));
        assert_eval("(> 3 2)", Value::Boolean(true));
        assert_eval("(>= 6 5 5)", Value::Boolean(true));
        assert_eval("(> 6 5 5)", Value::Boolean(false));
        assert_eval("(< 7)", Value::Boolean(true));
        assert_eval_error("(<)", &argument_error());
        assert_eval_error("(< 1 (quote b))", &type_error());
    }

    #[test]
    fn test_comparison_is_exact_beyond_float_precision() {
        // 2^53 and 2^53 + 1 share an f64 representation.
        assert_eval("(< 9007199254740992 9007199254740993)", Value::Boolean(true));
        assert_eval("(> 9007199254740993 9007199254740992)", Value::Boolean(true));
        assert_eval("(<= 9007199254740993 9007199254740992)", Value::Boolean(false));
        assert_eval("(>= 9007199254740992 9007199254740993)", Value::Boolean(false));
        assert_eval("(= 9007199254740993 9007199254740992.0)", Value::Boolean(false));
        assert_eval("(> 9007199254740993 9007199254740992.0)", Value::Boolean(true));
        assert_eval(
            "(max 9007199254740992 9007199254740993)",
            Value::integer(9_007_199_254_740_993),
        );
        assert_eval(
            "(min 9007199254740993 9007199254740992)",
            Value::integer(9_007_199_254_740_992),
        );
        assert_eval("(< 1 nan)", Value::Boolean(false));
        assert_eval("(> 1 nan)", Value::Boolean(false));
    }

    #[test]
    fn test_logic() {
        assert_eval("(and 1 2 3)", Value::Boolean(true));
        assert_eval("(and 1 #f 3)", Value::Boolean(false));
        assert_eval("(or #f #f)", Value::Boolean(false));
        assert_eval("(or #f 0)", Value::Boolean(true));
        assert_eval("(not #f)", Value::Boolean(true));
        assert_eval("(not 0)", Value::Boolean(false));
        assert_eval_error("(and)", &argument_error());
        assert_eval_error("(not 1 2)", &argument_error());
    }

    #[test]
    fn test_list_operations() {
        assert_eval("(car (list 1 2 3))", Value::integer(1));
        assert_eval("(cdr (list 1 2 3))", ints(&[2, 3]));
        assert_eval("(cdr (list 1))", ints(&[]));
        assert_eval("(cons 1 (list 2 3))", ints(&[1, 2, 3]));
        assert_eval("(cons 1 (list))", ints(&[1]));
        assert_eval("(list)", ints(&[]));
        assert_eval("(length (list 1 2 3))", Value::integer(3));
        assert_eval("(append (list 1) (list 2 3) (list))", ints(&[1, 2, 3]));
        assert_eval("(append)", ints(&[]));
    }

    #[test]
    fn test_list_errors() {
        assert_eval_error("(car (list))", &argument_error());
        assert_eval_error("(cdr (list))", &argument_error());
        assert_eval_error("(car 1)", &type_error());
        assert_eval_error("(cons 1 2)", &type_error());
        assert_eval_error("(length 5)", &type_error());
        assert_eval_error("(car (list 1) (list 2))", &argument_error());
    }

    #[test]
    fn test_cons_does_not_modify_tail() {
        let env = Environment::new_global_populated();
        eval_in("(define xs (list 2 3))", &env).unwrap();
        eval_in("(define ys (cons 1 xs))", &env).unwrap();
        assert_eq!(eval_in("xs", &env), Ok(ints(&[2, 3])));
        assert_eq!(eval_in("ys", &env), Ok(ints(&[1, 2, 3])));
    }

    #[test]
    fn test_map() {
        assert_eval("(map abs (list -1 2 -3))", ints(&[1, 2, 3]));
        assert_eval("(map + (list 1 2 3) (list 10 20))", ints(&[11, 22]));
        assert_eval_error("(map 1 (list 1))", &type_error());
        assert_eval_error("(map abs)", &argument_error());
    }

    #[test]
    fn test_predicates() {
        assert_eval("(null? (list))", Value::Boolean(true));
        assert_eval("(null? (list 1))", Value::Boolean(false));
        assert_eval("(null? 0)", Value::Boolean(false));
        assert_eval("(list? (list 1))", Value::Boolean(true));
        assert_eval("(list? 1)", Value::Boolean(false));
        assert_eval("(number? 1.5)", Value::Boolean(true));
        assert_eval("(number? (quote a))", Value::Boolean(false));
        assert_eval("(symbol? (quote a))", Value::Boolean(true));
        assert_eval("(symbol? 1)", Value::Boolean(false));
        assert_eval("(procedure? car)", Value::Boolean(true));
        assert_eval("(procedure? (lambda (x) x))", Value::Boolean(true));
        assert_eval("(procedure? (quote car))", Value::Boolean(false));
    }

    #[test]
    fn test_eq_and_equal() {
        assert_eval("(eq? 1 1)", Value::Boolean(true));
        assert_eval("(eq? (quote a) (quote a))", Value::Boolean(true));
        assert_eval("(eq? (list 1) (list 1))", Value::Boolean(false));
        assert_eval("(eq? (list) (list))", Value::Boolean(true));
        assert_eval("(eq? car car)", Value::Boolean(true));
        assert_eval("(equal? (list 1 (list 2)) (list 1 (list 2)))", Value::Boolean(true));
        assert_eval("(equal? (list 1 2) (list 1 3))", Value::Boolean(false));
        assert_eval("(equal? 2 2.0)", Value::Boolean(true));

        let env = Environment::new_global_populated();
        eval_in("(define xs (list 1 2))", &env).unwrap();
        eval_in("(define f (lambda (x) x))", &env).unwrap();
        assert_eq!(eval_in("(eq? xs xs)", &env), Ok(Value::Boolean(true)));
        assert_eq!(eval_in("(eq? f f)", &env), Ok(Value::Boolean(true)));
        assert_eq!(
            eval_in("(equal? f (lambda (x) x))", &env),
            Ok(Value::Boolean(false))
        );
    }

    #[test]
    fn test_numeric_helpers() {
        assert_eval("(abs -5)", Value::integer(5));
        assert_eval("(abs -2.5)", Value::float(2.5));
        assert_eval("(max 1 7 3)", Value::integer(7));
        assert_eval("(max 1 7.5 3)", Value::float(7.5));
        assert_eval("(min 4 2 8)", Value::integer(2));
        assert_eval("(round 2.5)", Value::integer(2));
        assert_eval("(round 3.5)", Value::integer(4));
        assert_eval("(round -1.2)", Value::integer(-1));
        assert_eval("(round 7)", Value::integer(7));
        assert_eval("(round 3.14159 2)", Value::float(3.14));
        assert_eval("(round 1234 -2)", Value::integer(1200));
        assert_eval("(round 1250 -2)", Value::integer(1200));
        assert_eval("(round 1350 -2)", Value::integer(1400));
        assert_eval("(round -1251 -2)", Value::integer(-1300));
        assert_eval("(round 1234 -60)", Value::integer(0));
        assert_eval(
            "(round 9223372036854775807 -18)",
            Value::integer(9_000_000_000_000_000_000),
        );
        assert_eval("(round 9223372036854775807 -19)", Value::float(1e19));
        assert_eval_error("(max)", &argument_error());
        assert_eval_error("(round 1.5 0.5)", &type_error());
    }

    #[test]
    fn test_math_module() {
        assert_eval("(sqrt 16)", Value::float(4.0));
        assert_eval("(sin 0)", Value::float(0.0));
        assert_eval("(cos 0)", Value::float(1.0));
        assert_eval("(pow 2 10)", Value::float(1024.0));
        assert_eval("(floor 2.7)", Value::integer(2));
        assert_eval("(ceil 2.1)", Value::integer(3));
        assert_eval("(trunc -2.7)", Value::integer(-2));
        assert_eval("(log 1)", Value::float(0.0));
        assert_eval("(log 8 2)", Value::float(3.0));
        assert_eval("(log10 1000)", Value::float(3.0));
        assert_eval("(hypot 3 4)", Value::float(5.0));
        assert_eval("(factorial 5)", Value::integer(120));
        assert_eval("(gcd 12 18)", Value::integer(6));
        assert_eval("(gcd)", Value::integer(0));
        assert_eval("pi", Value::float(std::f64::consts::PI));
    }

    #[test]
    fn test_math_domain_errors() {
        assert_eval_error("(sqrt -1)", &argument_error());
        assert_eval_error("(log 0)", &argument_error());
        assert_eval_error("(log 8 1)", &argument_error());
        assert_eval_error("(asin 2)", &argument_error());
        assert_eval_error("(factorial -1)", &argument_error());
        assert_eval_error("(factorial 2.0)", &type_error());
        assert_eval_error("(sin (quote x))", &type_error());
    }
}
