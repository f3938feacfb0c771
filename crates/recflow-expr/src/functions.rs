//! String helpers registered on the JMESPath runtime next to the standard
//! built-ins.
//!
//! Argument types are checked by each function's `Signature` before the
//! body runs, so bodies only handle well-typed input.

use jmespath::functions::{ArgumentType, CustomFunction, Signature};
use jmespath::{Context, JmespathError, Rcvar, Runtime, Variable};

type SearchResult = Result<Rcvar, JmespathError>;

pub fn register(runtime: &mut Runtime) {
    use ArgumentType::{Any, Array, Number, String as Str};

    let custom = |inputs: Vec<ArgumentType>, f: fn(&[Rcvar], &mut Context<'_>) -> SearchResult| {
        Box::new(CustomFunction::new(Signature::new(inputs, None), Box::new(f)))
    };

    runtime.register_function("upper", custom(vec![Str], upper));
    runtime.register_function("lower", custom(vec![Str], lower));
    runtime.register_function("capitalize", custom(vec![Str], capitalize));
    runtime.register_function("concat", custom(vec![Array], concat));
    runtime.register_function("replace", custom(vec![Str, Str, Str], replace));
    runtime.register_function("split", custom(vec![Str, Str], split));
    runtime.register_function("left", custom(vec![Str, Number], left));
    runtime.register_function("right", custom(vec![Str, Number], right));
    runtime.register_function("uuid", custom(vec![], uuid));
    runtime.register_function("hash", custom(vec![Any], hash));
}

fn string(s: String) -> SearchResult {
    Ok(Rcvar::new(Variable::String(s)))
}

fn null() -> SearchResult {
    Ok(Rcvar::new(Variable::Null))
}

fn str_arg(args: &[Rcvar], idx: usize) -> &str {
    args.get(idx)
        .and_then(|a| a.as_string())
        .map(String::as_str)
        .unwrap_or("")
}

fn count_arg(args: &[Rcvar], idx: usize) -> usize {
    args.get(idx)
        .and_then(|a| a.as_number())
        .filter(|n| *n > 0.0)
        .map(|n| n as usize)
        .unwrap_or(0)
}

/// Text form used when a non-string value takes part in string building.
fn text_of(v: &Variable) -> Option<String> {
    match v {
        Variable::Null => None,
        Variable::String(s) => Some(s.clone()),
        other => serde_json::to_string(other).ok(),
    }
}

fn upper(args: &[Rcvar], _ctx: &mut Context<'_>) -> SearchResult {
    string(str_arg(args, 0).to_uppercase())
}

fn lower(args: &[Rcvar], _ctx: &mut Context<'_>) -> SearchResult {
    string(str_arg(args, 0).to_lowercase())
}

fn capitalize(args: &[Rcvar], _ctx: &mut Context<'_>) -> SearchResult {
    let s = str_arg(args, 0);
    let mut chars = s.chars();
    let out = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    };
    string(out)
}

fn concat(args: &[Rcvar], _ctx: &mut Context<'_>) -> SearchResult {
    let Some(items) = args.first().and_then(|a| a.as_array()) else {
        return null();
    };
    let out: String = items.iter().filter_map(|v| text_of(v)).collect();
    string(out)
}

fn replace(args: &[Rcvar], _ctx: &mut Context<'_>) -> SearchResult {
    string(str_arg(args, 0).replace(str_arg(args, 1), str_arg(args, 2)))
}

fn split(args: &[Rcvar], _ctx: &mut Context<'_>) -> SearchResult {
    let s = str_arg(args, 0);
    let delimiter = str_arg(args, 1);
    let parts: Vec<Rcvar> = if delimiter.is_empty() {
        s.chars()
            .map(|c| Rcvar::new(Variable::String(c.to_string())))
            .collect()
    } else {
        s.split(delimiter)
            .map(|p| Rcvar::new(Variable::String(p.to_string())))
            .collect()
    };
    Ok(Rcvar::new(Variable::Array(parts)))
}

fn left(args: &[Rcvar], _ctx: &mut Context<'_>) -> SearchResult {
    let n = count_arg(args, 1);
    string(str_arg(args, 0).chars().take(n).collect())
}

fn right(args: &[Rcvar], _ctx: &mut Context<'_>) -> SearchResult {
    let s = str_arg(args, 0);
    let n = count_arg(args, 1);
    let skip = s.chars().count().saturating_sub(n);
    string(s.chars().skip(skip).collect())
}

fn uuid(_args: &[Rcvar], _ctx: &mut Context<'_>) -> SearchResult {
    string(uuid::Uuid::new_v4().to_string())
}

fn hash(args: &[Rcvar], _ctx: &mut Context<'_>) -> SearchResult {
    match args.first().and_then(|v| text_of(v)) {
        Some(text) => string(blake3::hash(text.as_bytes()).to_hex().to_string()),
        None => null(),
    }
}
