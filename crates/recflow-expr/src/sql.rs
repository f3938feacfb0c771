//! SQL expressions evaluated by an embedded SQLite.
//!
//! Each record becomes a one-row relation:
//!
//! ```sql
//! SELECT NULL AS "__$$row", ?1 AS "fname", ?2 AS "details", ?3 AS "details.fname"
//! ```
//!
//! Top-level fields are columns; nested object members are additionally
//! exposed under dotted names, reachable as `` `details.fname` ``. Scalars are
//! bound with their native SQLite type (booleans as 0/1), arrays and objects
//! as JSON text. The expression is then run as `SELECT (<expr>) FROM (<row>)`
//! or, for predicates, `SELECT 1 FROM (<row>) WHERE (<expr>)`.

use std::collections::HashSet;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;

use recflow_core::types::{is_internal_field, Record};

use crate::error::{ExprError, Result};
use crate::language::Language;
use crate::source::ExpressionSource;

/// Anchor column so even an empty record yields exactly one row.
const ANCHOR: &str = "NULL AS \"__$$row\"";

pub const DEFAULT_STATEMENT_CACHE: usize = 16;

pub struct SqlExpression {
    /// Private in-memory database, opened once at compile time.
    conn: Connection,
    source: ExpressionSource,
}

impl SqlExpression {
    pub fn compile(source: &ExpressionSource) -> Result<Self> {
        Self::compile_with_cache(source, DEFAULT_STATEMENT_CACHE)
    }

    pub fn compile_with_cache(source: &ExpressionSource, statement_cache: usize) -> Result<Self> {
        let text = source.display_text();
        let conn = Connection::open_in_memory()
            .map_err(|e| ExprError::compile(Language::Sql, &text, e))?;
        conn.set_prepared_statement_cache_capacity(statement_cache);

        match source {
            ExpressionSource::Scalar(expr) => check_syntax(&conn, expr)?,
            ExpressionSource::Fields(fields) => {
                for (_, expr) in fields {
                    check_syntax(&conn, expr)?;
                }
            }
        }

        Ok(Self {
            conn,
            source: source.clone(),
        })
    }

    pub fn source(&self) -> &ExpressionSource {
        &self.source
    }

    pub fn search(&self, record: &Record) -> Result<Value> {
        let row = SyntheticRow::from_record(record);
        match &self.source {
            ExpressionSource::Scalar(expr) => self.select(expr, &row),
            ExpressionSource::Fields(fields) => {
                let mut out = Record::new();
                for (name, expr) in fields {
                    out.insert(name.clone(), self.select(expr, &row)?);
                }
                Ok(Value::Object(out))
            }
        }
    }

    pub fn test(&self, record: &Record) -> Result<bool> {
        let ExpressionSource::Scalar(expr) = &self.source else {
            return Err(ExprError::eval(
                Language::Sql,
                "a field map cannot be used as a predicate",
            ));
        };
        let row = SyntheticRow::from_record(record);
        let sql = format!("SELECT 1 FROM ({}) WHERE ({expr})", row.sql);
        let mut stmt = self.conn.prepare_cached(&sql).map_err(eval_err)?;
        stmt.exists(params_from_iter(row.values.iter()))
            .map_err(eval_err)
    }

    fn select(&self, expr: &str, row: &SyntheticRow) -> Result<Value> {
        let sql = format!("SELECT ({expr}) FROM ({})", row.sql);
        let mut stmt = self.conn.prepare_cached(&sql).map_err(eval_err)?;
        let cell: SqlValue = stmt
            .query_row(params_from_iter(row.values.iter()), |r| r.get(0))
            .map_err(eval_err)?;
        Ok(sql_to_json(cell))
    }
}

/// Prepare against a column-less row. Unknown columns are fine here since
/// columns only exist once a record is bound; anything else is a syntax or
/// semantic error in the expression itself.
fn check_syntax(conn: &Connection, expr: &str) -> Result<()> {
    let sql = format!("SELECT ({expr}) FROM (SELECT {ANCHOR})");
    match conn.prepare(&sql) {
        Ok(_) => Ok(()),
        Err(e) if is_unknown_column(&e) => Ok(()),
        Err(e) => Err(ExprError::compile(Language::Sql, expr, e)),
    }
}

/// Bundled SQLite reports prepare errors with an offset (`SqlInputError`);
/// older builds surface them as a plain `SqliteFailure`.
fn is_unknown_column(e: &rusqlite::Error) -> bool {
    let msg = match e {
        rusqlite::Error::SqlInputError { msg, .. } => msg.as_str(),
        rusqlite::Error::SqliteFailure(_, Some(msg)) => msg.as_str(),
        _ => return false,
    };
    msg.starts_with("no such column")
}

fn eval_err(e: rusqlite::Error) -> ExprError {
    ExprError::eval(Language::Sql, e)
}

/// The `SELECT ... AS ...` text plus its bound values.
struct SyntheticRow {
    sql: String,
    values: Vec<SqlValue>,
}

impl SyntheticRow {
    fn from_record(record: &Record) -> Self {
        let mut columns: Vec<(String, &Value)> = Vec::with_capacity(record.len());
        let mut seen: HashSet<String> = HashSet::new();

        // Literal top-level keys first so they win over flattened names.
        for (name, value) in record {
            if is_internal_field(name) {
                continue;
            }
            seen.insert(name.clone());
            columns.push((name.clone(), value));
        }
        for (name, value) in record {
            if is_internal_field(name) {
                continue;
            }
            if let Value::Object(inner) = value {
                flatten(name, inner, &mut columns, &mut seen);
            }
        }

        let mut sql = format!("SELECT {ANCHOR}");
        let mut values = Vec::with_capacity(columns.len());
        for (i, (name, value)) in columns.into_iter().enumerate() {
            sql.push_str(&format!(", ?{} AS {}", i + 1, quote_ident(&name)));
            values.push(json_to_sql(value));
        }
        Self { sql, values }
    }
}

fn flatten<'a>(
    prefix: &str,
    obj: &'a serde_json::Map<String, Value>,
    columns: &mut Vec<(String, &'a Value)>,
    seen: &mut HashSet<String>,
) {
    for (key, value) in obj {
        let name = format!("{prefix}.{key}");
        if seen.insert(name.clone()) {
            columns.push((name.clone(), value));
        }
        if let Value::Object(inner) = value {
            flatten(&name, inner, columns, seen);
        }
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn json_to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Integer(i),
            None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => SqlValue::Text(s.clone()),
        other => SqlValue::Text(other.to_string()),
    }
}

fn sql_to_json(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::from(i),
        SqlValue::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        SqlValue::Text(s) => Value::String(s),
        SqlValue::Blob(b) => Value::String(String::from_utf8_lossy(&b).into_owned()),
    }
}
