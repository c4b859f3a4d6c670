//! OData query options (`$filter`, `$orderby`, `$select`, `$top`, `$skip`)
//! evaluated over projected JSON rows.
//!
//! Property names match case-insensitively, so `$select=Color,Name` works against
//! camelCase output. Nested properties are addressed with `/`.

pub mod filter;
pub mod order;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub use filter::Expr;
pub use order::OrderBy;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ODataError {
    #[error("unexpected character '{0}' at position {1}")]
    UnexpectedChar(char, usize),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unexpected token {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function '{name}' expects {expected} argument(s)")]
    Arity { name: &'static str, expected: usize },

    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),

    #[error("expression has more than {0} terms")]
    TooLarge(usize),

    #[error("invalid $orderby clause '{0}'")]
    InvalidOrderBy(String),

    #[error("unknown property '{0}' in $select")]
    UnknownProperty(String),
}

/// Raw query-string options as they arrive on the request.
#[derive(Debug, Default, Deserialize)]
pub struct QueryOptions {
    #[serde(rename = "$filter")]
    pub filter: Option<String>,
    #[serde(rename = "$orderby")]
    pub orderby: Option<String>,
    #[serde(rename = "$select")]
    pub select: Option<String>,
    #[serde(rename = "$top")]
    pub top: Option<usize>,
    #[serde(rename = "$skip")]
    pub skip: Option<usize>,
}

#[derive(Debug, Default)]
pub struct ODataQuery {
    filter: Option<Expr>,
    order_by: Vec<OrderBy>,
    select: Option<Vec<String>>,
    top: Option<usize>,
    skip: Option<usize>,
}

#[derive(Debug)]
pub struct QueryOutcome {
    /// Rows left after `$filter`, before paging.
    pub total: usize,
    pub rows: Vec<Value>,
}

/// Case-insensitive property lookup along `path`.
pub(crate) fn resolve<'a>(row: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(row, |current, segment| {
        current
            .as_object()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(segment))
            .map(|(_, value)| value)
    })
}

fn non_empty(option: &Option<String>) -> Option<&str> {
    option.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ODataQuery {
    pub fn parse(options: &QueryOptions) -> Result<Self, ODataError> {
        let filter = non_empty(&options.filter).map(filter::parse).transpose()?;
        let order_by = match non_empty(&options.orderby) {
            Some(orderby) => order::parse(orderby)?,
            None => Vec::new(),
        };
        let select = non_empty(&options.select).map(|select| {
            select
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
        });

        Ok(Self {
            filter,
            order_by,
            select,
            top: options.top,
            skip: options.skip,
        })
    }

    /// Runs filter, count, order, skip, top and select in that order.
    /// `properties` lists the top-level names `$select` may name.
    pub fn apply(&self, rows: Vec<Value>, properties: &[&str]) -> Result<QueryOutcome, ODataError> {
        let selected = self.selected_properties(properties)?;

        let mut rows: Vec<Value> = match &self.filter {
            Some(expr) => rows.into_iter().filter(|row| expr.matches(row)).collect(),
            None => rows,
        };
        let total = rows.len();

        order::sort(&mut rows, &self.order_by);

        let rows = rows
            .into_iter()
            .skip(self.skip.unwrap_or(0))
            .take(self.top.unwrap_or(usize::MAX))
            .map(|row| match &selected {
                Some(keep) => project(row, keep),
                None => row,
            })
            .collect();

        Ok(QueryOutcome { total, rows })
    }

    fn selected_properties(&self, properties: &[&str]) -> Result<Option<Vec<String>>, ODataError> {
        let Some(select) = &self.select else {
            return Ok(None);
        };
        if select.iter().any(|p| p == "*") {
            return Ok(None);
        }

        select
            .iter()
            .map(|requested| {
                properties
                    .iter()
                    .find(|known| known.eq_ignore_ascii_case(requested))
                    .map(|known| known.to_string())
                    .ok_or_else(|| ODataError::UnknownProperty(requested.clone()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }
}

fn project(row: Value, keep: &[String]) -> Value {
    match row {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| keep.contains(key))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}
