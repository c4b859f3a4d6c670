use serde_json::Value;
use std::cmp::Ordering;

use super::filter::compare_values;
use super::{resolve, ODataError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub path: Vec<String>,
    pub descending: bool,
}

/// Parses `Name desc, Category/Name`.
pub fn parse(input: &str) -> Result<Vec<OrderBy>, ODataError> {
    input
        .split(',')
        .map(|clause| {
            let mut parts = clause.split_whitespace();
            let property = parts
                .next()
                .ok_or_else(|| ODataError::InvalidOrderBy(clause.trim().to_string()))?;
            let descending = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                None | Some("asc") => false,
                Some("desc") => true,
                Some(_) => return Err(ODataError::InvalidOrderBy(clause.trim().to_string())),
            };
            if parts.next().is_some() {
                return Err(ODataError::InvalidOrderBy(clause.trim().to_string()));
            }
            Ok(OrderBy {
                path: property.split('/').map(str::to_string).collect(),
                descending,
            })
        })
        .collect()
}

fn rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn total_cmp(left: &Value, right: &Value) -> Ordering {
    compare_values(left, right).unwrap_or_else(|| rank(left).cmp(&rank(right)))
}

pub fn sort(rows: &mut [Value], clauses: &[OrderBy]) {
    if clauses.is_empty() {
        return;
    }
    rows.sort_by(|a, b| {
        clauses
            .iter()
            .map(|clause| {
                let left = resolve(a, &clause.path).unwrap_or(&Value::Null);
                let right = resolve(b, &clause.path).unwrap_or(&Value::Null);
                let ordering = total_cmp(left, right);
                if clause.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            })
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_directions() {
        let clauses = parse("Name desc, Category/Name").unwrap();
        assert_eq!(clauses.len(), 2);
        assert!(clauses[0].descending);
        assert_eq!(clauses[1].path, vec!["Category".to_string(), "Name".to_string()]);
        assert!(!clauses[1].descending);
    }

    #[test]
    fn rejects_unknown_direction() {
        assert!(parse("Name sideways").is_err());
        assert!(parse("Name,").is_err());
    }

    #[test]
    fn sorts_with_nulls_first_and_ties_broken() {
        let mut rows = vec![
            json!({"color": "Red", "weight": 2.0}),
            json!({"color": null, "weight": 9.0}),
            json!({"color": "Black", "weight": 5.0}),
            json!({"color": "Red", "weight": 1.0}),
        ];
        sort(&mut rows, &parse("Color, Weight desc").unwrap());

        let weights: Vec<f64> = rows.iter().map(|r| r["weight"].as_f64().unwrap()).collect();
        assert_eq!(weights, vec![9.0, 5.0, 2.0, 1.0]);
    }
}
