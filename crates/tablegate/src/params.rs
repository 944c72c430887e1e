//! Typed fetch parameters.
//!
//! [`QueryParameters`] carries the eight recognized fetch options. Each field
//! is optional so "absent" and "present but empty" stay distinguishable, the
//! way the untyped dictionary form distinguishes a missing key from an empty
//! list.

use crate::condition::{Clause, ConditionSpec};
use crate::error::{ErrorKind, OrmError, OrmResult};
use std::fmt;

/// Names of the recognized parameter keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Distinct,
    Cols,
    Where,
    Having,
    Group,
    Order,
    LimitSize,
    LimitOffset,
}

impl ParamKey {
    pub const ALL: [ParamKey; 8] = [
        ParamKey::Distinct,
        ParamKey::Cols,
        ParamKey::Where,
        ParamKey::Having,
        ParamKey::Group,
        ParamKey::Order,
        ParamKey::LimitSize,
        ParamKey::LimitOffset,
    ];

    /// Dictionary key for this parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::Distinct => "distinct",
            ParamKey::Cols => "cols",
            ParamKey::Where => "where",
            ParamKey::Having => "having",
            ParamKey::Group => "group",
            ParamKey::Order => "order",
            ParamKey::LimitSize => "limit_size",
            ParamKey::LimitOffset => "limit_offset",
        }
    }

    /// Look up a key by its dictionary name.
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == key)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fetch options for a SELECT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParameters {
    pub distinct: Option<bool>,
    pub cols: Option<Vec<String>>,
    pub r#where: Option<ConditionSpec>,
    pub having: Option<ConditionSpec>,
    pub group: Option<Vec<String>>,
    pub order: Option<Vec<String>>,
    pub limit_size: Option<u64>,
    pub limit_offset: Option<u64>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distinct(mut self, distinct: bool) -> Self {
        self.distinct = Some(distinct);
        self
    }

    /// Columns or expressions to select, passed through as written.
    pub fn cols<I, S>(mut self, cols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cols = Some(cols.into_iter().map(Into::into).collect());
        self
    }

    /// WHERE conditions.
    pub fn filter(mut self, spec: ConditionSpec) -> Self {
        self.r#where = Some(spec);
        self
    }

    /// HAVING conditions.
    pub fn having(mut self, spec: ConditionSpec) -> Self {
        self.having = Some(spec);
        self
    }

    pub fn group<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group = Some(group.into_iter().map(Into::into).collect());
        self
    }

    pub fn order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit_size = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.limit_offset = Some(n);
        self
    }

    /// Whether the given key was supplied.
    pub fn has(&self, key: ParamKey) -> bool {
        match key {
            ParamKey::Distinct => self.distinct.is_some(),
            ParamKey::Cols => self.cols.is_some(),
            ParamKey::Where => self.r#where.is_some(),
            ParamKey::Having => self.having.is_some(),
            ParamKey::Group => self.group.is_some(),
            ParamKey::Order => self.order.is_some(),
            ParamKey::LimitSize => self.limit_size.is_some(),
            ParamKey::LimitOffset => self.limit_offset.is_some(),
        }
    }

    /// True when no key was supplied at all.
    pub fn is_empty(&self) -> bool {
        !ParamKey::ALL.iter().any(|k| self.has(*k))
    }

    /// Parse the untyped dictionary form.
    ///
    /// Unknown keys are ignored. List-valued keys must hold lists (and,
    /// for `cols`, `group` and `order`, lists of strings); limits must be
    /// non-negative numbers or numeric strings no larger than `i64::MAX`.
    pub fn from_json(json: &serde_json::Value) -> OrmResult<Self> {
        Self::from_json_filtered(json, &[])
    }

    /// Like [`from_json`](Self::from_json), but `disallowed` keys are
    /// dropped before their values are validated.
    pub fn from_json_filtered(
        json: &serde_json::Value,
        disallowed: &[ParamKey],
    ) -> OrmResult<Self> {
        let obj = json.as_object().ok_or_else(|| {
            OrmError::new(
                ErrorKind::BadFetchParams,
                format!("fetch params must be an object, got {json}"),
            )
        })?;

        let mut params = QueryParameters::new();
        for (key, value) in obj {
            let Some(key) = ParamKey::parse(key).filter(|k| !disallowed.contains(k)) else {
                continue;
            };
            match key {
                ParamKey::Distinct => params.distinct = Some(truthy(value)),
                ParamKey::Cols => {
                    params.cols = Some(string_list(value, ErrorKind::BadColsParam, key)?)
                }
                ParamKey::Where => {
                    params.r#where = Some(ConditionSpec::from_json(value, Clause::Where)?)
                }
                ParamKey::Having => {
                    params.having = Some(ConditionSpec::from_json(value, Clause::Having)?)
                }
                ParamKey::Group => {
                    params.group = Some(string_list(value, ErrorKind::BadGroupByParam, key)?)
                }
                ParamKey::Order => {
                    params.order = Some(string_list(value, ErrorKind::BadOrderByParam, key)?)
                }
                ParamKey::LimitSize => params.limit_size = Some(limit_value(value, key)?),
                ParamKey::LimitOffset => params.limit_offset = Some(limit_value(value, key)?),
            }
        }
        Ok(params)
    }
}

fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Array(items) => !items.is_empty(),
        serde_json::Value::Object(map) => !map.is_empty(),
        scalar => crate::value::Value::from_json(scalar).is_some_and(|v| !v.is_empty()),
    }
}

fn string_list(value: &serde_json::Value, kind: ErrorKind, key: ParamKey) -> OrmResult<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| OrmError::new(kind, format!("expected a list for '{key}', got {value}")))?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                OrmError::new(kind, format!("entries of '{key}' must be strings, got {item}"))
            })
        })
        .collect()
}

fn limit_value(value: &serde_json::Value, key: ParamKey) -> OrmResult<u64> {
    let bad = || {
        OrmError::new(
            ErrorKind::BadLimitParam,
            format!("expected a non-negative integer for '{key}', got {value}"),
        )
    };
    // limits must fit a signed 64-bit column on every backend
    const MAX: u64 = i64::MAX as u64;
    let from_int = |n: u64| (n <= MAX).then_some(n);
    let from_float =
        |f: f64| (f.is_finite() && f >= 0.0 && f < MAX as f64).then(|| f.trunc() as u64);

    let limit = match value {
        serde_json::Value::Number(n) => match n.as_u64() {
            Some(n) => from_int(n),
            None => n.as_f64().and_then(from_float),
        },
        serde_json::Value::String(s) => {
            let s = s.trim();
            match s.parse::<u64>() {
                Ok(n) => from_int(n),
                Err(_) => s.parse::<f64>().ok().and_then(from_float),
            }
        }
        _ => None,
    };
    limit.ok_or_else(bad)
}
