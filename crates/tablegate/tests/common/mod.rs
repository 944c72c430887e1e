#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use tablegate::{
    ColumnMetadata, Dialect, ExecutionGateway, OrmError, OrmResult, Row, StaticCatalog, Value,
};

/// A statement the gateway was asked to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Sent {
    pub kind: &'static str,
    pub sql: String,
    pub params: Vec<Value>,
}

/// In-memory gateway that records statements and replays scripted results.
pub struct RecordingGateway {
    dialect: Dialect,
    sent: Mutex<Vec<Sent>>,
    query_results: Mutex<VecDeque<Vec<Row>>>,
    affected: Mutex<VecDeque<u64>>,
    generated_key: Mutex<Option<Value>>,
    sequences: Mutex<Vec<Option<String>>>,
    fail_with: Mutex<Option<String>>,
}

impl RecordingGateway {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sent: Mutex::new(Vec::new()),
            query_results: Mutex::new(VecDeque::new()),
            affected: Mutex::new(VecDeque::new()),
            generated_key: Mutex::new(None),
            sequences: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
        }
    }

    /// Queue the rows returned by the next query.
    pub fn push_rows(&self, rows: Vec<Row>) -> &Self {
        self.query_results.lock().unwrap().push_back(rows);
        self
    }

    /// Queue a COUNT pre-check result.
    pub fn push_count(&self, n: impl Into<Value>) -> &Self {
        self.push_rows(vec![Row::new().with(tablegate::COUNT_ALIAS, n)])
    }

    /// Queue the affected count of the next command.
    pub fn push_affected(&self, n: u64) -> &Self {
        self.affected.lock().unwrap().push_back(n);
        self
    }

    pub fn set_generated_key(&self, key: Option<Value>) {
        *self.generated_key.lock().unwrap() = key;
    }

    /// Make every following statement fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.fail_with.lock().unwrap() = Some(message.to_string());
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_sql(&self) -> Vec<String> {
        self.sent().into_iter().map(|s| s.sql).collect()
    }

    pub fn sequences(&self) -> Vec<Option<String>> {
        self.sequences.lock().unwrap().clone()
    }

    fn record(&self, kind: &'static str, sql: &str, params: &[Value]) -> OrmResult<()> {
        if let Some(message) = self.fail_with.lock().unwrap().clone() {
            return Err(OrmError::gateway_msg(message));
        }
        self.sent.lock().unwrap().push(Sent {
            kind,
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        Ok(())
    }
}

impl ExecutionGateway for RecordingGateway {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn query(&self, sql: &str, params: &[Value]) -> OrmResult<Vec<Row>> {
        self.record("query", sql, params)?;
        Ok(self.query_results.lock().unwrap().pop_front().unwrap_or_default())
    }

    fn execute(&self, sql: &str, params: &[Value]) -> OrmResult<u64> {
        self.record("execute", sql, params)?;
        Ok(self.affected.lock().unwrap().pop_front().unwrap_or(1))
    }

    fn last_insert_id(&self, sequence: Option<&str>) -> OrmResult<Option<Value>> {
        self.sequences
            .lock()
            .unwrap()
            .push(sequence.map(str::to_string));
        Ok(self.generated_key.lock().unwrap().clone())
    }
}

/// `authors(author_id serial pk, name, email, date_created, m_timestamp)`
pub fn author_columns() -> Vec<ColumnMetadata> {
    vec![
        ColumnMetadata::new("author_id", "integer").primary().autoinc(),
        ColumnMetadata::new("name", "varchar").size(255).not_null(),
        ColumnMetadata::new("email", "varchar").size(255),
        ColumnMetadata::new("date_created", "timestamp"),
        ColumnMetadata::new("m_timestamp", "timestamp"),
    ]
}

pub fn catalog() -> StaticCatalog {
    StaticCatalog::new().with_table("authors", author_columns())
}

/// Checks the `YYYY-MM-DD HH:MM:SS` shape of an injected timestamp.
pub fn looks_like_timestamp(value: &Value) -> bool {
    let Some(s) = value.as_str() else {
        return false;
    };
    s.len() == 19
        && s.char_indices().all(|(i, c)| match i {
            4 | 7 => c == '-',
            10 => c == ' ',
            13 | 16 => c == ':',
            _ => c.is_ascii_digit(),
        })
}
