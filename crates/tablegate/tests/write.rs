mod common;

use common::{RecordingGateway, author_columns, catalog, looks_like_timestamp};
use tablegate::{
    ColumnValues, Dialect, ErrorKind, MatchCriteria, Model, ModelConfig, QueryParameters,
    RecordLike, StaticCatalog, TracingGateway, Value, WriteOutcome,
};

fn config() -> ModelConfig {
    ModelConfig::new("authors", "author_id")
        .created_timestamp_column("date_created")
        .updated_timestamp_column("m_timestamp")
}

fn authors(gateway: &RecordingGateway) -> Model<&RecordingGateway> {
    Model::new(config(), &catalog(), gateway).unwrap()
}

#[test]
fn insert_stamps_and_reads_back_key() {
    let db = RecordingGateway::new(Dialect::Postgres);
    db.set_generated_key(Some(Value::Int(42)));
    let model = authors(&db);

    let outcome = model
        .insert(&ColumnValues::new().with("name", "Ann"))
        .unwrap();

    let sent = db.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, "execute");
    assert_eq!(
        sent[0].sql,
        "INSERT INTO authors (name, date_created, m_timestamp) VALUES ($1, $2, $3)"
    );
    assert_eq!(sent[0].params[0], Value::from("Ann"));
    assert!(looks_like_timestamp(&sent[0].params[1]));
    assert_eq!(sent[0].params[1], sent[0].params[2]);
    assert_eq!(db.sequences(), vec![Some("authors_author_id_seq".to_string())]);

    let row = outcome.into_inserted().unwrap();
    assert_eq!(row.get("author_id"), Some(&Value::Int(42)));
    assert_eq!(row.get("name"), Some(&Value::from("Ann")));
    assert!(looks_like_timestamp(row.get("date_created").unwrap()));
}

#[test]
fn insert_drops_unknown_and_empty_autoinc_columns() {
    let db = RecordingGateway::new(Dialect::MySql);
    db.set_generated_key(Some(Value::from("7")));
    let model = Model::new(
        ModelConfig::new("authors", "author_id"),
        &catalog(),
        &db,
    )
    .unwrap();

    let payload = ColumnValues::new()
        .with("author_id", "")
        .with("name", "Ann")
        .with("nickname", "annie");
    model.insert(&payload).unwrap();

    let sent = &db.sent()[0];
    assert_eq!(sent.sql, "INSERT INTO authors (name) VALUES (?)");
    assert_eq!(sent.params, vec![Value::from("Ann")]);
    assert_eq!(db.sequences(), vec![None]);
}

#[test]
fn insert_keeps_explicit_autoinc_value() {
    let db = RecordingGateway::new(Dialect::Sqlite);
    db.set_generated_key(Some(Value::Int(100)));
    let model = Model::new(ModelConfig::new("authors", "author_id"), &catalog(), &db).unwrap();

    model
        .insert(&ColumnValues::new().with("author_id", 100).with("name", "Ann"))
        .unwrap();

    assert_eq!(
        db.sent_sql(),
        vec!["INSERT INTO authors (author_id, name) VALUES (?, ?)"]
    );
}

#[test]
fn insert_without_generated_key_fails() {
    let db = RecordingGateway::new(Dialect::Postgres);
    let model = authors(&db);

    let err = model
        .insert(&ColumnValues::new().with("name", "Ann"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PrimaryKeyNotRetrievableAfterInsert);

    db.set_generated_key(Some(Value::from("")));
    let err = model
        .insert(&ColumnValues::new().with("name", "Bob"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PrimaryKeyNotRetrievableAfterInsert);
}

#[test]
fn insert_rejects_empty_payload() {
    let db = RecordingGateway::new(Dialect::Postgres);
    let model = authors(&db);

    let err = model.insert(&ColumnValues::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyPayload);
    assert!(db.sent().is_empty());
}

#[test]
fn insert_with_only_unknown_columns_sends_nothing() {
    for dialect in [Dialect::Postgres, Dialect::MySql] {
        let db = RecordingGateway::new(dialect);
        db.set_generated_key(Some(Value::Int(1)));
        let model = Model::new(ModelConfig::new("authors", "author_id"), &catalog(), &db).unwrap();

        let err = model
            .insert(&ColumnValues::new().with("nickname", "annie"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyPayload);
        assert!(db.sent().is_empty());
    }
}

#[test]
fn update_with_only_unknown_columns_sends_nothing() {
    let db = RecordingGateway::new(Dialect::Postgres);
    db.push_count(1).push_affected(1);
    let model = Model::new(ModelConfig::new("authors", "author_id"), &catalog(), &db).unwrap();

    let err = model
        .update_matching(
            &ColumnValues::new().with("nickname", "annie"),
            &MatchCriteria::new().with("author_id", 5),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EmptyPayload);
    assert!(db.sent().is_empty());
}

#[test]
fn update_counts_then_updates() {
    let db = RecordingGateway::new(Dialect::Postgres);
    db.push_count(1).push_affected(1);
    let model = authors(&db);

    let outcome = model
        .update_matching(
            &ColumnValues::new().with("name", "Ann B.").with("junk", 1),
            &MatchCriteria::new().with("author_id", 5),
        )
        .unwrap();
    assert_eq!(outcome.affected(), Some(1));

    let sent = db.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(
        sent[0].sql,
        "SELECT COUNT(*) AS num_of_matched_records FROM authors WHERE author_id = $1"
    );
    assert_eq!(sent[0].params, vec![Value::Int(5)]);
    assert_eq!(
        sent[1].sql,
        "UPDATE authors SET name = $1, m_timestamp = $2 WHERE author_id = $3"
    );
    assert_eq!(sent[1].params[0], Value::from("Ann B."));
    assert!(looks_like_timestamp(&sent[1].params[1]));
    assert_eq!(sent[1].params[2], Value::Int(5));
}

#[test]
fn zero_count_skips_mutation() {
    let db = RecordingGateway::new(Dialect::Postgres);
    db.push_count(0);
    let model = authors(&db);

    let outcome = model
        .update_matching(
            &ColumnValues::new().with("name", "x"),
            &MatchCriteria::new().with("author_id", 999),
        )
        .unwrap();
    assert!(outcome.is_no_matching_rows());

    db.push_count("0");
    let outcome = model
        .delete_matching(&MatchCriteria::new().with("author_id", 999))
        .unwrap();
    assert_eq!(outcome, WriteOutcome::NoMatchingRows);

    assert!(db.sent().iter().all(|s| s.kind == "query"));
    assert_eq!(db.sent().len(), 2);
}

#[test]
fn delete_with_list_criteria_renders_inline() {
    let db = RecordingGateway::new(Dialect::Postgres);
    db.push_count(2).push_affected(2);
    let model = authors(&db);

    let outcome = model
        .delete_matching(
            &MatchCriteria::new()
                .with_list("author_id", vec![Value::Int(1), Value::Int(2)])
                .with("name", "Ann"),
        )
        .unwrap();
    assert_eq!(outcome.affected(), Some(2));

    assert_eq!(
        db.sent_sql(),
        vec![
            "SELECT COUNT(*) AS num_of_matched_records FROM authors WHERE author_id IN (1, 2) AND name = $1",
            "DELETE FROM authors WHERE author_id IN (1, 2) AND name = $1",
        ]
    );
}

#[test]
fn delete_without_criteria_sends_nothing() {
    let db = RecordingGateway::new(Dialect::Postgres);
    let model = authors(&db);

    let outcome = model.delete_matching(&MatchCriteria::new()).unwrap();
    assert!(outcome.is_no_matching_rows());
    assert!(db.sent().is_empty());
}

#[test]
fn update_without_criteria_touches_every_row() {
    let db = RecordingGateway::new(Dialect::Sqlite);
    db.push_count(3).push_affected(3);
    let model = Model::new(ModelConfig::new("authors", "author_id"), &catalog(), &db).unwrap();

    model
        .update_matching(&ColumnValues::new().with("email", Value::Null), &MatchCriteria::new())
        .unwrap();

    assert_eq!(
        db.sent_sql(),
        vec![
            "SELECT COUNT(*) AS num_of_matched_records FROM authors",
            "UPDATE authors SET email = ?",
        ]
    );
}

#[test]
fn criteria_from_json_rejects_nested_objects() {
    let err = MatchCriteria::from_json(&serde_json::json!({"author_id": {"gt": 1}})).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadWhereParam);
}

#[test]
fn record_round_trip() {
    let db = RecordingGateway::new(Dialect::Postgres);
    db.push_count(1).push_affected(1);
    db.push_count(1).push_affected(1);
    let model = authors(&db);

    let mut record = model.create_record(
        ColumnValues::new().with("author_id", 3).with("name", "Ann"),
        false,
    );
    record.set("name", "Anne");

    model.update_record(&record).unwrap();
    assert!(!record.is_new());

    let outcome = model.delete_record(&mut record).unwrap();
    assert_eq!(outcome.affected(), Some(1));
    assert!(record.is_new());
    assert_eq!(record.data().get("name"), Some(&Value::from("Anne")));

    let sql = db.sent_sql();
    assert_eq!(sql.len(), 4);
    assert!(sql[1].starts_with("UPDATE authors SET author_id = $1, name = $2, m_timestamp = $3"));
    assert_eq!(sql[3], "DELETE FROM authors WHERE author_id = $1");
}

#[test]
fn delete_record_keeps_state_when_nothing_matched() {
    let db = RecordingGateway::new(Dialect::Postgres);
    db.push_count(0);
    let model = authors(&db);

    let mut record = model.create_record(ColumnValues::new().with("author_id", 3), false);
    let outcome = model.delete_record(&mut record).unwrap();
    assert!(outcome.is_no_matching_rows());
    assert!(!record.is_new());
}

#[test]
fn tracing_gateway_is_transparent() {
    let db = RecordingGateway::new(Dialect::Postgres);
    db.set_generated_key(Some(Value::Int(1)));
    db.push_rows(vec![tablegate::Row::new().with("name", "Ann")]);
    let model = Model::new(config(), &catalog(), TracingGateway::new(&db).max_sql_length(16)).unwrap();

    model.insert(&ColumnValues::new().with("name", "Ann")).unwrap();
    let names = model
        .fetch_col(&QueryParameters::new().cols(["name"]))
        .unwrap();

    assert_eq!(names, vec![Value::from("Ann")]);
    assert_eq!(db.sent().len(), 2);
    assert!(db.sent()[0].sql.starts_with("INSERT INTO authors"));
}

#[test]
fn configuration_errors() {
    let db = RecordingGateway::new(Dialect::Postgres);

    let err = Model::new(ModelConfig::new("authors", ""), &catalog(), &db)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::PrimaryColumnNotConfigured);
    assert!(err.is_configuration());

    let err = Model::new(ModelConfig::new("", "id"), &catalog(), &db)
        .err()
        .unwrap();
    assert_eq!(err.kind(), ErrorKind::TableNameNotConfigured);

    let err = Model::new(ModelConfig::new("books", "id"), &catalog(), &db)
        .err()
        .unwrap();
    assert!(err.is_gateway());

    let err = ModelConfig::from_json_str("{ not json").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidConfig);
}

#[test]
fn preloaded_columns_skip_the_catalog() {
    let db = RecordingGateway::new(Dialect::Postgres);
    let model = Model::new(
        config().table_cols(author_columns()),
        &StaticCatalog::new(),
        &db,
    )
    .unwrap();
    assert_eq!(
        model.table_cols(),
        vec!["author_id", "name", "email", "date_created", "m_timestamp"]
    );
}
