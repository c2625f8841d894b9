use fastdao::{values, Dao, DaoConfig, DaoError, Dialect, Params, Row, Value};
use tests_common::{user_row, RecordingExecutor, UserAccount};

fn dao() -> (Dao<UserAccount, RecordingExecutor>, RecordingExecutor) {
    let x = RecordingExecutor::new();
    (Dao::new(x.clone()).unwrap(), x)
}

fn count_row(n: i64) -> Vec<Row> {
    vec![Row::new().with("COUNT(*)", n)]
}

#[tokio::test]
async fn save_ignore_null_generates_id_and_skips_nulls() {
    let (dao, x) = dao();
    let mut u = UserAccount::new("", Some("wang"), None);
    let id = dao.save_ignore_null(&mut u).await.unwrap();

    let parsed = uuid::Uuid::parse_str(&id).unwrap();
    assert_eq!(parsed.get_version_num(), 4);
    assert_eq!(u.id, id);
    let stmt = x.last().unwrap();
    assert_eq!(
        stmt.sql,
        format!("INSERT INTO user_account(id,user_name) VALUES('{id}',:userName)")
    );
    assert_eq!(stmt.params.get("userName"), Some(&Value::String("wang".into())));
}

#[tokio::test]
async fn save_writes_nulls_and_keeps_existing_id() {
    let (dao, x) = dao();
    let mut u = UserAccount::new("u1", Some("wang"), None);
    assert_eq!(dao.save(&mut u).await.unwrap(), "u1");
    assert_eq!(
        x.last_sql(),
        "INSERT INTO user_account(id,user_name,age) VALUES('u1',:userName,NULL)"
    );
}

#[tokio::test]
async fn save_that_affects_no_row_fails() {
    let (dao, x) = dao();
    x.push_update(0);
    let err = dao
        .save(&mut UserAccount::new("u1", None, None))
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::WriteFailed { op: "save", rows: 0, .. }));
}

#[tokio::test]
async fn update_sets_every_column() {
    let (dao, x) = dao();
    let u = UserAccount::new("u1", None, Some(30));
    assert_eq!(dao.update(&u).await.unwrap(), "u1");
    let stmt = x.last().unwrap();
    assert_eq!(
        stmt.sql,
        "UPDATE user_account SET user_name=NULL,age=:age WHERE id=:id"
    );
    assert_eq!(stmt.params.get("id"), Some(&Value::String("u1".into())));

    x.push_update(0);
    let err = dao.update(&u).await.unwrap_err();
    assert!(matches!(err, DaoError::WriteFailed { op: "update", .. }));
}

#[tokio::test]
async fn update_requires_an_id() {
    let (dao, x) = dao();
    let err = dao
        .update(&UserAccount::new("", Some("wang"), None))
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::MissingId { ref table } if table == "user_account"));
    let err = dao
        .update_ignore_null(&UserAccount::new("", Some("wang"), None))
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::MissingId { .. }));
    assert!(x.statements().is_empty());
}

#[tokio::test]
async fn update_ignore_null_skips_nulls_and_tolerates_misses() {
    let (dao, x) = dao();
    x.push_update(0);
    let id = dao
        .update_ignore_null(&UserAccount::new("u1", None, Some(30)))
        .await
        .unwrap();
    assert_eq!(id, "u1");
    assert_eq!(x.last_sql(), "UPDATE user_account SET age=:age WHERE id=:id");

    // Nothing to set: no statement at all.
    let id = dao
        .update_ignore_null(&UserAccount::new("u2", None, None))
        .await
        .unwrap();
    assert_eq!(id, "u2");
    assert_eq!(x.statements().len(), 1);
}

#[tokio::test]
async fn update_by_id_maps_keys_and_binds_id() {
    let (dao, x) = dao();
    let values = Params::new()
        .with("userName", Value::Null)
        .with("age", 3)
        .with("id", "ignored");
    assert_eq!(dao.update_by_id("u1", values).await.unwrap(), "u1");
    let stmt = x.last().unwrap();
    assert_eq!(
        stmt.sql,
        "UPDATE user_account SET age=:age,user_name=NULL WHERE id=:id"
    );
    assert_eq!(stmt.params.get("id"), Some(&Value::String("u1".into())));

    let err = dao
        .update_by_id("", Params::new().with("age", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::MissingId { .. }));

    dao.update_by_id("u1", Params::new()).await.unwrap();
    assert_eq!(x.statements().len(), 1);
}

#[tokio::test]
async fn update_where_merges_condition_params() {
    let (dao, x) = dao();
    x.push_update(4);
    let rows = dao
        .update_where(
            "user_name=:name",
            Params::new().with("name", "wang"),
            Params::new().with("age", 40),
        )
        .await
        .unwrap();
    assert_eq!(rows, 4);
    let stmt = x.last().unwrap();
    assert_eq!(stmt.sql, "UPDATE user_account SET age=:age WHERE user_name=:name");
    assert_eq!(
        stmt.params,
        Params::new().with("age", 40).with("name", "wang")
    );
}

#[tokio::test]
async fn update_where_condition_values_win_on_clash() {
    let (dao, x) = dao();
    dao.update_where(
        "age<:age",
        Params::new().with("age", 10),
        Params::new().with("age", 99),
    )
    .await
    .unwrap();
    assert_eq!(x.last().unwrap().params.get("age"), Some(&Value::I32(10)));

    // No columns: skipped, zero rows.
    let rows = dao
        .update_where("1=1", Params::new(), Params::new())
        .await
        .unwrap();
    assert_eq!(rows, 0);
    assert_eq!(x.statements().len(), 1);
}

#[tokio::test]
async fn update_where_can_set_the_id_column() {
    let (dao, x) = dao();
    let rows = dao
        .update_where(
            "id=:old",
            Params::new().with("old", "u1"),
            Params::new().with("id", "u2"),
        )
        .await
        .unwrap();
    assert_eq!(rows, 1);
    let stmt = x.last().unwrap();
    assert_eq!(stmt.sql, "UPDATE user_account SET id=:id WHERE id=:old");
    assert_eq!(
        stmt.params,
        Params::new().with("id", "u2").with("old", "u1")
    );
}

#[tokio::test]
async fn delete_variants_render_expected_sql() {
    let (dao, x) = dao();
    x.push_update(1).push_update(0).push_update(7);
    assert_eq!(dao.delete("u1").await.unwrap(), 1);
    assert_eq!(dao.delete("u1").await.unwrap(), 0);
    assert_eq!(dao.delete_all().await.unwrap(), 7);

    let sqls: Vec<_> = x.statements().into_iter().map(|s| s.sql).collect();
    assert_eq!(
        sqls,
        vec![
            "DELETE FROM user_account WHERE id=:id",
            "DELETE FROM user_account WHERE id=:id",
            "DELETE FROM user_account",
        ]
    );
}

#[tokio::test]
async fn delete_in_batch_counts_single_row_hits() {
    let (dao, x) = dao();
    x.push_update(1).push_update(0).push_update(1);
    let removed = dao.delete_in_batch(&["a", "b", "c"]).await.unwrap();
    assert_eq!(removed, 2);
    let ids: Vec<_> = x
        .statements()
        .into_iter()
        .map(|s| s.params.get("id").cloned())
        .collect();
    assert_eq!(
        ids,
        vec![
            Some(Value::String("a".into())),
            Some(Value::String("b".into())),
            Some(Value::String("c".into())),
        ]
    );

    assert_eq!(dao.delete_in_batch::<String>(&[]).await.unwrap(), 0);
    assert_eq!(x.statements().len(), 3);
}

#[tokio::test]
async fn find_one_maps_hit_and_reports_miss_as_none() {
    let (dao, x) = dao();
    x.push_rows(vec![user_row("u1", Some("wang"), Some(23))]);
    let hit = dao.find_one("u1").await.unwrap();
    assert_eq!(hit, Some(UserAccount::new("u1", Some("wang"), Some(23))));
    assert_eq!(x.last_sql(), "SELECT * FROM user_account WHERE id=:id");

    assert_eq!(dao.find_one("nobody").await.unwrap(), None);

    x.push_rows(vec![user_row("u1", None, None), user_row("u1", None, None)]);
    let err = dao.find_one("u1").await.unwrap_err();
    assert!(matches!(err, DaoError::IncorrectResultSize { actual: 2 }));
}

#[tokio::test]
async fn find_one_where_rejects_several_rows() {
    let (dao, x) = dao();
    x.push_rows(vec![
        user_row("a", Some("wang"), Some(30)),
        user_row("b", Some("wang"), Some(40)),
    ]);
    let err = dao
        .find_one_where("user_name=:1 AND age>:2", &values!["wang", 23])
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::TooManyResults { count: 2, .. }));

    let stmt = x.last().unwrap();
    assert_eq!(
        stmt.sql,
        "SELECT * FROM user_account WHERE user_name=:1 AND age>:2"
    );
    assert_eq!(
        stmt.params,
        Params::new().with("1", "wang").with("2", 23)
    );
}

#[tokio::test]
async fn find_one_where_single_row_and_miss() {
    let (dao, x) = dao();
    x.push_rows(vec![user_row("a", Some("wang"), None)]);
    let found = dao
        .find_one_where("user_name=:1", &values!["wang"])
        .await
        .unwrap();
    assert_eq!(found.map(|u| u.id), Some("a".to_string()));
    assert_eq!(
        dao.find_one_where("user_name=:1", &values!["li"])
            .await
            .unwrap(),
        None
    );

    let err = dao.find_one_where("  ", &[]).await.unwrap_err();
    assert!(matches!(err, DaoError::InvalidArgument(_)));
}

#[tokio::test]
async fn list_queries_bind_positional_entity_and_map_params() {
    let (dao, x) = dao();
    x.push_rows(vec![user_row("a", None, Some(20)), user_row("b", None, Some(30))]);
    let list = dao.find_list_where("age>:1", &values![18]).await.unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].age, Some(30));

    let filter = UserAccount::new("", Some("wang"), None);
    dao.find_list_where_entity("user_name=:userName", &filter)
        .await
        .unwrap();
    let params = x.last().unwrap().params;
    assert_eq!(params.get("userName"), Some(&Value::String("wang".into())));
    assert_eq!(params.get("age"), Some(&Value::Null));

    dao.find_list_where_map("age<:max", &Params::new().with("max", 9))
        .await
        .unwrap();
    assert_eq!(x.last_sql(), "SELECT * FROM user_account WHERE age<:max");
}

#[tokio::test]
async fn count_where_reads_the_count_column() {
    let (dao, x) = dao();
    x.push_rows(count_row(3));
    assert_eq!(dao.count_where("age>:1", &values![18]).await.unwrap(), 3);
    assert_eq!(x.last_sql(), "SELECT COUNT(*) FROM user_account WHERE age>:1");
}

#[tokio::test]
async fn find_page_where_runs_rows_then_count_with_shared_params() {
    let (dao, x) = dao();
    x.push_rows(vec![user_row("a", None, Some(19))])
        .push_rows(count_row(11));
    let page = dao
        .find_page_where(2, 10, "age>:1", &values![18])
        .await
        .unwrap();
    assert_eq!(page.total, 11);
    assert_eq!(page.rows.len(), 1);

    let stmts = x.statements();
    assert_eq!(stmts.len(), 2);
    assert!(stmts[0].sql.ends_with("LIMIT 10 OFFSET 10"), "{}", stmts[0].sql);
    assert!(stmts[1].sql.starts_with("SELECT COUNT(*) FROM"), "{}", stmts[1].sql);
    assert_eq!(stmts[0].params, stmts[1].params);
    assert_eq!(stmts[0].params, Params::new().with("1", 18));
}

#[tokio::test]
async fn find_page_where_clamps_page_and_rejects_zero_size() {
    let (dao, x) = dao();
    x.push_rows(Vec::new()).push_rows(count_row(0));
    let page = dao.find_page_where(0, 5, "1=1", &[]).await.unwrap();
    assert!(page.rows.is_empty());
    assert!(x.statements()[0].sql.ends_with("LIMIT 5 OFFSET 0"));

    let err = dao.find_page_where(1, 0, "1=1", &[]).await.unwrap_err();
    assert!(matches!(err, DaoError::InvalidArgument(_)));
    assert_eq!(x.statements().len(), 2);
}

#[tokio::test]
async fn find_page_where_entity_binds_bean_params() {
    let (dao, x) = dao();
    x.push_rows(Vec::new()).push_rows(count_row(0));
    let filter = UserAccount::new("", None, Some(18));
    dao.find_page_where_entity(1, 10, "age>:age", &filter)
        .await
        .unwrap();
    let stmts = x.statements();
    assert_eq!(stmts[0].params.get("age"), Some(&Value::I32(18)));
    assert_eq!(stmts[0].params, stmts[1].params);
}

#[tokio::test]
async fn row_number_dialect_from_config() {
    let x = RecordingExecutor::new();
    let config: DaoConfig = serde_json::from_str(r#"{"dialect":"ROW_NUMBER_WINDOW"}"#).unwrap();
    let dao: Dao<UserAccount, _> = Dao::with_config(x.clone(), config).unwrap();
    assert_eq!(dao.dialect(), Dialect::RowNumberWindow);

    x.push_rows(Vec::new()).push_rows(count_row(0));
    dao.find_page_where(2, 10, "age>:1 ORDER BY age", &values![18])
        .await
        .unwrap();
    let stmts = x.statements();
    assert!(stmts[0].sql.contains("ROW_NUMBER() OVER (ORDER BY age)"));
    assert!(stmts[0].sql.ends_with("BETWEEN 11 AND 20 ORDER BY paged_.row_num_"));
    assert_eq!(
        stmts[1].sql,
        "SELECT COUNT(*) FROM user_account WHERE age>:1"
    );
}

#[tokio::test]
async fn raw_sql_maps_pass_through() {
    let (dao, x) = dao();
    x.push_rows(vec![Row::new().with("n", 2i64)]);
    let row = dao
        .find_map_by_sql("SELECT COUNT(*) AS n FROM t", &Params::new())
        .await
        .unwrap();
    assert_eq!(row.get("N"), Some(&Value::I64(2)));

    let err = dao
        .find_map_by_sql("SELECT * FROM t", &Params::new())
        .await
        .unwrap_err();
    assert!(err.is_empty_result());

    x.push_rows(vec![Row::new().with("a", 1), Row::new().with("a", 2)]);
    let rows = dao
        .find_map_list_by_sql("SELECT a FROM t", &Params::new())
        .await
        .unwrap();
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn clones_share_descriptor_and_executor() {
    let (dao, x) = dao();
    let other = dao.clone();
    other.delete("u1").await.unwrap();
    assert_eq!(x.statements().len(), 1);
    assert_eq!(dao.descriptor().table_name(), other.descriptor().table_name());
}
