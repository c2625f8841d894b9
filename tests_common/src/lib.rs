//! Common integration testing utilities and generic scenarios reusable across executors.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use fastdao::{
    values, Dao, DaoError, DaoResult, Entity, NamedParameterExecutor, Params, Row, Value,
};

#[derive(Entity, Default, Clone, Debug, PartialEq)]
pub struct UserAccount {
    pub id: String,
    pub user_name: Option<String>,
    pub age: Option<i32>,
}

impl UserAccount {
    pub fn new(id: &str, user_name: Option<&str>, age: Option<i32>) -> Self {
        Self {
            id: id.to_string(),
            user_name: user_name.map(str::to_string),
            age,
        }
    }
}

/// Expose migration SQL via constants for harnesses.
pub mod migrations {
    pub const LIBSQL_USER_ACCOUNT_SQL: &str =
        include_str!("../migrations/libsql/001_user_account.sql");
}

/// One statement seen by a [`RecordingExecutor`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Params,
}

#[derive(Default)]
struct Recorded {
    statements: Vec<Statement>,
    updates: VecDeque<u64>,
    rows: VecDeque<Vec<Row>>,
}

/// An executor that records every statement and replays scripted results.
///
/// Unscripted updates report one affected row; unscripted queries return no rows.
#[derive(Clone, Default)]
pub struct RecordingExecutor {
    state: Arc<Mutex<Recorded>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Queues the affected-row count of the next update (or batch entry).
    pub fn push_update(&self, rows: u64) -> &Self {
        self.lock().updates.push_back(rows);
        self
    }

    /// Queues the result set of the next query.
    pub fn push_rows(&self, rows: Vec<Row>) -> &Self {
        self.lock().rows.push_back(rows);
        self
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.lock().statements.clone()
    }

    pub fn last(&self) -> Option<Statement> {
        self.lock().statements.last().cloned()
    }

    pub fn last_sql(&self) -> String {
        self.last().map(|s| s.sql).unwrap_or_default()
    }

    fn record(&self, sql: &str, params: &Params) {
        self.lock().statements.push(Statement {
            sql: sql.to_string(),
            params: params.clone(),
        });
    }
}

#[async_trait]
impl NamedParameterExecutor for RecordingExecutor {
    async fn update(&self, sql: &str, params: &Params) -> DaoResult<u64> {
        self.record(sql, params);
        Ok(self.lock().updates.pop_front().unwrap_or(1))
    }

    async fn batch_update(&self, sql: &str, batch: &[Params]) -> DaoResult<Vec<u64>> {
        let mut counts = Vec::with_capacity(batch.len());
        for params in batch {
            self.record(sql, params);
            counts.push(self.lock().updates.pop_front().unwrap_or(1));
        }
        Ok(counts)
    }

    async fn query(&self, sql: &str, params: &Params) -> DaoResult<Vec<Row>> {
        self.record(sql, params);
        Ok(self.lock().rows.pop_front().unwrap_or_default())
    }
}

/// A row shaped like the `user_account` table.
pub fn user_row(id: &str, user_name: Option<&str>, age: Option<i32>) -> Row {
    Row::new()
        .with("id", id)
        .with("user_name", user_name)
        .with("age", age)
}

#[async_trait]
pub trait ExecutorFactory {
    /// Construct a clean executor connected to a DB with the `user_account` schema.
    async fn new_executor(&self) -> DaoResult<Arc<dyn NamedParameterExecutor>>;
}

type UserDao = Dao<UserAccount, Arc<dyn NamedParameterExecutor>>;

async fn user_dao<F: ExecutorFactory + Sync>(f: &F) -> DaoResult<UserDao> {
    Dao::new(f.new_executor().await?)
}

/// Generated ids, read back by id, misses.
pub async fn test_save_and_find_one<F: ExecutorFactory + Sync>(f: &F) -> DaoResult<()> {
    let dao = user_dao(f).await?;

    let mut wang = UserAccount::new("", Some("wang"), None);
    let id = dao.save_ignore_null(&mut wang).await?;
    let generated = uuid::Uuid::parse_str(&id).map_err(DaoError::mapping)?;
    assert_eq!(generated.get_version_num(), 4);
    assert_eq!(wang.id, id);

    let fetched = dao.find_one(&id).await?;
    assert_eq!(fetched, Some(wang));

    let mut li = UserAccount::new("u-li", Some("li"), Some(30));
    assert_eq!(dao.save(&mut li).await?, "u-li");
    assert_eq!(dao.find_one("u-li").await?, Some(li));

    assert_eq!(dao.find_one("nobody").await?, None);
    Ok(())
}

/// The four update flavours and how they treat nulls and misses.
pub async fn test_updates<F: ExecutorFactory + Sync>(f: &F) -> DaoResult<()> {
    let dao = user_dao(f).await?;
    dao.save(&mut UserAccount::new("u1", Some("wang"), Some(20)))
        .await?;

    // Null fields are left alone.
    dao.update_ignore_null(&UserAccount::new("u1", None, Some(30)))
        .await?;
    assert_eq!(
        dao.find_one("u1").await?,
        Some(UserAccount::new("u1", Some("wang"), Some(30)))
    );

    // Null fields are written as NULL.
    dao.update(&UserAccount::new("u1", None, Some(31))).await?;
    assert_eq!(
        dao.find_one("u1").await?,
        Some(UserAccount::new("u1", None, Some(31)))
    );

    dao.update_by_id("u1", Params::new().with("userName", "li"))
        .await?;
    assert_eq!(
        dao.find_one("u1").await?,
        Some(UserAccount::new("u1", Some("li"), Some(31)))
    );

    let err = dao
        .update(&UserAccount::new("missing", Some("x"), Some(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::WriteFailed { .. }));
    // Soft variants only log the miss.
    let id = dao
        .update_ignore_null(&UserAccount::new("missing", Some("x"), None))
        .await?;
    assert_eq!(id, "missing");

    let touched = dao
        .update_where(
            "age>:minAge",
            Params::new().with("minAge", 30),
            Params::new().with("age", 99),
        )
        .await?;
    assert_eq!(touched, 1);
    assert_eq!(dao.count_where("age=:1", &values![99]).await?, 1);
    Ok(())
}

/// Conditional lists, counts, single-row lookups and raw SQL maps.
pub async fn test_where_and_count<F: ExecutorFactory + Sync>(f: &F) -> DaoResult<()> {
    let dao = user_dao(f).await?;
    for (id, name, age) in [("a", "wang", 20), ("b", "wang", 25), ("c", "li", 40)] {
        dao.save(&mut UserAccount::new(id, Some(name), Some(age)))
            .await?;
    }

    let adults = dao.find_list_where("age>:1", &values![21]).await?;
    let mut ids: Vec<_> = adults.iter().map(|u| u.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["b", "c"]);

    assert_eq!(dao.count_where("user_name=:1", &values!["wang"]).await?, 2);

    let err = dao
        .find_one_where("user_name=:1 AND age>:2", &values!["wang", 10])
        .await
        .unwrap_err();
    assert!(matches!(err, DaoError::TooManyResults { count: 2, .. }));

    let li = dao.find_one_where("user_name=:1", &values!["li"]).await?;
    assert_eq!(li.map(|u| u.id), Some("c".to_string()));
    assert_eq!(
        dao.find_one_where("user_name=:1", &values!["zhang"]).await?,
        None
    );

    let filter = UserAccount::new("", Some("wang"), None);
    let by_name = dao
        .find_list_where_entity("user_name=:userName", &filter)
        .await?;
    assert_eq!(by_name.len(), 2);

    let row = dao
        .find_map_by_sql(
            "SELECT COUNT(*) AS n FROM user_account WHERE age<:max",
            &Params::new().with("max", 30),
        )
        .await?;
    assert_eq!(row.get("n"), Some(&Value::I64(2)));

    let rows = dao
        .find_map_list_by_sql(
            "SELECT id FROM user_account ORDER BY id",
            &Params::new(),
        )
        .await?;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("id"), Some(&Value::String("a".into())));
    Ok(())
}

/// Rows and totals of a paginated condition.
pub async fn test_pagination<F: ExecutorFactory + Sync>(f: &F) -> DaoResult<()> {
    let dao = user_dao(f).await?;
    for i in 0..25 {
        let id = format!("p{i:02}");
        dao.save(&mut UserAccount::new(&id, Some("paged"), Some(i)))
            .await?;
    }

    let page = dao
        .find_page_where(2, 10, "age>=:1 ORDER BY age", &values![0])
        .await?;
    assert_eq!(page.total, 25);
    assert_eq!(page.rows.len(), 10);
    assert_eq!(page.rows[0].age, Some(10));
    assert_eq!(page.total_pages(10), 3);

    let last = dao
        .find_page_where_map(
            3,
            10,
            "user_name=:name ORDER BY age",
            &Params::new().with("name", "paged"),
        )
        .await?;
    assert_eq!(last.rows.len(), 5);
    assert_eq!(last.total, 25);

    let empty = dao
        .find_page_where(1, 10, "age>:1", &values![100])
        .await?;
    assert!(empty.rows.is_empty());
    assert_eq!(empty.total, 0);
    Ok(())
}

/// Single, batch and full-table deletes.
pub async fn test_deletes<F: ExecutorFactory + Sync>(f: &F) -> DaoResult<()> {
    let dao = user_dao(f).await?;
    for id in ["d1", "d2", "d3", "d4"] {
        dao.save_ignore_null(&mut UserAccount::new(id, Some("gone"), None))
            .await?;
    }

    assert_eq!(dao.delete("d1").await?, 1);
    assert_eq!(dao.delete("d1").await?, 0);

    let removed = dao.delete_in_batch(&["d2", "d3", "nobody"]).await?;
    assert_eq!(removed, 2);
    assert_eq!(dao.delete_in_batch::<&str>(&[]).await?, 0);

    assert_eq!(dao.delete_all().await?, 1);
    assert_eq!(dao.count_where("1=1", &[]).await?, 0);
    Ok(())
}

/// Runs every scenario against fresh executors from `f`.
pub async fn run_all<F: ExecutorFactory + Sync>(f: &F) -> DaoResult<()> {
    test_save_and_find_one(f).await?;
    test_updates(f).await?;
    test_where_and_count(f).await?;
    test_pagination(f).await?;
    test_deletes(f).await?;
    Ok(())
}
