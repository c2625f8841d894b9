// Run with:
//   cargo run -p fastdao --features libsql-backend --example libsql_e2e

use fastdao::backends::LibsqlExecutor;
use fastdao::{values, Dao, DaoError, Dialect, FromValue, PageTemplate, Params, Row, Value};

#[derive(fastdao::Entity, Default, Clone, Debug, PartialEq)]
pub struct UserAccount {
    pub id: String,
    pub user_name: Option<String>,
    pub age: Option<i32>,
}

#[tokio::main]
async fn main() -> Result<(), DaoError> {
    let executor = LibsqlExecutor::open(":memory:").await?;
    executor
        .execute_script(
            "CREATE TABLE user_account (id TEXT PRIMARY KEY, user_name TEXT, age INTEGER);",
        )
        .await?;

    let dao: Dao<UserAccount, _> = Dao::new(executor.clone())?;

    // Insert; the id is generated when empty
    let mut wang = UserAccount {
        user_name: Some("wang".into()),
        age: Some(23),
        ..Default::default()
    };
    let id = dao.save_ignore_null(&mut wang).await?;
    println!("Inserted: {wang:?}");

    for (name, age) in [("li", 31), ("zhang", 45)] {
        dao.save(&mut UserAccount {
            user_name: Some(name.into()),
            age: Some(age),
            ..Default::default()
        })
        .await?;
    }

    // Partial update by column map
    dao.update_by_id(&id, Params::new().with("age", 24)).await?;
    println!("Updated: {:?}", dao.find_one(&id).await?);

    // Conditional queries with positional parameters
    let older = dao.find_list_where("age>:1", &values![30]).await?;
    println!("Older than 30: {}", older.len());

    let page = dao
        .find_page_where(1, 2, "age>:1 ORDER BY age", &values![0])
        .await?;
    println!(
        "Page 1/{}: {:?}",
        page.total_pages(2),
        page.rows.iter().map(|u| &u.user_name).collect::<Vec<_>>()
    );

    // Arbitrary SQL through the page template
    let names = PageTemplate::new(executor);
    let by_name = names
        .query_page(
            "SELECT user_name FROM user_account WHERE age<:max ORDER BY user_name",
            1,
            10,
            &Params::new().with("max", 40),
            &|row: &Row, _: usize| {
                let name = row.get("user_name").cloned().unwrap_or(Value::Null);
                String::from_value(name).map_err(DaoError::mapping)
            },
            Dialect::LimitOffset,
        )
        .await?;
    println!("Names under 40: {:?} (total {})", by_name.rows, by_name.total);

    let removed = dao.delete_in_batch(&[id]).await?;
    println!("Deleted: {removed}");
    Ok(())
}
