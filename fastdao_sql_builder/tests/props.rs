use fastdao_core::naming::{camel_to_snake, snake_to_camel};
use fastdao_core::EntityDescriptor;
use fastdao_macros::Entity;
use fastdao_sql_builder::{
    entity_assignments, insert, paginate, parse_named, update_by_id, Dialect, NullPolicy,
    Placeholder,
};
use proptest::prelude::*;

#[derive(Entity, Default, Debug, Clone)]
#[entity(table = "people_props")]
struct PersonP {
    id: String,
    email_address: Option<String>,
    full_name: Option<String>,
    age: Option<i32>,
    score: Option<f64>,
}

fn person() -> impl Strategy<Value = PersonP> {
    (
        "[a-z0-9]{0,8}",
        proptest::option::of("[a-z@.]{1,12}"),
        proptest::option::of("[A-Za-z ]{1,12}"),
        proptest::option::of(0i32..120),
        proptest::option::of(0.0f64..100.0),
    )
        .prop_map(|(id, email_address, full_name, age, score)| PersonP {
            id,
            email_address,
            full_name,
            age,
            score,
        })
}

/// Splits `INSERT INTO t(cols) VALUES(vals)` into its two lists.
fn insert_lists(sql: &str) -> (Vec<String>, Vec<String>) {
    let open = sql.find('(').unwrap();
    let close = sql.find(") VALUES(").unwrap();
    let cols = sql[open + 1..close].split(',').map(str::to_string).collect();
    let vals = sql[close + ") VALUES(".len()..sql.len() - 1]
        .split(',')
        .map(str::to_string)
        .collect();
    (cols, vals)
}

fn count_null_and_placeholders(tokens: &[String]) -> usize {
    tokens
        .iter()
        .filter(|t| t.as_str() == "NULL" || t.starts_with(':'))
        .count()
}

proptest! {
    // Property: snake_to_camel inverts camel_to_snake for underscore-free lowerCamel names.
    #[test]
    fn name_mapping_round_trip(name in "[a-z][a-zA-Z0-9]{0,16}") {
        prop_assert_eq!(snake_to_camel(&camel_to_snake(&name)), name);
    }
}

proptest! {
    // Property: one column per placeholder-or-NULL token, in the same order.
    #[test]
    fn insert_column_token_parity(p in person(), literal in any::<bool>()) {
        let d = EntityDescriptor::<PersonP>::resolve().unwrap();
        let policy = if literal { NullPolicy::Literal } else { NullPolicy::Skip };
        let a = entity_assignments(&d, &p, policy);
        let sql = insert(d.table_name(), "x", &a);
        let (cols, vals) = insert_lists(&sql);
        prop_assert_eq!(cols.len(), vals.len());
        prop_assert_eq!(&cols[0], "id");
        prop_assert_eq!(count_null_and_placeholders(&vals[1..]), cols.len() - 1);
        for (col, val) in cols.iter().zip(&vals).skip(1) {
            let field = d.field_for_column(col).unwrap();
            if val == "NULL" {
                prop_assert!(literal);
                prop_assert!(field.read(&p).is_null());
            } else {
                prop_assert_eq!(val, &format!(":{}", field.field_name()));
                prop_assert!(!field.read(&p).is_null());
            }
        }
        if literal {
            prop_assert_eq!(cols.len() - 1, d.fields().len());
        }
    }
}

proptest! {
    // Property: SET clause pairs every column with its own placeholder or NULL.
    #[test]
    fn update_column_token_parity(p in person(), literal in any::<bool>()) {
        let d = EntityDescriptor::<PersonP>::resolve().unwrap();
        let policy = if literal { NullPolicy::Literal } else { NullPolicy::Skip };
        let a = entity_assignments(&d, &p, policy);
        prop_assume!(!a.is_empty());
        let sql = update_by_id(d.table_name(), &a);
        let set = sql
            .strip_prefix("UPDATE people_props SET ")
            .and_then(|s| s.strip_suffix(" WHERE id=:id"))
            .unwrap();
        for pair in set.split(',') {
            let (col, token) = pair.split_once('=').unwrap();
            let field = d.field_for_column(col).unwrap();
            if token == "NULL" {
                prop_assert!(field.read(&p).is_null());
            } else {
                prop_assert_eq!(token, format!(":{}", field.field_name()));
            }
        }
    }
}

proptest! {
    // Property: rows and count queries reference the same parameters.
    #[test]
    fn pagination_shares_bindings(
        page in 0usize..50,
        per_page in 1usize..100,
        row_number in any::<bool>(),
        cond in prop::sample::select(vec![
            "age>:1",
            "age>:1 AND user_name=:2",
            "user_name LIKE :pattern ORDER BY age",
            "(a=:a OR b=:b) AND c IN (SELECT c FROM d WHERE e=:e)",
        ]),
    ) {
        let dialect = if row_number { Dialect::RowNumberWindow } else { Dialect::LimitOffset };
        let base = format!("SELECT * FROM user_account WHERE {cond}");
        let p = paginate(&base, page, per_page, dialect).unwrap();
        let rows = parse_named(&p.rows_sql, Placeholder::Dollar);
        let count = parse_named(&p.count_sql, Placeholder::Dollar);
        prop_assert_eq!(rows.names, count.names);
        prop_assert!(p.count_sql.starts_with("SELECT COUNT(*) FROM"));
        if !row_number {
            let offset = (page.max(1) - 1) * per_page;
            let suffix = format!("LIMIT {per_page} OFFSET {offset}");
            prop_assert!(p.rows_sql.ends_with(&suffix));
        } else {
            prop_assert!(p.rows_sql.ends_with("ORDER BY paged_.row_num_"));
        }
    }
}
