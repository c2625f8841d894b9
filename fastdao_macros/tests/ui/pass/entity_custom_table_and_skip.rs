use fastdao_core::{EntityDescriptor, Value};
use fastdao_macros::Entity;

#[derive(Entity, Default, Clone, Debug, PartialEq)]
#[entity(table = "people")]
struct Person {
    id: String,
    email_address: Option<String>,
    r#type: Option<String>,
    #[fetch(skip)]
    cached_rank: u32,
}

fn main() {
    let d = EntityDescriptor::<Person>::resolve().unwrap();
    assert_eq!(d.table_name(), "people");
    let names: Vec<&str> = d.fields().iter().map(|f| f.field_name()).collect();
    assert_eq!(names, ["emailAddress", "type"]);
    assert!(d.field("cachedRank").is_none());

    let p = Person {
        id: "p1".into(),
        email_address: Some("p@example.com".into()),
        r#type: None,
        cached_rank: 3,
    };
    let params = d.params_of(&p);
    assert_eq!(params.get("id"), Some(&Value::String("p1".into())));
    assert_eq!(params.get("type"), Some(&Value::Null));
    assert_eq!(p.cached_rank, 3);
}
