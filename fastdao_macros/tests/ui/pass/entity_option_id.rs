use fastdao_core::{Entity as _, EntityDescriptor, Value};
use fastdao_macros::Entity;

#[derive(Entity, Default, Clone, Debug, PartialEq)]
struct ArticleDraft {
    id: Option<String>,
    title: String,
    // Optional fields read as NULL when absent
    sub_title: Option<String>,
    word_count: Option<i64>,
}

fn main() {
    let d = EntityDescriptor::<ArticleDraft>::resolve().unwrap();
    assert_eq!(d.table_name(), "article_draft");
    let names: Vec<&str> = d.fields().iter().map(|f| f.field_name()).collect();
    assert_eq!(names, ["title", "subTitle", "wordCount"]);
    let cols: Vec<&str> = d.fields().iter().map(|f| f.column_name()).collect();
    assert_eq!(cols, ["title", "sub_title", "word_count"]);

    let mut a = ArticleDraft::default();
    assert_eq!(d.id_of(&a).unwrap(), "");
    d.set_id(&mut a, "a1".to_string()).unwrap();
    assert_eq!(a.id.as_deref(), Some("a1"));

    let f = d.field("wordCount").unwrap();
    assert_eq!(f.read(&a), Value::Null);
    f.write(&mut a, Value::I64(12)).unwrap();
    assert_eq!(a.word_count, Some(12));

    let _ = ArticleDraft::declare();
}
