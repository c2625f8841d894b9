use fastdao_core::{Entity, EntityDef, EntityDescriptor, FromValue, Value};

#[derive(fastdao_macros::Entity, Default)]
struct UserAccount {
    id: String,
    user_name: Option<String>,
    age: Option<i32>,
}

#[derive(Default)]
struct ManualAccount {
    id: String,
    user_name: Option<String>,
    age: Option<i32>,
}

impl Entity for ManualAccount {
    fn declare() -> EntityDef<Self> {
        EntityDef::<Self>::new("UserAccount")
            .id(|e| e.id.clone(), |e, v| e.id = v)
            .accessor(
                "getUserName",
                |e| Value::from(e.user_name.clone()),
                |e, v| {
                    e.user_name = FromValue::from_value(v)?;
                    Ok(())
                },
            )
            .accessor(
                "getAge",
                |e| Value::from(e.age),
                |e, v| {
                    e.age = FromValue::from_value(v)?;
                    Ok(())
                },
            )
    }
}

fn main() {
    let derived = EntityDescriptor::<UserAccount>::resolve().unwrap();
    let manual = EntityDescriptor::<ManualAccount>::resolve().unwrap();
    assert_eq!(derived.table_name(), manual.table_name());
    let a: Vec<(&str, &str)> = derived
        .fields()
        .iter()
        .map(|f| (f.field_name(), f.column_name()))
        .collect();
    let b: Vec<(&str, &str)> = manual
        .fields()
        .iter()
        .map(|f| (f.field_name(), f.column_name()))
        .collect();
    assert_eq!(a, b);
    let m = ManualAccount { id: "u1".into(), user_name: None, age: Some(3) };
    assert_eq!(manual.id_of(&m).unwrap(), "u1");
    let u = UserAccount { id: "u1".into(), user_name: None, age: Some(3) };
    assert_eq!(derived.params_of(&u), manual.params_of(&m));
}
