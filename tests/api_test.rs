use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::PathBuf;

use reify_core::attrs::JsonColumn;
use reify_core::{
    from_json, from_yaml, from_yaml_file, record, reflect_enum, to_json, to_yaml, try_from_json,
    try_from_yaml, try_from_yaml_file, ReifyError,
};

reflect_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub enum Role {
        #[default]
        Engineer => "engineer",
        Manager => "manager",
        Director => "director",
    }
}

record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Address {
        pub street: String,
        pub city: String,
        pub state: Option<String>,
        pub country: String,
        pub zip_code: Option<i32>,
    }
}

record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Employee {
        pub id: i64 => [JsonColumn("employeeId")],
        pub name: String,
        pub role: Role,
        pub salary: f64,
        pub active: bool,
        pub home: Address,
        pub skills: Vec<String>,
        pub scores: BTreeMap<String, i32>,
        pub location: (f64, f64),
        pub nickname: Option<String>,
        pub manager_id: Option<i64>,
    }
}

record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Workspace {
        pub root: PathBuf,
        pub owner: Box<Address>,
        pub queue: VecDeque<i32>,
        pub roles: HashSet<Role>,
        pub labels: HashSet<String>,
    }
}

fn workspace() -> Workspace {
    Workspace {
        root: PathBuf::from("/srv/projects/reify"),
        owner: Box::new(Address {
            street: "1 Main St".into(),
            city: "Springfield".into(),
            state: Some("IL".into()),
            country: "US".into(),
            zip_code: None,
        }),
        queue: VecDeque::from([3, 1, 2]),
        roles: HashSet::from([Role::Manager, Role::Director, Role::Engineer]),
        labels: HashSet::from(["zeta".to_string(), "alpha".to_string()]),
    }
}

fn employee() -> Employee {
    Employee {
        id: 42,
        name: "Ada Lovelace".into(),
        role: Role::Manager,
        salary: 85000.5,
        active: true,
        home: Address {
            street: "12 St James's Square".into(),
            city: "London".into(),
            state: None,
            country: "UK".into(),
            zip_code: Some(10001),
        },
        skills: vec!["rust".into(), "c++".into(), "true".into()],
        scores: BTreeMap::from([("math".into(), 99), ("poetry".into(), 87)]),
        location: (51.5074, -0.1278),
        nickname: None,
        manager_id: Some(7),
    }
}

#[test]
fn test_yaml_round_trip() {
    let original = employee();
    let text = to_yaml(&original).unwrap();
    let (parsed, result) = from_yaml::<Employee>(&text);
    assert!(result.is_valid(), "round trip failed: {result}\n{text}");
    assert_eq!(parsed, Some(original));
}

#[test]
fn test_json_round_trip() {
    let original = employee();
    let text = to_json(&original).unwrap();
    let (parsed, result) = from_json::<Employee>(&text);
    assert!(result.is_valid(), "round trip failed: {result}\n{text}");
    assert_eq!(parsed, Some(original));
}

#[test]
fn test_yaml_output_follows_declaration_order() {
    let address = Address {
        street: "Baker Street".into(),
        city: "London".into(),
        state: None,
        country: "UK".into(),
        zip_code: Some(10001),
    };
    assert_eq!(
        to_yaml(&address).unwrap(),
        "street: Baker Street\ncity: London\nstate: null\ncountry: UK\nzip_code: 10001\n"
    );
}

#[test]
fn test_tuples_are_written_inline() {
    let text = to_yaml(&employee()).unwrap();
    assert!(text.contains("location: [51.5074, -0.1278]"), "{text}");
    assert!(text.contains("skills:\n  - rust\n"), "{text}");
}

#[test]
fn test_json_uses_json_column_names() {
    let text = to_json(&employee()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["employeeId"], serde_json::json!(42));
    assert!(value.get("id").is_none());
    assert_eq!(value["role"], serde_json::json!("manager"));
    assert_eq!(value["nickname"], serde_json::Value::Null);
    assert_eq!(value["location"], serde_json::json!([51.5074, -0.1278]));

    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys[0], "employeeId");
    assert_eq!(keys[10], "manager_id");
}

#[test]
fn test_hash_maps_are_written_in_key_order() {
    let map: HashMap<String, i32> = HashMap::from([
        ("zeta".to_string(), 3),
        ("alpha".to_string(), 1),
        ("mid".to_string(), 2),
    ]);
    assert_eq!(to_yaml(&map).unwrap(), "alpha: 1\nmid: 2\nzeta: 3\n");
}

#[test]
fn test_optional_fields_may_be_absent() {
    let source = r#"
street: 1 Main St
city: Springfield
country: US
"#;
    let (address, result) = from_yaml::<Address>(source);
    assert!(result.is_valid(), "{result}");
    let address = address.unwrap();
    assert_eq!(address.state, None);
    assert_eq!(address.zip_code, None);
}

#[test]
fn test_scalars_coerce_to_text() {
    let source = r#"
street: 221
city: true
country: UK
"#;
    let (address, result) = from_yaml::<Address>(source);
    assert!(result.is_valid(), "{result}");
    let address = address.unwrap();
    assert_eq!(address.street, "221");
    assert_eq!(address.city, "true");
}

#[test]
fn test_syntax_error_is_a_single_root_error() {
    let (value, result) = from_yaml::<Address>("street: [unclosed");
    assert!(value.is_none());
    assert_eq!(result.len(), 1);
    assert_eq!(result.errors()[0].path, "");
    assert!(result.errors()[0].message.starts_with("Invalid YAML"));

    let (value, result) = from_json::<Address>("{\"street\": ");
    assert!(value.is_none());
    assert_eq!(result.len(), 1);
    assert!(result.errors()[0].message.starts_with("Invalid JSON"));
}

#[test]
fn test_try_variants_report_diagnostics() {
    let err = try_from_yaml::<Address>("street: [unclosed").unwrap_err();
    assert!(matches!(err, ReifyError::Yaml { .. }));

    let err = try_from_json::<Address>("{\"street\": \"x\"}").unwrap_err();
    match err {
        ReifyError::Invalid { errors } => {
            let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
            assert_eq!(paths, vec!["city", "country"]);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let address = try_from_yaml::<Address>("{street: a, city: b, country: c}").unwrap();
    assert_eq!(address.country, "c");
}

#[test]
fn test_yaml_file_entry_points() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("address.yaml");
    std::fs::write(&path, "street: a\ncity: b\ncountry: c\nzip_code: 12345\n").unwrap();

    let (address, result) = from_yaml_file::<Address>(&path);
    assert!(result.is_valid(), "{result}");
    assert_eq!(address.unwrap().zip_code, Some(12345));

    let missing = dir.path().join("missing.yaml");
    let (address, result) = from_yaml_file::<Address>(&missing);
    assert!(address.is_none());
    assert!(result.errors()[0].message.starts_with("Failed to read"));

    let err = try_from_yaml_file::<Address>(&missing).unwrap_err();
    assert!(matches!(err, ReifyError::Io { .. }));
}

#[test]
fn test_top_level_containers() {
    let (values, result) = from_yaml::<Vec<(String, i32)>>("- [a, 1]\n- [b, 2]\n");
    assert!(result.is_valid(), "{result}");
    assert_eq!(values.unwrap(), vec![("a".into(), 1), ("b".into(), 2)]);

    let (roles, result) = from_json::<BTreeMap<String, Role>>(r#"{"ada": "director"}"#);
    assert!(result.is_valid(), "{result}");
    assert_eq!(roles.unwrap()["ada"], Role::Director);
}

#[test]
fn test_boxed_path_deque_and_set_fields_round_trip() {
    let original = workspace();

    let text = to_yaml(&original).unwrap();
    let (parsed, result) = from_yaml::<Workspace>(&text);
    assert!(result.is_valid(), "round trip failed: {result}\n{text}");
    assert_eq!(parsed.as_ref(), Some(&original));

    let text = to_json(&original).unwrap();
    let (parsed, result) = from_json::<Workspace>(&text);
    assert!(result.is_valid(), "round trip failed: {result}\n{text}");
    assert_eq!(parsed, Some(original));
}

#[test]
fn test_hash_sets_are_written_in_a_stable_order() {
    let text = to_yaml(&workspace()).unwrap();
    assert!(text.starts_with("root: /srv/projects/reify\nowner:\n  street: 1 Main St\n"), "{text}");
    assert!(text.contains("queue:\n  - 3\n  - 1\n  - 2\n"), "{text}");
    assert!(
        text.contains("roles:\n  - director\n  - engineer\n  - manager\n"),
        "{text}"
    );
    assert!(text.ends_with("labels:\n  - alpha\n  - zeta\n"), "{text}");
}

#[test]
fn test_shape_errors_inside_boxes_and_sets() {
    let source = r#"
root: [not, a, path]
owner: {street: a, city: b}
queue: [1, x]
roles: [manager, chef]
labels: {}
"#;
    let (workspace, result) = from_yaml::<Workspace>(source);
    assert!(workspace.is_none());
    let paths: Vec<&str> = result.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(
        paths,
        vec!["root", "owner.country", "queue[1]", "roles[1]", "labels"]
    );
    assert_eq!(result.errors()[0].message, "Invalid path");
}
