use crate::semantic::SemanticValue;
use crate::stores::{
    mentions, normalize_name, Equation, EquationLog, EquationStore, FunctionDefinition, FunctionStore, FunctionTable,
    StoreError, VariableContext, VariableStore, VariableTable,
};

#[test]
fn test_names_are_normalized() {
    assert_eq!(normalize_name("  Monthly   Rent "), "monthly rent");

    let mut table = VariableTable::new();
    table
        .set_variable_with_value("Monthly  Rent", SemanticValue::number(1500), "1500")
        .unwrap();
    assert_eq!(table.names(), vec!["monthly rent".to_string()]);
    assert_eq!(table.value("MONTHLY RENT"), Some(&SemanticValue::number(1500)));
}

#[test]
fn test_overwrite_keeps_creation_time() {
    let mut table = VariableTable::new();
    table.set_variable_with_value("x", SemanticValue::number(1), "1").unwrap();
    let created = table.variable("x").unwrap().created_at;
    table.set_variable_with_value("X", SemanticValue::number(2), "2").unwrap();

    let variable = table.variable("x").unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(variable.created_at, created);
    assert_eq!(variable.raw, "2");
}

#[test]
fn test_reserved_and_invalid_names_are_rejected() {
    let mut table = VariableTable::new();
    assert_eq!(
        table.set_variable_with_value("Today", SemanticValue::number(1), "1"),
        Err(StoreError::ReservedName("today".to_string()))
    );
    assert!(matches!(
        table.set_variable_with_value("2x", SemanticValue::number(1), "1"),
        Err(StoreError::InvalidName(_))
    ));
    assert!(table.is_empty());
}

#[test]
fn test_unit_variables_keep_their_quantity() {
    let mut table = VariableTable::new();
    let distance = crate::parser::parse_value("5 km").unwrap();
    table.set_variable_with_value("distance", distance, "5 km").unwrap();
    assert!(table.variable("distance").unwrap().quantity.is_some());
}

#[test]
fn test_function_redefinition_returns_previous() {
    let mut table = FunctionTable::new();
    let definition = |body: &str| FunctionDefinition {
        name: "Area".to_string(),
        params: Vec::new(),
        body: Vec::new(),
        body_text: body.to_string(),
        line: 1,
    };
    assert_eq!(table.define(definition("1")).unwrap(), None);
    let previous = table.define(definition("2")).unwrap().unwrap();
    assert_eq!(previous.body_text, "1");
    assert_eq!(table.function("area").unwrap().body_text, "2");
    assert_eq!(table.len(), 1);
}

#[test]
fn test_equations_mentioning_a_name() {
    let mut log = EquationLog::new();
    log.record(Equation {
        variable: "y".to_string(),
        expression: "m * x + b".to_string(),
        source_line: 1,
    });
    log.record(Equation {
        variable: "area".to_string(),
        expression: "side^2".to_string(),
        source_line: 2,
    });
    log.record(Equation {
        variable: "z".to_string(),
        expression: "x + 1".to_string(),
        source_line: 5,
    });

    let found: Vec<&str> = log.mentioning("X", 5).iter().map(|e| e.variable.as_str()).collect();
    assert_eq!(found, vec!["y"]);
    let found: Vec<&str> = log.mentioning("x", 6).iter().map(|e| e.variable.as_str()).collect();
    assert_eq!(found, vec!["z", "y"]);
    assert_eq!(log.mentioning("area", 3).len(), 1);
}

#[test]
fn test_mentions_matches_whole_words() {
    assert!(mentions("m * x + b", "x"));
    assert!(mentions("Price * 2", "price"));
    assert!(!mentions("max + 1", "x"));
    assert!(!mentions("x_1 + 1", "x"));
}
