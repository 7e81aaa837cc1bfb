use super::Fixture;
use crate::semantic::SemanticValue;
use crate::stores::VariableStore;
use indexmap::IndexMap;

#[test]
fn test_locals_shadow_stored_variables() {
    let mut fixture = Fixture::new();
    fixture
        .variables
        .set_variable_with_value("rate", SemanticValue::number(5), "5")
        .unwrap();
    let mut ctx = fixture.ctx(1);
    assert_eq!(ctx.lookup("Rate"), Some(SemanticValue::number(5)));

    let mut scope = IndexMap::new();
    scope.insert("rate".to_string(), SemanticValue::number(7));
    ctx.push_scope(scope);
    assert_eq!(ctx.lookup("rate"), Some(SemanticValue::number(7)));
    assert_eq!(ctx.lookup_local("rate"), Some(&SemanticValue::number(7)));
    ctx.pop_scope();
    assert_eq!(ctx.lookup("rate"), Some(SemanticValue::number(5)));
    assert_eq!(ctx.lookup_local("rate"), None);
}

#[test]
fn test_bind_local_opens_a_scope() {
    let mut fixture = Fixture::new();
    let mut ctx = fixture.ctx(1);
    ctx.bind_local("Unit  Price", SemanticValue::number(3));
    assert!(ctx.is_defined("unit price"));
    assert_eq!(ctx.visible_names(), vec!["unit price".to_string()]);
}

#[test]
fn test_call_depth_guard() {
    let mut fixture = Fixture::new();
    fixture.limits.max_call_depth = 2;
    let mut ctx = fixture.ctx(1);
    assert!(ctx.enter_call("f").is_ok());
    assert!(ctx.enter_call("f").is_ok());
    let error = ctx.enter_call("f").unwrap_err();
    assert!(error.message.contains("Maximum call depth of 2"));
    ctx.exit_call();
    assert_eq!(ctx.call_depth(), 1);
}
