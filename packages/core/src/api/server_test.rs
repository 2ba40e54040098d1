use super::*;
use crate::api::types::{
    DUPLICATE_REGISTRATION, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND, NOT_FOUND,
    PARSE_ERROR, VALIDATION_ERROR,
};
use crate::config::CoreConfig;
use serde_json::json;
use std::sync::Mutex;

fn app() -> SpiderBoxes {
    SpiderBoxes::in_memory(CoreConfig::default())
}

async fn call(app: &SpiderBoxes, method: &str, params: Value) -> RpcResponse {
    handle_request(app, RpcRequest::new(1, method, params)).await
}

/// Feed newline-delimited input through `serve` and decode every output line
async fn run_lines(app: &SpiderBoxes, input: &str, callback: Option<ResponseCallback>) -> Vec<Value> {
    let mut output = Vec::new();
    serve(app, input.as_bytes(), &mut output, callback).await.unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn test_list_and_get_types() {
    let app = app();

    let response = call(&app, "list_types", json!({"namespace": "components"})).await;
    let result = response.result.unwrap();
    assert_eq!(result["namespace"], "component");
    assert_eq!(result["count"], 6);

    let response = call(&app, "get_type", json!({"namespace": "field", "name": "range"})).await;
    let range = response.result.unwrap();
    assert_eq!(range["handler_ref"], "range");
    assert_eq!(range["category"], "advanced");
}

#[tokio::test]
async fn test_type_override_lifecycle() {
    let app = app();

    let updated = call(
        &app,
        "update_type",
        json!({"namespace": "field", "name": "text", "patch": {"display_name": "Plain Text"}}),
    )
    .await
    .result
    .unwrap();
    assert_eq!(updated["display_name"], "Plain Text");

    let deleted = call(&app, "delete_type", json!({"namespace": "field", "name": "text"}))
        .await
        .result
        .unwrap();
    assert_eq!(deleted["still_resolves"], true);

    let text = call(&app, "get_type", json!({"namespace": "field", "name": "text"}))
        .await
        .result
        .unwrap();
    assert_eq!(text["display_name"], "Text");
}

#[tokio::test]
async fn test_create_type_twice_is_duplicate() {
    let app = app();
    let params = json!({
        "namespace": "field",
        "definition": {"id": "rating", "display_name": "Rating", "handler_ref": "range", "supports": ["label", "min", "max"]}
    });

    assert!(call(&app, "create_type", params.clone()).await.is_success());
    let error = call(&app, "create_type", params).await.error.unwrap();
    assert_eq!(error.code, DUPLICATE_REGISTRATION);
}

#[tokio::test]
async fn test_get_type_config_uses_camel_case() {
    let app = app();
    let result = call(
        &app,
        "get_type_config",
        json!({"namespace": "field", "name": "range", "settings": {"max": 50}}),
    )
    .await
    .result
    .unwrap();

    assert_eq!(result["typeDefinition"]["id"], "range");
    let max = result["configFields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["id"] == "max")
        .unwrap();
    assert_eq!(max["current_value"], 50);
}

#[tokio::test]
async fn test_instance_crud_and_not_found() {
    let app = app();

    let created = call(
        &app,
        "create_instance",
        json!({"namespace": "field", "instance": {"id": "subtitle", "type": "text", "title": "Subtitle", "context": "post"}}),
    )
    .await;
    assert!(created.is_success());

    let listed = call(&app, "list_instances", json!({"namespace": "field", "context": "post"}))
        .await
        .result
        .unwrap();
    assert_eq!(listed["count"], 1);

    let updated = call(
        &app,
        "update_instance",
        json!({"namespace": "field", "id": "subtitle", "patch": {"title": "Sub"}}),
    )
    .await
    .result
    .unwrap();
    assert_eq!(updated["title"], "Sub");

    assert!(call(&app, "delete_instance", json!({"namespace": "field", "id": "subtitle"}))
        .await
        .is_success());

    let error = call(&app, "get_instance", json!({"namespace": "field", "id": "subtitle"}))
        .await
        .error
        .unwrap();
    assert_eq!(error.code, NOT_FOUND);
}

#[tokio::test]
async fn test_create_instance_reports_field_errors() {
    let app = app();
    let error = call(
        &app,
        "create_instance",
        json!({"namespace": "field", "instance": {"id": "subtitle", "type": "text"}}),
    )
    .await
    .error
    .unwrap();

    assert_eq!(error.code, VALIDATION_ERROR);
    assert_eq!(error.data.unwrap()["errors"][0]["field"], "title");
}

#[tokio::test]
async fn test_add_and_remove_child_default_to_components() {
    let app = app();
    call(
        &app,
        "create_instance",
        json!({"namespace": "component", "instance": {"id": "layout", "type": "tabs", "title": "Layout"}}),
    )
    .await;

    let child = call(&app, "add_child", json!({"parent_id": "layout"}))
        .await
        .result
        .unwrap();
    assert_eq!(child["id"], "layout_tab_1");
    assert_eq!(child["settings"]["active"], true);

    let removed = call(
        &app,
        "remove_child",
        json!({"parent_id": "layout", "child_id": "layout_tab_1"}),
    )
    .await
    .result
    .unwrap();
    assert_eq!(removed["removed"], true);
}

#[tokio::test]
async fn test_field_values_are_sanitized() {
    let app = app();
    call(
        &app,
        "create_instance",
        json!({"namespace": "field", "instance": {"id": "volume", "type": "range", "title": "Volume", "settings": {"min": 0, "max": 10, "step": 5}}}),
    )
    .await;

    let key = json!({"object_id": "42", "object_type": "product", "meta_key": "volume"});
    let mut set = key.clone();
    set["value"] = json!(15);

    let stored = call(&app, "set_field_value", set).await.result.unwrap();
    assert_eq!(stored["value"], 10);

    let fetched = call(&app, "get_field_value", key.clone()).await.result.unwrap();
    assert_eq!(fetched["found"], true);
    assert_eq!(fetched["value"], 10);

    let deleted = call(&app, "delete_field_value", key).await.result.unwrap();
    assert_eq!(deleted["deleted"], true);
}

#[tokio::test]
async fn test_bad_params_and_unknown_method() {
    let app = app();

    let error = call(&app, "get_type", json!({"namespace": "widgets", "name": "x"}))
        .await
        .error
        .unwrap();
    assert_eq!(error.code, INVALID_PARAMS);
    assert!(error.message.contains("Unknown namespace: widgets"));

    let error = call(&app, "launch_rockets", Value::Null).await.error.unwrap();
    assert_eq!(error.code, METHOD_NOT_FOUND);
}

#[tokio::test]
async fn test_serve_answers_each_line_in_order() {
    let app = app();
    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"list_types\",\"params\":{\"namespace\":\"section\"}}\n",
        "not json\n",
        "\n",
        "{\"jsonrpc\":\"1.0\",\"id\":3,\"method\":\"list_types\"}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":4,\"method\":\"get_type\",\"params\":{\"namespace\":\"section\",\"name\":\"hero\"}}\n",
    );

    let responses = run_lines(&app, input, None).await;
    assert_eq!(responses.len(), 4);

    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["count"], 2);

    assert_eq!(responses[1]["id"], 0);
    assert_eq!(responses[1]["error"]["code"], PARSE_ERROR);

    assert_eq!(responses[2]["id"], 3);
    assert_eq!(responses[2]["error"]["code"], INVALID_REQUEST);

    assert_eq!(responses[3]["id"], 4);
    assert_eq!(responses[3]["error"]["code"], NOT_FOUND);
}

#[tokio::test]
async fn test_callback_sees_only_successes() {
    let app = app();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let callback: ResponseCallback = Arc::new(move |method: &str, _result: &Value| {
        sink.lock().unwrap().push(method.to_string());
    });

    let input = concat!(
        "{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"list_types\",\"params\":{\"namespace\":\"field\"}}\n",
        "{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"nope\"}\n",
    );
    run_lines(&app, input, Some(callback)).await;

    assert_eq!(*seen.lock().unwrap(), vec!["list_types".to_string()]);
}
