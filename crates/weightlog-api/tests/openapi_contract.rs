use serde_json::Value;
use weightlog_api::{openapi_v1_spec, ApiError, ApiErrorCode};

const ROUTES: [(&str, &str); 21] = [
    ("/healthz", "get"),
    ("/readyz", "get"),
    ("/v1/version", "get"),
    ("/v1/openapi.json", "get"),
    ("/v1/auth/signup", "post"),
    ("/v1/auth/login", "post"),
    ("/v1/auth/verify-email", "post"),
    ("/v1/auth/request-password-reset", "post"),
    ("/v1/auth/reset-password", "post"),
    ("/v1/weights", "get"),
    ("/v1/weights", "post"),
    ("/v1/weights/{id}", "delete"),
    ("/v1/weights/export", "get"),
    ("/v1/goal", "get"),
    ("/v1/goal", "put"),
    ("/v1/goal", "delete"),
    ("/v1/trends", "get"),
    ("/v1/trends/progress-email", "post"),
    ("/v1/account", "delete"),
    ("/v1/account/password", "put"),
    ("/v1/account/email", "put"),
];

#[test]
fn every_route_is_documented() {
    let spec = openapi_v1_spec();
    for (path, method) in ROUTES {
        assert!(
            spec["paths"][path][method].is_object(),
            "missing {method} {path}"
        );
    }
}

#[test]
fn user_routes_declare_bearer_auth() {
    let spec = openapi_v1_spec();
    for (path, method) in ROUTES.iter().filter(|(p, _)| {
        ["/v1/weights", "/v1/goal", "/v1/trends", "/v1/account"]
            .iter()
            .any(|prefix| p.starts_with(prefix))
    }) {
        let op = &spec["paths"][*path][*method];
        assert_eq!(op["security"][0]["bearerAuth"], Value::Array(Vec::new()), "{method} {path}");
        assert!(op["responses"]["401"].is_object(), "{method} {path}");
    }
    assert!(spec["paths"]["/v1/auth/login"]["post"]["security"].is_null());
}

#[test]
fn error_code_enum_matches_wire_names() {
    let spec = openapi_v1_spec();
    let documented: Vec<&str> = spec["components"]["schemas"]["ApiErrorCode"]["enum"]
        .as_array()
        .expect("enum")
        .iter()
        .map(|v| v.as_str().expect("string"))
        .collect();
    let serialized: Vec<String> = ApiErrorCode::ALL
        .iter()
        .map(|code| serde_json::to_value(code).expect("json").as_str().expect("str").to_string())
        .collect();
    assert_eq!(documented, serialized);
}

#[test]
fn api_error_envelope_is_stable() {
    let err = ApiError::invalid_param("timeRange", "7d").with_request_id("req-42");
    let body = serde_json::to_value(&err).expect("json");
    let mut keys: Vec<&str> = body.as_object().expect("object").keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["code", "details", "message", "request_id"]);
    assert_eq!(body["code"], "invalid_query_parameter");
    assert_eq!(body["request_id"], "req-42");

    let back: ApiError = serde_json::from_value(body).expect("round trip");
    assert_eq!(back, err);
    let extra = serde_json::json!({"code": "internal", "message": "x", "details": {}, "request_id": "r", "extra": 1});
    assert!(serde_json::from_value::<ApiError>(extra).is_err());
}
