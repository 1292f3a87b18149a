// SPDX-License-Identifier: Apache-2.0

use serde_json::{json, Map, Value};

use crate::errors::ApiErrorCode;

const ERROR_REF: &str = "#/components/schemas/ApiError";

fn error_response(description: &str) -> Value {
    json!({"description": description, "content": {"application/json": {"schema": {"$ref": ERROR_REF}}}})
}

fn json_body(required: &[&str], properties: Value) -> Value {
    json!({
        "required": true,
        "content": {"application/json": {"schema": {
            "type": "object",
            "additionalProperties": false,
            "required": required,
            "properties": properties
        }}}
    })
}

fn secured(mut operation: Value) -> Value {
    if let Some(obj) = operation.as_object_mut() {
        obj.insert("security".to_string(), json!([{"bearerAuth": []}]));
        let responses = obj
            .entry("responses")
            .or_insert_with(|| Value::Object(Map::new()));
        if let Some(responses) = responses.as_object_mut() {
            responses.insert("401".to_string(), error_response("missing or invalid bearer token"));
        }
    }
    operation
}

#[must_use]
pub fn openapi_v1_spec() -> Value {
    let codes: Vec<&str> = ApiErrorCode::ALL.iter().map(|c| c.as_str()).collect();
    let time_range = json!({"name": "timeRange", "in": "query", "schema": {"type": "string", "enum": ["30d", "90d", "all"]}});
    json!({
      "openapi": "3.0.3",
      "info": {"title": "weightlog API", "version": "v1"},
      "paths": {
        "/healthz": {"get": {"responses": {"200": {"description": "ok"}}}},
        "/readyz": {"get": {"responses": {"200": {"description": "ready"}, "503": error_response("not ready")}}},
        "/v1/version": {"get": {"responses": {"200": {"description": "service version metadata"}}}},
        "/v1/openapi.json": {"get": {"responses": {"200": {"description": "this document"}}}},
        "/v1/auth/signup": {"post": {
          "requestBody": json_body(&["email", "password"], json!({"email": {"type": "string"}, "password": {"type": "string", "minLength": 6}})),
          "responses": {"200": {"description": "verification email sent"}, "400": error_response("validation failed"), "409": error_response("email already registered"), "502": error_response("mail delivery failed")}
        }},
        "/v1/auth/login": {"post": {
          "requestBody": json_body(&["email", "password"], json!({"email": {"type": "string"}, "password": {"type": "string"}})),
          "responses": {"200": {"description": "bearer token and user"}, "400": error_response("validation failed"), "401": error_response("invalid credentials or email not verified")}
        }},
        "/v1/auth/verify-email": {"post": {
          "requestBody": json_body(&["token"], json!({"token": {"type": "string"}})),
          "responses": {"200": {"description": "email verified"}, "400": error_response("invalid or expired token")}
        }},
        "/v1/auth/request-password-reset": {"post": {
          "requestBody": json_body(&["email"], json!({"email": {"type": "string"}})),
          "responses": {"200": {"description": "reset email sent"}, "400": error_response("email not verified"), "404": error_response("email not found"), "502": error_response("mail delivery failed")}
        }},
        "/v1/auth/reset-password": {"post": {
          "requestBody": json_body(&["token", "newPassword"], json!({"token": {"type": "string"}, "newPassword": {"type": "string", "minLength": 6}})),
          "responses": {"200": {"description": "password reset"}, "400": error_response("invalid or expired token")}
        }},
        "/v1/weights": {
          "get": secured(json!({"parameters": [time_range.clone()], "responses": {"200": {"description": "measurements, newest first"}, "304": {"description": "not modified"}}})),
          "post": secured(json!({
            "requestBody": json_body(&["weightKg"], json!({"weightKg": {"type": "number", "exclusiveMinimum": 0}, "note": {"type": "string", "maxLength": 500}})),
            "responses": {"201": {"description": "measurement recorded"}, "400": error_response("validation failed")}
          }))
        },
        "/v1/weights/{id}": {
          "delete": secured(json!({
            "parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string", "format": "uuid"}}],
            "responses": {"200": {"description": "measurement deleted"}, "404": error_response("no such measurement for this user")}
          }))
        },
        "/v1/weights/export": {
          "get": secured(json!({
            "parameters": [{"name": "format", "in": "query", "schema": {"type": "string", "enum": ["json", "csv"]}}],
            "responses": {"200": {"description": "all measurements, oldest first"}}
          }))
        },
        "/v1/goal": {
          "get": secured(json!({"responses": {"200": {"description": "current goal, latest weight, progress"}}})),
          "put": secured(json!({
            "requestBody": json_body(&["goalWeightKg", "startWeightKg"], json!({"goalWeightKg": {"type": "number"}, "startWeightKg": {"type": "number"}})),
            "responses": {"200": {"description": "goal set"}, "400": error_response("validation failed")}
          })),
          "delete": secured(json!({"responses": {"200": {"description": "goal cleared"}}}))
        },
        "/v1/trends": {
          "get": secured(json!({
            "parameters": [time_range, {"name": "weekScheme", "in": "query", "schema": {"type": "string", "enum": ["iso", "legacy"]}}],
            "responses": {"200": {"description": "weekly and monthly averages, rate of change, trend line"}, "304": {"description": "not modified"}}
          }))
        },
        "/v1/trends/progress-email": {
          "post": secured(json!({"responses": {"200": {"description": "progress email sent, or not enough data"}, "502": error_response("mail delivery failed")}}))
        },
        "/v1/account": {
          "delete": secured(json!({"responses": {"200": {"description": "account and all data deleted"}}}))
        },
        "/v1/account/password": {
          "put": secured(json!({
            "requestBody": json_body(&["newPassword"], json!({"newPassword": {"type": "string", "minLength": 6}})),
            "responses": {"200": {"description": "password updated"}, "400": error_response("validation failed")}
          }))
        },
        "/v1/account/email": {
          "put": secured(json!({
            "requestBody": json_body(&["newEmail"], json!({"newEmail": {"type": "string"}})),
            "responses": {"200": {"description": "email updated, verification required"}, "409": error_response("email already in use")}
          }))
        }
      },
      "components": {
        "securitySchemes": {"bearerAuth": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"}},
        "schemas": {
          "ApiErrorCode": {"type": "string", "enum": codes},
          "ApiError": {
            "type": "object",
            "required": ["code", "message", "details", "request_id"],
            "additionalProperties": false,
            "properties": {
              "code": {"$ref": "#/components/schemas/ApiErrorCode"},
              "message": {"type": "string"},
              "details": {"type": "object"},
              "request_id": {"type": "string"}
            }
          }
        }
      }
    })
}
