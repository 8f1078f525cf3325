/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for taskboard-adapter tests

#![allow(dead_code)]

use serde_json::{Value, json};
use taskboard_adapter::TaskboardClient;
use wiremock::MockServer;

pub const ANON_KEY: &str = "anon-test-key";
pub const USER_ID: &str = "1c2d3e4f-5a6b-4c7d-8e9f-0a1b2c3d4e5f";
pub const BOARD_ID: &str = "5e6f7a8b-9c0d-4e1f-8a2b-3c4d5e6f7a8b";
pub const TODO_COLUMN: &str = "9a0e3c4d-5b6f-4a7b-8c9d-0e1f2a3b4c5d";
pub const DOING_COLUMN: &str = "2b3c4d5e-6f7a-4b8c-9d0e-1f2a3b4c5d6e";
pub const TASK_ONE: &str = "0b7c1f2e-8d4b-4b5e-9f53-1d6a2c3b4e5f";
pub const TASK_TWO: &str = "3d4e5f6a-7b8c-4d9e-8f0a-1b2c3d4e5f6a";

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server
pub fn client_for(server: &MockServer) -> TaskboardClient {
    TaskboardClient::new(&server.uri(), ANON_KEY).expect("client")
}

/// Mock access token for testing
pub fn mock_access_token() -> String {
    "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.test.signature".to_string()
}

pub fn session_json() -> Value {
    json!({
        "access_token": mock_access_token(),
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-token",
        "user": { "id": USER_ID, "email": "dev@example.com" }
    })
}

pub fn task_json(id: &str, column_id: &str, position: i32) -> Value {
    json!({
        "id": id,
        "title": format!("task {position}"),
        "description": null,
        "column_id": column_id,
        "position": position,
        "priority": "medium",
        "due_date": null,
        "completed": false,
        "assigned_to": null,
        "created_by": USER_ID,
        "created_at": "2024-04-01T10:00:00+00:00",
        "updated_at": "2024-04-01T10:00:00+00:00"
    })
}

pub fn column_json(id: &str, name: &str, position: i32, tasks: Vec<Value>) -> Value {
    json!({
        "id": id,
        "name": name,
        "color": "#ef4444",
        "position": position,
        "board_id": BOARD_ID,
        "tasks": tasks
    })
}
