/*
[INPUT]:  Board and column ids, new board/column rows
[OUTPUT]: Board rows and ordered column rows (optionally with tasks)
[POS]:    HTTP layer - board and column endpoints (require a session)
[UPDATE]: When adding board endpoints or changing the embedded read
*/

// ### Board Endpoints

use crate::http::client::{eq, first_row};
use crate::http::{Result, TaskboardClient};
use crate::types::{Board, BoardId, Column, ColumnId, ColumnWithTasks, NewBoard, NewColumn, ProjectId};
use serde_json::json;

impl TaskboardClient {
    /// List boards of a project, newest first
    ///
    /// GET /rest/v1/boards?project_id=eq.{id}&order=created_at.desc
    pub async fn query_boards(&self, project_id: ProjectId) -> Result<Vec<Board>> {
        self.select_rows(
            "boards",
            &[
                ("select", "*".to_string()),
                ("project_id", eq(project_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )
        .await
    }

    /// GET /rest/v1/boards?id=eq.{id}
    pub async fn query_board(&self, board_id: BoardId) -> Result<Board> {
        let id = board_id.to_string();
        let rows = self
            .select_rows("boards", &[("select", "*".to_string()), ("id", eq(&id))])
            .await?;
        first_row("boards", &id, rows)
    }

    /// POST /rest/v1/boards
    pub async fn insert_board(&self, board: &NewBoard) -> Result<Board> {
        let rows = self.insert_rows("boards", std::slice::from_ref(board)).await?;
        first_row("boards", &board.name, rows)
    }

    /// PATCH /rest/v1/boards?id=eq.{id}
    pub async fn rename_board(&self, board_id: BoardId, name: &str) -> Result<Board> {
        self.update_row("boards", board_id, &json!({ "name": name }))
            .await
    }

    /// Columns and tasks cascade server-side.
    ///
    /// DELETE /rest/v1/boards?id=eq.{id}
    pub async fn delete_board(&self, board_id: BoardId) -> Result<()> {
        self.delete_rows("boards", &[("id", eq(board_id))]).await
    }

    /// Columns of a board ordered by position
    ///
    /// GET /rest/v1/board_columns?board_id=eq.{id}&order=position.asc
    pub async fn query_columns(&self, board_id: BoardId) -> Result<Vec<Column>> {
        self.select_rows(
            "board_columns",
            &[
                ("select", "*".to_string()),
                ("board_id", eq(board_id)),
                ("order", "position.asc".to_string()),
            ],
        )
        .await
    }

    /// Columns with their tasks embedded, both ordered by position, in
    /// one round trip.
    ///
    /// GET /rest/v1/board_columns?select=*,tasks(*)&board_id=eq.{id}&order=position.asc&tasks.order=position.asc
    pub async fn query_columns_with_tasks(&self, board_id: BoardId) -> Result<Vec<ColumnWithTasks>> {
        self.select_rows(
            "board_columns",
            &[
                ("select", "*,tasks(*)".to_string()),
                ("board_id", eq(board_id)),
                ("order", "position.asc".to_string()),
                ("tasks.order", "position.asc".to_string()),
            ],
        )
        .await
    }

    /// GET /rest/v1/board_columns?id=eq.{id}
    pub async fn query_column(&self, column_id: ColumnId) -> Result<Column> {
        let id = column_id.to_string();
        let rows = self
            .select_rows("board_columns", &[("select", "*".to_string()), ("id", eq(&id))])
            .await?;
        first_row("board_columns", &id, rows)
    }

    /// POST /rest/v1/board_columns (batch)
    pub async fn insert_columns(&self, columns: &[NewColumn]) -> Result<Vec<Column>> {
        if columns.is_empty() {
            return Ok(Vec::new());
        }
        self.insert_rows("board_columns", columns).await
    }

    /// PATCH /rest/v1/board_columns?id=eq.{id}
    pub async fn set_column_position(&self, column_id: ColumnId, position: i32) -> Result<Column> {
        self.update_row("board_columns", column_id, &json!({ "position": position }))
            .await
    }

    /// Tasks cascade server-side.
    ///
    /// DELETE /rest/v1/board_columns?id=eq.{id}
    pub async fn delete_column(&self, column_id: ColumnId) -> Result<()> {
        self.delete_rows("board_columns", &[("id", eq(column_id))])
            .await
    }
}
