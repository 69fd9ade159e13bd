//! Open snapshots following the writes made through the service.

use super::helpers::{Workspace, ids, workspace};
use chrono::{Duration, Utc};
use rstest::rstest;
use serde_json::json;
use taskboard::board::{
    adapters::records::decode_board,
    domain::{Column, NewTask},
    projection::{overdue_tasks, task_counts},
};
use tokio::task::JoinSet;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn open_snapshots_track_each_mutation(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (_, board) = workspace.project_with_board(&owner).await;
    workspace
        .boards
        .open_board(&owner, board.id())
        .await
        .expect("open board");

    let columns = workspace.columns(&owner, &board, &["Todo", "Done"]).await;
    let todo = columns.first().map(Column::id).expect("column");
    let done = columns.get(1).map(Column::id).expect("column");
    let cards = workspace.tasks(&owner, todo, &["one", "two"]).await;
    let two = ids(&cards).get(1).copied().expect("card");
    workspace
        .boards
        .move_task(&owner, two, done, 0)
        .await
        .expect("move task");

    let open = workspace
        .boards
        .snapshot(board.id())
        .await
        .expect("board stays open");
    assert_eq!(open.column_ids(), vec![todo, done]);
    assert_eq!(task_counts(&open), vec![(todo, 1), (done, 1)]);
    let reloaded = workspace
        .boards
        .open_board(&owner, board.id())
        .await
        .expect("reopen board");
    assert_eq!(open, reloaded);
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_moves_leave_the_snapshot_matching_storage(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (_, board) = workspace.project_with_board(&owner).await;
    let column = workspace.columns(&owner, &board, &["Todo"]).await.remove(0);
    let cards = workspace
        .tasks(&owner, column.id(), &["a", "b", "c", "d", "e", "f"])
        .await;
    workspace
        .boards
        .open_board(&owner, board.id())
        .await
        .expect("open board");

    let mut moves = JoinSet::new();
    for (round, task_id) in ids(&cards).into_iter().enumerate() {
        let boards = workspace.boards.clone();
        let ctx = owner.clone();
        let column_id = column.id();
        let target = round.wrapping_mul(5).rem_euclid(cards.len());
        moves.spawn(async move { boards.move_task(&ctx, task_id, column_id, target).await });
    }
    while let Some(joined) = moves.join_next().await {
        joined.expect("join").expect("move should succeed");
    }

    let open = workspace
        .boards
        .snapshot(board.id())
        .await
        .expect("board stays open");
    let reloaded = workspace
        .boards
        .open_board(&owner, board.id())
        .await
        .expect("reopen board");
    assert_eq!(
        open.column(column.id()).map(|entry| entry.task_ids()),
        reloaded.column(column.id()).map(|entry| entry.task_ids())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn closed_boards_are_not_kept_up_to_date(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (_, board) = workspace.project_with_board(&owner).await;
    workspace
        .boards
        .open_board(&owner, board.id())
        .await
        .expect("open board");
    assert!(workspace.boards.close_board(board.id()).await);

    let column = workspace.columns(&owner, &board, &["Todo"]).await.remove(0);
    workspace
        .boards
        .create_task(
            &owner,
            column.id(),
            NewTask::new("late").with_due_date(Utc::now() - Duration::hours(2)),
        )
        .await
        .expect("task creation should succeed");

    assert!(workspace.boards.snapshot(board.id()).await.is_none());
    let reopened = workspace
        .boards
        .open_board(&owner, board.id())
        .await
        .expect("reopen board");
    assert_eq!(overdue_tasks(&reopened, Utc::now()).len(), 1);
}

#[rstest]
fn legacy_documents_feed_the_same_projections() {
    let board = "9b2e4c10-0000-4000-8000-000000000001";
    let project = "9b2e4c10-0000-4000-8000-000000000002";
    let column = "9b2e4c10-0000-4000-8000-000000000003";
    let stamp = "2023-05-01T08:00:00Z";
    let document = json!({
        "id": board,
        "projectId": project,
        "title": "Imported",
        "createdAt": stamp,
        "updatedAt": stamp,
        "columns": [{
            "id": column,
            "title": "Inbox",
            "createdAt": stamp,
            "updatedAt": stamp,
            "tasks": [
                {
                    "id": "9b2e4c10-0000-4000-8000-000000000004",
                    "title": "old",
                    "dueDate": "2023-06-01",
                    "createdAt": stamp,
                    "updatedAt": stamp
                },
                {
                    "id": "9b2e4c10-0000-4000-8000-000000000005",
                    "title": "undated",
                    "createdAt": stamp,
                    "updatedAt": stamp
                }
            ]
        }]
    })
    .to_string();

    let snapshot = decode_board(&document).expect("valid document");

    let counts: Vec<(String, usize)> = task_counts(&snapshot)
        .into_iter()
        .map(|(id, count)| (id.to_string(), count))
        .collect();
    assert_eq!(counts, vec![(column.to_owned(), 2)]);
    assert_eq!(overdue_tasks(&snapshot, Utc::now()).len(), 1);
}
