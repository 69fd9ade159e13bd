//! Building a board and moving cards through it.

use super::helpers::{Workspace, ids, titles_in, workspace};
use rstest::rstest;
use taskboard::{
    board::{
        domain::{Column, NewTask, TaskUpdate},
        ports::BoardEntityRef,
        projection::task_counts,
        services::BoardServiceError,
    },
    notification::NoticeLevel,
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cards_travel_across_the_board_in_order(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (_, board) = workspace.project_with_board(&owner).await;
    let columns = workspace
        .columns(&owner, &board, &["Backlog", "Doing", "Done"])
        .await;
    let [backlog, doing, done] =
        [0, 1, 2].map(|index| columns.get(index).map(Column::id).expect("column"));
    let cards = workspace
        .tasks(&owner, backlog, &["design", "build", "ship"])
        .await;
    let order = ids(&cards);
    let [design, build, ship] = [0, 1, 2].map(|index| order.get(index).copied().expect("card"));

    workspace
        .boards
        .move_task(&owner, design, doing, 0)
        .await
        .expect("design starts");
    workspace
        .boards
        .move_task(&owner, build, doing, 1)
        .await
        .expect("build starts");
    workspace
        .boards
        .move_task(&owner, design, done, 0)
        .await
        .expect("design finishes");
    workspace
        .boards
        .move_task(&owner, ship, doing, 0)
        .await
        .expect("ship jumps the queue");

    assert!(titles_in(&workspace, &owner, &board, backlog).await.is_empty());
    assert_eq!(
        titles_in(&workspace, &owner, &board, doing).await,
        vec!["ship", "build"]
    );
    assert_eq!(
        titles_in(&workspace, &owner, &board, done).await,
        vec!["design"]
    );

    let snapshot = workspace
        .boards
        .open_board(&owner, board.id())
        .await
        .expect("open board");
    assert_eq!(
        task_counts(&snapshot),
        vec![(backlog, 0), (doing, 2), (done, 1)]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reordering_columns_changes_the_display_order(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (_, board) = workspace.project_with_board(&owner).await;
    let columns = workspace
        .columns(&owner, &board, &["Todo", "Review", "Done"])
        .await;
    let review = columns.get(1).map(Column::id).expect("column");

    workspace
        .boards
        .move_column(&owner, board.id(), review, 2)
        .await
        .expect("move column");
    workspace
        .boards
        .rename_column(&owner, review, "  QA  ")
        .await
        .expect("rename column");

    let snapshot = workspace
        .boards
        .open_board(&owner, board.id())
        .await
        .expect("open board");
    let titles: Vec<&str> = snapshot
        .columns()
        .iter()
        .map(|entry| entry.column().title())
        .collect();
    assert_eq!(titles, vec!["Todo", "Done", "QA"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn editing_a_card_keeps_its_place(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (_, board) = workspace.project_with_board(&owner).await;
    let column = workspace.columns(&owner, &board, &["Todo"]).await.remove(0);
    let cards = workspace.tasks(&owner, column.id(), &["a", "b", "c"]).await;
    let middle = cards.get(1).expect("card");

    let updated = workspace
        .boards
        .update_task(
            &owner,
            middle.id(),
            TaskUpdate::new()
                .title("b, revised")
                .description(Some("details".to_owned())),
        )
        .await
        .expect("update task");

    assert_eq!(updated.position(), middle.position());
    assert_eq!(updated.description(), Some("details"));
    assert_eq!(
        titles_in(&workspace, &owner, &board, column.id()).await,
        vec!["a", "b, revised", "c"]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_column_takes_its_cards_with_it(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (_, board) = workspace.project_with_board(&owner).await;
    let columns = workspace.columns(&owner, &board, &["Todo", "Done"]).await;
    let todo = columns.first().map(Column::id).expect("column");
    let cards = workspace.tasks(&owner, todo, &["x", "y"]).await;

    workspace
        .boards
        .delete_column(&owner, todo)
        .await
        .expect("delete column");

    let first = ids(&cards).first().copied().expect("card");
    let result = workspace
        .boards
        .update_task(&owner, first, TaskUpdate::new().title("gone"))
        .await;
    assert!(matches!(
        result,
        Err(BoardServiceError::NotFound(BoardEntityRef::Task(id))) if id == first
    ));
    assert_eq!(workspace.board_rows.task_count().expect("count"), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn every_operation_reports_one_notice(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (_, board) = workspace.project_with_board(&owner).await;
    let column = workspace.columns(&owner, &board, &["Todo"]).await.remove(0);
    let before = workspace.notifier.notices().len();

    workspace
        .boards
        .create_task(&owner, column.id(), NewTask::new("   "))
        .await
        .expect_err("blank title is rejected");
    workspace
        .boards
        .create_task(&owner, column.id(), NewTask::new("real"))
        .await
        .expect("task creation should succeed");

    let notices = workspace.notifier.notices();
    let levels: Vec<NoticeLevel> = notices
        .iter()
        .skip(before)
        .map(|notice| notice.level)
        .collect();
    assert_eq!(levels, vec![NoticeLevel::Error, NoticeLevel::Success]);
}
