//! Invitations, roles, tags and assignees across both services.

use super::helpers::{Workspace, workspace};
use rstest::rstest;
use taskboard::{
    board::{
        domain::BoardDomainError,
        projection::{ProjectionConfig, assignee_overflow, invitation_status_label},
        services::BoardServiceError,
    },
    project::domain::{AuthorizationError, MemberRole},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invited_members_work_on_the_board_once_accepted(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (project, board) = workspace.project_with_board(&owner).await;
    workspace
        .projects
        .invite_member(&owner, project.id(), "dev@example.com", MemberRole::Member)
        .await
        .expect("invitation should succeed");
    let pending = workspace.sign_in("dev@example.com").await;

    let before = workspace.boards.open_board(&pending, board.id()).await;
    assert!(matches!(
        before,
        Err(BoardServiceError::Authorization(AuthorizationError::NotMember(id))) if id == project.id()
    ));

    workspace
        .projects
        .accept_invitation(&pending, project.id())
        .await
        .expect("acceptance should succeed");
    let column = workspace
        .boards
        .create_column(&pending, board.id(), "Todo")
        .await
        .expect("members may add columns");

    let members = workspace
        .projects
        .list_members(&owner, project.id())
        .await
        .expect("list members");
    let labels: Vec<&str> = members.iter().map(invitation_status_label).collect();
    assert_eq!(labels, vec!["Accepted", "Accepted"]);
    assert_eq!(column.board_id(), board.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn viewers_read_but_do_not_write(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (project, board) = workspace.project_with_board(&owner).await;
    workspace.columns(&owner, &board, &["Todo"]).await;
    let viewer = workspace
        .join(&owner, &project, "viewer@example.com", MemberRole::Viewer)
        .await;

    let snapshot = workspace
        .boards
        .open_board(&viewer, board.id())
        .await
        .expect("viewers may open boards");
    assert_eq!(snapshot.columns().len(), 1);

    let result = workspace
        .boards
        .create_column(&viewer, board.id(), "Mine")
        .await;
    assert!(matches!(
        result,
        Err(BoardServiceError::Authorization(
            AuthorizationError::InsufficientRole {
                required: MemberRole::Member,
                actual: MemberRole::Viewer,
            }
        ))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tags_and_assignees_show_up_on_cards(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (project, board) = workspace.project_with_board(&owner).await;
    let column = workspace.columns(&owner, &board, &["Todo"]).await.remove(0);
    let card = workspace
        .tasks(&owner, column.id(), &["wire up"])
        .await
        .remove(0);
    let tag = workspace
        .projects
        .create_tag(&owner, project.id(), "Backend", "#2266AA")
        .await
        .expect("tag creation should succeed");

    let mut assignees = Vec::new();
    for index in 0..5 {
        let email = format!("dev{index}@example.com");
        let member = workspace
            .join(&owner, &project, &email, MemberRole::Member)
            .await;
        let user_id = member.session().map(|session| session.user_id()).expect("signed in");
        workspace
            .boards
            .assign_user(&member, card.id(), user_id)
            .await
            .expect("members may assign themselves");
        assignees.push(user_id);
    }
    assert!(
        workspace
            .boards
            .assign_tag(&owner, card.id(), tag.id)
            .await
            .expect("assign tag")
    );

    let snapshot = workspace
        .boards
        .open_board(&owner, board.id())
        .await
        .expect("open board");
    let loaded = snapshot.task(card.id()).expect("card on board");
    assert_eq!(loaded.assignees(), assignees.as_slice());
    let names: Vec<&str> = snapshot
        .tags_for(loaded)
        .iter()
        .map(|known| known.name.as_str())
        .collect();
    assert_eq!(names, vec!["Backend"]);

    let overflow = assignee_overflow(loaded.assignees(), &ProjectionConfig::default());
    assert_eq!(overflow.visible.len(), 3);
    assert_eq!(overflow.label(), Some("+2".to_owned()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn outsiders_cannot_be_assigned(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (_, board) = workspace.project_with_board(&owner).await;
    let column = workspace.columns(&owner, &board, &["Todo"]).await.remove(0);
    let card = workspace.tasks(&owner, column.id(), &["solo"]).await.remove(0);
    let outsider = workspace.sign_in("outsider@example.com").await;
    let outsider_id = outsider
        .session()
        .map(|session| session.user_id())
        .expect("signed in");

    let result = workspace
        .boards
        .assign_user(&owner, card.id(), outsider_id)
        .await;

    assert!(matches!(
        result,
        Err(BoardServiceError::Validation(BoardDomainError::NonMemberAssignee(id))) if id == outsider_id
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tags_from_another_project_are_rejected(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (_, board) = workspace.project_with_board(&owner).await;
    let (other, _) = workspace.project_with_board(&owner).await;
    let column = workspace.columns(&owner, &board, &["Todo"]).await.remove(0);
    let card = workspace.tasks(&owner, column.id(), &["card"]).await.remove(0);
    let foreign = workspace
        .projects
        .create_tag(&owner, other.id(), "Elsewhere", "#000000")
        .await
        .expect("tag creation should succeed");

    let result = workspace.boards.assign_tag(&owner, card.id(), foreign.id).await;

    assert!(matches!(
        result,
        Err(BoardServiceError::Validation(BoardDomainError::ForeignTag(id))) if id == foreign.id
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_tag_clears_it_from_reopened_boards(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (project, board) = workspace.project_with_board(&owner).await;
    let column = workspace.columns(&owner, &board, &["Todo"]).await.remove(0);
    let card = workspace.tasks(&owner, column.id(), &["card"]).await.remove(0);
    let tag = workspace
        .projects
        .create_tag(&owner, project.id(), "Stale", "#abcdef")
        .await
        .expect("tag creation should succeed");
    workspace
        .boards
        .assign_tag(&owner, card.id(), tag.id)
        .await
        .expect("assign tag");

    workspace
        .projects
        .delete_tag(&owner, tag.id)
        .await
        .expect("delete tag");

    let snapshot = workspace
        .boards
        .open_board(&owner, board.id())
        .await
        .expect("open board");
    assert!(snapshot.tags().is_empty());
    assert!(
        snapshot
            .task(card.id())
            .expect("card on board")
            .tag_ids()
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_the_project_removes_its_boards(workspace: Workspace) {
    let owner = workspace.sign_in("owner@example.com").await;
    let (project, board) = workspace.project_with_board(&owner).await;
    let column = workspace.columns(&owner, &board, &["Todo"]).await.remove(0);
    workspace.tasks(&owner, column.id(), &["a", "b"]).await;

    workspace
        .projects
        .delete_project(&owner, project.id())
        .await
        .expect("owner may delete the project");

    assert_eq!(workspace.board_rows.task_count().expect("count"), 0);
    let listed = workspace
        .projects
        .list_projects(&owner)
        .await
        .expect("list projects");
    assert!(listed.is_empty());
}
