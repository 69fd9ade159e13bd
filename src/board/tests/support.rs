//! Shared fixtures for board service tests.

use std::sync::Arc;

use crate::board::{
    adapters::memory::InMemoryBoardRepository,
    domain::{Board, Column, ColumnId, NewTask, Task, TaskId},
    ports::BoardRepository,
    services::{BoardService, BoardServiceConfig},
};
use crate::identity::domain::{Email, Session, SessionContext, UserId};
use crate::notification::adapters::memory::RecordingNotifier;
use crate::project::{
    adapters::memory::InMemoryProjectRepository,
    domain::{MemberRole, Project},
    services::ProjectService,
};
use mockable::DefaultClock;

pub(super) type TestBoards = BoardService<
    InMemoryBoardRepository,
    InMemoryProjectRepository,
    RecordingNotifier,
    DefaultClock,
>;

pub(super) type TestProjects = ProjectService<
    InMemoryProjectRepository,
    InMemoryBoardRepository,
    RecordingNotifier,
    DefaultClock,
>;

pub(super) struct Fixture {
    pub service: TestBoards,
    pub projects: TestProjects,
    pub repository: Arc<InMemoryBoardRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub owner: SessionContext,
    pub project: Project,
    pub board: Board,
}

pub(super) fn signed_in(email: &str) -> SessionContext {
    let address = Email::new(email).expect("valid email");
    SessionContext::authenticated(Session::new(UserId::new(), address))
}

pub(super) async fn fixture() -> Fixture {
    fixture_with(BoardServiceConfig::default()).await
}

pub(super) async fn fixture_with(config: BoardServiceConfig) -> Fixture {
    let repository = Arc::new(InMemoryBoardRepository::new());
    let project_repository = Arc::new(InMemoryProjectRepository::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let clock = Arc::new(DefaultClock);
    let service = BoardService::new(
        Arc::clone(&repository),
        Arc::clone(&project_repository),
        Arc::clone(&notifier),
        Arc::clone(&clock),
    )
    .with_config(config);
    let projects = ProjectService::new(
        project_repository,
        Arc::clone(&repository),
        Arc::clone(&notifier),
        clock,
    )
    .with_board_state(service.state().clone());

    let owner = signed_in("owner@example.com");
    let project = projects
        .create_project(&owner, "Roadmap", None)
        .await
        .expect("project creation should succeed");
    let board = service
        .create_board(&owner, project.id(), "Sprint 1", None)
        .await
        .expect("board creation should succeed");

    Fixture {
        service,
        projects,
        repository,
        notifier,
        owner,
        project,
        board,
    }
}

impl Fixture {
    pub(super) async fn columns(&self, titles: &[&str]) -> Vec<Column> {
        let mut created = Vec::with_capacity(titles.len());
        for title in titles {
            created.push(
                self.service
                    .create_column(&self.owner, self.board.id(), title)
                    .await
                    .expect("column creation should succeed"),
            );
        }
        created
    }

    pub(super) async fn tasks(&self, column_id: ColumnId, titles: &[&str]) -> Vec<Task> {
        let mut created = Vec::with_capacity(titles.len());
        for title in titles {
            created.push(
                self.service
                    .create_task(&self.owner, column_id, NewTask::new(*title))
                    .await
                    .expect("task creation should succeed"),
            );
        }
        created
    }

    /// Column identifiers of the board sorted by their stored order.
    pub(super) async fn column_order(&self) -> Vec<ColumnId> {
        let mut columns = self
            .repository
            .list_columns(self.board.id())
            .await
            .expect("list columns");
        columns.sort_by_key(Column::order);
        columns.iter().map(Column::id).collect()
    }

    /// Task rows of a column sorted by their stored position.
    pub(super) async fn task_rows(&self, column_id: ColumnId) -> Vec<Task> {
        let mut tasks = self
            .repository
            .list_tasks(column_id)
            .await
            .expect("list tasks");
        tasks.sort_by_key(Task::position);
        tasks
    }

    pub(super) async fn task_order(&self, column_id: ColumnId) -> Vec<TaskId> {
        self.task_rows(column_id)
            .await
            .iter()
            .map(Task::id)
            .collect()
    }

    /// Signs in `email` as an accepted member of the fixture project.
    pub(super) async fn join(&self, email: &str, role: MemberRole) -> SessionContext {
        self.projects
            .invite_member(&self.owner, self.project.id(), email, role)
            .await
            .expect("invitation should succeed");
        let ctx = signed_in(email);
        self.projects
            .accept_invitation(&ctx, self.project.id())
            .await
            .expect("acceptance should succeed");
        ctx
    }
}
