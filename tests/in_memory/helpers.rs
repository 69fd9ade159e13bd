//! Shared helpers for in-memory integration tests.

use std::sync::{Arc, Once};

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::{
    board::{
        adapters::memory::InMemoryBoardRepository,
        domain::{Board, Column, ColumnId, NewTask, Task, TaskId},
        services::BoardService,
    },
    identity::{
        adapters::memory::StaticIdentityProvider,
        domain::{Email, Session, SessionContext, UserId},
    },
    notification::adapters::memory::RecordingNotifier,
    project::{
        adapters::memory::InMemoryProjectRepository,
        domain::{MemberRole, Project},
        services::ProjectService,
    },
};
use tracing_subscriber::EnvFilter;

/// Board service wired to in-memory adapters.
pub type Boards = BoardService<
    InMemoryBoardRepository,
    InMemoryProjectRepository,
    RecordingNotifier,
    DefaultClock,
>;

/// Project service wired to in-memory adapters.
pub type Projects = ProjectService<
    InMemoryProjectRepository,
    InMemoryBoardRepository,
    RecordingNotifier,
    DefaultClock,
>;

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber honouring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// Both services sharing one set of in-memory adapters.
pub struct Workspace {
    pub boards: Boards,
    pub projects: Projects,
    pub board_rows: Arc<InMemoryBoardRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub identity: StaticIdentityProvider,
}

/// Provides a fresh workspace for each test.
#[fixture]
pub fn workspace() -> Workspace {
    init_tracing();
    let board_rows = Arc::new(InMemoryBoardRepository::new());
    let project_rows = Arc::new(InMemoryProjectRepository::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let clock = Arc::new(DefaultClock);
    let boards = BoardService::new(
        Arc::clone(&board_rows),
        Arc::clone(&project_rows),
        Arc::clone(&notifier),
        Arc::clone(&clock),
    );
    let projects = ProjectService::new(
        project_rows,
        Arc::clone(&board_rows),
        Arc::clone(&notifier),
        clock,
    )
    .with_board_state(boards.state().clone());
    Workspace {
        boards,
        projects,
        board_rows,
        notifier,
        identity: StaticIdentityProvider::new(),
    }
}

impl Workspace {
    /// Signs `email` in through the identity provider and resolves the
    /// session context the services expect.
    pub async fn sign_in(&self, email: &str) -> SessionContext {
        let address = Email::new(email).expect("valid email");
        self.identity
            .sign_in(Session::new(UserId::new(), address))
            .expect("sign in");
        SessionContext::resolve(&self.identity)
            .await
            .expect("session should resolve")
    }

    /// Creates a project and one board in it, owned by `owner`.
    pub async fn project_with_board(&self, owner: &SessionContext) -> (Project, Board) {
        let project = self
            .projects
            .create_project(owner, "Launch", Some("Q3 launch plan".to_owned()))
            .await
            .expect("project creation should succeed");
        let board = self
            .boards
            .create_board(owner, project.id(), "Release train", None)
            .await
            .expect("board creation should succeed");
        (project, board)
    }

    /// Invites `email` with `role` and accepts on their behalf.
    pub async fn join(
        &self,
        owner: &SessionContext,
        project: &Project,
        email: &str,
        role: MemberRole,
    ) -> SessionContext {
        self.projects
            .invite_member(owner, project.id(), email, role)
            .await
            .expect("invitation should succeed");
        let member = self.sign_in(email).await;
        self.projects
            .accept_invitation(&member, project.id())
            .await
            .expect("acceptance should succeed");
        member
    }

    /// Appends columns titled `titles` to `board`.
    pub async fn columns(
        &self,
        ctx: &SessionContext,
        board: &Board,
        titles: &[&str],
    ) -> Vec<Column> {
        let mut created = Vec::with_capacity(titles.len());
        for title in titles {
            created.push(
                self.boards
                    .create_column(ctx, board.id(), title)
                    .await
                    .expect("column creation should succeed"),
            );
        }
        created
    }

    /// Appends tasks titled `titles` to a column.
    pub async fn tasks(
        &self,
        ctx: &SessionContext,
        column_id: ColumnId,
        titles: &[&str],
    ) -> Vec<Task> {
        let mut created = Vec::with_capacity(titles.len());
        for title in titles {
            created.push(
                self.boards
                    .create_task(ctx, column_id, NewTask::new(*title))
                    .await
                    .expect("task creation should succeed"),
            );
        }
        created
    }
}

/// Identifiers of `tasks`, in order.
pub fn ids(tasks: &[Task]) -> Vec<TaskId> {
    tasks.iter().map(Task::id).collect()
}

/// Task titles of one column of an opened board, in display order.
pub async fn titles_in(
    workspace: &Workspace,
    ctx: &SessionContext,
    board: &Board,
    column_id: ColumnId,
) -> Vec<String> {
    let snapshot = workspace
        .boards
        .open_board(ctx, board.id())
        .await
        .expect("open board");
    snapshot
        .column(column_id)
        .expect("column on board")
        .tasks()
        .iter()
        .map(|card| card.task().title().to_owned())
        .collect()
}
