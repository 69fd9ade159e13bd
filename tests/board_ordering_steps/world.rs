//! Shared world state for board ordering BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskboard::{
    board::{
        adapters::memory::InMemoryBoardRepository,
        domain::{Board, ColumnId, TaskId},
        services::{BoardService, BoardServiceConfig, BoardServiceError},
    },
    identity::domain::{Email, Session, SessionContext, UserId},
    notification::adapters::memory::RecordingNotifier,
    project::{adapters::memory::InMemoryProjectRepository, services::ProjectService},
};

/// Board service type used by the BDD world.
pub type TestBoards = BoardService<
    InMemoryBoardRepository,
    InMemoryProjectRepository,
    RecordingNotifier,
    DefaultClock,
>;

/// Project service type used by the BDD world.
pub type TestProjects = ProjectService<
    InMemoryProjectRepository,
    InMemoryBoardRepository,
    RecordingNotifier,
    DefaultClock,
>;

/// Scenario world for board ordering behaviour tests.
pub struct BoardOrderingWorld {
    pub boards: TestBoards,
    pub projects: TestProjects,
    pub board_rows: Arc<InMemoryBoardRepository>,
    pub owner: SessionContext,
    pub board: Option<Board>,
    pub columns: HashMap<String, ColumnId>,
    pub cards: HashMap<String, TaskId>,
    pub last_move: Option<Result<(), BoardServiceError>>,
}

impl BoardOrderingWorld {
    /// Creates a world with a signed-in owner and no board yet.
    ///
    /// # Panics
    ///
    /// Panics if the fixed owner address is rejected.
    #[must_use]
    pub fn new() -> Self {
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
        let projects = ProjectService::new(project_rows, Arc::clone(&board_rows), notifier, clock)
            .with_board_state(boards.state().clone());
        let email = Email::new("owner@example.com").expect("valid owner email");

        Self {
            boards,
            projects,
            board_rows,
            owner: SessionContext::authenticated(Session::new(UserId::new(), email)),
            board: None,
            columns: HashMap::new(),
            cards: HashMap::new(),
            last_move: None,
        }
    }

    /// Switches the board service to `config` for the rest of the scenario.
    pub fn configure(&mut self, config: BoardServiceConfig) {
        self.boards = self.boards.clone().with_config(config);
    }

    /// Looks up a column created by an earlier step.
    ///
    /// # Errors
    ///
    /// Returns an error when no column has that title.
    pub fn column(&self, title: &str) -> Result<ColumnId, eyre::Report> {
        self.columns
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown column {title:?} in scenario world"))
    }

    /// Looks up a card created by an earlier step.
    ///
    /// # Errors
    ///
    /// Returns an error when no card has that title.
    pub fn card(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.cards
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown card {title:?} in scenario world"))
    }

    /// Returns the scenario board.
    ///
    /// # Errors
    ///
    /// Returns an error when no board was created yet.
    pub fn board(&self) -> Result<&Board, eyre::Report> {
        self.board
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing board in scenario world"))
    }
}

impl Default for BoardOrderingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> BoardOrderingWorld {
    BoardOrderingWorld::default()
}

/// Splits a comma-separated step argument into trimmed titles.
pub fn titles(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
