//! Given steps for board ordering BDD scenarios.

use super::world::{BoardOrderingWorld, run_async, titles};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskboard::board::{
    adapters::memory::BoardOperation,
    domain::{NewTask, OrderingPolicy},
    services::BoardServiceConfig,
};

fn create_board(world: &mut BoardOrderingWorld, columns: &str) -> Result<(), eyre::Report> {
    let project = run_async(world.projects.create_project(&world.owner, "Scenario", None))
        .wrap_err("create scenario project")?;
    let board = run_async(
        world
            .boards
            .create_board(&world.owner, project.id(), "Scenario board", None),
    )
    .wrap_err("create scenario board")?;

    for title in titles(columns) {
        let column = run_async(world.boards.create_column(&world.owner, board.id(), &title))
            .wrap_err_with(|| format!("create column {title:?}"))?;
        world.columns.insert(title, column.id());
    }
    world.board = Some(board);
    Ok(())
}

#[given(r#"a board with columns "{columns}""#)]
fn board_with_columns(world: &mut BoardOrderingWorld, columns: String) -> Result<(), eyre::Report> {
    create_board(world, &columns)
}

#[given(r#"a board with columns "{columns}" that renumbers on every insert"#)]
fn renumbering_board(world: &mut BoardOrderingWorld, columns: String) -> Result<(), eyre::Report> {
    let ordering = OrderingPolicy::new(1.0, 2.0)
        .map_err(|err| eyre::eyre!("invalid ordering policy: {err}"))?;
    world.configure(BoardServiceConfig::default().with_ordering(ordering));
    create_board(world, &columns)
}

#[given(r#"column "{column}" holds cards "{cards}""#)]
fn column_holds_cards(
    world: &mut BoardOrderingWorld,
    column: String,
    cards: String,
) -> Result<(), eyre::Report> {
    let column_id = world.column(&column)?;
    for title in titles(&cards) {
        let task = run_async(world.boards.create_task(
            &world.owner,
            column_id,
            NewTask::new(title.clone()),
        ))
        .wrap_err_with(|| format!("create card {title:?}"))?;
        world.cards.insert(title, task.id());
    }
    Ok(())
}

#[given("the next task write fails")]
fn next_task_write_fails(world: &mut BoardOrderingWorld) -> Result<(), eyre::Report> {
    world
        .board_rows
        .fail_after(BoardOperation::UpdateTask, 0)
        .map_err(|err| eyre::eyre!("arm repository fault: {err}"))
}
