//! When steps for board ordering BDD scenarios.

use super::world::{BoardOrderingWorld, run_async};
use rstest_bdd_macros::when;

#[when(r#"card "{card}" is moved to position {index:usize} of column "{column}""#)]
fn move_card(
    world: &mut BoardOrderingWorld,
    card: String,
    index: usize,
    column: String,
) -> Result<(), eyre::Report> {
    let task_id = world.card(&card)?;
    let column_id = world.column(&column)?;
    let result = run_async(world.boards.move_task(&world.owner, task_id, column_id, index));
    world.last_move = Some(result.map(|_| ()));
    Ok(())
}

#[when(r#"column "{column}" is moved to position {index:usize}"#)]
fn move_column(
    world: &mut BoardOrderingWorld,
    column: String,
    index: usize,
) -> Result<(), eyre::Report> {
    let column_id = world.column(&column)?;
    let board_id = world.board()?.id();
    let result = run_async(
        world
            .boards
            .move_column(&world.owner, board_id, column_id, index),
    );
    world.last_move = Some(result.map(|_| ()));
    Ok(())
}
