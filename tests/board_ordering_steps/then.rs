//! Then steps for board ordering BDD scenarios.

use super::world::{BoardOrderingWorld, run_async, titles};
use eyre::WrapErr;
use rstest_bdd_macros::then;
use taskboard::board::{
    domain::{BoardDomainError, OrderingError},
    services::BoardServiceError,
};

#[then(r#"column "{column}" lists cards "{cards}""#)]
fn column_lists_cards(
    world: &BoardOrderingWorld,
    column: String,
    cards: String,
) -> Result<(), eyre::Report> {
    let column_id = world.column(&column)?;
    let board_id = world.board()?.id();
    let snapshot = run_async(world.boards.open_board(&world.owner, board_id))
        .wrap_err("open scenario board")?;
    let listed: Vec<String> = snapshot
        .column(column_id)
        .ok_or_else(|| eyre::eyre!("column {column:?} missing from snapshot"))?
        .tasks()
        .iter()
        .map(|card| card.task().title().to_owned())
        .collect();

    let expected = titles(&cards);
    if listed != expected {
        return Err(eyre::eyre!("expected cards {expected:?}, found {listed:?}"));
    }
    Ok(())
}

#[then(r#"the board lists columns "{columns}""#)]
fn board_lists_columns(world: &BoardOrderingWorld, columns: String) -> Result<(), eyre::Report> {
    let board_id = world.board()?.id();
    let snapshot = run_async(world.boards.open_board(&world.owner, board_id))
        .wrap_err("open scenario board")?;
    let listed: Vec<String> = snapshot
        .columns()
        .iter()
        .map(|entry| entry.column().title().to_owned())
        .collect();

    let expected = titles(&columns);
    if listed != expected {
        return Err(eyre::eyre!("expected columns {expected:?}, found {listed:?}"));
    }
    Ok(())
}

#[then("the move is rejected as out of range")]
fn move_rejected_out_of_range(world: &BoardOrderingWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result"))?;

    if !matches!(
        result,
        Err(BoardServiceError::Validation(BoardDomainError::Ordering(
            OrderingError::IndexOutOfRange { .. }
        )))
    ) {
        return Err(eyre::eyre!("expected IndexOutOfRange error, got {result:?}"));
    }
    Ok(())
}

#[then("the move fails with a repository error")]
fn move_fails_with_repository_error(world: &BoardOrderingWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_move
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing move result"))?;

    if !matches!(result, Err(BoardServiceError::Repository(_))) {
        return Err(eyre::eyre!("expected repository error, got {result:?}"));
    }
    Ok(())
}
