use serde::Serialize;
use tracing::{debug, info};

use crate::combine::resolve;
use crate::content::Catalog;
use crate::error::{EngineError, EngineResult};
use crate::unit::{IdGen, Unit};
use crate::GameRng;

/// Result of one roulette spin.
#[derive(Debug, Clone, Serialize)]
pub struct SpinOutcome {
    /// Board index hit by each slot, in slot order.
    pub slots: Vec<usize>,
    /// Units summoned by the slots.
    pub draw: Vec<Unit>,
    /// Specials produced by recipes over `draw`.
    pub crafted: Vec<Unit>,
    /// `carry_over ++ draw ++ crafted`, the friendly side of the next skirmish.
    pub roster: Vec<Unit>,
}

/// Fill a `board_size × board_size` board by sampling `deck` with replacement.
pub fn fill_board(
    deck: &[Unit],
    board_size: u32,
    rng: &mut GameRng,
    ids: &mut IdGen,
) -> EngineResult<Vec<Unit>> {
    if deck.is_empty() {
        return Err(EngineError::precondition("cannot fill the board from an empty deck"));
    }
    let cells = match board_size.checked_mul(board_size) {
        Some(0) => return Err(EngineError::precondition("board size must be at least 1")),
        Some(n) => n as usize,
        None => return Err(EngineError::precondition(format!("board size {board_size} is too large"))),
    };
    let board: Vec<Unit> = (0..cells)
        .map(|_| deck[rng.pick(deck.len())].instantiate(ids))
        .collect();
    debug!(cells, deck = deck.len(), "board filled");
    Ok(board)
}

/// Sample `slot_count` board cells with replacement and craft what they unlock.
pub fn spin(
    board: &[Unit],
    slot_count: u32,
    carry_over: &[Unit],
    catalog: &Catalog,
    rng: &mut GameRng,
    ids: &mut IdGen,
) -> EngineResult<SpinOutcome> {
    if board.is_empty() {
        return Err(EngineError::precondition("cannot spin an empty board"));
    }
    if slot_count == 0 {
        return Err(EngineError::precondition("roulette needs at least one slot"));
    }

    let slots: Vec<usize> = (0..slot_count).map(|_| rng.pick(board.len())).collect();
    let draw: Vec<Unit> = slots.iter().map(|&i| board[i].instantiate(ids)).collect();
    let crafted = resolve(&draw, catalog, ids);

    let roster: Vec<Unit> = carry_over
        .iter()
        .map(|u| u.instantiate(ids))
        .chain(draw.iter().cloned())
        .chain(crafted.iter().cloned())
        .collect();

    info!(
        slots = slot_count,
        crafted = crafted.len(),
        roster = roster.len(),
        "roulette spun"
    );
    Ok(SpinOutcome { slots, draw, crafted, roster })
}
