use insta::assert_debug_snapshot;
use proptest::prelude::*;
use roulette_engine::{
    attempt_upgrade, upgrade_requirement, EngineError, Ledger, ProgressionConfig, Resource, Track,
    UpgradeKind,
};

fn ledger(gold: u32) -> Ledger {
    Ledger::new(gold, &ProgressionConfig::default())
}

#[test]
fn requirement_grows_two_per_level() {
    assert_eq!(upgrade_requirement(1), 3);
    assert_eq!(upgrade_requirement(2), 5);
    assert_eq!(upgrade_requirement(3), 7);
    assert_eq!(upgrade_requirement(4), 9);
}

#[test]
fn new_ledger_starts_at_minimum_capacities() {
    let l = ledger(0);
    assert_eq!(l.board_size(), 2);
    assert_eq!(l.roulette_slots(), 3);
    assert_eq!(l.board.progress, 0);
}

#[test]
fn short_on_gold_changes_nothing() {
    let cfg = ProgressionConfig::default();
    let before = ledger(499);
    let err = attempt_upgrade(UpgradeKind::Board, &before, &cfg).unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientResource {
            resource: Resource::Gold,
            needed: 500,
            available: 499
        }
    );
    assert!(err.is_recoverable());
    assert_eq!(before, ledger(499));
}

#[test]
fn maxed_track_is_rejected() {
    let cfg = ProgressionConfig::default();
    let mut l = ledger(10_000);
    l.roulette = Track { capacity: 5, progress: 0 };
    let err = l.upgrade_roulette(&cfg).unwrap_err();
    assert_eq!(err, EngineError::InvalidUpgrade { kind: UpgradeKind::Roulette, capacity: 5 });
    assert!(err.is_recoverable());
}

#[test]
fn gold_is_checked_before_capacity() {
    let cfg = ProgressionConfig::default();
    let mut l = ledger(0);
    l.board = Track { capacity: 5, progress: 0 };
    assert!(matches!(
        l.upgrade_board(&cfg),
        Err(EngineError::InsufficientResource { .. })
    ));
}

#[test]
fn five_board_purchases_widen_the_board() {
    let cfg = ProgressionConfig::default();
    let mut l = ledger(2500);
    for _ in 0..5 {
        l = l.upgrade_board(&cfg).unwrap();
    }
    assert_debug_snapshot!(l, @r#"
    Ledger {
        gold: 0,
        board: Track {
            capacity: 3,
            progress: 0,
        },
        roulette: Track {
            capacity: 3,
            progress: 0,
        },
    }
    "#);
}

#[test]
fn tracks_are_independent() {
    let cfg = ProgressionConfig::default();
    let l = ledger(1000).upgrade_roulette(&cfg).unwrap();
    assert_eq!(l.roulette.progress, 1);
    assert_eq!(l.board.progress, 0);
    assert_eq!(l.gold, 500);
}

#[test]
fn capacity_tops_out_at_five() {
    let cfg = ProgressionConfig::default();
    let mut l = ledger(u32::MAX);
    while let Ok(next) = l.upgrade_board(&cfg) {
        l = next;
    }
    assert_eq!(l.board_size(), 5);
    // 2->3 takes 5 purchases, 3->4 takes 7, 4->5 takes 9.
    assert_eq!(u32::MAX - l.gold, (5 + 7 + 9) * 500);
}

proptest! {
    #[test]
    fn requirement_purchases_step_capacity(level in 2u32..5, kind in prop_oneof![Just(UpgradeKind::Board), Just(UpgradeKind::Roulette)]) {
        let cfg = ProgressionConfig::default();
        let req = upgrade_requirement(level);
        let mut l = ledger(req * cfg.upgrade_cost);
        match kind {
            UpgradeKind::Board => l.board = Track::new(level),
            UpgradeKind::Roulette => l.roulette = Track::new(level),
        }

        for _ in 0..req - 1 {
            l = attempt_upgrade(kind, &l, &cfg).unwrap();
        }
        prop_assert_eq!(l.track(kind), Track { capacity: level, progress: req - 1 });
        prop_assert_eq!(l.gold, cfg.upgrade_cost);

        l = attempt_upgrade(kind, &l, &cfg).unwrap();
        prop_assert_eq!(l.track(kind), Track { capacity: level + 1, progress: 0 });
        prop_assert_eq!(l.gold, 0);
    }
}
