use proptest::prelude::*;
use roulette_engine::skirmish::enemy_wave;
use roulette_engine::{
    BattleConfig, Catalog, EngineError, Faction, GameRng, Grade, IdGen, Skirmish, SkirmishState, Unit, UnitId,
};

fn fighter(id: u64, hp: i32, atk: i32, def: i32, range: f64, speed: f64) -> Unit {
    Unit {
        id: UnitId(id),
        name: format!("u{id}"),
        grade: Grade::Normal,
        hp,
        max_hp: hp,
        atk,
        def,
        range,
        speed,
        level: 1,
        icon: String::new(),
        color: String::new(),
    }
}

#[test]
fn damage_never_drops_below_one() {
    let weak = fighter(1, 10, 3, 0, 10.0, 1.0);
    let wall = fighter(2, 10, 1, 50, 10.0, 1.0);
    assert_eq!(weak.damage_against(&wall), 1);
    assert_eq!(wall.damage_against(&weak), 1);
    assert_eq!(fighter(3, 10, 20, 0, 1.0, 1.0).damage_against(&wall), 1);
    assert_eq!(fighter(4, 10, 60, 0, 1.0, 1.0).damage_against(&wall), 10);
}

#[test]
fn sides_start_on_opposite_rows() {
    let roster: Vec<Unit> = (1..=12).map(|i| fighter(i, 10, 1, 0, 1.0, 1.0)).collect();
    let enemies: Vec<Unit> = (20..=21).map(|i| fighter(i, 10, 1, 0, 1.0, 1.0)).collect();
    let sk = Skirmish::new(&roster, &enemies, 1, BattleConfig::default());
    let units = sk.units();

    assert_eq!((units[0].pos.x, units[0].pos.y), (50.0, 500.0));
    assert_eq!((units[1].pos.x, units[1].pos.y), (90.0, 500.0));
    // Slot 10 opens a second row further from the centre line.
    assert_eq!(units[10].pos.y, 540.0);
    assert_eq!(units[12].faction, Faction::Enemy);
    assert_eq!((units[12].pos.x, units[12].pos.y), (50.0, 100.0));
    assert!(units.iter().all(|u| u.current_hp == u.unit.hp));
}

#[test]
fn victory_pays_floor_times_hundred() {
    let hero = fighter(1, 100, 10, 0, 1000.0, 0.0);
    let imp = fighter(2, 10, 1, 0, 1.0, 0.0);
    let mut sk = Skirmish::new(&[hero.clone()], &[imp], 3, BattleConfig::default());

    let outcome = sk.step().expect("one hit ends it");
    assert!(outcome.victory);
    assert_eq!(outcome.gold_earned, 300);
    assert_eq!(outcome.ticks, 1);
    assert_eq!(outcome.survivors, vec![hero]);
    assert_eq!(sk.state(), SkirmishState::Victory);
}

#[test]
fn defeat_pays_nothing_and_keeps_nobody() {
    let hero = fighter(1, 5, 1, 0, 1.0, 0.0);
    let brute = fighter(2, 50, 10, 0, 1000.0, 0.0);
    let mut sk = Skirmish::new(&[hero], &[brute], 4, BattleConfig::default());

    let outcome = sk.step().expect("one hit ends it");
    assert!(!outcome.victory);
    assert_eq!(outcome.gold_earned, 0);
    assert!(outcome.survivors.is_empty());
    assert_eq!(sk.state(), SkirmishState::Defeat);
}

#[test]
fn survivors_come_back_as_fresh_templates() {
    let hero = fighter(1, 100, 25, 0, 1000.0, 0.0);
    let imp = fighter(2, 50, 30, 0, 1000.0, 0.0);
    let mut sk = Skirmish::new(&[hero], &[imp], 1, BattleConfig::default());

    assert!(sk.step().is_none());
    assert_eq!(sk.units()[0].current_hp, 70);
    assert_eq!(sk.units()[1].current_hp, 25);

    let outcome = sk.step().expect("second hit kills");
    assert_eq!(outcome.ticks, 2);
    assert_eq!(outcome.survivors[0].hp, 100);
}

#[test]
fn outcome_is_emitted_once_and_ticking_stops() {
    let hero = fighter(1, 100, 10, 0, 1000.0, 0.0);
    let imp = fighter(2, 10, 1, 0, 1.0, 0.0);
    let mut sk = Skirmish::new(&[hero], &[imp], 1, BattleConfig::default());

    let emitted = (0..10).filter_map(|_| sk.step()).count();
    assert_eq!(emitted, 1);
    assert_eq!(sk.ticks(), 1);
    assert!(sk.outcome().is_some());
}

#[test]
fn run_to_completion_after_step_emitted_is_an_error() {
    let hero = fighter(1, 100, 10, 0, 1000.0, 0.0);
    let imp = fighter(2, 10, 1, 0, 1.0, 0.0);
    let mut sk = Skirmish::new(&[hero], &[imp], 1, BattleConfig::default());

    assert!(sk.step().is_some());
    assert!(matches!(sk.run_to_completion(), Err(EngineError::PreconditionViolation(_))));
    assert!(sk.outcome().is_some());
}

#[test]
fn run_to_completion_hands_out_the_outcome_once() {
    let hero = fighter(1, 100, 10, 0, 1000.0, 0.0);
    let imp = fighter(2, 10, 1, 0, 1.0, 0.0);
    let mut sk = Skirmish::new(&[hero], &[imp], 1, BattleConfig::default());

    assert!(sk.run_to_completion().unwrap().victory);
    assert!(sk.run_to_completion().is_err());
    assert!(sk.step().is_none());
}

#[test]
fn empty_enemy_side_is_an_immediate_victory() {
    let hero = fighter(1, 100, 10, 0, 10.0, 1.0);
    let mut sk = Skirmish::new(&[hero], &[], 2, BattleConfig::default());
    assert!(sk.is_terminal());
    let outcome = sk.step().expect("pending outcome is emitted");
    assert!(outcome.victory);
    assert_eq!(outcome.ticks, 0);
    assert!(sk.step().is_none());
}

#[test]
fn targets_first_living_enemy_not_nearest() {
    let roster = [fighter(1, 100, 1, 0, 10.0, 0.0), fighter(2, 100, 1, 0, 10.0, 20.0)];
    // Enemy 3 sits above slot 0, enemy 4 straight above the mover in slot 1.
    let enemies = [fighter(3, 100, 1, 0, 1.0, 0.0), fighter(4, 100, 1, 0, 1.0, 0.0)];
    let mut sk = Skirmish::new(&roster, &enemies, 1, BattleConfig::default());

    sk.step();
    let mover = &sk.units()[1];
    assert!(mover.pos.x < 90.0, "moved toward enemy 3, got x={}", mover.pos.x);
    assert!(mover.pos.y < 500.0);
}

#[test]
fn attack_needs_distance_strictly_inside_range() {
    let hero = fighter(1, 100, 10, 0, 400.0, 20.0);
    let dummy = fighter(2, 1000, 0, 0, 1.0, 0.0);
    let mut sk = Skirmish::new(&[hero], &[dummy], 1, BattleConfig::default());

    sk.step();
    assert_eq!(sk.units()[1].current_hp, 1000);
    assert_eq!(sk.units()[0].pos.y, 499.0);

    sk.step();
    assert_eq!(sk.units()[1].current_hp, 990);
}

#[test]
fn range_scale_shrinks_reach() {
    let config = BattleConfig { range_scale: 0.5, ..BattleConfig::default() };
    let archer = fighter(1, 100, 10, 0, 700.0, 0.0);
    let dummy = fighter(2, 1000, 0, 0, 1.0, 0.0);
    let mut sk = Skirmish::new(&[archer.clone()], &[dummy.clone()], 1, config.clone());
    sk.step();
    assert_eq!(sk.units()[1].current_hp, 1000);

    let sniper = Unit { range: 1000.0, ..archer };
    let mut sk = Skirmish::new(&[sniper], &[dummy], 1, config);
    sk.step();
    assert_eq!(sk.units()[1].current_hp, 990);
}

#[test]
fn stalled_battle_hits_tick_limit() {
    let config = BattleConfig { max_ticks: 50, ..BattleConfig::default() };
    let a = fighter(1, 10, 1, 0, 1.0, 0.0);
    let b = fighter(2, 10, 1, 0, 1.0, 0.0);
    let mut sk = Skirmish::new(&[a], &[b], 1, config);
    let err = sk.run_to_completion().unwrap_err();
    assert_eq!(err.to_string(), "battle did not finish within 50 ticks");
}

#[test]
fn enemy_wave_grows_with_floor() {
    let catalog = Catalog::builtin().unwrap();
    let config = BattleConfig::default();
    let mut ids = IdGen::new();
    let mut rng = GameRng::from_seed(9);
    let wave = enemy_wave(4, &catalog, &config, &mut rng, &mut ids);
    assert_eq!(wave.len(), 7);
    assert!(wave.iter().all(|u| u.name == "타락한 천사"));
    assert!(wave
        .iter()
        .all(|u| catalog.base_units().iter().any(|b| b.atk == u.atk && b.max_hp == u.max_hp)));
}

fn arb_unit(id: u64) -> impl Strategy<Value = Unit> {
    (1i32..200, 0i32..50, 0i32..60, 5.0f64..250.0, 10.0f64..80.0)
        .prop_map(move |(hp, atk, def, range, speed)| fighter(id, hp, atk, def, range, speed))
}

fn arb_side(base: u64) -> impl Strategy<Value = Vec<Unit>> {
    (1usize..6).prop_flat_map(move |n| {
        (0..n as u64)
            .map(|i| arb_unit(base + i))
            .collect::<Vec<_>>()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_skirmish_terminates(roster in arb_side(1), enemies in arb_side(100), floor in 1u32..10) {
        let mut sk = Skirmish::new(&roster, &enemies, floor, BattleConfig::default());
        let outcome = sk.run_to_completion().expect("terminates within the tick cap");
        prop_assert!(sk.is_terminal());
        if outcome.victory {
            prop_assert_eq!(outcome.gold_earned, floor * 100);
            prop_assert!(!outcome.survivors.is_empty());
            prop_assert_eq!(sk.alive(Faction::Enemy), 0);
        } else {
            prop_assert_eq!(outcome.gold_earned, 0);
            prop_assert!(outcome.survivors.is_empty());
            prop_assert_eq!(sk.alive(Faction::Friendly), 0);
        }
        prop_assert!(sk.units().iter().all(|u| u.current_hp > 0));
    }
}
