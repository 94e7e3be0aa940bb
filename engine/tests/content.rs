use roulette_engine::{Catalog, EngineError, Grade};

const UNITS: &str = r#"{
  "base": [
    { "name": "a", "grade": "normal", "hp": 10, "max_hp": 10, "atk": 1, "def": 0, "range": 5, "speed": 1 },
    { "name": "b", "grade": "rare", "hp": 10, "max_hp": 10, "atk": 1, "def": 0, "range": 5, "speed": 1 }
  ],
  "special": [
    { "name": "ab", "grade": "epic", "hp": 30, "max_hp": 30, "atk": 3, "def": 1, "range": 5, "speed": 1 }
  ]
}"#;

#[test]
fn builtin_catalog_loads() {
    let catalog = Catalog::builtin().expect("builtin content is valid");
    assert_eq!(catalog.base_units().len(), 4);
    assert_eq!(catalog.special_units().len(), 4);
    assert_eq!(catalog.recipes().len(), 2);
    let mage = catalog.template("하급 마법사").unwrap();
    assert_eq!((mage.hp, mage.atk, mage.def), (60, 25, 2));
    assert_eq!(mage.range, 200.0);
    assert_eq!(mage.level, 1);
    assert_eq!(catalog.special("대천사").unwrap().grade, Grade::Rare);
}

#[test]
fn custom_catalog_round_trips_recipes() {
    let catalog = Catalog::from_json(UNITS, r#"[{ "ingredients": ["a", "b"], "result": "ab" }]"#).unwrap();
    assert_eq!(catalog.recipes()[0].result, "ab");
    assert!(catalog.template("ab").is_some());
}

#[test]
fn unknown_ingredient_is_rejected() {
    let err = Catalog::from_json(UNITS, r#"[{ "ingredients": ["a", "zzz"], "result": "ab" }]"#).unwrap_err();
    assert!(matches!(err, EngineError::Content(ref msg) if msg.contains("zzz")));
}

#[test]
fn unknown_result_is_rejected() {
    let err = Catalog::from_json(UNITS, r#"[{ "ingredients": ["a"], "result": "nope" }]"#).unwrap_err();
    assert!(matches!(err, EngineError::Content(_)));
}

#[test]
fn hp_above_max_is_rejected() {
    let units = UNITS.replacen(r#""hp": 10, "max_hp": 10"#, r#""hp": 11, "max_hp": 10"#, 1);
    assert!(Catalog::from_json(&units, "[]").is_err());
}

#[test]
fn duplicate_names_are_rejected() {
    let units = UNITS.replacen(r#""name": "b""#, r#""name": "a""#, 1);
    let err = Catalog::from_json(&units, "[]").unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn unknown_template_names_fail_lookup() {
    let catalog = Catalog::builtin().unwrap();
    assert!(catalog.templates_for(&["하급 궁수", "ghost"]).is_err());
}

#[test]
fn grades_are_ordered_and_labelled() {
    assert!(Grade::Normal < Grade::Beyond);
    assert!(Grade::ALL.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(Grade::Legend.label(), "레전드");
}
