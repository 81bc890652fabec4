mod common;

use common::{DEFAULT_BOARD, DEFAULT_BONUS, Town, assert_same_town, quiet_handler, sample_town};
use townydb::persist::{InitMarker, PersistLoad, PersistObject};
use townydb::{FieldOutcome, ParsedRecord, PersistError, Resident, Result, persist_object};

fn record(entries: &[(&str, &str)]) -> ParsedRecord {
    entries.iter().copied().collect()
}

#[test]
fn test_field_table_includes_ancestor_fields_first() {
    let names = Town::fields().names();
    assert_eq!(
        names,
        vec![
            "name",
            "uuid",
            "registered",
            "mayor",
            "residents",
            "outpostSpawns",
            "homeBlock",
            "bonusBlocks",
            "taxes",
            "open",
            "board",
        ]
    );
}

#[test]
fn test_round_trip() {
    let handler = quiet_handler();
    let town = sample_town();

    let saved = handler.save(&town).unwrap();
    assert!(saved.failures().is_empty());
    assert_eq!(saved.len(), 11);

    let loaded = handler.load::<Town>(&ParsedRecord::from(&saved)).unwrap();
    assert_same_town(&loaded.object, &town);
    assert_eq!(loaded.report.converted().count(), 11);
    assert!(!loaded.report.has_failures());
}

#[test]
fn test_saved_text_forms() {
    let handler = quiet_handler();
    let town = sample_town();
    let saved = handler.save(&town).unwrap();

    assert_eq!(saved.get("name"), Some("Riverside"));
    assert_eq!(saved.get("registered"), Some("1700000000123"));
    assert_eq!(saved.get("mayor"), Some("Alice"));
    assert_eq!(saved.get("residents"), Some("Alice,Bob"));
    assert_eq!(
        saved.get("outpostspawns"),
        Some("world,100.5,64,-20,0,90;world_nether,12,40,8.25,0,0")
    );
    assert_eq!(saved.get("homeBlock"), Some("world,6,-2"));
    assert_eq!(saved.get("bonusBlocks"), Some("24"));
    assert_eq!(saved.get("taxes"), Some("12.75"));
    assert_eq!(saved.get("open"), Some("true"));
    assert!(saved.get("outpostSpawns").is_none());
}

#[test]
fn test_absent_optional_values_save_as_null() {
    let handler = quiet_handler();
    let town = Town::construct(InitMarker::default()).unwrap();
    let saved = handler.save(&town).unwrap();

    assert_eq!(saved.get("uuid"), Some("null"));
    assert_eq!(saved.get("mayor"), Some("null"));
    assert_eq!(saved.get("homeBlock"), Some("null"));

    let loaded = handler.load::<Town>(&ParsedRecord::from(&saved)).unwrap();
    assert_eq!(loaded.object.mayor, None);
    assert!(loaded.object.mayor_history.is_empty());
    assert!(matches!(
        loaded.report.outcome("mayor"),
        Some(FieldOutcome::SkippedNoValue)
    ));
}

#[test]
fn test_missing_key_keeps_constructed_default() {
    let handler = quiet_handler();
    let loaded = handler.load::<Town>(&record(&[("name", "Hillside")])).unwrap();

    assert_eq!(loaded.object.base.name, "Hillside");
    assert_eq!(loaded.object.bonus_blocks, DEFAULT_BONUS);
    assert_eq!(loaded.object.board, DEFAULT_BOARD);
    assert!(matches!(
        loaded.report.outcome("bonusBlocks"),
        Some(FieldOutcome::SkippedMissing)
    ));
    assert!(matches!(
        loaded.report.outcome("board"),
        Some(FieldOutcome::SkippedMissing)
    ));
}

#[test]
fn test_empty_value_is_no_value() {
    let handler = quiet_handler();
    let loaded = handler
        .load::<Town>(&record(&[("board", ""), ("homeBlock", "")]))
        .unwrap();

    assert_eq!(loaded.object.board, DEFAULT_BOARD);
    assert_eq!(loaded.object.home_block, None);
    assert!(matches!(
        loaded.report.outcome("board"),
        Some(FieldOutcome::SkippedNoValue)
    ));
}

#[test]
fn test_remapped_field_reads_lowercase_key() {
    let handler = quiet_handler();

    let loaded = handler
        .load::<Town>(&record(&[("outpostspawns", "world,1,2,3,0,0")]))
        .unwrap();
    assert_eq!(loaded.object.outpost_spawns.len(), 1);
    assert_eq!(loaded.object.outpost_spawns[0].world, "world");
    let report = &loaded.report.fields()[5];
    assert_eq!(report.field, "outpostSpawns");
    assert_eq!(report.key, "outpostspawns");

    let loaded = handler
        .load::<Town>(&record(&[("outpostSpawns", "world,1,2,3,0,0")]))
        .unwrap();
    assert!(loaded.object.outpost_spawns.is_empty());
}

#[test]
fn test_setter_called_once_instead_of_assignment() {
    let handler = quiet_handler();
    let loaded = handler
        .load::<Town>(&record(&[("mayor", "Alice"), ("residents", "Alice,Bob")]))
        .unwrap();

    assert_eq!(loaded.object.mayor_history, vec!["Alice".to_string()]);
    assert_eq!(loaded.object.mayor, Some(Resident::new("Alice")));
}

#[test]
fn test_primitive_failure_is_isolated() {
    let handler = quiet_handler();
    let loaded = handler
        .load::<Town>(&record(&[
            ("name", "Hillside"),
            ("bonusBlocks", "lots"),
            ("taxes", "2.5"),
            ("open", "yes"),
            ("mayor", "Bob"),
        ]))
        .unwrap();

    let town = &loaded.object;
    assert_eq!(town.base.name, "Hillside");
    assert_eq!(town.bonus_blocks, DEFAULT_BONUS);
    assert_eq!(town.taxes, 2.5);
    assert!(!town.open);
    assert_eq!(town.mayor, Some(Resident::new("Bob")));

    let failed: Vec<_> = loaded.report.failures().map(|r| r.field).collect();
    assert_eq!(failed, vec!["bonusBlocks", "open"]);
    assert!(matches!(
        loaded.report.outcome("bonusBlocks").and_then(FieldOutcome::error),
        Some(PersistError::ParseError(_))
    ));
}

#[test]
fn test_adapter_failure_is_isolated() {
    let handler = quiet_handler();
    let loaded = handler
        .load::<Town>(&record(&[
            ("homeBlock", "world,north,2"),
            ("uuid", "not-a-uuid"),
            ("board", "Hello"),
        ]))
        .unwrap();

    assert_eq!(loaded.object.home_block, None);
    assert_eq!(loaded.object.base.uuid, None);
    assert_eq!(loaded.object.board, "Hello");
    assert_eq!(loaded.report.failures().count(), 2);
}

#[derive(Debug)]
struct Refusing {
    name: String,
}

persist_object! {
    Refusing {
        name: String,
    }
}

impl PersistLoad for Refusing {
    fn construct(_marker: InitMarker) -> Result<Self> {
        Err(PersistError::field_access("name", "cannot build"))
    }
}

#[test]
fn test_construction_failure_aborts_load() {
    let handler = quiet_handler();
    let err = handler
        .load::<Refusing>(&record(&[("name", "x")]))
        .unwrap_err();
    assert!(matches!(err, PersistError::ConstructionError(_)));

    let saved = handler.save(&Refusing { name: "kept".into() }).unwrap();
    assert_eq!(saved.get("name"), Some("kept"));
}

#[derive(Debug, Default)]
struct Tagged {
    tags: Vec<String>,
    level: i64,
}

persist_object! {
    Tagged {
        tags: Vec<String>,
        level: i64,
    }
}

impl PersistLoad for Tagged {
    fn construct(_marker: InitMarker) -> Result<Self> {
        Ok(Self::default())
    }
}

#[test]
fn test_unregistered_type_falls_back_on_save_but_not_on_load() {
    let handler = quiet_handler();
    let tagged = Tagged {
        tags: vec!["a".into(), "b".into()],
        level: 3_000_000_000,
    };

    let saved = handler.save(&tagged).unwrap();
    assert_eq!(saved.get("tags"), Some("a,b"));
    assert_eq!(saved.get("level"), Some("3000000000"));

    let err = handler
        .load::<Tagged>(&ParsedRecord::from(&saved))
        .unwrap_err();
    assert!(matches!(err, PersistError::UnsupportedType(name) if name == "List<String>"));

    let loaded = handler.load::<Tagged>(&record(&[("level", "42")])).unwrap();
    assert_eq!(loaded.object.level, 42);
}

#[test]
fn test_list_element_containing_separator_round_trips() {
    let handler = quiet_handler();
    let mut town = sample_town();
    town.residents = vec![Resident::new("Smith, John"), Resident::new("Bob")];

    let saved = handler.save(&town).unwrap();
    assert_eq!(saved.get("residents"), Some("Smith\\, John,Bob"));

    let loaded = handler.load::<Town>(&ParsedRecord::from(&saved)).unwrap();
    assert_eq!(loaded.object.residents, town.residents);
}
