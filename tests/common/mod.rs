#![allow(dead_code)]

use chrono::{DateTime, Utc};
use townydb::persist::{InitMarker, NullSink, PersistLoad};
use townydb::{Location, PersistHandler, Resident, Result, TownBlock, persist_object};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct TownyObject {
    pub name: String,
    pub uuid: Option<Uuid>,
    pub registered: Option<DateTime<Utc>>,
}

persist_object! {
    TownyObject {
        name: String,
        uuid: Option<Uuid>,
        registered: Option<DateTime<Utc>>,
    }
}

#[derive(Debug, Clone)]
pub struct Town {
    pub base: TownyObject,
    pub mayor: Option<Resident>,
    pub residents: Vec<Resident>,
    pub outpost_spawns: Vec<Location>,
    pub home_block: Option<TownBlock>,
    pub bonus_blocks: i32,
    pub taxes: f64,
    pub open: bool,
    pub board: String,
    /// Every mayor handed to `set_mayor`, in call order.
    pub mayor_history: Vec<String>,
}

impl Town {
    pub fn set_mayor(&mut self, mayor: Resident) -> Result<()> {
        self.mayor_history.push(mayor.name.clone());
        self.mayor = Some(mayor);
        Ok(())
    }
}

persist_object! {
    Town extends base: TownyObject {
        #[persist(setter = set_mayor)]
        mayor: Option<Resident>,
        residents: Vec<Resident>,
        #[persist(rename = "outpostSpawns")]
        outpost_spawns: Vec<Location>,
        #[persist(rename = "homeBlock")]
        home_block: Option<TownBlock>,
        #[persist(rename = "bonusBlocks")]
        bonus_blocks: i32,
        taxes: f64,
        open: bool,
        board: String,
    }
}

pub const DEFAULT_BOARD: &str = "Welcome to town";
pub const DEFAULT_BONUS: i32 = 8;

impl PersistLoad for Town {
    fn construct(marker: InitMarker) -> Result<Self> {
        Ok(Self {
            base: TownyObject {
                name: marker.name().to_string(),
                uuid: None,
                registered: None,
            },
            mayor: None,
            residents: Vec::new(),
            outpost_spawns: Vec::new(),
            home_block: None,
            bonus_blocks: DEFAULT_BONUS,
            taxes: 5.0,
            open: false,
            board: DEFAULT_BOARD.to_string(),
            mayor_history: Vec::new(),
        })
    }
}

pub fn sample_town() -> Town {
    Town {
        base: TownyObject {
            name: "Riverside".to_string(),
            uuid: Some(Uuid::new_v4()),
            registered: DateTime::<Utc>::from_timestamp_millis(1_700_000_000_123),
        },
        mayor: Some(Resident::new("Alice")),
        residents: vec![Resident::new("Alice"), Resident::new("Bob")],
        outpost_spawns: vec![
            Location::new("world", 100.5, 64.0, -20.0).with_rotation(0.0, 90.0),
            Location::new("world_nether", 12.0, 40.0, 8.25),
        ],
        home_block: Some(TownBlock::new("world", 6, -2)),
        bonus_blocks: 24,
        taxes: 12.75,
        open: true,
        board: "Trade at the docks = profit: guaranteed".to_string(),
        mayor_history: Vec::new(),
    }
}

/// Compares every persisted field.
pub fn assert_same_town(actual: &Town, expected: &Town) {
    assert_eq!(actual.base, expected.base);
    assert_eq!(actual.mayor, expected.mayor);
    assert_eq!(actual.residents, expected.residents);
    assert_eq!(actual.outpost_spawns, expected.outpost_spawns);
    assert_eq!(actual.home_block, expected.home_block);
    assert_eq!(actual.bonus_blocks, expected.bonus_blocks);
    assert_eq!(actual.taxes, expected.taxes);
    assert_eq!(actual.open, expected.open);
    assert_eq!(actual.board, expected.board);
}

pub fn quiet_handler() -> PersistHandler {
    PersistHandler::new().with_sink(NullSink)
}
