//! Command catalog integration tests.
//!
//! Every command type is executed through a `Duel`, undone and redone, and
//! the field and log are compared against their states before and after.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use duel_engine::cards::{CardData, CardType, DeckPosition, Position};
use duel_engine::commands::card_state::{
    ChangePositionData, ChangeStatsData, CreateTokenData, DeclareAttackData, TokenRefData,
};
use duel_engine::commands::deck::{DrawData, ShuffleData};
use duel_engine::commands::duel_state::{ChangePhaseData, LifePointsData, NextTurnData};
use duel_engine::commands::summon::{PlacementData, TributeData};
use duel_engine::commands::transfer::{BanishData, MoveCardData, SourceData, ToDeckData};
use duel_engine::commands::xyz::{AttachMaterialData, DetachMaterialData, XyzSummonData};
use duel_engine::commands::{CardRef, CommandKind, CommandType};
use duel_engine::core::{CommandId, DuelConfig, DuelError, DuelOptions, Phase, PlayerConfig, PlayerId};
use duel_engine::engine::Duel;
use duel_engine::log::{LogKind, LogNotice};
use duel_engine::zones::ZoneAddress;
use strum::IntoEnumIterator;

const P0: PlayerId = PlayerId::FIRST;
const P1: PlayerId = PlayerId::SECOND;

const SUMMONED: u32 = 62318994;
const XYZ: u32 = 301;

fn addr(s: &str) -> ZoneAddress {
    s.parse().unwrap()
}

fn monster(id: u32) -> CardData {
    CardData::new(id, format!("Monster {id}"), CardType::MONSTER | CardType::NORMAL)
        .with_stats(1500, 1000)
        .with_level(4)
}

fn spell(id: u32) -> CardData {
    CardData::new(id, format!("Spell {id}"), CardType::SPELL)
}

/// Unshuffled duel with a populated field:
///
/// - hand: `SUMMONED` (H-1), spell 2002 (H-2)
/// - monsters: 1001 (M-1), 1002 (M-2); opponent 4001 (M2-1)
/// - spell/trap: 2001 (S-1, set)
/// - graveyard: 3001
/// - extra deck: `XYZ`
fn fixture() -> Duel {
    let xyz = CardData::new(XYZ, "Rank 4", CardType::MONSTER | CardType::XYZ).with_stats(2500, 2000);
    let options = DuelOptions::default()
        .without_shuffle()
        .with_placement(addr("H"), monster(SUMMONED), None)
        .with_placement(addr("H"), spell(2002), None)
        .with_placement(addr("M-1"), monster(1001), None)
        .with_placement(addr("M-2"), monster(1002), None)
        .with_placement(addr("M2-1"), monster(4001), None)
        .with_placement(addr("S-1"), spell(2001), Some(Position::Facedown))
        .with_placement(addr("GY"), monster(3001), None);

    let config = DuelConfig::new(
        PlayerConfig::new("Yugi")
            .with_main_deck((101..=110).map(monster).collect())
            .with_extra_deck(vec![xyz]),
        PlayerConfig::new("Kaiba").with_main_deck((201..=210).map(monster).collect()),
    )
    .with_options(options);
    Duel::new(config).unwrap()
}

fn xyz_summon() -> CommandKind {
    CommandKind::XyzSummon(XyzSummonData::new(
        P0,
        XYZ,
        addr("ED-1"),
        addr("M-3"),
        vec![CardRef::new(1001, addr("M-1")), CardRef::new(1002, addr("M-2"))],
    ))
}

fn token() -> CommandKind {
    CommandKind::CreateToken(CreateTokenData {
        player: P0,
        zone: addr("M-5"),
        token: CardData::new(73915052, "Sheep Token", CardType::MONSTER | CardType::TOKEN).with_stats(0, 0),
        position: Some(Position::FaceupDefense),
    })
}

/// (setup commands, command under test)
fn catalog_cases() -> Vec<(Vec<CommandKind>, CommandKind)> {
    let hand = addr("H-1");
    vec![
        (vec![], CommandKind::MoveCard(MoveCardData::new(P0, 1001, addr("M-1"), addr("M-5")))),
        (vec![], CommandKind::NormalSummon(PlacementData::new(P0, SUMMONED, hand, addr("M-3")))),
        (vec![], CommandKind::SetMonster(PlacementData::new(P0, SUMMONED, hand, addr("M-4")))),
        (
            vec![],
            CommandKind::SpecialSummon(
                MoveCardData::new(P0, 3001, addr("GY-1"), addr("M-3")).with_position(Position::FaceupDefense),
            ),
        ),
        (
            vec![],
            CommandKind::TributeSummon(TributeData::new(
                P0,
                SUMMONED,
                hand,
                addr("M-1"),
                vec![CardRef::new(1001, addr("M-1"))],
            )),
        ),
        (
            vec![],
            CommandKind::TributeSet(TributeData::new(
                P0,
                SUMMONED,
                hand,
                addr("M-3"),
                vec![CardRef::new(1001, addr("M-1")), CardRef::new(1002, addr("M-2"))],
            )),
        ),
        (vec![], xyz_summon()),
        (
            vec![],
            CommandKind::AttachMaterial(AttachMaterialData {
                player: P0,
                id: 1002,
                origin_zone: addr("M-2"),
                zone: addr("M-1"),
            }),
        ),
        (
            vec![xyz_summon()],
            CommandKind::DetachMaterial(DetachMaterialData { player: P0, id: XYZ, zone: addr("M-3"), material_index: 1 }),
        ),
        (vec![], CommandKind::SendToGy(SourceData::new(P0, 1001, addr("M-1")))),
        (
            vec![],
            CommandKind::Banish(BanishData { player: P0, id: 2001, origin_zone: addr("S-1"), facedown: true }),
        ),
        (vec![], CommandKind::ToHand(SourceData::new(P0, 3001, addr("GY-1")))),
        (
            vec![],
            CommandKind::ToDeck(ToDeckData {
                player: P0,
                id: 1002,
                origin_zone: addr("M-2"),
                deck_position: DeckPosition::Bottom,
            }),
        ),
        (vec![xyz_summon()], CommandKind::ToExtraDeck(SourceData::new(P0, XYZ, addr("M-3")))),
        (vec![], CommandKind::Activate(PlacementData::new(P0, 2002, addr("H-2"), addr("S-3")))),
        (vec![], CommandKind::SetSpellTrap(PlacementData::new(P0, 2002, addr("H-2"), addr("F")))),
        (vec![], CommandKind::Draw(DrawData::new(P0, 3))),
        (vec![], CommandKind::Mill(DrawData::new(P1, 4))),
        (vec![], CommandKind::ShuffleDeck(ShuffleData::new(P0))),
        (vec![], CommandKind::ShuffleHand(ShuffleData::new(P0).with_swaps(vec![0]))),
        (
            vec![],
            CommandKind::ChangePosition(ChangePositionData {
                player: P0,
                id: 1001,
                zone: addr("M-1"),
                position: Position::FaceupDefense,
            }),
        ),
        (
            vec![],
            CommandKind::ChangeStats(ChangeStatsData {
                player: P0,
                id: 1001,
                zone: addr("M-1"),
                atk: Some(3000),
                def: Some(0),
            }),
        ),
        (vec![], CommandKind::Reveal(SourceData::new(P0, SUMMONED, hand))),
        (
            vec![],
            CommandKind::DeclareAttack(DeclareAttackData {
                player: P0,
                id: 1001,
                zone: addr("M-1"),
                target_zone: Some(addr("M2-1")),
            }),
        ),
        (vec![], token()),
        (
            vec![token()],
            CommandKind::RemoveToken(TokenRefData { player: P0, id: 73915052, zone: addr("M-5") }),
        ),
        (vec![], CommandKind::ChangeLifePoints(LifePointsData { player: P1, amount: -2500 })),
        (vec![], CommandKind::ChangePhase(ChangePhaseData { player: P0, phase: Phase::Main1 })),
        (vec![], CommandKind::NextTurn(NextTurnData { player: P1 })),
    ]
}

// =============================================================================
// Round Trips
// =============================================================================

/// Every command type is covered by the round trip cases.
#[test]
fn test_catalog_cases_cover_every_type() {
    let covered: HashSet<CommandType> = catalog_cases().iter().map(|(_, kind)| kind.command_type()).collect();
    let all: HashSet<CommandType> = CommandType::iter().collect();
    assert_eq!(covered, all);
}

/// exec then undo restores the field and log; redo restores the executed state.
#[test]
fn test_exec_undo_redo_round_trip() {
    for (setup, kind) in catalog_cases() {
        let command_type = kind.command_type();
        let mut duel = fixture();
        for command in setup {
            duel.exec(command).unwrap();
        }
        let before = duel.field().clone();
        let log_before = duel.log().entries().to_vec();

        let id = duel
            .exec(kind)
            .unwrap_or_else(|e| panic!("{command_type} failed: {e}"));
        let after = duel.field().clone();
        let log_after = duel.log().entries().to_vec();
        assert!(log_after.len() > log_before.len(), "{command_type} logged nothing");
        assert!(log_after[log_before.len()..].iter().all(|e| e.command_id == id));
        after.verify_integrity().unwrap();

        assert!(duel.undo().unwrap());
        assert_eq!(duel.field(), &before, "{command_type} undo");
        assert_eq!(duel.log().entries(), log_before.as_slice(), "{command_type} undo log");

        assert!(duel.redo().unwrap());
        assert_eq!(duel.field(), &after, "{command_type} redo");
        assert_eq!(duel.log().entries(), log_after.as_slice(), "{command_type} redo log");
    }
}

/// Commands survive the `{type, data}` round trip through JSON.
#[test]
fn test_serialized_round_trip() {
    for (_, kind) in catalog_cases() {
        let record = kind.encode().unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let back: duel_engine::commands::SerializedCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(CommandKind::decode(&back.command_type, back.data).unwrap(), kind);
    }
}

// =============================================================================
// Scenarios
// =============================================================================

/// Normal Summon from the first hand slot to the first monster zone.
#[test]
fn test_normal_summon_scenario() {
    let config = DuelConfig::new(PlayerConfig::new("A"), PlayerConfig::new("B"))
        .with_options(DuelOptions::default().with_placement(addr("H"), monster(SUMMONED), None));
    let mut duel = Duel::new(config).unwrap();
    let before = duel.field().clone();

    let id = duel
        .exec(CommandKind::NormalSummon(PlacementData::new(P0, SUMMONED, addr("H-1"), addr("M-1"))))
        .unwrap();

    assert_eq!(id, CommandId(1));
    assert_eq!(duel.position_at(&addr("M-1")).unwrap(), Some(Position::FaceupAttack));
    assert_eq!(duel.field().card_at(&addr("H-1")).unwrap(), None);
    assert_eq!(
        serde_json::to_value(&duel.log().entries()[0]).unwrap(),
        serde_json::json!({
            "player": 0,
            "commandId": 1,
            "type": "Normal Summon",
            "id": SUMMONED,
            "originZone": "H-1",
            "zone": "M-1",
            "position": "faceup-attack"
        })
    );

    duel.undo().unwrap();
    assert_eq!(duel.field(), &before);
    assert!(duel.log().is_empty());
}

/// XYZ Summon using the monsters in M-1 and M-2 as materials.
#[test]
fn test_xyz_summon_scenario() {
    let mut duel = fixture();
    let id = duel.exec(xyz_summon()).unwrap();

    let entries: Vec<_> = duel.log().for_command(id).collect();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].kind, LogKind::Overlay);
    assert_eq!(entries[0].id, Some(1001));
    assert_eq!(entries[1].id, Some(1002));
    assert_eq!(entries[1].zone, Some(addr("ORU-3")));
    assert_eq!(entries[2].kind, LogKind::Command(CommandType::XyzSummon));
    assert_eq!(entries[2].materials, vec![1001, 1002]);

    let host = duel.field().card_at(&addr("M-3")).unwrap().unwrap();
    let materials: Vec<u32> = duel
        .field()
        .zone_cards(&addr("ORU-3"))
        .unwrap()
        .into_iter()
        .map(|h| duel.field().card(h).unwrap().id())
        .collect();
    assert_eq!(duel.field().card(host).unwrap().id(), XYZ);
    assert_eq!(materials, vec![1001, 1002]);
    assert_eq!(duel.field().card_at(&addr("M-1")).unwrap(), None);
    assert_eq!(duel.field().card_at(&addr("M-2")).unwrap(), None);

    let snapshot = duel.snapshot(P0).unwrap();
    let xyz = snapshot.iter().find(|s| s.zone == addr("M-3")).unwrap();
    assert_eq!(xyz.materials, vec![1001, 1002]);
}

/// Sending an XYZ monster to the graveyard takes its materials with it.
#[test]
fn test_xyz_leaving_field_sheds_materials() {
    let mut duel = fixture();
    duel.exec(xyz_summon()).unwrap();
    let id = duel.exec(CommandKind::SendToGy(SourceData::new(P0, XYZ, addr("M-3")))).unwrap();

    let kinds: Vec<_> = duel.log().for_command(id).map(|e| e.kind).collect();
    assert_eq!(kinds, vec![LogKind::Command(CommandType::SendToGy); 3]);
    let graveyard: Vec<u32> = duel
        .field()
        .zone_cards(&addr("GY"))
        .unwrap()
        .into_iter()
        .map(|h| duel.field().card(h).unwrap().id())
        .collect();
    assert_eq!(graveyard, vec![XYZ, 1002, 1001, 3001]);
}

/// Re-summoning an XYZ monster over new materials sends its old ones to the graveyard.
#[test]
fn test_xyz_summon_replaces_carried_materials() {
    let mut duel = fixture();
    duel.exec(xyz_summon()).unwrap();
    let before = duel.field().clone();

    let id = duel
        .exec(CommandKind::XyzSummon(XyzSummonData::new(
            P0,
            XYZ,
            addr("M-3"),
            addr("M-4"),
            vec![CardRef::new(SUMMONED, addr("H-1"))],
        )))
        .unwrap();

    duel.field().verify_integrity().unwrap();
    let kinds: Vec<_> = duel.log().for_command(id).map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            LogKind::Overlay,
            LogKind::Command(CommandType::XyzSummon),
            LogKind::Command(CommandType::SendToGy),
            LogKind::Command(CommandType::SendToGy),
        ]
    );
    let snapshot = duel.snapshot(P0).unwrap();
    let host = snapshot.iter().find(|s| s.zone == addr("M-4")).unwrap();
    assert_eq!(host.materials, vec![SUMMONED]);
    let graveyard: Vec<u32> = duel
        .field()
        .zone_cards(&addr("GY"))
        .unwrap()
        .into_iter()
        .map(|h| duel.field().card(h).unwrap().id())
        .collect();
    assert_eq!(graveyard, vec![1002, 1001, 3001]);

    duel.undo().unwrap();
    assert_eq!(duel.field(), &before);
}

// =============================================================================
// Log Grouping
// =============================================================================

/// A composite command logs every child under one id; undo drops them all.
#[test]
fn test_composite_log_grouping() {
    let mut duel = fixture();
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    duel.subscribe(move |notice| {
        let label = match notice {
            LogNotice::NewLog(entry) => format!("new {}", entry.kind),
            LogNotice::UpdateLogs(all) => format!("update {}", all.len()),
        };
        sink.borrow_mut().push(label);
    });

    let id = duel
        .exec(CommandKind::TributeSummon(TributeData::new(
            P0,
            SUMMONED,
            addr("H-1"),
            addr("M-3"),
            vec![CardRef::new(1001, addr("M-1")), CardRef::new(1002, addr("M-2"))],
        )))
        .unwrap();

    assert_eq!(duel.log().len(), 3);
    assert!(duel.log().entries().iter().all(|e| e.command_id == id));
    assert_eq!(
        *events.borrow(),
        vec!["new Send To GY", "new Send To GY", "new Tribute Summon", "update 3"]
    );

    duel.undo().unwrap();
    assert!(duel.log().is_empty());
    assert_eq!(events.borrow().last().map(String::as_str), Some("update 0"));
}

// =============================================================================
// Atomicity
// =============================================================================

/// A composite whose later child fails leaves nothing behind.
#[test]
fn test_failed_composite_is_rolled_back() {
    let mut duel = fixture();
    let calls = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&calls);
    duel.subscribe(move |_| *sink.borrow_mut() += 1);
    let before = duel.field().clone();

    // The tribute leaves M-1, then the summon hits the occupied M-2.
    let err = duel
        .exec(CommandKind::TributeSummon(TributeData::new(
            P0,
            SUMMONED,
            addr("H-1"),
            addr("M-2"),
            vec![CardRef::new(1001, addr("M-1"))],
        )))
        .unwrap_err();
    assert!(matches!(err, DuelError::ZoneOccupied(_)));

    // The same material named twice: the second overlay finds an empty zone.
    let err = duel
        .exec(CommandKind::XyzSummon(XyzSummonData::new(
            P0,
            XYZ,
            addr("ED-1"),
            addr("M-3"),
            vec![CardRef::new(1001, addr("M-1")), CardRef::new(1001, addr("M-1"))],
        )))
        .unwrap_err();
    assert!(matches!(err, DuelError::CardNotFoundInZone { .. }));

    assert_eq!(duel.field(), &before);
    assert!(duel.log().is_empty());
    assert!(duel.history().is_empty());
    assert_eq!(*calls.borrow(), 0);
}

/// Validation is a dry run against the current field.
#[test]
fn test_is_valid() {
    let duel = fixture();
    assert!(duel.is_valid(&CommandKind::SendToGy(SourceData::new(P0, 1001, addr("M-1")))));
    assert!(!duel.is_valid(&CommandKind::SendToGy(SourceData::new(P0, 1001, addr("M-2")))));
    assert!(!duel.is_valid(&CommandKind::Draw(DrawData::new(P0, 11))));
    assert!(!duel.is_valid(&CommandKind::NextTurn(NextTurnData { player: PlayerId::new(2) })));
}
