//! One duelist's side of the field.
//!
//! Fixed-size zones are arrays of optional handles. Piles are persistent
//! vectors (`im::Vector`) so cloning a whole field is O(1); index 0 of a
//! pile is its position 1:
//!
//! - hand: leftmost card
//! - main deck: bottom card (the top card is the last element)
//! - extra deck: front of the face-up pendulum block, then the sorted part
//! - graveyard / banished: most recent card

use im::Vector;
use serde::{Deserialize, Serialize};

use super::address::ZoneKind;
use crate::core::entity::CardHandle;

pub const MONSTER_ZONES: usize = 5;
pub const SPELL_TRAP_ZONES: usize = 5;
pub const EXTRA_MONSTER_ZONES: usize = 2;

/// Zones and life points of one duelist.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerField {
    pub monsters: [Option<CardHandle>; MONSTER_ZONES],
    pub spell_traps: [Option<CardHandle>; SPELL_TRAP_ZONES],
    pub extra_monsters: [Option<CardHandle>; EXTRA_MONSTER_ZONES],
    pub field_spell: Option<CardHandle>,
    pub hand: Vector<CardHandle>,
    pub deck: Vector<CardHandle>,
    pub extra_deck: Vector<CardHandle>,
    pub graveyard: Vector<CardHandle>,
    pub banished: Vector<CardHandle>,
    pub life_points: i64,
}

impl PlayerField {
    /// Empty field with the given life points.
    #[must_use]
    pub fn new(life_points: i64) -> Self {
        Self {
            monsters: [None; MONSTER_ZONES],
            spell_traps: [None; SPELL_TRAP_ZONES],
            extra_monsters: [None; EXTRA_MONSTER_ZONES],
            field_spell: None,
            hand: Vector::new(),
            deck: Vector::new(),
            extra_deck: Vector::new(),
            graveyard: Vector::new(),
            banished: Vector::new(),
            life_points,
        }
    }

    /// Slots of a fixed-size zone. The field spell slot counts as one slot.
    #[must_use]
    pub fn slots(&self, kind: ZoneKind) -> Option<&[Option<CardHandle>]> {
        match kind {
            ZoneKind::Monster => Some(&self.monsters),
            ZoneKind::SpellTrap => Some(&self.spell_traps),
            ZoneKind::ExtraMonster => Some(&self.extra_monsters),
            ZoneKind::FieldSpell => Some(std::slice::from_ref(&self.field_spell)),
            _ => None,
        }
    }

    pub fn slots_mut(&mut self, kind: ZoneKind) -> Option<&mut [Option<CardHandle>]> {
        match kind {
            ZoneKind::Monster => Some(&mut self.monsters),
            ZoneKind::SpellTrap => Some(&mut self.spell_traps),
            ZoneKind::ExtraMonster => Some(&mut self.extra_monsters),
            ZoneKind::FieldSpell => Some(std::slice::from_mut(&mut self.field_spell)),
            _ => None,
        }
    }

    #[must_use]
    pub fn pile(&self, kind: ZoneKind) -> Option<&Vector<CardHandle>> {
        match kind {
            ZoneKind::Hand => Some(&self.hand),
            ZoneKind::Deck => Some(&self.deck),
            ZoneKind::ExtraDeck => Some(&self.extra_deck),
            ZoneKind::Graveyard => Some(&self.graveyard),
            ZoneKind::Banished => Some(&self.banished),
            _ => None,
        }
    }

    pub fn pile_mut(&mut self, kind: ZoneKind) -> Option<&mut Vector<CardHandle>> {
        match kind {
            ZoneKind::Hand => Some(&mut self.hand),
            ZoneKind::Deck => Some(&mut self.deck),
            ZoneKind::ExtraDeck => Some(&mut self.extra_deck),
            ZoneKind::Graveyard => Some(&mut self.graveyard),
            ZoneKind::Banished => Some(&mut self.banished),
            _ => None,
        }
    }

    /// Every handle held directly by a zone (materials excluded), with the
    /// zone kind and 1-based position.
    pub fn occupants(&self) -> impl Iterator<Item = (ZoneKind, usize, CardHandle)> + '_ {
        let slotted = [
            ZoneKind::Monster,
            ZoneKind::SpellTrap,
            ZoneKind::ExtraMonster,
            ZoneKind::FieldSpell,
        ]
        .into_iter()
        .flat_map(move |kind| {
            self.slots(kind)
                .unwrap_or_default()
                .iter()
                .enumerate()
                .filter_map(move |(i, slot)| slot.map(|h| (kind, i + 1, h)))
        });

        let piled = [
            ZoneKind::Hand,
            ZoneKind::Deck,
            ZoneKind::ExtraDeck,
            ZoneKind::Graveyard,
            ZoneKind::Banished,
        ]
        .into_iter()
        .flat_map(move |kind| {
            self.pile(kind)
                .into_iter()
                .flat_map(|pile| pile.iter().copied().enumerate())
                .map(move |(i, h)| (kind, i + 1, h))
        });

        slotted.chain(piled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_field_is_empty() {
        let field = PlayerField::new(8000);
        assert_eq!(field.occupants().count(), 0);
        assert_eq!(field.life_points, 8000);
        assert_eq!(field.slots(ZoneKind::FieldSpell).unwrap().len(), 1);
        assert!(field.slots(ZoneKind::Hand).is_none());
        assert!(field.pile(ZoneKind::Monster).is_none());
    }

    #[test]
    fn test_occupants_positions() {
        let mut field = PlayerField::new(8000);
        field.monsters[2] = Some(CardHandle(7));
        field.field_spell = Some(CardHandle(8));
        field.deck.push_back(CardHandle(1));
        field.deck.push_back(CardHandle(2));

        let occupants: Vec<_> = field.occupants().collect();
        assert_eq!(
            occupants,
            vec![
                (ZoneKind::Monster, 3, CardHandle(7)),
                (ZoneKind::FieldSpell, 1, CardHandle(8)),
                (ZoneKind::Deck, 1, CardHandle(1)),
                (ZoneKind::Deck, 2, CardHandle(2)),
            ]
        );
    }

    #[test]
    fn test_clone_is_independent() {
        let mut field = PlayerField::new(8000);
        field.hand.push_back(CardHandle(1));
        let snapshot = field.clone();

        field.hand.push_back(CardHandle(2));
        assert_eq!(snapshot.hand.len(), 1);
        assert_ne!(snapshot, field);
    }
}
