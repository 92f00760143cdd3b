//! Deck and hand operations: Draw, Mill, Shuffle Deck, Shuffle Hand.
//!
//! Draw and Mill pick their cards when prepared, so a redo after the deck
//! was reordered by an undone shuffle still moves the same cards. Shuffles
//! store the swap sequence they used in their command data; replaying that
//! data reproduces the same order without consulting the RNG.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::catalog::{CommandType, Prepare};
use super::transfer::{CardMemo, MoveStep};
use super::{not_executed, ExecContext, Step, Transition};
use crate::cards::Position;
use crate::core::entity::CardHandle;
use crate::core::error::{DuelError, Result};
use crate::core::player::PlayerId;
use crate::core::rng::{validate_swaps, DuelRng};
use crate::log::LogEntry;
use crate::zones::{FieldState, ZoneAddress, ZoneKind};

/// Data for Draw and Mill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawData {
    pub player: PlayerId,
    pub count: usize,
}

impl DrawData {
    pub fn new(player: PlayerId, count: usize) -> Self {
        Self { player, count }
    }
}

/// Data for Shuffle Deck and Shuffle Hand. `swaps` is filled in on first
/// execution when absent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShuffleData {
    pub player: PlayerId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swaps: Option<Vec<usize>>,
}

impl ShuffleData {
    pub fn new(player: PlayerId) -> Self {
        Self { player, swaps: None }
    }

    #[must_use]
    pub fn with_swaps(mut self, swaps: Vec<usize>) -> Self {
        self.swaps = Some(swaps);
        self
    }
}

/// Top `count` cards of `player`'s deck, top first.
fn top_cards(field: &FieldState, player: PlayerId, count: usize) -> Result<Vec<CardHandle>> {
    let deck = field.zone_cards(&ZoneAddress::deck(player))?;
    if count > deck.len() {
        return Err(DuelError::NotEnoughCards {
            player,
            zone: ZoneAddress::deck(player),
            requested: count,
            available: deck.len(),
        });
    }
    Ok(deck.iter().rev().take(count).copied().collect())
}

/// Move cards from the top of the deck to the end of the hand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawStep {
    player: PlayerId,
    cards: Vec<CardHandle>,
    memos: Option<Vec<CardMemo>>,
}

impl Transition for DrawStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        let hand = ZoneAddress::hand(self.player);
        let mut memos = Vec::with_capacity(self.cards.len());

        for &handle in &self.cards {
            let top = ZoneAddress::deck_slot(self.player, ctx.field.pile_len(ZoneKind::Deck, self.player)?);
            let card = ctx.field.card(handle)?;
            let id = card.id();
            memos.push(CardMemo::capture(card));

            let landed = ctx.field.move_card(handle, &top, &hand)?;
            ctx.field.card_mut(handle)?.position = Position::Faceup;
            ctx.log(LogEntry::zone_change(CommandType::Draw, self.player, id, top, landed).with_position(Position::Faceup));
        }

        self.memos = Some(memos);
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        let memos = self.memos.take().ok_or_else(|| not_executed("draw"))?;
        let hand = ZoneAddress::hand(self.player);
        let deck = ZoneAddress::deck(self.player);

        for (&handle, memo) in self.cards.iter().zip(&memos).rev() {
            // The hand may have been reordered since; find the card itself.
            let offset = field
                .zone_cards(&hand)?
                .iter()
                .position(|&h| h == handle)
                .ok_or_else(|| DuelError::Integrity(format!("drawn {handle} is no longer in hand")))?;
            field.move_card(handle, &hand.with_index(offset + 1), &deck)?;
            memo.restore(field.card_mut(handle)?);
        }
        Ok(())
    }
}

/// Apply a recorded swap sequence to a pile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShuffleStep {
    command_type: CommandType,
    player: PlayerId,
    kind: ZoneKind,
    swaps: Vec<usize>,
}

impl Transition for ShuffleStep {
    fn exec(&mut self, ctx: &mut ExecContext<'_>) -> Result<()> {
        ctx.field.shuffle_pile(self.kind, self.player, &self.swaps, true)?;
        let zone = ZoneAddress { kind: self.kind, player: self.player, index: None };
        ctx.log(LogEntry::new(self.command_type, self.player).with_zone(zone));
        Ok(())
    }

    fn undo(&mut self, field: &mut FieldState) -> Result<()> {
        field.shuffle_pile(self.kind, self.player, &self.swaps, false)
    }
}

impl Prepare for DrawData {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, _rng: &mut DuelRng) -> Result<Step> {
        let cards = top_cards(field, self.player, self.count)?;
        match command_type {
            CommandType::Draw => Ok(Step::Draw(DrawStep { player: self.player, cards, memos: None })),
            CommandType::Mill => {
                let len = field.pile_len(ZoneKind::Deck, self.player)?;
                let children = cards
                    .into_iter()
                    .enumerate()
                    .map(|(k, handle)| {
                        let card = field.card(handle)?;
                        Ok(Step::Move(MoveStep::new(
                            CommandType::Mill,
                            self.player,
                            handle,
                            card.id(),
                            ZoneAddress::deck_slot(self.player, len - k),
                            ZoneAddress::graveyard(card.original_owner),
                            None,
                        )))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Step::Composite(children))
            }
            other => Err(DuelError::Integrity(format!("{other} does not take draw data"))),
        }
    }
}

impl Prepare for ShuffleData {
    fn prepare(&mut self, command_type: CommandType, field: &FieldState, rng: &mut DuelRng) -> Result<Step> {
        let kind = match command_type {
            CommandType::ShuffleDeck => ZoneKind::Deck,
            CommandType::ShuffleHand => ZoneKind::Hand,
            other => return Err(DuelError::Integrity(format!("{other} is not a shuffle"))),
        };
        let len = field.pile_len(kind, self.player)?;

        let swaps = match &self.swaps {
            Some(swaps) => {
                validate_swaps(len, swaps)?;
                swaps.clone()
            }
            None => {
                let swaps = rng.swap_sequence(len);
                debug!(player = %self.player, %kind, len, "generated shuffle");
                self.swaps = Some(swaps.clone());
                swaps
            }
        };

        Ok(Step::Shuffle(ShuffleStep { command_type, player: self.player, kind, swaps }))
    }
}
