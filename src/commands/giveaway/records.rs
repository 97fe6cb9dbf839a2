use std::collections::HashSet;

use dashmap::DashMap;
use tracing::debug;

use crate::commands::giveaway::models::{
    ChannelRef, Giveaway, GiveawayId, MessageRef, RerollOutcome, UserRef,
};
use crate::commands::giveaway::strategies::WinnerStrategy;
use crate::error::{Error, Result};

// What is left of a giveaway after it ended.
#[readonly::make]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    pub prize: String,
    pub channel: ChannelRef,
    // The announcement of the giveaway, if it was ever published.
    pub message: Option<MessageRef>,
    // Winners of the final draw, in the order they were drawn.
    pub winners: Vec<UserRef>,
    // Everyone who was ever observed as a participant. Only grows.
    pub participants: HashSet<UserRef>,
    // Everyone who has ever won, including rerolls. Only grows.
    pub won: HashSet<UserRef>,
}

impl Record {
    fn new(giveaway: &Giveaway, winners: &[UserRef]) -> Self {
        Record {
            prize: giveaway.prize().to_string(),
            channel: giveaway.channel(),
            message: giveaway.message(),
            winners: winners.to_vec(),
            participants: HashSet::new(),
            won: HashSet::new(),
        }
    }

    // Participants who haven't won yet, in a stable order.
    pub fn eligible(&self) -> Vec<UserRef> {
        let mut pool = self
            .participants
            .difference(&self.won)
            .copied()
            .collect::<Vec<UserRef>>();
        pool.sort();
        pool
    }
}

#[derive(Debug)]
#[non_exhaustive]
pub struct RecordStore {
    records: DashMap<GiveawayId, Record>,
}

impl RecordStore {
    pub fn new() -> Self {
        RecordStore {
            records: DashMap::new(),
        }
    }

    pub fn get(&self, id: GiveawayId) -> Option<Record> {
        self.records.get(&id).map(|record| record.value().clone())
    }

    // Folds the finalized giveaway into its record, creating the record
    // on first use. The draw of the first merge stays the final draw.
    pub fn merge(&self, giveaway: &Giveaway, winners: &[UserRef]) {
        let mut record = self
            .records
            .entry(giveaway.id())
            .or_insert_with(|| Record::new(giveaway, winners));

        record.participants.extend(giveaway.participants().iter().copied());
        record.won.extend(winners.iter().copied());
    }

    // Draws one more winner among participants who haven't won yet.
    pub fn reroll(&self, id: GiveawayId, strategy: &dyn WinnerStrategy) -> Result<RerollOutcome> {
        let mut record = match self.records.get_mut(&id) {
            Some(record) => record,
            None => return Err(Error::UnknownGiveaway(id.get())),
        };

        let pool = record.eligible();
        let winner = strategy
            .pick(&pool)
            .ok_or(Error::NoEligibleParticipants)?;
        record.won.insert(winner);
        debug!(
            "Giveaway #{} rerolled, {} participant(s) still eligible",
            id,
            pool.len() - 1
        );

        Ok(RerollOutcome::new(
            id,
            record.channel,
            record.message,
            &record.prize,
            winner,
        ))
    }
}
