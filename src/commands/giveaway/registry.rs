use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;

use crate::commands::giveaway::models::{
    ChannelRef, Giveaway, GiveawayId, MessageRef, ToggleOutcome, UserRef,
};
use crate::error::{Error, Result};

// Running giveaways. An entry leaves the registry only through
// `take_for_finalization`.
#[derive(Debug)]
#[non_exhaustive]
pub struct GiveawayRegistry {
    giveaways: DashMap<GiveawayId, Giveaway>,
    // Identifiers are never reused, so any id below this counter that is
    // missing from the map belongs to an ended giveaway. Held while a new
    // giveaway is inserted, so the counter never runs ahead of the map.
    next_id: Mutex<u64>,
}

impl GiveawayRegistry {
    pub fn new() -> Self {
        GiveawayRegistry {
            giveaways: DashMap::new(),
            next_id: Mutex::new(1),
        }
    }

    fn lock_ids(&self) -> MutexGuard<'_, u64> {
        self.next_id.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Registers a new giveaway that ends `duration_secs` after `now`.
    pub fn create(
        &self,
        channel: ChannelRef,
        prize: &str,
        winner_count: usize,
        duration_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<GiveawayId> {
        let deadline = TimeDelta::try_seconds(duration_secs)
            .and_then(|duration| now.checked_add_signed(duration))
            .ok_or_else(|| Error::InvalidDuration(format!("{}s", duration_secs)))?;

        let mut next_id = self.lock_ids();
        let id = GiveawayId(*next_id);
        let giveaway = Giveaway::new(id, channel, prize, winner_count, now, deadline);
        self.giveaways.insert(id, giveaway);
        *next_id += 1;
        Ok(id)
    }

    // Returns a detached copy of the running giveaway.
    pub fn get(&self, id: GiveawayId) -> Result<Giveaway> {
        match self.giveaways.get(&id) {
            Some(giveaway) => Ok(giveaway.value().clone()),
            None => Err(Error::GiveawayNotFound(id.get())),
        }
    }

    // Checks that the id was handed out by this registry at some point.
    // Waits for a creation in progress, after that the giveaway is either
    // in the map or has already been taken.
    pub fn was_issued(&self, id: GiveawayId) -> bool {
        id.get() > 0 && id.get() < *self.lock_ids()
    }

    pub fn attach_message(&self, id: GiveawayId, message: MessageRef) -> Result<()> {
        match self.giveaways.get_mut(&id) {
            Some(mut giveaway) => {
                giveaway.attach_message(message);
                Ok(())
            }
            None => Err(Error::GiveawayNotFound(id.get())),
        }
    }

    // Toggles the membership under the entry lock, so it can't interleave
    // with a concurrent take of the same giveaway.
    pub fn toggle(&self, id: GiveawayId, user: UserRef) -> ToggleOutcome {
        match self.giveaways.get_mut(&id) {
            Some(mut giveaway) => giveaway.toggle_participant(user),
            None => ToggleOutcome::Inactive,
        }
    }

    // Atomically removes the giveaway. Only one caller gets `Some` for a
    // given id; everybody else observes that it was already taken.
    pub fn take_for_finalization(&self, id: GiveawayId) -> Option<Giveaway> {
        self.giveaways.remove(&id).map(|(_, giveaway)| giveaway)
    }

    // Returns copies of all running giveaways ordered by id.
    pub fn snapshot(&self) -> Vec<Giveaway> {
        let mut giveaways = self
            .giveaways
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<Giveaway>>();
        giveaways.sort_by_key(|giveaway| giveaway.id());
        giveaways
    }
}
