use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};

// A unique identifier of the giveaway, allocated by the registry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct GiveawayId(pub u64);

impl GiveawayId {
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for GiveawayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// A Discord user who can take part in giveaways.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct UserRef(pub u64);

impl UserRef {
    // Returns the mention string rendered by Discord as a user link.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

// The channel where the giveaway was announced.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChannelRef(pub u64);

// The announcement message that displays the giveaway state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct MessageRef(pub u64);

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Giveaway {
    // A stable identifier, the only key of the giveaway.
    id: GiveawayId,
    // Destination channel for the displays and the result notification.
    channel: ChannelRef,
    // A reference to the message which needs to update while the
    // giveaway is running. Missing until the announcement is published.
    message: Option<MessageRef>,
    // A free-text description of the prize.
    prize: String,
    // How many winners have to be drawn. Never changes after creation.
    winner_count: usize,
    created_at: DateTime<Utc>,
    // The giveaway becomes eligible for finalization at this moment.
    deadline: DateTime<Utc>,
    participants: HashSet<UserRef>,
}

impl Giveaway {
    pub fn new(
        id: GiveawayId,
        channel: ChannelRef,
        prize: &str,
        winner_count: usize,
        created_at: DateTime<Utc>,
        deadline: DateTime<Utc>,
    ) -> Self {
        Giveaway {
            id,
            channel,
            message: None,
            prize: prize.to_string(),
            winner_count,
            created_at,
            deadline,
            participants: HashSet::new(),
        }
    }

    pub fn id(&self) -> GiveawayId {
        self.id
    }

    pub fn channel(&self) -> ChannelRef {
        self.channel
    }

    // Returns a reference to the message that must be updated
    pub fn message(&self) -> Option<MessageRef> {
        self.message
    }

    // Links the giveaway with its announcement message.
    pub fn attach_message(&mut self, message: MessageRef) {
        self.message = Some(message);
    }

    pub fn prize(&self) -> &str {
        &self.prize
    }

    pub fn winner_count(&self) -> usize {
        self.winner_count
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.deadline
    }

    pub fn participants(&self) -> &HashSet<UserRef> {
        &self.participants
    }

    pub fn is_participant(&self, user: UserRef) -> bool {
        self.participants.contains(&user)
    }

    // Checks that the giveaway has reached its deadline.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline
    }

    // Returns how many whole seconds are left before the deadline.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> i64 {
        (self.deadline - now).num_seconds().max(0)
    }

    // Adds the user when absent, removes otherwise.
    pub fn toggle_participant(&mut self, user: UserRef) -> ToggleOutcome {
        match self.participants.remove(&user) {
            true => ToggleOutcome::Left,
            false => {
                self.participants.insert(user);
                ToggleOutcome::Joined
            }
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ToggleOutcome {
    Joined,
    Left,
    // The giveaway is not running (ended or never existed).
    Inactive,
}

impl ToggleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToggleOutcome::Joined => "joined",
            ToggleOutcome::Left => "left",
            ToggleOutcome::Inactive => "inactive",
        }
    }

    // Reply for the user who pressed the join button
    pub fn reply(&self) -> &'static str {
        match self {
            ToggleOutcome::Joined => "You joined the giveaway.",
            ToggleOutcome::Left => "You left the giveaway.",
            ToggleOutcome::Inactive => "This giveaway is no longer active.",
        }
    }
}

#[readonly::make]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FinalizeOutcome {
    pub id: GiveawayId,
    pub prize: String,
    pub winners: Vec<UserRef>,
    pub participants: usize,
}

impl FinalizeOutcome {
    pub fn new(giveaway: &Giveaway, winners: Vec<UserRef>) -> Self {
        FinalizeOutcome {
            id: giveaway.id(),
            prize: giveaway.prize().to_string(),
            winners,
            participants: giveaway.participants().len(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EndOutcome {
    // This call performed the finalization.
    Ended(FinalizeOutcome),
    // Someone else has already finalized the giveaway.
    AlreadyEnded,
    NotFound,
}

#[readonly::make]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RerollOutcome {
    pub id: GiveawayId,
    pub channel: ChannelRef,
    // The announcement the reroll notification replies to.
    pub message: Option<MessageRef>,
    pub prize: String,
    pub winner: UserRef,
}

impl RerollOutcome {
    pub fn new(
        id: GiveawayId,
        channel: ChannelRef,
        message: Option<MessageRef>,
        prize: &str,
        winner: UserRef,
    ) -> Self {
        RerollOutcome {
            id,
            channel,
            message,
            prize: prize.to_string(),
            winner,
        }
    }
}
