//  MODEL.rs
//    by Lut99
//
//  Created:
//    11 Mar 2025, 14:24:08
//  Last edited:
//    03 Apr 2025, 11:46:31
//  Auto updated?
//    Yes
//
//  Description:
//!   Defines the ledger data model: entries, replies, reactions and the
//!   identities acting on them.
//

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};


/***** HELPER FUNCTIONS *****/
/// Serde predicate for skipping `false` flags in the wire format.
#[inline]
fn is_false(b: &bool) -> bool { !*b }





/***** LIBRARY *****/
/// What a resolved user is allowed to do.
///
/// Roles are derived from the user directory at resolution time; they are never persisted.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Role {
    /// May create, edit and remove entries (and everything a viewer may).
    Admin,
    /// May read the ledger, reply and react.
    Viewer,
}
impl Role {
    /// Checks whether this role carries admin rights.
    ///
    /// # Returns
    /// True if this is [`Role::Admin`], or false otherwise.
    #[inline]
    pub const fn is_admin(&self) -> bool { matches!(self, Self::Admin) }
}



/// A user as resolved by an [`AuthResolver`](crate::AuthResolver).
///
/// Identities are resolved per login and passed explicitly to every operation that needs one;
/// there is no ambient "current user".
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Identity {
    /// The username, as it appears in the user directory.
    pub username: String,
    /// The role derived for this user.
    pub role:     Role,
}



/// Whether an entry charges or relieves the offender.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum EntryKind {
    /// A positive monetary charge against the offender.
    Fine,
    /// A negative adjustment reducing the offender's balance.
    Credit,
}

/// One fine or credit in the ledger, together with its discussion thread.
///
/// In memory the kind is an explicit [`EntryKind`] next to a non-negative magnitude. On the wire
/// (and on disk) the two are folded into a single signed `amount` for compatibility with older
/// snapshots: positive means fine, negative means credit. The conversion lives in [`WireEntry`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(from = "WireEntry", into = "WireEntry")]
pub struct LedgerEntry {
    /// Unique, creation-time-derived identifier. Assigned at creation, never reassigned.
    pub id: u64,
    /// Calendar date of creation.
    pub date: NaiveDate,
    /// The person charged or credited.
    pub offender: String,
    /// Free-text reason for the entry.
    pub description: String,
    /// Whether this is a fine or a credit.
    pub kind: EntryKind,
    /// The size of the fine or credit. Always non-negative; see [`LedgerEntry::signed_amount()`].
    pub magnitude: f64,
    /// The username of whoever created the entry.
    pub proposer: String,
    /// When the entry was last edited, if ever. Overwritten on every edit.
    pub edited: Option<DateTime<Utc>>,
    /// The discussion thread, in insertion (= display) order. Append-only at the model level.
    pub replies: Vec<Reply>,
}
impl LedgerEntry {
    /// Returns the amount as it counts towards totals.
    ///
    /// # Returns
    /// The magnitude for a [fine](EntryKind::Fine), or its negation for a
    /// [credit](EntryKind::Credit).
    #[inline]
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EntryKind::Fine => self.magnitude,
            EntryKind::Credit => -self.magnitude,
        }
    }

    /// Finds a reply on this entry by its identifier.
    ///
    /// # Arguments
    /// - `id`: The identifier of the reply to find.
    ///
    /// # Returns
    /// The matching [`Reply`], or [`None`] if the entry has no such reply.
    #[inline]
    pub fn reply(&self, id: u64) -> Option<&Reply> { self.replies.iter().find(|r| r.id == id) }

    /// Finds a reply on this entry by its identifier, mutably.
    ///
    /// # Arguments
    /// - `id`: The identifier of the reply to find.
    ///
    /// # Returns
    /// The matching [`Reply`], or [`None`] if the entry has no such reply.
    #[inline]
    pub fn reply_mut(&mut self, id: u64) -> Option<&mut Reply> { self.replies.iter_mut().find(|r| r.id == id) }
}



/// A threaded comment on a [`LedgerEntry`].
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(from = "WireReply", into = "WireReply")]
pub struct Reply {
    /// Unique (within the entry), creation-time-derived identifier.
    pub id: u64,
    /// The username of whoever wrote the reply.
    pub author: String,
    /// The reply text. Mutable in place, unlike the rest of the reply.
    pub content: String,
    /// When the reply was created.
    pub timestamp: DateTime<Utc>,
    /// When the reply was last edited, if ever.
    pub edited: Option<DateTime<Utc>>,
    /// Maps emoji to the set of usernames that reacted with it.
    ///
    /// Invariant: no emoji ever maps to an empty set. [`Reply::toggle_reaction()`] upholds this
    /// by removing the key when the last user toggles off.
    pub reactions: BTreeMap<String, BTreeSet<String>>,
}
impl Reply {
    /// Toggles a reaction of the given user with the given emoji.
    ///
    /// The toggle is idempotent in pairs: toggling the same (emoji, user) combination twice
    /// returns the reply to its prior state. Any emoji string is a valid key; offering a palette
    /// is a presentation concern.
    ///
    /// # Arguments
    /// - `emoji`: The emoji to react (or unreact) with.
    /// - `username`: The user doing the reacting.
    ///
    /// # Returns
    /// True if the reaction is now present, or false if the toggle removed it.
    pub fn toggle_reaction(&mut self, emoji: &str, username: &str) -> bool {
        match self.reactions.get_mut(emoji) {
            Some(users) => {
                if users.remove(username) {
                    // No dangling empty reaction groups
                    if users.is_empty() {
                        self.reactions.remove(emoji);
                    }
                    false
                } else {
                    users.insert(username.into());
                    true
                }
            },
            None => {
                self.reactions.insert(emoji.into(), BTreeSet::from([username.into()]));
                true
            },
        }
    }

    /// Checks whether the given user currently reacts to this reply with the given emoji.
    #[inline]
    pub fn has_reaction(&self, emoji: &str, username: &str) -> bool { self.reactions.get(emoji).is_some_and(|users| users.contains(username)) }
}



/// The ordered collection of all fine/credit entries.
///
/// This is the single source of truth; totals and other aggregates are always recomputed from it,
/// never persisted. Append order is chronological order is display order.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Ledger {
    /// The entries, oldest first.
    pub entries: Vec<LedgerEntry>,
}
impl Ledger {
    /// Finds an entry by its identifier.
    ///
    /// # Arguments
    /// - `id`: The identifier of the entry to find.
    ///
    /// # Returns
    /// The matching [`LedgerEntry`], or [`None`] if the ledger has no such entry.
    #[inline]
    pub fn entry(&self, id: u64) -> Option<&LedgerEntry> { self.entries.iter().find(|e| e.id == id) }

    /// Finds an entry by its identifier, mutably.
    ///
    /// # Arguments
    /// - `id`: The identifier of the entry to find.
    ///
    /// # Returns
    /// The matching [`LedgerEntry`], or [`None`] if the ledger has no such entry.
    #[inline]
    pub fn entry_mut(&mut self, id: u64) -> Option<&mut LedgerEntry> { self.entries.iter_mut().find(|e| e.id == id) }
}





/***** WIRE FORMAT *****/
/// The on-disk shape of a [`LedgerEntry`].
///
/// Kept sign-encoded (and with `replies` optional) so that snapshots written by older versions of
/// the board keep loading.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct WireEntry {
    id: u64,
    date: NaiveDate,
    offender: String,
    description: String,
    /// Sign encodes the kind: positive = fine, negative = credit.
    amount: f64,
    proposer: String,
    #[serde(default, skip_serializing_if = "is_false")]
    edited: bool,
    #[serde(default, rename = "editTimestamp", skip_serializing_if = "Option::is_none")]
    edit_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    replies: Vec<Reply>,
}
impl From<WireEntry> for LedgerEntry {
    fn from(value: WireEntry) -> Self {
        Self {
            id: value.id,
            date: value.date,
            offender: value.offender,
            description: value.description,
            kind: if value.amount < 0.0 { EntryKind::Credit } else { EntryKind::Fine },
            magnitude: value.amount.abs(),
            proposer: value.proposer,
            edited: if value.edited { value.edit_timestamp } else { None },
            replies: value.replies,
        }
    }
}
impl From<LedgerEntry> for WireEntry {
    fn from(value: LedgerEntry) -> Self {
        // Read the amount before the literal below starts moving fields out of `value`
        let amount: f64 = value.signed_amount();
        Self {
            id: value.id,
            date: value.date,
            offender: value.offender,
            description: value.description,
            amount,
            proposer: value.proposer,
            edited: value.edited.is_some(),
            edit_timestamp: value.edited,
            replies: value.replies,
        }
    }
}

/// The on-disk shape of a [`Reply`].
#[derive(Clone, Debug, Deserialize, Serialize)]
struct WireReply {
    id: u64,
    author: String,
    content: String,
    timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "is_false")]
    edited: bool,
    #[serde(default, rename = "editTimestamp", skip_serializing_if = "Option::is_none")]
    edit_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    reactions: BTreeMap<String, BTreeSet<String>>,
}
impl From<WireReply> for Reply {
    fn from(value: WireReply) -> Self {
        Self {
            id: value.id,
            author: value.author,
            content: value.content,
            timestamp: value.timestamp,
            edited: if value.edited { value.edit_timestamp } else { None },
            reactions: value.reactions,
        }
    }
}
impl From<Reply> for WireReply {
    fn from(value: Reply) -> Self {
        Self {
            id: value.id,
            author: value.author,
            content: value.content,
            timestamp: value.timestamp,
            edited: value.edited.is_some(),
            edit_timestamp: value.edited,
            reactions: value.reactions,
        }
    }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: EntryKind, magnitude: f64) -> LedgerEntry {
        LedgerEntry {
            id: 1700000000000,
            date: NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
            offender: "Toby".into(),
            description: "late".into(),
            kind,
            magnitude,
            proposer: "alex".into(),
            edited: None,
            replies: vec![],
        }
    }

    fn reply() -> Reply {
        Reply {
            id: 1700000000001,
            author: "toby".into(),
            content: "sorry!".into(),
            timestamp: DateTime::from_timestamp(1_741_700_000, 0).unwrap(),
            edited: None,
            reactions: BTreeMap::new(),
        }
    }

    #[test]
    fn credit_serializes_with_negative_amount() {
        let json = serde_json::to_value(entry(EntryKind::Credit, 4.0)).unwrap();
        assert_eq!(json["amount"], serde_json::json!(-4.0));

        let back: LedgerEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, EntryKind::Credit);
        assert_eq!(back.magnitude, 4.0);
        assert_eq!(back.signed_amount(), -4.0);
    }

    #[test]
    fn fine_serializes_with_positive_amount() {
        let json = serde_json::to_value(entry(EntryKind::Fine, 10.0)).unwrap();
        assert_eq!(json["amount"], serde_json::json!(10.0));

        let back: LedgerEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, EntryKind::Fine);
        assert_eq!(back.signed_amount(), 10.0);
    }

    #[test]
    fn edited_entries_roundtrip_with_their_provenance() {
        let mut original = entry(EntryKind::Credit, 4.0);
        original.edited = Some(DateTime::from_timestamp(1_741_800_000, 0).unwrap());

        let json = serde_json::to_value(original.clone()).unwrap();
        assert_eq!(json["amount"], serde_json::json!(-4.0));
        assert_eq!(json["edited"], serde_json::json!(true));
        assert!(json.get("editTimestamp").is_some());

        let back: LedgerEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn legacy_entry_without_replies_loads_empty() {
        // As written by versions that predate the discussion threads
        let raw = r#"{
            "id": 1700000000000,
            "date": "2025-03-11",
            "offender": "Toby",
            "description": "late",
            "amount": 10.0,
            "proposer": "alex"
        }"#;
        let entry: LedgerEntry = serde_json::from_str(raw).unwrap();
        assert!(entry.replies.is_empty());
        assert!(entry.edited.is_none());
    }

    #[test]
    fn toggle_reaction_is_self_inverse() {
        let mut reply = reply();
        let before = reply.reactions.clone();

        assert!(reply.toggle_reaction("👍", "alex"));
        assert!(reply.has_reaction("👍", "alex"));
        assert!(!reply.toggle_reaction("👍", "alex"));
        assert_eq!(reply.reactions, before);
    }

    #[test]
    fn toggling_last_user_off_removes_the_emoji_key() {
        let mut reply = reply();
        reply.toggle_reaction("🎉", "alex");
        reply.toggle_reaction("🎉", "toby");

        reply.toggle_reaction("🎉", "alex");
        assert!(reply.reactions.contains_key("🎉"));
        reply.toggle_reaction("🎉", "toby");
        assert!(!reply.reactions.contains_key("🎉"));
    }

    #[test]
    fn reply_reactions_roundtrip() {
        let mut reply = reply();
        reply.toggle_reaction("👍", "alex");
        reply.toggle_reaction("👍", "noah");

        let json = serde_json::to_string(&reply).unwrap();
        let back: Reply = serde_json::from_str(&json).unwrap();
        assert_eq!(back, reply);
    }

    #[test]
    fn empty_reactions_are_not_written() {
        let json = serde_json::to_value(reply()).unwrap();
        assert!(json.get("reactions").is_none());
        assert!(json.get("edited").is_none());
    }
}
