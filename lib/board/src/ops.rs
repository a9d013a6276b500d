//  OPS.rs
//    by Lut99
//
//  Created:
//    14 Mar 2025, 14:19:33
//  Last edited:
//    04 Apr 2025, 11:58:20
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the ledger operations on the [`Board`].
//

use chrono::Utc;
use specifications::model::{EntryKind, Identity, Ledger, LedgerEntry, Reply};
use specifications::{AuthResolver, Database};
use tracing::{debug, info, span, Level};

use crate::board::{Board, Error, ValidationError};
use crate::totals::Totals;


/***** HELPER FUNCTIONS *****/
/// Checks the inputs shared by adding and editing entries.
///
/// # Arguments
/// - `offender`: The (already trimmed) offender name.
/// - `description`: The (already trimmed) description.
/// - `amount`: The magnitude the user entered.
///
/// # Errors
/// This function errors if any field is empty or the amount is not a finite, non-negative number.
fn validate_entry_input(offender: &str, description: &str, amount: f64) -> Result<(), ValidationError> {
    if offender.is_empty() {
        return Err(ValidationError::EmptyOffender);
    }
    if description.is_empty() {
        return Err(ValidationError::EmptyDescription);
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(ValidationError::InvalidAmount { amount });
    }
    Ok(())
}

/// Picks a fresh identifier that is unique within the given set of taken ones.
///
/// Identifiers are creation-time-derived (Unix milliseconds). Creating twice within the same
/// millisecond bumps past the taken maximum instead, which keeps them unique and
/// monotonic-enough.
///
/// # Arguments
/// - `taken`: The identifiers already in use.
///
/// # Returns
/// An identifier distinct from (and greater than) every taken one.
fn fresh_id(taken: impl Iterator<Item = u64>) -> u64 {
    let now: u64 = Utc::now().timestamp_millis() as u64;
    match taken.max() {
        Some(max) if now <= max => max + 1,
        _ => now,
    }
}





/***** LIBRARY *****/
impl<A: AuthResolver, D: Database> Board<A, D> {
    // Read accessors
    /// Returns the full ledger, oldest entry first.
    ///
    /// # Errors
    /// This function errors if the backend database broke.
    pub async fn entries(&self) -> Result<Ledger, Error<A::Error, D::Error>> {
        match self.data.load_ledger().await {
            Ok(ledger) => Ok(ledger),
            Err(err) => Err(Error::Data { err }),
        }
    }

    /// Returns a single entry by its identifier.
    ///
    /// # Arguments
    /// - `id`: The identifier of the entry to fetch.
    ///
    /// # Errors
    /// This function errors if there is no such entry, or if the backend database broke.
    pub async fn entry(&self, id: u64) -> Result<LedgerEntry, Error<A::Error, D::Error>> {
        let ledger: Ledger = self.entries().await?;
        match ledger.entry(id) {
            Some(entry) => Ok(entry.clone()),
            None => Err(Error::EntryNotFound { id }),
        }
    }

    /// Computes the per-offender totals and the grand total.
    ///
    /// Always derived afresh from the current ledger; totals are never persisted.
    ///
    /// # Errors
    /// This function errors if the backend database broke.
    pub async fn totals(&self) -> Result<Totals, Error<A::Error, D::Error>> {
        let ledger: Ledger = self.entries().await?;
        Ok(Totals::of(&ledger))
    }


    // Entry mutations (admin only)
    /// Records a new fine or credit at the end of the ledger.
    ///
    /// # Arguments
    /// - `actor`: The [`Identity`] doing the recording. Must be an admin.
    /// - `offender`: The person charged or credited.
    /// - `description`: The free-text reason.
    /// - `amount`: The magnitude of the fine or credit. Must be non-negative; the `kind` decides
    ///   which way it counts.
    /// - `kind`: Whether this is a [fine](EntryKind::Fine) or a [credit](EntryKind::Credit).
    ///
    /// # Returns
    /// The newly created [`LedgerEntry`], with its fresh identifier and today's date.
    ///
    /// # Errors
    /// This function errors if the actor is no admin, if the input does not validate, or if the
    /// backend database broke.
    pub async fn add_entry(
        &self,
        actor: &Identity,
        offender: &str,
        description: &str,
        amount: f64,
        kind: EntryKind,
    ) -> Result<LedgerEntry, Error<A::Error, D::Error>> {
        let _span = span!(Level::INFO, "Board::add_entry", actor = actor.username);

        if !actor.role.is_admin() {
            return Err(Error::PermissionDenied { username: actor.username.clone(), action: "add entries" });
        }
        let offender: &str = offender.trim();
        let description: &str = description.trim();
        if let Err(err) = validate_entry_input(offender, description, amount) {
            return Err(Error::Validation { err });
        }

        let mut ledger: Ledger = self.entries().await?;
        let entry: LedgerEntry = LedgerEntry {
            id: fresh_id(ledger.entries.iter().map(|e| e.id)),
            date: Utc::now().date_naive(),
            offender: offender.into(),
            description: description.into(),
            kind,
            magnitude: amount,
            proposer: actor.username.clone(),
            edited: None,
            replies: vec![],
        };
        debug!("Appending entry {} ({:?} of {} for {:?})", entry.id, kind, amount, entry.offender);
        ledger.entries.push(entry.clone());
        if let Err(err) = self.data.save_ledger(&ledger).await {
            return Err(Error::Data { err });
        }

        info!("{:?} recorded {:?} of {} against {:?}", actor.username, kind, amount, entry.offender);
        Ok(entry)
    }

    /// Edits an existing entry's offender, description and magnitude.
    ///
    /// The entry's kind is preserved no matter what: editing a credit keeps it a credit, editing
    /// a fine keeps it a fine, regardless of the magnitude supplied.
    ///
    /// # Arguments
    /// - `actor`: The [`Identity`] doing the editing. Must be an admin.
    /// - `id`: The identifier of the entry to edit.
    /// - `offender`: The new offender.
    /// - `description`: The new description.
    /// - `amount`: The new magnitude. Must be non-negative.
    ///
    /// # Returns
    /// The updated [`LedgerEntry`], with its edit provenance refreshed.
    ///
    /// # Errors
    /// This function errors if the actor is no admin, if the input does not validate, if there
    /// is no such entry, or if the backend database broke.
    pub async fn edit_entry(
        &self,
        actor: &Identity,
        id: u64,
        offender: &str,
        description: &str,
        amount: f64,
    ) -> Result<LedgerEntry, Error<A::Error, D::Error>> {
        let _span = span!(Level::INFO, "Board::edit_entry", actor = actor.username, entry = id);

        if !actor.role.is_admin() {
            return Err(Error::PermissionDenied { username: actor.username.clone(), action: "edit entries" });
        }
        let offender: &str = offender.trim();
        let description: &str = description.trim();
        if let Err(err) = validate_entry_input(offender, description, amount) {
            return Err(Error::Validation { err });
        }

        let mut ledger: Ledger = self.entries().await?;
        let entry: &mut LedgerEntry = match ledger.entry_mut(id) {
            Some(entry) => entry,
            None => return Err(Error::EntryNotFound { id }),
        };
        entry.offender = offender.into();
        entry.description = description.into();
        entry.magnitude = amount;
        entry.edited = Some(Utc::now());
        let entry: LedgerEntry = entry.clone();
        if let Err(err) = self.data.save_ledger(&ledger).await {
            return Err(Error::Data { err });
        }

        info!("{:?} edited entry {id}", actor.username);
        Ok(entry)
    }

    /// Removes an entry from the ledger, discussion thread and all.
    ///
    /// This is irreversible; a presentation layer should ask the user for explicit confirmation
    /// before calling it.
    ///
    /// # Arguments
    /// - `actor`: The [`Identity`] doing the removing. Must be an admin.
    /// - `id`: The identifier of the entry to remove.
    ///
    /// # Returns
    /// The removed [`LedgerEntry`].
    ///
    /// # Errors
    /// This function errors if the actor is no admin, if there is no such entry, or if the
    /// backend database broke.
    pub async fn remove_entry(&self, actor: &Identity, id: u64) -> Result<LedgerEntry, Error<A::Error, D::Error>> {
        let _span = span!(Level::INFO, "Board::remove_entry", actor = actor.username, entry = id);

        if !actor.role.is_admin() {
            return Err(Error::PermissionDenied { username: actor.username.clone(), action: "remove entries" });
        }

        let mut ledger: Ledger = self.entries().await?;
        let pos: usize = match ledger.entries.iter().position(|e| e.id == id) {
            Some(pos) => pos,
            None => return Err(Error::EntryNotFound { id }),
        };
        let entry: LedgerEntry = ledger.entries.remove(pos);
        if let Err(err) = self.data.save_ledger(&ledger).await {
            return Err(Error::Data { err });
        }

        info!("{:?} removed entry {id} ({:?} against {:?})", actor.username, entry.kind, entry.offender);
        Ok(entry)
    }


    // Discussion (any authenticated identity)
    /// Appends a reply to an entry's discussion thread.
    ///
    /// # Arguments
    /// - `actor`: The [`Identity`] writing the reply. Any role will do.
    /// - `entry_id`: The identifier of the entry to reply to.
    /// - `content`: The reply text.
    ///
    /// # Returns
    /// The newly created [`Reply`].
    ///
    /// # Errors
    /// This function errors if the content is empty, if there is no such entry, or if the
    /// backend database broke.
    pub async fn add_reply(&self, actor: &Identity, entry_id: u64, content: &str) -> Result<Reply, Error<A::Error, D::Error>> {
        let _span = span!(Level::INFO, "Board::add_reply", actor = actor.username, entry = entry_id);

        let content: &str = content.trim();
        if content.is_empty() {
            return Err(Error::Validation { err: ValidationError::EmptyContent });
        }

        let mut ledger: Ledger = self.entries().await?;
        let entry: &mut LedgerEntry = match ledger.entry_mut(entry_id) {
            Some(entry) => entry,
            None => return Err(Error::EntryNotFound { id: entry_id }),
        };
        let reply: Reply = Reply {
            id: fresh_id(entry.replies.iter().map(|r| r.id)),
            author: actor.username.clone(),
            content: content.into(),
            timestamp: Utc::now(),
            edited: None,
            reactions: Default::default(),
        };
        entry.replies.push(reply.clone());
        if let Err(err) = self.data.save_ledger(&ledger).await {
            return Err(Error::Data { err });
        }

        info!("{:?} replied to entry {entry_id}", actor.username);
        Ok(reply)
    }

    /// Edits a reply's content in place.
    ///
    /// Only the reply's own author may edit it; replies are never deletable, only editable.
    ///
    /// # Arguments
    /// - `actor`: The [`Identity`] doing the editing. Must be the reply's author.
    /// - `entry_id`: The identifier of the entry the reply is on.
    /// - `reply_id`: The identifier of the reply to edit.
    /// - `content`: The new reply text.
    ///
    /// # Returns
    /// The updated [`Reply`], with its edit provenance refreshed.
    ///
    /// # Errors
    /// This function errors if the content is empty, if the actor is not the author, if the
    /// entry or reply does not exist, or if the backend database broke.
    pub async fn edit_reply(&self, actor: &Identity, entry_id: u64, reply_id: u64, content: &str) -> Result<Reply, Error<A::Error, D::Error>> {
        let _span = span!(Level::INFO, "Board::edit_reply", actor = actor.username, entry = entry_id, reply = reply_id);

        let content: &str = content.trim();
        if content.is_empty() {
            return Err(Error::Validation { err: ValidationError::EmptyContent });
        }

        let mut ledger: Ledger = self.entries().await?;
        let entry: &mut LedgerEntry = match ledger.entry_mut(entry_id) {
            Some(entry) => entry,
            None => return Err(Error::EntryNotFound { id: entry_id }),
        };
        let reply: &mut Reply = match entry.reply_mut(reply_id) {
            Some(reply) => reply,
            None => return Err(Error::ReplyNotFound { entry: entry_id, reply: reply_id }),
        };
        if reply.author != actor.username {
            return Err(Error::PermissionDenied { username: actor.username.clone(), action: "edit replies of others" });
        }
        reply.content = content.into();
        reply.edited = Some(Utc::now());
        let reply: Reply = reply.clone();
        if let Err(err) = self.data.save_ledger(&ledger).await {
            return Err(Error::Data { err });
        }

        info!("{:?} edited their reply {reply_id} on entry {entry_id}", actor.username);
        Ok(reply)
    }

    /// Toggles the actor's reaction with the given emoji on a reply.
    ///
    /// The toggle is idempotent in pairs: toggling the same emoji twice returns the reply to its
    /// prior state. Any emoji is accepted; a suggested palette is a presentation concern.
    ///
    /// # Arguments
    /// - `actor`: The [`Identity`] doing the reacting. Any role will do.
    /// - `entry_id`: The identifier of the entry the reply is on.
    /// - `reply_id`: The identifier of the reply to react to.
    /// - `emoji`: The emoji to toggle.
    ///
    /// # Returns
    /// True if the reaction is now present, or false if the toggle removed it.
    ///
    /// # Errors
    /// This function errors if the entry or reply does not exist, or if the backend database
    /// broke.
    pub async fn toggle_reaction(&self, actor: &Identity, entry_id: u64, reply_id: u64, emoji: &str) -> Result<bool, Error<A::Error, D::Error>> {
        let _span = span!(Level::INFO, "Board::toggle_reaction", actor = actor.username, entry = entry_id, reply = reply_id);

        let mut ledger: Ledger = self.entries().await?;
        let entry: &mut LedgerEntry = match ledger.entry_mut(entry_id) {
            Some(entry) => entry,
            None => return Err(Error::EntryNotFound { id: entry_id }),
        };
        let reply: &mut Reply = match entry.reply_mut(reply_id) {
            Some(reply) => reply,
            None => return Err(Error::ReplyNotFound { entry: entry_id, reply: reply_id }),
        };
        let present: bool = reply.toggle_reaction(emoji, &actor.username);
        if let Err(err) = self.data.save_ledger(&ledger).await {
            return Err(Error::Data { err });
        }

        debug!("{:?} toggled {emoji:?} {} on reply {reply_id} of entry {entry_id}", actor.username, if present { "on" } else { "off" });
        Ok(present)
    }
}
