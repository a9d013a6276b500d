//  TOTALS.rs
//    by Lut99
//
//  Created:
//    14 Mar 2025, 15:05:12
//  Last edited:
//    04 Apr 2025, 12:04:58
//  Auto updated?
//    Yes
//
//  Description:
//!   Implements the per-offender totals aggregation.
//

use std::cmp::Ordering;
use std::collections::BTreeMap;

use specifications::model::Ledger;


/***** LIBRARY *****/
/// The running balance of one offender.
#[derive(Clone, Debug, PartialEq)]
pub struct OffenderTotal {
    /// The offender this total is for.
    pub offender: String,
    /// The net amount: fines count positive, credits negative.
    pub total:    f64,
    /// How many ledger entries (fines and credits both) contributed.
    pub entries:  usize,
}

/// A derived view of the whole ledger: per-offender balances plus the grand total.
///
/// Never persisted; always recomputed from the current ledger state.
#[derive(Clone, Debug, PartialEq)]
pub struct Totals {
    /// One total per offender appearing in the ledger, sorted descending by net amount.
    pub offenders:   Vec<OffenderTotal>,
    /// The sum of all per-offender totals (equivalently, of all entry amounts).
    pub grand_total: f64,
}
impl Totals {
    /// Computes the totals of the given ledger.
    ///
    /// A pure function of the ledger state: permuting the ledger's entry order does not change
    /// the result. Ties in the descending-by-amount order are broken by offender name to keep
    /// the view deterministic.
    ///
    /// # Arguments
    /// - `ledger`: The [`Ledger`] to aggregate.
    ///
    /// # Returns
    /// The computed [`Totals`].
    pub fn of(ledger: &Ledger) -> Self {
        let mut balances: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for entry in &ledger.entries {
            let balance: &mut (f64, usize) = balances.entry(entry.offender.as_str()).or_default();
            balance.0 += entry.signed_amount();
            balance.1 += 1;
        }

        let mut offenders: Vec<OffenderTotal> =
            balances.into_iter().map(|(offender, (total, entries))| OffenderTotal { offender: offender.into(), total, entries }).collect();
        offenders.sort_by(|lhs, rhs| rhs.total.partial_cmp(&lhs.total).unwrap_or(Ordering::Equal).then_with(|| lhs.offender.cmp(&rhs.offender)));

        let grand_total: f64 = offenders.iter().map(|o| o.total).sum();
        Self { offenders, grand_total }
    }

    /// Looks up the total of a specific offender.
    ///
    /// # Arguments
    /// - `offender`: The offender to look up.
    ///
    /// # Returns
    /// Their [`OffenderTotal`], or [`None`] if they do not appear in the ledger.
    #[inline]
    pub fn offender(&self, offender: &str) -> Option<&OffenderTotal> { self.offenders.iter().find(|o| o.offender == offender) }
}





/***** TESTS *****/
#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use specifications::model::{EntryKind, LedgerEntry};

    use super::*;

    fn entry(id: u64, offender: &str, kind: EntryKind, magnitude: f64) -> LedgerEntry {
        LedgerEntry {
            id,
            date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            offender: offender.into(),
            description: "something".into(),
            kind,
            magnitude,
            proposer: "alex".into(),
            edited: None,
            replies: vec![],
        }
    }

    fn ledger() -> Ledger {
        Ledger {
            entries: vec![
                entry(1, "Toby", EntryKind::Fine, 10.0),
                entry(2, "Noah", EntryKind::Fine, 3.5),
                entry(3, "Toby", EntryKind::Credit, 4.0),
                entry(4, "Zander", EntryKind::Fine, 2.0),
            ],
        }
    }

    #[test]
    fn fines_and_credits_cancel_per_offender() {
        let totals = Totals::of(&ledger());
        assert_eq!(totals.offender("Toby"), Some(&OffenderTotal { offender: "Toby".into(), total: 6.0, entries: 2 }));
        assert_eq!(totals.offender("Noah").map(|o| o.total), Some(3.5));
        assert_eq!(totals.grand_total, 11.5);
    }

    #[test]
    fn offenders_are_sorted_descending_by_net_amount() {
        let totals = Totals::of(&ledger());
        let order: Vec<&str> = totals.offenders.iter().map(|o| o.offender.as_str()).collect();
        assert_eq!(order, vec!["Toby", "Noah", "Zander"]);
    }

    #[test]
    fn totals_are_order_independent() {
        let ledger = ledger();
        let expected = Totals::of(&ledger);

        // Try every rotation of the entries; the derived view may not care
        for shift in 0..ledger.entries.len() {
            let mut permuted = ledger.clone();
            permuted.entries.rotate_left(shift);
            assert_eq!(Totals::of(&permuted), expected);
        }
    }

    #[test]
    fn empty_ledgers_total_to_nothing() {
        let totals = Totals::of(&Ledger::default());
        assert!(totals.offenders.is_empty());
        assert_eq!(totals.grand_total, 0.0);
    }
}
