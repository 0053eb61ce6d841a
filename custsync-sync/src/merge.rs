//! Field merge policies.
//!
//! The primary record gets a full merge; duplicates only track the name.

use crate::error::SyncResult;
use custsync_storage::CustomerStore;
use custsync_types::{IncomingRecord, InternalRecord};

/// A field written by a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergedField {
    Name,
    Kind,
    CompanyNumber,
    Address,
    BonusPoints,
    /// One per shopping list attached through the store.
    ShoppingList,
    PreferredStore,
}

/// How much of an incoming record is copied onto a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePolicy {
    /// Every business field, plus shopping-list attachment.
    Full,
    /// The name only. Used for duplicates.
    NameOnly,
}

impl MergePolicy {
    /// Copies fields from `incoming` onto `target` and returns the fields
    /// written, in write order.
    ///
    /// Shopping lists are attached through `store`; everything else only
    /// changes `target` and is persisted by the caller.
    pub fn apply(
        self,
        incoming: &IncomingRecord,
        target: &mut InternalRecord,
        store: &dyn CustomerStore,
    ) -> SyncResult<Vec<MergedField>> {
        match self {
            Self::NameOnly => {
                target.name.clone_from(&incoming.name);
                Ok(vec![MergedField::Name])
            }
            Self::Full => merge_full(incoming, target, store),
        }
    }
}

fn merge_full(
    incoming: &IncomingRecord,
    target: &mut InternalRecord,
    store: &dyn CustomerStore,
) -> SyncResult<Vec<MergedField>> {
    let mut written = vec![MergedField::Name, MergedField::Kind];
    target.name.clone_from(&incoming.name);
    target.kind = Some(incoming.kind());

    if incoming.is_company {
        target.company_number.clone_from(&incoming.company_number);
        written.push(MergedField::CompanyNumber);
    }

    target.address.clone_from(&incoming.postal_address);
    written.push(MergedField::Address);

    // Companies never carry bonus points.
    if !incoming.is_company && target.bonus_points_balance != incoming.bonus_points_balance {
        target.bonus_points_balance = incoming.bonus_points_balance;
        written.push(MergedField::BonusPoints);
    }

    for list in &incoming.shopping_lists {
        store.attach_shopping_list(target, list)?;
        written.push(MergedField::ShoppingList);
    }

    target.preferred_store.clone_from(&incoming.preferred_store);
    written.push(MergedField::PreferredStore);

    Ok(written)
}
