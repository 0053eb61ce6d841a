//! Matcher - resolves an incoming record to stored customers.
//!
//! Produces a [`MatchResult`]: at most one primary record plus the duplicate
//! slots the reconciler must sweep. Identity conflicts are raised here, before
//! anything is written. The matcher only reads from the store; records it
//! relinks or demotes are changed in the returned copies, not persisted.

use crate::error::{SyncError, SyncResult};
use custsync_storage::CustomerStore;
use custsync_types::{CompanyNumber, CustomerKind, ExternalId, IncomingRecord, InternalRecord};
use tracing::{debug, warn};

const EXISTING_CUSTOMER: &str = "Existing customer for externalCustomer";

/// The key that tied an incoming record to a stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKey {
    ExternalId,
    CompanyNumber,
}

/// The authoritative stored record for an incoming record, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryMatch {
    /// Nothing matched: a new record must be created.
    NoMatch,
    ByExternalId(InternalRecord),
    ByCompanyNumber(InternalRecord),
}

impl PrimaryMatch {
    #[must_use]
    pub fn key(&self) -> Option<MatchKey> {
        match self {
            Self::NoMatch => None,
            Self::ByExternalId(_) => Some(MatchKey::ExternalId),
            Self::ByCompanyNumber(_) => Some(MatchKey::CompanyNumber),
        }
    }

    #[must_use]
    pub fn record(&self) -> Option<&InternalRecord> {
        match self {
            Self::NoMatch => None,
            Self::ByExternalId(record) | Self::ByCompanyNumber(record) => Some(record),
        }
    }

    #[must_use]
    pub fn into_record(self) -> Option<InternalRecord> {
        match self {
            Self::NoMatch => None,
            Self::ByExternalId(record) | Self::ByCompanyNumber(record) => Some(record),
        }
    }
}

/// A record the reconciler must bring in line besides the primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateSlot {
    /// A stored record to re-synchronize.
    Existing(InternalRecord),
    /// A new duplicate record to create in the incoming record's cluster.
    ToCreate,
}

/// Outcome of matching one incoming record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    pub primary: PrimaryMatch,
    pub duplicates: Vec<DuplicateSlot>,
}

impl MatchResult {
    #[must_use]
    pub fn no_match() -> Self {
        Self {
            primary: PrimaryMatch::NoMatch,
            duplicates: Vec::new(),
        }
    }

    #[must_use]
    pub fn key(&self) -> Option<MatchKey> {
        self.primary.key()
    }
}

/// Looks up candidate records for incoming customers.
pub struct Matcher<'a> {
    store: &'a dyn CustomerStore,
}

impl<'a> Matcher<'a> {
    pub fn new(store: &'a dyn CustomerStore) -> Self {
        Self { store }
    }

    /// Matches `incoming` using the rules for its declared kind.
    pub fn match_record(&self, incoming: &IncomingRecord) -> SyncResult<MatchResult> {
        let result = match incoming.kind() {
            CustomerKind::Company => self.match_company(incoming)?,
            CustomerKind::Person => self.match_person(incoming)?,
        };
        debug!(
            "Matched {} {} by {:?} with {} duplicate slot(s)",
            incoming.kind(),
            incoming.external_id,
            result.key(),
            result.duplicates.len()
        );
        Ok(result)
    }

    /// Matches a company by external id, falling back to its company number.
    pub fn match_company(&self, incoming: &IncomingRecord) -> SyncResult<MatchResult> {
        let external_id = &incoming.external_id;
        let company_number = incoming.company_number.as_ref().ok_or_else(|| {
            custsync_types::Error::InvalidRecord(format!(
                "company {external_id} has no company number"
            ))
        })?;

        let Some(found) = self.store.find_by_external_id(external_id)? else {
            return self.match_company_by_number(external_id, company_number);
        };
        ensure_kind(&found, CustomerKind::Company, external_id)?;

        let mut duplicates = Vec::new();
        // The canonical record is itself part of its cluster.
        if let Some(duplicate) = self.store.find_by_master_external_id(external_id)?
            && duplicate.internal_id != found.internal_id
        {
            duplicates.push(DuplicateSlot::Existing(duplicate));
        }

        if found.company_number.as_ref() != Some(company_number) {
            // Same external id but a different legal entity: the stored record
            // leaves the cluster and a new canonical record takes its place.
            // It is not looked up again by company number.
            warn!(
                "Customer {external_id} matched by external id but has company number {:?}, expected {company_number}; demoting to duplicate",
                found.company_number
            );
            let mut orphan = found;
            orphan.master_external_id = None;
            duplicates.push(DuplicateSlot::Existing(orphan));
            return Ok(MatchResult {
                primary: PrimaryMatch::NoMatch,
                duplicates,
            });
        }

        Ok(MatchResult {
            primary: PrimaryMatch::ByExternalId(found),
            duplicates,
        })
    }

    fn match_company_by_number(
        &self,
        external_id: &ExternalId,
        company_number: &CompanyNumber,
    ) -> SyncResult<MatchResult> {
        let Some(mut found) = self.store.find_by_company_number(company_number)? else {
            return Ok(MatchResult::no_match());
        };
        ensure_kind(&found, CustomerKind::Company, external_id)?;

        if let Some(stored) = &found.external_id
            && stored != external_id
        {
            let message = format!(
                "{EXISTING_CUSTOMER} {company_number} doesn't match external id {external_id} instead found {stored}"
            );
            warn!("{message}");
            return Err(SyncError::Conflict(message));
        }

        found.link_to(external_id);
        Ok(MatchResult {
            primary: PrimaryMatch::ByCompanyNumber(found),
            duplicates: vec![DuplicateSlot::ToCreate],
        })
    }

    /// Matches a person by external id only.
    ///
    /// A person is only ever found through its external id, so the link is
    /// already established and never rewritten here.
    pub fn match_person(&self, incoming: &IncomingRecord) -> SyncResult<MatchResult> {
        let external_id = &incoming.external_id;
        let Some(found) = self.store.find_by_external_id(external_id)? else {
            return Ok(MatchResult::no_match());
        };
        ensure_kind(&found, CustomerKind::Person, external_id)?;

        Ok(MatchResult {
            primary: PrimaryMatch::ByExternalId(found),
            duplicates: Vec::new(),
        })
    }
}

fn ensure_kind(
    found: &InternalRecord,
    expected: CustomerKind,
    external_id: &ExternalId,
) -> SyncResult<()> {
    if found.kind == Some(expected) {
        return Ok(());
    }
    let message = format!(
        "{EXISTING_CUSTOMER} {external_id} already exists and is not a {}",
        expected.label().to_lowercase()
    );
    warn!("{message}");
    Err(SyncError::Conflict(message))
}
