//! Customer records on both sides of a sync.
//!
//! [`IncomingRecord`] is what the external source system sends.
//! [`InternalRecord`] is what the customer store keeps.

use crate::ids::{CompanyNumber, ExternalId, InternalId};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Legal kind of a customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerKind {
    Person,
    Company,
}

impl CustomerKind {
    /// Human-readable label, as used by the source system.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Company => "Company",
        }
    }

    #[must_use]
    pub const fn from_is_company(is_company: bool) -> Self {
        if is_company { Self::Company } else { Self::Person }
    }
}

impl fmt::Display for CustomerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Postal address of a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
}

impl Address {
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
        }
    }
}

/// A shopping list owned by a customer. Compared by content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShoppingList {
    pub products: Vec<String>,
}

impl ShoppingList {
    pub fn new<I, S>(products: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            products: products.into_iter().map(Into::into).collect(),
        }
    }
}

/// A customer as delivered by the external source system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRecord {
    pub external_id: ExternalId,
    #[serde(default)]
    pub is_company: bool,
    #[serde(default)]
    pub company_number: Option<CompanyNumber>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub postal_address: Option<Address>,
    #[serde(default)]
    pub bonus_points_balance: Option<i64>,
    #[serde(default)]
    pub preferred_store: Option<String>,
    #[serde(default)]
    pub shopping_lists: Vec<ShoppingList>,
}

impl IncomingRecord {
    /// A company record with only its identity fields and name filled in.
    pub fn company(
        external_id: impl Into<ExternalId>,
        company_number: impl Into<CompanyNumber>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            external_id: external_id.into(),
            is_company: true,
            company_number: Some(company_number.into()),
            name: name.into(),
            postal_address: None,
            bonus_points_balance: None,
            preferred_store: None,
            shopping_lists: Vec::new(),
        }
    }

    /// A person record with only its identity fields and name filled in.
    pub fn person(external_id: impl Into<ExternalId>, name: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            is_company: false,
            company_number: None,
            name: name.into(),
            postal_address: None,
            bonus_points_balance: None,
            preferred_store: None,
            shopping_lists: Vec::new(),
        }
    }

    /// Parses and validates a record from the source system's JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let record: Self = serde_json::from_str(json)?;
        record.validate()?;
        Ok(record)
    }

    /// Declared kind of the incoming customer.
    #[must_use]
    pub const fn kind(&self) -> CustomerKind {
        CustomerKind::from_is_company(self.is_company)
    }

    /// Checks the identity invariants: a non-empty external id, and a
    /// company number present exactly when the record is a company.
    pub fn validate(&self) -> Result<()> {
        if self.external_id.as_str().is_empty() {
            return Err(Error::InvalidRecord("external id is empty".into()));
        }
        match (self.is_company, &self.company_number) {
            (true, None) => Err(Error::InvalidRecord(format!(
                "company {} has no company number",
                self.external_id
            ))),
            (false, Some(_)) => Err(Error::InvalidRecord(format!(
                "person {} carries a company number",
                self.external_id
            ))),
            _ => Ok(()),
        }
    }
}

/// A customer as persisted in the customer store.
///
/// `internal_id` is `None` until the store has created the record; its
/// presence is the only signal that the record already exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalRecord {
    pub internal_id: Option<InternalId>,
    pub external_id: Option<ExternalId>,
    /// External id of the canonical record of this record's duplicate cluster.
    pub master_external_id: Option<ExternalId>,
    /// Set once on creation. Name-only duplicates never get one.
    pub kind: Option<CustomerKind>,
    pub company_number: Option<CompanyNumber>,
    pub name: String,
    pub address: Option<Address>,
    pub bonus_points_balance: Option<i64>,
    pub preferred_store: Option<String>,
    pub shopping_lists: Vec<ShoppingList>,
}

impl InternalRecord {
    /// A not-yet-persisted record attached to the cluster of `external_id`.
    #[must_use]
    pub fn in_cluster(external_id: &ExternalId) -> Self {
        Self {
            external_id: Some(external_id.clone()),
            master_external_id: Some(external_id.clone()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_persisted(&self) -> bool {
        self.internal_id.is_some()
    }

    /// Points both the external id and the master external id at `external_id`.
    pub fn link_to(&mut self, external_id: &ExternalId) {
        self.external_id = Some(external_id.clone());
        self.master_external_id = Some(external_id.clone());
    }

    /// Appends a shopping list unless an equal one is already attached.
    /// Returns `true` if the list was added.
    pub fn add_shopping_list(&mut self, list: &ShoppingList) -> bool {
        if self.shopping_lists.contains(list) {
            return false;
        }
        self.shopping_lists.push(list.clone());
        true
    }
}
