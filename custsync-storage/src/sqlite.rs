//! SQLite-backed customer store.
//!
//! One row per customer, one row per attached shopping list. Addresses and
//! list contents are stored as JSON text.

use crate::config::StoreConfig;
use crate::error::{StorageError, StorageResult};
use crate::CustomerStore;
use custsync_types::{
    Address, CompanyNumber, CustomerKind, ExternalId, InternalId, InternalRecord, ShoppingList,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const CUSTOMER_COLUMNS: &str = "internal_id, external_id, master_external_id, kind, \
     company_number, name, address, bonus_points_balance, preferred_store";

/// Customer store backed by SQLite.
pub struct SqliteCustomerStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCustomerStore {
    /// Opens a store as described by `config`.
    pub fn open(config: &StoreConfig) -> StorageResult<Self> {
        let conn = match &config.path {
            Some(path) => Connection::open(path)?,
            None => Connection::open_in_memory()?,
        };
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        info!(
            "Opened customer store at {}",
            config
                .path
                .as_deref()
                .map_or_else(|| ":memory:".to_string(), |p| p.display().to_string())
        );
        Ok(store)
    }

    /// Opens (or creates) a store at the given path.
    pub fn new(path: &Path) -> StorageResult<Self> {
        Self::open(&StoreConfig::at(path))
    }

    /// Opens an in-memory store (for testing).
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::open(&StoreConfig::default())
    }

    /// Returns the number of stored customers.
    pub fn count(&self) -> StorageResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM customers", [], |row| row.get(0))?;
        usize::try_from(count)
            .map_err(|_| StorageError::InvalidData(format!("invalid customer count {count}")))
    }

    /// Loads a customer by internal id.
    pub fn get(&self, id: InternalId) -> StorageResult<Option<InternalRecord>> {
        let conn = self.lock()?;
        let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE internal_id = ?1");
        let row = conn
            .query_row(&sql, params![id.to_string()], read_row)
            .optional()?;
        row.map(|raw| hydrate(&conn, raw)).transpose()
    }

    fn init_schema(&self) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS customers (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                internal_id TEXT NOT NULL UNIQUE,
                external_id TEXT,
                master_external_id TEXT,
                kind TEXT,
                company_number TEXT,
                name TEXT NOT NULL,
                address TEXT,
                bonus_points_balance INTEGER,
                preferred_store TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_customers_external_id ON customers(external_id);
            CREATE INDEX IF NOT EXISTS idx_customers_master_external_id ON customers(master_external_id);
            CREATE INDEX IF NOT EXISTS idx_customers_company_number ON customers(company_number);

            CREATE TABLE IF NOT EXISTS shopping_lists (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                customer_id TEXT NOT NULL,
                products TEXT NOT NULL,
                UNIQUE(customer_id, products)
            );
            ",
        )?;
        Ok(())
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }

    fn find_one(&self, sql: &str, key: &str) -> StorageResult<Option<InternalRecord>> {
        let conn = self.lock()?;
        let row = conn.query_row(sql, params![key], read_row).optional()?;
        row.map(|raw| hydrate(&conn, raw)).transpose()
    }
}

impl CustomerStore for SqliteCustomerStore {
    fn find_by_external_id(&self, external_id: &ExternalId) -> StorageResult<Option<InternalRecord>> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS},
                CASE
                    WHEN kind IS NOT NULL AND master_external_id = ?1 THEN 0
                    WHEN kind IS NOT NULL THEN 1
                    ELSE 2
                END AS tier
             FROM customers WHERE external_id = ?1
             ORDER BY tier, CASE WHEN tier = 0 THEN -seq ELSE seq END
             LIMIT 1"
        );
        self.find_one(&sql, external_id.as_str())
    }

    fn find_by_company_number(
        &self,
        company_number: &CompanyNumber,
    ) -> StorageResult<Option<InternalRecord>> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE company_number = ?1 ORDER BY seq ASC LIMIT 1"
        );
        self.find_one(&sql, company_number.as_str())
    }

    fn find_by_master_external_id(
        &self,
        external_id: &ExternalId,
    ) -> StorageResult<Option<InternalRecord>> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE master_external_id = ?1 ORDER BY seq DESC LIMIT 1"
        );
        self.find_one(&sql, external_id.as_str())
    }

    fn create(&self, mut record: InternalRecord) -> StorageResult<InternalRecord> {
        if let Some(id) = record.internal_id {
            return Err(StorageError::InvalidData(format!(
                "record {id} already has an internal id"
            )));
        }
        let id = InternalId::new();
        record.internal_id = Some(id);

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute(
            &format!("INSERT INTO customers ({CUSTOMER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                id.to_string(),
                record.external_id.as_ref().map(ExternalId::as_str),
                record.master_external_id.as_ref().map(ExternalId::as_str),
                record.kind.map(|k| k.label()),
                record.company_number.as_ref().map(CompanyNumber::as_str),
                record.name,
                encode_address(record.address.as_ref())?,
                record.bonus_points_balance,
                record.preferred_store,
            ],
        )?;
        write_lists(&tx, id, &record.shopping_lists)?;
        tx.commit()?;

        debug!("Created customer {id}");
        Ok(record)
    }

    fn update(&self, record: InternalRecord) -> StorageResult<InternalRecord> {
        let id = record.internal_id.ok_or_else(|| {
            StorageError::InvalidData("cannot update a record without an internal id".into())
        })?;

        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let changed = tx.execute(
            "UPDATE customers SET external_id = ?2, master_external_id = ?3, kind = ?4,
                company_number = ?5, name = ?6, address = ?7, bonus_points_balance = ?8,
                preferred_store = ?9
             WHERE internal_id = ?1",
            params![
                id.to_string(),
                record.external_id.as_ref().map(ExternalId::as_str),
                record.master_external_id.as_ref().map(ExternalId::as_str),
                record.kind.map(|k| k.label()),
                record.company_number.as_ref().map(CompanyNumber::as_str),
                record.name,
                encode_address(record.address.as_ref())?,
                record.bonus_points_balance,
                record.preferred_store,
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound(id.to_string()));
        }
        tx.execute(
            "DELETE FROM shopping_lists WHERE customer_id = ?1",
            params![id.to_string()],
        )?;
        write_lists(&tx, id, &record.shopping_lists)?;
        tx.commit()?;

        debug!("Updated customer {id}");
        Ok(record)
    }

    fn attach_shopping_list(
        &self,
        record: &mut InternalRecord,
        list: &ShoppingList,
    ) -> StorageResult<()> {
        if !record.add_shopping_list(list) {
            return Ok(());
        }
        let Some(id) = record.internal_id else {
            return Ok(());
        };
        let conn = self.lock()?;
        conn.execute(
            "INSERT OR IGNORE INTO shopping_lists (customer_id, products) VALUES (?1, ?2)",
            params![id.to_string(), serde_json::to_string(&list.products)?],
        )?;
        debug!("Attached shopping list ({} products) to customer {id}", list.products.len());
        Ok(())
    }
}

/// Columns of a `customers` row before shopping lists are loaded.
struct RawCustomer {
    internal_id: String,
    external_id: Option<String>,
    master_external_id: Option<String>,
    kind: Option<String>,
    company_number: Option<String>,
    name: String,
    address: Option<String>,
    bonus_points_balance: Option<i64>,
    preferred_store: Option<String>,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<RawCustomer> {
    Ok(RawCustomer {
        internal_id: row.get(0)?,
        external_id: row.get(1)?,
        master_external_id: row.get(2)?,
        kind: row.get(3)?,
        company_number: row.get(4)?,
        name: row.get(5)?,
        address: row.get(6)?,
        bonus_points_balance: row.get(7)?,
        preferred_store: row.get(8)?,
    })
}

fn hydrate(conn: &Connection, raw: RawCustomer) -> StorageResult<InternalRecord> {
    let id = InternalId::parse(&raw.internal_id).map_err(|e| {
        StorageError::InvalidData(format!("invalid internal_id {}: {e}", raw.internal_id))
    })?;
    let kind = raw.kind.as_deref().map(parse_kind).transpose()?;
    let address = raw
        .address
        .as_deref()
        .map(serde_json::from_str::<Address>)
        .transpose()?;

    Ok(InternalRecord {
        internal_id: Some(id),
        external_id: raw.external_id.map(ExternalId::from),
        master_external_id: raw.master_external_id.map(ExternalId::from),
        kind,
        company_number: raw.company_number.map(CompanyNumber::from),
        name: raw.name,
        address,
        bonus_points_balance: raw.bonus_points_balance,
        preferred_store: raw.preferred_store,
        shopping_lists: load_lists(conn, id)?,
    })
}

fn load_lists(conn: &Connection, id: InternalId) -> StorageResult<Vec<ShoppingList>> {
    let mut stmt =
        conn.prepare("SELECT products FROM shopping_lists WHERE customer_id = ?1 ORDER BY seq")?;
    let rows = stmt.query_map(params![id.to_string()], |row| row.get::<_, String>(0))?;

    let mut lists = Vec::new();
    for products in rows {
        lists.push(ShoppingList {
            products: serde_json::from_str(&products?)?,
        });
    }
    Ok(lists)
}

fn write_lists(conn: &Connection, id: InternalId, lists: &[ShoppingList]) -> StorageResult<()> {
    for list in lists {
        conn.execute(
            "INSERT OR IGNORE INTO shopping_lists (customer_id, products) VALUES (?1, ?2)",
            params![id.to_string(), serde_json::to_string(&list.products)?],
        )?;
    }
    Ok(())
}

fn encode_address(address: Option<&Address>) -> StorageResult<Option<String>> {
    Ok(address.map(serde_json::to_string).transpose()?)
}

fn parse_kind(label: &str) -> StorageResult<CustomerKind> {
    match label {
        "Person" => Ok(CustomerKind::Person),
        "Company" => Ok(CustomerKind::Company),
        other => Err(StorageError::InvalidData(format!("unknown customer kind: {other}"))),
    }
}
