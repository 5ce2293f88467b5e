use contracts::domain::a001_customer::Customer;
use contracts::domain::a002_unit::Unit;
use contracts::domain::a003_part::Part;
use contracts::domain::a004_service_event::ServiceEvent;
use contracts::domain::a005_part_purchase::PartPurchase;
use contracts::domain::common::AggregateRoot;
use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

const CREATE_CUSTOMER_TABLE: &str = r#"
    CREATE TABLE a001_customer (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL,
        name TEXT NOT NULL,
        comment TEXT,
        phone TEXT,
        email TEXT,
        street TEXT,
        city TEXT,
        zip TEXT,
        country TEXT,
        status TEXT NOT NULL DEFAULT 'lead',
        source TEXT,
        next_action_at TEXT,
        is_hot INTEGER NOT NULL DEFAULT 0,
        is_deleted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

const CREATE_UNIT_TABLE: &str = r#"
    CREATE TABLE a002_unit (
        id TEXT PRIMARY KEY NOT NULL,
        serial_number TEXT NOT NULL,
        model TEXT NOT NULL DEFAULT '',
        comment TEXT,
        status TEXT NOT NULL DEFAULT 'in_stock',
        prep_status TEXT NOT NULL DEFAULT 'not_assembled',
        warehouse_location TEXT,
        customer_id TEXT,
        purchase_price REAL,
        purchase_currency TEXT NOT NULL DEFAULT 'CZK',
        purchase_date TEXT,
        sale_date TEXT,
        sale_price REAL,
        currency TEXT NOT NULL DEFAULT 'CZK',
        vat_rate REAL,
        is_deleted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

const CREATE_PART_TABLE: &str = r#"
    CREATE TABLE a003_part (
        id TEXT PRIMARY KEY NOT NULL,
        part_number TEXT NOT NULL,
        name TEXT NOT NULL,
        comment TEXT,
        category TEXT,
        stock_qty INTEGER NOT NULL DEFAULT 0,
        purchase_price REAL,
        sale_price REAL,
        currency TEXT NOT NULL DEFAULT 'CZK',
        drawing_position INTEGER,
        is_deleted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

const CREATE_SERVICE_EVENT_TABLE: &str = r#"
    CREATE TABLE a004_service_event (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL,
        title TEXT NOT NULL,
        comment TEXT,
        customer_id TEXT NOT NULL,
        unit_id TEXT,
        performed_at TEXT NOT NULL,
        details TEXT,
        event_type TEXT,
        labor_cost REAL,
        material_cost REAL,
        total_cost REAL,
        currency TEXT NOT NULL DEFAULT 'CZK',
        is_deleted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

const CREATE_PART_PURCHASE_TABLE: &str = r#"
    CREATE TABLE a005_part_purchase (
        id TEXT PRIMARY KEY NOT NULL,
        code TEXT NOT NULL,
        comment TEXT,
        customer_id TEXT NOT NULL,
        part_id TEXT NOT NULL,
        service_event_id TEXT,
        purchased_at TEXT NOT NULL,
        quantity REAL NOT NULL DEFAULT 1,
        unit_price REAL NOT NULL,
        currency TEXT NOT NULL DEFAULT 'CZK',
        vat_rate REAL NOT NULL DEFAULT 21,
        is_deleted INTEGER NOT NULL DEFAULT 0,
        created_at TEXT,
        updated_at TEXT,
        version INTEGER NOT NULL DEFAULT 0
    );
"#;

// Natural keys are unique among live rows only, so soft-deleted numbers can be reused
const CREATE_INDEXES: [&str; 5] = [
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_a002_unit_serial ON a002_unit (serial_number) WHERE is_deleted = 0;",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_a003_part_number ON a003_part (part_number) WHERE is_deleted = 0;",
    "CREATE INDEX IF NOT EXISTS idx_a002_unit_customer ON a002_unit (customer_id);",
    "CREATE INDEX IF NOT EXISTS idx_a004_service_event_customer ON a004_service_event (customer_id);",
    "CREATE INDEX IF NOT EXISTS idx_a005_part_purchase_customer ON a005_part_purchase (customer_id);",
];

pub async fn initialize_database(db_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    tracing::info!("Connecting to database: {}", absolute_path.display());
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

/// Creates missing tables and indexes. Safe to run on every start.
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    ensure_table(conn, &Customer::full_name(), CREATE_CUSTOMER_TABLE).await?;
    ensure_table(conn, &Unit::full_name(), CREATE_UNIT_TABLE).await?;
    ensure_table(conn, &Part::full_name(), CREATE_PART_TABLE).await?;
    ensure_table(conn, &ServiceEvent::full_name(), CREATE_SERVICE_EVENT_TABLE).await?;
    ensure_table(conn, &PartPurchase::full_name(), CREATE_PART_PURCHASE_TABLE).await?;

    for sql in CREATE_INDEXES {
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await?;
    }
    Ok(())
}

async fn ensure_table(conn: &DatabaseConnection, table: &str, create_sql: &str) -> anyhow::Result<()> {
    let existing = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type='table' AND name=?;",
            [table.into()],
        ))
        .await?;

    if existing.is_empty() {
        tracing::info!("Creating {} table", table);
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            create_sql.to_string(),
        ))
        .await?;
    } else {
        tracing::debug!("Table {} already exists", table);
    }
    Ok(())
}

/// Private in-memory database with the full schema. One pooled connection,
/// since every SQLite `:memory:` connection is a separate database.
#[cfg(test)]
pub async fn connect_in_memory() -> anyhow::Result<DatabaseConnection> {
    let mut options = sea_orm::ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    bootstrap_schema(&conn).await?;
    Ok(conn)
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}
