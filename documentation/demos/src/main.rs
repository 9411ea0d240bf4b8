//! Company schema demo.
//!
//! Builds a five-version schema history with two rename transitions, logs
//! every generated statement, then upgrades a SQLite database holding version
//! 1 data to the newest version.

use std::path::PathBuf;

use clap::Parser;
use rusqlite::Connection;
use strata_core::catalog::{ColumnDef, IndexDef, SchemaVersion, StorageType, TableDef};
use strata_core::migration::{GeneratedMigrations, Generator, RenameMapping};
use strata_core::GeneratorConfig;
use strata_sqlite::{schema_version, SqliteUpgrader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const NAMESPACE: &str = "com.example.company";

#[derive(Parser, Debug)]
#[command(name = "company-demo")]
#[command(version, about = "Strata company schema demo", long_about = None)]
struct Args {
    /// SQLite database file. Uses an in-memory database when omitted.
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Print the JSON migration manifest to stdout.
    #[arg(long)]
    json: bool,

    /// Refuse multi-column indexes.
    #[arg(long)]
    strict_indexes: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "company_demo=info,strata_core=info,strata_sqlite=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = GeneratorConfig::default().with_strict_indexes(args.strict_indexes);

    let generated = Generator::new(config.clone())
        .with_schemas([v1(), v2(), v3(), v4(), v5()])
        .with_renames(RenameMapping::new(3, 4).with_rename("Function", "Department"))
        .with_renames(
            RenameMapping::new(4, 5)
                .with_rename("Department", "Function")
                .with_rename("Company", "Organization"),
        )
        .generate()?;

    log_plans(&generated);

    if args.json {
        println!("{}", generated.to_json()?);
    }

    let mut conn = match &args.database {
        Some(path) => Connection::open(path)?,
        None => Connection::open_in_memory()?,
    };

    if schema_version(&conn)? == 0 {
        let initial = Generator::new(config).with_schema(v1()).generate()?;
        SqliteUpgrader::new(initial).upgrade(&mut conn)?;
        seed(&conn)?;
    }

    let version = SqliteUpgrader::new(generated).upgrade(&mut conn)?;
    let tables = tables(&conn)?;
    info!(version, ?tables, "Database ready");

    Ok(())
}

fn log_plans(generated: &GeneratedMigrations) {
    for plan in generated.chain.plans() {
        info!(
            name = %plan.name,
            steps = plan.step_count(),
            fingerprint = %plan.fingerprint(),
            "Migration"
        );
        for statement in plan.statements() {
            info!("  {}", statement);
        }
    }
    info!(
        name = %generated.bootstrap.name,
        steps = generated.bootstrap.step_count(),
        "Bootstrap"
    );
}

fn seed(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        INSERT INTO "Company" ("companyCode", "name") VALUES ('ACME', 'Acme Corp');
        INSERT INTO "Function" ("functionCode", "name", "companyId") VALUES ('ENG', 'Engineering', 1);
        INSERT INTO "Employee" ("employeeId", "designation", "name", "age", "functionId")
            VALUES ('E-001', 'Engineer', 'Ada', 36, 1);
        "#,
    )
}

fn tables(conn: &Connection) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )?;
    let rows = stmt.query_map([], |row| row.get(0))?;
    rows.collect()
}

fn text(name: &str) -> ColumnDef {
    ColumnDef::new(name, StorageType::Text)
}

fn integer(name: &str) -> ColumnDef {
    ColumnDef::new(name, StorageType::Integer)
}

fn company(name: &str, with_address: bool, with_incorporation: bool) -> TableDef {
    let mut table = TableDef::new(name)
        .with_column(ColumnDef::id("id"))
        .with_column(text("companyCode").not_null())
        .with_column(text("name").not_null());
    if with_address {
        table = table.with_column(text("address"));
    }
    if with_incorporation {
        table = table.with_column(integer("incorporationDate"));
    }
    table.with_index(IndexDef::new("IDX_COMPANY_CODE", "companyCode"))
}

fn function(name: &str) -> TableDef {
    TableDef::new(name)
        .with_column(ColumnDef::id("id"))
        .with_column(text("functionCode").not_null())
        .with_column(text("name").not_null())
        .with_column(integer("companyId").not_null())
}

fn order() -> TableDef {
    TableDef::new("Order")
        .with_column(ColumnDef::id("id"))
        .with_column(text("orderId").not_null())
        .with_column(integer("orderDate").not_null())
        .with_index(IndexDef::new("IDX_ORDER_ID", "orderId"))
}

fn branch() -> TableDef {
    TableDef::new("Branch")
        .with_column(ColumnDef::id("id"))
        .with_column(text("branchCode").not_null())
        .with_column(text("address"))
        .with_column(integer("companyId").not_null())
        .with_index(IndexDef::new("IDX_BRANCH_CODE", "branchCode"))
}

fn team() -> TableDef {
    TableDef::new("Team")
        .with_column(ColumnDef::id("id"))
        .with_column(text("teamCode").not_null())
        .with_column(text("name"))
        .with_column(integer("functionId").not_null())
        .with_column(integer("teamLeadId"))
}

fn employee_v1() -> TableDef {
    TableDef::new("Employee")
        .with_column(ColumnDef::id("id"))
        .with_column(text("employeeId").not_null())
        .with_column(text("designation").not_null())
        .with_column(text("name").not_null())
        .with_column(integer("age"))
        .with_column(text("sex"))
        .with_column(integer("dateOfBirth"))
        .with_column(integer("functionId").not_null())
        .with_index(IndexDef::new("IDX_EMPLOYEE_DESIGNATION", "designation"))
        .with_index(IndexDef::new("IDX_EMPLOYEE_SEX", "sex"))
}

fn employee_v3() -> TableDef {
    TableDef::new("Employee")
        .with_column(ColumnDef::id("id"))
        .with_column(text("employeeId").not_null())
        .with_column(text("designation").not_null())
        .with_column(text("name").not_null())
        .with_column(integer("age"))
        .with_column(text("sex"))
        .with_column(integer("dateOfBirth"))
        .with_column(integer("dateOfJoining"))
        .with_column(text("address"))
        .with_column(integer("teamId"))
        .with_column(integer("companyId"))
}

fn v1() -> SchemaVersion {
    SchemaVersion::new(1, NAMESPACE)
        .with_table(company("Company", true, false))
        .with_table(function("Function"))
        .with_table(employee_v1())
}

fn v2() -> SchemaVersion {
    SchemaVersion::new(2, NAMESPACE)
        .with_table(company("Company", true, true))
        .with_table(function("Function"))
        .with_table(employee_v1().with_column(integer("dateOfJoining")))
        .with_table(order())
}

fn v3() -> SchemaVersion {
    SchemaVersion::new(3, NAMESPACE)
        .with_table(company("Company", false, true))
        .with_table(branch())
        .with_table(function("Function"))
        .with_table(team())
        .with_table(employee_v3())
        .with_table(order())
}

fn v4() -> SchemaVersion {
    SchemaVersion::new(4, NAMESPACE)
        .with_table(company("Company", false, true))
        .with_table(branch())
        .with_table(function("Department"))
        .with_table(team())
        .with_table(
            employee_v3()
                .with_index(IndexDef::new("IDX_EMPLOYEE_DESIGNATION", "designation"))
                .with_index(IndexDef::new("IDX_EMPLOYEE_JOINING", "dateOfJoining")),
        )
}

fn v5() -> SchemaVersion {
    SchemaVersion::new(5, NAMESPACE)
        .with_table(company("Organization", false, true))
        .with_table(branch())
        .with_table(function("Function"))
        .with_table(team())
        .with_table(
            employee_v3()
                .with_index(IndexDef::new("IDX_EMPLOYEE_DESIGNATION", "designation"))
                .with_index(IndexDef::new("IDX_EMPLOYEE_JOINING", "dateOfJoining")),
        )
}
