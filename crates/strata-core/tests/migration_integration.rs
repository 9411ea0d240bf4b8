//! Integration tests for migration generation and chain application.

use std::convert::Infallible;
use strata_core::catalog::{ColumnDef, IndexDef, SchemaVersion, StorageType, TableDef};
use strata_core::migration::{
    diff, Generator, MigrationError, MigrationPlan, MigrationStep, MigrationTarget, RenameMapping,
};
use strata_core::GeneratorConfig;

const NAMESPACE: &str = "com.example.db";

/// Records every executed statement.
#[derive(Default)]
struct RecordingTarget {
    statements: Vec<String>,
}

impl MigrationTarget for RecordingTarget {
    type Error = Infallible;

    fn execute(&mut self, step: &MigrationStep) -> Result<(), Self::Error> {
        self.statements.push(step.to_sql());
        Ok(())
    }
}

fn employee() -> TableDef {
    TableDef::new("Employee")
        .with_column(ColumnDef::id("id"))
        .with_column(ColumnDef::new("name", StorageType::Text))
}

fn team() -> TableDef {
    TableDef::new("Team")
        .with_column(ColumnDef::id("id"))
        .with_column(ColumnDef::new("name", StorageType::Text))
}

fn staff() -> TableDef {
    TableDef {
        name: "Staff".into(),
        table_name: "Staff".into(),
        ..employee().with_column(ColumnDef::new("age", StorageType::Integer))
    }
}

fn history() -> Vec<SchemaVersion> {
    vec![
        SchemaVersion::new(1, NAMESPACE).with_table(employee()),
        SchemaVersion::new(2, NAMESPACE)
            .with_table(employee().with_column(ColumnDef::new("age", StorageType::Integer)))
            .with_table(team()),
        SchemaVersion::new(3, NAMESPACE)
            .with_table(staff())
            .with_table(team()),
    ]
}

fn generator() -> Generator {
    Generator::new(GeneratorConfig::default())
        .with_schemas(history())
        .with_renames(RenameMapping::new(2, 3).with_rename("Employee", "Staff"))
}

#[test]
fn test_end_to_end_plans() {
    let generated = generator().generate().unwrap();

    assert_eq!(generated.current_version, 3);
    assert_eq!(
        generated.plan(1, 2).unwrap().steps,
        vec![
            MigrationStep::CreateTable {
                table: "Team".into(),
                primary_key: "\"id\" INTEGER PRIMARY KEY AUTOINCREMENT".into(),
            },
            MigrationStep::AddColumn {
                table: "Team".into(),
                column: "name".into(),
                definition: "\"name\" TEXT".into(),
            },
            MigrationStep::AddColumn {
                table: "Employee".into(),
                column: "age".into(),
                definition: "\"age\" INTEGER".into(),
            },
        ]
    );
    assert_eq!(
        generated.plan(2, 3).unwrap().steps,
        vec![MigrationStep::RenameTable {
            from: "Employee".into(),
            to: "Staff".into(),
        }]
    );
}

#[test]
fn test_end_to_end_chain_apply() {
    let generated = generator().generate().unwrap();
    let newest = generated.chain.find(3).unwrap();
    let mut target = RecordingTarget::default();

    let version = generated.chain.apply(newest, &mut target, 1).unwrap();

    assert_eq!(version, 3);
    assert_eq!(
        target.statements,
        vec![
            "CREATE TABLE IF NOT EXISTS \"Team\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT)",
            "ALTER TABLE \"Team\" ADD COLUMN \"name\" TEXT",
            "ALTER TABLE \"Employee\" ADD COLUMN \"age\" INTEGER",
            "ALTER TABLE \"Employee\" RENAME TO \"Staff\"",
        ]
    );
}

#[test]
fn test_apply_from_intermediate_version_skips_passed_transitions() {
    let schemas = vec![
        SchemaVersion::new(1, NAMESPACE).with_table(employee()),
        SchemaVersion::new(2, NAMESPACE)
            .with_table(employee())
            .with_table(team()),
        SchemaVersion::new(3, NAMESPACE)
            .with_table(employee().with_index(IndexDef::new("IDX_EMPLOYEE_NAME", "name")))
            .with_table(team()),
        SchemaVersion::new(4, NAMESPACE)
            .with_table(employee().with_index(IndexDef::new("IDX_EMPLOYEE_NAME", "name"))),
    ];
    let generated = Generator::default().with_schemas(schemas).generate().unwrap();

    for start in 1..4 {
        let mut target = RecordingTarget::default();
        let version = generated.upgrade(&mut target, start).unwrap();
        assert_eq!(version, 4);

        let expected: Vec<String> = generated
            .chain
            .plans()
            .filter(|p| p.from_version >= start)
            .flat_map(MigrationPlan::statements)
            .collect();
        assert_eq!(target.statements, expected, "upgrade from v{}", start);
    }

    let mut target = RecordingTarget::default();
    assert_eq!(generated.upgrade(&mut target, 4).unwrap(), 4);
    assert!(target.statements.is_empty());
}

#[test]
fn test_bootstrap_creates_current_schema() {
    let generated = generator().generate().unwrap();
    let mut target = RecordingTarget::default();

    assert_eq!(generated.upgrade(&mut target, 0).unwrap(), 3);
    assert_eq!(
        target.statements,
        vec![
            "CREATE TABLE IF NOT EXISTS \"Staff\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT)",
            "ALTER TABLE \"Staff\" ADD COLUMN \"name\" TEXT",
            "ALTER TABLE \"Staff\" ADD COLUMN \"age\" INTEGER",
            "CREATE TABLE IF NOT EXISTS \"Team\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT)",
            "ALTER TABLE \"Team\" ADD COLUMN \"name\" TEXT",
        ]
    );
}

#[test]
fn test_downgrade_rejected() {
    let generated = generator().generate().unwrap();
    let mut target = RecordingTarget::default();

    let err = generated.upgrade(&mut target, 5).unwrap_err();
    assert!(matches!(
        err,
        MigrationError::Downgrade {
            from_version: 5,
            to_version: 3
        }
    ));
}

#[test]
fn test_rename_is_exclusive_with_create_and_drop() {
    let schemas = history();
    let mapping = RenameMapping::new(2, 3).with_rename("Employee", "Staff");

    let renamed = diff::renamed(&schemas[1], &schemas[2], Some(&mapping));
    let pairs: Vec<_> = renamed
        .iter()
        .map(|p| (p.from.name.as_str(), p.to.name.as_str()))
        .collect();
    assert_eq!(pairs, vec![("Employee", "Staff")]);

    let added = diff::added(&schemas[1], &schemas[2], Some(&mapping));
    let removed = diff::removed(&schemas[1], &schemas[2], Some(&mapping));
    assert!(added.is_empty());
    assert!(removed.is_empty());
}

#[test]
fn test_constraint_drift_blocks_generation() {
    let schemas = vec![
        SchemaVersion::new(1, NAMESPACE).with_table(employee()),
        SchemaVersion::new(2, NAMESPACE).with_table(
            TableDef::new("Employee")
                .with_column(ColumnDef::id("id"))
                .with_column(ColumnDef::new("name", StorageType::Text).unique()),
        ),
        SchemaVersion::new(3, NAMESPACE).with_table(
            TableDef::new("Employee")
                .with_column(ColumnDef::id("id"))
                .with_column(ColumnDef::new("name", StorageType::Blob)),
        ),
    ];

    let err = Generator::default().with_schemas(schemas).generate().unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("2 column definition(s) changed"));
    assert!(message.contains("Employee.name"));
}

#[test]
fn test_plans_are_stable_across_runs() {
    let first = generator().generate().unwrap();
    let second = generator().generate().unwrap();

    let fingerprints = |g: &strata_core::GeneratedMigrations| {
        g.chain.plans().map(MigrationPlan::fingerprint).collect::<Vec<_>>()
    };
    assert_eq!(fingerprints(&first), fingerprints(&second));
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}
