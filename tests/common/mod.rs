#![allow(dead_code)]

use async_trait::async_trait;
use pagecrate::{PageError, PageStore, PaginatingQueryBuilder, ResultMode};
use sea_orm::sea_query::{Alias, IntoTableRef, SqliteQueryBuilder, TableRef};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection, DbErr};
use sea_orm_migration::prelude::*;
use std::sync::Mutex;

pub mod customer;

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;

    Ok(db)
}

pub async fn insert_customer(
    db: &DatabaseConnection,
    name: &str,
    status: &str,
    email: Option<&str>,
    company_id: i32,
) -> Result<customer::Model, DbErr> {
    customer::ActiveModel {
        name: Set(name.to_string()),
        status: Set(status.to_string()),
        email: Set(email.map(str::to_string)),
        company_id: Set(company_id),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Insert `count` customers named `Customer 01`, `Customer 02`, ...
/// Every third one is archived, every fifth one has no email.
pub async fn seed_numbered_customers(db: &DatabaseConnection, count: usize) -> Result<(), DbErr> {
    for i in 1..=count {
        let status = if i % 3 == 0 { "archived" } else { "active" };
        let email = format!("customer{i}@example.com");
        let email = if i % 5 == 0 { None } else { Some(email.as_str()) };
        insert_customer(db, &format!("Customer {i:02}"), status, email, 1).await?;
    }
    Ok(())
}

pub struct Migrator;

#[async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateCustomerTable)]
    }
}

pub struct CreateCustomerTable;

impl MigrationName for CreateCustomerTable {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_customer_table"
    }
}

#[async_trait]
impl MigrationTrait for CreateCustomerTable {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let table = Table::create()
            .table(CustomerEntity)
            .if_not_exists()
            .col(
                ColumnDef::new(CustomerColumn::Id)
                    .integer()
                    .not_null()
                    .auto_increment()
                    .primary_key(),
            )
            .col(ColumnDef::new(CustomerColumn::Name).string().not_null())
            .col(ColumnDef::new(CustomerColumn::Status).string().not_null())
            .col(ColumnDef::new(CustomerColumn::Email).string().null())
            .col(ColumnDef::new(CustomerColumn::CompanyId).integer().not_null())
            .to_owned();

        manager.create_table(table).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomerEntity).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum CustomerColumn {
    Id,
    Name,
    Status,
    Email,
    CompanyId,
}

impl Iden for CustomerColumn {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(
            s,
            "{}",
            match self {
                Self::Id => "id",
                Self::Name => "name",
                Self::Status => "status",
                Self::Email => "email",
                Self::CompanyId => "company_id",
            }
        )
        .unwrap();
    }
}

#[derive(Debug)]
pub struct CustomerEntity;

impl Iden for CustomerEntity {
    fn unquoted(&self, s: &mut dyn std::fmt::Write) {
        write!(s, "customers").unwrap();
    }
}

// ============================================================================
// Recording store: canned rows, every executed query kept for inspection
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Query {
        sql: String,
        offset: Option<u64>,
        limit: Option<u64>,
        mode: ResultMode,
    },
    Count {
        sql: String,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum CountOutcome {
    Rows(u64),
    NoResult,
    NonUnique,
    Fail,
}

pub struct RecordingStore {
    rows: u32,
    count: CountOutcome,
    fail_queries: bool,
    calls: Mutex<Vec<Call>>,
}

impl RecordingStore {
    /// Every fetch returns `rows` rows, numbered from 0.
    pub fn returning(rows: u32) -> Self {
        Self {
            rows,
            count: CountOutcome::NoResult,
            fail_queries: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_count(mut self, count: CountOutcome) -> Self {
        self.count = count;
        self
    }

    pub fn failing_queries(mut self) -> Self {
        self.fail_queries = true;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Count { .. }))
            .count()
    }

    pub fn query_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Query { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PageStore for RecordingStore {
    type Row = u32;

    fn table(&self) -> TableRef {
        Alias::new("customers").into_table_ref()
    }

    fn columns(&self) -> Vec<String> {
        vec!["id".to_string(), "name".to_string()]
    }

    async fn execute_query(
        &self,
        query: &PaginatingQueryBuilder,
        mode: ResultMode,
    ) -> Result<Vec<u32>, PageError> {
        self.record(Call::Query {
            sql: query.statement().to_string(SqliteQueryBuilder),
            offset: query.offset(),
            limit: query.limit(),
            mode,
        });
        if self.fail_queries {
            return Err(DbErr::Custom("connection reset".to_string()).into());
        }
        Ok((0..self.rows).collect())
    }

    async fn execute_count(&self, query: &PaginatingQueryBuilder) -> Result<u64, PageError> {
        self.record(Call::Count {
            sql: query.statement().to_string(SqliteQueryBuilder),
        });
        match self.count {
            CountOutcome::Rows(total) => Ok(total),
            CountOutcome::NoResult => Err(PageError::NoResult),
            CountOutcome::NonUnique => Err(PageError::NonUniqueResult { rows: 2 }),
            CountOutcome::Fail => Err(DbErr::Custom("count timed out".to_string()).into()),
        }
    }
}
