use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, ColumnType, ConnectionTrait, DatabaseConnection, EntityTrait, IdenStatic,
    Iterable, sea_query::TableRef,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::marker::PhantomData;

use crate::errors::PageError;
use crate::filtering::PaginatingQueryBuilder;
use crate::filtering::query_builder::COUNT_ALIAS;
use crate::models::ResultMode;

/// Execution boundary of the pagination core.
///
/// The repository only builds queries; running them and shaping the rows is
/// up to the store. A COUNT query must yield exactly one row: zero rows are
/// reported as [`PageError::NoResult`], several as
/// [`PageError::NonUniqueResult`].
#[async_trait]
pub trait PageStore: Send + Sync {
    type Row: Send;

    /// Table the queries select from.
    fn table(&self) -> TableRef;

    /// Columns projected when fetching rows.
    fn columns(&self) -> Vec<String>;

    /// Columns holding UUIDs. String criteria on any other column bind as text.
    fn uuid_columns(&self) -> Vec<String> {
        Vec::new()
    }

    async fn execute_query(
        &self,
        query: &PaginatingQueryBuilder,
        mode: ResultMode,
    ) -> Result<Vec<Self::Row>, PageError>;

    async fn execute_count(&self, query: &PaginatingQueryBuilder) -> Result<u64, PageError>;
}

/// A fetched row, shaped by the requested [`ResultMode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Hydrated<M> {
    Model(M),
    Json(JsonValue),
}

impl<M> Hydrated<M> {
    #[must_use]
    pub fn into_model(self) -> Option<M> {
        match self {
            Self::Model(model) => Some(model),
            Self::Json(_) => None,
        }
    }

    #[must_use]
    pub const fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Self::Json(value) => Some(value),
            Self::Model(_) => None,
        }
    }
}

/// [`PageStore`] over a Sea-ORM connection for entity `E`.
pub struct SeaOrmStore<E> {
    db: DatabaseConnection,
    entity: PhantomData<fn() -> E>,
}

impl<E: EntityTrait> SeaOrmStore<E> {
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            entity: PhantomData,
        }
    }

    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    #[must_use]
    pub fn into_connection(self) -> DatabaseConnection {
        self.db
    }
}

#[async_trait]
impl<E> PageStore for SeaOrmStore<E>
where
    E: EntityTrait,
    E::Model: Sync,
{
    type Row = Hydrated<E::Model>;

    fn table(&self) -> TableRef {
        E::default().table_ref()
    }

    fn columns(&self) -> Vec<String> {
        E::Column::iter().map(|c| c.as_str().to_string()).collect()
    }

    fn uuid_columns(&self) -> Vec<String> {
        E::Column::iter()
            .filter(|c| matches!(c.def().get_column_type(), ColumnType::Uuid))
            .map(|c| c.as_str().to_string())
            .collect()
    }

    async fn execute_query(
        &self,
        query: &PaginatingQueryBuilder,
        mode: ResultMode,
    ) -> Result<Vec<Self::Row>, PageError> {
        let statement = query.build(self.db.get_database_backend());
        let rows = match mode {
            ResultMode::Model => E::find()
                .from_raw_sql(statement)
                .all(&self.db)
                .await?
                .into_iter()
                .map(Hydrated::Model)
                .collect(),
            ResultMode::Json => E::find()
                .from_raw_sql(statement)
                .into_json()
                .all(&self.db)
                .await?
                .into_iter()
                .map(Hydrated::Json)
                .collect(),
        };
        Ok(rows)
    }

    async fn execute_count(&self, query: &PaginatingQueryBuilder) -> Result<u64, PageError> {
        let statement = query.build(self.db.get_database_backend());
        let rows = self.db.query_all(statement).await?;
        match rows.as_slice() {
            [] => Err(PageError::NoResult),
            [row] => {
                let count: i64 = row.try_get("", COUNT_ALIAS)?;
                Ok(u64::try_from(count).unwrap_or_default())
            }
            _ => Err(PageError::NonUniqueResult { rows: rows.len() }),
        }
    }
}
