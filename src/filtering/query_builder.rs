use sea_orm::{
    DatabaseBackend, Statement, Value,
    sea_query::{
        Alias, Asterisk, ColumnRef, Expr, Func, IntoColumnRef, IntoTableRef, Query,
        SelectStatement, SimpleExpr,
    },
};
use uuid::Uuid;

use super::sort::{OrderBy, SortDirection};

/// Column alias of the COUNT projection.
pub const COUNT_ALIAS: &str = "num_items";

/// Largest offset every backend accepts (a signed 64-bit integer).
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

/// A named bound parameter registered by an equality predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    pub name: String,
    pub field: String,
    pub value: Value,
}

/// Query-in-progress over one aliased entity.
///
/// Ordering and pagination are independent steps: `add_order` accumulates,
/// `add_pagination` sets offset and limit. Neither validates its input, the
/// repository gates on `per_page > 0` before paginating.
#[derive(Debug, Clone)]
pub struct PaginatingQueryBuilder {
    statement: SelectStatement,
    alias: String,
    order: Vec<(String, SortDirection)>,
    predicates: usize,
    parameters: Vec<BoundParameter>,
    uuid_columns: Vec<String>,
    offset: Option<u64>,
    limit: Option<u64>,
}

impl PaginatingQueryBuilder {
    /// Start `SELECT ... FROM <table> AS <alias>`.
    pub fn new(table: impl IntoTableRef, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        let mut statement = Query::select();
        statement.from_as(table, Alias::new(&alias));
        Self {
            statement,
            alias,
            order: Vec::new(),
            predicates: 0,
            parameters: Vec::new(),
            uuid_columns: Vec::new(),
            offset: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Columns whose values are UUIDs; strings compared against them bind as UUIDs.
    pub fn set_uuid_columns<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uuid_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn is_uuid_column(&self, field: &str) -> bool {
        self.uuid_columns.iter().any(|c| c == field)
    }

    /// `alias.field`, or bare `field` without an alias.
    #[must_use]
    pub fn column(alias: Option<&str>, field: &str) -> ColumnRef {
        match alias {
            Some(alias) => (Alias::new(alias), Alias::new(field)).into_column_ref(),
            None => Alias::new(field).into_column_ref(),
        }
    }

    /// Project the given columns of the aliased entity.
    pub fn add_select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for column in columns {
            let column = Self::column(Some(&self.alias), column.as_ref());
            self.statement.column(column);
        }
        self
    }

    /// Replace the projection with `COUNT(*) AS num_items`.
    pub fn select_count(&mut self) -> &mut Self {
        self.statement.clear_selects();
        self.statement
            .expr_as(Func::count(Expr::col(Asterisk)), Alias::new(COUNT_ALIAS));
        self
    }

    /// Add one predicate, AND-combined with the others.
    pub fn and_where(&mut self, predicate: SimpleExpr) -> &mut Self {
        self.statement.and_where(predicate);
        self.predicates += 1;
        self
    }

    /// Append one ORDER BY per pair, in sequence order.
    pub fn add_order(&mut self, order_by: &OrderBy, alias: Option<&str>) -> &mut Self {
        for (field, direction) in order_by.iter() {
            self.statement
                .order_by(Self::column(alias, field), direction.into());
            self.order.push((field.to_string(), direction));
        }
        self
    }

    /// `offset = (page - 1) * per_page`, `limit = per_page`. The offset
    /// saturates at [`MAX_OFFSET`].
    pub fn add_pagination(&mut self, page: u64, per_page: u64) -> &mut Self {
        let offset = page
            .saturating_sub(1)
            .checked_mul(per_page)
            .map_or(MAX_OFFSET, |offset| offset.min(MAX_OFFSET));
        self.statement.offset(offset).limit(per_page);
        self.offset = Some(offset);
        self.limit = Some(per_page);
        self
    }

    /// Register `value` under the parameter name of `field` and return the
    /// name. One field always maps to one name inside a query; a hash clash
    /// with another field gets a numeric suffix.
    pub fn bind_parameter(&mut self, field: &str, value: Value) -> String {
        if let Some(existing) = self.parameters.iter_mut().find(|p| p.field == field) {
            existing.value = value;
            return existing.name.clone();
        }

        let base = parameter_name(field);
        let mut name = base.clone();
        let mut suffix = 1;
        while self.parameters.iter().any(|p| p.name == name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }

        self.parameters.push(BoundParameter {
            name: name.clone(),
            field: field.to_string(),
            value,
        });
        name
    }

    #[must_use]
    pub fn parameters(&self) -> &[BoundParameter] {
        &self.parameters
    }

    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.iter().find(|p| p.name == name).map(|p| &p.value)
    }

    #[must_use]
    pub fn predicate_count(&self) -> usize {
        self.predicates
    }

    #[must_use]
    pub fn order_by(&self) -> &[(String, SortDirection)] {
        &self.order
    }

    #[must_use]
    pub const fn offset(&self) -> Option<u64> {
        self.offset
    }

    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    #[must_use]
    pub const fn statement(&self) -> &SelectStatement {
        &self.statement
    }

    #[must_use]
    pub fn build(&self, backend: DatabaseBackend) -> Statement {
        backend.build(&self.statement)
    }
}

/// `f` followed by the first five hex digits of a name-based UUID of the field.
#[must_use]
pub fn parameter_name(field: &str) -> String {
    let digest = Uuid::new_v3(&Uuid::NAMESPACE_OID, field.as_bytes())
        .simple()
        .to_string();
    format!("f{}", &digest[..5])
}
