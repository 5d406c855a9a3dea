use sea_orm::sea_query::{BinOper, Expr, Func, SimpleExpr};

use super::criteria::{Criteria, Criterion, to_sea_value};
use super::query_builder::PaginatingQueryBuilder;

/// Escape character of prefix patterns. Needs no quoting on any backend.
const LIKE_ESCAPE: char = '!';

/// Escape `%`, `_` and the escape character itself so a prefix is matched
/// literally.
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace(LIKE_ESCAPE, "!!")
        .replace('%', "!%")
        .replace('_', "!_")
}

/// Build `LOWER(column) LIKE LOWER('prefix%') ESCAPE '!'`. Both sides are
/// folded by the store so they agree on non-ASCII text.
#[must_use]
pub fn build_prefix_condition(alias: Option<&str>, field: &str, prefix: &str) -> SimpleExpr {
    let column = Expr::col(PaginatingQueryBuilder::column(alias, field));
    let pattern = format!("{}%", escape_like_wildcards(prefix));

    let escaped_pattern = SimpleExpr::Binary(
        Box::new(Func::lower(Expr::val(pattern)).into()),
        BinOper::Escape,
        Box::new(SimpleExpr::Constant(LIKE_ESCAPE.to_string().into())),
    );
    SimpleExpr::Binary(
        Box::new(Func::lower(column).into()),
        BinOper::Like,
        Box::new(escaped_pattern),
    )
}

/// Turns criteria into predicates on a query builder.
///
/// The strategy is picked when a repository is built: [`DefaultTranslator`]
/// unless the host supplies its own through [`CustomTranslator`].
pub trait CriteriaTranslator: Send + Sync {
    fn translate(&self, qb: &mut PaginatingQueryBuilder, criteria: &Criteria);

    /// Short name used in logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Equality, null check, prefix match and membership, all AND-combined and
/// qualified by the builder's alias.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTranslator;

impl CriteriaTranslator for DefaultTranslator {
    fn translate(&self, qb: &mut PaginatingQueryBuilder, criteria: &Criteria) {
        let alias = qb.alias().to_string();
        for (field, criterion) in criteria.iter() {
            let column = Expr::col(PaginatingQueryBuilder::column(Some(&alias), field));
            let predicate = match criterion {
                Criterion::IsNull => column.is_null(),
                Criterion::PrefixMatch(prefix) => {
                    build_prefix_condition(Some(&alias), field, prefix)
                }
                Criterion::In(values) => {
                    let uuid_column = qb.is_uuid_column(field);
                    column.is_in(values.iter().map(|v| to_sea_value(v, uuid_column)))
                }
                Criterion::Equals(value) => {
                    let value = to_sea_value(value, qb.is_uuid_column(field));
                    qb.bind_parameter(field, value.clone());
                    column.eq(value)
                }
            };
            qb.and_where(predicate);
        }
    }

    fn name(&self) -> &'static str {
        "default"
    }
}

/// Host-supplied translation. The default algorithm is bypassed entirely.
pub struct CustomTranslator<F>(F);

impl<F> CustomTranslator<F>
where
    F: Fn(&mut PaginatingQueryBuilder, &Criteria) + Send + Sync,
{
    pub const fn new(translate: F) -> Self {
        Self(translate)
    }
}

impl<F> CriteriaTranslator for CustomTranslator<F>
where
    F: Fn(&mut PaginatingQueryBuilder, &Criteria) + Send + Sync,
{
    fn translate(&self, qb: &mut PaginatingQueryBuilder, criteria: &Criteria) {
        (self.0)(qb, criteria);
    }
}
