//! Renders a [`ReadPredicate`] into SQL.
//!
//! Only bound parameters carry values. The table alias is the sole piece of
//! text spliced into the query and it is always a compile-time constant.

use biography_core::{ReadPredicate, Visibility};
use sqlx::{QueryBuilder, Sqlite};

/// Appends `(<alias>.visibility IN (...) OR (<alias>.visibility = 'private' AND <alias>.user_id = ?))`.
pub(crate) fn push_read_predicate(
    builder: &mut QueryBuilder<'_, Sqlite>,
    predicate: &ReadPredicate,
    alias: &'static str,
) {
    builder.push("(");
    builder.push(alias).push(".visibility IN (");
    let mut levels = builder.separated(", ");
    for level in predicate.open_levels() {
        levels.push_bind(level.as_str());
    }
    builder.push(")");

    if let Some(owner) = predicate.private_owner() {
        builder.push(" OR (");
        builder.push(alias).push(".visibility = ");
        builder.push_bind(Visibility::Private.as_str());
        builder.push(" AND ");
        builder.push(alias).push(".user_id = ");
        builder.push_bind(owner.to_string());
        builder.push(")");
    }
    builder.push(")");
}
