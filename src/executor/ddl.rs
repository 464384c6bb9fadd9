use super::QueryResult;
use crate::error::Result;
use crate::index::IndexManager;
use crate::parser::Plan;
use crate::storage::StorageEngine;

pub(super) fn create_table(storage: &StorageEngine, plan: &Plan) -> Result<QueryResult> {
    storage.create_table(&plan.table, plan.schema.clone())?;
    Ok(QueryResult::success())
}

pub(super) fn drop_table(
    storage: &StorageEngine,
    indexes: &mut IndexManager,
    plan: &Plan,
) -> Result<QueryResult> {
    storage.drop_table(&plan.table)?;
    indexes.drop_table_indexes(&plan.table);
    Ok(QueryResult::success())
}

/// Register the index, then back-fill it by scanning the table. The whole
/// create-plus-backfill runs under the caller's executor lock, so no read
/// can observe a partially back-filled index.
pub(super) fn create_index(
    storage: &StorageEngine,
    indexes: &mut IndexManager,
    plan: &Plan,
) -> Result<QueryResult> {
    if !storage.table_exists(&plan.table) {
        return Err(crate::error::DbError::no_such_table(&plan.table));
    }
    indexes.create_index(
        &plan.table,
        &plan.index_name,
        plan.index_columns.clone(),
        plan.index_kind,
    )?;
    let rows = storage.scan(&plan.table);
    indexes.backfill(&plan.table, &plan.index_name, &rows);
    Ok(QueryResult::success())
}

pub(super) fn drop_index(indexes: &mut IndexManager, plan: &Plan) -> Result<QueryResult> {
    indexes.drop_index(&plan.table, &plan.index_name);
    Ok(QueryResult::success())
}
