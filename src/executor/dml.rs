use super::query::matches_conditions;
use super::QueryResult;
use crate::error::Result;
use crate::index::IndexManager;
use crate::parser::Plan;
use crate::storage::StorageEngine;
use uuid::Uuid;

pub(super) fn insert(storage: &StorageEngine, indexes: &mut IndexManager, plan: &Plan) -> Result<QueryResult> {
    let key = Uuid::new_v4().to_string();
    storage.put(&plan.table, &key, plan.values.clone())?;
    indexes.insert_row(&plan.table, &key, &plan.values);
    Ok(QueryResult::inserted(key))
}

pub(super) fn update(storage: &StorageEngine, indexes: &mut IndexManager, plan: &Plan) -> Result<QueryResult> {
    if !storage.table_exists(&plan.table) {
        return Err(crate::error::DbError::no_such_table(&plan.table));
    }

    let mut affected = 0usize;
    for (key, row) in storage.scan(&plan.table) {
        if !matches_conditions(&row, &plan.conditions) {
            continue;
        }
        indexes.delete_row(&plan.table, &key, &row);

        let mut merged = row;
        for (column, value) in &plan.assignments {
            merged.insert(column.clone(), value.clone());
        }

        storage.put(&plan.table, &key, merged.clone())?;
        indexes.insert_row(&plan.table, &key, &merged);
        affected += 1;
    }
    Ok(QueryResult::modified(affected))
}

pub(super) fn delete(storage: &StorageEngine, indexes: &mut IndexManager, plan: &Plan) -> Result<QueryResult> {
    if !storage.table_exists(&plan.table) {
        return Err(crate::error::DbError::no_such_table(&plan.table));
    }

    let mut affected = 0usize;
    for (key, row) in storage.scan(&plan.table) {
        if !matches_conditions(&row, &plan.conditions) {
            continue;
        }
        storage.delete(&plan.table, &key)?;
        indexes.delete_row(&plan.table, &key, &row);
        affected += 1;
    }
    Ok(QueryResult::modified(affected))
}
