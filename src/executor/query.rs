use super::QueryResult;
use crate::error::Result;
use crate::index::IndexManager;
use crate::parser::Plan;
use crate::storage::StorageEngine;
use crate::types::{Row, ROW_KEY_COLUMN};

/// True iff every condition in `conditions` matches `row`.
pub(super) fn matches_conditions(row: &Row, conditions: &std::collections::BTreeMap<String, crate::types::Value>) -> bool {
    conditions.iter().all(|(col, val)| row.get(col) == Some(val))
}

/// Resolve the candidate row keys for a SELECT's WHERE clause: use the best
/// available index when one exists, otherwise fall back to a full scan.
fn candidate_keys(storage: &StorageEngine, indexes: &IndexManager, plan: &Plan) -> Vec<String> {
    if plan.conditions.is_empty() {
        return storage.scan(&plan.table).into_iter().map(|(k, _)| k).collect();
    }
    if let Some((_, index)) = indexes.find_best_index(&plan.table, &plan.conditions) {
        index.lookup(&plan.conditions).into_iter().collect()
    } else {
        storage.scan(&plan.table).into_iter().map(|(k, _)| k).collect()
    }
}

pub(super) fn select(storage: &StorageEngine, indexes: &IndexManager, plan: &Plan) -> Result<QueryResult> {
    if !storage.table_exists(&plan.table) {
        return Err(crate::error::DbError::no_such_table(&plan.table));
    }

    let keys = candidate_keys(storage, indexes, plan);

    // Re-check every candidate against the full WHERE: a partial-column
    // index can return false positives.
    let mut rows: Vec<Row> = keys
        .into_iter()
        .filter_map(|key| {
            let row = storage.get(&plan.table, &key)?;
            if matches_conditions(&row, &plan.conditions) {
                let mut row = row;
                row.insert(ROW_KEY_COLUMN.to_string(), crate::types::Value::String(key));
                Some(row)
            } else {
                None
            }
        })
        .collect();

    // Apply ORDER BY by iterating the sort keys in reverse order, performing
    // a stable sort per key, so multi-key ordering composes correctly.
    for item in plan.order_by.iter().rev() {
        rows.sort_by(|a, b| {
            let av = a.get(&item.column);
            let bv = b.get(&item.column);
            let ordering = av.cmp(&bv);
            if item.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }

    if let Some(limit) = plan.limit {
        rows.truncate(limit as usize);
    }

    if !plan.columns.is_empty() {
        rows = rows
            .into_iter()
            .map(|row| {
                let mut projected = Row::new();
                for col in &plan.columns {
                    if let Some(v) = row.get(col) {
                        projected.insert(col.clone(), v.clone());
                    }
                }
                if let Some(key) = row.get(ROW_KEY_COLUMN) {
                    projected.insert(ROW_KEY_COLUMN.to_string(), key.clone());
                }
                projected
            })
            .collect();
    }

    Ok(QueryResult::selected(rows))
}
