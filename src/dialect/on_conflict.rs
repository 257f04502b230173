use crate::orm::{Assignment, Clause, ClauseExpression, Column, Schema, Statement, Var};

/// Clause-builder key for the insert-or-update clause.
pub const CLAUSE_ON_CONFLICT: &str = "ON CONFLICT";

/// Render an `OnConflict` expression as `ON DUPLICATE KEY UPDATE ...`.
///
/// Assignments to primary or unique key columns are dropped. With no update list, the
/// prioritized primary key (or the first column) is assigned to itself, unless it is a key;
/// when nothing survives the clause reads `ON DUPLICATE KEY UPDATE NOTHING`.
pub fn build_on_conflict(clause: &Clause, stmt: &mut Statement) {
    let ClauseExpression::OnConflict(on_conflict) = &clause.expression else {
        clause.build(stmt);
        return;
    };
    let mut on_conflict = on_conflict.clone();

    if on_conflict.do_updates.is_empty() {
        if let Some(schema) = stmt.schema.clone() {
            let name = schema
                .prioritized_primary_field()
                .map(|f| f.db_name.clone())
                .or_else(|| schema.db_names.first().cloned())
                .unwrap_or_default();
            if !name.is_empty() && !is_primary_or_unique_key(Some(&*schema), &name) {
                let column = Column::new(name);
                on_conflict.do_updates = vec![Assignment::new(column.clone(), column)];
                on_conflict.do_nothing = false;
            }
            stmt.add_clause(Clause::new(
                CLAUSE_ON_CONFLICT,
                ClauseExpression::OnConflict(on_conflict.clone()),
            ));
        }
    }

    let mut has_written = false;
    for assignment in &on_conflict.do_updates {
        if is_primary_or_unique_key(stmt.schema.as_deref(), &assignment.column.name) {
            continue;
        }
        if has_written {
            stmt.write_char(',');
        } else {
            stmt.write_str("ON DUPLICATE KEY UPDATE ");
            has_written = true;
        }
        stmt.write_quoted(&assignment.column);
        stmt.write_char('=');
        match &assignment.value {
            Var::Column(column) if column.is_excluded() => {
                let column = Column::new(column.name.clone());
                stmt.write_str("VALUES(");
                stmt.write_quoted(&column);
                stmt.write_char(')');
            }
            value => stmt.add_var(value),
        }
    }

    if !has_written {
        stmt.write_str("ON DUPLICATE KEY UPDATE NOTHING");
    }
}

/// Whether `name` is one of the schema's primary fields flagged primary or unique.
#[must_use]
pub fn is_primary_or_unique_key(schema: Option<&Schema>, name: &str) -> bool {
    let Some(schema) = schema else {
        return false;
    };
    if name.is_empty() {
        return false;
    }
    schema
        .primary_fields()
        .any(|f| f.db_name == name && (f.primary_key || f.unique))
}
