//! Structured clause expressions the ORM assembles before rendering.

use std::sync::Arc;

use super::statement::Statement;
use crate::types::RowValues;

/// Renders one clause, replacing the clause's own rendering.
pub type ClauseBuilder = Arc<dyn Fn(&Clause, &mut Statement) + Send + Sync>;

/// A column reference, optionally qualified by table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Column {
    pub table: Option<String>,
    pub name: String,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            table: None,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// The row that would have been inserted, as seen from a conflict handler.
    #[must_use]
    pub fn excluded(name: impl Into<String>) -> Self {
        Self::qualified("excluded", name)
    }

    #[must_use]
    pub fn is_excluded(&self) -> bool {
        self.table.as_deref() == Some("excluded")
    }
}

/// Raw SQL with `?` markers, each replaced by the next var when rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub sql: String,
    pub vars: Vec<Var>,
}

impl Expr {
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            vars: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_vars(sql: impl Into<String>, vars: Vec<Var>) -> Self {
        Self {
            sql: sql.into(),
            vars,
        }
    }

    pub fn build(&self, stmt: &mut Statement) {
        let mut vars = self.vars.iter();
        for ch in self.sql.chars() {
            if ch == '?' {
                if let Some(var) = vars.next() {
                    stmt.add_var(var);
                    continue;
                }
            }
            stmt.write_char(ch);
        }
    }
}

/// Anything the ORM can place where a value is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum Var {
    /// Bound as a placeholder.
    Value(RowValues),
    /// Written as a quoted column reference.
    Column(Column),
    /// Written inline.
    Expr(Expr),
}

impl From<RowValues> for Var {
    fn from(value: RowValues) -> Self {
        Var::Value(value)
    }
}

impl From<Column> for Var {
    fn from(column: Column) -> Self {
        Var::Column(column)
    }
}

impl From<Expr> for Var {
    fn from(expr: Expr) -> Self {
        Var::Expr(expr)
    }
}

/// `column = value` in a SET list.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Column,
    pub value: Var,
}

impl Assignment {
    #[must_use]
    pub fn new(column: Column, value: impl Into<Var>) -> Self {
        Self {
            column,
            value: value.into(),
        }
    }
}

/// `col = excluded.col` for each column: update with the values that would have been inserted.
#[must_use]
pub fn assignment_columns(columns: &[&str]) -> Vec<Assignment> {
    columns
        .iter()
        .map(|c| Assignment::new(Column::new(*c), Column::excluded(*c)))
        .collect()
}

/// What to do when an INSERT hits an existing key.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OnConflict {
    pub columns: Vec<Column>,
    pub on_constraint: Option<String>,
    pub do_nothing: bool,
    pub do_updates: Vec<Assignment>,
}

impl OnConflict {
    /// Standard `ON CONFLICT` rendering, used when no dialect builder is registered.
    pub fn build(&self, stmt: &mut Statement) {
        stmt.write_str("ON CONFLICT ");
        if let Some(constraint) = &self.on_constraint {
            stmt.write_str("ON CONSTRAINT ");
            stmt.write_str(constraint);
            stmt.write_char(' ');
        } else if !self.columns.is_empty() {
            stmt.write_char('(');
            for (i, column) in self.columns.iter().enumerate() {
                if i > 0 {
                    stmt.write_char(',');
                }
                stmt.write_quoted(column);
            }
            stmt.write_str(") ");
        }

        if self.do_nothing || self.do_updates.is_empty() {
            stmt.write_str("DO NOTHING");
            return;
        }
        stmt.write_str("DO UPDATE SET ");
        for (i, assignment) in self.do_updates.iter().enumerate() {
            if i > 0 {
                stmt.write_char(',');
            }
            stmt.write_quoted(&assignment.column);
            stmt.write_char('=');
            stmt.add_var(&assignment.value);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClauseExpression {
    OnConflict(OnConflict),
    Expr(Expr),
}

impl ClauseExpression {
    pub fn build(&self, stmt: &mut Statement) {
        match self {
            ClauseExpression::OnConflict(on_conflict) => on_conflict.build(stmt),
            ClauseExpression::Expr(expr) => expr.build(stmt),
        }
    }
}

/// A named clause of a statement (`"ON CONFLICT"`, `"RETURNING"`, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub name: String,
    pub expression: ClauseExpression,
}

impl Clause {
    #[must_use]
    pub fn new(name: impl Into<String>, expression: ClauseExpression) -> Self {
        Self {
            name: name.into(),
            expression,
        }
    }

    /// The clause's own rendering.
    pub fn build(&self, stmt: &mut Statement) {
        self.expression.build(stmt);
    }
}
