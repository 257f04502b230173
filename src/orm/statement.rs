use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::clause::{Clause, ClauseBuilder, Column, Var};
use super::dialector::Dialector;
use super::schema::{Field, Schema};
use crate::types::{QueryExecMode, RowValues};

/// SQL text and bind values accumulated while clauses render.
pub struct Statement {
    pub table: String,
    pub schema: Option<Arc<Schema>>,
    pub sql: String,
    pub vars: Vec<RowValues>,
    clauses: HashMap<String, Clause>,
    dialector: Arc<dyn Dialector>,
    clause_builders: Arc<HashMap<String, ClauseBuilder>>,
}

impl Statement {
    #[must_use]
    pub fn new(
        dialector: Arc<dyn Dialector>,
        clause_builders: Arc<HashMap<String, ClauseBuilder>>,
    ) -> Self {
        Self {
            table: String::new(),
            schema: None,
            sql: String::new(),
            vars: Vec::new(),
            clauses: HashMap::new(),
            dialector,
            clause_builders,
        }
    }

    #[must_use]
    pub fn with_schema(mut self, schema: Arc<Schema>) -> Self {
        self.table.clone_from(&schema.table);
        self.schema = Some(schema);
        self
    }

    /// Lead the variable list with an execution-mode marker for this statement.
    #[must_use]
    pub fn with_exec_mode(mut self, mode: QueryExecMode) -> Self {
        self.vars.insert(0, RowValues::ExecMode(mode));
        self
    }

    pub fn write_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn write_char(&mut self, c: char) {
        self.sql.push(c);
    }

    pub fn write_quoted(&mut self, column: &Column) {
        if let Some(table) = &column.table {
            self.dialector.quote_to(&mut self.sql, table);
            self.sql.push('.');
        }
        if column.name == "*" {
            self.sql.push('*');
        } else {
            self.dialector.quote_to(&mut self.sql, &column.name);
        }
    }

    /// Append a var: values are bound, columns quoted, expressions inlined.
    pub fn add_var(&mut self, var: &Var) {
        match var {
            Var::Value(value) => {
                self.vars.push(value.clone());
                self.dialector.bind_var_to(&mut self.sql, &self.vars);
            }
            Var::Column(column) => self.write_quoted(column),
            Var::Expr(expr) => expr.build(self),
        }
    }

    /// Append the expression the dialect uses for "the column's default".
    pub fn add_default_value(&mut self, field: &Field) {
        let expr = self.dialector.default_value_of(field);
        expr.build(self);
    }

    /// Attach or replace a clause, keyed by its name.
    pub fn add_clause(&mut self, clause: Clause) {
        self.clauses.insert(clause.name.clone(), clause);
    }

    #[must_use]
    pub fn clause(&self, name: &str) -> Option<&Clause> {
        self.clauses.get(name)
    }

    /// Render the named clauses in order, separated by spaces. A registered clause
    /// builder takes precedence over the clause's own rendering.
    pub fn build<S: AsRef<str>>(&mut self, names: &[S]) {
        let mut first = true;
        for name in names {
            let name = name.as_ref();
            let Some(clause) = self.clauses.get(name).cloned() else {
                continue;
            };
            if !first {
                self.sql.push(' ');
            }
            first = false;
            match self.clause_builders.get(name).cloned() {
                Some(builder) => builder(&clause, self),
                None => clause.build(self),
            }
        }
    }

    /// The SQL with bind values inlined, for logs.
    #[must_use]
    pub fn explain(&self) -> String {
        self.dialector.explain(&self.sql, &self.vars)
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("dialect", &self.dialector.name())
            .field("table", &self.table)
            .field("sql", &self.sql)
            .field("vars", &self.vars)
            .finish_non_exhaustive()
    }
}
