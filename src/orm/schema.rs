//! Model descriptors handed to the dialect by the ORM's schema layer.

/// Logical column type, independent of any database.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Time,
    Bytes,
    /// A database-specific type name passed through as written (e.g. `uuid`, `jsonb`).
    Custom(String),
}

impl DataType {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            DataType::Bool => "bool",
            DataType::Int => "int",
            DataType::Uint => "uint",
            DataType::Float => "float",
            DataType::String => "string",
            DataType::Time => "time",
            DataType::Bytes => "bytes",
            DataType::Custom(name) => name,
        }
    }
}

/// One column of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub db_name: String,
    pub data_type: DataType,
    /// The logical type behind a custom `data_type` (e.g. `Uint` for a `serial` override).
    pub gorm_data_type: DataType,
    /// Size in bits for integers, characters for strings.
    pub size: u32,
    pub precision: u32,
    pub scale: u32,
    pub auto_increment: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub not_null: bool,
    pub default_value: Option<String>,
}

impl Field {
    #[must_use]
    pub fn new(db_name: impl Into<String>, data_type: DataType) -> Self {
        let db_name = db_name.into();
        Self {
            name: db_name.clone(),
            db_name,
            gorm_data_type: data_type.clone(),
            data_type,
            size: 0,
            precision: 0,
            scale: 0,
            auto_increment: false,
            primary_key: false,
            unique: false,
            not_null: false,
            default_value: None,
        }
    }

    #[must_use]
    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    #[must_use]
    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn gorm_data_type(mut self, data_type: DataType) -> Self {
        self.gorm_data_type = data_type;
        self
    }
}

/// A secondary index over one or more columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Index {
    /// Empty means "derive from the naming strategy".
    pub name: String,
    pub columns: Vec<String>,
    pub unique: bool,
}

impl Index {
    #[must_use]
    pub fn new(columns: &[&str]) -> Self {
        Self {
            name: String::new(),
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            unique: false,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// A parsed model: its table, columns and keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub table: String,
    pub fields: Vec<Field>,
    pub db_names: Vec<String>,
    pub indexes: Vec<Index>,
    primary_fields: Vec<usize>,
    prioritized_primary_field: Option<usize>,
}

impl Schema {
    /// Build a schema, resolving primary keys the way the ORM does: the prioritized
    /// primary field is the primary field named `id`, or the only primary field.
    #[must_use]
    pub fn new(table: impl Into<String>, fields: Vec<Field>) -> Self {
        let db_names = fields.iter().map(|f| f.db_name.clone()).collect();
        let primary_fields: Vec<usize> = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.primary_key)
            .map(|(i, _)| i)
            .collect();
        let prioritized_primary_field = primary_fields
            .iter()
            .copied()
            .find(|&i| fields[i].db_name == "id")
            .or_else(|| (primary_fields.len() == 1).then(|| primary_fields[0]));
        Self {
            table: table.into(),
            fields,
            db_names,
            indexes: Vec::new(),
            primary_fields,
            prioritized_primary_field,
        }
    }

    #[must_use]
    pub fn with_indexes(mut self, indexes: Vec<Index>) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn primary_fields(&self) -> impl Iterator<Item = &Field> {
        self.primary_fields.iter().map(|&i| &self.fields[i])
    }

    #[must_use]
    pub fn prioritized_primary_field(&self) -> Option<&Field> {
        self.prioritized_primary_field.map(|i| &self.fields[i])
    }

    #[must_use]
    pub fn field_by_db_name(&self, db_name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.db_name == db_name)
    }
}

/// Table and identifier naming rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingStrategy {
    /// Longest identifier the database accepts; 0 means "not configured".
    pub identifier_max_length: usize,
}

impl NamingStrategy {
    /// `idx_<table>_<column>`, with dots replaced so schema-qualified tables stay valid.
    #[must_use]
    pub fn index_name(&self, table: &str, column: &str) -> String {
        self.truncate(format!("idx_{table}_{column}").replace('.', "_"))
    }

    fn truncate(&self, mut name: String) -> String {
        if self.identifier_max_length > 0 && name.len() > self.identifier_max_length {
            let mut cut = self.identifier_max_length;
            while !name.is_char_boundary(cut) {
                cut -= 1;
            }
            name.truncate(cut);
        }
        name
    }
}
