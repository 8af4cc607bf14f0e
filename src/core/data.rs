// src/core/data.rs
use crate::core::{AspectError, Result};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// A single cell of a dataset: numeric or categorical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Category(String),
}

impl Value {
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Number(_) => ColumnType::Number,
            Value::Category(_) => ColumnType::Categorical,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(v) => Some(*v),
            Value::Category(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(v) => write!(f, "{}", v),
            Value::Category(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Number(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Category(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Category(s)
    }
}

/// Type tag of a column, fixed when the column is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Number,
    Categorical,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Number(Vec<f64>),
    Categorical(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    pub fn number(name: impl Into<String>, data: Vec<f64>) -> Self {
        Column {
            name: name.into(),
            data: ColumnData::Number(data),
        }
    }

    pub fn categorical<I, S>(name: impl Into<String>, data: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Column {
            name: name.into(),
            data: ColumnData::Categorical(data.into_iter().map(Into::into).collect()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn column_type(&self) -> ColumnType {
        match self.data {
            ColumnData::Number(_) => ColumnType::Number,
            ColumnData::Categorical(_) => ColumnType::Categorical,
        }
    }

    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Number(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Numeric values of the column, `None` for categorical columns.
    pub fn as_numbers(&self) -> Option<ArrayView1<'_, f64>> {
        match &self.data {
            ColumnData::Number(v) => Some(ArrayView1::from(v.as_slice())),
            ColumnData::Categorical(_) => None,
        }
    }

    pub fn value(&self, row: usize) -> Option<Value> {
        match &self.data {
            ColumnData::Number(v) => v.get(row).map(|x| Value::Number(*x)),
            ColumnData::Categorical(v) => v.get(row).map(|s| Value::Category(s.clone())),
        }
    }

    fn take(&self, indices: &[usize]) -> Column {
        let data = match &self.data {
            ColumnData::Number(v) => ColumnData::Number(indices.iter().map(|&i| v[i]).collect()),
            ColumnData::Categorical(v) => {
                ColumnData::Categorical(indices.iter().map(|&i| v[i].clone()).collect())
            }
        };
        Column {
            name: self.name.clone(),
            data,
        }
    }

    fn set(&mut self, row: usize, value: &Value) -> Result<()> {
        let len = self.len();
        if row >= len {
            return Err(AspectError::IncompatibleDimensions(format!(
                "Row {} is out of range for column '{}' with {} rows.",
                row, self.name, len
            )));
        }
        match (&mut self.data, value) {
            (ColumnData::Number(v), Value::Number(x)) => v[row] = *x,
            (ColumnData::Categorical(v), Value::Category(s)) => v[row] = s.clone(),
            (_, other) => {
                return Err(AspectError::SchemaMismatch(format!(
                    "Cannot store a {:?} value in {:?} column '{}'.",
                    other.column_type(),
                    self.column_type(),
                    self.name
                )))
            }
        }
        Ok(())
    }
}

/// Column-oriented table with a typed schema. Column names are unique and all
/// columns have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    nrows: usize,
}

impl Dataset {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let nrows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name()) {
                return Err(AspectError::SchemaMismatch(format!(
                    "Duplicate column name '{}'.",
                    column.name()
                )));
            }
            if column.len() != nrows {
                return Err(AspectError::IncompatibleDimensions(format!(
                    "Column '{}' has {} rows, expected {}.",
                    column.name(),
                    column.len(),
                    nrows
                )));
            }
        }
        Ok(Dataset { columns, nrows })
    }

    /// Builds an all-numeric dataset from a row-major matrix.
    pub fn from_array<S: AsRef<str>>(names: &[S], values: &Array2<f64>) -> Result<Self> {
        if names.len() != values.ncols() {
            return Err(AspectError::IncompatibleDimensions(format!(
                "{} column names given for a matrix with {} columns.",
                names.len(),
                values.ncols()
            )));
        }
        let columns = names
            .iter()
            .zip(values.columns())
            .map(|(name, col)| Column::number(name.as_ref(), col.to_vec()))
            .collect();
        Dataset::new(columns)
    }

    /// All columns as an `nrows x ncols` matrix. Fails on categorical columns.
    pub fn to_array(&self) -> Result<Array2<f64>> {
        let mut flat = Vec::with_capacity(self.nrows * self.ncols());
        for column in &self.columns {
            let values = column.as_numbers().ok_or_else(|| {
                AspectError::SchemaMismatch(format!("Column '{}' is not numeric.", column.name()))
            })?;
            flat.extend(values.iter().copied());
        }
        Ok(Array2::from_shape_vec((self.ncols(), self.nrows), flat)?.reversed_axes())
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nrows == 0 || self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(Column::name)
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column(name).map(Column::column_type)
    }

    pub fn value(&self, row: usize, name: &str) -> Option<Value> {
        self.column(name).and_then(|c| c.value(row))
    }

    pub fn set_value(&mut self, row: usize, name: &str, value: &Value) -> Result<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.name() == name)
            .ok_or_else(|| AspectError::SchemaMismatch(format!("Unknown column '{}'.", name)))?;
        column.set(row, value)
    }

    /// Keeps only the named columns, in the order given.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Dataset> {
        let columns = names
            .iter()
            .map(|name| {
                self.column(name.as_ref()).cloned().ok_or_else(|| {
                    AspectError::SchemaMismatch(format!("Unknown column '{}'.", name.as_ref()))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Dataset::new(columns)
    }

    /// Gathers rows by index. Indices may repeat.
    pub fn take_rows(&self, indices: &[usize]) -> Result<Dataset> {
        if let Some(&bad) = indices.iter().find(|&&i| i >= self.nrows) {
            return Err(AspectError::IncompatibleDimensions(format!(
                "Row index {} is out of range for a dataset with {} rows.",
                bad, self.nrows
            )));
        }
        Ok(Dataset {
            columns: self.columns.iter().map(|c| c.take(indices)).collect(),
            nrows: indices.len(),
        })
    }

    pub fn instance(&self, row: usize) -> Option<Instance> {
        if row >= self.nrows {
            return None;
        }
        let entries = self
            .columns
            .iter()
            .filter_map(|c| c.value(row).map(|v| (c.name().to_string(), v)))
            .collect();
        Some(Instance { entries })
    }

    /// First column whose values, rendered as text, equal the outcome vector.
    pub fn find_outcome_column(&self, outcome: &[Value]) -> Option<&str> {
        if outcome.len() != self.nrows {
            return None;
        }
        self.columns
            .iter()
            .find(|column| {
                outcome.iter().enumerate().all(|(row, expected)| {
                    column
                        .value(row)
                        .map_or(false, |v| v.to_string() == expected.to_string())
                })
            })
            .map(Column::name)
    }
}

/// A single named observation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Instance {
    entries: Vec<(String, Value)>,
}

impl Instance {
    pub fn new<I, S, V>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, V)>,
        S: Into<String>,
        V: Into<Value>,
    {
        let mut instance = Instance::default();
        for (name, value) in entries {
            let name = name.into();
            if instance.get(&name).is_some() {
                return Err(AspectError::SchemaMismatch(format!(
                    "Duplicate variable '{}' in observation.",
                    name
                )));
            }
            instance.entries.push((name, value.into()));
        }
        Ok(instance)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
