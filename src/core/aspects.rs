// src/core/aspects.rs
use crate::core::{AspectError, Dataset, Result};
use serde::{Deserialize, Serialize};

/// A named group of variables attributed as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub name: String,
    pub variables: Vec<String>,
}

/// Ordered collection of aspects with unique names. Order is significant: it
/// fixes the mask column of each aspect and breaks ties when ranking.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AspectSet {
    aspects: Vec<Aspect>,
}

impl AspectSet {
    pub fn new() -> Self {
        AspectSet::default()
    }

    /// Builds a set from `(name, variables)` pairs.
    pub fn from_groups<I, N, V, S>(groups: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = AspectSet::new();
        for (name, variables) in groups {
            set.insert(name, variables)?;
        }
        Ok(set)
    }

    /// One aspect per column of `data`, named after the column.
    pub fn single_variables(data: &Dataset) -> Self {
        AspectSet {
            aspects: data
                .column_names()
                .map(|name| Aspect {
                    name: name.to_string(),
                    variables: vec![name.to_string()],
                })
                .collect(),
        }
    }

    pub fn insert<V, S>(&mut self, name: impl Into<String>, variables: V) -> Result<()>
    where
        V: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(AspectError::InvalidAspectDefinition(format!(
                "Aspect '{}' is defined more than once.",
                name
            )));
        }
        let mut unique: Vec<String> = Vec::new();
        for variable in variables.into_iter().map(Into::into) {
            if !unique.contains(&variable) {
                unique.push(variable);
            }
        }
        if unique.is_empty() {
            return Err(AspectError::InvalidAspectDefinition(format!(
                "Aspect '{}' has no variables.",
                name
            )));
        }
        self.aspects.push(Aspect {
            name,
            variables: unique,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Aspect> {
        self.aspects.iter().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Aspect> {
        self.aspects.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.aspects.iter().map(|a| a.name.as_str())
    }

    /// Every variable referenced by any aspect, first occurrence order.
    pub fn variables(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for variable in self.aspects.iter().flat_map(|a| a.variables.iter()) {
            if !out.contains(&variable.as_str()) {
                out.push(variable);
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a AspectSet {
    type Item = &'a Aspect;
    type IntoIter = std::slice::Iter<'a, Aspect>;

    fn into_iter(self) -> Self::IntoIter {
        self.aspects.iter()
    }
}
