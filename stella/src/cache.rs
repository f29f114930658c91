//! A persistent registry of previously built tables of joins.
//!
//! A cached table can be reused in two ways. A full match, i.e. the same
//! context under an equivalent constraint, short-circuits the build
//! entirely. A partial match, i.e. a cached table over a superset context
//! whose constraint admits at least the rows of the new one, is restored:
//! its rows are filtered, projected and re-tagged into the new table
//! instead of joining the sources again.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constraints::operations::{equivalent, is_domain_included};
use crate::constraints::Constraint;
use crate::error::Error;
use crate::model::{Relation, Row};
use crate::storage::DataStore;
use crate::tj::{self, Provenance, PROVENANCE_ATTRIBUTE};

/// One cached table of joins: its schema, the names of the context
/// relations it was built from and the constraint it was built under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    relation: Relation,
    context: Vec<String>,
    constraint: Constraint,
}

impl CacheEntry {
    fn context_names(&self) -> BTreeSet<&str> {
        self.context.iter().map(String::as_str).collect()
    }
}

/// The registry of cached tables of joins.
///
/// Entries live in the warehouse the tables were built into; the registry
/// itself is a JSON file next to it, or purely in memory for tests and
/// one-shot runs.
#[derive(Debug, Default)]
pub struct TjCache {
    file: Option<PathBuf>,
    entries: Vec<CacheEntry>,
    active: Option<usize>,
}

impl TjCache {
    /// Create an empty cache that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the cache from the given registry file. A missing file yields
    /// an empty cache that will be persisted there on the first addition.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            log::debug!("cache registry {} does not exist yet", path.display());
            return Ok(Self {
                file: Some(path.to_path_buf()),
                entries: Vec::new(),
                active: None,
            });
        }

        let serialized = fs::read_to_string(path).map_err(|error| Error::IoFile {
            error,
            filename: path.to_path_buf(),
        })?;
        Ok(Self {
            file: Some(path.to_path_buf()),
            entries: serde_json::from_str(&serialized)?,
            active: None,
        })
    }

    /// Look for an entry covering the given context and constraint and mark
    /// it as the active one. Returns whether such an entry was found.
    ///
    /// An entry covers a request when its context is a superset of the
    /// requested relation names and its constraint admits every row the
    /// requested constraint admits.
    pub fn enable(&mut self, context: &[Relation], constraint: &Constraint) -> bool {
        let names: BTreeSet<&str> = context.iter().map(|relation| relation.name.as_str()).collect();
        self.active = self.entries.iter().position(|entry| {
            names.is_subset(&entry.context_names())
                && is_domain_included(constraint, &entry.constraint)
        });
        if let Some(index) = self.active {
            log::debug!(
                "cache entry \"{}\" enabled for [{}]",
                self.entries[index].relation.name,
                names.into_iter().collect::<Vec<_>>().join(", ")
            );
        }
        self.active.is_some()
    }

    /// Whether an entry is currently enabled.
    pub fn enabled(&self) -> bool {
        self.active.is_some()
    }

    /// The schema of the currently enabled cached table, if any.
    pub fn active_relation(&self) -> Option<&Relation> {
        self.active.map(|index| &self.entries[index].relation)
    }

    /// The cached table built for exactly this context under an equivalent
    /// constraint, if any. Such a table can be reused as-is.
    pub fn full_match(&self, context: &[Relation], constraint: &Constraint) -> Option<&Relation> {
        let names: BTreeSet<&str> = context.iter().map(|relation| relation.name.as_str()).collect();
        self.entries
            .iter()
            .find(|entry| {
                entry.context_names() == names && equivalent(constraint, &entry.constraint)
            })
            .map(|entry| &entry.relation)
    }

    /// Whether some entry's context contains all the given relations.
    pub fn contains_context(&self, context: &[Relation]) -> bool {
        let names: BTreeSet<&str> = context.iter().map(|relation| relation.name.as_str()).collect();
        self.entries
            .iter()
            .any(|entry| names.is_subset(&entry.context_names()))
    }

    /// Register a freshly built table. A relation already registered under
    /// the same name is left untouched.
    pub fn add(
        &mut self,
        relation: Relation,
        context: &[Relation],
        constraint: &Constraint,
    ) -> Result<(), Error> {
        if self.entries.iter().any(|entry| entry.relation.name == relation.name) {
            return Ok(());
        }
        self.entries.push(CacheEntry {
            relation,
            context: context.iter().map(|relation| relation.name.clone()).collect(),
            constraint: constraint.clone(),
        });
        self.persist()
    }

    /// Build the table of joins for `context` from the enabled cached
    /// table instead of the source database.
    ///
    /// The cached rows are filtered by the applicable part of `constraint`,
    /// projected onto the new table's attributes, and their provenance
    /// vectors restricted to the context's relations. Rows whose restricted
    /// vector is empty stem entirely from relations outside the context and
    /// are dropped. Any rows already stored under the destination name are
    /// replaced, so restoring onto the cached table itself narrows it in
    /// place; its registry entry is updated to the new constraint.
    pub fn restore<Store: DataStore>(
        &mut self,
        store: &mut Store,
        context: &[Relation],
        constraint: &Constraint,
    ) -> Result<Relation, Error> {
        let Some(index) = self.active else {
            return Err(Error::CacheDisabled);
        };
        let cached = self.entries[index].relation.clone();
        let table = tj::table_schema(context);
        log::info!(
            "restoring table of joins \"{}\" from cached \"{}\"",
            table.name,
            cached.name
        );

        let attributes = table.attribute_names();
        let names: Vec<&str> = context.iter().map(|relation| relation.name.as_str()).collect();
        let applicable = constraint.project(&attributes);

        let mut rows: Vec<Row> = Vec::new();
        for cached_row in store.rows(&cached)? {
            if !applicable.satisfied_by(&cached_row) {
                continue;
            }
            let provenance = Provenance::from_row(&cached_row)?.restrict(names.iter().copied());
            if provenance.relations().is_empty() {
                continue;
            }
            let mut row = cached_row.project(&attributes);
            row.set(PROVENANCE_ATTRIBUTE, provenance.to_value()?);
            rows.push(row);
        }
        // projection may collapse cached rows into duplicates
        rows.sort();
        rows.dedup();

        store.create_table(&table)?;
        let existing = store.rows(&table)?;
        store.delete_rows(&table, &existing)?;
        store.insert_rows(&table, &rows)?;

        if table.name == cached.name {
            self.entries[index].context =
                context.iter().map(|relation| relation.name.clone()).collect();
            self.entries[index].constraint = constraint.clone();
            self.persist()?;
        } else {
            self.add(table.clone(), context, constraint)?;
        }
        Ok(table)
    }

    fn persist(&self) -> Result<(), Error> {
        let Some(path) = &self.file else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(&self.entries)?;
        fs::write(path, serialized).map_err(|error| Error::IoFile {
            error,
            filename: path.clone(),
        })
    }
}
