//! The transformation engine: per-dimension context discovery and the
//! materialization of every table of joins of a run.

use std::collections::BTreeSet;

use crate::cache::TjCache;
use crate::constraints::Constraint;
use crate::error::Error;
use crate::model::{FunctionalDependency, Relation};
use crate::storage::DataStore;
use crate::tj;
use crate::transformation;

use super::parameters::{attribute_of, relation_of, TransformationParameters};

/// Check that an attribute reference points at an existing attribute and
/// return the name of its relation.
fn resolve_reference<'a>(relations: &[Relation], reference: &'a str) -> Result<&'a str, Error> {
    let name = relation_of(reference)?;
    let attribute = attribute_of(reference)?;

    let relation = relations
        .iter()
        .find(|relation| relation.name == name)
        .ok_or_else(|| Error::UnknownRelation {
            name: name.to_string(),
        })?;
    if !relation.has_attribute(attribute) {
        return Err(Error::UnknownAttribute {
            relation: name.to_string(),
            attribute: attribute.to_string(),
        });
    }
    Ok(name)
}

/// Drives a complete transformation run from a source database into a
/// warehouse of tables of joins.
#[derive(Debug)]
pub struct TransformationEngine<Source, Target> {
    source: Source,
    target: Target,
    cache: Option<TjCache>,
}

impl<Source: DataStore, Target: DataStore> TransformationEngine<Source, Target> {
    /// Create an engine without a table-of-joins cache.
    pub fn new(source: Source, target: Target) -> Self {
        Self {
            source,
            target,
            cache: None,
        }
    }

    /// Attach a table-of-joins cache to this engine.
    pub fn with_cache(mut self, cache: TjCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// The warehouse this engine materializes into.
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Consume the engine and hand out the warehouse.
    pub fn into_target(self) -> Target {
        self.target
    }

    /// The smallest lossless context built on the given base relations.
    ///
    /// When no extension of the base admits a lossless join, the run does
    /// not fail; the full relation set is used instead and the resulting
    /// table carries every attribute of the schema.
    fn context_for(
        &self,
        relations: &[Relation],
        dependencies: &[FunctionalDependency],
        base: &BTreeSet<String>,
        label: &str,
    ) -> Vec<Relation> {
        match transformation::contexts(relations, base, dependencies).next() {
            Some(context) => context,
            None => {
                log::warn!("no lossless context covers {label}, falling back to all relations");
                relations.to_vec()
            }
        }
    }

    /// Materialize the table of joins for one context, going through the
    /// cache when one is attached and has a usable entry.
    fn materialize(
        &mut self,
        context: &[Relation],
        dependencies: &[FunctionalDependency],
        constraint: &Constraint,
    ) -> Result<Relation, Error> {
        if let Some(cache) = self.cache.as_mut() {
            if cache.enable(context, constraint) && cache.full_match(context, constraint).is_none()
            {
                return cache.restore(&mut self.target, context, constraint);
            }
        }
        tj::build(
            context,
            dependencies,
            constraint,
            &self.source,
            &mut self.target,
            self.cache.as_mut(),
        )
    }

    /// Run the transformation described by `parameters`.
    ///
    /// One table of joins is built per dimension, on the smallest lossless
    /// context covering the dimension's relations, plus one application
    /// table on a context covering the measure and all dimensions at once.
    /// Returns the schemas of the materialized tables in that order.
    pub fn transform(
        &mut self,
        parameters: &TransformationParameters,
    ) -> Result<Vec<Relation>, Error> {
        let (relations, mut dependencies) = self.source.schema()?;

        let measure_relation = resolve_reference(&relations, &parameters.measure)?.to_string();
        let mut application_base: BTreeSet<String> = [measure_relation].into_iter().collect();

        let mut dimension_bases = Vec::new();
        for dimension in &parameters.dimensions {
            let mut base = BTreeSet::new();
            for reference in &dimension.attributes {
                base.insert(resolve_reference(&relations, reference)?.to_string());
            }
            application_base.extend(base.iter().cloned());
            dimension_bases.push(base);
        }

        dependencies.extend(parameters.multi_valued_dependencies.iter().cloned());

        let mut tables = Vec::new();
        for (dimension, base) in parameters.dimensions.iter().zip(&dimension_bases) {
            let label = dimension
                .name
                .clone()
                .unwrap_or_else(|| dimension.attributes.join(", "));
            log::info!("processing dimension {label}");

            let context = self.context_for(&relations, &dependencies, base, &label);
            tables.push(self.materialize(&context, &dependencies, &parameters.constraint)?);
        }

        let context =
            self.context_for(&relations, &dependencies, &application_base, "the application");
        tables.push(self.materialize(&context, &dependencies, &parameters.constraint)?);

        Ok(tables)
    }
}
