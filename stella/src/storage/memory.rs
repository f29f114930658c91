//! An in-memory [DataStore] backing both the source and the warehouse side
//! of a transformation run.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::unionfind::UnionFind;

use crate::constraints::Constraint;
use crate::error::Error;
use crate::model::{dependency, AttributeType, FunctionalDependency, Relation, Row, Value};

use super::DataStore;

#[derive(Debug, Clone)]
struct StoredTable {
    relation: Relation,
    unique_keys: Vec<BTreeSet<String>>,
    rows: Vec<Row>,
}

/// A [DataStore] holding all tables in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: BTreeMap<String, StoredTable>,
}

impl MemoryStore {
    /// Create an empty [MemoryStore].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source table with its unique keys. The primary key is
    /// part of the relation itself.
    pub fn add_table(&mut self, relation: Relation, unique_keys: Vec<BTreeSet<String>>) {
        self.tables.insert(
            relation.name.clone(),
            StoredTable {
                relation,
                unique_keys,
                rows: Vec::new(),
            },
        );
    }

    fn table(&self, name: &str) -> Result<&StoredTable, Error> {
        self.tables.get(name).ok_or_else(|| Error::UnknownRelation {
            name: name.to_string(),
        })
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut StoredTable, Error> {
        self.tables.get_mut(name).ok_or_else(|| Error::UnknownRelation {
            name: name.to_string(),
        })
    }
}

/// Join two row sets on their shared attributes with a hash join.
/// Null never matches, so rows carrying a null in the join key drop out.
fn join_rows(left: &[Row], right: &[Row], shared: &BTreeSet<String>) -> Vec<Row> {
    let mut buckets: BTreeMap<Vec<Value>, Vec<&Row>> = BTreeMap::new();
    for row in right {
        let key = row.key(shared);
        if key.iter().any(|value| value.is_null()) {
            continue;
        }
        buckets.entry(key).or_default().push(row);
    }

    let mut result = Vec::new();
    for row in left {
        let key = row.key(shared);
        if key.iter().any(|value| value.is_null()) {
            continue;
        }
        if let Some(matches) = buckets.get(&key) {
            for other in matches {
                result.push(row.merge(other));
            }
        }
    }
    result
}

/// Group the relations into connected components of the join graph, where
/// two relations are adjacent when they share an attribute.
fn components(relations: &[Relation]) -> Vec<Vec<usize>> {
    let mut union_find: UnionFind<usize> = UnionFind::new(relations.len());
    for (i, left) in relations.iter().enumerate() {
        for (j, right) in relations.iter().enumerate().skip(i + 1) {
            if left
                .attributes
                .keys()
                .any(|attribute| right.has_attribute(attribute))
            {
                union_find.union(i, j);
            }
        }
    }

    let mut result: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for index in 0..relations.len() {
        result.entry(union_find.find(index)).or_default().push(index);
    }
    result.into_values().collect()
}

impl DataStore for MemoryStore {
    fn schema(&self) -> Result<(Vec<Relation>, Vec<FunctionalDependency>), Error> {
        if self.tables.is_empty() {
            return Err(Error::EmptySchema);
        }

        let mut relations = Vec::new();
        let mut dependencies = Vec::new();
        for table in self.tables.values() {
            relations.push(table.relation.clone());
            dependencies.extend(dependency::key_dependencies(
                &table.relation,
                &table.unique_keys,
            ));
        }
        Ok((relations, dependencies))
    }

    fn natural_join(
        &self,
        relations: &[Relation],
        attributes: &BTreeMap<String, AttributeType>,
    ) -> Result<Vec<Row>, Error> {
        if relations.is_empty() {
            return Ok(Vec::new());
        }

        // join within each connected component, then take the cross
        // product of the component results
        let mut joined: Option<Vec<Row>> = None;
        for component in components(relations) {
            let mut pending: Vec<usize> = component;
            let first = pending.remove(0);
            let mut rows = self.table(&relations[first].name)?.rows.clone();
            let mut covered = relations[first].attribute_names();

            while !pending.is_empty() {
                let position = pending
                    .iter()
                    .position(|&index| {
                        relations[index]
                            .attributes
                            .keys()
                            .any(|attribute| covered.contains(attribute))
                    })
                    .unwrap_or(0);
                let index = pending.remove(position);
                let relation = &relations[index];

                let shared: BTreeSet<String> = relation
                    .attributes
                    .keys()
                    .filter(|attribute| covered.contains(*attribute))
                    .cloned()
                    .collect();
                rows = join_rows(&rows, &self.table(&relation.name)?.rows, &shared);
                covered.extend(relation.attributes.keys().cloned());
            }

            joined = Some(match joined {
                None => rows,
                Some(accumulated) => {
                    let mut product = Vec::new();
                    for left in &accumulated {
                        for right in &rows {
                            product.push(left.merge(right));
                        }
                    }
                    product
                }
            });
        }

        let projection: BTreeSet<String> = attributes.keys().cloned().collect();
        Ok(joined
            .unwrap_or_default()
            .iter()
            .map(|row| row.project(&projection))
            .collect())
    }

    fn create_table(&mut self, relation: &Relation) -> Result<(), Error> {
        if self.tables.contains_key(&relation.name) {
            log::debug!("table \"{}\" already exists", relation.name);
            return Ok(());
        }
        self.add_table(relation.clone(), Vec::new());
        Ok(())
    }

    fn rows(&self, relation: &Relation) -> Result<Vec<Row>, Error> {
        Ok(self.table(&relation.name)?.rows.clone())
    }

    fn insert_rows(&mut self, relation: &Relation, rows: &[Row]) -> Result<(), Error> {
        self.table_mut(&relation.name)?.rows.extend_from_slice(rows);
        Ok(())
    }

    fn delete_rows(&mut self, relation: &Relation, rows: &[Row]) -> Result<(), Error> {
        let table = self.table_mut(&relation.name)?;
        table.rows.retain(|row| !rows.contains(row));
        Ok(())
    }

    fn delete_unsatisfied(
        &mut self,
        relation: &Relation,
        constraint: &Constraint,
        filter: &Constraint,
    ) -> Result<(), Error> {
        let table = self.table_mut(&relation.name)?;
        table
            .rows
            .retain(|row| !filter.satisfied_by(row) || constraint.satisfied_by(row));
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::collections::{BTreeMap, BTreeSet};

    use crate::constraints::{ComparisonOperator, Constraint, Predicate};
    use crate::error::Error;
    use crate::model::{schema, AttributeType, FunctionalDependency, Relation, Row, Value};
    use crate::storage::DataStore;

    use super::MemoryStore;

    fn relation(name: &str, attributes: &[(&str, AttributeType)], pk: &[&str]) -> Relation {
        Relation::new(
            name,
            attributes
                .iter()
                .map(|(attribute, attribute_type)| (attribute.to_string(), *attribute_type))
                .collect(),
            pk.iter().map(|attribute| attribute.to_string()).collect(),
        )
    }

    fn row(values: &[(&str, Value)]) -> Row {
        values
            .iter()
            .map(|(attribute, value)| (attribute.to_string(), value.clone()))
            .collect()
    }

    fn store() -> (MemoryStore, Relation, Relation) {
        let film = relation(
            "film",
            &[
                ("film_id", AttributeType::Integer),
                ("title", AttributeType::Text),
                ("category_id", AttributeType::Integer),
            ],
            &["film_id"],
        );
        let category = relation(
            "category",
            &[
                ("category_id", AttributeType::Integer),
                ("category", AttributeType::Text),
            ],
            &["category_id"],
        );

        let mut store = MemoryStore::new();
        store.add_table(film.clone(), Vec::new());
        store.add_table(category.clone(), Vec::new());
        store
            .insert_rows(
                &film,
                &[
                    row(&[
                        ("film_id", Value::Integer(1)),
                        ("title", Value::from("Alien")),
                        ("category_id", Value::Integer(7)),
                    ]),
                    row(&[
                        ("film_id", Value::Integer(2)),
                        ("title", Value::from("Brazil")),
                        ("category_id", Value::Null),
                    ]),
                ],
            )
            .unwrap();
        store
            .insert_rows(
                &category,
                &[row(&[
                    ("category_id", Value::Integer(7)),
                    ("category", Value::from("Horror")),
                ])],
            )
            .unwrap();
        (store, film, category)
    }

    #[test]
    fn schema_reports_key_dependencies() {
        let (store, film, category) = store();
        let (relations, dependencies) = store.schema().unwrap();

        assert_eq!(relations, vec![category, film]);
        assert_eq!(
            dependencies,
            vec![
                FunctionalDependency::new(["category_id"], ["category"]),
                FunctionalDependency::new(["film_id"], ["category_id", "title"]),
            ]
        );
    }

    #[test]
    fn empty_store_has_no_schema() {
        assert!(matches!(
            MemoryStore::new().schema(),
            Err(Error::EmptySchema)
        ));
    }

    #[test]
    fn natural_join_matches_shared_attributes() {
        let (store, film, category) = store();
        let context = [film, category];
        let attributes = schema::all_attributes(&context);

        let rows = store.natural_join(&context, &attributes).unwrap();

        // film 2 carries a null join key and drops out
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("title"), &Value::from("Alien"));
        assert_eq!(rows[0].value("category"), &Value::from("Horror"));
    }

    #[test]
    fn disconnected_relations_produce_the_cross_product() {
        let left = relation("left", &[("A", AttributeType::Integer)], &["A"]);
        let right = relation("right", &[("B", AttributeType::Integer)], &["B"]);

        let mut store = MemoryStore::new();
        store.add_table(left.clone(), Vec::new());
        store.add_table(right.clone(), Vec::new());
        store
            .insert_rows(
                &left,
                &[
                    row(&[("A", Value::Integer(1))]),
                    row(&[("A", Value::Integer(2))]),
                ],
            )
            .unwrap();
        store
            .insert_rows(
                &right,
                &[
                    row(&[("B", Value::Integer(10))]),
                    row(&[("B", Value::Integer(20))]),
                ],
            )
            .unwrap();

        let context = [left, right];
        let rows = store
            .natural_join(&context, &schema::all_attributes(&context))
            .unwrap();
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn join_result_is_projected() {
        let (store, film, _) = store();
        let attributes: BTreeMap<String, AttributeType> =
            [("title".to_string(), AttributeType::Text)].into_iter().collect();

        let rows = store.natural_join(&[film], &attributes).unwrap();

        assert_eq!(rows.len(), 2);
        for row in &rows {
            assert_eq!(row.len(), 1);
            assert!(row.get("film_id").is_none());
        }
    }

    #[test]
    fn unknown_relation_is_an_error() {
        let (store, ..) = store();
        let stranger = relation("stranger", &[("A", AttributeType::Integer)], &[]);
        assert!(matches!(
            store.rows(&stranger),
            Err(Error::UnknownRelation { .. })
        ));
    }

    #[test]
    fn create_table_leaves_existing_rows() {
        let (mut store, film, _) = store();
        store.create_table(&film).unwrap();
        assert_eq!(store.rows(&film).unwrap().len(), 2);
    }

    #[test]
    fn delete_rows_removes_all_equal_rows() {
        let target = relation("t", &[("A", AttributeType::Integer)], &[]);
        let mut store = MemoryStore::new();
        store.create_table(&target).unwrap();
        store
            .insert_rows(
                &target,
                &[
                    row(&[("A", Value::Integer(1))]),
                    row(&[("A", Value::Integer(1))]),
                    row(&[("A", Value::Integer(2))]),
                ],
            )
            .unwrap();

        store
            .delete_rows(&target, &[row(&[("A", Value::Integer(1))])])
            .unwrap();
        assert_eq!(
            store.rows(&target).unwrap(),
            vec![row(&[("A", Value::Integer(2))])]
        );
    }

    #[test]
    fn delete_unsatisfied_respects_the_filter() {
        let target = relation(
            "t",
            &[("A", AttributeType::Integer), ("B", AttributeType::Integer)],
            &[],
        );
        let mut store = MemoryStore::new();
        store.create_table(&target).unwrap();
        store
            .insert_rows(
                &target,
                &[
                    row(&[("A", Value::Integer(1)), ("B", Value::Integer(1))]),
                    row(&[("A", Value::Integer(1)), ("B", Value::Integer(2))]),
                    row(&[("A", Value::Integer(2)), ("B", Value::Integer(2))]),
                ],
            )
            .unwrap();

        let constraint = Constraint::new(vec![vec![Predicate::new(
            "B",
            ComparisonOperator::Equal,
            Value::Integer(1),
        )]]);
        let filter = Constraint::new(vec![vec![Predicate::new(
            "A",
            ComparisonOperator::Equal,
            Value::Integer(1),
        )]]);

        store.delete_unsatisfied(&target, &constraint, &filter).unwrap();

        // the A=2 row violates the constraint but sits outside the filter
        let remaining = store.rows(&target).unwrap();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains(&row(&[("A", Value::Integer(2)), ("B", Value::Integer(2))])));
    }

    #[test]
    fn three_way_join_chains_through_shared_attributes() {
        let r1 = relation(
            "r1",
            &[("A", AttributeType::Integer), ("B", AttributeType::Integer)],
            &["A"],
        );
        let r2 = relation(
            "r2",
            &[("B", AttributeType::Integer), ("C", AttributeType::Integer)],
            &["B"],
        );
        let r3 = relation(
            "r3",
            &[("C", AttributeType::Integer), ("D", AttributeType::Integer)],
            &["C"],
        );

        let mut store = MemoryStore::new();
        store.add_table(r1.clone(), Vec::new());
        store.add_table(r2.clone(), Vec::new());
        store.add_table(r3.clone(), Vec::new());
        store
            .insert_rows(
                &r1,
                &[row(&[("A", Value::Integer(1)), ("B", Value::Integer(2))])],
            )
            .unwrap();
        store
            .insert_rows(
                &r2,
                &[row(&[("B", Value::Integer(2)), ("C", Value::Integer(3))])],
            )
            .unwrap();
        store
            .insert_rows(
                &r3,
                &[
                    row(&[("C", Value::Integer(3)), ("D", Value::Integer(4))]),
                    row(&[("C", Value::Integer(9)), ("D", Value::Integer(9))]),
                ],
            )
            .unwrap();

        let context = [r1, r2, r3];
        let rows = store
            .natural_join(&context, &schema::all_attributes(&context))
            .unwrap();

        assert_eq!(
            rows,
            vec![row(&[
                ("A", Value::Integer(1)),
                ("B", Value::Integer(2)),
                ("C", Value::Integer(3)),
                ("D", Value::Integer(4)),
            ])]
        );
    }
}
