//! Row model: leaf rows over host records, optionally grouped under shared keys.
//!
//! The engine does not define grouping semantics. A host [`GroupSpec`] says how a record maps
//! to a group value and, optionally, how a group's aggregate extent is computed.

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use chrono::NaiveDate;

use crate::key::{IdMap, IdSet};

pub type DateFn<T> = Arc<dyn Fn(&T) -> Option<NaiveDate> + Send + Sync>;
pub type IdFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
pub type DependencyFn<T> = Arc<dyn Fn(&T) -> Vec<String> + Send + Sync>;
pub type AggregateFn<T> = Arc<dyn Fn(&GroupRowView<'_, T>) -> GroupAggregate + Send + Sync>;

/// Pure accessors over the host's records.
pub struct Accessors<T> {
    pub row_id: IdFn<T>,
    pub start: DateFn<T>,
    pub end: DateFn<T>,
    /// Ids of the rows this record depends on ("from" side of an edge).
    pub dependencies: Option<DependencyFn<T>>,
}

impl<T> Clone for Accessors<T> {
    fn clone(&self) -> Self {
        Self {
            row_id: Arc::clone(&self.row_id),
            start: Arc::clone(&self.start),
            end: Arc::clone(&self.end),
            dependencies: self.dependencies.clone(),
        }
    }
}

impl<T> Accessors<T> {
    pub fn new(
        row_id: impl Fn(&T) -> String + Send + Sync + 'static,
        start: impl Fn(&T) -> Option<NaiveDate> + Send + Sync + 'static,
        end: impl Fn(&T) -> Option<NaiveDate> + Send + Sync + 'static,
    ) -> Self {
        Self {
            row_id: Arc::new(row_id),
            start: Arc::new(start),
            end: Arc::new(end),
            dependencies: None,
        }
    }

    pub fn with_dependencies(
        mut self,
        dependencies: impl Fn(&T) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.dependencies = Some(Arc::new(dependencies));
        self
    }

    pub fn row_id_of(&self, record: &T) -> String {
        (self.row_id)(record)
    }

    pub fn start_of(&self, record: &T) -> Option<NaiveDate> {
        (self.start)(record)
    }

    pub fn end_of(&self, record: &T) -> Option<NaiveDate> {
        (self.end)(record)
    }

    pub fn dependencies_of(&self, record: &T) -> Vec<String> {
        self.dependencies
            .as_ref()
            .map(|f| f(record))
            .unwrap_or_default()
    }
}

impl<T> core::fmt::Debug for Accessors<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Accessors")
            .field("dependencies", &self.dependencies.is_some())
            .finish_non_exhaustive()
    }
}

/// Aggregate extent of a group row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GroupAggregate {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub count: usize,
}

impl GroupAggregate {
    /// Earliest start and latest end across the group's leaves.
    pub fn min_start_max_end<T>(view: &GroupRowView<'_, T>, accessors: &Accessors<T>) -> Self {
        let mut start: Option<NaiveDate> = None;
        let mut end: Option<NaiveDate> = None;
        for record in view.leaves() {
            if let Some(s) = accessors.start_of(record) {
                start = Some(start.map_or(s, |cur| cur.min(s)));
            }
            if let Some(e) = accessors.end_of(record) {
                end = Some(end.map_or(e, |cur| cur.max(e)));
            }
        }
        Self {
            start,
            end,
            count: view.leaves().len(),
        }
    }
}

/// How the host groups records.
pub struct GroupSpec<T> {
    /// Grouping column id; group row ids are `"{group_key}:{value}"`.
    pub group_key: String,
    pub value_of: Arc<dyn Fn(&T) -> String + Send + Sync>,
    /// When absent, group rows get no bar.
    pub aggregate: Option<AggregateFn<T>>,
    /// Group bars are positioned but not draggable.
    pub fixed_x: bool,
}

impl<T> Clone for GroupSpec<T> {
    fn clone(&self) -> Self {
        Self {
            group_key: self.group_key.clone(),
            value_of: Arc::clone(&self.value_of),
            aggregate: self.aggregate.clone(),
            fixed_x: self.fixed_x,
        }
    }
}

impl<T> GroupSpec<T> {
    pub fn new(
        group_key: impl Into<String>,
        value_of: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            group_key: group_key.into(),
            value_of: Arc::new(value_of),
            aggregate: None,
            fixed_x: false,
        }
    }

    pub fn with_aggregate(
        mut self,
        aggregate: impl Fn(&GroupRowView<'_, T>) -> GroupAggregate + Send + Sync + 'static,
    ) -> Self {
        self.aggregate = Some(Arc::new(aggregate));
        self
    }

    pub fn with_fixed_x(mut self, fixed_x: bool) -> Self {
        self.fixed_x = fixed_x;
        self
    }
}

impl<T: 'static> GroupSpec<T> {
    /// Aggregates groups with [`GroupAggregate::min_start_max_end`].
    pub fn with_min_start_max_end(self, accessors: &Accessors<T>) -> Self {
        let accessors = accessors.clone();
        self.with_aggregate(move |view| GroupAggregate::min_start_max_end(view, &accessors))
    }
}

impl<T> core::fmt::Debug for GroupSpec<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GroupSpec")
            .field("group_key", &self.group_key)
            .field("aggregate", &self.aggregate.is_some())
            .field("fixed_x", &self.fixed_x)
            .finish()
    }
}

/// Which groups show their child rows.
#[derive(Clone, Debug, Default)]
pub enum Expanded {
    #[default]
    All,
    None,
    /// Expanded groups, named by group row id or by group value.
    Values(IdSet),
}

impl Expanded {
    pub fn is_expanded(&self, row_id: &str, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::None => false,
            Self::Values(set) => set.contains(row_id) || set.contains(value),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupTag {
    pub group_key: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowKind {
    Leaf {
        record: usize,
        group: Option<GroupTag>,
    },
    Group {
        tag: GroupTag,
        /// Nesting level, 0 for the outermost spec.
        depth: usize,
        /// Record indexes of every leaf under the group (whether or not they are expanded).
        leaves: Vec<usize>,
        expanded: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub id: String,
    pub kind: RowKind,
}

impl Row {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, RowKind::Group { .. })
    }

    pub fn group_depth(&self) -> Option<usize> {
        match self.kind {
            RowKind::Group { depth, .. } => Some(depth),
            RowKind::Leaf { .. } => None,
        }
    }

    /// The row's own tag for groups, the innermost enclosing tag for leaves.
    pub fn group_tag(&self) -> Option<&GroupTag> {
        match &self.kind {
            RowKind::Leaf { group, .. } => group.as_ref(),
            RowKind::Group { tag, .. } => Some(tag),
        }
    }
}

/// A group row together with its leaf records, handed to aggregate builders.
pub struct GroupRowView<'a, T> {
    pub row_id: &'a str,
    pub group_key: &'a str,
    pub value: &'a str,
    leaves: Vec<&'a T>,
}

impl<'a, T> GroupRowView<'a, T> {
    pub fn leaves(&self) -> &[&'a T] {
        &self.leaves
    }
}

/// The ordered rows shown by the chart plus the records they refer to.
#[derive(Clone, Debug)]
pub struct RowSet<T> {
    records: Vec<T>,
    rows: Vec<Row>,
    index: IdMap<usize>,
    groups: Vec<GroupSpec<T>>,
}

impl<T> Default for RowSet<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            rows: Vec::new(),
            index: IdMap::new(),
            groups: Vec::new(),
        }
    }
}

impl<T> RowSet<T> {
    /// One leaf row per record, in order.
    pub fn flat(records: Vec<T>, row_id: impl Fn(&T) -> String) -> Self {
        let rows = records
            .iter()
            .enumerate()
            .map(|(i, r)| Row {
                id: row_id(r),
                kind: RowKind::Leaf {
                    record: i,
                    group: None,
                },
            })
            .collect();
        Self::from_parts(records, rows)
    }

    /// Nests records under one level of group rows per spec, outermost first.
    ///
    /// Values keep first-seen order within their parent. A group row's id is
    /// `"{group_key}:{value}"`, prefixed with `"{parent_id}/"` below the top level. Children follow
    /// their group row only while it is expanded. With no specs this is [`RowSet::flat`].
    pub fn grouped(
        records: Vec<T>,
        row_id: impl Fn(&T) -> String,
        specs: &[GroupSpec<T>],
        expanded: &Expanded,
    ) -> Self {
        let mut rows = Vec::with_capacity(records.len());
        let all: Vec<usize> = (0..records.len()).collect();
        let nest = Nest {
            records: &records,
            row_id: &row_id,
            specs,
            expanded,
        };
        nest.push_level(0, None, &all, &mut rows);
        let mut set = Self::from_parts(records, rows);
        set.groups = specs.to_vec();
        set
    }

    fn from_parts(records: Vec<T>, rows: Vec<Row>) -> Self {
        let mut index = IdMap::new();
        for (i, row) in rows.iter().enumerate() {
            index.insert(row.id.clone(), i);
        }
        Self {
            records,
            rows,
            index,
            groups: Vec::new(),
        }
    }

    /// The specs this set was grouped by, outermost first.
    pub fn groups(&self) -> &[GroupSpec<T>] {
        &self.groups
    }

    /// The spec that produced a group row.
    pub fn group_spec_of(&self, row: &Row) -> Option<&GroupSpec<T>> {
        let RowKind::Group { tag, depth, .. } = &row.kind else {
            return None;
        };
        self.groups
            .get(*depth)
            .filter(|spec| spec.group_key == tag.group_key)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn index_of(&self, row_id: &str) -> Option<usize> {
        self.index.get(row_id).copied()
    }

    pub fn get(&self, row_id: &str) -> Option<&Row> {
        self.index_of(row_id).and_then(|i| self.rows.get(i))
    }

    /// The record behind a leaf row.
    pub fn record_of(&self, row: &Row) -> Option<&T> {
        match row.kind {
            RowKind::Leaf { record, .. } => self.records.get(record),
            RowKind::Group { .. } => None,
        }
    }

    pub fn group_view<'a>(&'a self, row: &'a Row) -> Option<GroupRowView<'a, T>> {
        let RowKind::Group { tag, leaves, .. } = &row.kind else {
            return None;
        };
        Some(GroupRowView {
            row_id: &row.id,
            group_key: &tag.group_key,
            value: &tag.value,
            leaves: leaves.iter().filter_map(|&i| self.records.get(i)).collect(),
        })
    }

    /// Row heights for a [`crate::RowWindow`]: group rows reserve `group_gap` above themselves,
    /// except the very first row unless `has_first_group_gap`.
    pub fn row_sizes(
        &self,
        row_height: u32,
        group_gap: u32,
        has_first_group_gap: bool,
    ) -> Vec<u32> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                if reserves_group_gap(row, i, has_first_group_gap) {
                    row_height.saturating_add(group_gap)
                } else {
                    row_height
                }
            })
            .collect()
    }
}

struct Nest<'a, T, F> {
    records: &'a [T],
    row_id: &'a F,
    specs: &'a [GroupSpec<T>],
    expanded: &'a Expanded,
}

impl<T, F: Fn(&T) -> String> Nest<'_, T, F> {
    fn push_level(
        &self,
        depth: usize,
        parent: Option<(&str, &GroupTag)>,
        members: &[usize],
        rows: &mut Vec<Row>,
    ) {
        let Some(spec) = self.specs.get(depth) else {
            for &record in members {
                rows.push(Row {
                    id: (self.row_id)(&self.records[record]),
                    kind: RowKind::Leaf {
                        record,
                        group: parent.map(|(_, tag)| tag.clone()),
                    },
                });
            }
            return;
        };

        let mut order: Vec<String> = Vec::new();
        let mut buckets: IdMap<Vec<usize>> = IdMap::new();
        for &i in members {
            let value = (spec.value_of)(&self.records[i]);
            match buckets.get_mut(&value) {
                Some(list) => list.push(i),
                None => {
                    buckets.insert(value.clone(), alloc::vec![i]);
                    order.push(value);
                }
            }
        }

        for value in order {
            let leaves = buckets.remove(&value).unwrap_or_default();
            let local = format!("{}:{}", spec.group_key, value);
            let id = match parent {
                Some((parent_id, _)) => format!("{parent_id}/{local}"),
                None => local,
            };
            let tag = GroupTag {
                group_key: spec.group_key.clone(),
                value,
            };
            let is_open = self.expanded.is_expanded(&id, &tag.value);
            rows.push(Row {
                id: id.clone(),
                kind: RowKind::Group {
                    tag: tag.clone(),
                    depth,
                    leaves: leaves.clone(),
                    expanded: is_open,
                },
            });
            if is_open {
                self.push_level(depth + 1, Some((&id, &tag)), &leaves, rows);
            }
        }
    }
}

pub(crate) fn reserves_group_gap(row: &Row, index: usize, has_first_group_gap: bool) -> bool {
    row.is_group() && (has_first_group_gap || index > 0)
}
