//! Row insertion: one set of `(class, descriptor) -> value` pairs becomes one
//! linked group of objects.

use crate::{ClassEdge, GraphStore, ObjectId, Value};
use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// `(class, descriptor) -> value`
pub type DataRow = BTreeMap<(String, String), Value>;

/// Objects a row was bound to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowBinding {
    /// class -> object holding that class's part of the row
    pub objects: BTreeMap<String, ObjectId>,
    /// objects created for this row (the rest were reused)
    pub created: BTreeSet<ObjectId>,
}

/// class -> planned object; `None` means a fresh member
type Plan = BTreeMap<String, Option<ObjectId>>;

/// Insert one row.
///
/// Binding rules, per class touched by the row (plus every class in
/// `existing`):
/// - `existing[class]` is used as is
/// - classes in `unique` always get a fresh member
/// - any other class reuses a direct member whose descriptors equal all row
///   values for that class, or gets a fresh member
///
/// A member is only reused when its outward edges agree with the rest of the
/// row. Outward means pointing away from the anchor classes (`unique` and
/// `existing`): a reused `Site` already `Located_In` one `Region` is not
/// bound to a row naming another region. Classes whose pick conflicts are
/// re-planned as fresh until the plan is consistent.
///
/// Row values are then written to the bound objects and every edge in
/// `relations` whose endpoints are both bound is linked.
pub fn add_data_row<S: GraphStore + ?Sized>(
    store: &mut S,
    row: &DataRow,
    relations: &BTreeSet<ClassEdge>,
    unique: &BTreeSet<String>,
    existing: &BTreeMap<String, ObjectId>,
) -> Result<RowBinding> {
    let mut by_class: BTreeMap<&str, Vec<(&str, &Value)>> = BTreeMap::new();
    for ((class, descriptor), value) in row {
        by_class
            .entry(class.as_str())
            .or_default()
            .push((descriptor.as_str(), value));
    }
    for class in by_class.keys() {
        if !existing.contains_key(*class) {
            store.add_class(class);
        }
    }

    let depths = anchor_depths(&by_class, relations, unique, existing);
    let mut forced: BTreeSet<String> = BTreeSet::new();
    let plan = loop {
        let plan = plan_row(&*store, &by_class, relations, unique, existing, &depths, &forced);
        let conflicts: Vec<String> = plan
            .iter()
            .filter(|(class, _)| !existing.contains_key(*class))
            .filter_map(|(class, slot)| slot.map(|object| (class, object)))
            .filter(|(class, object)| !fits_neighbors(&*store, *object, class, &plan, relations, &depths))
            .map(|(class, _)| class.clone())
            .collect();
        if conflicts.is_empty() {
            break plan;
        }
        tracing::trace!(classes = ?conflicts, "reused members conflict with the row; binding fresh");
        forced.extend(conflicts);
    };

    let mut binding = RowBinding::default();
    for (class, slot) in plan {
        let object = match slot {
            Some(object) => object,
            None => {
                let object = store.add_member(&class)?;
                binding.created.insert(object);
                object
            }
        };
        binding.objects.insert(class, object);
    }

    for (class, values) in &by_class {
        let Some(&object) = binding.objects.get(*class) else {
            continue;
        };
        for (descriptor, value) in values {
            store.set_descriptor(object, descriptor, (*value).clone())?;
        }
    }

    for edge in relations {
        let (Some(&source), Some(&target)) =
            (binding.objects.get(&edge.from), binding.objects.get(&edge.to))
        else {
            continue;
        };
        if source == target {
            continue;
        }
        store.add_relation(source, target, &edge.label)?;
    }

    Ok(binding)
}

fn plan_row<S: GraphStore + ?Sized>(
    store: &S,
    by_class: &BTreeMap<&str, Vec<(&str, &Value)>>,
    relations: &BTreeSet<ClassEdge>,
    unique: &BTreeSet<String>,
    existing: &BTreeMap<String, ObjectId>,
    depths: &BTreeMap<String, usize>,
    forced: &BTreeSet<String>,
) -> Plan {
    let mut plan: Plan = existing
        .iter()
        .map(|(class, object)| (class.clone(), Some(*object)))
        .collect();

    for (class, values) in by_class {
        if plan.contains_key(*class) {
            continue;
        }
        let reused = if unique.contains(*class) || forced.contains(*class) {
            None
        } else {
            store.class_members(class, true).into_iter().find(|&member| {
                matches_values(store, member, values)
                    && fits_neighbors(store, member, class, &plan, relations, depths)
            })
        };
        plan.insert(class.to_string(), reused);
    }
    plan
}

fn matches_values<S: GraphStore + ?Sized>(store: &S, member: ObjectId, values: &[(&str, &Value)]) -> bool {
    values
        .iter()
        .all(|(descriptor, value)| store.get_descriptor(member, descriptor).as_ref() == Some(*value))
}

/// Whether `member`, bound for `class`, has no outward edge to an object of a
/// planned neighbor class other than the one planned for it.
fn fits_neighbors<S: GraphStore + ?Sized>(
    store: &S,
    member: ObjectId,
    class: &str,
    plan: &Plan,
    relations: &BTreeSet<ClassEdge>,
    depths: &BTreeMap<String, usize>,
) -> bool {
    let edges = store.object_relations(member);
    relations.iter().all(|edge| {
        let (label, other) = if edge.from == class && edge.to != class {
            (edge.label.clone(), edge.to.as_str())
        } else if edge.to == class && edge.from != class {
            (store.reverse_relation(&edge.label), edge.from.as_str())
        } else {
            return true;
        };
        let Some(planned) = plan.get(other) else {
            return true;
        };
        if !is_outward(depths, class, other) {
            return true;
        }
        edges
            .iter()
            .filter(|(peer, l)| *l == label && store.object_classes(*peer).iter().any(|c| c == other))
            .all(|(peer, _)| Some(*peer) == *planned)
    })
}

fn is_outward(depths: &BTreeMap<String, usize>, from: &str, to: &str) -> bool {
    match (depths.get(from), depths.get(to)) {
        (Some(a), Some(b)) => a <= b,
        _ => true,
    }
}

/// Edge distance of each row class from the nearest anchor class.
fn anchor_depths(
    by_class: &BTreeMap<&str, Vec<(&str, &Value)>>,
    relations: &BTreeSet<ClassEdge>,
    unique: &BTreeSet<String>,
    existing: &BTreeMap<String, ObjectId>,
) -> BTreeMap<String, usize> {
    let row_classes: BTreeSet<&str> = by_class
        .keys()
        .copied()
        .chain(existing.keys().map(String::as_str))
        .collect();

    let mut depths: BTreeMap<String, usize> = BTreeMap::new();
    let mut queue = VecDeque::new();
    for class in &row_classes {
        if unique.contains(*class) || existing.contains_key(*class) {
            depths.insert(class.to_string(), 0);
            queue.push_back(*class);
        }
    }

    while let Some(class) = queue.pop_front() {
        let depth = depths[class];
        for edge in relations {
            let next = if edge.from == class {
                edge.to.as_str()
            } else if edge.to == class {
                edge.from.as_str()
            } else {
                continue;
            };
            if !row_classes.contains(next) || depths.contains_key(next) {
                continue;
            }
            depths.insert(next.to_string(), depth + 1);
            queue.push_back(next);
        }
    }
    depths
}
