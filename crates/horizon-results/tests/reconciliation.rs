//! Integration tests for change batch reconciliation.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use horizon_results::collections::{OrderedSet, SortDescriptor, SortDescriptors, SortUsing};
use horizon_results::controller::{
    ChangeBatch, ChangeKind, ContentChanges, IndexPath, ObjectChange, PlaceholderChange,
    ResultsController, SectionChange,
};
use horizon_results::diff::ChangeSet;
use horizon_results::logging::targets;
use parking_lot::Mutex;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::Layer;

// A row whose group and rank can change while its identity (the id) stays
// the same. Rows sort by rank, then id.
#[derive(Debug)]
struct Record {
    id: u32,
    group: Mutex<&'static str>,
    rank: Mutex<u32>,
}

#[derive(Debug, Clone)]
struct Row(Arc<Record>);

impl Row {
    fn new(id: u32, group: &'static str) -> Self {
        Row(Arc::new(Record {
            id,
            group: Mutex::new(group),
            rank: Mutex::new(0),
        }))
    }

    fn group(&self) -> &'static str {
        *self.0.group.lock()
    }

    fn set_group(&self, group: &'static str) {
        *self.0.group.lock() = group;
    }

    fn rank(&self) -> u32 {
        *self.0.rank.lock()
    }

    fn set_rank(&self, rank: u32) {
        *self.0.rank.lock() = rank;
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for Row {}

impl Hash for Row {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

fn grouped_controller() -> ResultsController<&'static str, Row> {
    ResultsController::builder()
        .section_key(|row: &Row| Some(row.group()))
        .sort_by(|a: &Row, b: &Row| (a.rank(), a.0.id).cmp(&(b.rank(), b.0.id)))
        .build()
}

type Content<S, T> = Vec<(Option<S>, Vec<T>)>;

fn content<S, T>(controller: &ResultsController<S, T>) -> Content<S, T>
where
    S: horizon_results::controller::SectionValue,
    T: horizon_results::controller::Element,
{
    (0..controller.number_of_sections())
        .filter_map(|section| controller.section_info(section))
        .map(|info| (info.key().clone(), info.objects().to_vec()))
        .collect()
}

fn object_at<S, T: Clone>(content: &Content<S, T>, path: IndexPath) -> Option<T> {
    content
        .get(path.section)
        .and_then(|(_, objects)| objects.get(path.item))
        .cloned()
}

/// Applies `changes` to `old` the way a collection view would: deletions and
/// move origins come out at old positions, highest first, then deleted
/// sections; inserted sections arrive with their content, then insertions
/// and move destinations go in at new positions, lowest first.
fn replay<S, T>(old: &Content<S, T>, new: &Content<S, T>, changes: &ContentChanges<S, T>) -> Content<S, T>
where
    S: Clone,
    T: Clone,
{
    let deleted_sections: HashSet<usize> = changes
        .section_changes
        .iter()
        .filter(|change| change.kind == ChangeKind::Delete)
        .filter_map(|change| change.at.map(|at| at.section))
        .collect();
    let mut sections = old.clone();

    let mut removals: Vec<IndexPath> = changes
        .object_changes
        .iter()
        .filter(|change| matches!(change.kind, ChangeKind::Delete | ChangeKind::Move { .. }))
        .filter_map(|change| change.at)
        .filter(|at| !deleted_sections.contains(&at.section))
        .collect();
    removals.sort_unstable_by(|a, b| b.cmp(a));
    for at in removals {
        sections[at.section].1.remove(at.item);
    }
    let mut deleted_sections: Vec<usize> = deleted_sections.into_iter().collect();
    deleted_sections.sort_unstable_by(|a, b| b.cmp(a));
    for section in deleted_sections {
        sections.remove(section);
    }

    let mut inserted_sections: Vec<usize> = changes
        .section_changes
        .iter()
        .filter_map(|change| match change.kind {
            ChangeKind::Insert { to } => Some(to.section),
            _ => None,
        })
        .collect();
    inserted_sections.sort_unstable();
    for section in inserted_sections {
        sections.insert(section, new[section].clone());
    }

    let mut arrivals: Vec<(IndexPath, T)> = changes
        .object_changes
        .iter()
        .filter_map(|change| change.kind.destination().map(|to| (to, change.object.clone())))
        .collect();
    arrivals.sort_by_key(|(to, _)| *to);
    for (to, object) in arrivals {
        sections[to.section].1.insert(to.item, object);
    }
    sections
}

/// Every reported position must address the reported value: old positions
/// in the old content, new positions in the new content. Replaying the
/// changes on the old content must then produce the new content.
fn assert_consistent<S, T>(old: &Content<S, T>, new: &Content<S, T>, changes: &ContentChanges<S, T>)
where
    S: Clone + PartialEq + std::fmt::Debug,
    T: Clone + Eq + Hash + std::fmt::Debug,
{
    for change in &changes.section_changes {
        if let Some(at) = change.at {
            assert_eq!(old[at.section].0, change.section, "section {change:?}");
        }
        if let Some(to) = change.kind.destination() {
            assert_eq!(new[to.section].0, change.section, "section {change:?}");
        }
    }

    let mut seen = HashSet::new();
    for change in &changes.object_changes {
        assert!(seen.insert(change.object.clone()), "reported twice: {change:?}");
        match change.kind {
            ChangeKind::Insert { .. } => assert!(change.at.is_none()),
            _ => {
                let at = change.at.expect("old position");
                assert_eq!(object_at(old, at).as_ref(), Some(&change.object), "{change:?}");
            }
        }
        if let Some(to) = change.kind.destination() {
            assert_eq!(object_at(new, to).as_ref(), Some(&change.object), "{change:?}");
        }
    }

    assert_eq!(&replay(old, new, changes), new, "replaying {changes:?}");
}

#[test]
fn cross_section_update_is_a_single_move() {
    let rows: Vec<Row> = [(1, "x"), (2, "x"), (3, "x"), (4, "y"), (5, "y")]
        .into_iter()
        .map(|(id, group)| Row::new(id, group))
        .collect();
    let controller = grouped_controller();
    controller.set_content([
        (Some("x"), rows[..3].to_vec()),
        (Some("y"), rows[3..].to_vec()),
    ]);
    let old = content(&controller);

    rows[1].set_group("y");
    let changes = controller.update_objects([rows[1].clone()]).unwrap();

    assert!(changes.section_changes.is_empty());
    assert_eq!(
        changes.object_changes,
        vec![ObjectChange {
            object: rows[1].clone(),
            at: Some(IndexPath::new(0, 1)),
            kind: ChangeKind::Move {
                to: IndexPath::new(1, 0)
            },
        }]
    );
    assert_consistent(&old, &content(&controller), &changes);
}

#[test]
fn same_section_resort_reports_a_move() {
    let rows: Vec<Row> = (1..=4).map(|id| Row::new(id, "x")).collect();
    let controller = grouped_controller();
    controller.set_content([(Some("x"), rows.clone())]);
    let old = content(&controller);

    rows[0].set_rank(5);
    let changes = controller.update_objects([rows[0].clone()]).unwrap();

    assert!(changes.section_changes.is_empty());
    assert_eq!(
        changes.object_changes,
        vec![ObjectChange {
            object: rows[0].clone(),
            at: Some(IndexPath::new(0, 0)),
            kind: ChangeKind::Move {
                to: IndexPath::new(0, 3)
            },
        }]
    );
    assert_eq!(
        controller.section_info(0).unwrap().objects().to_vec(),
        vec![rows[1].clone(), rows[2].clone(), rows[3].clone(), rows[0].clone()]
    );
    assert_consistent(&old, &content(&controller), &changes);

    // An update that keeps its place is reported in place.
    let old = content(&controller);
    rows[2].set_rank(0);
    let changes = controller.update_objects([rows[2].clone()]).unwrap();
    assert_eq!(
        changes.object_changes,
        vec![ObjectChange {
            object: rows[2].clone(),
            at: Some(IndexPath::new(0, 1)),
            kind: ChangeKind::Update,
        }]
    );
    assert_consistent(&old, &content(&controller), &changes);
}

#[test]
fn last_object_leaving_deletes_its_section() {
    let one = Row::new(1, "x");
    let four = Row::new(4, "y");
    let controller = grouped_controller();
    controller.set_content([(Some("x"), vec![one.clone()]), (Some("y"), vec![four.clone()])]);
    let old = content(&controller);

    one.set_group("y");
    let changes = controller.update_objects([one.clone()]).unwrap();

    assert_eq!(
        changes.section_changes,
        vec![SectionChange {
            section: Some("x"),
            at: Some(IndexPath::for_section(0)),
            kind: ChangeKind::Delete,
        }]
    );
    assert_eq!(
        changes.object_changes,
        vec![ObjectChange {
            object: one.clone(),
            at: Some(IndexPath::new(0, 0)),
            kind: ChangeKind::Move {
                to: IndexPath::new(0, 0)
            },
        }]
    );
    assert_eq!(controller.sections(), vec![Some("y")]);
    assert_consistent(&old, &content(&controller), &changes);
}

#[test]
fn update_into_other_section_deletes_emptied_one() {
    let rows: Vec<Row> = [(1, "X"), (2, "X"), (3, "Y")]
        .into_iter()
        .map(|(id, group)| Row::new(id, group))
        .collect();
    let controller = grouped_controller();
    controller.set_content([
        (Some("X"), rows[..2].to_vec()),
        (Some("Y"), rows[2..].to_vec()),
    ]);
    let old = content(&controller);

    rows[2].set_group("X");
    let changes = controller.update_objects([rows[2].clone()]).unwrap();

    assert_eq!(
        changes.section_changes,
        vec![SectionChange {
            section: Some("Y"),
            at: Some(IndexPath::for_section(1)),
            kind: ChangeKind::Delete,
        }]
    );
    assert_eq!(
        changes.object_changes,
        vec![ObjectChange {
            object: rows[2].clone(),
            at: Some(IndexPath::new(1, 0)),
            kind: ChangeKind::Move {
                to: IndexPath::new(0, 2)
            },
        }]
    );
    assert_consistent(&old, &content(&controller), &changes);
}

#[test]
fn move_into_new_section_reports_section_insert_and_delete() {
    let one = Row::new(1, "x");
    let two = Row::new(2, "x");
    let controller = grouped_controller();
    controller.set_content([(Some("x"), vec![one.clone(), two.clone()])]);
    let old = content(&controller);

    two.set_group("z");
    let changes = controller.update_objects([two.clone()]).unwrap();

    assert_eq!(
        changes.section_changes,
        vec![SectionChange {
            section: Some("z"),
            at: None,
            kind: ChangeKind::Insert {
                to: IndexPath::for_section(1)
            },
        }]
    );
    assert_eq!(
        changes.object_changes,
        vec![ObjectChange {
            object: two.clone(),
            at: Some(IndexPath::new(0, 1)),
            kind: ChangeKind::Delete,
        }]
    );
    assert_consistent(&old, &content(&controller), &changes);
}

#[test]
fn manual_cross_section_move_keeps_position() {
    let controller = ResultsController::<&'static str, Row>::builder()
        .section_key(|row: &Row| Some(row.group()))
        .build();
    let rows: Vec<Row> = [(1, "a"), (2, "a"), (3, "b"), (4, "b")]
        .into_iter()
        .map(|(id, group)| Row::new(id, group))
        .collect();
    controller.set_content([
        (Some("a"), rows[..2].to_vec()),
        (Some("b"), rows[2..].to_vec()),
    ]);
    let old = content(&controller);

    let changes = controller
        .move_object(rows[0].clone(), IndexPath::new(1, 1))
        .unwrap();

    assert_eq!(
        controller.section_info(1).unwrap().objects().to_vec(),
        vec![rows[2].clone(), rows[0].clone(), rows[3].clone()]
    );
    assert_eq!(changes.object_changes.len(), 1);
    assert_eq!(
        changes.object_changes[0].kind,
        ChangeKind::Move {
            to: IndexPath::new(1, 1)
        }
    );
    assert_consistent(&old, &content(&controller), &changes);
}

#[test]
fn placeholder_follows_emptiness() {
    let controller = ResultsController::<u8, u32>::builder()
        .section_key(|n: &u32| Some((n % 3) as u8))
        .empty_placeholder(true)
        .build();

    let changes = controller.insert_objects([1, 4]).unwrap();
    assert_eq!(
        changes.placeholder_changes,
        vec![PlaceholderChange {
            at: Some(IndexPath::zero()),
            kind: ChangeKind::Delete,
        }]
    );

    let changes = controller.insert_objects([7]).unwrap();
    assert!(changes.placeholder_changes.is_empty());

    let changes = controller.delete_objects([1, 4, 7]).unwrap();
    assert_eq!(
        changes.placeholder_changes,
        vec![PlaceholderChange {
            at: None,
            kind: ChangeKind::Insert {
                to: IndexPath::zero()
            },
        }]
    );
    assert!(controller.is_empty());
}

#[test]
fn placeholder_disabled_by_default() {
    let controller = ResultsController::<u8, u32>::new();
    let changes = controller.insert_objects([1]).unwrap();
    assert!(changes.placeholder_changes.is_empty());
}

#[test]
fn slots_observe_updated_content() {
    let controller = Arc::new(grouped_controller());
    let one = Row::new(1, "x");
    controller.set_content([(Some("x"), vec![one.clone()])]);

    let log = Arc::new(Mutex::new(Vec::new()));
    let (c, l) = (controller.clone(), log.clone());
    controller.signals().will_change_content.connect(move |_| l.lock().push("will".to_string()));
    let l = log.clone();
    controller.signals().object_changed.connect(move |change| {
        let path = c.index_path_of(&change.object);
        l.lock().push(format!("object {path:?}"));
    });
    let l = log.clone();
    controller.signals().did_change_content.connect(move |_| l.lock().push("did".to_string()));

    controller.insert_objects([Row::new(0, "x")]).unwrap();

    assert_eq!(
        *log.lock(),
        vec![
            "will".to_string(),
            format!("object {:?}", Some(IndexPath::new(0, 0))),
            "did".to_string(),
        ]
    );
}

#[test]
#[should_panic(expected = "RE-ENTRANT MUTATION")]
fn mutating_from_a_slot_panics() {
    let controller = Arc::new(ResultsController::<u8, u32>::new());
    let c = controller.clone();
    controller.signals().object_changed.connect(move |_| {
        let _ = c.insert_objects([99]);
    });
    let _ = controller.insert_objects([1, 2]);
    let _ = controller.insert_objects([3]);
}

/// Records the target and message of every event.
struct EventLog(Arc<Mutex<Vec<(String, String)>>>);

struct MessageField<'a>(&'a mut String);

impl tracing::field::Visit for MessageField<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> Layer<S> for EventLog {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut MessageField(&mut message));
        self.0
            .lock()
            .push((event.metadata().target().to_string(), message));
    }
}

#[test]
fn skipped_changes_log_under_the_controller_target() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(EventLog(events.clone()));

    tracing::subscriber::with_default(subscriber, || {
        let controller = ResultsController::<u8, u32>::new();
        controller.insert_objects([1]).unwrap();
        controller.update_objects([7]).unwrap();
        controller.delete_objects([8]).unwrap();
        controller.insert_objects([1]).unwrap();
    });

    let events = events.lock();
    for message in [
        "skipping update of unknown object",
        "skipping deletion of unknown object",
        "skipping insertion of known object",
    ] {
        assert!(
            events
                .iter()
                .any(|(target, logged)| target == targets::CONTROLLER && logged == message),
            "{message:?} not logged under {}: {events:?}",
            targets::CONTROLLER
        );
    }
    assert!(events.iter().any(|(target, _)| target == targets::SIGNAL));
}

#[test]
fn change_set_apply_reproduces_target() {
    let mut rng = SmallRng::seed_from_u64(0x5eed);
    let universe: Vec<u32> = (0..24).collect();

    for _ in 0..500 {
        let mut source = universe.clone();
        source.shuffle(&mut rng);
        source.truncate(rng.gen_range(0..universe.len()));
        let mut target = universe.clone();
        target.shuffle(&mut rng);
        target.truncate(rng.gen_range(0..universe.len()));
        let forced: HashSet<u32> = universe.iter().copied().filter(|_| rng.gen_bool(0.2)).collect();

        let source_set: OrderedSet<u32> = source.iter().copied().collect();
        let target_set: OrderedSet<u32> = target.iter().copied().collect();
        let changes = ChangeSet::between(&source_set, &target_set, &forced);

        assert!(changes.is_reduced());
        assert_eq!(changes.apply(&source).unwrap(), target, "{source:?} -> {target:?}");
        for edit in changes.moves() {
            assert_eq!(changes.edits_for(&edit.value), vec![edit.clone()]);
        }
        for edit in changes.substitutions() {
            assert!(forced.contains(&edit.value));
            assert_eq!(source[edit.index], edit.value);
        }
    }
}

#[test]
fn insert_using_keeps_vec_sorted() {
    let mut rng = SmallRng::seed_from_u64(7);
    let chain = vec![
        SortDescriptor::by_key(|pair: &(u8, u8)| pair.0, true),
        SortDescriptor::by_key(|pair: &(u8, u8)| pair.1, false),
    ];
    let mut values: Vec<(u8, u8)> = Vec::new();
    for _ in 0..200 {
        let value = (rng.gen_range(0..6), rng.gen_range(0..6));
        let index = values.insert_using(value, &chain);
        assert_eq!(values[index], value);
    }
    assert!(values.windows(2).all(|w| !chain.is_before(&w[1], &w[0])));
}

#[test]
fn random_batches_keep_content_consistent() {
    const GROUPS: [&str; 4] = ["a", "b", "c", "d"];
    let mut rng = SmallRng::seed_from_u64(42);
    let controller = grouped_controller();
    let mut live: HashMap<u32, Row> = HashMap::new();

    for _ in 0..300 {
        let old = content(&controller);
        let present: Vec<u32> = {
            let mut ids: Vec<u32> = live.keys().copied().collect();
            ids.sort_unstable();
            ids
        };
        let mut batch = ChangeBatch::new();

        let mut deleted = HashSet::new();
        for &id in &present {
            if rng.gen_bool(0.15) {
                deleted.insert(id);
                batch = batch.delete(live[&id].clone());
            }
        }
        for &id in &present {
            if !deleted.contains(&id) && rng.gen_bool(0.2) {
                let row = &live[&id];
                if rng.gen_bool(0.5) {
                    row.set_group(GROUPS[rng.gen_range(0..GROUPS.len())]);
                }
                if rng.gen_bool(0.5) {
                    row.set_rank(rng.gen_range(0..8));
                }
                batch = batch.update(row.clone());
            }
        }
        for _ in 0..rng.gen_range(0..4) {
            let id = rng.gen_range(0..60);
            if !live.contains_key(&id) {
                let row = Row::new(id, GROUPS[rng.gen_range(0..GROUPS.len())]);
                row.set_rank(rng.gen_range(0..8));
                live.insert(id, row.clone());
                batch = batch.insert(row);
            }
        }
        for id in &deleted {
            live.remove(id);
        }

        let changes = controller.apply(batch).unwrap();
        let new = content(&controller);
        assert_consistent(&old, &new, &changes);

        // Sections are sorted, non-empty and hold exactly their rows in
        // (rank, id) order.
        let mut expected: Vec<(&str, Vec<u32>)> = GROUPS
            .iter()
            .map(|&group| {
                let mut keys: Vec<(u32, u32)> = live
                    .values()
                    .filter(|row| row.group() == group)
                    .map(|row| (row.rank(), row.0.id))
                    .collect();
                keys.sort_unstable();
                (group, keys.into_iter().map(|(_, id)| id).collect::<Vec<u32>>())
            })
            .filter(|(_, ids)| !ids.is_empty())
            .collect();
        expected.sort();
        let actual: Vec<(&str, Vec<u32>)> = new
            .iter()
            .map(|(key, rows)| {
                (
                    key.unwrap_or_default(),
                    rows.iter().map(|row| row.0.id).collect(),
                )
            })
            .collect();
        assert_eq!(actual, expected);
    }
}
