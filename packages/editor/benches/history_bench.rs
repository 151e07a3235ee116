use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::cell::Cell;
use std::rc::Rc;
use undograph_editor::{
    ChangeQueue, EventSource, GraphChangeQueue, GraphUndoManager, UndoManager, UndoManagerFactory,
};

struct Counter {
    value: Rc<Cell<i64>>,
    changes: EventSource<i64>,
    manager: GraphUndoManager<i64>,
}

impl Counter {
    fn new(merge: bool) -> Self {
        let value = Rc::new(Cell::new(0));
        let changes = EventSource::new();
        let (doc, source) = (Rc::clone(&value), changes.clone());
        let manager = UndoManagerFactory::unlimited_history(
            &changes,
            |delta: &i64| -delta,
            move |delta: &i64| {
                doc.set(doc.get() + delta);
                source.emit(delta);
            },
            move |a: &i64, b: &i64| merge.then(|| a + b),
        );
        Self {
            value,
            changes,
            manager,
        }
    }

    fn edit(&self, delta: i64) {
        self.value.set(self.value.get() + delta);
        self.changes.emit(&delta);
    }
}

fn record_edits(c: &mut Criterion) {
    c.bench_function("record_1000_edits", |b| {
        b.iter_batched(
            || Counter::new(false),
            |counter| {
                for delta in 1..=1000 {
                    counter.manager.prevent_merge();
                    counter.edit(black_box(delta));
                }
                counter
            },
            BatchSize::SmallInput,
        )
    });

    c.bench_function("merge_1000_edits", |b| {
        b.iter_batched(
            || Counter::new(true),
            |counter| {
                for delta in 1..=1000 {
                    counter.edit(black_box(delta));
                }
                counter
            },
            BatchSize::SmallInput,
        )
    });
}

fn undo_redo_cycle(c: &mut Criterion) {
    let counter = Counter::new(false);
    for delta in 1..=1000 {
        counter.manager.prevent_merge();
        counter.edit(delta);
    }

    c.bench_function("undo_redo_100_steps", |b| {
        b.iter(|| {
            for _ in 0..100 {
                counter.manager.undo().ok();
            }
            for _ in 0..100 {
                counter.manager.redo().ok();
            }
            black_box(counter.value.get())
        })
    });
}

fn branching_queue(c: &mut Criterion) {
    c.bench_function("graph_queue_100_forks", |b| {
        b.iter(|| {
            let mut queue = GraphChangeQueue::new();
            for fork in 0..100u32 {
                queue.push(fork).ok();
                queue.push(fork + 1).ok();
                queue.update_graph_with_undo(&(fork + 1)).ok();
            }
            black_box(queue.node_count())
        })
    });

    c.bench_function("graph_queue_capacity_trim", |b| {
        b.iter(|| {
            let mut queue = GraphChangeQueue::with_capacity(Some(64));
            for change in 0..1000u32 {
                queue.push(black_box(change)).ok();
            }
            black_box(queue.undo_depth())
        })
    });
}

criterion_group!(benches, record_edits, undo_redo_cycle, branching_queue);
criterion_main!(benches);
