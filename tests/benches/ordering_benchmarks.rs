//! # Board Ordering Benchmarks
//!
//! | Area | Operation | Expectation |
//! |------|-----------|-------------|
//! | Assignment | `plan_insert` | Linear in scope size |
//! | Executor | Move inside one transaction | Dominated by rewritten rows |
//! | Client store | Cross-scope move | Copies only the touched scopes |

use board_client::OrderingStore;
use board_ordering::{
    InMemoryOrderingRepository, MoveCommand, OrderAssignmentService, OrderingConfig, Position,
    TransactionalReorderExecutor,
};
use board_types::{
    ItemId, ItemKind, ItemRecord, NewItem, OwnerId, ParentRef, Placement, Priority, ScopeKey,
    Status,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;

const SCOPE_SIZES: [usize; 4] = [10, 100, 1_000, 5_000];

fn column(owner: OwnerId, scope: ScopeKey, len: usize) -> Vec<ItemRecord> {
    (0..len)
        .map(|order| ItemRecord {
            id: ItemId::new(),
            owner,
            kind: ItemKind::Task,
            scope,
            order: order as u32,
            title: format!("task {}", order),
            description: None,
            priority: Priority::Medium,
        })
        .collect()
}

// ============================================================================
// Order assignment
// ============================================================================

fn bench_plan_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("assignment-plan-insert");
    let assigner = OrderAssignmentService::new();
    let owner = OwnerId::new();
    let scope = ScopeKey::project_column(ItemId::new(), Status::Todo);

    for size in SCOPE_SIZES {
        let siblings = column(owner, scope, size);
        let last = siblings[size - 1].id;

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("last_to_front", size), &siblings, |b, s| {
            b.iter(|| black_box(assigner.plan_insert(last, s, Position::Index(0))))
        });
        group.bench_with_input(BenchmarkId::new("append", size), &siblings, |b, s| {
            b.iter(|| black_box(assigner.plan_insert(ItemId::new(), s, Position::Append)))
        });
    }

    group.finish();
}

// ============================================================================
// Transactional executor
// ============================================================================

fn bench_executor_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("executor-move");

    for size in [10usize, 100, 500] {
        let repo = Arc::new(InMemoryOrderingRepository::new());
        let executor = TransactionalReorderExecutor::new(repo, OrderingConfig::default());
        let owner = OwnerId::new();
        let project = executor
            .create(owner, NewItem::new(Placement::Project, "Bench"))
            .expect("create project")
            .id;
        let todo = ScopeKey::project_column(project, Status::Todo);
        let done = ScopeKey::project_column(project, Status::Completed);
        let placement = Placement::WorkItem {
            project,
            parent: ParentRef::None,
            status: Status::Todo,
        };
        let ids: Vec<ItemId> = (0..size)
            .map(|n| {
                executor
                    .create(owner, NewItem::new(placement, format!("task {}", n)))
                    .expect("create task")
                    .id
            })
            .collect();
        let moving = ids[size / 2];

        group.bench_function(BenchmarkId::new("within_scope", size), |b| {
            let mut front = true;
            b.iter(|| {
                let position = if front { Position::Index(0) } else { Position::Append };
                front = !front;
                black_box(executor.move_item(owner, MoveCommand::new(moving, todo, position)))
            })
        });
        group.bench_function(BenchmarkId::new("across_scopes", size), |b| {
            let mut to_done = true;
            b.iter(|| {
                let target = if to_done { done } else { todo };
                to_done = !to_done;
                black_box(executor.move_item(owner, MoveCommand::new(moving, target, Position::Index(0))))
            })
        });
    }

    group.finish();
}

// ============================================================================
// Client store
// ============================================================================

fn bench_store_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("client-store-move");
    let project = ItemId::new();
    let backlog = ScopeKey::project_column(project, Status::Backlog);
    let completed = ScopeKey::project_column(project, Status::Completed);

    for size in SCOPE_SIZES {
        let mut store = OrderingStore::default();
        let ids: Vec<ItemId> = (0..size).map(|_| ItemId::new()).collect();
        store.load_scope(backlog, ids.clone());
        store.load_scope(completed, (0..size).map(|_| ItemId::new()).collect());
        let moving = ids[0];

        group.bench_function(BenchmarkId::new("across_and_back", size), |b| {
            b.iter(|| {
                let landed = store.move_across_scopes(moving, backlog, completed, Some(0));
                let back = store.move_across_scopes(moving, completed, backlog, Some(0));
                black_box((landed, back))
            })
        });
        group.bench_function(BenchmarkId::new("snapshot", size), |b| {
            b.iter(|| black_box(store.snapshot()))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_plan_insert, bench_executor_moves, bench_store_moves);
criterion_main!(benches);
