//! # Test Support
//!
//! [`LocalTransport`] sends client commits through the real JSON handler
//! path in-process. [`BoardHarness`] wires one owner's board end to end:
//! repository, service, handler, client store and reconciliation.

use async_trait::async_trait;
use board_client::{
    CommitError, CommitTransport, DragCoordinator, OrderingStore, ReconciliationSync, SharedStore,
    SyncConfig,
};
use board_ordering::{
    BoardOrderingApi, BoardOrderingHandler, BoardOrderingService, InMemoryOrderingRepository,
    OrderingConfig, OrderingRepository, SqliteOrderingRepository,
};
use board_types::{ItemId, MoveRequest, NewItem, OwnerId, ParentRef, Placement, ScopeKey, Status};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub type Handler<R> = BoardOrderingHandler<BoardOrderingService<R>>;

/// Client transport calling the handler directly.
pub struct LocalTransport<R: OrderingRepository> {
    handler: Arc<Handler<R>>,
    owner: OwnerId,
    latency: Mutex<Duration>,
    offline: AtomicBool,
}

impl<R: OrderingRepository> LocalTransport<R> {
    pub fn new(handler: Arc<Handler<R>>, owner: OwnerId) -> Self {
        Self {
            handler,
            owner,
            latency: Mutex::new(Duration::ZERO),
            offline: AtomicBool::new(false),
        }
    }

    /// Delay applied before the request reaches the handler.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl<R: OrderingRepository + 'static> CommitTransport for LocalTransport<R> {
    async fn commit_move(&self, request: MoveRequest) -> Result<(), CommitError> {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(CommitError::Network("connection refused".to_string()));
        }

        let body =
            serde_json::to_vec(&request).map_err(|e| CommitError::Network(e.to_string()))?;
        CommitError::check_response(self.handler.handle_move_json(self.owner, &body))
    }
}

/// One owner's board: a project with four columns, loaded into a client store.
pub struct BoardHarness<R: OrderingRepository + 'static> {
    pub repo: Arc<R>,
    pub handler: Arc<Handler<R>>,
    pub transport: Arc<LocalTransport<R>>,
    pub store: SharedStore,
    pub sync: ReconciliationSync,
    pub owner: OwnerId,
    pub project: ItemId,
}

impl BoardHarness<InMemoryOrderingRepository> {
    pub fn in_memory() -> Self {
        Self::with_repo(
            Arc::new(InMemoryOrderingRepository::new()),
            OwnerId::new(),
            SyncConfig::default(),
        )
    }

    pub fn in_memory_with(sync_config: SyncConfig) -> Self {
        Self::with_repo(
            Arc::new(InMemoryOrderingRepository::new()),
            OwnerId::new(),
            sync_config,
        )
    }
}

impl BoardHarness<SqliteOrderingRepository> {
    pub fn sqlite(path: &Path) -> Self {
        let repo = SqliteOrderingRepository::open(path, &OrderingConfig::default())
            .expect("open sqlite database");
        Self::with_repo(Arc::new(repo), OwnerId::new(), SyncConfig::default())
    }
}

impl<R: OrderingRepository + 'static> BoardHarness<R> {
    pub fn with_repo(repo: Arc<R>, owner: OwnerId, sync_config: SyncConfig) -> Self {
        let service = BoardOrderingService::new(repo.clone(), OrderingConfig::default());
        let handler = Arc::new(BoardOrderingHandler::new(service));
        let project = handler
            .api()
            .create_item(owner, NewItem::new(Placement::Project, "Board"))
            .expect("create project");

        let transport = Arc::new(LocalTransport::new(handler.clone(), owner));
        let store = OrderingStore::default().shared();
        let sync = ReconciliationSync::new(transport.clone(), store.clone(), sync_config);

        let harness = Self {
            repo,
            handler,
            transport,
            store,
            sync,
            owner,
            project: project.id,
        };
        harness.hydrate();
        harness
    }

    pub fn api(&self) -> &BoardOrderingService<R> {
        self.handler.api()
    }

    pub fn column(&self, status: Status) -> ScopeKey {
        ScopeKey::project_column(self.project, status)
    }

    /// Create a task on the server and reload the client's columns.
    pub fn add_task(&self, status: Status, title: &str) -> ItemId {
        let placement = Placement::WorkItem {
            project: self.project,
            parent: ParentRef::None,
            status,
        };
        let id = self
            .api()
            .create_item(self.owner, NewItem::new(placement, title))
            .expect("create task")
            .id;
        self.hydrate();
        id
    }

    /// Load every column from the server into the client store.
    pub fn hydrate(&self) {
        let mut store = self.store.lock();
        for status in Status::ALL {
            let scope = self.column(status);
            store.load_scope(scope, self.server_ids(&scope));
        }
    }

    /// Server order of a scope; also checks the scope is contiguous.
    pub fn server_ids(&self, scope: &ScopeKey) -> Vec<ItemId> {
        let items = self
            .api()
            .list_scope(self.owner, scope)
            .expect("list scope");
        for (slot, item) in items.iter().enumerate() {
            assert_eq!(item.order as usize, slot, "scope {} is not contiguous", scope);
        }
        items.into_iter().map(|item| item.id).collect()
    }

    pub fn client_ids(&self, scope: &ScopeKey) -> Vec<ItemId> {
        self.store
            .lock()
            .items(scope)
            .map(|ids| ids.to_vec())
            .unwrap_or_default()
    }

    pub fn drag(&self) -> DragCoordinator<ReconciliationSync> {
        DragCoordinator::new(self.store.clone(), self.sync.clone())
    }
}
