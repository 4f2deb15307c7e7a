//! # Persistence Flows
//!
//! Order and hierarchy surviving a reopen of the SQLite database.

#[cfg(test)]
mod tests {
    use crate::support::BoardHarness;
    use board_ordering::{
        BoardOrderingApi, BoardOrderingService, MoveCommand, OrderingConfig, Position,
        SqliteOrderingRepository,
    };
    use board_types::{ErrorKind, ItemId, NewItem, OwnerId, ParentRef, Placement, ScopeKey, Status};
    use std::path::Path;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn reopen(path: &Path) -> BoardOrderingService<SqliteOrderingRepository> {
        let repo = SqliteOrderingRepository::open(path, &OrderingConfig::default()).unwrap();
        BoardOrderingService::new(Arc::new(repo), OrderingConfig::default())
    }

    fn listed(
        service: &BoardOrderingService<SqliteOrderingRepository>,
        owner: OwnerId,
        scope: &ScopeKey,
    ) -> Vec<ItemId> {
        service
            .list_scope(owner, scope)
            .unwrap()
            .into_iter()
            .map(|item| item.id)
            .collect()
    }

    #[tokio::test]
    async fn test_moves_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.db");

        let (owner, todo, expected) = {
            let board = BoardHarness::sqlite(&path);
            let ids: Vec<ItemId> = ["A", "B", "C", "D"]
                .iter()
                .map(|title| board.add_task(Status::Todo, title))
                .collect();
            let todo = board.column(Status::Todo);
            board
                .api()
                .move_item(board.owner, MoveCommand::new(ids[3], todo, Position::Index(1)))
                .unwrap();
            board
                .api()
                .move_item(board.owner, MoveCommand::new(ids[0], todo, Position::Append))
                .unwrap();
            (board.owner, todo, vec![ids[3], ids[1], ids[2], ids[0]])
        };

        let service = reopen(&path);
        let items = service.list_scope(owner, &todo).unwrap();
        assert_eq!(items.iter().map(|item| item.id).collect::<Vec<_>>(), expected);
        assert_eq!(items.iter().map(|item| item.order).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[tokio::test]
    async fn test_removing_group_cascades_and_compacts() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.db");

        let (owner, project, kept_group) = {
            let board = BoardHarness::sqlite(&path);
            let api = board.api();
            let owner = board.owner;
            let project = board.project;
            let group = |title: &str| {
                api.create_item(owner, NewItem::new(Placement::TaskGroup { project }, title))
                    .unwrap()
                    .id
            };
            let doomed = group("Doomed");
            let kept = group("Kept");

            let task = api
                .create_item(
                    owner,
                    NewItem::new(
                        Placement::WorkItem {
                            project,
                            parent: ParentRef::Group(doomed),
                            status: Status::InProgress,
                        },
                        "Grouped task",
                    ),
                )
                .unwrap()
                .id;
            for title in ["Sub 1", "Sub 2"] {
                api.create_item(
                    owner,
                    NewItem::new(
                        Placement::WorkItem {
                            project,
                            parent: ParentRef::Task(task),
                            status: Status::Todo,
                        },
                        title,
                    ),
                )
                .unwrap();
            }

            // Group, its task and both subtasks.
            assert_eq!(api.remove_item(owner, doomed).unwrap(), 4);
            (owner, project, kept)
        };

        let service = reopen(&path);
        let groups = service
            .list_scope(owner, &ScopeKey::project_groups(project))
            .unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!((groups[0].id, groups[0].order), (kept_group, 0));
        assert!(listed(&service, owner, &ScopeKey::group_column(kept_group, Status::InProgress))
            .is_empty());
    }

    #[tokio::test]
    async fn test_other_owner_sees_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("board.db");
        let board = BoardHarness::sqlite(&path);
        let task = board.add_task(Status::Backlog, "Private");
        let backlog = board.column(Status::Backlog);
        drop(board);

        let service = reopen(&path);
        let intruder = OwnerId::new();

        let err = service.list_scope(intruder, &backlog).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = service
            .move_item(intruder, MoveCommand::new(task, backlog, Position::Append))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = service.remove_item(intruder, task).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
