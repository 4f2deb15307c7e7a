//! # Drag Flows
//!
//! Client drag gestures committed through the JSON handler to a live
//! service, with the client store checked against the server afterwards.

#[cfg(test)]
mod tests {
    use crate::support::BoardHarness;
    use board_client::{CommitOutcome, DragOutcome, DropTarget, SyncConfig};
    use board_ordering::BoardOrderingApi;
    use board_telemetry::metrics::{
        encode_metrics, register_metrics, CLIENT_COMMITS, MOVES_COMMITTED,
    };
    use board_telemetry::{init_logging, TelemetryConfig};
    use board_types::{ErrorKind, ItemId, Status};
    use std::time::Duration;

    fn seed(
        board: &BoardHarness<board_ordering::InMemoryOrderingRepository>,
        status: Status,
        titles: &[&str],
    ) -> Vec<ItemId> {
        titles
            .iter()
            .map(|title| board.add_task(status, title))
            .collect()
    }

    fn assert_in_sync<R: board_ordering::OrderingRepository>(board: &BoardHarness<R>) {
        for status in Status::ALL {
            let column = board.column(status);
            assert_eq!(
                board.client_ids(&column),
                board.server_ids(&column),
                "client and server disagree on {}",
                column
            );
        }
    }

    #[tokio::test]
    async fn test_cross_column_drop_appends_on_server() {
        let board = BoardHarness::in_memory();
        let backlog = seed(&board, Status::Backlog, &["A", "B", "C"]);
        let done = seed(&board, Status::Completed, &["D", "E", "F"]);

        let mut drag = board.drag();
        drag.drag_start(backlog[0]).unwrap();
        drag.drag_over(DropTarget::Scope(board.column(Status::Completed)));
        let DragOutcome::Submitted(ticket) = drag
            .drag_end(DropTarget::Scope(board.column(Status::Completed)))
            .unwrap()
        else {
            panic!("expected a submitted commit");
        };

        assert_eq!(ticket.await.unwrap(), CommitOutcome::Confirmed);
        assert_eq!(
            board.server_ids(&board.column(Status::Completed)),
            vec![done[0], done[1], done[2], backlog[0]]
        );
        assert_eq!(
            board.server_ids(&board.column(Status::Backlog)),
            vec![backlog[1], backlog[2]]
        );
        assert_in_sync(&board);
    }

    #[tokio::test]
    async fn test_drop_on_sibling_reorders_column() {
        let board = BoardHarness::in_memory();
        let ids = seed(&board, Status::Todo, &["A", "B", "C"]);

        let mut drag = board.drag();
        drag.drag_start(ids[2]).unwrap();
        let DragOutcome::Submitted(ticket) = drag.drag_end(DropTarget::Item(ids[0])).unwrap() else {
            panic!("expected a submitted commit");
        };

        assert_eq!(ticket.await.unwrap(), CommitOutcome::Confirmed);
        assert_eq!(
            board.server_ids(&board.column(Status::Todo)),
            vec![ids[2], ids[0], ids[1]]
        );
        assert_in_sync(&board);
    }

    #[tokio::test]
    async fn test_drop_at_origin_sends_nothing() {
        let board = BoardHarness::in_memory();
        let ids = seed(&board, Status::Todo, &["A", "B"]);
        let before = board.api().list_scope(board.owner, &board.column(Status::Todo)).unwrap();

        let mut drag = board.drag();
        drag.drag_start(ids[1]).unwrap();
        drag.drag_over(DropTarget::Scope(board.column(Status::Completed)));
        let outcome = drag
            .drag_end(DropTarget::Scope(board.column(Status::Todo)))
            .unwrap();

        // Hovering elsewhere and coming back is still a drop at the origin.
        assert!(matches!(outcome, DragOutcome::Unchanged));
        assert_eq!(
            board.api().list_scope(board.owner, &board.column(Status::Todo)).unwrap(),
            before
        );
        assert_in_sync(&board);
    }

    #[tokio::test]
    async fn test_item_deleted_on_server_reverts_with_notice() {
        let board = BoardHarness::in_memory();
        let ids = seed(&board, Status::Backlog, &["A", "B"]);
        let mut notices = board.sync.subscribe_notices();

        // Deleted elsewhere; this client has not reloaded.
        board.api().remove_item(board.owner, ids[0]).unwrap();

        let mut drag = board.drag();
        drag.drag_start(ids[0]).unwrap();
        let DragOutcome::Submitted(ticket) = drag
            .drag_end(DropTarget::Scope(board.column(Status::InProgress)))
            .unwrap()
        else {
            panic!("expected a submitted commit");
        };

        assert_eq!(ticket.await.unwrap(), CommitOutcome::Reverted(ErrorKind::NotFound));
        assert_eq!(board.client_ids(&board.column(Status::Backlog)), ids);
        assert!(board.client_ids(&board.column(Status::InProgress)).is_empty());

        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.item_id, ids[0]);
        assert_eq!(notice.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_slow_server_times_out_and_reverts() {
        let board = BoardHarness::in_memory_with(
            SyncConfig::default().with_commit_timeout(Duration::from_millis(20)),
        );
        let ids = seed(&board, Status::Todo, &["A", "B", "C"]);
        board.transport.set_latency(Duration::from_millis(200));

        let mut drag = board.drag();
        drag.drag_start(ids[0]).unwrap();
        let DragOutcome::Submitted(ticket) = drag.drag_end(DropTarget::Item(ids[2])).unwrap() else {
            panic!("expected a submitted commit");
        };
        assert_eq!(
            board.client_ids(&board.column(Status::Todo)),
            vec![ids[1], ids[2], ids[0]]
        );

        assert_eq!(ticket.await.unwrap(), CommitOutcome::Reverted(ErrorKind::Network));
        // The abandoned request never reached the handler.
        assert_eq!(board.server_ids(&board.column(Status::Todo)), ids);
        assert_in_sync(&board);
    }

    #[tokio::test]
    async fn test_offline_commit_reverts() {
        let board = BoardHarness::in_memory();
        let ids = seed(&board, Status::Todo, &["A"]);
        board.transport.set_offline(true);

        let mut drag = board.drag();
        drag.drag_start(ids[0]).unwrap();
        let DragOutcome::Submitted(ticket) = drag
            .drag_end(DropTarget::Scope(board.column(Status::Completed)))
            .unwrap()
        else {
            panic!("expected a submitted commit");
        };

        assert_eq!(ticket.await.unwrap(), CommitOutcome::Reverted(ErrorKind::Network));
        assert_in_sync(&board);
    }

    #[tokio::test]
    async fn test_server_transaction_failure_reverts_both_sides() {
        let board = BoardHarness::in_memory();
        let backlog = seed(&board, Status::Backlog, &["A", "B", "C"]);
        let done = seed(&board, Status::Completed, &["D"]);
        // Second write of the move fails after the first one landed.
        board.repo.inject_failure_after(1);

        let mut drag = board.drag();
        drag.drag_start(backlog[1]).unwrap();
        let DragOutcome::Submitted(ticket) = drag.drag_end(DropTarget::Item(done[0])).unwrap()
        else {
            panic!("expected a submitted commit");
        };

        assert_eq!(
            ticket.await.unwrap(),
            CommitOutcome::Reverted(ErrorKind::TransactionFailure)
        );
        assert_eq!(board.server_ids(&board.column(Status::Backlog)), backlog);
        assert_eq!(board.server_ids(&board.column(Status::Completed)), done);
        assert_in_sync(&board);
    }

    #[tokio::test]
    async fn test_rapid_drags_in_one_column_apply_in_order() {
        let board = BoardHarness::in_memory();
        let ids = seed(&board, Status::Todo, &["A", "B", "C", "D"]);
        board.transport.set_latency(Duration::from_millis(10));

        let mut drag = board.drag();
        drag.drag_start(ids[3]).unwrap();
        let DragOutcome::Submitted(first) = drag.drag_end(DropTarget::Item(ids[0])).unwrap() else {
            panic!("expected a submitted commit");
        };
        drag.drag_start(ids[2]).unwrap();
        let DragOutcome::Submitted(second) = drag.drag_end(DropTarget::Item(ids[3])).unwrap() else {
            panic!("expected a submitted commit");
        };

        assert_eq!(first.await.unwrap(), CommitOutcome::Confirmed);
        assert_eq!(second.await.unwrap(), CommitOutcome::Confirmed);
        assert_eq!(
            board.server_ids(&board.column(Status::Todo)),
            vec![ids[2], ids[3], ids[0], ids[1]]
        );
        assert_in_sync(&board);
    }

    #[tokio::test]
    async fn test_failed_commit_supersedes_queued_one() {
        let board = BoardHarness::in_memory();
        let backlog = seed(&board, Status::Backlog, &["A", "B"]);
        board.transport.set_latency(Duration::from_millis(10));
        board.transport.set_offline(true);

        let mut drag = board.drag();
        let completed = DropTarget::Scope(board.column(Status::Completed));
        drag.drag_start(backlog[0]).unwrap();
        let DragOutcome::Submitted(first) = drag.drag_end(completed).unwrap() else {
            panic!("expected a submitted commit");
        };
        drag.drag_start(backlog[1]).unwrap();
        let DragOutcome::Submitted(second) = drag.drag_end(completed).unwrap() else {
            panic!("expected a submitted commit");
        };

        assert_eq!(first.await.unwrap(), CommitOutcome::Reverted(ErrorKind::Network));
        assert_eq!(second.await.unwrap(), CommitOutcome::Superseded);
        assert_eq!(board.client_ids(&board.column(Status::Backlog)), backlog);
        assert_in_sync(&board);
    }

    #[tokio::test]
    async fn test_cancel_after_revert_keeps_server_order() {
        let board = BoardHarness::in_memory();
        let ids = seed(&board, Status::Todo, &["A", "B", "C"]);
        board.transport.set_latency(Duration::from_millis(20));
        board.transport.set_offline(true);

        let mut drag = board.drag();
        drag.drag_start(ids[2]).unwrap();
        let DragOutcome::Submitted(ticket) = drag.drag_end(DropTarget::Item(ids[0])).unwrap() else {
            panic!("expected a submitted commit");
        };
        // Picked up while the first drop is still in flight.
        drag.drag_start(ids[1]).unwrap();

        assert_eq!(ticket.await.unwrap(), CommitOutcome::Reverted(ErrorKind::Network));
        assert_eq!(board.client_ids(&board.column(Status::Todo)), ids);

        assert!(drag.drag_cancel());
        assert_eq!(board.client_ids(&board.column(Status::Todo)), ids);
        assert_in_sync(&board);
    }

    #[tokio::test]
    async fn test_drop_after_revert_is_cancelled() {
        let board = BoardHarness::in_memory();
        let ids = seed(&board, Status::Todo, &["A", "B", "C"]);
        board.transport.set_latency(Duration::from_millis(20));
        board.transport.set_offline(true);
        let completed = board.column(Status::Completed);

        let mut drag = board.drag();
        drag.drag_start(ids[2]).unwrap();
        let DragOutcome::Submitted(ticket) = drag.drag_end(DropTarget::Item(ids[0])).unwrap() else {
            panic!("expected a submitted commit");
        };
        drag.drag_start(ids[1]).unwrap();
        drag.drag_over(DropTarget::Scope(completed));

        assert_eq!(ticket.await.unwrap(), CommitOutcome::Reverted(ErrorKind::Network));
        let outcome = drag.drag_end(DropTarget::Scope(completed)).unwrap();

        assert!(matches!(outcome, DragOutcome::Cancelled));
        assert_eq!(board.client_ids(&board.column(Status::Todo)), ids);
        assert!(board.client_ids(&completed).is_empty());
        assert_in_sync(&board);
    }

    #[tokio::test]
    async fn test_confirmed_commit_is_logged_and_counted() {
        // Another test may have installed these already.
        let _ = init_logging(&TelemetryConfig::for_component("board-tests"));
        let _ = register_metrics();
        let board = BoardHarness::in_memory();
        let ids = seed(&board, Status::Todo, &["A", "B"]);
        let server_before = MOVES_COMMITTED.get();
        let confirmed_before = CLIENT_COMMITS.with_label_values(&["confirmed"]).get();

        let mut drag = board.drag();
        drag.drag_start(ids[1]).unwrap();
        let DragOutcome::Submitted(ticket) = drag.drag_end(DropTarget::Item(ids[0])).unwrap() else {
            panic!("expected a submitted commit");
        };
        assert_eq!(ticket.await.unwrap(), CommitOutcome::Confirmed);

        assert!(MOVES_COMMITTED.get() > server_before);
        assert!(CLIENT_COMMITS.with_label_values(&["confirmed"]).get() > confirmed_before);
        assert!(encode_metrics().unwrap().contains("board_client_commits_total"));
    }
}
