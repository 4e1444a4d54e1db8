use crate::{silent_logs, tally_mapping};
use cask::{CancellationToken, Command, CommandProcessor, Engine, ExecutionError};
use cask_memory::{MemoryExecutor, Response};

const TALLIES: &str = "SELECT label, total FROM tallies";

pub async fn cancellation(executor: &mut MemoryExecutor) {
    let engine = Engine::default();
    executor.respond(TALLIES, crate::tally_rows());
    executor.respond("DELETE FROM tallies", Response::affected(2));
    let processor = engine
        .single(Command::text(TALLIES), &tally_mapping())
        .expect("Could not create the processor");

    let cancel = CancellationToken::new();
    cancel.cancel();
    let opened = executor.cursors_opened();
    let sent = executor.history().len();
    let error;
    silent_logs! {
        error = processor
            .execute_async(executor, &(), &cancel)
            .await
            .expect_err("A cancelled execution must fail");
    }
    let execution = error
        .downcast_ref::<ExecutionError>()
        .expect("Cancellation must surface as an execution error");
    assert!(execution.is_cancelled());
    assert_eq!(executor.cursors_opened(), opened);
    assert_eq!(executor.history().len(), sent);

    let delete = engine
        .non_query(Command::text("DELETE FROM tallies"))
        .expect("Could not create the delete processor");
    let result;
    silent_logs! {
        result = delete.execute_async(executor, &(), &cancel).await;
    }
    assert!(result.is_err());

    // A fresh token runs to completion
    let rows = processor
        .execute_async(executor, &(), &CancellationToken::new())
        .await
        .expect("Could not read the tallies");
    assert_eq!(rows.len(), 2);
}
