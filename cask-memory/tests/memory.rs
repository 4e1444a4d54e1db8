#[cfg(test)]
mod tests {
    use cask_core::{
        CancellationToken, Command, Cursor, ExecutionError, Executor, Value,
    };
    use cask_memory::{MemoryCursor, MemoryExecutor, Response, ResultSet};
    use cask_tests::{execute_tests, init_logs, silent_logs};
    use std::time::Duration;

    #[tokio::test]
    async fn memory() {
        init_logs();
        let mut executor = MemoryExecutor::new();
        execute_tests(&mut executor).await;
    }

    #[tokio::test(start_paused = true)]
    async fn memory_with_latency() {
        init_logs();
        let mut executor = MemoryExecutor::new().with_latency(Duration::from_millis(50));
        execute_tests(&mut executor).await;
    }

    #[test]
    fn cursor_walks_result_sets() {
        let mut cursor = MemoryCursor::new(vec![
            ResultSet::new(["a", "b"])
                .row([Value::Int32(Some(1)), Value::Null])
                .row([Value::Int32(Some(2)), Value::Varchar(Some("x".into()))]),
            ResultSet::new(["c"]),
        ]);
        assert_eq!(cursor.field_count(), 2);
        assert_eq!(cursor.field_name(1).unwrap(), "b");
        assert!(cursor.field_name(2).is_err());
        assert!(cursor.value(0).is_err(), "Not positioned on a row yet");
        assert!(cursor.advance_row().unwrap());
        assert_eq!(cursor.value(0).unwrap(), Value::Int32(Some(1)));
        assert!(cursor.is_null(1).unwrap());
        assert!(cursor.advance_row().unwrap());
        assert!(!cursor.is_null(1).unwrap());
        assert!(!cursor.advance_row().unwrap());
        assert!(!cursor.advance_row().unwrap());
        assert!(cursor.next_result_set().unwrap());
        assert_eq!(cursor.field_count(), 1);
        assert!(!cursor.advance_row().unwrap());
        assert!(!cursor.next_result_set().unwrap());
        assert_eq!(cursor.field_count(), 0);
        assert!(!cursor.next_result_set().unwrap());
    }

    #[test]
    fn scripted_responses() {
        let mut executor = MemoryExecutor::new();
        executor
            .respond("SELECT 1", Response::Scalar(Value::Int64(Some(1))))
            .respond(
                "SELECT name FROM t",
                ResultSet::new(["name"]).row([Value::Varchar(Some("n".into()))]),
            )
            .respond("DELETE FROM t", Response::affected(4))
            .fail("SELECT broken", "broken");
        let command = Command::text("SELECT name FROM t");
        assert_eq!(
            executor.execute_scalar(&command).unwrap(),
            Value::Varchar(Some("n".into()))
        );
        let mut cursor = executor.open_cursor(&Command::text("SELECT 1")).unwrap();
        assert_eq!(cursor.field_name(0).unwrap(), "value");
        assert!(cursor.advance_row().unwrap());
        assert_eq!(cursor.value(0).unwrap(), Value::Int64(Some(1)));
        assert_eq!(
            executor
                .execute_non_query(&Command::text("DELETE FROM t"))
                .unwrap()
                .rows_affected,
            4
        );
        assert!(executor.execute_scalar(&Command::text("SELECT broken")).is_err());
        assert!(executor.open_cursor(&Command::text("SELECT 2")).is_err());
        assert_eq!(executor.history().len(), 5);
        assert_eq!(executor.cursors_opened(), 1);
        assert_eq!(executor.scalars_executed(), 1);
        assert_eq!(executor.non_queries_executed(), 1);
        executor.reset();
        assert!(executor.history().is_empty());
        assert_eq!(executor.cursors_opened(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_is_enforced() {
        let mut executor = MemoryExecutor::new().with_latency(Duration::from_secs(5));
        executor.respond("SELECT 1", Response::Scalar(Value::Int64(Some(1))));
        let cancel = CancellationToken::new();
        let slow = Command::text("SELECT 1").with_timeout(Duration::from_secs(1));
        let error = executor
            .execute_scalar_async(&slow, &cancel)
            .await
            .expect_err("The latency exceeds the timeout");
        assert!(error.to_string().contains("timed out"));
        assert!(executor.history().is_empty());
        let patient = Command::text("SELECT 1").with_timeout(Duration::from_secs(10));
        assert_eq!(
            executor.execute_scalar_async(&patient, &cancel).await.unwrap(),
            Value::Int64(Some(1))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_surfaces_as_execution_error() {
        use cask_core::{CommandProcessor, Engine, EngineConfig};
        let engine = Engine::new(EngineConfig::new().with_default_timeout(Duration::from_millis(10)));
        let mut executor = MemoryExecutor::new().with_latency(Duration::from_secs(1));
        executor.respond("SELECT 1", Response::Scalar(Value::Int64(Some(1))));
        let processor = engine.scalar::<i64>(Command::text("SELECT 1")).unwrap();
        assert_eq!(processor.timeout(), Some(Duration::from_millis(10)));
        silent_logs! {
            let error = processor
                .execute_async(&mut executor, &(), &CancellationToken::new())
                .await
                .expect_err("The command must time out");
            let execution = error.downcast_ref::<ExecutionError>().unwrap();
            assert_eq!(execution.timeout(), Some(Duration::from_millis(10)));
            assert!(!execution.is_cancelled());
        }
    }
}
