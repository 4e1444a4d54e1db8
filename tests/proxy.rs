#[cfg(test)]
mod tests {
    use cask::{
        CacheMode, CancellationToken, Command, CommandProcessor, CommandTransform, Engine, Error,
        ExecutionError, InterceptionError, Mapping, Parameter, TransformProxy, Value,
    };
    use cask_memory::{MemoryExecutor, ResultSet};
    use cask_tests::silent_logs;
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    #[derive(Default, Debug, Clone, PartialEq)]
    struct Book {
        title: String,
        year: i16,
    }

    fn mapping() -> Mapping<Book> {
        Mapping::new()
            .property("title", |b: &mut Book, v: String| b.title = v)
            .property("year", |b: &mut Book, v: i16| b.year = v)
    }

    const SELECT_BOOKS: &str = "SELECT title, year FROM books";
    const SELECT_BOOKS_LIMITED: &str = "SELECT title, year FROM books LIMIT :limit";

    fn executor() -> MemoryExecutor {
        let books = ResultSet::new(["title", "year"])
            .row([
                Value::Varchar(Some("Dune".into())),
                Value::Int16(Some(1965)),
            ])
            .row([
                Value::Varchar(Some("Neuromancer".into())),
                Value::Int16(Some(1984)),
            ]);
        let mut executor = MemoryExecutor::new();
        executor
            .respond(SELECT_BOOKS, books.clone())
            .respond(SELECT_BOOKS_LIMITED, books)
            .fail("SELECT broken", "syntax error at or near \"broken\"");
        executor
    }

    fn limit(count: i32) -> CommandTransform {
        Arc::new(move |command: &mut Command| -> cask::Result<()> {
            command.set_text(format!("{} LIMIT :limit", command.command_text()));
            command.bind(Parameter::new("limit", count));
            Ok(())
        })
    }

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&ExecutionError) -> cask::Result<()> + Send + Sync) {
        let count = Arc::new(AtomicUsize::new(0));
        let handler = {
            let count = count.clone();
            move |_: &ExecutionError| -> cask::Result<()> {
                count.fetch_add(1, Ordering::Relaxed);
                Ok(())
            }
        };
        (count, handler)
    }

    #[test]
    fn chain_is_transparent() {
        let engine = Engine::default();
        let command = Command::text(SELECT_BOOKS).with_timeout(Duration::from_secs(4));
        let source = engine.single(command.clone(), &mapping()).unwrap();
        let hash = source.cache_hash();
        let (_, handler) = counter();
        let chain = source
            .apply_transforms([limit(1)])
            .intercept_exceptions(handler)
            .intercept_or_proxy_with(|p| TransformProxy::new(p, Vec::new()));
        assert_eq!(chain.command(), &command);
        assert_eq!(chain.timeout(), Some(Duration::from_secs(4)));
        assert_eq!(chain.cache_hash(), hash);
        assert_eq!(chain.column_indexes().len(), 1);
        assert_eq!(chain.source().source().source().cache_hash(), hash);
    }

    #[tokio::test]
    async fn transforms_apply_before_execution() {
        let mut executor = executor();
        let chain = Engine::default()
            .single(Command::text(SELECT_BOOKS), &mapping())
            .unwrap()
            .apply_transforms([limit(2)]);
        let books = chain
            .execute_async(&mut executor, &(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(books.len(), 2);
        let sent = &executor.history()[0];
        assert_eq!(sent.command_text(), SELECT_BOOKS_LIMITED);
        assert_eq!(sent.parameter("limit").unwrap().value, Value::Int32(Some(2)));
        assert_eq!(chain.command().command_text(), SELECT_BOOKS);
    }

    #[test]
    fn cache_sees_transformed_commands() {
        let mut executor = executor();
        let engine = Engine::default();
        let one = engine
            .single(Command::text(SELECT_BOOKS), &mapping())
            .unwrap()
            .apply_transforms([limit(1)]);
        one.enable_result_caching(CacheMode::Permanent, None)
            .unwrap();
        one.execute(&mut executor, &()).unwrap();
        one.execute(&mut executor, &()).unwrap();
        assert_eq!(executor.cursors_opened(), 1);
        assert_eq!(one.source().result_cache().len(), 1);
        one.flush_cache();
        assert!(one.source().result_cache().is_empty());
    }

    #[tokio::test]
    async fn handler_runs_once_per_error() {
        let mut executor = executor();
        let (inner_count, inner) = counter();
        let (outer_count, outer) = counter();
        let chain = Engine::default()
            .single(Command::text("SELECT broken"), &mapping())
            .unwrap()
            .intercept_exceptions(inner)
            .apply_transforms(Vec::new())
            .intercept_exceptions(outer);
        silent_logs! {
            assert!(chain.execute(&mut executor, &()).is_err());
            assert!(
                chain
                    .execute_async(&mut executor, &(), &CancellationToken::new())
                    .await
                    .is_err()
            );
        }
        assert_eq!(inner_count.load(Ordering::Relaxed), 2);
        assert_eq!(outer_count.load(Ordering::Relaxed), 2);

        let (count, handler) = counter();
        let fine = Engine::default()
            .single(Command::text(SELECT_BOOKS), &mapping())
            .unwrap()
            .intercept_exceptions(handler);
        fine.execute(&mut executor, &()).unwrap();
        assert_eq!(count.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn failing_transform_is_intercepted() {
        let mut executor = executor();
        let (count, handler) = counter();
        let refuse: CommandTransform = Arc::new(|_: &mut Command| -> cask::Result<()> {
            Err(Error::msg("read only"))
        });
        let chain = Engine::default()
            .single(Command::text(SELECT_BOOKS), &mapping())
            .unwrap()
            .apply_transforms([refuse])
            .intercept_exceptions(handler);
        let error;
        silent_logs! {
            error = chain.execute(&mut executor, &()).unwrap_err();
        }
        assert_eq!(count.load(Ordering::Relaxed), 1);
        let execution = error.downcast_ref::<ExecutionError>().unwrap();
        assert_eq!(execution.cause().to_string(), "read only");
        assert!(executor.history().is_empty());
    }

    #[test]
    fn handler_failure_wraps_both() {
        let mut executor = executor();
        let (outer_count, outer) = counter();
        let chain = Engine::default()
            .single(Command::text("SELECT broken"), &mapping())
            .unwrap()
            .intercept_exceptions(|e: &ExecutionError| {
                Err(Error::msg(format!("pager failed for {}", e.command().command_text())))
            })
            .intercept_exceptions(outer);
        let error;
        silent_logs! {
            error = chain.execute(&mut executor, &()).unwrap_err();
        }
        let aggregate = error
            .downcast_ref::<InterceptionError>()
            .expect("Both failures must be reported");
        assert_eq!(aggregate.handler.to_string(), "pager failed for SELECT broken");
        let original = aggregate
            .execution_error()
            .expect("The original failure is kept");
        assert!(format!("{:#}", original.cause()).contains("syntax error"));
        assert_eq!(outer_count.load(Ordering::Relaxed), 1);
        assert!(format!("{:#}", error).contains("syntax error"));
    }
}
