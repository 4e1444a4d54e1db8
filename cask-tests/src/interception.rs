use crate::{silent_logs, tally_mapping};
use cask::{
    CancellationToken, Command, CommandProcessor, CommandTransform, Engine, Error,
    ExecutionError, InterceptionError, Parameter, Value,
};
use cask_memory::MemoryExecutor;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

const BROKEN: &str = "SELECT label, total FROM missing_table";

pub async fn interception(executor: &mut MemoryExecutor) {
    let engine = Engine::default();
    let cancel = CancellationToken::new();
    executor.fail(BROKEN, "relation \"missing_table\" does not exist");

    let tenant: CommandTransform = Arc::new(|command: &mut Command| -> cask::Result<()> {
        command.bind(Parameter::new("tenant", 7));
        Ok(())
    });
    let observed = Arc::new(AtomicUsize::new(0));
    let processor = engine
        .single(Command::text(BROKEN), &tally_mapping())
        .expect("Could not create the processor")
        .apply_transforms([tenant.clone()])
        .intercept_exceptions({
            let observed = observed.clone();
            move |error: &ExecutionError| {
                observed.fetch_add(1, Ordering::Relaxed);
                assert!(error.parameters().iter().any(|p| p.name == "tenant"));
                Ok(())
            }
        });
    assert_eq!(processor.command().command_text(), BROKEN);

    let error;
    silent_logs! {
        error = processor
            .execute_async(executor, &(), &cancel)
            .await
            .expect_err("The broken command must fail");
    }
    assert_eq!(observed.load(Ordering::Relaxed), 1);
    let execution = error
        .downcast_ref::<ExecutionError>()
        .expect("The original error must reach the caller");
    assert_eq!(
        execution.command().parameter("tenant").map(|p| &p.value),
        Some(&Value::Int32(Some(7)))
    );
    assert!(format!("{:#}", error).contains("missing_table"));
    let sent = executor.history().last().expect("The command was not sent");
    assert!(sent.parameter("tenant").is_some());

    // A failing handler aggregates both errors
    let processor = engine
        .single(Command::text(BROKEN), &tally_mapping())
        .expect("Could not create the processor")
        .intercept_exceptions(|_: &ExecutionError| Err(Error::msg("alerting is down")));
    let error;
    silent_logs! {
        error = processor
            .execute(executor, &())
            .expect_err("The broken command must fail");
    }
    let aggregate = error
        .downcast_ref::<InterceptionError>()
        .expect("The handler failure must be aggregated");
    assert_eq!(aggregate.handler.to_string(), "alerting is down");
    assert!(aggregate.execution_error().is_some());
}
