use tokio::signal;
use workflow_bench_core::prelude::InterruptHandle;

/// Raise the interrupt signal on `handle` when the user presses Ctrl-C.
pub(crate) fn start_interrupt_listener(runtime: &tokio::runtime::Runtime, handle: InterruptHandle) {
    let listener_handle = handle.clone();
    runtime.spawn(async move {
        match signal::ctrl_c().await {
            Ok(()) => {
                println!("Received interrupt, finishing the current run...");
                listener_handle.interrupt();
            }
            Err(e) => {
                log::warn!("Unable to listen for Ctrl-C, the benchmark cannot be interrupted: {e}");
            }
        }
    });
}
