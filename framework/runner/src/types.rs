/// Recommended error type for your scenario `main` function and any shared code that you write
/// for session factories. Errors from [crate::prelude::run] are reported through this type.
pub type WorkflowBenchResult<T> = anyhow::Result<T>;
