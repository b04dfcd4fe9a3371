mod failure;
mod interrupt;

pub mod prelude {
    pub use crate::failure::{RunFailure, StepError};
    pub use crate::interrupt::{InterruptHandle, InterruptListener};
}
