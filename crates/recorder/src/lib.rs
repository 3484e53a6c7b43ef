pub mod recorder;
pub mod tracer;

pub use recorder::TransferRecorder;
pub use tracer::{StepScope, StepTracer};
