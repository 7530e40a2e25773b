pub mod trace;

pub use trace::{TraceContext, TraceMiddleware};
