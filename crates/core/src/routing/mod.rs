//! File routing orchestration

mod service;

pub use service::RouterService;
