//! File storage: content-addressed originals and the replacement protocol

pub mod marker;
pub mod original_store;
pub mod replace;
