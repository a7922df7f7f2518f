pub mod binder;
pub mod queue;
