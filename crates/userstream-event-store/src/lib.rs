//! Userstream Event Store — in-memory event stream persistence with
//! optimistic concurrency control.

pub mod memory_event_repository;

pub use memory_event_repository::MemoryEventRepository;
