//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the `RecordStore` outbound port.

mod memory;
mod supabase;

pub use memory::InMemoryRecordStore;
pub use supabase::{SupabaseConfig, SupabaseRecordStore, DEFAULT_TABLE};
