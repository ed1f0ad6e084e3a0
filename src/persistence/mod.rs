//! Saving and loading networks and replay memories.
//!
//! The text formats in [`network_file`] and [`memory_file`] are the
//! interchange formats; [`snapshot`] offers a binary checkpoint.

pub mod memory_file;
pub mod network_file;
pub mod snapshot;

pub use memory_file::{
    decode_memory, decode_memory_expecting, encode_memory, load_memory, load_memory_expecting,
    save_memory,
};
pub use network_file::{
    decode_network, decode_network_expecting, encode_network, load_network, load_network_expecting,
    save_network,
};
pub use snapshot::{load_snapshot, save_snapshot, GraphSnapshot};
