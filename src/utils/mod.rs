//! Utility modules for nestkit
//!
//! Flat helpers that sit beside the deep toolkit.

pub mod array;

// Re-export commonly used utilities
pub use array::{
    clean_array,
    is_one_of,
    merge_array,
    parse_text_to_array,
    remove_empty,
    splice,
    unique_array,
};
