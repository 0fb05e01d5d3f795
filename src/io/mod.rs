//! IO modules - file interfaces
//!
//! This module contains all external IO operations:
//! - `reader` - Detection table loading (JSONL format)
//! - `egress` - Output tables to files (JSONL format)

pub mod egress;
pub mod reader;

// Re-export commonly used types
pub use egress::TableEgress;
pub use reader::{parse_detection_table, read_detection_table};
