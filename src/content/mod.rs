pub mod assembler;
pub mod catalog;
pub mod padding;
pub mod types;

pub use assembler::{assemble_content, select_optimal_works};
pub use padding::generate_padding;
pub use types::{Catalog, SourceWork};
