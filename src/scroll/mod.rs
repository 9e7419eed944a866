mod sections;
pub mod tracker;

pub use sections::{SectionController, SectionSet, SectionSetBuilder};
