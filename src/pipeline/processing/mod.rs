// Pipeline processing: coercion, normalization, cross-run merging, catalog admission

pub mod coerce;
pub mod lookup;
pub mod normalize;
pub mod merge;
pub mod catalog;
