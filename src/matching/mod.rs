pub mod engine;
pub mod jaccard;
pub mod manager;
pub mod normalize;
pub mod permutation;
pub mod selection;
