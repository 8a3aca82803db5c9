pub mod counters;
pub mod draw;
pub mod probability;
pub mod tier;
