pub mod dedup;
pub mod organize;
