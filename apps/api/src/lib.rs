//! Job recommendation service: a read-only knowledge graph of jobs and skills,
//! a matching & scoring engine over it, and the axum JSON surface in front.

pub mod config;
pub mod errors;
pub mod graph;
pub mod recommend;
pub mod routes;
pub mod state;

#[cfg(test)]
mod test_support;
