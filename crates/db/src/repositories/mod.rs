//! Repositories over the local key-value store.

pub mod case_repo;

pub use case_repo::CaseRepo;
