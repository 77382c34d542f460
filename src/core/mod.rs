//! Core business logic, independent of any user interface.
//!
//! The session provider decides who is asking, the record store reads the tables,
//! and the visibility and stats modules turn a snapshot of records into what that
//! user is allowed to see. Intake and payment are the write paths.

/// Creating clients and jobs, issuing invoices
pub mod intake;
/// Payment validation and recording
pub mod payment;
/// Demo dataset loaded into an empty database
pub mod seed;
/// Signed-in user and role checks
pub mod session;
/// Persisted key-value slot backing the session
pub mod session_state;
/// Dashboard, invoice, and job board aggregates
pub mod stats;
/// Repository trait and in-memory snapshot
pub mod store;
/// Role-scoped filtering and search
pub mod visibility;
