//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the CRM tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod client;
pub mod invoice;
pub mod job;
pub mod payment;
pub mod session_state;
pub mod user;

// Re-export specific types to avoid conflicts
pub use client::{Column as ClientColumn, Entity as Client, Model as ClientModel};
pub use invoice::{Column as InvoiceColumn, Entity as Invoice, Model as InvoiceModel};
pub use job::{Column as JobColumn, Entity as Job, JobStatus, Model as JobModel};
pub use payment::{
    Column as PaymentColumn, Entity as Payment, Model as PaymentModel, PaymentMethod,
};
pub use session_state::{
    Column as SessionStateColumn, Entity as SessionState, Model as SessionStateModel,
};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
