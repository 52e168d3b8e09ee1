//! Row structs and DTOs.
//!
//! Each submodule contains a `FromRow` entity struct matching the table and,
//! where rows are inserted outside the services, a `Create*` DTO. Rows that
//! have a core counterpart convert into it with `From`.

pub mod answer;
pub mod badge;
pub mod notification;
pub mod point_transaction;
pub mod question;
pub mod user;
