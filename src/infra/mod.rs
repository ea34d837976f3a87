//! Concrete [`GradebookApi`](crate::services::gradebook_api::GradebookApi) backends.

pub mod canvas;
pub mod proxy;
