//! Project records and the endpoints that create them.

pub mod client;
pub mod model;

pub use client::{HttpProjectApi, LocalProjectApi, ProjectApi};
pub use model::{NewProject, Project, ProjectId, ProjectStatus, ProjectUpdate};
