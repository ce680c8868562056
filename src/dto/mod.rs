/// Form bodies accepted by the admin routes.
pub mod forms;
/// Health probe payload.
pub mod health;
