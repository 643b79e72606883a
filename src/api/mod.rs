// HTTP route handlers

pub mod athletes;
pub mod auth;
pub mod emails;
pub mod health;
pub mod routes;
pub mod sessions;
pub mod statistics;
pub mod trainers;
pub mod trainings;
