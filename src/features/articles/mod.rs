pub mod dtos;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repositories;
pub mod routes;
pub mod services;
