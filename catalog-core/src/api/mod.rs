//! Transport-facing constants shared by the server and its clients.

pub mod routes;
