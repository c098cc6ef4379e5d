//! Request middlewares

pub mod session_middlewares;
