// src/lib.rs

//! vplan: stundenplan24 timetable and substitution plan library

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
