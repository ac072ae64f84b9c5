//! Main module for blockscript library functionality

pub mod building;
pub mod config;
pub mod grammar;
pub mod lexing;
pub mod locale;
pub mod parsing;
pub mod pipeline;
pub mod testing;
