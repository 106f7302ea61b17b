pub mod actor;
pub mod common;
pub mod switch_engine;
pub mod sys;
