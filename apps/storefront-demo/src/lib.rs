pub mod app;
pub mod catalog;

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod app_tests;
