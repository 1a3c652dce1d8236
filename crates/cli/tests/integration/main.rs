mod common;

mod bump_tests;
mod list_tests;
mod run_tests;
