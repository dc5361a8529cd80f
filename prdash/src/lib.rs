//! `prdash` — terminal dashboard of pull request sections.

pub mod actions;
pub mod app;
pub mod config;
pub mod dispatch;
pub mod event;
pub mod fetch;
pub mod section;
pub mod tasks;
pub mod ui;
