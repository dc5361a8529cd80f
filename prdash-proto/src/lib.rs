//! Shared data definitions for `prdash` sections.

pub mod page;
pub mod pr;
pub mod update;
