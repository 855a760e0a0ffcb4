//! Pure domain types shared by the browser core and its oracle adapters.

pub mod entity;
pub mod selection;
