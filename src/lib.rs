//! Runtime language switching for a page, with fallback, coordinated with a
//! reveal-on-scroll animation engine and a slide-out sidebar.

pub mod animation;
pub mod app;
pub mod config;
pub mod debounce;
pub mod dom;
pub mod i18n;
pub mod startup;
pub mod ui;
