pub mod app;
pub mod components;
pub mod data;
pub mod highlight;
pub mod keys;
pub mod layout;
pub mod list;
pub mod markup;
pub mod route;
pub mod shortcuts;
pub mod tui;
