//! Presentation model.
//!
//! Data the UI needs to render its chrome: the colour theme and the
//! navigation links, conditioned on the current user and admin flag. No
//! markup is produced here.

pub mod nav;
pub mod theme;

pub use nav::{AccountMenu, NavLink, Navbar, PageContext};
pub use theme::Theme;
