//! Platform collaborators for the home screen core.
//!
//! - `apps` - Package lister over .desktop files, directory watching
//! - `widgets` - Widget host

pub mod apps;
pub mod widgets;
