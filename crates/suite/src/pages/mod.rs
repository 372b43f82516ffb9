//! Page and component objects for the wiki under test
//!
//! Selectors are public so that test doubles can serve the same DOM shape.

pub mod mercury;
pub mod ve_dialogs;
pub mod visual_editor;
pub mod wiki;

pub use mercury::{GalleryComponent, LightboxComponent};
pub use ve_dialogs::{CategoryResultType, ReviewChangesDialog, SaveChangesDialog, VisualEditorOptionsDialog};
pub use visual_editor::{InsertDialog, VisualEditorPage};
pub use wiki::{ArticlePage, Navigate, WikiBasePage};
