//! Visual Editor surface and toolbar

use wikiqa_harness::{HarnessResult, PageContext, PageObject, Session};

use super::ve_dialogs::{SaveChangesDialog, VisualEditorOptionsDialog};

/// Editable document surface; present only while editing
pub const VE_SURFACE: &str = ".ve-ce-documentNode";
pub const TOOLBAR_MORE: &str = ".ve-ui-toolbar-group-more";
pub const PUBLISH_BUTTON: &str = ".ve-ui-toolbar-saveButton";

/// Entries of the toolbar "more" menu that open the options dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertDialog {
    Categories,
    PageSettings,
}

impl InsertDialog {
    pub fn tool_selector(self) -> &'static str {
        match self {
            InsertDialog::Categories => ".oo-ui-tool-name-categories",
            InsertDialog::PageSettings => ".oo-ui-tool-name-settings",
        }
    }
}

pub struct VisualEditorPage<'s> {
    context: PageContext<'s>,
}

impl<'s> PageObject<'s> for VisualEditorPage<'s> {
    fn context(&self) -> &PageContext<'s> {
        &self.context
    }
}

impl<'s> VisualEditorPage<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            context: PageContext::new(session, "VisualEditorPage"),
        }
    }

    /// Opens `dialog`; this page stays unusable until the dialog hands
    /// control back through `click_apply_changes`.
    pub async fn open_dialog_from_menu(&self, dialog: InsertDialog) -> HarnessResult<VisualEditorOptionsDialog<'s>> {
        self.context.click(TOOLBAR_MORE).await?;
        self.context.click(dialog.tool_selector()).await?;
        let opened = VisualEditorOptionsDialog::opened(self.context.session()).await?;
        self.context.supersede();
        Ok(opened)
    }

    pub async fn click_publish_button(&self) -> HarnessResult<SaveChangesDialog<'s>> {
        self.context.click(PUBLISH_BUTTON).await?;
        let save = SaveChangesDialog::opened(self.context.session()).await?;
        self.context.supersede();
        Ok(save)
    }
}
