//! Visual Editor dialogs: page options (categories) and the save flow

use std::fmt;

use tracing::debug;
use wikiqa_harness::{ComponentContext, HarnessError, HarnessResult, PageContext, PageObject, Session, StepLog};

use super::visual_editor::VisualEditorPage;
use super::wiki::ArticlePage;

pub const OPTIONS_DIALOG: &str = ".ve-ui-mwMetaDialog";
pub const CATEGORY_INPUT: &str = ".ve-ui-mwCategoryInputWidget input";
pub const SUGGESTION: &str = ".ve-ui-mwCategoryInputWidget-menu .oo-ui-menuOptionWidget";
pub const NEW_SUGGESTION: &str = ".ve-ui-mwCategoryInputWidget-menu .ve-ui-mwCategoryInputWidget-newCategory";
pub const MATCHING_SUGGESTION: &str = ".ve-ui-mwCategoryInputWidget-menu .ve-ui-mwCategoryInputWidget-matchingCategory";
pub const CATEGORY_ITEM: &str = ".ve-ui-mwCategoryItemWidget";
pub const SORT_KEY_INPUT: &str = ".ve-ui-mwCategoryPopupWidget-sortKeyForm input";
pub const REMOVE_CATEGORY: &str = ".ve-ui-mwCategoryPopupWidget-removeButton";
pub const CLOSE_POPUP: &str = ".ve-ui-mwCategoryPopupWidget-closeButton";
pub const APPLY_CHANGES: &str = ".ve-ui-mwMetaDialog-applyButton";

pub const SAVE_PANEL: &str = ".ve-ui-mwSaveDialog-savePanel";
pub const REVIEW_BUTTON: &str = ".ve-ui-mwSaveDialog-reviewButton";
pub const SAVE_BUTTON: &str = ".ve-ui-mwSaveDialog-saveButton";
pub const REVIEW_PANEL: &str = ".ve-ui-mwSaveDialog-reviewPanel";
pub const RETURN_BUTTON: &str = ".ve-ui-mwSaveDialog-returnButton";
pub const ADDED_DIFF: &str = ".diff-addedline";
pub const DELETED_DIFF: &str = ".diff-deletedline";

/// Section of the category suggestion menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryResultType {
    /// The search string offered as a category that does not exist yet
    New,
    /// Existing categories containing the search string
    Matching,
}

impl CategoryResultType {
    pub fn selector(self) -> &'static str {
        match self {
            CategoryResultType::New => NEW_SUGGESTION,
            CategoryResultType::Matching => MATCHING_SUGGESTION,
        }
    }
}

impl fmt::Display for CategoryResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryResultType::New => f.write_str("New"),
            CategoryResultType::Matching => f.write_str("Matching"),
        }
    }
}

/// Page options dialog, categories panel.
pub struct VisualEditorOptionsDialog<'s> {
    context: ComponentContext<'s>,
}

impl std::fmt::Debug for VisualEditorOptionsDialog<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisualEditorOptionsDialog").finish_non_exhaustive()
    }
}

impl<'s> PageObject<'s> for VisualEditorOptionsDialog<'s> {
    fn context(&self) -> &PageContext<'s> {
        self.context.page()
    }
}

impl<'s> VisualEditorOptionsDialog<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            context: ComponentContext::new(session, "VisualEditorOptionsDialog", OPTIONS_DIALOG),
        }
    }

    /// Binds to the dialog once it is shown.
    pub async fn opened(session: &'s Session) -> HarnessResult<Self> {
        let dialog = Self::new(session);
        dialog.context.page().wait_until_visible(OPTIONS_DIALOG).await?;
        Ok(dialog)
    }

    pub async fn is_open(&self) -> HarnessResult<bool> {
        self.context.is_open().await
    }

    pub async fn type_category(&self, text: &str) -> HarnessResult<()> {
        self.context.type_into(CATEGORY_INPUT, text).await
    }

    /// Suggestion texts of one menu section; empty if the section never shows.
    pub async fn link_results(&self, kind: CategoryResultType) -> HarnessResult<Vec<String>> {
        if !self.context.wait_visible(kind.selector()).await? {
            return Ok(Vec::new());
        }
        self.context.texts_of(kind.selector()).await
    }

    /// Names on the category chips, in display order.
    pub async fn category_names(&self) -> HarnessResult<Vec<String>> {
        self.context.texts_of(CATEGORY_ITEM).await
    }

    pub async fn add_category(&self, name: &str) -> HarnessResult<()> {
        self.type_category(name).await?;
        let option = self.context.find_by_text(SUGGESTION, name).await?;
        self.context.click_element(&option).await?;
        self.context.find_by_text(CATEGORY_ITEM, name).await?;
        debug!("Category '{}' added", name);
        Ok(())
    }

    pub async fn add_sort_key_to_category(&self, name: &str, sort_key: &str) -> HarnessResult<()> {
        self.open_category_popup(name).await?;
        self.context.type_into(SORT_KEY_INPUT, sort_key).await?;
        self.context.click(CLOSE_POPUP).await?;
        if !self.context.wait_hidden(SORT_KEY_INPUT).await? {
            return Err(illegal(format!("popup for '{}' stayed open after closing", name)));
        }
        debug!("Sort key '{}' set on '{}'", sort_key, name);
        Ok(())
    }

    pub async fn remove_category(&self, name: &str) -> HarnessResult<()> {
        self.open_category_popup(name).await?;
        self.context.click(REMOVE_CATEGORY).await?;
        if !self.context.wait_text_gone(CATEGORY_ITEM, name).await? {
            return Err(illegal(format!("category '{}' is still listed after removal", name)));
        }
        debug!("Category '{}' removed", name);
        Ok(())
    }

    /// Types `search` and asserts the `kind` section offers only results
    /// containing it.
    pub async fn verify_link_suggestions(
        &self,
        log: &StepLog,
        search: &str,
        kind: CategoryResultType,
    ) -> HarnessResult<()> {
        self.type_category(search).await?;
        let results = self.link_results(kind).await?;
        log.require(
            &format!("{} category suggestions for '{}'", kind, search),
            "at least one",
            &results.len().to_string(),
            !results.is_empty(),
        )?;

        let needle = search.to_lowercase();
        for result in &results {
            log.require(
                "Category suggestion",
                &format!("contains '{}'", search),
                result,
                result.to_lowercase().contains(&needle),
            )?;
        }
        Ok(())
    }

    /// Applies and closes the dialog, handing control back to the editor.
    pub async fn click_apply_changes(self) -> HarnessResult<VisualEditorPage<'s>> {
        self.context.click(APPLY_CHANGES).await?;
        if !self.context.is_closed().await? {
            return Err(illegal("dialog stayed open after applying changes".to_string()));
        }
        Ok(VisualEditorPage::new(self.context.page().session()))
    }

    async fn open_category_popup(&self, name: &str) -> HarnessResult<()> {
        let chip = self.context.find_by_text(CATEGORY_ITEM, name).await?;
        self.context.click_element(&chip).await?;
        if !self.context.wait_visible(SORT_KEY_INPUT).await? {
            return Err(illegal(format!("popup for '{}' did not open", name)));
        }
        Ok(())
    }
}

fn illegal(reason: String) -> HarnessError {
    HarnessError::IllegalTransition {
        page: "VisualEditorOptionsDialog".to_string(),
        reason,
    }
}

/// Save dialog, summary panel.
pub struct SaveChangesDialog<'s> {
    context: ComponentContext<'s>,
}

impl std::fmt::Debug for SaveChangesDialog<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveChangesDialog").finish_non_exhaustive()
    }
}

impl<'s> PageObject<'s> for SaveChangesDialog<'s> {
    fn context(&self) -> &PageContext<'s> {
        self.context.page()
    }
}

impl<'s> SaveChangesDialog<'s> {
    pub async fn opened(session: &'s Session) -> HarnessResult<Self> {
        let dialog = Self {
            context: ComponentContext::new(session, "SaveChangesDialog", SAVE_PANEL),
        };
        dialog.context.page().wait_until_visible(SAVE_PANEL).await?;
        Ok(dialog)
    }

    pub async fn click_review_your_changes(self) -> HarnessResult<ReviewChangesDialog<'s>> {
        self.context.click(REVIEW_BUTTON).await?;
        ReviewChangesDialog::opened(self.context.page().session()).await
    }

    /// Publishes; the browser lands on the article in read mode.
    pub async fn save_page(self) -> HarnessResult<ArticlePage<'s>> {
        self.context.click(SAVE_BUTTON).await?;
        let session = self.context.page().session();
        session.advance_epoch();
        Ok(ArticlePage::new(session))
    }
}

/// Save dialog, diff review panel.
pub struct ReviewChangesDialog<'s> {
    context: ComponentContext<'s>,
}

impl<'s> PageObject<'s> for ReviewChangesDialog<'s> {
    fn context(&self) -> &PageContext<'s> {
        self.context.page()
    }
}

impl<'s> ReviewChangesDialog<'s> {
    pub async fn opened(session: &'s Session) -> HarnessResult<Self> {
        let dialog = Self {
            context: ComponentContext::new(session, "ReviewChangesDialog", REVIEW_PANEL),
        };
        dialog.context.page().wait_until_visible(REVIEW_PANEL).await?;
        Ok(dialog)
    }

    pub async fn added_diffs(&self) -> HarnessResult<Vec<String>> {
        self.diff_lines(ADDED_DIFF).await
    }

    pub async fn deleted_diffs(&self) -> HarnessResult<Vec<String>> {
        self.diff_lines(DELETED_DIFF).await
    }

    pub async fn verify_added_diffs(&self, log: &StepLog, expected: &[String]) -> HarnessResult<()> {
        let actual = self.added_diffs().await?;
        log.require("Added diffs", &expected.join(" "), &actual.join(" "), actual == expected)
    }

    pub async fn verify_deleted_diffs(&self, log: &StepLog, expected: &[String]) -> HarnessResult<()> {
        let actual = self.deleted_diffs().await?;
        log.require("Deleted diffs", &expected.join(" "), &actual.join(" "), actual == expected)
    }

    pub async fn click_return_to_save_form(self) -> HarnessResult<SaveChangesDialog<'s>> {
        self.context.click(RETURN_BUTTON).await?;
        SaveChangesDialog::opened(self.context.page().session()).await
    }

    async fn diff_lines(&self, selector: &str) -> HarnessResult<Vec<String>> {
        self.context.wait_visible(selector).await?;
        self.context.texts_of(selector).await
    }
}
