//! Article-level pages shared by the desktop and mobile skins

use wikiqa_harness::{HarnessResult, PageContext, PageObject, Session, StepLog};

use super::visual_editor::{VisualEditorPage, VE_SURFACE};

/// Confirmation banner shown after a successful publish
pub const PUBLISH_NOTIFICATION: &str = ".banner-notification.confirm";

/// Query flag that opens an article in the Visual Editor
const VE_ACTION: &str = "veaction=edit";

/// Entry point for any wiki page.
pub struct WikiBasePage<'s> {
    context: PageContext<'s>,
}

impl<'s> PageObject<'s> for WikiBasePage<'s> {
    fn context(&self) -> &PageContext<'s> {
        &self.context
    }
}

impl<'s> WikiBasePage<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            context: PageContext::new(session, "WikiBasePage"),
        }
    }

    /// Opens `article` on `wiki_url` straight into the Visual Editor.
    pub async fn launch_visual_editor_with_main_edit(
        &self,
        article: &str,
        wiki_url: &str,
    ) -> HarnessResult<VisualEditorPage<'s>> {
        let url = format!("{}/wiki/{}?{}", wiki_url.trim_end_matches('/'), article, VE_ACTION);
        self.context.navigate(&url).await?;

        let ve = VisualEditorPage::new(self.context.session());
        ve.context().wait_until_visible(VE_SURFACE).await?;
        Ok(ve)
    }
}

/// A rendered article in read mode.
pub struct ArticlePage<'s> {
    context: PageContext<'s>,
}

impl<'s> PageObject<'s> for ArticlePage<'s> {
    fn context(&self) -> &PageContext<'s> {
        &self.context
    }
}

impl<'s> ArticlePage<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            context: PageContext::new(session, "ArticlePage"),
        }
    }

    /// Editor gone, confirmation shown, URL back in read mode.
    pub async fn verify_ve_publish_complete(&self, log: &StepLog) -> HarnessResult<()> {
        let editor_closed = self.context.wait_hidden(VE_SURFACE).await?;
        log.require("Visual Editor", "is closed", if editor_closed { "is closed" } else { "is open" }, editor_closed)?;

        let notified = self.context.wait_visible(PUBLISH_NOTIFICATION).await?;
        log.require(
            "Publish notification",
            "is displayed",
            if notified { "is displayed" } else { "is missing" },
            notified,
        )?;

        let url = self.context.current_url().await?;
        log.require("Article URL", "read mode", &url, !url.contains(VE_ACTION))
    }
}

/// Direct navigation relative to the wiki under test. Not bound to any
/// page, so it stays usable across navigations.
pub struct Navigate<'s> {
    session: &'s Session,
    wiki_url: &'s str,
}

impl<'s> Navigate<'s> {
    pub fn new(session: &'s Session, wiki_url: &'s str) -> Self {
        Self { session, wiki_url }
    }

    pub async fn to_page(&self, path: &str) -> HarnessResult<()> {
        let url = format!(
            "{}/{}",
            self.wiki_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        self.session.navigate(&url).await?;
        Ok(())
    }
}
