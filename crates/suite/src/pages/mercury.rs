//! Mercury (mobile skin) gallery and lightbox

use wikiqa_harness::{ComponentContext, DriverError, HarnessError, HarnessResult, PageContext, PageObject, Session};

pub const GALLERY: &str = ".article-gallery";
pub const GALLERY_IMAGE: &str = "img";

pub const LIGHTBOX: &str = ".lightbox-wrapper";
pub const LIGHTBOX_HEADER: &str = ".lightbox-header";
pub const LIGHTBOX_FOOTER: &str = ".lightbox-footer";
pub const LIGHTBOX_CLOSE: &str = ".lightbox-close-wrapper";
pub const CURRENT_IMAGE: &str = ".lightbox-content .current";

/// Article gallery on the mobile skin.
pub struct GalleryComponent<'s> {
    context: ComponentContext<'s>,
}

impl<'s> PageObject<'s> for GalleryComponent<'s> {
    fn context(&self) -> &PageContext<'s> {
        self.context.page()
    }
}

impl<'s> GalleryComponent<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            context: ComponentContext::new(session, "GalleryComponent", GALLERY),
        }
    }

    /// Opens the lightbox on the `index`-th gallery image. The gallery stays
    /// usable once the lightbox is closed again.
    pub async fn click_gallery_image(&self, index: usize) -> HarnessResult<LightboxComponent<'s>> {
        self.context.page().wait_until_visible(GALLERY).await?;
        let images = self.context.find_all(GALLERY_IMAGE).await?;
        let image = images.get(index).ok_or_else(|| DriverError::ElementNotFound {
            selector: format!("{} {}[{}]", GALLERY, GALLERY_IMAGE, index),
        })?;
        self.context.click_element(image).await?;
        Ok(LightboxComponent::new(self.context.page().session()))
    }
}

/// Full-screen image viewer. Queries wait for their condition; actions on a
/// closed lightbox are illegal transitions.
pub struct LightboxComponent<'s> {
    context: ComponentContext<'s>,
}

impl std::fmt::Debug for LightboxComponent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LightboxComponent").finish_non_exhaustive()
    }
}

impl<'s> PageObject<'s> for LightboxComponent<'s> {
    fn context(&self) -> &PageContext<'s> {
        self.context.page()
    }
}

impl<'s> LightboxComponent<'s> {
    pub fn new(session: &'s Session) -> Self {
        Self {
            context: ComponentContext::new(session, "LightboxComponent", LIGHTBOX),
        }
    }

    pub async fn is_lightbox_opened(&self) -> HarnessResult<bool> {
        self.context.is_open().await
    }

    pub async fn is_lightbox_closed(&self) -> HarnessResult<bool> {
        self.context.is_closed().await
    }

    pub async fn is_current_image_visible(&self) -> HarnessResult<bool> {
        self.context.wait_visible(CURRENT_IMAGE).await
    }

    /// `src` of the image being shown; empty when it has none.
    pub async fn current_image_path(&self) -> HarnessResult<String> {
        Ok(self
            .context
            .attribute_of(CURRENT_IMAGE, "src")
            .await?
            .unwrap_or_default())
    }

    pub async fn is_header_displayed(&self) -> HarnessResult<bool> {
        self.context.wait_visible(LIGHTBOX_HEADER).await
    }

    pub async fn is_header_hidden(&self) -> HarnessResult<bool> {
        self.context.wait_hidden(LIGHTBOX_HEADER).await
    }

    pub async fn is_footer_displayed(&self) -> HarnessResult<bool> {
        self.context.wait_visible(LIGHTBOX_FOOTER).await
    }

    pub async fn is_footer_hidden(&self) -> HarnessResult<bool> {
        self.context.wait_hidden(LIGHTBOX_FOOTER).await
    }

    /// Tapping the image toggles header and footer.
    pub async fn click_on_image(&self) -> HarnessResult<()> {
        self.context.click(CURRENT_IMAGE).await
    }

    pub async fn click_close_button(&self) -> HarnessResult<()> {
        self.context.click(LIGHTBOX_CLOSE).await?;
        if !self.context.is_closed().await? {
            return Err(HarnessError::IllegalTransition {
                page: "LightboxComponent".to_string(),
                reason: "lightbox stayed open after tapping close".to_string(),
            });
        }
        Ok(())
    }
}
