//! Visual Editor category scenarios
//!
//! Adding, removing and suggesting categories through the page options
//! dialog, each change verified in the diff review before publishing.

use std::sync::Arc;

use async_trait::async_trait;
use wikiqa_harness::{HarnessResult, Scenario, ScenarioBody, ScenarioContext};

use crate::pages::{ArticlePage, CategoryResultType, InsertDialog, VisualEditorOptionsDialog, WikiBasePage};
use crate::wikitext::{article_name, CategoryWikiText};

pub const GROUP: &str = "VECategoryTests";

pub const TEST_CATEGORY: &str = "Ca";
pub const CATEGORY_SEARCH: &str = "abcd";
pub const SORT_KEY_CATEGORY: &str = "Newstuff";
pub const SORT_KEY: &str = "testkey";

/// State shared by the scenarios of one suite run.
#[derive(Debug, Clone)]
pub struct CategoryFixture {
    /// Article edited by the add and remove scenarios
    pub article: String,
}

impl CategoryFixture {
    pub fn new() -> Self {
        Self {
            article: article_name(),
        }
    }
}

impl Default for CategoryFixture {
    fn default() -> Self {
        Self::new()
    }
}

async fn open_categories<'s>(
    ctx: &'s ScenarioContext,
    article: &str,
) -> HarnessResult<VisualEditorOptionsDialog<'s>> {
    let base = WikiBasePage::new(ctx.session());
    let ve = base
        .launch_visual_editor_with_main_edit(article, &ctx.config().base_url)
        .await?;
    ve.open_dialog_from_menu(InsertDialog::Categories).await
}

/// Apply, publish via the review panel, and check the diff on the way.
async fn publish_reviewing<'s>(
    ctx: &'s ScenarioContext,
    dialog: VisualEditorOptionsDialog<'s>,
    added: &[String],
    deleted: &[String],
) -> HarnessResult<ArticlePage<'s>> {
    let ve = dialog.click_apply_changes().await?;
    let save = ve.click_publish_button().await?;
    let review = save.click_review_your_changes().await?;
    if !added.is_empty() {
        review.verify_added_diffs(ctx.log(), added).await?;
    }
    if !deleted.is_empty() {
        review.verify_deleted_diffs(ctx.log(), deleted).await?;
    }
    let save = review.click_return_to_save_form().await?;
    save.save_page().await
}

pub struct AddNewCategory {
    pub fixture: Arc<CategoryFixture>,
}

#[async_trait]
impl ScenarioBody for AddNewCategory {
    async fn run(&self, ctx: &ScenarioContext) -> HarnessResult<()> {
        let dialog = open_categories(ctx, &self.fixture.article).await?;
        dialog.add_category(TEST_CATEGORY).await?;

        let expected = vec![CategoryWikiText::new(TEST_CATEGORY).to_string()];
        let article = publish_reviewing(ctx, dialog, &expected, &[]).await?;
        article.verify_ve_publish_complete(ctx.log()).await
    }
}

pub struct RemoveCategory {
    pub fixture: Arc<CategoryFixture>,
}

#[async_trait]
impl ScenarioBody for RemoveCategory {
    async fn run(&self, ctx: &ScenarioContext) -> HarnessResult<()> {
        let dialog = open_categories(ctx, &self.fixture.article).await?;
        dialog.remove_category(TEST_CATEGORY).await?;

        let expected = vec![CategoryWikiText::new(TEST_CATEGORY).to_string()];
        let article = publish_reviewing(ctx, dialog, &[], &expected).await?;
        article.verify_ve_publish_complete(ctx.log()).await
    }
}

/// Suggestion menu check; never publishes.
pub struct CategorySuggestions {
    pub fixture: Arc<CategoryFixture>,
    pub kind: CategoryResultType,
}

#[async_trait]
impl ScenarioBody for CategorySuggestions {
    async fn run(&self, ctx: &ScenarioContext) -> HarnessResult<()> {
        let dialog = open_categories(ctx, &self.fixture.article).await?;
        dialog
            .verify_link_suggestions(ctx.log(), CATEGORY_SEARCH, self.kind)
            .await
    }
}

/// Works on its own fresh article.
pub struct AddNewCategoryWithSortKey;

#[async_trait]
impl ScenarioBody for AddNewCategoryWithSortKey {
    async fn run(&self, ctx: &ScenarioContext) -> HarnessResult<()> {
        let article = article_name();
        let dialog = open_categories(ctx, &article).await?;
        dialog.add_category(SORT_KEY_CATEGORY).await?;
        dialog.add_sort_key_to_category(SORT_KEY_CATEGORY, SORT_KEY).await?;

        let expected = vec![CategoryWikiText::with_sort_key(SORT_KEY_CATEGORY, SORT_KEY).to_string()];
        let article = publish_reviewing(ctx, dialog, &expected, &[]).await?;
        article.verify_ve_publish_complete(ctx.log()).await
    }
}

pub fn scenarios() -> Vec<Scenario> {
    scenarios_with(Arc::new(CategoryFixture::new()))
}

pub fn scenarios_with(fixture: Arc<CategoryFixture>) -> Vec<Scenario> {
    vec![
        Scenario::new(
            "VECategoryTests_001_AddNewCategory",
            AddNewCategory {
                fixture: fixture.clone(),
            },
        )
        .in_group(GROUP)
        .in_group("VECategoryTests_001")
        .in_group("VEAddCategory"),
        Scenario::new(
            "VECategoryTests_002_RemoveCategory",
            RemoveCategory {
                fixture: fixture.clone(),
            },
        )
        .in_group(GROUP)
        .in_group("VECategoryTests_002")
        .in_group("VERemoveCategory")
        .depends_on("VECategoryTests_001"),
        Scenario::new(
            "VECategoryTests_003_NewCategorySuggestions",
            CategorySuggestions {
                fixture: fixture.clone(),
                kind: CategoryResultType::New,
            },
        )
        .in_group(GROUP)
        .in_group("VECategoryTests_003")
        .in_group("VEAddCategory"),
        Scenario::new(
            "VECategoryTests_004_MatchingCategorySuggestions",
            CategorySuggestions {
                fixture,
                kind: CategoryResultType::Matching,
            },
        )
        .in_group(GROUP)
        .in_group("VECategoryTests_004")
        .in_group("VEAddCategory"),
        Scenario::new("VECategoryTests_005_AddNewCategoryWithSortKey", AddNewCategoryWithSortKey)
            .in_group(GROUP)
            .in_group("VECategoryTests_005")
            .in_group("VEAddCategory"),
    ]
}
