//! In-process wiki double for the suite tests
//!
//! Serves the Visual Editor and Mercury lightbox DOM shapes the page objects
//! expect, backed by a shared article store so that one scenario's publish is
//! visible to the next scenario's session. Only root elements are reachable
//! through global lookups; everything inside a widget has to be found
//! relative to its root.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use serde_json::Value;
use wikiqa_harness::{
    BrowserCommand, CapabilityDriver, CapturedImage, DriverError, DriverResult, ElementHandle, Gesture,
    HarnessConfig, ScenarioOptions, Session, SessionFactory, SessionProfile, Viewport, WaitConfig,
};
use wikiqa_suite::pages::{mercury, ve_dialogs, visual_editor, wiki};
use wikiqa_suite::wikitext::CategoryWikiText;

pub const BASE_URL: &str = "http://qa.fake.wiki";

pub const GALLERY_SIZE: usize = 5;

/// Categories that already exist on the wiki
pub const KNOWN_CATEGORIES: &[&str] = &["Ca", "Abcdef", "Abcd test"];

/// Header and footer band height in screenshot pixels
const UI_BAND: u32 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub sort_key: Option<String>,
}

impl Category {
    fn wikitext(&self) -> String {
        CategoryWikiText {
            name: self.name.clone(),
            sort_key: self.sort_key.clone(),
        }
        .to_string()
    }
}

/// Server-side state shared by every session.
#[derive(Debug, Default)]
pub struct WikiBackend {
    articles: HashMap<String, Vec<Category>>,
    /// Reject every publish, leaving the editor open
    pub fail_publish: bool,
    /// Ignore the close button of the category popup
    pub stuck_popup: bool,
    /// Ignore the close button of the lightbox
    pub stuck_lightbox: bool,
}

impl WikiBackend {
    pub fn categories(&self, article: &str) -> Vec<Category> {
        self.articles.get(article).cloned().unwrap_or_default()
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SavePanel {
    Closed,
    Summary,
    Review,
}

#[derive(Debug)]
struct Editor {
    article: String,
    saved: Vec<Category>,
    draft: Vec<Category>,
    menu_open: bool,
    dialog_open: bool,
    input: String,
    popup: Option<String>,
    save: SavePanel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Lightbox {
    index: usize,
    zoomed: bool,
    pan: (i64, i64),
    ui_visible: bool,
}

impl Lightbox {
    fn open(index: usize) -> Self {
        Self {
            index,
            zoomed: false,
            pan: (0, 0),
            ui_visible: true,
        }
    }

    fn show(&mut self, index: usize) {
        *self = Self {
            ui_visible: self.ui_visible,
            ..Self::open(index)
        };
    }

    fn next(&mut self) {
        self.show((self.index + 1) % GALLERY_SIZE);
    }

    fn previous(&mut self) {
        self.show((self.index + GALLERY_SIZE - 1) % GALLERY_SIZE);
    }
}

#[derive(Debug)]
enum Page {
    Blank,
    Article { published: bool },
    Editor(Editor),
    Gallery { lightbox: Option<Lightbox> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuggestionKind {
    New,
    Matching,
}

/// One element of the rendered page.
#[derive(Debug, Clone)]
struct Node {
    id: String,
    parent: Option<&'static str>,
    selectors: Vec<&'static str>,
    text: String,
    displayed: bool,
    src: Option<String>,
}

impl Node {
    fn root(id: &'static str, selector: &'static str) -> Self {
        Self {
            id: id.to_string(),
            parent: None,
            selectors: vec![selector],
            text: String::new(),
            displayed: true,
            src: None,
        }
    }

    fn child(parent: &'static str, id: impl Into<String>, selectors: Vec<&'static str>) -> Self {
        Self {
            id: id.into(),
            parent: Some(parent),
            selectors,
            text: String::new(),
            displayed: true,
            src: None,
        }
    }

    fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    fn displayed(mut self, displayed: bool) -> Self {
        self.displayed = displayed;
        self
    }

    fn src(mut self, src: impl Into<String>) -> Self {
        self.src = Some(src.into());
        self
    }
}

fn suggestions(editor: &Editor) -> Vec<(SuggestionKind, String)> {
    let search = editor.input.trim();
    if search.is_empty() {
        return Vec::new();
    }
    let needle = search.to_lowercase();
    let listed = |name: &str| editor.draft.iter().any(|c| c.name == name);

    let mut entries = Vec::new();
    if !KNOWN_CATEGORIES.iter().any(|c| c.to_lowercase() == needle) && !listed(search) {
        entries.push((SuggestionKind::New, search.to_string()));
    }
    for known in KNOWN_CATEGORIES {
        if known.to_lowercase().contains(&needle) && !listed(*known) {
            entries.push((SuggestionKind::Matching, known.to_string()));
        }
    }
    entries
}

fn image_path(index: usize) -> String {
    format!("/images/gallery-{}.jpg", index)
}

fn render(page: &Page) -> Vec<Node> {
    let mut nodes = Vec::new();
    match page {
        Page::Blank => {}
        Page::Article { published } => {
            if *published {
                nodes.push(Node::root("notification", wiki::PUBLISH_NOTIFICATION));
            }
        }
        Page::Editor(editor) => {
            nodes.push(Node::root("surface", visual_editor::VE_SURFACE));
            nodes.push(Node::root("more", visual_editor::TOOLBAR_MORE));
            nodes.push(Node::root("publish", visual_editor::PUBLISH_BUTTON));
            if editor.menu_open {
                nodes.push(Node::root(
                    "tool-categories",
                    visual_editor::InsertDialog::Categories.tool_selector(),
                ));
                nodes.push(Node::root(
                    "tool-settings",
                    visual_editor::InsertDialog::PageSettings.tool_selector(),
                ));
            }
            if editor.dialog_open {
                render_options_dialog(editor, &mut nodes);
            }
            match editor.save {
                SavePanel::Closed => {}
                SavePanel::Summary => {
                    nodes.push(Node::root("save-panel", ve_dialogs::SAVE_PANEL));
                    nodes.push(Node::child("save-panel", "review", vec![ve_dialogs::REVIEW_BUTTON]));
                    nodes.push(Node::child("save-panel", "save", vec![ve_dialogs::SAVE_BUTTON]));
                }
                SavePanel::Review => {
                    nodes.push(Node::root("review-panel", ve_dialogs::REVIEW_PANEL));
                    nodes.push(Node::child("review-panel", "return", vec![ve_dialogs::RETURN_BUTTON]));
                    let added = editor.draft.iter().filter(|c| !editor.saved.contains(c));
                    for (i, category) in added.enumerate() {
                        nodes.push(
                            Node::child("review-panel", format!("added-{}", i), vec![ve_dialogs::ADDED_DIFF])
                                .text(category.wikitext()),
                        );
                    }
                    let deleted = editor.saved.iter().filter(|c| !editor.draft.contains(c));
                    for (i, category) in deleted.enumerate() {
                        nodes.push(
                            Node::child("review-panel", format!("deleted-{}", i), vec![ve_dialogs::DELETED_DIFF])
                                .text(category.wikitext()),
                        );
                    }
                }
            }
        }
        Page::Gallery { lightbox } => {
            nodes.push(Node::root("gallery", mercury::GALLERY));
            for i in 0..GALLERY_SIZE {
                nodes.push(
                    Node::child("gallery", format!("gallery-img-{}", i), vec![mercury::GALLERY_IMAGE])
                        .src(image_path(i)),
                );
            }
            if let Some(lightbox) = lightbox {
                nodes.push(Node::root("lightbox", mercury::LIGHTBOX));
                nodes.push(
                    Node::child("lightbox", "header", vec![mercury::LIGHTBOX_HEADER]).displayed(lightbox.ui_visible),
                );
                nodes.push(
                    Node::child("lightbox", "footer", vec![mercury::LIGHTBOX_FOOTER]).displayed(lightbox.ui_visible),
                );
                nodes.push(Node::child("lightbox", "close", vec![mercury::LIGHTBOX_CLOSE]));
                nodes.push(
                    Node::child("lightbox", "current-image", vec![mercury::CURRENT_IMAGE])
                        .src(image_path(lightbox.index)),
                );
            }
        }
    }
    nodes
}

fn render_options_dialog(editor: &Editor, nodes: &mut Vec<Node>) {
    nodes.push(Node::root("options-dialog", ve_dialogs::OPTIONS_DIALOG));
    nodes.push(Node::child("options-dialog", "category-input", vec![ve_dialogs::CATEGORY_INPUT]).text(&editor.input));
    nodes.push(Node::child("options-dialog", "apply", vec![ve_dialogs::APPLY_CHANGES]));

    for (i, (kind, name)) in suggestions(editor).into_iter().enumerate() {
        let section = match kind {
            SuggestionKind::New => ve_dialogs::NEW_SUGGESTION,
            SuggestionKind::Matching => ve_dialogs::MATCHING_SUGGESTION,
        };
        nodes.push(
            Node::child("options-dialog", format!("suggestion-{}", i), vec![ve_dialogs::SUGGESTION, section])
                .text(name),
        );
    }

    for (i, category) in editor.draft.iter().enumerate() {
        nodes.push(
            Node::child("options-dialog", format!("chip-{}", i), vec![ve_dialogs::CATEGORY_ITEM])
                .text(&category.name),
        );
    }

    if let Some(name) = &editor.popup {
        let key = editor
            .draft
            .iter()
            .find(|c| &c.name == name)
            .and_then(|c| c.sort_key.clone())
            .unwrap_or_default();
        nodes.push(Node::child("options-dialog", "sort-key", vec![ve_dialogs::SORT_KEY_INPUT]).text(key));
        nodes.push(Node::child("options-dialog", "remove-category", vec![ve_dialogs::REMOVE_CATEGORY]));
        nodes.push(Node::child("options-dialog", "close-popup", vec![ve_dialogs::CLOSE_POPUP]));
    }
}

fn not_found(selector: impl Into<String>) -> DriverError {
    DriverError::ElementNotFound {
        selector: selector.into(),
    }
}

/// 64-bit mix for the screenshot texture
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// One browser tab on the fake wiki.
pub struct FakeWiki {
    backend: Arc<Mutex<WikiBackend>>,
    viewport: Viewport,
    page: Mutex<Page>,
    url: Mutex<String>,
    gestures: Arc<Mutex<Vec<Gesture>>>,
    quits: Arc<AtomicUsize>,
}

impl FakeWiki {
    pub fn new(backend: Arc<Mutex<WikiBackend>>, viewport: Viewport) -> Self {
        Self::with_quit_counter(backend, viewport, Arc::new(AtomicUsize::new(0)))
    }

    pub fn with_quit_counter(backend: Arc<Mutex<WikiBackend>>, viewport: Viewport, quits: Arc<AtomicUsize>) -> Self {
        Self {
            backend,
            viewport,
            page: Mutex::new(Page::Blank),
            url: Mutex::new("about:blank".to_string()),
            gestures: Arc::new(Mutex::new(Vec::new())),
            quits,
        }
    }

    pub fn gesture_log(&self) -> Arc<Mutex<Vec<Gesture>>> {
        self.gestures.clone()
    }

    pub fn quit_counter(&self) -> Arc<AtomicUsize> {
        self.quits.clone()
    }

    fn node(&self, id: &str) -> DriverResult<Node> {
        render(&self.page.lock())
            .into_iter()
            .find(|n| n.id == id)
            .ok_or_else(|| not_found(format!("stale element {}", id)))
    }

    fn roots(&self, selector: &str) -> Vec<ElementHandle> {
        render(&self.page.lock())
            .into_iter()
            .filter(|n| n.parent.is_none() && n.selectors.iter().any(|s| *s == selector))
            .map(|n| ElementHandle::new(n.id))
            .collect()
    }

    fn children(&self, parent: &ElementHandle, selector: &str) -> DriverResult<Vec<ElementHandle>> {
        let nodes = render(&self.page.lock());
        if !nodes.iter().any(|n| n.id == parent.id()) {
            return Err(not_found(format!("stale element {}", parent.id())));
        }
        Ok(nodes
            .into_iter()
            .filter(|n| n.parent == Some(parent.id()) && n.selectors.iter().any(|s| *s == selector))
            .map(|n| ElementHandle::new(n.id))
            .collect())
    }

    fn click_editor(&self, editor: &mut Editor, id: &str) -> Option<Page> {
        match id {
            "more" => editor.menu_open = !editor.menu_open,
            "tool-categories" | "tool-settings" => {
                editor.menu_open = false;
                editor.dialog_open = true;
            }
            "apply" => {
                editor.dialog_open = false;
                editor.popup = None;
                editor.input.clear();
            }
            "publish" => editor.save = SavePanel::Summary,
            "review" => editor.save = SavePanel::Review,
            "return" => editor.save = SavePanel::Summary,
            "save" => {
                let mut backend = self.backend.lock();
                if !backend.fail_publish {
                    backend.articles.insert(editor.article.clone(), editor.draft.clone());
                    *self.url.lock() = format!("{}/wiki/{}", BASE_URL, editor.article);
                    return Some(Page::Article { published: true });
                }
            }
            "remove-category" => {
                if let Some(name) = editor.popup.take() {
                    editor.draft.retain(|c| c.name != name);
                }
            }
            "close-popup" => {
                if !self.backend.lock().stuck_popup {
                    editor.popup = None;
                }
            }
            _ => {
                if let Some(i) = id.strip_prefix("chip-").and_then(|i| i.parse::<usize>().ok()) {
                    editor.popup = editor.draft.get(i).map(|c| c.name.clone());
                } else if let Some(i) = id.strip_prefix("suggestion-").and_then(|i| i.parse::<usize>().ok()) {
                    if let Some((_, name)) = suggestions(editor).into_iter().nth(i) {
                        editor.draft.push(Category { name, sort_key: None });
                        editor.input.clear();
                    }
                }
            }
        }
        None
    }

    fn click_gallery(lightbox: &mut Option<Lightbox>, id: &str, stuck: bool) {
        match id {
            "close" if stuck => {}
            "close" => *lightbox = None,
            "current-image" => {
                if let Some(lb) = lightbox {
                    lb.ui_visible = !lb.ui_visible;
                }
            }
            _ => {
                if let Some(i) = id.strip_prefix("gallery-img-").and_then(|i| i.parse::<usize>().ok()) {
                    *lightbox = Some(Lightbox::open(i));
                }
            }
        }
    }

    fn apply_gesture(&self, lightbox: &mut Lightbox, gesture: &Gesture) {
        let width = i64::from(self.viewport.width);
        match gesture {
            Gesture::Tap { taps, .. } if *taps >= 2 => {
                lightbox.zoomed = !lightbox.zoomed;
                if !lightbox.zoomed {
                    lightbox.pan = (0, 0);
                }
            }
            Gesture::Tap { at, .. } => {
                if at.x < width / 3 {
                    lightbox.previous();
                } else if at.x > width * 2 / 3 {
                    lightbox.next();
                } else {
                    lightbox.ui_visible = !lightbox.ui_visible;
                }
            }
            Gesture::Swipe { from, to, .. } => {
                let (dx, dy) = (to.x - from.x, to.y - from.y);
                if lightbox.zoomed {
                    lightbox.pan = (lightbox.pan.0 + dx, lightbox.pan.1 + dy);
                } else if dx.abs() > dy.abs() && dx.abs() > 20 {
                    if dx < 0 {
                        lightbox.next();
                    } else {
                        lightbox.previous();
                    }
                }
            }
            Gesture::Pinch {
                from_distance,
                to_distance,
                ..
            } => {
                lightbox.zoomed = to_distance > from_distance;
                if !lightbox.zoomed {
                    lightbox.pan = (0, 0);
                }
            }
        }
    }

    /// Quarter-resolution frame. The lightbox body is a texture keyed by
    /// image, zoom and pan, so any of those changing changes most pixels.
    fn frame(&self) -> RgbaImage {
        let width = (self.viewport.width / 4).max(1);
        let height = (self.viewport.height / 4).max(1);
        let lightbox = match &*self.page.lock() {
            Page::Gallery { lightbox } => *lightbox,
            _ => None,
        };

        let Some(lightbox) = lightbox else {
            return RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        };

        let seed = mix(lightbox.index as u64)
            ^ mix(u64::from(lightbox.zoomed) << 32)
            ^ mix(lightbox.pan.0 as u64 ^ ((lightbox.pan.1 as u64) << 20));
        RgbaImage::from_fn(width, height, |x, y| {
            let band = y < UI_BAND || y >= height.saturating_sub(UI_BAND);
            if lightbox.ui_visible && band {
                return Rgba([20, 20, 20, 255]);
            }
            let v = mix(seed ^ (u64::from(x) << 16) ^ u64::from(y));
            Rgba([v as u8, (v >> 8) as u8, (v >> 16) as u8, 255])
        })
    }
}

#[async_trait]
impl CapabilityDriver for FakeWiki {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let Some((_, rest)) = url.split_once("/wiki/") else {
            return Err(DriverError::NavigationFailed {
                url: url.to_string(),
                reason: "not a wiki page".to_string(),
            });
        };
        let (title, query) = rest.split_once('?').unwrap_or((rest, ""));

        let page = if query.contains("veaction=edit") {
            let saved = self.backend.lock().categories(title);
            Page::Editor(Editor {
                article: title.to_string(),
                draft: saved.clone(),
                saved,
                menu_open: false,
                dialog_open: false,
                input: String::new(),
                popup: None,
                save: SavePanel::Closed,
            })
        } else if title == "Gallery" {
            Page::Gallery { lightbox: None }
        } else {
            Page::Article { published: false }
        };

        *self.page.lock() = page;
        *self.url.lock() = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> DriverResult<String> {
        Ok(self.url.lock().clone())
    }

    async fn find_element(&self, selector: &str) -> DriverResult<ElementHandle> {
        self.roots(selector).into_iter().next().ok_or_else(|| not_found(selector))
    }

    async fn find_elements(&self, selector: &str) -> DriverResult<Vec<ElementHandle>> {
        Ok(self.roots(selector))
    }

    async fn find_child(&self, parent: &ElementHandle, selector: &str) -> DriverResult<ElementHandle> {
        self.children(parent, selector)?
            .into_iter()
            .next()
            .ok_or_else(|| not_found(format!("{} {}", parent.id(), selector)))
    }

    async fn find_children(
        &self,
        parent: &ElementHandle,
        selector: &str,
    ) -> DriverResult<Vec<ElementHandle>> {
        self.children(parent, selector)
    }

    async fn click(&self, element: &ElementHandle) -> DriverResult<()> {
        let node = self.node(element.id())?;
        if !node.displayed {
            return Err(DriverError::Protocol(format!("element not interactable: {}", node.id)));
        }

        let stuck_lightbox = self.backend.lock().stuck_lightbox;
        let mut page = self.page.lock();
        let replacement = match &mut *page {
            Page::Editor(editor) => self.click_editor(editor, &node.id),
            Page::Gallery { lightbox } => {
                Self::click_gallery(lightbox, &node.id, stuck_lightbox);
                None
            }
            _ => None,
        };
        if let Some(next) = replacement {
            *page = next;
        }
        Ok(())
    }

    async fn type_text(&self, element: &ElementHandle, text: &str) -> DriverResult<()> {
        self.node(element.id())?;
        if let Page::Editor(editor) = &mut *self.page.lock() {
            match element.id() {
                "category-input" => editor.input.push_str(text),
                "sort-key" => {
                    if let Some(name) = editor.popup.clone() {
                        if let Some(category) = editor.draft.iter_mut().find(|c| c.name == name) {
                            category.sort_key.get_or_insert_with(String::new).push_str(text);
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> DriverResult<()> {
        self.node(element.id())?;
        if let Page::Editor(editor) = &mut *self.page.lock() {
            match element.id() {
                "category-input" => editor.input.clear(),
                "sort-key" => {
                    if let Some(name) = editor.popup.clone() {
                        if let Some(category) = editor.draft.iter_mut().find(|c| c.name == name) {
                            category.sort_key = None;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    async fn is_displayed(&self, element: &ElementHandle) -> DriverResult<bool> {
        Ok(self.node(element.id())?.displayed)
    }

    async fn text(&self, element: &ElementHandle) -> DriverResult<String> {
        Ok(self.node(element.id())?.text)
    }

    async fn attribute(&self, element: &ElementHandle, name: &str) -> DriverResult<Option<String>> {
        let node = self.node(element.id())?;
        Ok(match name {
            "src" => node.src,
            _ => None,
        })
    }

    async fn capture_screenshot(&self) -> DriverResult<CapturedImage> {
        CapturedImage::from_rgba(self.frame()).map_err(|e| DriverError::Decode(e.to_string()))
    }

    async fn perform_gesture(&self, gesture: &Gesture) -> DriverResult<()> {
        self.gestures.lock().push(gesture.clone());
        if let Page::Gallery { lightbox: Some(lightbox) } = &mut *self.page.lock() {
            self.apply_gesture(lightbox, gesture);
        }
        Ok(())
    }

    async fn execute(&self, command: &BrowserCommand) -> DriverResult<Value> {
        if let BrowserCommand::Back = command {
            if let Page::Gallery { lightbox } = &mut *self.page.lock() {
                *lightbox = None;
            }
        }
        Ok(Value::Null)
    }

    async fn quit(&self) -> DriverResult<()> {
        self.quits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Opens a [`FakeWiki`] tab per scenario, all sharing one backend.
#[derive(Clone, Default)]
pub struct FakeFactory {
    pub backend: Arc<Mutex<WikiBackend>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    profiles: Arc<Mutex<Vec<SessionProfile>>>,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_publish() -> Self {
        let factory = Self::default();
        factory.backend.lock().fail_publish = true;
        factory
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn profiles(&self) -> Vec<SessionProfile> {
        self.profiles.lock().clone()
    }

    /// A session outside the runner, for driving page objects directly.
    pub fn session(&self, options: &ScenarioOptions) -> Session {
        let profile = profile_for(options);
        let driver = FakeWiki::new(self.backend.clone(), profile.viewport);
        Session::new(Box::new(driver), profile, wait_config())
    }
}

fn profile_for(options: &ScenarioOptions) -> SessionProfile {
    SessionProfile {
        viewport: options
            .emulation
            .map(|e| e.viewport())
            .unwrap_or_default(),
        emulation: options.emulation,
        proxy: options.proxy.clone(),
        country_code: options.country_code.clone(),
    }
}

pub fn wait_config() -> WaitConfig {
    WaitConfig::new(Duration::from_millis(500), Duration::from_millis(5))
}

#[async_trait]
impl SessionFactory for FakeFactory {
    async fn open(&self, options: &ScenarioOptions) -> DriverResult<Session> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let profile = profile_for(options);
        self.profiles.lock().push(profile.clone());

        let driver = FakeWiki::with_quit_counter(self.backend.clone(), profile.viewport, self.closed.clone());
        Ok(Session::new(Box::new(driver), profile, wait_config()))
    }
}

/// Config for suite runs against the fake: fast waits, no gesture pauses.
pub fn test_config(output_dir: &Path) -> HarnessConfig {
    HarnessConfig {
        base_url: BASE_URL.to_string(),
        output_dir: output_dir.to_path_buf(),
        settle_factor: 0.0,
        wait: wikiqa_harness::WaitSettings {
            timeout_ms: 500,
            poll_interval_ms: 5,
        },
        ..HarnessConfig::default()
    }
}
