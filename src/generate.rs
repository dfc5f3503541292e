//! HTML site generation.
//!
//! Stage 3 of the build pipeline. Takes the preloaded manifest and generates
//! the final static site.
//!
//! ## Generated Pages
//!
//! - **Home** (`index.html`): preloader, hero and one card per category
//! - **About** (`about.html`): studio story and team
//! - **Services** (`services.html`): one entry per service, revealed on scroll
//! - **Contact** (`contact.html`): form, offices and general information
//! - **Category pages** (`<category>.html`): one looped gallery per sub-type
//! - **Legal pages** (`<slug>.html`): markdown from the content root
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── about.html, services.html, contact.html
//! ├── housing.html, comercial.html, …
//! ├── privacy.html, terms.html
//! ├── style.1f2e3d4c.css          # fingerprinted bundles
//! ├── site.9a8b7c6d.js
//! ├── i18n.5e4f3a2b.js            # catalogs + locale settings for the switcher
//! └── assets/
//!     ├── housing.jpg             # category cards
//!     ├── services/design.jpg
//!     ├── gallery/housing/residential/1.jpg
//!     └── about_us.jpg, …         # copied from content/assets/
//! ```
//!
//! Every page sits at the root and links relatively, so the site works from
//! any base path and straight from disk.
//!
//! ## Translations
//!
//! Pages are rendered in the configured default locale. Every translatable
//! element carries `data-i18n="<key>"`; `site.js` swaps the text when the
//! visitor picks another language.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping.

use crate::config::{self, Office, SiteConfig, TeamMember};
use crate::gallery::LoopStrip;
use crate::i18n::{Catalog, Locale, STORAGE_KEY};
use crate::naming::gallery_key;
use crate::preload::PreloadedManifest;
use crate::reveal::{Timeline, delay_style};
use crate::scan::Manifest;
use crate::types::{Category, Gallery, Page};
use chrono::{Datelike, Utc};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to copy assets: {0}")]
    Walk(#[from] walkdir::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/site.js");

/// Build-time options that are not part of the content.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Public reCAPTCHA key; overrides `contact.recaptcha_site_key`.
    pub recaptcha_site_key: Option<String>,
}

/// What was written, for CLI output.
#[derive(Debug, Clone, Default)]
pub struct Generated {
    pub pages: Vec<GeneratedPage>,
    pub bundles: Vec<String>,
    pub assets_copied: usize,
    /// Referenced images rendered in their unavailable state.
    pub unavailable: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPage {
    pub title: String,
    pub file: String,
    pub kind: PageKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Site,
    Category,
    Legal,
}

/// Fingerprinted bundle file names.
#[derive(Debug, Clone)]
struct Bundles {
    css: String,
    site_js: String,
    i18n_js: String,
}

/// Read the preload manifest and write the site to `output_dir`.
pub fn generate(
    manifest_path: &Path,
    source_root: &Path,
    output_dir: &Path,
    options: &Options,
) -> Result<Generated, GenerateError> {
    let manifest_content = fs::read_to_string(manifest_path)?;
    let preloaded: PreloadedManifest = serde_json::from_str(&manifest_content)?;
    generate_site(&preloaded, source_root, output_dir, options)
}

pub fn generate_site(
    preloaded: &PreloadedManifest,
    source_root: &Path,
    output_dir: &Path,
    options: &Options,
) -> Result<Generated, GenerateError> {
    let manifest = &preloaded.manifest;
    let config = &manifest.config;
    let catalog = Catalog::builtin();

    fs::create_dir_all(output_dir)?;
    let mut generated = Generated::default();

    // Bundles
    let theme_css = config::generate_theme_css(&config.colors, &config.gallery);
    let css = format!("{}\n\n{}", theme_css, CSS_STATIC);
    let i18n_js = i18n_script(catalog, config.default_locale());
    let bundles = Bundles {
        css: write_bundle(output_dir, "style", "css", &css)?,
        site_js: write_bundle(output_dir, "site", "js", JS)?,
        i18n_js: write_bundle(output_dir, "i18n", "js", &i18n_js)?,
    };
    generated.bundles = vec![
        bundles.css.clone(),
        bundles.site_js.clone(),
        bundles.i18n_js.clone(),
    ];

    // Assets
    generated.assets_copied = copy_assets(preloaded, source_root, output_dir)?;
    generated.unavailable = preloaded.failures().map(|(url, _)| url.to_string()).collect();

    let site_key = options
        .recaptcha_site_key
        .clone()
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| config.contact.recaptcha_site_key.clone());
    let ctx = Context {
        preloaded,
        catalog,
        locale: config.default_locale(),
        bundles: &bundles,
        recaptcha_site_key: &site_key,
        year: current_year(),
    };

    let mut write_page = |file: String, title: &str, kind: PageKind, markup: Markup| {
        fs::write(output_dir.join(&file), markup.into_string())?;
        generated.pages.push(GeneratedPage {
            title: title.to_string(),
            file,
            kind,
        });
        Ok::<(), GenerateError>(())
    };

    write_page("index.html".into(), "Home", PageKind::Site, render_index(&ctx))?;
    write_page("about.html".into(), ctx.t("nav.about"), PageKind::Site, render_about(&ctx))?;
    write_page(
        "services.html".into(),
        ctx.t("nav.services"),
        PageKind::Site,
        render_services(&ctx),
    )?;
    write_page(
        "contact.html".into(),
        ctx.t("nav.contact"),
        PageKind::Site,
        render_contact(&ctx),
    )?;
    for category in &manifest.categories {
        write_page(
            format!("{}.html", category.slug),
            &ctx.category_name(category),
            PageKind::Category,
            render_category(&ctx, category),
        )?;
    }
    for page in &manifest.pages {
        write_page(
            format!("{}.html", page.slug),
            &page.title,
            PageKind::Legal,
            render_legal_page(&ctx, page),
        )?;
    }

    Ok(generated)
}

/// Write `contents` as `<stem>.<hash>.<ext>` and return the file name.
fn write_bundle(output_dir: &Path, stem: &str, ext: &str, contents: &str) -> Result<String, GenerateError> {
    let name = fingerprinted(stem, ext, contents);
    fs::write(output_dir.join(&name), contents)?;
    Ok(name)
}

/// File name carrying the first 8 hex digits of the contents' SHA-256.
fn fingerprinted(stem: &str, ext: &str, contents: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(contents.as_bytes()));
    format!("{stem}.{}.{ext}", &digest[..8])
}

/// Copy `content/assets/` verbatim, then every scanned image to its URL.
/// Returns the number of files copied.
fn copy_assets(preloaded: &PreloadedManifest, source_root: &Path, output_dir: &Path) -> Result<usize, GenerateError> {
    let mut copied = 0;

    let assets_dir = source_root.join("assets");
    if assets_dir.is_dir() {
        for entry in WalkDir::new(&assets_dir) {
            let entry = entry?;
            let rel = entry.path().strip_prefix(&assets_dir).unwrap_or(entry.path());
            let dst = output_dir.join("assets").join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&dst)?;
            } else if !entry.file_name().to_string_lossy().starts_with('.') {
                fs::copy(entry.path(), &dst)?;
                copied += 1;
            }
        }
    }

    let manifest = &preloaded.manifest;
    let scanned = manifest
        .categories
        .iter()
        .flat_map(|c| {
            std::iter::once(&c.cover).chain(c.galleries.iter().flat_map(|g| g.images.iter().map(|i| &i.asset)))
        })
        .chain(manifest.services.iter().map(|s| &s.image));
    for asset in scanned {
        let src = source_root.join(&asset.source_path);
        if !src.is_file() {
            continue;
        }
        let dst = output_dir.join(&asset.url);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&src, &dst)?;
        copied += 1;
    }

    Ok(copied)
}

/// The catalogs and locale settings the browser-side switcher reads.
fn i18n_script(catalog: &Catalog, default_locale: Locale) -> String {
    let locales: Vec<serde_json::Value> = Locale::ALL
        .iter()
        .map(|l| serde_json::json!({ "code": l.as_str(), "name": l.display_name(), "flag": l.flag() }))
        .collect();
    let data = serde_json::json!({
        "defaultLocale": default_locale.as_str(),
        "storageKey": STORAGE_KEY,
        "locales": locales,
        "translations": catalog.to_json(),
    });
    format!("window.LUMALIMA_I18N = {data};\n")
}

/// Every catalog key the content directory and config refer to.
///
/// Built-in page copy (`nav.*`, `home.*`, …) is not included: those keys
/// ship with the catalogs. These are the ones a content change can break.
pub fn content_keys(manifest: &Manifest) -> Vec<String> {
    let mut keys = Vec::new();
    for category in &manifest.categories {
        let c = &category.slug;
        keys.push(format!("category.{c}"));
        for suffix in ["title", "subtitle", "description"] {
            keys.push(format!("{c}.{suffix}"));
        }
        for gallery in &category.galleries {
            let g = gallery_key(c, &gallery.slug);
            keys.push(format!("{g}.desc"));
            keys.push(g);
        }
    }
    for service in &manifest.services {
        keys.push(format!("services.{}", service.slug));
        keys.push(format!("services.{}.desc", service.slug));
    }
    for member in &manifest.config.team {
        keys.push(member.text_key("role"));
        for suffix in member.paragraphs.iter().chain(&member.quotes) {
            keys.push(member.text_key(suffix));
        }
    }
    keys.extend(manifest.config.offices.iter().map(|o| o.name_key.clone()));
    keys
}

/// Current calendar year (UTC), for the footer copyright.
fn current_year() -> i32 {
    Utc::now().year()
}

// ============================================================================
// Render context
// ============================================================================

struct Context<'a> {
    preloaded: &'a PreloadedManifest,
    catalog: &'a Catalog,
    locale: Locale,
    bundles: &'a Bundles,
    recaptcha_site_key: &'a str,
    year: i32,
}

impl<'a> Context<'a> {
    fn config(&self) -> &'a SiteConfig {
        &self.preloaded.manifest.config
    }

    fn t(&self, key: &'a str) -> &'a str {
        self.catalog.t(self.locale, key)
    }

    /// Translate a content-derived key, falling back to the folder title.
    fn t_or(&self, key: &str, fallback: &'a str) -> &'a str {
        self.catalog.t_or(self.locale, key, fallback)
    }

    fn category_name(&self, category: &Category) -> String {
        let key = format!("category.{}", category.slug);
        self.catalog.t_or(self.locale, &key, &category.title).to_string()
    }

    /// Element text with its translation key attached.
    fn text(&self, key: &'a str) -> Markup {
        html! { span data-i18n=(key) { (self.t(key)) } }
    }

    /// An image with its preloaded dimensions, or the unavailable state.
    fn image(&self, url: &str, alt: &str, class: &str, eager: bool) -> Markup {
        match self.preloaded.dimensions(url) {
            Some(d) => html! {
                img class=(class) src=(url) alt=(alt) width=(d.width) height=(d.height)
                    loading=(if eager { "eager" } else { "lazy" });
            },
            None => html! {
                div class={ (class) " image-unavailable" } role="img" aria-label=(alt) {
                    span data-i18n="gallery.unavailable" { (self.t("gallery.unavailable")) }
                }
            },
        }
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(ctx: &Context, title: &str, page: &str, content: Markup) -> Markup {
    let site = &ctx.config().site;
    html! {
        (DOCTYPE)
        html lang=(ctx.locale.as_str()) {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                meta name="description" content=(site.description);
                link rel="stylesheet" href=(ctx.bundles.css);
                noscript {
                    style { "[data-reveal], .reveal-content, .card-overlay, .card-label { opacity: 1 !important; transform: none !important; } #preloader { display: none; }" }
                }
                script src=(ctx.bundles.i18n_js) defer {}
                script src=(ctx.bundles.site_js) defer {}
            }
            body data-page=(page) {
                (site_header(ctx, page))
                (content)
                (site_footer(ctx))
            }
        }
    }
}

fn page_title(ctx: &Context, name: &str) -> String {
    format!("{} - {}", name, ctx.config().site.name)
}

/// Renders the site header: brand, navigation and language switcher
fn site_header(ctx: &Context, current: &str) -> Markup {
    let site = &ctx.config().site;
    html! {
        header.site-header {
            a.brand href="index.html" {
                span.brand-name { (site.name) }
                span.brand-tagline { (site.tagline) }
            }
            input.nav-toggle type="checkbox" id="nav-toggle";
            label.nav-hamburger for="nav-toggle" aria-label="Menu" {
                span.hamburger-line {}
                span.hamburger-line {}
                span.hamburger-line {}
            }
            nav.site-nav {
                (render_nav(ctx, current))
                (language_switcher(ctx))
            }
        }
    }
}

/// Renders the navigation menu, marking the current page
fn render_nav(ctx: &Context, current: &str) -> Markup {
    let categories = &ctx.preloaded.manifest.categories;
    let in_category = categories.iter().any(|c| c.slug == current);
    html! {
        ul.nav-list {
            @if !categories.is_empty() {
                li.nav-group.current[in_category] {
                    span data-i18n="nav.solutions" { (ctx.t("nav.solutions")) }
                    ul {
                        @for category in categories {
                            (nav_link(&format!("{}.html", category.slug), current == category.slug, html! {
                                span data-i18n={ "category." (category.slug) } { (ctx.category_name(category)) }
                            }))
                        }
                    }
                }
            }
            (nav_link("about.html", current == "about", ctx.text("nav.about")))
            (nav_link("services.html", current == "services", ctx.text("nav.services")))
            (nav_link("contact.html", current == "contact", ctx.text("nav.contact")))
        }
    }
}

fn nav_link(href: &str, is_current: bool, label: Markup) -> Markup {
    html! {
        li class=[is_current.then_some("current")] {
            a href=(href) aria-current=[is_current.then_some("page")] { (label) }
        }
    }
}

/// Renders the language switcher. `site.js` marks the active locale and
/// stores the visitor's choice.
fn language_switcher(ctx: &Context) -> Markup {
    html! {
        div.language-switcher data-language-switcher {
            button.language-current type="button" aria-haspopup="listbox" aria-expanded="false"
                aria-label=(ctx.t("language.label")) data-i18n-label="language.label" {
                span data-current-flag { (ctx.locale.flag()) }
                span data-current-code { (ctx.locale.as_str().to_uppercase()) }
            }
            ul.language-menu role="listbox" hidden {
                @for locale in Locale::ALL {
                    @let selected = locale == ctx.locale;
                    li role="option" aria-selected=(selected) {
                        button type="button" data-locale=(locale.as_str()) class=[selected.then_some("active")] {
                            span.flag { (locale.flag()) }
                            span.language-name { (locale.display_name()) }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the footer: blurb, contact details, quick links, legal links
fn site_footer(ctx: &Context) -> Markup {
    let manifest = &ctx.preloaded.manifest;
    let config = ctx.config();
    let office = config.offices.first();
    html! {
        footer.site-footer {
            div.footer-grid {
                div.footer-about {
                    span.brand-name { (config.site.name) }
                    p data-i18n="footer.description" { (ctx.t("footer.description")) }
                }
                div.footer-contact {
                    p {
                        strong data-i18n="footer.email" { (ctx.t("footer.email")) } ": "
                        a href={ "mailto:" (config.site.email) } { (config.site.email) }
                    }
                    @if let Some(office) = office {
                        p {
                            strong data-i18n="footer.phone" { (ctx.t("footer.phone")) } ": "
                            a href={ "tel:" (office.phone.replace(' ', "")) } { (office.phone) }
                        }
                    }
                }
                nav.footer-links {
                    h4 data-i18n="footer.quickLinks" { (ctx.t("footer.quickLinks")) }
                    ul {
                        li { a href="about.html" { (ctx.text("nav.about")) } }
                        li { a href="services.html" { (ctx.text("nav.services")) } }
                        li { a href="contact.html" { (ctx.text("nav.contact")) } }
                    }
                }
            }
            div.footer-bottom {
                p {
                    "© " span data-year { (ctx.year) } " " (config.site.name) ". "
                    span data-i18n="footer.rights" { (ctx.t("footer.rights")) }
                }
                @if !manifest.pages.is_empty() {
                    ul.legal-links {
                        @for page in &manifest.pages {
                            @let key = format!("footer.{}", page.slug);
                            @if ctx.catalog.contains(&key) {
                                li { a href={ (page.slug) ".html" } data-i18n=(key) { (ctx.t_or(&key, &page.title)) } }
                            } @else {
                                li { a href={ (page.slug) ".html" } { (page.title) } }
                            }
                        }
                    }
                }
            }
        }
    }
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Renders the homepage: preloader overlay, hero and category cards
fn render_index(ctx: &Context) -> Markup {
    let categories = &ctx.preloaded.manifest.categories;
    let timeline = Timeline::new(&ctx.config().reveal);
    let preload_urls: Vec<&str> = categories.iter().map(|c| c.cover.url.as_str()).collect();
    let preload_list = serde_json::to_string(&preload_urls).unwrap_or_else(|_| "[]".into());

    let content = html! {
        div #preloader data-preload=(preload_list)
            data-complete-delay=(timeline.complete_delay)
            data-content-delay=(timeline.content_delay)
            data-images-delay=(timeline.images_delay) {
            div.preloader-inner {
                p.preloader-title data-i18n="home.loading" { (ctx.t("home.loading")) }
                div.progress-track { div.progress-bar data-progress-bar {} }
                p.preloader-count {
                    span data-loaded-count { "0" } " "
                    (ctx.text("preloader.of")) " "
                    span data-total-count { (categories.len()) } " "
                    (ctx.text("preloader.loading"))
                }
            }
        }
        main.home-page {
            section.hero.reveal-content {
                h1 data-i18n="home.title" { (ctx.t("home.title")) }
                p.subtitle data-i18n="home.subtitle" { (ctx.t("home.subtitle")) }
            }
            div.category-grid {
                @for (i, category) in categories.iter().enumerate() {
                    (category_card(ctx, category, &timeline, i))
                }
            }
        }
    };

    let title = format!("{} - {}", ctx.config().site.name, ctx.config().site.tagline);
    base_document(ctx, &title, "home", content)
}

/// A homepage card: image under a sliding overlay, label fading in after.
fn category_card(ctx: &Context, category: &Category, timeline: &Timeline, index: usize) -> Markup {
    let name = ctx.category_name(category);
    html! {
        a.category-card href={ (category.slug) ".html" } {
            (ctx.image(&category.cover.url, &name, "card-image", true))
            div.card-overlay style=(delay_style(timeline.card_image_delay(index))) {}
            span.card-label style=(delay_style(timeline.card_label_delay(index)))
                data-i18n={ "category." (category.slug) } { (name) }
        }
    }
}

/// Renders the about page: story paragraphs and team members
fn render_about(ctx: &Context) -> Markup {
    let config = ctx.config();
    let content = html! {
        main.about-page {
            section.about-hero {
                (ctx.image(&config.about.image, &config.site.name, "about-image", true))
                div.about-intro {
                    h1 data-i18n="about.title" { (ctx.t("about.title")) }
                    p.subtitle data-i18n="about.subtitle" { (ctx.t("about.subtitle")) }
                }
            }
            section.about-story {
                @for key in ["about.description1", "about.description2", "about.description3", "about.description4"] {
                    p data-i18n=(key) { (ctx.t(key)) }
                }
            }
            @if !config.team.is_empty() {
                section.team {
                    h2 data-i18n="about.team.title" { (ctx.t("about.team.title")) }
                    @for member in &config.team {
                        (team_member(ctx, member))
                    }
                }
            }
        }
    };
    base_document(ctx, &page_title(ctx, ctx.t("nav.about")), "about", content)
}

fn team_member(ctx: &Context, member: &TeamMember) -> Markup {
    let role_key = member.text_key("role");
    let booking_key = member.text_key("booking");
    html! {
        article.team-member {
            @if let Some(photo) = &member.photo {
                (ctx.image(photo, &member.name, "team-photo", false))
            }
            div.team-text {
                h3 { (member.name) }
                p.role data-i18n=(role_key) { (ctx.t_or(&role_key, "")) }
                @for suffix in &member.paragraphs {
                    @let key = member.text_key(suffix);
                    p data-i18n=(key) { (ctx.t_or(&key, "")) }
                }
                @for suffix in &member.quotes {
                    @let key = member.text_key(suffix);
                    blockquote data-i18n=(key) { (ctx.t_or(&key, "")) }
                }
                div.team-links {
                    @if let Some(linkedin) = &member.linkedin {
                        a.button href=(linkedin) target="_blank" rel="noopener" {
                            (ctx.text("about.linkedin"))
                        }
                    }
                    @if let Some(booking) = &member.booking_url {
                        a.button.primary href=(booking) target="_blank" rel="noopener" {
                            span data-i18n=(booking_key) { (ctx.t_or(&booking_key, ctx.t("about.booking.frame"))) }
                        }
                    }
                }
            }
        }
    }
}

/// Renders the services page; entries reveal as they scroll into view
fn render_services(ctx: &Context) -> Markup {
    let services = &ctx.preloaded.manifest.services;
    let timeline = Timeline::new(&ctx.config().reveal);
    let content = html! {
        main.services-page {
            section.page-intro {
                h1 data-i18n="services.title" { (ctx.t("services.title")) }
                p.subtitle data-i18n="services.subtitle" { (ctx.t("services.subtitle")) }
            }
            div.service-list {
                @for (i, service) in services.iter().enumerate() {
                    @let key = format!("services.{}", service.slug);
                    @let desc_key = format!("{key}.desc");
                    @let name = ctx.t_or(&key, &service.title);
                    article.service data-reveal style=(delay_style(timeline.service_delay(i))) {
                        (ctx.image(&service.image.url, name, "service-image", i == 0))
                        div.service-text {
                            h2 data-i18n=(key) { (name) }
                            p data-i18n=(desc_key) { (ctx.t_or(&desc_key, "")) }
                        }
                    }
                }
            }
            section.cta {
                a.button.primary href="contact.html" data-i18n="services.cta" { (ctx.t("services.cta")) }
            }
        }
    };
    base_document(ctx, &page_title(ctx, ctx.t("nav.services")), "services", content)
}

/// Renders the contact page: form, offices, general information
fn render_contact(ctx: &Context) -> Markup {
    let config = ctx.config();
    let categories = &ctx.preloaded.manifest.categories;
    let site_key = ctx.recaptcha_site_key;
    let content = html! {
        main.contact-page {
            section.page-intro {
                h1 data-i18n="contact.title" { (ctx.t("contact.title")) }
                p.subtitle data-i18n="contact.subtitle" { (ctx.t("contact.subtitle")) }
            }
            div.contact-grid {
                form #contact-form.contact-form data-endpoint=(config.contact.endpoint)
                    data-site-key=(site_key) novalidate {
                    h2 data-i18n="contact.getInTouch" { (ctx.t("contact.getInTouch")) }
                    label {
                        (ctx.text("contact.form.name"))
                        input type="text" name="name" required autocomplete="name";
                    }
                    label {
                        (ctx.text("contact.form.email"))
                        input type="email" name="email" required autocomplete="email";
                    }
                    label {
                        (ctx.text("contact.form.projectType"))
                        select name="projectType" {
                            option value="" data-i18n="contact.form.selectCategory" { (ctx.t("contact.form.selectCategory")) }
                            @for category in categories {
                                option value=(category.slug) data-i18n={ "category." (category.slug) } {
                                    (ctx.category_name(category))
                                }
                            }
                        }
                    }
                    label {
                        (ctx.text("contact.form.message"))
                        textarea name="message" rows="6" required {}
                    }
                    button.button.primary type="submit" data-i18n="contact.form.send"
                        data-sending-key="contact.form.sending" { (ctx.t("contact.form.send")) }
                    p.form-status.success hidden data-i18n="contact.form.success" { (ctx.t("contact.form.success")) }
                    p.form-status.error hidden data-form-error { (ctx.t("contact.form.error")) }
                }
                section.offices {
                    h2 data-i18n="contact.offices" { (ctx.t("contact.offices")) }
                    @for office in &config.offices {
                        (office_card(ctx, office))
                    }
                    div.general-info {
                        h3 data-i18n="contact.generalInfo" { (ctx.t("contact.generalInfo")) }
                        p data-i18n="contact.generalInfo.desc" { (ctx.t("contact.generalInfo.desc")) }
                    }
                }
            }
        }
        @if !site_key.is_empty() {
            script src={ "https://www.google.com/recaptcha/api.js?render=" (site_key) } async defer {}
        }
    };
    base_document(ctx, &page_title(ctx, ctx.t("nav.contact")), "contact", content)
}

fn office_card(ctx: &Context, office: &Office) -> Markup {
    let name = ctx.t_or(&office.name_key, &office.name_key);
    html! {
        article.office {
            @if let Some(image) = &office.image {
                (ctx.image(image, name, "office-image", false))
            }
            h3 data-i18n=(office.name_key) { (name) }
            dl {
                dt data-i18n="contact.phone" { (ctx.t("contact.phone")) }
                dd { a href={ "tel:" (office.phone.replace(' ', "")) } { (office.phone) } }
                dt data-i18n="contact.email" { (ctx.t("contact.email")) }
                dd { a href={ "mailto:" (office.email) } { (office.email) } }
                dt data-i18n="contact.location" { (ctx.t("contact.location")) }
                dd {
                    @for (i, line) in office.location.iter().enumerate() {
                        @if i > 0 { br; }
                        (line)
                    }
                }
            }
        }
    }
}

/// Renders a category page with one looped gallery per sub-type
fn render_category(ctx: &Context, category: &Category) -> Markup {
    let c = &category.slug;
    let title_key = format!("{c}.title");
    let subtitle_key = format!("{c}.subtitle");
    let description_key = format!("{c}.description");
    let name = ctx.category_name(category);
    let content = html! {
        main.category-page {
            section.page-intro {
                h1 data-i18n=(title_key) { (ctx.t_or(&title_key, &name)) }
                p.subtitle data-i18n=(subtitle_key) { (ctx.t_or(&subtitle_key, "")) }
                p.description data-i18n=(description_key) { (ctx.t_or(&description_key, "")) }
            }
            @for gallery in &category.galleries {
                (render_gallery(ctx, category, gallery))
            }
        }
        (lightbox(ctx))
    };
    base_document(ctx, &page_title(ctx, &name), c, content)
}

/// A looped strip: the image list rendered three times, positioned on the
/// middle copy. See [`crate::gallery`].
fn render_gallery(ctx: &Context, category: &Category, gallery: &Gallery) -> Markup {
    let key = gallery_key(&category.slug, &gallery.slug);
    let desc_key = format!("{key}.desc");
    let strip = LoopStrip::new(gallery.images.len());
    let title = ctx.t_or(&key, &gallery.title);
    let visible = ctx.config().gallery.visible_items;
    html! {
        section.gallery data-gallery data-count=(strip.len()) data-start=(strip.start()) data-visible=(visible) {
            header.gallery-header {
                h2 data-i18n=(key) { (title) }
                p data-i18n=(desc_key) { (ctx.t_or(&desc_key, "")) }
            }
            div.gallery-viewport {
                button.gallery-nav.prev type="button" data-step="prev"
                    aria-label=(ctx.t("gallery.previous")) data-i18n-label="gallery.previous" { "‹" }
                div.gallery-strip data-strip {
                    @for tile in strip.tiles() {
                        @let image = &gallery.images[tile.index];
                        @let url = image.asset.url.as_str();
                        @let alt = format!("{} {}", title, tile.index + 1);
                        @let available = ctx.preloaded.is_available(url);
                        figure.tile.is-loading[available].is-unavailable[!available]
                            data-key=(tile.key()) data-index=(tile.index)
                            aria-hidden=[(!tile.is_primary()).then_some("true")] {
                            @if let Some(d) = ctx.preloaded.dimensions(url) {
                                div.spinner {}
                                img data-src=(url) alt=(alt) width=(d.width) height=(d.height);
                                span.tile-number { (tile.index + 1) }
                                span.tile-failed hidden data-i18n="gallery.failed" { (ctx.t("gallery.failed")) }
                            } @else {
                                span.tile-failed data-i18n="gallery.unavailable" { (ctx.t("gallery.unavailable")) }
                            }
                        }
                    }
                }
                button.gallery-nav.next type="button" data-step="next"
                    aria-label=(ctx.t("gallery.next")) data-i18n-label="gallery.next" { "›" }
            }
            div.gallery-dots {
                @for i in 0..strip.len() {
                    span.dot.active[i == strip.active_dot()] data-dot=(i) {}
                }
            }
        }
    }
}

/// One full-screen viewer per category page, shared by its galleries.
fn lightbox(ctx: &Context) -> Markup {
    html! {
        div #lightbox.lightbox hidden role="dialog" aria-modal="true" {
            button.lightbox-close type="button" aria-label=(ctx.t("gallery.close")) data-i18n-label="gallery.close" { "×" }
            img.lightbox-image alt="";
        }
    }
}

/// Renders a legal page from markdown
fn render_legal_page(ctx: &Context, page: &Page) -> Markup {
    let parser = Parser::new(&page.body);
    let mut body_html = String::new();
    md_html::push_html(&mut body_html, parser);

    let content = html! {
        main.legal-page {
            article.legal-content {
                (PreEscaped(body_html))
            }
        }
    };
    base_document(ctx, &page_title(ctx, &page.title), &page.slug, content)
}
