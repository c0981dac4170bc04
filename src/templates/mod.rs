//! Built-in site templates using the Tera template engine
//!
//! Templates are embedded in the binary. Each view takes the ordered post
//! summaries from the content repository and returns a full HTML page.

use anyhow::Result;
use chrono::{Datelike, Local, NaiveDate};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{Icon, LinkConfig, SiteConfig};
use crate::content::{Entry, MarkdownRenderer, Post};
use crate::helpers::{date_iso, format_date, post_url, url_for};

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
    markdown: MarkdownRenderer,
    config: SiteConfig,
}

impl TemplateRenderer {
    /// Create a new renderer with all site templates loaded
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("blog.html", include_str!("site/blog.html")),
            ("post.html", include_str!("site/post.html")),
            ("error.html", include_str!("site/error.html")),
            // Partials
            (
                "partials/navbar.html",
                include_str!("site/partials/navbar.html"),
            ),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
            (
                "partials/post_list.html",
                include_str!("site/partials/post_list.html"),
            ),
        ])?;

        tera.register_filter("date_format", date_format_filter);

        let markdown =
            MarkdownRenderer::with_options(&config.highlight.theme, config.highlight.line_number);

        Ok(Self {
            tera,
            markdown,
            config: config.clone(),
        })
    }

    /// Home page with the most recent posts
    pub fn render_home(&self, recent: &[Post]) -> Result<String> {
        let mut context = self.base_context("", &self.config.description);
        self.insert_posts(&mut context, recent);
        self.render("index.html", &context)
    }

    /// Blog index listing every post
    pub fn render_blog(&self, posts: &[Post]) -> Result<String> {
        let mut context = self.base_context("Blog", &self.config.description);
        self.insert_posts(&mut context, posts);
        self.render("blog.html", &context)
    }

    /// A single post with its rendered body
    pub fn render_post(&self, entry: &Entry) -> Result<String> {
        let post = &entry.post;
        let mut context = self.base_context(post.title(), post.description());
        context.insert("post", &self.post_data(post));
        context.insert("content", &self.markdown.render(&entry.body)?);
        self.render("post.html", &context)
    }

    /// Error boundary for missing pages
    pub fn render_not_found(&self, message: &str) -> Result<String> {
        self.render_error_page("Page not found", message)
    }

    /// Error boundary for failures while reading content
    pub fn render_error(&self, message: &str) -> Result<String> {
        self.render_error_page("Something went wrong", message)
    }

    fn render_error_page(&self, heading: &str, message: &str) -> Result<String> {
        let mut context = self.base_context(heading, &self.config.description);
        context.insert("heading", heading);
        context.insert("message", message);
        self.render("error.html", &context)
    }

    fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    fn base_context(&self, page_title: &str, page_description: &str) -> Context {
        let config = &self.config;
        let mut context = Context::new();

        context.insert(
            "site",
            &ConfigData {
                title: config.title.clone(),
                description: config.description.clone(),
                author: config.author.clone(),
                language: config.language.clone(),
                keywords: config.keywords.clone(),
                date_format: config.date_format.clone(),
            },
        );
        context.insert("page_title", page_title);
        context.insert("page_description", page_description);
        context.insert("home_url", &url_for(config, "/"));
        context.insert("blog_url", &url_for(config, "/blog"));
        context.insert("year", &Local::now().year());

        let nav: Vec<LinkData> = config.nav.iter().map(|l| self.link_data(l)).collect();
        context.insert("nav", &nav);

        let links: IndexMap<&str, Vec<LinkData>> = config
            .links
            .iter()
            .map(|(group, links)| {
                (
                    group.as_str(),
                    links.iter().map(|l| self.link_data(l)).collect(),
                )
            })
            .collect();
        context.insert("links", &links);

        context
    }

    fn insert_posts(&self, context: &mut Context, posts: &[Post]) {
        let posts: Vec<PostData> = posts.iter().map(|p| self.post_data(p)).collect();
        context.insert("posts", &posts);
        context.insert("empty_message", "No posts yet.");
    }

    fn post_data(&self, post: &Post) -> PostData {
        PostData {
            slug: post.slug().to_string(),
            title: post.title().to_string(),
            description: post.description().to_string(),
            date: date_iso(post.date()),
            url: post_url(&self.config, post.slug()),
        }
    }

    fn link_data(&self, link: &LinkConfig) -> LinkData {
        LinkData {
            title: link.title.clone(),
            href: url_for(&self.config, &link.href),
            icon: link.icon,
            external: link.is_external(),
        }
    }
}

/// Tera filter: format an ISO date with a Moment.js-style format
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "YYYY-MM-DD".to_string(),
    };

    match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        Ok(date) => Ok(tera::Value::String(format_date(date, &format))),
        Err(_) => Ok(tera::Value::String(s)),
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub date: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkData {
    pub title: String,
    pub href: String,
    pub icon: Option<Icon>,
    pub external: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub keywords: Vec<String>,
    pub date_format: String,
}
