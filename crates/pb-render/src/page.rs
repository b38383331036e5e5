//! The standalone render page: a full HTML document for one schema, either
//! given directly or decoded from a render-link query string.

use crate::html::{RenderOptions, escape_text, to_html};
use crate::render::render_schema;
use pb_core::id::{ClockIdGenerator, IdGenerator};
use pb_core::transport::{DEFAULT_SCHEMA_PARAM, schema_from_query};
use pb_core::PageSchema;

/// Render-page configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    /// Query parameter carrying the encoded schema.
    pub param: String,
    /// Document title when the schema has none.
    pub fallback_title: String,
    /// Document language.
    pub lang: String,
    pub render: RenderOptions,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            param: DEFAULT_SCHEMA_PARAM.to_string(),
            fallback_title: "Preview".to_string(),
            lang: "en".to_string(),
            render: RenderOptions::default(),
        }
    }
}

/// A complete HTML document for `schema`.
#[must_use]
pub fn render_page(schema: &PageSchema, options: &PageOptions) -> String {
    let title = schema
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(&options.fallback_title);
    let body = to_html(&render_schema(schema), &options.render);
    document(title, &body, options)
}

/// Decode the schema from `query` and render it. Transport failures are
/// shown inline in the page instead of failing.
#[must_use]
pub fn render_page_from_query(query: &str, options: &PageOptions) -> String {
    render_page_from_query_with(query, options, &mut ClockIdGenerator::new())
}

/// [`render_page_from_query`] with an explicit id source for any ids the
/// normalizer has to synthesize.
#[must_use]
pub fn render_page_from_query_with(
    query: &str,
    options: &PageOptions,
    ids: &mut dyn IdGenerator,
) -> String {
    match schema_from_query(query, &options.param, ids) {
        Ok(schema) => render_page(&schema, options),
        Err(err) => {
            log::warn!("render page: {err}");
            let message = format!("Could not load this page: {err}");
            document(&options.fallback_title, &error_html(&message, &options.render), options)
        }
    }
}

/// The inline error element.
pub fn error_html(message: &str, render: &RenderOptions) -> String {
    format!(
        "<p class=\"{}\" role=\"alert\">{}</p>",
        render.class_name("error"),
        escape_text(message)
    )
}

fn document(title: &str, body: &str, options: &PageOptions) -> String {
    let main_class = options.render.class_name("page");
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"{lang}\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         <main class=\"{main_class}\">\n\
         {body}\
         {sep}</main>\n\
         </body>\n\
         </html>\n",
        lang = escape_text(&options.lang),
        title = escape_text(title),
        sep = if options.render.pretty || body.is_empty() { "" } else { "\n" },
    )
}
