pub mod html;
pub mod page;
pub mod render;
pub mod tree;

pub use html::{RenderOptions, render_schema_html, to_html};
pub use page::{PageOptions, render_page, render_page_from_query};
pub use render::{render_resolution, render_roots, render_schema, render_tree};
pub use tree::VisualNode;
