pub mod error;
pub mod fallback;
pub mod id;
pub mod index;
pub mod links;
pub mod lint;
pub mod model;
pub mod normalize;
pub mod order;
pub mod props;
pub mod resolve;
pub mod roots;
pub mod style;
pub mod transport;
pub mod units;

pub use error::{DecodeError, SchemaError};
pub use fallback::{PromptIntent, generate};
pub use id::{ClockIdGenerator, IdGenerator, NodeId, PREVIEW_ID, SequentialIdGenerator};
pub use index::{ChildIndex, ChildList};
pub use links::{UrlUse, is_safe_url};
pub use lint::{LintDiagnostic, LintSeverity, lint_schema};
pub use model::*;
pub use normalize::{GridLayout, degenerate_schema, normalize, normalize_str, try_normalize};
pub use order::order_children;
pub use props::ComponentProps;
pub use resolve::Resolution;
pub use roots::resolve_roots;
pub use style::{Presentation, StyleMap, parse_style_json};
pub use transport::{DEFAULT_SCHEMA_PARAM, decode_schema_param, encode_schema, render_link, schema_from_query};
pub use units::Length;
