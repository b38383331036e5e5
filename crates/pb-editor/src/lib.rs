pub mod commands;
pub mod events;
pub mod preview;
pub mod store;

pub use commands::CommandStack;
pub use events::{PreviewBus, PreviewObserver, SchemaEvent, SubscriptionId};
pub use preview::LivePreview;
pub use store::{GraphMutation, SchemaStore};
