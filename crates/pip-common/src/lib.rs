pub mod badge;
pub mod errors;
pub mod events;
pub mod id;
pub mod types;

pub use badge::{Badge, BadgeKind};
pub use errors::{ChannelError, ConfigError, MediaError, StoreError};
pub use events::{Event, EventBus};
pub use id::new_correlation_id;
pub use types::{FrameId, Rect, TabId, TabInfo, WindowId};
