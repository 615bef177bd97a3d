//! Fabrik Core Library
//!
//! Scene-graph editing core: transformable shapes, hit testing, pointer
//! gestures, marquee selection and grouping. Drawing is delegated to a host
//! supplied [`render::Painter`].

pub mod canvas;
pub mod config;
pub mod coords;
pub mod events;
pub mod geometry;
pub mod gesture;
pub mod hit;
pub mod input;
pub mod render;
pub mod selection;
pub mod shapes;
pub mod transform;

pub use canvas::{Canvas, GestureState};
pub use config::{CanvasConfig, ConfigError};
pub use coords::{CornerId, OCoords};
pub use events::{CanvasEvent, EventBus, EventKind, Subscription, Target};
pub use gesture::{CurrentTransform, ScaleMode, TransformAction};
pub use hit::HitResult;
pub use input::{CursorIcon, Modifiers, MouseButton, PointerEvent};
pub use render::{Drawable, Painter};
pub use selection::{ActiveSelection, GroupSelector, RenderItem, render_order};
pub use shapes::{Group, Shape, ShapeError, ShapeId, ShapeKind, ShapeOptions, Transformable};
pub use transform::{ObjectTransform, OriginX, OriginY};
