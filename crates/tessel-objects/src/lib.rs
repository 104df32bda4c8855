#![forbid(unsafe_code)]

//! Object layer: shapes, game objects, cells with bound items, text and
//! reloadable image objects, and ordered constructor factories.

pub mod actions;
pub mod cell;
pub mod entity;
pub mod factory;
pub mod game_object;
pub mod generic;
pub mod shape;
pub mod text;

pub use actions::{Action, ActionGroups, DEFAULT_GROUP};
pub use cell::{BindingRule, Bindings, Cell};
pub use entity::Entity;
pub use factory::ImageFactory;
pub use game_object::{AxisRange, CompareKey, GameObject, ObjectId, Surround};
pub use generic::{DEFAULT_VELOCITY, GenericObject, ObjectConfig, RELOAD_ON_RESIZE};
pub use shape::Shape;
pub use text::{MovingText, TextImage};
