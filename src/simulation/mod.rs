mod vector;
mod geometry;
mod transform;
mod collider;
mod collision;
mod landscape;
mod rocket;
mod planet;
mod lander_runner;

pub use vector::*;
pub use geometry::*;
pub use transform::*;
pub use collider::*;
pub use collision::*;
pub use landscape::*;
pub use rocket::*;
pub use planet::*;
pub use lander_runner::*;
