//! Caption domain module.
//!
//! - `model`: Votable caption records (`CaptionItem`, `ImageRef`)
//! - `repository`: Read access to the caption table (`CaptionRepository`)

mod model;
mod repository;

pub use model::{CaptionItem, ImageRef};
pub use repository::CaptionRepository;
