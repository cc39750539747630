//! Name normalization and fuzzy identity matching.

mod index;
mod matcher;
mod normalize;

pub use index::NameIndex;
pub use matcher::{FUZZY_MIN_LEN, matches};
pub use normalize::{name_parts, normalize, surname_key};
