mod card;
mod template;

pub use card::{parse_color, Card};
pub use template::{render, PlaceholderCase, SummaryField};
