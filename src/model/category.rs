//! Category data model for annotation categories.

use crate::color_utils::{Bgr, category_color};

/// An annotation category with a name and display color.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Identifier used in the annotation file
    pub id: u32,
    /// Display name of the category
    pub name: String,
    /// BGR color used when drawing annotations of this category
    pub color: Bgr,
}

impl Category {
    /// Create a new category; the color is derived from the ID.
    pub fn new(id: u32, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            color: category_color(id),
        }
    }
}

/// Build categories from a plain list of names, numbering them from 0.
pub fn categories_from_names<S: AsRef<str>>(names: &[S]) -> Vec<Category> {
    names
        .iter()
        .enumerate()
        .map(|(index, name)| Category::new(index as u32, name.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories_from_names() {
        let cats = categories_from_names(&["cat", "dog", "bird"]);
        assert_eq!(cats.len(), 3);
        assert_eq!(cats[2].id, 2);
        assert_eq!(cats[2].name, "bird");
        assert_ne!(cats[0].color, cats[1].color);
    }
}
