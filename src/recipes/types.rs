//! Recipe record types.

use serde::{Deserialize, Serialize};

/// A stored recipe, matching the `recipes` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// UUID v7 primary key.
    pub id: String,
    /// Unique, human-readable name ("Spaghetti Pomodoro").
    pub title: String,
    /// Ingredients and steps as free text.
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// A recipe before it has been assigned an id and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecipe {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewRecipe {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Text that gets embedded: the title carries most of the signal for short queries.
    pub fn embedding_text(&self) -> String {
        render_document(&self.title, &self.content)
    }
}

impl Recipe {
    /// The recipe as it is placed into a prompt's context block.
    pub fn as_document(&self) -> String {
        render_document(&self.title, &self.content)
    }
}

fn render_document(title: &str, content: &str) -> String {
    format!("Recipe: {title}\n{content}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_starts_with_recipe_title() {
        let recipe = Recipe {
            id: "r1".into(),
            title: "Omelette".into(),
            content: "Whisk 3 eggs, cook in butter.".into(),
            tags: vec![],
            created_at: "2024-01-01T00:00:00Z".into(),
        };
        assert_eq!(
            recipe.as_document(),
            "Recipe: Omelette\nWhisk 3 eggs, cook in butter."
        );
    }

    #[test]
    fn new_recipe_deserializes_without_tags() {
        let recipe: NewRecipe =
            serde_json::from_str(r#"{"title": "Soup", "content": "Boil."}"#).unwrap();
        assert!(recipe.tags.is_empty());
        assert_eq!(recipe.embedding_text(), "Recipe: Soup\nBoil.");
    }
}
