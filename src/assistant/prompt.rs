//! Prompt assembly.
//!
//! [`build_prompt`] is a pure function of the template, the conversation so
//! far, the documents retrieved for the new query, and the query itself.

use anyhow::{Context, Result};
use std::fmt::Write;

use super::Turn;
use crate::config::{expand_tilde, AssistantConfig};

/// Context line used when retrieval found nothing.
pub const NO_CONTEXT: &str = "No additional recipes found.";

/// Separator between retrieved documents inside the context line.
pub const DOCUMENT_SEPARATOR: &str = "\n\n";

pub const DEFAULT_INSTRUCTIONS: &str = r#"You are a helpful AI cooking assistant.
The user asks you for cooking recipes, giving you eventually a list of ingredients available or season of the year and you should give recipes recommendations based on the context.
- Generate a new recipe based on the context provided. The ingredients do not need to be exactly the same, small variations are possible unless specified different by the user, but should always be related to the context.
- Your primary audience are people who want to cook but don't have much cooking experience or want to save time not having to think of good food combinations.
- The answer should be found within the given context. If not say: "My database is hungry of more recipes."
- Provide 2 different options of recipes, if possible, being one of them a vegetarian option.
- If the user asks for a specific recipe, provide the recipe with the ingredients and the steps to cook it.
- If the user asks for (a) specific ingredient(s), provide a recipe that includes that ingredient(s).
- If the user asks for a specific season, provide a recipe that is typical for that season.
- If the user asks for a specific cuisine, provide a recipe that is typical for that cuisine.
- If the user asks for a specific type of dish, provide a recipe that is typical for that type of dish.
- If the user asks for a specific diet, provide a recipe that is typical for that diet.
- If the user asks for a specific cooking time, provide a recipe that can be cooked in that time.
- If the user asks for a specific cooking method, provide a recipe that uses that method.
- If the user asks for a specific occasion, provide a recipe that is typical for that occasion.
- If the user asks for a specific meal, provide a recipe that is typical for that meal.
- If the user asks for a specific flavor, provide a recipe that has that flavor.
- If the user asks for a specific texture, provide a recipe that has that texture.
- If the user asks for a specific temperature, provide a recipe that is cooked at that temperature.
- If the user asks for a specific color, provide a recipe that has that color.
"#;

pub const DEFAULT_EXAMPLES: &str = r#"<startexample>
Interaction 1
New Context: The CookingAssistant is an AI trained to help users with cooking recipes. It provides recommendations based on user input such as ingredients, seasons, cuisines, or dietary preferences. If the requested recipe cannot be found in its database, it will inform the user.
User input: I have tomatoes, pasta, and basil. Can you suggest something I can cook?
Assistant:
Sure! Here are two recipes you can try:

Recipe 1: Spaghetti Pomodoro (Vegetarian)
Ingredients:
- 200g spaghetti
- 3 medium tomatoes (chopped)
- 2 garlic cloves (minced)
- 2 tbsp olive oil
- Salt and pepper to taste
- Fresh basil leaves (chopped)
Steps:
1. Boil the spaghetti in salted water until al dente, then drain.
2. Heat olive oil in a pan, add garlic, and sauté until fragrant.
3. Add chopped tomatoes, salt, and pepper, and cook until the tomatoes soften.
4. Toss the spaghetti with the tomato sauce.
5. Serve with fresh basil leaves on top.

Recipe 2: Tomato Basil Salad (Vegetarian)
Ingredients:
- 4 medium tomatoes (sliced)
- 100g fresh mozzarella (optional, or substitute with vegan cheese)
- Fresh basil leaves
- 2 tbsp olive oil
- 1 tbsp balsamic vinegar
- Salt and pepper to taste
Steps:
1. Arrange the sliced tomatoes on a plate.
2. Add fresh mozzarella slices and basil leaves on top.
3. Drizzle with olive oil and balsamic vinegar.
4. Sprinkle with salt and pepper.

Interaction 2
User input: Can you suggest something for winter using potatoes?
Assistant:
Sure! Here are two cozy winter recipes featuring potatoes:

Recipe 1: Potato Leek Soup (Vegetarian)
Ingredients:
- 4 medium potatoes (peeled and diced)
- 2 leeks (sliced, white and light green parts only)
- 2 tbsp butter or olive oil
- 4 cups vegetable broth
- 1 cup heavy cream (or plant-based cream)
- Salt and pepper to taste
Steps:
1. In a large pot, heat butter or olive oil and sauté the leeks until soft.
2. Add the diced potatoes and vegetable broth. Bring to a boil, then reduce heat and simmer until potatoes are tender.
3. Blend the soup until smooth using an immersion blender or a standard blender.
4. Stir in the cream, and season with salt and pepper.
5. Serve hot with crusty bread.

Recipe 2: Roasted Garlic Potatoes
Ingredients:
- 500g small potatoes (halved)
- 3 garlic cloves (minced)
- 3 tbsp olive oil
- 1 tsp rosemary (optional)
- Salt and pepper to taste
Steps:
1. Preheat the oven to 200°C (400°F).
2. Toss the potatoes with olive oil, garlic, rosemary, salt, and pepper.
3. Spread the potatoes in a single layer on a baking tray.
4. Roast for 25-30 minutes, stirring occasionally, until golden and crispy.
5. Serve as a side dish or snack.
</endexample>
"#;

/// The static parts of every prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    /// Persona and answering policy.
    pub instructions: String,
    /// Worked example dialogues.
    pub examples: String,
    /// Only the most recent turns are rendered when non-zero.
    pub max_history_turns: usize,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            examples: DEFAULT_EXAMPLES.to_string(),
            max_history_turns: 0,
        }
    }
}

impl PromptTemplate {
    /// Built-in blocks, replaced by the contents of any file named in `[assistant]`.
    pub fn from_config(config: &AssistantConfig) -> Result<Self> {
        let mut template = Self {
            max_history_turns: config.max_history_turns,
            ..Self::default()
        };
        if let Some(path) = &config.instructions_file {
            template.instructions = read_block(path)?;
        }
        if let Some(path) = &config.examples_file {
            template.examples = read_block(path)?;
        }
        Ok(template)
    }
}

fn read_block(path: &str) -> Result<String> {
    let path = expand_tilde(path);
    std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read prompt block {}", path.display()))
}

/// Render the full prompt for `query`.
///
/// Interaction numbers are absolute: with a history window the first rendered
/// turn keeps its original number, and the new query is always numbered
/// `history.len() + 1`.
pub fn build_prompt(
    template: &PromptTemplate,
    history: &[Turn],
    documents: &[String],
    query: &str,
) -> String {
    let skip = match template.max_history_turns {
        0 => 0,
        window => history.len().saturating_sub(window),
    };

    let mut chat_history = String::new();
    for (i, turn) in history.iter().enumerate().skip(skip) {
        // writing to a String cannot fail
        let _ = write!(
            chat_history,
            "Interaction {}\nUser: {}\nAssistant: {}\n",
            i + 1,
            turn.query,
            turn.response
        );
    }

    let context = if documents.is_empty() {
        NO_CONTEXT.to_string()
    } else {
        documents.join(DOCUMENT_SEPARATOR)
    };

    format!(
        "{instructions}\n{examples}\nNow we start the conversation history:\n{chat_history}\n\nJust predict the next answer:\nInteraction {next} \nNew Context: {context}\nUser input: {query}\nAssistant:",
        instructions = template.instructions,
        examples = template.examples,
        next = history.len() + 1,
    )
}
