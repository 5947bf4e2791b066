mod generated_recipe;
mod recipe_request;

pub use generated_recipe::GeneratedRecipe;
pub use recipe_request::{split_list, RecipeRequest, RequestSummary};
