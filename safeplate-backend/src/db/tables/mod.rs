//! Table modules - extend Database with domain-specific methods
//!
//! Each module adds `impl Database` blocks with methods for one table.

mod generated_recipes; // generated_recipes
mod recipe_requests;   // recipe_requests
