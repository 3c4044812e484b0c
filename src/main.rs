use log::error;
use snap_recipes::{PathPicker, PipelineError, Recipe, RecipeSession};
use std::env;
use std::process::ExitCode;

const USAGE: &str = "Usage:
  snap-recipes <image-path>
  snap-recipes --ingredients <tomato,basil,...>";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();

    // Get the image path or ingredient list from command-line arguments
    let args: Vec<String> = env::args().skip(1).collect();
    let result = match args.as_slice() {
        [flag, list] if flag == "--ingredients" => {
            let ingredients: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(str::to_string)
                .collect();
            run_with_ingredients(&ingredients).await
        }
        [path] if !path.starts_with("--") => run_with_image(path).await,
        _ => {
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_with_image(path: &str) -> Result<(), PipelineError> {
    let session = RecipeSession::builder().build()?;

    session.pick_and_classify(&PathPicker::new(path)).await?;
    let ingredients = session.ingredients();
    if ingredients.is_empty() {
        println!("No ingredients recognized.");
        return Ok(());
    }

    println!("Recognized Ingredients:");
    for ingredient in ingredients.iter() {
        println!("  - {}", ingredient);
    }

    session.fetch_recipes().await?;
    print_recipes(&session.recipes());
    Ok(())
}

async fn run_with_ingredients(ingredients: &[String]) -> Result<(), PipelineError> {
    let recipes = snap_recipes::find_recipes(ingredients).await?;
    print_recipes(&recipes);
    Ok(())
}

fn print_recipes(recipes: &[Recipe]) {
    if recipes.is_empty() {
        println!("No recipes found.");
        return;
    }

    println!("Suggested Recipes:");
    for recipe in recipes.iter() {
        println!("  - {}", recipe.title);
    }
}
