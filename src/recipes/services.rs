use std::collections::BTreeMap;

use crate::recipes::dto::{RecipeMatch, ShoppingItem};
use crate::recipes::repo::Recipe;

/// Lowercase, fold Spanish accents, collapse whitespace. "  Azúcar flor "
/// and "azucar flor" end up as the same entry.
pub fn normalize_ingredient(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' | 'ü' => 'u',
            _ => c,
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rank catalog recipes by how much of their ingredient list the pantry
/// covers. A pantry entry covers an ingredient when it appears inside the
/// normalized ingredient line ("harina" covers "2 tazas de harina").
pub fn match_by_pantry(catalog: &[Recipe], pantry: &[String]) -> Vec<RecipeMatch> {
    let pantry: Vec<String> = pantry
        .iter()
        .map(|p| normalize_ingredient(p))
        .filter(|p| !p.is_empty())
        .collect();

    let mut matches: Vec<RecipeMatch> = catalog
        .iter()
        .map(|recipe| {
            let mut matched = Vec::new();
            let mut missing = Vec::new();
            for ingredient in &recipe.ingredients {
                let normalized = normalize_ingredient(ingredient);
                if pantry.iter().any(|have| normalized.contains(have)) {
                    matched.push(ingredient.clone());
                } else {
                    missing.push(ingredient.clone());
                }
            }
            RecipeMatch {
                recipe: recipe.clone(),
                matched,
                missing,
            }
        })
        .collect();

    matches.sort_by(|a, b| {
        b.matched
            .len()
            .cmp(&a.matched.len())
            .then_with(|| a.missing.len().cmp(&b.missing.len()))
            .then_with(|| a.recipe.name.cmp(&b.recipe.name))
    });
    matches
}

/// Merge the ingredient lists of the selected recipes into one de-duplicated
/// shopping list, counting how many recipes ask for each entry.
pub fn build_shopping_list(recipes: &[Recipe]) -> Vec<ShoppingItem> {
    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for recipe in recipes {
        for ingredient in &recipe.ingredients {
            let normalized = normalize_ingredient(ingredient);
            if normalized.is_empty() {
                continue;
            }
            *counts.entry(normalized).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(ingredient, uses)| ShoppingItem { ingredient, uses })
        .collect()
}

#[cfg(test)]
mod finder_tests {
    use super::*;
    use crate::recipes::repo::MealCategory;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn recipe(name: &str, ingredients: &[&str]) -> Recipe {
        Recipe {
            id: Uuid::new_v4(),
            name: name.into(),
            category: MealCategory::Almuerzo,
            image: None,
            ingredients: ingredients.iter().map(|i| i.to_string()).collect(),
            steps: None,
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn normalize_folds_case_accents_and_whitespace() {
        assert_eq!(normalize_ingredient("  Azúcar  Flor "), "azucar flor");
        assert_eq!(normalize_ingredient("Huevos"), "huevos");
        assert_eq!(normalize_ingredient("ají de color"), "aji de color");
    }

    #[test]
    fn pantry_match_ranks_best_covered_first() {
        let catalog = vec![
            recipe("Cazuela", &["1 kg de carne", "2 papas", "zapallo"]),
            recipe("Tortilla", &["3 huevos", "2 papas"]),
            recipe("Pan con palta", &["pan", "palta"]),
        ];
        let pantry = vec!["papas".to_string(), "huevos".to_string()];

        let ranked = match_by_pantry(&catalog, &pantry);
        assert_eq!(ranked[0].recipe.name, "Tortilla");
        assert_eq!(ranked[0].matched.len(), 2);
        assert!(ranked[0].missing.is_empty());
        assert_eq!(ranked[1].recipe.name, "Cazuela");
        assert_eq!(ranked[1].matched, vec!["2 papas".to_string()]);
        assert_eq!(ranked[2].recipe.name, "Pan con palta");
        assert!(ranked[2].matched.is_empty());
    }

    #[test]
    fn pantry_match_ignores_blank_pantry_entries() {
        let catalog = vec![recipe("Tortilla", &["3 huevos"])];
        let ranked = match_by_pantry(&catalog, &["   ".to_string()]);
        assert!(ranked[0].matched.is_empty());
    }

    #[test]
    fn shopping_list_merges_duplicates_across_recipes() {
        let recipes = vec![
            recipe("Tortilla", &["Huevos", "2 papas"]),
            recipe("Cazuela", &["huevos ", "zapallo"]),
        ];
        let list = build_shopping_list(&recipes);
        assert_eq!(
            list,
            vec![
                ShoppingItem { ingredient: "2 papas".into(), uses: 1 },
                ShoppingItem { ingredient: "huevos".into(), uses: 2 },
                ShoppingItem { ingredient: "zapallo".into(), uses: 1 },
            ]
        );
    }
}
