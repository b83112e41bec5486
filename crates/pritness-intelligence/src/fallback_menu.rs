// ABOUTME: Static meal menu used when AI suggestions are unavailable
// ABOUTME: Picks up to three meals by time-of-day bucket and remaining protein/calories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pritness

use pritness_core::constants::tracking::SUGGESTIONS_PER_REQUEST;
use pritness_core::models::{MealSuggestion, MealTimeBucket, SuggestionCategory};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StaticMeal {
    Eggs,
    Oatmeal,
    Chicken,
    Quinoa,
    Shake,
    Yogurt,
    Fish,
    Salad,
}

struct MealCard {
    label: &'static str,
    description: &'static str,
    calories: u32,
    protein_g: u32,
    carbs_g: u32,
    fat_g: u32,
    category: SuggestionCategory,
    ingredients: &'static [&'static str],
    recipe: &'static [&'static str],
}

impl StaticMeal {
    const fn card(self) -> MealCard {
        match self {
            Self::Eggs => MealCard {
                label: "Scrambled eggs with avocado",
                description: "High-protein breakfast with healthy fats",
                calories: 380,
                protein_g: 25,
                carbs_g: 22,
                fat_g: 20,
                category: SuggestionCategory::Eggs,
                ingredients: &[
                    "3 large eggs",
                    "1/2 avocado, sliced",
                    "2 slices wholegrain bread",
                    "1 tsp olive oil",
                    "Salt, pepper and chives",
                ],
                recipe: &[
                    "Beat the eggs with salt and pepper.",
                    "Heat the oil in a pan over medium heat.",
                    "Pour in the eggs and stir gently until set.",
                    "Toast the bread and top with the eggs.",
                    "Add the avocado and chives.",
                ],
            },
            Self::Oatmeal => MealCard {
                label: "Oat and banana smoothie",
                description: "Quick, filling energy to start the day",
                calories: 320,
                protein_g: 12,
                carbs_g: 55,
                fat_g: 6,
                category: SuggestionCategory::Smoothie,
                ingredients: &[
                    "1/2 cup rolled oats",
                    "1 ripe banana",
                    "1 cup milk or plant milk",
                    "1 tsp honey",
                    "Pinch of cinnamon",
                ],
                recipe: &[
                    "Add everything to a blender.",
                    "Blend for 60 seconds until smooth.",
                    "Thin with more milk if needed.",
                ],
            },
            Self::Chicken => MealCard {
                label: "Chicken breast with brown rice",
                description: "Complete lunch rich in lean protein",
                calories: 450,
                protein_g: 35,
                carbs_g: 42,
                fat_g: 9,
                category: SuggestionCategory::Chicken,
                ingredients: &[
                    "180 g chicken breast",
                    "3/4 cup cooked brown rice",
                    "1 cup mixed salad",
                    "1 tsp olive oil",
                    "Lemon, garlic and spices",
                ],
                recipe: &[
                    "Season the chicken with garlic, lemon, salt and pepper.",
                    "Cook in a non-stick pan 6-7 minutes per side.",
                    "Rest 2 minutes and slice.",
                    "Serve over the rice with the salad.",
                ],
            },
            Self::Quinoa => MealCard {
                label: "Quinoa and chickpea bowl",
                description: "Complete plant protein with fibre",
                calories: 420,
                protein_g: 18,
                carbs_g: 58,
                fat_g: 12,
                category: SuggestionCategory::Quinoa,
                ingredients: &[
                    "1/2 cup cooked quinoa",
                    "1/2 can chickpeas, drained",
                    "1 cup spinach and cherry tomatoes",
                    "1/4 cucumber, diced",
                    "1 tbsp olive oil and lemon",
                ],
                recipe: &[
                    "Cook the quinoa as directed.",
                    "Combine chickpeas, spinach, tomatoes and cucumber.",
                    "Add the quinoa and mix.",
                    "Dress with olive oil, lemon, salt and pepper.",
                ],
            },
            Self::Shake => MealCard {
                label: "Banana protein shake",
                description: "Fast post-workout recovery",
                calories: 280,
                protein_g: 28,
                carbs_g: 30,
                fat_g: 5,
                category: SuggestionCategory::Smoothie,
                ingredients: &[
                    "1 scoop (30 g) whey protein",
                    "1 medium banana",
                    "1 cup skimmed milk",
                    "4-5 ice cubes",
                ],
                recipe: &[
                    "Add everything to a blender.",
                    "Blend on high for 45 seconds.",
                    "Drink straight away.",
                ],
            },
            Self::Yogurt => MealCard {
                label: "Greek yogurt with walnuts and honey",
                description: "Snack rich in calcium and healthy fats",
                calories: 250,
                protein_g: 15,
                carbs_g: 24,
                fat_g: 10,
                category: SuggestionCategory::Yogurt,
                ingredients: &[
                    "200 g plain Greek yogurt",
                    "1 tbsp honey",
                    "20 g chopped walnuts",
                ],
                recipe: &[
                    "Spoon the yogurt into a bowl.",
                    "Top with the walnuts.",
                    "Drizzle with honey.",
                ],
            },
            Self::Fish => MealCard {
                label: "Baked fish with vegetables",
                description: "Light dinner rich in omega-3",
                calories: 350,
                protein_g: 30,
                carbs_g: 18,
                fat_g: 14,
                category: SuggestionCategory::Fish,
                ingredients: &[
                    "200 g salmon or tilapia fillet",
                    "1 courgette, sliced",
                    "1 red pepper, in strips",
                    "1/2 lemon, sliced",
                    "1 tbsp olive oil and herbs",
                ],
                recipe: &[
                    "Preheat the oven to 200 C.",
                    "Lay the fish and vegetables on a tray.",
                    "Dress with oil, lemon, salt, pepper and herbs.",
                    "Bake 18-22 minutes until the fish is opaque.",
                ],
            },
            Self::Salad => MealCard {
                label: "Grilled chicken salad",
                description: "Fresh, low-calorie, high-protein dinner",
                calories: 280,
                protein_g: 22,
                carbs_g: 12,
                fat_g: 11,
                category: SuggestionCategory::Salad,
                ingredients: &[
                    "150 g grilled chicken breast, in strips",
                    "2 cups mixed lettuce",
                    "1/2 tomato",
                    "1/4 cucumber",
                    "1 tbsp light vinaigrette",
                ],
                recipe: &[
                    "Cook the seasoned chicken over medium-high heat.",
                    "Wash and dry the lettuce.",
                    "Toss the vegetables in a large bowl.",
                    "Add the chicken and dress.",
                ],
            },
        }
    }

    fn suggestion(self) -> MealSuggestion {
        let card = self.card();
        MealSuggestion {
            label: card.label.to_owned(),
            description: card.description.to_owned(),
            calories: card.calories,
            protein_g: card.protein_g,
            carbs_g: card.carbs_g,
            fat_g: card.fat_g,
            image_category: card.category,
            ingredients: card.ingredients.iter().map(|s| (*s).to_owned()).collect(),
            recipe: card.recipe.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

/// Up to three static suggestions for the remaining budget at local `hour`
///
/// Each bucket has a protein-led first pick, a budget-gated second pick and an
/// unconditional filler, so the result is never empty.
#[must_use]
pub fn fallback_suggestions(
    remaining_calories: u32,
    remaining_protein_g: u32,
    hour: u32,
) -> Vec<MealSuggestion> {
    let (first, second, filler) = match MealTimeBucket::from_hour(hour) {
        MealTimeBucket::Morning => (
            (StaticMeal::Eggs, remaining_protein_g >= 25),
            (StaticMeal::Oatmeal, remaining_calories >= 300),
            StaticMeal::Yogurt,
        ),
        MealTimeBucket::Midday => (
            (StaticMeal::Chicken, remaining_protein_g >= 30),
            (StaticMeal::Quinoa, remaining_calories >= 400),
            StaticMeal::Salad,
        ),
        MealTimeBucket::Afternoon => (
            (StaticMeal::Shake, remaining_protein_g >= 20),
            (StaticMeal::Yogurt, remaining_protein_g >= 15),
            StaticMeal::Eggs,
        ),
        MealTimeBucket::Evening => (
            (StaticMeal::Fish, remaining_protein_g >= 25),
            (StaticMeal::Salad, remaining_calories >= 200),
            StaticMeal::Quinoa,
        ),
    };

    [first, second, (filler, true)]
        .into_iter()
        .filter(|(_, eligible)| *eligible)
        .map(|(meal, _)| meal.suggestion())
        .take(SUGGESTIONS_PER_REQUEST)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_morning_with_budget_offers_three() {
        let meals = fallback_suggestions(900, 60, 8);
        let labels: Vec<_> = meals.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(
            labels,
            vec![
                "Scrambled eggs with avocado",
                "Oat and banana smoothie",
                "Greek yogurt with walnuts and honey"
            ]
        );
    }

    #[test]
    fn test_evening_without_budget_keeps_filler() {
        let meals = fallback_suggestions(0, 0, 22);
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0].image_category, SuggestionCategory::Quinoa);
    }
}
