//! Search box and filter-chip projections over fetched collections.
//!
//! Projections borrow from the collection and never reorder it.

use tastybites_shared::models::Entity;
use tastybites_shared::{Pricing, Recipe};

/// Case-insensitive substring test on the display name. A blank query
/// matches everything.
pub fn matches<T: Entity>(item: &T, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    item.display_name()
        .to_lowercase()
        .contains(&query.to_lowercase())
}

/// Items whose display name contains `query`, in collection order.
pub fn project<'a, T: Entity>(items: &'a [T], query: &str) -> Vec<&'a T> {
    project_where(items, query, |_| true)
}

/// [`project`] restricted to items that also pass `keep`.
pub fn project_where<'a, T: Entity>(
    items: &'a [T],
    query: &str,
    keep: impl Fn(&T) -> bool,
) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    let blank = query.trim().is_empty();
    items
        .iter()
        .filter(|item| keep(item))
        .filter(|item| blank || item.display_name().to_lowercase().contains(&needle))
        .collect()
}

/// Tabs on the recipes page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shelf {
    Saved,
    Hidden,
    Purchased,
}

impl Shelf {
    pub fn contains(&self, recipe: &Recipe) -> bool {
        match self {
            Shelf::Saved => recipe.is_saved,
            Shelf::Hidden => recipe.is_hidden,
            Shelf::Purchased => recipe.is_purchased,
        }
    }
}

/// Chips on a chef's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PricingFilter {
    #[default]
    All,
    Free,
    Premium,
}

impl PricingFilter {
    pub fn contains(&self, recipe: &Recipe) -> bool {
        match self {
            PricingFilter::All => true,
            PricingFilter::Free => recipe.is_free == Pricing::Free,
            PricingFilter::Premium => recipe.is_free == Pricing::Premium,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::recipe;

    fn names<'a>(items: &[&'a Recipe]) -> Vec<&'a str> {
        items.iter().map(|r| r.recipe_name.as_str()).collect()
    }

    fn menu() -> Vec<Recipe> {
        vec![
            recipe(1, "Chicken Adobo"),
            recipe(2, "Sinigang na Baboy"),
            recipe(3, "Adobong Kangkong"),
            recipe(4, "Leche Flan"),
        ]
    }

    #[test]
    fn blank_query_is_identity() {
        let items = menu();
        for query in ["", "   ", "\t"] {
            let all = project(&items, query);
            assert_eq!(all.len(), items.len());
            assert!(all.iter().zip(&items).all(|(a, b)| std::ptr::eq(*a, b)));
        }
    }

    #[test]
    fn case_insensitive_and_order_preserving() {
        let items = menu();
        assert_eq!(
            names(&project(&items, "ADOBO")),
            vec!["Chicken Adobo", "Adobong Kangkong"]
        );
        assert_eq!(names(&project(&items, "flan")), vec!["Leche Flan"]);
        assert!(project(&items, "pizza").is_empty());
    }

    #[test]
    fn every_result_matches() {
        let items = menu();
        for query in ["a", "ng", "o B"] {
            assert!(project(&items, query).iter().all(|r| matches(*r, query)));
        }
    }

    #[test]
    fn shelves_and_pricing_compose_with_query() {
        let mut items = menu();
        items[0].is_saved = true;
        items[2].is_saved = true;
        items[2].is_free = Pricing::Free;
        items[3].is_purchased = true;

        let saved = project_where(&items, "", |r| Shelf::Saved.contains(r));
        assert_eq!(names(&saved), vec!["Chicken Adobo", "Adobong Kangkong"]);

        let saved_kangkong = project_where(&items, "kang", |r| Shelf::Saved.contains(r));
        assert_eq!(names(&saved_kangkong), vec!["Adobong Kangkong"]);

        let free = project_where(&items, "", |r| PricingFilter::Free.contains(r));
        assert_eq!(names(&free), vec!["Adobong Kangkong"]);
        let premium = project_where(&items, "", |r| PricingFilter::Premium.contains(r));
        assert_eq!(names(&premium), vec!["Chicken Adobo", "Sinigang na Baboy", "Leche Flan"]);
        assert_eq!(
            project_where(&items, "", |r| PricingFilter::All.contains(r)).len(),
            4
        );
        assert_eq!(
            names(&project_where(&items, "", |r| Shelf::Purchased.contains(r))),
            vec!["Leche Flan"]
        );
    }
}
