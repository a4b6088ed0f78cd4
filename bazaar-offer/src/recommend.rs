use bazaar_catalog::{Category, Product};
use bazaar_store::app_config::RecommendationConfig;
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// "You may like" scoring: category affinity from the viewer's history,
/// a popularity prior from listing order, and a little random jitter.
#[derive(Debug, Clone)]
pub struct Recommender {
    config: RecommendationConfig,
}

impl Recommender {
    pub fn new(config: RecommendationConfig) -> Self {
        Self { config }
    }

    pub fn default_limit(&self) -> usize {
        self.config.default_limit
    }

    /// Earlier listings score higher.
    pub fn popularity(&self, product: &Product) -> f64 {
        if self.config.popularity_divisor == 0.0 {
            return 0.0;
        }
        (self.config.popularity_base - product.listing_seq as f64) / self.config.popularity_divisor
    }

    fn jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.config.jitter_max > 0.0 {
            rng.gen::<f64>() * self.config.jitter_max
        } else {
            0.0
        }
    }

    pub fn score<R: Rng + ?Sized>(
        &self,
        product: &Product,
        viewed_categories: &HashSet<Category>,
        rng: &mut R,
    ) -> f64 {
        let affinity = if viewed_categories.contains(&product.category) {
            self.config.category_affinity_weight
        } else {
            0.0
        };
        affinity + self.popularity(product) + self.jitter(rng)
    }

    /// Rank unsold products other than `exclude_id` and keep the best `limit`.
    ///
    /// History ids are resolved against the whole catalog, sold items
    /// included, to find the categories the viewer has shown interest in.
    pub fn recommend<R: Rng + ?Sized>(
        &self,
        catalog: &[Product],
        exclude_id: Option<&str>,
        view_history: &[String],
        limit: usize,
        rng: &mut R,
    ) -> Vec<Product> {
        let viewed_categories: HashSet<Category> = view_history
            .iter()
            .filter_map(|id| catalog.iter().find(|p| &p.id == id))
            .map(|p| p.category)
            .collect();

        let mut scored: Vec<(f64, &Product)> = catalog
            .iter()
            .filter(|p| p.is_available() && Some(p.id.as_str()) != exclude_id)
            .map(|p| (self.score(p, &viewed_categories, rng), p))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        debug!(
            "Scored {} candidates against {} viewed categories",
            scored.len(),
            viewed_categories.len()
        );

        scored
            .into_iter()
            .take(limit)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn product(id: &str, seq: u64, category: Category) -> Product {
        Product {
            id: id.to_string(),
            name: format!("item {}", id),
            description: String::new(),
            price: 100_000,
            category,
            condition: "Good".to_string(),
            image_url: String::new(),
            seller_id: "seller".to_string(),
            seller_name: "Seller".to_string(),
            sold_out: false,
            created_at: Utc::now(),
            listing_seq: seq,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("1", 1, Category::Electronics),
            product("2", 2, Category::Electronics),
            product("3", 3, Category::Fashion),
            product("4", 4, Category::Books),
            product("5", 5, Category::Electronics),
            product("6", 6, Category::Sports),
        ]
    }

    fn steady() -> Recommender {
        Recommender::new(RecommendationConfig {
            jitter_max: 0.0,
            ..RecommendationConfig::default()
        })
    }

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_never_returns_excluded_or_sold_out() {
        let recommender = Recommender::new(RecommendationConfig::default());
        let mut products = catalog();
        products[1].sold_out = true;
        products[4].sold_out = true;
        let history = vec!["2".to_string(), "4".to_string()];

        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let exclude = products[seed as usize % products.len()].id.clone();
            let picks = recommender.recommend(&products, Some(exclude.as_str()), &history, 10, &mut rng);

            assert!(picks.iter().all(|p| !p.sold_out));
            assert!(picks.iter().all(|p| p.id != exclude));
        }
    }

    #[test]
    fn test_empty_history_fills_limit() {
        let recommender = Recommender::new(RecommendationConfig::default());
        let mut rng = StdRng::seed_from_u64(7);

        let picks = recommender.recommend(&catalog(), Some("1"), &[], 4, &mut rng);
        assert_eq!(picks.len(), 4);

        let mut few = catalog();
        few.iter_mut().skip(2).for_each(|p| p.sold_out = true);
        let picks = recommender.recommend(&few, None, &[], 4, &mut rng);
        let mut found = ids(&picks);
        found.sort();
        assert_eq!(found, vec!["1", "2"]);
    }

    #[test]
    fn test_without_jitter_order_follows_listing_sequence() {
        let picks = steady().recommend(&catalog(), None, &[], 4, &mut StdRng::seed_from_u64(1));
        assert_eq!(ids(&picks), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_viewed_category_outranks_popularity() {
        let mut products = catalog();
        products.push(product("jacket", 20, Category::Fashion));
        // Viewed item is sold, but still counts for affinity.
        products[2].sold_out = true;
        let history = vec!["3".to_string()];

        let picks = steady().recommend(&products, None, &history, 3, &mut StdRng::seed_from_u64(1));
        assert_eq!(ids(&picks), vec!["jacket", "1", "2"]);
    }

    #[test]
    fn test_same_seed_same_ranking() {
        let recommender = Recommender::new(RecommendationConfig::default());
        let history = vec!["6".to_string()];

        let first = recommender.recommend(&catalog(), None, &history, 4, &mut StdRng::seed_from_u64(99));
        let second = recommender.recommend(&catalog(), None, &history, 4, &mut StdRng::seed_from_u64(99));
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_score_components() {
        let recommender = steady();
        let item = product("12", 12, Category::Books);
        let viewed: HashSet<Category> = [Category::Books].into_iter().collect();

        assert!((recommender.popularity(&item) - 8.8).abs() < 1e-9);
        let score = recommender.score(&item, &viewed, &mut StdRng::seed_from_u64(0));
        assert!((score - 11.8).abs() < 1e-9);
    }

    #[test]
    fn test_jitter_stays_in_range() {
        let recommender = Recommender::new(RecommendationConfig::default());
        let item = product("100", 100, Category::Other);
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let score = recommender.score(&item, &HashSet::new(), &mut rng);
            assert!((0.0..2.0).contains(&score));
        }
    }
}
