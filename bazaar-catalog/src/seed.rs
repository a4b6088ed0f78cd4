use chrono::Utc;

use crate::product::{Category, Product};

/// Demo listings used when the catalog is empty.
pub(crate) fn demo_products() -> Vec<Product> {
    let now = Utc::now();
    let rows: [(&str, u64, Category, &str, &str, &str, &str, &str); 6] = [
        ("MacBook Air M1", 8_500_000, Category::Electronics, "Like new, barely used. 8GB RAM, 256GB SSD", "Excellent", "/macbook-air-laptop.jpg", "seller1", "Ahmad Budi"),
        ("Sony WH-1000XM4", 3_200_000, Category::Electronics, "Premium noise cancelling headphones", "Good", "/wireless-headphones.png", "seller1", "Ahmad Budi"),
        ("Uniqlo Jacket", 250_000, Category::Fashion, "Navy blue jacket, size M", "Very Good", "/navy-jacket.jpg", "seller2", "Siti Rahayu"),
        ("Introduction to Algorithms", 450_000, Category::Books, "Classic CS textbook, 3rd edition", "Good", "/algorithms-textbook.jpg", "seller2", "Siti Rahayu"),
        ("Canon EOS M50", 6_500_000, Category::Electronics, "Mirrorless camera with kit lens", "Excellent", "/canon-camera.jpg", "seller1", "Ahmad Budi"),
        ("Nike Air Max", 850_000, Category::Sports, "Size 42, white colorway", "Good", "/nike-air-max-white.jpg", "seller2", "Siti Rahayu"),
    ];

    rows.into_iter()
        .enumerate()
        .map(|(i, (name, price, category, description, condition, image_url, seller_id, seller_name))| {
            let seq = i as u64 + 1;
            Product {
                id: seq.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                price,
                category,
                condition: condition.to_string(),
                image_url: image_url.to_string(),
                seller_id: seller_id.to_string(),
                seller_name: seller_name.to_string(),
                sold_out: false,
                created_at: now,
                listing_seq: seq,
            }
        })
        .collect()
}
