//! Built-in demo catalog used when no seed files are configured.

use crate::catalog::{LoadSummary, ProductManager};

pub const DEMO_PRODUCTS: &[&str] = &[
    "D,101,Tea,1.99,0",
    "D,102,Coffee,1.99,0",
    "F,103,Cake,3.99,0,2026-12-31",
    "F,104,Cookie,2.50,0,2026-12-31",
    "D,105,Hot Chocolate,2.50,0",
    "F,106,Chocolate,2.50,0,2026-12-31",
];

pub const DEMO_REVIEWS: &[&str] = &[
    "101,4,Nice hot cup of tea",
    "101,2,Rather weak tea",
    "101,4,Fine tea",
    "101,4,Good tea",
    "101,5,Perfect tea",
    "101,3,Just add some lemon",
    "102,3,Coffee was ok",
    "102,1,Where is the milk?",
    "102,5,It's perfect with ten spoons of sugar!",
    "103,5,Very nice cake",
    "103,4,It is good, but I expected more chocolate",
    "103,5,This cake is perfect!",
    "104,3,Just another cookie",
    "104,2,Ok",
    "105,4,Tasty!",
    "105,4,Not bad at all",
    "106,2,Too sweet",
    "106,3,Better than cookie",
    "106,2,Too bitter",
    "106,1,I don't get it!",
];

pub fn seed_demo(manager: &ProductManager) -> LoadSummary {
    manager.load_records(DEMO_PRODUCTS.iter().copied(), DEMO_REVIEWS.iter().copied())
}
