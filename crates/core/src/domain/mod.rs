pub mod product;
pub mod rating;
pub mod review;
