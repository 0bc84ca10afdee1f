pub mod community;
pub mod member;
