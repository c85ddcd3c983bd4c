// Application layer - Use cases orchestrating domain logic over the store
pub mod chart_service;
pub mod dashboard_service;
pub mod live_feed;
pub mod reading_repository;
