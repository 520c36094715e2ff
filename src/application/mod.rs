// Application layer - Use cases over the read-only data store
pub mod chart_builder;
pub mod dashboard_service;
pub mod data_store;
pub mod reactive_controller;
pub mod sales_repository;
pub mod session_registry;
