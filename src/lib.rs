// Pink Morsel sales dashboard
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
