//! Application services

mod todo_service;

pub use todo_service::TodoService;
