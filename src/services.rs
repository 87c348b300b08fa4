pub mod auth;
pub mod slot_rules;
pub mod timetable_service;

pub use auth::AuthService;
pub use timetable_service::TimetableService;
