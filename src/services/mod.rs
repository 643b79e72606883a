// Business logic services

pub mod assignment_service;
pub mod athlete_service;
pub mod document_service;
pub mod email_service;
pub mod scheduler_service;
pub mod session_service;
pub mod statistics_service;
pub mod trainer_service;
pub mod training_service;

pub use assignment_service::AssignmentService;
pub use athlete_service::AthleteService;
pub use document_service::DocumentService;
pub use email_service::{EmailService, SmtpConfig};
pub use scheduler_service::SchedulerService;
pub use session_service::SessionService;
pub use statistics_service::StatisticsService;
pub use trainer_service::TrainerService;
pub use training_service::TrainingService;
