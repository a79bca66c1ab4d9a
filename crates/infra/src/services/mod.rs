//! Application services: load a record, run domain logic, persist, publish.

pub mod assignments;
pub mod invites;
pub mod notifications;
pub mod review;
pub mod verification;

pub use assignments::AssignmentService;
pub use invites::InviteService;
pub use notifications::NotificationService;
pub use review::ReviewService;
pub use verification::VerificationService;
