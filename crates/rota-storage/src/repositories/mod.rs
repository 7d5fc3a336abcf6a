mod appointment;
mod shared_link;
mod staff;
mod user;

pub use appointment::AppointmentRepository;
pub use shared_link::SharedLinkRepository;
pub use staff::StaffRepository;
pub use user::UserRepository;
