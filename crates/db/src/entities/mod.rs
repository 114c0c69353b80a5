//! `SeaORM` entity definitions.

pub mod attendance_records;
pub mod enrollments;
pub mod expenses;
pub mod groups;
pub mod payment_allocations;
pub mod payments;
pub mod rooms;
pub mod sea_orm_active_enums;
pub mod students;
pub mod tuition_charges;
pub mod users;
