//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application.

pub mod attendance;
pub mod enrollment;
pub mod finance;
pub mod group;
pub mod room;
pub mod student;
pub mod user;

pub use attendance::{AttendanceError, AttendanceRepository, GroupSheet, MarkInput};
pub use enrollment::{
    CreateEnrollmentInput, EnrollmentError, EnrollmentFilter, EnrollmentRepository,
    EnrollmentView, UpdateEnrollmentInput,
};
pub use finance::{
    ApplyDiscountInput, CreateExpenseInput, CreatePaymentInput, Debtor, FinanceError,
    FinanceOverview, FinanceRepository, GlobalBalance, StudentSummary,
};
pub use group::{
    CreateGroupInput, GroupError, GroupFilter, GroupRepository, GroupStats, UpdateGroupInput,
};
pub use room::{CreateRoomInput, RoomError, RoomRepository, UpdateRoomInput};
pub use student::{CreateStudentInput, StudentError, StudentRepository, StudentView};
pub use user::{CreateUserInput, UserRepository};
