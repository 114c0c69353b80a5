//! Database seeder for Tutoria development and testing.
//!
//! Seeds an admin, a manager, a room, two groups (one ODD, one EVEN),
//! and a couple of enrolled students for local development.
//!
//! Usage: cargo run --bin seeder

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::DatabaseConnection;

use tutoria_core::auth::hash_password;
use tutoria_db::entities::sea_orm_active_enums::{DaysPattern, UserRole};
use tutoria_db::repositories::{
    CreateEnrollmentInput, CreateGroupInput, CreateRoomInput, CreateStudentInput,
    CreateUserInput, EnrollmentRepository, GroupRepository, RoomRepository, StudentRepository,
    UserRepository,
};

const ADMIN_PHONE: &str = "+998901112233";
const DEV_PASSWORD: &str = "tutoria-dev";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = tutoria_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let users = UserRepository::new(db.clone());
    if users
        .phone_exists(ADMIN_PHONE)
        .await
        .expect("Failed to query users")
    {
        println!("Admin already exists, database looks seeded. Nothing to do.");
        return;
    }

    println!("Seeding staff...");
    seed_staff(&users).await;

    println!("Seeding rooms and groups...");
    let (odd_group, even_group) = seed_groups(&db).await;

    println!("Seeding students and enrollments...");
    seed_students(&db, odd_group, even_group).await;

    println!("Seeding complete!");
}

async fn seed_staff(users: &UserRepository) {
    let password_hash = hash_password(DEV_PASSWORD).expect("Failed to hash password");

    users
        .create(CreateUserInput {
            phone: ADMIN_PHONE.to_string(),
            password_hash: password_hash.clone(),
            first_name: "Dilshod".to_string(),
            last_name: "Rahimov".to_string(),
            role: UserRole::Admin,
        })
        .await
        .expect("Failed to seed admin");

    users
        .create(CreateUserInput {
            phone: "+998901112234".to_string(),
            password_hash,
            first_name: "Malika".to_string(),
            last_name: "Yusupova".to_string(),
            role: UserRole::Manager,
        })
        .await
        .expect("Failed to seed manager");
}

async fn seed_groups(db: &DatabaseConnection) -> (uuid::Uuid, uuid::Uuid) {
    let room = RoomRepository::new(db.clone())
        .create(CreateRoomInput {
            name: "Room A".to_string(),
            capacity: 16,
        })
        .await
        .expect("Failed to seed room");

    let groups = GroupRepository::new(db.clone());

    let odd = groups
        .create(CreateGroupInput {
            name: "English B1 (morning)".to_string(),
            capacity: 12,
            days_pattern: DaysPattern::Odd,
            start_minutes: 540,
            end_minutes: 630,
            monthly_fee: Decimal::from(300_000),
            room_id: Some(room.id),
        })
        .await
        .expect("Failed to seed ODD group");

    let even = groups
        .create(CreateGroupInput {
            name: "Math olympiad".to_string(),
            capacity: 10,
            days_pattern: DaysPattern::Even,
            start_minutes: 840,
            end_minutes: 960,
            monthly_fee: Decimal::from(400_000),
            room_id: Some(room.id),
        })
        .await
        .expect("Failed to seed EVEN group");

    (odd.id, even.id)
}

async fn seed_students(db: &DatabaseConnection, odd_group: uuid::Uuid, even_group: uuid::Uuid) {
    let students = StudentRepository::new(db.clone());
    let enrollments = EnrollmentRepository::new(db.clone());
    let password_hash = hash_password(DEV_PASSWORD).expect("Failed to hash password");

    let aziz = students
        .create(CreateStudentInput {
            phone: "+998901112240".to_string(),
            password_hash: password_hash.clone(),
            first_name: "Aziz".to_string(),
            last_name: "Karimov".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2010, 3, 14),
            note: None,
        })
        .await
        .expect("Failed to seed student");

    let laylo = students
        .create(CreateStudentInput {
            phone: "+998901112241".to_string(),
            password_hash,
            first_name: "Laylo".to_string(),
            last_name: "Tosheva".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(2011, 7, 2),
            note: Some("Sibling of an alum".to_string()),
        })
        .await
        .expect("Failed to seed student");

    enrollments
        .create(CreateEnrollmentInput {
            student_id: aziz.student.id,
            group_id: odd_group,
            join_date: None,
        })
        .await
        .expect("Failed to seed enrollment");

    enrollments
        .create(CreateEnrollmentInput {
            student_id: laylo.student.id,
            group_id: even_group,
            join_date: None,
        })
        .await
        .expect("Failed to seed enrollment");
}
