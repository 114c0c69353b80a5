//! `SeaORM` Entity for payment_allocations table.
//!
//! Join entity recording how much of a payment was applied to a charge.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payment_id: Uuid,
    pub charge_id: Uuid,
    pub amount: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payments::Entity",
        from = "Column::PaymentId",
        to = "super::payments::Column::Id"
    )]
    Payments,
    #[sea_orm(
        belongs_to = "super::tuition_charges::Entity",
        from = "Column::ChargeId",
        to = "super::tuition_charges::Column::Id"
    )]
    TuitionCharges,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl Related<super::tuition_charges::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TuitionCharges.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
