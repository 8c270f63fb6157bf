use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub user_id: i32,

    pub film_id: i32,

    /// 1-10
    pub rating: i32,

    pub comment: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::films::Entity",
        from = "Column::FilmId",
        to = "super::films::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Films,
    #[sea_orm(has_many = "super::review_reactions::Entity")]
    ReviewReactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::films::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Films.def()
    }
}

impl Related<super::review_reactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewReactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
