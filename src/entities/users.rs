use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,

    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    pub display_name: String,

    pub bio: String,

    /// `user` or `admin`
    pub role: String,

    pub created_at: String,

    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
    #[sea_orm(has_many = "super::user_film_list::Entity")]
    UserFilmList,
    #[sea_orm(has_many = "super::review_reactions::Entity")]
    ReviewReactions,
}

impl Related<super::reviews::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::user_film_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserFilmList.def()
    }
}

impl Related<super::review_reactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewReactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
