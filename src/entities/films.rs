use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "films")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,

    pub synopsis: String,

    /// `not_yet_aired`, `airing` or `finished_airing`
    pub status: String,

    pub total_episodes: i32,

    /// ISO 8601 date
    pub release_date: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::film_genres::Entity")]
    FilmGenres,
    #[sea_orm(has_many = "super::reviews::Entity")]
    Reviews,
    #[sea_orm(has_many = "super::user_film_list::Entity")]
    UserFilmList,
}

impl Related<super::film_genres::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FilmGenres.def()
    }
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

impl Related<super::genres::Entity> for Entity {
    fn to() -> RelationDef {
        super::film_genres::Relation::Genres.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::film_genres::Relation::Films.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
