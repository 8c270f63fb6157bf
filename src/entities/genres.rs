use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "genres")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::film_genres::Entity")]
    FilmGenres,
}

impl Related<super::film_genres::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FilmGenres.def()
    }
}

impl Related<super::films::Entity> for Entity {
    fn to() -> RelationDef {
        super::film_genres::Relation::Films.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::film_genres::Relation::Genres.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
