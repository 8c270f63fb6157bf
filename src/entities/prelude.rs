pub use super::film_genres::Entity as FilmGenres;
pub use super::films::Entity as Films;
pub use super::genres::Entity as Genres;
pub use super::review_reactions::Entity as ReviewReactions;
pub use super::reviews::Entity as Reviews;
pub use super::user_film_list::Entity as UserFilmList;
pub use super::users::Entity as Users;
