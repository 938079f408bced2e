pub mod category;
pub mod movie;
pub mod review;
pub mod trailer;

pub use category::Category;
pub use movie::{Movie, MovieDetail};
pub use review::Review;
pub use trailer::Trailer;

#[cfg(test)]
pub(crate) use movie::sample_movie;
