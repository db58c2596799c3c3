pub mod id_generator;
pub mod images;
pub mod password;
pub mod text;
pub mod urls;
