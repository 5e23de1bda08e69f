pub mod boleta_repository;

pub use boleta_repository::BoletaRepository;
