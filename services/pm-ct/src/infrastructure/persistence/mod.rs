//! 持久化实现

mod error_mapper;
mod postgres_contract_repository;
mod postgres_role_directory;

pub use error_mapper::map_sqlx_error;
pub use postgres_contract_repository::PostgresContractRepository;
pub use postgres_role_directory::PostgresRoleDirectory;
