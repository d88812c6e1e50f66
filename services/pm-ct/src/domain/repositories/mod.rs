//! 仓储接口

mod contract_repository;

pub use contract_repository::ContractRepository;
