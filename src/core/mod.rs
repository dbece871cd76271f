//! # 푸앵카레 임베딩 핵심 모듈
//!
//! 쌍곡 기하 벡터 연산, 네거티브 샘플러, 리만 최적화 모델,
//! 낙관적 잠금 병렬 트레이너의 핵심 구성 요소들

pub mod config;
pub mod digraph;
pub mod model;
pub mod sampler;
pub mod trainer;
pub mod vector;

// 테스트 모듈
#[cfg(test)]
mod __tests__;

// 주요 타입들 재수출
pub use config::TrainConfig;
pub use digraph::{Digraph, Node};
pub use model::RiemannianModel;
pub use sampler::{NegativeSampler, NEGATIVE_TABLE_SIZE};
pub use trainer::PoincareTrainer;
pub use vector::{distance, dot, minkowski_dot, random_hyperboloid_point, ManifoldVector};
