//! 푸앵카레 임베딩 라이브러리
//!
//! 유향 그래프의 노드들을 Nickel-Kiela 스타일로 쌍곡 공간(하이퍼볼로이드 모델)에
//! 임베딩하는 리만 확률적 경사하강 학습기. 네거티브 샘플링과 벡터 단위
//! try-lock 기반의 낙관적(HogWild 스타일) 병렬화를 사용합니다.

pub mod core;

// 핵심 타입들 재수출
pub use core::{
    // 기하 프리미티브
    distance, dot, minkowski_dot, random_hyperboloid_point, ManifoldVector,
    // 그래프 및 샘플링
    Digraph, NegativeSampler, Node, NEGATIVE_TABLE_SIZE,
    // 학습
    PoincareTrainer, RiemannianModel, TrainConfig,
};
