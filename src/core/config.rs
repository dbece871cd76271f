//! 학습 설정
//!
//! CLI 계층이 채워서 트레이너에 넘기는 설정 표면입니다. 기본값은
//! 단일 스레드 + 측지선 업데이트 기준입니다.

use std::path::PathBuf;

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::core::sampler::NEGATIVE_TABLE_SIZE;

/// 푸앵카레 임베딩 학습 전체 구성
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// 학습 그래프 파일 경로 (탭 구분 간선 목록)
    pub graph: PathBuf,
    /// 학습된 벡터 저장 경로
    pub output_vectors: PathBuf,
    /// 초기화용 벡터 파일 경로 (선택, 볼 좌표)
    pub input_vectors: Option<PathBuf>,
    /// true면 Nickel & Kiela 방식 리트랙션 업데이트, false면 측지선 업데이트
    pub additive_updates: bool,
    /// 진행률 표시 여부
    pub verbose: bool,
    /// 시작 학습률 (에포크에 걸쳐 end_lr로 선형 보간)
    pub start_lr: f64,
    /// 종료 학습률
    pub end_lr: f64,
    /// 한 업데이트의 최대 쌍곡 거리
    pub max_step_size: f64,
    /// 다양체 차원 (벡터 성분 수는 dimension + 1)
    pub dimension: usize,
    /// 이 에포크 수마다 체크포인트 저장 (양수가 아니면 비활성)
    pub checkpoint_interval: i32,
    /// 네거티브 샘플링 분포 지수
    pub distribution_power: f64,
    /// 에포크 수
    pub epochs: usize,
    /// 간선당 샘플링할 네거티브 수
    pub number_negatives: usize,
    /// 워커 스레드 수
    pub threads: usize,
    /// 초기화 시 기준점으로부터의 쌍곡 거리 표준편차
    pub init_std_dev: f64,
    /// 난수 시드 (단일 스레드일 때만 결정적)
    pub seed: u64,
    /// 네거티브 샘플링 테이블 크기
    pub negative_table_size: usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            graph: PathBuf::new(),
            output_vectors: PathBuf::new(),
            input_vectors: None,
            additive_updates: false,
            verbose: false,
            start_lr: 0.05,
            end_lr: 0.05,
            max_step_size: 2.0,
            dimension: 100,
            checkpoint_interval: -1,
            distribution_power: 1.0,
            epochs: 5,
            number_negatives: 5,
            threads: 1,
            init_std_dev: 0.1,
            seed: 1,
            negative_table_size: NEGATIVE_TABLE_SIZE,
        }
    }
}

impl TrainConfig {
    /// 학습 시작 전 설정 검증
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.graph.as_os_str().is_empty(),
            "그래프 파일 경로가 비어 있음"
        );
        ensure!(
            !self.output_vectors.as_os_str().is_empty(),
            "출력 벡터 파일 경로가 비어 있음"
        );
        ensure!(self.dimension >= 1, "다양체 차원은 1 이상이어야 함");
        ensure!(self.threads >= 1, "스레드 수는 1 이상이어야 함");
        ensure!(self.negative_table_size >= 1, "샘플링 테이블 크기는 1 이상이어야 함");
        ensure!(
            self.max_step_size > 0.0 && self.max_step_size.is_finite(),
            "최대 보폭은 유한한 양수여야 함"
        );
        ensure!(
            self.start_lr.is_finite() && self.end_lr.is_finite(),
            "학습률은 유한해야 함"
        );
        ensure!(
            self.init_std_dev >= 0.0 && self.init_std_dev.is_finite(),
            "초기화 표준편차는 유한한 음이 아닌 값이어야 함"
        );
        Ok(())
    }
}
