//! 가중 네거티브 샘플러
//!
//! 노드별 도착 빈도를 거듭제곱 지수로 변형한 분포를 고정 크기 테이블로
//! 이산화합니다. 테이블은 학습 시작 전에 한 번 만들어지고 이후 불변이므로
//! 모든 스레드가 동기화 없이 읽습니다.

use rand::Rng;

/// 기본 샘플링 테이블 크기 (양자화 오차를 묶어두기에 충분히 큼)
pub const NEGATIVE_TABLE_SIZE: usize = 100_000_000;

/// 빈도^power 분포를 이산화한 네거티브 샘플링 테이블
///
/// power = 0 이면 빈도가 0이 아닌 노드들의 균등 분포,
/// power = 1 이면 원시 빈도 비례 분포가 됩니다.
#[derive(Debug)]
pub struct NegativeSampler {
    table: Vec<u32>,
}

impl NegativeSampler {
    /// 노드별 도착 빈도 `counts`와 지수 `power`로 테이블 구성
    ///
    /// 각 노드는 정규화된 확률에 비례하는 연속 슬롯을 차지합니다.
    /// 빈도 0인 노드는 지수와 무관하게 가중치 0으로, 단 하나의 슬롯도
    /// 차지하지 않습니다.
    pub fn new(power: f64, counts: &[u64], table_size: usize) -> Self {
        // 0^0 = 1 이 되지 않도록 빈도 0은 명시적으로 가중치 0 처리
        let weights: Vec<f64> = counts
            .iter()
            .map(|&c| if c == 0 { 0.0 } else { (c as f64).powf(power) })
            .collect();
        let z: f64 = weights.iter().sum();
        let mut table = Vec::with_capacity(table_size);
        if z > 0.0 {
            for (id, &weight) in weights.iter().enumerate() {
                let slots = (weight / z * table_size as f64).round() as usize;
                for _ in 0..slots {
                    table.push(id as u32);
                }
            }
        }
        Self { table }
    }

    /// 테이블 슬롯을 균등하게 뽑아 노드 id 반환
    ///
    /// 뽑힌 id가 `exclude`에 있으면 수락될 때까지 다시 뽑습니다(기각 샘플링).
    /// `exclude`가 가중치 양수인 모든 id를 덮으면 종료하지 않습니다 --
    /// 이는 호출자 책임이며 내부에서 검증하지 않습니다.
    pub fn get_sample<R: Rng>(&self, exclude: &[usize], rng: &mut R) -> usize {
        loop {
            let slot = rng.gen_range(0..self.table.len());
            let id = self.table[slot] as usize;
            if !exclude.contains(&id) {
                return id;
            }
        }
    }

    /// 테이블 슬롯 수 (진단용)
    pub fn table_len(&self) -> usize {
        self.table.len()
    }
}
