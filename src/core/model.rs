//! 리만 최적화 모델
//!
//! 샘플링된 간선 하나(진짜 타깃 + 네거티브들)를 소프트맥스형 대조 목적함수의
//! 그래디언트로 바꾸고, 하이퍼볼로이드 위에서 파라미터를 제자리 갱신합니다.
//! 업데이트 모드는 측지선(지수 사상) 방식과 Nickel & Kiela 방식의
//! 리트랙션(볼 좌표 덧셈 + 풀백) 두 가지입니다.

use crate::core::vector::{minkowski_dot, ManifoldVector};

/// 민코프스키 내적 상한 클램프
///
/// 이후의 sqrt(mdp² - 1)이 실수로 유지되고 악조건이 되지 않도록
/// -1 바로 아래에서 자릅니다.
pub const MAX_MINKOWSKI_DOT: f64 = -1.0 - 1e-10;

/// 이 노름 미만의 접벡터는 수렴한 것으로 보고 업데이트를 건너뜀
pub const MIN_STEP_SIZE: f64 = 1e-10;

/// 리트랙션 모드에서 풀백 시 되돌아가는 볼 반지름 (경계보다 엄격히 작음)
pub const BALL_MAX_DISTANCE: f64 = 1.0 - 1e-5;

/// 스레드마다 하나씩 생성되는 리만 SGD 모델
///
/// 공유 벡터 저장소에는 잠금이 걸린 상태의 `&mut` 참조로만 접근합니다.
#[derive(Debug)]
pub struct RiemannianModel {
    /// 리트랙션(볼 덧셈) 모드 여부. false면 측지선 모드.
    additive_updates: bool,
    /// 한 번의 업데이트가 이동할 수 있는 최대 쌍곡 거리
    max_step_size: f64,
    /// 목적값 누적 합
    performance: f64,
    /// 누적 예제 수 (첫 읽기에서 0 나눗셈을 피하기 위해 1에서 시작)
    nexamples: u64,
    /// 전체 업데이트 시도 횟수
    pub update_count: u64,
    /// 경계 풀백이 필요했던 업데이트 횟수
    pub pullback_count: u64,
}

impl RiemannianModel {
    pub fn new(additive_updates: bool, max_step_size: f64) -> Self {
        Self {
            additive_updates,
            max_step_size,
            performance: 0.0,
            nexamples: 1,
            update_count: 1,
            pullback_count: 0,
        }
    }

    /// Nickel & Kiela 스타일 대조 목적함수 한 스텝
    ///
    /// `candidates[0]`이 진짜 타깃이고 나머지는 샘플링된 네거티브입니다.
    /// 각 후보 n에 대해 m_n = ⟨source, candidate_n⟩_M (상한 클램프),
    /// 활성값 a_n = 1 / (-m_n + sqrt(m_n² - 1)), z = Σ a_n 으로 두고
    /// a_0/z 를 성능 지표로 누적합니다. 후보별 가중치
    /// (a_n/z - label_n)·(-1/sqrt(m_n² - 1)) 로 출력 벡터들을 제자리 갱신하고,
    /// 누적된 소스 그래디언트를 소스 접공간에 사영해 한 번 적용합니다.
    pub fn objective_and_update(
        &mut self,
        source: &mut ManifoldVector,
        candidates: &mut [&mut ManifoldVector],
        learning_rate: f64,
    ) {
        let mut acc_source_gradient = ManifoldVector::new(source.len());
        let mut mdps = Vec::with_capacity(candidates.len());
        let mut activations = Vec::with_capacity(candidates.len());
        let mut z = 0.0;

        for candidate in candidates.iter() {
            let mut mdp = minkowski_dot(source, candidate);
            if mdp > MAX_MINKOWSKI_DOT {
                mdp = MAX_MINKOWSKI_DOT;
            }
            let activation = 1.0 / (-mdp + (mdp * mdp - 1.0).sqrt());
            mdps.push(mdp);
            activations.push(activation);
            z += activation;
        }
        self.performance += activations[0] / z;

        for (n, candidate) in candidates.iter_mut().enumerate() {
            let label = if n == 0 { 1.0 } else { 0.0 };
            let weight =
                (activations[n] / z - label) * (-1.0 / (mdps[n] * mdps[n] - 1.0).sqrt());
            // 소스 벡터에 대한 미사영 그래디언트 누적
            acc_source_gradient.add_scaled(candidate, weight);
            // 출력(후보) 벡터 갱신
            let mut sample_gradient = source.clone();
            sample_gradient.multiply(learning_rate * weight);
            sample_gradient.project_onto_tangent_space(candidate);
            self.parameter_update(candidate, &mut sample_gradient);
        }
        self.nexamples += 1;

        acc_source_gradient.multiply(learning_rate);
        acc_source_gradient.project_onto_tangent_space(source);
        self.parameter_update(source, &mut acc_source_gradient);
    }

    /// 하이퍼볼로이드 점을 접벡터 방향으로 제자리 갱신
    ///
    /// 접벡터를 민코프스키 노름으로 정규화하고, 노름이 임계값 미만이면
    /// 수렴으로 간주해 건너뜁니다. 보폭은 최대 쌍곡 거리로 클리핑합니다.
    /// 리트랙션 모드에서는 점과 접벡터를 볼 표현으로 옮겨 더한 뒤, 결과가
    /// 볼 경계에 닿으면 안쪽으로 되돌리고(풀백) 하이퍼볼로이드로 복귀합니다.
    pub fn parameter_update(&mut self, point: &mut ManifoldVector, tangent: &mut ManifoldVector) {
        self.update_count += 1;
        let tangent_norm = minkowski_dot(tangent, tangent).max(0.0).sqrt();
        if tangent_norm < MIN_STEP_SIZE {
            return;
        }
        let step_size = tangent_norm.min(self.max_step_size);
        tangent.multiply(1.0 / tangent_norm);
        if self.additive_updates {
            tangent.multiply(step_size);
            tangent.to_ball_tangent(point);
            point.to_ball_point();
            point.add(tangent);
            // 볼 점은 시간꼴 슬롯이 0이므로 민코프스키 내적이 곧 유클리드 제곱 노름
            let norm = minkowski_dot(point, point).max(0.0).sqrt();
            if norm >= 1.0 {
                self.pullback_count += 1;
                point.multiply(BALL_MAX_DISTANCE / norm);
            }
            point.to_hyperboloid_point();
            point.ensure_on_hyperboloid();
        } else {
            point.geodesic_update(tangent, step_size);
        }
    }

    /// 마지막 호출 이후의 평균 목적값을 반환하고 누적기를 리셋
    ///
    /// 멱등이 아닙니다: 연속 두 번 호출하면 두 번째는 리셋된 기준값을
    /// 반환합니다.
    pub fn read_and_reset_performance(&mut self) -> f64 {
        let average = self.performance / self.nexamples as f64;
        self.performance = 0.0;
        self.nexamples = 1;
        average
    }
}
