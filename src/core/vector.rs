//! 하이퍼볼로이드 모델 벡터 연산
//!
//! 민코프스키 공간 R^{d,1}에 박힌 하이퍼볼로이드 H^d = {x : ⟨x,x⟩_M = -1} 위의
//! 점과 접벡터를 표현합니다. 마지막 성분(인덱스 d)이 시간꼴(timelike) 좌표이고,
//! 나머지가 공간꼴(spacelike) 좌표입니다. 푸앵카레 볼 표현과의 상호 변환,
//! 접공간 사영, 측지선 업데이트를 제공합니다.

use std::ops::{Index, IndexMut};

use rand::Rng;
use rand_distr::{Distribution, Normal};

/// (dimension + 1)개 성분을 갖는 하이퍼볼로이드 점 또는 접벡터
#[derive(Debug, Clone, PartialEq)]
pub struct ManifoldVector {
    components: Vec<f64>,
}

impl ManifoldVector {
    /// 0으로 초기화된 `len`개 성분의 벡터 생성
    pub fn new(len: usize) -> Self {
        Self {
            components: vec![0.0; len],
        }
    }

    /// 성분 목록으로부터 생성 (테스트/입출력용)
    pub fn from_components(components: Vec<f64>) -> Self {
        Self { components }
    }

    /// 성분 개수 (다양체 차원 + 1)
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.components
    }

    /// 모든 성분을 0으로 리셋
    pub fn zero(&mut self) {
        for c in self.components.iter_mut() {
            *c = 0.0;
        }
    }

    /// 스칼라 곱 (제자리)
    pub fn multiply(&mut self, scalar: f64) {
        for c in self.components.iter_mut() {
            *c *= scalar;
        }
    }

    /// 성분별 덧셈 (제자리)
    pub fn add(&mut self, other: &Self) {
        for (c, o) in self.components.iter_mut().zip(other.components.iter()) {
            *c += o;
        }
    }

    /// 가중 덧셈: self += weight * other
    pub fn add_scaled(&mut self, other: &Self, weight: f64) {
        for (c, o) in self.components.iter_mut().zip(other.components.iter()) {
            *c += weight * o;
        }
    }

    /// 유클리드 제곱 노름 (다양체 비인식 크기 점검용)
    pub fn squared_norm(&self) -> f64 {
        self.components.iter().map(|c| c * c).sum()
    }

    /// 시간꼴 좌표를 공간꼴 좌표로부터 재계산하여 제약 ⟨x,x⟩_M = -1 위로 재투영
    ///
    /// x_d = sqrt(1 + Σ_{i<d} x_i²). 부동소수점 드리프트 제거용이며,
    /// 이미 제약을 만족하면 사실상 no-op입니다.
    pub fn ensure_on_hyperboloid(&mut self) {
        let d = self.components.len() - 1;
        let spacelike_sq: f64 = self.components[..d].iter().map(|c| c * c).sum();
        self.components[d] = (1.0 + spacelike_sq).sqrt();
    }

    /// 하이퍼볼로이드 점을 푸앵카레 볼 점으로 변환 (제자리)
    ///
    /// ball_i = x_i / (1 + x_d). 변환 후 시간꼴 슬롯은 0 (볼 표현은
    /// 앞쪽 dimension개 슬롯만 사용하는 관례).
    pub fn to_ball_point(&mut self) {
        let d = self.components.len() - 1;
        let denom = 1.0 + self.components[d];
        for c in self.components[..d].iter_mut() {
            *c /= denom;
        }
        self.components[d] = 0.0;
    }

    /// 푸앵카레 볼 점을 하이퍼볼로이드 점으로 변환 (제자리)
    ///
    /// r² = Σ u_i² 에 대해 x_i = 2u_i/(1-r²), x_d = (1+r²)/(1-r²).
    pub fn to_hyperboloid_point(&mut self) {
        let d = self.components.len() - 1;
        let r_sq: f64 = self.components[..d].iter().map(|c| c * c).sum();
        let q = 1.0 - r_sq;
        for c in self.components[..d].iter_mut() {
            *c = 2.0 * *c / q;
        }
        self.components[d] = (1.0 + r_sq) / q;
    }

    /// 하이퍼볼로이드 점 `point`에서의 접벡터(self)를 대응하는 볼 점의
    /// 접공간으로 밀어보냄 (to_ball_point의 미분, 제자리)
    ///
    /// w_i = v_i/(1+x_d) - x_i·v_d/(1+x_d)², 시간꼴 슬롯은 0.
    pub fn to_ball_tangent(&mut self, point: &Self) {
        let d = self.components.len() - 1;
        let denom = 1.0 + point.components[d];
        let timelike = self.components[d];
        for (c, x) in self.components[..d].iter_mut().zip(point.components[..d].iter()) {
            *c = *c / denom - x * timelike / (denom * denom);
        }
        self.components[d] = 0.0;
    }

    /// 볼 점 `ball_point`에서의 접벡터(self)를 대응하는 하이퍼볼로이드 점의
    /// 접공간으로 밀어보냄 (to_hyperboloid_point의 미분, 제자리)
    ///
    /// q = 1-r², s = u·w 에 대해
    /// v_i = 2w_i/q + 4u_i·s/q², v_d = 4s/q².
    /// 결과는 대응 하이퍼볼로이드 점과 민코프스키 직교합니다.
    pub fn to_hyperboloid_tangent(&mut self, ball_point: &Self) {
        let d = self.components.len() - 1;
        let r_sq: f64 = ball_point.components[..d].iter().map(|c| c * c).sum();
        let s: f64 = ball_point.components[..d]
            .iter()
            .zip(self.components[..d].iter())
            .map(|(u, w)| u * w)
            .sum();
        let q = 1.0 - r_sq;
        for (c, u) in self.components[..d]
            .iter_mut()
            .zip(ball_point.components[..d].iter())
        {
            *c = 2.0 * *c / q + 4.0 * u * s / (q * q);
        }
        self.components[d] = 4.0 * s / (q * q);
    }

    /// 임의의 주변공간 벡터(self)를 `point`에서의 하이퍼볼로이드 접공간으로 사영
    ///
    /// v' = v + ⟨point, v⟩_M · point  (⟨point,point⟩_M = -1 을 이용).
    pub fn project_onto_tangent_space(&mut self, point: &Self) {
        let mdp = minkowski_dot(point, self);
        self.add_scaled(point, mdp);
    }

    /// 단위 민코프스키 노름 접벡터 방향으로 쌍곡 거리 `step_size`만큼
    /// 측지선을 따라 이동 (하이퍼볼로이드 지수 사상, 제자리)
    ///
    /// x ← cosh(step)·x + sinh(step)·tangent. 이동 후 제약 위로 재투영.
    pub fn geodesic_update(&mut self, tangent: &Self, step_size: f64) {
        let cosh_step = step_size.cosh();
        let sinh_step = step_size.sinh();
        for (c, t) in self.components.iter_mut().zip(tangent.components.iter()) {
            *c = cosh_step * *c + sinh_step * t;
        }
        self.ensure_on_hyperboloid();
    }
}

impl Index<usize> for ManifoldVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.components[index]
    }
}

impl IndexMut<usize> for ManifoldVector {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.components[index]
    }
}

/// 유클리드 내적
pub fn dot(a: &ManifoldVector, b: &ManifoldVector) -> f64 {
    a.components
        .iter()
        .zip(b.components.iter())
        .map(|(x, y)| x * y)
        .sum()
}

/// 민코프스키 내적: ⟨a,b⟩_M = Σ_{i<d} a_i·b_i - a_d·b_d
///
/// 마지막(시간꼴) 항 하나만 음수인 부정부호 쌍선형 형식으로,
/// 하이퍼볼로이드의 기하 프리미티브입니다.
pub fn minkowski_dot(a: &ManifoldVector, b: &ManifoldVector) -> f64 {
    let d = a.components.len() - 1;
    let spacelike: f64 = a.components[..d]
        .iter()
        .zip(b.components[..d].iter())
        .map(|(x, y)| x * y)
        .sum();
    spacelike - a.components[d] * b.components[d]
}

/// 쌍곡 거리: arccosh(-⟨a,b⟩_M)
///
/// 부동소수점 오차로 인수가 1 아래로 떨어지지 않도록 클램핑합니다.
pub fn distance(a: &ManifoldVector, b: &ManifoldVector) -> f64 {
    (-minkowski_dot(a, b)).max(1.0).acosh()
}

/// 기준점 (0,...,0,1)에서의 무작위 하이퍼볼로이드 점 생성
///
/// 공간꼴 성분을 각각 N(0, std_dev)에서 뽑아 기준점 접공간의 접벡터로 삼고,
/// 그 유클리드 노름을 보폭으로 지수 사상을 적용합니다.
/// 결과는 ⟨x,x⟩_M = -1 을 만족합니다.
pub fn random_hyperboloid_point<R: Rng>(len: usize, rng: &mut R, std_dev: f64) -> ManifoldVector {
    let d = len - 1;
    let mut point = ManifoldVector::new(len);
    point[d] = 1.0;
    if std_dev == 0.0 {
        return point;
    }
    // std_dev는 설정 검증 단계에서 유한한 음이 아닌 값임이 보장됨
    let normal = Normal::new(0.0, std_dev).expect("init_std_dev는 유한한 음이 아닌 값이어야 함");
    let tangent: Vec<f64> = (0..d).map(|_| normal.sample(rng)).collect();
    let norm: f64 = tangent.iter().map(|t| t * t).sum::<f64>().sqrt();
    if norm < f64::EPSILON {
        return point;
    }
    let sinh_norm = norm.sinh();
    for (i, t) in tangent.iter().enumerate() {
        point[i] = sinh_norm * t / norm;
    }
    point[d] = norm.cosh();
    point
}
